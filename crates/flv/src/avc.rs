use std::io;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use bytes::Bytes;
use bytes_util::BytesCursorExt;
use bytes_util::range_check;

/// AVC packet type, the byte following the frame-type/codec byte in an AVC
/// video tag.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvcPacketType {
    SequenceHeader = 0,
    Nalu = 1,
    EndOfSequence = 2,
}

impl TryFrom<u8> for AvcPacketType {
    type Error = io::Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::SequenceHeader),
            1 => Ok(Self::Nalu),
            2 => Ok(Self::EndOfSequence),
            _ => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Invalid AVC packet type: {}", value),
            )),
        }
    }
}

/// AVC Packet
///
/// Every variant carries the 24-bit signed composition time offset that
/// sits between the packet type and the payload, so any packet re-encodes
/// to the bytes it came from. The sequence header's decoder configuration
/// record is opaque here; interpreting it is a media concern, not a
/// container concern.
#[derive(Debug, Clone, PartialEq)]
pub enum AvcPacket {
    /// AVC sequence header carrying the decoder configuration record
    SequenceHeader { composition_time: i32, config: Bytes },
    /// One or more AVC NALUs
    Nalu { composition_time: i32, data: Bytes },
    /// End of the AVC sequence
    EndOfSequence { composition_time: i32, data: Bytes },
    /// A packet type we don't know how to parse
    Unknown {
        packet_type: u8,
        composition_time: i32,
        data: Bytes,
    },
}

impl AvcPacket {
    pub fn demux(reader: &mut io::Cursor<Bytes>) -> io::Result<Self> {
        let packet_type = reader.read_u8()?;
        let composition_time = reader.read_i24::<BigEndian>()?;
        let data = reader.extract_remaining();

        Ok(match packet_type {
            0 => Self::SequenceHeader {
                composition_time,
                config: data,
            },
            1 => Self::Nalu {
                composition_time,
                data,
            },
            2 => Self::EndOfSequence {
                composition_time,
                data,
            },
            packet_type => Self::Unknown {
                packet_type,
                composition_time,
                data,
            },
        })
    }

    pub fn mux<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        range_check!(self.composition_time(), -(1 << 23), (1 << 23) - 1)?;

        writer.write_u8(self.packet_type())?;
        writer.write_i24::<BigEndian>(self.composition_time())?;
        writer.write_all(self.data())?;
        Ok(())
    }

    /// The packet type byte this packet was resolved from.
    pub fn packet_type(&self) -> u8 {
        match self {
            Self::SequenceHeader { .. } => AvcPacketType::SequenceHeader as u8,
            Self::Nalu { .. } => AvcPacketType::Nalu as u8,
            Self::EndOfSequence { .. } => AvcPacketType::EndOfSequence as u8,
            Self::Unknown { packet_type, .. } => *packet_type,
        }
    }

    /// Composition time offset in milliseconds, two's-complement 24-bit.
    pub fn composition_time(&self) -> i32 {
        match self {
            Self::SequenceHeader {
                composition_time, ..
            }
            | Self::Nalu {
                composition_time, ..
            }
            | Self::EndOfSequence {
                composition_time, ..
            }
            | Self::Unknown {
                composition_time, ..
            } => *composition_time,
        }
    }

    pub fn data(&self) -> &Bytes {
        match self {
            Self::SequenceHeader { config, .. } => config,
            Self::Nalu { data, .. }
            | Self::EndOfSequence { data, .. }
            | Self::Unknown { data, .. } => data,
        }
    }

    pub fn is_sequence_header(&self) -> bool {
        matches!(self, Self::SequenceHeader { .. })
    }
}

impl std::fmt::Display for AvcPacket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SequenceHeader { config, .. } => {
                write!(f, "SequenceHeader [{} bytes]", config.len())
            }
            Self::Nalu {
                composition_time,
                data,
            } => write!(f, "NALU [CTS: {}ms] ({} bytes)", composition_time, data.len()),
            Self::EndOfSequence { .. } => write!(f, "EndOfSequence"),
            Self::Unknown {
                packet_type,
                composition_time,
                data,
            } => write!(
                f,
                "Unknown [Type: {}, CTS: {}ms] ({} bytes)",
                packet_type,
                composition_time,
                data.len()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demux_nalu() {
        let mut reader = io::Cursor::new(Bytes::from_static(&[
            0x01, 0x00, 0x12, 0x34, 0x05, 0x06,
        ]));
        let packet = AvcPacket::demux(&mut reader).unwrap();
        assert_eq!(
            packet,
            AvcPacket::Nalu {
                composition_time: 0x1234,
                data: Bytes::from_static(&[0x05, 0x06]),
            }
        );
    }

    #[test]
    fn test_negative_composition_time() {
        // 0xFFFFFB is -5 in 24-bit two's complement.
        let mut reader = io::Cursor::new(Bytes::from_static(&[0x01, 0xFF, 0xFF, 0xFB]));
        let packet = AvcPacket::demux(&mut reader).unwrap();
        assert_eq!(packet.composition_time(), -5);

        let mut out = Vec::new();
        packet.mux(&mut out).unwrap();
        assert_eq!(out, vec![0x01, 0xFF, 0xFF, 0xFB]);
    }

    #[test]
    fn test_sequence_header_is_opaque() {
        let config = [0x01, 0x64, 0x00, 0x1F, 0xFF];
        let mut bytes = vec![0x00, 0x00, 0x00, 0x00];
        bytes.extend_from_slice(&config);

        let mut reader = io::Cursor::new(Bytes::from(bytes.clone()));
        let packet = AvcPacket::demux(&mut reader).unwrap();
        assert!(packet.is_sequence_header());
        assert_eq!(packet.data(), &Bytes::copy_from_slice(&config));

        let mut out = Vec::new();
        packet.mux(&mut out).unwrap();
        assert_eq!(out, bytes);
    }

    #[test]
    fn test_unmatched_packet_type_is_carried() {
        let mut reader = io::Cursor::new(Bytes::from_static(&[0x05, 0x00, 0x00, 0x00, 0xAA]));
        let packet = AvcPacket::demux(&mut reader).unwrap();
        assert_eq!(
            packet,
            AvcPacket::Unknown {
                packet_type: 5,
                composition_time: 0,
                data: Bytes::from_static(&[0xAA]),
            }
        );
    }

    #[test]
    fn test_truncated_prefix() {
        let mut reader = io::Cursor::new(Bytes::from_static(&[0x01, 0x00]));
        let err = AvcPacket::demux(&mut reader).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
