use std::{fmt, io};

use byteorder::{ReadBytesExt, WriteBytesExt};
use bytes::Bytes;
use bytes_util::BytesCursorExt;

/// AAC packet type, the one-byte discriminant the container inserts before
/// AAC payload bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AacPacketType {
    /// AAC Sequence Header (AudioSpecificConfig)
    SequenceHeader = 0x00,
    /// AAC Raw frame data
    Raw = 0x01,
}

impl TryFrom<u8> for AacPacketType {
    type Error = io::Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(AacPacketType::SequenceHeader),
            0x01 => Ok(AacPacketType::Raw),
            _ => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Invalid AAC packet type: {}", value),
            )),
        }
    }
}

/// AAC Packet
///
/// The payload of an audio tag whose sound format is AAC: a packet type
/// byte followed by configuration or frame bytes. A packet type that is
/// neither a sequence header nor a raw frame stays at this level with its
/// bytes untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum AacPacket {
    /// AAC decoder configuration
    SequenceHeader(Bytes),
    /// AAC frame data
    Raw(Bytes),
    /// A packet type we don't know how to parse
    Unknown { packet_type: u8, data: Bytes },
}

impl AacPacket {
    /// Create a new AAC packet from the given packet type and data
    pub fn new(packet_type: AacPacketType, data: Bytes) -> Self {
        match packet_type {
            AacPacketType::SequenceHeader => AacPacket::SequenceHeader(data),
            AacPacketType::Raw => AacPacket::Raw(data),
        }
    }

    pub fn demux(reader: &mut io::Cursor<Bytes>) -> io::Result<Self> {
        let packet_type = reader.read_u8()?;
        let data = reader.extract_remaining();

        Ok(match packet_type {
            0x00 => AacPacket::SequenceHeader(data),
            0x01 => AacPacket::Raw(data),
            packet_type => AacPacket::Unknown { packet_type, data },
        })
    }

    pub fn mux<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_u8(self.packet_type())?;
        writer.write_all(self.data())?;
        Ok(())
    }

    /// The packet type byte this packet was resolved from.
    pub fn packet_type(&self) -> u8 {
        match self {
            AacPacket::SequenceHeader(_) => AacPacketType::SequenceHeader as u8,
            AacPacket::Raw(_) => AacPacketType::Raw as u8,
            AacPacket::Unknown { packet_type, .. } => *packet_type,
        }
    }

    pub fn data(&self) -> &Bytes {
        match self {
            AacPacket::SequenceHeader(data)
            | AacPacket::Raw(data)
            | AacPacket::Unknown { data, .. } => data,
        }
    }

    pub fn is_sequence_header(&self) -> bool {
        matches!(self, AacPacket::SequenceHeader(_))
    }
}

impl fmt::Display for AacPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AacPacket::SequenceHeader(data) => {
                write!(f, "AAC Sequence Header [{} bytes]", data.len())
            }
            AacPacket::Raw(data) => write!(f, "AAC Raw Data [{} bytes]", data.len()),
            AacPacket::Unknown { packet_type, data } => {
                write!(
                    f,
                    "Unknown AAC Packet [Type: {}, {} bytes]",
                    packet_type,
                    data.len()
                )
            }
        }
    }
}
