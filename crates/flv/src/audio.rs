//! Audio tag payloads.
//!
//! The first payload byte packs four fields — sound format (4 bits), rate
//! (2 bits), sample size (1 bit) and channel type (1 bit) — and the sound
//! format decides how the rest of the payload is resolved: AAC gets its
//! packet-type refinement, everything else keeps its bytes undifferentiated.

use std::{fmt, io};

use bytes::Bytes;
use bytes_util::{BitReader, BitWriter, BytesCursorExt};

use super::aac::AacPacket;

/// Sound format, the upper nibble of the first audio payload byte.
///
/// Values without a name here (9, 12, 13) are carried as
/// [`SoundFormat::Unknown`] so any 4-bit pattern survives a round trip;
/// the format is a variant selector, not a validity check.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundFormat {
    /// Uncompressed PCM audio
    Pcm = 0,
    /// ADPCM compressed audio
    AdPcm = 1,
    Mp3 = 2,
    PcmLe = 3,
    Nellymoser16khzMono = 4,
    Nellymoser8khzMono = 5,
    Nellymoser = 6,
    G711ALaw = 7,
    G711MuLaw = 8,
    Aac = 10,
    Speex = 11,
    Mp38k = 14,
    DeviceSpecific = 15,
    Unknown(u8),
}

impl From<u8> for SoundFormat {
    fn from(value: u8) -> Self {
        match value {
            0 => SoundFormat::Pcm,
            1 => SoundFormat::AdPcm,
            2 => SoundFormat::Mp3,
            3 => SoundFormat::PcmLe,
            4 => SoundFormat::Nellymoser16khzMono,
            5 => SoundFormat::Nellymoser8khzMono,
            6 => SoundFormat::Nellymoser,
            7 => SoundFormat::G711ALaw,
            8 => SoundFormat::G711MuLaw,
            10 => SoundFormat::Aac,
            11 => SoundFormat::Speex,
            14 => SoundFormat::Mp38k,
            15 => SoundFormat::DeviceSpecific,
            _ => SoundFormat::Unknown(value),
        }
    }
}

impl From<SoundFormat> for u8 {
    fn from(value: SoundFormat) -> Self {
        match value {
            SoundFormat::Pcm => 0,
            SoundFormat::AdPcm => 1,
            SoundFormat::Mp3 => 2,
            SoundFormat::PcmLe => 3,
            SoundFormat::Nellymoser16khzMono => 4,
            SoundFormat::Nellymoser8khzMono => 5,
            SoundFormat::Nellymoser => 6,
            SoundFormat::G711ALaw => 7,
            SoundFormat::G711MuLaw => 8,
            SoundFormat::Aac => 10,
            SoundFormat::Speex => 11,
            SoundFormat::Mp38k => 14,
            SoundFormat::DeviceSpecific => 15,
            SoundFormat::Unknown(value) => value,
        }
    }
}

/// Sample rate indicator, 2 bits.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundRate {
    Hz5512 = 0,
    Hz11025 = 1,
    Hz22050 = 2,
    Hz44100 = 3,
}

impl TryFrom<u8> for SoundRate {
    type Error = io::Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => SoundRate::Hz5512,
            1 => SoundRate::Hz11025,
            2 => SoundRate::Hz22050,
            3 => SoundRate::Hz44100,
            _ => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("Invalid sound rate: {}", value),
                ));
            }
        })
    }
}

/// Sample size indicator, 1 bit.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundSize {
    Bits8 = 0,
    Bits16 = 1,
}

impl TryFrom<u8> for SoundSize {
    type Error = io::Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => SoundSize::Bits8,
            1 => SoundSize::Bits16,
            _ => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("Invalid sound size: {}", value),
                ));
            }
        })
    }
}

/// Channel layout indicator, 1 bit.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundType {
    Mono = 0,
    Stereo = 1,
}

impl TryFrom<u8> for SoundType {
    type Error = io::Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => SoundType::Mono,
            1 => SoundType::Stereo,
            _ => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("Invalid sound type: {}", value),
                ));
            }
        })
    }
}

/// The resolved body of an audio tag.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioBody {
    /// An AAC packet, selected when the sound format is AAC
    Aac(AacPacket),
    /// Any other format's payload, kept as raw bytes
    Data(Bytes),
}

impl AudioBody {
    pub fn demux(sound_format: SoundFormat, reader: &mut io::Cursor<Bytes>) -> io::Result<Self> {
        match sound_format {
            SoundFormat::Aac => Ok(AudioBody::Aac(AacPacket::demux(reader)?)),
            _ => Ok(AudioBody::Data(reader.extract_remaining())),
        }
    }

    pub fn mux<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        match self {
            AudioBody::Aac(packet) => packet.mux(writer),
            AudioBody::Data(data) => writer.write_all(data),
        }
    }

    pub fn is_sequence_header(&self) -> bool {
        match self {
            AudioBody::Aac(packet) => packet.is_sequence_header(),
            _ => false,
        }
    }
}

/// The payload of an audio tag.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioData {
    pub sound_format: SoundFormat,
    pub sound_rate: SoundRate,
    pub sound_size: SoundSize,
    pub sound_type: SoundType,
    pub body: AudioBody,
}

impl AudioData {
    /// Parses an audio payload from a cursor positioned at its first byte.
    pub fn demux(reader: &mut io::Cursor<Bytes>) -> io::Result<Self> {
        let (sound_format, sound_rate, sound_size, sound_type) = {
            let mut bits = BitReader::new(&mut *reader);
            let sound_format = SoundFormat::from(bits.read_bits(4)? as u8);
            let sound_rate = SoundRate::try_from(bits.read_bits(2)? as u8)?;
            let sound_size = SoundSize::try_from(bits.read_bits(1)? as u8)?;
            let sound_type = SoundType::try_from(bits.read_bits(1)? as u8)?;
            (sound_format, sound_rate, sound_size, sound_type)
        };

        let body = AudioBody::demux(sound_format, reader)?;

        Ok(AudioData {
            sound_format,
            sound_rate,
            sound_size,
            sound_type,
            body,
        })
    }

    pub fn mux<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        let mut bits = BitWriter::new(&mut *writer);
        bits.write_bits(u64::from(u8::from(self.sound_format)), 4)?;
        bits.write_bits(self.sound_rate as u64, 2)?;
        bits.write_bits(self.sound_size as u64, 1)?;
        bits.write_bits(self.sound_type as u64, 1)?;
        debug_assert!(bits.is_aligned());
        drop(bits);

        self.body.mux(writer)
    }

    pub fn is_sequence_header(&self) -> bool {
        self.body.is_sequence_header()
    }
}

impl fmt::Display for AudioData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AudioTag [{}, {:?}, {:?}, {:?}]",
            self.sound_format, self.sound_rate, self.sound_size, self.sound_type
        )
    }
}

impl fmt::Display for SoundFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SoundFormat::Pcm => write!(f, "PCM"),
            SoundFormat::AdPcm => write!(f, "ADPCM"),
            SoundFormat::Mp3 => write!(f, "MP3"),
            SoundFormat::PcmLe => write!(f, "PCM-LE"),
            SoundFormat::Nellymoser16khzMono => write!(f, "Nellymoser-16kHz-Mono"),
            SoundFormat::Nellymoser8khzMono => write!(f, "Nellymoser-8kHz-Mono"),
            SoundFormat::Nellymoser => write!(f, "Nellymoser"),
            SoundFormat::G711ALaw => write!(f, "G711-A-Law"),
            SoundFormat::G711MuLaw => write!(f, "G711-Mu-Law"),
            SoundFormat::Aac => write!(f, "AAC"),
            SoundFormat::Speex => write!(f, "Speex"),
            SoundFormat::Mp38k => write!(f, "MP3-8kHz"),
            SoundFormat::DeviceSpecific => write!(f, "DeviceSpecific"),
            SoundFormat::Unknown(value) => write!(f, "Unknown({})", value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aac_audio_packet() {
        let mut reader = io::Cursor::new(Bytes::from(vec![0b1010_1101, 0b0000_0000, 1, 2, 3]));
        let audio = AudioData::demux(&mut reader).unwrap();

        assert_eq!(audio.sound_format, SoundFormat::Aac);
        assert_eq!(audio.sound_rate, SoundRate::Hz44100);
        assert_eq!(audio.sound_size, SoundSize::Bits8);
        assert_eq!(audio.sound_type, SoundType::Stereo);
        assert_eq!(
            audio.body,
            AudioBody::Aac(AacPacket::SequenceHeader(Bytes::from_static(&[1, 2, 3])))
        );
    }

    #[test]
    fn test_parse_mp3_audio_packet() {
        // MP3 (2 << 4), 11kHz (1 << 2), 16-bit (1 << 1), mono
        let mut reader = io::Cursor::new(Bytes::from(vec![0x26, 0xAB, 0xCD]));
        let audio = AudioData::demux(&mut reader).unwrap();

        assert_eq!(audio.sound_format, SoundFormat::Mp3);
        assert_eq!(audio.sound_rate, SoundRate::Hz11025);
        assert_eq!(audio.sound_size, SoundSize::Bits16);
        assert_eq!(audio.sound_type, SoundType::Mono);
        assert_eq!(audio.body, AudioBody::Data(Bytes::from_static(&[0xAB, 0xCD])));
    }

    #[test]
    fn test_unknown_sound_format_survives() {
        // Format 13 has no name; rate/size/type still parse.
        let bytes = vec![0b1101_0110, 0x01, 0x02];
        let mut reader = io::Cursor::new(Bytes::from(bytes.clone()));
        let audio = AudioData::demux(&mut reader).unwrap();

        assert_eq!(audio.sound_format, SoundFormat::Unknown(13));
        assert!(matches!(audio.body, AudioBody::Data(_)));

        let mut out = Vec::new();
        audio.mux(&mut out).unwrap();
        assert_eq!(out, bytes);
    }

    #[test]
    fn test_mux_round_trip() {
        let audio = AudioData {
            sound_format: SoundFormat::Aac,
            sound_rate: SoundRate::Hz44100,
            sound_size: SoundSize::Bits16,
            sound_type: SoundType::Stereo,
            body: AudioBody::Aac(AacPacket::Raw(Bytes::from_static(&[9, 8, 7]))),
        };

        let mut out = Vec::new();
        audio.mux(&mut out).unwrap();
        assert_eq!(out[0], 0xAF); // 1010 11 1 1
        assert_eq!(out[1], 0x01);

        let decoded = AudioData::demux(&mut io::Cursor::new(Bytes::from(out))).unwrap();
        assert_eq!(decoded, audio);
    }

    #[test]
    fn test_empty_payload_is_an_error() {
        let mut reader = io::Cursor::new(Bytes::new());
        let err = AudioData::demux(&mut reader).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
