//! Video tag payloads.
//!
//! The first payload byte packs the frame type (4 bits) and codec id
//! (4 bits); the codec decides how the rest resolves: AVC gets its
//! packet-type refinement, everything else keeps its bytes raw.

use std::io;

use bytes::Bytes;
use bytes_util::{BitReader, BitWriter, BytesCursorExt};

use super::avc::AvcPacket;

/// Frame type, the upper nibble of the first video payload byte.
///
/// Nibble values without a name are carried as
/// [`VideoFrameType::Unknown`]; the frame type does not take part in
/// variant resolution.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoFrameType {
    /// Key frame (for AVC, a seekable frame)
    KeyFrame = 1,
    /// Inter frame (for AVC, a non-seekable frame)
    InterFrame = 2,
    /// Disposable inter frame, H.263 only
    DisposableInterFrame = 3,
    /// Generated key frame, reserved for server use
    GeneratedKeyFrame = 4,
    /// Video info/command frame
    VideoInfoFrame = 5,
    Unknown(u8),
}

impl From<u8> for VideoFrameType {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::KeyFrame,
            2 => Self::InterFrame,
            3 => Self::DisposableInterFrame,
            4 => Self::GeneratedKeyFrame,
            5 => Self::VideoInfoFrame,
            _ => Self::Unknown(value),
        }
    }
}

impl From<VideoFrameType> for u8 {
    fn from(value: VideoFrameType) -> Self {
        match value {
            VideoFrameType::KeyFrame => 1,
            VideoFrameType::InterFrame => 2,
            VideoFrameType::DisposableInterFrame => 3,
            VideoFrameType::GeneratedKeyFrame => 4,
            VideoFrameType::VideoInfoFrame => 5,
            VideoFrameType::Unknown(value) => value,
        }
    }
}

/// Video codec id, the lower nibble of the first video payload byte.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoCodecId {
    /// JPEG (obsolete)
    Jpeg = 1,
    /// Sorenson H.263
    SorensonH263 = 2,
    /// Screen video
    ScreenVideo = 3,
    /// On2 VP6
    On2VP6 = 4,
    /// On2 VP6 with alpha channel
    On2VP6Alpha = 5,
    /// Screen video version 2
    ScreenVideo2 = 6,
    /// AVC (H.264)
    Avc = 7,
    Unknown(u8),
}

impl From<u8> for VideoCodecId {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::Jpeg,
            2 => Self::SorensonH263,
            3 => Self::ScreenVideo,
            4 => Self::On2VP6,
            5 => Self::On2VP6Alpha,
            6 => Self::ScreenVideo2,
            7 => Self::Avc,
            _ => Self::Unknown(value),
        }
    }
}

impl From<VideoCodecId> for u8 {
    fn from(value: VideoCodecId) -> Self {
        match value {
            VideoCodecId::Jpeg => 1,
            VideoCodecId::SorensonH263 => 2,
            VideoCodecId::ScreenVideo => 3,
            VideoCodecId::On2VP6 => 4,
            VideoCodecId::On2VP6Alpha => 5,
            VideoCodecId::ScreenVideo2 => 6,
            VideoCodecId::Avc => 7,
            VideoCodecId::Unknown(value) => value,
        }
    }
}

/// The resolved body of a video tag.
#[derive(Debug, Clone, PartialEq)]
pub enum VideoBody {
    /// An AVC packet, selected when the codec is AVC
    Avc(AvcPacket),
    /// Any other codec's payload, kept as raw bytes
    Data(Bytes),
}

impl VideoBody {
    pub fn demux(codec: VideoCodecId, reader: &mut io::Cursor<Bytes>) -> io::Result<Self> {
        match codec {
            VideoCodecId::Avc => Ok(VideoBody::Avc(AvcPacket::demux(reader)?)),
            _ => Ok(VideoBody::Data(reader.extract_remaining())),
        }
    }

    pub fn mux<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        match self {
            VideoBody::Avc(packet) => packet.mux(writer),
            VideoBody::Data(data) => writer.write_all(data),
        }
    }

    pub fn is_sequence_header(&self) -> bool {
        match self {
            VideoBody::Avc(packet) => packet.is_sequence_header(),
            _ => false,
        }
    }
}

/// The payload of a video tag.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoData {
    pub frame_type: VideoFrameType,
    pub codec: VideoCodecId,
    pub body: VideoBody,
}

impl VideoData {
    /// Parses a video payload from a cursor positioned at its first byte.
    pub fn demux(reader: &mut io::Cursor<Bytes>) -> io::Result<Self> {
        let (frame_type, codec) = {
            let mut bits = BitReader::new(&mut *reader);
            let frame_type = VideoFrameType::from(bits.read_bits(4)? as u8);
            let codec = VideoCodecId::from(bits.read_bits(4)? as u8);
            (frame_type, codec)
        };

        let body = VideoBody::demux(codec, reader)?;

        Ok(VideoData {
            frame_type,
            codec,
            body,
        })
    }

    pub fn mux<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        let mut bits = BitWriter::new(&mut *writer);
        bits.write_bits(u64::from(u8::from(self.frame_type)), 4)?;
        bits.write_bits(u64::from(u8::from(self.codec)), 4)?;
        debug_assert!(bits.is_aligned());
        drop(bits);

        self.body.mux(writer)
    }

    pub fn is_key_frame(&self) -> bool {
        self.frame_type == VideoFrameType::KeyFrame
    }

    pub fn is_sequence_header(&self) -> bool {
        self.body.is_sequence_header()
    }
}

impl std::fmt::Display for VideoData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VideoTag [{:?}, {:?}]", self.frame_type, self.codec)
    }
}
