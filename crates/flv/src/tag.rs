use std::io;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use bytes::Bytes;
use bytes_util::BytesCursorExt;
use bytes_util::range_check;

use crate::audio::AudioData;
use crate::error::FlvError;
use crate::script::ScriptData;
use crate::video::VideoData;

/// Size of the per-tag header in bytes.
pub const TAG_HEADER_SIZE: usize = 11;

/// FLV Tag Type
///
/// The three types defined by the container are audio (8), video (9) and
/// script data (18). Anything else (including the encrypted variants of the
/// v10.1 spec, which shift the type byte upward) is carried through as
/// [`FlvTagType::Unknown`] rather than rejected.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlvTagType {
    Audio = 8,
    Video = 9,
    ScriptData = 18,
    Unknown(u8),
}

impl From<u8> for FlvTagType {
    fn from(value: u8) -> Self {
        match value {
            8 => FlvTagType::Audio,
            9 => FlvTagType::Video,
            18 => FlvTagType::ScriptData,
            _ => FlvTagType::Unknown(value),
        }
    }
}

impl From<FlvTagType> for u8 {
    fn from(value: FlvTagType) -> Self {
        match value {
            FlvTagType::Audio => 8,
            FlvTagType::Video => 9,
            FlvTagType::ScriptData => 18,
            FlvTagType::Unknown(value) => value,
        }
    }
}

/// The fixed 11-byte header preceding every tag payload.
///
/// The 32-bit timestamp is stored split across its two wire fields: the
/// 24-bit basic part and the 8-bit extension that carries bits 24-31. Use
/// [`timestamp`](Self::timestamp) / [`set_timestamp`](Self::set_timestamp)
/// to work with the assembled value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlvTagHeader {
    pub tag_type: FlvTagType,
    /// Byte count of the tag payload, excluding this header and excluding
    /// the previous-tag-size field that follows the payload in files.
    pub data_size: u32,
    /// Lower 24 bits of the timestamp in milliseconds.
    pub timestamp_basic: u32,
    /// Upper 8 bits of the timestamp in milliseconds.
    pub timestamp_extended: u8,
    /// Conventionally 0.
    pub stream_id: u32,
}

impl FlvTagHeader {
    pub fn new(tag_type: FlvTagType) -> Self {
        Self {
            tag_type,
            data_size: 0,
            timestamp_basic: 0,
            timestamp_extended: 0,
            stream_id: 0,
        }
    }

    /// The assembled 32-bit timestamp in milliseconds.
    pub fn timestamp(&self) -> u32 {
        (u32::from(self.timestamp_extended) << 24) | self.timestamp_basic
    }

    /// Splits a 32-bit timestamp across the two wire fields.
    pub fn set_timestamp(&mut self, timestamp_ms: u32) {
        self.timestamp_extended = (timestamp_ms >> 24) as u8;
        self.timestamp_basic = timestamp_ms & 0xFF_FFFF;
    }

    pub fn demux(reader: &mut io::Cursor<Bytes>) -> Result<Self, FlvError> {
        let tag_type = FlvTagType::from(reader.read_u8().map_err(FlvError::from_io)?);
        let data_size = reader.read_u24::<BigEndian>().map_err(FlvError::from_io)?;
        let timestamp_basic = reader.read_u24::<BigEndian>().map_err(FlvError::from_io)?;
        let timestamp_extended = reader.read_u8().map_err(FlvError::from_io)?;
        let stream_id = reader.read_u24::<BigEndian>().map_err(FlvError::from_io)?;

        Ok(Self {
            tag_type,
            data_size,
            timestamp_basic,
            timestamp_extended,
            stream_id,
        })
    }

    pub fn mux<W: io::Write>(&self, writer: &mut W) -> Result<(), FlvError> {
        range_check!(self.data_size, 0, 0xFF_FFFF)?;
        range_check!(self.timestamp_basic, 0, 0xFF_FFFF)?;
        range_check!(self.stream_id, 0, 0xFF_FFFF)?;

        writer.write_u8(self.tag_type.into())?;
        writer.write_u24::<BigEndian>(self.data_size)?;
        writer.write_u24::<BigEndian>(self.timestamp_basic)?;
        writer.write_u8(self.timestamp_extended)?;
        writer.write_u24::<BigEndian>(self.stream_id)?;

        Ok(())
    }
}

/// The payload of a tag, resolved to its concrete shape.
///
/// Resolution walks the discriminants top-down, first match wins:
/// `tag_type` selects audio/video/script, then the payload modules refine on
/// `sound_format`/`codec` and `packet_type`. A tag type that matches nothing
/// lands in [`FlvTagPayload::Unknown`] with the whole payload as raw bytes —
/// that is a supported shape, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum FlvTagPayload {
    Audio(AudioData),
    Video(VideoData),
    Script(ScriptData),
    Unknown { tag_type: u8, data: Bytes },
}

impl FlvTagPayload {
    /// Decodes the payload matching `header` from a cursor bounded to
    /// exactly `header.data_size` bytes.
    ///
    /// The container owns the header; it is only consulted here, never
    /// read from or written to the payload stream.
    pub fn demux(header: &FlvTagHeader, reader: &mut io::Cursor<Bytes>) -> Result<Self, FlvError> {
        match header.tag_type {
            FlvTagType::Audio => AudioData::demux(reader)
                .map(FlvTagPayload::Audio)
                .map_err(|e| prefix_overrun(e, header.data_size)),
            FlvTagType::Video => VideoData::demux(reader)
                .map(FlvTagPayload::Video)
                .map_err(|e| prefix_overrun(e, header.data_size)),
            FlvTagType::ScriptData => ScriptData::demux(reader)
                .map(FlvTagPayload::Script)
                .map_err(FlvError::from_io),
            FlvTagType::Unknown(tag_type) => Ok(FlvTagPayload::Unknown {
                tag_type,
                data: reader.extract_remaining(),
            }),
        }
    }

    /// Serializes the typed prefix of the concrete variant followed by its
    /// raw data, exactly mirroring [`demux`](Self::demux).
    pub fn mux<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        match self {
            FlvTagPayload::Audio(audio) => audio.mux(writer),
            FlvTagPayload::Video(video) => video.mux(writer),
            FlvTagPayload::Script(script) => script.mux(writer),
            FlvTagPayload::Unknown { data, .. } => writer.write_all(data),
        }
    }
}

/// Inside the bounded payload cursor, running out of bytes means the typed
/// prefix claimed more than the declared payload size.
fn prefix_overrun(error: io::Error, data_size: u32) -> FlvError {
    if error.kind() == io::ErrorKind::UnexpectedEof {
        FlvError::TagSizeMismatch(data_size)
    } else {
        FlvError::Io(error)
    }
}

/// A self-contained FLV tag: header plus resolved payload.
#[derive(Debug, Clone, PartialEq)]
pub struct FlvTag {
    pub header: FlvTagHeader,
    pub payload: FlvTagPayload,
}

impl FlvTag {
    /// Demuxes a tag whose header is inline, advancing the reader to the
    /// end of the tag.
    pub fn demux(reader: &mut io::Cursor<Bytes>) -> Result<Self, FlvError> {
        let header = FlvTagHeader::demux(reader)?;

        // The payload gets a cursor bounded to data_size so the typed
        // prefix cannot read past its declared extent; whatever it leaves
        // behind becomes the variant's raw data.
        let body = reader
            .extract_bytes(header.data_size as usize)
            .map_err(|_| FlvError::UnexpectedEndOfInput)?;
        let payload = FlvTagPayload::demux(&header, &mut io::Cursor::new(body))?;

        Ok(FlvTag { header, payload })
    }

    /// Muxes the tag, recomputing `data_size` from the actual encoded
    /// payload length. Returns the number of bytes written (header
    /// included), which is what the file profile stores as the following
    /// previous-tag-size.
    pub fn mux<W: io::Write>(&self, writer: &mut W) -> Result<usize, FlvError> {
        let mut body = Vec::new();
        self.payload.mux(&mut body)?;

        let mut header = self.header;
        header.data_size = body.len() as u32;
        header.mux(writer)?;
        writer.write_all(&body)?;

        Ok(TAG_HEADER_SIZE + body.len())
    }

    pub fn timestamp(&self) -> u32 {
        self.header.timestamp()
    }

    pub fn is_audio_tag(&self) -> bool {
        matches!(self.payload, FlvTagPayload::Audio(_))
    }

    pub fn is_video_tag(&self) -> bool {
        matches!(self.payload, FlvTagPayload::Video(_))
    }

    pub fn is_script_tag(&self) -> bool {
        matches!(self.payload, FlvTagPayload::Script(_))
    }

    pub fn is_key_frame(&self) -> bool {
        match &self.payload {
            FlvTagPayload::Video(video) => video.is_key_frame(),
            _ => false,
        }
    }
}
