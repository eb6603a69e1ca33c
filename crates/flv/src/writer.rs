//! Serialization of whole FLV streams.

use std::borrow::Cow;
use std::io;

use amf0::Amf0Value;
use byteorder::{BigEndian, WriteBytesExt};
use bytes::Bytes;

use crate::error::FlvError;
use crate::header::FlvHeader;
use crate::script::{DataObject, ScriptData};
use crate::tag::{FlvTag, FlvTagHeader, FlvTagPayload, FlvTagType, TAG_HEADER_SIZE};

/// Writes an FLV stream: one header, then tags, each followed by its
/// previous-tag-size field.
pub struct FlvWriter<W: io::Write> {
    writer: W,
    has_audio: bool,
    has_video: bool,
    previous_tag_size: u32,
}

impl<W: io::Write> FlvWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            has_audio: false,
            has_video: false,
            previous_tag_size: 0,
        }
    }

    /// Writes the file-level header followed by the zero previous-tag-size
    /// that precedes the first tag. Call once, before any tag.
    pub fn write_header(&mut self, header: &FlvHeader) -> Result<(), FlvError> {
        header.mux(&mut self.writer)?;
        self.writer.write_u32::<BigEndian>(0)?;

        self.has_audio = header.has_audio;
        self.has_video = header.has_video;
        self.previous_tag_size = 0;
        Ok(())
    }

    /// Writes a typed tag and its trailer. The trailer carries the tag's
    /// actual encoded size, whatever its in-memory header claimed.
    pub fn write_tag(&mut self, tag: &FlvTag) -> Result<(), FlvError> {
        let written = tag.mux(&mut self.writer)?;
        self.previous_tag_size = written as u32;
        self.writer
            .write_u32::<BigEndian>(self.previous_tag_size)?;
        Ok(())
    }

    /// Writes a tag from already-encoded payload bytes under the given type
    /// and timestamp.
    pub fn write_raw_tag(
        &mut self,
        tag_type: FlvTagType,
        data: Bytes,
        timestamp_ms: u32,
    ) -> Result<(), FlvError> {
        let mut header = FlvTagHeader::new(tag_type);
        header.data_size = data.len() as u32;
        header.set_timestamp(timestamp_ms);

        header.mux(&mut self.writer)?;
        self.writer.write_all(&data)?;

        self.previous_tag_size = (TAG_HEADER_SIZE + data.len()) as u32;
        self.writer
            .write_u32::<BigEndian>(self.previous_tag_size)?;
        Ok(())
    }

    /// Writes raw audio payload bytes. Fails if the header written earlier
    /// did not announce audio.
    pub fn write_audio(&mut self, data: Bytes, timestamp_ms: u32) -> Result<(), FlvError> {
        if !self.has_audio {
            return Err(FlvError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                "FLV stream not configured for audio",
            )));
        }

        self.write_raw_tag(FlvTagType::Audio, data, timestamp_ms)
    }

    /// Writes raw video payload bytes. Fails if the header written earlier
    /// did not announce video.
    pub fn write_video(&mut self, data: Bytes, timestamp_ms: u32) -> Result<(), FlvError> {
        if !self.has_video {
            return Err(FlvError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                "FLV stream not configured for video",
            )));
        }

        self.write_raw_tag(FlvTagType::Video, data, timestamp_ms)
    }

    /// Writes a script tag carrying numeric metadata under `name` (e.g.
    /// "onMetaData"), with the terminating sentinel appended.
    pub fn write_metadata(
        &mut self,
        name: &str,
        properties: &[(&str, f64)],
    ) -> Result<(), FlvError> {
        let properties: Vec<(Cow<'static, str>, Amf0Value<'static>)> = properties
            .iter()
            .map(|(key, value)| {
                (
                    Cow::Owned(key.to_string()),
                    Amf0Value::Number(*value),
                )
            })
            .collect();

        let script = ScriptData::new(vec![
            DataObject::new(name, Amf0Value::EcmaArray(properties.into())),
            DataObject::terminator(),
        ]);

        let tag = FlvTag {
            header: FlvTagHeader::new(FlvTagType::ScriptData),
            payload: FlvTagPayload::Script(script),
        };
        self.write_tag(&tag)
    }

    /// The size field written after the most recent tag.
    pub fn previous_tag_size(&self) -> u32 {
        self.previous_tag_size
    }

    /// Flushes any buffered data to the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Consumes the `FlvWriter`, flushing and returning the wrapped writer.
    pub fn into_inner(mut self) -> io::Result<W> {
        self.flush()?;
        Ok(self.writer)
    }
}
