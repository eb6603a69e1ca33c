use std::io;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use bytes::Buf;
use bytes::Bytes;

use crate::error::FlvError;
use crate::header::FlvHeader;
use crate::tag::FlvTag;

/// A whole FLV file: a [`FlvHeader`] followed by the file body, which is a
/// series of self-contained [`FlvTag`]s interleaved with 32-bit
/// previous-tag-size fields.
#[derive(Debug, Clone, PartialEq)]
pub struct FlvFile {
    pub header: FlvHeader,
    pub tags: Vec<FlvTag>,
}

impl FlvFile {
    /// Demuxes an FLV file from a fully-buffered reader. The tag sequence
    /// has no stored length; it ends when the buffer is exhausted at a tag
    /// boundary.
    pub fn demux(reader: &mut io::Cursor<Bytes>) -> Result<Self, FlvError> {
        let header = FlvHeader::demux(reader)?;

        let mut tags = Vec::new();
        while reader.has_remaining() {
            // The previous tag size is only useful for seeking backwards;
            // nothing here depends on it.
            reader
                .read_u32::<BigEndian>()
                .map_err(FlvError::from_io)?;

            // Exhaustion on this boundary is the normal end of the body.
            if !reader.has_remaining() {
                break;
            }

            tags.push(FlvTag::demux(reader)?);
        }

        Ok(FlvFile { header, tags })
    }

    /// Muxes the file: header, the conventional zero before the first tag,
    /// then each tag followed by its actual encoded size.
    pub fn mux<W: io::Write>(&self, writer: &mut W) -> Result<(), FlvError> {
        self.header.mux(writer)?;
        writer.write_u32::<BigEndian>(0)?;

        for tag in &self.tags {
            let written = tag.mux(writer)?;
            writer.write_u32::<BigEndian>(written as u32)?;
        }

        Ok(())
    }
}
