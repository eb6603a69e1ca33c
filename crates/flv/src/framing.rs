//! Segmented (transport) tag framing.
//!
//! Streaming transports such as RTMP chunking deliver tag headers through
//! their own side channel and hand this layer a payload stream in which
//! each tag is preceded only by a 32-bit lookback length — the byte size of
//! the previous tag including its header and trailer, kept for backward
//! navigation. The header is injected by the caller and never appears in
//! the segment bytes.

use std::io;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use bytes::Buf;
use bytes::Bytes;
use bytes_util::BytesCursorExt;

use crate::error::FlvError;
use crate::tag::{FlvTagHeader, FlvTagPayload};

/// Size of the previous-tag-size / lookback-length field in bytes.
pub const PREV_TAG_SIZE_FIELD_SIZE: usize = 4;

/// One tag of a segmented stream: the lookback length read from the
/// stream, the externally-supplied header, and the payload decoded against
/// that header.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentTag {
    /// Byte size of the immediately preceding tag, header and trailer
    /// included. Conventionally 0 for the first tag of a stream.
    pub lookback_length: u32,
    /// The tag header, as delivered by the transport. Owned here after
    /// injection but never decoded from or encoded into the segment bytes.
    pub header: FlvTagHeader,
    pub payload: FlvTagPayload,
}

impl SegmentTag {
    /// Demuxes one segment tag. `header` comes from the enclosing
    /// transport; only the lookback length and the payload are read from
    /// the stream.
    pub fn demux(header: FlvTagHeader, reader: &mut io::Cursor<Bytes>) -> Result<Self, FlvError> {
        let lookback_length = reader
            .read_u32::<BigEndian>()
            .map_err(FlvError::from_io)?;

        let body = reader
            .extract_bytes(header.data_size as usize)
            .map_err(|_| FlvError::UnexpectedEndOfInput)?;
        let payload = FlvTagPayload::demux(&header, &mut io::Cursor::new(body))?;

        Ok(Self {
            lookback_length,
            header,
            payload,
        })
    }

    /// Muxes the lookback length and the payload. The header stays on the
    /// transport side channel. Returns the number of bytes written.
    pub fn mux<W: io::Write>(&self, writer: &mut W) -> Result<usize, FlvError> {
        writer.write_u32::<BigEndian>(self.lookback_length)?;

        let mut body = Vec::new();
        self.payload.mux(&mut body)?;
        writer.write_all(&body)?;

        Ok(PREV_TAG_SIZE_FIELD_SIZE + body.len())
    }
}

/// Demuxes segment tags until the stream is exhausted, pulling one header
/// per tag from `headers`. Running out of headers while payload bytes
/// remain is the caller's framing error.
pub fn demux_all<I>(reader: &mut io::Cursor<Bytes>, headers: I) -> Result<Vec<SegmentTag>, FlvError>
where
    I: IntoIterator<Item = FlvTagHeader>,
{
    let mut headers = headers.into_iter();
    let mut tags = Vec::new();

    while reader.has_remaining() {
        let header = headers.next().ok_or(FlvError::MissingSegmentHeader)?;
        tags.push(SegmentTag::demux(header, reader)?);
    }

    Ok(tags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::{FlvTag, FlvTagType, TAG_HEADER_SIZE};

    fn audio_header(data_size: u32, timestamp: u32) -> FlvTagHeader {
        let mut header = FlvTagHeader::new(FlvTagType::Audio);
        header.data_size = data_size;
        header.set_timestamp(timestamp);
        header
    }

    #[test]
    fn test_segment_round_trip() {
        let payload = [0xAD, 0x01, 0xAA, 0xBB]; // AAC raw, 2 data bytes
        let mut bytes = 0u32.to_be_bytes().to_vec();
        bytes.extend_from_slice(&payload);

        let header = audio_header(payload.len() as u32, 42);
        let segment =
            SegmentTag::demux(header, &mut io::Cursor::new(Bytes::from(bytes.clone()))).unwrap();

        assert_eq!(segment.lookback_length, 0);
        assert_eq!(segment.header.timestamp(), 42);
        assert!(matches!(segment.payload, FlvTagPayload::Audio(_)));

        // The header never lands in the segment bytes.
        let mut out = Vec::new();
        let written = segment.mux(&mut out).unwrap();
        assert_eq!(written, bytes.len());
        assert_eq!(out, bytes);
    }

    #[test]
    fn test_payload_matches_inline_parse() {
        // The same payload resolved through the file profile and the
        // segmented profile yields the same variant.
        let payload = [0xAD, 0x00, 0x12, 0x10];

        let mut inline = Vec::new();
        inline.extend_from_slice(&[
            0x08, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        ]);
        inline.extend_from_slice(&payload);
        let tag = FlvTag::demux(&mut io::Cursor::new(Bytes::from(inline))).unwrap();

        let mut segmented = 7u32.to_be_bytes().to_vec();
        segmented.extend_from_slice(&payload);
        let segment = SegmentTag::demux(
            audio_header(payload.len() as u32, 0),
            &mut io::Cursor::new(Bytes::from(segmented)),
        )
        .unwrap();

        assert_eq!(segment.payload, tag.payload);
        assert_eq!(segment.lookback_length, 7);
    }

    #[test]
    fn test_demux_all_consumes_headers_in_order() {
        let first_payload = [0xAD, 0x01, 0x01];
        let second_payload = [0x17, 0x01, 0x00, 0x00, 0x00, 0x02];

        let mut bytes = 0u32.to_be_bytes().to_vec();
        bytes.extend_from_slice(&first_payload);
        let first_size = (PREV_TAG_SIZE_FIELD_SIZE + TAG_HEADER_SIZE + first_payload.len()) as u32;
        bytes.extend_from_slice(&first_size.to_be_bytes());
        bytes.extend_from_slice(&second_payload);

        let mut video_header = FlvTagHeader::new(FlvTagType::Video);
        video_header.data_size = second_payload.len() as u32;

        let tags = demux_all(
            &mut io::Cursor::new(Bytes::from(bytes)),
            [audio_header(first_payload.len() as u32, 0), video_header],
        )
        .unwrap();

        assert_eq!(tags.len(), 2);
        assert!(matches!(tags[0].payload, FlvTagPayload::Audio(_)));
        assert!(matches!(tags[1].payload, FlvTagPayload::Video(_)));
        assert_eq!(tags[1].lookback_length, first_size);
    }

    #[test]
    fn test_demux_all_without_enough_headers() {
        let mut bytes = 0u32.to_be_bytes().to_vec();
        bytes.extend_from_slice(&[0xAD, 0x01, 0x01]);

        let result = demux_all(&mut io::Cursor::new(Bytes::from(bytes)), []);
        assert!(matches!(result, Err(FlvError::MissingSegmentHeader)));
    }

    #[test]
    fn test_truncated_segment_payload() {
        let bytes = 0u32.to_be_bytes().to_vec(); // lookback only, no payload

        let result = SegmentTag::demux(
            audio_header(4, 0),
            &mut io::Cursor::new(Bytes::from(bytes)),
        );
        assert!(matches!(result, Err(FlvError::UnexpectedEndOfInput)));
    }
}
