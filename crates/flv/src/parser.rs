//! Incremental, resumable FLV decoding.
//!
//! [`FlvDecoder`] implements Tokio's [`Decoder`] trait: `decode` returns
//! `Ok(None)` while the buffer lacks a complete element and only consumes
//! bytes once a whole element is available, so a caller can abandon or
//! resume a partial parse at any point with no side effects. Fully-buffered
//! callers never observe the `None`s; streaming callers feed more bytes and
//! call again.

use std::io::Cursor;
use std::path::Path;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::{Buf, BytesMut};
use futures::{Stream, StreamExt};
use tokio::io::AsyncRead;
use tokio_util::codec::{Decoder, FramedRead};
use tracing::warn;

use crate::data::FlvData;
use crate::error::FlvError;
use crate::framing::PREV_TAG_SIZE_FIELD_SIZE;
use crate::header::{FLV_HEADER_SIZE, FlvHeader};
use crate::tag::{FlvTag, TAG_HEADER_SIZE};

const BUFFER_SIZE: usize = 4 * 1024;

/// An FLV format decoder implementing Tokio's [`Decoder`] trait.
pub struct FlvDecoder {
    header_parsed: bool,
    prev_tag_size_read: bool,
}

impl FlvDecoder {
    pub fn new() -> Self {
        Self {
            header_parsed: false,
            // The first element is the header; no previous tag size
            // precedes it.
            prev_tag_size_read: true,
        }
    }
}

impl Default for FlvDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for FlvDecoder {
    type Item = FlvData;
    type Error = FlvError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if !self.header_parsed {
            if src.len() < FLV_HEADER_SIZE {
                src.reserve(FLV_HEADER_SIZE - src.len());
                return Ok(None);
            }

            // Reject garbage before trusting the data offset it carries.
            if &src[0..3] != b"FLV" {
                return Err(FlvError::InvalidSignature);
            }

            // The header extends to its declared data offset.
            let data_offset =
                u32::from_be_bytes([src[5], src[6], src[7], src[8]]) as usize;
            let header_len = data_offset.max(FLV_HEADER_SIZE);
            if src.len() < header_len {
                src.reserve(header_len - src.len());
                return Ok(None);
            }

            let header_bytes = src.split_to(header_len).freeze();
            let header = FlvHeader::demux(&mut Cursor::new(header_bytes))?;
            self.header_parsed = true;
            return Ok(Some(FlvData::Header(header)));
        }

        if !self.prev_tag_size_read {
            if src.len() < PREV_TAG_SIZE_FIELD_SIZE {
                src.reserve(PREV_TAG_SIZE_FIELD_SIZE + TAG_HEADER_SIZE - src.len());
                return Ok(None);
            }
            // Only useful for seeking backwards; skip it.
            src.advance(PREV_TAG_SIZE_FIELD_SIZE);
            self.prev_tag_size_read = true;
        }

        if src.len() < TAG_HEADER_SIZE {
            src.reserve(TAG_HEADER_SIZE - src.len());
            return Ok(None);
        }

        let data_size =
            ((src[1] as usize) << 16) | ((src[2] as usize) << 8) | (src[3] as usize);
        let total_needed = TAG_HEADER_SIZE + data_size;

        if src.len() < total_needed {
            src.reserve(total_needed - src.len());
            return Ok(None);
        }

        let tag_bytes = src.split_to(total_needed).freeze();
        match FlvTag::demux(&mut Cursor::new(tag_bytes)) {
            Ok(tag) => {
                self.prev_tag_size_read = false;
                Ok(Some(FlvData::Tag(tag)))
            }
            Err(e) => {
                warn!(error = %e, data_size, "failed to parse tag");
                Err(e)
            }
        }
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(buf)? {
            Some(frame) => Ok(Some(frame)),
            // Exhaustion at an element boundary is the normal end of the
            // stream; anything buffered beyond that is a torn element.
            None if buf.is_empty() => Ok(None),
            None => Err(FlvError::UnexpectedEndOfInput),
        }
    }
}

/// A stream of [`FlvData`] elements over any [`AsyncRead`].
pub struct FlvDecoderStream<R> {
    framed: FramedRead<R, FlvDecoder>,
}

impl<R: AsyncRead + Unpin> FlvDecoderStream<R> {
    pub fn new(reader: R) -> Self {
        Self {
            framed: FramedRead::with_capacity(reader, FlvDecoder::new(), BUFFER_SIZE),
        }
    }

    pub fn with_capacity(reader: R, capacity: usize) -> Self {
        Self {
            framed: FramedRead::with_capacity(reader, FlvDecoder::new(), capacity),
        }
    }
}

impl<R: AsyncRead + Unpin> Stream for FlvDecoderStream<R> {
    type Item = Result<FlvData, FlvError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.framed.poll_next_unpin(cx)
    }
}

pub struct FlvParser;

impl FlvParser {
    /// Opens a file and returns a stream over its elements.
    pub async fn create_decoder_stream(
        path: &Path,
    ) -> Result<impl Stream<Item = Result<FlvData, FlvError>>, std::io::Error> {
        let file = tokio::fs::File::open(path).await?;
        let reader = tokio::io::BufReader::new(file);

        Ok(FlvDecoderStream::new(reader))
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::file::FlvFile;

    fn sample_stream_bytes() -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"FLV\x01\x05");
        bytes.extend_from_slice(&9u32.to_be_bytes());
        bytes.extend_from_slice(&0u32.to_be_bytes());

        bytes.extend_from_slice(&[
            0x08, 0x00, 0x00, 0x05, 0x00, 0x00, 0x0A, 0x00, 0x00, 0x00, 0x00,
        ]);
        bytes.extend_from_slice(&[0xAD, 0x01, 0x01, 0x02, 0x03]);
        bytes.extend_from_slice(&16u32.to_be_bytes());

        bytes.extend_from_slice(&[
            0x09, 0x00, 0x00, 0x06, 0x00, 0x00, 0x14, 0x00, 0x00, 0x00, 0x00,
        ]);
        bytes.extend_from_slice(&[0x17, 0x01, 0x00, 0x00, 0x00, 0xFF]);
        bytes.extend_from_slice(&17u32.to_be_bytes());

        bytes
    }

    #[test]
    fn test_decoder_yields_header_first() {
        let mut decoder = FlvDecoder::new();
        let mut buffer = BytesMut::from(sample_stream_bytes().as_slice());

        let result = decoder.decode(&mut buffer).unwrap();
        match result {
            Some(FlvData::Header(header)) => {
                assert_eq!(header.version, 1);
                assert!(header.has_audio);
                assert!(header.has_video);
            }
            other => panic!("expected a header, got {other:?}"),
        }

        let result = decoder.decode(&mut buffer).unwrap();
        assert!(matches!(result, Some(FlvData::Tag(ref tag)) if tag.is_audio_tag()));
    }

    #[test]
    fn test_decoder_needs_more_input_without_consuming() {
        let bytes = sample_stream_bytes();
        let mut decoder = FlvDecoder::new();

        // Half a header is not enough to produce anything.
        let mut buffer = BytesMut::from(&bytes[..5]);
        assert!(decoder.decode(&mut buffer).unwrap().is_none());
        assert_eq!(buffer.len(), 5, "partial element must stay buffered");

        // Completing the buffer resumes the same in-flight element.
        buffer.extend_from_slice(&bytes[5..9]);
        let result = decoder.decode(&mut buffer).unwrap();
        assert!(matches!(result, Some(FlvData::Header(_))));
    }

    #[test]
    fn test_drip_feed_matches_buffered_parse() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let bytes = sample_stream_bytes();

        let file = FlvFile::demux(&mut Cursor::new(Bytes::from(bytes.clone()))).unwrap();

        let mut decoder = FlvDecoder::new();
        let mut buffer = BytesMut::new();
        let mut items = Vec::new();
        for byte in &bytes {
            buffer.extend_from_slice(std::slice::from_ref(byte));
            while let Some(item) = decoder.decode(&mut buffer).unwrap() {
                items.push(item);
            }
        }
        while let Some(item) = decoder.decode_eof(&mut buffer).unwrap() {
            items.push(item);
        }

        assert_eq!(items.len(), 1 + file.tags.len());
        assert_eq!(items[0], FlvData::Header(file.header.clone()));
        for (item, tag) in items[1..].iter().zip(&file.tags) {
            assert_eq!(item, &FlvData::Tag(tag.clone()));
        }
    }

    #[test]
    fn test_invalid_signature_fails_immediately() {
        let mut decoder = FlvDecoder::new();
        let mut buffer = BytesMut::from(&b"FLX\x01\x05\x00\x00\x00\x09"[..]);

        let result = decoder.decode(&mut buffer);
        assert!(matches!(result, Err(FlvError::InvalidSignature)));
    }

    #[test]
    fn test_header_extension_spans_reads() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"FLV\x01\x05");
        bytes.extend_from_slice(&13u32.to_be_bytes());
        bytes.extend_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);

        let mut decoder = FlvDecoder::new();

        // The fixed nine bytes alone are not a complete header here.
        let mut buffer = BytesMut::from(&bytes[..9]);
        assert!(decoder.decode(&mut buffer).unwrap().is_none());

        buffer.extend_from_slice(&bytes[9..]);
        match decoder.decode(&mut buffer).unwrap() {
            Some(FlvData::Header(header)) => {
                assert_eq!(header.data_offset, 13);
                assert_eq!(header.extension.len(), 4);
            }
            other => panic!("expected a header, got {other:?}"),
        }
    }

    #[test]
    fn test_eof_mid_tag_is_an_error() {
        let bytes = sample_stream_bytes();
        let mut decoder = FlvDecoder::new();
        let mut buffer = BytesMut::from(&bytes[..bytes.len() - 8]);

        // Drain the complete elements.
        while decoder.decode(&mut buffer).unwrap().is_some() {}

        let result = decoder.decode_eof(&mut buffer);
        assert!(matches!(result, Err(FlvError::UnexpectedEndOfInput)));
    }

    #[test]
    fn test_eof_at_boundary_is_clean() {
        let bytes = sample_stream_bytes();
        let mut decoder = FlvDecoder::new();
        let mut buffer = BytesMut::from(bytes.as_slice());

        while decoder.decode(&mut buffer).unwrap().is_some() {}
        assert!(decoder.decode_eof(&mut buffer).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_decoder_stream() {
        let bytes = sample_stream_bytes();
        let mut stream = FlvDecoderStream::new(Cursor::new(bytes));

        let mut items = Vec::new();
        while let Some(result) = stream.next().await {
            items.push(result.unwrap());
        }

        assert_eq!(items.len(), 3);
        assert!(items[0].is_header());
        assert!(items[1].is_tag());
        assert_eq!(items[1].timestamp(), 0x0A);
        assert!(items[2].is_key_frame());
    }

    #[tokio::test]
    async fn test_parser_missing_file() {
        let parser = FlvParser::create_decoder_stream(Path::new("does-not-exist.flv")).await;
        assert!(parser.is_err());
    }
}
