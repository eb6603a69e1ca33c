//! A codec for the FLV container format.
//!
//! Parses a byte stream into a typed tree of header, tag and payload
//! records and serializes the tree back to bytes. Tags resolve to their
//! concrete shape (audio/video/script, with AAC and AVC refinements) from
//! discriminant fields, and every variant keeps its undifferentiated
//! remainder so well-formed input re-encodes byte for byte.

pub mod aac;
pub mod audio;
pub mod avc;
pub mod data;
pub mod error;
pub mod file;
pub mod framing;
pub mod header;
pub mod parser;
pub mod script;
pub mod tag;
pub mod video;
pub mod writer;

pub use data::FlvData;
pub use error::FlvError;
pub use file::FlvFile;
pub use framing::SegmentTag;
pub use header::FlvHeader;
pub use parser::{FlvDecoder, FlvDecoderStream, FlvParser};
pub use tag::{FlvTag, FlvTagHeader, FlvTagPayload, FlvTagType};
pub use writer::FlvWriter;
