use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlvError {
    #[error("invalid FLV signature")]
    InvalidSignature,
    #[error("header data offset {declared} does not match encoded header length {actual}")]
    HeaderSizeMismatch { declared: u32, actual: u32 },
    #[error("tag prefix overruns the declared payload size of {0} bytes")]
    TagSizeMismatch(u32),
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,
    #[error("segment stream holds more tags than supplied headers")]
    MissingSegmentHeader,
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl FlvError {
    /// Maps a read-side I/O failure, turning buffer exhaustion into the
    /// end-of-input error.
    pub(crate) fn from_io(error: io::Error) -> Self {
        if error.kind() == io::ErrorKind::UnexpectedEof {
            FlvError::UnexpectedEndOfInput
        } else {
            FlvError::Io(error)
        }
    }
}
