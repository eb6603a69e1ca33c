use std::fmt::Display;
use std::io;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use bytes::Bytes;
use bytes_util::{BitReader, BitWriter, BytesCursorExt};

use crate::error::FlvError;

/// Size of the fixed part of the FLV header, excluding any extension bytes.
pub const FLV_HEADER_SIZE: usize = 9;

/// The file-level FLV header.
///
/// The fixed nine bytes may be followed by extension bytes up to
/// `data_offset`; encoders before the body proper may stash vendor data
/// there, so those bytes are preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlvHeader {
    /// The FLV format version, usually 0x01.
    pub version: u8,
    /// Whether the stream contains audio tags.
    pub has_audio: bool,
    /// Whether the stream contains video tags.
    pub has_video: bool,
    /// Byte offset from the start of the header to the start of the body.
    /// Always `9 + extension.len()`.
    pub data_offset: u32,
    /// Bytes between the fixed fields and `data_offset`, preserved verbatim.
    pub extension: Bytes,
}

impl FlvHeader {
    /// Creates a standard nine-byte header with no extension.
    pub fn new(has_audio: bool, has_video: bool) -> Self {
        Self {
            version: 1,
            has_audio,
            has_video,
            data_offset: FLV_HEADER_SIZE as u32,
            extension: Bytes::new(),
        }
    }

    /// Parses the FLV header from a byte stream.
    ///
    /// A bad signature restores the cursor to where it started so no input
    /// is consumed. All other failures leave the cursor wherever the failing
    /// read stopped.
    pub fn demux(reader: &mut io::Cursor<Bytes>) -> Result<Self, FlvError> {
        let start = reader.position();

        let signature = reader
            .read_u24::<BigEndian>()
            .map_err(FlvError::from_io)?;

        // 'FLV' in ASCII
        if signature != 0x46_4C_56 {
            reader.set_position(start);
            return Err(FlvError::InvalidSignature);
        }

        let version = reader.read_u8().map_err(FlvError::from_io)?;

        let (has_audio, has_video) = {
            let mut bits = BitReader::new(&mut *reader);
            // 5 reserved bits, discarded without validation
            bits.read_bits(5).map_err(FlvError::from_io)?;
            let has_audio = bits.read_bit().map_err(FlvError::from_io)?;
            // 1 reserved bit
            bits.read_bit().map_err(FlvError::from_io)?;
            let has_video = bits.read_bit().map_err(FlvError::from_io)?;
            (has_audio, has_video)
        };

        let data_offset = reader
            .read_u32::<BigEndian>()
            .map_err(FlvError::from_io)?;

        if (data_offset as usize) < FLV_HEADER_SIZE {
            return Err(FlvError::HeaderSizeMismatch {
                declared: data_offset,
                actual: FLV_HEADER_SIZE as u32,
            });
        }

        let extension = reader
            .extract_bytes(data_offset as usize - FLV_HEADER_SIZE)
            .map_err(FlvError::from_io)?;

        Ok(FlvHeader {
            version,
            has_audio,
            has_video,
            data_offset,
            extension,
        })
    }

    /// Serializes the header.
    ///
    /// `data_offset` must equal the actual encoded length, i.e.
    /// `9 + extension.len()`.
    pub fn mux<W: io::Write>(&self, writer: &mut W) -> Result<(), FlvError> {
        let actual = (FLV_HEADER_SIZE + self.extension.len()) as u32;
        if self.data_offset != actual {
            return Err(FlvError::HeaderSizeMismatch {
                declared: self.data_offset,
                actual,
            });
        }

        writer.write_all(b"FLV")?;
        writer.write_u8(self.version)?;

        let mut bits = BitWriter::new(&mut *writer);
        bits.write_bits(0, 5)?;
        bits.write_bit(self.has_audio)?;
        bits.write_bit(false)?;
        bits.write_bit(self.has_video)?;

        writer.write_u32::<BigEndian>(self.data_offset)?;
        writer.write_all(&self.extension)?;

        Ok(())
    }
}

impl Display for FlvHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "FLV v{} [audio: {}, video: {}, data offset: {}]",
            self.version, self.has_audio, self.has_video, self.data_offset
        )
    }
}
