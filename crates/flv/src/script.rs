//! Script (data object) tag payloads.
//!
//! A script payload is a sequence of named AMF0 values. Each entry is a
//! marker-less length-prefixed name followed by one value; the sequence has
//! no stored count and ends with the entry whose value is the AMF0
//! object-end sentinel, which is kept as the last element of the decoded
//! sequence.

use std::io;

use amf0::{Amf0Decoder, Amf0Encoder, Amf0ReadError, Amf0Value, Amf0WriteError};
use byteorder::{BigEndian, WriteBytesExt};
use bytes::Bytes;
use bytes_util::BytesCursorExt;
use tracing::warn;

/// A single name/value pair of a script payload.
#[derive(Debug, Clone, PartialEq)]
pub struct DataObject {
    /// The object name: a 16-bit big-endian byte length followed by that
    /// many UTF-8 bytes on the wire, with no AMF0 marker.
    pub name: String,
    pub value: Amf0Value<'static>,
}

impl DataObject {
    pub fn new(name: impl Into<String>, value: Amf0Value<'static>) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// The conventional final entry of a script payload: an empty name and
    /// the object-end sentinel.
    pub fn terminator() -> Self {
        Self {
            name: String::new(),
            value: Amf0Value::ObjectEnd,
        }
    }

    /// Whether this entry's value is the sentinel ending the sequence.
    pub fn is_terminator(&self) -> bool {
        matches!(self.value, Amf0Value::ObjectEnd)
    }
}

/// The payload of a script tag.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptData {
    /// The decoded objects, terminator included as the last element.
    pub objects: Vec<DataObject>,
    /// Payload bytes after the sentinel, preserved verbatim. Normally
    /// empty.
    pub trailer: Bytes,
}

impl ScriptData {
    pub fn new(objects: Vec<DataObject>) -> Self {
        Self {
            objects,
            trailer: Bytes::new(),
        }
    }

    /// Parses a script payload from a cursor bounded to the tag's declared
    /// data size. Fails with [`io::ErrorKind::UnexpectedEof`] if the
    /// payload runs out before the sentinel.
    pub fn demux(reader: &mut io::Cursor<Bytes>) -> io::Result<Self> {
        let buf = reader.extract_remaining();
        let mut decoder = Amf0Decoder::new(&buf);

        let mut objects = Vec::new();
        loop {
            if decoder.is_empty() {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "script data ended before the object end marker",
                ));
            }

            let name = decoder.decode_property_name().map_err(read_error)?;
            let value = decoder.decode().map_err(read_error)?;

            let done = matches!(value, Amf0Value::ObjectEnd);
            objects.push(DataObject {
                name: name.into_owned(),
                value: value.to_owned(),
            });

            if done {
                break;
            }
        }

        let trailer = buf.slice(decoder.position()..);
        if !trailer.is_empty() {
            warn!(
                bytes = trailer.len(),
                "script data continues past the object end marker"
            );
        }

        Ok(Self { objects, trailer })
    }

    /// Serializes the objects in order, then the trailer. The sentinel is
    /// not synthesized; callers provide it as the last element.
    pub fn mux<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        for object in &self.objects {
            if object.name.len() > u16::MAX as usize {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "script object name too long",
                ));
            }

            writer.write_u16::<BigEndian>(object.name.len() as u16)?;
            writer.write_all(object.name.as_bytes())?;
            Amf0Encoder::encode(writer, &object.value).map_err(write_error)?;
        }

        writer.write_all(&self.trailer)?;
        Ok(())
    }
}

fn read_error(error: Amf0ReadError) -> io::Error {
    match error {
        // Buffer exhaustion keeps its kind so callers can tell truncation
        // apart from malformed values.
        Amf0ReadError::Io(io) => io,
        other => io::Error::new(io::ErrorKind::InvalidData, other.to_string()),
    }
}

fn write_error(error: Amf0WriteError) -> io::Error {
    match error {
        Amf0WriteError::Io(io) => io,
        other => io::Error::new(io::ErrorKind::InvalidData, other.to_string()),
    }
}
