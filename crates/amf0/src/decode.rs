use std::borrow::Cow;
use std::io::{Cursor, Seek, SeekFrom};

use byteorder::{BigEndian, ReadBytesExt};
use num_traits::FromPrimitive;

use super::{Amf0Marker, Amf0ReadError, Amf0Value};

/// An AMF0 Decoder.
///
/// This decoder takes a reference to a byte slice and reads the AMF0 data
/// from it. All returned objects are references to the original byte slice,
/// making it very cheap to use.
pub struct Amf0Decoder<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> Amf0Decoder<'a> {
    /// Create a new AMF0 decoder.
    pub const fn new(buff: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(buff),
        }
    }

    /// Check if the decoder has reached the end of the AMF0 data.
    pub const fn is_empty(&self) -> bool {
        self.cursor.get_ref().len() == self.cursor.position() as usize
    }

    /// The byte offset of the next unread byte.
    pub const fn position(&self) -> usize {
        self.cursor.position() as usize
    }

    fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], Amf0ReadError> {
        let pos = self.cursor.position();
        self.cursor.seek(SeekFrom::Current(len as i64))?;
        self.cursor
            .get_ref()
            .get(pos as usize..pos as usize + len)
            .ok_or_else(|| {
                Amf0ReadError::Io(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "not enough bytes",
                ))
            })
    }

    /// Read all the encoded values from the decoder.
    /// Returns both successfully decoded values and any error that occurred.
    pub fn decode_all(&mut self) -> (Vec<Amf0Value<'a>>, Option<Amf0ReadError>) {
        let mut results = vec![];

        while !self.is_empty() {
            match self.decode() {
                Ok(value) => results.push(value),
                Err(err) => return (results, Some(err)),
            }
        }

        (results, None)
    }

    /// Read the next encoded value from the decoder.
    ///
    /// A bare object-end marker decodes as [`Amf0Value::ObjectEnd`]; it is
    /// the sentinel that terminates script-data object sequences.
    pub fn decode(&mut self) -> Result<Amf0Value<'a>, Amf0ReadError> {
        let marker = self.cursor.read_u8()?;
        let marker = Amf0Marker::from_u8(marker).ok_or(Amf0ReadError::UnknownMarker(marker))?;

        match marker {
            Amf0Marker::Number => Ok(Amf0Value::Number(self.read_number()?)),
            Amf0Marker::Boolean => Ok(Amf0Value::Boolean(self.read_bool()?)),
            Amf0Marker::String => Ok(Amf0Value::String(self.read_string()?)),
            Amf0Marker::Object => Ok(Amf0Value::Object(self.read_object()?.into())),
            Amf0Marker::Null => Ok(Amf0Value::Null),
            Amf0Marker::Undefined => Ok(Amf0Value::Undefined),
            Amf0Marker::Reference => Ok(Amf0Value::Reference(self.cursor.read_u16::<BigEndian>()?)),
            Amf0Marker::EcmaArray => Ok(Amf0Value::EcmaArray(self.read_ecma_array()?.into())),
            Amf0Marker::ObjectEnd => Ok(Amf0Value::ObjectEnd),
            Amf0Marker::StrictArray => Ok(Amf0Value::StrictArray(self.read_strict_array()?.into())),
            Amf0Marker::Date => {
                let unix_ms = self.cursor.read_f64::<BigEndian>()?;
                let timezone = self.cursor.read_i16::<BigEndian>()?;
                Ok(Amf0Value::Date { unix_ms, timezone })
            }
            Amf0Marker::LongString => Ok(Amf0Value::LongString(self.read_long_string()?)),
            Amf0Marker::XmlDocument => Ok(Amf0Value::XmlDocument(self.read_long_string()?)),
            Amf0Marker::TypedObject => {
                let class_name = self.read_string()?;
                let properties = self.read_object()?;
                Ok(Amf0Value::TypedObject {
                    class_name,
                    properties: properties.into(),
                })
            }
            _ => Err(Amf0ReadError::UnsupportedType(marker)),
        }
    }

    /// Read the next encoded value from the decoder and check if it matches
    /// the specified marker.
    pub fn decode_with_type(
        &mut self,
        specified_marker: Amf0Marker,
    ) -> Result<Amf0Value<'a>, Amf0ReadError> {
        let marker = self.cursor.read_u8()?;
        self.cursor.seek(SeekFrom::Current(-1))?; // seek back to the original position

        let marker = Amf0Marker::from_u8(marker).ok_or(Amf0ReadError::UnknownMarker(marker))?;
        if marker != specified_marker {
            return Err(Amf0ReadError::WrongType {
                expected: specified_marker,
                got: marker,
            });
        }

        self.decode()
    }

    /// Read a marker-less length-prefixed string: a 16-bit big-endian byte
    /// length followed by that many UTF-8 bytes. Object property keys use
    /// this layout, as do FLV script-data object names.
    pub fn decode_property_name(&mut self) -> Result<Cow<'a, str>, Amf0ReadError> {
        self.read_string()
    }

    fn read_number(&mut self) -> Result<f64, Amf0ReadError> {
        Ok(self.cursor.read_f64::<BigEndian>()?)
    }

    fn read_bool(&mut self) -> Result<bool, Amf0ReadError> {
        Ok(self.cursor.read_u8()? > 0)
    }

    fn read_string(&mut self) -> Result<Cow<'a, str>, Amf0ReadError> {
        let l = self.cursor.read_u16::<BigEndian>()?;
        let bytes = self.read_bytes(l as usize)?;

        Ok(Cow::Borrowed(std::str::from_utf8(bytes)?))
    }

    fn is_read_object_eof(&mut self) -> Result<bool, Amf0ReadError> {
        let pos = self.cursor.position();
        let marker = self
            .cursor
            .read_u24::<BigEndian>()
            .map(Amf0Marker::from_u32);

        match marker {
            Ok(Some(Amf0Marker::ObjectEnd)) => Ok(true),
            _ => {
                self.cursor.seek(SeekFrom::Start(pos))?;
                Ok(false)
            }
        }
    }

    fn read_object(&mut self) -> Result<Vec<(Cow<'a, str>, Amf0Value<'a>)>, Amf0ReadError> {
        let mut properties = Vec::new();

        loop {
            if self.is_read_object_eof()? {
                break;
            }

            let key = self.read_string()?;
            let val = self.decode()?;

            properties.push((key, val));
        }

        Ok(properties)
    }

    fn read_ecma_array(&mut self) -> Result<Vec<(Cow<'a, str>, Amf0Value<'a>)>, Amf0ReadError> {
        let len = self.cursor.read_u32::<BigEndian>()?;

        let mut properties = Vec::new();

        for _ in 0..len {
            let key = self.read_string()?;
            let val = self.decode()?;
            properties.push((key, val));
        }

        // Sometimes the object end marker is present and sometimes it is not.
        // If it is there just read it, if not then we are done.
        self.is_read_object_eof().ok(); // ignore the result

        Ok(properties)
    }

    fn read_long_string(&mut self) -> Result<Cow<'a, str>, Amf0ReadError> {
        let l = self.cursor.read_u32::<BigEndian>()?;

        let buff = self.read_bytes(l as usize)?;
        let val = std::str::from_utf8(buff)?;

        Ok(Cow::Borrowed(val))
    }

    fn read_strict_array(&mut self) -> Result<Vec<Amf0Value<'a>>, Amf0ReadError> {
        let len = self.cursor.read_u32::<BigEndian>()?;

        let mut values = Vec::with_capacity(len.min(1024) as usize);

        for _ in 0..len {
            values.push(self.decode()?);
        }

        Ok(values)
    }
}

impl<'a> Iterator for Amf0Decoder<'a> {
    type Item = Result<Amf0Value<'a>, Amf0ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.is_empty() {
            return None;
        }

        Some(self.decode())
    }
}
