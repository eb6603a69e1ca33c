use std::borrow::Cow;
use std::io;

use byteorder::{BigEndian, WriteBytesExt};

use super::define::Amf0Marker;
use super::{Amf0Value, Amf0WriteError};

/// A macro to encode an AMF property key into a buffer
#[macro_export]
macro_rules! write_amf_property_key {
    ($buffer:expr, $key:expr) => {
        // write key length (u16 in big endian)
        $buffer.write_u16::<BigEndian>($key.len() as u16)?;
        // write key string bytes
        $buffer.write_all($key.as_bytes())?;
    };
}

/// AMF0 encoder.
///
/// Allows for encoding an AMF0 to some writer.
pub struct Amf0Encoder;

impl Amf0Encoder {
    /// Encode a generic AMF0 value
    pub fn encode(writer: &mut impl io::Write, value: &Amf0Value) -> Result<(), Amf0WriteError> {
        match value {
            Amf0Value::Number(val) => Self::encode_number(writer, *val),
            Amf0Value::Boolean(val) => Self::encode_bool(writer, *val),
            Amf0Value::String(val) => Self::encode_string(writer, val),
            Amf0Value::Object(val) => Self::encode_object(writer, val),
            Amf0Value::Null => Self::encode_null(writer),
            Amf0Value::Undefined => Self::encode_undefined(writer),
            Amf0Value::Reference(index) => Self::encode_reference(writer, *index),
            Amf0Value::EcmaArray(val) => Self::encode_ecma_array(writer, val),
            // The bare sentinel value, as used to terminate script-data
            // object sequences. Inside objects the sentinel is written by
            // `object_eof` together with its empty key.
            Amf0Value::ObjectEnd => {
                writer.write_u8(Amf0Marker::ObjectEnd as u8)?;
                Ok(())
            }
            Amf0Value::StrictArray(val) => Self::encode_strict_array(writer, val),
            Amf0Value::Date { unix_ms, timezone } => Self::encode_date(writer, *unix_ms, *timezone),
            Amf0Value::LongString(val) => Self::encode_long_string(writer, val),
            Amf0Value::XmlDocument(val) => Self::encode_xml_document(writer, val),
            Amf0Value::TypedObject {
                class_name,
                properties,
            } => Self::encode_typed_object(writer, class_name, properties),
        }
    }

    /// Write object end marker to signify the end of an AMF0 object
    pub fn object_eof(writer: &mut impl io::Write) -> Result<(), Amf0WriteError> {
        writer.write_u24::<BigEndian>(Amf0Marker::ObjectEnd as u32)?;
        Ok(())
    }

    /// Encode an AMF0 number
    pub fn encode_number(writer: &mut impl io::Write, value: f64) -> Result<(), Amf0WriteError> {
        writer.write_u8(Amf0Marker::Number as u8)?;
        writer.write_f64::<BigEndian>(value)?;
        Ok(())
    }

    /// Encode an AMF0 boolean
    pub fn encode_bool(writer: &mut impl io::Write, value: bool) -> Result<(), Amf0WriteError> {
        writer.write_u8(Amf0Marker::Boolean as u8)?;
        writer.write_u8(value as u8)?;
        Ok(())
    }

    /// Encode an AMF0 string
    pub fn encode_string(writer: &mut impl io::Write, value: &str) -> Result<(), Amf0WriteError> {
        if value.len() > (u16::MAX as usize) {
            return Err(Amf0WriteError::NormalStringTooLong);
        }

        writer.write_u8(Amf0Marker::String as u8)?;
        write_amf_property_key!(writer, value);
        Ok(())
    }

    /// Encode an AMF0 null
    pub fn encode_null(writer: &mut impl io::Write) -> Result<(), Amf0WriteError> {
        writer.write_u8(Amf0Marker::Null as u8)?;
        Ok(())
    }

    /// Encode an AMF0 undefined
    pub fn encode_undefined(writer: &mut impl io::Write) -> Result<(), Amf0WriteError> {
        writer.write_u8(Amf0Marker::Undefined as u8)?;
        Ok(())
    }

    /// Encode an AMF0 reference to a previously-serialized complex value
    pub fn encode_reference(
        writer: &mut impl io::Write,
        index: u16,
    ) -> Result<(), Amf0WriteError> {
        writer.write_u8(Amf0Marker::Reference as u8)?;
        writer.write_u16::<BigEndian>(index)?;
        Ok(())
    }

    /// Encode an AMF0 object
    pub fn encode_object(
        writer: &mut impl io::Write,
        properties: &[(Cow<'_, str>, Amf0Value<'_>)],
    ) -> Result<(), Amf0WriteError> {
        writer.write_u8(Amf0Marker::Object as u8)?;
        Self::encode_properties(writer, properties)?;
        Self::object_eof(writer)?;
        Ok(())
    }

    /// Encode an AMF0 ECMA array
    pub fn encode_ecma_array(
        writer: &mut impl io::Write,
        properties: &[(Cow<'_, str>, Amf0Value<'_>)],
    ) -> Result<(), Amf0WriteError> {
        writer.write_u8(Amf0Marker::EcmaArray as u8)?;
        writer.write_u32::<BigEndian>(properties.len() as u32)?;
        Self::encode_properties(writer, properties)?;
        Self::object_eof(writer)?;
        Ok(())
    }

    /// Encode an AMF0 strict array
    pub fn encode_strict_array(
        writer: &mut impl io::Write,
        values: &[Amf0Value<'_>],
    ) -> Result<(), Amf0WriteError> {
        writer.write_u8(Amf0Marker::StrictArray as u8)?;
        writer.write_u32::<BigEndian>(values.len() as u32)?;
        for value in values {
            Self::encode(writer, value)?;
        }
        Ok(())
    }

    /// Encode an AMF0 date
    pub fn encode_date(
        writer: &mut impl io::Write,
        unix_ms: f64,
        timezone: i16,
    ) -> Result<(), Amf0WriteError> {
        writer.write_u8(Amf0Marker::Date as u8)?;
        writer.write_f64::<BigEndian>(unix_ms)?;
        writer.write_i16::<BigEndian>(timezone)?;
        Ok(())
    }

    /// Encode an AMF0 long string
    pub fn encode_long_string(
        writer: &mut impl io::Write,
        value: &str,
    ) -> Result<(), Amf0WriteError> {
        writer.write_u8(Amf0Marker::LongString as u8)?;
        writer.write_u32::<BigEndian>(value.len() as u32)?;
        writer.write_all(value.as_bytes())?;
        Ok(())
    }

    /// Encode an AMF0 XML document (wire-identical to a long string apart
    /// from its marker)
    pub fn encode_xml_document(
        writer: &mut impl io::Write,
        value: &str,
    ) -> Result<(), Amf0WriteError> {
        writer.write_u8(Amf0Marker::XmlDocument as u8)?;
        writer.write_u32::<BigEndian>(value.len() as u32)?;
        writer.write_all(value.as_bytes())?;
        Ok(())
    }

    /// Encode an AMF0 typed object
    pub fn encode_typed_object(
        writer: &mut impl io::Write,
        class_name: &str,
        properties: &[(Cow<'_, str>, Amf0Value<'_>)],
    ) -> Result<(), Amf0WriteError> {
        if class_name.len() > (u16::MAX as usize) {
            return Err(Amf0WriteError::NormalStringTooLong);
        }

        writer.write_u8(Amf0Marker::TypedObject as u8)?;
        write_amf_property_key!(writer, class_name);
        Self::encode_properties(writer, properties)?;
        Self::object_eof(writer)?;
        Ok(())
    }

    fn encode_properties(
        writer: &mut impl io::Write,
        properties: &[(Cow<'_, str>, Amf0Value<'_>)],
    ) -> Result<(), Amf0WriteError> {
        for (key, value) in properties {
            if key.len() > (u16::MAX as usize) {
                return Err(Amf0WriteError::NormalStringTooLong);
            }

            write_amf_property_key!(writer, key);
            Self::encode(writer, value)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::Amf0Decoder;

    use super::*;

    #[test]
    fn test_write_number() {
        let mut amf0_number = vec![0x00];
        amf0_number.extend_from_slice(&772.161_f64.to_be_bytes());

        let mut vec = Vec::<u8>::new();
        Amf0Encoder::encode_number(&mut vec, 772.161).unwrap();

        assert_eq!(vec, amf0_number);
    }

    #[test]
    fn test_write_boolean() {
        let mut vec = Vec::<u8>::new();
        Amf0Encoder::encode_bool(&mut vec, true).unwrap();

        assert_eq!(vec, vec![0x01, 0x01]);
    }

    #[test]
    fn test_write_string() {
        let mut amf0_string = vec![0x02, 0x00, 0x0b];
        amf0_string.extend_from_slice(b"Hello World");

        let mut vec = Vec::<u8>::new();
        Amf0Encoder::encode_string(&mut vec, "Hello World").unwrap();

        assert_eq!(vec, amf0_string);
    }

    #[test]
    fn test_write_null_and_undefined() {
        let mut vec = Vec::<u8>::new();
        Amf0Encoder::encode_null(&mut vec).unwrap();
        Amf0Encoder::encode_undefined(&mut vec).unwrap();

        assert_eq!(vec, vec![0x05, 0x06]);
    }

    #[test]
    fn test_write_object() {
        let mut amf0_object = vec![0x03, 0x00, 0x04];
        amf0_object.extend_from_slice(b"test");
        amf0_object.extend_from_slice(&[0x05]);
        amf0_object.extend_from_slice(&[0x00, 0x00, 0x09]);

        let mut vec = Vec::<u8>::new();
        Amf0Encoder::encode_object(&mut vec, &[("test".into(), Amf0Value::Null)]).unwrap();

        assert_eq!(vec, amf0_object);
    }

    #[test]
    fn test_write_ecma_array() {
        let mut amf0_array = vec![0x08, 0x00, 0x00, 0x00, 0x01, 0x00, 0x04];
        amf0_array.extend_from_slice(b"test");
        amf0_array.extend_from_slice(&[0x05]);
        amf0_array.extend_from_slice(&[0x00, 0x00, 0x09]);

        let mut vec = Vec::<u8>::new();
        Amf0Encoder::encode_ecma_array(&mut vec, &[("test".into(), Amf0Value::Null)]).unwrap();

        assert_eq!(vec, amf0_array);
    }

    #[test]
    fn test_write_object_end_sentinel() {
        let mut vec = Vec::<u8>::new();
        Amf0Encoder::encode(&mut vec, &Amf0Value::ObjectEnd).unwrap();

        assert_eq!(vec, vec![0x09]);
    }

    #[test]
    fn test_encode_string_too_long() {
        let long_string = "a".repeat(u16::MAX as usize + 1);
        let mut writer = Vec::<u8>::new();
        let result = Amf0Encoder::encode_string(&mut writer, &long_string);
        assert!(matches!(result, Err(Amf0WriteError::NormalStringTooLong)));
    }

    #[test]
    fn test_encode_strict_array() {
        let mut amf0_array = vec![0x0a, 0x00, 0x00, 0x00, 0x03];
        amf0_array.extend_from_slice(&[0x00]);
        amf0_array.extend_from_slice(&1.0_f64.to_be_bytes());
        amf0_array.extend_from_slice(&[0x01, 0x01]);
        amf0_array.extend_from_slice(&[0x02, 0x00, 0x04]);
        amf0_array.extend_from_slice(b"test");

        let mut vec = Vec::<u8>::new();
        Amf0Encoder::encode_strict_array(
            &mut vec,
            &[
                Amf0Value::Number(1.0),
                Amf0Value::Boolean(true),
                Amf0Value::String(Cow::Borrowed("test")),
            ],
        )
        .unwrap();

        assert_eq!(vec, amf0_array);
    }

    #[test]
    fn test_closed_set_round_trips() {
        let values = [
            Amf0Value::Number(2.5),
            Amf0Value::Boolean(false),
            Amf0Value::String("str".into()),
            Amf0Value::Object(vec![("a".into(), Amf0Value::Number(1.0))].into()),
            Amf0Value::Null,
            Amf0Value::Undefined,
            Amf0Value::Reference(4),
            Amf0Value::EcmaArray(vec![("k".into(), Amf0Value::Boolean(true))].into()),
            Amf0Value::ObjectEnd,
            Amf0Value::StrictArray(vec![Amf0Value::Null, Amf0Value::Number(9.0)].into()),
            Amf0Value::Date {
                unix_ms: 1_700_000_000_000.0,
                timezone: 0,
            },
            Amf0Value::LongString("long".into()),
            Amf0Value::XmlDocument("<doc/>".into()),
            Amf0Value::TypedObject {
                class_name: "Thing".into(),
                properties: vec![("n".into(), Amf0Value::Number(1.0))].into(),
            },
        ];

        for value in values {
            let mut buf = Vec::new();
            Amf0Encoder::encode(&mut buf, &value).unwrap();

            let mut decoder = Amf0Decoder::new(&buf);
            let decoded = decoder.decode().unwrap().to_owned();
            assert_eq!(decoded, value, "value did not round trip");
            assert!(decoder.is_empty(), "value left bytes behind");

            // Re-encoding the decoded value reproduces the input bytes.
            let mut buf2 = Vec::new();
            Amf0Encoder::encode(&mut buf2, &decoded).unwrap();
            assert_eq!(buf2, buf);
        }
    }
}
