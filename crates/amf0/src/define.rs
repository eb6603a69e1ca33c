use std::borrow::Cow;

use num_derive::FromPrimitive;

/// AMF0 marker types.
/// Defined in amf0_spec_121207.pdf section 2.1
#[derive(Debug, PartialEq, Eq, Clone, Copy, FromPrimitive)]
#[repr(u8)]
pub enum Amf0Marker {
    /// number-marker
    Number = 0x00,
    /// boolean-marker
    Boolean = 0x01,
    /// string-marker
    String = 0x02,
    /// object-marker
    Object = 0x03,
    /// movieclip-marker
    ///
    /// reserved, not supported
    MovieClipMarker = 0x04,
    /// null-marker
    Null = 0x05,
    /// undefined-marker
    Undefined = 0x06,
    /// reference-marker
    Reference = 0x07,
    /// ecma-array-marker
    EcmaArray = 0x08,
    /// object-end-marker
    ObjectEnd = 0x09,
    /// strict-array-marker
    StrictArray = 0x0a,
    /// date-marker
    Date = 0x0b,
    /// long-string-marker
    LongString = 0x0c,
    /// unsupported-marker
    Unsupported = 0x0d,
    /// recordset-marker
    ///
    /// reserved, not supported
    Recordset = 0x0e,
    /// xml-document-marker
    XmlDocument = 0x0f,
    /// typed-object-marker
    TypedObject = 0x10,
    /// avmplus-object-marker
    ///
    /// AMF3 marker
    AVMPlusObject = 0x11,
}

/// AMF0 value types.
/// Defined in amf0_spec_121207.pdf section 2.2-2.18
#[derive(PartialEq, Clone, Debug)]
pub enum Amf0Value<'a> {
    /// Number Type defined section 2.2
    Number(f64),
    /// Boolean Type defined section 2.3
    Boolean(bool),
    /// String Type defined section 2.4
    String(Cow<'a, str>),
    /// Object Type defined section 2.5
    Object(Cow<'a, [(Cow<'a, str>, Amf0Value<'a>)]>),
    /// Null Type defined section 2.7
    Null,
    /// Undefined Type defined section 2.8
    Undefined,
    /// Reference Type defined section 2.9; an index into the table of
    /// previously-deserialized complex values
    Reference(u16),
    /// ECMA Array Type defined section 2.10; an associative array carrying
    /// a count hint ahead of its properties
    EcmaArray(Cow<'a, [(Cow<'a, str>, Amf0Value<'a>)]>),
    /// Object End Type defined section 2.11; the sentinel closing an object
    /// or a script-data object sequence
    ObjectEnd,
    /// StrictArray Type defined section 2.12
    StrictArray(Cow<'a, [Amf0Value<'a>]>),
    /// Date Type defined section 2.13
    Date {
        /// Milliseconds since the Unix epoch
        unix_ms: f64,
        /// Timezone offset in minutes; reserved, conventionally 0
        timezone: i16,
    },
    /// LongString Type defined section 2.14
    LongString(Cow<'a, str>),
    /// XML Document Type defined section 2.17; wire-identical to a long
    /// string
    XmlDocument(Cow<'a, str>),
    /// Typed Object Type defined section 2.18
    TypedObject {
        /// The alias registered for the class
        class_name: Cow<'a, str>,
        /// The instance properties
        properties: Cow<'a, [(Cow<'a, str>, Amf0Value<'a>)]>,
    },
}

impl Amf0Value<'_> {
    /// Get the marker of the value.
    pub fn marker(&self) -> Amf0Marker {
        match self {
            Self::Number(_) => Amf0Marker::Number,
            Self::Boolean(_) => Amf0Marker::Boolean,
            Self::String(_) => Amf0Marker::String,
            Self::Object(_) => Amf0Marker::Object,
            Self::Null => Amf0Marker::Null,
            Self::Undefined => Amf0Marker::Undefined,
            Self::Reference(_) => Amf0Marker::Reference,
            Self::EcmaArray(_) => Amf0Marker::EcmaArray,
            Self::ObjectEnd => Amf0Marker::ObjectEnd,
            Self::StrictArray(_) => Amf0Marker::StrictArray,
            Self::Date { .. } => Amf0Marker::Date,
            Self::LongString(_) => Amf0Marker::LongString,
            Self::XmlDocument(_) => Amf0Marker::XmlDocument,
            Self::TypedObject { .. } => Amf0Marker::TypedObject,
        }
    }

    /// Get the owned value, detached from the decoded buffer.
    pub fn to_owned(&self) -> Amf0Value<'static> {
        fn own_properties<'a>(
            properties: &[(Cow<'a, str>, Amf0Value<'a>)],
        ) -> Vec<(Cow<'static, str>, Amf0Value<'static>)> {
            properties
                .iter()
                .map(|(k, v)| (Cow::Owned(k.to_string()), v.to_owned()))
                .collect()
        }

        match self {
            Self::Number(n) => Amf0Value::Number(*n),
            Self::Boolean(b) => Amf0Value::Boolean(*b),
            Self::String(s) => Amf0Value::String(Cow::Owned(s.to_string())),
            Self::Object(o) => Amf0Value::Object(own_properties(o).into()),
            Self::Null => Amf0Value::Null,
            Self::Undefined => Amf0Value::Undefined,
            Self::Reference(index) => Amf0Value::Reference(*index),
            Self::EcmaArray(o) => Amf0Value::EcmaArray(own_properties(o).into()),
            Self::ObjectEnd => Amf0Value::ObjectEnd,
            Self::StrictArray(a) => {
                Amf0Value::StrictArray(a.iter().map(|v| v.to_owned()).collect())
            }
            Self::Date { unix_ms, timezone } => Amf0Value::Date {
                unix_ms: *unix_ms,
                timezone: *timezone,
            },
            Self::LongString(s) => Amf0Value::LongString(Cow::Owned(s.to_string())),
            Self::XmlDocument(s) => Amf0Value::XmlDocument(Cow::Owned(s.to_string())),
            Self::TypedObject {
                class_name,
                properties,
            } => Amf0Value::TypedObject {
                class_name: Cow::Owned(class_name.to_string()),
                properties: own_properties(properties).into(),
            },
        }
    }
}
