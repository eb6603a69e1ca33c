//! A pure-rust implementation of an AMF0 encoder and decoder.
//!
//! Values decode as references into the original byte slice wherever
//! possible, making a decode pass cheap; [`Amf0Value::to_owned`] detaches a
//! value from the buffer when it needs to outlive it.
//!
//! # Examples
//!
//! ```rust
//! # fn test() -> Result<(), Box<dyn std::error::Error>> {
//! use amf0::Amf0Decoder;
//! use amf0::Amf0Encoder;
//! # let bytes = &[0x01, 0x01];
//! # let mut writer = Vec::new();
//!
//! let mut reader = Amf0Decoder::new(bytes);
//! let value = reader.decode()?;
//!
//! Amf0Encoder::encode(&mut writer, &value)?;
//!
//! # assert_eq!(writer, bytes);
//! # Ok(())
//! # }
//! # test().expect("test failed");
//! ```
#![deny(missing_docs)]
#![deny(unsafe_code)]

mod decode;
mod define;
mod encode;
mod errors;

pub use crate::decode::Amf0Decoder;
pub use crate::define::{Amf0Marker, Amf0Value};
pub use crate::encode::Amf0Encoder;
pub use crate::errors::{Amf0ReadError, Amf0WriteError};
