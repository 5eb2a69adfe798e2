#![forbid(unsafe_code)]
#![doc = "Streaming DER decoder and single-pass encoder for ASN.1 values (ITU-T X.690)."]
//!
//! DER fixes exactly one byte sequence per value, which makes it the input of
//! choice for anything that gets signed. This crate enforces that: the
//! [`Decoder`] rejects every non-canonical form a hostile peer could send,
//! and the [`Encoder`] cannot produce one.
//!
//! The type-directed entry points are [`decode`] and [`encode`], driven by
//! the [`Decode`]/[`Encode`] traits. Schema types derive their impls through
//! [`der_sequence!`], [`der_enum!`] and [`der_oid_enum!`]; anything else
//! implements the traits by hand on top of the decoder and encoder
//! primitives.

pub mod decoder;
pub mod element;
pub mod encoder;
mod int;
pub mod schema;
pub mod tag;
mod time;
pub mod view;

#[cfg(feature = "base64")]
pub mod base64;
#[cfg(feature = "oid")]
pub mod oid;
#[cfg(feature = "pem")]
pub mod pem;

pub use decoder::{DecodeIter, Decoder};
pub use element::Element;
pub use encoder::{Encoder, Scope};
pub use schema::{Decode, Encode, FieldTag, TagMode};
pub use tag::{Class, Tag};
pub use view::{Any, BitString, Null, OctetString};

pub use derkit_types::{DateTime, DateTimeFormat, DerError};

/// Decode one top-level value of `T`; the input must hold exactly that value.
pub fn decode<'a, T: Decode<'a>>(bytes: &'a [u8]) -> Result<T, DerError> {
    let mut decoder = Decoder::new(bytes);
    let value = T::decode(&mut decoder)?;
    decoder.eof()?;
    Ok(value)
}

/// Encode one value to its DER byte sequence.
pub fn encode<T: Encode + ?Sized>(value: &T) -> Result<Vec<u8>, DerError> {
    let mut encoder = Encoder::new();
    value.encode(&mut encoder)?;
    Ok(encoder.finish())
}
