//! INTEGER impls for the fixed-width integer types.
//!
//! DER integers are minimal two's-complement big-endian: a redundant leading
//! 0x00 (before a byte with the top bit clear) or 0xFF (before a byte with
//! the top bit set) is rejected on decode and never produced on encode.

use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::schema::{Decode, Encode};
use crate::tag::Tag;
use derkit_types::DerError;

fn int_content<'a>(decoder: &mut Decoder<'a>) -> Result<&'a [u8], DerError> {
    let content = decoder.opaque(Tag::INTEGER)?;
    if content.is_empty() {
        return Err(DerError::InvalidLength);
    }
    if content.len() >= 2 {
        if content[0] == 0x00 && content[1] & 0x80 == 0 {
            return Err(DerError::NonCanonical);
        }
        if content[0] == 0xFF && content[1] & 0x80 != 0 {
            return Err(DerError::NonCanonical);
        }
    }
    Ok(content)
}

macro_rules! impl_uint {
    ($($t:ty),+) => {$(
        impl<'a> Decode<'a> for $t {
            fn decode(decoder: &mut Decoder<'a>) -> Result<Self, DerError> {
                let content = int_content(decoder)?;
                if content[0] & 0x80 != 0 {
                    // negative
                    return Err(DerError::Overflow);
                }
                let content = if content[0] == 0x00 {
                    &content[1..]
                } else {
                    content
                };
                const WIDTH: usize = ::core::mem::size_of::<$t>();
                if content.len() > WIDTH {
                    return Err(DerError::Overflow);
                }
                let mut be = [0u8; WIDTH];
                be[WIDTH - content.len()..].copy_from_slice(content);
                Ok(<$t>::from_be_bytes(be))
            }
        }

        impl Encode for $t {
            fn encode(&self, encoder: &mut Encoder) -> Result<(), DerError> {
                let be = self.to_be_bytes();
                let mut start = 0;
                while start + 1 < be.len() && be[start] == 0x00 {
                    start += 1;
                }
                let content = &be[start..];
                encoder.raw_content(content);
                if content[0] & 0x80 != 0 {
                    // pad octet keeps the value positive
                    encoder.raw_content(&[0x00]);
                    encoder.length(content.len() + 1);
                } else {
                    encoder.length(content.len());
                }
                encoder.tag(Tag::INTEGER);
                Ok(())
            }
        }
    )+};
}

macro_rules! impl_int {
    ($($t:ty),+) => {$(
        impl<'a> Decode<'a> for $t {
            fn decode(decoder: &mut Decoder<'a>) -> Result<Self, DerError> {
                let content = int_content(decoder)?;
                const WIDTH: usize = ::core::mem::size_of::<$t>();
                if content.len() > WIDTH {
                    return Err(DerError::Overflow);
                }
                let fill = if content[0] & 0x80 != 0 { 0xFF } else { 0x00 };
                let mut be = [fill; WIDTH];
                be[WIDTH - content.len()..].copy_from_slice(content);
                Ok(<$t>::from_be_bytes(be))
            }
        }

        impl Encode for $t {
            fn encode(&self, encoder: &mut Encoder) -> Result<(), DerError> {
                let be = self.to_be_bytes();
                let mut start = 0;
                while start + 1 < be.len() {
                    let redundant = (be[start] == 0x00 && be[start + 1] & 0x80 == 0)
                        || (be[start] == 0xFF && be[start + 1] & 0x80 != 0);
                    if !redundant {
                        break;
                    }
                    start += 1;
                }
                encoder.primitive(Tag::INTEGER, &be[start..]);
                Ok(())
            }
        }
    )+};
}

impl_uint!(u8, u16, u32, u64);
impl_int!(i8, i16, i32, i64);
