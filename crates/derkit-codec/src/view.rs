//! Borrowed views over decoded content: BIT STRING, OCTET STRING, NULL, and
//! the deferred [`Any`] element. The BOOLEAN impls live here too.

use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::schema::{Decode, Encode};
use crate::tag::Tag;
use derkit_types::DerError;

impl<'a> Decode<'a> for bool {
    fn decode(decoder: &mut Decoder<'a>) -> Result<Self, DerError> {
        let content = decoder.opaque(Tag::BOOLEAN)?;
        if content.len() != 1 {
            return Err(DerError::InvalidBool);
        }
        match content[0] {
            0x00 => Ok(false),
            0xFF => Ok(true),
            _ => Err(DerError::InvalidBool),
        }
    }
}

impl Encode for bool {
    fn encode(&self, encoder: &mut Encoder) -> Result<(), DerError> {
        encoder.primitive(Tag::BOOLEAN, &[if *self { 0xFF } else { 0x00 }]);
        Ok(())
    }
}

/// A BIT STRING: borrowed data octets plus the count of unused trailing bits.
///
/// Invariant: `unused_bits` is below 8, the low `unused_bits` bits of the
/// last data octet are zero, and empty data carries zero unused bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitString<'a> {
    unused_bits: u8,
    data: &'a [u8],
}

impl<'a> BitString<'a> {
    /// Build a bit string, validating the padding invariant.
    pub fn new(unused_bits: u8, data: &'a [u8]) -> Result<Self, DerError> {
        if unused_bits >= 8 {
            return Err(DerError::InvalidBitString);
        }
        match data.last() {
            None if unused_bits != 0 => return Err(DerError::InvalidBitString),
            Some(&last) if last & ((1 << unused_bits) - 1) != 0 => {
                return Err(DerError::InvalidBitString)
            }
            _ => {}
        }
        Ok(Self { unused_bits, data })
    }

    pub fn unused_bits(&self) -> u8 {
        self.unused_bits
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Number of bits carried.
    pub fn bit_len(&self) -> usize {
        self.data.len() * 8 - self.unused_bits as usize
    }
}

impl<'a> Decode<'a> for BitString<'a> {
    fn decode(decoder: &mut Decoder<'a>) -> Result<Self, DerError> {
        let content = decoder.opaque(Tag::BIT_STRING)?;
        let (&unused_bits, data) = content.split_first().ok_or(DerError::InvalidBitString)?;
        Self::new(unused_bits, data)
    }
}

impl Encode for BitString<'_> {
    fn encode(&self, encoder: &mut Encoder) -> Result<(), DerError> {
        encoder.raw_content(self.data);
        encoder.raw_content(&[self.unused_bits]);
        encoder.length(self.data.len() + 1);
        encoder.tag(Tag::BIT_STRING);
        Ok(())
    }
}

/// A borrowed OCTET STRING.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OctetString<'a>(pub &'a [u8]);

impl<'a> Decode<'a> for OctetString<'a> {
    fn decode(decoder: &mut Decoder<'a>) -> Result<Self, DerError> {
        Ok(Self(decoder.opaque(Tag::OCTET_STRING)?))
    }
}

impl Encode for OctetString<'_> {
    fn encode(&self, encoder: &mut Encoder) -> Result<(), DerError> {
        encoder.primitive(Tag::OCTET_STRING, self.0);
        Ok(())
    }
}

/// The ASN.1 NULL value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Null;

impl<'a> Decode<'a> for Null {
    fn decode(decoder: &mut Decoder<'a>) -> Result<Self, DerError> {
        let content = decoder.opaque(Tag::NULL)?;
        if !content.is_empty() {
            return Err(DerError::InvalidLength);
        }
        Ok(Null)
    }
}

impl Encode for Null {
    fn encode(&self, encoder: &mut Encoder) -> Result<(), DerError> {
        encoder.primitive(Tag::NULL, &[]);
        Ok(())
    }
}

/// A deferred element: whatever tag comes next, with its raw content kept
/// for later parsing. Re-encoding reproduces the element byte-exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Any<'a> {
    pub tag: Tag,
    pub content: &'a [u8],
}

impl<'a> Any<'a> {
    /// Descend into the content (for constructed elements).
    pub fn decoder(&self) -> Decoder<'a> {
        Decoder::new(self.content)
    }
}

impl<'a> Decode<'a> for Any<'a> {
    fn decode(decoder: &mut Decoder<'a>) -> Result<Self, DerError> {
        let elem = decoder.element_any()?;
        Ok(Self {
            tag: elem.tag,
            content: decoder.view(elem),
        })
    }
}

impl Encode for Any<'_> {
    fn encode(&self, encoder: &mut Encoder) -> Result<(), DerError> {
        encoder.primitive(self.tag, self.content);
        Ok(())
    }
}
