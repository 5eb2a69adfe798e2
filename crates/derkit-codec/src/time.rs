//! UTCTime and GeneralizedTime wire codec for [`DateTime`].
//!
//! Strict X.690/RFC 5280 forms only: `YYMMDDhhmmssZ` (13 octets) and
//! `YYYYMMDDhhmmssZ` (15 octets). Fractional seconds and local offsets are
//! rejected in both directions.

use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::schema::{Decode, Encode};
use crate::tag::Tag;
use derkit_types::{DateTime, DateTimeFormat, DerError};

fn two_digits(content: &[u8]) -> Result<u8, DerError> {
    let (hi, lo) = (content[0], content[1]);
    if !hi.is_ascii_digit() || !lo.is_ascii_digit() {
        return Err(DerError::InvalidDateTime);
    }
    Ok((hi - b'0') * 10 + (lo - b'0'))
}

fn parse_utc(content: &[u8]) -> Result<DateTime, DerError> {
    if content.len() != 13 || content[12] != b'Z' {
        return Err(DerError::InvalidDateTime);
    }
    let yy = two_digits(&content[0..2])?;
    // RFC 5280: 50..=99 map to 19xx, 00..=49 to 20xx
    let year = if yy >= 50 {
        1900 + yy as u16
    } else {
        2000 + yy as u16
    };
    DateTime::new(
        DateTimeFormat::Utc,
        year,
        two_digits(&content[2..4])?,
        two_digits(&content[4..6])?,
        two_digits(&content[6..8])?,
        two_digits(&content[8..10])?,
        two_digits(&content[10..12])?,
    )
}

fn parse_generalized(content: &[u8]) -> Result<DateTime, DerError> {
    if content.len() != 15 || content[14] != b'Z' {
        return Err(DerError::InvalidDateTime);
    }
    let year = two_digits(&content[0..2])? as u16 * 100 + two_digits(&content[2..4])? as u16;
    DateTime::new(
        DateTimeFormat::Generalized,
        year,
        two_digits(&content[4..6])?,
        two_digits(&content[6..8])?,
        two_digits(&content[8..10])?,
        two_digits(&content[10..12])?,
        two_digits(&content[12..14])?,
    )
}

impl<'a> Decode<'a> for DateTime {
    fn decode(decoder: &mut Decoder<'a>) -> Result<Self, DerError> {
        let elem = decoder.element_of(&[Tag::UTC_TIME, Tag::GENERALIZED_TIME])?;
        let content = decoder.view(elem);
        if elem.tag == Tag::UTC_TIME {
            parse_utc(content)
        } else if elem.tag == Tag::GENERALIZED_TIME {
            parse_generalized(content)
        } else {
            // an implicit override hides the universal tag; the two forms
            // differ in length
            match content.len() {
                13 => parse_utc(content),
                15 => parse_generalized(content),
                _ => Err(DerError::InvalidDateTime),
            }
        }
    }
}

fn push_two(buf: &mut [u8], value: u8) {
    buf[0] = b'0' + value / 10;
    buf[1] = b'0' + value % 10;
}

impl Encode for DateTime {
    fn encode(&self, encoder: &mut Encoder) -> Result<(), DerError> {
        let mut ascii = [0u8; 15];
        let (tag, len) = match self.format() {
            DateTimeFormat::Utc => {
                push_two(&mut ascii[0..], (self.year() % 100) as u8);
                push_two(&mut ascii[2..], self.month());
                push_two(&mut ascii[4..], self.day());
                push_two(&mut ascii[6..], self.hour());
                push_two(&mut ascii[8..], self.minute());
                push_two(&mut ascii[10..], self.second());
                ascii[12] = b'Z';
                (Tag::UTC_TIME, 13)
            }
            DateTimeFormat::Generalized => {
                push_two(&mut ascii[0..], (self.year() / 100) as u8);
                push_two(&mut ascii[2..], (self.year() % 100) as u8);
                push_two(&mut ascii[4..], self.month());
                push_two(&mut ascii[6..], self.day());
                push_two(&mut ascii[8..], self.hour());
                push_two(&mut ascii[10..], self.minute());
                push_two(&mut ascii[12..], self.second());
                ascii[14] = b'Z';
                (Tag::GENERALIZED_TIME, 15)
            }
        };
        encoder.primitive(tag, &ascii[..len]);
        Ok(())
    }
}
