//! One TLV header: tag, DER length, bounds-checked content range.

use crate::tag::Tag;
use derkit_types::DerError;

/// A parsed element: its tag and the `[start, end)` content range within the
/// decode input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Element {
    pub tag: Tag,
    pub start: usize,
    pub end: usize,
}

impl Element {
    /// Content length in octets.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Parse the header at `index`, keeping the whole element inside
    /// `buf[..limit]`.
    ///
    /// DER length rules: the short form covers 0..=127; the long form must
    /// use the minimum number of octets, never encodes a value below 128, and
    /// the indefinite form is rejected outright. All offset arithmetic is
    /// overflow-checked so a hostile length can never move the cursor out of
    /// bounds.
    pub(crate) fn parse(buf: &[u8], index: usize, limit: usize) -> Result<Element, DerError> {
        debug_assert!(limit <= buf.len());
        let bounded = &buf[..limit];
        if index >= limit {
            return Err(DerError::EndOfStream);
        }

        let (tag, tag_len) = Tag::parse(bounded, index)?;
        let mut pos = index + tag_len;

        let first = *bounded.get(pos).ok_or(DerError::EndOfStream)?;
        pos += 1;

        let length = if first < 0x80 {
            first as usize
        } else {
            let count = (first & 0x7F) as usize;
            if count == 0 || count > core::mem::size_of::<usize>() {
                // 0x80 alone is the indefinite form
                return Err(DerError::InvalidLength);
            }
            if pos + count > limit {
                return Err(DerError::EndOfStream);
            }
            let octets = &bounded[pos..pos + count];
            if octets[0] == 0x00 {
                return Err(DerError::InvalidLength);
            }
            let mut value = 0usize;
            for &b in octets {
                value = (value << 8) | b as usize;
            }
            if value < 0x80 {
                // would fit the short form
                return Err(DerError::InvalidLength);
            }
            pos += count;
            value
        };

        let end = pos.checked_add(length).ok_or(DerError::InvalidLength)?;
        if end > limit {
            return Err(DerError::InvalidLength);
        }

        Ok(Element {
            tag,
            start: pos,
            end,
        })
    }
}
