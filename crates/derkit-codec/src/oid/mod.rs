//! Object identifier utilities: dotted text and packed DER value forms.
//!
//! The packed form concatenates base-128 subidentifiers, the first of which
//! folds the first two arcs together as `40·a + b`. Decoding is strict:
//! truncated or non-minimal subidentifiers and arcs beyond `u32` are
//! rejected.

use crate::encoder::Encoder;
use derkit_types::DerError;

/// A parsed OID as a sequence of arc values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Oid {
    arcs: Vec<u32>,
}

impl Oid {
    /// Create an OID from arc values.
    pub fn new(arcs: &[u32]) -> Self {
        Self {
            arcs: arcs.to_vec(),
        }
    }

    /// Arc values.
    pub fn arcs(&self) -> &[u32] {
        &self.arcs
    }

    /// Parse a dotted string such as `"1.2.840.113549.1.1.1"`.
    pub fn from_dot(s: &str) -> Result<Self, DerError> {
        let mut arcs = Vec::new();
        for part in s.split('.') {
            if part.is_empty() || (part.len() > 1 && part.starts_with('0')) {
                return Err(DerError::InvalidOid);
            }
            let arc: u32 = part.parse().map_err(|_| DerError::InvalidOid)?;
            arcs.push(arc);
        }
        check_root_arcs(&arcs)?;
        Ok(Self { arcs })
    }

    /// The dotted string form.
    pub fn to_dot(&self) -> String {
        self.arcs
            .iter()
            .map(|a| a.to_string())
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Encode to the packed DER value form (content octets only).
    pub fn to_der_value(&self) -> Vec<u8> {
        let mut out = Vec::new();
        if self.arcs.len() < 2 {
            return out;
        }
        push_subid(
            &mut out,
            self.arcs[0] as u64 * 40 + self.arcs[1] as u64,
        );
        for &arc in &self.arcs[2..] {
            push_subid(&mut out, arc as u64);
        }
        out
    }

    /// Parse the packed DER value form (content octets only).
    pub fn from_der_value(data: &[u8]) -> Result<Self, DerError> {
        let mut arcs = Vec::new();
        for arc in Arcs::new(data) {
            arcs.push(arc?);
        }
        Ok(Self { arcs })
    }
}

impl std::fmt::Display for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_dot())
    }
}

fn check_root_arcs(arcs: &[u32]) -> Result<(), DerError> {
    if arcs.len() < 2 || arcs[0] > 2 || (arcs[0] < 2 && arcs[1] > 39) {
        return Err(DerError::InvalidOid);
    }
    Ok(())
}

fn push_subid(out: &mut Vec<u8>, value: u64) {
    let mut shift = 0;
    while value >> shift >= 0x80 {
        shift += 7;
    }
    while shift > 0 {
        out.push(0x80 | ((value >> shift) & 0x7F) as u8);
        shift -= 7;
    }
    out.push((value & 0x7F) as u8);
}

/// Allocation-free iterator over the arcs of a packed OID value.
///
/// Yields the split first pair, then each remaining arc; a malformed
/// subidentifier yields one `InvalidOid` and ends the iteration.
pub struct Arcs<'a> {
    data: &'a [u8],
    pos: usize,
    pending: Option<u32>,
    started: bool,
}

impl<'a> Arcs<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            pending: None,
            started: false,
        }
    }

    fn subidentifier(&mut self) -> Result<u64, DerError> {
        let mut value: u64 = 0;
        loop {
            let byte = *self.data.get(self.pos).ok_or(DerError::InvalidOid)?;
            if value == 0 && byte == 0x80 {
                // non-minimal
                return Err(DerError::InvalidOid);
            }
            if value >> 57 != 0 {
                return Err(DerError::InvalidOid);
            }
            self.pos += 1;
            value = (value << 7) | (byte & 0x7F) as u64;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
    }
}

impl Iterator for Arcs<'_> {
    type Item = Result<u32, DerError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(second) = self.pending.take() {
            return Some(Ok(second));
        }
        if self.pos >= self.data.len() {
            if self.started {
                return None;
            }
            // an empty value has no arcs at all
            self.started = true;
            return Some(Err(DerError::InvalidOid));
        }

        let value = match self.subidentifier() {
            Ok(v) => v,
            Err(e) => {
                self.pos = self.data.len();
                self.started = true;
                return Some(Err(e));
            }
        };

        if self.started {
            return Some(match u32::try_from(value) {
                Ok(arc) => Ok(arc),
                Err(_) => {
                    self.pos = self.data.len();
                    Err(DerError::InvalidOid)
                }
            });
        }

        self.started = true;
        let (first, second) = if value < 40 {
            (0, value)
        } else if value < 80 {
            (1, value - 40)
        } else {
            (2, value - 80)
        };
        match u32::try_from(second) {
            Ok(second) => {
                self.pending = Some(second);
                Some(Ok(first))
            }
            Err(_) => {
                self.pos = self.data.len();
                Some(Err(DerError::InvalidOid))
            }
        }
    }
}

/// Compare a packed OID value against arc values without allocating.
/// Malformed wire forms propagate as errors rather than comparing unequal.
pub fn arcs_match(data: &[u8], arcs: &[u32]) -> Result<bool, DerError> {
    let mut matched = true;
    let mut expected = arcs.iter();
    for arc in Arcs::new(data) {
        let arc = arc?;
        matched = matched && expected.next() == Some(&arc);
    }
    Ok(matched && expected.next().is_none())
}

/// Emit a complete OBJECT IDENTIFIER element for the given arcs.
pub fn encode_arcs(encoder: &mut Encoder, arcs: &[u32]) -> Result<(), DerError> {
    check_root_arcs(arcs)?;
    let scope = encoder.begin_scope();
    for &arc in arcs[2..].iter().rev() {
        put_subid(encoder, arc as u64);
    }
    put_subid(encoder, arcs[0] as u64 * 40 + arcs[1] as u64);
    encoder.close_scope(scope, crate::tag::Tag::OBJECT_IDENTIFIER);
    Ok(())
}

// Reversed emission: terminal octet first, then the higher groups.
fn put_subid(encoder: &mut Encoder, value: u64) {
    encoder.raw_content(&[(value & 0x7F) as u8]);
    let mut rest = value >> 7;
    while rest > 0 {
        encoder.raw_content(&[0x80 | (rest & 0x7F) as u8]);
        rest >>= 7;
    }
}
