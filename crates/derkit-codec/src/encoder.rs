//! Single-pass DER encoder over a reverse-growing buffer.

use crate::schema::{Encode, FieldTag, TagMode};
use crate::tag::Tag;
use derkit_types::DerError;

/// Marks the start of an enclosing scope; returned by
/// [`Encoder::begin_scope`] and consumed by [`Encoder::close_scope`].
#[derive(Debug, Clone, Copy)]
pub struct Scope(usize);

/// A single-pass DER encoder.
///
/// Lengths precede content on the wire but are only known once the content
/// exists, so the encoder builds its output back to front: every push lands
/// in output-reversed order and [`finish`](Self::finish) reverses the buffer
/// once. Consequences for writers:
///
/// - a primitive element is written content first, then length, then tag
///   (which [`primitive`](Self::primitive) packages up);
/// - composite values are written **last element first**;
/// - a scope is opened *after* nothing and closed *around* everything written
///   in between: `close_scope` injects the length of that span and the tag.
///
/// One pass, one allocation, O(n) total work.
pub struct Encoder {
    buf: Vec<u8>,
}

impl Encoder {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Consume the encoder and return the encoded bytes in wire order.
    pub fn finish(mut self) -> Vec<u8> {
        self.buf.reverse();
        self.buf
    }

    /// Octets produced so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    fn byte(&mut self, b: u8) {
        self.buf.push(b);
    }

    /// Raw content octets, emitted verbatim in wire order.
    pub fn raw_content(&mut self, bytes: &[u8]) {
        self.buf.extend(bytes.iter().rev());
    }

    /// DER length octets for `n`: single octet below 128, else the minimal
    /// big-endian long form.
    pub fn length(&mut self, mut n: usize) {
        if n < 0x80 {
            self.byte(n as u8);
            return;
        }
        let mut count = 0u8;
        while n > 0 {
            self.byte(n as u8);
            n >>= 8;
            count += 1;
        }
        self.byte(0x80 | count);
    }

    /// Identifier octets for `tag`.
    pub fn tag(&mut self, tag: Tag) {
        if tag.number <= 0x1E {
            self.byte(tag.first_octet_bits() | tag.number as u8);
        } else {
            let mut n = tag.number;
            self.byte((n & 0x7F) as u8);
            n >>= 7;
            while n > 0 {
                self.byte(0x80 | (n & 0x7F) as u8);
                n >>= 7;
            }
            self.byte(tag.first_octet_bits() | 0x1F);
        }
    }

    /// Mark the start of a scope.
    pub fn begin_scope(&mut self) -> Scope {
        Scope(self.buf.len())
    }

    /// Close a scope: inject the length of the span written since `scope`,
    /// then the identifier octets of `tag`.
    pub fn close_scope(&mut self, scope: Scope, tag: Tag) {
        assert!(
            scope.0 <= self.buf.len(),
            "close_scope does not match a begin_scope on this encoder"
        );
        let span = self.buf.len() - scope.0;
        self.length(span);
        self.tag(tag);
    }

    /// One complete primitive element.
    pub fn primitive(&mut self, tag: Tag, content: &[u8]) {
        self.raw_content(content);
        self.length(content.len());
        self.tag(tag);
    }

    /// Encode one value of `T`.
    pub fn any<T: Encode + ?Sized>(&mut self, value: &T) -> Result<(), DerError> {
        value.encode(self)
    }

    /// Encode a struct field, applying its tag override if any.
    ///
    /// An explicit override wraps the value in a constructed element at the
    /// override tag; an implicit override rewrites the value's outermost
    /// identifier octets, keeping the constructed bit. A value that emitted
    /// nothing (an omitted optional) gets neither wrapper nor re-tag.
    pub fn field<T: Encode + ?Sized>(
        &mut self,
        value: &T,
        tag: Option<FieldTag>,
    ) -> Result<(), DerError> {
        let Some(ft) = tag else {
            return value.encode(self);
        };
        let before = self.buf.len();
        match ft.mode {
            TagMode::Explicit => {
                let scope = self.begin_scope();
                value.encode(self)?;
                if self.buf.len() == before {
                    return Ok(());
                }
                self.close_scope(
                    scope,
                    Tag {
                        class: ft.class,
                        constructed: true,
                        number: ft.number,
                    },
                );
            }
            TagMode::Implicit => {
                value.encode(self)?;
                if self.buf.len() == before {
                    return Ok(());
                }
                self.retag(ft);
            }
        }
        Ok(())
    }

    /// Encode a defaulted struct field; a value equal to the default is
    /// omitted entirely (the DER rule).
    pub fn field_with_default<T: Encode + PartialEq + ?Sized>(
        &mut self,
        value: &T,
        tag: Option<FieldTag>,
        default: &T,
    ) -> Result<(), DerError> {
        if value == default {
            return Ok(());
        }
        self.field(value, tag)
    }

    /// Replace the identifier octets of the value just written, keeping its
    /// constructed bit. The outermost identifier octets are the most recently
    /// pushed bytes of the reversed buffer.
    fn retag(&mut self, ft: FieldTag) {
        let Some(first) = self.buf.pop() else {
            unreachable!("retag requires a previously written element");
        };
        let constructed = first & 0x20 != 0;
        if first & 0x1F == 0x1F {
            while let Some(b) = self.buf.pop() {
                if b & 0x80 == 0 {
                    break;
                }
            }
        }
        self.tag(Tag {
            class: ft.class,
            constructed,
            number: ft.number,
        });
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}
