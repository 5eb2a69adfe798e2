//! Streaming DER decoder.

use core::marker::PhantomData;

use crate::element::Element;
use crate::schema::{Decode, FieldTag, TagMode};
use crate::tag::Tag;
use derkit_types::DerError;

/// A streaming DER decoder over a borrowed buffer.
///
/// The decoder owns a cursor and a scope limit; every view it hands out is a
/// sub-slice of the original input and no offset arithmetic can overflow.
/// Constructed content is decoded through a sub-decoder bounded to the
/// element's content range, so a nested scope can never read its siblings.
pub struct Decoder<'a> {
    buf: &'a [u8],
    pos: usize,
    end: usize,
    field_tag: Option<FieldTag>,
}

impl<'a> Decoder<'a> {
    /// Create a decoder over the given input.
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            pos: 0,
            end: buf.len(),
            field_tag: None,
        }
    }

    /// Absolute cursor offset within the decode input.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// True if the current scope is exhausted.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.end
    }

    /// Octets left in the current scope.
    pub fn remaining(&self) -> usize {
        self.end - self.pos
    }

    /// Move the cursor to an absolute offset.
    ///
    /// Panics if `index` lies outside the current scope; seeking is an
    /// API-level operation, never driven by decoded input.
    pub fn seek(&mut self, index: usize) {
        assert!(index <= self.end, "seek outside the current scope");
        self.pos = index;
    }

    /// Assert that the scope was consumed exactly.
    pub fn eof(&self) -> Result<(), DerError> {
        if self.pos == self.end {
            Ok(())
        } else {
            Err(DerError::NonCanonical)
        }
    }

    /// The tag of the next element, without consuming anything.
    pub fn peek_tag(&self) -> Result<Tag, DerError> {
        if self.pos >= self.end {
            return Err(DerError::EndOfStream);
        }
        let (tag, _) = Tag::parse(&self.buf[..self.end], self.pos)?;
        Ok(tag)
    }

    /// Parse the next element whatever its tag and consume it whole.
    ///
    /// A pending field-tag override still applies: an implicit override
    /// requires the wire tag to carry the override class and number, and an
    /// explicit override unwraps the outer constructed element first.
    pub fn element_any(&mut self) -> Result<Element, DerError> {
        match self.field_tag.take() {
            None => {
                let elem = Element::parse(self.buf, self.pos, self.end)?;
                self.pos = elem.end;
                Ok(elem)
            }
            Some(ft) => match ft.mode {
                TagMode::Implicit => {
                    let elem = Element::parse(self.buf, self.pos, self.end)?;
                    if elem.tag.class != ft.class || elem.tag.number != ft.number {
                        return Err(DerError::UnexpectedElement);
                    }
                    self.pos = elem.end;
                    Ok(elem)
                }
                TagMode::Explicit => {
                    let wrapper = self.element_expect(Tag {
                        class: ft.class,
                        constructed: true,
                        number: ft.number,
                    })?;
                    let inner = Element::parse(self.buf, wrapper.start, wrapper.end)?;
                    if inner.end != wrapper.end {
                        return Err(DerError::NonCanonical);
                    }
                    Ok(inner)
                }
            },
        }
    }

    /// Parse the next element and match it against `expected`, honouring a
    /// pending field-tag override.
    ///
    /// An implicit override replaces the expected class and number, keeping
    /// the constructed bit. An explicit override first consumes a constructed
    /// wrapper at the override tag, then matches the element inside it, which
    /// must fill the wrapper exactly. On a tag mismatch nothing is consumed.
    pub fn element(&mut self, expected: Tag) -> Result<Element, DerError> {
        self.element_of(&[expected])
    }

    /// Like [`element`](Self::element), for types with more than one legal
    /// tag (CHOICE-shaped values such as Time).
    pub fn element_of(&mut self, expected: &[Tag]) -> Result<Element, DerError> {
        match self.field_tag.take() {
            None => {
                let elem = Element::parse(self.buf, self.pos, self.end)?;
                if !expected.contains(&elem.tag) {
                    return Err(DerError::UnexpectedElement);
                }
                self.pos = elem.end;
                Ok(elem)
            }
            Some(ft) => match ft.mode {
                TagMode::Implicit => self.element_expect(Tag {
                    class: ft.class,
                    constructed: expected[0].constructed,
                    number: ft.number,
                }),
                TagMode::Explicit => {
                    let wrapper = self.element_expect(Tag {
                        class: ft.class,
                        constructed: true,
                        number: ft.number,
                    })?;
                    let inner = Element::parse(self.buf, wrapper.start, wrapper.end)?;
                    if !expected.contains(&inner.tag) {
                        return Err(DerError::UnexpectedElement);
                    }
                    if inner.end != wrapper.end {
                        return Err(DerError::NonCanonical);
                    }
                    Ok(inner)
                }
            },
        }
    }

    fn element_expect(&mut self, expected: Tag) -> Result<Element, DerError> {
        let elem = Element::parse(self.buf, self.pos, self.end)?;
        if elem.tag != expected {
            return Err(DerError::UnexpectedElement);
        }
        self.pos = elem.end;
        Ok(elem)
    }

    /// Borrow the content octets of an element.
    pub fn view(&self, elem: Element) -> &'a [u8] {
        &self.buf[elem.start..elem.end]
    }

    /// A sub-decoder bounded to the content of a constructed element.
    pub fn nested(&self, elem: Element) -> Decoder<'a> {
        Decoder {
            buf: self.buf,
            pos: elem.start,
            end: elem.end,
            field_tag: None,
        }
    }

    /// Read a SEQUENCE header and descend into its content.
    ///
    /// The caller decodes the fields from the returned scope and finishes
    /// with [`eof`](Self::eof) so the cursor provably lands on the declared
    /// content end.
    pub fn sequence(&mut self) -> Result<Decoder<'a>, DerError> {
        let elem = self.element(Tag::SEQUENCE)?;
        Ok(self.nested(elem))
    }

    /// Content of the next element, which must carry `expected`.
    pub fn opaque(&mut self, expected: Tag) -> Result<&'a [u8], DerError> {
        let elem = self.element(expected)?;
        Ok(self.view(elem))
    }

    /// Decode one value of `T` at the cursor.
    pub fn any<T: Decode<'a>>(&mut self) -> Result<T, DerError> {
        T::decode(self)
    }

    /// Decode a struct field, applying its tag override if any.
    pub fn field<T: Decode<'a>>(&mut self, tag: Option<FieldTag>) -> Result<T, DerError> {
        self.field_tag = tag;
        let result = T::decode(self);
        self.field_tag = None;
        result
    }

    /// Decode a defaulted struct field.
    ///
    /// The default is substituted only on schematic absence: the scope is
    /// already exhausted, or the head element's tag mismatches with nothing
    /// consumed. A present-but-malformed element propagates its error, and a
    /// present value equal to the default is rejected as `NonCanonical`:
    /// X.690 requires defaulted components to be absent from DER.
    pub fn field_with_default<T: Decode<'a> + PartialEq>(
        &mut self,
        tag: Option<FieldTag>,
        default: T,
    ) -> Result<T, DerError> {
        if self.is_empty() {
            return Ok(default);
        }
        let saved = self.pos;
        match self.field::<T>(tag) {
            Ok(value) if value == default => Err(DerError::NonCanonical),
            Ok(value) => Ok(value),
            Err(DerError::UnexpectedElement) if self.pos == saved => Ok(default),
            Err(e) => Err(e),
        }
    }

    /// Lazily decode the consecutive children of this scope, without
    /// allocating.
    pub fn iterate<T: Decode<'a>>(self) -> DecodeIter<'a, T> {
        DecodeIter {
            dec: self,
            failed: false,
            _marker: PhantomData,
        }
    }
}

/// Iterator over the children of a scope; see [`Decoder::iterate`].
///
/// Yields decoded values until the scope is exhausted; a decode error is
/// yielded once and ends the iteration.
pub struct DecodeIter<'a, T> {
    dec: Decoder<'a>,
    failed: bool,
    _marker: PhantomData<fn() -> T>,
}

impl<'a, T: Decode<'a>> Iterator for DecodeIter<'a, T> {
    type Item = Result<T, DerError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.dec.is_empty() {
            return None;
        }
        let item = self.dec.any::<T>();
        if item.is_err() {
            self.failed = true;
        }
        Some(item)
    }
}
