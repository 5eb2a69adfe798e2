//! The type-directed driver: decode/encode traits, per-field tag overrides,
//! and the macros that derive schema impls.

use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::tag::Class;
use derkit_types::DerError;

/// A type that can be decoded from one DER element.
///
/// An implementation takes full responsibility for cursor advancement over
/// exactly one element. The generic impls in this crate cover booleans, the
/// fixed-width integers, [`Option`], the borrowed views, and everything the
/// [`der_sequence!`](crate::der_sequence), [`der_enum!`](crate::der_enum) and
/// [`der_oid_enum!`](crate::der_oid_enum) macros generate.
pub trait Decode<'a>: Sized {
    fn decode(decoder: &mut Decoder<'a>) -> Result<Self, DerError>;
}

/// A type that can be encoded as one DER element.
///
/// An implementation emits exactly the bytes for the value. Remember that the
/// encoder writes back to front: composite impls write their last element
/// first and close a scope around the span (see [`Encoder`]).
pub trait Encode {
    fn encode(&self, encoder: &mut Encoder) -> Result<(), DerError>;
}

/// How a field-tag override rewrites the wire form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagMode {
    /// Replace the element's tag with the override.
    Implicit,
    /// Wrap the element in an outer constructed tag.
    Explicit,
}

/// A per-field tag override: `[class number]` in the given mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldTag {
    pub class: Class,
    pub number: u32,
    pub mode: TagMode,
}

impl FieldTag {
    /// `[number] IMPLICIT`, context-specific.
    pub const fn implicit(number: u32) -> Self {
        FieldTag {
            class: Class::ContextSpecific,
            number,
            mode: TagMode::Implicit,
        }
    }

    /// `[number] EXPLICIT`, context-specific.
    pub const fn explicit(number: u32) -> Self {
        FieldTag {
            class: Class::ContextSpecific,
            number,
            mode: TagMode::Explicit,
        }
    }

    /// The same override in another tag class.
    pub const fn with_class(self, class: Class) -> Self {
        FieldTag {
            class,
            number: self.number,
            mode: self.mode,
        }
    }
}

impl<'a, T: Decode<'a>> Decode<'a> for Option<T> {
    /// `None` on schematic absence: the scope is exhausted, or the head
    /// element's tag mismatches with nothing consumed. Every other error
    /// propagates.
    fn decode(decoder: &mut Decoder<'a>) -> Result<Self, DerError> {
        if decoder.is_empty() {
            return Ok(None);
        }
        let saved = decoder.position();
        match T::decode(decoder) {
            Ok(value) => Ok(Some(value)),
            Err(DerError::UnexpectedElement) if decoder.position() == saved => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl<T: Encode> Encode for Option<T> {
    fn encode(&self, encoder: &mut Encoder) -> Result<(), DerError> {
        match self {
            Some(value) => value.encode(encoder),
            None => Ok(()),
        }
    }
}

/// Derive [`Decode`] and [`Encode`] for a SEQUENCE-shaped struct.
///
/// Field syntax, in declaration order:
///
/// ```text
/// der_sequence! {
///     pub struct TbsThing<'a> {
///         @explicit(0) version: Version = Version::V1,
///         serial: u64,
///         @implicit(1) nickname: Option<OctetString<'a>>,
///     }
/// }
/// ```
///
/// `@implicit(n)`/`@explicit(n)` attach a context-specific tag override and
/// `= expr` declares a DER DEFAULT: the field decodes to the default when
/// schematically absent and is omitted from the encoding when equal to it.
#[macro_export]
macro_rules! der_sequence {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident<$lt:lifetime> {
            $(
                $(#[$fmeta:meta])*
                $(@$fmode:ident($ftag:literal))? $fname:ident : $fty:ty $(= $fdefault:expr)?
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        $vis struct $name<$lt> {
            $( $(#[$fmeta])* pub $fname: $fty, )+
        }

        impl<$lt> $crate::Decode<$lt> for $name<$lt> {
            fn decode(
                decoder: &mut $crate::Decoder<$lt>,
            ) -> ::core::result::Result<Self, $crate::DerError> {
                let mut scope = decoder.sequence()?;
                $(
                    let $fname = $crate::__der_decode_field!(
                        scope,
                        $fty,
                        ($crate::__der_field_tag!($(@$fmode($ftag))?))
                        $(, $fdefault)?
                    );
                )+
                scope.eof()?;
                ::core::result::Result::Ok(Self { $( $fname, )+ })
            }
        }

        impl<$lt> $crate::Encode for $name<$lt> {
            fn encode(
                &self,
                encoder: &mut $crate::Encoder,
            ) -> ::core::result::Result<(), $crate::DerError> {
                let scope = encoder.begin_scope();
                $crate::__der_encode_fields!(
                    self, encoder;
                    $( [ ($crate::__der_field_tag!($(@$fmode($ftag))?)) $fname $(= $fdefault)? ] )+
                );
                encoder.close_scope(scope, $crate::Tag::SEQUENCE);
                ::core::result::Result::Ok(())
            }
        }
    };

    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                $(@$fmode:ident($ftag:literal))? $fname:ident : $fty:ty $(= $fdefault:expr)?
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        $vis struct $name {
            $( $(#[$fmeta])* pub $fname: $fty, )+
        }

        impl<'der> $crate::Decode<'der> for $name {
            fn decode(
                decoder: &mut $crate::Decoder<'der>,
            ) -> ::core::result::Result<Self, $crate::DerError> {
                let mut scope = decoder.sequence()?;
                $(
                    let $fname = $crate::__der_decode_field!(
                        scope,
                        $fty,
                        ($crate::__der_field_tag!($(@$fmode($ftag))?))
                        $(, $fdefault)?
                    );
                )+
                scope.eof()?;
                ::core::result::Result::Ok(Self { $( $fname, )+ })
            }
        }

        impl $crate::Encode for $name {
            fn encode(
                &self,
                encoder: &mut $crate::Encoder,
            ) -> ::core::result::Result<(), $crate::DerError> {
                let scope = encoder.begin_scope();
                $crate::__der_encode_fields!(
                    self, encoder;
                    $( [ ($crate::__der_field_tag!($(@$fmode($ftag))?)) $fname $(= $fdefault)? ] )+
                );
                encoder.close_scope(scope, $crate::Tag::SEQUENCE);
                ::core::result::Result::Ok(())
            }
        }
    };
}

/// Derive [`Decode`] and [`Encode`] for a fieldless enum carried as an
/// INTEGER of its representation type.
///
/// ```text
/// der_enum! {
///     pub enum Version: u8 { V1 = 0, V2 = 1, V3 = 2 }
/// }
/// ```
///
/// A discriminant outside the declared set decodes to `UnexpectedElement`.
#[macro_export]
macro_rules! der_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $repr:ident {
            $( $(#[$vmeta:meta])* $var:ident = $disc:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        #[repr($repr)]
        $vis enum $name {
            $( $(#[$vmeta])* $var = $disc, )+
        }

        impl<'der> $crate::Decode<'der> for $name {
            fn decode(
                decoder: &mut $crate::Decoder<'der>,
            ) -> ::core::result::Result<Self, $crate::DerError> {
                let value = decoder.any::<$repr>()?;
                match value {
                    $( $disc => ::core::result::Result::Ok($name::$var), )+
                    _ => ::core::result::Result::Err($crate::DerError::UnexpectedElement),
                }
            }
        }

        impl $crate::Encode for $name {
            fn encode(
                &self,
                encoder: &mut $crate::Encoder,
            ) -> ::core::result::Result<(), $crate::DerError> {
                encoder.any(&(*self as $repr))
            }
        }
    };
}

/// Derive [`Decode`] and [`Encode`] for an enum carried as an OBJECT
/// IDENTIFIER, with a total variant ↔ OID map.
///
/// ```text
/// der_oid_enum! {
///     pub enum SigAlg {
///         Sha256WithRsa => [1, 2, 840, 113549, 1, 1, 11],
///         Ed25519 => [1, 3, 101, 112],
///     }
/// }
/// ```
///
/// Decoding an OID outside the map fails with `UnknownOid`.
#[cfg(feature = "oid")]
#[macro_export]
macro_rules! der_oid_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $var:ident => [ $($arc:literal),+ $(,)? ] ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        $vis enum $name {
            $( $(#[$vmeta])* $var, )+
        }

        impl $name {
            /// The OID arcs of this variant.
            pub const fn arcs(self) -> &'static [u32] {
                match self {
                    $( $name::$var => &[ $($arc),+ ], )+
                }
            }
        }

        impl<'der> $crate::Decode<'der> for $name {
            fn decode(
                decoder: &mut $crate::Decoder<'der>,
            ) -> ::core::result::Result<Self, $crate::DerError> {
                let content = decoder.opaque($crate::Tag::OBJECT_IDENTIFIER)?;
                $(
                    if $crate::oid::arcs_match(content, &[ $($arc),+ ])? {
                        return ::core::result::Result::Ok($name::$var);
                    }
                )+
                ::core::result::Result::Err($crate::DerError::UnknownOid)
            }
        }

        impl $crate::Encode for $name {
            fn encode(
                &self,
                encoder: &mut $crate::Encoder,
            ) -> ::core::result::Result<(), $crate::DerError> {
                $crate::oid::encode_arcs(encoder, self.arcs())
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __der_field_tag {
    () => {
        ::core::option::Option::None
    };
    (@implicit($n:literal)) => {
        ::core::option::Option::Some($crate::FieldTag::implicit($n))
    };
    (@explicit($n:literal)) => {
        ::core::option::Option::Some($crate::FieldTag::explicit($n))
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __der_decode_field {
    ($dec:ident, $fty:ty, ($tag:expr)) => {
        $dec.field::<$fty>($tag)?
    };
    ($dec:ident, $fty:ty, ($tag:expr), $default:expr) => {
        $dec.field_with_default::<$fty>($tag, $default)?
    };
}

// Strategy R writes back to front, so the declared fields are emitted in
// reverse order: recurse on the tail first, then emit the head.
#[doc(hidden)]
#[macro_export]
macro_rules! __der_encode_fields {
    ($self_:expr, $enc:ident;) => {};
    ($self_:expr, $enc:ident; [ ($tag:expr) $fname:ident ] $($rest:tt)*) => {
        $crate::__der_encode_fields!($self_, $enc; $($rest)*);
        $enc.field(&$self_.$fname, $tag)?;
    };
    ($self_:expr, $enc:ident; [ ($tag:expr) $fname:ident = $default:expr ] $($rest:tt)*) => {
        $crate::__der_encode_fields!($self_, $enc; $($rest)*);
        $enc.field_with_default(&$self_.$fname, $tag, &$default)?;
    };
}
