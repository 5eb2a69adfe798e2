/// DER encoding and decoding errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DerError {
    #[error("unexpected end of input")]
    EndOfStream,
    #[error("invalid length octets")]
    InvalidLength,
    #[error("invalid identifier octets")]
    InvalidTag,
    #[error("element does not match the expected tag")]
    UnexpectedElement,
    #[error("encoding is not canonical")]
    NonCanonical,
    #[error("integer does not fit the target width")]
    Overflow,
    #[error("invalid boolean content")]
    InvalidBool,
    #[error("invalid bit string content")]
    InvalidBitString,
    #[error("invalid date-time content")]
    InvalidDateTime,
    #[error("object identifier not in the schema map")]
    UnknownOid,

    // Collaborator modules (oid, pem)
    #[error("malformed object identifier")]
    InvalidOid,
    #[error("malformed pem block")]
    InvalidPem,
}
