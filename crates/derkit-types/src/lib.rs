#![forbid(unsafe_code)]
#![doc = "Common value types and error codes for the derkit DER codec."]

pub mod datetime;
pub mod error;

pub use datetime::*;
pub use error::*;
