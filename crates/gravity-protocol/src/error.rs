//! Error types for the sync protocol.

use thiserror::Error;

/// Errors produced while scanning a single `(tag:value)` group.
///
/// These never abort a whole response; the caller skips the group and carries
/// on from the resume cursor returned alongside the error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The bytes between `(` and `:` are not a non-negative decimal number.
    #[error("invalid tag: {0:?}")]
    InvalidTag(String),

    /// The raw value does not fit the value buffer.
    #[error("value too long: max {max} bytes, got {actual}")]
    ValueTooLong { max: usize, actual: usize },
}

/// Errors that can occur when decoding a raw value into a typed field.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Value is not a decimal integer in the accepted range.
    #[error("invalid number: {0:?}")]
    InvalidNumber(String),

    /// Value is not a colon separated MAC address.
    #[error("invalid MAC address: {0:?}")]
    InvalidMac(String),

    /// Value is not valid UTF-8.
    #[error("invalid UTF-8 in value")]
    InvalidUtf8,
}

/// Result type alias for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;
