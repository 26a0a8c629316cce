//! Error types for Meadowcap core primitives.

use thiserror::Error;

/// Errors raised by the concrete key and signature primitives.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid public key")]
    InvalidPublicKey,
}

/// Errors raised while decoding products, capabilities or keys from bytes.
///
/// Every read is bounds-checked; a decoder never reads past the end of its
/// input and reports how many bytes it was missing instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unexpected end of input: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEnd { needed: usize, remaining: usize },

    #[error("unknown flag bits: {0:#010b}")]
    UnknownFlags(u8),

    #[error("unknown tag: {0:#04x}")]
    UnknownTag(u8),

    #[error("path of length {length} exceeds maximum of {max}")]
    PathTooLong { length: usize, max: usize },

    #[error("common prefix of {prefix} bytes exceeds previous path of {previous} bytes")]
    InvalidPrefix { prefix: usize, previous: usize },

    #[error("decoded range violates its ordering invariant")]
    InvalidRange,

    #[error("non-canonical encoding: {0}")]
    NonCanonical(String),

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),

    #[error("inconsistent encoding: {0}")]
    Inconsistent(String),
}

/// Result type for decoding operations.
pub type DecodeResult<T> = std::result::Result<T, DecodeError>;
