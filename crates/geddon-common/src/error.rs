//! Error types for geddon-common.

use thiserror::Error;

/// Common error type for Geddon operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The source ended before a required field.
    #[error(
        "truncated read at offset {offset:#x}: needed {needed} bytes but only {available} available"
    )]
    TruncatedRead {
        offset: u64,
        needed: u64,
        available: u64,
    },

    /// A variable-length integer did not terminate within its group bound.
    #[error("variable-length integer at offset {offset:#x} exceeds {max_groups} groups")]
    EncodingTooLarge { offset: u64, max_groups: u32 },

    /// An identity check against an expected byte sequence failed.
    #[error("signature mismatch at offset {offset:#x}: expected {expected:02x?}, got {actual:02x?}")]
    SignatureMismatch {
        offset: u64,
        expected: Vec<u8>,
        actual: Vec<u8>,
    },

    /// String does not fit the chosen length prefix.
    #[error("string of {length} bytes does not fit a length prefix of at most {max}")]
    StringTooLong { length: usize, max: u64 },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
