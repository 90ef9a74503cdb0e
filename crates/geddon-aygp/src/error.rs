//! Error types for the AYGP crate.

use thiserror::Error;

/// Errors that can occur when unpacking AYGP archives.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error.
    #[error("{0}")]
    Common(#[from] geddon_common::Error),

    /// An entry name that would resolve outside the output root.
    #[error("invalid entry name: {0:?}")]
    InvalidEntryName(String),

    /// Stored size is smaller than the name it is supposed to cover.
    #[error("entry {name:?} has stored size {raw_size}, smaller than its name")]
    EntrySizeUnderflow { name: String, raw_size: u32 },

    /// A folder or file count that the remaining bytes cannot hold.
    #[error("implausible {kind} count {count} at offset {offset:#x} with {remaining} bytes left")]
    ImplausibleCount {
        kind: &'static str,
        count: u32,
        offset: u64,
        remaining: u64,
    },
}

/// Result type for AYGP operations.
pub type Result<T> = std::result::Result<T, Error>;
