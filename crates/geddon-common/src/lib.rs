//! Common utilities for Geddon.
//!
//! This crate provides the binary decoding machinery shared by the format crates:
//!
//! - [`ByteCursor`] - Seekable, endianness-aware cursor over in-memory or on-disk bytes
//! - [`Scalar`] - Fixed-width codec descriptor used by the generic cursor accessors
//! - [`LengthPrefix`] / [`TextEncoding`] - String framing and text decoding
//! - [`varint`] - Base-128 and zig-zag integer codecs

mod cursor;
mod error;
mod scalar;
mod text;

pub mod varint;

pub use cursor::{ByteCursor, FileCursor, MappedCursor, MemoryCursor};
pub use error::{Error, Result};
pub use scalar::{Scalar, MAX_SCALAR_WIDTH};
pub use text::{LengthPrefix, TextEncoding};

/// Re-export byte order markers so callers can pick endianness per call.
pub use byteorder::{BigEndian, ByteOrder, LittleEndian};

/// Re-export zerocopy traits for convenience
pub use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};
