//! Geddon - AYGP archive and M5K texture extraction library.
//!
//! This crate provides a unified interface to the Geddon crates.
//!
//! # Crates
//!
//! - [`geddon_common`] - Seekable byte cursor, scalar codecs, varints
//! - [`geddon_aygp`] - AYGP archive walking and keystream decryption
//! - [`geddon_m5k`] - M5K pixel block location, inflate and PNG output
//!
//! # Example
//!
//! ```no_run
//! use geddon::prelude::*;
//!
//! // Unpack an archive
//! let mut archive = AygpArchive::open("data.ayg")?;
//! let stats = archive.unpack("out")?;
//! println!("{} files", stats.files);
//!
//! // Convert the textures it contained
//! let report = convert_folder("out", &M5kBatchOptions::default())?;
//! println!("{} textures", report.written.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Re-export all sub-crates
pub use geddon_aygp as aygp;
pub use geddon_common as common;
pub use geddon_m5k as m5k;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use geddon_aygp::{AygpArchive, AygpEntry, UnpackStats};
    pub use geddon_common::{ByteCursor, MappedCursor, MemoryCursor};
    pub use geddon_m5k::{convert_folder, extract, BatchReport, DecodedImage, M5kBatchOptions};
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
