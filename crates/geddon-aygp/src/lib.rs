//! AYGP archive unpacker.
//!
//! AYGP containers hold a folder tree stored inline, with no separate index.
//! Each file payload is obfuscated with a rolling counter keystream seeded
//! from the payload size:
//!
//! - 4-byte `AYGP` magic, root folder record at offset `0x20`
//! - Folder records nest recursively (subfolders before files)
//! - File payloads are XORed with [`Keystream::for_entry`]
//!
//! # Example
//!
//! ```no_run
//! use geddon_aygp::AygpArchive;
//!
//! let mut archive = AygpArchive::open("data.ayg")?;
//!
//! for entry in archive.entries()? {
//!     println!("{}: {} bytes", entry.name(), entry.size);
//! }
//!
//! let stats = archive.unpack("out")?;
//! println!("{} files, {} bytes", stats.files, stats.bytes);
//! # Ok::<(), geddon_aygp::Error>(())
//! ```

mod archive;
mod error;
mod keystream;
mod path;

pub use archive::{unpack, AygpArchive, AygpEntry, UnpackStats, AYGP_MAGIC, TREE_OFFSET};
pub use error::{Error, Result};
pub use keystream::{next as keystream_next, Keystream, KEY_BASE};
pub use path::join_name;
