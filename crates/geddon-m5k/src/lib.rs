//! M5K texture container decoding.
//!
//! An M5K container holds a single 32-bit image as a zlib-compressed BGRA
//! pixel block. The block is found by scanning for its zlib header rather
//! than by parsing the container's leading metadata:
//!
//! ```text
//! 0x00  ... container metadata (ignored) ...
//! 0x70  scan starts here
//!  ...
//!  -12  u16 tag (5), u16 tag (0), u16 width, u16 height, i32 compressed size
//!    0  78 DA <raw deflate> <adler32>
//! ```
//!
//! With the `parallel` feature, [`convert_folder_parallel`] spreads a batch
//! over rayon's thread pool.
//!
//! # Example
//!
//! ```no_run
//! use geddon_common::MappedCursor;
//! use geddon_m5k::extract;
//!
//! let mut cursor = MappedCursor::open("texture.m5k")?;
//! if let Some(image) = extract(&mut cursor)? {
//!     image.save_png("texture.png")?;
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod batch;
mod error;
mod extract;
mod header;
mod inflate;
mod pixels;

pub use batch::{
    convert_file, convert_folder, convert_folder_with_progress, find_files, BatchReport,
    ConvertOutcome, M5kBatchOptions,
};
#[cfg(feature = "parallel")]
pub use batch::convert_folder_parallel;
pub use error::{Error, Result};
pub use extract::{extract, locate};
pub use header::{
    pixel_len, TextureBlock, TextureBlockHeader, BYTES_PER_PIXEL, PIXEL_BLOCK_SIGNATURE,
    SCAN_START,
};
pub use inflate::inflate;
pub use pixels::{Argb, DecodedImage};
