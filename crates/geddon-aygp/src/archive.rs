//! AYGP archive walker.
//!
//! The archive has no index table. Its folder tree is stored inline and is
//! discovered by walking counts in a single top-to-bottom pass:
//!
//! ```text
//! folder := u32 reserved, u8-prefixed name,
//!           u32 folder count, folder * count,
//!           u32 file count,   file * count
//! file   := u32 raw size, u8-prefixed name, ciphertext
//! ```
//!
//! The walk uses an explicit stack, so nesting depth does not grow the call
//! stack.

use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Seek, Write};
use std::path::{Path, PathBuf};

use geddon_common::{ByteCursor, LengthPrefix, MappedCursor};
use memmap2::Mmap;
use tracing::{debug, trace};

use crate::keystream::Keystream;
use crate::path::{display_name, join_name};
use crate::{Error, Result};

/// Magic bytes at offset 0.
pub const AYGP_MAGIC: &[u8; 4] = b"AYGP";

/// Offset of the root folder record.
pub const TREE_OFFSET: u64 = 0x20;

/// Reserved field leading every folder record.
const FOLDER_RESERVED: u64 = 4;

/// Smallest possible folder record: reserved, empty name, two zero counts.
const MIN_FOLDER_SIZE: u64 = 4 + 1 + 4 + 4;

/// Smallest possible file record: size field and empty name.
const MIN_FILE_SIZE: u64 = 4 + 1;

/// Ciphertext bytes decrypted per write.
const COPY_CHUNK: usize = 64 * 1024;

/// A file stored in an AYGP archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AygpEntry {
    /// Path relative to the output root, including the root folder name.
    pub path: PathBuf,
    /// Plaintext size in bytes.
    pub size: u32,
    /// Offset of the first ciphertext byte.
    pub offset: u64,
}

impl AygpEntry {
    /// Archive-style name using `\` separators.
    pub fn name(&self) -> String {
        display_name(&self.path)
    }
}

/// Totals gathered while walking an archive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnpackStats {
    /// Folder records visited, the root included.
    pub folders: usize,
    /// File records visited.
    pub files: usize,
    /// Plaintext bytes written.
    pub bytes: u64,
}

/// A folder whose subfolders are still being drained.
struct Frame {
    path: PathBuf,
    folders_left: u32,
}

/// AYGP archive reader.
pub struct AygpArchive<S> {
    cursor: ByteCursor<S>,
}

impl AygpArchive<io::Cursor<Mmap>> {
    /// Open an archive from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::new(MappedCursor::open(path)?)
    }
}

impl<S: Read + Seek> AygpArchive<S> {
    /// Wrap a cursor, validating the magic bytes.
    pub fn new(mut cursor: ByteCursor<S>) -> Result<Self> {
        cursor.seek(0)?;
        cursor.expect_bytes(AYGP_MAGIC)?;
        Ok(Self { cursor })
    }

    /// Release the underlying cursor.
    pub fn into_cursor(self) -> ByteCursor<S> {
        self.cursor
    }

    /// List every file in traversal order without writing anything.
    pub fn entries(&mut self) -> Result<Vec<AygpEntry>> {
        let mut entries = Vec::new();
        self.walk(|_, entry| {
            entries.push(entry.clone());
            Ok(())
        })?;
        Ok(entries)
    }

    /// Decrypt every file into `output_root`.
    pub fn unpack<P: AsRef<Path>>(&mut self, output_root: P) -> Result<UnpackStats> {
        self.unpack_with_progress(output_root, |_| {})
    }

    /// Decrypt every file into `output_root`, calling `progress` after each one.
    pub fn unpack_with_progress<P, F>(&mut self, output_root: P, mut progress: F) -> Result<UnpackStats>
    where
        P: AsRef<Path>,
        F: FnMut(&AygpEntry),
    {
        let root = output_root.as_ref();
        fs::create_dir_all(root)?;

        let mut bytes = 0u64;
        let stats = self.walk(|cursor, entry| {
            write_entry(cursor, entry, &root.join(&entry.path))?;
            bytes += u64::from(entry.size);
            progress(entry);
            Ok(())
        })?;

        Ok(UnpackStats { bytes, ..stats })
    }

    /// Walk the folder tree, handing each file to `on_file` with the cursor
    /// positioned at its ciphertext.
    ///
    /// Subfolders are drained before the files of their parent, and files are
    /// visited in stored order.
    fn walk<F>(&mut self, mut on_file: F) -> Result<UnpackStats>
    where
        F: FnMut(&mut ByteCursor<S>, &AygpEntry) -> Result<()>,
    {
        let cursor = &mut self.cursor;
        cursor.seek(TREE_OFFSET)?;

        let mut stats = UnpackStats::default();
        let mut stack = vec![enter_folder(cursor, Path::new(""))?];
        stats.folders += 1;

        while let Some(mut frame) = stack.pop() {
            if frame.folders_left > 0 {
                frame.folders_left -= 1;
                let child = enter_folder(cursor, &frame.path)?;
                stats.folders += 1;
                stack.push(frame);
                stack.push(child);
                continue;
            }

            let file_count = read_count(cursor, "file", MIN_FILE_SIZE)?;
            for _ in 0..file_count {
                let entry = read_file_header(cursor, &frame.path)?;
                let available = cursor.remaining();
                if available < u64::from(entry.size) {
                    return Err(geddon_common::Error::TruncatedRead {
                        offset: entry.offset,
                        needed: u64::from(entry.size),
                        available,
                    }
                    .into());
                }

                on_file(cursor, &entry)?;
                cursor.seek(entry.offset + u64::from(entry.size))?;
                stats.files += 1;
            }
        }

        Ok(stats)
    }
}

/// Convenience wrapper: validate `source` and unpack it into `output_root`.
pub fn unpack<S, P>(source: ByteCursor<S>, output_root: P) -> Result<UnpackStats>
where
    S: Read + Seek,
    P: AsRef<Path>,
{
    AygpArchive::new(source)?.unpack(output_root)
}

fn enter_folder<S: Read + Seek>(cursor: &mut ByteCursor<S>, parent: &Path) -> Result<Frame> {
    cursor.skip(FOLDER_RESERVED)?;
    let name = cursor.read_prefixed_string(LengthPrefix::U8)?;
    let path = join_name(parent, &name)?;
    let folders_left = read_count(cursor, "folder", MIN_FOLDER_SIZE)?;

    trace!(
        "folder {:?} at {:#x}: {} subfolders",
        display_name(&path),
        cursor.tell(),
        folders_left
    );

    Ok(Frame { path, folders_left })
}

fn read_count<S: Read + Seek>(
    cursor: &mut ByteCursor<S>,
    kind: &'static str,
    min_record_size: u64,
) -> Result<u32> {
    let offset = cursor.tell();
    let count = cursor.read_u32()?;
    let remaining = cursor.remaining();

    if u64::from(count).saturating_mul(min_record_size) > remaining {
        return Err(Error::ImplausibleCount {
            kind,
            count,
            offset,
            remaining,
        });
    }

    Ok(count)
}

fn read_file_header<S: Read + Seek>(cursor: &mut ByteCursor<S>, folder: &Path) -> Result<AygpEntry> {
    let raw_size = cursor.read_u32()?;
    let name_start = cursor.tell();
    let name = cursor.read_prefixed_string(LengthPrefix::U8)?;

    // The stored size also covers the name's prefix byte and the name bytes.
    let name_len = (cursor.tell() - name_start) as u32;
    let size = raw_size
        .checked_sub(name_len)
        .ok_or_else(|| Error::EntrySizeUnderflow {
            name: name.clone(),
            raw_size,
        })?;

    let path = join_name(folder, &name)?;
    if path.as_path() == folder {
        return Err(Error::InvalidEntryName(name));
    }

    Ok(AygpEntry {
        path,
        size,
        offset: cursor.tell(),
    })
}

fn write_entry<S: Read + Seek>(
    cursor: &mut ByteCursor<S>,
    entry: &AygpEntry,
    target: &Path,
) -> Result<()> {
    debug!("unpacking {} ({} bytes)", entry.name(), entry.size);

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut keystream = Keystream::for_entry(entry.size);
    let mut writer = BufWriter::new(File::create(target)?);
    let mut left = entry.size as usize;
    let mut chunk = vec![0u8; left.min(COPY_CHUNK)];

    while left > 0 {
        let step = left.min(COPY_CHUNK);
        let buf = &mut chunk[..step];
        cursor.read_exact(buf)?;
        keystream.apply(buf);
        writer.write_all(buf)?;
        left -= step;
    }

    writer.flush()?;
    Ok(())
}
