//! Mapping archive names onto host paths.
//!
//! Names inside an archive use `\` as separator. A name may itself contain
//! separators, in which case it expands into several path components.

use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Append an archive name to `base`, one component per separated segment.
///
/// Empty and `.` segments are dropped. `..` and segments carrying a drive
/// prefix are rejected so the result always stays below `base`.
pub fn join_name(base: &Path, name: &str) -> Result<PathBuf> {
    let mut path = base.to_path_buf();
    for segment in name.split(|c: char| c == '\\' || c == '/') {
        match segment {
            "" | "." => {}
            ".." => return Err(Error::InvalidEntryName(name.to_string())),
            s if s.contains(':') => return Err(Error::InvalidEntryName(name.to_string())),
            s => path.push(s),
        }
    }
    Ok(path)
}

/// Render a relative archive path with the archive's own separator.
pub fn display_name(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("\\")
}
