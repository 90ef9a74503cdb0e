//! Folder-wide conversion of M5K containers to PNG.

use std::io;
use std::path::{Path, PathBuf};

use geddon_common::MappedCursor;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::extract::extract;
use crate::Result;

/// Options for [`convert_folder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct M5kBatchOptions {
    /// Extension of the files to convert, without the dot.
    pub extension: String,
    /// Replace `.png` files that already exist.
    pub overwrite: bool,
}

impl Default for M5kBatchOptions {
    fn default() -> Self {
        Self {
            extension: "m5k".to_string(),
            overwrite: true,
        }
    }
}

/// What happened to a single container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertOutcome {
    /// PNG written to the given path.
    Written(PathBuf),
    /// No pixel block signature in the file.
    NoTexture,
    /// Pixel block present but it decoded to nothing.
    Empty,
    /// Output exists and overwriting is disabled.
    Exists(PathBuf),
}

/// Tally of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub written: Vec<PathBuf>,
    pub no_texture: usize,
    pub empty: usize,
    pub skipped: usize,
    pub failed: Vec<(PathBuf, String)>,
}

impl BatchReport {
    /// Record the outcome for `input`. Failures are kept, not propagated.
    pub fn record(&mut self, input: &Path, result: Result<ConvertOutcome>) {
        match result {
            Ok(ConvertOutcome::Written(path)) => self.written.push(path),
            Ok(ConvertOutcome::NoTexture) => self.no_texture += 1,
            Ok(ConvertOutcome::Empty) => self.empty += 1,
            Ok(ConvertOutcome::Exists(_)) => self.skipped += 1,
            Err(e) => {
                warn!("failed to convert {}: {}", input.display(), e);
                self.failed.push((input.to_path_buf(), e.to_string()));
            }
        }
    }

    /// Number of files processed.
    pub fn total(&self) -> usize {
        self.written.len() + self.no_texture + self.empty + self.skipped + self.failed.len()
    }
}

/// Collect every regular file under `root` with the given extension.
///
/// Sorted by file name within each directory.
pub fn find_files<P: AsRef<Path>>(root: P, extension: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().is_some_and(|ext| ext == extension) {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

/// Convert one container to `<stem>.png` next to it.
pub fn convert_file<P: AsRef<Path>>(path: P, options: &M5kBatchOptions) -> Result<ConvertOutcome> {
    let path = path.as_ref();
    let mut cursor = MappedCursor::open(path)?;

    let Some(image) = extract(&mut cursor)? else {
        debug!("{}: no texture", path.display());
        return Ok(ConvertOutcome::NoTexture);
    };
    if image.is_empty() {
        debug!("{}: empty pixel block", path.display());
        return Ok(ConvertOutcome::Empty);
    }

    let output = path.with_extension("png");
    if !options.overwrite && output.exists() {
        return Ok(ConvertOutcome::Exists(output));
    }

    image.save_png(&output)?;
    debug!(
        "{} -> {} ({}x{})",
        path.display(),
        output.display(),
        image.width(),
        image.height()
    );

    Ok(ConvertOutcome::Written(output))
}

/// Convert every matching container under `root`.
///
/// Only the directory walk can fail the whole run; per-file errors land in
/// [`BatchReport::failed`].
pub fn convert_folder<P: AsRef<Path>>(root: P, options: &M5kBatchOptions) -> Result<BatchReport> {
    convert_folder_with_progress(root, options, |_, _| {})
}

/// Like [`convert_folder`], calling `on_file(path, report)` after each file.
pub fn convert_folder_with_progress<P, F>(
    root: P,
    options: &M5kBatchOptions,
    mut on_file: F,
) -> Result<BatchReport>
where
    P: AsRef<Path>,
    F: FnMut(&Path, &BatchReport),
{
    let files = find_files(root, &options.extension)?;
    let mut report = BatchReport::default();

    for path in &files {
        report.record(path, convert_file(path, options));
        on_file(path, &report);
    }

    log_summary(&report);
    Ok(report)
}

/// Convert every matching container under `root` on the rayon pool.
///
/// `on_file` runs on worker threads as each file finishes. The report lists
/// outcomes in the same order as [`convert_folder`].
#[cfg(feature = "parallel")]
pub fn convert_folder_parallel<P, F>(
    root: P,
    options: &M5kBatchOptions,
    on_file: F,
) -> Result<BatchReport>
where
    P: AsRef<Path>,
    F: Fn(&Path) + Sync,
{
    use rayon::prelude::*;

    let files = find_files(root, &options.extension)?;
    let outcomes: Vec<_> = files
        .par_iter()
        .map(|path| {
            let outcome = convert_file(path, options);
            on_file(path);
            outcome
        })
        .collect();

    let mut report = BatchReport::default();
    for (path, outcome) in files.iter().zip(outcomes) {
        report.record(path, outcome);
    }

    log_summary(&report);
    Ok(report)
}

fn log_summary(report: &BatchReport) {
    info!(
        "converted {} of {} files ({} failed)",
        report.written.len(),
        report.total(),
        report.failed.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::tests::{container, texture};
    use std::fs;

    #[test]
    fn test_find_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("sub/deeper")).unwrap();
        fs::write(dir.path().join("b.m5k"), b"").unwrap();
        fs::write(dir.path().join("a.m5k"), b"").unwrap();
        fs::write(dir.path().join("a.png"), b"").unwrap();
        fs::write(dir.path().join("sub/deeper/c.m5k"), b"").unwrap();
        fs::create_dir(dir.path().join("fake.m5k")).unwrap();

        let files = find_files(dir.path(), "m5k").unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();

        assert_eq!(
            names,
            vec![
                PathBuf::from("a.m5k"),
                PathBuf::from("b.m5k"),
                PathBuf::from("sub/deeper/c.m5k"),
            ]
        );
    }

    #[test]
    fn test_find_files_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_files(dir.path().join("nope"), "m5k").is_err());
    }

    #[test]
    fn test_convert_folder() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("one.m5k"), texture(1, 1, &[10, 20, 30, 40])).unwrap();
        fs::write(dir.path().join("sub/two.m5k"), texture(2, 1, &[0; 8])).unwrap();
        fs::write(dir.path().join("blank.m5k"), vec![0u8; 0x100]).unwrap();
        fs::write(dir.path().join("tiny.m5k"), container((5, 0), 8, 8, &[0x78, 0xDA])).unwrap();
        fs::write(dir.path().join("notes.txt"), texture(1, 1, &[0; 4])).unwrap();

        let mut broken = texture(4, 4, &[0; 64]);
        broken.truncate(broken.len() - 4);
        fs::write(dir.path().join("broken.m5k"), broken).unwrap();

        let report = convert_folder(dir.path(), &M5kBatchOptions::default()).unwrap();

        assert_eq!(report.written.len(), 2);
        assert_eq!(report.no_texture, 1);
        assert_eq!(report.empty, 1);
        assert_eq!(report.failed.len(), 1);
        assert!(report.failed[0].0.ends_with("broken.m5k"));
        assert_eq!(report.total(), 5);

        assert!(!dir.path().join("notes.png").exists());
        assert!(!dir.path().join("blank.png").exists());
        let png = image::open(dir.path().join("one.png")).unwrap().to_rgba8();
        assert_eq!(png.get_pixel(0, 0).0, [30, 20, 10, 40]);
        assert!(dir.path().join("sub/two.png").exists());
    }

    #[test]
    fn test_no_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("tex.m5k");
        let output = dir.path().join("tex.png");
        fs::write(&input, texture(1, 1, &[1, 2, 3, 4])).unwrap();
        fs::write(&output, b"keep").unwrap();

        let options = M5kBatchOptions {
            overwrite: false,
            ..Default::default()
        };
        assert_eq!(
            convert_file(&input, &options).unwrap(),
            ConvertOutcome::Exists(output.clone())
        );
        assert_eq!(fs::read(&output).unwrap(), b"keep");

        assert_eq!(
            convert_file(&input, &M5kBatchOptions::default()).unwrap(),
            ConvertOutcome::Written(output.clone())
        );
        assert_ne!(fs::read(&output).unwrap(), b"keep");
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_sequential() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let dir = tempfile::tempdir().unwrap();
        for i in 0..8u8 {
            let name = format!("tex{i}.m5k");
            fs::write(dir.path().join(name), texture(1, 1, &[i, i, i, 255])).unwrap();
        }
        fs::write(dir.path().join("zzz.m5k"), vec![0u8; 0x80]).unwrap();

        let seen = AtomicUsize::new(0);
        let report = convert_folder_parallel(dir.path(), &M5kBatchOptions::default(), |_| {
            seen.fetch_add(1, Ordering::Relaxed);
        })
        .unwrap();

        assert_eq!(seen.load(Ordering::Relaxed), 9);
        assert_eq!(report.no_texture, 1);
        let expected: Vec<_> = (0..8)
            .map(|i| dir.path().join(format!("tex{i}.png")))
            .collect();
        assert_eq!(report.written, expected);
    }

    #[test]
    fn test_custom_extension() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("tex.bin"), texture(1, 1, &[1, 2, 3, 4])).unwrap();
        fs::write(dir.path().join("tex2.m5k"), texture(1, 1, &[1, 2, 3, 4])).unwrap();

        let options = M5kBatchOptions {
            extension: "bin".to_string(),
            overwrite: true,
        };
        let report = convert_folder(dir.path(), &options).unwrap();

        assert_eq!(report.written, vec![dir.path().join("tex.png")]);
    }
}
