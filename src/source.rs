//! Input sources: decoding, display labels, and locating files on disk.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::debug;
use zip::ZipArchive;
use zip::result::ZipError;

use crate::error::MergeError;
use crate::formatter::palette_color;

/// One input log, as handed to the merge pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpec {
    /// Names the source in diagnostics (usually the file path).
    pub label: String,
    /// Full decoded text.
    pub text: String,
    /// Printed before each output line, followed by a space.
    pub prefix: Option<String>,
    /// xterm 256-color code used when colors are enabled.
    pub color: Option<u8>,
}

impl SourceSpec {
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
            prefix: None,
            color: None,
        }
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    #[must_use]
    pub const fn with_color(mut self, color: u8) -> Self {
        self.color = Some(color);
        self
    }

    /// Decode raw bytes as UTF-8. A leading byte-order mark is dropped.
    pub fn from_bytes(label: impl Into<String>, bytes: Vec<u8>) -> Result<Self, MergeError> {
        let label = label.into();
        let mut text = String::from_utf8(bytes).map_err(|e| {
            let valid = e.utf8_error().valid_up_to();
            let line = e.as_bytes()[..valid].iter().filter(|&&b| b == b'\n').count() + 1;
            MergeError::Decode {
                source_label: label.clone(),
                line,
                reason: e.utf8_error(),
            }
        })?;
        if text.starts_with('\u{feff}') {
            text.replace_range(..'\u{feff}'.len_utf8(), "");
        }
        Ok(Self::new(label, text))
    }

    /// Read and decode a whole file. The file is closed before returning.
    pub fn read(path: &Path) -> Result<Self, MergeError> {
        Self::read_as(path, path.display().to_string())
    }

    fn read_as(path: &Path, label: String) -> Result<Self, MergeError> {
        let bytes = fs::read(path).map_err(|e| {
            io::Error::new(e.kind(), format!("cannot read {}: {e}", path.display()))
        })?;
        debug!(path = %path.display(), bytes = bytes.len(), "read source");
        Self::from_bytes(label, bytes)
    }
}

/// Assign prefixes and colors by position.
///
/// Source `i` gets `prefixes[i]` when given, else `defaults[i]` when given,
/// else `log{i+1}`. With `show_prefix` off no prefix is set at all. Colors
/// cycle through `palette`.
pub fn assign_labels(
    sources: &mut [SourceSpec],
    prefixes: &[String],
    defaults: &[&str],
    show_prefix: bool,
    palette: &[u8],
) {
    for (index, source) in sources.iter_mut().enumerate() {
        source.prefix = show_prefix.then(|| {
            prefixes
                .get(index)
                .cloned()
                .or_else(|| defaults.get(index).map(|d| (*d).to_string()))
                .unwrap_or_else(|| format!("log{}", index + 1))
        });
        source.color = palette_color(palette, index);
    }
}

/// Subdirectories holding the two redundant JAMF server logs, in merge order.
pub const JAMF_SERVER_DIRS: [&str; 2] = [
    "primary/JAMFSoftwareServer",
    "secondary/JAMFSoftwareServer",
];

/// Default prefixes for the JAMF layout.
pub const JAMF_PREFIXES: [&str; 2] = ["primary", "secondary"];

/// Read the primary and secondary logs of a JAMF server log bundle.
///
/// `root` is a bundle folder or a `.zip` archive of one. An archive is
/// extracted into a temporary directory, which is removed before this
/// returns, whether reading succeeded or not. Sources read from an archive
/// are labeled `<archive>:<path inside the archive>`.
pub fn read_jamf_sources(root: &Path) -> Result<Vec<SourceSpec>, MergeError> {
    if !is_zip_file(root) {
        return jamf_log_paths(root)?
            .iter()
            .map(|path| SourceSpec::read(path))
            .collect();
    }

    let extracted = extract_archive(root)?;
    jamf_log_paths(extracted.path())?
        .iter()
        .map(|path| {
            let inner = path.strip_prefix(extracted.path()).unwrap_or(path.as_path());
            SourceSpec::read_as(path, format!("{}:{}", root.display(), inner.display()))
        })
        .collect()
}

fn is_zip_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("zip")) && path.is_file()
}

/// Unpack `archive` into a fresh temporary directory.
fn extract_archive(archive: &Path) -> Result<TempDir, MergeError> {
    let invalid = |reason: ZipError| MergeError::Archive {
        path: archive.display().to_string(),
        reason,
    };
    let file = File::open(archive).map_err(|e| {
        io::Error::new(e.kind(), format!("cannot read {}: {e}", archive.display()))
    })?;
    let mut zip = ZipArchive::new(file).map_err(invalid)?;
    let dir = tempfile::Builder::new().prefix("logmerge-").tempdir()?;
    zip.extract(dir.path()).map_err(invalid)?;
    debug!(
        archive = %archive.display(),
        entries = zip.len(),
        into = %dir.path().display(),
        "extracted JAMF bundle"
    );
    Ok(dir)
}

/// Locate the primary and secondary logs of an unpacked JAMF server log
/// bundle.
///
/// `root` is the bundle folder, or a folder containing exactly one such
/// bundle folder. In each server directory the lexicographically first
/// `*.log` file is used.
pub fn jamf_log_paths(root: &Path) -> Result<Vec<PathBuf>, MergeError> {
    if !root.is_dir() {
        return Err(MergeError::Config(format!(
            "JAMF log folder not found: {}",
            root.display()
        )));
    }

    let root = resolve_bundle_root(root)?;
    JAMF_SERVER_DIRS
        .iter()
        .map(|dir| first_log_file(&root.join(dir)))
        .collect()
}

/// Descend into a single wrapping folder when the layout is not at `root`.
fn resolve_bundle_root(root: &Path) -> Result<PathBuf, MergeError> {
    if root.join(JAMF_SERVER_DIRS[0]).is_dir() {
        return Ok(root.to_path_buf());
    }
    let mut dirs = Vec::new();
    for entry in fs::read_dir(root)? {
        let path = entry?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    match dirs.as_slice() {
        [only] => Ok(only.clone()),
        _ => Ok(root.to_path_buf()),
    }
}

fn first_log_file(dir: &Path) -> Result<PathBuf, MergeError> {
    let not_found = || MergeError::Config(format!("no .log file found in {}", dir.display()));
    if !dir.is_dir() {
        return Err(not_found());
    }
    let mut logs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "log") {
            logs.push(path);
        }
    }
    logs.sort();
    logs.into_iter().next().ok_or_else(not_found)
}

/// Pick an output path that does not exist yet: `<base>.log`, then
/// `<base>1.log`, `<base>2.log`, ...
pub fn unique_output_path(base: &str) -> PathBuf {
    let first = PathBuf::from(format!("{base}.log"));
    if !first.exists() {
        return first;
    }
    (1_u64..)
        .map(|counter| PathBuf::from(format!("{base}{counter}.log")))
        .find(|candidate| !candidate.exists())
        .unwrap_or(first)
}
