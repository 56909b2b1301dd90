//! Output file handling shared by the G-code and DXF exporters
//!
//! Paths get their extension appended when missing, parent directories are
//! created, and contents are written through a temporary file in the target
//! directory that is renamed into place, so a failed write leaves nothing
//! behind.

use crate::error::{Error, Result};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Append `.{extension}` unless the path already ends with it (case-insensitive).
///
/// The extension is appended to the file name, not substituted, so
/// `slider.v2` becomes `slider.v2.nc`.
pub fn with_extension(path: &Path, extension: &str) -> PathBuf {
    let has = path
        .extension()
        .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension));
    if has {
        return path.to_path_buf();
    }
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

/// Write `contents` atomically to `path` with `extension` ensured.
///
/// Returns the final path.
pub fn write_atomic(path: &Path, extension: &str, contents: &[u8]) -> Result<PathBuf> {
    let target = with_extension(path, extension);
    let parent = match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent).map_err(|e| Error::io(&parent, e))?;

    let mut tmp = tempfile::NamedTempFile::new_in(&parent).map_err(|e| Error::io(&parent, e))?;
    tmp.write_all(contents).map_err(|e| Error::io(&target, e))?;
    tmp.flush().map_err(|e| Error::io(&target, e))?;
    tmp.persist(&target).map_err(|e| Error::io(&target, e.error))?;

    tracing::info!("Wrote {} ({} bytes)", target.display(), contents.len());
    Ok(target)
}
