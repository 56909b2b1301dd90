//! G-code export: realize a job, post-process it for its dialect, save it.

use crate::engine::CamEngine;
use crate::job::Job;
use panelcam_core::output::write_atomic;
use panelcam_core::Result;
use std::path::{Path, PathBuf};
use tracing::info;

/// Extension appended to program files
pub const GCODE_EXTENSION: &str = "nc";

/// Realize `job` with `engine` and post-process it for the job's dialect.
///
/// Serializes through `&Job`, so the same job always yields the same text.
pub fn to_gcode(job: &Job<'_>, engine: &impl CamEngine) -> Result<String> {
    let plan = engine.plan(job)?;
    let text = job.dialect().postprocess(&plan.program);
    info!(
        "Job '{}': {} operations, {} lines for {}",
        job.name(),
        plan.operations.len(),
        text.lines().count(),
        job.dialect()
    );
    Ok(text)
}

/// Write a program to `path`, appending `.nc` when missing.
///
/// Parent directories are created and the file is replaced atomically.
pub fn save_gcode(text: &str, path: impl AsRef<Path>) -> Result<PathBuf> {
    write_atomic(path.as_ref(), GCODE_EXTENSION, text.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_appends_extension() {
        let dir = tempfile::tempdir().unwrap();
        let written = save_gcode("G0 X0\n", dir.path().join("nc/slider")).unwrap();
        assert_eq!(written, dir.path().join("nc/slider.nc"));
        assert_eq!(std::fs::read_to_string(written).unwrap(), "G0 X0\n");
    }

    #[test]
    fn test_save_keeps_existing_extension() {
        let dir = tempfile::tempdir().unwrap();
        let written = save_gcode("M30\n", dir.path().join("sleeve.nc")).unwrap();
        assert_eq!(written, dir.path().join("sleeve.nc"));
    }
}
