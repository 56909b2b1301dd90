// Integration tests for reading and writing batch files

use panelcam_core::Error;
use panelcam_settings::config::{Dialect, MeasurementSystem};
use panelcam_settings::{BatchConfig, JobEntry};
use std::path::PathBuf;

#[test]
fn test_toml_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = BatchConfig::default();
    config.output.dialect = Dialect::LinuxCnc;
    config.machine.units = MeasurementSystem::Imperial;

    let path = config.save_to_file(&dir.path().join("batch.toml")).unwrap();
    assert_eq!(path, dir.path().join("batch.toml"));
    let loaded = BatchConfig::load_from_file(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_json_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let config = BatchConfig::default();
    let path = config.save_to_file(&dir.path().join("conf/batch.json")).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("\"kind\": \"diffuser_panel\""));
    assert_eq!(BatchConfig::load_from_file(&path).unwrap(), config);
}

#[test]
fn test_unknown_extension_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("batch.yaml");
    std::fs::write(&path, "jobs: []").unwrap();
    assert!(matches!(BatchConfig::load_from_file(&path), Err(Error::Config(_))));
    assert!(BatchConfig::default().save_to_file(&path).is_err());
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = BatchConfig::load_from_file(&dir.path().join("absent.toml")).unwrap_err();
    assert!(err.is_retryable());
}

#[test]
fn test_invalid_job_fails_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(
        &path,
        r#"
[[jobs]]
kind = "slider"
width = 0.0
height = 20.0
"#,
    )
    .unwrap();
    assert!(matches!(BatchConfig::load_from_file(&path), Err(Error::Config(_))));
}

#[test]
fn test_named_panel_from_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("panel.toml");
    std::fs::write(
        &path,
        r#"
[output]
nc_dir = "out/nc"
write_dxf = false

[tools]
panel_tool = 3.175

[[jobs]]
kind = "diffuser_panel"
name = "legends"
width = 20.0
height = 20.0

[[jobs.rows]]
cells = [{ text = "A" }, { triangle = true }]
"#,
    )
    .unwrap();
    let config = BatchConfig::load_from_file(&path).unwrap();
    assert_eq!(config.output.nc_dir, PathBuf::from("out/nc"));
    assert!(!config.output.write_dxf);
    assert_eq!(config.jobs.len(), 1);
    assert_eq!(config.jobs[0].name(), "legends");
    match &config.jobs[0] {
        JobEntry::DiffuserPanel { rows, layout, .. } => {
            assert_eq!(rows[0].cells.len(), 2);
            assert_eq!(rows[0].cells[0].to_options().text.as_deref(), Some("A"));
            assert!(rows[0].cells[1].triangle);
            assert_eq!(layout.h_spacing, 22.0);
        }
        other => panic!("unexpected job {:?}", other),
    }
}
