//! # PanelCAM
//!
//! Parametric switch and button parts turned into solids, classified faces
//! and CNC machining programs.
//!
//! ## Architecture
//!
//! PanelCAM is organized as a workspace with multiple crates:
//!
//! 1. **panelcam-core** - Errors, units, tool catalog, placements, output files
//! 2. **panelcam-designer** - Profiles, slab solids, parts, face classification, DXF export
//! 3. **panelcam-camtools** - Machining jobs, toolpath engine, G-code dialects
//! 4. **panelcam-settings** - Batch configuration
//! 5. **panelcam** - Batch runner and binary that integrates all crates

pub mod batch;

pub use panelcam_camtools as camtools;
pub use panelcam_designer as designer;

pub use batch::{run_batch, run_entry, BatchReport};
pub use panelcam_camtools::{
    save_gcode, to_gcode, CamEngine, ContourEngine, Dialect, Dressup, Job, JobOrigin, JobSettings,
    PocketOptions, PocketPattern, ProfileOptions, Side,
};
pub use panelcam_core::{
    init_standard_library, CamError, Error, GeometryError, MeasurementSystem, Result, Tool,
    ToolLibrary,
};
pub use panelcam_designer::{
    classify, save_dxf, ClassifyOptions, DxfSource, FaceGroup, FaceGroups, Part, Profile,
    SwitchGeometry,
};
pub use panelcam_settings::BatchConfig;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output on stderr, so programs piped to stdout stay clean
/// - RUST_LOG environment variable support
/// - JSON lines instead of text when `PANELCAM_LOG_JSON` is set
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if std::env::var_os("PANELCAM_LOG_JSON").is_some() {
        let fmt_layer = fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true);
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    } else {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true)
            .with_line_number(true);
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    }

    Ok(())
}
