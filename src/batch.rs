//! Batch runner: builds every configured part, writes its program and
//! optionally its DXF projection.
//!
//! A part stops at its first error; the error is logged and the next part
//! runs. The report carries every failure so the caller can pick an exit
//! status.

use panelcam_camtools::{
    diffuser_panel_job, save_gcode, sleeve_job, slider_job, to_gcode, ContourEngine, Job,
};
use panelcam_core::{Error, Result};
use panelcam_designer::{diffuser_panel, save_dxf, DxfSource, DiffuserOptions, Part};
use panelcam_settings::{BatchConfig, JobEntry, ToolSettings};
use std::path::PathBuf;
use tracing::{error, info};

/// Outcome of one batch run
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Every file written, in order
    pub written: Vec<PathBuf>,
    /// Parts that failed, by name
    pub failures: Vec<(String, Error)>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

fn build_part(entry: &JobEntry) -> Result<Part> {
    let geometry = entry.geometry();
    match entry {
        JobEntry::Sleeve {
            stock_thickness,
            ledges,
            ..
        } => geometry.sleeve(*stock_thickness, *ledges),
        JobEntry::Slider { options, .. } => geometry.slider(options),
        JobEntry::DiffuserPanel { rows, layout, .. } => {
            let cells: Vec<Vec<DiffuserOptions>> = rows
                .iter()
                .map(|row| row.cells.iter().map(|c| c.to_options()).collect())
                .collect();
            diffuser_panel(&geometry, &cells, layout)
        }
    }
}

fn build_job<'a>(config: &BatchConfig, entry: &JobEntry, part: &'a Part) -> Result<Job<'a>> {
    let library = config.tools.library();
    let dialect = config.output.dialect;
    let job = match entry {
        JobEntry::Sleeve { .. } => {
            sleeve_job(part, &ToolSettings::resolve(&library, config.tools.part_tool)?, dialect)?
        }
        JobEntry::Slider { .. } => {
            slider_job(part, &ToolSettings::resolve(&library, config.tools.part_tool)?, dialect)?
        }
        JobEntry::DiffuserPanel { .. } => diffuser_panel_job(
            part,
            &ToolSettings::resolve(&library, config.tools.engrave_tool)?,
            &ToolSettings::resolve(&library, config.tools.panel_tool)?,
            dialect,
        )?,
    };
    job.with_settings(config.machine.job_settings())
}

/// Build, machine and export one entry, returning the files written.
pub fn run_entry(config: &BatchConfig, entry: &JobEntry, engine: &ContourEngine) -> Result<Vec<PathBuf>> {
    let name = entry.name();
    let part = build_part(entry)?;
    let job = build_job(config, entry, &part)?;
    let text = to_gcode(&job, engine)?;

    let mut written = vec![save_gcode(&text, config.output.nc_dir.join(&name))?];
    if config.output.write_dxf {
        let outline = part.projection()?;
        written.push(save_dxf(DxfSource::Profile(&outline), config.output.dxf_dir.join(&name))?);
    }
    Ok(written)
}

/// Run every entry of `config`.
pub fn run_batch(config: &BatchConfig) -> BatchReport {
    let engine = ContourEngine::default();
    let mut report = BatchReport::default();

    for entry in &config.jobs {
        let name = entry.name();
        match run_entry(config, entry, &engine) {
            Ok(files) => {
                info!("{}: wrote {} files", name, files.len());
                report.written.extend(files);
            }
            Err(e) => {
                error!("{}: {}", name, e);
                report.failures.push((name, e));
            }
        }
    }

    info!(
        "Batch finished: {} files written, {} of {} parts failed",
        report.written.len(),
        report.failures.len(),
        config.jobs.len()
    );
    report
}
