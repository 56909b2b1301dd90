//! Batch configuration for the panelcam runner
//!
//! A batch names where programs and drawings go, which controller dialect to
//! post-process for, machine clearances, the end mills to use and the switch
//! parts to build. Files are JSON or TOML:
//!
//! ```toml
//! [output]
//! nc_dir = "nc"
//! dialect = "grbl"
//!
//! [[jobs]]
//! kind = "sleeve"
//! width = 20.0
//! height = 20.0
//! stock_thickness = 3.0
//! ```

pub use panelcam_camtools::Dialect;
pub use panelcam_core::MeasurementSystem;

use panelcam_camtools::JobSettings;
use panelcam_core::{init_standard_library, output, Error, Result, Tool, ToolLibrary};
use panelcam_designer::{
    DiffuserOptions, FontSpec, LedgeSides, PanelLayout, SliderOptions, SwitchGeometry,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where output files go and which controller they target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Directory for `.nc` programs
    pub nc_dir: PathBuf,
    /// Directory for `.dxf` projections
    pub dxf_dir: PathBuf,
    /// Controller dialect of every program in the batch
    pub dialect: Dialect,
    /// Also write a DXF projection of each part
    pub write_dxf: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            nc_dir: PathBuf::from("nc"),
            dxf_dir: PathBuf::from("dxf"),
            dialect: Dialect::Grbl,
            write_dxf: true,
        }
    }
}

/// Machine preference settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineSettings {
    /// Rapid clearance above the stock in mm
    pub safe_height: f64,
    /// Units the programs are written in
    pub units: MeasurementSystem,
}

impl Default for MachineSettings {
    fn default() -> Self {
        let job = JobSettings::default();
        Self {
            safe_height: job.safe_height,
            units: job.units,
        }
    }
}

impl MachineSettings {
    /// Settings applied to every job of the batch
    pub fn job_settings(&self) -> JobSettings {
        JobSettings {
            safe_height: self.safe_height,
            units: self.units,
        }
    }
}

/// End mill added to, or overriding, the standard catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolEntry {
    /// Cutting diameter in mm; an existing end mill of this size is replaced
    pub diameter: f64,
    /// T number, assigned by the catalog when 0
    #[serde(default)]
    pub number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpm: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feed_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plunge_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth_per_pass: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stepover_percent: Option<f64>,
}

impl ToolEntry {
    fn apply(&self, base: Option<&Tool>) -> Tool {
        let mut tool = base.cloned().unwrap_or_else(|| Tool::endmill(self.diameter));
        if self.number != 0 {
            tool.number = self.number;
        }
        if let Some(rpm) = self.rpm {
            tool.params.rpm = rpm;
        }
        if let Some(feed) = self.feed_rate {
            tool.params.feed_rate = feed;
        }
        if let Some(plunge) = self.plunge_rate {
            tool.params.plunge_rate = plunge;
        }
        if let Some(depth) = self.depth_per_pass {
            tool.params.depth_per_pass = depth;
        }
        if let Some(stepover) = self.stepover_percent {
            tool.params.stepover_percent = stepover;
        }
        tool
    }
}

/// Which end mills the switch jobs use
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    /// Cutter for sleeve and slider profiles
    pub part_tool: f64,
    /// Cutter for diffuser engravings
    pub engrave_tool: f64,
    /// Cutter that frees diffusers from the panel
    pub panel_tool: f64,
    /// Catalog additions and overrides
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub catalog: Vec<ToolEntry>,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            part_tool: 1.0,
            engrave_tool: 1.0,
            panel_tool: 3.175,
            catalog: Vec::new(),
        }
    }
}

impl ToolSettings {
    /// Standard catalog with the configured entries applied
    pub fn library(&self) -> ToolLibrary {
        let mut library = init_standard_library();
        for entry in &self.catalog {
            let existing = library.endmill(entry.diameter).cloned();
            if let Some(old) = &existing {
                library.remove_tool(&old.id);
            }
            library.add_tool(entry.apply(existing.as_ref()));
        }
        library
    }

    /// End mill of `diameter` from `library`
    pub fn resolve(library: &ToolLibrary, diameter: f64) -> Result<Tool> {
        library
            .endmill(diameter)
            .cloned()
            .ok_or_else(|| Error::Config(format!("no {} mm end mill in the tool catalog", diameter)))
    }
}

/// One diffuser of a panel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffuserCell {
    /// Legend text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Font family name, or a path to a `.ttf`/`.otf` file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_size: Option<f64>,
    pub frame: bool,
    pub triangle: bool,
}

impl DiffuserCell {
    pub fn to_options(&self) -> DiffuserOptions {
        let mut options = DiffuserOptions {
            text: self.text.clone(),
            frame: self.frame,
            triangle: self.triangle,
            ..DiffuserOptions::default()
        };
        if let Some(font) = &self.font {
            let lower = font.to_lowercase();
            options.font = if lower.ends_with(".ttf") || lower.ends_with(".otf") {
                FontSpec::File(PathBuf::from(font))
            } else {
                FontSpec::Family(font.clone())
            };
        }
        if let Some(size) = self.text_size {
            options.text_size = size;
        }
        options
    }
}

/// One row of a diffuser panel, left to right
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PanelRow {
    pub cells: Vec<DiffuserCell>,
}

fn default_stock() -> f64 {
    3.0
}

fn default_ledges() -> LedgeSides {
    LedgeSides::BOTH
}

/// A switch part to build and machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JobEntry {
    Sleeve {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        width: f64,
        height: f64,
        #[serde(default = "default_stock")]
        stock_thickness: f64,
        #[serde(default = "default_ledges")]
        ledges: LedgeSides,
    },
    Slider {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        width: f64,
        height: f64,
        #[serde(default)]
        options: SliderOptions,
    },
    DiffuserPanel {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        width: f64,
        height: f64,
        rows: Vec<PanelRow>,
        #[serde(default)]
        layout: PanelLayout,
    },
}

impl JobEntry {
    /// Output file stem, `sleeve_20x20x3` unless named explicitly
    pub fn name(&self) -> String {
        match self {
            Self::Sleeve {
                name: Some(name), ..
            }
            | Self::Slider {
                name: Some(name), ..
            }
            | Self::DiffuserPanel {
                name: Some(name), ..
            } => name.clone(),
            Self::Sleeve {
                width,
                height,
                stock_thickness,
                ..
            } => format!("sleeve_{}x{}x{}", width, height, stock_thickness),
            Self::Slider {
                width,
                height,
                options,
                ..
            } => format!("slider_{}x{}x{}", width, height, options.stock_thickness),
            Self::DiffuserPanel {
                width, height, rows, ..
            } => format!("diffusers_{}x{}_{}", width, height, rows.len()),
        }
    }

    /// Nominal switch dimensions of the entry
    pub fn geometry(&self) -> SwitchGeometry {
        let (width, height) = match self {
            Self::Sleeve { width, height, .. }
            | Self::Slider { width, height, .. }
            | Self::DiffuserPanel { width, height, .. } => (*width, *height),
        };
        SwitchGeometry::new(width, height)
    }

    pub fn validate(&self) -> Result<()> {
        let name = self.name();
        let geometry = self.geometry();
        if !(geometry.width.is_finite() && geometry.width > 0.0)
            || !(geometry.height.is_finite() && geometry.height > 0.0)
        {
            return Err(Error::Config(format!("{}: width and height must be > 0", name)));
        }
        match self {
            Self::Sleeve {
                stock_thickness, ..
            } if *stock_thickness <= 0.0 => {
                Err(Error::Config(format!("{}: stock thickness must be > 0", name)))
            }
            Self::Slider { options, .. } if options.stock_thickness <= 0.0 => {
                Err(Error::Config(format!("{}: stock thickness must be > 0", name)))
            }
            Self::DiffuserPanel { rows, .. } if rows.is_empty() || rows.iter().any(|r| r.cells.is_empty()) => {
                Err(Error::Config(format!("{}: every panel row needs at least one diffuser", name)))
            }
            _ => Ok(()),
        }
    }
}

/// Complete batch configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub output: OutputSettings,
    pub machine: MachineSettings,
    pub tools: ToolSettings,
    pub jobs: Vec<JobEntry>,
}

impl Default for BatchConfig {
    /// A 20x20 sleeve, slider and a two-diffuser panel
    fn default() -> Self {
        Self {
            output: OutputSettings::default(),
            machine: MachineSettings::default(),
            tools: ToolSettings::default(),
            jobs: vec![
                JobEntry::Sleeve {
                    name: None,
                    width: 20.0,
                    height: 20.0,
                    stock_thickness: default_stock(),
                    ledges: LedgeSides::BOTH,
                },
                JobEntry::Slider {
                    name: None,
                    width: 20.0,
                    height: 20.0,
                    options: SliderOptions::default(),
                },
                JobEntry::DiffuserPanel {
                    name: None,
                    width: 20.0,
                    height: 20.0,
                    rows: vec![PanelRow {
                        cells: vec![
                            DiffuserCell {
                                triangle: true,
                                ..DiffuserCell::default()
                            },
                            DiffuserCell {
                                frame: true,
                                ..DiffuserCell::default()
                            },
                        ],
                    }],
                    layout: PanelLayout::default(),
                },
            ],
        }
    }
}

enum Format {
    Json,
    Toml,
}

fn format_of(path: &Path) -> Result<Format> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Format::Json),
        Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(Format::Toml),
        _ => Err(Error::Config(format!(
            "{}: config file must be .json or .toml",
            path.display()
        ))),
    }
}

impl BatchConfig {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// `batch.toml` in the user's configuration directory, if there is one
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("panelcam").join("batch.toml"))
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let format = format_of(path)?;
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;

        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)
                .map_err(|e| Error::Config(format!("Invalid JSON config: {}", e)))?,
            Format::Toml => toml::from_str(&content)
                .map_err(|e| Error::Config(format!("Invalid TOML config: {}", e)))?,
        };

        config.validate()?;
        tracing::info!("Loaded batch of {} jobs from {}", config.jobs.len(), path.display());
        Ok(config)
    }

    /// The file at `path`, else the user's default file when it exists, else the defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_file(path);
        }
        match Self::default_path().filter(|p| p.is_file()) {
            Some(path) => Self::load_from_file(&path),
            None => {
                tracing::debug!("No batch config found, using the default batch");
                Ok(Self::default())
            }
        }
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> Result<PathBuf> {
        self.validate()?;

        let (content, extension) = match format_of(path)? {
            Format::Json => (
                serde_json::to_string_pretty(self)
                    .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?,
                "json",
            ),
            Format::Toml => (
                toml::to_string_pretty(self)
                    .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?,
                "toml",
            ),
        };

        output::write_atomic(path, extension, content.as_bytes())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !(self.machine.safe_height.is_finite() && self.machine.safe_height > 0.0) {
            return Err(Error::Config("Safe height must be > 0".to_string()));
        }

        let tools = &self.tools;
        for diameter in [tools.part_tool, tools.engrave_tool, tools.panel_tool] {
            if !(diameter.is_finite() && diameter > 0.0) {
                return Err(Error::Config("Tool diameters must be > 0".to_string()));
            }
        }
        for entry in &tools.catalog {
            if !(entry.diameter.is_finite() && entry.diameter > 0.0) {
                return Err(Error::Config("Catalog tool diameters must be > 0".to_string()));
            }
        }

        if self.output.nc_dir.as_os_str().is_empty() {
            return Err(Error::Config("Output directory must not be empty".to_string()));
        }

        for job in &self.jobs {
            job.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_batch_is_valid() {
        let config = BatchConfig::default();
        assert!(config.validate().is_ok());
        let names: Vec<String> = config.jobs.iter().map(JobEntry::name).collect();
        assert_eq!(names, vec!["sleeve_20x20x3", "slider_20x20x5", "diffusers_20x20_1"]);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: BatchConfig = toml::from_str(
            r#"
            [output]
            dialect = "linuxcnc"

            [[jobs]]
            kind = "sleeve"
            width = 18
            height = 12
            "#,
        )
        .unwrap();
        assert_eq!(config.output.dialect, Dialect::LinuxCnc);
        assert_eq!(config.output.nc_dir, PathBuf::from("nc"));
        assert_eq!(config.machine.safe_height, 5.0);
        assert_eq!(
            config.jobs,
            vec![JobEntry::Sleeve {
                name: None,
                width: 18.0,
                height: 12.0,
                stock_thickness: 3.0,
                ledges: LedgeSides::BOTH,
            }]
        );
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = BatchConfig::default();
        config.machine.safe_height = 0.0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = BatchConfig::default();
        config.tools.panel_tool = -1.0;
        assert!(config.validate().is_err());

        let mut config = BatchConfig::default();
        config.jobs.push(JobEntry::DiffuserPanel {
            name: Some("empty".to_string()),
            width: 20.0,
            height: 20.0,
            rows: vec![PanelRow::default()],
            layout: PanelLayout::default(),
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_catalog_override_replaces_standard_tool() {
        let tools = ToolSettings {
            catalog: vec![
                ToolEntry {
                    diameter: 1.0,
                    number: 0,
                    rpm: None,
                    feed_rate: Some(250.0),
                    plunge_rate: None,
                    depth_per_pass: None,
                    stepover_percent: None,
                },
                ToolEntry {
                    diameter: 2.0,
                    number: 7,
                    rpm: Some(18000),
                    feed_rate: None,
                    plunge_rate: None,
                    depth_per_pass: None,
                    stepover_percent: None,
                },
            ],
            ..ToolSettings::default()
        };
        let library = tools.library();
        assert_eq!(library.len(), 3);

        let one = ToolSettings::resolve(&library, 1.0).unwrap();
        assert_eq!(one.number, 1);
        assert_eq!(one.params.feed_rate, 250.0);
        assert_eq!(one.params.depth_per_pass, 0.5);

        let two = ToolSettings::resolve(&library, 2.0).unwrap();
        assert_eq!((two.number, two.params.rpm), (7, 18000));
        assert!(matches!(ToolSettings::resolve(&library, 6.0), Err(Error::Config(_))));
    }

    #[test]
    fn test_cell_font_spec() {
        let cell = DiffuserCell {
            text: Some("A".to_string()),
            font: Some("fonts/Legend.TTF".to_string()),
            ..DiffuserCell::default()
        };
        assert_eq!(cell.to_options().font, FontSpec::File(PathBuf::from("fonts/Legend.TTF")));

        let cell = DiffuserCell {
            font: Some("Serif".to_string()),
            text_size: Some(4.0),
            ..DiffuserCell::default()
        };
        let options = cell.to_options();
        assert_eq!(options.font, FontSpec::Family("Serif".to_string()));
        assert_eq!(options.text_size, 4.0);
    }
}
