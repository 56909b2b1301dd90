//! PanelCAM Settings Crate
//!
//! Batch configuration for the command-line runner: output locations,
//! controller dialect, machine clearances, tool selection and the list of
//! switch parts to build.

pub mod config;

pub use config::{
    BatchConfig, DiffuserCell, JobEntry, MachineSettings, OutputSettings, PanelRow, ToolEntry,
    ToolSettings,
};
