//! # PanelCAM CAM Tools
//!
//! Turns classified faces of a part into machining programs.
//!
//! ## Pipeline
//!
//! - **Job**: origin, stock part and an ordered list of operations
//!   (profile, pocket, helical hole)
//! - **Engine**: [`CamEngine`] realizes a job into toolpaths and raw program
//!   text; [`ContourEngine`] offsets contours with `cavalier_contours`
//! - **Dialect**: pure post-processing of the raw text per controller
//! - **Export**: [`to_gcode`] and [`save_gcode`]
//! - **Switch jobs**: ready-made jobs for the sleeve, slider and diffuser panel

pub mod dialect;
pub mod engine;
pub mod export;
pub mod gcode_gen;
pub mod job;
pub mod switch_jobs;
pub mod toolpath;

pub use dialect::Dialect;
pub use engine::{CamEngine, ContourEngine};
pub use export::{save_gcode, to_gcode, GCODE_EXTENSION};
pub use job::{
    Dressup, Job, JobOrigin, JobSettings, MachineFrame, Operation, OperationKind, PocketOptions,
    PocketPattern, ProfileOptions, Side,
};
pub use switch_jobs::{diffuser_panel_job, sleeve_job, slider_job};
pub use toolpath::{Move, OperationToolpath, ToolpathPlan};
