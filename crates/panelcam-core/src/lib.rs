//! # PanelCAM Core
//!
//! Core types and utilities for PanelCAM.
//! Provides the error hierarchy, units, tool catalog, shared geometric
//! value types and the atomic output-file helper used by the exporters.

pub mod data;
pub mod error;
pub mod output;
pub mod units;

pub use data::{
    init_standard_library, BoundingBox3, Color, Placement, Point2, Point3, Tool,
    ToolCuttingParams, ToolId, ToolLibrary, ToolType, Vector3,
};

pub use error::{CamError, Error, GeometryError, Result};
pub use units::MeasurementSystem;
