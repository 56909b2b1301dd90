//! Data models shared across the workspace

pub mod geometry;
pub mod tools;

pub use geometry::{BoundingBox3, Color, Placement, Point2, Point3, Vector3};
pub use tools::{init_standard_library, Tool, ToolCuttingParams, ToolId, ToolLibrary, ToolType};
