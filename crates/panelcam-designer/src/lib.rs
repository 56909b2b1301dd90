//! # PanelCAM Designer
//!
//! Geometry for panel switch parts: closed 2D profiles, prismatic solids built
//! from stacked extrusions, parts and assemblies, face enumeration and
//! classification, and DXF export.
//!
//! ## Architecture
//!
//! ```text
//! Profile (rounded rectangles, polylines, text glyphs, booleans)
//!   └── Solid (slabs between Z levels; add / subtract / intersect)
//!         └── Part (solid or assembly, colour, placement)
//!               ├── Faces (caps and merged walls)
//!               │     └── Classifier (bottom / walls / top groups)
//!               └── Projection ── DXF export
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use panelcam_designer::{classify, ClassifyOptions, LedgeSides, SwitchGeometry};
//!
//! let sleeve = SwitchGeometry::new(20.0, 20.0).sleeve(3.0, LedgeSides::BOTH)?;
//! let groups = classify(&sleeve, &ClassifyOptions::default())?;
//! let body_walls = groups
//!     .walls_adjacent_to(groups.bottom())
//!     .filtered(|f| f.boundary() == Some(panelcam_designer::Boundary::Outer));
//! ```

pub mod classify;
pub mod dxf_export;
pub mod face;
pub mod font_manager;
pub mod parametric;
pub mod part;
pub mod polygon;
pub mod profile;
pub mod solid;
mod text;

pub use classify::{classify, ClassifyOptions, FaceGroup, FaceGroups, Metric};
pub use dxf_export::{save_dxf, DxfSource};
pub use face::{Boundary, Face, FaceId, FaceKind, FaceSource, Footprint, WallPiece, WallRing};
pub use font_manager::FontSpec;
pub use parametric::{
    diffuser_panel, DiffuserOptions, LedgeSides, PanelLayout, SliderOptions, SlotValues,
    Switch8x8, SwitchGeometry,
};
pub use part::{assemble, AssemblyOptions, Part, PartBody, PartId, PartMetadata};
pub use profile::{Closure, Profile, ProfileKind, Region};
pub use solid::{BooleanMode, Facing, Slab, Solid, Workplane};
