//! DXF export of planar profiles.
//!
//! Every loop becomes a closed `LWPOLYLINE`; outer boundaries go on the
//! `OUTLINE` layer and holes on `HOLES`.

use crate::part::Part;
use crate::profile::Profile;
use dxf::entities::{Entity, EntityType, LwPolyline};
use dxf::enums::AcadVersion;
use dxf::{Drawing, LwPolylineVertex};
use panelcam_core::output::write_atomic;
use panelcam_core::{Error, GeometryError, Point2, Result};
use std::path::{Path, PathBuf};

/// Layer for outer boundaries
pub const OUTLINE_LAYER: &str = "OUTLINE";
/// Layer for hole boundaries
pub const HOLES_LAYER: &str = "HOLES";

/// What to export
#[derive(Debug, Clone, Copy)]
pub enum DxfSource<'a> {
    /// A planar profile
    Profile(&'a Profile),
    /// A 3D part; rejected, pass `part.projection()` instead
    Part(&'a Part),
}

fn polyline_entity(points: &[Point2], layer: &str) -> Entity {
    let mut poly = LwPolyline::default();
    poly.flags = 1; // closed
    poly.vertices = points
        .iter()
        .map(|p| LwPolylineVertex {
            x: p.x,
            y: p.y,
            ..Default::default()
        })
        .collect();
    let mut entity = Entity::new(EntityType::LwPolyline(poly));
    entity.common.layer = layer.to_string();
    entity
}

/// Build the drawing for a profile
pub fn profile_drawing(profile: &Profile) -> Drawing {
    let mut drawing = Drawing::new();
    // R12 has no LWPOLYLINE; older versions drop them on save.
    drawing.header.version = AcadVersion::R2000;
    for region in profile.regions() {
        drawing.add_entity(polyline_entity(&region.outer, OUTLINE_LAYER));
        for hole in &region.holes {
            drawing.add_entity(polyline_entity(hole, HOLES_LAYER));
        }
    }
    drawing
}

/// Write `source` as DXF, appending `.dxf` when missing
pub fn save_dxf(source: DxfSource<'_>, path: impl AsRef<Path>) -> Result<PathBuf> {
    let profile = match source {
        DxfSource::Profile(p) => p,
        DxfSource::Part(part) => {
            return Err(GeometryError::UnsupportedGeometry {
                reason: format!(
                    "part '{}' is a solid; export its projection instead",
                    part.name()
                ),
            }
            .into())
        }
    };

    let mut bytes = Vec::new();
    profile_drawing(profile)
        .save(&mut bytes)
        .map_err(|e| Error::Dxf(e.to_string()))?;
    write_atomic(path.as_ref(), "dxf", &bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_writes_two_layers() {
        let ring = Profile::rectangle(10.0, 10.0)
            .unwrap()
            .subtract(&Profile::rectangle(4.0, 4.0).unwrap())
            .unwrap();
        let drawing = profile_drawing(&ring);
        let layers: Vec<String> = drawing.entities().map(|e| e.common.layer.clone()).collect();
        assert_eq!(layers.len(), 2);
        assert!(layers.contains(&OUTLINE_LAYER.to_string()));
        assert!(layers.contains(&HOLES_LAYER.to_string()));
    }

    #[test]
    fn test_save_appends_extension() {
        let dir = tempfile::tempdir().unwrap();
        let profile = Profile::rounded_rectangle(22.0, 22.0, 0.5).unwrap();
        let written = save_dxf(DxfSource::Profile(&profile), dir.path().join("nested/sleeve")).unwrap();
        assert_eq!(written, dir.path().join("nested/sleeve.dxf"));
        let text = std::fs::read_to_string(&written).unwrap();
        assert!(text.contains("LWPOLYLINE"));
        assert!(text.contains(OUTLINE_LAYER));

        let reloaded = Drawing::load_file(&written).unwrap();
        assert!(reloaded.entities().count() > 0);
        assert!(reloaded
            .entities()
            .all(|e| matches!(e.specific, EntityType::LwPolyline(_))));
    }
}
