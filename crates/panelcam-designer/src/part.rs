//! Parts and assemblies.
//!
//! A [`Part`] owns either a [`Solid`] or a list of child parts. Placements are
//! local-to-parent; faces, bounds and projections of a part are reported in the
//! part's own frame with every child placement applied.

use crate::face::{solid_faces, Face, FaceId, FaceSource};
use crate::profile::Profile;
use crate::solid::Solid;
use panelcam_core::{BoundingBox3, Color, GeometryError, Placement, Point3, Result, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable part identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartId(Uuid);

impl PartId {
    /// Fresh random id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PartId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Optional manufacturing hints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartMetadata {
    /// Stock thickness in mm
    pub thickness: Option<f64>,
    /// Stock material
    pub material: Option<String>,
}

/// What a part is made of
#[derive(Debug, Clone, PartialEq)]
pub enum PartBody {
    /// A single solid
    Solid(Solid),
    /// Owned children
    Assembly(Vec<Part>),
}

/// A named, coloured, placed body
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    id: PartId,
    name: String,
    body: PartBody,
    color: Option<Color>,
    placement: Placement,
    metadata: PartMetadata,
}

/// Options for [`assemble`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssemblyOptions {
    /// Reject siblings whose placed bounds overlap
    pub check_overlaps: bool,
    /// Overlap volume allowed before rejecting, in mm^3
    pub tolerance: f64,
}

impl Default for AssemblyOptions {
    fn default() -> Self {
        Self {
            check_overlaps: false,
            tolerance: 0.0,
        }
    }
}

impl Part {
    /// Leaf part from a solid
    pub fn new(name: impl Into<String>, solid: Solid, color: Color) -> Self {
        Self {
            id: PartId::new(),
            name: name.into(),
            body: PartBody::Solid(solid),
            color: Some(color),
            placement: Placement::identity(),
            metadata: PartMetadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: PartMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Replace the placement
    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    /// Move by `by`, applied after the current placement
    pub fn moved(mut self, by: &Placement) -> Self {
        self.placement = self.placement.then(by);
        self
    }

    pub fn id(&self) -> PartId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display colour; assemblies have none of their own
    pub fn color(&self) -> Option<Color> {
        self.color
    }

    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    pub fn metadata(&self) -> &PartMetadata {
        &self.metadata
    }

    pub fn body(&self) -> &PartBody {
        &self.body
    }

    /// The solid of a leaf part
    pub fn solid(&self) -> Option<&Solid> {
        match &self.body {
            PartBody::Solid(s) => Some(s),
            PartBody::Assembly(_) => None,
        }
    }

    /// Children of an assembly; empty for leaves
    pub fn children(&self) -> &[Part] {
        match &self.body {
            PartBody::Solid(_) => &[],
            PartBody::Assembly(children) => children,
        }
    }

    pub fn is_assembly(&self) -> bool {
        matches!(self.body, PartBody::Assembly(_))
    }

    /// Depth-first search by name, including this part
    pub fn find(&self, name: &str) -> Option<&Part> {
        if self.name == name {
            return Some(self);
        }
        self.children().iter().find_map(|c| c.find(name))
    }

    /// Remove a direct child by name
    pub fn detach_child(&mut self, name: &str) -> Option<Part> {
        match &mut self.body {
            PartBody::Solid(_) => None,
            PartBody::Assembly(children) => {
                let index = children.iter().position(|c| c.name == name)?;
                Some(children.remove(index))
            }
        }
    }

    /// Bounds in this part's own frame
    pub fn local_bounds(&self) -> BoundingBox3 {
        match &self.body {
            PartBody::Solid(s) => s.bounds(),
            PartBody::Assembly(children) => children
                .iter()
                .map(Part::bounds)
                .reduce(|a, b| a.union(&b))
                .unwrap_or_else(|| BoundingBox3::new(Point3::origin(), Point3::origin())),
        }
    }

    /// Bounds in the parent frame, placement applied
    pub fn bounds(&self) -> BoundingBox3 {
        self.local_bounds().transformed(&self.placement)
    }

    /// Total enclosed volume
    pub fn volume(&self) -> f64 {
        match &self.body {
            PartBody::Solid(s) => s.volume(),
            PartBody::Assembly(children) => children.iter().map(Part::volume).sum(),
        }
    }

    /// Silhouette on this part's XY plane.
    ///
    /// Fails with `UnsupportedGeometry` when a child is tilted so its slabs are
    /// no longer horizontal.
    pub fn projection(&self) -> Result<Profile> {
        let mut shapes = Vec::new();
        self.collect_projections(&Placement::identity(), &mut shapes)?;
        let mut iter = shapes.into_iter();
        let first = iter
            .next()
            .ok_or_else(|| GeometryError::invalid(format!("part '{}' has no solids", self.name)))?;
        iter.try_fold(first, |acc, p| acc.union(&p))
    }

    fn collect_projections(&self, frame: &Placement, out: &mut Vec<Profile>) -> Result<()> {
        match &self.body {
            PartBody::Solid(solid) => {
                let z = frame.transform_vector(&Vector3::z());
                if (z.z.abs() - 1.0).abs() > 1e-9 {
                    return Err(GeometryError::UnsupportedGeometry {
                        reason: format!("part '{}' is tilted out of the XY plane", self.name),
                    }
                    .into());
                }
                out.push(solid.projection()?.transformed(frame));
            }
            PartBody::Assembly(children) => {
                for child in children {
                    child.collect_projections(&child.placement.then(frame), out)?;
                }
            }
        }
        Ok(())
    }

    fn collect_faces(&self, root: PartId, frame: &Placement, body: &mut usize, out: &mut Vec<Face>) {
        match &self.body {
            PartBody::Solid(solid) => {
                let index = *body;
                *body += 1;
                for local in solid_faces(solid) {
                    let id = FaceId(out.len() as u32);
                    out.push(local.place(id, root, index, *frame));
                }
            }
            PartBody::Assembly(children) => {
                for child in children {
                    child.collect_faces(root, &child.placement.then(frame), body, out);
                }
            }
        }
    }
}

impl FaceSource for Part {
    fn part_id(&self) -> PartId {
        self.id
    }

    fn faces(&self) -> Result<Vec<Face>> {
        let mut faces = Vec::new();
        let mut body = 0;
        self.collect_faces(self.id, &Placement::identity(), &mut body, &mut faces);
        if faces.is_empty() {
            return Err(GeometryError::invalid(format!("part '{}' has no faces", self.name)).into());
        }
        tracing::debug!("Part '{}' has {} faces over {} solids", self.name, faces.len(), body);
        Ok(faces)
    }
}

/// Group parts under a new assembly, moving each by its placement.
pub fn assemble(
    name: impl Into<String>,
    parts: Vec<(Part, Placement)>,
    options: &AssemblyOptions,
) -> Result<Part> {
    let name = name.into();
    if parts.is_empty() {
        return Err(GeometryError::invalid(format!("assembly '{}' has no parts", name)).into());
    }
    let children: Vec<Part> = parts.into_iter().map(|(p, at)| p.moved(&at)).collect();

    if options.check_overlaps {
        for (i, a) in children.iter().enumerate() {
            for b in &children[i + 1..] {
                let volume = a.bounds().overlap_volume(&b.bounds());
                if volume > options.tolerance {
                    return Err(GeometryError::OverlapDetected {
                        first: a.name.clone(),
                        second: b.name.clone(),
                        volume,
                    }
                    .into());
                }
            }
        }
    }

    tracing::debug!("Assembled '{}' from {} parts", name, children.len());
    Ok(Part {
        id: PartId::new(),
        name,
        body: PartBody::Assembly(children),
        color: None,
        placement: Placement::identity(),
        metadata: PartMetadata::default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solid::Workplane;

    fn plate(name: &str, size: f64) -> Part {
        let solid = Solid::from_extrusion(&Profile::rectangle(size, size).unwrap(), Workplane::xy(0.0), -1.0)
            .unwrap();
        Part::new(name, solid, Color::STEELBLUE)
    }

    #[test]
    fn test_assembly_bounds_are_union_of_children() {
        let asm = assemble(
            "pair",
            vec![
                (plate("a", 2.0), Placement::translation(-5.0, 0.0, 0.0)),
                (plate("b", 2.0), Placement::translation(5.0, 0.0, 0.0)),
            ],
            &AssemblyOptions::default(),
        )
        .unwrap();
        let b = asm.bounds();
        assert!((b.min.x + 6.0).abs() < 1e-9);
        assert!((b.max.x - 6.0).abs() < 1e-9);
        assert!(asm.color().is_none());
        assert_eq!(asm.children()[0].color(), Some(Color::STEELBLUE));
    }

    #[test]
    fn test_overlap_detection_is_opt_in() {
        let parts = || vec![(plate("a", 2.0), Placement::identity()), (plate("b", 2.0), Placement::translation(1.0, 0.0, 0.0))];
        assert!(assemble("loose", parts(), &AssemblyOptions::default()).is_ok());
        let err = assemble(
            "strict",
            parts(),
            &AssemblyOptions {
                check_overlaps: true,
                tolerance: 0.0,
            },
        )
        .unwrap_err();
        match err {
            panelcam_core::Error::Geometry(GeometryError::OverlapDetected { first, second, volume }) => {
                assert_eq!(first, "a");
                assert_eq!(second, "b");
                assert!((volume - 2.0).abs() < 1e-9);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_touching_parts_do_not_overlap() {
        let asm = assemble(
            "row",
            vec![(plate("a", 2.0), Placement::identity()), (plate("b", 2.0), Placement::translation(2.0, 0.0, 0.0))],
            &AssemblyOptions {
                check_overlaps: true,
                tolerance: 0.0,
            },
        );
        assert!(asm.is_ok());
    }

    #[test]
    fn test_faces_use_root_id_and_child_placement() {
        let asm = assemble(
            "pair",
            vec![
                (plate("a", 2.0), Placement::identity()),
                (plate("b", 2.0), Placement::translation(10.0, 0.0, 0.0)),
            ],
            &AssemblyOptions::default(),
        )
        .unwrap();
        let faces = asm.faces().unwrap();
        assert_eq!(faces.len(), 12);
        assert!(faces.iter().all(|f| f.part == asm.id()));
        assert!(faces.iter().enumerate().all(|(i, f)| f.id == FaceId(i as u32)));
        assert!(faces.iter().filter(|f| f.body == 1).all(|f| f.centroid.x > 8.0));
    }

    #[test]
    fn test_detach_and_projection() {
        let mut asm = assemble(
            "pair",
            vec![
                (plate("a", 2.0), Placement::identity()),
                (plate("b", 2.0), Placement::translation(10.0, 0.0, 0.0)),
            ],
            &AssemblyOptions::default(),
        )
        .unwrap();
        let projection = asm.projection().unwrap();
        assert_eq!(projection.regions().len(), 2);
        assert!((projection.area() - 8.0).abs() < 1e-9);

        let b = asm.detach_child("b").unwrap();
        assert!((b.bounds().center().x - 10.0).abs() < 1e-9);
        assert_eq!(asm.children().len(), 1);
        assert!(asm.detach_child("missing").is_none());
    }

    #[test]
    fn test_tilted_projection_unsupported() {
        let tilted = assemble("tilted", vec![(plate("a", 2.0), Placement::rotation_x(90.0))], &AssemblyOptions::default())
            .unwrap();
        assert!(matches!(
            tilted.projection().unwrap_err(),
            panelcam_core::Error::Geometry(GeometryError::UnsupportedGeometry { .. })
        ));
    }
}
