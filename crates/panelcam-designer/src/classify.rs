//! Face classification.
//!
//! Faces are keyed by a metric, sorted, and bucketed so that coplanar pieces
//! land together. The lowest bucket is the bottom, the highest the top, and
//! everything between is a wall band. The number of wall bands depends on the
//! part; combinators such as [`FaceGroups::walls_adjacent_to`] select faces
//! without relying on positional indices.

use crate::face::{Boundary, Face, FaceId, FaceSource, Footprint};
use crate::part::PartId;
use crate::polygon;
use panelcam_core::{GeometryError, Result, Vector3};
use std::fmt;

/// Cosine above which a normal counts as parallel to the axis
const PARALLEL_COS: f64 = 1.0 - 1e-6;

/// Cosine below which a normal counts as perpendicular to the axis
const LATERAL_COS: f64 = 1e-6;

/// Tolerance for edge adjacency between caps and walls
const ADJACENCY_TOLERANCE: f64 = 1e-6;

/// Sort key for classification
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Metric {
    /// Signed distance of the face centroid along a direction
    Axis(Vector3),
    /// Face area
    Area,
}

impl Default for Metric {
    fn default() -> Self {
        Metric::Axis(Vector3::z())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ClassifyOptions {
    pub metric: Metric,
    /// Faces whose keys differ from a bucket's first key by at most this join it
    pub epsilon: f64,
}

impl Default for ClassifyOptions {
    fn default() -> Self {
        Self {
            metric: Metric::default(),
            epsilon: 1e-3,
        }
    }
}

/// How a face normal relates to the classification axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Orientation {
    Along,
    Against,
    Lateral,
    Oblique,
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Orientation::Along => "facing along the axis",
            Orientation::Against => "facing against the axis",
            Orientation::Lateral => "lateral",
            Orientation::Oblique => "oblique",
        };
        f.write_str(s)
    }
}

fn orientation(normal: &Vector3, axis: &Vector3) -> Orientation {
    let c = normal.dot(axis);
    if c >= PARALLEL_COS {
        Orientation::Along
    } else if c <= -PARALLEL_COS {
        Orientation::Against
    } else if c.abs() <= LATERAL_COS {
        Orientation::Lateral
    } else {
        Orientation::Oblique
    }
}

/// Faces sharing one bucket, with the bucket key
#[derive(Debug, Clone, PartialEq)]
pub struct FaceGroup {
    key: f64,
    faces: Vec<Face>,
}

impl FaceGroup {
    /// Build a group directly; faces keep their given order
    pub fn new(key: f64, faces: Vec<Face>) -> Self {
        Self { key, faces }
    }

    /// Metric value of the bucket's first face
    pub fn key(&self) -> f64 {
        self.key
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Face> {
        self.faces.iter()
    }

    pub fn ids(&self) -> Vec<FaceId> {
        self.faces.iter().map(|f| f.id).collect()
    }

    pub fn contains(&self, id: FaceId) -> bool {
        self.faces.iter().any(|f| f.id == id)
    }

    /// Owning part, if the group is not empty
    pub fn part(&self) -> Option<PartId> {
        self.faces.first().map(|f| f.part)
    }

    /// Faces of both groups, without duplicates; keeps the lower key
    pub fn merged(&self, other: &FaceGroup) -> FaceGroup {
        let mut faces = self.faces.clone();
        faces.extend(other.faces.iter().filter(|f| !self.contains(f.id)).cloned());
        faces.sort_by_key(|f| f.id);
        FaceGroup {
            key: self.key.min(other.key),
            faces,
        }
    }

    /// Faces matching `keep`
    pub fn filtered(&self, keep: impl Fn(&Face) -> bool) -> FaceGroup {
        FaceGroup {
            key: self.key,
            faces: self.faces.iter().filter(|f| keep(f)).cloned().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a FaceGroup {
    type Item = &'a Face;
    type IntoIter = std::slice::Iter<'a, Face>;

    fn into_iter(self) -> Self::IntoIter {
        self.faces.iter()
    }
}

/// Ordered classification result; groups partition the faces of one part
#[derive(Debug, Clone, PartialEq)]
pub struct FaceGroups {
    part: PartId,
    groups: Vec<FaceGroup>,
}

impl FaceGroups {
    pub fn part(&self) -> PartId {
        self.part
    }

    /// All groups, ascending by key
    pub fn groups(&self) -> &[FaceGroup] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Lowest group
    pub fn bottom(&self) -> &FaceGroup {
        // `classify` never builds an empty partition.
        debug_assert!(!self.groups.is_empty());
        &self.groups[0]
    }

    /// Highest group; the same as [`bottom`](Self::bottom) when there is one bucket
    pub fn top(&self) -> &FaceGroup {
        debug_assert!(!self.groups.is_empty());
        &self.groups[self.groups.len() - 1]
    }

    /// Groups strictly between bottom and top
    pub fn walls(&self) -> &[FaceGroup] {
        if self.groups.len() <= 2 {
            &[]
        } else {
            &self.groups[1..self.groups.len() - 1]
        }
    }

    /// Union of every intermediate group
    pub fn all_walls(&self) -> FaceGroup {
        let key = self.walls().first().map_or(self.bottom().key, |g| g.key);
        FaceGroup {
            key,
            faces: self.walls().iter().flat_map(|g| g.faces.iter().cloned()).collect(),
        }
    }

    /// Lateral faces on outer boundaries, from every group
    pub fn outer_walls(&self) -> FaceGroup {
        self.every_wall(Boundary::Outer)
    }

    /// Lateral faces on hole boundaries, from every group
    pub fn inner_walls(&self) -> FaceGroup {
        self.every_wall(Boundary::Inner)
    }

    fn every_wall(&self, boundary: Boundary) -> FaceGroup {
        let faces: Vec<Face> = self
            .groups
            .iter()
            .flat_map(|g| g.faces.iter())
            .filter(|f| f.boundary() == Some(boundary))
            .cloned()
            .collect();
        FaceGroup {
            key: faces.first().map_or(self.bottom().key, |f| self.key_of(f.id)),
            faces,
        }
    }

    /// Wall faces sharing an edge with any cap in `caps`
    pub fn walls_adjacent_to(&self, caps: &FaceGroup) -> FaceGroup {
        let faces: Vec<Face> = self
            .groups
            .iter()
            .flat_map(|g| g.faces.iter())
            .filter(|wall| wall.is_wall())
            .filter(|wall| caps.iter().any(|cap| shares_edge(cap, wall)))
            .cloned()
            .collect();
        FaceGroup {
            key: faces.first().map_or(caps.key, |f| self.key_of(f.id)),
            faces,
        }
    }

    /// Union of the wall groups with keys in `[lo, hi]`
    pub fn walls_between(&self, lo: f64, hi: f64) -> FaceGroup {
        let selected: Vec<&FaceGroup> = self
            .walls()
            .iter()
            .filter(|g| g.key >= lo && g.key <= hi)
            .collect();
        FaceGroup {
            key: selected.first().map_or(lo, |g| g.key),
            faces: selected.iter().flat_map(|g| g.faces.iter().cloned()).collect(),
        }
    }

    /// Group holding the face
    pub fn group_containing(&self, id: FaceId) -> Option<&FaceGroup> {
        self.groups.iter().find(|g| g.contains(id))
    }

    /// Distinct wall groups that `faces` draw from; callers combining a
    /// selection positionally would have to union this many groups
    pub fn wall_groups_spanned(&self, faces: &FaceGroup) -> usize {
        self.walls()
            .iter()
            .filter(|g| g.faces.iter().any(|f| faces.contains(f.id)))
            .count()
    }

    fn key_of(&self, id: FaceId) -> f64 {
        self.group_containing(id).map_or(0.0, |g| g.key)
    }
}

/// True when a wall piece ends at the cap's level along the cap's boundary.
fn shares_edge(cap: &Face, wall: &Face) -> bool {
    if cap.body != wall.body || cap.part != wall.part {
        return false;
    }
    let (Footprint::Cap { z, region }, Footprint::Wall { pieces, .. }) = (&cap.footprint, &wall.footprint)
    else {
        return false;
    };
    pieces.iter().any(|piece| {
        let at_level = (piece.z_min - z).abs() <= ADJACENCY_TOLERANCE
            || (piece.z_max - z).abs() <= ADJACENCY_TOLERANCE;
        at_level
            && region.loops().any(|ring| {
                polygon::on_boundary(&piece.start, ring, ADJACENCY_TOLERANCE)
                    && polygon::on_boundary(&piece.end, ring, ADJACENCY_TOLERANCE)
                    && polygon::on_boundary(
                        &nalgebra::center(&piece.start, &piece.end),
                        ring,
                        ADJACENCY_TOLERANCE,
                    )
            })
    })
}

/// Partition the faces of `source` into ordered groups.
pub fn classify(source: &impl FaceSource, options: &ClassifyOptions) -> Result<FaceGroups> {
    if !(options.epsilon.is_finite() && options.epsilon >= 0.0) {
        return Err(GeometryError::invalid(format!("epsilon {} must be non-negative", options.epsilon)).into());
    }
    let axis = match options.metric {
        Metric::Axis(v) => {
            let n = v.norm();
            if !(n.is_finite() && n > 0.0) {
                return Err(GeometryError::invalid("classification axis must be non-zero").into());
            }
            Some(v / n)
        }
        Metric::Area => None,
    };

    let mut keyed: Vec<(f64, Face)> = source
        .faces()?
        .into_iter()
        .map(|f| {
            let key = match axis {
                Some(a) => f.centroid.coords.dot(&a),
                None => f.area,
            };
            (key, f)
        })
        .collect();
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.id.cmp(&b.1.id)));

    let mut groups: Vec<FaceGroup> = Vec::new();
    for (key, face) in keyed {
        match groups.last_mut() {
            Some(g) if key - g.key <= options.epsilon => g.faces.push(face),
            _ => groups.push(FaceGroup {
                key,
                faces: vec![face],
            }),
        }
    }

    if groups.is_empty() {
        return Err(GeometryError::invalid("nothing to classify, the source has no faces").into());
    }

    if let Some(a) = axis {
        for g in &groups {
            let first = orientation(&g.faces[0].normal, &a);
            if let Some(other) = g.faces.iter().find(|f| orientation(&f.normal, &a) != first) {
                return Err(GeometryError::AmbiguousClassification {
                    key: g.key,
                    reason: format!(
                        "face {} is {} but face {} is {}",
                        g.faces[0].id,
                        first,
                        other.id,
                        orientation(&other.normal, &a)
                    ),
                }
                .into());
            }
        }
    }

    tracing::debug!(
        "Classified {} faces into {} groups",
        groups.iter().map(FaceGroup::len).sum::<usize>(),
        groups.len()
    );
    Ok(FaceGroups {
        part: source.part_id(),
        groups,
    })
}
