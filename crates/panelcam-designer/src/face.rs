//! Bounding faces of solids and parts.
//!
//! Every slab level contributes cap faces (one per connected region of material
//! exposed up or down) and every loop edge of every slab contributes a wall
//! piece. Coplanar wall pieces that touch are merged into one face, so a bore
//! cut through several slabs is a single wall and a flush side with no ledge is
//! one L-shaped face.

use crate::part::PartId;
use crate::profile::Region;
use crate::solid::{Facing, Solid, Z_TOLERANCE};
use panelcam_core::{BoundingBox3, Placement, Point2, Point3, Result, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Caps smaller than this are tessellation slivers and are dropped.
const SLIVER_AREA: f64 = 1e-6;

/// Wall pieces closer than this to a common plane are coplanar.
const COPLANAR_TOLERANCE: f64 = 1e-6;

/// Face identifier, unique within one root part's face list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FaceId(pub u32);

impl fmt::Display for FaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "F{}", self.0)
    }
}

/// Which loop of a region a wall came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Boundary {
    /// Outer boundary of a region
    Outer,
    /// Boundary of a hole
    Inner,
}

/// Face classification by construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FaceKind {
    /// Horizontal face at a slab level
    Cap {
        /// Outward direction in the solid frame
        facing: Facing,
    },
    /// Vertical face swept from a loop edge
    Wall {
        /// Loop the wall belongs to
        boundary: Boundary,
    },
}

/// Full loop a wall was cut from, oriented with material on its left
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallRing {
    /// Loop vertices
    pub points: Vec<Point2>,
    /// Z span of the slab
    pub z_min: f64,
    /// Z span of the slab
    pub z_max: f64,
    /// Outer loop or hole
    pub boundary: Boundary,
}

/// One loop edge of one slab
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallPiece {
    /// Edge start; material lies to the left of start -> end
    pub start: Point2,
    /// Edge end
    pub end: Point2,
    /// Bottom of the piece
    pub z_min: f64,
    /// Top of the piece
    pub z_max: f64,
    /// Index into the footprint's rings
    pub ring: usize,
}

impl WallPiece {
    /// Edge length
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    /// Edge height
    pub fn height(&self) -> f64 {
        self.z_max - self.z_min
    }

    /// Outward unit normal, pointing away from the material
    pub fn normal(&self) -> Vector3 {
        let d = (self.end - self.start).normalize();
        Vector3::new(d.y, -d.x, 0.0)
    }
}

/// Local geometry of a face in its solid's frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Footprint {
    /// Exposed region at level `z`
    Cap {
        /// Z level of the cap
        z: f64,
        /// Exposed material region
        region: Region,
    },
    /// Merged wall pieces and the loops they came from
    Wall {
        /// Coplanar pieces
        pieces: Vec<WallPiece>,
        /// Source loops
        rings: Vec<WallRing>,
    },
}

/// A bounding face of a part
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Face {
    /// Identifier within the root part
    pub id: FaceId,
    /// Root part the face was enumerated from
    pub part: PartId,
    /// Index of the solid within the root part, in traversal order
    pub body: usize,
    /// Cap or wall
    pub kind: FaceKind,
    /// Area centroid in the root frame
    pub centroid: Point3,
    /// Outward unit normal in the root frame
    pub normal: Vector3,
    /// Surface area
    pub area: f64,
    /// Bounds in the root frame
    pub bounds: BoundingBox3,
    /// Solid frame to root frame
    pub frame: Placement,
    /// Geometry in the solid frame
    pub footprint: Footprint,
}

impl Face {
    /// True for caps
    pub fn is_cap(&self) -> bool {
        matches!(self.kind, FaceKind::Cap { .. })
    }

    /// True for walls
    pub fn is_wall(&self) -> bool {
        matches!(self.kind, FaceKind::Wall { .. })
    }

    /// Loop the face belongs to, walls only
    pub fn boundary(&self) -> Option<Boundary> {
        match self.kind {
            FaceKind::Wall { boundary } => Some(boundary),
            FaceKind::Cap { .. } => None,
        }
    }
}

/// Anything that can enumerate its bounding faces
pub trait FaceSource {
    /// Root part the faces belong to
    fn part_id(&self) -> PartId;

    /// All bounding faces, ids sequential from zero
    fn faces(&self) -> Result<Vec<Face>>;
}

/// Face geometry before it is attached to a part
#[derive(Debug, Clone)]
pub(crate) struct LocalFace {
    kind: FaceKind,
    centroid: Point3,
    normal: Vector3,
    area: f64,
    bounds: BoundingBox3,
    footprint: Footprint,
}

impl LocalFace {
    pub(crate) fn place(self, id: FaceId, part: PartId, body: usize, frame: Placement) -> Face {
        Face {
            id,
            part,
            body,
            kind: self.kind,
            centroid: frame.transform_point(&self.centroid),
            normal: frame.transform_vector(&self.normal),
            area: self.area,
            bounds: self.bounds.transformed(&frame),
            frame,
            footprint: self.footprint,
        }
    }
}

/// Enumerate the faces of a solid in its own frame: caps by ascending level,
/// then walls in loop order.
pub(crate) fn solid_faces(solid: &Solid) -> Vec<LocalFace> {
    let mut faces = cap_faces(solid);
    faces.extend(wall_faces(solid));
    faces
}

fn cap_faces(solid: &Solid) -> Vec<LocalFace> {
    let slabs = solid.slabs();
    let mut levels: Vec<f64> = slabs.iter().flat_map(|s| [s.z_min, s.z_max]).collect();
    levels.sort_by(|a, b| a.total_cmp(b));
    levels.dedup_by(|a, b| (*a - *b).abs() <= Z_TOLERANCE);

    let mut faces = Vec::new();
    for z in levels {
        let below = slabs.iter().find(|s| (s.z_max - z).abs() <= Z_TOLERANCE);
        let above = slabs.iter().find(|s| (s.z_min - z).abs() <= Z_TOLERANCE);

        let down = match (above, below) {
            (Some(a), Some(b)) => a.profile.try_subtract(&b.profile),
            (Some(a), None) => Some(a.profile.clone()),
            _ => None,
        };
        let up = match (below, above) {
            (Some(b), Some(a)) => b.profile.try_subtract(&a.profile),
            (Some(b), None) => Some(b.profile.clone()),
            _ => None,
        };

        for (facing, exposed) in [(Facing::Down, down), (Facing::Up, up)] {
            let Some(exposed) = exposed else {
                continue;
            };
            for region in exposed.regions() {
                let area = region.area();
                if area < SLIVER_AREA {
                    tracing::debug!("Dropping {:.2e} mm^2 cap sliver at z={:.3}", area, z);
                    continue;
                }
                let c = region.centroid();
                let bounds = BoundingBox3::from_points(
                    region.outer.iter().map(|p| Point3::new(p.x, p.y, z)),
                )
                .unwrap_or_else(|| BoundingBox3::new(Point3::new(c.x, c.y, z), Point3::new(c.x, c.y, z)));
                faces.push(LocalFace {
                    kind: FaceKind::Cap { facing },
                    centroid: Point3::new(c.x, c.y, z),
                    normal: Vector3::new(0.0, 0.0, facing.sign()),
                    area,
                    bounds,
                    footprint: Footprint::Cap {
                        z,
                        region: region.clone(),
                    },
                });
            }
        }
    }
    faces
}

fn wall_faces(solid: &Solid) -> Vec<LocalFace> {
    let mut rings: Vec<WallRing> = Vec::new();
    let mut pieces: Vec<WallPiece> = Vec::new();
    for slab in solid.slabs() {
        for region in slab.profile.regions() {
            for (k, ring) in region.loops().enumerate() {
                let boundary = if k == 0 { Boundary::Outer } else { Boundary::Inner };
                let index = rings.len();
                rings.push(WallRing {
                    points: ring.clone(),
                    z_min: slab.z_min,
                    z_max: slab.z_max,
                    boundary,
                });
                for i in 0..ring.len() {
                    let (start, end) = (ring[i], ring[(i + 1) % ring.len()]);
                    if (end - start).norm() <= COPLANAR_TOLERANCE {
                        continue;
                    }
                    pieces.push(WallPiece {
                        start,
                        end,
                        z_min: slab.z_min,
                        z_max: slab.z_max,
                        ring: index,
                    });
                }
            }
        }
    }

    let mut sets = DisjointSet::new(pieces.len());
    for i in 0..pieces.len() {
        for j in (i + 1)..pieces.len() {
            if coplanar_and_touching(&pieces[i], &pieces[j]) {
                sets.union(i, j);
            }
        }
    }

    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut group_of_root: std::collections::HashMap<usize, usize> = std::collections::HashMap::new();
    for i in 0..pieces.len() {
        let root = sets.find(i);
        let g = *group_of_root.entry(root).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[g].push(i);
    }

    groups
        .into_iter()
        .map(|members| build_wall(&members, &pieces, &rings))
        .collect()
}

fn build_wall(members: &[usize], pieces: &[WallPiece], rings: &[WallRing]) -> LocalFace {
    let mut own_rings: Vec<WallRing> = Vec::new();
    let mut ring_map: Vec<(usize, usize)> = Vec::new();
    let mut own_pieces = Vec::with_capacity(members.len());
    for &i in members {
        let mut piece = pieces[i].clone();
        let local = match ring_map.iter().find(|(src, _)| *src == piece.ring) {
            Some((_, local)) => *local,
            None => {
                own_rings.push(rings[piece.ring].clone());
                ring_map.push((piece.ring, own_rings.len() - 1));
                own_rings.len() - 1
            }
        };
        piece.ring = local;
        own_pieces.push(piece);
    }

    let mut area = 0.0;
    let mut weighted = Vector3::zeros();
    let mut corners = Vec::with_capacity(own_pieces.len() * 4);
    for p in &own_pieces {
        let a = p.length() * p.height();
        let mid = (p.start.coords + p.end.coords) / 2.0;
        weighted += Vector3::new(mid.x, mid.y, (p.z_min + p.z_max) / 2.0) * a;
        area += a;
        for q in [p.start, p.end] {
            corners.push(Point3::new(q.x, q.y, p.z_min));
            corners.push(Point3::new(q.x, q.y, p.z_max));
        }
    }
    let centroid = Point3::from(weighted / area.max(f64::MIN_POSITIVE));
    let boundary = if own_rings.iter().all(|r| r.boundary == Boundary::Inner) {
        Boundary::Inner
    } else {
        Boundary::Outer
    };
    let bounds = BoundingBox3::from_points(corners).unwrap_or_else(|| BoundingBox3::new(centroid, centroid));

    LocalFace {
        kind: FaceKind::Wall { boundary },
        centroid,
        normal: own_pieces[0].normal(),
        area,
        bounds,
        footprint: Footprint::Wall {
            pieces: own_pieces,
            rings: own_rings,
        },
    }
}

fn overlap(a: (f64, f64), b: (f64, f64)) -> f64 {
    a.1.min(b.1) - a.0.max(b.0)
}

/// Same plane, same outward side, and touching along an edge.
fn coplanar_and_touching(a: &WallPiece, b: &WallPiece) -> bool {
    let z = overlap((a.z_min, a.z_max), (b.z_min, b.z_max));
    if z < -COPLANAR_TOLERANCE {
        return false;
    }
    let da = (a.end - a.start) / a.length();
    let db = (b.end - b.start) / b.length();
    if da.dot(&db) < 1.0 - 1e-9 {
        return false;
    }
    let offset = |p: Point2| {
        let v = p - a.start;
        (v.x * da.y - v.y * da.x).abs()
    };
    if offset(b.start) > COPLANAR_TOLERANCE || offset(b.end) > COPLANAR_TOLERANCE {
        return false;
    }
    let t = |p: Point2| (p - a.start).dot(&da);
    let line = overlap((0.0, a.length()), (t(b.start), t(b.end)));
    if line < -COPLANAR_TOLERANCE {
        return false;
    }
    z > COPLANAR_TOLERANCE || line > COPLANAR_TOLERANCE
}

struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            self.parent[ra.max(rb)] = ra.min(rb);
        }
    }
}
