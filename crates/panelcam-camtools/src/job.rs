//! Machining job builder.
//!
//! A [`Job`] binds a stock part to a machine origin and collects operations in
//! cut order. Every append validates its target faces and resolves them into
//! machine-frame geometry immediately, so a job that was built successfully
//! can always be handed to an engine.
//!
//! The machine frame puts Z0 on the origin plane with +Z along the origin
//! normal, away from the material, and XY0 at the origin point.

use crate::dialect::Dialect;
use nalgebra::Rotation3;
use panelcam_core::{CamError, MeasurementSystem, Point2, Point3, Result, Tool, Vector3};
use panelcam_designer::polygon;
use panelcam_designer::{Boundary, Face, FaceGroup, Footprint, Part, Profile, ProfileKind, Region};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Axis alignment tolerance for origins and target faces.
const AXIS_TOLERANCE: f64 = 1e-9;

/// Depths this close to Z0 remove nothing.
const DEPTH_TOLERANCE: f64 = 1e-9;

/// Relative deviation from the mean radius still accepted as round.
const ROUNDNESS: f64 = 0.01;

/// Which side of the material the tool runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Tool centre one radius into the material
    Inside,
    /// Tool centre one radius away from the material
    #[default]
    Outside,
    /// Tool centre on the boundary
    On,
}

impl Side {
    /// Signed offset applied to loops that keep the material on their left
    pub(crate) fn offset(&self, tool_radius: f64) -> f64 {
        match self {
            Self::Inside => tool_radius,
            Self::Outside => -tool_radius,
            Self::On => 0.0,
        }
    }
}

/// Pocket clearing strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PocketPattern {
    /// Concentric rings stepping inward from the boundary
    #[default]
    Offset,
    /// Back-and-forth lines along X, then one boundary ring
    ZigZag,
}

/// Toolpath modifier attached to an operation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Dressup {
    /// Material bridges left standing on the final passes of a profile
    Tabs {
        /// Number of tabs, evenly spaced along each loop
        count: usize,
        /// Tab width on the finished part, mm
        width: f64,
        /// Tab height above the final depth, mm
        height: f64,
    },
}

impl Default for Dressup {
    fn default() -> Self {
        Self::Tabs {
            count: 4,
            width: 3.0,
            height: 1.0,
        }
    }
}

impl Dressup {
    fn validate(&self) -> Result<()> {
        match *self {
            Self::Tabs {
                count,
                width,
                height,
            } => {
                if count == 0 {
                    return Err(invalid_parameter("tabs.count", "at least one tab is required"));
                }
                if !(width.is_finite() && width > 0.0) {
                    return Err(invalid_parameter("tabs.width", format!("{} must be positive", width)));
                }
                if !(height.is_finite() && height > 0.0) {
                    return Err(invalid_parameter("tabs.height", format!("{} must be positive", height)));
                }
                Ok(())
            }
        }
    }
}

/// Options for [`Job::profile_with`]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProfileOptions {
    /// Tool side relative to the target material
    pub side: Side,
    /// Also cut the enclosed loops of cap targets
    pub holes: bool,
    /// Modifiers such as tabs
    pub dressups: Vec<Dressup>,
}

/// Options for [`Job::pocket_with`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PocketOptions {
    /// Clearing strategy
    pub pattern: PocketPattern,
}

/// What an operation does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    /// Contour around (or inside) the targets
    Profile {
        /// Tool side
        side: Side,
        /// Enclosed loops cut too
        holes: bool,
    },
    /// Clear the area above floor caps
    Pocket {
        /// Clearing strategy
        pattern: PocketPattern,
    },
    /// Helical boring of round holes
    Hole,
}

impl OperationKind {
    /// Operation name used in labels and errors
    pub fn name(&self) -> &'static str {
        match self {
            Self::Profile { .. } => "Profile",
            Self::Pocket { .. } => "Pocket",
            Self::Hole => "Hole",
        }
    }
}

/// Closed loop with its final depth
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PocketArea {
    pub region: Region,
    pub depth: f64,
}

/// Round hole in machine coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Bore {
    pub center: Point2,
    pub radius: f64,
    pub depth: f64,
}

/// Target geometry resolved into the machine frame
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CutGeometry {
    /// Loops with the material on their left, enclosed loops first
    Contours { loops: Vec<Vec<Point2>>, depth: f64 },
    /// Areas to clear, each down to its own floor
    Areas(Vec<PocketArea>),
    /// Holes to bore
    Bores(Vec<Bore>),
}

/// One machining step of a job
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    /// What the operation does
    pub kind: OperationKind,
    /// Faces it was built from
    pub targets: FaceGroup,
    /// Cutter
    pub tool: Tool,
    /// Path modifiers
    pub dressups: Vec<Dressup>,
    pub(crate) geometry: CutGeometry,
}

impl Operation {
    /// Label used in program comments, e.g. `Profile001` for the first operation
    pub fn label(&self, index: usize) -> String {
        format!("{}{:03}", self.kind.name(), index + 1)
    }

    /// Deepest machine Z the operation reaches
    pub fn final_depth(&self) -> f64 {
        match &self.geometry {
            CutGeometry::Contours { depth, .. } => *depth,
            CutGeometry::Areas(areas) => areas.iter().map(|a| a.depth).fold(0.0, f64::min),
            CutGeometry::Bores(bores) => bores.iter().map(|b| b.depth).fold(0.0, f64::min),
        }
    }
}

/// Where the machine origin sits
#[derive(Debug, Clone, PartialEq)]
pub enum JobOrigin {
    /// A cap of the stock; its outward normal becomes +Z
    Face(Face),
    /// An explicit plane in the stock's frame
    Plane {
        /// XY0 and Z0
        point: Point3,
        /// Becomes +Z
        normal: Vector3,
    },
}

/// Job-wide settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JobSettings {
    /// Clearance above the stock for rapid moves, mm
    pub safe_height: f64,
    /// Units the program is written in
    pub units: MeasurementSystem,
}

impl Default for JobSettings {
    fn default() -> Self {
        Self {
            safe_height: 5.0,
            units: MeasurementSystem::Metric,
        }
    }
}

/// Rigid map from the stock frame to the machine frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MachineFrame {
    rotation: Rotation3<f64>,
    origin: Point3,
}

impl MachineFrame {
    /// Frame with Z0 through `origin` and +Z along `normal`.
    ///
    /// Only normals along the stock's Z axis are accepted; anything else
    /// would need a rotary axis.
    pub fn new(origin: Point3, normal: &Vector3) -> Option<Self> {
        let n = normal.try_normalize(AXIS_TOLERANCE)?;
        if (n.z.abs() - 1.0).abs() > AXIS_TOLERANCE {
            return None;
        }
        let rotation = if n.z > 0.0 {
            Rotation3::identity()
        } else {
            Rotation3::from_axis_angle(&Vector3::x_axis(), std::f64::consts::PI)
        };
        Some(Self { rotation, origin })
    }

    /// Map a stock-frame point to machine coordinates
    pub fn to_machine(&self, p: &Point3) -> Point3 {
        Point3::from(self.rotation * (p - self.origin))
    }

    /// Map a stock-frame direction to machine coordinates
    pub fn to_machine_vector(&self, v: &Vector3) -> Vector3 {
        self.rotation * v
    }
}

/// An ordered list of machining operations on one stock part
#[derive(Debug, Clone)]
pub struct Job<'a> {
    name: String,
    origin: JobOrigin,
    stock: &'a Part,
    dialect: Dialect,
    settings: JobSettings,
    operations: Vec<Operation>,
    frame: MachineFrame,
}

impl<'a> Job<'a> {
    /// Create an empty job.
    ///
    /// Fails with `InvalidTarget` when the origin face belongs to another
    /// part, is not a cap, or the origin normal is not along the stock's Z axis.
    pub fn new(name: impl Into<String>, origin: JobOrigin, stock: &'a Part, dialect: Dialect) -> Result<Self> {
        let (point, normal) = match &origin {
            JobOrigin::Face(face) => {
                if face.part != stock.id() {
                    return Err(CamError::invalid_target(
                        "origin",
                        format!("face {} belongs to another part than '{}'", face.id, stock.name()),
                    )
                    .into());
                }
                if !face.is_cap() {
                    return Err(CamError::invalid_target(
                        "origin",
                        format!("face {} is a wall, origins must be caps", face.id),
                    )
                    .into());
                }
                (face.centroid, face.normal)
            }
            JobOrigin::Plane { point, normal } => (*point, *normal),
        };
        let frame = MachineFrame::new(point, &normal).ok_or_else(|| {
            CamError::invalid_target(
                "origin",
                format!(
                    "normal ({:.3}, {:.3}, {:.3}) is not perpendicular to the slab planes",
                    normal.x, normal.y, normal.z
                ),
            )
        })?;

        let name = name.into();
        debug!("Job '{}' on '{}' for {}", name, stock.name(), dialect);
        Ok(Self {
            name,
            origin,
            stock,
            dialect,
            settings: JobSettings::default(),
            operations: Vec::new(),
            frame,
        })
    }

    /// Replace the job settings
    pub fn with_settings(mut self, settings: JobSettings) -> Result<Self> {
        if !(settings.safe_height.is_finite() && settings.safe_height > 0.0) {
            return Err(invalid_parameter(
                "safe_height",
                format!("{} must be positive", settings.safe_height),
            ));
        }
        self.settings = settings;
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn origin(&self) -> &JobOrigin {
        &self.origin
    }

    pub fn stock(&self) -> &Part {
        self.stock
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn settings(&self) -> &JobSettings {
        &self.settings
    }

    /// Operations in cut order
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn frame(&self) -> &MachineFrame {
        &self.frame
    }

    /// Highest machine Z of the stock
    pub fn stock_top(&self) -> f64 {
        self.stock_z_range().1
    }

    /// Rapid-move height
    pub fn safe_z(&self) -> f64 {
        self.stock_top() + self.settings.safe_height
    }

    /// Profile with the default options: outside the material, no holes, no dressups
    pub fn profile(self, group: &FaceGroup, tool: &Tool) -> Result<Self> {
        self.profile_with(group, tool, ProfileOptions::default())
    }

    /// Contour the boundary of `group`.
    ///
    /// Cap targets are cut through the stock along their outer loops (and
    /// their enclosed loops when `holes` is set). Wall targets are cut along
    /// the loops they belong to, down to the lowest wall.
    pub fn profile_with(self, group: &FaceGroup, tool: &Tool, options: ProfileOptions) -> Result<Self> {
        let kind = OperationKind::Profile {
            side: options.side,
            holes: options.holes,
        };
        self.check_targets(kind.name(), group)?;
        check_tool(tool, false)?;
        for dressup in &options.dressups {
            dressup.validate()?;
        }

        let geometry = if group.iter().all(Face::is_cap) {
            self.cap_contours(group, options.holes)?
        } else if group.iter().all(Face::is_wall) {
            self.wall_contours(group)?
        } else {
            return Err(CamError::invalid_target(kind.name(), "targets mix caps and walls").into());
        };
        self.push(kind, group, tool, options.dressups, geometry)
    }

    /// Pocket with the default offset pattern
    pub fn pocket(self, group: &FaceGroup, tool: &Tool) -> Result<Self> {
        self.pocket_with(group, tool, PocketOptions::default())
    }

    /// Clear the material above each floor cap in `group`
    pub fn pocket_with(self, group: &FaceGroup, tool: &Tool, options: PocketOptions) -> Result<Self> {
        let kind = OperationKind::Pocket {
            pattern: options.pattern,
        };
        self.check_targets(kind.name(), group)?;
        check_tool(tool, true)?;

        let mut areas = Vec::with_capacity(group.len());
        for face in group {
            let Footprint::Cap { z, region } = &face.footprint else {
                return Err(CamError::invalid_target(
                    kind.name(),
                    format!("face {} is a wall, pockets need floor caps", face.id),
                )
                .into());
            };
            if self.frame.to_machine_vector(&face.normal).z < 1.0 - AXIS_TOLERANCE {
                return Err(CamError::invalid_target(
                    kind.name(),
                    format!("face {} faces away from the tool", face.id),
                )
                .into());
            }
            let depth = self.frame.to_machine(&face.centroid).z;
            if depth > -DEPTH_TOLERANCE {
                return Err(nothing_cut(kind.name(), face));
            }
            areas.push(PocketArea {
                region: self.map_region(face, region, *z),
                depth,
            });
        }
        self.push(kind, group, tool, Vec::new(), CutGeometry::Areas(areas))
    }

    /// Bore the round holes whose inner walls are in `group` with a helix
    pub fn hole(self, group: &FaceGroup, tool: &Tool) -> Result<Self> {
        let kind = OperationKind::Hole;
        self.check_targets(kind.name(), group)?;
        check_tool(tool, false)?;

        let mut bores: Vec<Bore> = Vec::new();
        for face in group {
            let Footprint::Wall { rings, .. } = &face.footprint else {
                return Err(CamError::invalid_target(
                    kind.name(),
                    format!("face {} is a cap, holes are selected by their walls", face.id),
                )
                .into());
            };
            if face.boundary() != Some(Boundary::Inner) {
                return Err(CamError::invalid_target(
                    kind.name(),
                    format!("face {} is an outer wall", face.id),
                )
                .into());
            }
            let depth = self.lowest_z(face);
            if depth > -DEPTH_TOLERANCE {
                return Err(nothing_cut(kind.name(), face));
            }
            for ring in rings.iter().filter(|r| r.boundary == Boundary::Inner) {
                let points: Vec<Point2> = ring
                    .points
                    .iter()
                    .map(|p| {
                        let q = self.map_point(face, p, ring.z_min);
                        Point2::new(q.x, q.y)
                    })
                    .collect();
                let (center, radius) = round_fit(&points).ok_or_else(|| {
                    CamError::invalid_target(kind.name(), format!("face {} is not part of a round hole", face.id))
                })?;
                if radius <= tool.radius() {
                    return Err(CamError::invalid_target(
                        kind.name(),
                        format!(
                            "{} mm tool does not fit the {:.3} mm hole",
                            tool.diameter,
                            radius * 2.0
                        ),
                    )
                    .into());
                }
                match bores
                    .iter_mut()
                    .find(|b| (b.center - center).norm() <= radius * ROUNDNESS)
                {
                    Some(existing) => existing.depth = existing.depth.min(depth),
                    None => bores.push(Bore {
                        center,
                        radius,
                        depth,
                    }),
                }
            }
        }
        self.push(kind, group, tool, Vec::new(), CutGeometry::Bores(bores))
    }

    fn push(
        mut self,
        kind: OperationKind,
        group: &FaceGroup,
        tool: &Tool,
        dressups: Vec<Dressup>,
        geometry: CutGeometry,
    ) -> Result<Self> {
        let operation = Operation {
            kind,
            targets: group.clone(),
            tool: tool.clone(),
            dressups,
            geometry,
        };
        debug!(
            "Job '{}': {} on {} faces to Z{:.3}",
            self.name,
            operation.label(self.operations.len()),
            group.len(),
            operation.final_depth()
        );
        self.operations.push(operation);
        Ok(self)
    }

    fn check_targets(&self, operation: &str, group: &FaceGroup) -> Result<()> {
        if group.is_empty() {
            return Err(CamError::invalid_target(operation, "no target faces").into());
        }
        for face in group {
            if face.part != self.stock.id() {
                return Err(CamError::invalid_target(
                    operation,
                    format!("face {} belongs to another part than '{}'", face.id, self.stock.name()),
                )
                .into());
            }
            let axis = self.frame.to_machine_vector(&face.frame.transform_vector(&Vector3::z()));
            if (axis.z.abs() - 1.0).abs() > AXIS_TOLERANCE {
                return Err(CamError::invalid_target(
                    operation,
                    format!("face {} is tilted against the machine axis", face.id),
                )
                .into());
            }
        }
        Ok(())
    }

    fn cap_contours(&self, group: &FaceGroup, holes: bool) -> Result<CutGeometry> {
        let mut regions = Vec::with_capacity(group.len());
        for face in group {
            if let Footprint::Cap { z, region } = &face.footprint {
                regions.push(self.map_region(face, region, *z));
            }
        }
        let depth = self.stock_z_range().0;
        if depth > -DEPTH_TOLERANCE {
            return Err(CamError::invalid_target("Profile", "stock lies above the origin, nothing would be cut").into());
        }

        // Islands standing inside another cap's holes belong to the same outline.
        let filled: Vec<Region> = regions.iter().map(|r| Region::new(r.outer.clone(), Vec::new())).collect();
        let envelope = union_regions(filled)?.ok_or_else(|| CamError::invalid_target("Profile", "targets have no area"))?;

        let mut loops: Vec<Vec<Point2>> = Vec::new();
        if holes {
            if let Some(merged) = union_regions(regions)? {
                loops.extend(merged.regions().iter().flat_map(|r| r.holes.iter().cloned()));
            }
        }
        loops.extend(envelope.regions().iter().map(|r| r.outer.clone()));
        Ok(CutGeometry::Contours { loops, depth })
    }

    fn wall_contours(&self, group: &FaceGroup) -> Result<CutGeometry> {
        let mut outer = Vec::new();
        let mut inner = Vec::new();
        let mut depth = 0.0_f64;
        for face in group {
            let Footprint::Wall { rings, .. } = &face.footprint else {
                continue;
            };
            depth = depth.min(self.lowest_z(face));
            for ring in rings {
                let points: Vec<Point2> = ring
                    .points
                    .iter()
                    .map(|p| {
                        let q = self.map_point(face, p, ring.z_min);
                        Point2::new(q.x, q.y)
                    })
                    .collect();
                let region = Region::new(points, Vec::new());
                match ring.boundary {
                    Boundary::Outer => outer.push(region),
                    Boundary::Inner => inner.push(region),
                }
            }
        }
        if depth > -DEPTH_TOLERANCE {
            return Err(CamError::invalid_target("Profile", "walls lie above the origin, nothing would be cut").into());
        }

        // Enclosed loops keep the material on their left when clockwise.
        let mut loops: Vec<Vec<Point2>> = union_regions(inner)?
            .map(|p| {
                p.regions()
                    .iter()
                    .map(|r| polygon::oriented(r.outer.clone(), false))
                    .collect()
            })
            .unwrap_or_default();
        if let Some(envelope) = union_regions(outer)? {
            loops.extend(envelope.regions().iter().map(|r| r.outer.clone()));
        }
        if loops.is_empty() {
            return Err(CamError::invalid_target("Profile", "walls enclose no area").into());
        }
        Ok(CutGeometry::Contours { loops, depth })
    }

    fn map_point(&self, face: &Face, p: &Point2, z: f64) -> Point3 {
        self.frame
            .to_machine(&face.frame.transform_point(&Point3::new(p.x, p.y, z)))
    }

    fn map_region(&self, face: &Face, region: &Region, z: f64) -> Region {
        let map = |l: &Vec<Point2>| -> Vec<Point2> {
            l.iter()
                .map(|p| {
                    let q = self.map_point(face, p, z);
                    Point2::new(q.x, q.y)
                })
                .collect()
        };
        Region::new(map(&region.outer), region.holes.iter().map(map).collect())
    }

    fn lowest_z(&self, face: &Face) -> f64 {
        face.bounds
            .corners()
            .iter()
            .map(|c| self.frame.to_machine(c).z)
            .fold(f64::INFINITY, f64::min)
    }

    /// (lowest, highest) machine Z of the stock
    fn stock_z_range(&self) -> (f64, f64) {
        self.stock
            .local_bounds()
            .corners()
            .iter()
            .map(|c| self.frame.to_machine(c).z)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), z| (lo.min(z), hi.max(z)))
    }
}

fn union_regions(regions: Vec<Region>) -> Result<Option<Profile>> {
    let mut iter = regions
        .into_iter()
        .filter_map(|r| Profile::from_regions(vec![r], ProfileKind::Composite).ok());
    let Some(first) = iter.next() else {
        return Ok(None);
    };
    iter.try_fold(first, |acc, p| acc.union(&p)).map(Some)
}

/// Centre and mean radius of a loop whose vertices lie on a circle
fn round_fit(points: &[Point2]) -> Option<(Point2, f64)> {
    if points.len() < 8 {
        return None;
    }
    let center = polygon::centroid(points);
    let radii: Vec<f64> = points.iter().map(|p| (p - center).norm()).collect();
    let mean = radii.iter().sum::<f64>() / radii.len() as f64;
    let tolerance = (mean * ROUNDNESS).max(1e-3);
    radii
        .iter()
        .all(|r| (r - mean).abs() <= tolerance)
        .then_some((center, mean))
}

fn check_tool(tool: &Tool, needs_stepover: bool) -> Result<()> {
    if !tool.tool_type.cuts_laterally() {
        return Err(invalid_parameter(
            "tool_type",
            format!("{} cannot cut sideways", tool.tool_type),
        ));
    }
    let params = &tool.params;
    let checks = [
        ("diameter", tool.diameter),
        ("feed_rate", params.feed_rate),
        ("plunge_rate", params.plunge_rate),
        ("depth_per_pass", params.depth_per_pass),
    ];
    for (name, value) in checks {
        if !(value.is_finite() && value > 0.0) {
            return Err(invalid_parameter(name, format!("{} must be positive", value)));
        }
    }
    if params.depth_per_pass > tool.flute_length {
        return Err(invalid_parameter(
            "depth_per_pass",
            format!(
                "{} exceeds the {} mm flute length of '{}'",
                params.depth_per_pass, tool.flute_length, tool.name
            ),
        ));
    }
    if needs_stepover && !(params.stepover_percent > 0.0 && params.stepover_percent <= 100.0) {
        return Err(invalid_parameter(
            "stepover_percent",
            format!("{} must be in (0, 100]", params.stepover_percent),
        ));
    }
    Ok(())
}

fn invalid_parameter(parameter: &str, reason: impl Into<String>) -> panelcam_core::Error {
    CamError::InvalidParameters {
        parameter: parameter.to_string(),
        reason: reason.into(),
    }
    .into()
}

fn nothing_cut(operation: &str, face: &Face) -> panelcam_core::Error {
    CamError::invalid_target(
        operation,
        format!("face {} is not below the origin, nothing would be cut", face.id),
    )
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use panelcam_designer::{classify, ClassifyOptions, FaceKind, FaceSource, Facing, Solid, Workplane};
    use panelcam_core::Color;

    fn plate() -> Part {
        let profile = Profile::rectangle(20.0, 10.0).unwrap();
        let solid = Solid::from_extrusion(&profile, Workplane::xy(-3.0), 3.0).unwrap();
        Part::new("plate", solid, Color::gray(50))
    }

    fn cap(part: &Part, facing: Facing) -> Face {
        part.faces()
            .unwrap()
            .into_iter()
            .find(|f| f.kind == FaceKind::Cap { facing })
            .unwrap()
    }

    #[test]
    fn test_top_origin_is_identity() {
        let part = plate();
        let job = Job::new("j", JobOrigin::Face(cap(&part, Facing::Up)), &part, Dialect::Grbl).unwrap();
        let p = job.frame().to_machine(&Point3::new(1.0, 2.0, -3.0));
        assert!((p - Point3::new(1.0, 2.0, -3.0)).norm() < 1e-12);
        assert!(job.stock_top().abs() < 1e-12);
        assert!((job.safe_z() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_bottom_origin_flips_z() {
        let part = plate();
        let job = Job::new("j", JobOrigin::Face(cap(&part, Facing::Down)), &part, Dialect::Grbl).unwrap();
        let top = job.frame().to_machine(&Point3::new(0.0, 0.0, 0.0));
        assert!((top.z + 3.0).abs() < 1e-12);
        let v = job.frame().to_machine_vector(&Vector3::z());
        assert!((v.z + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_tilted_origin_rejected() {
        let part = plate();
        let origin = JobOrigin::Plane {
            point: Point3::origin(),
            normal: Vector3::new(1.0, 0.0, 1.0),
        };
        let err = Job::new("j", origin, &part, Dialect::Grbl).unwrap_err();
        assert!(matches!(err, panelcam_core::Error::Cam(CamError::InvalidTarget { .. })));
    }

    #[test]
    fn test_profile_top_cuts_through() {
        let part = plate();
        let groups = classify(&part, &ClassifyOptions::default()).unwrap();
        let job = Job::new("j", JobOrigin::Face(groups.top().faces()[0].clone()), &part, Dialect::Grbl)
            .unwrap()
            .profile(groups.top(), &Tool::endmill(1.0))
            .unwrap();
        let op = &job.operations()[0];
        assert!((op.final_depth() + 3.0).abs() < 1e-9);
        let CutGeometry::Contours { loops, .. } = &op.geometry else {
            panic!("expected contours");
        };
        assert_eq!(loops.len(), 1);
        assert!(polygon::signed_area(&loops[0]) > 0.0);
    }

    #[test]
    fn test_pocket_rejects_origin_level_cap() {
        let part = plate();
        let groups = classify(&part, &ClassifyOptions::default()).unwrap();
        let err = Job::new("j", JobOrigin::Face(groups.top().faces()[0].clone()), &part, Dialect::Grbl)
            .unwrap()
            .pocket(groups.top(), &Tool::endmill(1.0))
            .unwrap_err();
        assert!(err.to_string().contains("nothing would be cut"));
    }

    #[test]
    fn test_tool_parameters_checked() {
        let part = plate();
        let groups = classify(&part, &ClassifyOptions::default()).unwrap();
        let mut tool = Tool::endmill(1.0);
        tool.params.depth_per_pass = 0.0;
        let err = Job::new("j", JobOrigin::Face(groups.top().faces()[0].clone()), &part, Dialect::Grbl)
            .unwrap()
            .profile(groups.top(), &tool)
            .unwrap_err();
        assert!(matches!(
            err,
            panelcam_core::Error::Cam(CamError::InvalidParameters { ref parameter, .. }) if parameter == "depth_per_pass"
        ));
    }

    #[test]
    fn test_round_fit() {
        let circle: Vec<Point2> = (0..32)
            .map(|i| {
                let a = std::f64::consts::TAU * i as f64 / 32.0;
                Point2::new(5.0 + 2.0 * a.cos(), -1.0 + 2.0 * a.sin())
            })
            .collect();
        let (c, r) = round_fit(&circle).unwrap();
        assert!((c - Point2::new(5.0, -1.0)).norm() < 1e-9);
        assert!((r - 2.0).abs() < 1e-9);

        let square = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ];
        assert!(round_fit(&square).is_none());
    }
}
