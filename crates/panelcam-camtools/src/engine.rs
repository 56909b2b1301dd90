//! Toolpath realization.
//!
//! [`CamEngine`] is the seam between job building and motion planning.
//! [`ContourEngine`] offsets contours with `cavalier_contours`, steps down in
//! passes of the tool's depth per pass and writes the raw program with
//! [`crate::gcode_gen`].

use crate::gcode_gen;
use crate::job::{Bore, CutGeometry, Dressup, Job, Operation, OperationKind, PocketArea, PocketPattern};
use crate::toolpath::{Move, OperationToolpath, ToolpathPlan};
use cavalier_contours::polyline::{PlineSource, PlineSourceMut, PlineVertex, Polyline};
use cavalier_contours::shape_algorithms::{Shape, ShapeOffsetOptions};
use panelcam_core::{CamError, Point2, Point3, Result};
use std::panic;
use tracing::{debug, warn};

/// Vertices closer than this are merged before offsetting.
const VERTEX_TOLERANCE: f64 = 1e-5;

/// Float slack when comparing pass depths.
const Z_TOLERANCE: f64 = 1e-9;

/// Turns a job into motion and raw program text
pub trait CamEngine {
    /// Realize every operation of `job` in order
    fn plan(&self, job: &Job<'_>) -> Result<ToolpathPlan>;
}

/// Contour-offset engine
#[derive(Debug, Clone, Copy)]
pub struct ContourEngine {
    /// Chords per offset arc
    pub arc_segments: usize,
    /// Upper bound on concentric pocket rings
    pub max_pocket_rings: usize,
}

impl Default for ContourEngine {
    fn default() -> Self {
        Self {
            arc_segments: 16,
            max_pocket_rings: 10_000,
        }
    }
}

impl CamEngine for ContourEngine {
    fn plan(&self, job: &Job<'_>) -> Result<ToolpathPlan> {
        let mut operations = Vec::with_capacity(job.operations().len());
        for (index, op) in job.operations().iter().enumerate() {
            let toolpath = self.realize(job, index, op)?;
            debug!(
                "{}: {} moves, {:.1} mm cutting",
                toolpath.label,
                toolpath.moves.len(),
                toolpath.cutting_length()
            );
            operations.push(toolpath);
        }
        let program = gcode_gen::write_program(job, &operations);
        Ok(ToolpathPlan { operations, program })
    }
}

/// Per-operation cutting context
struct Cutter {
    start_z: f64,
    safe_z: f64,
    step_down: f64,
}

impl Cutter {
    /// Pass depths from the stock top down to `depth`, last one exactly `depth`
    fn passes(&self, depth: f64) -> Vec<f64> {
        let mut passes = Vec::new();
        let mut z = self.start_z;
        loop {
            z = (z - self.step_down).max(depth);
            passes.push(z);
            if z <= depth + Z_TOLERANCE {
                break;
            }
        }
        passes
    }
}

impl ContourEngine {
    fn realize(&self, job: &Job<'_>, index: usize, op: &Operation) -> Result<OperationToolpath> {
        let mut toolpath = OperationToolpath::new(index, op.label(index), op.tool.clone());
        let cutter = Cutter {
            start_z: job.stock_top(),
            safe_z: job.safe_z(),
            step_down: op.tool.params.depth_per_pass,
        };

        match (&op.kind, &op.geometry) {
            (OperationKind::Profile { side, .. }, CutGeometry::Contours { loops, depth }) => {
                let offset = side.offset(op.tool.radius());
                let mut paths = Vec::new();
                for contour in loops {
                    let offsets = self.offset_loop(contour, offset).ok_or_else(|| engine_error(index, "contour offset failed"))?;
                    if offsets.is_empty() {
                        warn!("{}: a loop vanished at offset {:.3}", toolpath.label, offset);
                    }
                    paths.extend(offsets);
                }
                if paths.is_empty() {
                    return Err(engine_error(index, "offsetting left no toolpath"));
                }
                let tabs = op.dressups.iter().find_map(|d| match d {
                    Dressup::Tabs { count, width, height } => Some(Tabs {
                        count: *count,
                        zone: width + op.tool.diameter,
                        top: depth + height,
                    }),
                });
                for path in &paths {
                    contour_moves(&mut toolpath.moves, path, &cutter.passes(*depth), &cutter, tabs.as_ref());
                }
            }
            (OperationKind::Pocket { pattern }, CutGeometry::Areas(areas)) => {
                let mut cleared = 0;
                for area in areas {
                    let levels = self.pocket_rings(index, area, op.tool.radius(), op.tool.stepover())?;
                    if levels.is_empty() {
                        warn!(
                            "{}: {:.3} mm^2 area is too narrow for the {} mm tool, skipped",
                            toolpath.label,
                            area.region.area(),
                            op.tool.diameter
                        );
                        continue;
                    }
                    pocket_moves(&mut toolpath.moves, &levels, area.depth, *pattern, op.tool.stepover(), &cutter);
                    cleared += 1;
                }
                if cleared == 0 {
                    return Err(engine_error(index, "tool does not fit inside any pocket"));
                }
            }
            (OperationKind::Hole, CutGeometry::Bores(bores)) => {
                for bore in bores {
                    helix_moves(&mut toolpath.moves, bore, op.tool.radius(), &cutter);
                }
            }
            _ => return Err(engine_error(index, "operation geometry does not match its kind")),
        }
        Ok(toolpath)
    }

    /// Offset one closed loop, `None` when the offset routine panicked
    fn offset_loop(&self, points: &[Point2], offset: f64) -> Option<Vec<Vec<Point2>>> {
        if offset == 0.0 {
            return Some(vec![points.to_vec()]);
        }
        let pline = to_polyline(points);
        match panic::catch_unwind(panic::AssertUnwindSafe(|| pline.parallel_offset(offset))) {
            Ok(results) => Some(
                results
                    .iter()
                    .map(|p| linearize(p, self.arc_segments))
                    .filter(|p| p.len() >= 2)
                    .collect(),
            ),
            Err(_) => {
                warn!("Panic during parallel offset of a {} vertex loop", points.len());
                None
            }
        }
    }

    /// Concentric rings of `area`, outermost first; empty when the tool does not fit
    fn pocket_rings(&self, index: usize, area: &PocketArea, radius: f64, stepover: f64) -> Result<Vec<Vec<Vec<Point2>>>> {
        let shape: Shape<f64> = Shape::from_plines(area.region.loops().map(|l| to_polyline(l)));
        let mut levels = Vec::new();
        for k in 0..self.max_pocket_rings {
            let distance = radius + k as f64 * stepover;
            let result = panic::catch_unwind(panic::AssertUnwindSafe(|| {
                shape.parallel_offset(distance, ShapeOffsetOptions::default())
            }))
            .map_err(|_| engine_error(index, format!("pocket offset failed at {:.3} mm", distance)))?;
            let rings: Vec<Vec<Point2>> = result
                .ccw_plines
                .iter()
                .chain(result.cw_plines.iter())
                .map(|ip| linearize(&ip.polyline, self.arc_segments))
                .filter(|p| p.len() >= 2)
                .collect();
            if rings.is_empty() {
                break;
            }
            levels.push(rings);
        }
        Ok(levels)
    }
}

/// Clear one area pass by pass
fn pocket_moves(
    moves: &mut Vec<Move>,
    levels: &[Vec<Vec<Point2>>],
    depth: f64,
    pattern: PocketPattern,
    stepover: f64,
    cutter: &Cutter,
) {
    for z in cutter.passes(depth) {
        match pattern {
            PocketPattern::Offset => {
                for ring in levels.iter().flatten() {
                    contour_moves(moves, ring, &[z], cutter, None);
                }
            }
            PocketPattern::ZigZag => {
                let boundary = &levels[0];
                for (a, b) in scanlines(boundary, stepover) {
                    moves.push(Move::Rapid(Point3::new(a.x, a.y, cutter.safe_z)));
                    moves.push(Move::Plunge(Point3::new(a.x, a.y, z)));
                    moves.push(Move::Cut(Point3::new(b.x, b.y, z)));
                    moves.push(Move::Rapid(Point3::new(b.x, b.y, cutter.safe_z)));
                }
                for ring in boundary {
                    contour_moves(moves, ring, &[z], cutter, None);
                }
            }
        }
    }
}

/// Tab zones along a loop
struct Tabs {
    count: usize,
    /// Length of each zone along the tool path
    zone: f64,
    /// Machine Z of the tab tops
    top: f64,
}

impl Tabs {
    fn centers(&self, length: f64) -> impl Iterator<Item = f64> + '_ {
        (0..self.count).map(move |i| (i as f64 + 0.5) * length / self.count as f64)
    }

    fn contains(&self, s: f64, length: f64) -> bool {
        self.centers(length).any(|c| (s - c).abs() <= self.zone / 2.0)
    }

    /// Zone edges strictly inside `(from, to)`, ascending
    fn edges(&self, from: f64, to: f64, length: f64) -> Vec<f64> {
        let mut edges: Vec<f64> = self
            .centers(length)
            .flat_map(|c| [c - self.zone / 2.0, c + self.zone / 2.0])
            .filter(|e| *e > from && *e < to)
            .collect();
        edges.sort_by(|a, b| a.total_cmp(b));
        edges
    }
}

/// Cut a closed loop once per pass, retracting after the last pass
fn contour_moves(moves: &mut Vec<Move>, path: &[Point2], passes: &[f64], cutter: &Cutter, tabs: Option<&Tabs>) {
    let Some(start) = path.first() else {
        return;
    };
    let length = loop_length(path);
    moves.push(Move::Rapid(Point3::new(start.x, start.y, cutter.safe_z)));

    for &z in passes {
        let z_at = |s: f64| match tabs {
            Some(t) if z < t.top - Z_TOLERANCE && t.contains(s, length) => t.top,
            _ => z,
        };
        let mut current = z_at(0.0);
        moves.push(Move::Plunge(Point3::new(start.x, start.y, current)));

        let mut travelled = 0.0;
        for i in 0..path.len() {
            let (a, b) = (path[i], path[(i + 1) % path.len()]);
            let seg = (b - a).norm();
            if seg <= 0.0 {
                continue;
            }
            if let Some(t) = tabs.filter(|t| z < t.top - Z_TOLERANCE) {
                for edge in t.edges(travelled, travelled + seg, length) {
                    let p = a + (b - a) * ((edge - travelled) / seg);
                    moves.push(Move::Cut(Point3::new(p.x, p.y, current)));
                    // Just past the edge decides which side we are on.
                    let next = z_at(edge + Z_TOLERANCE.max(seg * 1e-9));
                    if next != current {
                        current = next;
                        moves.push(Move::Cut(Point3::new(p.x, p.y, current)));
                    }
                }
            }
            travelled += seg;
            moves.push(Move::Cut(Point3::new(b.x, b.y, current)));
        }
    }
    moves.push(Move::Rapid(Point3::new(start.x, start.y, cutter.safe_z)));
}

/// Helical bore in the manner of a drill-press helix cycle: spiral down at
/// one depth per pass per turn, one flat turn at the bottom, then back to
/// the centre before retracting.
fn helix_moves(moves: &mut Vec<Move>, bore: &Bore, tool_radius: f64, cutter: &Cutter) {
    let r = bore.radius - tool_radius;
    let c = bore.center;
    let start = Point2::new(c.x + r, c.y);
    moves.push(Move::Rapid(Point3::new(start.x, start.y, cutter.safe_z)));
    moves.push(Move::Plunge(Point3::new(start.x, start.y, cutter.start_z)));
    for z in cutter.passes(bore.depth) {
        moves.push(Move::ArcCw {
            to: Point3::new(start.x, start.y, z),
            center: c,
        });
    }
    moves.push(Move::ArcCw {
        to: Point3::new(start.x, start.y, bore.depth),
        center: c,
    });
    moves.push(Move::Cut(Point3::new(c.x, c.y, bore.depth)));
    moves.push(Move::Rapid(Point3::new(c.x, c.y, cutter.safe_z)));
}

/// Even-odd scanline segments across `rings`, alternating direction
fn scanlines(rings: &[Vec<Point2>], step: f64) -> Vec<(Point2, Point2)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for p in rings.iter().flatten() {
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }
    let mut segments = Vec::new();
    if !(min_y.is_finite() && max_y.is_finite()) {
        return segments;
    }

    let mut y = min_y + step / 2.0;
    let mut forward = true;
    while y < max_y {
        let mut xs = Vec::new();
        for ring in rings {
            for i in 0..ring.len() {
                let (p1, p2) = (ring[i], ring[(i + 1) % ring.len()]);
                if (p1.y <= y && p2.y > y) || (p2.y <= y && p1.y > y) {
                    xs.push(p1.x + (y - p1.y) * (p2.x - p1.x) / (p2.y - p1.y));
                }
            }
        }
        xs.sort_by(|a, b| a.total_cmp(b));
        let mut row: Vec<(Point2, Point2)> = xs
            .chunks_exact(2)
            .filter(|pair| pair[1] - pair[0] > VERTEX_TOLERANCE)
            .map(|pair| (Point2::new(pair[0], y), Point2::new(pair[1], y)))
            .collect();
        if !forward {
            row.reverse();
            for seg in &mut row {
                std::mem::swap(&mut seg.0, &mut seg.1);
            }
        }
        segments.extend(row);
        forward = !forward;
        y += step;
    }
    segments
}

fn loop_length(path: &[Point2]) -> f64 {
    (0..path.len())
        .map(|i| (path[(i + 1) % path.len()] - path[i]).norm())
        .sum()
}

fn to_polyline(points: &[Point2]) -> Polyline<f64> {
    let mut pline = Polyline::new();
    let mut last: Option<Point2> = None;
    for p in points {
        if last.is_some_and(|l| (p - l).norm() < VERTEX_TOLERANCE) {
            continue;
        }
        pline.add_vertex(PlineVertex::new(p.x, p.y, 0.0));
        last = Some(*p);
    }
    if pline.vertex_count() > 1 {
        let first = pline.at(0).pos();
        let end = pline.at(pline.vertex_count() - 1).pos();
        if (first.x - end.x).hypot(first.y - end.y) < VERTEX_TOLERANCE {
            pline.remove_last();
        }
    }
    pline.set_is_closed(true);
    pline
}

/// Closed polyline to points, bulge arcs split into `segments` chords
fn linearize(pline: &Polyline<f64>, segments: usize) -> Vec<Point2> {
    let count = pline.vertex_count();
    let mut points = Vec::with_capacity(count);
    for i in 0..count {
        let v1 = pline.at(i);
        let v2 = pline.at((i + 1) % count);
        points.push(Point2::new(v1.x, v1.y));

        if v1.bulge.abs() <= 1e-5 {
            continue;
        }
        let theta = 4.0 * v1.bulge.atan();
        let chord = (v2.x - v1.x).hypot(v2.y - v1.y);
        if chord <= VERTEX_TOLERANCE {
            continue;
        }
        let radius = chord / (2.0 * (theta / 2.0).sin());
        let to_center = radius.abs() * (theta.abs() / 2.0).cos();
        let (mx, my) = ((v1.x + v2.x) / 2.0, (v1.y + v2.y) / 2.0);
        let (nx, ny) = (-(v2.y - v1.y) / chord, (v2.x - v1.x) / chord);
        let sign = v1.bulge.signum();
        let (cx, cy) = (mx + nx * to_center * sign, my + ny * to_center * sign);
        let start = (v1.y - cy).atan2(v1.x - cx);
        for j in 1..segments {
            let angle = start + theta * j as f64 / segments as f64;
            points.push(Point2::new(cx + radius.abs() * angle.cos(), cy + radius.abs() * angle.sin()));
        }
    }
    points
}

fn engine_error(index: usize, reason: impl Into<String>) -> panelcam_core::Error {
    CamError::Engine {
        index,
        reason: reason.into(),
    }
    .into()
}
