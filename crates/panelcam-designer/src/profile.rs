//! Closed 2D profiles used as extrusion cross-sections.
//!
//! A [`Profile`] is one or more [`Region`]s, each an outer loop (counter-clockwise)
//! with zero or more holes (clockwise). Profiles are immutable; every builder and
//! boolean returns a new value. Region booleans are delegated to `csgrs` sketches.

use crate::font_manager::FontSpec;
use crate::polygon::{self, POINT_TOLERANCE};
use csgrs::sketch::Sketch;
use csgrs::traits::CSG;
use panelcam_core::{GeometryError, Placement, Point2, Point3, Result};
use serde::{Deserialize, Serialize};

/// Chords used to tessellate each rounded corner.
pub const CORNER_SEGMENTS: usize = 8;

/// Chords used to tessellate a full circle.
pub const CIRCLE_SEGMENTS: usize = 64;

/// Regions smaller than this are dropped after booleans.
const MIN_REGION_AREA: f64 = 1e-9;

/// How a polyline profile should be closed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Closure {
    /// Add the edge from the last vertex back to the first
    Close,
    /// The last vertex must already coincide with the first
    AsGiven,
}

/// How a profile was declared
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProfileKind {
    /// Centred rectangle with rounded corners
    RoundedRectangle {
        /// Overall width
        width: f64,
        /// Overall height
        height: f64,
        /// Corner fillet radius
        corner_radius: f64,
    },
    /// Closed polyline
    Polyline {
        /// Vertices in declaration order
        vertices: Vec<[f64; 2]>,
    },
    /// Outline of one text glyph
    Glyph {
        /// The character
        ch: char,
        /// The font it came from
        font: String,
        /// Font size in mm
        size: f64,
    },
    /// Result of booleans or placement of other profiles
    Composite,
}

/// One connected area: an outer loop with holes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Counter-clockwise outer boundary
    pub outer: Vec<Point2>,
    /// Clockwise hole boundaries
    pub holes: Vec<Vec<Point2>>,
}

impl Region {
    /// Build a region, normalising loop windings
    pub fn new(outer: Vec<Point2>, holes: Vec<Vec<Point2>>) -> Self {
        Self {
            outer: polygon::oriented(outer, true),
            holes: holes
                .into_iter()
                .map(|h| polygon::oriented(h, false))
                .collect(),
        }
    }

    /// Net area (outer minus holes)
    pub fn area(&self) -> f64 {
        polygon::signed_area(&self.outer) + self.holes.iter().map(|h| polygon::signed_area(h)).sum::<f64>()
    }

    /// Area-weighted centroid
    pub fn centroid(&self) -> Point2 {
        let mut total = polygon::signed_area(&self.outer);
        let c = polygon::centroid(&self.outer);
        let (mut cx, mut cy) = (c.x * total, c.y * total);
        for hole in &self.holes {
            let a = polygon::signed_area(hole);
            let hc = polygon::centroid(hole);
            cx += hc.x * a;
            cy += hc.y * a;
            total += a;
        }
        if total.abs() < MIN_REGION_AREA {
            return c;
        }
        Point2::new(cx / total, cy / total)
    }

    /// Interior test; points on a boundary may go either way
    pub fn contains_point(&self, p: &Point2) -> bool {
        polygon::point_in_polygon(p, &self.outer)
            && !self.holes.iter().any(|h| polygon::point_in_polygon(p, h))
    }

    /// All loops, outer first
    pub fn loops(&self) -> impl Iterator<Item = &Vec<Point2>> {
        std::iter::once(&self.outer).chain(self.holes.iter())
    }

    fn translated(&self, dx: f64, dy: f64) -> Self {
        let shift = |l: &Vec<Point2>| l.iter().map(|p| Point2::new(p.x + dx, p.y + dy)).collect();
        Self {
            outer: shift(&self.outer),
            holes: self.holes.iter().map(shift).collect(),
        }
    }

    fn to_sketch(&self) -> Sketch<()> {
        let mut sketch = Sketch::polygon(&to_coords(&self.outer), None);
        for hole in &self.holes {
            sketch = sketch.difference(&Sketch::polygon(&to_coords(hole), None));
        }
        sketch
    }
}

fn to_coords(points: &[Point2]) -> Vec<[f64; 2]> {
    points.iter().map(|p| [p.x, p.y]).collect()
}

/// A closed 2D region used as an extrusion cross-section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    regions: Vec<Region>,
    kind: ProfileKind,
}

impl Profile {
    /// Wrap already validated regions
    pub fn from_regions(regions: Vec<Region>, kind: ProfileKind) -> Result<Self> {
        let regions: Vec<Region> = regions
            .into_iter()
            .filter(|r| r.outer.len() >= 3 && r.area() > MIN_REGION_AREA)
            .collect();
        if regions.is_empty() {
            return Err(GeometryError::invalid("profile has no area").into());
        }
        Ok(Self { regions, kind })
    }

    /// Centred rectangle with rounded corners.
    ///
    /// The corner radius must stay below half the shorter side. Corner arcs are
    /// tessellated into [`CORNER_SEGMENTS`] chords whose end points lie on the
    /// straight edges, so the bounding box is exactly `width x height`.
    pub fn rounded_rectangle(width: f64, height: f64, corner_radius: f64) -> Result<Self> {
        if !(width.is_finite() && height.is_finite() && corner_radius.is_finite()) {
            return Err(GeometryError::invalid("rectangle dimensions must be finite").into());
        }
        if width <= 0.0 || height <= 0.0 {
            return Err(GeometryError::invalid(format!(
                "rectangle size {}x{} must be positive",
                width, height
            ))
            .into());
        }
        if corner_radius < 0.0 {
            return Err(GeometryError::invalid("corner radius must not be negative").into());
        }
        let max_radius = width.min(height) / 2.0;
        if corner_radius >= max_radius {
            return Err(GeometryError::invalid(format!(
                "corner radius {} must be below {} for a {}x{} rectangle",
                corner_radius, max_radius, width, height
            ))
            .into());
        }

        let (hw, hh) = (width / 2.0, height / 2.0);
        let outer = if corner_radius <= POINT_TOLERANCE {
            vec![
                Point2::new(-hw, -hh),
                Point2::new(hw, -hh),
                Point2::new(hw, hh),
                Point2::new(-hw, hh),
            ]
        } else {
            let r = corner_radius;
            let corners = [
                (hw - r, -hh + r, -std::f64::consts::FRAC_PI_2),
                (hw - r, hh - r, 0.0),
                (-hw + r, hh - r, std::f64::consts::FRAC_PI_2),
                (-hw + r, -hh + r, std::f64::consts::PI),
            ];
            let mut pts = Vec::with_capacity(4 * (CORNER_SEGMENTS + 1));
            for (cx, cy, start) in corners {
                for i in 0..=CORNER_SEGMENTS {
                    let a = start + std::f64::consts::FRAC_PI_2 * i as f64 / CORNER_SEGMENTS as f64;
                    pts.push(Point2::new(cx + r * a.cos(), cy + r * a.sin()));
                }
            }
            pts
        };

        Ok(Self {
            regions: vec![Region::new(outer, Vec::new())],
            kind: ProfileKind::RoundedRectangle {
                width,
                height,
                corner_radius,
            },
        })
    }

    /// Centred rectangle with sharp corners
    pub fn rectangle(width: f64, height: f64) -> Result<Self> {
        Self::rounded_rectangle(width, height, 0.0)
    }

    /// Closed polyline profile.
    ///
    /// With [`Closure::Close`] the closing edge is added and must not cross any
    /// other edge. With [`Closure::AsGiven`] the last vertex must repeat the first.
    pub fn polyline(vertices: &[[f64; 2]], closure: Closure) -> Result<Self> {
        if vertices.iter().any(|v| !v[0].is_finite() || !v[1].is_finite()) {
            return Err(GeometryError::invalid("polyline vertices must be finite").into());
        }
        let mut pts: Vec<Point2> = vertices.iter().map(|v| Point2::new(v[0], v[1])).collect();

        for (i, w) in pts.windows(2).enumerate() {
            if (w[1] - w[0]).norm() <= POINT_TOLERANCE {
                return Err(GeometryError::invalid(format!("zero-length edge at vertex {}", i)).into());
            }
        }

        match closure {
            Closure::AsGiven => {
                let closed = pts.len() > 1 && (pts[0] - pts[pts.len() - 1]).norm() <= POINT_TOLERANCE;
                if !closed {
                    return Err(GeometryError::OpenProfile {
                        reason: "last vertex does not meet the first and closure was not requested"
                            .into(),
                    }
                    .into());
                }
                pts.pop();
            }
            Closure::Close => {
                if pts.len() > 1 && (pts[0] - pts[pts.len() - 1]).norm() <= POINT_TOLERANCE {
                    pts.pop();
                }
            }
        }

        if pts.len() < 3 {
            return Err(GeometryError::invalid(format!(
                "polyline needs at least 3 distinct vertices, got {}",
                pts.len()
            ))
            .into());
        }

        if let Some((i, j)) = polygon::first_crossing(&pts, false) {
            return Err(GeometryError::invalid(format!("edges {} and {} intersect", i, j)).into());
        }
        if let Some((i, j)) = polygon::first_crossing(&pts, true) {
            let other = if j == pts.len() - 1 { i } else { j };
            return Err(match closure {
                Closure::Close => GeometryError::OpenProfile {
                    reason: format!("closing edge would intersect edge {}", other),
                },
                Closure::AsGiven => {
                    GeometryError::invalid(format!("last edge intersects edge {}", other))
                }
            }
            .into());
        }
        if polygon::signed_area(&pts).abs() <= MIN_REGION_AREA {
            return Err(GeometryError::invalid("polyline encloses no area").into());
        }

        Ok(Self {
            regions: vec![Region::new(pts, Vec::new())],
            kind: ProfileKind::Polyline {
                vertices: vertices.to_vec(),
            },
        })
    }

    /// Closed profile from one half of an outline mirrored about the Y axis.
    ///
    /// The half should start and end on the axis; the mirrored half is walked in
    /// reverse so the result is a single loop.
    pub fn mirrored_polyline(half: &[[f64; 2]]) -> Result<Self> {
        let mut full: Vec<[f64; 2]> = half.to_vec();
        let on_axis = |v: &[f64; 2]| v[0].abs() <= POINT_TOLERANCE;
        let skip_first = half.first().is_some_and(on_axis);
        let skip_last = half.last().is_some_and(on_axis);
        let end = if skip_last { half.len().saturating_sub(1) } else { half.len() };
        let start = usize::from(skip_first);
        if start < end {
            full.extend(half[start..end].iter().rev().map(|v| [-v[0], v[1]]));
        }
        Self::polyline(&full, Closure::Close)
    }

    /// Isosceles indicator triangle centred on the origin, pointing up
    pub fn triangle(width: f64, height: f64) -> Result<Self> {
        if width <= 0.0 || height <= 0.0 {
            return Err(GeometryError::invalid("triangle size must be positive").into());
        }
        Self::polyline(
            &[
                [-width / 2.0, -height / 2.0],
                [width / 2.0, -height / 2.0],
                [0.0, height / 2.0],
            ],
            Closure::Close,
        )
    }

    /// Circle centred on the origin, tessellated into [`CIRCLE_SEGMENTS`] chords
    pub fn circle(radius: f64) -> Result<Self> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(GeometryError::invalid(format!("circle radius {} must be positive", radius)).into());
        }
        let vertices: Vec<[f64; 2]> = (0..CIRCLE_SEGMENTS)
            .map(|i| {
                let a = std::f64::consts::TAU * i as f64 / CIRCLE_SEGMENTS as f64;
                [radius * a.cos(), radius * a.sin()]
            })
            .collect();
        Self::polyline(&vertices, Closure::Close)
    }

    /// One profile per glyph of `text`, baseline on y = 0 starting at x = 0.
    ///
    /// Whitespace produces no entries.
    pub fn text(text: &str, font: &FontSpec, size: f64) -> Result<Vec<Self>> {
        crate::text::glyph_profiles(text, font, size)
    }

    /// All glyphs of `text` merged into one profile, centred on the origin
    pub fn text_block(text: &str, font: &FontSpec, size: f64) -> Result<Self> {
        let glyphs = Self::text(text, font, size)?;
        let mut iter = glyphs.into_iter();
        let first = iter.next().ok_or_else(|| {
            GeometryError::invalid(format!("text '{}' has no visible glyphs", text))
        })?;
        let merged = iter.try_fold(first, |acc, g| acc.union(&g))?;
        let (min, max) = merged.bounds();
        Ok(merged.translated(-(min.x + max.x) / 2.0, -(min.y + max.y) / 2.0))
    }

    pub(crate) fn with_kind(mut self, kind: ProfileKind) -> Self {
        self.kind = kind;
        self
    }

    /// The regions making up this profile
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// How this profile was declared
    pub fn kind(&self) -> &ProfileKind {
        &self.kind
    }

    /// Net enclosed area
    pub fn area(&self) -> f64 {
        self.regions.iter().map(Region::area).sum()
    }

    /// Minimum and maximum corners of the 2D bounding box
    pub fn bounds(&self) -> (Point2, Point2) {
        let mut min = Point2::new(f64::MAX, f64::MAX);
        let mut max = Point2::new(f64::MIN, f64::MIN);
        for p in self.regions.iter().flat_map(|r| r.outer.iter()) {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        (min, max)
    }

    /// Width and height of the bounding box
    pub fn size(&self) -> (f64, f64) {
        let (min, max) = self.bounds();
        (max.x - min.x, max.y - min.y)
    }

    /// True when `other` lies strictly inside this profile: every vertex of
    /// `other` is interior here and no boundaries touch.
    pub fn contains(&self, other: &Profile) -> bool {
        let inside = other
            .regions
            .iter()
            .flat_map(|r| r.loops())
            .flatten()
            .all(|p| self.regions.iter().any(|r| r.contains_point(p)));
        if !inside {
            return false;
        }
        for mine in self.regions.iter().flat_map(|r| r.loops()) {
            for theirs in other.regions.iter().flat_map(|r| r.loops()) {
                for i in 0..mine.len() {
                    let (a1, a2) = (mine[i], mine[(i + 1) % mine.len()]);
                    for j in 0..theirs.len() {
                        let (b1, b2) = (theirs[j], theirs[(j + 1) % theirs.len()]);
                        if polygon::segments_intersect(&a1, &a2, &b1, &b2) {
                            return false;
                        }
                    }
                }
            }
        }
        true
    }

    /// Copy moved by `(dx, dy)`
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self {
            regions: self.regions.iter().map(|r| r.translated(dx, dy)).collect(),
            kind: self.kind.clone(),
        }
    }

    /// Copy mapped through `placement` and flattened back onto the XY plane.
    ///
    /// Only meaningful for placements that keep the Z axis vertical.
    pub fn transformed(&self, placement: &Placement) -> Self {
        let map = |l: &Vec<Point2>| -> Vec<Point2> {
            l.iter()
                .map(|p| {
                    let q = placement.transform_point(&Point3::new(p.x, p.y, 0.0));
                    Point2::new(q.x, q.y)
                })
                .collect()
        };
        Self {
            regions: self
                .regions
                .iter()
                .map(|r| Region::new(map(&r.outer), r.holes.iter().map(map).collect()))
                .collect(),
            kind: self.kind.clone(),
        }
    }

    /// Union of copies placed at each offset
    pub fn at_locations(&self, offsets: &[(f64, f64)]) -> Result<Self> {
        let mut iter = offsets.iter();
        let (dx, dy) = iter
            .next()
            .ok_or_else(|| GeometryError::invalid("at least one location is required"))?;
        let first = self.translated(*dx, *dy);
        iter.try_fold(first, |acc, (dx, dy)| acc.union(&self.translated(*dx, *dy)))
    }

    /// Region union; fails with `EmptyResult` if the boolean loses both operands
    pub fn union(&self, other: &Profile) -> Result<Profile> {
        // Disjoint operands need no boolean; keep their exact vertices.
        if self.disjoint_from(other) {
            let mut regions = self.regions.clone();
            regions.extend(other.regions.iter().cloned());
            return Ok(Self {
                regions,
                kind: ProfileKind::Composite,
            });
        }
        let sketch = self.to_sketch().union(&other.to_sketch());
        Self::from_sketch(&sketch).ok_or_else(|| GeometryError::empty("union").into())
    }

    /// Region difference, `None` when nothing remains
    pub fn try_subtract(&self, other: &Profile) -> Option<Profile> {
        if self.disjoint_from(other) {
            return Some(self.clone());
        }
        Self::from_sketch(&self.to_sketch().difference(&other.to_sketch()))
    }

    /// Region intersection, `None` when nothing is shared
    pub fn try_intersect(&self, other: &Profile) -> Option<Profile> {
        if self.disjoint_from(other) {
            return None;
        }
        Self::from_sketch(&self.to_sketch().intersection(&other.to_sketch()))
    }

    /// Region difference; fails with `EmptyResult` when `other` covers this profile
    pub fn subtract(&self, other: &Profile) -> Result<Profile> {
        self.try_subtract(other)
            .ok_or_else(|| GeometryError::empty("subtract").into())
    }

    /// Region intersection; fails with `EmptyResult` when nothing is shared
    pub fn intersect(&self, other: &Profile) -> Result<Profile> {
        self.try_intersect(other)
            .ok_or_else(|| GeometryError::empty("intersect").into())
    }

    fn disjoint_from(&self, other: &Profile) -> bool {
        let (a_min, a_max) = self.bounds();
        let (b_min, b_max) = other.bounds();
        a_max.x < b_min.x || b_max.x < a_min.x || a_max.y < b_min.y || b_max.y < a_min.y
    }

    fn to_sketch(&self) -> Sketch<()> {
        let mut iter = self.regions.iter();
        let Some(first) = iter.next() else {
            return Sketch::new();
        };
        iter.fold(first.to_sketch(), |acc, r| acc.union(&r.to_sketch()))
    }

    fn from_sketch(sketch: &Sketch<()>) -> Option<Profile> {
        let mp = sketch.to_multipolygon();
        let mut regions = Vec::new();
        for poly in mp.0 {
            let outer: Vec<Point2> = poly.exterior().0.iter().map(|c| Point2::new(c.x, c.y)).collect();
            let outer = polygon::dedup_loop(&outer, POINT_TOLERANCE);
            if outer.len() < 3 || polygon::signed_area(&outer).abs() < MIN_REGION_AREA {
                continue;
            }
            let holes = poly
                .interiors()
                .iter()
                .map(|ring| {
                    let pts: Vec<Point2> = ring.0.iter().map(|c| Point2::new(c.x, c.y)).collect();
                    polygon::dedup_loop(&pts, POINT_TOLERANCE)
                })
                .filter(|h| h.len() >= 3 && polygon::signed_area(h).abs() >= MIN_REGION_AREA)
                .collect();
            regions.push(Region::new(outer, holes));
        }
        regions.retain(|r| r.area() > MIN_REGION_AREA);
        if regions.is_empty() {
            None
        } else {
            Some(Self {
                regions,
                kind: ProfileKind::Composite,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
    }

    #[test]
    fn test_rounded_rectangle_bounds() {
        let p = Profile::rounded_rectangle(22.0, 22.0, 0.5).unwrap();
        let (w, h) = p.size();
        assert_close(w, 22.0);
        assert_close(h, 22.0);
        assert_eq!(p.regions().len(), 1);
        assert!(p.regions()[0].holes.is_empty());
        let corner_loss = (4.0 - std::f64::consts::PI) * 0.25;
        assert!((p.area() - (484.0 - corner_loss)).abs() < 0.01);
    }

    #[test]
    fn test_rounded_rectangle_radius_limit() {
        assert!(Profile::rounded_rectangle(10.0, 4.0, 1.9).is_ok());
        let err = Profile::rounded_rectangle(10.0, 4.0, 2.0).unwrap_err();
        assert!(matches!(
            err,
            panelcam_core::Error::Geometry(GeometryError::InvalidGeometry { .. })
        ));
        assert!(Profile::rounded_rectangle(0.0, 4.0, 0.0).is_err());
        assert!(Profile::rounded_rectangle(f64::NAN, 4.0, 0.0).is_err());
    }

    #[test]
    fn test_polyline_closure() {
        let tri = [[0.0, 0.0], [4.0, 0.0], [0.0, 3.0]];
        let p = Profile::polyline(&tri, Closure::Close).unwrap();
        assert_close(p.area(), 6.0);

        let err = Profile::polyline(&tri, Closure::AsGiven).unwrap_err();
        assert!(matches!(
            err,
            panelcam_core::Error::Geometry(GeometryError::OpenProfile { .. })
        ));

        let closed = [[0.0, 0.0], [4.0, 0.0], [0.0, 3.0], [0.0, 0.0]];
        assert!(Profile::polyline(&closed, Closure::AsGiven).is_ok());
    }

    #[test]
    fn test_polyline_closing_edge_crosses() {
        // The open chain is simple; only the edge from (4,2) back to (0,2) crosses it.
        let zig = [[0.0, 2.0], [2.0, 4.0], [2.0, 0.0], [4.0, 2.0]];
        let err = Profile::polyline(&zig, Closure::Close).unwrap_err();
        assert!(matches!(
            err,
            panelcam_core::Error::Geometry(GeometryError::OpenProfile { .. })
        ));
    }

    #[test]
    fn test_polyline_degenerate() {
        let dup = [[0.0, 0.0], [0.0, 0.0], [1.0, 1.0], [1.0, 0.0]];
        assert!(Profile::polyline(&dup, Closure::Close).is_err());
        let line = [[0.0, 0.0], [1.0, 0.0], [2.0, 0.0]];
        assert!(Profile::polyline(&line, Closure::Close).is_err());
        let bowtie = [[0.0, 0.0], [2.0, 2.0], [2.0, 0.0], [0.0, 2.0]];
        assert!(Profile::polyline(&bowtie, Closure::Close).is_err());
    }

    #[test]
    fn test_mirrored_polyline() {
        let half = [[0.0, 0.0], [-1.5, 0.0], [-1.5, 3.0], [0.0, 3.0]];
        let p = Profile::mirrored_polyline(&half).unwrap();
        let (w, h) = p.size();
        assert_close(w, 3.0);
        assert_close(h, 3.0);
        assert_close(p.area(), 9.0);
    }

    #[test]
    fn test_subtract_and_contains() {
        let outer = Profile::rounded_rectangle(22.0, 22.0, 0.5).unwrap();
        let inner = Profile::rounded_rectangle(20.0, 20.0, 0.5).unwrap();
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));

        let ring = outer.subtract(&inner).unwrap();
        assert_eq!(ring.regions().len(), 1);
        assert_eq!(ring.regions()[0].holes.len(), 1);
        assert!((ring.area() - (outer.area() - inner.area())).abs() < 1e-6);

        let err = inner.subtract(&outer).unwrap_err();
        assert!(matches!(
            err,
            panelcam_core::Error::Geometry(GeometryError::EmptyResult { .. })
        ));
    }

    #[test]
    fn test_circle() {
        let c = Profile::circle(2.0).unwrap();
        assert_eq!(c.regions()[0].outer.len(), CIRCLE_SEGMENTS);
        let (w, h) = c.size();
        assert_close(w, 4.0);
        assert_close(h, 4.0);
        assert!((c.area() - std::f64::consts::PI * 4.0).abs() < 0.1);
        assert!(Profile::circle(0.0).is_err());
    }

    #[test]
    fn test_at_locations() {
        let slot = Profile::rectangle(4.0, 2.0).unwrap();
        let slots = slot.at_locations(&[(0.0, 3.0), (0.0, -3.0)]).unwrap();
        assert_eq!(slots.regions().len(), 2);
        assert_close(slots.area(), 16.0);
        assert!(slot.at_locations(&[]).is_err());
    }

    #[test]
    fn test_union_keeps_both_operands() {
        let a = Profile::rectangle(10.0, 10.0).unwrap();
        let b = a.translated(5.0, 0.0);
        let merged = a.union(&b).unwrap();
        assert_eq!(merged.regions().len(), 1);
        assert!((merged.area() - 150.0).abs() < 1e-6);
        let (w, _) = merged.size();
        assert_close(w, 15.0);

        let far = a.translated(50.0, 0.0);
        assert_eq!(a.union(&far).unwrap().regions().len(), 2);
    }
}
