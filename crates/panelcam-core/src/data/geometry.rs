//! Shared geometric value types
//!
//! Millimetre coordinates, axis-aligned bounds, rigid placements and display colors.

use nalgebra::{Isometry3, Translation3, UnitQuaternion};
use serde::{Deserialize, Serialize};

/// 2D point in millimetres
pub type Point2 = nalgebra::Point2<f64>;
/// 3D point in millimetres
pub type Point3 = nalgebra::Point3<f64>;
/// 3D direction or displacement
pub type Vector3 = nalgebra::Vector3<f64>;

/// Axis-aligned 3D bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox3 {
    /// Minimum corner
    pub min: Point3,
    /// Maximum corner
    pub max: Point3,
}

impl BoundingBox3 {
    /// Box spanning two corners in any order
    pub fn new(a: Point3, b: Point3) -> Self {
        Self {
            min: Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Smallest box containing all points, `None` for an empty iterator
    pub fn from_points<I: IntoIterator<Item = Point3>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        Some(iter.fold(Self::new(first, first), |acc, p| acc.including(p)))
    }

    /// Grow to include a point
    pub fn including(&self, p: Point3) -> Self {
        Self {
            min: Point3::new(self.min.x.min(p.x), self.min.y.min(p.y), self.min.z.min(p.z)),
            max: Point3::new(self.max.x.max(p.x), self.max.y.max(p.y), self.max.z.max(p.z)),
        }
    }

    /// Smallest box containing both boxes
    pub fn union(&self, other: &Self) -> Self {
        self.including(other.min).including(other.max)
    }

    /// Edge lengths
    pub fn size(&self) -> Vector3 {
        self.max - self.min
    }

    /// Center point
    pub fn center(&self) -> Point3 {
        nalgebra::center(&self.min, &self.max)
    }

    /// Volume shared with another box; zero when they only touch
    pub fn overlap_volume(&self, other: &Self) -> f64 {
        let dx = self.max.x.min(other.max.x) - self.min.x.max(other.min.x);
        let dy = self.max.y.min(other.max.y) - self.min.y.max(other.min.y);
        let dz = self.max.z.min(other.max.z) - self.min.z.max(other.min.z);
        if dx <= 0.0 || dy <= 0.0 || dz <= 0.0 {
            0.0
        } else {
            dx * dy * dz
        }
    }

    /// The eight corners
    pub fn corners(&self) -> [Point3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Point3::new(a.x, a.y, a.z),
            Point3::new(b.x, a.y, a.z),
            Point3::new(a.x, b.y, a.z),
            Point3::new(b.x, b.y, a.z),
            Point3::new(a.x, a.y, b.z),
            Point3::new(b.x, a.y, b.z),
            Point3::new(a.x, b.y, b.z),
            Point3::new(b.x, b.y, b.z),
        ]
    }

    /// Axis-aligned bounds of this box after a rigid placement
    pub fn transformed(&self, placement: &Placement) -> Self {
        let corners = self.corners();
        let mut out = Self::new(
            placement.transform_point(&corners[0]),
            placement.transform_point(&corners[0]),
        );
        for c in &corners[1..] {
            out = out.including(placement.transform_point(c));
        }
        out
    }
}

/// Rigid local-to-parent transform (translation + rotation)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement(Isometry3<f64>);

impl Default for Placement {
    fn default() -> Self {
        Self::identity()
    }
}

impl Placement {
    /// No movement
    pub fn identity() -> Self {
        Self(Isometry3::identity())
    }

    /// Pure translation
    pub fn translation(x: f64, y: f64, z: f64) -> Self {
        Self(Isometry3::from_parts(
            Translation3::new(x, y, z),
            UnitQuaternion::identity(),
        ))
    }

    /// Rotation about +Z by `degrees` around the origin
    pub fn rotation_z(degrees: f64) -> Self {
        Self(Isometry3::from_parts(
            Translation3::identity(),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), degrees.to_radians()),
        ))
    }

    /// Rotation about +X by `degrees` around the origin
    pub fn rotation_x(degrees: f64) -> Self {
        Self(Isometry3::from_parts(
            Translation3::identity(),
            UnitQuaternion::from_axis_angle(&Vector3::x_axis(), degrees.to_radians()),
        ))
    }

    /// Wrap an existing isometry
    pub fn from_isometry(iso: Isometry3<f64>) -> Self {
        Self(iso)
    }

    /// Underlying isometry
    pub fn isometry(&self) -> &Isometry3<f64> {
        &self.0
    }

    /// Apply `self` first, then `outer`
    pub fn then(&self, outer: &Placement) -> Placement {
        Self(outer.0 * self.0)
    }

    /// Map a point from local to parent coordinates
    pub fn transform_point(&self, p: &Point3) -> Point3 {
        self.0.transform_point(p)
    }

    /// Map a direction from local to parent coordinates
    pub fn transform_vector(&self, v: &Vector3) -> Vector3 {
        self.0.transform_vector(v)
    }

    /// True when the rotation leaves +Z unchanged, so Z levels map to Z levels
    pub fn preserves_z_axis(&self) -> bool {
        (self.transform_vector(&Vector3::z()) - Vector3::z()).norm() < 1e-9
    }
}

/// Display color of a part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Color {
    /// Steel blue (sleeves and housings)
    pub const STEELBLUE: Color = Color::rgb(70, 130, 180);
    /// White (diffusers)
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    /// Black
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    /// Color from channel values
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// X11 style `grayN`, N in percent
    pub fn gray(percent: u8) -> Self {
        let v = ((percent.min(100) as f64) * 255.0 / 100.0).round() as u8;
        Self::rgb(v, v, v)
    }

    /// Parse a small set of names (`steelblue`, `white`, `black`, `grayN`) or `#rrggbb`
    pub fn named(name: &str) -> Option<Self> {
        let name = name.trim().to_lowercase();
        match name.as_str() {
            "steelblue" => return Some(Self::STEELBLUE),
            "white" => return Some(Self::WHITE),
            "black" => return Some(Self::BLACK),
            _ => {}
        }
        if let Some(pct) = name.strip_prefix("gray").or_else(|| name.strip_prefix("grey")) {
            return pct.parse::<u8>().ok().filter(|p| *p <= 100).map(Self::gray);
        }
        let hex = name.strip_prefix('#')?;
        if hex.len() != 6 {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    /// `#rrggbb`
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_volume() {
        let a = BoundingBox3::new(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 2.0, 2.0));
        let b = BoundingBox3::new(Point3::new(1.0, 1.0, 1.0), Point3::new(3.0, 3.0, 3.0));
        let touching = BoundingBox3::new(Point3::new(2.0, 0.0, 0.0), Point3::new(4.0, 2.0, 2.0));
        assert!((a.overlap_volume(&b) - 1.0).abs() < 1e-12);
        assert_eq!(a.overlap_volume(&touching), 0.0);
    }

    #[test]
    fn test_transformed_bounds() {
        let a = BoundingBox3::new(Point3::new(0.0, 0.0, 0.0), Point3::new(4.0, 2.0, 1.0));
        let moved = a.transformed(&Placement::rotation_z(90.0).then(&Placement::translation(10.0, 0.0, 0.0)));
        assert!((moved.min.x - 8.0).abs() < 1e-9);
        assert!((moved.max.x - 10.0).abs() < 1e-9);
        assert!((moved.max.y - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_placement_z_axis() {
        assert!(Placement::rotation_z(33.0).preserves_z_axis());
        assert!(!Placement::rotation_x(90.0).preserves_z_axis());
    }

    #[test]
    fn test_named_colors() {
        assert_eq!(Color::named("gray20"), Some(Color::rgb(51, 51, 51)));
        assert_eq!(Color::named("SteelBlue"), Some(Color::STEELBLUE));
        assert_eq!(Color::named("#ff8000"), Some(Color::rgb(255, 128, 0)));
        assert_eq!(Color::named("gray200"), None);
        assert_eq!(Color::WHITE.to_hex(), "#ffffff");
    }
}
