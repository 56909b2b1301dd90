//! Prismatic solids.
//!
//! A [`Solid`] is an ordered stack of [`Slab`]s along local Z, each slab a
//! [`Profile`] swept between two Z levels. Extrusion with a boolean mode splits
//! the stack at the new Z levels and combines profiles slab by slab, which
//! covers ledges, steps, pockets and through cuts.

use crate::profile::Profile;
use panelcam_core::{BoundingBox3, GeometryError, Point3, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Z levels closer than this are the same level.
pub const Z_TOLERANCE: f64 = 1e-9;

/// Which way a workplane's normal points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    /// Along +Z
    Up,
    /// Along -Z
    Down,
}

impl Facing {
    /// +1 for up, -1 for down
    pub fn sign(&self) -> f64 {
        match self {
            Facing::Up => 1.0,
            Facing::Down => -1.0,
        }
    }
}

/// Sketch plane: a Z level with a normal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Workplane {
    /// Z level of the plane
    pub z: f64,
    /// Normal direction; positive extrusion follows it
    pub facing: Facing,
}

impl Workplane {
    /// Upward plane at `z`
    pub fn xy(z: f64) -> Self {
        Self {
            z,
            facing: Facing::Up,
        }
    }
}

/// How an extrusion combines with the existing solid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BooleanMode {
    /// Union
    Add,
    /// Difference
    Subtract,
    /// Keep only the common volume
    Intersect,
}

impl fmt::Display for BooleanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BooleanMode::Add => write!(f, "add"),
            BooleanMode::Subtract => write!(f, "subtract"),
            BooleanMode::Intersect => write!(f, "intersect"),
        }
    }
}

/// One prismatic layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slab {
    /// Lower Z level
    pub z_min: f64,
    /// Upper Z level
    pub z_max: f64,
    /// Cross-section
    pub profile: Profile,
}

impl Slab {
    /// Slab height
    pub fn height(&self) -> f64 {
        self.z_max - self.z_min
    }
}

/// A stack of slabs; never empty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solid {
    slabs: Vec<Slab>,
}

fn extrusion_range(plane: &Workplane, amount: f64) -> Result<(f64, f64)> {
    if !amount.is_finite() || amount.abs() <= Z_TOLERANCE {
        return Err(GeometryError::invalid(format!(
            "extrusion amount {} must be finite and non-zero",
            amount
        ))
        .into());
    }
    let end = plane.z + plane.facing.sign() * amount;
    Ok((plane.z.min(end), plane.z.max(end)))
}

impl Solid {
    /// Sweep `profile` from `plane` by `amount` along the plane normal
    pub fn from_extrusion(profile: &Profile, plane: Workplane, amount: f64) -> Result<Self> {
        let (z_min, z_max) = extrusion_range(&plane, amount)?;
        Ok(Self {
            slabs: vec![Slab {
                z_min,
                z_max,
                profile: profile.clone(),
            }],
        })
    }

    /// Extrude `profile` from `plane` by the signed `amount` and combine it with
    /// this solid. Fails with `EmptyResult` when nothing would remain.
    pub fn extrude(
        &self,
        profile: &Profile,
        plane: Workplane,
        amount: f64,
        mode: BooleanMode,
    ) -> Result<Self> {
        let (lo, hi) = extrusion_range(&plane, amount)?;

        let mut levels: Vec<f64> = self
            .slabs
            .iter()
            .flat_map(|s| [s.z_min, s.z_max])
            .chain([lo, hi])
            .collect();
        levels.sort_by(|a, b| a.total_cmp(b));
        levels.dedup_by(|a, b| (*a - *b).abs() <= Z_TOLERANCE);

        let mut slabs: Vec<Slab> = Vec::new();
        for w in levels.windows(2) {
            let (a, b) = (w[0], w[1]);
            let mid = (a + b) / 2.0;
            let existing = self
                .slabs
                .iter()
                .find(|s| s.z_min <= mid && mid <= s.z_max)
                .map(|s| &s.profile);
            let inside = lo <= mid && mid <= hi;

            let combined = match (mode, inside) {
                (BooleanMode::Intersect, false) => None,
                (_, false) => existing.cloned(),
                (BooleanMode::Add, true) => Some(match existing {
                    Some(e) => e.union(profile)?,
                    None => profile.clone(),
                }),
                (BooleanMode::Subtract, true) => existing.and_then(|e| e.try_subtract(profile)),
                (BooleanMode::Intersect, true) => existing.and_then(|e| e.try_intersect(profile)),
            };

            let Some(combined) = combined else {
                continue;
            };
            match slabs.last_mut() {
                Some(last) if (last.z_max - a).abs() <= Z_TOLERANCE && last.profile == combined => {
                    last.z_max = b;
                }
                _ => slabs.push(Slab {
                    z_min: a,
                    z_max: b,
                    profile: combined,
                }),
            }
        }

        if slabs.is_empty() {
            return Err(GeometryError::empty(mode.to_string()).into());
        }
        tracing::debug!(
            "Extruded {} over z [{:.3}, {:.3}]: {} slabs",
            mode,
            lo,
            hi,
            slabs.len()
        );
        Ok(Self { slabs })
    }

    /// Slabs ordered by ascending Z
    pub fn slabs(&self) -> &[Slab] {
        &self.slabs
    }

    /// Lowest and highest Z level
    pub fn z_range(&self) -> (f64, f64) {
        let lo = self.slabs.first().map_or(0.0, |s| s.z_min);
        let hi = self.slabs.last().map_or(0.0, |s| s.z_max);
        (lo, hi)
    }

    /// Outward plane of the lowest face, for sketching on the bottom
    pub fn lowest_plane(&self) -> Workplane {
        Workplane {
            z: self.z_range().0,
            facing: Facing::Down,
        }
    }

    /// Outward plane of the highest face
    pub fn highest_plane(&self) -> Workplane {
        Workplane {
            z: self.z_range().1,
            facing: Facing::Up,
        }
    }

    /// Axis-aligned bounds
    pub fn bounds(&self) -> BoundingBox3 {
        let (z_min, z_max) = self.z_range();
        let mut min = Point3::new(f64::MAX, f64::MAX, z_min);
        let mut max = Point3::new(f64::MIN, f64::MIN, z_max);
        for slab in &self.slabs {
            let (lo, hi) = slab.profile.bounds();
            min.x = min.x.min(lo.x);
            min.y = min.y.min(lo.y);
            max.x = max.x.max(hi.x);
            max.y = max.y.max(hi.y);
        }
        BoundingBox3::new(min, max)
    }

    /// Enclosed volume
    pub fn volume(&self) -> f64 {
        self.slabs.iter().map(|s| s.profile.area() * s.height()).sum()
    }

    /// Silhouette seen along Z
    pub fn projection(&self) -> Result<Profile> {
        let mut iter = self.slabs.iter();
        let first = iter
            .next()
            .map(|s| s.profile.clone())
            .unwrap_or_else(|| unreachable!("solids always have a slab"));
        iter.try_fold(first, |acc, s| acc.union(&s.profile))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: f64) -> Profile {
        Profile::rectangle(size, size).unwrap()
    }

    #[test]
    fn test_extrude_down_from_plane() {
        let solid = Solid::from_extrusion(&square(10.0), Workplane::xy(0.0), -2.0).unwrap();
        assert_eq!(solid.z_range(), (-2.0, 0.0));
        assert!((solid.volume() - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_add_on_lowest_plane() {
        let top = Solid::from_extrusion(&square(12.0), Workplane::xy(0.0), -1.0).unwrap();
        let stacked = top
            .extrude(&square(10.0), top.lowest_plane(), 2.0, BooleanMode::Add)
            .unwrap();
        assert_eq!(stacked.slabs().len(), 2);
        assert_eq!(stacked.z_range(), (-3.0, 0.0));
        assert!((stacked.volume() - (144.0 + 200.0)).abs() < 1e-9);
        let b = stacked.bounds();
        assert!((b.size().x - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_subtract_pocket_splits_slab() {
        let block = Solid::from_extrusion(&square(10.0), Workplane::xy(0.0), -3.0).unwrap();
        let pocketed = block
            .extrude(&square(4.0), block.highest_plane(), -1.0, BooleanMode::Subtract)
            .unwrap();
        assert_eq!(pocketed.slabs().len(), 2);
        assert!((pocketed.volume() - (300.0 - 16.0)).abs() < 1e-6);
    }

    #[test]
    fn test_subtract_everything_is_error() {
        let block = Solid::from_extrusion(&square(10.0), Workplane::xy(0.0), -3.0).unwrap();
        let err = block
            .extrude(&square(20.0), Workplane::xy(1.0), -5.0, BooleanMode::Subtract)
            .unwrap_err();
        assert!(matches!(
            err,
            panelcam_core::Error::Geometry(GeometryError::EmptyResult { .. })
        ));
    }

    #[test]
    fn test_intersect_trims_height() {
        let block = Solid::from_extrusion(&square(10.0), Workplane::xy(0.0), -3.0).unwrap();
        let trimmed = block
            .extrude(&square(10.0), Workplane::xy(0.0), -1.0, BooleanMode::Intersect)
            .unwrap();
        assert_eq!(trimmed.z_range(), (-1.0, 0.0));
    }

    #[test]
    fn test_zero_amount_rejected() {
        assert!(Solid::from_extrusion(&square(1.0), Workplane::xy(0.0), 0.0).is_err());
    }
}
