//! 8x8 mm PCB tactile switch with a clip-on slider.

use crate::part::{assemble, AssemblyOptions, Part};
use crate::profile::Profile;
use crate::solid::{Solid, Workplane};
use panelcam_core::{Color, Placement, Result};

/// Left half of the clip outline in the XZ plane, mirrored to close it
const CLIP_HALF: [[f64; 2]; 10] = [
    [0.0, 0.0],
    [-1.5, 0.0],
    [-1.5, 1.0],
    [-1.0, 1.0],
    [-1.0, 2.0],
    [-1.5, 2.0],
    [-1.5, 3.0],
    [-0.5, 3.0],
    [-0.5, 2.5],
    [0.0, 2.5],
];

/// Height of the slider stem above the housing
const STEM_HEIGHT: f64 = 2.2;

#[derive(Debug, Clone, Copy, Default)]
pub struct Switch8x8;

impl Switch8x8 {
    /// 4x4 stem with the clip standing on top of it
    pub fn slider(&self) -> Result<Part> {
        let stem = Solid::from_extrusion(&Profile::rectangle(4.0, 4.0)?, Workplane::xy(0.0), STEM_HEIGHT)?;

        // Sketched flat, extruded 1 mm both ways, then stood upright.
        let clip = Solid::from_extrusion(&Profile::mirrored_polyline(&CLIP_HALF)?, Workplane::xy(-1.0), 2.0)?;
        let upright = Placement::rotation_x(90.0).then(&Placement::translation(0.0, 0.0, STEM_HEIGHT));

        assemble(
            "slider",
            vec![
                (Part::new("stem", stem, Color::STEELBLUE), Placement::identity()),
                (Part::new("clip", clip, Color::STEELBLUE), upright),
            ],
            &AssemblyOptions::default(),
        )
    }

    /// 8 mm cube centred on the origin
    pub fn housing(&self) -> Result<Part> {
        let solid = Solid::from_extrusion(&Profile::rectangle(8.0, 8.0)?, Workplane::xy(-4.0), 8.0)?;
        Ok(Part::new("housing", solid, Color::gray(20)))
    }

    /// Slider on top of the housing, housing top at z = 0
    pub fn assembly(&self) -> Result<Part> {
        assemble(
            "switch8x8",
            vec![
                (self.slider()?, Placement::identity()),
                (self.housing()?, Placement::translation(0.0, 0.0, -4.0)),
            ],
            &AssemblyOptions {
                check_overlaps: true,
                tolerance: 0.0,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_stands_on_stem() {
        let slider = Switch8x8.slider().unwrap();
        let clip = slider.find("clip").unwrap();
        let b = clip.bounds();
        assert!((b.min.z - STEM_HEIGHT).abs() < 1e-9);
        assert!((b.max.z - (STEM_HEIGHT + 3.0)).abs() < 1e-9);
        assert!((b.size().x - 3.0).abs() < 1e-9);
        assert!((b.size().y - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_assembly_stack() {
        let asm = Switch8x8.assembly().unwrap();
        let b = asm.bounds();
        assert!((b.min.z + 8.0).abs() < 1e-9);
        assert!((b.max.z - 5.2).abs() < 1e-9);
        assert_eq!(asm.find("housing").unwrap().color(), Some(Color::gray(20)));
        assert_eq!(asm.find("stem").unwrap().color(), Some(Color::STEELBLUE));
    }
}
