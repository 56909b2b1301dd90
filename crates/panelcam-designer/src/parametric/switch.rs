//! Square push-button switch parts.
//!
//! The switch is a sleeve mounted through the panel, a slider carrying two
//! lit legends, a cover and the diffusers that sit in the slider's slots. All
//! parts are built top-down: z = 0 is the panel face and material extends to
//! negative Z.

use crate::font_manager::FontSpec;
use crate::part::{assemble, AssemblyOptions, Part, PartMetadata};
use crate::profile::Profile;
use crate::solid::{BooleanMode, Solid, Workplane};
use panelcam_core::{Color, GeometryError, Placement, Result};
use serde::{Deserialize, Serialize};

/// Which sides of the sleeve carry a mounting ledge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgeSides {
    pub left: bool,
    pub right: bool,
}

impl LedgeSides {
    /// Ledge on both sides
    pub const BOTH: LedgeSides = LedgeSides {
        left: true,
        right: true,
    };
}

impl Default for LedgeSides {
    fn default() -> Self {
        Self::BOTH
    }
}

/// Legend slot size and vertical offset of each slot centre
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlotValues {
    pub width: f64,
    pub height: f64,
    pub offset: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SliderOptions {
    /// Total slider thickness
    pub stock_thickness: f64,
    /// Depth of the full-size slot pocket that holds the diffuser
    pub diffuser_thickness: f64,
    /// Lip left under the diffuser on every side
    pub diffuser_ledge: f64,
}

impl Default for SliderOptions {
    fn default() -> Self {
        Self {
            stock_thickness: 5.0,
            diffuser_thickness: 3.0,
            diffuser_ledge: 0.5,
        }
    }
}

/// Engravings on a diffuser's top face
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffuserOptions {
    pub stock_thickness: f64,
    /// Legend text, centred
    pub text: Option<String>,
    #[serde(skip)]
    pub font: FontSpec,
    pub text_size: f64,
    /// Engrave a frame just inside the edge
    pub frame: bool,
    /// Engrave an indicator triangle
    pub triangle: bool,
    pub engrave_depth: f64,
}

impl Default for DiffuserOptions {
    fn default() -> Self {
        Self {
            stock_thickness: 3.0,
            text: None,
            font: FontSpec::default(),
            text_size: 5.0,
            frame: false,
            triangle: false,
            engrave_depth: 0.1,
        }
    }
}

impl DiffuserOptions {
    /// Diffuser engraved with `text`
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }
}

/// Grid spacing for a panel of diffusers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PanelLayout {
    /// Centre distance between columns
    pub h_spacing: f64,
    /// Centre distance between rows
    pub v_spacing: f64,
}

impl Default for PanelLayout {
    fn default() -> Self {
        Self {
            h_spacing: 22.0,
            v_spacing: 13.0,
        }
    }
}

/// Frame engraving inset from the diffuser edge
const FRAME_INSET: f64 = 1.0;
/// Frame engraving line width
const FRAME_WIDTH: f64 = 0.5;

/// Nominal switch dimensions; `width` x `height` is the opening the slider
/// runs in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwitchGeometry {
    pub width: f64,
    pub height: f64,
    pub corner_radius: f64,
    pub wall_thickness: f64,
    /// Ledge overhang beyond the outer wall
    pub ledge: f64,
    pub ledge_thickness: f64,
}

impl SwitchGeometry {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            corner_radius: 0.5,
            wall_thickness: 1.0,
            ledge: 0.5,
            ledge_thickness: 1.0,
        }
    }

    /// Outside size of the sleeve body
    pub fn outer_size(&self) -> (f64, f64) {
        (
            self.width + 2.0 * self.wall_thickness,
            self.height + 2.0 * self.wall_thickness,
        )
    }

    /// Opening through the sleeve
    pub fn bore_profile(&self) -> Result<Profile> {
        Profile::rounded_rectangle(self.width, self.height, self.corner_radius)
    }

    /// Outline of the sleeve body
    pub fn outer_profile(&self) -> Result<Profile> {
        let (w, h) = self.outer_size();
        Profile::rounded_rectangle(w, h, self.corner_radius)
    }

    /// Outline of the mounting ledge. A missing side is flush with the body.
    pub fn ledge_profile(&self, sides: LedgeSides) -> Result<Profile> {
        let (w, h) = self.outer_size();
        let left = f64::from(u8::from(sides.left));
        let right = f64::from(u8::from(sides.right));
        let profile = Profile::rounded_rectangle(
            w + self.ledge * (left + right),
            h + 2.0 * self.ledge,
            self.corner_radius,
        )?;
        Ok(profile.translated((right - left) * self.ledge / 2.0, 0.0))
    }

    /// Sleeve: ledge layer at the top, body below, bore through both
    pub fn sleeve(&self, stock_thickness: f64, sides: LedgeSides) -> Result<Part> {
        if stock_thickness <= self.ledge_thickness {
            return Err(GeometryError::invalid(format!(
                "sleeve stock {} must be thicker than the ledge {}",
                stock_thickness, self.ledge_thickness
            ))
            .into());
        }
        let bore = self.bore_profile()?;
        let outer = self.outer_profile()?;
        if !outer.contains(&bore) {
            return Err(GeometryError::invalid(format!(
                "wall thickness {} leaves no sleeve wall",
                self.wall_thickness
            ))
            .into());
        }

        let ledge = self.ledge_profile(sides)?.subtract(&bore)?;
        let body = outer.subtract(&bore)?;

        let solid = Solid::from_extrusion(&ledge, Workplane::xy(0.0), -self.ledge_thickness)?;
        let solid = solid.extrude(
            &body,
            solid.lowest_plane(),
            stock_thickness - self.ledge_thickness,
            BooleanMode::Add,
        )?;

        tracing::debug!(
            "Sleeve {}x{}x{} ledges left={} right={}",
            self.width,
            self.height,
            stock_thickness,
            sides.left,
            sides.right
        );
        Ok(Part::new("sleeve", solid, Color::gray(20)).with_metadata(PartMetadata {
            thickness: Some(stock_thickness),
            material: None,
        }))
    }

    /// Legend slot size for the slider
    pub fn slot_values(&self) -> SlotValues {
        let wall = self.wall_thickness;
        let height = (self.height - wall * 3.0) / 2.0;
        SlotValues {
            width: self.width - wall * 2.0,
            height,
            offset: height / 2.0 + wall / 2.0,
        }
    }

    /// Slider with two legend slots: full-size pockets for the diffusers on
    /// top, smaller windows through the bottom leaving a supporting lip.
    pub fn slider(&self, options: &SliderOptions) -> Result<Part> {
        if options.stock_thickness <= options.diffuser_thickness {
            return Err(GeometryError::invalid(format!(
                "slider stock {} must be thicker than the diffuser {}",
                options.stock_thickness, options.diffuser_thickness
            ))
            .into());
        }
        let slot = self.slot_values();
        let locations = [(0.0, slot.offset), (0.0, -slot.offset)];
        let body = Profile::rounded_rectangle(self.width, self.height, self.corner_radius)?;

        let upper_slots = Profile::rounded_rectangle(slot.width, slot.height, self.corner_radius)?
            .at_locations(&locations)?;
        let lower_slots = Profile::rounded_rectangle(
            slot.width - 2.0 * options.diffuser_ledge,
            slot.height - 2.0 * options.diffuser_ledge,
            self.corner_radius,
        )?
        .at_locations(&locations)?;

        let solid = Solid::from_extrusion(
            &body.subtract(&upper_slots)?,
            Workplane::xy(-1.0),
            -options.diffuser_thickness,
        )?;
        let solid = solid.extrude(
            &body.subtract(&lower_slots)?,
            solid.lowest_plane(),
            options.stock_thickness - options.diffuser_thickness,
            BooleanMode::Add,
        )?;

        Ok(Part::new("slider", solid, Color::gray(40)).with_metadata(PartMetadata {
            thickness: Some(options.stock_thickness),
            material: None,
        }))
    }

    /// Plain 1 mm cover plate
    pub fn cover(&self) -> Result<Part> {
        let profile = Profile::rounded_rectangle(self.width, self.height, self.corner_radius)?;
        let solid = Solid::from_extrusion(&profile, Workplane::xy(0.0), -1.0)?;
        Ok(Part::new("cover", solid, Color::WHITE).with_metadata(PartMetadata {
            thickness: Some(1.0),
            material: None,
        }))
    }

    /// Diffuser sized to a slider slot, with optional engravings on top
    pub fn diffuser(&self, options: &DiffuserOptions) -> Result<Part> {
        let slot = self.slot_values();
        let outline = Profile::rounded_rectangle(slot.width, slot.height, self.corner_radius)?;
        let mut solid = Solid::from_extrusion(&outline, Workplane::xy(0.0), -options.stock_thickness)?;
        let top = Workplane::xy(0.0);

        if let Some(text) = options.text.as_deref().filter(|t| !t.trim().is_empty()) {
            let legend = Profile::text_block(text, &options.font, options.text_size)?;
            if !outline.contains(&legend) {
                let (w, h) = legend.size();
                return Err(GeometryError::invalid(format!(
                    "legend '{}' ({:.2}x{:.2}) does not fit a {:.2}x{:.2} diffuser",
                    text, w, h, slot.width, slot.height
                ))
                .into());
            }
            solid = solid.extrude(&legend, top, -options.engrave_depth, BooleanMode::Subtract)?;
        }

        if options.frame {
            let (w, h) = (slot.width - 2.0 * FRAME_INSET, slot.height - 2.0 * FRAME_INSET);
            let ring = Profile::rounded_rectangle(w, h, self.corner_radius)?.subtract(
                &Profile::rounded_rectangle(
                    w - 2.0 * FRAME_WIDTH,
                    h - 2.0 * FRAME_WIDTH,
                    (self.corner_radius - FRAME_WIDTH).max(0.0),
                )?,
            )?;
            solid = solid.extrude(&ring, top, -options.engrave_depth, BooleanMode::Subtract)?;
        }

        if options.triangle {
            let size = slot.height / 2.0;
            let triangle = Profile::triangle(size, size * 0.8)?;
            solid = solid.extrude(&triangle, top, -options.engrave_depth, BooleanMode::Subtract)?;
        }

        Ok(Part::new("diffuser", solid, Color::gray(80)).with_metadata(PartMetadata {
            thickness: Some(options.stock_thickness),
            material: None,
        }))
    }
}

/// Grid of diffusers, row 0 at the top, each cell moved by the layout spacing.
pub fn diffuser_panel(
    geometry: &SwitchGeometry,
    cells: &[Vec<DiffuserOptions>],
    layout: &PanelLayout,
) -> Result<Part> {
    let mut parts = Vec::new();
    for (row, line) in cells.iter().enumerate() {
        for (column, options) in line.iter().enumerate() {
            let placement = Placement::translation(
                layout.h_spacing * column as f64,
                -layout.v_spacing * row as f64,
                0.0,
            );
            parts.push((geometry.diffuser(options)?, placement));
        }
    }
    let panel = assemble(
        "diffuser_panel",
        parts,
        &AssemblyOptions {
            check_overlaps: true,
            tolerance: 0.0,
        },
    )?;
    tracing::info!("Built diffuser panel with {} diffusers", panel.children().len());
    Ok(panel)
}
