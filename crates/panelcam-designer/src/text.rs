//! Text to glyph profiles.
//!
//! Glyph outlines from `rusttype` are recorded into a `lyon` path, flattened,
//! and combined with the non-zero rule: contours wound like the largest one
//! add area, the others cut holes.

use crate::font_manager::{self, FontSpec};
use crate::polygon::{self, POINT_TOLERANCE};
use crate::profile::{Profile, ProfileKind, Region};
use lyon::math::point;
use lyon::path::iterator::PathIterator;
use lyon::path::{Event, Path};
use panelcam_core::{Point2, Result};
use rusttype::{point as rt_point, OutlineBuilder, Scale};

/// Chord tolerance when flattening glyph curves, in mm
const FLATTEN_TOLERANCE: f32 = 0.01;

struct GlyphPathBuilder {
    builder: lyon::path::path::Builder,
    open: bool,
}

impl GlyphPathBuilder {
    fn new() -> Self {
        Self {
            builder: Path::builder(),
            open: false,
        }
    }

    fn build(mut self) -> Path {
        if self.open {
            self.builder.end(true);
        }
        self.builder.build()
    }
}

// Glyph coordinates are y-down; flip them here.
impl OutlineBuilder for GlyphPathBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        if self.open {
            self.builder.end(true);
        }
        self.builder.begin(point(x, -y));
        self.open = true;
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.builder.line_to(point(x, -y));
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.builder
            .quadratic_bezier_to(point(x1, -y1), point(x, -y));
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.builder
            .cubic_bezier_to(point(x1, -y1), point(x2, -y2), point(x, -y));
    }

    fn close(&mut self) {
        if self.open {
            self.builder.end(true);
            self.open = false;
        }
    }
}

fn flatten_contours(path: &Path) -> Vec<Vec<Point2>> {
    let mut contours = Vec::new();
    let mut current: Vec<Point2> = Vec::new();
    for event in path.iter().flattened(FLATTEN_TOLERANCE) {
        match event {
            Event::Begin { at } => {
                current = vec![Point2::new(at.x as f64, at.y as f64)];
            }
            Event::Line { to, .. } => current.push(Point2::new(to.x as f64, to.y as f64)),
            Event::End { .. } => {
                let contour = polygon::dedup_loop(&current, POINT_TOLERANCE);
                if contour.len() >= 3 && polygon::signed_area(&contour).abs() > 1e-9 {
                    contours.push(contour);
                }
                current = Vec::new();
            }
            _ => {}
        }
    }
    contours
}

fn contours_to_profile(contours: Vec<Vec<Point2>>, kind: ProfileKind) -> Result<Option<Profile>> {
    let Some(dominant) = contours
        .iter()
        .map(|c| polygon::signed_area(c))
        .max_by(|a, b| a.abs().total_cmp(&b.abs()))
    else {
        return Ok(None);
    };
    let (solid, cutters): (Vec<_>, Vec<_>) = contours
        .into_iter()
        .partition(|c| polygon::signed_area(c).signum() == dominant.signum());

    let to_profile = |loops: Vec<Vec<Point2>>| -> Result<Option<Profile>> {
        let mut iter = loops
            .into_iter()
            .filter_map(|l| Profile::from_regions(vec![Region::new(l, Vec::new())], ProfileKind::Composite).ok());
        let Some(first) = iter.next() else {
            return Ok(None);
        };
        iter.try_fold(first, |acc, p| acc.union(&p)).map(Some)
    };

    let Some(body) = to_profile(solid)? else {
        return Ok(None);
    };
    let shaped = match to_profile(cutters)? {
        Some(holes) => body.try_subtract(&holes),
        None => Some(body),
    };
    Ok(shaped.map(|p| p.with_kind(kind)))
}

/// One profile per visible glyph, laid out from the origin along +X.
pub(crate) fn glyph_profiles(text: &str, font: &FontSpec, size: f64) -> Result<Vec<Profile>> {
    if !(size.is_finite() && size > 0.0) {
        return Err(panelcam_core::GeometryError::invalid(format!(
            "font size {} must be positive",
            size
        ))
        .into());
    }
    let face = font_manager::resolve(font)?;
    let scale = Scale::uniform(size as f32);

    let mut profiles = Vec::new();
    for (ch, glyph) in text.chars().zip(face.layout(text, scale, rt_point(0.0, 0.0))) {
        if ch.is_whitespace() {
            continue;
        }
        let mut builder = GlyphPathBuilder::new();
        if !glyph.build_outline(&mut builder) {
            tracing::debug!("Glyph '{}' has no outline", ch);
            continue;
        }
        let contours = flatten_contours(&builder.build());
        let kind = ProfileKind::Glyph {
            ch,
            font: font.to_string(),
            size,
        };
        match contours_to_profile(contours, kind)? {
            Some(profile) => profiles.push(profile),
            None => tracing::warn!("Glyph '{}' collapsed to nothing after flattening", ch),
        }
    }
    Ok(profiles)
}
