//! Raw program text from realized toolpaths.
//!
//! The first three lines are a banner, the post-processor name and the
//! preamble marker; the modal setup follows on line 3. Dialects that cannot
//! take the comment lines drop them by position.

use crate::job::Job;
use crate::toolpath::{Move, OperationToolpath};
use panelcam_core::{MeasurementSystem, Point3};

/// First line of every program
pub const BANNER: &str = "(Exported by panelcam)";

/// Coordinate with three decimals, never `-0.000`
fn coord(value: f64) -> String {
    let s = format!("{:.3}", value);
    if s == "-0.000" {
        "0.000".to_string()
    } else {
        s
    }
}

/// Comment text with the characters that would end a comment replaced
fn comment(text: &str) -> String {
    text.replace(['(', ')'], "_")
}

/// Writes the program for `job` from its realized toolpaths.
pub fn write_program(job: &Job<'_>, toolpaths: &[OperationToolpath]) -> String {
    let units = job.settings().units;
    let safe_z = units.from_mm(job.safe_z());
    let mut out = String::new();

    // Header
    out.push_str(&format!("{}\n", BANNER));
    out.push_str(&format!("(Post Processor: {})\n", job.dialect().name()));
    out.push_str("(begin preamble)\n");
    out.push_str(&format!("G17 G90 {}\n", units.gcode_word()));
    out.push_str(&format!("(Job: {})\n", comment(job.name())));
    out.push_str(&format!("(Stock: {})\n", comment(job.stock().name())));

    for toolpath in toolpaths {
        write_operation(&mut out, toolpath, units);
    }

    // Footer
    out.push_str("(begin postamble)\n");
    out.push_str(&format!("G0 Z{}\n", coord(safe_z)));
    out.push_str("M5\n");
    out.push_str("M30\n");
    out
}

fn write_operation(out: &mut String, toolpath: &OperationToolpath, units: MeasurementSystem) {
    let tool = &toolpath.tool;
    let feed = units.from_mm(tool.params.feed_rate);
    let plunge = units.from_mm(tool.params.plunge_rate);

    out.push_str(&format!("(Operation: {})\n", comment(&toolpath.label)));
    out.push_str(&format!("(Tool: T{} {})\n", tool.number, comment(&tool.description_short())));
    out.push_str(&format!("M3 S{}\n", tool.params.rpm));

    let mut last: Option<Point3> = None;
    for m in &toolpath.moves {
        let p = m.end();
        let (x, y, z) = (
            coord(units.from_mm(p.x)),
            coord(units.from_mm(p.y)),
            coord(units.from_mm(p.z)),
        );
        match m {
            Move::Rapid(_) => {
                out.push_str(&format!("G0 X{} Y{} Z{}\n", x, y, z));
            }
            Move::Plunge(_) => {
                out.push_str(&format!("G1 X{} Y{} Z{} F{:.1}\n", x, y, z, plunge));
            }
            Move::Cut(_) => {
                out.push_str(&format!("G1 X{} Y{} Z{} F{:.1}\n", x, y, z, feed));
            }
            Move::ArcCw { center, .. } => {
                // Offsets are relative to the start of the arc.
                let start = last.unwrap_or(p);
                out.push_str(&format!(
                    "G2 X{} Y{} Z{} I{} J{} F{:.1}\n",
                    x,
                    y,
                    z,
                    coord(units.from_mm(center.x - start.x)),
                    coord(units.from_mm(center.y - start.y)),
                    feed
                ));
            }
        }
        last = Some(p);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coord_normalizes_negative_zero() {
        assert_eq!(coord(-0.0001), "0.000");
        assert_eq!(coord(-1.23456), "-1.235");
        assert_eq!(coord(2.0), "2.000");
    }

    #[test]
    fn test_comment_is_sanitized() {
        assert_eq!(comment("a (b)"), "a _b_");
    }

    #[test]
    fn test_operation_lines() {
        let mut tp = OperationToolpath::new(0, "Hole001", panelcam_core::Tool::endmill(1.0));
        tp.moves = vec![
            Move::Rapid(Point3::new(2.0, 0.0, 5.0)),
            Move::Plunge(Point3::new(2.0, 0.0, 0.0)),
            Move::ArcCw {
                to: Point3::new(2.0, 0.0, -0.5),
                center: panelcam_core::Point2::new(0.0, 0.0),
            },
        ];
        let mut out = String::new();
        write_operation(&mut out, &tp, MeasurementSystem::Metric);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "(Operation: Hole001)");
        assert_eq!(lines[3], "G0 X2.000 Y0.000 Z5.000");
        assert!(lines[4].starts_with("G1 X2.000 Y0.000 Z0.000 F"));
        assert!(lines[5].starts_with("G2 X2.000 Y0.000 Z-0.500 I-2.000 J0.000 F"));
    }
}
