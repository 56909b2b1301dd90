// Integration tests for program export of the switch jobs

use panelcam_camtools::{
    diffuser_panel_job, save_gcode, sleeve_job, slider_job, to_gcode, ContourEngine, Dialect, Job, JobOrigin,
    JobSettings, PocketOptions, PocketPattern,
};
use panelcam_core::{init_standard_library, Color, MeasurementSystem, Tool};
use panelcam_designer::{
    classify, diffuser_panel, BooleanMode, ClassifyOptions, DiffuserOptions, FaceGroup, LedgeSides, PanelLayout,
    Part, Profile, SliderOptions, Solid, SwitchGeometry, Workplane,
};
use proptest::prelude::*;

fn one_mm() -> Tool {
    init_standard_library().endmill(1.0).cloned().unwrap()
}

#[test]
fn test_sleeve_program_for_grbl() {
    let sleeve = SwitchGeometry::new(20.0, 20.0).sleeve(3.0, LedgeSides::BOTH).unwrap();
    let job = sleeve_job(&sleeve, &one_mm(), Dialect::Grbl).unwrap();
    let text = to_gcode(&job, &ContourEngine::default()).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], "(Exported by panelcam)");
    assert!(lines[1].starts_with("G17"), "line 1 is {}", lines[1]);
    assert!(!text.contains("(Post Processor"));
    assert!(!text.contains("(begin preamble)"));
    assert!(text.contains("(Operation: Profile001)"));
    assert!(text.contains("(Operation: Profile002)"));
    assert!(text.contains("M3 S24000"));
    assert_eq!(lines.last(), Some(&"M30"));
}

#[test]
fn test_linuxcnc_keeps_preamble() {
    let sleeve = SwitchGeometry::new(20.0, 20.0).sleeve(3.0, LedgeSides::BOTH).unwrap();
    let job = sleeve_job(&sleeve, &one_mm(), Dialect::LinuxCnc).unwrap();
    let text = to_gcode(&job, &ContourEngine::default()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[1], "(Post Processor: linuxcnc)");
    assert_eq!(lines[2], "(begin preamble)");
    assert_eq!(lines[3], "G17 G90 G21");
}

#[test]
fn test_export_is_deterministic() {
    let sleeve = SwitchGeometry::new(20.0, 20.0)
        .sleeve(
            3.0,
            LedgeSides {
                left: false,
                right: true,
            },
        )
        .unwrap();
    let job = sleeve_job(&sleeve, &one_mm(), Dialect::Grbl).unwrap();
    let engine = ContourEngine::default();
    let first = to_gcode(&job, &engine).unwrap();
    let second = to_gcode(&job, &engine).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_imperial_program() {
    let sleeve = SwitchGeometry::new(20.0, 20.0).sleeve(3.0, LedgeSides::BOTH).unwrap();
    let job = sleeve_job(&sleeve, &one_mm(), Dialect::LinuxCnc)
        .unwrap()
        .with_settings(JobSettings {
            units: MeasurementSystem::Imperial,
            ..JobSettings::default()
        })
        .unwrap();
    let text = to_gcode(&job, &ContourEngine::default()).unwrap();
    assert!(text.contains("G17 G90 G20"));
    // 5 mm safe height above the stock
    assert!(text.contains("Z0.197"));
}

#[test]
fn test_slider_program_saved() {
    let dir = tempfile::tempdir().unwrap();
    let slider = SwitchGeometry::new(20.0, 20.0)
        .slider(&SliderOptions::default())
        .unwrap();
    let job = slider_job(&slider, &one_mm(), Dialect::Grbl).unwrap();
    let text = to_gcode(&job, &ContourEngine::default()).unwrap();
    let path = save_gcode(&text, dir.path().join("nc/slider_20x20x5")).unwrap();
    assert_eq!(path, dir.path().join("nc/slider_20x20x5.nc"));
    assert_eq!(std::fs::read_to_string(path).unwrap(), text);
}

#[test]
fn test_diffuser_panel_pockets_then_cuts_on_tabs() {
    let geometry = SwitchGeometry::new(20.0, 20.0);
    let cell = DiffuserOptions {
        triangle: true,
        ..DiffuserOptions::default()
    };
    let panel = diffuser_panel(&geometry, &[vec![cell.clone(), cell]], &PanelLayout::default()).unwrap();
    let library = init_standard_library();
    let cut = library.endmill(3.175).cloned().unwrap();

    let job = diffuser_panel_job(&panel, &one_mm(), &cut, Dialect::Grbl).unwrap();
    assert_eq!(job.operations().len(), 2);
    let text = to_gcode(&job, &ContourEngine::default()).unwrap();

    let pocket = text.find("(Operation: Pocket001)").unwrap();
    let profile = text.find("(Operation: Profile002)").unwrap();
    assert!(pocket < profile);
    assert!(text[pocket..profile].contains("Z-0.100"));
    // Tabs hold the final pass 1 mm above the 3 mm cut.
    assert!(text[profile..].contains("Z-2.000"));
    assert!(text[profile..].contains("Z-3.000"));
}

#[test]
fn test_plain_diffuser_panel_skips_pocket() {
    let geometry = SwitchGeometry::new(20.0, 20.0);
    let panel = diffuser_panel(&geometry, &[vec![DiffuserOptions::default()]], &PanelLayout::default()).unwrap();
    let cut = Tool::endmill(3.175);
    let job = diffuser_panel_job(&panel, &one_mm(), &cut, Dialect::Grbl).unwrap();
    assert_eq!(job.operations().len(), 1);
}

/// Motion after `marker` as (rapid, x, y, z); moves without full XYZ are skipped
fn motion(text: &str, marker: &str) -> Vec<(bool, f64, f64, f64)> {
    let start = text.find(marker).unwrap();
    text[start..]
        .lines()
        .filter_map(|l| {
            let rapid = l.starts_with("G0 ");
            if !rapid && !l.starts_with("G1 ") {
                return None;
            }
            let word = |axis: char| -> Option<f64> {
                l.split_whitespace()
                    .find(|w| w.starts_with(axis))
                    .and_then(|w| w[1..].parse().ok())
            };
            Some((rapid, word('X')?, word('Y')?, word('Z')?))
        })
        .collect()
}

#[test]
fn test_zigzag_pocket_alternates_and_stays_inside() {
    // 20x10x3 plate, 6x4 pocket 1 mm deep centred in the top
    let solid = Solid::from_extrusion(&Profile::rectangle(20.0, 10.0).unwrap(), Workplane::xy(0.0), -3.0)
        .unwrap()
        .extrude(
            &Profile::rectangle(6.0, 4.0).unwrap(),
            Workplane::xy(0.0),
            -1.0,
            BooleanMode::Subtract,
        )
        .unwrap();
    let plate = Part::new("plate", solid, Color::gray(50));
    let groups = classify(&plate, &ClassifyOptions::default()).unwrap();
    let floor: Vec<_> = groups
        .groups()
        .iter()
        .flat_map(|g| g.iter())
        .filter(|f| f.is_cap() && f.normal.z > 0.0 && f.centroid.z < -0.5)
        .cloned()
        .collect();
    assert_eq!(floor.len(), 1);

    let tool = Tool::endmill(1.0);
    let job = Job::new("zigzag", JobOrigin::Face(groups.top().faces()[0].clone()), &plate, Dialect::Grbl)
        .unwrap()
        .pocket_with(
            &FaceGroup::new(-1.0, floor),
            &tool,
            PocketOptions {
                pattern: PocketPattern::ZigZag,
            },
        )
        .unwrap();
    let text = to_gcode(&job, &ContourEngine::default()).unwrap();
    let moves = motion(&text, "(Operation: Pocket001)");

    // Pocket walls offset inward by the tool radius
    let (half_x, half_y) = (3.0 - tool.radius(), 2.0 - tool.radius());
    let feeds: Vec<_> = moves.iter().filter(|m| !m.0).collect();
    assert!(!feeds.is_empty());
    for &&(_, x, y, z) in &feeds {
        assert!(x.abs() <= half_x + 1e-3 && y.abs() <= half_y + 1e-3, "({x}, {y}) leaves the pocket");
        assert!(z >= -1.0 - 1e-3, "z {z} below the floor");
    }

    // A scan row is rapid in, plunge, one cut along X, rapid out.
    let mut rows: Vec<(f64, f64)> = Vec::new();
    for w in moves.windows(4) {
        let (approach, plunge, cut, retract) = (w[0], w[1], w[2], w[3]);
        if approach.0 && !plunge.0 && !cut.0 && retract.0 && (cut.2 - plunge.2).abs() < 1e-6 {
            assert!((cut.3 - plunge.3).abs() < 1e-6);
            rows.push((plunge.3, (cut.1 - plunge.1).signum()));
        }
    }
    for z in [-0.5, -1.0] {
        let directions: Vec<f64> = rows
            .iter()
            .filter(|(rz, _)| (rz - z).abs() < 1e-6)
            .map(|(_, d)| *d)
            .collect();
        assert!(directions.len() >= 3, "only {} rows at z {}", directions.len(), z);
        for pair in directions.windows(2) {
            assert_eq!(pair[0], -pair[1], "rows at z {} do not alternate", z);
        }
    }
}

proptest! {
    #[test]
    fn prop_grbl_drops_lines_one_and_two(lines in prop::collection::vec("[^\n]{0,12}", 4..40)) {
        let raw = lines.join("\n");
        let out = Dialect::Grbl.postprocess(&raw);
        let kept: Vec<&str> = out.split('\n').collect();
        prop_assert_eq!(kept.len(), lines.len() - 2);
        prop_assert_eq!(kept[0], lines[0].as_str());
        for (k, original) in kept[1..].iter().zip(&lines[3..]) {
            prop_assert_eq!(*k, original.as_str());
        }
    }

    #[test]
    fn prop_linuxcnc_is_identity(lines in prop::collection::vec("[^\n]{0,12}", 0..20)) {
        let raw = lines.join("\n");
        prop_assert_eq!(Dialect::LinuxCnc.postprocess(&raw), raw);
    }
}
