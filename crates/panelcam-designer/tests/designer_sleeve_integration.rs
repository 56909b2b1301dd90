// Integration tests for sleeve geometry and face classification

use panelcam_designer::{
    classify, Boundary, ClassifyOptions, FaceGroups, FaceSource, LedgeSides, Part, SwitchGeometry,
};
use proptest::prelude::*;

fn classified(sides: LedgeSides) -> (Part, FaceGroups) {
    let sleeve = SwitchGeometry::new(20.0, 20.0).sleeve(3.0, sides).unwrap();
    let groups = classify(&sleeve, &ClassifyOptions::default()).unwrap();
    (sleeve, groups)
}

fn outer_wall_group_count(groups: &FaceGroups) -> usize {
    groups
        .walls()
        .iter()
        .filter(|g| g.iter().any(|f| f.boundary() == Some(Boundary::Outer)))
        .count()
}

#[test]
fn test_sleeve_profiles_nominal_size() {
    let g = SwitchGeometry::new(20.0, 20.0);
    let (w, h) = g.outer_profile().unwrap().size();
    assert!((w - 22.0).abs() < 1e-9 && (h - 22.0).abs() < 1e-9);
    let (w, h) = g.ledge_profile(LedgeSides::BOTH).unwrap().size();
    assert!((w - 23.0).abs() < 1e-9 && (h - 23.0).abs() < 1e-9);
}

#[test]
fn test_sleeve_classification_with_both_ledges() {
    let (_, groups) = classified(LedgeSides::BOTH);
    assert!((groups.bottom().key() + 3.0).abs() < 1e-9);
    assert!(groups.top().key().abs() < 1e-9);
    assert_eq!(groups.bottom().len(), 1);
    assert_eq!(groups.top().len(), 1);

    let keys: Vec<f64> = groups.walls().iter().map(|g| g.key()).collect();
    let expected = [-2.0, -1.5, -1.0, -0.5];
    assert_eq!(keys.len(), expected.len(), "wall keys {:?}", keys);
    for (k, e) in keys.iter().zip(expected) {
        assert!((k - e).abs() < 1e-6, "wall keys {:?}", keys);
    }

    // Ledge band and body band
    assert_eq!(outer_wall_group_count(&groups), 2);
}

#[test]
fn test_groups_cover_every_face_once() {
    let (sleeve, groups) = classified(LedgeSides::BOTH);
    let faces = sleeve.faces().unwrap();
    let mut seen: Vec<_> = groups.groups().iter().flat_map(|g| g.ids()).collect();
    seen.sort();
    let mut all: Vec<_> = faces.iter().map(|f| f.id).collect();
    all.sort();
    assert_eq!(seen, all);
}

#[test]
fn test_body_walls_span_one_group_with_both_ledges() {
    let (_, groups) = classified(LedgeSides::BOTH);
    let body = groups
        .walls_adjacent_to(groups.bottom())
        .filtered(|f| f.boundary() == Some(Boundary::Outer));
    assert!(!body.is_empty());
    assert_eq!(groups.wall_groups_spanned(&body), 1);
    assert!(body.iter().all(|f| f.bounds.max.z <= -1.0 + 1e-9));
}

#[test]
fn test_body_walls_span_two_groups_without_left_ledge() {
    let (_, groups) = classified(LedgeSides {
        left: false,
        right: true,
    });
    let body = groups
        .walls_adjacent_to(groups.bottom())
        .filtered(|f| f.boundary() == Some(Boundary::Outer));
    assert_eq!(groups.wall_groups_spanned(&body), 2);

    // The flush side is one face running the full stock height.
    let flush: Vec<_> = body.iter().filter(|f| f.bounds.max.z > -1.0 + 1e-9).collect();
    assert_eq!(flush.len(), 1);
    assert!((flush[0].bounds.min.z + 3.0).abs() < 1e-9);
    assert!((flush[0].bounds.max.z).abs() < 1e-9);
    assert!(flush[0].normal.x < -0.99);
}

#[test]
fn test_bore_walls_span_full_height() {
    let (_, groups) = classified(LedgeSides::BOTH);
    let bore = groups.inner_walls();
    assert!(!bore.is_empty());
    for face in bore.iter() {
        assert!((face.bounds.min.z + 3.0).abs() < 1e-9);
        assert!(face.bounds.max.z.abs() < 1e-9);
    }
    assert_eq!(groups.wall_groups_spanned(&bore), 1);
}

#[test]
fn test_walls_between_selects_bands() {
    let (_, groups) = classified(LedgeSides::BOTH);
    let lower = groups.walls_between(-2.5, -1.25);
    assert_eq!(groups.wall_groups_spanned(&lower), 2);
    let first = lower.faces()[0].id;
    assert!(groups.group_containing(first).is_some());
}

proptest! {
    #[test]
    fn prop_sleeve_outer_contains_bore(
        width in 2.0f64..60.0,
        height in 2.0f64..60.0,
        fraction in 0.05f64..0.95,
    ) {
        let mut g = SwitchGeometry::new(width, height);
        g.wall_thickness = fraction * width.min(height) / 2.0;
        let outer = g.outer_profile().unwrap();
        let bore = g.bore_profile().unwrap();
        prop_assert!(outer.contains(&bore));
        prop_assert!(outer.area() - bore.area() > 0.0);
    }
}
