// Integration tests for DXF export of part footprints

use panelcam_core::{Error, GeometryError};
use panelcam_designer::{save_dxf, DxfSource, LedgeSides, SwitchGeometry};

#[test]
fn test_sleeve_projection_round_trips_through_dxf() {
    let dir = tempfile::tempdir().unwrap();
    let sleeve = SwitchGeometry::new(20.0, 20.0)
        .sleeve(3.0, LedgeSides::BOTH)
        .unwrap();
    let footprint = sleeve.projection().unwrap();
    assert_eq!(footprint.regions().len(), 1);
    assert_eq!(footprint.regions()[0].holes.len(), 1);

    let path = save_dxf(DxfSource::Profile(&footprint), dir.path().join("dxf/sleeve.dxf")).unwrap();
    assert_eq!(path, dir.path().join("dxf/sleeve.dxf"));

    let mut file = std::fs::File::open(&path).unwrap();
    let drawing = dxf::Drawing::load(&mut file).unwrap();
    assert!(drawing.header.version >= dxf::enums::AcadVersion::R2000);
    assert_eq!(drawing.entities().count(), 2);
    let layers: Vec<String> = drawing.entities().map(|e| e.common.layer.clone()).collect();
    assert_eq!(layers, vec!["OUTLINE".to_string(), "HOLES".to_string()]);
    for entity in drawing.entities() {
        match &entity.specific {
            dxf::entities::EntityType::LwPolyline(poly) => {
                assert_eq!(poly.flags & 1, 1, "polylines are closed");
                assert!(poly.vertices.len() >= 4);
            }
            other => panic!("unexpected entity {other:?}"),
        }
    }
}

#[test]
fn test_solid_part_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let cover = SwitchGeometry::new(20.0, 20.0).cover().unwrap();
    let err = save_dxf(DxfSource::Part(&cover), dir.path().join("cover")).unwrap_err();
    assert!(matches!(
        err,
        Error::Geometry(GeometryError::UnsupportedGeometry { .. })
    ));
    assert!(!dir.path().join("cover.dxf").exists());
}
