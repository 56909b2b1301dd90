//! Machining jobs for the parametric switch parts.

use crate::dialect::Dialect;
use crate::job::{Dressup, Job, JobOrigin, ProfileOptions};
use panelcam_core::{CamError, Point3, Result, Tool, Vector3};
use panelcam_designer::{classify, Boundary, ClassifyOptions, FaceGroup, FaceGroups, Part};
use tracing::info;

fn groups_of(part: &Part) -> Result<FaceGroups> {
    classify(part, &ClassifyOptions::default())
}

fn first_face(group: &FaceGroup, what: &str) -> Result<JobOrigin> {
    group
        .faces()
        .first()
        .cloned()
        .map(JobOrigin::Face)
        .ok_or_else(|| CamError::invalid_target("origin", format!("part has no {} face", what)).into())
}

/// Sleeve machined from its bottom: the body outline down to the ledge, then
/// the ledge outline and the bore through the stock.
pub fn sleeve_job<'a>(sleeve: &'a Part, tool: &Tool, dialect: Dialect) -> Result<Job<'a>> {
    let groups = groups_of(sleeve)?;
    let body_walls = groups
        .walls_adjacent_to(groups.bottom())
        .filtered(|f| f.boundary() == Some(Boundary::Outer));

    let job = Job::new(sleeve.name(), first_face(groups.bottom(), "bottom")?, sleeve, dialect)?
        .profile(&body_walls, tool)?
        .profile_with(
            groups.top(),
            tool,
            ProfileOptions {
                holes: true,
                ..ProfileOptions::default()
            },
        )?;
    info!(
        "Sleeve job: body walls span {} wall groups",
        groups.wall_groups_spanned(&body_walls)
    );
    Ok(job)
}

/// Slider machined from its top: the diffuser slot outlines, then the outline
/// and the windows through the stock.
pub fn slider_job<'a>(slider: &'a Part, tool: &Tool, dialect: Dialect) -> Result<Job<'a>> {
    let groups = groups_of(slider)?;
    let slot_walls = groups
        .walls_adjacent_to(groups.top())
        .filtered(|f| f.boundary() == Some(Boundary::Inner));

    Job::new(slider.name(), first_face(groups.top(), "top")?, slider, dialect)?
        .profile(&slot_walls, tool)?
        .profile_with(
            groups.bottom(),
            tool,
            ProfileOptions {
                holes: true,
                ..ProfileOptions::default()
            },
        )
}

/// Panel of diffusers machined from the top: engraving floors are pocketed
/// with `engrave_tool`, then every diffuser is cut out on tabs with `cut_tool`.
pub fn diffuser_panel_job<'a>(
    panel: &'a Part,
    engrave_tool: &Tool,
    cut_tool: &Tool,
    dialect: Dialect,
) -> Result<Job<'a>> {
    let groups = groups_of(panel)?;
    let top = groups.top();
    let bounds = panel.local_bounds();
    let center = bounds.center();
    let origin = JobOrigin::Plane {
        point: Point3::new(center.x, center.y, bounds.max.z),
        normal: Vector3::z(),
    };

    let floors: Vec<_> = groups
        .groups()
        .iter()
        .filter(|g| g.key() < top.key())
        .flat_map(|g| g.iter())
        .filter(|f| f.is_cap() && f.normal.z > 0.0)
        .cloned()
        .collect();

    let mut job = Job::new(panel.name(), origin, panel, dialect)?;
    if !floors.is_empty() {
        let key = floors[0].centroid.z;
        job = job.pocket(&FaceGroup::new(key, floors), engrave_tool)?;
    }
    job.profile_with(
        top,
        cut_tool,
        ProfileOptions {
            dressups: vec![Dressup::default()],
            ..ProfileOptions::default()
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::OperationKind;
    use panelcam_designer::{LedgeSides, SliderOptions, SwitchGeometry};

    #[test]
    fn test_sleeve_job_operations() {
        let sleeve = SwitchGeometry::new(20.0, 20.0).sleeve(3.0, LedgeSides::BOTH).unwrap();
        let job = sleeve_job(&sleeve, &Tool::endmill(1.0), Dialect::Grbl).unwrap();
        let ops = job.operations();
        assert_eq!(ops.len(), 2);
        assert!((ops[0].final_depth() + 2.0).abs() < 1e-9);
        assert!((ops[1].final_depth() + 3.0).abs() < 1e-9);
        assert_eq!(
            ops[1].kind,
            OperationKind::Profile {
                side: crate::job::Side::Outside,
                holes: true
            }
        );
    }

    #[test]
    fn test_slider_job_depths() {
        let slider = SwitchGeometry::new(20.0, 20.0)
            .slider(&SliderOptions::default())
            .unwrap();
        let job = slider_job(&slider, &Tool::endmill(1.0), Dialect::Grbl).unwrap();
        let ops = job.operations();
        assert_eq!(ops.len(), 2);
        // Slot pockets are 3 mm deep, the windows go through 5 mm of stock.
        assert!((ops[0].final_depth() + 3.0).abs() < 1e-9);
        assert!((ops[1].final_depth() + 5.0).abs() < 1e-9);
    }
}
