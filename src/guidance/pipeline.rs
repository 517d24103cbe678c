//! Fixed-order post-processing of a leg's steps

use tracing::debug;

use crate::error::{GuidanceError, Result};
use crate::path::BoundarySnaps;

use super::collapse::collapse_turn_instructions;
use super::geometry::LegGeometry;
use super::intersections::build_intersections;
use super::lanes::anticipate_lane_change;
use super::post_processing::{
    assign_relative_locations, handle_roundabouts, resync_geometry, suppress_short_name_segments,
    trim_short_segments,
};
use super::steps::RouteStep;

/// One post-processing stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    TrimShortSegments,
    HandleRoundabouts,
    CollapseTurnInstructions,
    AnticipateLaneChange,
    BuildIntersections,
    SuppressShortNameSegments,
    AssignRelativeLocations,
    ResyncGeometry,
}

/// Stages in execution order. Later stages rely on the shape earlier ones
/// leave behind, so the order is fixed.
pub const PIPELINE: [Stage; 8] = [
    Stage::TrimShortSegments,
    Stage::HandleRoundabouts,
    Stage::CollapseTurnInstructions,
    Stage::AnticipateLaneChange,
    Stage::BuildIntersections,
    Stage::SuppressShortNameSegments,
    Stage::AssignRelativeLocations,
    Stage::ResyncGeometry,
];

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::TrimShortSegments => "trim_short_segments",
            Stage::HandleRoundabouts => "handle_roundabouts",
            Stage::CollapseTurnInstructions => "collapse_turn_instructions",
            Stage::AnticipateLaneChange => "anticipate_lane_change",
            Stage::BuildIntersections => "build_intersections",
            Stage::SuppressShortNameSegments => "suppress_short_name_segments",
            Stage::AssignRelativeLocations => "assign_relative_locations",
            Stage::ResyncGeometry => "resync_geometry",
        }
    }

    fn run(
        &self,
        steps: &mut Vec<RouteStep>,
        geometry: &mut LegGeometry,
        snaps: &BoundarySnaps<'_>,
    ) -> Result<()> {
        match self {
            Stage::TrimShortSegments => trim_short_segments(steps, geometry),
            Stage::HandleRoundabouts => handle_roundabouts(steps),
            Stage::CollapseTurnInstructions => collapse_turn_instructions(steps),
            Stage::AnticipateLaneChange => anticipate_lane_change(steps),
            Stage::BuildIntersections => build_intersections(steps),
            Stage::SuppressShortNameSegments => suppress_short_name_segments(steps),
            Stage::AssignRelativeLocations => {
                assign_relative_locations(steps, geometry, snaps.source, snaps.target)
            }
            Stage::ResyncGeometry => resync_geometry(geometry, steps)?,
        }
        Ok(())
    }
}

/// Run every stage of [`PIPELINE`] over one leg.
///
/// Fails if a stage leaves the leg without its depart and arrive steps or if
/// the step ranges end up out of sync with the geometry.
pub fn post_process(
    mut steps: Vec<RouteStep>,
    mut geometry: LegGeometry,
    snaps: &BoundarySnaps<'_>,
) -> Result<(Vec<RouteStep>, LegGeometry)> {
    if steps.len() < 2 {
        return Err(GuidanceError::EmptyStepSequence {
            stage: "assemble_steps",
            remaining: steps.len(),
        });
    }

    for stage in PIPELINE {
        let before = steps.len();
        stage.run(&mut steps, &mut geometry, snaps)?;
        debug!(
            stage = stage.name(),
            before,
            after = steps.len(),
            points = geometry.size(),
            "post-processing stage done"
        );
        if steps.len() < 2 {
            return Err(GuidanceError::EmptyStepSequence {
                stage: stage.name(),
                remaining: steps.len(),
            });
        }
    }

    Ok((steps, geometry))
}
