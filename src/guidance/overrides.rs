//! Map-authored maneuver overrides
//!
//! An override names the edge-based node where the incoming way starts, the
//! via node of the turn and the node where the outgoing way starts. It applies
//! to a leg when the route starts on `from_node`, reaches `to_node` within a
//! few steps and passes the via node in between. The turn at the via node is
//! announced by the step *after* the one whose polyline contains it.

use std::ops::Range;

use tracing::{debug, trace};

use crate::error::{GuidanceError, Result};
use crate::facade::{EdgeBasedNodeId, GuidanceFacade, ManeuverOverride};
use crate::geo::Coordinate;
use crate::instruction::TurnType;

use super::geometry::LegGeometry;
use super::steps::RouteStep;

/// Steps an override may span, counting the step it starts on
pub const MAX_MANEUVER_LOOKAHEAD: usize = 5;

/// A matched override and the step whose polyline holds its via node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverrideMatch<'a> {
    pub hit_step: usize,
    pub maneuver: &'a ManeuverOverride,
}

/// Steps to search for the via node of an override starting at `current`.
///
/// The window holds at most [`MAX_MANEUVER_LOOKAHEAD`] steps and is accepted
/// when one of them starts on `to_node`. A window cut short by the end of the
/// leg is also accepted when `to_node` is the leg's final edge-based node.
pub fn find_target_window(
    steps: &[RouteStep],
    current: usize,
    to_node: EdgeBasedNodeId,
    leg_end_node: EdgeBasedNodeId,
) -> Option<Range<usize>> {
    if current >= steps.len() {
        return None;
    }
    let lookahead = MAX_MANEUVER_LOOKAHEAD.min(steps.len() - current);
    let window = current..current + lookahead;

    if steps[window.clone()].iter().any(|step| step.from_id == to_node) {
        return Some(window);
    }
    if lookahead < MAX_MANEUVER_LOOKAHEAD && leg_end_node == to_node {
        return Some(window);
    }
    None
}

/// First step of `window` whose polyline passes `via`
pub fn find_via_step(
    steps: &[RouteStep],
    geometry: &LegGeometry,
    window: Range<usize>,
    via: Coordinate,
) -> Option<usize> {
    window
        .filter(|&index| index < steps.len())
        .find(|&index| geometry.step_polyline(&steps[index]).contains(&via))
}

/// The first override that applies to the leg.
///
/// Steps are tried in order, overrides in declaration order, and the first one
/// whose target window and via node both match wins.
pub fn find_applicable_override<'a, F: GuidanceFacade + ?Sized>(
    facade: &'a F,
    steps: &[RouteStep],
    geometry: &LegGeometry,
    leg_end_node: EdgeBasedNodeId,
) -> Option<OverrideMatch<'a>> {
    for (current, step) in steps.iter().enumerate() {
        for maneuver in facade.overrides_that_start_at(step.from_id) {
            let Some(window) =
                find_target_window(steps, current, maneuver.to_node(), leg_end_node)
            else {
                trace!(
                    from = maneuver.from_node(),
                    to = maneuver.to_node(),
                    current,
                    "override target not within lookahead"
                );
                continue;
            };

            let Some(via) = facade.coordinate_of_node(maneuver.via_node()) else {
                trace!(via = maneuver.via_node(), "override via node has no coordinate");
                continue;
            };

            match find_via_step(steps, geometry, window, via) {
                Some(hit_step) => return Some(OverrideMatch { hit_step, maneuver }),
                None => trace!(via = maneuver.via_node(), current, "override via node not on route"),
            }
        }
    }
    None
}

/// Apply at most one override to the leg's steps.
///
/// Returns the index of the re-typed step. Step count and geometry never
/// change; a match on the final step ends the search without a mutation.
pub fn apply_maneuver_overrides<F: GuidanceFacade + ?Sized>(
    facade: &F,
    steps: &mut [RouteStep],
    geometry: &LegGeometry,
    leg_end_node: EdgeBasedNodeId,
) -> Result<Option<usize>> {
    let Some(found) = find_applicable_override(facade, steps, geometry, leg_end_node) else {
        return Ok(None);
    };
    let maneuver = found.maneuver;
    if maneuver.override_type() == TurnType::Invalid {
        return Err(GuidanceError::InvalidOverrideType {
            via_node: maneuver.via_node(),
        });
    }

    let index = found.hit_step + 1;
    let Some(step) = steps.get_mut(index) else {
        debug!(via = maneuver.via_node(), "override matched the last step, nothing to re-type");
        return Ok(None);
    };

    let previous = step.maneuver.instruction;
    step.maneuver.instruction.turn_type = maneuver.override_type();
    if let Some(direction) = maneuver.direction() {
        step.maneuver.instruction.direction_modifier = direction;
    }
    debug!(
        step = index,
        via = maneuver.via_node(),
        from = %previous,
        to = %step.maneuver.instruction,
        "applied maneuver override"
    );
    Ok(Some(index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guidance::test_support::{labels, LegFixture};
    use crate::instruction::DirectionModifier::{self, Left, Right, SharpRight, Straight};

    /// a -> b -> c, right at c, c -> g -> i, left at i, i -> j.
    /// Gaps are edge-based nodes 1..=5.
    fn grid() -> LegFixture {
        LegFixture::new(&[
            (0.0, 0.0),
            (0.001, 0.0),
            (0.002, 0.0),
            (0.002, -0.001),
            (0.002, -0.002),
            (0.003, -0.002),
        ])
        .turn(1, TurnType::NoTurn, Straight)
        .turn(2, TurnType::Turn, Right)
        .turn(3, TurnType::NoTurn, Straight)
        .turn(4, TurnType::Turn, Left)
    }

    fn apply(fixture: &LegFixture) -> (Vec<RouteStep>, Option<usize>) {
        let (mut steps, geometry) = fixture.steps();
        let end = fixture.snaps().final_node();
        let applied = apply_maneuver_overrides(&fixture.facade, &mut steps, &geometry, end).unwrap();
        (steps, applied)
    }

    #[test]
    fn test_override_retypes_the_step_after_the_via() {
        let fixture = grid().maneuver_override(1, 2, 3, TurnType::Turn, Some(SharpRight));
        let (steps, applied) = apply(&fixture);
        assert_eq!(applied, Some(1));
        assert_eq!(labels(&steps), vec!["depart", "turn sharp right", "turn left", "arrive"]);
    }

    #[test]
    fn test_missing_direction_keeps_modifier() {
        let fixture = grid().maneuver_override(1, 2, 3, TurnType::Suppressed, None);
        let (steps, applied) = apply(&fixture);
        assert_eq!(applied, Some(1));
        assert_eq!(steps[1].turn_type(), TurnType::Suppressed);
        assert_eq!(steps[1].maneuver.instruction.direction_modifier, Right);
        assert_eq!(steps.len(), 4);
        let announced: Vec<String> = steps
            .iter()
            .filter(|s| s.is_announced())
            .map(RouteStep::label)
            .collect();
        assert_eq!(announced, vec!["depart", "turn left", "arrive"]);
    }

    #[test]
    fn test_unreached_target_leaves_steps_alone() {
        let fixture = grid().maneuver_override(1, 2, 42, TurnType::Turn, Some(SharpRight));
        let (original, _) = fixture.steps();
        let (steps, applied) = apply(&fixture);
        assert_eq!(applied, None);
        assert_eq!(steps, original);
    }

    #[test]
    fn test_via_off_route_does_not_match() {
        let mut fixture = grid();
        let elsewhere = fixture
            .facade
            .add_node(Coordinate::from_degrees(0.5, 0.5), 999);
        let maneuver = ManeuverOverride::new(1, elsewhere, 3, TurnType::Turn, None).unwrap();
        fixture.facade.add_override(maneuver);
        let (_, applied) = apply(&fixture);
        assert_eq!(applied, None);
    }

    fn long_leg() -> LegFixture {
        let points: Vec<(f64, f64)> = (0..8).map(|i| (i as f64 * 0.001, 0.0)).collect();
        let mut fixture = LegFixture::new(&points);
        for via in 1..=6 {
            fixture = fixture.turn(via, TurnType::Turn, DirectionModifier::SlightRight);
        }
        fixture
    }

    #[test]
    fn test_lookahead_is_bounded() {
        // step k starts on edge-based node k + 1
        let within = long_leg().maneuver_override(1, 1, 5, TurnType::Fork, None);
        assert_eq!(apply(&within).1, Some(1));

        let beyond = long_leg().maneuver_override(1, 1, 6, TurnType::Fork, None);
        assert_eq!(apply(&beyond).1, None);
    }

    #[test]
    fn test_truncated_window_falls_back_to_leg_end() {
        let fixture = grid();
        let (steps, _) = fixture.steps();
        assert_eq!(find_target_window(&steps, 1, 77, 77), Some(1..4));
        assert_eq!(find_target_window(&steps, 1, 77, 5), None);
        assert_eq!(find_target_window(&steps, 9, 5, 5), None);

        let (long, _) = long_leg().steps();
        assert_eq!(find_target_window(&long, 0, 77, 77), None);
        assert_eq!(find_target_window(&long, 0, 3, 77), Some(0..5));
    }

    #[test]
    fn test_via_search_scans_polylines_in_order() {
        let fixture = grid();
        let (steps, geometry) = fixture.steps();
        let c = Coordinate::from_degrees(0.002, 0.0);
        // c ends the depart polyline and starts the next one
        assert_eq!(find_via_step(&steps, &geometry, 0..4, c), Some(0));
        assert_eq!(find_via_step(&steps, &geometry, 1..4, c), Some(1));
        let g = Coordinate::from_degrees(0.002, -0.001);
        assert_eq!(find_via_step(&steps, &geometry, 0..4, g), Some(1));
    }

    #[test]
    fn test_at_most_one_override_applies() {
        let fixture = grid()
            .maneuver_override(1, 2, 3, TurnType::Turn, Some(SharpRight))
            .maneuver_override(1, 2, 3, TurnType::Suppressed, None)
            .maneuver_override(5, 4, 5, TurnType::EndOfRoad, None);
        let (original, _) = fixture.steps();
        let (steps, applied) = apply(&fixture);
        assert_eq!(applied, Some(1));
        let changed = steps.iter().zip(&original).filter(|(a, b)| a != b).count();
        assert_eq!(changed, 1);
        assert_eq!(steps[1].label(), "turn sharp right");
    }

    #[test]
    fn test_applying_twice_is_idempotent() {
        let fixture = grid().maneuver_override(1, 2, 3, TurnType::Turn, Some(SharpRight));
        let (mut steps, geometry) = fixture.steps();
        let end = fixture.snaps().final_node();
        apply_maneuver_overrides(&fixture.facade, &mut steps, &geometry, end).unwrap();
        let once = steps.clone();
        apply_maneuver_overrides(&fixture.facade, &mut steps, &geometry, end).unwrap();
        assert_eq!(steps, once);
    }

    #[test]
    fn test_search_is_deterministic() {
        let fixture = grid()
            .maneuver_override(1, 2, 3, TurnType::Turn, Some(SharpRight))
            .maneuver_override(1, 2, 3, TurnType::Suppressed, None);
        let (steps, geometry) = fixture.steps();
        let first = find_applicable_override(&fixture.facade, &steps, &geometry, 5).unwrap();
        for _ in 0..10 {
            let again = find_applicable_override(&fixture.facade, &steps, &geometry, 5).unwrap();
            assert_eq!(again, first);
        }
        assert_eq!(first.maneuver.override_type(), TurnType::Turn);
    }
}
