//! Collapse of instruction sequences a driver perceives as one maneuver

use tracing::trace;

use crate::instruction::{DirectionModifier, TurnInstruction, TurnType};

use super::steps::{merge_into_previous, RouteStep};

/// Turns closer than this to the next maneuver are announced together with it
const MAX_COLLAPSE_DISTANCE: f64 = 30.0;

/// Depart, arrive and roundabout steps carry their own semantics
fn is_collapsible(step: &RouteStep) -> bool {
    !step.is_depart() && !step.is_arrive() && !step.turn_type().is_roundabout()
}

/// Whether the junction starting `step` offers roads besides in and out
fn has_alternatives(step: &RouteStep) -> bool {
    step.intersections
        .first()
        .is_some_and(|intersection| intersection.bearings.len() > 2)
}

fn is_turn(step: &RouteStep) -> bool {
    let turn_type = step.turn_type();
    !turn_type.is_silent() && !turn_type.is_name_change()
}

fn is_straight_continuation(step: &RouteStep) -> bool {
    matches!(step.turn_type(), TurnType::NewName | TurnType::Continue)
        && step.maneuver.instruction.direction_modifier.is_straight()
}

fn same_side(a: DirectionModifier, b: DirectionModifier) -> bool {
    (a.is_left() && b.is_left()) || (a.is_right() && b.is_right())
}

/// Merge steps that do not need their own announcement.
///
/// The step list keeps depart first and arrive last; merges never cross them.
pub fn collapse_turn_instructions(steps: &mut Vec<RouteStep>) {
    let mut index = 1;
    while index + 1 < steps.len() {
        if !is_collapsible(&steps[index]) {
            index += 1;
            continue;
        }

        let step = &steps[index];
        let previous = &steps[index - 1];

        // silent steps and name changes that keep the name
        if step.turn_type().is_silent()
            || (step.turn_type() == TurnType::NewName && step.name_id == previous.name_id)
        {
            trace!(index, turn = %step.maneuver.instruction, "merging silent step");
            merge_into_previous(steps, index);
            continue;
        }

        let next = &steps[index + 1];
        if !is_turn(step)
            || !is_collapsible(next)
            || step.distance >= MAX_COLLAPSE_DISTANCE
        {
            index += 1;
            continue;
        }

        if is_straight_continuation(next) && !has_alternatives(next) {
            // the continuation only finishes the turn
            trace!(index, "folding straight continuation into short turn");
            let name = next.name.clone();
            let name_id = next.name_id;
            merge_into_previous(steps, index + 1);
            steps[index].name = name;
            steps[index].name_id = name_id;
            continue;
        }

        let first = step.maneuver.instruction.direction_modifier;
        let second = next.maneuver.instruction.direction_modifier;
        if is_turn(next) && same_side(first, second) && next.name_id == previous.name_id {
            trace!(index, "collapsing two short turns into a u-turn");
            let name = next.name.clone();
            let name_id = next.name_id;
            merge_into_previous(steps, index + 1);
            let step = &mut steps[index];
            step.name = name;
            step.name_id = name_id;
            step.maneuver.instruction =
                TurnInstruction::new(TurnType::Continue, DirectionModifier::UTurn);
            continue;
        }

        index += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guidance::test_support::{assert_partition, labels, LegFixture};
    use DirectionModifier::{Left, Right, Straight};

    fn line(points: usize) -> Vec<(f64, f64)> {
        (0..points).map(|i| (i as f64 * 0.001, 0.0)).collect()
    }

    #[test]
    fn test_suppressed_step_merges() {
        let fixture = LegFixture::new(&line(4))
            .turn(1, TurnType::Suppressed, Straight)
            .turn(2, TurnType::Turn, Left);
        let (mut steps, geometry) = fixture.steps();
        collapse_turn_instructions(&mut steps);
        assert_eq!(labels(&steps), vec!["depart", "turn left", "arrive"]);
        assert_partition(&steps, &geometry);
    }

    #[test]
    fn test_new_name_keeping_name_merges() {
        let fixture = LegFixture::new(&line(4))
            .turn(1, TurnType::NewName, Straight)
            .turn(2, TurnType::Turn, Right)
            .names(&["Main", "Main", "Oak"]);
        let (mut steps, geometry) = fixture.steps();
        collapse_turn_instructions(&mut steps);
        assert_eq!(labels(&steps), vec!["depart", "turn right", "arrive"]);
        assert_partition(&steps, &geometry);
    }

    fn short_turn_then_straight() -> LegFixture {
        LegFixture::new(&[(0.0, 0.0), (0.001, 0.0), (0.001, -0.0002), (0.001, -0.002)])
            .turn(1, TurnType::Turn, Right)
            .turn(2, TurnType::NewName, Straight)
            .names(&["Main", "", "Oak"])
    }

    #[test]
    fn test_short_turn_absorbs_continuation() {
        let (mut steps, geometry) = short_turn_then_straight().steps();
        collapse_turn_instructions(&mut steps);
        assert_eq!(labels(&steps), vec!["depart", "turn right", "arrive"]);
        assert_eq!(steps[1].name, "Oak");
        assert_partition(&steps, &geometry);
    }

    #[test]
    fn test_continuation_with_alternatives_stays() {
        let mut fixture = short_turn_then_straight();
        let c = fixture.node(2);
        fixture.facade.set_bearings(c, vec![0, 90, 180, 270]);
        let (mut steps, _) = fixture.steps();
        collapse_turn_instructions(&mut steps);
        assert_eq!(steps.len(), 4);
    }

    #[test]
    fn test_two_short_turns_become_uturn() {
        let fixture =
            LegFixture::new(&[(0.0, 0.0), (0.001, 0.0), (0.001, 0.0002), (0.0, 0.0002)])
                .turn(1, TurnType::Turn, Left)
                .turn(2, TurnType::Turn, Left)
                .names(&["Main", "Link", "Main"]);
        let (mut steps, geometry) = fixture.steps();
        collapse_turn_instructions(&mut steps);
        assert_eq!(labels(&steps), vec!["depart", "continue uturn", "arrive"]);
        assert_eq!(steps[1].name, "Main");
        assert_partition(&steps, &geometry);
    }

    #[test]
    fn test_roundabouts_are_left_alone() {
        let fixture = LegFixture::new(&line(4))
            .turn(1, TurnType::EnterRoundabout, Right)
            .turn(2, TurnType::ExitRoundabout, Right);
        let (mut steps, _) = fixture.steps();
        collapse_turn_instructions(&mut steps);
        assert_eq!(steps.len(), 4);
    }
}
