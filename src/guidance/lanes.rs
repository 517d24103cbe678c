//! Lane anticipation across closely spaced maneuvers

use crate::instruction::{DirectionModifier, LaneTuple};

use super::steps::RouteStep;

/// Maneuvers closer than this leave no room to change lanes in between
const LANE_CHANGE_DISTANCE: f64 = 150.0;

fn lanes_of(step: &RouteStep) -> Option<LaneTuple> {
    step.intersections.first().and_then(|intersection| intersection.lanes)
}

/// Restrict `current` to the lanes on the side of the following turn
fn narrow(current: LaneTuple, next: LaneTuple, next_modifier: DirectionModifier) -> LaneTuple {
    let lanes_in_turn = current.lanes_in_turn.min(next.lanes_in_turn).max(1);
    if lanes_in_turn >= current.lanes_in_turn {
        return current;
    }
    let first_lane_from_right = if next_modifier.is_left() {
        current.first_lane_from_right + (current.lanes_in_turn - lanes_in_turn)
    } else {
        current.first_lane_from_right
    };
    LaneTuple {
        lanes_in_turn,
        first_lane_from_right,
    }
}

/// Narrow lane recommendations so that each one already sets up the next turn.
///
/// Walks backwards so restrictions propagate through chains of short steps.
pub fn anticipate_lane_change(steps: &mut [RouteStep]) {
    if steps.len() < 3 {
        return;
    }
    for index in (1..steps.len() - 1).rev() {
        if steps[index].distance >= LANE_CHANGE_DISTANCE {
            continue;
        }
        let next = &steps[index + 1];
        let (Some(current), Some(upcoming)) = (lanes_of(&steps[index]), lanes_of(next)) else {
            continue;
        };
        let narrowed = narrow(current, upcoming, next.maneuver.instruction.direction_modifier);
        if let Some(intersection) = steps[index].intersections.first_mut() {
            intersection.lanes = Some(narrowed);
        }
    }
}
