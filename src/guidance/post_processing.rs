//! Step post-processing stages that reshape the step list as a whole

use tracing::trace;

use crate::error::{GuidanceError, Result};
use crate::geo::{bearing, haversine_distance, turn_angle, Coordinate};
use crate::instruction::{DirectionModifier, TurnInstruction, TurnType, WaypointType};
use crate::path::Snap;

use super::geometry::LegGeometry;
use super::steps::{merge_into_previous, RouteStep};

/// Steps shorter than this at either end of a leg are noise from snapping
const MIN_SEGMENT_LENGTH: f64 = 1.0;
/// Name changes shorter than this that return to the previous road are dropped
const NAME_SEGMENT_CUTOFF_LENGTH: f64 = 105.0;
/// Input coordinates this close to the snap carry no side information
const MINIMAL_RELATIVE_DISTANCE: f64 = 5.0;
/// Input coordinates further away than this were snapped too far to tell
const MAXIMAL_RELATIVE_DISTANCE: f64 = 300.0;

/// Drop a near-zero depart step and a near-zero last step before arrival
pub fn trim_short_segments(steps: &mut Vec<RouteStep>, geometry: &mut LegGeometry) {
    if steps.len() > 2 && steps[0].distance < MIN_SEGMENT_LENGTH {
        trim_front(steps, geometry);
    }

    let penultimate = steps.len().wrapping_sub(2);
    if steps.len() > 2 && steps[penultimate].distance < MIN_SEGMENT_LENGTH {
        trim_back(steps, geometry);
    }
}

fn trim_front(steps: &mut Vec<RouteStep>, geometry: &mut LegGeometry) {
    let removed = steps.remove(0);
    let shift = removed.geometry_end;
    trace!(distance = removed.distance, points = shift, "trimming short depart step");

    geometry.drain_front(shift);
    if !geometry.segment_offsets.is_empty() {
        geometry.segment_offsets.remove(0);
    }
    if !geometry.segment_distances.is_empty() {
        geometry.segment_distances.remove(0);
    }
    for step in steps.iter_mut() {
        step.geometry_begin -= shift;
        step.geometry_end -= shift;
    }

    let depart = &mut steps[0];
    depart.duration += removed.duration;
    depart.weight += removed.weight;
    depart.distance += removed.distance;
    depart.maneuver.waypoint_type = WaypointType::Depart;
    depart.maneuver.instruction = TurnInstruction::no_turn();
    depart.maneuver.location = geometry.locations[0];
    depart.maneuver.bearing_before = 0;
    if geometry.size() >= 2 {
        depart.maneuver.bearing_after = bearing(geometry.locations[0], geometry.locations[1]);
    }
    if let Some(first) = depart.intersections.first_mut() {
        first.approach_bearing = None;
        first.lanes = None;
    }
}

fn trim_back(steps: &mut Vec<RouteStep>, geometry: &mut LegGeometry) {
    let index = steps.len() - 2;
    let removed = steps.remove(index);
    trace!(distance = removed.distance, "trimming short step before arrival");

    let last = removed.geometry_begin;
    geometry.truncate_after(last);
    geometry.segment_distances.pop();

    {
        let previous = &mut steps[index - 1];
        previous.duration += removed.duration;
        previous.weight += removed.weight;
        previous.distance += removed.distance;
    }

    let arrive = &mut steps[index];
    arrive.geometry_begin = last;
    arrive.geometry_end = last + 1;
    arrive.maneuver.location = geometry.locations[last];
    if last > 0 {
        arrive.maneuver.bearing_before = bearing(geometry.locations[last - 1], geometry.locations[last]);
    }
    if let Some(intersection) = arrive.intersections.first_mut() {
        intersection.location = geometry.locations[last];
    }
}

/// Collapse each roundabout into an enter and an exit step numbered by exit
pub fn handle_roundabouts(steps: &mut Vec<RouteStep>) {
    let mut entry: Option<usize> = None;
    let mut exits: u32 = 0;
    let mut index = 1;

    while index < steps.len() {
        let turn_type = steps[index].turn_type();

        if turn_type.enters_and_exits_roundabout() {
            steps[index].maneuver.exit = 1;
            entry = None;
            exits = 0;
        } else if turn_type.enters_roundabout() {
            entry = Some(index);
            exits = u32::from(turn_type.enters_roundabout_at_exit());
        } else if turn_type == TurnType::StayOnRoundabout {
            // every passed exit folds into the step that reached the roundabout
            exits += 1;
            merge_into_previous(steps, index);
            continue;
        } else if turn_type.leaves_roundabout() {
            exits += 1;
            if let Some(entry) = entry {
                steps[entry].maneuver.exit = exits;
            }
            steps[index].maneuver.exit = exits;
            entry = None;
            exits = 0;
        }
        index += 1;
    }
}

/// Merge short or unnamed name-change steps into their predecessor
pub fn suppress_short_name_segments(steps: &mut Vec<RouteStep>) {
    let mut index = 1;
    while index + 1 < steps.len() {
        let step = &steps[index];
        if step.turn_type().is_name_change() {
            let unnamed = step.name.is_empty();
            let returns_to_previous = step.distance < NAME_SEGMENT_CUTOFF_LENGTH
                && steps[index + 1].name == steps[index - 1].name;
            if unnamed || returns_to_previous {
                merge_into_previous(steps, index);
                continue;
            }
        }
        index += 1;
    }
}

fn relative_modifier(input: Coordinate, snapped: Coordinate, angle: f64) -> DirectionModifier {
    let offset = haversine_distance(input, snapped);
    if (MINIMAL_RELATIVE_DISTANCE..=MAXIMAL_RELATIVE_DISTANCE).contains(&offset) {
        DirectionModifier::from_angle(angle)
    } else {
        DirectionModifier::UTurn
    }
}

/// Set depart and arrive modifiers to the side of the road the inputs lie on
pub fn assign_relative_locations(
    steps: &mut [RouteStep],
    geometry: &LegGeometry,
    source: &Snap,
    target: &Snap,
) {
    let size = geometry.size();
    if size < 2 || steps.len() < 2 {
        return;
    }
    let locations = &geometry.locations;

    let start = source.input();
    let initial = relative_modifier(
        start,
        locations[0],
        turn_angle(start, locations[0], locations[1]),
    );
    let end = target.input();
    let last = relative_modifier(
        end,
        locations[size - 1],
        turn_angle(locations[size - 2], locations[size - 1], end),
    );

    if let Some(depart) = steps.first_mut() {
        depart.maneuver.instruction.direction_modifier = initial;
    }
    if let Some(arrive) = steps.last_mut() {
        arrive.maneuver.instruction.direction_modifier = last;
    }
}

/// Rebuild segment offsets and distances from the final steps.
///
/// Step ranges must already be contiguous and cover the geometry; step distances
/// are re-derived from it.
pub fn resync_geometry(geometry: &mut LegGeometry, steps: &mut [RouteStep]) -> Result<()> {
    let points = geometry.size();
    let mut covered = 0;
    for (index, step) in steps.iter().enumerate() {
        if step.geometry_begin != covered || step.geometry_end <= step.geometry_begin {
            return Err(GuidanceError::GeometryOutOfSync {
                step: index,
                covered,
                points,
            });
        }
        covered = step.geometry_end;
    }
    if covered != points {
        return Err(GuidanceError::GeometryOutOfSync {
            step: steps.len().saturating_sub(1),
            covered,
            points,
        });
    }

    geometry.segment_offsets.clear();
    geometry.segment_distances.clear();
    let (body, _arrive) = steps.split_at_mut(steps.len() - 1);
    for step in body.iter_mut() {
        step.distance = geometry.distance_between(step.geometry_begin, step.geometry_end);
        geometry.segment_offsets.push(step.geometry_begin);
        geometry.segment_distances.push(step.distance);
    }
    geometry.segment_offsets.push(points - 1);
    Ok(())
}
