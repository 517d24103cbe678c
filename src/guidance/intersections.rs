//! Completion of the junction records attached to each step

use crate::geo::angular_deviation;

use super::steps::{Intersection, RouteStep};

/// Roads whose bearings differ by at most this are the same road
const BEARING_TOLERANCE: u16 = 10;

fn closest(bearings: &[u16], bearing: u16) -> Option<usize> {
    bearings
        .iter()
        .enumerate()
        .min_by_key(|(_, &candidate)| angular_deviation(candidate, bearing))
        .map(|(index, _)| index)
}

fn insert_road(bearings: &mut Vec<u16>, bearing: u16) {
    let known = bearings
        .iter()
        .any(|&candidate| angular_deviation(candidate, bearing) <= BEARING_TOLERANCE);
    if !known {
        bearings.push(bearing);
    }
}

fn complete(intersection: &mut Intersection) {
    if let Some(approach) = intersection.approach_bearing {
        insert_road(&mut intersection.bearings, approach);
    }
    if let Some(exit) = intersection.exit_bearing {
        insert_road(&mut intersection.bearings, exit);
    }
    intersection.bearings.sort_unstable();
    intersection.bearings.dedup();

    let bearings = &intersection.bearings;
    intersection.in_index = intersection
        .approach_bearing
        .and_then(|approach| closest(bearings, approach));
    intersection.out_index = intersection
        .exit_bearing
        .and_then(|exit| closest(bearings, exit));

    let in_index = intersection.in_index;
    intersection.entry = (0..bearings.len()).map(|k| Some(k) != in_index).collect();
}

/// Give every intersection sorted bearings, `in`/`out` indices and entry flags.
/// Never adds or removes steps.
pub fn build_intersections(steps: &mut [RouteStep]) {
    for step in steps.iter_mut() {
        for intersection in step.intersections.iter_mut() {
            complete(intersection);
        }
    }
}
