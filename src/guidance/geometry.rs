//! Leg geometry reconstruction from the unpacked path

use serde::Serialize;

use crate::error::{GuidanceError, Result};
use crate::facade::{GuidanceFacade, OsmNodeId};
use crate::geo::{haversine_distance, Coordinate};
use crate::instruction::TurnType;
use crate::path::{PathSegment, Snap};

use super::steps::RouteStep;

/// Per-gap annotation between two consecutive locations
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Annotation {
    /// Meters
    pub distance: f64,
    /// Seconds
    pub duration: f64,
    pub weight: f64,
    pub datasource: u8,
}

/// Ordered point sequence of one leg.
///
/// `annotations[i]` describes the gap between `locations[i]` and
/// `locations[i + 1]`. `segment_offsets` holds the first location of every
/// non-arrive step followed by the index of the final location, so segment `k`
/// spans `segment_offsets[k]..segment_offsets[k + 1]`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LegGeometry {
    pub locations: Vec<Coordinate>,
    pub annotations: Vec<Annotation>,
    pub osm_node_ids: Vec<OsmNodeId>,
    pub segment_offsets: Vec<usize>,
    pub segment_distances: Vec<f64>,
}

impl LegGeometry {
    pub fn size(&self) -> usize {
        self.locations.len()
    }

    pub fn front_index(&self, segment: usize) -> usize {
        self.segment_offsets[segment]
    }

    pub fn back_index(&self, segment: usize) -> usize {
        self.segment_offsets[segment + 1]
    }

    pub fn segment_count(&self) -> usize {
        self.segment_offsets.len().saturating_sub(1)
    }

    /// Sum of gap distances in `begin..end` (gap `i` joins `i` and `i + 1`)
    pub fn distance_between(&self, begin: usize, end: usize) -> f64 {
        let end = end.min(self.annotations.len());
        if begin >= end {
            return 0.0;
        }
        self.annotations[begin..end].iter().map(|a| a.distance).sum()
    }

    pub fn total_distance(&self) -> f64 {
        self.annotations.iter().map(|a| a.distance).sum()
    }

    /// Points drawn for a step: its own range plus the location of the next
    /// maneuver, which is where the step's road ends.
    pub fn step_polyline(&self, step: &RouteStep) -> &[Coordinate] {
        let begin = step.geometry_begin.min(self.locations.len());
        let end = (step.geometry_end + 1).min(self.locations.len()).max(begin);
        &self.locations[begin..end]
    }

    /// Remove the first `count` locations and their gaps, shifting offsets
    pub(crate) fn drain_front(&mut self, count: usize) {
        let count = count.min(self.locations.len().saturating_sub(1));
        self.locations.drain(..count);
        self.annotations.drain(..count.min(self.annotations.len()));
        self.osm_node_ids.drain(..count.min(self.osm_node_ids.len()));
        for offset in self.segment_offsets.iter_mut() {
            *offset = offset.saturating_sub(count);
        }
    }

    /// Keep locations up to and including `last`
    pub(crate) fn truncate_after(&mut self, last: usize) {
        self.locations.truncate(last + 1);
        self.annotations.truncate(last);
        self.osm_node_ids.truncate(last + 1);
        self.segment_offsets.retain(|&offset| offset <= last);
    }
}

/// Build the geometry of one leg.
///
/// Starts at the source snap, follows each via node of the path and ends at the
/// target snap; a path without segments still yields the two snap points.
pub fn assemble_geometry<F: GuidanceFacade + ?Sized>(
    facade: &F,
    path: &[PathSegment],
    source: &Snap,
    target: &Snap,
    source_reversed: bool,
    target_reversed: bool,
) -> Result<LegGeometry> {
    let weight_multiplier = facade.weight_multiplier();
    let mut geometry = LegGeometry::default();

    geometry.segment_offsets.push(0);
    geometry.locations.push(source.location);
    geometry.osm_node_ids.push(source.osm_node_id);

    let source_duration = source.duration(source_reversed);
    let source_weight = source.weight(source_reversed);

    let mut previous = source.location;
    let mut cumulative_distance = 0.0;

    for (index, segment) in path.iter().enumerate() {
        let coordinate = facade
            .coordinate_of_node(segment.turn_via_node)
            .ok_or(GuidanceError::UnknownNode(segment.turn_via_node))?;
        let osm_id = facade
            .osm_node_id_of_node(segment.turn_via_node)
            .ok_or(GuidanceError::UnknownNode(segment.turn_via_node))?;

        let distance = haversine_distance(previous, coordinate);
        cumulative_distance += distance;

        // must agree with the step boundaries in assemble_steps
        if segment.turn_instruction.turn_type != TurnType::NoTurn {
            geometry.segment_distances.push(cumulative_distance);
            geometry.segment_offsets.push(geometry.locations.len());
            cumulative_distance = 0.0;
        }

        let (duration, weight) = if index == 0 {
            (
                segment.duration_until_turn.saturating_sub(source_duration),
                segment.weight_until_turn.saturating_sub(source_weight),
            )
        } else {
            (segment.duration_until_turn, segment.weight_until_turn)
        };

        geometry.annotations.push(Annotation {
            distance,
            duration: duration as f64 / 10.0,
            weight: weight as f64 / weight_multiplier,
            datasource: segment.datasource,
        });
        geometry.locations.push(coordinate);
        geometry.osm_node_ids.push(osm_id);
        previous = coordinate;
    }

    let distance = haversine_distance(previous, target.location);
    cumulative_distance += distance;

    let (target_duration, target_weight) = if path.is_empty() {
        // source and target share one segment
        (
            target
                .duration(target_reversed)
                .saturating_sub(source_duration),
            target.weight(target_reversed).saturating_sub(source_weight),
        )
    } else {
        (target.duration(target_reversed), target.weight(target_reversed))
    };

    geometry.annotations.push(Annotation {
        distance,
        duration: target_duration as f64 / 10.0,
        weight: target_weight as f64 / weight_multiplier,
        datasource: target.datasource,
    });
    geometry.segment_distances.push(cumulative_distance);
    geometry.segment_offsets.push(geometry.locations.len());
    geometry.locations.push(target.location);
    geometry.osm_node_ids.push(target.osm_node_id);

    Ok(geometry)
}
