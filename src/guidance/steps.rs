//! Route steps: one maneuver each, built from the unpacked path

use serde::Serialize;

use crate::facade::{EdgeBasedNodeId, GuidanceFacade, NameId};
use crate::geo::{bearing, Coordinate};
use crate::instruction::{LaneTuple, TravelMode, TurnInstruction, TurnType, WaypointType};
use crate::path::{PathSegment, Snap};

use super::geometry::LegGeometry;

/// A junction passed by a step
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Intersection {
    pub location: Coordinate,
    /// Bearings of all roads at the junction, sorted once intersections are built
    pub bearings: Vec<u16>,
    /// Whether each road in `bearings` may be entered
    pub entry: Vec<bool>,
    #[serde(rename = "in", skip_serializing_if = "Option::is_none")]
    pub in_index: Option<usize>,
    #[serde(rename = "out", skip_serializing_if = "Option::is_none")]
    pub out_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lanes: Option<LaneTuple>,
    /// Bearing pointing back along the road we arrived on
    #[serde(skip)]
    pub approach_bearing: Option<u16>,
    /// Bearing of the road we leave on
    #[serde(skip)]
    pub exit_bearing: Option<u16>,
}

impl Intersection {
    pub fn new(
        location: Coordinate,
        bearings: Vec<u16>,
        bearing_before: Option<u16>,
        bearing_after: Option<u16>,
        lanes: Option<LaneTuple>,
    ) -> Self {
        Self {
            location,
            bearings,
            entry: Vec::new(),
            in_index: None,
            out_index: None,
            lanes,
            approach_bearing: bearing_before.map(|b| (b + 180) % 360),
            exit_bearing: bearing_after,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepManeuver {
    pub location: Coordinate,
    pub bearing_before: u16,
    pub bearing_after: u16,
    pub instruction: TurnInstruction,
    pub waypoint_type: WaypointType,
    /// Roundabout exit number, 0 when not applicable
    #[serde(skip_serializing_if = "is_zero")]
    pub exit: u32,
}

fn is_zero(value: &u32) -> bool {
    *value == 0
}

/// One instruction-bearing unit of a leg.
///
/// `geometry_begin..geometry_end` indexes the leg geometry; the ranges of a
/// leg's steps partition it. `from_id`/`to_id` are the first and last
/// edge-based nodes the step traverses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteStep {
    #[serde(skip)]
    pub from_id: EdgeBasedNodeId,
    #[serde(skip)]
    pub to_id: EdgeBasedNodeId,
    #[serde(skip)]
    pub name_id: NameId,
    pub name: String,
    /// Seconds
    pub duration: f64,
    /// Meters
    pub distance: f64,
    pub weight: f64,
    pub mode: TravelMode,
    pub maneuver: StepManeuver,
    #[serde(skip)]
    pub geometry_begin: usize,
    #[serde(skip)]
    pub geometry_end: usize,
    pub intersections: Vec<Intersection>,
}

impl RouteStep {
    pub fn turn_type(&self) -> TurnType {
        self.maneuver.instruction.turn_type
    }

    pub fn is_depart(&self) -> bool {
        self.maneuver.waypoint_type == WaypointType::Depart
    }

    pub fn is_arrive(&self) -> bool {
        self.maneuver.waypoint_type == WaypointType::Arrive
    }

    /// Whether a turn-by-turn list shows this step
    pub fn is_announced(&self) -> bool {
        self.maneuver.waypoint_type != WaypointType::None || !self.turn_type().is_silent()
    }

    /// Short maneuver label, e.g. `depart` or `turn sharp right`
    pub fn label(&self) -> String {
        match self.maneuver.waypoint_type {
            WaypointType::Depart => "depart".to_string(),
            WaypointType::Arrive => "arrive".to_string(),
            WaypointType::None => self.maneuver.instruction.to_string(),
        }
    }

    pub fn geometry_len(&self) -> usize {
        self.geometry_end.saturating_sub(self.geometry_begin)
    }

    /// Absorb the directly following step, keeping this step's maneuver
    pub fn elongate(&mut self, next: &RouteStep) {
        debug_assert_eq!(self.geometry_end, next.geometry_begin);
        self.duration += next.duration;
        self.distance += next.distance;
        self.weight += next.weight;
        self.geometry_end = next.geometry_end;
        self.to_id = next.to_id;
        self.intersections.extend(next.intersections.iter().cloned());
    }
}

/// Fold `steps[index]` into `steps[index - 1]`
pub(crate) fn merge_into_previous(steps: &mut Vec<RouteStep>, index: usize) {
    debug_assert!(index > 0 && index < steps.len());
    let step = steps.remove(index);
    steps[index - 1].elongate(&step);
}

/// Build the raw step sequence of one leg.
///
/// Every path segment whose instruction is not `NoTurn` closes the running step
/// and opens a new one at its via node; `NoTurn` junctions are kept as
/// pass-through intersections. The leg always ends with a one-point arrive step.
pub fn assemble_steps<F: GuidanceFacade + ?Sized>(
    facade: &F,
    path: &[PathSegment],
    geometry: &LegGeometry,
    source: &Snap,
    target: &Snap,
    source_reversed: bool,
    target_reversed: bool,
) -> Vec<RouteStep> {
    let weight_multiplier = facade.weight_multiplier();
    let locations = &geometry.locations;
    debug_assert!(locations.len() >= 2);
    debug_assert_eq!(locations.len(), path.len() + 2);

    let source_duration = source.duration(source_reversed);
    let source_weight = source.weight(source_reversed);
    let target_node = target.segment_id(target_reversed);

    let mut steps = Vec::with_capacity(geometry.segment_count() + 1);

    let depart_bearing = bearing(locations[0], locations[1]);
    let mut maneuver = StepManeuver {
        location: source.location,
        bearing_before: 0,
        bearing_after: depart_bearing,
        instruction: TurnInstruction::no_turn(),
        waypoint_type: WaypointType::Depart,
        exit: 0,
    };
    let mut intersections = vec![Intersection::new(
        source.location,
        Vec::new(),
        None,
        Some(depart_bearing),
        None,
    )];
    let mut from_id = source.segment_id(source_reversed);
    let mut name_id = source.name_id;
    let mut segment = 0;
    let mut duration: u32 = 0;
    let mut weight: u32 = 0;

    // the first step starts at the snap, not at the start of its segment
    let without_source = |segment: usize, duration: u32, weight: u32| {
        if segment == 0 {
            (
                duration.saturating_sub(source_duration),
                weight.saturating_sub(source_weight),
            )
        } else {
            (duration, weight)
        }
    };

    for (index, path_point) in path.iter().enumerate() {
        duration += path_point.duration_until_turn;
        weight += path_point.weight_until_turn;

        let via = index + 1;
        let via_location = locations[via];
        let before = bearing(locations[via - 1], via_location);
        let after = bearing(via_location, locations[via + 1]);
        let junction_bearings = facade.bearings_at_node(path_point.turn_via_node).to_vec();

        if path_point.turn_instruction.turn_type == TurnType::NoTurn {
            intersections.push(Intersection::new(
                via_location,
                junction_bearings,
                Some(before),
                Some(after),
                None,
            ));
            continue;
        }

        let (step_duration, step_weight) = without_source(segment, duration, weight);
        steps.push(RouteStep {
            from_id,
            to_id: path_point.from_edge_based_node,
            name_id,
            name: facade.name_for_id(name_id).to_string(),
            duration: step_duration as f64 / 10.0,
            distance: geometry.segment_distances[segment],
            weight: step_weight as f64 / weight_multiplier,
            mode: path_point.travel_mode,
            maneuver,
            geometry_begin: geometry.front_index(segment),
            geometry_end: geometry.back_index(segment),
            intersections: std::mem::take(&mut intersections),
        });

        let next = path.get(index + 1);
        name_id = next.map_or(target.name_id, |p| p.name_id);
        from_id = next.map_or(target_node, |p| p.from_edge_based_node);
        maneuver = StepManeuver {
            location: via_location,
            bearing_before: before,
            bearing_after: after,
            instruction: path_point.turn_instruction,
            waypoint_type: WaypointType::None,
            exit: 0,
        };
        intersections.push(Intersection::new(
            via_location,
            junction_bearings,
            Some(before),
            Some(after),
            path_point.lanes,
        ));
        segment += 1;
        duration = 0;
        weight = 0;
    }

    duration += target.duration(target_reversed);
    weight += target.weight(target_reversed);
    let (step_duration, step_weight) = without_source(segment, duration, weight);
    steps.push(RouteStep {
        from_id,
        to_id: target_node,
        name_id,
        name: facade.name_for_id(name_id).to_string(),
        duration: step_duration as f64 / 10.0,
        distance: geometry.segment_distances[segment],
        weight: step_weight as f64 / weight_multiplier,
        mode: target.travel_mode,
        maneuver,
        geometry_begin: geometry.front_index(segment),
        geometry_end: geometry.back_index(segment),
        intersections,
    });

    let last = locations.len() - 1;
    let arrive_bearing = bearing(locations[last - 1], locations[last]);
    steps.push(RouteStep {
        from_id: target_node,
        to_id: target_node,
        name_id: target.name_id,
        name: facade.name_for_id(target.name_id).to_string(),
        duration: 0.0,
        distance: 0.0,
        weight: 0.0,
        mode: target.travel_mode,
        maneuver: StepManeuver {
            location: target.location,
            bearing_before: arrive_bearing,
            bearing_after: 0,
            instruction: TurnInstruction::no_turn(),
            waypoint_type: WaypointType::Arrive,
            exit: 0,
        },
        geometry_begin: last,
        geometry_end: last + 1,
        intersections: vec![Intersection::new(
            target.location,
            Vec::new(),
            Some(arrive_bearing),
            None,
            None,
        )],
    });

    steps
}
