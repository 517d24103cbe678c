//! Synthetic legs for guidance unit tests

use crate::facade::{InMemoryFacade, ManeuverOverride, NodeId};
use crate::geo::Coordinate;
use crate::instruction::{DirectionModifier, LaneTuple, TravelMode, TurnInstruction, TurnType};
use crate::path::{BoundarySnaps, PathSegment, SegmentId, Snap};

use super::geometry::{assemble_geometry, LegGeometry};
use super::steps::{assemble_steps, RouteStep};

/// Each path costs 10 s per gap
pub(crate) const GAP_DURATION: u32 = 100;

pub(crate) fn snap(location: (f64, f64), segment: u32) -> Snap {
    Snap {
        location: Coordinate::from_degrees(location.0, location.1),
        input_location: None,
        forward_segment_id: SegmentId {
            id: segment,
            enabled: true,
        },
        reverse_segment_id: SegmentId {
            id: segment + 1000,
            enabled: true,
        },
        name_id: 0,
        forward_duration: 0,
        reverse_duration: 0,
        forward_weight: 0,
        reverse_weight: 0,
        osm_node_id: 0,
        datasource: 0,
        travel_mode: TravelMode::Driving,
    }
}

/// A leg through `points`: first and last are the snaps, the rest are via
/// nodes. Gap `i` is edge-based node `i + 1` and via point `i` is node `i - 1`.
pub(crate) struct LegFixture {
    pub facade: InMemoryFacade,
    pub path: Vec<PathSegment>,
    pub source: Snap,
    pub target: Snap,
}

impl LegFixture {
    pub fn new(points: &[(f64, f64)]) -> Self {
        assert!(points.len() >= 2);
        let mut facade = InMemoryFacade::new("duration");
        let unnamed = facade.add_name("");
        let gaps = points.len() - 1;

        let path = points[1..gaps]
            .iter()
            .enumerate()
            .map(|(index, &(lon, lat))| {
                let via = facade.add_node(Coordinate::from_degrees(lon, lat), 100 + index as u64);
                PathSegment {
                    turn_via_node: via,
                    from_edge_based_node: index as u32 + 1,
                    name_id: unnamed,
                    duration_until_turn: GAP_DURATION,
                    weight_until_turn: GAP_DURATION,
                    turn_instruction: TurnInstruction::no_turn(),
                    travel_mode: TravelMode::Driving,
                    datasource: 0,
                    lanes: None,
                }
            })
            .collect();

        let source = snap(points[0], 1);
        let mut target = snap(points[gaps], gaps as u32);
        target.forward_duration = GAP_DURATION;
        target.forward_weight = GAP_DURATION;

        Self {
            facade,
            path,
            source,
            target,
        }
    }

    /// Node id of via point `index`
    pub fn node(&self, index: usize) -> NodeId {
        self.path[index - 1].turn_via_node
    }

    pub fn turn(mut self, index: usize, turn_type: TurnType, modifier: DirectionModifier) -> Self {
        self.path[index - 1].turn_instruction = TurnInstruction::new(turn_type, modifier);
        self
    }

    pub fn lanes(mut self, index: usize, lanes_in_turn: u8, first_lane_from_right: u8) -> Self {
        self.path[index - 1].lanes = Some(LaneTuple {
            lanes_in_turn,
            first_lane_from_right,
        });
        self
    }

    /// One name per gap
    pub fn names(mut self, names: &[&str]) -> Self {
        assert_eq!(names.len(), self.path.len() + 1);
        let ids: Vec<_> = names.iter().map(|n| self.facade.add_name(n)).collect();
        for (segment, id) in self.path.iter_mut().zip(&ids) {
            segment.name_id = *id;
        }
        self.source.name_id = ids[0];
        self.target.name_id = ids[ids.len() - 1];
        self
    }

    pub fn inputs(mut self, source: (f64, f64), target: (f64, f64)) -> Self {
        self.source.input_location = Some(Coordinate::from_degrees(source.0, source.1));
        self.target.input_location = Some(Coordinate::from_degrees(target.0, target.1));
        self
    }

    pub fn maneuver_override(
        mut self,
        from: u32,
        via_index: usize,
        to: u32,
        turn_type: TurnType,
        direction: Option<DirectionModifier>,
    ) -> Self {
        let via = self.node(via_index);
        let maneuver = ManeuverOverride::new(from, via, to, turn_type, direction).unwrap();
        self.facade.add_override(maneuver);
        self
    }

    pub fn snaps(&self) -> BoundarySnaps<'_> {
        BoundarySnaps {
            source: &self.source,
            target: &self.target,
            source_reversed: false,
            target_reversed: false,
        }
    }

    pub fn geometry(&self) -> LegGeometry {
        assemble_geometry(
            &self.facade,
            &self.path,
            &self.source,
            &self.target,
            false,
            false,
        )
        .unwrap()
    }

    pub fn steps(&self) -> (Vec<RouteStep>, LegGeometry) {
        let geometry = self.geometry();
        let steps = assemble_steps(
            &self.facade,
            &self.path,
            &geometry,
            &self.source,
            &self.target,
            false,
            false,
        );
        (steps, geometry)
    }
}

pub(crate) fn labels(steps: &[RouteStep]) -> Vec<String> {
    steps.iter().map(RouteStep::label).collect()
}

/// Asserts the half-open ranges partition the geometry
pub(crate) fn assert_partition(steps: &[RouteStep], geometry: &LegGeometry) {
    assert_eq!(steps[0].geometry_begin, 0);
    for pair in steps.windows(2) {
        assert_eq!(pair[0].geometry_end, pair[1].geometry_begin);
    }
    assert_eq!(steps[steps.len() - 1].geometry_end, geometry.size());
}
