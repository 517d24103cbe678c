//! Search results as handed over to guidance
//!
//! Durations are deciseconds and weights raw integer units, exactly as the
//! search accumulated them.

use serde::{Deserialize, Serialize};

use crate::error::{GuidanceError, Result};
use crate::facade::{EdgeBasedNodeId, NameId, NodeId, OsmNodeId};
use crate::geo::Coordinate;
use crate::instruction::{LaneTuple, TravelMode, TurnInstruction};

/// One edge of the unpacked path, ending at `turn_via_node`.
///
/// `turn_instruction` describes the turn taken *at* `turn_via_node`; `NoTurn`
/// means the path just continues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathSegment {
    pub turn_via_node: NodeId,
    pub from_edge_based_node: EdgeBasedNodeId,
    #[serde(default)]
    pub name_id: NameId,
    pub duration_until_turn: u32,
    pub weight_until_turn: u32,
    #[serde(default)]
    pub turn_instruction: TurnInstruction,
    #[serde(default)]
    pub travel_mode: TravelMode,
    #[serde(default)]
    pub datasource: u8,
    #[serde(default)]
    pub lanes: Option<LaneTuple>,
}

fn enabled() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentId {
    pub id: EdgeBasedNodeId,
    #[serde(default = "enabled")]
    pub enabled: bool,
}

/// A waypoint snapped onto a road segment.
///
/// `forward_*`/`reverse_*` costs run from the start of the snapped segment (in
/// the respective travel direction) up to the snapped location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snap {
    pub location: Coordinate,
    /// Coordinate the user asked for, before snapping
    #[serde(default)]
    pub input_location: Option<Coordinate>,
    pub forward_segment_id: SegmentId,
    pub reverse_segment_id: SegmentId,
    #[serde(default)]
    pub name_id: NameId,
    #[serde(default)]
    pub forward_duration: u32,
    #[serde(default)]
    pub reverse_duration: u32,
    #[serde(default)]
    pub forward_weight: u32,
    #[serde(default)]
    pub reverse_weight: u32,
    #[serde(default)]
    pub osm_node_id: OsmNodeId,
    #[serde(default)]
    pub datasource: u8,
    #[serde(default)]
    pub travel_mode: TravelMode,
}

impl Snap {
    pub fn segment_id(&self, reversed: bool) -> EdgeBasedNodeId {
        if reversed {
            self.reverse_segment_id.id
        } else {
            self.forward_segment_id.id
        }
    }

    pub fn duration(&self, reversed: bool) -> u32 {
        if reversed {
            self.reverse_duration
        } else {
            self.forward_duration
        }
    }

    pub fn weight(&self, reversed: bool) -> u32 {
        if reversed {
            self.reverse_weight
        } else {
            self.forward_weight
        }
    }

    pub fn input(&self) -> Coordinate {
        self.input_location.unwrap_or(self.location)
    }
}

/// Both ends of one leg
#[derive(Debug, Clone, Copy)]
pub struct BoundarySnaps<'a> {
    pub source: &'a Snap,
    pub target: &'a Snap,
    pub source_reversed: bool,
    pub target_reversed: bool,
}

impl BoundarySnaps<'_> {
    /// Last edge-based node of the leg
    pub fn final_node(&self) -> EdgeBasedNodeId {
        self.target.segment_id(self.target_reversed)
    }

    /// First edge-based node of the leg
    pub fn first_node(&self) -> EdgeBasedNodeId {
        self.source.segment_id(self.source_reversed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawLeg {
    pub source: Snap,
    pub target: Snap,
    #[serde(default)]
    pub source_reversed: bool,
    #[serde(default)]
    pub target_reversed: bool,
    #[serde(default)]
    pub path: Vec<PathSegment>,
}

/// One search result: a path per pair of consecutive waypoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRoute {
    pub legs: Vec<RawLeg>,
}

impl RawRoute {
    pub fn is_valid(&self) -> bool {
        !self.legs.is_empty()
    }

    pub fn leg_count(&self) -> usize {
        self.legs.len()
    }

    fn leg(&self, index: usize) -> Result<&RawLeg> {
        self.legs.get(index).ok_or(GuidanceError::LegOutOfRange {
            index,
            legs: self.legs.len(),
        })
    }

    pub fn raw_path(&self, index: usize) -> Result<&[PathSegment]> {
        Ok(&self.leg(index)?.path)
    }

    pub fn boundary_snaps(&self, index: usize) -> Result<BoundarySnaps<'_>> {
        let leg = self.leg(index)?;
        Ok(BoundarySnaps {
            source: &leg.source,
            target: &leg.target,
            source_reversed: leg.source_reversed,
            target_reversed: leg.target_reversed,
        })
    }
}

/// Main route plus any alternatives
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManyRoutes {
    pub routes: Vec<RawRoute>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(forward: EdgeBasedNodeId, reverse: EdgeBasedNodeId) -> Snap {
        Snap {
            location: Coordinate::from_degrees(4.35, 50.85),
            input_location: None,
            forward_segment_id: SegmentId {
                id: forward,
                enabled: true,
            },
            reverse_segment_id: SegmentId {
                id: reverse,
                enabled: true,
            },
            name_id: 0,
            forward_duration: 12,
            reverse_duration: 30,
            forward_weight: 14,
            reverse_weight: 33,
            osm_node_id: 0,
            datasource: 0,
            travel_mode: TravelMode::Driving,
        }
    }

    #[test]
    fn test_snap_direction_selection() {
        let s = snap(3, 4);
        assert_eq!(s.segment_id(false), 3);
        assert_eq!(s.segment_id(true), 4);
        assert_eq!(s.duration(true), 30);
        assert_eq!(s.weight(false), 14);
        assert_eq!(s.input(), s.location);
    }

    #[test]
    fn test_boundary_snaps_and_out_of_range() {
        let route = RawRoute {
            legs: vec![RawLeg {
                source: snap(1, 2),
                target: snap(8, 9),
                source_reversed: true,
                target_reversed: false,
                path: Vec::new(),
            }],
        };
        let snaps = route.boundary_snaps(0).unwrap();
        assert_eq!(snaps.first_node(), 2);
        assert_eq!(snaps.final_node(), 8);
        assert!(route.raw_path(0).unwrap().is_empty());
        assert_eq!(
            route.raw_path(1).unwrap_err(),
            GuidanceError::LegOutOfRange { index: 1, legs: 1 }
        );
    }

    #[test]
    fn test_path_segment_defaults() {
        let json = r#"{"turn_via_node": 3, "from_edge_based_node": 7,
                       "duration_until_turn": 40, "weight_until_turn": 44}"#;
        let segment: PathSegment = serde_json::from_str(json).unwrap();
        assert_eq!(segment.turn_instruction, TurnInstruction::no_turn());
        assert_eq!(segment.travel_mode, TravelMode::Driving);
        assert!(segment.lanes.is_none());
    }
}
