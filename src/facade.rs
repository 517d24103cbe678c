//! Read-only data lookups consumed by guidance
//!
//! The facade is populated once during preprocessing and only read at request
//! time, so implementations must be `Send + Sync` and lock-free for lookups.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{GuidanceError, Result};
use crate::geo::Coordinate;
use crate::instruction::{DirectionModifier, TurnType};

/// Node of the node-based graph (junctions and shape points)
pub type NodeId = u32;
/// Node of the edge-based graph, i.e. one directed road segment
pub type EdgeBasedNodeId = u32;
pub type OsmNodeId = u64;
pub type NameId = u32;

/// A map-authored correction of the turn at one via node.
///
/// `from_node` and `to_node` are the edge-based nodes where the incoming and
/// outgoing ways start on the path. `direction = None` keeps whatever modifier
/// the step already has.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ManeuverOverrideRecord")]
pub struct ManeuverOverride {
    from_node: EdgeBasedNodeId,
    via_node: NodeId,
    to_node: EdgeBasedNodeId,
    override_type: TurnType,
    direction: Option<DirectionModifier>,
}

#[derive(Deserialize)]
struct ManeuverOverrideRecord {
    from_node: EdgeBasedNodeId,
    via_node: NodeId,
    to_node: EdgeBasedNodeId,
    override_type: TurnType,
    #[serde(default)]
    direction: Option<DirectionModifier>,
}

impl TryFrom<ManeuverOverrideRecord> for ManeuverOverride {
    type Error = GuidanceError;

    fn try_from(record: ManeuverOverrideRecord) -> Result<Self> {
        ManeuverOverride::new(
            record.from_node,
            record.via_node,
            record.to_node,
            record.override_type,
            record.direction,
        )
    }
}

impl ManeuverOverride {
    pub fn new(
        from_node: EdgeBasedNodeId,
        via_node: NodeId,
        to_node: EdgeBasedNodeId,
        override_type: TurnType,
        direction: Option<DirectionModifier>,
    ) -> Result<Self> {
        if override_type == TurnType::Invalid {
            return Err(GuidanceError::InvalidOverrideType { via_node });
        }
        Ok(Self {
            from_node,
            via_node,
            to_node,
            override_type,
            direction,
        })
    }

    pub fn from_node(&self) -> EdgeBasedNodeId {
        self.from_node
    }

    pub fn via_node(&self) -> NodeId {
        self.via_node
    }

    pub fn to_node(&self) -> EdgeBasedNodeId {
        self.to_node
    }

    pub fn override_type(&self) -> TurnType {
        self.override_type
    }

    pub fn direction(&self) -> Option<DirectionModifier> {
        self.direction
    }
}

/// Lookups guidance needs from the preprocessed dataset
pub trait GuidanceFacade: Send + Sync {
    fn coordinate_of_node(&self, node: NodeId) -> Option<Coordinate>;

    fn osm_node_id_of_node(&self, node: NodeId) -> Option<OsmNodeId>;

    /// Road name, empty when unnamed or unknown
    fn name_for_id(&self, name_id: NameId) -> &str;

    /// Bearings of all roads meeting at a junction
    fn bearings_at_node(&self, _node: NodeId) -> &[u16] {
        &[]
    }

    /// Overrides whose incoming way starts on `edge_based_node`, in declaration order
    fn overrides_that_start_at(&self, edge_based_node: EdgeBasedNodeId) -> &[ManeuverOverride];

    fn weight_name(&self) -> &str;

    /// Raw weights are divided by this before reaching the response
    fn weight_multiplier(&self) -> f64 {
        10.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub coordinate: Coordinate,
    #[serde(default)]
    pub osm_id: OsmNodeId,
    #[serde(default)]
    pub bearings: Vec<u16>,
}

fn default_weight_name() -> String {
    "duration".to_string()
}

fn default_weight_multiplier() -> f64 {
    10.0
}

#[derive(Deserialize)]
struct FacadeRecord {
    nodes: Vec<NodeRecord>,
    #[serde(default)]
    names: Vec<String>,
    #[serde(default)]
    overrides: Vec<ManeuverOverride>,
    #[serde(default = "default_weight_name")]
    weight_name: String,
    #[serde(default = "default_weight_multiplier")]
    weight_multiplier: f64,
}

/// Facade backed by in-memory tables, indexed once at construction
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "FacadeRecord")]
pub struct InMemoryFacade {
    nodes: Vec<NodeRecord>,
    names: Vec<String>,
    overrides: FxHashMap<EdgeBasedNodeId, Vec<ManeuverOverride>>,
    weight_name: String,
    weight_multiplier: f64,
}

impl From<FacadeRecord> for InMemoryFacade {
    fn from(record: FacadeRecord) -> Self {
        let mut facade = InMemoryFacade::new(&record.weight_name);
        facade.weight_multiplier = record.weight_multiplier;
        facade.nodes = record.nodes;
        facade.names = record.names;
        for maneuver in record.overrides {
            facade.add_override(maneuver);
        }
        facade
    }
}

impl InMemoryFacade {
    pub fn new(weight_name: &str) -> Self {
        Self {
            nodes: Vec::new(),
            names: Vec::new(),
            overrides: FxHashMap::default(),
            weight_name: weight_name.to_string(),
            weight_multiplier: default_weight_multiplier(),
        }
    }

    pub fn add_node(&mut self, coordinate: Coordinate, osm_id: OsmNodeId) -> NodeId {
        self.nodes.push(NodeRecord {
            coordinate,
            osm_id,
            bearings: Vec::new(),
        });
        (self.nodes.len() - 1) as NodeId
    }

    pub fn set_bearings(&mut self, node: NodeId, bearings: Vec<u16>) {
        if let Some(record) = self.nodes.get_mut(node as usize) {
            record.bearings = bearings;
        }
    }

    /// Intern a road name; identical names share an id
    pub fn add_name(&mut self, name: &str) -> NameId {
        if let Some(pos) = self.names.iter().position(|n| n == name) {
            return pos as NameId;
        }
        self.names.push(name.to_string());
        (self.names.len() - 1) as NameId
    }

    pub fn add_override(&mut self, maneuver: ManeuverOverride) {
        self.overrides
            .entry(maneuver.from_node)
            .or_default()
            .push(maneuver);
    }

    pub fn set_weight_multiplier(&mut self, multiplier: f64) {
        self.weight_multiplier = multiplier;
    }

    pub fn override_count(&self) -> usize {
        self.overrides.values().map(Vec::len).sum()
    }
}

impl GuidanceFacade for InMemoryFacade {
    fn coordinate_of_node(&self, node: NodeId) -> Option<Coordinate> {
        self.nodes.get(node as usize).map(|n| n.coordinate)
    }

    fn osm_node_id_of_node(&self, node: NodeId) -> Option<OsmNodeId> {
        self.nodes.get(node as usize).map(|n| n.osm_id)
    }

    fn name_for_id(&self, name_id: NameId) -> &str {
        self.names
            .get(name_id as usize)
            .map(String::as_str)
            .unwrap_or("")
    }

    fn bearings_at_node(&self, node: NodeId) -> &[u16] {
        self.nodes
            .get(node as usize)
            .map(|n| n.bearings.as_slice())
            .unwrap_or(&[])
    }

    fn overrides_that_start_at(&self, edge_based_node: EdgeBasedNodeId) -> &[ManeuverOverride] {
        self.overrides
            .get(&edge_based_node)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn weight_name(&self) -> &str {
        &self.weight_name
    }

    fn weight_multiplier(&self) -> f64 {
        self.weight_multiplier
    }
}
