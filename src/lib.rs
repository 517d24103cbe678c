//! Turn-by-turn guidance for a road routing engine
//!
//! Takes the unpacked result of a shortest-path search and produces legs,
//! steps and geometry, then applies map-authored maneuver overrides.

pub mod annotations;
pub mod api;
pub mod error;
pub mod facade;
pub mod geo;
pub mod guidance;
pub mod instruction;
pub mod path;
pub mod scenario;

pub use api::{OverviewType, RouteApi, RouteParameters, RouteResponse};
pub use error::{GuidanceError, Result};
pub use facade::{GuidanceFacade, InMemoryFacade, ManeuverOverride};
pub use scenario::Scenario;
