//! Guidance: from an unpacked path to announced steps
//!
//! # Per-leg flow
//!
//! 1. [`geometry::assemble_geometry`] - point sequence with per-gap annotations
//! 2. [`leg::assemble_leg`] - leg totals and summary
//! 3. [`steps::assemble_steps`] - one step per instruction-bearing turn
//! 4. [`pipeline::post_process`] - fixed-order cleanup of steps and geometry
//! 5. [`overrides::apply_maneuver_overrides`] - at most one map-authored correction
//!
//! Legs are independent; [`route`] combines them afterwards.

pub mod collapse;
pub mod geometry;
pub mod intersections;
pub mod lanes;
pub mod leg;
pub mod overrides;
pub mod pipeline;
pub mod post_processing;
pub mod route;
pub mod steps;

#[cfg(test)]
pub(crate) mod test_support;

pub use geometry::{assemble_geometry, Annotation, LegGeometry};
pub use leg::{assemble_leg, RouteLeg};
pub use overrides::{apply_maneuver_overrides, OverrideMatch, MAX_MANEUVER_LOOKAHEAD};
pub use pipeline::{post_process, Stage, PIPELINE};
pub use route::{assemble_overview, assemble_route, Route};
pub use steps::{assemble_steps, Intersection, RouteStep, StepManeuver};
