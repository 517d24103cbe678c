//! Error types for the guidance pipeline
//!
//! Every variant is an internal contract violation, never a user-input error:
//! request validation happens before the search, long before guidance runs.
//! Non-matching overrides and empty raw paths are recovered locally and never
//! surface here.

use thiserror::Error;

use crate::facade::NodeId;

/// Result type for guidance operations
pub type Result<T> = std::result::Result<T, GuidanceError>;

/// Main error type for guidance operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GuidanceError {
    /// A via node of the raw path has no coordinate in the facade
    #[error("node {0} referenced by the path has no coordinate")]
    UnknownNode(NodeId),

    /// A post-processing stage left the leg without depart and arrive steps
    #[error("stage `{stage}` left {remaining} step(s); a leg needs at least depart and arrive")]
    EmptyStepSequence {
        stage: &'static str,
        remaining: usize,
    },

    /// Step geometry ranges do not cover the leg geometry exactly
    #[error("step ranges cover {covered} of {points} geometry points (first bad step: {step})")]
    GeometryOutOfSync {
        step: usize,
        covered: usize,
        points: usize,
    },

    /// An override carries the `invalid` turn type
    #[error("maneuver override at via node {via_node} has the invalid turn type")]
    InvalidOverrideType { via_node: NodeId },

    /// No valid route in the search result
    #[error("search result contains no valid route")]
    NoRoute,

    /// A leg index outside the route was requested
    #[error("leg {index} requested but the route has {legs} leg(s)")]
    LegOutOfRange { index: usize, legs: usize },
}
