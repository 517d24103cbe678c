//! Route response assembly
//!
//! Runs the guidance flow for every leg of every search result and shapes the
//! outcome into serializable response objects. Legs and routes are independent
//! and processed on the rayon pool.

use std::str::FromStr;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::annotations::{annotate_leg, AnnotationsType, LegAnnotation};
use crate::error::{GuidanceError, Result};
use crate::facade::GuidanceFacade;
use crate::geo::{haversine_distance, Coordinate};
use crate::guidance::{
    apply_maneuver_overrides, assemble_geometry, assemble_leg, assemble_overview,
    assemble_route, assemble_steps, post_process, LegGeometry, RouteLeg, RouteStep,
};
use crate::path::{ManyRoutes, RawRoute, Snap};

/// Which overview geometry to attach to each route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverviewType {
    False,
    #[default]
    Simplified,
    Full,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown overview `{0}` (expected simplified, full or false)")]
pub struct UnknownOverview(pub String);

impl FromStr for OverviewType {
    type Err = UnknownOverview;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "false" => Ok(OverviewType::False),
            "simplified" => Ok(OverviewType::Simplified),
            "full" => Ok(OverviewType::Full),
            other => Err(UnknownOverview(other.to_string())),
        }
    }
}

fn default_steps() -> bool {
    true
}

/// Request options that shape the response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteParameters {
    #[serde(default = "default_steps")]
    pub steps: bool,
    #[serde(default)]
    pub annotations: bool,
    /// Series to emit when `annotations` is set; empty means all
    #[serde(default)]
    pub annotations_type: AnnotationsType,
    #[serde(default)]
    pub overview: OverviewType,
}

impl Default for RouteParameters {
    fn default() -> Self {
        Self {
            steps: true,
            annotations: false,
            annotations_type: AnnotationsType::NONE,
            overview: OverviewType::Simplified,
        }
    }
}

impl RouteParameters {
    pub fn selected_annotations(&self) -> AnnotationsType {
        if !self.annotations {
            AnnotationsType::NONE
        } else if self.annotations_type.is_empty() {
            AnnotationsType::ALL
        } else {
            self.annotations_type
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Waypoint {
    pub name: String,
    pub location: Coordinate,
    /// Meters between the input coordinate and its snap
    pub distance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepObject {
    #[serde(flatten)]
    pub step: RouteStep,
    pub geometry: Vec<Coordinate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegObject {
    pub distance: f64,
    pub duration: f64,
    pub weight: f64,
    pub summary: String,
    pub steps: Vec<StepObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<LegAnnotation>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteObject {
    pub distance: f64,
    pub duration: f64,
    pub weight: f64,
    pub weight_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Vec<Coordinate>>,
    pub legs: Vec<LegObject>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteResponse {
    pub code: String,
    pub waypoints: Vec<Waypoint>,
    pub routes: Vec<RouteObject>,
}

/// Turns search results into a route response
pub struct RouteApi<'a, F: GuidanceFacade + ?Sized> {
    facade: &'a F,
    parameters: &'a RouteParameters,
}

impl<'a, F: GuidanceFacade + ?Sized> RouteApi<'a, F> {
    pub fn new(facade: &'a F, parameters: &'a RouteParameters) -> Self {
        Self { facade, parameters }
    }

    /// Build the response for the main route and its alternatives.
    ///
    /// Invalid routes are skipped; any failing leg fails the whole response.
    pub fn make_response(&self, results: &ManyRoutes) -> Result<RouteResponse> {
        let valid: Vec<&RawRoute> = results
            .routes
            .iter()
            .enumerate()
            .filter_map(|(index, route)| {
                if route.is_valid() {
                    Some(route)
                } else {
                    warn!(route = index, "skipping route without legs");
                    None
                }
            })
            .collect();

        let Some(first) = valid.first() else {
            return Err(GuidanceError::NoRoute);
        };
        let waypoints = self.make_waypoints(first);

        let routes = valid
            .par_iter()
            .map(|route| self.make_route(route))
            .collect::<Result<Vec<_>>>()?;

        debug!(routes = routes.len(), waypoints = waypoints.len(), "route response assembled");
        Ok(RouteResponse {
            code: "Ok".to_string(),
            waypoints,
            routes,
        })
    }

    fn make_waypoint(&self, snap: &Snap) -> Waypoint {
        Waypoint {
            name: self.facade.name_for_id(snap.name_id).to_string(),
            location: snap.location,
            distance: haversine_distance(snap.input(), snap.location),
        }
    }

    fn make_waypoints(&self, route: &RawRoute) -> Vec<Waypoint> {
        let mut waypoints: Vec<Waypoint> = route
            .legs
            .iter()
            .map(|leg| self.make_waypoint(&leg.source))
            .collect();
        if let Some(last) = route.legs.last() {
            waypoints.push(self.make_waypoint(&last.target));
        }
        waypoints
    }

    fn make_route(&self, route: &RawRoute) -> Result<RouteObject> {
        let legs = (0..route.leg_count())
            .into_par_iter()
            .map(|index| self.make_leg(route, index))
            .collect::<Result<Vec<_>>>()?;

        let (legs, geometries): (Vec<RouteLeg>, Vec<LegGeometry>) = legs.into_iter().unzip();
        let totals = assemble_route(&legs);

        let geometry = match self.parameters.overview {
            OverviewType::False => None,
            OverviewType::Simplified => Some(assemble_overview(&geometries, true)),
            OverviewType::Full => Some(assemble_overview(&geometries, false)),
        };

        let selected = self.parameters.selected_annotations();
        let legs = legs
            .into_iter()
            .zip(&geometries)
            .map(|(leg, geometry)| LegObject {
                distance: leg.distance,
                duration: leg.duration,
                weight: leg.weight,
                summary: leg.summary,
                steps: leg
                    .steps
                    .into_iter()
                    .map(|step| StepObject {
                        geometry: geometry.step_polyline(&step).to_vec(),
                        step,
                    })
                    .collect(),
                annotation: (!selected.is_empty()).then(|| annotate_leg(geometry, selected)),
            })
            .collect();

        Ok(RouteObject {
            distance: totals.distance,
            duration: totals.duration,
            weight: totals.weight,
            weight_name: self.facade.weight_name().to_string(),
            geometry,
            legs,
        })
    }

    /// geometry, leg totals, steps, post-processing, overrides; in that order
    fn make_leg(&self, route: &RawRoute, index: usize) -> Result<(RouteLeg, LegGeometry)> {
        let path = route.raw_path(index)?;
        let snaps = route.boundary_snaps(index)?;

        let geometry = assemble_geometry(
            self.facade,
            path,
            snaps.source,
            snaps.target,
            snaps.source_reversed,
            snaps.target_reversed,
        )?;
        let mut leg = assemble_leg(
            self.facade,
            path,
            &geometry,
            snaps.source,
            snaps.target,
            snaps.source_reversed,
            snaps.target_reversed,
            self.parameters.steps,
        );

        if !self.parameters.steps {
            return Ok((leg, geometry));
        }

        let steps = assemble_steps(
            self.facade,
            path,
            &geometry,
            snaps.source,
            snaps.target,
            snaps.source_reversed,
            snaps.target_reversed,
        );
        let (mut steps, geometry) = post_process(steps, geometry, &snaps)?;
        apply_maneuver_overrides(self.facade, &mut steps, &geometry, snaps.final_node())?;

        debug!(leg = index, steps = steps.len(), points = geometry.size(), "leg assembled");
        leg.steps = steps;
        Ok((leg, geometry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guidance::test_support::LegFixture;
    use crate::instruction::{DirectionModifier, TurnType};
    use crate::path::RawLeg;

    fn fixture() -> LegFixture {
        LegFixture::new(&[(0.0, 0.0), (0.001, 0.0), (0.001, -0.001)])
            .turn(1, TurnType::Turn, DirectionModifier::Right)
            .names(&["Main", "Oak"])
    }

    fn results(fixture: &LegFixture) -> ManyRoutes {
        ManyRoutes {
            routes: vec![RawRoute {
                legs: vec![RawLeg {
                    source: fixture.source.clone(),
                    target: fixture.target.clone(),
                    source_reversed: false,
                    target_reversed: false,
                    path: fixture.path.clone(),
                }],
            }],
        }
    }

    #[test]
    fn test_parameter_defaults() {
        let parameters: RouteParameters = serde_json::from_str("{}").unwrap();
        assert_eq!(parameters, RouteParameters::default());
        assert_eq!(parameters.selected_annotations(), AnnotationsType::NONE);

        let parameters: RouteParameters =
            serde_json::from_str(r#"{"annotations": true, "overview": "full"}"#).unwrap();
        assert_eq!(parameters.selected_annotations(), AnnotationsType::ALL);
        assert_eq!(parameters.overview, OverviewType::Full);
        assert!("sometimes".parse::<OverviewType>().is_err());
    }

    #[test]
    fn test_response_shape() {
        let fixture = fixture();
        let parameters = RouteParameters {
            annotations: true,
            annotations_type: AnnotationsType::DURATION,
            ..RouteParameters::default()
        };
        let response = RouteApi::new(&fixture.facade, &parameters)
            .make_response(&results(&fixture))
            .unwrap();

        assert_eq!(response.code, "Ok");
        assert_eq!(response.waypoints.len(), 2);
        assert_eq!(response.waypoints[0].name, "Main");
        assert_eq!(response.routes.len(), 1);

        let route = &response.routes[0];
        assert_eq!(route.weight_name, "duration");
        assert_eq!(route.geometry.as_ref().map(Vec::len), Some(3));
        let leg = &route.legs[0];
        assert_eq!(leg.summary, "Main, Oak");
        assert_eq!(leg.steps.len(), 3);
        assert_eq!(leg.steps[0].geometry.len(), 2);
        assert_eq!(leg.steps[2].geometry.len(), 1);
        let annotation = leg.annotation.as_ref().unwrap();
        assert_eq!(annotation.duration.as_ref().map(Vec::len), Some(2));
        assert!(annotation.speed.is_none());
        assert!((route.duration - leg.duration).abs() < 1e-9);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["routes"][0]["legs"][0]["steps"][1]["maneuver"]["instruction"]["type"], "turn");
        assert_eq!(json["routes"][0]["legs"][0]["steps"][1]["name"], "Oak");
    }

    #[test]
    fn test_without_steps_and_overview() {
        let fixture = fixture();
        let parameters = RouteParameters {
            steps: false,
            overview: OverviewType::False,
            ..RouteParameters::default()
        };
        let response = RouteApi::new(&fixture.facade, &parameters)
            .make_response(&results(&fixture))
            .unwrap();
        let route = &response.routes[0];
        assert!(route.geometry.is_none());
        assert!(route.legs[0].steps.is_empty());
        assert!(route.legs[0].summary.is_empty());
    }

    #[test]
    fn test_invalid_routes_are_skipped() {
        let fixture = fixture();
        let mut many = results(&fixture);
        many.routes.insert(0, RawRoute { legs: Vec::new() });
        let parameters = RouteParameters::default();
        let response = RouteApi::new(&fixture.facade, &parameters)
            .make_response(&many)
            .unwrap();
        assert_eq!(response.routes.len(), 1);

        let empty = ManyRoutes::default();
        let err = RouteApi::new(&fixture.facade, &parameters)
            .make_response(&empty)
            .unwrap_err();
        assert_eq!(err, GuidanceError::NoRoute);
    }

    #[test]
    fn test_failing_leg_fails_response() {
        let fixture = fixture();
        let mut many = results(&fixture);
        many.routes[0].legs[0].path[0].turn_via_node = 404;
        let parameters = RouteParameters::default();
        let err = RouteApi::new(&fixture.facade, &parameters)
            .make_response(&many)
            .unwrap_err();
        assert_eq!(err, GuidanceError::UnknownNode(404));
    }
}
