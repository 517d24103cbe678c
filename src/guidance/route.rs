//! Route totals and overview geometry

use geo::{algorithm::simplify::Simplify, Coord, LineString};
use serde::Serialize;

use crate::geo::Coordinate;

use super::geometry::LegGeometry;
use super::leg::RouteLeg;

/// Simplification tolerance in degrees (about 1 m at the equator)
const OVERVIEW_TOLERANCE: f64 = 0.00001;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Route {
    /// Meters
    pub distance: f64,
    /// Seconds
    pub duration: f64,
    pub weight: f64,
}

pub fn assemble_route(legs: &[RouteLeg]) -> Route {
    legs.iter().fold(Route::default(), |route, leg| Route {
        distance: route.distance + leg.distance,
        duration: route.duration + leg.duration,
        weight: route.weight + leg.weight,
    })
}

/// Whole-route polyline; consecutive legs share their joint point once.
pub fn assemble_overview(geometries: &[LegGeometry], simplified: bool) -> Vec<Coordinate> {
    let mut overview: Vec<Coordinate> = Vec::new();
    for geometry in geometries {
        let skip = match (overview.last(), geometry.locations.first()) {
            (Some(last), Some(first)) if last == first => 1,
            _ => 0,
        };
        overview.extend(geometry.locations.iter().skip(skip));
    }

    if !simplified || overview.len() < 3 {
        return overview;
    }

    let line: LineString<f64> = overview
        .iter()
        .map(|c| Coord {
            x: c.lon(),
            y: c.lat(),
        })
        .collect();
    line.simplify(&OVERVIEW_TOLERANCE)
        .0
        .into_iter()
        .map(|c| Coordinate::from_degrees(c.x, c.y))
        .collect()
}
