//! Fixed-point coordinates and spherical helpers
//!
//! Coordinates are stored like the NBG polylines: 1e-7 degree integers. Exact
//! equality is what the override applicator matches via nodes on, so two
//! coordinates are the same point only if their fixed-point values agree.

use geo::{Bearing, Distance, Haversine, Point};
use serde::{Deserialize, Serialize};

/// Fixed-point scale (1e-7 degrees)
pub const COORDINATE_PRECISION: f64 = 1e7;

/// A point in WGS84, serialized as `[lon, lat]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinate {
    pub lon_fxp: i32,
    pub lat_fxp: i32,
}

impl Coordinate {
    pub fn from_degrees(lon: f64, lat: f64) -> Self {
        Self {
            lon_fxp: (lon * COORDINATE_PRECISION).round() as i32,
            lat_fxp: (lat * COORDINATE_PRECISION).round() as i32,
        }
    }

    pub fn lon(&self) -> f64 {
        self.lon_fxp as f64 / COORDINATE_PRECISION
    }

    pub fn lat(&self) -> f64 {
        self.lat_fxp as f64 / COORDINATE_PRECISION
    }

    pub fn to_point(self) -> Point<f64> {
        Point::new(self.lon(), self.lat())
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from(lon_lat: [f64; 2]) -> Self {
        Coordinate::from_degrees(lon_lat[0], lon_lat[1])
    }
}

impl From<Coordinate> for [f64; 2] {
    fn from(coordinate: Coordinate) -> Self {
        [coordinate.lon(), coordinate.lat()]
    }
}

/// Great-circle distance in meters
pub fn haversine_distance(a: Coordinate, b: Coordinate) -> f64 {
    Haversine::distance(a.to_point(), b.to_point())
}

fn bearing_degrees(from: Coordinate, to: Coordinate) -> f64 {
    if from == to {
        return 0.0;
    }
    Haversine::bearing(from.to_point(), to.to_point()).rem_euclid(360.0)
}

/// Initial bearing from `from` to `to`, whole degrees clockwise from north.
/// Coincident points have bearing 0.
pub fn bearing(from: Coordinate, to: Coordinate) -> u16 {
    (bearing_degrees(from, to).round() as u16) % 360
}

/// Turn angle at `via` when travelling `from -> via -> to`.
///
/// 180 is straight on, values below 180 turn right, values above turn left,
/// 0 is a full U-turn. Result is in `[0, 360)`.
pub fn turn_angle(from: Coordinate, via: Coordinate, to: Coordinate) -> f64 {
    let inbound = bearing_degrees(from, via);
    let outbound = bearing_degrees(via, to);
    (180.0 - (outbound - inbound)).rem_euclid(360.0)
}

/// Smallest absolute difference between two bearings, in degrees
pub fn angular_deviation(a: u16, b: u16) -> u16 {
    let diff = (a as i32 - b as i32).rem_euclid(360) as u16;
    diff.min(360 - diff)
}
