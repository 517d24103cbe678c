//! Per-point leg annotations

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::facade::OsmNodeId;
use crate::guidance::LegGeometry;

/// Set of annotation series to emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct AnnotationsType(u8);

const NAMES: [(&str, AnnotationsType); 6] = [
    ("speed", AnnotationsType::SPEED),
    ("duration", AnnotationsType::DURATION),
    ("distance", AnnotationsType::DISTANCE),
    ("weight", AnnotationsType::WEIGHT),
    ("datasources", AnnotationsType::DATASOURCES),
    ("nodes", AnnotationsType::NODES),
];

impl AnnotationsType {
    pub const NONE: Self = Self(0);
    pub const SPEED: Self = Self(1);
    pub const DURATION: Self = Self(1 << 1);
    pub const DISTANCE: Self = Self(1 << 2);
    pub const WEIGHT: Self = Self(1 << 3);
    pub const DATASOURCES: Self = Self(1 << 4);
    pub const NODES: Self = Self(1 << 5);
    pub const ALL: Self = Self(0b11_1111);

    pub fn contains(self, other: Self) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for AnnotationsType {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown annotation `{0}`")]
pub struct UnknownAnnotation(pub String);

impl FromStr for AnnotationsType {
    type Err = UnknownAnnotation;

    /// Comma separated names, or `true`/`all` for everything
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut selected = AnnotationsType::NONE;
        for name in s.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            if name == "true" || name == "all" {
                return Ok(AnnotationsType::ALL);
            }
            let (_, flag) = NAMES
                .iter()
                .find(|(known, _)| *known == name)
                .ok_or_else(|| UnknownAnnotation(name.to_string()))?;
            selected = selected | *flag;
        }
        Ok(selected)
    }
}

impl TryFrom<Vec<String>> for AnnotationsType {
    type Error = UnknownAnnotation;

    fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
        names.join(",").parse()
    }
}

impl From<AnnotationsType> for Vec<String> {
    fn from(selected: AnnotationsType) -> Self {
        NAMES
            .iter()
            .filter(|(_, flag)| selected.contains(*flag))
            .map(|(name, _)| name.to_string())
            .collect()
    }
}

/// Series over the gaps (or, for `nodes`, the points) of one leg
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LegAnnotation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<Vec<Option<f64>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datasources: Option<Vec<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nodes: Option<Vec<OsmNodeId>>,
}

/// m/s rounded to one decimal; unknown for zero-duration gaps
fn speed(distance: f64, duration: f64) -> Option<f64> {
    if duration <= 0.0 {
        return None;
    }
    Some((distance / duration * 10.0).round() / 10.0)
}

pub fn annotate_leg(geometry: &LegGeometry, selected: AnnotationsType) -> LegAnnotation {
    let series = |flag: AnnotationsType| selected.contains(flag);
    let gaps = &geometry.annotations;

    LegAnnotation {
        speed: series(AnnotationsType::SPEED)
            .then(|| gaps.iter().map(|a| speed(a.distance, a.duration)).collect()),
        duration: series(AnnotationsType::DURATION)
            .then(|| gaps.iter().map(|a| a.duration).collect()),
        distance: series(AnnotationsType::DISTANCE)
            .then(|| gaps.iter().map(|a| a.distance).collect()),
        weight: series(AnnotationsType::WEIGHT).then(|| gaps.iter().map(|a| a.weight).collect()),
        datasources: series(AnnotationsType::DATASOURCES)
            .then(|| gaps.iter().map(|a| a.datasource).collect()),
        nodes: series(AnnotationsType::NODES).then(|| geometry.osm_node_ids.clone()),
    }
}
