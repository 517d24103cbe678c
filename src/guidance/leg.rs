//! Leg totals and summary

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::facade::{GuidanceFacade, NameId};
use crate::path::{PathSegment, Snap};

use super::geometry::LegGeometry;
use super::steps::RouteStep;

/// Roads named in a leg summary
const SUMMARY_SIZE: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteLeg {
    /// Meters
    pub distance: f64,
    /// Seconds
    pub duration: f64,
    pub weight: f64,
    pub summary: String,
    pub steps: Vec<RouteStep>,
}

impl RouteLeg {
    /// Steps a turn-by-turn list would show
    pub fn announced_steps(&self) -> impl Iterator<Item = &RouteStep> {
        self.steps.iter().filter(|step| step.is_announced())
    }
}

/// Totals of one leg; `steps` is filled in later by the caller.
///
/// Costs are the path sums plus the target offset minus the part of the source
/// segment behind the snap, clamped at zero.
#[allow(clippy::too_many_arguments)]
pub fn assemble_leg<F: GuidanceFacade + ?Sized>(
    facade: &F,
    path: &[PathSegment],
    geometry: &LegGeometry,
    source: &Snap,
    target: &Snap,
    source_reversed: bool,
    target_reversed: bool,
    needs_summary: bool,
) -> RouteLeg {
    let path_duration: u32 = path.iter().map(|s| s.duration_until_turn).sum();
    let path_weight: u32 = path.iter().map(|s| s.weight_until_turn).sum();

    let duration = (path_duration + target.duration(target_reversed))
        .saturating_sub(source.duration(source_reversed));
    let weight = (path_weight + target.weight(target_reversed))
        .saturating_sub(source.weight(source_reversed));

    let summary = if needs_summary {
        summarize(facade, path, target, target_reversed)
    } else {
        String::new()
    };

    RouteLeg {
        distance: geometry.total_distance(),
        duration: duration as f64 / 10.0,
        weight: weight as f64 / facade.weight_multiplier(),
        summary,
        steps: Vec::new(),
    }
}

/// The longest-travelled named roads, in the order they are driven
fn summarize<F: GuidanceFacade + ?Sized>(
    facade: &F,
    path: &[PathSegment],
    target: &Snap,
    target_reversed: bool,
) -> String {
    // name -> (first position, accumulated duration)
    let mut totals: FxHashMap<NameId, (usize, u32)> = FxHashMap::default();
    let segments = path
        .iter()
        .map(|s| (s.name_id, s.duration_until_turn))
        .chain(std::iter::once((target.name_id, target.duration(target_reversed))));

    for (position, (name_id, duration)) in segments.enumerate() {
        if facade.name_for_id(name_id).is_empty() {
            continue;
        }
        let entry = totals.entry(name_id).or_insert((position, 0));
        entry.1 += duration;
    }

    let mut ranked: Vec<(NameId, usize, u32)> = totals
        .into_iter()
        .map(|(name, (position, duration))| (name, position, duration))
        .collect();
    ranked.sort_by(|a, b| b.2.cmp(&a.2).then(a.1.cmp(&b.1)));
    ranked.truncate(SUMMARY_SIZE);
    ranked.sort_by_key(|&(_, position, _)| position);

    ranked
        .iter()
        .map(|&(name, _, _)| facade.name_for_id(name))
        .collect::<Vec<_>>()
        .join(", ")
}
