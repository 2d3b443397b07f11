// THEORY:
// The dominant-background detector is the cheapest visual stage. Rendered fixtures
// usually paint a flat background, so a handful of probes near the corners and edge
// midpoints is enough to name it. Each probe is run through the domain's predicate
// bank and every satisfied color gets one vote. The vote rules are then walked in
// priority order; the first rule whose color reaches its own threshold wins.
//
// Thresholds differ per color. White needs more agreement than the others because a
// washed-out photo background reads as white far more often than it reads as green.

use crate::core_modules::palette::{ColorName, PredicateBank};
use crate::core_modules::raster::RasterImage;
use std::collections::BTreeMap;
use tracing::trace;

pub const BACKGROUND_RATIONALE: &str = "dominant background";

/// Probe coordinates for an image of the given signed width and height.
pub type ProbeSet = fn(i32, i32) -> Vec<(i32, i32)>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoteRule {
    pub color: ColorName,
    pub min_votes: usize,
    pub label: &'static str,
}

impl VoteRule {
    pub const fn new(color: ColorName, min_votes: usize, label: &'static str) -> Self {
        Self { color, min_votes, label }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundHit {
    pub label: &'static str,
    pub color: ColorName,
    pub votes: usize,
}

#[derive(Debug, Clone)]
pub struct BackgroundProfile {
    probes: ProbeSet,
    /// Evaluated top to bottom.
    rules: &'static [VoteRule],
}

impl BackgroundProfile {
    pub const fn new(probes: ProbeSet, rules: &'static [VoteRule]) -> Self {
        Self { probes, rules }
    }

    pub fn rules(&self) -> &'static [VoteRule] {
        self.rules
    }

    /// Per-color vote counts over every probe.
    pub fn tally(&self, raster: &RasterImage, bank: &PredicateBank) -> BTreeMap<ColorName, usize> {
        let mut votes = BTreeMap::new();
        for (x, y) in (self.probes)(raster.w(), raster.h()) {
            let sample = raster.sample(x, y);
            for color in bank.satisfied(&sample) {
                *votes.entry(color).or_insert(0) += 1;
            }
        }
        votes
    }

    pub fn detect(&self, raster: &RasterImage, bank: &PredicateBank) -> Option<BackgroundHit> {
        let votes = self.tally(raster, bank);
        trace!(?votes, "background votes");
        self.rules.iter().find_map(|rule| {
            let count = votes.get(&rule.color).copied().unwrap_or(0);
            (count >= rule.min_votes).then_some(BackgroundHit {
                label: rule.label,
                color: rule.color,
                votes: count,
            })
        })
    }
}

/// Single probe at (10,10), used for flat expression cards.
pub fn corner_probe(_w: i32, _h: i32) -> Vec<(i32, i32)> {
    vec![(10, 10)]
}

/// Four corners inset by 5, the top-edge midpoint and the left-edge midpoint.
pub fn perimeter_probes(w: i32, h: i32) -> Vec<(i32, i32)> {
    vec![
        (5, 5),
        (w - 5, 5),
        (5, h - 5),
        (w - 5, h - 5),
        (w / 2, 5),
        (5, h / 2),
    ]
}
