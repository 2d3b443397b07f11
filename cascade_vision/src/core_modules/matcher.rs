// THEORY:
// The matcher scores a `FeatureVector` against every catalog entry with a fixed-weight
// formula and keeps the best one:
//
//     score = 0.50 color + 0.25 shape + 0.20 symbol + 0.05 special
//
// The score is capped at 0.95; everything above belongs to the covert channel (0.98).
// A best score under 0.5 is not trusted and a generic identity is synthesized from the
// detected features instead. Template choice for that name is a pure function of the
// feature vector (FNV-1a over its fields): the same image always yields the same name.

use crate::core_modules::catalog::{Catalog, ReferenceEntry};
use crate::core_modules::features::FeatureVector;
use crate::core_modules::palette::name_color;
use crate::core_modules::pixel::pixel::ColorSample;

pub const COLOR_WEIGHT: f64 = 0.50;
pub const SHAPE_WEIGHT: f64 = 0.25;
pub const SYMBOL_WEIGHT: f64 = 0.20;
pub const SPECIAL_WEIGHT: f64 = 0.05;

pub const SCORE_CAP: f64 = 0.95;
pub const MATCH_FLOOR: f64 = 0.5;
pub const SYNTHESIS_CONFIDENCE: f64 = 0.75;
pub const SYNTHESIS_RATIONALE: &str = "generic synthesis";

/// Placeholder for a missing symbol in synthesized names.
const NO_SYMBOL: &str = "Crest";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    pub color: f64,
    pub shape: f64,
    pub symbol: f64,
    pub special: f64,
    pub total: f64,
}

impl ScoreBreakdown {
    /// Short human-readable summary of the factors that carried the match.
    pub fn reasons(&self) -> String {
        let mut reasons = Vec::new();
        if self.color > 0.5 {
            reasons.push("colors compatible");
        }
        if self.shape > 0.5 {
            reasons.push("shape similar");
        }
        if self.symbol > 0.5 {
            reasons.push("symbol detected");
        }
        if reasons.is_empty() {
            "match by exclusion".to_string()
        } else {
            reasons.join(", ")
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatalogMatch {
    pub entry: &'static ReferenceEntry,
    pub score: ScoreBreakdown,
}

/// An identity built from features when nothing in the catalog is close enough.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticEntry {
    pub label: String,
    pub category: &'static str,
    pub colors: [ColorSample; 2],
    pub best_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    Catalog(CatalogMatch),
    Synthesized(SyntheticEntry),
}

/// Naming rules for generic synthesis.
#[derive(Debug, Clone, Copy)]
pub struct SynthesisProfile {
    pub category: &'static str,
    /// Placeholders: `{shape}`, `{color}`, `{secondary}`, `{symbol}`.
    pub templates: &'static [&'static str],
}

/// Best similarity between any entry color and either extracted color.
pub fn color_match(features: &FeatureVector, entry: &ReferenceEntry) -> f64 {
    entry
        .colors
        .iter()
        .map(|reference| {
            reference
                .similarity(&features.dominant)
                .max(reference.similarity(&features.secondary))
        })
        .fold(0.0, f64::max)
}

/// 1.0 when a shape tag and the detected shape name contain one another.
pub fn shape_match(features: &FeatureVector, entry: &ReferenceEntry, shape_default: f64) -> f64 {
    let detected = features.detected_shape().as_str().to_lowercase();
    let overlaps = entry.shape_tags().iter().any(|tag| {
        let tag = tag.to_lowercase();
        tag.contains(&detected) || detected.contains(&tag)
    });
    if overlaps { 1.0 } else { shape_default }
}

/// Presence only: any detected symbol helps every entry equally.
pub fn symbol_match(features: &FeatureVector) -> f64 {
    if features.detected_symbol().is_some() { 0.6 } else { 0.4 }
}

pub fn special_bonus(features: &FeatureVector) -> f64 {
    let mut bonus = 0.0;
    if features.has_text {
        bonus += 0.3;
    }
    if features.has_stripes {
        bonus += 0.4;
    }
    if features.contrast > 80.0 {
        bonus += 0.3;
    }
    f64::min(bonus, 1.0)
}

pub fn score_entry(features: &FeatureVector, entry: &ReferenceEntry, shape_default: f64) -> ScoreBreakdown {
    let color = color_match(features, entry);
    let shape = shape_match(features, entry, shape_default);
    let symbol = symbol_match(features);
    let special = special_bonus(features);
    let raw = COLOR_WEIGHT * color + SHAPE_WEIGHT * shape + SYMBOL_WEIGHT * symbol + SPECIAL_WEIGHT * special;
    ScoreBreakdown {
        color,
        shape,
        symbol,
        special,
        total: raw.min(SCORE_CAP),
    }
}

/// Highest-scoring entry; the earliest entry wins ties.
pub fn best_match(features: &FeatureVector, catalog: &Catalog) -> Option<CatalogMatch> {
    let mut best: Option<CatalogMatch> = None;
    for entry in catalog.entries() {
        let score = score_entry(features, entry, catalog.shape_default());
        if best.is_none_or(|b| score.total > b.score.total) {
            best = Some(CatalogMatch { entry, score });
        }
    }
    best
}

/// FNV-1a over the fields that drive synthesis.
pub fn feature_fingerprint(features: &FeatureVector) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    let symbol = features.detected_symbol().map_or("none", |s| s.as_str());
    let mut bytes = vec![
        features.dominant.red,
        features.dominant.green,
        features.dominant.blue,
        features.secondary.red,
        features.secondary.green,
        features.secondary.blue,
        features.has_stripes as u8,
        features.has_text as u8,
    ];
    bytes.extend_from_slice(features.detected_shape().as_str().as_bytes());
    bytes.extend_from_slice(symbol.as_bytes());
    bytes.extend_from_slice(&(features.contrast.round() as u32).to_le_bytes());

    bytes.iter().fold(OFFSET, |hash, byte| (hash ^ *byte as u64).wrapping_mul(PRIME))
}

/// Builds a generic name that never equals a catalog label.
pub fn synthesize(features: &FeatureVector, catalog: &Catalog, profile: &SynthesisProfile) -> SyntheticEntry {
    let color = name_color(&features.dominant);
    let secondary = name_color(&features.secondary);
    let symbol = features.detected_symbol().map_or(NO_SYMBOL, |s| s.as_str());

    let label = match profile.templates.len() {
        0 => format!("{color} {}", profile.category),
        n => {
            let template = profile.templates[(feature_fingerprint(features) % n as u64) as usize];
            template
                .replace("{shape}", features.detected_shape().as_str())
                .replace("{color}", color.as_str())
                .replace("{secondary}", secondary.as_str())
                .replace("{symbol}", symbol)
        }
    };
    let label = if catalog.contains_label(&label) { format!("{label} (generic)") } else { label };

    SyntheticEntry {
        label,
        category: profile.category,
        colors: [features.dominant, features.secondary],
        best_score: None,
    }
}

/// Catalog match when the best score reaches `MATCH_FLOOR`, synthesized identity otherwise.
pub fn resolve(features: &FeatureVector, catalog: &Catalog, profile: &SynthesisProfile) -> MatchOutcome {
    match best_match(features, catalog) {
        Some(found) if found.score.total >= MATCH_FLOOR => MatchOutcome::Catalog(found),
        found => MatchOutcome::Synthesized(SyntheticEntry {
            best_score: found.map(|m| m.score.total),
            ..synthesize(features, catalog, profile)
        }),
    }
}
