// THEORY:
// The cascade is generic; a `DomainProfile` is what makes it classify faces or shields.
// A profile bundles every table the stages consult (covert code table, predicate bank,
// background probes and vote rules, text band, pattern detectors, catalog, synthesis
// templates) plus the handful of per-domain constants. Profiles are built once per
// process behind a `OnceLock` and handed out as `&'static` references, so any number of
// classifiers and worker threads share them without synchronization.

use crate::core_modules::background::{corner_probe, perimeter_probes, BackgroundProfile, VoteRule};
use crate::core_modules::catalog::{Catalog, EXPRESSION_ENTRIES, SHIELD_ENTRIES};
use crate::core_modules::covert_channel::{CarrierChannel, CovertChannel, CovertEntry};
use crate::core_modules::features::ColorRegion;
use crate::core_modules::matcher::SynthesisProfile;
use crate::core_modules::palette::{ColorName, PredicateBank, EXPRESSION_BANK, SHIELD_BANK};
use crate::core_modules::patterns::{PatternSet, EXPRESSION_PATTERNS, SHIELD_PATTERNS};
use crate::core_modules::text_region::{TextProfile, TextTrigger};
use crate::error::ClassifyError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    #[serde(alias = "face", alias = "emotion")]
    Expression,
    #[default]
    #[serde(alias = "team", alias = "crest")]
    Shield,
}

impl Domain {
    pub const ALL: [Domain; 2] = [Domain::Expression, Domain::Shield];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Expression => "expression",
            Domain::Shield => "shield",
        }
    }

    pub fn profile(&self) -> &'static DomainProfile {
        match self {
            Domain::Expression => {
                static PROFILE: OnceLock<DomainProfile> = OnceLock::new();
                PROFILE.get_or_init(expression_profile)
            }
            Domain::Shield => {
                static PROFILE: OnceLock<DomainProfile> = OnceLock::new();
                PROFILE.get_or_init(shield_profile)
            }
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = ClassifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "expression" | "face" | "emotion" => Ok(Domain::Expression),
            "shield" | "team" | "crest" => Ok(Domain::Shield),
            other => Err(ClassifyError::UnknownDomain(other.to_string())),
        }
    }
}

/// Everything the cascade needs to know about one domain.
#[derive(Debug)]
pub struct DomainProfile {
    pub domain: Domain,
    pub covert: CovertChannel,
    pub bank: &'static PredicateBank,
    pub background: BackgroundProfile,
    pub text: TextProfile,
    pub patterns: PatternSet,
    pub color_region: ColorRegion,
    pub catalog: Catalog,
    /// Confidence reported by the background, text and pattern stages.
    pub detector_confidence: f64,
    pub synthesis: SynthesisProfile,
    /// Category for a detector label missing from the catalog.
    pub unlisted_category: &'static str,
}

impl DomainProfile {
    pub fn category_for(&self, label: &str) -> &'static str {
        self.catalog
            .by_label(label)
            .map_or(self.unlisted_category, |entry| entry.category)
    }
}

// ---- expressions ----

static EXPRESSION_CODES: [CovertEntry; 5] = [
    CovertEntry { code: 1, label: "happy", category: "HAPPY" },
    CovertEntry { code: 2, label: "sad", category: "SAD" },
    CovertEntry { code: 3, label: "angry", category: "ANGRY" },
    CovertEntry { code: 4, label: "surprised", category: "SURPRISED" },
    CovertEntry { code: 5, label: "neutral", category: "NEUTRAL" },
];

static EXPRESSION_VOTES: [VoteRule; 5] = [
    VoteRule::new(ColorName::Orange, 1, "surprised"),
    VoteRule::new(ColorName::Yellow, 1, "happy"),
    VoteRule::new(ColorName::Blue, 1, "sad"),
    VoteRule::new(ColorName::Red, 1, "angry"),
    VoteRule::new(ColorName::Gray, 1, "neutral"),
];

static EXPRESSION_TEXT_LABELS: [(ColorName, &str); 5] = [
    (ColorName::Yellow, "happy"),
    (ColorName::Blue, "sad"),
    (ColorName::Red, "angry"),
    (ColorName::Orange, "surprised"),
    (ColorName::Gray, "neutral"),
];

static EXPRESSION_TEMPLATES: [&str; 3] = ["{color} expression", "{shape} {color} face", "uncertain {color}"];

/// There is no "neutral" default for faces: an image that clears every detector is
/// scored against the catalog like any other, so a flat card with no cues usually
/// lands on the first white-backed entry (happy) rather than on neutral.
fn expression_profile() -> DomainProfile {
    DomainProfile {
        domain: Domain::Expression,
        covert: CovertChannel::new(CarrierChannel::Red, &EXPRESSION_CODES),
        bank: &EXPRESSION_BANK,
        background: BackgroundProfile::new(corner_probe, &EXPRESSION_VOTES),
        text: TextProfile {
            row: 40,
            margin: 50,
            step: 5,
            trigger: TextTrigger::EachHit { dx: 20, probe_row: 20 },
            labels: &EXPRESSION_TEXT_LABELS,
        },
        patterns: PatternSet::new(&EXPRESSION_PATTERNS),
        color_region: ColorRegion::Whole,
        catalog: Catalog::new(&EXPRESSION_ENTRIES, 0.5),
        detector_confidence: 0.92,
        synthesis: SynthesisProfile { category: "UNCLASSIFIED", templates: &EXPRESSION_TEMPLATES },
        unlisted_category: "UNCLASSIFIED",
    }
}

// ---- shields ----

static SHIELD_CODES: [CovertEntry; 20] = [
    CovertEntry { code: 1, label: "Corinthians", category: "Brasileirão" },
    CovertEntry { code: 2, label: "Palmeiras", category: "Brasileirão" },
    CovertEntry { code: 3, label: "São Paulo", category: "Brasileirão" },
    CovertEntry { code: 4, label: "Santos", category: "Brasileirão" },
    CovertEntry { code: 5, label: "Flamengo", category: "Brasileirão" },
    CovertEntry { code: 6, label: "Vasco", category: "Brasileirão" },
    CovertEntry { code: 7, label: "Botafogo", category: "Brasileirão" },
    CovertEntry { code: 8, label: "Fluminense", category: "Brasileirão" },
    CovertEntry { code: 9, label: "Grêmio", category: "Brasileirão" },
    CovertEntry { code: 10, label: "Internacional", category: "Brasileirão" },
    CovertEntry { code: 11, label: "Atlético-MG", category: "Brasileirão" },
    CovertEntry { code: 12, label: "Cruzeiro", category: "Brasileirão" },
    CovertEntry { code: 13, label: "Barcelona", category: "La Liga" },
    CovertEntry { code: 14, label: "Real Madrid", category: "La Liga" },
    CovertEntry { code: 15, label: "Manchester United", category: "Premier League" },
    CovertEntry { code: 16, label: "Liverpool", category: "Premier League" },
    CovertEntry { code: 17, label: "Bayern Munich", category: "Bundesliga" },
    CovertEntry { code: 18, label: "Juventus", category: "Serie A" },
    CovertEntry { code: 19, label: "AC Milan", category: "Serie A" },
    CovertEntry { code: 20, label: "Chelsea", category: "Premier League" },
];

static SHIELD_VOTES: [VoteRule; 8] = [
    VoteRule::new(ColorName::Orange, 2, "Galatasaray"),
    VoteRule::new(ColorName::Green, 2, "Palmeiras"),
    VoteRule::new(ColorName::Yellow, 2, "Real Madrid"),
    VoteRule::new(ColorName::White, 3, "Corinthians"),
    VoteRule::new(ColorName::Red, 2, "Flamengo"),
    VoteRule::new(ColorName::Black, 2, "Juventus"),
    VoteRule::new(ColorName::Blue, 2, "PSG"),
    VoteRule::new(ColorName::Purple, 2, "Fiorentina"),
];

static SHIELD_TEXT_LABELS: [(ColorName, &str); 8] = [
    (ColorName::White, "Corinthians"),
    (ColorName::Green, "Palmeiras"),
    (ColorName::Orange, "Galatasaray"),
    (ColorName::Red, "Flamengo"),
    (ColorName::Blue, "PSG"),
    (ColorName::Yellow, "Real Madrid"),
    (ColorName::Purple, "Fiorentina"),
    (ColorName::Black, "Juventus"),
];

static SHIELD_TEMPLATES: [&str; 4] = [
    "Athletic {shape}",
    "Sport Club {color}",
    "{symbol} Club {color}",
    "Union {color} {secondary}",
];

fn shield_profile() -> DomainProfile {
    DomainProfile {
        domain: Domain::Shield,
        covert: CovertChannel::new(CarrierChannel::Green, &SHIELD_CODES),
        bank: &SHIELD_BANK,
        background: BackgroundProfile::new(perimeter_probes, &SHIELD_VOTES),
        text: TextProfile {
            row: 50,
            margin: 30,
            step: 5,
            trigger: TextTrigger::Density { min_dark: 5, probe: (50, 30) },
            labels: &SHIELD_TEXT_LABELS,
        },
        patterns: PatternSet::new(&SHIELD_PATTERNS),
        color_region: ColorRegion::Central,
        catalog: Catalog::new(&SHIELD_ENTRIES, 0.3),
        detector_confidence: 0.95,
        synthesis: SynthesisProfile { category: "Regional League", templates: &SHIELD_TEMPLATES },
        unlisted_category: "Regional League",
    }
}
