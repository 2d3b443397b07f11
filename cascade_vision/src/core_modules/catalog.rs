// THEORY:
// The catalog is the static table of identities the matcher can name. Every entry is
// plain constant data (label, grouping tag, reference colors, tags) so the tables can
// live in `static` items and be shared read-only by every classification call without
// locking. A `Catalog` wraps one table together with the domain's neutral shape score.

use crate::core_modules::features::Shape;
use crate::core_modules::pixel::pixel::ColorSample;

/// One known identity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceEntry {
    pub label: &'static str,
    /// League for shields, upper-case expression name for faces.
    pub category: &'static str,
    pub country: Option<&'static str>,
    /// Ordered reference colors, most characteristic first.
    pub colors: &'static [ColorSample],
    pub keywords: &'static [&'static str],
    /// Outline tag matched textually alongside `shape`.
    pub outline: &'static str,
    pub shape: Shape,
    pub emblem: Option<&'static str>,
}

impl ReferenceEntry {
    pub fn shape_tags(&self) -> [&'static str; 2] {
        [self.outline, self.shape.as_str()]
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Catalog {
    entries: &'static [ReferenceEntry],
    /// Shape score for entries whose tags do not overlap the detected shape.
    shape_default: f64,
}

impl Catalog {
    pub const fn new(entries: &'static [ReferenceEntry], shape_default: f64) -> Self {
        Self { entries, shape_default }
    }

    pub fn entries(&self) -> &'static [ReferenceEntry] {
        self.entries
    }

    pub fn shape_default(&self) -> f64 {
        self.shape_default
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn by_label(&self, label: &str) -> Option<&'static ReferenceEntry> {
        self.entries.iter().find(|entry| entry.label == label)
    }

    pub fn contains_label(&self, label: &str) -> bool {
        self.by_label(label).is_some()
    }
}

const WHITE: ColorSample = ColorSample::WHITE;
const BLACK: ColorSample = ColorSample::BLACK;
const RED: ColorSample = ColorSample::new(255, 0, 0);
const GREEN: ColorSample = ColorSample::new(0, 255, 0);
const BLUE: ColorSample = ColorSample::new(0, 0, 255);
const YELLOW: ColorSample = ColorSample::new(255, 255, 0);
const ORANGE: ColorSample = ColorSample::new(255, 200, 0);
const PURPLE: ColorSample = ColorSample::new(128, 0, 128);

pub static SHIELD_ENTRIES: [ReferenceEntry; 9] = [
    ReferenceEntry {
        label: "Palmeiras",
        category: "Brasileirão",
        country: Some("Brazil"),
        colors: &[GREEN, WHITE],
        keywords: &["SEP", "PAL", "alviverde"],
        outline: "crest",
        shape: Shape::Circular,
        emblem: Some("Star"),
    },
    ReferenceEntry {
        label: "Real Madrid",
        category: "La Liga",
        country: Some("Spain"),
        colors: &[YELLOW, WHITE],
        keywords: &["RMA", "madridista", "merengue"],
        outline: "crest",
        shape: Shape::Oval,
        emblem: Some("Crown"),
    },
    ReferenceEntry {
        label: "Corinthians",
        category: "Brasileirão",
        country: Some("Brazil"),
        colors: &[WHITE, BLACK],
        keywords: &["SCCP", "COR", "alvinegro"],
        outline: "crest",
        shape: Shape::Rectangular,
        emblem: Some("Cross"),
    },
    ReferenceEntry {
        label: "Flamengo",
        category: "Brasileirão",
        country: Some("Brazil"),
        colors: &[RED, BLACK],
        keywords: &["CRF", "FLA", "rubro", "negro"],
        outline: "crest",
        shape: Shape::Circular,
        emblem: Some("Flame"),
    },
    ReferenceEntry {
        label: "Juventus",
        category: "Serie A",
        country: Some("Italy"),
        colors: &[BLACK, WHITE],
        keywords: &["JUV", "bianconeri", "zebra"],
        outline: "crest",
        shape: Shape::Oval,
        emblem: Some("Zebra"),
    },
    ReferenceEntry {
        label: "PSG",
        category: "Ligue 1",
        country: Some("France"),
        colors: &[BLUE, RED],
        keywords: &["PSG", "Paris", "parisien"],
        outline: "crest",
        shape: Shape::Circular,
        emblem: Some("Tower"),
    },
    ReferenceEntry {
        label: "Fiorentina",
        category: "Serie A",
        country: Some("Italy"),
        colors: &[PURPLE, WHITE],
        keywords: &["FIO", "Viola", "giglio"],
        outline: "crest",
        shape: Shape::Oval,
        emblem: Some("Lily"),
    },
    ReferenceEntry {
        label: "Galatasaray",
        category: "Süper Lig",
        country: Some("Turkey"),
        colors: &[ORANGE, RED],
        keywords: &["GS", "Cimbom", "aslan"],
        outline: "crest",
        shape: Shape::Circular,
        emblem: Some("Lion"),
    },
    ReferenceEntry {
        label: "Barcelona",
        category: "La Liga",
        country: Some("Spain"),
        colors: &[ColorSample::new(0, 77, 152), ColorSample::new(165, 0, 68)],
        keywords: &["FCB", "blaugrana", "culer"],
        outline: "crest",
        shape: Shape::Oval,
        emblem: Some("Stripes"),
    },
];

pub static EXPRESSION_ENTRIES: [ReferenceEntry; 5] = [
    ReferenceEntry {
        label: "happy",
        category: "HAPPY",
        country: None,
        colors: &[YELLOW, WHITE],
        keywords: &["smile", "joy"],
        outline: "face",
        shape: Shape::Circular,
        emblem: Some("Smile"),
    },
    ReferenceEntry {
        label: "sad",
        category: "SAD",
        country: None,
        colors: &[ColorSample::new(0, 0, 139), ColorSample::new(173, 216, 230)],
        keywords: &["tears", "frown"],
        outline: "face",
        shape: Shape::Oval,
        emblem: Some("Tears"),
    },
    ReferenceEntry {
        label: "angry",
        category: "ANGRY",
        country: None,
        colors: &[ColorSample::new(220, 20, 20), BLACK],
        keywords: &["brows", "scowl"],
        outline: "face",
        shape: Shape::Rectangular,
        emblem: Some("Brows"),
    },
    ReferenceEntry {
        label: "surprised",
        category: "SURPRISED",
        country: None,
        colors: &[ColorSample::new(255, 165, 0), WHITE],
        keywords: &["eyes", "gasp"],
        outline: "face",
        shape: Shape::Circular,
        emblem: Some("Eyes"),
    },
    ReferenceEntry {
        label: "neutral",
        category: "NEUTRAL",
        country: None,
        colors: &[ColorSample::new(180, 180, 180), WHITE],
        keywords: &["calm", "plain"],
        outline: "face",
        shape: Shape::Oval,
        emblem: None,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_unique() {
        for table in [&SHIELD_ENTRIES[..], &EXPRESSION_ENTRIES[..]] {
            for (i, a) in table.iter().enumerate() {
                assert!(table[i + 1..].iter().all(|b| b.label != a.label), "duplicate {}", a.label);
            }
        }
    }

    #[test]
    fn lookup_by_label() {
        let catalog = Catalog::new(&SHIELD_ENTRIES, 0.3);
        assert_eq!(catalog.by_label("PSG").map(|e| e.category), Some("Ligue 1"));
        assert!(catalog.contains_label("Barcelona"));
        assert!(!catalog.contains_label("barcelona"));
        assert_eq!(catalog.len(), 9);
    }

    #[test]
    fn every_entry_has_reference_colors() {
        assert!(SHIELD_ENTRIES.iter().chain(EXPRESSION_ENTRIES.iter()).all(|e| !e.colors.is_empty()));
    }
}
