// THEORY:
// The `palette` module is the color predicate bank. Each predicate is a pure function
// of one `ColorSample` built from channel-dominance thresholds. Detectors never call
// predicates directly; they go through a `PredicateBank`, an explicit ordered table of
// `(ColorName, predicate)` pairs plus suppression rules.
//
// Some bands overlap by construction: a saturated orange such as (255,140,0) also
// clears the red thresholds. The bank resolves this with a suppression list: when
// `Orange` holds for a sample, `Red` is treated as not satisfied for that same
// sample. Every detector that consults the bank inherits the same tie-break, and
// the priority order of the table decides `first_match`.

use crate::core_modules::pixel::pixel::ColorSample;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Named color classes the predicate banks and the color namer can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorName {
    White,
    Black,
    Green,
    Red,
    Blue,
    Yellow,
    Purple,
    Orange,
    Gray,
    Mixed,
}

impl ColorName {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorName::White => "White",
            ColorName::Black => "Black",
            ColorName::Green => "Green",
            ColorName::Red => "Red",
            ColorName::Blue => "Blue",
            ColorName::Yellow => "Yellow",
            ColorName::Purple => "Purple",
            ColorName::Orange => "Orange",
            ColorName::Gray => "Gray",
            ColorName::Mixed => "Mixed",
        }
    }
}

impl fmt::Display for ColorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type Predicate = fn(&ColorSample) -> bool;

/// Predicates tuned for rendered team shields.
pub mod shield {
    use super::ColorSample;

    pub fn is_white(c: &ColorSample) -> bool {
        c.red > 180 && c.green > 180 && c.blue > 180
    }

    pub fn is_black(c: &ColorSample) -> bool {
        c.all_below(80)
    }

    pub fn is_green(c: &ColorSample) -> bool {
        let (r, g, b) = (c.red as i32, c.green as i32, c.blue as i32);
        g > 80 && g > r + 30 && g > b + 30
    }

    /// Red dominance only, with no ceiling on green or blue. The band therefore overlaps
    /// orange, which the bank's suppression rule resolves, and it also claims light
    /// pinks such as (250,170,170). A variant capping green and blue below 120 would
    /// hand those pinks to purple instead.
    pub fn is_red(c: &ColorSample) -> bool {
        let (r, g, b) = (c.red as i32, c.green as i32, c.blue as i32);
        r > 150 && r > g + 60 && r > b + 60
    }

    /// Dark blue: blue dominant but not bright overall.
    pub fn is_blue(c: &ColorSample) -> bool {
        let (r, g, b) = (c.red as i32, c.green as i32, c.blue as i32);
        b > 80 && b > r + 20 && b > g + 20 && r + g + b < 400
    }

    pub fn is_yellow(c: &ColorSample) -> bool {
        c.red > 180 && c.green > 180 && c.blue < 100
    }

    pub fn is_purple(c: &ColorSample) -> bool {
        let (r, g, b) = (c.red as i32, c.green as i32, c.blue as i32);
        r > 100 && b > 100 && r + b > g + 100
    }

    /// Green sits strictly between blue and red, each by a margin.
    pub fn is_orange(c: &ColorSample) -> bool {
        let (r, g, b) = (c.red as i32, c.green as i32, c.blue as i32);
        r > 200 && g > 120 && g < 180 && b < 80 && r > g + 50 && g > b + 40
    }
}

/// Predicates tuned for flat-background expression cards.
pub mod expression {
    use super::ColorSample;

    pub fn is_yellow(c: &ColorSample) -> bool {
        c.red > 200 && c.green > 200 && c.blue < 100
    }

    pub fn is_blue(c: &ColorSample) -> bool {
        c.red < 50 && c.green < 50 && c.blue > 100
    }

    pub fn is_red(c: &ColorSample) -> bool {
        c.red > 180 && c.green < 100 && c.blue < 100
    }

    pub fn is_orange(c: &ColorSample) -> bool {
        c.red > 200 && c.green > 100 && c.green < 200 && c.blue < 100
    }

    /// Mid-bright neutral: every channel within 30 of the mean, mean in (150, 220).
    pub fn is_gray(c: &ColorSample) -> bool {
        let avg = c.sum() as i32 / 3;
        let near = |v: u8| (v as i32 - avg).abs() < 30;
        near(c.red) && near(c.green) && near(c.blue) && avg > 150 && avg < 220
    }
}

/// An ordered predicate table with suppression rules.
#[derive(Debug)]
pub struct PredicateBank {
    predicates: &'static [(ColorName, Predicate)],
    /// `(winner, loser)`: when `winner` holds, `loser` is not satisfied.
    suppressions: &'static [(ColorName, ColorName)],
}

impl PredicateBank {
    pub const fn new(
        predicates: &'static [(ColorName, Predicate)],
        suppressions: &'static [(ColorName, ColorName)],
    ) -> Self {
        Self { predicates, suppressions }
    }

    fn raw(&self, color: ColorName, sample: &ColorSample) -> bool {
        self.predicates
            .iter()
            .find(|(name, _)| *name == color)
            .is_some_and(|(_, predicate)| predicate(sample))
    }

    /// The predicate for `color` holds and no winning predicate suppresses it.
    pub fn holds(&self, color: ColorName, sample: &ColorSample) -> bool {
        if !self.raw(color, sample) {
            return false;
        }
        !self
            .suppressions
            .iter()
            .any(|(winner, loser)| *loser == color && self.raw(*winner, sample))
    }

    /// Every satisfied color, in bank priority order.
    pub fn satisfied(&self, sample: &ColorSample) -> Vec<ColorName> {
        self.colors().filter(|color| self.holds(*color, sample)).collect()
    }

    /// The highest-priority satisfied color.
    pub fn first_match(&self, sample: &ColorSample) -> Option<ColorName> {
        self.colors().find(|color| self.holds(*color, sample))
    }

    pub fn colors(&self) -> impl Iterator<Item = ColorName> + '_ {
        self.predicates.iter().map(|(name, _)| *name)
    }
}

const SHIELD_PREDICATES: [(ColorName, Predicate); 8] = [
    (ColorName::Orange, shield::is_orange),
    (ColorName::Red, shield::is_red),
    (ColorName::White, shield::is_white),
    (ColorName::Green, shield::is_green),
    (ColorName::Blue, shield::is_blue),
    (ColorName::Yellow, shield::is_yellow),
    (ColorName::Purple, shield::is_purple),
    (ColorName::Black, shield::is_black),
];

const EXPRESSION_PREDICATES: [(ColorName, Predicate); 5] = [
    (ColorName::Orange, expression::is_orange),
    (ColorName::Yellow, expression::is_yellow),
    (ColorName::Blue, expression::is_blue),
    (ColorName::Red, expression::is_red),
    (ColorName::Gray, expression::is_gray),
];

const ORANGE_OVER_RED: [(ColorName, ColorName); 1] = [(ColorName::Orange, ColorName::Red)];

pub static SHIELD_BANK: PredicateBank = PredicateBank::new(&SHIELD_PREDICATES, &ORANGE_OVER_RED);

pub static EXPRESSION_BANK: PredicateBank = PredicateBank::new(&EXPRESSION_PREDICATES, &ORANGE_OVER_RED);

/// Display name for a (usually quantized) color, used in rationale and synthesis text.
pub fn name_color(c: &ColorSample) -> ColorName {
    let (r, g, b) = (c.red, c.green, c.blue);
    if r > 180 && g < 100 && b < 100 {
        ColorName::Red
    } else if g > 180 && r < 100 && b < 100 {
        ColorName::Green
    } else if b > 180 && r < 100 && g < 100 {
        ColorName::Blue
    } else if r > 180 && g > 180 && b < 100 {
        ColorName::Yellow
    } else if r > 150 && g > 150 && b > 150 {
        ColorName::White
    } else if r < 80 && g < 80 && b < 80 {
        ColorName::Black
    } else if r > 100 && g < 80 && b > 100 {
        ColorName::Purple
    } else if r > 150 && g > 100 && b < 80 {
        ColorName::Orange
    } else {
        ColorName::Mixed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SATURATED_ORANGE: ColorSample = ColorSample::new(255, 140, 0);

    #[test]
    fn orange_and_red_bands_overlap() {
        assert!(shield::is_orange(&SATURATED_ORANGE));
        assert!(shield::is_red(&SATURATED_ORANGE));
    }

    #[test]
    fn orange_suppresses_red_in_the_bank() {
        assert!(SHIELD_BANK.holds(ColorName::Orange, &SATURATED_ORANGE));
        assert!(!SHIELD_BANK.holds(ColorName::Red, &SATURATED_ORANGE));
        assert_eq!(SHIELD_BANK.satisfied(&SATURATED_ORANGE), vec![ColorName::Orange]);
        assert_eq!(SHIELD_BANK.first_match(&SATURATED_ORANGE), Some(ColorName::Orange));
    }

    #[test]
    fn pure_red_is_still_red() {
        let red = ColorSample::new(220, 20, 60);
        assert_eq!(SHIELD_BANK.first_match(&red), Some(ColorName::Red));
        assert_eq!(EXPRESSION_BANK.first_match(&red), Some(ColorName::Red));
    }

    #[test]
    fn light_pink_ranks_red_ahead_of_purple() {
        let pink = ColorSample::new(250, 170, 170);
        assert_eq!(SHIELD_BANK.satisfied(&pink), vec![ColorName::Red, ColorName::Purple]);
        assert_eq!(SHIELD_BANK.first_match(&pink), Some(ColorName::Red));
    }

    #[test]
    fn shield_predicates_cover_reference_colors() {
        assert_eq!(SHIELD_BANK.first_match(&ColorSample::WHITE), Some(ColorName::White));
        assert_eq!(SHIELD_BANK.first_match(&ColorSample::BLACK), Some(ColorName::Black));
        assert_eq!(SHIELD_BANK.first_match(&ColorSample::new(0, 160, 0)), Some(ColorName::Green));
        assert_eq!(SHIELD_BANK.first_match(&ColorSample::new(0, 0, 200)), Some(ColorName::Blue));
        assert_eq!(SHIELD_BANK.first_match(&ColorSample::new(255, 255, 0)), Some(ColorName::Yellow));
        assert_eq!(SHIELD_BANK.first_match(&ColorSample::new(128, 0, 128)), Some(ColorName::Purple));
    }

    #[test]
    fn olive_matches_nothing() {
        let olive = ColorSample::new(100, 100, 70);
        assert!(SHIELD_BANK.satisfied(&olive).is_empty());
        assert!(EXPRESSION_BANK.satisfied(&olive).is_empty());
    }

    #[test]
    fn expression_gray_band() {
        assert!(expression::is_gray(&ColorSample::new(180, 180, 180)));
        assert!(!expression::is_gray(&ColorSample::new(100, 100, 100)));
        assert!(!expression::is_gray(&ColorSample::new(230, 230, 230)));
    }

    #[test]
    fn names_quantized_colors() {
        assert_eq!(name_color(&ColorSample::new(250, 0, 0)), ColorName::Red);
        assert_eq!(name_color(&ColorSample::new(0, 250, 0)), ColorName::Green);
        assert_eq!(name_color(&ColorSample::new(250, 250, 250)), ColorName::White);
        assert_eq!(name_color(&ColorSample::new(100, 100, 50)), ColorName::Mixed);
    }
}
