// THEORY:
// Fixture generators stamp the label name in dark glyphs across a band near the top of
// the image. The text-region detector does not read the glyphs; it only counts dark
// pixels along one scan row and, when they look like text, samples the background
// next to them and names that background through the predicate bank.
//
// Two trigger styles exist:
// - `EachHit`: every dark pixel immediately probes a patch offset to its right. The
//   first probe that names a color wins; unnamed probes let the scan continue.
// - `Density`: dark pixels are counted across the whole row and, above a minimum,
//   a single fixed probe point is classified.

use crate::core_modules::palette::{ColorName, PredicateBank};
use crate::core_modules::raster::RasterImage;
use tracing::trace;

/// Channels all below this value count as glyph ink.
pub const DARK_LIMIT: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TextTrigger {
    /// Probe `(x + dx, probe_row)` for each dark hit at `x`.
    EachHit { dx: i32, probe_row: i32 },
    /// More than `min_dark` hits trigger one probe at `probe`.
    Density { min_dark: usize, probe: (i32, i32) },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextHit {
    pub label: &'static str,
    pub color: ColorName,
    pub dark_pixels: usize,
    pub probe: (i32, i32),
}

#[derive(Debug, Clone)]
pub struct TextProfile {
    pub row: i32,
    /// Scan runs over `[margin, width - margin)`.
    pub margin: i32,
    pub step: i32,
    pub trigger: TextTrigger,
    /// Background color to label, checked in order.
    pub labels: &'static [(ColorName, &'static str)],
}

impl TextProfile {
    fn scan_xs(&self, raster: &RasterImage) -> impl Iterator<Item = i32> + '_ {
        let end = raster.w() - self.margin;
        (self.margin..end.max(self.margin)).step_by(self.step.max(1) as usize)
    }

    fn is_dark(&self, raster: &RasterImage, x: i32) -> bool {
        raster.sample(x, self.row).all_below(DARK_LIMIT)
    }

    fn name_probe(&self, raster: &RasterImage, bank: &PredicateBank, probe: (i32, i32)) -> Option<(ColorName, &'static str)> {
        let sample = raster.sample(probe.0, probe.1);
        self.labels
            .iter()
            .find(|(color, _)| bank.holds(*color, &sample))
            .copied()
    }

    pub fn detect(&self, raster: &RasterImage, bank: &PredicateBank) -> Option<TextHit> {
        if self.row >= raster.h() {
            return None;
        }
        match self.trigger {
            TextTrigger::EachHit { dx, probe_row } => {
                let mut dark_pixels = 0;
                for x in self.scan_xs(raster) {
                    if !self.is_dark(raster, x) {
                        continue;
                    }
                    dark_pixels += 1;
                    let probe = (x + dx, probe_row);
                    if let Some((color, label)) = self.name_probe(raster, bank, probe) {
                        return Some(TextHit { label, color, dark_pixels, probe });
                    }
                }
                None
            }
            TextTrigger::Density { min_dark, probe } => {
                let dark_pixels = self.scan_xs(raster).filter(|&x| self.is_dark(raster, x)).count();
                trace!(dark_pixels, "text row density");
                if dark_pixels <= min_dark {
                    return None;
                }
                self.name_probe(raster, bank, probe)
                    .map(|(color, label)| TextHit { label, color, dark_pixels, probe })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::palette::{EXPRESSION_BANK, SHIELD_BANK};
    use image::{Rgb, RgbImage};

    static LABELS: [(ColorName, &str); 2] = [(ColorName::White, "white"), (ColorName::Green, "green")];

    fn banner(background: [u8; 3], ink_from: u32, ink_to: u32, row: u32) -> RasterImage {
        let mut image = RgbImage::from_pixel(200, 120, Rgb(background));
        for x in ink_from..ink_to {
            image.put_pixel(x, row, Rgb([10, 10, 10]));
        }
        RasterImage::from_rgb(image)
    }

    fn density_profile() -> TextProfile {
        TextProfile {
            row: 50,
            margin: 30,
            step: 5,
            trigger: TextTrigger::Density { min_dark: 5, probe: (50, 30) },
            labels: &LABELS,
        }
    }

    #[test]
    fn dense_row_names_the_background() {
        let raster = banner([0, 160, 0], 60, 140, 50);
        let hit = density_profile().detect(&raster, &SHIELD_BANK).expect("text found");
        assert_eq!(hit.label, "green");
        assert_eq!(hit.dark_pixels, 16);
    }

    #[test]
    fn sparse_row_is_not_text() {
        // Exactly five hits: 60, 65, 70, 75, 80.
        let raster = banner([0, 160, 0], 60, 85, 50);
        assert!(density_profile().detect(&raster, &SHIELD_BANK).is_none());
    }

    #[test]
    fn each_hit_probes_next_to_the_ink() {
        static GRAY: [(ColorName, &str); 1] = [(ColorName::Gray, "neutral")];
        let profile = TextProfile {
            row: 40,
            margin: 50,
            step: 5,
            trigger: TextTrigger::EachHit { dx: 20, probe_row: 20 },
            labels: &GRAY,
        };
        let raster = banner([180, 180, 180], 100, 101, 40);
        let hit = profile.detect(&raster, &EXPRESSION_BANK).expect("probe is gray");
        assert_eq!(hit.probe, (120, 20));
        assert_eq!(hit.dark_pixels, 1);
    }

    #[test]
    fn rows_below_the_image_are_skipped() {
        let raster = RasterImage::from_rgb(RgbImage::from_pixel(200, 40, Rgb([0, 0, 0])));
        assert!(density_profile().detect(&raster, &SHIELD_BANK).is_none());
    }
}
