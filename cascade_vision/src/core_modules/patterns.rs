// THEORY:
// The pattern set is the last boolean stage before feature extraction. Each detector is a
// small structural test over a fixed neighborhood of the image (stripes, a centered
// cross, radial alternation around the center, a central color patch, a row of crown
// peaks) tagged with the label it implies. Detectors are evaluated strictly in table
// order and the first one that fires decides the label, so the tables below are the
// tie-break contract and must not be reordered.
//
// Unlike the background probes, pattern scans skip coordinates outside the image
// instead of reading the black sentinel; otherwise every "count the black pixels"
// test would fire on small images.

use crate::core_modules::pixel::pixel::ColorSample;
use crate::core_modules::raster::RasterImage;
use std::f64::consts::PI;

pub type PatternTest = fn(&RasterImage) -> bool;

#[derive(Debug, Clone, Copy)]
pub struct PatternDetector {
    pub name: &'static str,
    pub label: &'static str,
    pub test: PatternTest,
}

impl PatternDetector {
    pub fn fires(&self, raster: &RasterImage) -> bool {
        (self.test)(raster)
    }
}

/// An ordered detector table.
#[derive(Debug, Clone, Copy)]
pub struct PatternSet {
    detectors: &'static [PatternDetector],
}

impl PatternSet {
    pub const fn new(detectors: &'static [PatternDetector]) -> Self {
        Self { detectors }
    }

    pub fn detectors(&self) -> &'static [PatternDetector] {
        self.detectors
    }

    /// The first detector that fires, in table order.
    pub fn detect(&self, raster: &RasterImage) -> Option<&'static PatternDetector> {
        self.detectors.iter().find(|detector| detector.fires(raster))
    }
}

fn center(raster: &RasterImage) -> (i32, i32) {
    (raster.w() / 2, raster.h() / 2)
}

/// Inclusive stepped range.
fn span(from: i32, to: i32, step: i32) -> impl Iterator<Item = i32> {
    (from..=to).step_by(step as usize)
}

/// Half-open stepped range.
fn scan(from: i32, to: i32, step: i32) -> impl Iterator<Item = i32> {
    (from..to.max(from)).step_by(step as usize)
}

/// Counts in-bounds points whose sample satisfies `hit`.
fn count_hits<I, F>(raster: &RasterImage, points: I, hit: F) -> usize
where
    I: IntoIterator<Item = (i32, i32)>,
    F: Fn(&ColorSample) -> bool,
{
    points
        .into_iter()
        .filter(|&(x, y)| raster.contains(x, y) && hit(&raster.sample(x, y)))
        .count()
}

fn any_hit<I, F>(raster: &RasterImage, points: I, hit: F) -> bool
where
    I: IntoIterator<Item = (i32, i32)>,
    F: Fn(&ColorSample) -> bool,
{
    points
        .into_iter()
        .any(|(x, y)| raster.contains(x, y) && hit(&raster.sample(x, y)))
}

fn is_ink(c: &ColorSample) -> bool {
    c.all_below(50)
}

fn is_maroon(c: &ColorSample) -> bool {
    c.red > 100 && c.green < 50 && c.blue < 50
}

fn is_leaf_green(c: &ColorSample) -> bool {
    c.green > 100 && c.red < 100 && c.blue < 100
}

fn is_flame(c: &ColorSample) -> bool {
    c.red > 200 && c.green > 200 && c.blue < 100
}

fn is_gold(c: &ColorSample) -> bool {
    c.red > 200 && c.green > 180 && c.blue < 100
}

// ---- shield detectors ----

/// Some column in `[40, w-40)` (stride 20) has more than 3 near-black rows.
pub fn vertical_black_stripes(raster: &RasterImage) -> bool {
    let (w, h) = (raster.w(), raster.h());
    scan(40, w - 40, 20).any(|x| count_hits(raster, scan(50, h - 50, 10).map(|y| (x, y)), is_ink) > 3)
}

/// Some row in `[30, h-30)` (stride 15) has more than 3 maroon samples.
pub fn horizontal_maroon_stripes(raster: &RasterImage) -> bool {
    let (w, h) = (raster.w(), raster.h());
    scan(30, h - 30, 15).any(|y| count_hits(raster, scan(50, w - 50, 10).map(|x| (x, y)), is_maroon) > 3)
}

/// More than 8 near-black samples along both center lines within 30 pixels.
pub fn black_cross(raster: &RasterImage) -> bool {
    let (cx, cy) = center(raster);
    let vertical = span(-30, 30, 5).map(|i| (cx, cy + i));
    let horizontal = span(-30, 30, 5).map(|i| (cx + i, cy));
    count_hits(raster, vertical.chain(horizontal), is_ink) > 8
}

/// Luminance differences between the inner (r=15) and outer (r=30) point of each of
/// 12 rays around the center that exceed 40.
pub fn radial_alternations(raster: &RasterImage) -> usize {
    let (cx, cy) = center(raster);
    (0..12)
        .filter(|k| {
            let angle = *k as f64 * PI / 6.0;
            let at = |radius: f64| {
                (
                    cx + (radius * angle.cos()).round() as i32,
                    cy + (radius * angle.sin()).round() as i32,
                )
            };
            let (ix, iy) = at(15.0);
            let (ox, oy) = at(30.0);
            (raster.luminance(ix, iy) - raster.luminance(ox, oy)).abs() > 40.0
        })
        .count()
}

/// Green mass near the center that also alternates radially against its surroundings.
pub fn green_star(raster: &RasterImage) -> bool {
    let (cx, cy) = center(raster);
    let grid = span(-40, 40, 10).flat_map(|dy| span(-40, 40, 10).map(move |dx| (cx + dx, cy + dy)));
    count_hits(raster, grid, is_leaf_green) > 5 && radial_alternations(raster) >= 4
}

/// Any bright yellow sample within 20 pixels of the center.
pub fn yellow_flame(raster: &RasterImage) -> bool {
    let (cx, cy) = center(raster);
    let patch = span(-20, 20, 5).flat_map(|dy| span(-20, 20, 5).map(move |dx| (cx + dx, cy + dy)));
    any_hit(raster, patch, is_flame)
}

/// Gold runs along one row of the band centered 40 pixels above the middle.
pub fn crown_peaks(raster: &RasterImage, y: i32) -> usize {
    let cx = raster.w() / 2;
    let mut peaks = 0;
    let mut inside = false;
    for x in span(cx - 30, cx + 30, 5) {
        let gold = raster.contains(x, y) && is_gold(&raster.sample(x, y));
        if gold && !inside {
            peaks += 1;
        }
        inside = gold;
    }
    peaks
}

/// At least two separate gold peaks on some row of the crown band.
pub fn gold_crown(raster: &RasterImage) -> bool {
    let top = raster.h() / 2 - 40;
    span(top - 20, top + 20, 5).any(|y| crown_peaks(raster, y) >= 2)
}

// ---- expression detectors ----

/// A dark mouth line 50 pixels below the center: more than 8 of 21 samples.
pub fn smile_line(raster: &RasterImage) -> bool {
    let (cx, cy) = center(raster);
    let row = cy + 50;
    count_hits(raster, span(cx - 50, cx + 50, 5).map(|x| (x, row)), |c| c.all_below(150)) > 8
}

/// A blue tear 60 pixels either side of the center, 20 below it.
pub fn tear_drops(raster: &RasterImage) -> bool {
    let (cx, cy) = center(raster);
    any_hit(raster, [(cx - 60, cy + 20), (cx + 60, cy + 20)], |c| c.blue > 150 && c.red < 100)
}

/// Heavy black brows 30 pixels above the center: more than 15 of 27 samples.
pub fn furrowed_brows(raster: &RasterImage) -> bool {
    let (cx, cy) = center(raster);
    let row = cy - 30;
    count_hits(raster, span(cx - 40, cx + 40, 3).map(|x| (x, row)), is_ink) > 15
}

/// White eye whites 40 pixels either side of the center, 10 above it.
pub fn wide_eyes(raster: &RasterImage) -> bool {
    let (cx, cy) = center(raster);
    any_hit(raster, [(cx - 40, cy - 10), (cx + 40, cy - 10)], |c| {
        c.red > 200 && c.green > 200 && c.blue > 200
    })
}

pub static SHIELD_PATTERNS: [PatternDetector; 6] = [
    PatternDetector { name: "vertical black stripes", label: "Flamengo", test: vertical_black_stripes },
    PatternDetector { name: "horizontal maroon stripes", label: "Barcelona", test: horizontal_maroon_stripes },
    PatternDetector { name: "black cross", label: "Corinthians", test: black_cross },
    PatternDetector { name: "green star", label: "Palmeiras", test: green_star },
    PatternDetector { name: "yellow flame", label: "Flamengo", test: yellow_flame },
    PatternDetector { name: "gold crown", label: "Real Madrid", test: gold_crown },
];

pub static EXPRESSION_PATTERNS: [PatternDetector; 4] = [
    PatternDetector { name: "smile line", label: "happy", test: smile_line },
    PatternDetector { name: "tear drops", label: "sad", test: tear_drops },
    PatternDetector { name: "furrowed brows", label: "angry", test: furrowed_brows },
    PatternDetector { name: "wide eyes", label: "surprised", test: wide_eyes },
];
