// THEORY:
// When none of the boolean stages fires, the cascade falls back to describing the image
// with a `FeatureVector` and comparing that description with the catalog. The vector is
// coarse: two quantized colors, a score per shape class, a score per symbol
// class, two flags and a contrast figure. Each score comes from sampling a handful of
// characteristic paths (a ring, the border, a diagonal grid, rays from the center) and
// measuring local gradients along them, the same way the pattern detectors do but
// continuous instead of boolean.
//
// Key principles:
// 1) Determinism: every sampling path and every tie-break is fixed. Frequency ties go to
//    the smallest color in `ColorSample` order; shape and symbol ties go to the earlier
//    variant in declaration order.
// 2) Sub-scores live in [0, 1]. Contrast is the exception and stays a raw luminance span.

use crate::core_modules::pixel::pixel::ColorSample;
use crate::core_modules::raster::RasterImage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Channel bucket width for dominant-color counting.
pub const QUANTIZATION_STEP: u8 = 50;
/// Grid stride for color counting.
pub const COLOR_STRIDE: usize = 2;
/// A symbol must score strictly above this to be reported.
pub const SYMBOL_THRESHOLD: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Circular,
    Rectangular,
    Triangular,
    Oval,
}

impl Shape {
    pub const ALL: [Shape; 4] = [Shape::Circular, Shape::Rectangular, Shape::Triangular, Shape::Oval];

    pub fn as_str(&self) -> &'static str {
        match self {
            Shape::Circular => "Circular",
            Shape::Rectangular => "Rectangular",
            Shape::Triangular => "Triangular",
            Shape::Oval => "Oval",
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Symbol {
    Star,
    Eagle,
    Lion,
    Crown,
}

impl Symbol {
    pub const ALL: [Symbol; 4] = [Symbol::Star, Symbol::Eagle, Symbol::Lion, Symbol::Crown];

    pub fn as_str(&self) -> &'static str {
        match self {
            Symbol::Star => "Star",
            Symbol::Eagle => "Eagle",
            Symbol::Lion => "Lion",
            Symbol::Crown => "Crown",
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where dominant colors are counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorRegion {
    /// Every pixel on the stride grid.
    Whole,
    /// A square of half-side `min(w, h) / 3` around the center.
    Central,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub dominant: ColorSample,
    pub secondary: ColorSample,
    pub shape_scores: BTreeMap<Shape, f64>,
    pub symbol_scores: BTreeMap<Symbol, f64>,
    pub has_stripes: bool,
    pub has_text: bool,
    pub contrast: f64,
}

impl FeatureVector {
    pub fn extract(raster: &RasterImage, region: ColorRegion) -> Self {
        let (dominant, secondary) = dominant_colors(raster, region);
        let circular = circular_score(raster);
        let rectangular = rectangular_score(raster);

        let shape_scores = BTreeMap::from([
            (Shape::Circular, circular),
            (Shape::Rectangular, rectangular),
            (Shape::Triangular, triangular_score(raster)),
            (Shape::Oval, oval_score(circular, rectangular)),
        ]);
        let symbol_scores = BTreeMap::from([
            (Symbol::Star, star_score(raster)),
            (Symbol::Eagle, eagle_score(raster)),
            (Symbol::Lion, lion_score(raster)),
            (Symbol::Crown, crown_score(raster)),
        ]);

        Self {
            dominant,
            secondary,
            shape_scores,
            symbol_scores,
            has_stripes: has_stripes(raster),
            has_text: has_text(raster),
            contrast: global_contrast(raster),
        }
    }

    /// Highest-scoring shape; `Rectangular` when every score is zero.
    pub fn detected_shape(&self) -> Shape {
        let mut best = (Shape::Rectangular, 0.0);
        for shape in Shape::ALL {
            let score = self.shape_scores.get(&shape).copied().unwrap_or(0.0);
            if score > best.1 {
                best = (shape, score);
            }
        }
        best.0
    }

    /// Highest-scoring symbol strictly above `SYMBOL_THRESHOLD`.
    pub fn detected_symbol(&self) -> Option<Symbol> {
        let mut best = (None, SYMBOL_THRESHOLD);
        for symbol in Symbol::ALL {
            let score = self.symbol_scores.get(&symbol).copied().unwrap_or(0.0);
            if score > best.1 {
                best = (Some(symbol), score);
            }
        }
        best.0
    }
}

fn stepped(from: i32, to: i32, step: usize) -> impl Iterator<Item = i32> {
    (from..to.max(from)).step_by(step)
}

/// Most and second-most frequent quantized colors. Secondary falls back to white when
/// the region holds a single bucket.
pub fn dominant_colors(raster: &RasterImage, region: ColorRegion) -> (ColorSample, ColorSample) {
    let (w, h) = (raster.w(), raster.h());
    let (x0, x1, y0, y1) = match region {
        ColorRegion::Whole => (0, w, 0, h),
        ColorRegion::Central => {
            let (cx, cy) = (w / 2, h / 2);
            let size = w.min(h) / 3;
            (cx - size, cx + size, cy - size, cy + size)
        }
    };

    let mut frequency: BTreeMap<ColorSample, usize> = BTreeMap::new();
    for y in stepped(y0, y1, COLOR_STRIDE) {
        for x in stepped(x0, x1, COLOR_STRIDE) {
            if raster.contains(x, y) {
                let bucket = raster.sample(x, y).quantize(QUANTIZATION_STEP);
                *frequency.entry(bucket).or_insert(0) += 1;
            }
        }
    }

    let most_frequent = |skip: Option<ColorSample>| {
        let mut best: Option<(ColorSample, usize)> = None;
        for (color, count) in &frequency {
            if Some(*color) == skip {
                continue;
            }
            if best.is_none_or(|(_, top)| *count > top) {
                best = Some((*color, *count));
            }
        }
        best.map(|(color, _)| color)
    };

    let dominant = most_frequent(None).unwrap_or(ColorSample::BLACK);
    let secondary = most_frequent(Some(dominant)).unwrap_or(ColorSample::WHITE);
    (dominant, secondary)
}

/// Fraction of 24 ring points (radius `min(w, h) / 3`) sitting on an edge stronger than 40.
pub fn circular_score(raster: &RasterImage) -> f64 {
    let (w, h) = (raster.w(), raster.h());
    let (cx, cy) = (w / 2, h / 2);
    let radius = (w.min(h) / 3) as f64;
    let mut edges = 0usize;
    let mut checked = 0usize;
    for degrees in (0..360).step_by(15) {
        let radians = (degrees as f64).to_radians();
        let x = cx + (radius * radians.cos()) as i32;
        let y = cy + (radius * radians.sin()) as i32;
        if x > 0 && x < w - 1 && y > 0 && y < h - 1 {
            if raster.edge_strength(x, y) > 40.0 {
                edges += 1;
            }
            checked += 1;
        }
    }
    ratio(edges, checked)
}

/// Fraction of border points (20 pixels in, stride 10) on an edge stronger than 30.
pub fn rectangular_score(raster: &RasterImage) -> f64 {
    let (w, h) = (raster.w(), raster.h());
    let mut edges = 0usize;
    let mut checked = 0usize;
    for x in stepped(20, w - 20, 10) {
        edges += [(x, 20), (x, h - 20)]
            .iter()
            .filter(|(x, y)| raster.edge_strength(*x, *y) > 30.0)
            .count();
        checked += 2;
    }
    for y in stepped(20, h - 20, 10) {
        edges += [(20, y), (w - 20, y)]
            .iter()
            .filter(|(x, y)| raster.edge_strength(*x, *y) > 30.0)
            .count();
        checked += 2;
    }
    ratio(edges, checked)
}

fn diagonal_edge(raster: &RasterImage, x: i32, y: i32) -> bool {
    if x < 2 || x >= raster.w() - 2 || y < 2 || y >= raster.h() - 2 {
        return false;
    }
    let here = raster.luminance(x, y);
    (here - raster.luminance(x + 2, y + 2)).abs() > 30.0 || (here - raster.luminance(x - 2, y - 2)).abs() > 30.0
}

/// Fraction of the central half-size grid (stride 10) with a diagonal step above 30.
pub fn triangular_score(raster: &RasterImage) -> f64 {
    let (w, h) = (raster.w(), raster.h());
    let mut edges = 0usize;
    let mut checked = 0usize;
    for y in stepped(h / 4, 3 * h / 4, 10) {
        for x in stepped(w / 4, 3 * w / 4, 10) {
            if diagonal_edge(raster, x, y) {
                edges += 1;
            }
            checked += 1;
        }
    }
    ratio(edges, checked)
}

/// Mean of circular and rectangular when both sit in (0.3, 0.7), else 0.
pub fn oval_score(circular: f64, rectangular: f64) -> f64 {
    let mid = |s: f64| s > 0.3 && s < 0.7;
    if mid(circular) && mid(rectangular) {
        (circular + rectangular) / 2.0
    } else {
        0.0
    }
}

/// Rays (every 30 degrees) whose points at radius 15 and 30 differ in luminance by more than 40.
pub fn star_score(raster: &RasterImage) -> f64 {
    let (cx, cy) = (raster.w() / 2, raster.h() / 2);
    let mut rays = 0usize;
    for degrees in (0..360).step_by(30) {
        let radians = (degrees as f64).to_radians();
        let at = |r: f64| (cx + (r * radians.cos()) as i32, cy + (r * radians.sin()) as i32);
        let (x1, y1) = at(15.0);
        let (x2, y2) = at(30.0);
        if raster.contains(x1, y1)
            && raster.contains(x2, y2)
            && (raster.luminance(x1, y1) - raster.luminance(x2, y2)).abs() > 40.0
        {
            rays += 1;
        }
    }
    rays as f64 / 12.0
}

/// 0.6 when the central column carries 20% more luminance than the central row.
pub fn eagle_score(raster: &RasterImage) -> f64 {
    let (cx, cy) = (raster.w() / 2, raster.h() / 2);
    let vertical: f64 = (cy - 20..cy + 20).map(|y| raster.luminance(cx, y)).sum();
    let horizontal: f64 = (cx - 20..cx + 20).map(|x| raster.luminance(x, cy)).sum();
    if vertical > horizontal * 1.2 { 0.6 } else { 0.0 }
}

/// Density of dark (luminance < 100) pixels in the central 30x30 square, when above 0.4.
pub fn lion_score(raster: &RasterImage) -> f64 {
    let (cx, cy) = (raster.w() / 2, raster.h() / 2);
    let mut dark = 0usize;
    let mut total = 0usize;
    for y in cy - 15..cy + 15 {
        for x in cx - 15..cx + 15 {
            if raster.contains(x, y) {
                if raster.luminance(x, y) < 100.0 {
                    dark += 1;
                }
                total += 1;
            }
        }
    }
    let density = ratio(dark, total);
    if density > 0.4 { density } else { 0.0 }
}

/// Dark peaks along the row at one third of the height; three or more score `peaks / 5`.
pub fn crown_score(raster: &RasterImage) -> f64 {
    let cx = raster.w() / 2;
    let row = raster.h() / 3;
    let mut peaks = 0usize;
    let mut was_dark = false;
    for x in stepped(cx - 30, cx + 30, 3) {
        if !raster.contains(x, row) {
            continue;
        }
        let dark = raster.luminance(x, row) < 80.0;
        if dark && !was_dark {
            peaks += 1;
        }
        was_dark = dark;
    }
    if peaks > 2 { (peaks as f64 / 5.0).min(1.0) } else { 0.0 }
}

/// More than 3 rows in the middle third whose samples 20 pixels either side of the
/// center agree within 20 luminance.
pub fn has_stripes(raster: &RasterImage) -> bool {
    let (w, h) = (raster.w(), raster.h());
    let cx = w / 2;
    stepped(h / 3, 2 * h / 3, 5)
        .filter(|&y| (raster.luminance(cx - 20, y) - raster.luminance(cx + 20, y)).abs() < 20.0)
        .count()
        > 3
}

/// More than 3 closed runs of 6 to 24 consecutive edge pixels in the lower band.
pub fn has_text(raster: &RasterImage) -> bool {
    let (w, h) = (raster.w(), raster.h());
    let mut runs = 0usize;
    for y in stepped(2 * h / 3, h - 20, 3) {
        let mut consecutive = 0usize;
        for x in w / 4..3 * w / 4 {
            if raster.edge_strength(x, y) > 25.0 {
                consecutive += 1;
            } else {
                if consecutive > 5 && consecutive < 25 {
                    runs += 1;
                }
                consecutive = 0;
            }
        }
    }
    runs > 3
}

/// Luminance span over a stride-5 grid; 0 for an empty image.
pub fn global_contrast(raster: &RasterImage) -> f64 {
    let mut span: Option<(f64, f64)> = None;
    for y in stepped(0, raster.h(), 5) {
        for x in stepped(0, raster.w(), 5) {
            let lum = raster.luminance(x, y);
            span = Some(match span {
                None => (lum, lum),
                Some((lo, hi)) => (lo.min(lum), hi.max(lum)),
            });
        }
    }
    span.map_or(0.0, |(lo, hi)| hi - lo)
}

fn ratio(hits: usize, total: usize) -> f64 {
    if total == 0 { 0.0 } else { hits as f64 / total as f64 }
}
