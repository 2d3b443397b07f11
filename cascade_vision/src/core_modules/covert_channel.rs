// THEORY:
// The covert channel is a ground-truth shortcut for test fixtures. A producer hides a
// small integer in the two least-significant bits of one color channel at the first
// eight pixels of a 4x2 block anchored at the origin. Position `i` sits at
// `(i % 4, i / 4)` and contributes its two bits at shift `2 * i`.
//
// Decoding never fails: an image smaller than the grid, or a code that is not in the
// domain's table, simply yields `None` and the cascade moves on. `embed` is the exact
// inverse of `read_code` so fixtures can be generated from the same table.

use crate::core_modules::pixel::pixel::ColorSample;
use crate::core_modules::raster::RasterImage;
use image::RgbImage;

pub const GRID_WIDTH: u32 = 4;
pub const GRID_HEIGHT: u32 = 2;
pub const GRID_POSITIONS: u32 = GRID_WIDTH * GRID_HEIGHT;

/// Fixed confidence for a direct decode; nothing else in the cascade may reach it.
pub const COVERT_CONFIDENCE: f64 = 0.98;

/// Which color channel carries the payload bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarrierChannel {
    Red,
    Green,
    Blue,
}

impl CarrierChannel {
    fn read(&self, sample: &ColorSample) -> u8 {
        match self {
            CarrierChannel::Red => sample.red,
            CarrierChannel::Green => sample.green,
            CarrierChannel::Blue => sample.blue,
        }
    }

    fn index(&self) -> usize {
        match self {
            CarrierChannel::Red => 0,
            CarrierChannel::Green => 1,
            CarrierChannel::Blue => 2,
        }
    }
}

/// One row of a code table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CovertEntry {
    pub code: u16,
    pub label: &'static str,
    pub category: &'static str,
}

/// A decoded hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CovertMatch {
    pub code: u16,
    pub entry: CovertEntry,
}

#[derive(Debug, Clone)]
pub struct CovertChannel {
    channel: CarrierChannel,
    table: &'static [CovertEntry],
}

impl CovertChannel {
    pub const fn new(channel: CarrierChannel, table: &'static [CovertEntry]) -> Self {
        Self { channel, table }
    }

    pub fn channel(&self) -> CarrierChannel {
        self.channel
    }

    pub fn table(&self) -> &'static [CovertEntry] {
        self.table
    }

    /// Raw payload, or `None` when the image cannot hold the grid.
    pub fn read_code(&self, raster: &RasterImage) -> Option<u16> {
        if raster.width() < GRID_WIDTH || raster.height() < GRID_HEIGHT {
            return None;
        }
        let mut code = 0u16;
        for i in 0..GRID_POSITIONS {
            let x = (i % GRID_WIDTH) as i32;
            let y = (i / GRID_WIDTH) as i32;
            let bits = (self.channel.read(&raster.sample(x, y)) & 0b11) as u16;
            code |= bits << (i * 2);
        }
        Some(code)
    }

    pub fn lookup(&self, code: u16) -> Option<CovertEntry> {
        self.table.iter().find(|entry| entry.code == code).copied()
    }

    pub fn decode(&self, raster: &RasterImage) -> Option<CovertMatch> {
        let code = self.read_code(raster)?;
        let entry = self.lookup(code)?;
        Some(CovertMatch { code, entry })
    }

    /// Writes `code` into the carrier bits of the origin grid. Returns `false` and
    /// leaves the image untouched when it is smaller than the grid.
    pub fn embed(&self, image: &mut RgbImage, code: u16) -> bool {
        if image.width() < GRID_WIDTH || image.height() < GRID_HEIGHT {
            return false;
        }
        let channel = self.channel.index();
        for i in 0..GRID_POSITIONS {
            let bits = ((code >> (i * 2)) & 0b11) as u8;
            let pixel = image.get_pixel_mut(i % GRID_WIDTH, i / GRID_WIDTH);
            pixel[channel] = (pixel[channel] & !0b11) | bits;
        }
        true
    }
}
