// THEORY:
// The `pixel` module holds the smallest unit every detector reasons about: a single
// RGB sample read out of the raster. It is a "dumb" value type with a handful of
// single-sample heuristics (luminance, quantization, distance to another sample).
// It knows nothing about neighbors or about which label a color implies; that is
// the job of the predicate bank in `palette`.
//
// Key principles:
// 1) Single-sample scope: heuristics never read neighbors.
// 2) Cheap to copy: three bytes, `Copy`, compared field by field.
// 3) The out-of-bounds sentinel is `ColorSample::BLACK`, luminance 0.

pub mod pixel {
    use serde::{Deserialize, Serialize};

    pub type Channel = u8;
    pub type Luminance = f64;
    pub type Similarity = f64;

    /// Largest possible Euclidean distance between two RGB samples, `sqrt(3 * 255^2)`.
    pub const MAX_RGB_DISTANCE: f64 = 441.672_955_930_063_7;

    /// A single RGB triplet read from the raster.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
    pub struct ColorSample {
        /// The red channel value (0-255).
        pub red: Channel,
        /// The green channel value (0-255).
        pub green: Channel,
        /// The blue channel value (0-255).
        pub blue: Channel,
    }

    impl ColorSample {
        /// Returned for every read outside the image.
        pub const BLACK: ColorSample = ColorSample::new(0, 0, 0);
        pub const WHITE: ColorSample = ColorSample::new(255, 255, 255);

        pub const fn new(red: Channel, green: Channel, blue: Channel) -> Self {
            Self { red, green, blue }
        }

        /// Luminance estimate (Rec. 601 luma) on the 0..255 scale.
        pub fn luminance(&self) -> Luminance {
            0.299_f64 * self.red as f64 + 0.587_f64 * self.green as f64 + 0.114_f64 * self.blue as f64
        }

        /// Sum of the three channels.
        pub fn sum(&self) -> u16 {
            self.red as u16 + self.green as u16 + self.blue as u16
        }

        /// True when every channel is strictly below `limit`.
        pub fn all_below(&self, limit: Channel) -> bool {
            self.red < limit && self.green < limit && self.blue < limit
        }

        /// Buckets each channel down to a multiple of `step`.
        pub fn quantize(&self, step: Channel) -> ColorSample {
            if step <= 1 {
                return *self;
            }
            let bucket = |c: Channel| (c / step) * step;
            ColorSample::new(bucket(self.red), bucket(self.green), bucket(self.blue))
        }

        /// Euclidean distance in RGB space.
        pub fn distance(&self, other: &ColorSample) -> f64 {
            let dr = self.red as f64 - other.red as f64;
            let dg = self.green as f64 - other.green as f64;
            let db = self.blue as f64 - other.blue as f64;
            (dr * dr + dg * dg + db * db).sqrt()
        }

        /// `1 - distance / MAX_RGB_DISTANCE`, in `[0, 1]`.
        pub fn similarity(&self, other: &ColorSample) -> Similarity {
            (1.0 - self.distance(other) / MAX_RGB_DISTANCE).clamp(0.0, 1.0)
        }
    }

    impl From<image::Rgb<u8>> for ColorSample {
        fn from(rgb: image::Rgb<u8>) -> Self {
            ColorSample::new(rgb[0], rgb[1], rgb[2])
        }
    }

    impl From<ColorSample> for image::Rgb<u8> {
        fn from(sample: ColorSample) -> Self {
            image::Rgb([sample.red, sample.green, sample.blue])
        }
    }

    impl From<(u8, u8, u8)> for ColorSample {
        fn from((red, green, blue): (u8, u8, u8)) -> Self {
            ColorSample::new(red, green, blue)
        }
    }
}
