pub mod image_helper {
    use crate::core_modules::pixel::pixel::ColorSample;
    use crate::error::{ClassifyError, ClassifyResult};
    use image::{ImageEncoder, RgbImage};
    use std::io::Cursor;
    use std::path::Path;

    /// A flat image of one color.
    pub fn solid(width: u32, height: u32, color: ColorSample) -> RgbImage {
        RgbImage::from_pixel(width, height, color.into())
    }

    /// PNG-encodes an RGB buffer in memory.
    pub fn encode_png(image: &RgbImage) -> ClassifyResult<Vec<u8>> {
        let mut bytes = Cursor::new(Vec::new());
        let encoder = image::codecs::png::PngEncoder::new(&mut bytes);
        encoder
            .write_image(image.as_raw(), image.width(), image.height(), image::ExtendedColorType::Rgb8)
            .map_err(ClassifyError::Encode)?;
        Ok(bytes.into_inner())
    }

    pub fn save(path: impl AsRef<Path>, image: &RgbImage) -> ClassifyResult<()> {
        std::fs::write(path, encode_png(image)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::image_helper::*;
    use crate::core_modules::pixel::pixel::ColorSample;
    use crate::error::ClassifyError;
    use image::RgbImage;

    #[test]
    fn zero_width_fails_as_an_encode_error() {
        let err = encode_png(&RgbImage::new(0, 4)).unwrap_err();
        assert!(matches!(err, ClassifyError::Encode(_)), "{err}");
        assert!(err.to_string().starts_with("image encode failed"));
    }

    #[test]
    fn encoded_png_decodes_to_the_same_pixels() {
        let mut image = solid(12, 7, ColorSample::new(10, 200, 30));
        image.put_pixel(3, 4, image::Rgb([1, 2, 3]));
        let bytes = encode_png(&image).expect("Error Encoding File.");
        let decoded = image::load_from_memory(&bytes).expect("valid png").to_rgb8();
        assert_eq!(decoded, image);
    }

    #[test]
    fn save_white_file() {
        let path = std::env::temp_dir().join("cascade_vision_white_file.png");
        save(&path, &solid(50, 50, ColorSample::WHITE)).expect("Error Saving File.");
        let read_back = image::open(&path).expect("readable").to_rgb8();
        assert_eq!(read_back.get_pixel(49, 49), &image::Rgb([255, 255, 255]));
        let _ = std::fs::remove_file(path);
    }
}
