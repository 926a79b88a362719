use glam::Vec2;
use image::{DynamicImage, GenericImageView, imageops::FilterType};
use ndarray::Array4;
use snafu::ensure;

use crate::{
    consts::{BATCH_SIZE, INPUT_CHANNELS},
    error::{ConfigSnafu, DetectError},
};

/// Scale and padding that fit an arbitrary-sized image into a fixed square
/// model input while preserving aspect ratio.
///
/// Created once per input image and consumed by both the preprocessing step
/// and the coordinate remapper; immutable.
#[derive(Clone, Copy, Debug)]
pub struct LetterboxParams {
    /// Uniform scale factor, `min(target / src_w, target / src_h)`.
    pub scale: f32,
    /// Horizontal padding centering the scaled image, in tensor pixels.
    pub pad_x: f32,
    /// Vertical padding centering the scaled image, in tensor pixels.
    pub pad_y: f32,
}

impl LetterboxParams {
    /// Computes the letterbox transform for a `src_w` × `src_h` image and a
    /// square target of side `target`.
    ///
    /// Fails with a configuration error if either source dimension is
    /// non-positive or the target size is zero.
    pub fn new(src_w: f32, src_h: f32, target: u32) -> Result<Self, DetectError> {
        ensure!(
            src_w > 0.0 && src_h > 0.0,
            ConfigSnafu {
                message: format!("source dimensions must be positive, got {src_w}x{src_h}"),
            }
        );
        ensure!(
            target > 0,
            ConfigSnafu {
                message: "target size must be positive",
            }
        );

        let target = target as f32;
        let scale = f32::min(target / src_w, target / src_h);
        let new_w = (src_w * scale).round();
        let new_h = (src_h * scale).round();
        let pad_x = ((target - new_w) / 2.0).round();
        let pad_y = ((target - new_h) / 2.0).round();

        Ok(Self {
            scale,
            pad_x,
            pad_y,
        })
    }

    /// Maps a point from original-image space into input-tensor space.
    pub fn to_input(&self, p: Vec2) -> Vec2 {
        p * self.scale + Vec2::new(self.pad_x, self.pad_y)
    }

    /// Inverse mapping: input-tensor space back to original-image space.
    pub fn to_image(&self, p: Vec2) -> Vec2 {
        (p - Vec2::new(self.pad_x, self.pad_y)) / self.scale
    }
}

/// Resizes and normalizes an image into a `[1, 3, S, S]` channel-major
/// tensor, scaled image centered and the background left zero (black).
///
/// Pixel values are scaled from 8-bit to `[0, 1]`.
pub fn preprocess(
    image: &DynamicImage,
    target: u32,
) -> Result<(Array4<f32>, LetterboxParams), DetectError> {
    let (w0, h0) = image.dimensions();
    let params = LetterboxParams::new(w0 as f32, h0 as f32, target)?;

    let new_w = (w0 as f32 * params.scale).round() as u32;
    let new_h = (h0 as f32 * params.scale).round() as u32;
    let resized = image.resize_exact(new_w, new_h, FilterType::Triangle);

    let mut input = Array4::zeros([
        BATCH_SIZE,
        INPUT_CHANNELS,
        target as usize,
        target as usize,
    ]);

    let (x_off, y_off) = (params.pad_x as usize, params.pad_y as usize);
    for (x, y, pixel) in resized.pixels() {
        let x = x as usize + x_off;
        let y = y as usize + y_off;
        let [r, g, b, _] = pixel.0;
        input[[0, 0, y, x]] = r as f32 / 255.0;
        input[[0, 1, y, x]] = g as f32 / 255.0;
        input[[0, 2, y, x]] = b as f32 / 255.0;
    }

    Ok((input, params))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_hd_to_640() {
        let params = LetterboxParams::new(1920.0, 1080.0, 640).unwrap();
        assert!((params.scale - 1.0 / 3.0).abs() < 1e-5);
        assert_eq!(params.pad_x, 0.0);
        assert_eq!(params.pad_y, 140.0);
    }

    #[test]
    fn test_portrait_pads_horizontally() {
        let params = LetterboxParams::new(1080.0, 1920.0, 640).unwrap();
        assert_eq!(params.pad_x, 140.0);
        assert_eq!(params.pad_y, 0.0);
    }

    #[test]
    fn test_non_positive_dimensions_rejected() {
        assert!(LetterboxParams::new(0.0, 1080.0, 640).is_err());
        assert!(LetterboxParams::new(1920.0, -1.0, 640).is_err());
        assert!(LetterboxParams::new(1920.0, 1080.0, 0).is_err());
    }

    #[test]
    fn test_round_trip_within_one_pixel() {
        let params = LetterboxParams::new(1920.0, 1080.0, 640).unwrap();
        for p in [
            Vec2::new(0.0, 0.0),
            Vec2::new(1919.0, 1079.0),
            Vec2::new(960.0, 540.0),
            Vec2::new(13.0, 1001.0),
        ] {
            let round_tripped = params.to_image(params.to_input(p));
            assert!((round_tripped - p).abs().max_element() <= 1.0);
        }
    }

    #[test]
    fn test_preprocess_tensor_shape() {
        let img = DynamicImage::new_rgb8(800, 600);
        let (tensor, _) = preprocess(&img, 640).unwrap();
        assert_eq!(tensor.shape(), &[1, 3, 640, 640]);
    }

    #[test]
    fn test_preprocess_normalization() {
        let img = DynamicImage::new_rgb8(64, 64);
        let (tensor, _) = preprocess(&img, 64).unwrap();
        for &value in tensor.iter() {
            assert!((0.0..=1.0).contains(&value));
        }
    }

    #[test]
    fn test_preprocess_centers_image() {
        // A 100x50 white image into a 64 target: scaled to 64x32, so rows
        // [0, 16) and [48, 64) stay black background.
        let img = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            100,
            50,
            image::Rgb([255, 255, 255]),
        ));
        let (tensor, params) = preprocess(&img, 64).unwrap();
        assert_eq!(params.pad_y, 16.0);

        assert_eq!(tensor[[0, 0, 0, 0]], 0.0);
        assert_eq!(tensor[[0, 0, 63, 63]], 0.0);
        assert_eq!(tensor[[0, 0, 32, 32]], 1.0);
        assert_eq!(tensor[[0, 1, 16, 0]], 1.0);
    }
}
