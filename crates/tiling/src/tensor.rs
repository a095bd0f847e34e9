//! Tile tensor preparation for vision-language transcription models
//!
//! Pipeline per tile:
//! 1. Resize to `input_size x input_size` (bicubic, skipped when already sized)
//! 2. Rescale to [0, 1]
//! 3. Normalize with `ImageNet` mean/std
//! 4. HWC -> CHW, stacked into `(N, 3, H, W)`

use crate::Tile;
use image::imageops::{self, FilterType};
use image::RgbImage;
use ndarray::{s, Array3, Array4};
use std::borrow::Cow;

/// `ImageNet` channel means (RGB)
pub const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
/// `ImageNet` channel standard deviations (RGB)
pub const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Normalized `(3, H, W)` tensor of an RGB image
#[must_use]
pub fn normalized_chw(image: &RgbImage) -> Array3<f32> {
    let (width, height) = image.dimensions();
    let mut chw = Array3::zeros((3, height as usize, width as usize));
    for (x, y, pixel) in image.enumerate_pixels() {
        for channel in 0..3 {
            let value = f32::from(pixel[channel]) / 255.0;
            chw[[channel, y as usize, x as usize]] =
                (value - IMAGENET_MEAN[channel]) / IMAGENET_STD[channel];
        }
    }
    chw
}

/// Stack tiles into a `(N, 3, input_size, input_size)` batch
#[must_use]
pub fn pixel_values(tiles: &[Tile], input_size: u32) -> Array4<f32> {
    let size = input_size as usize;
    let mut batch = Array4::zeros((tiles.len(), 3, size, size));

    for (n, tile) in tiles.iter().enumerate() {
        let image = if tile.image.dimensions() == (input_size, input_size) {
            Cow::Borrowed(&tile.image)
        } else {
            Cow::Owned(imageops::resize(
                &tile.image,
                input_size,
                input_size,
                FilterType::CatmullRom,
            ))
        };
        batch
            .slice_mut(s![n, .., .., ..])
            .assign(&normalized_chw(&image));
    }

    batch
}
