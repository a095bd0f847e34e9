//! Cropping of padded table regions

use crate::{BoundingBox, DetectionError};
use image::{imageops, RgbImage};

/// A crop may span at most this many page widths (heights)
pub const MAX_CROP_SCALE: i64 = 3;

/// Cut `rect` out of `image`.
///
/// Coordinates are rounded half-to-even. Parts of the rectangle outside
/// the image come out black, so a padded box at the page edge keeps its
/// full size. Non-finite coordinates and crops larger than
/// [`MAX_CROP_SCALE`] times the page are rejected.
pub fn crop_padded(image: &RgbImage, rect: &BoundingBox) -> Result<RgbImage, DetectionError> {
    let coords = rect.to_array();
    if coords.iter().any(|c| !c.is_finite()) {
        return Err(DetectionError::InvalidParameters(format!(
            "crop rectangle has non-finite coordinates: {coords:?}"
        )));
    }

    let x1 = rect.x1.round_ties_even() as i64;
    let y1 = rect.y1.round_ties_even() as i64;
    let x2 = rect.x2.round_ties_even() as i64;
    let y2 = rect.y2.round_ties_even() as i64;

    let (Some(width), Some(height)) = (x2.checked_sub(x1), y2.checked_sub(y1)) else {
        return Err(DetectionError::InvalidParameters(format!(
            "crop rectangle {x1},{y1},{x2},{y2} is out of range"
        )));
    };
    if width <= 0 || height <= 0 {
        return Err(DetectionError::EmptyCrop { x1, y1, x2, y2 });
    }

    let (page_width, page_height) = image.dimensions();
    if width > MAX_CROP_SCALE * i64::from(page_width)
        || height > MAX_CROP_SCALE * i64::from(page_height)
    {
        return Err(DetectionError::InvalidParameters(format!(
            "crop of {width}x{height} is too large for a {page_width}x{page_height} page"
        )));
    }
    let (Ok(width), Ok(height)) = (u32::try_from(width), u32::try_from(height)) else {
        return Err(DetectionError::InvalidParameters(format!(
            "crop of {width}x{height} exceeds image limits"
        )));
    };

    let mut canvas = RgbImage::new(width, height);
    imageops::replace(&mut canvas, image, -x1, -y1);
    Ok(canvas)
}
