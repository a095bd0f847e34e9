//! Aspect-ratio preserving image tiling
//!
//! Splits a cropped table region into a grid of fixed-size square tiles for
//! the transcription model. The grid is chosen from every `(columns, rows)`
//! pair whose block count lies within `[min_blocks, max_blocks]`, picking the
//! one whose aspect ratio is closest to the crop's own.
//!
//! # Example
//! ```no_run
//! use table_extract_common::TracingLogger;
//! use table_extract_tiling::{AspectRatioTiler, TilingConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let tiler = AspectRatioTiler::new(TilingConfig::default(), TracingLogger::shared())?;
//! let crop = image::open("table.png")?.to_rgb8();
//! let tiles = tiler.tile(&crop)?;
//! println!("{} tiles of 448x448", tiles.len());
//! # Ok(())
//! # }
//! ```

pub mod grid;
pub mod tensor;

pub use grid::{candidate_grids, closest_grid, GridShape};
pub use tensor::{normalized_chw, pixel_values, IMAGENET_MEAN, IMAGENET_STD};

use image::imageops::{self, FilterType};
use image::RgbImage;
use serde::{Deserialize, Serialize};
use table_extract_common::SharedLogger;
use thiserror::Error;

/// Default tile edge length in pixels
pub const DEFAULT_IMAGE_SIZE: u32 = 448;
/// Default lower bound on the number of tiles
pub const DEFAULT_MIN_BLOCKS: u32 = 1;
/// Default upper bound on the number of tiles
pub const DEFAULT_MAX_BLOCKS: u32 = 12;
/// Largest accepted tile edge length
pub const MAX_IMAGE_SIZE: u32 = 1024;
/// Largest accepted `max_blocks`
pub const MAX_BLOCKS_LIMIT: u32 = 64;

/// Configuration for tiling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TilingConfig {
    /// Edge length of every square tile
    pub image_size: u32,
    /// Minimum number of tiles per crop
    pub min_blocks: u32,
    /// Maximum number of tiles per crop
    pub max_blocks: u32,
}

impl Default for TilingConfig {
    fn default() -> Self {
        Self {
            image_size: DEFAULT_IMAGE_SIZE,
            min_blocks: DEFAULT_MIN_BLOCKS,
            max_blocks: DEFAULT_MAX_BLOCKS,
        }
    }
}

impl TilingConfig {
    pub fn validate(&self) -> Result<(), TilingError> {
        if self.image_size == 0 || self.image_size > MAX_IMAGE_SIZE {
            return Err(TilingError::InvalidConfig(format!(
                "image_size must be in 1..={MAX_IMAGE_SIZE} (got {})",
                self.image_size
            )));
        }
        if self.min_blocks == 0 {
            return Err(TilingError::InvalidConfig(
                "min_blocks must be >= 1".to_string(),
            ));
        }
        if self.min_blocks > self.max_blocks {
            return Err(TilingError::InvalidConfig(format!(
                "min_blocks ({}) must not exceed max_blocks ({})",
                self.min_blocks, self.max_blocks
            )));
        }
        if self.max_blocks > MAX_BLOCKS_LIMIT {
            return Err(TilingError::InvalidConfig(format!(
                "max_blocks must not exceed {MAX_BLOCKS_LIMIT} (got {})",
                self.max_blocks
            )));
        }
        Ok(())
    }
}

/// One square patch of a resized crop
#[derive(Debug, Clone)]
pub struct Tile {
    /// Position in row-major reading order
    pub index: usize,
    /// Grid column (0-based, left to right)
    pub column: u32,
    /// Grid row (0-based, top to bottom)
    pub row: u32,
    pub image: RgbImage,
}

/// Errors that can occur while tiling
#[derive(Debug, Error)]
pub enum TilingError {
    #[error("Invalid tiling configuration: {0}")]
    InvalidConfig(String),

    #[error("Image dimensions must be non-zero (got {width}x{height})")]
    EmptyImage { width: u32, height: u32 },
}

/// Splits images into an aspect-ratio matched grid of square tiles
pub struct AspectRatioTiler {
    config: TilingConfig,
    candidates: Vec<GridShape>,
    logger: SharedLogger,
}

impl AspectRatioTiler {
    /// Create a tiler; candidate grids are enumerated once up front
    pub fn new(config: TilingConfig, logger: SharedLogger) -> Result<Self, TilingError> {
        config.validate()?;
        let candidates = candidate_grids(config.min_blocks, config.max_blocks);
        Ok(Self {
            config,
            candidates,
            logger,
        })
    }

    #[must_use]
    pub fn config(&self) -> &TilingConfig {
        &self.config
    }

    /// Grid that would be used for an image of the given size
    pub fn select_grid(&self, width: u32, height: u32) -> Result<GridShape, TilingError> {
        if width == 0 || height == 0 {
            return Err(TilingError::EmptyImage { width, height });
        }
        // validate() guarantees (1, min_blocks) is always a candidate
        closest_grid(width, height, &self.candidates, self.config.image_size).ok_or_else(|| {
            TilingError::InvalidConfig("no candidate grid within block bounds".to_string())
        })
    }

    /// Resize `image` to the selected grid and cut it into tiles, row-major
    pub fn tile(&self, image: &RgbImage) -> Result<Vec<Tile>, TilingError> {
        let (width, height) = image.dimensions();
        let grid = self.select_grid(width, height)?;
        let size = self.config.image_size;

        self.logger.debug(&format!(
            "Tiling {width}x{height} image into {}x{} grid ({} tiles)",
            grid.columns,
            grid.rows,
            grid.blocks()
        ));

        let resized = imageops::resize(
            image,
            size * grid.columns,
            size * grid.rows,
            FilterType::CatmullRom,
        );

        let blocks = grid.blocks() as usize;
        let mut tiles = Vec::with_capacity(blocks);
        for index in 0..blocks {
            let column = index as u32 % grid.columns;
            let row = index as u32 / grid.columns;
            let patch = imageops::crop_imm(&resized, column * size, row * size, size, size)
                .to_image();
            tiles.push(Tile {
                index,
                column,
                row,
                image: patch,
            });
        }

        Ok(tiles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use std::sync::Arc;
    use table_extract_common::MemoryLogger;

    fn tiler(config: TilingConfig) -> AspectRatioTiler {
        AspectRatioTiler::new(config, Arc::new(MemoryLogger::new())).unwrap()
    }

    #[test]
    fn test_config_defaults() {
        let config = TilingConfig::default();
        assert_eq!(config.image_size, 448);
        assert_eq!(config.min_blocks, 1);
        assert_eq!(config.max_blocks, 12);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_rejects_inverted_bounds() {
        let config = TilingConfig {
            min_blocks: 6,
            max_blocks: 4,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(TilingError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_config_rejects_zero_values() {
        let zero_size = TilingConfig {
            image_size: 0,
            ..Default::default()
        };
        assert!(zero_size.validate().is_err());

        let zero_min = TilingConfig {
            min_blocks: 0,
            ..Default::default()
        };
        assert!(zero_min.validate().is_err());
    }

    #[test]
    fn test_config_rejects_oversized_values() {
        let many_blocks = TilingConfig {
            max_blocks: 70_000,
            ..Default::default()
        };
        assert!(matches!(
            many_blocks.validate(),
            Err(TilingError::InvalidConfig(_))
        ));
        assert!(AspectRatioTiler::new(many_blocks, Arc::new(MemoryLogger::new())).is_err());

        let huge_tiles = TilingConfig {
            image_size: 3_000_000_000,
            ..Default::default()
        };
        assert!(matches!(
            huge_tiles.validate(),
            Err(TilingError::InvalidConfig(_))
        ));

        let at_limits = TilingConfig {
            image_size: MAX_IMAGE_SIZE,
            min_blocks: 1,
            max_blocks: MAX_BLOCKS_LIMIT,
        };
        assert!(at_limits.validate().is_ok());
    }

    #[test]
    fn test_tile_wide_crop() {
        let tiler = tiler(TilingConfig::default());
        let image = RgbImage::from_pixel(2000, 500, Rgb([255, 255, 255]));
        let tiles = tiler.tile(&image).unwrap();

        assert_eq!(tiles.len(), 4);
        for (index, tile) in tiles.iter().enumerate() {
            assert_eq!(tile.index, index);
            assert_eq!(tile.column, index as u32);
            assert_eq!(tile.row, 0);
            assert_eq!(tile.image.dimensions(), (448, 448));
        }
    }

    #[test]
    fn test_tiles_are_row_major() {
        let config = TilingConfig {
            image_size: 8,
            min_blocks: 1,
            max_blocks: 3,
        };
        let tiler = tiler(config);
        // 2:1 image picks a 2x1 grid; left half red, right half blue
        let image = RgbImage::from_fn(200, 100, |x, _| {
            if x < 100 {
                Rgb([255, 0, 0])
            } else {
                Rgb([0, 0, 255])
            }
        });
        let tiles = tiler.tile(&image).unwrap();

        assert_eq!(tiles.len(), 2);
        assert_eq!(tiles[0].image.get_pixel(0, 0), &Rgb([255, 0, 0]));
        assert_eq!(tiles[1].image.get_pixel(7, 7), &Rgb([0, 0, 255]));
    }

    #[test]
    fn test_grid_rows_advance_after_full_row() {
        let config = TilingConfig {
            image_size: 4,
            min_blocks: 1,
            max_blocks: 12,
        };
        let tiler = tiler(config);
        // 3:2 aspect ratio selects a 3x2 grid
        let image = RgbImage::from_pixel(30, 20, Rgb([10, 20, 30]));
        let tiles = tiler.tile(&image).unwrap();

        let positions: Vec<(u32, u32)> = tiles.iter().map(|t| (t.column, t.row)).collect();
        assert_eq!(
            positions,
            vec![(0, 0), (1, 0), (2, 0), (0, 1), (1, 1), (2, 1)]
        );
    }

    #[test]
    fn test_min_blocks_forces_split() {
        let config = TilingConfig {
            min_blocks: 2,
            ..Default::default()
        };
        let tiler = tiler(config);
        let image = RgbImage::from_pixel(300, 300, Rgb([0, 0, 0]));
        let tiles = tiler.tile(&image).unwrap();
        assert!(tiles.len() >= 2);
    }

    #[test]
    fn test_zero_sized_image_rejected() {
        let tiler = tiler(TilingConfig::default());
        let image = RgbImage::new(0, 10);
        assert!(matches!(
            tiler.tile(&image),
            Err(TilingError::EmptyImage { width: 0, height: 10 })
        ));
    }

    #[test]
    fn test_grid_choice_is_logged() {
        let logger = Arc::new(MemoryLogger::new());
        let tiler = AspectRatioTiler::new(TilingConfig::default(), logger.clone()).unwrap();
        let image = RgbImage::from_pixel(100, 100, Rgb([0, 0, 0]));
        tiler.tile(&image).unwrap();
        assert!(logger.contains("1x1 grid"));
    }
}
