//! Tile command implementation

use anyhow::{Context as _, Result};
use clap::Args;
use std::path::PathBuf;
use table_extract_common::TracingLogger;
use table_extract_tiling::{
    AspectRatioTiler, TilingConfig, DEFAULT_IMAGE_SIZE, DEFAULT_MAX_BLOCKS, DEFAULT_MIN_BLOCKS,
};
use tracing::info;

#[derive(Args)]
pub struct TileCommand {
    /// Image to tile
    #[arg(value_name = "IMAGE")]
    input: PathBuf,

    /// Tile edge length in pixels
    #[arg(long, default_value_t = DEFAULT_IMAGE_SIZE)]
    image_size: u32,

    /// Minimum number of tiles
    #[arg(long, default_value_t = DEFAULT_MIN_BLOCKS)]
    min_blocks: u32,

    /// Maximum number of tiles
    #[arg(long, default_value_t = DEFAULT_MAX_BLOCKS)]
    max_blocks: u32,

    /// Write every tile as PNG into this directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

impl TileCommand {
    pub fn execute(self) -> Result<()> {
        let image = image::open(&self.input)
            .with_context(|| format!("Failed to open image: {}", self.input.display()))?
            .to_rgb8();

        let config = TilingConfig {
            image_size: self.image_size,
            min_blocks: self.min_blocks,
            max_blocks: self.max_blocks,
        };
        let tiler = AspectRatioTiler::new(config, TracingLogger::shared())?;
        let (width, height) = image.dimensions();
        let grid = tiler.select_grid(width, height)?;
        let tiles = tiler.tile(&image)?;

        println!(
            "Grid: {}x{} ({} tiles of {}x{})",
            grid.columns,
            grid.rows,
            tiles.len(),
            config.image_size,
            config.image_size
        );

        if let Some(dir) = &self.output_dir {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
            let stem = self
                .input
                .file_stem()
                .map_or_else(|| "image".into(), |s| s.to_string_lossy());
            for tile in &tiles {
                let path = dir.join(format!("{stem}_tile_{}.png", tile.index));
                tile.image
                    .save(&path)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
            }
            info!("Wrote {} tiles to {}", tiles.len(), dir.display());
        }
        Ok(())
    }
}
