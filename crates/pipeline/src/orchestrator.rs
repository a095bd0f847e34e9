//! End-to-end extraction run for one page image

use crate::output::ExtractionArtifact;
use crate::{PipelineConfig, PipelineError, Transcriber, TranscriptionRequest, Variant};
use image::RgbImage;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use table_extract_common::SharedLogger;
use table_extract_detection::{
    crop_padded, DetectionFilter, Detector, TableRegion, DEFAULT_TABLE_LABEL,
};
use table_extract_parser::{ParsedTable, TableTextParser};
use table_extract_tiling::AspectRatioTiler;

/// Stage of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Init,
    Detect,
    ExtractContent,
    Persist,
    Done,
    Failed,
}

/// Result of a completed run
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionOutcome {
    /// Every table parsed from every crop, in page order
    pub tables: Vec<ParsedTable>,
    /// JSON artifact, absent when no table was detected
    pub artifact_path: Option<PathBuf>,
    /// Number of detections kept after filtering
    pub detected_tables: usize,
    pub elapsed: Duration,
}

/// Detect, transcribe, parse and persist the tables of one page.
///
/// Tables are processed one after another; the first failure ends the run
/// in [`PipelineState::Failed`] and nothing is persisted.
pub struct TableExtractor<D, T> {
    config: PipelineConfig,
    detector: D,
    transcriber: T,
    filter: DetectionFilter,
    tiler: AspectRatioTiler,
    parser: TableTextParser,
    logger: SharedLogger,
    state: PipelineState,
}

impl<D: Detector, T: Transcriber> TableExtractor<D, T> {
    pub fn new(
        config: PipelineConfig,
        detector: D,
        transcriber: T,
        logger: SharedLogger,
    ) -> Result<Self, PipelineError> {
        config.validate()?;
        let filter = DetectionFilter::new(
            DEFAULT_TABLE_LABEL,
            config.threshold,
            config.padding,
            logger.clone(),
        )?;
        let tiler = AspectRatioTiler::new(config.tiling, logger.clone())?;
        let parser = TableTextParser::new(logger.clone());

        Ok(Self {
            config,
            detector,
            transcriber,
            filter,
            tiler,
            parser,
            logger,
            state: PipelineState::Init,
        })
    }

    #[must_use]
    pub fn state(&self) -> PipelineState {
        self.state
    }

    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    #[must_use]
    pub fn variant(&self) -> Variant {
        self.config.variant()
    }

    #[must_use]
    pub fn detector(&self) -> &D {
        &self.detector
    }

    #[must_use]
    pub fn transcriber(&self) -> &T {
        &self.transcriber
    }

    /// Run with the current time as the run timestamp
    pub fn run(&mut self) -> Result<ExtractionOutcome, PipelineError> {
        self.run_at(chrono::Utc::now().timestamp())
    }

    /// Run with a fixed timestamp, used in every file name of this run
    pub fn run_at(&mut self, timestamp: i64) -> Result<ExtractionOutcome, PipelineError> {
        let result = self.execute(timestamp);
        if result.is_err() {
            self.state = PipelineState::Failed;
        }
        result
    }

    fn execute(&mut self, timestamp: i64) -> Result<ExtractionOutcome, PipelineError> {
        let start = Instant::now();
        self.logger.info("Pipeline started");
        for (key, value) in self.config.summary() {
            self.logger.info(&format!("CONFIG ** {key}: {value}"));
        }

        let options = self.config.model_options();
        self.detector.prepare(&options)?;
        self.transcriber.prepare(&options)?;

        self.state = PipelineState::Detect;
        let image_path = self.config.image_path.clone();
        let page = load_page(&image_path)?;
        let stem = image_stem(&image_path);

        let detections = self.detector.detect(&page)?;
        let regions = self.filter.select(&detections, self.detector.labels());
        for region in &regions {
            let [x1, y1, x2, y2] = region.bbox.to_array();
            self.logger.info(&format!(
                "{}_table_{} --> Score: {}, Box: [{x1:?}, {y1:?}, {x2:?}, {y2:?}]",
                stem, region.index, region.score
            ));
        }

        if regions.is_empty() {
            self.logger.info("No tables found!");
            self.logger
                .info(&format!("Pipeline completed for {}", image_path.display()));
            self.state = PipelineState::Done;
            return Ok(ExtractionOutcome {
                tables: Vec::new(),
                artifact_path: None,
                detected_tables: 0,
                elapsed: start.elapsed(),
            });
        }

        self.state = PipelineState::ExtractContent;
        let mut tables = Vec::new();
        for region in &regions {
            tables.extend(self.extract_region(&page, region, &stem, timestamp)?);
        }

        self.state = PipelineState::Persist;
        let artifact = ExtractionArtifact::new(stem, self.variant(), timestamp, &tables);
        let artifact_path = artifact.write_to(&self.config.output_path)?;
        self.logger.info(&format!(
            "Saved {} tables to {}",
            tables.len(),
            artifact_path.display()
        ));

        self.state = PipelineState::Done;
        let elapsed = start.elapsed();
        self.logger
            .info(&format!("Pipeline completed for {}", image_path.display()));
        self.logger.info(&format!(
            "Total time taken = {:.2} seconds",
            elapsed.as_secs_f64()
        ));

        Ok(ExtractionOutcome {
            tables,
            artifact_path: Some(artifact_path),
            detected_tables: regions.len(),
            elapsed,
        })
    }

    fn extract_region(
        &mut self,
        page: &RgbImage,
        region: &TableRegion,
        stem: &str,
        timestamp: i64,
    ) -> Result<Vec<ParsedTable>, PipelineError> {
        let table_name = format!("{stem}_table_{}", region.index);
        let crop = crop_padded(page, &region.padded)?;

        if self.config.save_temp_files {
            save_temp_files(
                &self.config.output_path.join("temp"),
                &table_name,
                timestamp,
                &crop,
                region,
            )?;
        }

        let tiles = self.tiler.tile(&crop)?;
        let request = TranscriptionRequest::new(
            &tiles,
            self.tiler.config().image_size,
            self.variant().prompt(),
            self.config.max_new_tokens,
        );
        let text = self.transcriber.transcribe(&request)?;

        let tables = self.parser.parse(&text);
        self.logger.debug(&format!(
            "{table_name}: {} tiles, {} chars transcribed, {} tables parsed",
            tiles.len(),
            text.len(),
            tables.len()
        ));
        Ok(tables)
    }
}

fn load_page(path: &Path) -> Result<RgbImage, PipelineError> {
    let image = image::open(path).map_err(|source| PipelineError::Image {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(image.to_rgb8())
}

fn image_stem(path: &Path) -> String {
    path.file_stem()
        .map_or_else(|| "image".to_string(), |s| s.to_string_lossy().into_owned())
}

/// Crop PNG plus a sidecar with the unpadded box
fn save_temp_files(
    dir: &Path,
    table_name: &str,
    timestamp: i64,
    crop: &RgbImage,
    region: &TableRegion,
) -> Result<(), PipelineError> {
    std::fs::create_dir_all(dir).map_err(|source| PipelineError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let image_path = dir.join(format!("{table_name}_{timestamp}.png"));
    crop.save(&image_path).map_err(|source| PipelineError::Image {
        path: image_path.clone(),
        source,
    })?;

    let [x1, y1, x2, y2] = region.bbox.to_array();
    let box_path = dir.join(format!("{table_name}_box_{timestamp}.txt"));
    let contents = format!(
        "Score: {}\nBox: [{x1:?}, {y1:?}, {x2:?}, {y2:?}]",
        region.score
    );
    std::fs::write(&box_path, contents).map_err(|source| PipelineError::Io {
        path: box_path,
        source,
    })
}
