//! table-extract - table extraction from document images
//!
//! Command-line interface over the extraction pipeline, the markdown table
//! parser, the tiler and the evaluation harness.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::ExitCode;

mod commands;
mod logging;

use commands::evaluate::EvaluateCommand;
use commands::extract::ExtractCommand;
use commands::parse::ParseCommand;
use commands::tile::TileCommand;

#[derive(Parser)]
#[command(
    name = "table-extract",
    version,
    about = "Extract tables from document images",
    long_about = "Detect tables in a page image, transcribe each table and parse the \
                  transcription into structured rows.\n\n\
                  Model outputs are supplied as recorded files, so runs are reproducible.",
    after_help = "EXAMPLES:\n  \
                  # Run the pipeline with recorded detections and transcriptions\n  \
                  table-extract extract --config config.json --detections det.json --transcripts tr.json\n\n  \
                  # Parse markdown tables out of model output\n  \
                  table-extract parse response.txt --format json\n\n  \
                  # Show how a crop would be tiled\n  \
                  table-extract tile crop.png --output-dir tiles\n\n  \
                  # Compare pipeline A and B against ground truth\n  \
                  table-extract evaluate results.json --grouped"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the extraction pipeline on one page image
    Extract(ExtractCommand),

    /// Parse markdown tables from transcription text
    Parse(ParseCommand),

    /// Split an image into aspect-preserving tiles
    Tile(TileCommand),

    /// Score pipeline A and B transcriptions against ground truth
    Evaluate(EvaluateCommand),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let verbose = cli.verbose;

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if !tracing::dispatcher::has_been_set() {
                // Failed before logging was configured (e.g. unreadable config)
                let _ = logging::init(verbose, None);
            }
            tracing::error!("An error occurred: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Extract(cmd) => {
            let config = cmd.load_config()?;
            logging::init(cli.verbose, config.log_file_path.as_deref())?;
            cmd.execute(config)
        }
        Commands::Parse(cmd) => {
            logging::init(cli.verbose, None)?;
            cmd.execute()
        }
        Commands::Tile(cmd) => {
            logging::init(cli.verbose, None)?;
            cmd.execute()
        }
        Commands::Evaluate(cmd) => {
            logging::init(cli.verbose, None)?;
            cmd.execute()
        }
    }
}
