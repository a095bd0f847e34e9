//! Parse command implementation

use anyhow::{Context as _, Result};
use clap::{Args, ValueEnum};
use std::io::Read;
use std::path::PathBuf;
use table_extract_common::TracingLogger;
use table_extract_parser::{TableTextParser, DEFAULT_DELIMITER};

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    Markdown,
    Json,
}

#[derive(Args)]
pub struct ParseCommand {
    /// Text file with transcription output ("-" reads stdin)
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Field delimiter
    #[arg(short, long, default_value_t = DEFAULT_DELIMITER)]
    delimiter: char,

    /// Output format
    #[arg(short, long, value_enum, default_value = "markdown")]
    format: OutputFormat,
}

impl ParseCommand {
    pub fn execute(self) -> Result<()> {
        let text = if self.input.as_os_str() == "-" {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read stdin")?;
            buffer
        } else {
            std::fs::read_to_string(&self.input)
                .with_context(|| format!("Failed to read {}", self.input.display()))?
        };

        let parser = TableTextParser::with_delimiter(self.delimiter, TracingLogger::shared())?;
        let tables = parser.parse(&text);

        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&tables)?);
            }
            OutputFormat::Markdown => {
                for (index, table) in tables.iter().enumerate() {
                    if index > 0 {
                        println!();
                    }
                    print!("{}", table.to_markdown());
                }
            }
        }
        Ok(())
    }
}
