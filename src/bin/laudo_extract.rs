// laudo-extract: run field extraction over recognized text
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use laudo_ocr::config::{ExtractionConfig, APP_VERSION};
use laudo_ocr::RecordExtractor;

#[derive(Parser)]
#[command(name = "laudo-extract")]
#[command(version = APP_VERSION)]
#[command(about = "Extract patient and echocardiography fields from OCR text", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Extraction config (JSON); defaults apply to missing keys
    #[arg(long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Print single-line JSON
    #[arg(long, global = true)]
    compact: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Patient identity fields (nome, responsavel, especie, ...)
    Patient {
        /// Text file; reads stdin when omitted
        #[arg(value_name = "FILE")]
        input: Option<PathBuf>,
    },

    /// Measurement groups, sections, exam info and patient data
    Exam {
        /// Text file; reads stdin when omitted
        #[arg(value_name = "FILE")]
        input: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    laudo_ocr::init_tracing();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ExtractionConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ExtractionConfig::default(),
    };
    let extractor = RecordExtractor::new(config);

    let json = match &cli.command {
        Commands::Patient { input } => {
            let record = extractor.extract_patient(&read_input(input.as_deref())?);
            to_json(&record, cli.compact)?
        }
        Commands::Exam { input } => {
            let record = extractor.extract_exam(&read_input(input.as_deref())?);
            to_json(&record, cli.compact)?
        }
    };

    println!("{json}");
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            Ok(text)
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T, compact: bool) -> Result<String> {
    let json = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    Ok(json)
}
