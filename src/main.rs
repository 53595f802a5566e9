use anyhow::{Context, Result};
use clap::Parser;
use pureimport::config::{Config, InputFormat};
use pureimport::language::LanguageDetector;
use pureimport::pipeline::{Converter, OutputTarget};
use pureimport::{CsvSource, RowSource, SchemaVariant, XlsxSource};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;

/// Convert a research-output spreadsheet into a Pure XML import file.
#[derive(Debug, Parser)]
#[command(name = "pureimport", version, about)]
struct Args {
    /// Configuration file (defaults to ./pureimport.toml when present)
    #[arg(short, long, env = "PUREIMPORT_CONFIG")]
    config: Option<PathBuf>,

    /// Schema variant, e.g. publications-bogota
    #[arg(short, long)]
    variant: Option<String>,

    /// Input workbook or CSV file
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Sheet to read from a workbook
    #[arg(short, long)]
    sheet: Option<String>,

    /// Directory for the generated XML file
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// File name suffix after the date stamp
    #[arg(long)]
    suffix: Option<String>,

    /// Append-only log file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Print the supported schema variants and exit
    #[arg(long)]
    list_variants: bool,
}

impl Args {
    fn config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };

        if let Some(variant) = &self.variant {
            config.variant = variant.clone();
        }
        if let Some(input) = &self.input {
            config.input.path = input.clone();
        }
        if let Some(sheet) = &self.sheet {
            config.input.sheet = sheet.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output.dir = Some(dir.clone());
        }
        if let Some(suffix) = &self.suffix {
            config.output.suffix = Some(suffix.clone());
        }
        if let Some(log_file) = &self.log_file {
            config.log_file = log_file.clone();
        }
        Ok(config)
    }
}

fn init_logging(log_file: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("cannot open log file {}", log_file.display()))?;

    let console = tracing_subscriber::fmt::layer().with_filter(
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("pureimport=debug,info")),
    );
    let run_log = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_writer(Mutex::new(file))
        .with_filter(LevelFilter::INFO);

    tracing_subscriber::registry()
        .with(console)
        .with(run_log)
        .try_init()
        .context("cannot install the log subscriber")?;
    Ok(())
}

#[cfg(feature = "whatlang")]
fn detector() -> Box<dyn LanguageDetector> {
    Box::new(pureimport::language::WhatlangDetector)
}

#[cfg(not(feature = "whatlang"))]
fn detector() -> Box<dyn LanguageDetector> {
    Box::new(pureimport::language::NoDetection)
}

fn run(config: &Config) -> Result<PathBuf> {
    let variant = config.schema_variant()?;
    let input = &config.input.path;

    let mut source: Box<dyn RowSource> = match config.input.format.resolve(input) {
        InputFormat::Csv => Box::new(CsvSource::new(input).with_auto_detection()),
        _ => Box::new(XlsxSource::new(input, &config.input.sheet)),
    };

    let target = OutputTarget::new(config.output_dir(variant), config.output_suffix(variant));
    info!(
        "Converting {} as {} into {}",
        input.display(),
        variant.as_str(),
        target.dir.display()
    );

    let detector = detector();
    let summary = Converter::new(variant.rules(), detector.as_ref()).run(source.as_mut(), &target)?;
    info!(
        "{} rows read, {} skipped, {} failed, {} records written",
        summary.rows_read, summary.rows_skipped, summary.rows_failed, summary.records_written
    );
    Ok(summary.path)
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.list_variants {
        for variant in SchemaVariant::ALL {
            println!("{}", variant.as_str());
        }
        return Ok(());
    }

    let config = args.config()?;
    init_logging(&config.log_file)?;

    match run(&config) {
        Ok(path) => {
            println!("XML file generated: {}", path.display());
            Ok(())
        }
        Err(err) => {
            error!("Conversion failed: {:#}", err);
            Err(err)
        }
    }
}
