//! CLI entry point for the used-car listing pipeline.

use anyhow::{Context, Result};
use clap::Parser;
use listing_pipeline::{
    ListingReport, Pipeline, PipelineConfig, PipelineResult, PipelineStage, ProgressUpdate,
    TextEncoding,
};
use std::path::PathBuf;
use tracing::{debug, info};

/// Clean the eBay car sales listings and compare brands by mileage and price.
#[derive(Parser, Debug)]
#[command(name = "listing-pipeline")]
#[command(author, version, about, long_about = None)]
#[command(
    after_help = "EXAMPLES:\n  \
                  # Run over the bundled dataset\n  \
                  listing-pipeline\n\n  \
                  # A UTF-8 export with custom bounds\n  \
                  listing-pipeline -i autos_utf8.csv --encoding utf-8 --config bounds.json\n\n  \
                  # Only print the final brand table\n  \
                  listing-pipeline --quiet"
)]
struct Args {
    /// Path to the listings CSV file
    #[arg(short, long, default_value = concat!(env!("CARGO_MANIFEST_DIR"), "/data/autos.csv"))]
    input: PathBuf,

    /// Text encoding of the input file (latin-1, utf-8)
    ///
    /// Overrides the encoding from --config. Defaults to latin-1.
    #[arg(short, long)]
    encoding: Option<TextEncoding>,

    /// JSON file with pipeline configuration overrides
    ///
    /// Fields left out keep their defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress stage narration (only show warnings, errors and the final table)
    #[arg(short, long)]
    quiet: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// `RUST_LOG` takes precedence over `--log-level`.
fn init_logging(level: &str, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &Args) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Cannot read config file '{}'", path.display()))?;
            PipelineConfig::from_json(&json)?
        }
        None => PipelineConfig::default(),
    };

    if let Some(encoding) = args.encoding {
        config.encoding = encoding;
    }
    debug!("Using configuration: {:?}", config);
    Ok(config)
}

/// Print one narration update to stdout.
///
/// Note: narration uses `println!` intentionally; it is the program's output,
/// not a log, and must stay visible whatever the log level.
fn narrate(update: ProgressUpdate) {
    match update.stage {
        PipelineStage::Complete | PipelineStage::Failed => {}
        stage => {
            println!("[{:>3.0}%] {}: {}", update.progress * 100.0, stage.display_name(), update.message);
            if let Some(details) = update.details {
                for line in details.lines() {
                    println!("        {}", line);
                }
            }
        }
    }
}

fn print_summary(result: &PipelineResult) {
    let report: &ListingReport = &result.report;

    println!();
    println!("{}", "=".repeat(60));
    println!("LISTINGS CLEANED");
    println!("{}", "=".repeat(60));
    println!(
        "Rows:    {} -> {} ({} removed)",
        report.loaded.rows,
        report.cleaned.rows,
        report.loaded.rows - report.cleaned.rows
    );
    println!(
        "Columns: {} -> {}",
        report.loaded.columns, report.cleaned.columns
    );
    for outcome in [&report.price_filter, &report.registration_year_filter]
        .into_iter()
        .flatten()
    {
        println!(
            "  {} in {}: {} rows removed",
            outcome.column,
            outcome.bounds,
            outcome.rows_removed()
        );
    }
    println!();
    print!("{}", report.brand_comparison);
    println!("{}", "=".repeat(60));
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level, args.quiet);

    let config = load_config(&args)?;

    let mut builder = Pipeline::builder().config(config);
    if !args.quiet {
        builder = builder.on_progress(narrate);
    }
    let pipeline = builder.build()?;

    info!("Processing listings from {}", args.input.display());
    let result = pipeline.run(&args.input)?;

    print_summary(&result);
    Ok(())
}
