use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

use scanner_uncertainty::api::{render, OutputFormat, UncertaintyReport};
use scanner_uncertainty::utils::ScenarioConfig;

/// Estimate per-sample position uncertainty of the two-anchor scanner
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Scenario file (JSON). Without it the reference scanner scenario is used.
    #[arg(long, short, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Report format
    #[arg(long, short, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Write the report here instead of stdout
    #[arg(long, short, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Write the active scenario to FILE and exit
    #[arg(long, value_name = "FILE")]
    write_config: Option<PathBuf>,

    /// Exit with an error when any sample is rejected
    #[arg(long, default_value_t = false)]
    fail_on_rejected: bool,

    /// Verbose logging (DEBUG level)
    #[arg(long, short, default_value_t = false)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(args.verbose);

    let scenario = match &args.config {
        Some(path) => {
            info!("Loading scenario from {}", path.display());
            ScenarioConfig::load_from_file(path)?
        }
        None => {
            info!("Using reference scanner scenario");
            ScenarioConfig::default()
        }
    };

    if let Some(path) = &args.write_config {
        scenario.save_to_file(path)?;
        info!("Scenario written to {}", path.display());
        return Ok(());
    }

    let evaluator = scenario.evaluator()?;
    let samples = scenario.measurements();
    let evaluation = evaluator.evaluate_resolved(&samples)?;
    let report = UncertaintyReport::from(&evaluation);
    let rendered = render(&report, args.format)?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, rendered + "\n")?;
            info!("Report written to {}", path.display());
        }
        None => println!("{}", rendered),
    }

    if args.fail_on_rejected && !evaluation.failures.is_empty() {
        error!(
            "{} of {} samples rejected",
            evaluation.failures.len(),
            evaluation.sample_count()
        );
        return Err("rejected samples present".into());
    }

    Ok(())
}

/// Initialize logging subsystem; logs go to stderr so reports stay clean on stdout
fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_max_level(level)
        .init();
}
