//! bwcrop - automatic deskew and black-border crop for scanned pages
//!
//! CLI entry point

use anyhow::Context;
use bwcrop::{
    exit_codes, BarReporter, Cli, Config, ConfigError, CropPipeline, NoopProgress, OutputMode,
    PipelineConfig, PipelineError, SearchOutcome, SearchProgress, TableReporter,
};
use clap::Parser;
use std::path::Path;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli);

    std::process::exit(match run(&cli) {
        Ok(()) => exit_codes::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit_code_for(&e)
        }
    });
}

/// Logs go to stderr so the diagnostic table on stdout stays clean
fn init_tracing(cli: &Cli) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level())),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn exit_code_for(error: &anyhow::Error) -> i32 {
    if let Some(e) = error.downcast_ref::<PipelineError>() {
        e.exit_code()
    } else if error.downcast_ref::<ConfigError>().is_some() {
        exit_codes::CONFIG_ERROR
    } else {
        exit_codes::GENERAL_ERROR
    }
}

// ============ Run ============

fn run(cli: &Cli) -> anyhow::Result<()> {
    let file_config = load_config(cli.config.as_deref())?;
    let pipeline = CropPipeline::new(file_config.merge_with_cli(&cli.to_overrides()));
    debug!(config = ?pipeline.config(), "Effective configuration");

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| pipeline.default_output_path(&cli.input));

    if cli.dry_run {
        print_execution_plan(cli, &output, pipeline.config());
        return Ok(());
    }

    let mode = OutputMode::from_verbosity(cli.quiet, cli.verbose);
    let progress: Box<dyn SearchProgress> = if !mode.should_show(OutputMode::Normal) {
        Box::new(NoopProgress)
    } else if cli.progress {
        Box::new(BarReporter::new())
    } else {
        Box::new(TableReporter::new())
    };

    let result = pipeline.process(&cli.input, &output, progress.as_ref())?;

    // The image is already saved; a missing trace does not fail the run
    if let Some(trace_path) = &cli.trace_json {
        if let Err(e) = write_trace(trace_path, &result.outcome) {
            warn!("Angle trace not written: {:#}", e);
        }
    }

    if mode.should_show(OutputMode::Normal) {
        println!();
        if mode.should_show(OutputMode::Verbose) {
            println!(
                "Best angle: {} (total {}), crop {} -> {}x{}, {:.2}s",
                result.outcome.best.angle,
                result.outcome.best.total,
                result.crop_rect,
                result.cropped_size.0,
                result.cropped_size.1,
                result.elapsed_seconds
            );
        }
        println!("File saved as: {}", result.output.display());
    }

    Ok(())
}

/// Explicit `--config` must load; otherwise the first discovered file is used
fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::load_from_path(path)
            .with_context(|| format!("Failed to load config file {}", path.display())),
        None => Config::load().context("Failed to load config file"),
    }
}

fn write_trace(path: &Path, outcome: &SearchOutcome) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(outcome).context("Failed to serialize angle trace")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write angle trace {}", path.display()))?;
    Ok(())
}

/// Print execution plan for dry-run mode
fn print_execution_plan(cli: &Cli, output: &Path, config: &PipelineConfig) {
    let search = &config.search;
    let angle_count = search.sweep().count();

    println!("=== Dry Run - Execution Plan ===");
    println!();
    println!("Input: {}", cli.input.display());
    println!("Output: {}", output.display());
    if output.exists() {
        warn!(output = %output.display(), "Output already exists");
        println!("  (output already exists; a real run would stop here)");
    }
    println!();
    println!("Angle Search:");
    println!("  Window: +/-{:.2} degrees", search.window_degrees);
    println!("  Step: {:.2} degrees", search.step_degrees);
    println!("  Angles to evaluate: {}", angle_count);
    println!("  Luminance threshold: {}", search.luminance_threshold);
    println!("  Percentage threshold: {}%", search.percentage_threshold);
    println!("  Interpolation: {}", search.interpolation.name());
    println!();
    println!("Output Options:");
    println!(
        "  Progress: {}",
        if cli.quiet {
            "quiet"
        } else if cli.progress {
            "bar"
        } else {
            "table"
        }
    );
    match &cli.trace_json {
        Some(path) => println!("  Trace JSON: {}", path.display()),
        None => println!("  Trace JSON: none"),
    }
}
