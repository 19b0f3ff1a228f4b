//! `Hypomnema` - resolve homily coverage for every work under the input directory.
//!
//! Usage: hypomnema [--input DIR] [--output DIR]

use std::process::ExitCode;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use hypomnema::config::Config;
use hypomnema::services::batch::{discover, run_batch};
use hypomnema::services::export::JsonDirectory;

/// Value following `flag` on the command line, if any
fn arg_value(flag: &str) -> Option<String> {
    std::env::args()
        .position(|a| a == flag)
        .and_then(|i| std::env::args().nth(i + 1))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn main() -> anyhow::Result<ExitCode> {
    init_tracing();

    let mut config = Config::load().context("Failed to load config")?;
    if let Some(dir) = arg_value("--input") {
        config.input_dir = dir.into();
    }
    if let Some(dir) = arg_value("--output") {
        config.output_dir = dir.into();
    }
    tracing::info!(
        "{} {}: {} -> {}",
        config.app_name(),
        config.app_version(),
        config.input_dir.display(),
        config.output_dir.display()
    );

    let lengths = config.chapter_lengths().context("Failed to load chapter lengths")?;

    let jobs = discover(&config.input_dir);
    if jobs.is_empty() {
        tracing::warn!("No *.units.json or *.canon.json files under {}", config.input_dir.display());
        return Ok(ExitCode::SUCCESS);
    }

    let exporter = JsonDirectory::new(&config.output_dir);
    let report = run_batch(&jobs, &lengths, config.on_unparseable, &exporter);

    for (path, err) in report.failures() {
        eprintln!("  {}: {err}", path.display());
    }

    Ok(if report.failure_count() == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
