//! stembind CLI entry point

use clap::Parser;
use std::process::ExitCode;
use stembind::config::{Cli, Settings};
use stembind::pipeline;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    init_logging(&cli);

    // Build settings from CLI
    let settings = Settings::from_cli(&cli);

    // Validate inputs
    if let Err(e) = validate_inputs(&cli) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    // Run the pipeline
    match pipeline::run(&settings) {
        Ok(result) => {
            println!();
            println!(
                "Summary: {} processed, {} skipped, {} failed (of {} folders)",
                result.processed, result.skipped, result.failed, result.total_folders
            );

            if !result.failures.is_empty() {
                println!();
                println!("Failures:");
                for failure in &result.failures {
                    println!(
                        "  {} [{}] {}",
                        failure.folder.display(),
                        failure.code,
                        failure.reason.lines().next().unwrap_or_default()
                    );
                }
            }

            if result.failed > 0 {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("Fatal error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli) {
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = if cli.quiet { "error" } else { filter };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();
}

fn validate_inputs(cli: &Cli) -> Result<(), String> {
    // Check input exists
    if !cli.input.exists() {
        return Err(format!(
            "Input path does not exist: {}\n\n  Tip: Check the path is correct and accessible.\n  Example:\n    stembind -i ~/Music/STEMS -t ./templates",
            cli.input.display()
        ));
    }

    // Check templates directory exists (a missing per-tempo file is a
    // per-folder condition; a missing directory is a configuration error)
    if !cli.templates.is_dir() {
        return Err(format!(
            "Templates directory does not exist: {}\n\n  Tip: Point --templates at the folder holding your <tempo>.als files",
            cli.templates.display()
        ));
    }

    if cli.tempo_min > cli.tempo_max {
        return Err(format!(
            "Invalid tempo range: {} > {}",
            cli.tempo_min, cli.tempo_max
        ));
    }

    Ok(())
}
