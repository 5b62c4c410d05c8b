//! Runtime configuration settings
//!
//! One explicit value object handed to the batch driver at start, with
//! documented defaults - configuration never lives in scattered globals.

use std::ops::RangeInclusive;
use std::path::PathBuf;

/// Runtime settings for the binding pipeline
#[derive(Debug, Clone)]
pub struct Settings {
    /// Root directory of the stem library
    pub input: PathBuf,
    /// Directory holding the pre-authored templates
    pub templates_dir: PathBuf,
    /// Overwrite existing outputs instead of skipping them
    pub force: bool,
    /// Lowest plausible tempo for folder-name parsing
    pub tempo_min: u32,
    /// Highest plausible tempo for folder-name parsing
    pub tempo_max: u32,
    /// Run the well-formedness check on rewritten documents
    pub validate: bool,
    /// Delete stale .asd analysis files after a rewrite
    pub purge_analysis_files: bool,
    /// Optional JSON report destination
    pub report: Option<PathBuf>,
    /// Show progress bars
    pub show_progress: bool,
    /// Dry run mode - list folders without processing
    pub dry_run: bool,
}

impl Settings {
    /// Create settings from CLI arguments
    pub fn from_cli(cli: &super::cli::Cli) -> Self {
        Self {
            input: cli.input.clone(),
            templates_dir: cli.templates.clone(),
            force: cli.force,
            tempo_min: cli.tempo_min,
            tempo_max: cli.tempo_max,
            validate: cli.validate,
            purge_analysis_files: !cli.keep_analysis_files,
            report: cli.report.clone(),
            show_progress: !cli.quiet,
            dry_run: cli.dry_run,
        }
    }

    /// Plausible tempo range for path parsing and template selection
    pub fn tempo_range(&self) -> RangeInclusive<u32> {
        self.tempo_min..=self.tempo_max
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input: PathBuf::from("."),
            templates_dir: PathBuf::from("./templates"),
            force: false,
            tempo_min: 70,
            tempo_max: 200,
            validate: false,
            purge_analysis_files: true,
            report: None,
            show_progress: true,
            dry_run: false,
        }
    }
}
