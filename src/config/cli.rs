//! CLI argument parsing and configuration

use clap::Parser;
use std::path::PathBuf;

/// stembind - Bind separated stems into Live Set templates
///
/// Scans a stem library for folders of drums/instrumental/vocal FLAC files,
/// picks the tempo-matched template, rewrites the template's placeholder
/// audio references to the real files, and writes a CH1.als next to the
/// stems.
#[derive(Parser, Debug)]
#[command(name = "stembind")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Root directory of the stem library to scan
    #[arg(short, long, value_name = "DIR")]
    pub input: PathBuf,

    /// Directory holding the pre-authored templates (<tempo>.als, default.als)
    #[arg(short, long, value_name = "DIR")]
    pub templates: PathBuf,

    /// Overwrite existing outputs (by default, folders with a CH1.als are skipped)
    #[arg(long, default_value = "false")]
    pub force: bool,

    /// Lowest tempo accepted when parsing folder names
    #[arg(long, value_name = "BPM", default_value = "70")]
    pub tempo_min: u32,

    /// Highest tempo accepted when parsing folder names
    #[arg(long, value_name = "BPM", default_value = "200")]
    pub tempo_max: u32,

    /// Check each rewritten document is well-formed before writing it
    #[arg(long, default_value = "false")]
    pub validate: bool,

    /// Keep stale .asd analysis files instead of deleting them after a rewrite
    #[arg(long, default_value = "false")]
    pub keep_analysis_files: bool,

    /// Write a JSON batch report to this path
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress progress bars)
    #[arg(short, long, default_value = "false")]
    pub quiet: bool,

    /// Dry run - list folders and chosen templates without writing anything
    #[arg(long, default_value = "false")]
    pub dry_run: bool,
}
