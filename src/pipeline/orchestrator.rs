//! Batch orchestration
//!
//! Sequential driver: folders are processed one at a time in walk order, and
//! each template and output file is opened, patched, and closed within its
//! own folder's step. Per-folder failures are recorded with their taxonomy
//! code and never abort the batch.

use crate::config::Settings;
use crate::container;
use crate::discovery;
use crate::error::{Result, StembindError};
use crate::report::{self, FolderRecord};
use crate::rewrite;
use crate::template;
use crate::types::{StemFolder, StemRole};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Output artifact name, written into each processed stem folder
pub const OUTPUT_FILE_NAME: &str = "CH1.als";

/// Extension of the sibling analysis caches invalidated after a rewrite -
/// they are keyed to the audio references the rewrite just changed
const ANALYSIS_CACHE_EXTENSION: &str = "asd";

/// Pipeline result summary
#[derive(Debug)]
pub struct PipelineResult {
    pub total_folders: usize,
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Every failure with its folder identity and taxonomy code
    pub failures: Vec<FolderFailure>,
}

impl PipelineResult {
    fn empty() -> Self {
        Self {
            total_folders: 0,
            processed: 0,
            skipped: 0,
            failed: 0,
            failures: Vec::new(),
        }
    }
}

/// One recorded per-folder failure
#[derive(Debug)]
pub struct FolderFailure {
    pub folder: PathBuf,
    pub code: &'static str,
    pub reason: String,
}

/// Outcome of one folder's processing step
enum FolderOutcome {
    Processed { roles_bound: Vec<StemRole> },
    Skipped { reason: String },
}

/// Run the full binding pipeline
pub fn run(settings: &Settings) -> Result<PipelineResult> {
    let run_start = std::time::Instant::now();

    info!("Scanning for stem folders...");
    let folders = discovery::scan(&settings.input, &settings.tempo_range())?;

    if folders.is_empty() {
        return Ok(PipelineResult::empty());
    }

    info!("Found {} stem folders", folders.len());

    if settings.dry_run {
        return run_dry_run(&folders, settings);
    }

    let progress_bar = if settings.show_progress {
        let pb = ProgressBar::new(folders.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        Some(pb)
    } else {
        None
    };

    let mut processed = 0;
    let mut skipped = 0;
    let mut failed = 0;
    let mut failures = Vec::new();
    let mut records = Vec::with_capacity(folders.len());

    for folder in &folders {
        let record = match process_folder(folder, settings) {
            Ok(FolderOutcome::Processed { roles_bound }) => {
                processed += 1;
                info!(
                    "Bound {:?} in {}",
                    roles_bound.iter().map(|r| r.label()).collect::<Vec<_>>(),
                    folder.path.display()
                );
                folder_record(folder, "processed", None, None, &roles_bound)
            }
            Ok(FolderOutcome::Skipped { reason }) => {
                skipped += 1;
                debug!("Skipped {}: {}", folder.path.display(), reason);
                folder_record(folder, "skipped", None, Some(reason), &[])
            }
            Err(e) if e.is_recoverable() => {
                failed += 1;
                warn!("Failed {}: {}", folder.path.display(), e);
                let record =
                    folder_record(folder, "failed", Some(e.taxonomy()), Some(e.to_string()), &[]);
                failures.push(FolderFailure {
                    folder: folder.path.clone(),
                    code: e.taxonomy(),
                    reason: e.to_string(),
                });
                record
            }
            Err(e) => return Err(e),
        };
        records.push(record);

        if let Some(ref pb) = progress_bar {
            pb.inc(1);
            pb.set_message(
                folder
                    .path
                    .file_name()
                    .unwrap_or_default()
                    .to_string_lossy()
                    .to_string(),
            );
        }
    }

    if let Some(pb) = progress_bar {
        pb.finish_with_message("Binding complete");
    }

    if let Some(ref report_path) = settings.report {
        report::write_report(&records, (processed, skipped, failed), &settings.input, report_path)?;
    }

    info!(
        "Batch completed in {:.2}s",
        run_start.elapsed().as_secs_f64()
    );

    Ok(PipelineResult {
        total_folders: folders.len(),
        processed,
        skipped,
        failed,
        failures,
    })
}

/// Process one stem folder: select, decode, rewrite, encode, write
fn process_folder(folder: &StemFolder, settings: &Settings) -> Result<FolderOutcome> {
    let output_path = folder.path.join(OUTPUT_FILE_NAME);

    if output_path.exists() && !settings.force {
        return Ok(FolderOutcome::Skipped {
            reason: format!("{} already exists (use --force to overwrite)", OUTPUT_FILE_NAME),
        });
    }

    if folder.stems.is_empty() {
        return Err(StembindError::classification_miss(
            &folder.path,
            "audio present but no file name matches a stem role keyword",
        ));
    }

    let template_path = template::select(&settings.templates_dir, folder.tempo)?;
    let document = container::decode(&template_path)?;

    let references = rewrite::discover(&document);
    if references.is_empty() {
        return Err(StembindError::NoReferencesFound {
            template: template_path,
        });
    }
    debug!(
        "Template {} references: {:?}",
        template_path.display(),
        references.iter().map(|r| r.display()).collect::<Vec<_>>()
    );

    let result = rewrite::rewrite(&document, &references, &folder.stems, &folder.path);

    if settings.validate {
        rewrite::check_well_formed(&result.document).map_err(|reason| {
            StembindError::MalformedDocument {
                path: template_path.clone(),
                reason,
            }
        })?;
    }

    let compressed = container::encode(&result.document)?;
    write_atomic(&output_path, &compressed)?;

    if settings.purge_analysis_files {
        purge_analysis_caches(&folder.path);
    }

    Ok(FolderOutcome::Processed {
        roles_bound: result.roles_bound,
    })
}

/// Single atomic write: temp file in the same directory, then rename, so an
/// interrupted run never leaves a truncated artifact behind
fn write_atomic(output_path: &Path, bytes: &[u8]) -> Result<()> {
    let temp_path = output_path.with_extension("als.tmp");

    std::fs::write(&temp_path, bytes).map_err(|e| StembindError::output_error(output_path, e))?;

    std::fs::rename(&temp_path, output_path).map_err(|e| {
        let _ = std::fs::remove_file(&temp_path);
        StembindError::output_error(output_path, e)
    })
}

/// Delete stale per-track analysis caches in the folder; they assume the
/// audio references from before the rewrite
fn purge_analysis_caches(folder: &Path) {
    let Ok(entries) = std::fs::read_dir(folder) else {
        return;
    };
    for path in entries.filter_map(|e| e.ok()).map(|e| e.path()) {
        let is_cache = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(ANALYSIS_CACHE_EXTENSION));
        if !is_cache {
            continue;
        }
        match std::fs::remove_file(&path) {
            Ok(()) => info!("Removed stale analysis cache {}", path.display()),
            Err(e) => warn!("Could not remove {}: {}", path.display(), e),
        }
    }
}

fn folder_record(
    folder: &StemFolder,
    outcome: &'static str,
    code: Option<&'static str>,
    reason: Option<String>,
    roles_bound: &[StemRole],
) -> FolderRecord {
    FolderRecord {
        folder: folder.path.to_string_lossy().to_string(),
        tempo: folder.tempo,
        section: folder.section.clone(),
        outcome,
        code,
        reason,
        roles_bound: roles_bound.iter().map(|r| r.label()).collect(),
    }
}

/// Dry run mode - show folders and template choices without writing
fn run_dry_run(folders: &[StemFolder], settings: &Settings) -> Result<PipelineResult> {
    println!();
    println!("=== DRY RUN MODE ===");
    println!();

    for folder in folders {
        println!(
            "{}/ (tempo: {}, section: {})",
            folder.path.display(),
            folder
                .tempo
                .map_or_else(|| "unknown".to_string(), |t| t.to_string()),
            folder.section.as_deref().unwrap_or("unknown"),
        );
        if let Some(stem) = StemRole::ALL.iter().find_map(|&role| folder.stems.get(role)) {
            println!("  track: {}", stem.track_title());
        }
        for role in StemRole::ALL {
            match folder.stems.get(role) {
                Some(stem) => println!("  {}: {}", role.label(), stem.file_name),
                None => println!("  {}: -", role.label()),
            }
        }
        match template::select(&settings.templates_dir, folder.tempo) {
            Ok(path) => println!("  template: {}", path.display()),
            Err(e) => println!("  template: none ({})", e.taxonomy()),
        }
        let output = folder.path.join(OUTPUT_FILE_NAME);
        if output.exists() && !settings.force {
            println!("  would skip: {} already exists", OUTPUT_FILE_NAME);
        } else {
            println!("  would write: {}", output.display());
        }
        println!();
    }

    println!("─────────────────────────────────────────");
    println!("Would process {} folders", folders.len());
    println!();

    Ok(PipelineResult {
        total_folders: folders.len(),
        processed: 0,
        skipped: folders.len(), // All "skipped" in dry run mode
        failed: 0,
        failures: Vec::new(),
    })
}
