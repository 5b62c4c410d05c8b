//! JSON batch report
//!
//! Optional versioned summary of a run for interoperability with other
//! tools: one record per folder with its outcome, taxonomy code, and the
//! roles that were bound.

use crate::error::{Result, StembindError};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::info;

/// JSON output schema version
const SCHEMA_VERSION: &str = "1.0";

/// Top-level JSON report structure
#[derive(Debug, Serialize)]
pub struct BatchReport {
    /// Schema version for forward compatibility
    pub version: String,
    /// Run metadata
    pub metadata: ReportMetadata,
    /// One record per discovered folder
    pub folders: Vec<FolderRecord>,
}

/// Run metadata
#[derive(Debug, Serialize)]
pub struct ReportMetadata {
    /// stembind version that generated this report
    pub generator_version: String,
    /// Timestamp of the run
    pub generated_at: String,
    /// Root directory that was scanned
    pub root: String,
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Outcome of one folder
#[derive(Debug, Clone, Serialize)]
pub struct FolderRecord {
    pub folder: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tempo: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// "processed", "skipped", or "failed"
    pub outcome: &'static str,
    /// Taxonomy code for failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub roles_bound: Vec<&'static str>,
}

/// Write the batch report to a JSON file
///
/// Uses atomic write pattern: writes to a temp file first, then renames.
/// This prevents data corruption if the write is interrupted.
pub fn write_report(
    records: &[FolderRecord],
    (processed, skipped, failed): (usize, usize, usize),
    root: &Path,
    output_path: &Path,
) -> Result<()> {
    let temp_path = output_path.with_extension("json.tmp");

    let file = File::create(&temp_path).map_err(|e| StembindError::Output {
        path: output_path.to_path_buf(),
        reason: format!("Failed to create temp file: {}", e),
    })?;
    let writer = BufWriter::new(file);

    let report = BatchReport {
        version: SCHEMA_VERSION.to_string(),
        metadata: ReportMetadata {
            generator_version: env!("CARGO_PKG_VERSION").to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            root: root.to_string_lossy().to_string(),
            processed,
            skipped,
            failed,
        },
        folders: records.to_vec(),
    };

    serde_json::to_writer_pretty(writer, &report).map_err(|e| {
        let _ = std::fs::remove_file(&temp_path);
        StembindError::Output {
            path: output_path.to_path_buf(),
            reason: e.to_string(),
        }
    })?;

    // Atomic rename: either succeeds completely or fails without modifying target
    std::fs::rename(&temp_path, output_path).map_err(|e| {
        let _ = std::fs::remove_file(&temp_path);
        StembindError::Output {
            path: output_path.to_path_buf(),
            reason: format!("Failed to finalize file: {}", e),
        }
    })?;

    info!(
        "Wrote report for {} folders to {}",
        records.len(),
        output_path.display()
    );

    Ok(())
}
