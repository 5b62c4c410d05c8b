//! Per-tempo template lookup
//!
//! Templates live in one configured directory, one per tempo (`95.als`) plus
//! an optional `default.als`. The tempo handed in here has already passed
//! range validation - an out-of-range value arrives as `None` and goes
//! straight to the fallback.

use super::{DEFAULT_TEMPLATE, TEMPLATE_EXTENSION};
use crate::error::{Result, StembindError};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Select the template for a folder's tempo
///
/// Exact per-tempo file first, then the default. A missing default is the
/// distinguishable `TemplateUnavailable` outcome: the driver records it and
/// moves on, it never aborts the batch.
pub fn select(templates_dir: &Path, tempo: Option<u32>) -> Result<PathBuf> {
    if let Some(tempo) = tempo {
        let candidate = templates_dir.join(format!("{}.{}", tempo, TEMPLATE_EXTENSION));
        if candidate.is_file() {
            debug!("Selected template {} for tempo {}", candidate.display(), tempo);
            return Ok(candidate);
        }
        debug!("No template for tempo {}, trying default", tempo);
    }

    let fallback = templates_dir.join(format!("{}.{}", DEFAULT_TEMPLATE, TEMPLATE_EXTENSION));
    if fallback.is_file() {
        debug!("Selected default template {}", fallback.display());
        return Ok(fallback);
    }

    Err(StembindError::template_unavailable(tempo))
}
