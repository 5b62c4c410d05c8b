//! Unified error types for stembind
//!
//! Error strategy:
//! - Per-folder errors (bad template, unclassifiable stems, nothing to
//!   rewrite): Recoverable, record and continue with the next folder
//! - System errors (bad configuration, missing root): Fatal, abort batch
//!
//! Every recoverable error carries a taxonomy code so the end-of-run summary
//! can attribute each failure to its folder.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for stembind operations
#[derive(Debug, Error)]
pub enum StembindError {
    // =========================================================================
    // Recoverable errors - record folder, continue batch
    // =========================================================================
    #[error("Corrupt or truncated template container '{path}': {reason}\n  Tip: Templates must be gzip-compressed Live Set files")]
    Container { path: PathBuf, reason: String },

    #[error("No stem roles recognized in '{folder}': {reason}")]
    ClassificationMiss { folder: PathBuf, reason: String },

    #[error("No template available for tempo {tempo}\n  Tip: Add a '{tempo}.als' or a 'default.als' to the templates directory")]
    TemplateUnavailable { tempo: String },

    #[error("Template '{template}' contains no audio references to rewrite\n  Tip: The template may be malformed or already customized")]
    NoReferencesFound { template: PathBuf },

    #[error("Rewritten document for '{path}' is not well-formed: {reason}")]
    MalformedDocument { path: PathBuf, reason: String },

    #[error("Cannot write output to '{path}': {reason}\n  Tip: Check write permissions for the stem folder")]
    Output { path: PathBuf, reason: String },

    // =========================================================================
    // Fatal errors - abort entire batch
    // =========================================================================
    #[error("Root path not found: '{0}'\n  Tip: Check the path exists and is accessible")]
    RootNotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for stembind operations
pub type Result<T> = std::result::Result<T, StembindError>;

impl StembindError {
    /// Returns true if this error is recoverable (record folder, continue batch)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            StembindError::Container { .. }
                | StembindError::ClassificationMiss { .. }
                | StembindError::TemplateUnavailable { .. }
                | StembindError::NoReferencesFound { .. }
                | StembindError::MalformedDocument { .. }
                | StembindError::Output { .. }
        )
    }

    /// Short taxonomy code used in the failure summary and JSON report
    pub fn taxonomy(&self) -> &'static str {
        match self {
            StembindError::Container { .. } => "CONTAINER",
            StembindError::ClassificationMiss { .. } => "CLASSIFICATION_MISS",
            StembindError::TemplateUnavailable { .. } => "TEMPLATE_UNAVAILABLE",
            StembindError::NoReferencesFound { .. } => "NO_REFERENCES",
            StembindError::MalformedDocument { .. } => "MALFORMED_DOCUMENT",
            StembindError::Output { .. } => "OUTPUT",
            StembindError::RootNotFound(_) => "IO",
            StembindError::Config(_) => "CONFIG",
            StembindError::Io(_) => "IO",
        }
    }

    /// Create a container error for a bad or unreadable template
    pub fn container(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        StembindError::Container {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a classification miss for a folder with audio but no usable stems
    pub fn classification_miss(folder: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        StembindError::ClassificationMiss {
            folder: folder.into(),
            reason: reason.into(),
        }
    }

    /// Create a template unavailable error, rendering the tempo for display
    pub fn template_unavailable(tempo: Option<u32>) -> Self {
        StembindError::TemplateUnavailable {
            tempo: tempo.map_or_else(|| "unknown".to_string(), |t| t.to_string()),
        }
    }

    /// Create an output error, checking for common issues
    pub fn output_error(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        let path = path.into();
        let reason = match err.kind() {
            std::io::ErrorKind::PermissionDenied => {
                format!(
                    "Permission denied. Check that you have write access to {}",
                    path.display()
                )
            }
            std::io::ErrorKind::NotFound => {
                format!(
                    "Directory does not exist: {}",
                    path.parent()
                        .map(|p| p.display().to_string())
                        .unwrap_or_default()
                )
            }
            _ => err.to_string(),
        };
        StembindError::Output { path, reason }
    }
}
