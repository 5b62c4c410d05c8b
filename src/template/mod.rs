//! Template selection

pub mod selector;

pub use selector::select;

/// Extension of the pre-authored template containers
pub const TEMPLATE_EXTENSION: &str = "als";

/// File stem of the fallback template used when no per-tempo file exists
pub const DEFAULT_TEMPLATE: &str = "default";
