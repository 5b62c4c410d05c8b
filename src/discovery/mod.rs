//! Stem library discovery

pub mod scanner;

pub use scanner::{classify_folder, scan};
