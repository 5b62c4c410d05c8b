//! Core data types for stembind
//!
//! These types represent the domain model and flow through the pipeline.

use std::path::{Path, PathBuf};

/// Extension recognized for stem audio files
pub const STEM_EXTENSION: &str = "flac";

// =============================================================================
// Stem roles
// =============================================================================

/// The three stem slots a template can bind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StemRole {
    Drums,
    Instrumental,
    Vocal,
}

impl StemRole {
    /// All roles in classification order (drums wins ties over inst over vocals)
    pub const ALL: [StemRole; 3] = [StemRole::Drums, StemRole::Instrumental, StemRole::Vocal];

    /// The case-insensitive substring that assigns a file to this role
    pub fn keyword(self) -> &'static str {
        match self {
            StemRole::Drums => "drums",
            StemRole::Instrumental => "inst",
            StemRole::Vocal => "vocals",
        }
    }

    /// Human-readable role name for logs and the report
    pub fn label(self) -> &'static str {
        match self {
            StemRole::Drums => "drums",
            StemRole::Instrumental => "instrumental",
            StemRole::Vocal => "vocal",
        }
    }

    /// Classify a file or reference name by keyword, first role match wins
    pub fn classify(name: &str) -> Option<StemRole> {
        let lowered = name.to_lowercase();
        StemRole::ALL
            .into_iter()
            .find(|role| lowered.contains(role.keyword()))
    }
}

// =============================================================================
// Stem files and sets
// =============================================================================

/// One stem audio file assigned to a role slot
#[derive(Debug, Clone)]
pub struct StemFile {
    /// Full path to the audio file
    pub path: PathBuf,
    /// Cached file name (final path component)
    pub file_name: String,
}

impl StemFile {
    pub fn new(path: PathBuf) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?.to_string();
        Some(Self { path, file_name })
    }

    /// File name minus the audio extension, the value display-name fields carry
    pub fn base_name(&self) -> &str {
        self.file_name
            .strip_suffix(&format!(".{}", STEM_EXTENSION))
            .unwrap_or(&self.file_name)
    }

    /// Base name minus the leading `<role>-` prefix, for logs and the report
    pub fn track_title(&self) -> &str {
        let base = self.base_name();
        match base.split_once('-') {
            Some((head, rest)) if StemRole::classify(head).is_some() => rest,
            _ => base,
        }
    }
}

/// Mapping from the fixed stem roles to the files that fill them
///
/// Built fresh per source folder, never mutated after classification, and
/// dropped after one patch operation. Unfilled slots are valid: downstream
/// steps leave the corresponding template content untouched.
#[derive(Debug, Clone, Default)]
pub struct StemSet {
    drums: Option<StemFile>,
    instrumental: Option<StemFile>,
    vocal: Option<StemFile>,
}

impl StemSet {
    /// Fill a role slot. Returns false (and drops the file) if already filled -
    /// first match wins, later matches are ignored.
    pub fn assign(&mut self, role: StemRole, file: StemFile) -> bool {
        let slot = self.slot_mut(role);
        if slot.is_some() {
            return false;
        }
        *slot = Some(file);
        true
    }

    pub fn get(&self, role: StemRole) -> Option<&StemFile> {
        match role {
            StemRole::Drums => self.drums.as_ref(),
            StemRole::Instrumental => self.instrumental.as_ref(),
            StemRole::Vocal => self.vocal.as_ref(),
        }
    }

    /// True when no role slot is filled ("nothing to bind")
    pub fn is_empty(&self) -> bool {
        StemRole::ALL.iter().all(|&role| self.get(role).is_none())
    }

    /// Roles with a file assigned, in fixed role order
    pub fn roles(&self) -> Vec<StemRole> {
        StemRole::ALL
            .into_iter()
            .filter(|&role| self.get(role).is_some())
            .collect()
    }

    fn slot_mut(&mut self, role: StemRole) -> &mut Option<StemFile> {
        match role {
            StemRole::Drums => &mut self.drums,
            StemRole::Instrumental => &mut self.instrumental,
            StemRole::Vocal => &mut self.vocal,
        }
    }
}

// =============================================================================
// Work units
// =============================================================================

/// A folder eligible for binding: stems plus the metadata parsed from its path
///
/// The folder convention is `<root>/<tempo>/<section>/<track>/`, so tempo is
/// the path segment two levels above the leaf and the section tag (a key label
/// such as "5A") sits one level above.
#[derive(Debug, Clone)]
pub struct StemFolder {
    /// The leaf folder holding the stem audio files
    pub path: PathBuf,
    /// Classified stem files
    pub stems: StemSet,
    /// Tempo parsed from the grandparent path segment, if plausible
    pub tempo: Option<u32>,
    /// Section tag from the parent path segment
    pub section: Option<String>,
}

/// Check if a path has the stem audio extension
pub fn is_stem_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(STEM_EXTENSION))
}
