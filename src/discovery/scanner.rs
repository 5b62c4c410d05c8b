//! Stem folder discovery and classification
//!
//! Walks the root tree and yields every directory that directly contains stem
//! audio, with its classified StemSet and the tempo/section parsed from the
//! folder convention `<root>/<tempo>/<section>/<track>/`. Tempo and section
//! sit at fixed positions relative to the leaf, so a folder outside the
//! convention simply yields `None` for both.

use crate::error::{Result, StembindError};
use crate::types::{is_stem_path, StemFile, StemFolder, StemRole, StemSet};
use std::ops::RangeInclusive;
use std::path::Path;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Scan a root directory tree for stem folders
///
/// Every directory with at least one stem audio file directly inside it is a
/// work unit, including ones whose files end up unclassified - the driver
/// records those rather than dropping them silently.
pub fn scan(root: &Path, tempo_range: &RangeInclusive<u32>) -> Result<Vec<StemFolder>> {
    if !root.exists() {
        return Err(StembindError::RootNotFound(root.to_path_buf()));
    }

    let mut folders = Vec::new();

    for entry in WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_dir() {
            continue;
        }
        let folder = entry.path();
        let stems = match classify_folder(folder) {
            Ok(Some(stems)) => stems,
            Ok(None) => continue,
            Err(e) => {
                warn!("Skipping unreadable folder {}: {}", folder.display(), e);
                continue;
            }
        };

        let tempo = parse_tempo(folder, tempo_range);
        let section = parse_section(folder);
        debug!(
            "Discovered stem folder {} (tempo: {:?}, section: {:?}, roles: {:?})",
            folder.display(),
            tempo,
            section,
            stems.roles().iter().map(|r| r.label()).collect::<Vec<_>>()
        );

        folders.push(StemFolder {
            path: folder.to_path_buf(),
            stems,
            tempo,
            section,
        });
    }

    info!("Discovered {} stem folders", folders.len());

    if folders.is_empty() {
        warn!("No stem audio found under {}", root.display());
    }

    Ok(folders)
}

/// Classify the stem files directly inside one folder
///
/// Returns `None` when the folder holds no stem audio at all, and an
/// all-absent StemSet when audio is present but nothing matches a role
/// keyword. Files are visited in name order; for each file the roles are
/// checked in fixed order and the first role whose keyword matches an
/// unfilled slot claims it - later matches for a filled role are ignored.
pub fn classify_folder(folder: &Path) -> Result<Option<StemSet>> {
    let mut names: Vec<_> = std::fs::read_dir(folder)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_stem_path(path))
        .collect();

    if names.is_empty() {
        return Ok(None);
    }
    names.sort();

    let mut stems = StemSet::default();
    for path in names {
        let Some(file) = StemFile::new(path) else {
            continue;
        };
        let lowered = file.file_name.to_lowercase();
        for role in StemRole::ALL {
            if stems.get(role).is_none() && lowered.contains(role.keyword()) {
                stems.assign(role, file);
                break;
            }
        }
    }

    Ok(Some(stems))
}

/// Tempo is the path segment two levels above the leaf, validated as an
/// integer in the plausible range - range validation precedes any template
/// lookup, so an out-of-range value reads as "no tempo"
fn parse_tempo(folder: &Path, range: &RangeInclusive<u32>) -> Option<u32> {
    let segment = folder.parent()?.parent()?.file_name()?.to_str()?;
    let value: u32 = segment.parse().ok()?;
    range.contains(&value).then_some(value)
}

/// Section tag (a key label such as "5A") is the segment one level above
fn parse_section(folder: &Path) -> Option<String> {
    Some(folder.parent()?.file_name()?.to_str()?.to_string())
}
