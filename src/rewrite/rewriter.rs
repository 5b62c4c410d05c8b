//! Replacement construction and substitution
//!
//! For each role present in both the template and the StemSet, the map holds
//! one substitution per encoding variant of the placeholder reference, all
//! targeting the same new value: the bare stem file name, since the output
//! artifact is written into the stem folder itself. Roles absent from the
//! StemSet get no entries and their template content is untouched.

use super::refs::RawReference;
use super::{replace_all, DISPLAY_NAME_TAGS};
use crate::types::{StemFile, StemRole, StemSet};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// Spaces are the one character the authoring tool escapes in its
/// browser-content paths; encoding more would miss the template's own
/// spelling of the placeholder.
const SPACE_SET: &AsciiSet = &CONTROLS.add(b' ');

/// One literal substitution in the replacement map
#[derive(Debug, Clone)]
pub struct Substitution {
    pub old: Vec<u8>,
    pub new: Vec<u8>,
    pub role: StemRole,
    /// Which encoding variant this entry covers
    pub variant: &'static str,
}

/// Derived per invocation: placeholder-to-real substitutions covering every
/// encoding variant of each bound role
#[derive(Debug, Clone, Default)]
pub struct ReplacementMap {
    pub entries: Vec<Substitution>,
}

impl ReplacementMap {
    /// Build the map from discovered references and the folder's stems
    ///
    /// The first discovered reference per role is taken as the placeholder
    /// and canonicalized to its file-name part - the same placeholder shows
    /// up bare, `../`-prefixed, folder-qualified, and percent-escaped, and
    /// any of those spellings may be the one discovery saw first. Variants
    /// are ordered most-specific first (absolute, relative, percent-escaped,
    /// bare) so each spelling is rewritten exactly once.
    pub fn build(references: &[RawReference], stems: &StemSet, target_folder: &Path) -> Self {
        let mut entries = Vec::new();
        for (reference, role, stem) in bindings(references, stems) {
            let old = reference.file_name_bytes();
            let new = stem.file_name.as_bytes();
            if old == new {
                debug!("Reference '{}' already points at the stem", reference.display());
                continue;
            }

            let folder = target_folder.to_string_lossy();
            entries.push(Substitution {
                old: [folder.as_bytes(), b"/", old].concat(),
                new: [folder.as_bytes(), b"/", new].concat(),
                role,
                variant: "absolute",
            });
            entries.push(Substitution {
                old: [b"../", old].concat(),
                new: [b"../", new].concat(),
                role,
                variant: "relative",
            });
            if let Some(old_escaped) = percent_variant(old) {
                let new_escaped = percent_variant(new).unwrap_or_else(|| new.to_vec());
                entries.push(Substitution {
                    old: old_escaped,
                    new: new_escaped,
                    role,
                    variant: "percent",
                });
            }
            entries.push(Substitution {
                old: old.to_vec(),
                new: new.to_vec(),
                role,
                variant: "bare",
            });
        }
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Apply all substitutions as literal replacement across the document
    pub fn apply(&self, document: &[u8]) -> Vec<u8> {
        let mut doc = document.to_vec();
        for substitution in &self.entries {
            doc = replace_all(&doc, &substitution.old, &substitution.new);
        }
        doc
    }
}

/// Result of one rewrite pass
#[derive(Debug)]
pub struct Rewrite {
    pub document: Vec<u8>,
    /// Roles whose placeholder was actually remapped
    pub roles_bound: Vec<StemRole>,
}

/// Rewrite a decoded template: path references first, then display names
pub fn rewrite(
    document: &[u8],
    references: &[RawReference],
    stems: &StemSet,
    target_folder: &Path,
) -> Rewrite {
    let bound = bindings(references, stems);
    let roles_bound: Vec<StemRole> = bound.iter().map(|&(_, role, _)| role).collect();

    let map = ReplacementMap::build(references, stems, target_folder);
    let mut doc = map.apply(document);

    // Display names are scoped to the tag's value attribute: the needle
    // carries the tag prefix and both quotes, so an identical string in
    // unrelated text survives untouched
    for (reference, _, stem) in &bound {
        let old_base = reference.base_name_bytes();
        let new_base = stem.base_name().as_bytes();
        if old_base == new_base {
            continue;
        }
        for tag in DISPLAY_NAME_TAGS {
            let prefix = format!("<{} Value=\"", tag);
            let needle = [prefix.as_bytes(), old_base, b"\""].concat();
            let replacement = [prefix.as_bytes(), new_base, b"\""].concat();
            doc = replace_all(&doc, &needle, &replacement);
        }
    }

    Rewrite {
        document: doc,
        roles_bound,
    }
}

/// Pair each role's first discovered reference with the stem filling it;
/// roles missing on either side are dropped
fn bindings<'a>(
    references: &'a [RawReference],
    stems: &'a StemSet,
) -> Vec<(&'a RawReference, StemRole, &'a StemFile)> {
    let mut claimed = HashSet::new();
    let mut bound = Vec::new();
    for reference in references {
        let Some(role) = reference.role else { continue };
        if !claimed.insert(role) {
            continue;
        }
        if let Some(stem) = stems.get(role) {
            bound.push((reference, role, stem));
        }
    }
    bound
}

fn percent_variant(bytes: &[u8]) -> Option<Vec<u8>> {
    let text = std::str::from_utf8(bytes).ok()?;
    let escaped = utf8_percent_encode(text, SPACE_SET).to_string();
    (escaped.as_bytes() != bytes).then(|| escaped.into_bytes())
}
