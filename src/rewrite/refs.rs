//! Placeholder reference discovery
//!
//! The container's file-reference grammar is a quote-delimited token ending in
//! the stem audio extension. Discovery is byte-exact: the returned bytes are
//! the needles later substitutions must match, so no decoding or
//! normalization happens here.

use super::{find, DISPLAY_NAME_TAGS};
use crate::types::{StemRole, STEM_EXTENSION};
use std::collections::HashSet;
use tracing::debug;

/// References longer than this are noise (an attribute blob, not a file name)
const MAX_REFERENCE_LEN: usize = 512;

/// How far around a reference to look for an associated display-name field
const ASSOCIATION_WINDOW: usize = 4096;

/// A placeholder audio reference discovered in decoded template text
#[derive(Debug, Clone)]
pub struct RawReference {
    /// Exact bytes of the reference as embedded in the document
    pub bytes: Vec<u8>,
    /// Byte offset of the first occurrence
    pub position: usize,
    /// Role assigned by the keyword heuristic, if any matched
    pub role: Option<StemRole>,
}

impl RawReference {
    /// Final path component of the reference
    pub fn file_name_bytes(&self) -> &[u8] {
        match self.bytes.iter().rposition(|&c| c == b'/') {
            Some(p) => &self.bytes[p + 1..],
            None => &self.bytes,
        }
    }

    /// File name minus the audio extension - the display-name spelling
    pub fn base_name_bytes(&self) -> &[u8] {
        let name = self.file_name_bytes();
        let ext_len = STEM_EXTENSION.len() + 1;
        if name.len() >= ext_len
            && name[name.len() - ext_len..].eq_ignore_ascii_case(format!(".{}", STEM_EXTENSION).as_bytes())
        {
            &name[..name.len() - ext_len]
        } else {
            name
        }
    }

    /// Lossy rendering for logs
    pub fn display(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// Scan a decoded document for placeholder references
///
/// Returns each distinct reference once, in first-seen order, classified by
/// role. An empty result means the template has nothing to rewrite - the
/// caller reports that, it is never silently treated as success.
pub fn discover(document: &[u8]) -> Vec<RawReference> {
    let mut seen: HashSet<Vec<u8>> = HashSet::new();
    let mut references = Vec::new();

    let mut i = 0;
    while i < document.len() {
        let open = document[i];
        if !is_quote(open) {
            i += 1;
            continue;
        }
        // A pair is two quotes of the same kind: an apostrophe inside a
        // double-quoted value ("i won't stop.flac") is content, not a
        // delimiter
        let Some(offset) = document[i + 1..].iter().position(|&c| c == open) else {
            i += 1;
            continue;
        };
        let close = i + 1 + offset;
        let token = &document[i + 1..close];

        if is_reference_token(token, open) {
            if seen.insert(token.to_vec()) {
                let position = i + 1;
                let role = classify(document, token, position);
                debug!(
                    "Discovered reference '{}' (role: {:?})",
                    String::from_utf8_lossy(token),
                    role.map(StemRole::label)
                );
                references.push(RawReference {
                    bytes: token.to_vec(),
                    position,
                    role,
                });
            }
            i = close + 1;
        } else {
            // Not a reference: the closing quote may open the next token
            i = close;
        }
    }

    references
}

fn is_quote(byte: u8) -> bool {
    byte == b'"' || byte == b'\''
}

/// A token is a reference when it ends in the audio extension and looks like
/// a file name rather than markup. A single-quoted token may not contain a
/// double quote - that means the scan started at a stray apostrophe, not at
/// an attribute delimiter.
fn is_reference_token(token: &[u8], open: u8) -> bool {
    let suffix = format!(".{}", STEM_EXTENSION);
    let suffix = suffix.as_bytes();
    token.len() >= suffix.len()
        && token.len() <= MAX_REFERENCE_LEN
        && token[token.len() - suffix.len()..].eq_ignore_ascii_case(suffix)
        && !token
            .iter()
            .any(|&c| c == b'<' || c == b'>' || c == b'\n' || c == b'\r')
        && !(open == b'\'' && token.contains(&b'"'))
}

/// Role classification: keyword on the reference's own file name first, then
/// association with a nearby display-name field that carries a keyword
fn classify(document: &[u8], token: &[u8], position: usize) -> Option<StemRole> {
    let file_name = match token.iter().rposition(|&c| c == b'/') {
        Some(p) => &token[p + 1..],
        None => token,
    };
    if let Some(role) = StemRole::classify(&String::from_utf8_lossy(file_name)) {
        return Some(role);
    }
    classify_by_display_names(document, position)
}

/// Look for the nearest display-name field around `position` whose value
/// classifies - preceding fields first (the track header sits above its
/// sample reference), then following ones
fn classify_by_display_names(document: &[u8], position: usize) -> Option<StemRole> {
    let start = position.saturating_sub(ASSOCIATION_WINDOW);
    let end = (position + ASSOCIATION_WINDOW).min(document.len());

    if let Some((_, role)) = scan_display_names(&document[start..position])
        .into_iter()
        .max_by_key(|&(offset, _)| offset)
    {
        return Some(role);
    }

    scan_display_names(&document[position..end])
        .into_iter()
        .min_by_key(|&(offset, _)| offset)
        .map(|(_, role)| role)
}

/// All (offset, role) pairs for display-name fields in `window` whose value
/// contains a role keyword
fn scan_display_names(window: &[u8]) -> Vec<(usize, StemRole)> {
    let mut hits = Vec::new();
    for tag in DISPLAY_NAME_TAGS {
        let needle = format!("<{} Value=\"", tag).into_bytes();
        let mut from = 0;
        while let Some(p) = find(window, &needle, from) {
            let value_start = p + needle.len();
            let Some(len) = window[value_start..].iter().position(|&c| c == b'"') else {
                break;
            };
            let value = &window[value_start..value_start + len];
            if let Some(role) = StemRole::classify(&String::from_utf8_lossy(value)) {
                hits.push((p, role));
            }
            from = value_start + len;
        }
    }
    hits
}
