//! Reference rewriting - the template-patching core
//!
//! A decoded template document carries placeholder audio references (quoted
//! file names ending in the stem extension) and display-name fields naming the
//! placeholder track. This module discovers the references, maps them to the
//! real stem files by role, and substitutes every encoding variant
//! consistently, leaving unbound roles byte-for-byte untouched.

pub mod refs;
pub mod rewriter;
pub mod validate;

pub use refs::{discover, RawReference};
pub use rewriter::{rewrite, ReplacementMap, Rewrite};
pub use validate::check_well_formed;

/// Tag names whose `Value` attribute carries a track display name
pub const DISPLAY_NAME_TAGS: [&str; 4] = [
    "MemorizedFirstClipName",
    "UserName",
    "Name",
    "EffectiveName",
];

/// Find `needle` in `haystack` at or after `from`
pub(crate) fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if needle.is_empty() || from >= haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|p| p + from)
}

/// Replace every occurrence of `needle` with `replacement`, literally
pub(crate) fn replace_all(haystack: &[u8], needle: &[u8], replacement: &[u8]) -> Vec<u8> {
    if needle.is_empty() {
        return haystack.to_vec();
    }
    let mut out = Vec::with_capacity(haystack.len());
    let mut i = 0;
    while let Some(p) = find(haystack, needle, i) {
        out.extend_from_slice(&haystack[i..p]);
        out.extend_from_slice(replacement);
        i = p + needle.len();
    }
    out.extend_from_slice(&haystack[i..]);
    out
}
