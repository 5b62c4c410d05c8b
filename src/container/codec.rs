//! Template container codec
//!
//! Live Set templates are gzip envelopes around a tagged-text document. The
//! decoded form is kept as raw bytes rather than a `String`: substitution
//! operates on exact bytes, so an untouched document re-encodes to content
//! that decompresses bit-for-bit identical. A lossy or normalizing text
//! decode would corrupt any non-UTF-8 bytes the document carries.

use crate::error::{Result, StembindError};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;
use tracing::debug;

/// Decompress a template container into its document bytes
///
/// Fails with a `Container` error when the file is missing, not gzip, or
/// truncated mid-stream.
pub fn decode(path: &Path) -> Result<Vec<u8>> {
    let file = File::open(path)
        .map_err(|e| StembindError::container(path, format!("cannot open: {}", e)))?;

    let mut document = Vec::new();
    GzDecoder::new(BufReader::new(file))
        .read_to_end(&mut document)
        .map_err(|e| StembindError::container(path, e.to_string()))?;

    debug!(
        "Decoded {} ({} bytes uncompressed)",
        path.display(),
        document.len()
    );

    Ok(document)
}

/// Compress document bytes back into container form
pub fn encode(document: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(document)?;
    Ok(encoder.finish()?)
}
