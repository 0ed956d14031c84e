//! ETag computation for rendered bib images.
//!
//! Rendering is deterministic, so a strong ETag over the PNG bytes lets
//! clients skip re-downloading an unchanged bib.

use axum::http::{HeaderMap, header};
use sha2::{Digest, Sha256};

/// Strong ETag for `body`: the quoted SHA-256 hex digest.
pub fn compute_etag(body: &[u8]) -> String {
  let hash = Sha256::digest(body);
  format!("\"{}\"", hex::encode(hash))
}

/// Whether the request's `If-None-Match` header matches `etag`.
///
/// Accepts `*`, comma-separated lists and weak (`W/`) validators.
pub fn if_none_match(headers: &HeaderMap, etag: &str) -> bool {
  headers
    .get_all(header::IF_NONE_MATCH)
    .iter()
    .filter_map(|v| v.to_str().ok())
    .flat_map(|v| v.split(','))
    .map(str::trim)
    .any(|candidate| {
      candidate == "*" || candidate.trim_start_matches("W/") == etag
    })
}
