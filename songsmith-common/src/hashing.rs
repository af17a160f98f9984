//! Content hashing for reference lyric deduplication
//!
//! A reference lyric is stored under the SHA-256 of its normalized text, so
//! submitting the same lyric twice (differing only in case or surrounding
//! whitespace) addresses the same document.

use sha2::{Digest, Sha256};

/// Normalized form used for hashing: trimmed and lowercased
pub fn normalize(content: &str) -> String {
    content.trim().to_lowercase()
}

/// Document id of a reference lyric (lowercase hex SHA-256 of normalized content)
pub fn reference_id(content: &str) -> String {
    let digest = Sha256::digest(normalize(content).as_bytes());
    format!("{:x}", digest)
}
