//! Content fingerprints for source units, using SHA-256 for change detection.
//!
//! The index remembers the hash of the text each unit was last extracted
//! from, so an editor event that re-sends unchanged content costs a hash
//! instead of a re-extraction.

use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// Compute the SHA-256 hash of some bytes as lowercase hex.
#[inline]
pub fn hash_bytes(bytes: &[u8]) -> String {
    let mut sha = Sha256::new();
    sha.update(bytes);
    format!("{:x}", sha.finalize())
}

/// Last successfully extracted content hash, per source unit.
#[derive(Debug, Clone, Default)]
pub struct UnitCache {
    hashes: HashMap<String, String>,
}

impl UnitCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `source` was last extracted from content with this hash.
    pub fn is_unchanged(&self, source: &str, hash: &str) -> bool {
        self.hashes.get(source).is_some_and(|h| h == hash)
    }

    /// Remember the hash `source` was extracted from.
    pub fn record(&mut self, source: &str, hash: String) {
        self.hashes.insert(source.to_string(), hash);
    }

    /// Forget a unit, forcing the next update to re-extract it.
    pub fn forget(&mut self, source: &str) {
        self.hashes.remove(source);
    }

    pub fn clear(&mut self) {
        self.hashes.clear();
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }
}
