//! Persisted dedup state: a JSON array of opaque keys.
//!
//! Keys are feed-qualified so two feeds sharing a GUID never collide, and
//! are never evicted. A missing or corrupt state file is recovered as an
//! empty set; it must not fail the run.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::normalize::sha256_hex;

/// Hex digest length of a dedup key.
const KEY_LEN: usize = 32;

/// Deterministic key for a (feed, item) pair. The guid is preferred, then
/// the link, then the bare feed URL.
pub fn seen_key(feed_url: &str, guid: Option<&str>, link: Option<&str>) -> String {
    let base = guid.or(link).unwrap_or("");
    sha256_hex(&format!("{feed_url}{base}"), KEY_LEN)
}

/// Process-wide set of seen keys with a single writer.
pub struct DedupStore {
    path: PathBuf,
    keys: BTreeSet<String>,
    dirty: bool,
}

impl DedupStore {
    /// Load persisted keys, tolerating absent or malformed storage.
    pub fn load(path: &Path) -> Self {
        let keys = match std::fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str::<Vec<String>>(&raw) {
                Ok(list) => list.into_iter().collect(),
                Err(e) => {
                    tracing::error!(
                        path = %path.display(),
                        error = %e,
                        "failed to parse dedup state, starting from empty state"
                    );
                    BTreeSet::new()
                }
            },
            Err(_) => BTreeSet::new(),
        };
        Self {
            path: path.to_path_buf(),
            keys,
            dirty: false,
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn insert(&mut self, key: String) {
        if self.keys.insert(key) {
            self.dirty = true;
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Overwrite persisted storage when new keys were recorded. The
    /// `BTreeSet` gives a stably ordered serialization.
    pub fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        let raw = serde_json::to_string(&self.keys).context("serializing dedup state")?;
        std::fs::write(&self.path, raw)
            .with_context(|| format!("writing dedup state to {}", self.path.display()))?;
        self.dirty = false;
        Ok(())
    }
}
