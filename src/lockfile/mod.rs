//! Lockfile (depot.lock)
//!
//! A lockfile records the exact version and content digest resolved for
//! every transitive dependency of a root package at a point in time. It can
//! replay a resolution deterministically or detect drift. Entries are
//! deduplicated and kept in a deterministic order so diffs stay stable.

use semver::Version;
use serde::{Deserialize, Serialize};

use crate::error::{DepotError, Result};

/// One resolved package in the lockfile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockEntry {
    /// Package name
    pub name: String,

    /// Exact resolved version
    pub version: Version,

    /// Registry the artifact was resolved from
    pub registry: String,

    /// Content digest of the resolved artifact
    pub integrity: String,
}

/// Lockfile structure (depot.lock)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Lockfile {
    /// Root package the resolution was computed for
    pub root: String,

    /// Resolved entries, ordered by name then registry
    pub entries: Vec<LockEntry>,
}

impl Lockfile {
    /// Create an empty lockfile for a root package
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            entries: Vec::new(),
        }
    }

    /// Parse a lockfile from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let mut lockfile: Self =
            serde_json::from_str(json).map_err(|e| DepotError::LockfileParseFailed {
                reason: e.to_string(),
            })?;
        lockfile.normalize();
        Ok(lockfile)
    }

    /// Serialize the lockfile to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        let mut sorted = self.clone();
        sorted.normalize();
        serde_json::to_string_pretty(&sorted).map_err(|e| DepotError::LockfileParseFailed {
            reason: e.to_string(),
        })
    }

    /// Add an entry, replacing any previous entry for the same (name, registry)
    pub fn add_entry(&mut self, entry: LockEntry) {
        self.entries
            .retain(|e| !(e.name == entry.name && e.registry == entry.registry));
        self.entries.push(entry);
        self.normalize();
    }

    /// Find the entry for a (name, registry) pair
    pub fn find_entry(&self, name: &str, registry: &str) -> Option<&LockEntry> {
        self.entries
            .iter()
            .find(|e| e.name == name && e.registry == registry)
    }

    /// Sort entries by name, then registry, for reproducible output
    fn normalize(&mut self) {
        self.entries
            .sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.registry.cmp(&b.registry)));
    }
}
