//! Artifact bundle layout
//!
//! The registry stores one opaque blob per release. Depot's blob is a
//! canonical JSON document carrying the manifest and the package's content
//! files. The domain object format inside the files is not interpreted
//! here; files are moved as-is onto the target through a deployment unit.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{DepotError, Result};
use crate::manifest::Manifest;

/// A packaged release: manifest plus content files keyed by relative path
///
/// `files` is a `BTreeMap` so serialization is canonical and the digest of
/// the encoded bytes is stable for identical content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactBundle {
    /// Manifest of the packaged release
    pub manifest: Manifest,

    /// Content files, relative path to content
    pub files: BTreeMap<String, String>,
}

impl ArtifactBundle {
    /// Encode the bundle to its canonical byte form
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| DepotError::ManifestParseFailed {
            name: self.manifest.name.clone(),
            reason: e.to_string(),
        })
    }

    /// Decode a bundle from registry bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| DepotError::ManifestParseFailed {
            name: "artifact".to_string(),
            reason: e.to_string(),
        })
    }
}
