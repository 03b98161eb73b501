//! Directory-backed registry
//!
//! Layout under the registry root:
//!
//! ```text
//! index.json                    release index per package
//! artifacts/<name>-<version>    artifact blobs
//! manifests/<name>-<version>.yaml
//! readmes/<name>-<version>.md   optional
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use semver::{Version, VersionReq};
use serde::{Deserialize, Serialize};

use crate::artifact::ArtifactBundle;
use crate::error::{DepotError, Result};
use crate::hash;
use crate::manifest::Manifest;
use crate::registry::{PackageRecord, Registry, Release};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexRelease {
    version: Version,
    integrity: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Index {
    packages: BTreeMap<String, Vec<IndexRelease>>,
}

/// A registry stored as a plain directory tree
pub struct DirRegistry {
    root: PathBuf,
}

impl DirRegistry {
    /// Open a registry rooted at `root`, creating the layout if absent
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(root.join("artifacts"))?;
        fs::create_dir_all(root.join("manifests"))?;
        fs::create_dir_all(root.join("readmes"))?;
        Ok(Self { root })
    }

    fn index_path(&self) -> PathBuf {
        self.root.join("index.json")
    }

    fn artifact_path(&self, name: &str, version: &Version) -> PathBuf {
        self.root.join("artifacts").join(format!("{name}-{version}"))
    }

    fn manifest_path(&self, name: &str, version: &Version) -> PathBuf {
        self.root
            .join("manifests")
            .join(format!("{name}-{version}.yaml"))
    }

    fn load_index(&self) -> Result<Index> {
        let path = self.index_path();
        if !path.exists() {
            return Ok(Index::default());
        }
        let content = fs::read_to_string(&path).map_err(|e| DepotError::FileReadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| DepotError::ConfigParseFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    fn store_index(&self, index: &Index) -> Result<()> {
        let path = self.index_path();
        let json = serde_json::to_string_pretty(index).map_err(|e| DepotError::ConfigParseFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        fs::write(&path, json).map_err(|e| DepotError::FileWriteFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    fn read_manifest(&self, path: &Path, name: &str) -> Result<Manifest> {
        let content = fs::read_to_string(path).map_err(|e| DepotError::FileReadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Manifest::from_yaml(&content).map_err(|e| DepotError::ManifestParseFailed {
            name: name.to_string(),
            reason: e.to_string(),
        })
    }
}

impl Registry for DirRegistry {
    fn releases(&self, name: &str, range: &VersionReq) -> Result<Vec<Release>> {
        let index = self.load_index()?;
        let Some(releases) = index.packages.get(name) else {
            return Ok(vec![]);
        };

        Ok(releases
            .iter()
            .filter(|r| range.matches(&r.version))
            .map(|r| Release {
                version: r.version.clone(),
                integrity: r.integrity.clone(),
            })
            .collect())
    }

    fn package(&self, name: &str, version: &Version) -> Result<PackageRecord> {
        let path = self.manifest_path(name, version);
        if !path.exists() {
            return Err(DepotError::PackageNotFound {
                name: name.to_string(),
                registry: self.root.display().to_string(),
            });
        }
        let manifest = self.read_manifest(&path, name)?;
        Ok(PackageRecord {
            manifest,
            artifact_link: self.artifact_path(name, version).display().to_string(),
        })
    }

    fn download(&self, name: &str, version: &Version) -> Result<Vec<u8>> {
        let path = self.artifact_path(name, version);
        if !path.exists() {
            return Err(DepotError::PackageNotFound {
                name: name.to_string(),
                registry: self.root.display().to_string(),
            });
        }
        fs::read(&path).map_err(|e| DepotError::FileReadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    fn publish(
        &self,
        name: &str,
        version: &Version,
        artifact: &[u8],
        readme: Option<&str>,
    ) -> Result<()> {
        let mut index = self.load_index()?;
        let releases = index.packages.entry(name.to_string()).or_default();

        if releases.iter().any(|r| &r.version == version) {
            return Err(DepotError::PublishFailed {
                name: name.to_string(),
                reason: format!("version {version} already exists"),
            });
        }

        // The stored manifest is served back by package(); the blob stays opaque
        let bundle = ArtifactBundle::from_bytes(artifact)?;

        let artifact_path = self.artifact_path(name, version);
        fs::write(&artifact_path, artifact).map_err(|e| DepotError::FileWriteFailed {
            path: artifact_path.display().to_string(),
            reason: e.to_string(),
        })?;

        let manifest_path = self.manifest_path(name, version);
        fs::write(&manifest_path, bundle.manifest.to_yaml()?).map_err(|e| {
            DepotError::FileWriteFailed {
                path: manifest_path.display().to_string(),
                reason: e.to_string(),
            }
        })?;

        if let Some(readme) = readme {
            let readme_path = self.root.join("readmes").join(format!("{name}-{version}.md"));
            fs::write(&readme_path, readme).map_err(|e| DepotError::FileWriteFailed {
                path: readme_path.display().to_string(),
                reason: e.to_string(),
            })?;
        }

        releases.push(IndexRelease {
            version: version.clone(),
            integrity: hash::digest_bytes(artifact),
        });
        self.store_index(&index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn artifact_for(name: &str, version: &str) -> Vec<u8> {
        let manifest = Manifest {
            name: name.to_string(),
            version: Version::parse(version).unwrap(),
            description: None,
            dependencies: vec![],
            prerequisites: vec![],
            post_install: vec![],
        };
        ArtifactBundle {
            manifest,
            files: BTreeMap::new(),
        }
        .to_bytes()
        .unwrap()
    }

    #[test]
    fn test_publish_and_list_releases() {
        let temp = TempDir::new().unwrap();
        let registry = DirRegistry::open(temp.path()).unwrap();

        registry
            .publish("base-lib", &Version::new(1, 0, 0), &artifact_for("base-lib", "1.0.0"), None)
            .unwrap();
        registry
            .publish("base-lib", &Version::new(1, 2, 0), &artifact_for("base-lib", "1.2.0"), None)
            .unwrap();

        let all = registry
            .releases("base-lib", &VersionReq::STAR)
            .unwrap();
        assert_eq!(all.len(), 2);

        let one_x = registry
            .releases("base-lib", &VersionReq::parse("^1.1").unwrap())
            .unwrap();
        assert_eq!(one_x.len(), 1);
        assert_eq!(one_x[0].version, Version::new(1, 2, 0));
    }

    #[test]
    fn test_publish_duplicate_version_rejected() {
        let temp = TempDir::new().unwrap();
        let registry = DirRegistry::open(temp.path()).unwrap();
        let artifact = artifact_for("base-lib", "1.0.0");

        registry
            .publish("base-lib", &Version::new(1, 0, 0), &artifact, None)
            .unwrap();
        let err = registry
            .publish("base-lib", &Version::new(1, 0, 0), &artifact, None)
            .unwrap_err();
        assert!(matches!(err, DepotError::PublishFailed { .. }));
    }

    #[test]
    fn test_download_round_trips_bytes() {
        let temp = TempDir::new().unwrap();
        let registry = DirRegistry::open(temp.path()).unwrap();
        let artifact = artifact_for("base-lib", "1.0.0");

        registry
            .publish("base-lib", &Version::new(1, 0, 0), &artifact, None)
            .unwrap();

        let downloaded = registry.download("base-lib", &Version::new(1, 0, 0)).unwrap();
        assert_eq!(downloaded, artifact);
    }

    #[test]
    fn test_index_integrity_matches_artifact_digest() {
        let temp = TempDir::new().unwrap();
        let registry = DirRegistry::open(temp.path()).unwrap();
        let artifact = artifact_for("base-lib", "1.0.0");

        registry
            .publish("base-lib", &Version::new(1, 0, 0), &artifact, None)
            .unwrap();

        let releases = registry.releases("base-lib", &VersionReq::STAR).unwrap();
        assert_eq!(releases[0].integrity, hash::digest_bytes(&artifact));
    }

    #[test]
    fn test_package_serves_stored_manifest() {
        let temp = TempDir::new().unwrap();
        let registry = DirRegistry::open(temp.path()).unwrap();

        registry
            .publish("base-lib", &Version::new(1, 0, 0), &artifact_for("base-lib", "1.0.0"), None)
            .unwrap();

        let record = registry.package("base-lib", &Version::new(1, 0, 0)).unwrap();
        assert_eq!(record.manifest.name, "base-lib");
        assert_eq!(record.manifest.version, Version::new(1, 0, 0));
    }

    #[test]
    fn test_unknown_package_errors() {
        let temp = TempDir::new().unwrap();
        let registry = DirRegistry::open(temp.path()).unwrap();

        assert!(registry.package("ghost", &Version::new(1, 0, 0)).is_err());
        assert!(registry.download("ghost", &Version::new(1, 0, 0)).is_err());
        assert!(
            registry
                .releases("ghost", &VersionReq::STAR)
                .unwrap()
                .is_empty()
        );
    }
}
