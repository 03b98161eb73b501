//! Package manifest (depot.yaml)
//!
//! A manifest is the immutable metadata published with every package
//! release: name, version, declared dependencies, target prerequisites
//! and post-install activities.

pub mod dependency;

use semver::Version;
use serde::{Deserialize, Serialize};

use crate::error::{DepotError, Result};

pub use dependency::Dependency;

/// A target-platform prerequisite recorded at publish time
///
/// Prerequisites are not installable packages; they name components the
/// target system must already provide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prerequisite {
    /// Component name on the target platform
    pub component: String,

    /// Minimum release of the component, free-form
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_release: Option<String>,
}

/// Package manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Package name
    pub name: String,

    /// Package version
    pub version: Version,

    /// Short description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Declared dependencies on other packages
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<Dependency>,

    /// Target-platform prerequisites
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prerequisites: Vec<Prerequisite>,

    /// Post-install activity names, run in order after a successful import
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub post_install: Vec<String>,
}

impl Manifest {
    /// Parse a manifest from YAML
    pub fn from_yaml(content: &str) -> Result<Self> {
        let manifest: Manifest =
            serde_yaml::from_str(content).map_err(|e| DepotError::ManifestParseFailed {
                name: "unknown".to_string(),
                reason: e.to_string(),
            })?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Serialize the manifest to YAML
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| DepotError::ManifestParseFailed {
            name: self.name.clone(),
            reason: e.to_string(),
        })
    }

    /// Validate manifest contents
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(DepotError::ManifestInvalid {
                message: "Package name cannot be empty".to_string(),
            });
        }

        for dep in &self.dependencies {
            dep.validate()?;
            if dep.name == self.name {
                return Err(DepotError::ManifestInvalid {
                    message: format!("Package '{}' cannot depend on itself", self.name),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use semver::VersionReq;

    fn sample_yaml() -> &'static str {
        r#"
name: base-lib
version: 1.2.0
description: Shared base library
dependencies:
  - name: util-lib
    range: "^2.0.0"
  - name: codec-lib
    range: ">=1.0.0, <3.0.0"
    registry: internal
    integrity: "blake3:0011aabb"
prerequisites:
  - component: BASIS
    min_release: "750"
post_install:
  - refresh-index
"#
    }

    #[test]
    fn test_parse_manifest() {
        let manifest = Manifest::from_yaml(sample_yaml()).unwrap();
        assert_eq!(manifest.name, "base-lib");
        assert_eq!(manifest.version, Version::new(1, 2, 0));
        assert_eq!(manifest.dependencies.len(), 2);
        assert_eq!(manifest.prerequisites.len(), 1);
        assert_eq!(manifest.post_install, vec!["refresh-index".to_string()]);
    }

    #[test]
    fn test_parse_dependency_fields() {
        let manifest = Manifest::from_yaml(sample_yaml()).unwrap();
        let dep = &manifest.dependencies[1];
        assert_eq!(dep.name, "codec-lib");
        assert_eq!(dep.registry.as_deref(), Some("internal"));
        assert_eq!(dep.integrity.as_deref(), Some("blake3:0011aabb"));
        assert!(dep.range.matches(&Version::new(2, 5, 0)));
        assert!(!dep.range.matches(&Version::new(3, 0, 0)));
    }

    #[test]
    fn test_yaml_round_trip() {
        let manifest = Manifest::from_yaml(sample_yaml()).unwrap();
        let yaml = manifest.to_yaml().unwrap();
        let reparsed = Manifest::from_yaml(&yaml).unwrap();
        assert_eq!(reparsed.name, manifest.name);
        assert_eq!(reparsed.version, manifest.version);
        assert_eq!(reparsed.dependencies.len(), manifest.dependencies.len());
    }

    #[test]
    fn test_empty_name_rejected() {
        let result = Manifest::from_yaml("name: \"\"\nversion: 1.0.0\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_self_dependency_rejected() {
        let manifest = Manifest {
            name: "loop-pkg".to_string(),
            version: Version::new(1, 0, 0),
            description: None,
            dependencies: vec![Dependency::new("loop-pkg", VersionReq::STAR)],
            prerequisites: vec![],
            post_install: vec![],
        };
        assert!(manifest.validate().is_err());
    }

    #[test]
    fn test_minimal_manifest() {
        let manifest = Manifest::from_yaml("name: tiny\nversion: 0.1.0\n").unwrap();
        assert!(manifest.dependencies.is_empty());
        assert!(manifest.prerequisites.is_empty());
        assert!(manifest.post_install.is_empty());
    }
}
