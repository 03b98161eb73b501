//! Dependency declaration in a package manifest

use semver::VersionReq;
use serde::{Deserialize, Serialize};

use crate::error::{DepotError, Result};

/// A dependency declaration in depot.yaml
///
/// Part of an immutable published manifest. The optional integrity pin
/// fixes resolution to the exact artifact that carried this digest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dependency {
    /// Dependency name
    pub name: String,

    /// Semantic version range the installed package must satisfy
    pub range: VersionReq,

    /// Registry the dependency resolves against (defaults to the parent's)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry: Option<String>,

    /// Content-integrity pin for the exact artifact build
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integrity: Option<String>,
}

impl Dependency {
    /// Create a dependency on any registry, without a pin
    #[allow(dead_code)]
    pub fn new(name: impl Into<String>, range: VersionReq) -> Self {
        Self {
            name: name.into(),
            range,
            registry: None,
            integrity: None,
        }
    }

    /// Create a dependency pinned to an exact artifact digest
    #[allow(dead_code)]
    pub fn pinned(name: impl Into<String>, range: VersionReq, integrity: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            range,
            registry: None,
            integrity: Some(integrity.into()),
        }
    }

    /// The registry this dependency resolves against, inheriting from the parent
    pub fn registry_or<'a>(&'a self, parent: &'a str) -> &'a str {
        self.registry.as_deref().unwrap_or(parent)
    }

    /// Validate the declaration
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(DepotError::ManifestInvalid {
                message: "Dependency name cannot be empty".to_string(),
            });
        }

        if let Some(pin) = &self.integrity {
            if pin.is_empty() {
                return Err(DepotError::ManifestInvalid {
                    message: format!("Dependency '{}' has an empty integrity pin", self.name),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_inheritance() {
        let dep = Dependency::new("util-lib", VersionReq::STAR);
        assert_eq!(dep.registry_or("public"), "public");

        let dep = Dependency {
            registry: Some("internal".to_string()),
            ..Dependency::new("util-lib", VersionReq::STAR)
        };
        assert_eq!(dep.registry_or("public"), "internal");
    }

    #[test]
    fn test_validate_empty_name() {
        let dep = Dependency::new("", VersionReq::STAR);
        assert!(dep.validate().is_err());
    }

    #[test]
    fn test_validate_empty_pin() {
        let dep = Dependency::pinned("util-lib", VersionReq::STAR, "");
        assert!(dep.validate().is_err());
    }

    #[test]
    fn test_pinned_constructor() {
        let dep = Dependency::pinned("util-lib", VersionReq::STAR, "blake3:ff00");
        assert_eq!(dep.integrity.as_deref(), Some("blake3:ff00"));
    }
}
