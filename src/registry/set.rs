//! Named registry lookup

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::error::{DepotError, Result};
use crate::registry::Registry;

/// The configured registries, keyed by name, with a designated default
pub struct RegistrySet {
    default: String,
    registries: BTreeMap<String, Rc<dyn Registry>>,
}

impl RegistrySet {
    /// Create a set with the given default registry name
    pub fn new(default: impl Into<String>) -> Self {
        Self {
            default: default.into(),
            registries: BTreeMap::new(),
        }
    }

    /// Register a registry under a name
    pub fn insert(&mut self, name: impl Into<String>, registry: Rc<dyn Registry>) {
        self.registries.insert(name.into(), registry);
    }

    /// Name of the default registry
    pub fn default_name(&self) -> &str {
        &self.default
    }

    /// Look up a registry by name
    pub fn get(&self, name: &str) -> Result<Rc<dyn Registry>> {
        self.registries
            .get(name)
            .cloned()
            .ok_or_else(|| DepotError::RegistryNotFound {
                name: name.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{PackageRecord, Release};
    use semver::{Version, VersionReq};

    struct EmptyRegistry;

    impl Registry for EmptyRegistry {
        fn releases(&self, _name: &str, _range: &VersionReq) -> Result<Vec<Release>> {
            Ok(vec![])
        }

        fn package(&self, name: &str, _version: &Version) -> Result<PackageRecord> {
            Err(DepotError::PackageNotFound {
                name: name.to_string(),
                registry: "empty".to_string(),
            })
        }

        fn download(&self, name: &str, _version: &Version) -> Result<Vec<u8>> {
            Err(DepotError::PackageNotFound {
                name: name.to_string(),
                registry: "empty".to_string(),
            })
        }

        fn publish(
            &self,
            _name: &str,
            _version: &Version,
            _artifact: &[u8],
            _readme: Option<&str>,
        ) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_lookup_known_registry() {
        let mut set = RegistrySet::new("public");
        set.insert("public", Rc::new(EmptyRegistry));

        assert!(set.get("public").is_ok());
        assert_eq!(set.default_name(), "public");
    }

    #[test]
    fn test_lookup_unknown_registry() {
        let set = RegistrySet::new("public");
        let err = set.get("internal").unwrap_err();
        assert!(matches!(err, DepotError::RegistryNotFound { .. }));
    }
}
