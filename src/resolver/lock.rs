//! Lockfile construction and replay
//!
//! Building walks a root package's transitive dependencies through the
//! registries, applying the same selection rules as installation, and
//! records the exact version and digest chosen for each. Replaying
//! re-fetches every locked artifact and compares digests byte-exact; any
//! difference is a hard failure with no permissive escape.

use semver::VersionReq;
use tracing::debug;

use crate::error::{DepotError, Result};
use crate::hash;
use crate::lockfile::{LockEntry, Lockfile};
use crate::registry::{Registry, RegistrySet};
use crate::resolver::select_release;

/// Resolve a root package's transitive dependencies into a lockfile
///
/// Dependencies are walked in declaration order; each `(name, registry)`
/// pair is resolved once. Cycles terminate through the entry dedup.
pub fn build_lockfile(
    registries: &RegistrySet,
    root: &str,
    range: &VersionReq,
    registry_name: Option<&str>,
) -> Result<Lockfile> {
    let mut lockfile = Lockfile::new(root);
    let root_registry = registry_name
        .unwrap_or_else(|| registries.default_name())
        .to_string();

    let mut queue: Vec<(String, VersionReq, String, Option<String>)> = vec![(
        root.to_string(),
        range.clone(),
        root_registry,
        None,
    )];

    while let Some((name, range, registry_name, pin)) = queue.pop() {
        if lockfile.find_entry(&name, &registry_name).is_some() {
            continue;
        }

        let registry = registries.get(&registry_name)?;
        let releases = registry.releases(&name, &range)?;
        if releases.is_empty() {
            return Err(DepotError::DependencyNotFound {
                name,
                range: range.to_string(),
            });
        }

        let selected = select_release(registry.as_ref(), &name, releases, pin.as_deref())?;
        let digest = match selected.digest {
            Some(digest) => digest,
            None => hash::digest_bytes(&registry.download(&name, &selected.version)?),
        };
        debug!(package = %name, version = %selected.version, "locked");

        let record = registry.package(&name, &selected.version)?;
        for dep in &record.manifest.dependencies {
            queue.push((
                dep.name.clone(),
                dep.range.clone(),
                dep.registry_or(&registry_name).to_string(),
                dep.integrity.clone(),
            ));
        }

        lockfile.add_entry(LockEntry {
            name,
            version: selected.version,
            registry: registry_name,
            integrity: digest,
        });
    }

    Ok(lockfile)
}

/// Replay a lockfile against the registries
///
/// Every entry's artifact is downloaded and digested again. A mismatch is
/// a security failure and is never suppressible.
pub fn verify_lockfile(registries: &RegistrySet, lockfile: &Lockfile) -> Result<()> {
    for entry in &lockfile.entries {
        let registry = registries.get(&entry.registry)?;
        let bytes = registry.download(&entry.name, &entry.version)?;
        let digest = hash::digest_bytes(&bytes);
        if !hash::verify_hash(&entry.integrity, &digest) {
            return Err(DepotError::IntegrityMismatch {
                name: entry.name.clone(),
                expected: entry.integrity.clone(),
                actual: digest,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Registry, RegistrySet};
    use crate::test_fixtures::{dependency, manifest, MemoryRegistry};
    use semver::Version;
    use std::rc::Rc;

    fn registry_set(registry: Rc<MemoryRegistry>) -> RegistrySet {
        let mut set = RegistrySet::new("public");
        set.insert("public", registry as Rc<dyn Registry>);
        set
    }

    #[test]
    fn test_build_locks_transitive_closure() {
        let registry = Rc::new(MemoryRegistry::new());
        registry.add_package(manifest("base-lib", "1.2.0", vec![]));
        registry.add_package(manifest(
            "app",
            "1.0.0",
            vec![dependency("base-lib", "^1.0.0")],
        ));
        let set = registry_set(Rc::clone(&registry));

        let lockfile =
            build_lockfile(&set, "app", &VersionReq::parse("^1.0.0").unwrap(), None).unwrap();

        assert_eq!(lockfile.root, "app");
        assert_eq!(lockfile.entries.len(), 2);
        let base = lockfile.find_entry("base-lib", "public").unwrap();
        assert_eq!(base.version, Version::new(1, 2, 0));
    }

    #[test]
    fn test_build_terminates_on_cycle() {
        let registry = Rc::new(MemoryRegistry::new());
        registry.add_package(manifest(
            "pkg-a",
            "1.0.0",
            vec![dependency("pkg-b", "^1.0.0")],
        ));
        registry.add_package(manifest(
            "pkg-b",
            "1.0.0",
            vec![dependency("pkg-a", "^1.0.0")],
        ));
        let set = registry_set(Rc::clone(&registry));

        let lockfile =
            build_lockfile(&set, "pkg-a", &VersionReq::parse("^1.0.0").unwrap(), None).unwrap();
        assert_eq!(lockfile.entries.len(), 2);
    }

    #[test]
    fn test_build_respects_pins() {
        let registry = Rc::new(MemoryRegistry::new());
        let digest_100 = registry.add_package(manifest("base-lib", "1.0.0", vec![]));
        registry.add_package(manifest("base-lib", "1.2.0", vec![]));

        let mut dep = dependency("base-lib", "^1.0.0");
        dep.integrity = Some(digest_100.clone());
        registry.add_package(manifest("app", "1.0.0", vec![dep]));
        let set = registry_set(Rc::clone(&registry));

        let lockfile =
            build_lockfile(&set, "app", &VersionReq::parse("^1.0.0").unwrap(), None).unwrap();

        let base = lockfile.find_entry("base-lib", "public").unwrap();
        assert_eq!(base.version, Version::new(1, 0, 0));
        assert_eq!(base.integrity, digest_100);
    }

    #[test]
    fn test_verify_passes_on_unchanged_registry() {
        let registry = Rc::new(MemoryRegistry::new());
        registry.add_package(manifest("base-lib", "1.0.0", vec![]));
        let set = registry_set(Rc::clone(&registry));

        let lockfile =
            build_lockfile(&set, "base-lib", &VersionReq::STAR, None).unwrap();
        verify_lockfile(&set, &lockfile).unwrap();
    }

    #[test]
    fn test_verify_fails_on_drift() {
        let registry = Rc::new(MemoryRegistry::new());
        registry.add_package(manifest("base-lib", "1.0.0", vec![]));
        let set = registry_set(Rc::clone(&registry));

        let mut lockfile =
            build_lockfile(&set, "base-lib", &VersionReq::STAR, None).unwrap();
        lockfile.entries[0].integrity = "blake3:tampered".to_string();

        let err = verify_lockfile(&set, &lockfile).unwrap_err();
        assert!(matches!(err, DepotError::IntegrityMismatch { .. }));
    }

    #[test]
    fn test_missing_dependency_fails_build() {
        let registry = Rc::new(MemoryRegistry::new());
        registry.add_package(manifest(
            "app",
            "1.0.0",
            vec![dependency("ghost", "^1.0.0")],
        ));
        let set = registry_set(Rc::clone(&registry));

        let err = build_lockfile(&set, "app", &VersionReq::STAR, None).unwrap_err();
        assert!(matches!(err, DepotError::DependencyNotFound { .. }));
    }
}
