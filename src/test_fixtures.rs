//! Test fixtures and utilities for reducing test setup duplication.
//!
//! Provides an in-memory registry, manifest builders and a ready-made
//! session over a sandbox system in a temp directory.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Duration;

use semver::{Version, VersionReq};
use tempfile::TempDir;

use crate::artifact::ArtifactBundle;
use crate::confirm::{Confirmation, UnattendedConfirmation};
use crate::deploy::sandbox::SandboxUnits;
use crate::error::{DepotError, Result};
use crate::hash;
use crate::manifest::{Dependency, Manifest};
use crate::registry::{PackageRecord, Registry, RegistrySet, Release};
use crate::resolver::{Session, SessionOptions};
use crate::system::InstalledPackage;
use crate::system::sandbox::SandboxSystem;

/// Build a manifest with the given dependencies
pub fn manifest(name: &str, version: &str, dependencies: Vec<Dependency>) -> Manifest {
    Manifest {
        name: name.to_string(),
        version: Version::parse(version).expect("valid version"),
        description: None,
        dependencies,
        prerequisites: vec![],
        post_install: vec![],
    }
}

/// Build a dependency on `name` with the given range
pub fn dependency(name: &str, range: &str) -> Dependency {
    Dependency::new(name, VersionReq::parse(range).expect("valid range"))
}

/// Build an installed-package record
pub fn installed(
    name: &str,
    version: &str,
    registry: &str,
    integrity: Option<&str>,
) -> InstalledPackage {
    InstalledPackage {
        name: name.to_string(),
        registry: registry.to_string(),
        manifest: manifest(name, version, vec![]),
        location: format!("/SBX/{name}"),
        integrity: integrity.map(str::to_string),
    }
}

/// In-memory registry for unit tests
#[derive(Default)]
pub struct MemoryRegistry {
    releases: RefCell<BTreeMap<String, Vec<(Version, Vec<u8>)>>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a release with raw artifact bytes, returning its digest
    pub fn add_release(&self, name: &str, version: &str, bytes: Vec<u8>) -> String {
        let digest = hash::digest_bytes(&bytes);
        self.releases
            .borrow_mut()
            .entry(name.to_string())
            .or_default()
            .push((Version::parse(version).expect("valid version"), bytes));
        digest
    }

    /// Store a release built from a manifest, returning its digest
    pub fn add_package(&self, manifest: Manifest) -> String {
        let version = manifest.version.to_string();
        let name = manifest.name.clone();
        let bundle = ArtifactBundle {
            manifest,
            files: BTreeMap::new(),
        };
        let bytes = bundle.to_bytes().expect("bundle encodes");
        self.add_release(&name, &version, bytes)
    }
}

impl Registry for MemoryRegistry {
    fn releases(&self, name: &str, range: &VersionReq) -> Result<Vec<Release>> {
        let releases = self.releases.borrow();
        let Some(entries) = releases.get(name) else {
            return Ok(vec![]);
        };
        Ok(entries
            .iter()
            .filter(|(v, _)| range.matches(v))
            .map(|(v, bytes)| Release {
                version: v.clone(),
                integrity: hash::digest_bytes(bytes),
            })
            .collect())
    }

    fn package(&self, name: &str, version: &Version) -> Result<PackageRecord> {
        let releases = self.releases.borrow();
        let bytes = releases
            .get(name)
            .and_then(|entries| entries.iter().find(|(v, _)| v == version))
            .map(|(_, bytes)| bytes.clone())
            .ok_or_else(|| DepotError::PackageNotFound {
                name: name.to_string(),
                registry: "memory".to_string(),
            })?;
        let bundle = ArtifactBundle::from_bytes(&bytes)?;
        Ok(PackageRecord {
            manifest: bundle.manifest,
            artifact_link: format!("memory://{name}/{version}"),
        })
    }

    fn download(&self, name: &str, version: &Version) -> Result<Vec<u8>> {
        let releases = self.releases.borrow();
        releases
            .get(name)
            .and_then(|entries| entries.iter().find(|(v, _)| v == version))
            .map(|(_, bytes)| bytes.clone())
            .ok_or_else(|| DepotError::PackageNotFound {
                name: name.to_string(),
                registry: "memory".to_string(),
            })
    }

    fn publish(
        &self,
        name: &str,
        version: &Version,
        artifact: &[u8],
        _readme: Option<&str>,
    ) -> Result<()> {
        self.add_release(name, &version.to_string(), artifact.to_vec());
        Ok(())
    }
}

/// Confirmation stub that records prompts and answers from a script
pub struct ScriptedConfirmation {
    answers: RefCell<Vec<bool>>,
    pub prompts: RefCell<Vec<String>>,
}

impl ScriptedConfirmation {
    /// Answers are consumed front to back; an exhausted script accepts
    pub fn new(answers: Vec<bool>) -> Self {
        Self {
            answers: RefCell::new(answers),
            prompts: RefCell::new(vec![]),
        }
    }
}

impl Confirmation for ScriptedConfirmation {
    fn confirm(&self, prompt: &str) -> Result<bool> {
        self.prompts.borrow_mut().push(prompt.to_string());
        let mut answers = self.answers.borrow_mut();
        if answers.is_empty() {
            Ok(true)
        } else {
            Ok(answers.remove(0))
        }
    }
}

/// A full test environment: sandbox system, one memory registry, units
pub struct TestEnv {
    pub temp: TempDir,
    pub registry: Rc<MemoryRegistry>,
    pub session: Session,
}

/// Build a session over fresh sandbox state with a "public" memory registry
pub fn test_env(options: SessionOptions) -> TestEnv {
    test_env_with_confirm(options, Rc::new(UnattendedConfirmation))
}

/// Same as [`test_env`] but with a custom confirmation gate
pub fn test_env_with_confirm(options: SessionOptions, confirm: Rc<dyn Confirmation>) -> TestEnv {
    let temp = TempDir::new().expect("temp dir");
    let system = Rc::new(SandboxSystem::open(temp.path().join("system")).expect("sandbox"));
    let units = Rc::new(SandboxUnits::open(temp.path().join("units")).expect("units"));

    let registry = Rc::new(MemoryRegistry::new());
    let mut set = RegistrySet::new("public");
    set.insert("public", Rc::clone(&registry) as Rc<dyn Registry>);

    let session = Session::new(
        system,
        Rc::new(set),
        units,
        confirm,
        options,
        Duration::from_secs(5),
    );

    TestEnv {
        temp,
        registry,
        session,
    }
}
