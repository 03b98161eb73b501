//! JSON-state sandbox system
//!
//! Persists the target system's state in a single `system.json` under the
//! sandbox directory. Installed content lives next to it, one directory per
//! container. The installed-package listing is cached per connector and
//! reloaded only on `force_refresh`.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DepotError, Result};
use crate::system::{InstalledPackage, ObjectReference, PlatformComponent, System};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SandboxState {
    #[serde(default)]
    id: String,

    #[serde(default = "default_true")]
    authorized: bool,

    #[serde(default)]
    components: Vec<PlatformComponent>,

    #[serde(default)]
    packages: Vec<InstalledPackage>,

    /// Recorded digests keyed by "name@registry"
    #[serde(default)]
    integrity: BTreeMap<String, String>,

    #[serde(default)]
    namespaces: Vec<String>,

    /// Container locations keyed by package name
    #[serde(default)]
    containers: BTreeMap<String, String>,

    #[serde(default)]
    legacy: Vec<String>,

    /// Activities run, as "package:activity", newest last
    #[serde(default)]
    activities: Vec<String>,

    /// Packages whose hierarchy was swapped to the incoming layout
    #[serde(default)]
    hierarchy_swapped: Vec<String>,

    /// Content kinds the sandbox refuses to deploy
    #[serde(default)]
    unsupported_kinds: Vec<String>,

    /// Activities configured to fail, for rehearsing rollback paths
    #[serde(default)]
    failing_activities: Vec<String>,
}

fn default_true() -> bool {
    true
}

/// Directory-backed sandbox implementation of [`System`]
pub struct SandboxSystem {
    root: PathBuf,
    state: RefCell<SandboxState>,
    listing: RefCell<Option<Vec<InstalledPackage>>>,
}

impl SandboxSystem {
    /// Open a sandbox rooted at `root`, creating empty state if absent
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;

        let state_path = root.join("system.json");
        let state = if state_path.exists() {
            let content =
                fs::read_to_string(&state_path).map_err(|e| DepotError::FileReadFailed {
                    path: state_path.display().to_string(),
                    reason: e.to_string(),
                })?;
            serde_json::from_str(&content).map_err(|e| DepotError::SystemState {
                message: format!("corrupt system state: {e}"),
            })?
        } else {
            SandboxState {
                id: "SBX".to_string(),
                authorized: true,
                ..SandboxState::default()
            }
        };

        Ok(Self {
            root,
            state: RefCell::new(state),
            listing: RefCell::new(None),
        })
    }

    fn save(&self) -> Result<()> {
        let state_path = self.root.join("system.json");
        let json = serde_json::to_string_pretty(&*self.state.borrow()).map_err(|e| {
            DepotError::SystemState {
                message: format!("failed to encode system state: {e}"),
            }
        })?;
        fs::write(&state_path, json).map_err(|e| DepotError::FileWriteFailed {
            path: state_path.display().to_string(),
            reason: e.to_string(),
        })
    }

    fn integrity_key(name: &str, registry: &str) -> String {
        format!("{name}@{registry}")
    }
}

impl System for SandboxSystem {
    fn id(&self) -> String {
        self.state.borrow().id.clone()
    }

    fn authorized(&self) -> Result<bool> {
        Ok(self.state.borrow().authorized)
    }

    fn installed_packages(
        &self,
        include_sources: bool,
        force_refresh: bool,
    ) -> Result<Vec<InstalledPackage>> {
        if force_refresh {
            self.listing.replace(None);
        }

        if self.listing.borrow().is_none() {
            debug!(system = %self.id(), "populating installed-package listing");
            let state = self.state.borrow();
            let mut packages = state.packages.clone();
            for package in &mut packages {
                let key = Self::integrity_key(&package.name, &package.registry);
                package.integrity = state.integrity.get(&key).cloned();
            }
            self.listing.replace(Some(packages));
        }

        let listing = self.listing.borrow();
        let mut packages = listing.clone().unwrap_or_default();
        if !include_sources {
            for package in &mut packages {
                package.integrity = None;
            }
        }
        Ok(packages)
    }

    fn package_integrity(&self, name: &str, registry: &str) -> Result<Option<String>> {
        let key = Self::integrity_key(name, registry);
        Ok(self.state.borrow().integrity.get(&key).cloned())
    }

    fn record_integrity(&self, name: &str, registry: &str, integrity: &str) -> Result<()> {
        let key = Self::integrity_key(name, registry);
        self.state
            .borrow_mut()
            .integrity
            .insert(key, integrity.to_string());
        self.listing.replace(None);
        self.save()
    }

    fn record_installed(&self, package: InstalledPackage) -> Result<()> {
        {
            let mut state = self.state.borrow_mut();
            state
                .packages
                .retain(|p| !(p.name == package.name && p.registry == package.registry));
            state.packages.push(package);
        }
        self.listing.replace(None);
        self.save()
    }

    fn remove_package(&self, name: &str, registry: &str) -> Result<()> {
        let key = Self::integrity_key(name, registry);
        {
            let mut state = self.state.borrow_mut();
            state
                .packages
                .retain(|p| !(p.name == name && p.registry == registry));
            state.integrity.remove(&key);
            if let Some(location) = state.containers.remove(name) {
                let container_dir = self.root.join(location.trim_start_matches('/'));
                if container_dir.starts_with(&self.root) && container_dir.is_dir() {
                    let _ = fs::remove_dir_all(&container_dir);
                }
            }
        }
        self.listing.replace(None);
        self.save()
    }

    fn components(&self) -> Result<Vec<PlatformComponent>> {
        Ok(self.state.borrow().components.clone())
    }

    fn has_legacy_install(&self, name: &str) -> Result<bool> {
        Ok(self.state.borrow().legacy.iter().any(|n| n == name))
    }

    fn migrate_legacy(&self, name: &str) -> Result<()> {
        self.state.borrow_mut().legacy.retain(|n| n != name);
        self.save()
    }

    fn replace_hierarchy(&self, name: &str) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if !state.hierarchy_swapped.iter().any(|n| n == name) {
            state.hierarchy_swapped.push(name.to_string());
        }
        drop(state);
        self.save()
    }

    fn restore_hierarchy(&self, name: &str) -> Result<()> {
        self.state.borrow_mut().hierarchy_swapped.retain(|n| n != name);
        self.save()
    }

    fn provision_namespace(&self, namespace: &str) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if !state.namespaces.iter().any(|n| n == namespace) {
            state.namespaces.push(namespace.to_string());
        }
        drop(state);
        self.save()
    }

    fn generate_container(&self, name: &str, namespace: &str) -> Result<String> {
        let location = format!("{}{}", namespace, name);
        let container_dir = self.root.join(location.trim_start_matches('/'));
        fs::create_dir_all(&container_dir)?;
        self.state
            .borrow_mut()
            .containers
            .insert(name.to_string(), location.clone());
        self.save()?;
        Ok(location)
    }

    fn remove_container(&self, location: &str) -> Result<()> {
        let container_dir = self.root.join(location.trim_start_matches('/'));
        if container_dir.starts_with(&self.root) && container_dir.is_dir() {
            fs::remove_dir_all(&container_dir)?;
        }
        self.state
            .borrow_mut()
            .containers
            .retain(|_, l| l != location);
        self.save()
    }

    fn unsupported_kinds(&self, kinds: &[String]) -> Result<Vec<String>> {
        let state = self.state.borrow();
        Ok(kinds
            .iter()
            .filter(|k| state.unsupported_kinds.contains(k))
            .cloned()
            .collect())
    }

    fn object_references(&self, source: &Path) -> Result<Vec<ObjectReference>> {
        let refs_path = source.join("references.yaml");
        if !refs_path.exists() {
            return Ok(vec![]);
        }
        let content = fs::read_to_string(&refs_path).map_err(|e| DepotError::FileReadFailed {
            path: refs_path.display().to_string(),
            reason: e.to_string(),
        })?;
        serde_yaml::from_str(&content).map_err(|e| DepotError::ConfigParseFailed {
            path: refs_path.display().to_string(),
            reason: e.to_string(),
        })
    }

    fn run_activity(&self, package: &str, activity: &str) -> Result<()> {
        if self
            .state
            .borrow()
            .failing_activities
            .iter()
            .any(|a| a == activity)
        {
            return Err(DepotError::SystemState {
                message: format!("activity '{activity}' failed"),
            });
        }
        self.state
            .borrow_mut()
            .activities
            .push(format!("{package}:{activity}"));
        self.save()
    }

    fn export_redistribution(&self, name: &str, version: &str) -> Result<String> {
        let export_dir = self.root.join("exports");
        fs::create_dir_all(&export_dir)?;
        let handle = format!("exports/{name}-{version}.redist");
        let path = self.root.join(&handle);
        fs::write(&path, format!("{name} {version}\n")).map_err(|e| {
            DepotError::FileWriteFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(handle)
    }
}
