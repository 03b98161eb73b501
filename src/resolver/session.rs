//! Resolver session
//!
//! One session drives one top-level operation and every recursive
//! dependency install under it. The session owns the caches that used to
//! be tempting as globals: the installed-package snapshot and the
//! visited set of the current walk. It is passed by reference (cheap
//! clone over shared state) into each recursive call, keeping the
//! resolver reentrant.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;
use std::time::Duration;

use semver::{Version, VersionReq};
use tracing::{debug, info};

use crate::confirm::Confirmation;
use crate::deploy::DeploymentUnits;
use crate::error::{DepotError, Result};
use crate::install::{self, InstallRequest};
use crate::registry::{Registry, RegistrySet};
use crate::resolver::{select_release, DependencyStatus};
use crate::system::{InstalledPackage, System};

/// Caller-facing switches threaded through every recursive call
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Reinstall even when the exact version is already present
    pub force: bool,

    /// Downgrade install-time integrity mismatches to warnings
    pub permissive: bool,

    /// Skip the compatibility check against platform components
    pub skip_compat: bool,

    /// Bypass every confirmation gate
    pub unattended: bool,
}

#[derive(Default)]
struct WalkState {
    loaded: bool,
    installed: Vec<InstalledPackage>,
    visited: HashSet<(String, String)>,
}

/// Shared state for one operation and its recursive installs
#[derive(Clone)]
pub struct Session {
    pub system: Rc<dyn System>,
    pub registries: Rc<RegistrySet>,
    pub units: Rc<dyn DeploymentUnits>,
    pub confirm: Rc<dyn Confirmation>,
    pub options: SessionOptions,
    pub unit_deadline: Duration,
    walk: Rc<RefCell<WalkState>>,
}

impl Session {
    /// Create a session over the given collaborators
    pub fn new(
        system: Rc<dyn System>,
        registries: Rc<RegistrySet>,
        units: Rc<dyn DeploymentUnits>,
        confirm: Rc<dyn Confirmation>,
        options: SessionOptions,
        unit_deadline: Duration,
    ) -> Self {
        Self {
            system,
            registries,
            units,
            confirm,
            options,
            unit_deadline,
            walk: Rc::new(RefCell::new(WalkState::default())),
        }
    }

    /// Populate the installed snapshot from the system listing
    ///
    /// Lazily loaded once per session; `force_refresh` reloads through the
    /// connector's own cache as well.
    pub fn load_installed(&self, force_refresh: bool) -> Result<()> {
        let mut walk = self.walk.borrow_mut();
        if walk.loaded && !force_refresh {
            return Ok(());
        }
        walk.installed = self.system.installed_packages(true, force_refresh)?;
        walk.loaded = true;
        Ok(())
    }

    /// Snapshot of everything installed, including installs from this walk
    pub fn installed_snapshot(&self) -> Vec<InstalledPackage> {
        self.walk.borrow().installed.clone()
    }

    /// Extend the walk's snapshot after a completed install
    pub fn extend_installed(&self, package: InstalledPackage) {
        let mut walk = self.walk.borrow_mut();
        walk.installed
            .retain(|p| !(p.name == package.name && p.registry == package.registry));
        walk.installed.push(package);
    }

    /// Mark a (name, registry) pair as visited; false when already seen
    pub fn mark_visited(&self, name: &str, registry: &str) -> bool {
        self.walk
            .borrow_mut()
            .visited
            .insert((name.to_string(), registry.to_string()))
    }

    /// Whether a (name, registry) pair was already resolved in this walk
    pub fn is_visited(&self, name: &str, registry: &str) -> bool {
        self.walk
            .borrow()
            .visited
            .contains(&(name.to_string(), registry.to_string()))
    }

    /// Whether this exact release is already installed
    pub fn exact_installed(&self, name: &str, version: &Version, registry: &str) -> bool {
        self.walk.borrow().installed.iter().any(|p| {
            p.name == name && p.registry == registry && &p.manifest.version == version
        })
    }

    /// Confirmation gate, bypassed in unattended mode
    pub fn confirm_install(&self, prompt: &str) -> Result<bool> {
        if self.options.unattended {
            return Ok(true);
        }
        self.confirm.confirm(prompt)
    }
}

/// Install every missing dependency, in declaration order
///
/// Each install recurses into the full install orchestration with this
/// session, so transitive dependencies resolve against everything already
/// installed in the walk. Any single failure aborts the whole operation;
/// a declined confirmation aborts it as user-initiated.
///
/// Returns the names of the dependencies actually installed.
pub fn install_missing(
    session: &Session,
    missing: &[DependencyStatus],
    parent_registry: &str,
) -> Result<Vec<String>> {
    let mut installed_names = Vec::new();

    for status in missing {
        let dep = &status.dependency;
        let registry_name = dep.registry_or(parent_registry);

        if session.is_visited(&dep.name, registry_name) {
            debug!(
                dependency = %dep.name,
                registry = registry_name,
                "already resolved in this walk, skipping"
            );
            continue;
        }

        let registry = session.registries.get(registry_name)?;
        let releases = registry.releases(&dep.name, &dep.range)?;
        if releases.is_empty() {
            return Err(DepotError::DependencyNotFound {
                name: dep.name.clone(),
                range: dep.range.to_string(),
            });
        }

        let selected =
            select_release(registry.as_ref(), &dep.name, releases, dep.integrity.as_deref())?;

        if session.exact_installed(&dep.name, &selected.version, registry_name)
            && !session.options.force
        {
            info!(
                dependency = %dep.name,
                version = %selected.version,
                registry = registry_name,
                "already installed, skipping"
            );
            continue;
        }

        let prompt = format!(
            "Install dependency '{}' {} from '{}'?",
            dep.name, selected.version, registry_name
        );
        if !session.confirm_install(&prompt)? {
            return Err(DepotError::UserAborted);
        }

        let exact_range = VersionReq::parse(&format!("={}", selected.version)).map_err(|e| {
            DepotError::ManifestInvalid {
                message: format!("cannot pin version {}: {e}", selected.version),
            }
        })?;

        install::run(
            session.clone(),
            InstallRequest {
                package: dep.name.clone(),
                range: exact_range,
                registry: Some(registry_name.to_string()),
                expected_integrity: dep.integrity.clone(),
                redistribute: false,
                as_dependency: true,
            },
        )?;

        installed_names.push(dep.name.clone());
    }

    Ok(installed_names)
}
