//! Managed system access
//!
//! The core consumes the target system through the [`System`] trait and
//! never reimplements its primitives. Container, hierarchy and namespace
//! operations are used only inside orchestration steps.
//! [`sandbox::SandboxSystem`] is the JSON-state implementation used for
//! local operation and integration tests.

pub mod sandbox;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::manifest::Manifest;

/// A package installed on the target system, supplied read-only
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstalledPackage {
    /// Package name
    pub name: String,

    /// Registry identity the package was installed from
    pub registry: String,

    /// The installed release's manifest
    pub manifest: Manifest,

    /// Location handle on the target (container path)
    pub location: String,

    /// Recorded content digest, populated when sources are included
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integrity: Option<String>,
}

/// A component release available on the target platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformComponent {
    /// Component name
    pub component: String,

    /// Installed release of the component
    pub release: String,
}

/// A foreign reference found while inspecting a package's source objects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectReference {
    /// Referenced object name
    pub object: String,

    /// Package owning the object, when the system can attribute it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
}

/// Connector to one managed target system
pub trait System {
    /// System identifier for messages
    fn id(&self) -> String;

    /// Whether the current credentials allow deployments
    fn authorized(&self) -> Result<bool>;

    /// Installed packages, from a lazily populated listing
    ///
    /// The listing is cached for the life of the connector and never
    /// auto-invalidated; pass `force_refresh` to reload. With
    /// `include_sources` the recorded content digest is populated on each
    /// record.
    fn installed_packages(
        &self,
        include_sources: bool,
        force_refresh: bool,
    ) -> Result<Vec<InstalledPackage>>;

    /// Recorded content digest for an installed package
    fn package_integrity(&self, name: &str, registry: &str) -> Result<Option<String>>;

    /// Record the content digest of a deployed package
    fn record_integrity(&self, name: &str, registry: &str, integrity: &str) -> Result<()>;

    /// Record a package as installed
    fn record_installed(&self, package: InstalledPackage) -> Result<()>;

    /// Remove an installed package record and its content
    fn remove_package(&self, name: &str, registry: &str) -> Result<()>;

    /// Platform components installed on the target
    fn components(&self) -> Result<Vec<PlatformComponent>>;

    /// Whether a pre-depot installation of the package exists
    fn has_legacy_install(&self, name: &str) -> Result<bool>;

    /// Migrate a legacy installation into depot bookkeeping
    fn migrate_legacy(&self, name: &str) -> Result<()>;

    /// Swap the package's object hierarchy to the incoming layout
    fn replace_hierarchy(&self, name: &str) -> Result<()>;

    /// Restore the previous object hierarchy
    fn restore_hierarchy(&self, name: &str) -> Result<()>;

    /// Create the package namespace if it does not exist
    fn provision_namespace(&self, namespace: &str) -> Result<()>;

    /// Generate the container receiving the package content
    ///
    /// Returns the location handle recorded with the installed package.
    fn generate_container(&self, name: &str, namespace: &str) -> Result<String>;

    /// Remove a container generated during this run
    fn remove_container(&self, location: &str) -> Result<()>;

    /// Subset of `kinds` the target cannot deploy
    fn unsupported_kinds(&self, kinds: &[String]) -> Result<Vec<String>>;

    /// Foreign references of the source objects under `source`
    fn object_references(&self, source: &Path) -> Result<Vec<ObjectReference>>;

    /// Run a post-install activity
    fn run_activity(&self, package: &str, activity: &str) -> Result<()>;

    /// Export a redistribution unit for an installed package
    ///
    /// Returns a handle to the exported unit.
    fn export_redistribution(&self, name: &str, version: &str) -> Result<String>;
}
