//! Registry access
//!
//! The core consumes registries through the [`Registry`] trait and never
//! reimplements the transfer protocol. [`dir::DirRegistry`] is the
//! directory-backed implementation used for local operation and tests;
//! [`set::RegistrySet`] holds the configured registries by name.

pub mod dir;
pub mod set;

use std::fmt;

use semver::{Version, VersionReq};

use crate::error::Result;
use crate::manifest::Manifest;

pub use set::RegistrySet;

/// One published release of a package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    /// Release version
    pub version: Version,

    /// Digest of the stored artifact, as claimed by the registry index
    pub integrity: String,
}

/// Manifest plus artifact link for one release
#[derive(Debug, Clone)]
pub struct PackageRecord {
    /// The release manifest
    pub manifest: Manifest,

    /// Opaque link to the artifact within the registry
    pub artifact_link: String,
}

/// Artifact store for publishing and fetching releases
pub trait Registry {
    /// Releases of `name` whose version satisfies `range`
    fn releases(&self, name: &str, range: &VersionReq) -> Result<Vec<Release>>;

    /// Manifest and artifact link for an exact release
    fn package(&self, name: &str, version: &Version) -> Result<PackageRecord>;

    /// Download the artifact bytes for an exact release
    fn download(&self, name: &str, version: &Version) -> Result<Vec<u8>>;

    /// Publish a new release
    fn publish(
        &self,
        name: &str,
        version: &Version,
        artifact: &[u8],
        readme: Option<&str>,
    ) -> Result<()>;
}

impl fmt::Debug for dyn Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("dyn Registry")
    }
}
