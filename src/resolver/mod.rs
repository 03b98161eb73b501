//! Dependency resolution
//!
//! This module handles:
//! - Classifying declared dependencies as satisfied or missing against the
//!   installed state
//! - Selecting registry releases, walking candidates against integrity pins
//! - Driving installation of missing dependencies recursively through the
//!   install orchestration (see [`session`])
//! - Building and replaying lockfiles (see [`lock`])

pub mod lock;
pub mod session;

use semver::Version;
use tracing::debug;

use crate::error::{DepotError, Result};
use crate::hash;
use crate::manifest::Dependency;
use crate::registry::{Registry, Release};
use crate::system::InstalledPackage;

pub use session::{Session, SessionOptions};

/// Classification of one declared dependency, computed fresh per resolution
#[derive(Debug, Clone)]
pub struct DependencyStatus {
    /// The declaration being classified
    pub dependency: Dependency,

    /// Whether an installed package matched name, registry and range
    pub matched: bool,

    /// Whether the installed artifact's digest equals the declared pin
    ///
    /// `None` when the declaration carries no pin.
    pub integrity_safe: Option<bool>,
}

/// Partition of a declared dependency set
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Dependencies that must be fetched and installed
    pub missing: Vec<DependencyStatus>,

    /// Dependencies already satisfied by the installed state
    pub satisfied: Vec<DependencyStatus>,
}

impl Resolution {
    /// Whether nothing needs to be installed
    pub fn is_fully_satisfied(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Classify declared dependencies against the installed state
///
/// A declared dependency is missing when no installed package matches its
/// name and effective registry, when the installed version fails the range,
/// or when a declared integrity pin differs from the installed artifact's
/// recorded digest. Everything else is satisfied.
///
/// The partition is disjoint and covers the declarations exactly; inputs
/// are never mutated, so repeated calls give identical results.
pub fn resolve(
    declared: &[Dependency],
    installed: &[InstalledPackage],
    parent_registry: &str,
) -> Resolution {
    let mut resolution = Resolution::default();

    for dep in declared {
        let registry = dep.registry_or(parent_registry);
        let candidate = installed
            .iter()
            .find(|p| p.name == dep.name && p.registry == registry);

        let status = match candidate {
            None => DependencyStatus {
                dependency: dep.clone(),
                matched: false,
                integrity_safe: None,
            },
            Some(package) if !dep.range.matches(&package.manifest.version) => DependencyStatus {
                dependency: dep.clone(),
                matched: false,
                integrity_safe: None,
            },
            Some(package) => match &dep.integrity {
                // A pin is re-verified on every walk, even when the install
                // predates the pin appearing in the manifest.
                Some(pin) => {
                    let safe = package
                        .integrity
                        .as_deref()
                        .is_some_and(|recorded| hash::verify_hash(pin, recorded));
                    DependencyStatus {
                        dependency: dep.clone(),
                        matched: true,
                        integrity_safe: Some(safe),
                    }
                }
                None => DependencyStatus {
                    dependency: dep.clone(),
                    matched: true,
                    integrity_safe: None,
                },
            },
        };

        let satisfied = status.matched && status.integrity_safe.unwrap_or(true);
        if satisfied {
            resolution.satisfied.push(status);
        } else {
            debug!(
                dependency = %dep.name,
                registry,
                matched = status.matched,
                "dependency classified missing"
            );
            resolution.missing.push(status);
        }
    }

    resolution
}

/// A release chosen by [`select_release`], with its content digest when known
#[derive(Debug, Clone)]
pub struct SelectedRelease {
    pub version: Version,

    /// Actual artifact digest; `None` when no pin forced a download
    pub digest: Option<String>,
}

/// Choose the release to install for a dependency
///
/// Releases are sorted descending by version. Without a pin the highest
/// matching release wins. With a pin, candidates are fetched highest to
/// lowest and their digests compared to the pin; the first match wins and
/// an exhausted walk is an integrity failure, never a silent downgrade to
/// an unpinned choice.
pub fn select_release(
    registry: &dyn Registry,
    name: &str,
    releases: Vec<Release>,
    pin: Option<&str>,
) -> Result<SelectedRelease> {
    let mut releases = releases;
    releases.sort_by(|a, b| b.version.cmp(&a.version));

    let Some(pin) = pin else {
        return Ok(SelectedRelease {
            version: releases
                .first()
                .map(|r| r.version.clone())
                .ok_or_else(|| DepotError::DependencyNotFound {
                    name: name.to_string(),
                    range: "*".to_string(),
                })?,
            digest: None,
        });
    };

    let mut highest_digest: Option<String> = None;
    for release in &releases {
        let bytes = registry.download(name, &release.version)?;
        let digest = hash::digest_bytes(&bytes);
        if highest_digest.is_none() {
            highest_digest = Some(digest.clone());
        }
        if hash::verify_hash(pin, &digest) {
            debug!(package = name, version = %release.version, "pin matched release");
            return Ok(SelectedRelease {
                version: release.version.clone(),
                digest: Some(digest),
            });
        }
        debug!(
            package = name,
            version = %release.version,
            "pin mismatch, trying next older release"
        );
    }

    Err(DepotError::IntegrityMismatch {
        name: name.to_string(),
        expected: pin.to_string(),
        actual: highest_digest.unwrap_or_else(|| "none".to_string()),
    })
}
