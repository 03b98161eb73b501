//! Install orchestration
//!
//! Installs one package release onto the target system as an ordered
//! workflow: resolve the release, check the target, resolve and install
//! missing dependencies recursively, validate content, prepare namespace
//! and container, import the deployment unit phase by phase, then record
//! integrity and run post activities. Compensations unwind what can be
//! unwound; a released deployment unit is marked rather than deleted.

pub mod steps;

use console::style;
use semver::{Version, VersionReq};
use tracing::{debug, warn};

use crate::deploy::UnitHandle;
use crate::error::Result;
use crate::manifest::Manifest;
use crate::resolver::{Resolution, Session};
use crate::workflow::{Context, Workflow};

use steps::checks::{AlreadyInstalledCheck, AuthCheck, CompatibilityCheck, Init};
use steps::content::{ContentValidation, LegacyMigration};
use steps::deps::{DependencyCheck, DependencyInstall};
use steps::finish::{Done, PostActivities, RedistributionUnitGeneration};
use steps::import::{DeploymentImport, IntegrityRecording};
use steps::provision::{ContainerGeneration, HierarchyReplacement, NamespaceProvision};

/// Caller input for one install
#[derive(Debug, Clone)]
pub struct InstallRequest {
    /// Package name
    pub package: String,

    /// Version range to resolve within
    pub range: VersionReq,

    /// Registry name; defaults to the configured default
    pub registry: Option<String>,

    /// Expected content digest, verified after download
    pub expected_integrity: Option<String>,

    /// Generate a redistribution unit after the install
    pub redistribute: bool,

    /// Whether this install was entered from dependency resolution
    pub as_dependency: bool,
}

/// Scratch state built up while the steps run
pub struct InstallRuntime {
    pub session: Session,
    pub registry_name: String,
    pub version: Option<Version>,
    pub manifest: Option<Manifest>,
    pub artifact: Option<Vec<u8>>,
    pub digest: Option<String>,
    pub already_installed: bool,
    pub legacy_detected: bool,
    pub resolution: Option<Resolution>,
    pub namespace: Option<String>,
    pub location: Option<String>,
    pub unit: Option<UnitHandle>,
}

impl InstallRuntime {
    fn new(session: Session) -> Self {
        Self {
            session,
            registry_name: String::new(),
            version: None,
            manifest: None,
            artifact: None,
            digest: None,
            already_installed: false,
            legacy_detected: false,
            resolution: None,
            namespace: None,
            location: None,
            unit: None,
        }
    }
}

/// Final result of one install
#[derive(Debug, Clone, Default)]
pub struct InstallOutcome {
    pub package: String,
    pub version: Option<Version>,
    pub registry: String,
    pub integrity: Option<String>,

    /// Whether content was actually deployed in this run
    pub installed: bool,

    /// True when the exact release was already present and left alone
    pub already_installed: bool,

    /// Dependencies installed by this walk, in install order
    pub installed_dependencies: Vec<String>,

    /// Handle of the generated redistribution unit, when requested
    pub redistribution: Option<String>,
}

/// Context threaded through the install steps
pub type InstallContext = Context<InstallRequest, InstallRuntime, InstallOutcome>;

/// The install workflow in its mandatory step order
pub fn workflow() -> Workflow<InstallContext> {
    Workflow::new("install")
        .step(Init)
        .step(AuthCheck)
        .step(AlreadyInstalledCheck)
        .step(CompatibilityCheck)
        .step(DependencyCheck)
        .step(DependencyInstall)
        .step(ContentValidation)
        .step(LegacyMigration)
        .step(HierarchyReplacement)
        .step(NamespaceProvision)
        .step(ContainerGeneration)
        .step(DeploymentImport)
        .step(IntegrityRecording)
        .step(RedistributionUnitGeneration)
        .step(PostActivities)
        .step(Done)
}

/// Run the install workflow for one request
///
/// On failure the original step error is returned; if any compensation
/// failed on the way out, a secondary warning points at possible manual
/// cleanup.
pub fn run(session: Session, request: InstallRequest) -> Result<InstallOutcome> {
    let ctx = Context {
        input: request,
        runtime: InstallRuntime::new(session),
        output: InstallOutcome::default(),
    };

    let (result, ledger) = workflow().execute_with_ledger(ctx);
    match result {
        Ok(ctx) => Ok(ctx.output),
        Err(error) => {
            debug!("install ledger:\n{}", ledger.summary());
            if ledger.any_revert_failed() {
                warn!("one or more rollback steps failed");
                eprintln!(
                    "{} Some rollback steps failed; the target system may need manual cleanup.",
                    style("Warning:").yellow().bold()
                );
            }
            Err(error)
        }
    }
}
