//! Publish orchestration
//!
//! Mirrors install outward: inspect what the package's source objects
//! reference, classify each foreign reference as a platform prerequisite
//! or a pinned dependency on another package, assemble the manifest,
//! package and upload the artifact, and record its digest back onto the
//! source system. Unreleased deployment units are deleted on failure;
//! released ones are marked, never deleted.

pub mod steps;

use std::path::PathBuf;

use console::style;
use semver::Version;
use tracing::{debug, warn};

use crate::deploy::UnitHandle;
use crate::error::Result;
use crate::manifest::{Dependency, Manifest, Prerequisite};
use crate::resolver::Session;
use crate::system::ObjectReference;
use crate::workflow::{Context, Workflow};

use steps::{
    ArtifactPackaging, AuthCheck, DependencyClassification, Done, Init, IntegrityRecordback,
    ManifestAssembly, ReferenceInspection, RegistryUpload, UnitCreation, UnitRelease, UnitUpload,
};

/// Caller input for one publish
#[derive(Debug, Clone)]
pub struct PublishRequest {
    /// Package source directory containing depot.yaml
    pub source: PathBuf,

    /// Registry name; defaults to the configured default
    pub registry: Option<String>,
}

/// Scratch state built up while the steps run
pub struct PublishRuntime {
    pub session: Session,
    pub registry_name: String,
    pub skeleton: Option<Manifest>,
    pub readme: Option<String>,
    pub references: Vec<ObjectReference>,
    pub dependencies: Vec<Dependency>,
    pub prerequisites: Vec<Prerequisite>,
    pub manifest: Option<Manifest>,
    pub artifact: Option<Vec<u8>>,
    pub digest: Option<String>,
    pub unit: Option<UnitHandle>,
    pub released: bool,
}

impl PublishRuntime {
    fn new(session: Session) -> Self {
        Self {
            session,
            registry_name: String::new(),
            skeleton: None,
            readme: None,
            references: vec![],
            dependencies: vec![],
            prerequisites: vec![],
            manifest: None,
            artifact: None,
            digest: None,
            unit: None,
            released: false,
        }
    }
}

/// Final result of one publish
#[derive(Debug, Clone, Default)]
pub struct PublishOutcome {
    pub package: String,
    pub version: Option<Version>,
    pub registry: String,
    pub integrity: Option<String>,
    pub unit: Option<String>,
}

/// Context threaded through the publish steps
pub type PublishContext = Context<PublishRequest, PublishRuntime, PublishOutcome>;

/// The publish workflow in its mandatory step order
pub fn workflow() -> Workflow<PublishContext> {
    Workflow::new("publish")
        .step(Init)
        .step(AuthCheck)
        .step(ReferenceInspection)
        .step(DependencyClassification)
        .step(ManifestAssembly)
        .step(ArtifactPackaging)
        .step(UnitCreation)
        .step(UnitUpload)
        .step(UnitRelease)
        .step(RegistryUpload)
        .step(IntegrityRecordback)
        .step(Done)
}

/// Run the publish workflow for one request
pub fn run(session: Session, request: PublishRequest) -> Result<PublishOutcome> {
    let ctx = Context {
        input: request,
        runtime: PublishRuntime::new(session),
        output: PublishOutcome::default(),
    };

    let (result, ledger) = workflow().execute_with_ledger(ctx);
    match result {
        Ok(ctx) => Ok(ctx.output),
        Err(error) => {
            debug!("publish ledger:\n{}", ledger.summary());
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deploy::DeploymentUnits;
    use crate::error::DepotError;
    use crate::registry::Registry;
    use crate::resolver::SessionOptions;
    use crate::system::System;
    use crate::test_fixtures::{installed, test_env};
    use semver::VersionReq;
    use std::fs;
    use std::path::Path;

    fn write_source(dir: &Path, name: &str, version: &str, refs: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(
            dir.join("depot.yaml"),
            format!("name: {name}\nversion: {version}\n"),
        )
        .unwrap();
        fs::write(dir.join("objects.def"), "object definitions").unwrap();
        if !refs.is_empty() {
            fs::write(dir.join("references.yaml"), refs).unwrap();
        }
    }

    fn unattended() -> SessionOptions {
        SessionOptions {
            unattended: true,
            ..SessionOptions::default()
        }
    }

    #[test]
    fn test_publish_happy_path() {
        let env = test_env(unattended());
        let source = env.temp.path().join("src-pkg");
        write_source(
            &source,
            "app",
            "1.0.0",
            "- object: zcl_util\n  package: util-lib\n- object: cl_platform_thing\n",
        );

        // The referenced package is installed with a recorded digest
        env.session
            .system
            .record_installed(installed("util-lib", "2.1.0", "public", None))
            .unwrap();
        env.session
            .system
            .record_integrity("util-lib", "public", "blake3:utilhash")
            .unwrap();

        let outcome = run(
            env.session.clone(),
            PublishRequest {
                source,
                registry: None,
            },
        )
        .unwrap();

        assert_eq!(outcome.package, "app");
        assert_eq!(outcome.version, Some(Version::new(1, 0, 0)));
        assert!(outcome.integrity.is_some());
        assert!(outcome.unit.is_some());

        // The published manifest pins the referenced package and records
        // the platform object as a prerequisite
        let record = env
            .registry
            .package("app", &Version::new(1, 0, 0))
            .unwrap();
        assert_eq!(record.manifest.dependencies.len(), 1);
        let dep = &record.manifest.dependencies[0];
        assert_eq!(dep.name, "util-lib");
        assert_eq!(dep.integrity.as_deref(), Some("blake3:utilhash"));
        assert!(dep.range.matches(&Version::new(2, 1, 0)));
        assert_eq!(record.manifest.prerequisites.len(), 1);
        assert_eq!(record.manifest.prerequisites[0].component, "cl_platform_thing");

        // The artifact digest was recorded back onto the source system
        let recorded = env
            .session
            .system
            .package_integrity("app", "public")
            .unwrap();
        assert_eq!(recorded, outcome.integrity);
    }

    #[test]
    fn test_publish_reference_to_unknown_package_fails() {
        let env = test_env(unattended());
        let source = env.temp.path().join("src-pkg");
        write_source(
            &source,
            "app",
            "1.0.0",
            "- object: zcl_ghost\n  package: ghost-lib\n",
        );

        let err = run(
            env.session.clone(),
            PublishRequest {
                source,
                registry: None,
            },
        )
        .unwrap_err();

        assert!(matches!(err, DepotError::MissingDependency { .. }));
    }

    #[test]
    fn test_publish_duplicate_version_marks_released_unit() {
        let env = test_env(unattended());
        let source = env.temp.path().join("src-pkg");
        write_source(&source, "app", "1.0.0", "");

        run(
            env.session.clone(),
            PublishRequest {
                source: source.clone(),
                registry: None,
            },
        )
        .unwrap();

        // Second publish of the same version fails at the registry upload,
        // after its unit was already released
        let err = run(
            env.session.clone(),
            PublishRequest {
                source,
                registry: None,
            },
        )
        .unwrap_err();
        assert!(matches!(err, DepotError::PublishFailed { .. }));

        let status = env
            .session
            .units
            .status(&crate::deploy::UnitHandle("DU0002".to_string()))
            .unwrap();
        assert!(status.released);
        assert!(!status.usable);
    }

    #[test]
    fn test_publish_artifact_round_trips() {
        let env = test_env(unattended());
        let source = env.temp.path().join("src-pkg");
        write_source(&source, "app", "1.0.0", "");

        let outcome = run(
            env.session.clone(),
            PublishRequest {
                source,
                registry: None,
            },
        )
        .unwrap();

        let releases = env
            .registry
            .releases("app", &VersionReq::STAR)
            .unwrap();
        assert_eq!(releases.len(), 1);
        assert_eq!(Some(releases[0].integrity.clone()), outcome.integrity);
    }
}
