//! Publish workflow steps

use std::collections::BTreeMap;
use std::fs;

use semver::VersionReq;
use tracing::{debug, info, warn};

use crate::artifact::ArtifactBundle;
use crate::deploy::DeploymentUnits;
use crate::error::{DepotError, Result};
use crate::hash;
use crate::manifest::{Dependency, Manifest, Prerequisite};
use crate::progress::PhaseSpinner;
use crate::publish::PublishContext;
use crate::registry::Registry;
use crate::system::System;
use crate::workflow::Step;

/// Files consumed by the publish machinery itself, never packaged
const CONTROL_FILES: [&str; 3] = ["depot.yaml", "references.yaml", "README.md"];

fn required<'a, T>(value: Option<&'a T>, what: &str) -> Result<&'a T> {
    value.ok_or_else(|| DepotError::SystemState {
        message: format!("{what} not available in workflow context"),
    })
}

/// Load the source manifest skeleton and fill input defaults
pub struct Init;

impl Step<PublishContext> for Init {
    fn name(&self) -> &'static str {
        "init"
    }

    fn run(&self, ctx: &mut PublishContext) -> Result<()> {
        let session = ctx.runtime.session.clone();
        ctx.runtime.registry_name = ctx
            .input
            .registry
            .clone()
            .unwrap_or_else(|| session.registries.default_name().to_string());

        let manifest_path = ctx.input.source.join("depot.yaml");
        let content =
            fs::read_to_string(&manifest_path).map_err(|e| DepotError::FileReadFailed {
                path: manifest_path.display().to_string(),
                reason: e.to_string(),
            })?;
        let skeleton = Manifest::from_yaml(&content)?;
        debug!(package = %skeleton.name, version = %skeleton.version, "publishing");

        let readme_path = ctx.input.source.join("README.md");
        if readme_path.is_file() {
            ctx.runtime.readme = fs::read_to_string(&readme_path).ok();
        }

        session.load_installed(false)?;
        ctx.runtime.skeleton = Some(skeleton);
        Ok(())
    }
}

/// Verify the session may publish from the source system
pub struct AuthCheck;

impl Step<PublishContext> for AuthCheck {
    fn name(&self) -> &'static str {
        "auth_check"
    }

    fn run(&self, ctx: &mut PublishContext) -> Result<()> {
        let system = &ctx.runtime.session.system;
        if !system.authorized()? {
            return Err(DepotError::NotAuthorized {
                system: system.id(),
            });
        }
        Ok(())
    }
}

/// Collect what the package's source objects reference
pub struct ReferenceInspection;

impl Step<PublishContext> for ReferenceInspection {
    fn name(&self) -> &'static str {
        "reference_inspection"
    }

    fn run(&self, ctx: &mut PublishContext) -> Result<()> {
        ctx.runtime.references = ctx
            .runtime
            .session
            .system
            .object_references(&ctx.input.source)?;
        debug!(count = ctx.runtime.references.len(), "foreign references found");
        Ok(())
    }
}

/// Classify each foreign reference
///
/// References owned by an installed package become dependencies pinned to
/// that package's recorded digest; unattributed references become
/// target-platform prerequisites recorded for install-time verification.
pub struct DependencyClassification;

impl Step<PublishContext> for DependencyClassification {
    fn name(&self) -> &'static str {
        "dependency_classification"
    }

    fn filter(&self, ctx: &PublishContext) -> bool {
        !ctx.runtime.references.is_empty()
    }

    fn run(&self, ctx: &mut PublishContext) -> Result<()> {
        let session = ctx.runtime.session.clone();
        let installed = session.installed_snapshot();
        let references = ctx.runtime.references.clone();

        for reference in &references {
            match &reference.package {
                Some(owner) => {
                    if ctx.runtime.dependencies.iter().any(|d| &d.name == owner) {
                        continue;
                    }
                    let Some(package) = installed.iter().find(|p| &p.name == owner) else {
                        return Err(DepotError::MissingDependency {
                            name: owner.clone(),
                        });
                    };
                    let pin = session
                        .system
                        .package_integrity(&package.name, &package.registry)?;
                    let range = VersionReq::parse(&format!("^{}", package.manifest.version))
                        .map_err(|e| DepotError::ManifestInvalid {
                            message: format!(
                                "cannot derive range for '{}': {e}",
                                package.name
                            ),
                        })?;
                    ctx.runtime.dependencies.push(Dependency {
                        name: package.name.clone(),
                        range,
                        registry: Some(package.registry.clone()),
                        integrity: pin,
                    });
                }
                None => {
                    if ctx
                        .runtime
                        .prerequisites
                        .iter()
                        .any(|p| p.component == reference.object)
                    {
                        continue;
                    }
                    ctx.runtime.prerequisites.push(Prerequisite {
                        component: reference.object.clone(),
                        min_release: None,
                    });
                }
            }
        }

        info!(
            dependencies = ctx.runtime.dependencies.len(),
            prerequisites = ctx.runtime.prerequisites.len(),
            "references classified"
        );
        Ok(())
    }
}

/// Merge the skeleton with the derived dependencies and prerequisites
pub struct ManifestAssembly;

impl Step<PublishContext> for ManifestAssembly {
    fn name(&self) -> &'static str {
        "manifest_assembly"
    }

    fn run(&self, ctx: &mut PublishContext) -> Result<()> {
        let mut manifest = required(ctx.runtime.skeleton.as_ref(), "source manifest")?.clone();

        for dep in &ctx.runtime.dependencies {
            if !manifest.dependencies.iter().any(|d| d.name == dep.name) {
                manifest.dependencies.push(dep.clone());
            }
        }
        for prerequisite in &ctx.runtime.prerequisites {
            if !manifest
                .prerequisites
                .iter()
                .any(|p| p.component == prerequisite.component)
            {
                manifest.prerequisites.push(prerequisite.clone());
            }
        }

        manifest.validate()?;
        ctx.runtime.manifest = Some(manifest);
        Ok(())
    }
}

/// Package the source content into the canonical artifact form
pub struct ArtifactPackaging;

impl Step<PublishContext> for ArtifactPackaging {
    fn name(&self) -> &'static str {
        "artifact_packaging"
    }

    fn run(&self, ctx: &mut PublishContext) -> Result<()> {
        let manifest = required(ctx.runtime.manifest.as_ref(), "manifest")?.clone();

        let mut files = BTreeMap::new();
        for entry in walkdir::WalkDir::new(&ctx.input.source)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let relative = entry
                .path()
                .strip_prefix(&ctx.input.source)
                .unwrap_or(entry.path())
                .to_string_lossy()
                .replace('\\', "/");
            if CONTROL_FILES.contains(&relative.as_str()) {
                continue;
            }
            let content =
                fs::read_to_string(entry.path()).map_err(|e| DepotError::FileReadFailed {
                    path: entry.path().display().to_string(),
                    reason: e.to_string(),
                })?;
            files.insert(relative, content);
        }

        let bundle = ArtifactBundle { manifest, files };
        let bytes = bundle.to_bytes()?;
        ctx.runtime.digest = Some(hash::digest_bytes(&bytes));
        ctx.runtime.artifact = Some(bytes);
        Ok(())
    }
}

/// Create the deployment unit carrying the package off the system
pub struct UnitCreation;

impl Step<PublishContext> for UnitCreation {
    fn name(&self) -> &'static str {
        "unit_creation"
    }

    fn run(&self, ctx: &mut PublishContext) -> Result<()> {
        let manifest = required(ctx.runtime.manifest.as_ref(), "manifest")?;
        let description = format!("publish {} {}", manifest.name, manifest.version);
        let unit = ctx.runtime.session.units.create(&description)?;
        ctx.runtime.unit = Some(unit);
        Ok(())
    }

    fn revert(&self, ctx: &mut PublishContext) -> Result<()> {
        // Unreleased units are deleted; a released unit is handled by the
        // release step's own revert.
        if ctx.runtime.released {
            return Ok(());
        }
        if let Some(unit) = &ctx.runtime.unit {
            ctx.runtime.session.units.delete(unit)?;
        }
        Ok(())
    }
}

/// Upload the packaged artifact into the unit
pub struct UnitUpload;

impl Step<PublishContext> for UnitUpload {
    fn name(&self) -> &'static str {
        "unit_upload"
    }

    fn run(&self, ctx: &mut PublishContext) -> Result<()> {
        let unit = required(ctx.runtime.unit.as_ref(), "deployment unit")?.clone();
        let bytes = required(ctx.runtime.artifact.as_ref(), "artifact")?.clone();
        ctx.runtime.session.units.upload(&unit, &bytes)
    }
}

/// Release the unit, waiting within the deadline
pub struct UnitRelease;

impl Step<PublishContext> for UnitRelease {
    fn name(&self) -> &'static str {
        "unit_release"
    }

    fn run(&self, ctx: &mut PublishContext) -> Result<()> {
        let session = ctx.runtime.session.clone();
        let unit = required(ctx.runtime.unit.as_ref(), "deployment unit")?.clone();

        let spinner = PhaseSpinner::start(format!("Releasing unit {}", unit.0));
        session.units.release(&unit)?;
        crate::deploy::await_unit(
            session.units.as_ref(),
            &unit,
            "unit release",
            session.unit_deadline,
            |s| s.released,
        )?;
        spinner.finish();

        ctx.runtime.released = true;
        Ok(())
    }

    fn revert(&self, ctx: &mut PublishContext) -> Result<()> {
        // Released units cannot be deleted; mark them instead.
        if let Some(unit) = &ctx.runtime.unit {
            warn!(unit = %unit.0, "marking released unit do-not-reuse during rollback");
            ctx.runtime.session.units.mark_unusable(unit)?;
        }
        Ok(())
    }
}

/// Upload the artifact and readme to the registry
pub struct RegistryUpload;

impl Step<PublishContext> for RegistryUpload {
    fn name(&self) -> &'static str {
        "registry_upload"
    }

    fn run(&self, ctx: &mut PublishContext) -> Result<()> {
        let manifest = required(ctx.runtime.manifest.as_ref(), "manifest")?.clone();
        let bytes = required(ctx.runtime.artifact.as_ref(), "artifact")?.clone();
        let registry = ctx
            .runtime
            .session
            .registries
            .get(&ctx.runtime.registry_name)?;

        registry.publish(
            &manifest.name,
            &manifest.version,
            &bytes,
            ctx.runtime.readme.as_deref(),
        )
    }

    fn revert(&self, ctx: &mut PublishContext) -> Result<()> {
        warn!(
            registry = %ctx.runtime.registry_name,
            "published artifact left in registry during rollback"
        );
        Ok(())
    }
}

/// Record the artifact digest back onto the source system
pub struct IntegrityRecordback;

impl Step<PublishContext> for IntegrityRecordback {
    fn name(&self) -> &'static str {
        "integrity_recordback"
    }

    fn run(&self, ctx: &mut PublishContext) -> Result<()> {
        let manifest = required(ctx.runtime.manifest.as_ref(), "manifest")?;
        let digest = required(ctx.runtime.digest.as_ref(), "artifact digest")?.clone();
        ctx.runtime.session.system.record_integrity(
            &manifest.name,
            &ctx.runtime.registry_name,
            &digest,
        )
    }
}

/// Assemble the final outcome
pub struct Done;

impl Step<PublishContext> for Done {
    fn name(&self) -> &'static str {
        "done"
    }

    fn run(&self, ctx: &mut PublishContext) -> Result<()> {
        let manifest = required(ctx.runtime.manifest.as_ref(), "manifest")?;
        ctx.output.package = manifest.name.clone();
        ctx.output.version = Some(manifest.version.clone());
        ctx.output.registry = ctx.runtime.registry_name.clone();
        ctx.output.integrity = ctx.runtime.digest.clone();
        ctx.output.unit = ctx.runtime.unit.as_ref().map(|u| u.0.clone());
        Ok(())
    }
}
