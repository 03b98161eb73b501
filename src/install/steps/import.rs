//! Deployment unit import and integrity recording

use tracing::{info, warn};

use crate::deploy::{await_unit, DeploymentUnits, ImportPhase};
use crate::error::Result;
use crate::install::steps::required;
use crate::install::InstallContext;
use crate::progress::PhaseSpinner;
use crate::system::{InstalledPackage, System};
use crate::workflow::Step;

/// Create, upload, release and import the deployment unit
///
/// The import runs its sub-phases in their mandatory order: definitions,
/// object assignments, translations, customizing. Later phases reference
/// objects declared by earlier ones.
pub struct DeploymentImport;

impl Step<InstallContext> for DeploymentImport {
    fn name(&self) -> &'static str {
        "deployment_import"
    }

    fn filter(&self, ctx: &InstallContext) -> bool {
        !ctx.runtime.already_installed
    }

    fn run(&self, ctx: &mut InstallContext) -> Result<()> {
        let session = ctx.runtime.session.clone();
        let version = required(ctx.runtime.version.as_ref(), "resolved version")?.clone();
        let bytes = required(ctx.runtime.artifact.as_ref(), "artifact")?.clone();
        let deadline = session.unit_deadline;

        let description = format!("{} {}", ctx.input.package, version);
        let unit = session.units.create(&description)?;
        ctx.runtime.unit = Some(unit.clone());

        session.units.upload(&unit, &bytes)?;

        let spinner = PhaseSpinner::start(format!("Releasing unit {}", unit.0));
        session.units.release(&unit)?;
        await_unit(
            session.units.as_ref(),
            &unit,
            "unit release",
            deadline,
            |s| s.released,
        )?;

        for phase in ImportPhase::ORDERED {
            spinner.set_message(format!("Importing {} ({})", unit.0, phase.as_str()));
            session.units.import(&unit, phase)?;
            await_unit(
                session.units.as_ref(),
                &unit,
                &format!("import of phase {}", phase.as_str()),
                deadline,
                |s| s.imported.contains(&phase),
            )?;
        }
        spinner.finish();

        info!(unit = %unit.0, package = %ctx.input.package, "deployment unit imported");
        Ok(())
    }

    fn revert(&self, ctx: &mut InstallContext) -> Result<()> {
        // Imported object assignments cannot be cleanly undone; mark the
        // unit so it is never reused instead of pretending to delete it.
        if let Some(unit) = &ctx.runtime.unit {
            warn!(unit = %unit.0, "marking deployment unit do-not-reuse during rollback");
            ctx.runtime.session.units.mark_unusable(unit)?;
        }
        Ok(())
    }
}

/// Record the artifact digest and the installed package on the target
pub struct IntegrityRecording;

impl Step<InstallContext> for IntegrityRecording {
    fn name(&self) -> &'static str {
        "integrity_recording"
    }

    fn filter(&self, ctx: &InstallContext) -> bool {
        !ctx.runtime.already_installed
    }

    fn run(&self, ctx: &mut InstallContext) -> Result<()> {
        let session = ctx.runtime.session.clone();
        let name = ctx.input.package.clone();
        let registry = ctx.runtime.registry_name.clone();
        let digest = required(ctx.runtime.digest.as_ref(), "artifact digest")?.clone();
        let manifest = required(ctx.runtime.manifest.as_ref(), "manifest")?.clone();
        let location = required(ctx.runtime.location.as_ref(), "container location")?.clone();

        session.system.record_integrity(&name, &registry, &digest)?;

        let package = InstalledPackage {
            name,
            registry,
            manifest,
            location,
            integrity: Some(digest),
        };
        session.system.record_installed(package.clone())?;
        session.extend_installed(package);
        Ok(())
    }

    fn revert(&self, ctx: &mut InstallContext) -> Result<()> {
        ctx.runtime
            .session
            .system
            .remove_package(&ctx.input.package, &ctx.runtime.registry_name)
    }
}
