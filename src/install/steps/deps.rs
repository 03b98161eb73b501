//! Dependency classification and recursive install

use tracing::info;

use crate::error::Result;
use crate::install::steps::required;
use crate::install::InstallContext;
use crate::resolver::{self, session};
use crate::workflow::Step;

/// Classify declared dependencies against the walk's installed snapshot
pub struct DependencyCheck;

impl Step<InstallContext> for DependencyCheck {
    fn name(&self) -> &'static str {
        "dependency_check"
    }

    fn filter(&self, ctx: &InstallContext) -> bool {
        !ctx.runtime.already_installed
    }

    fn run(&self, ctx: &mut InstallContext) -> Result<()> {
        let manifest = required(ctx.runtime.manifest.as_ref(), "manifest")?;
        let installed = ctx.runtime.session.installed_snapshot();

        let resolution = resolver::resolve(
            &manifest.dependencies,
            &installed,
            &ctx.runtime.registry_name,
        );
        info!(
            package = %ctx.input.package,
            satisfied = resolution.satisfied.len(),
            missing = resolution.missing.len(),
            "dependencies classified"
        );

        ctx.runtime.resolution = Some(resolution);
        Ok(())
    }
}

/// Install missing dependencies through the full orchestration, recursively
pub struct DependencyInstall;

impl Step<InstallContext> for DependencyInstall {
    fn name(&self) -> &'static str {
        "dependency_install"
    }

    fn filter(&self, ctx: &InstallContext) -> bool {
        !ctx.runtime.already_installed
            && ctx
                .runtime
                .resolution
                .as_ref()
                .is_some_and(|r| !r.is_fully_satisfied())
    }

    fn run(&self, ctx: &mut InstallContext) -> Result<()> {
        let missing = required(ctx.runtime.resolution.as_ref(), "resolution")?
            .missing
            .clone();

        let installed = session::install_missing(
            &ctx.runtime.session,
            &missing,
            &ctx.runtime.registry_name,
        )?;
        ctx.output.installed_dependencies = installed;
        Ok(())
    }
}
