//! Redistribution, post activities and outcome assembly

use tracing::debug;

use crate::error::Result;
use crate::install::steps::required;
use crate::install::InstallContext;
use crate::system::System;
use crate::workflow::Step;

/// Generate a redistribution unit for the freshly installed package
pub struct RedistributionUnitGeneration;

impl Step<InstallContext> for RedistributionUnitGeneration {
    fn name(&self) -> &'static str {
        "redistribution_unit_generation"
    }

    fn filter(&self, ctx: &InstallContext) -> bool {
        !ctx.runtime.already_installed && ctx.input.redistribute
    }

    fn run(&self, ctx: &mut InstallContext) -> Result<()> {
        let version = required(ctx.runtime.version.as_ref(), "resolved version")?;
        let handle = ctx
            .runtime
            .session
            .system
            .export_redistribution(&ctx.input.package, &version.to_string())?;
        ctx.output.redistribution = Some(handle);
        Ok(())
    }
}

/// Run the manifest's post-install activities in order
pub struct PostActivities;

impl Step<InstallContext> for PostActivities {
    fn name(&self) -> &'static str {
        "post_activities"
    }

    fn filter(&self, ctx: &InstallContext) -> bool {
        !ctx.runtime.already_installed
            && ctx
                .runtime
                .manifest
                .as_ref()
                .is_some_and(|m| !m.post_install.is_empty())
    }

    fn run(&self, ctx: &mut InstallContext) -> Result<()> {
        let activities = required(ctx.runtime.manifest.as_ref(), "manifest")?
            .post_install
            .clone();
        for activity in activities {
            debug!(package = %ctx.input.package, activity = %activity, "running post activity");
            ctx.runtime
                .session
                .system
                .run_activity(&ctx.input.package, &activity)?;
        }
        Ok(())
    }
}

/// Assemble the final outcome
pub struct Done;

impl Step<InstallContext> for Done {
    fn name(&self) -> &'static str {
        "done"
    }

    fn run(&self, ctx: &mut InstallContext) -> Result<()> {
        ctx.output.package = ctx.input.package.clone();
        ctx.output.version = ctx.runtime.version.clone();
        ctx.output.registry = ctx.runtime.registry_name.clone();
        ctx.output.integrity = ctx.runtime.digest.clone();
        ctx.output.already_installed = ctx.runtime.already_installed;
        ctx.output.installed = !ctx.runtime.already_installed;
        Ok(())
    }
}
