//! Target preparation: hierarchy, namespace, container

use tracing::warn;

use crate::error::Result;
use crate::install::steps::required;
use crate::install::InstallContext;
use crate::system::System;
use crate::workflow::Step;

/// Swap the package's object hierarchy to the incoming layout
pub struct HierarchyReplacement;

impl Step<InstallContext> for HierarchyReplacement {
    fn name(&self) -> &'static str {
        "hierarchy_replacement"
    }

    fn filter(&self, ctx: &InstallContext) -> bool {
        !ctx.runtime.already_installed
    }

    fn run(&self, ctx: &mut InstallContext) -> Result<()> {
        ctx.runtime
            .session
            .system
            .replace_hierarchy(&ctx.input.package)
    }

    fn revert(&self, ctx: &mut InstallContext) -> Result<()> {
        ctx.runtime
            .session
            .system
            .restore_hierarchy(&ctx.input.package)
    }
}

/// Create the package namespace on the target
pub struct NamespaceProvision;

impl Step<InstallContext> for NamespaceProvision {
    fn name(&self) -> &'static str {
        "namespace_provision"
    }

    fn filter(&self, ctx: &InstallContext) -> bool {
        !ctx.runtime.already_installed
    }

    fn run(&self, ctx: &mut InstallContext) -> Result<()> {
        let namespace = namespace_for(&ctx.input.package);
        ctx.runtime.session.system.provision_namespace(&namespace)?;
        ctx.runtime.namespace = Some(namespace);
        Ok(())
    }

    fn revert(&self, ctx: &mut InstallContext) -> Result<()> {
        // Generated namespace objects are not cleanly removable on most
        // targets; leave the namespace and say so.
        warn!(
            namespace = ctx.runtime.namespace.as_deref().unwrap_or("?"),
            "namespace left in place during rollback"
        );
        Ok(())
    }
}

/// Namespace derived from the package name
fn namespace_for(package: &str) -> String {
    format!(
        "/{}/",
        package.to_uppercase().replace(['-', '.'], "_")
    )
}

/// Generate the container receiving the package content
pub struct ContainerGeneration;

impl Step<InstallContext> for ContainerGeneration {
    fn name(&self) -> &'static str {
        "container_generation"
    }

    fn filter(&self, ctx: &InstallContext) -> bool {
        !ctx.runtime.already_installed
    }

    fn run(&self, ctx: &mut InstallContext) -> Result<()> {
        let namespace = required(ctx.runtime.namespace.as_ref(), "namespace")?;
        let location = ctx
            .runtime
            .session
            .system
            .generate_container(&ctx.input.package, namespace)?;
        ctx.runtime.location = Some(location);
        Ok(())
    }

    fn revert(&self, ctx: &mut InstallContext) -> Result<()> {
        if let Some(location) = &ctx.runtime.location {
            ctx.runtime.session.system.remove_container(location)?;
        }
        Ok(())
    }
}
