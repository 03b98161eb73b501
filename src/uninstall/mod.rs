//! Uninstall workflow
//!
//! A short workflow over the same engine: find the installed package,
//! refuse while other installed packages still depend on it, confirm,
//! then remove the record and its content. Removal is not compensable;
//! the revert only says so.

use semver::Version;
use tracing::{info, warn};

use crate::error::{DepotError, Result};
use crate::resolver::Session;
use crate::system::{InstalledPackage, System};
use crate::workflow::{Context, Step, Workflow};

/// Caller input for one uninstall
#[derive(Debug, Clone)]
pub struct UninstallRequest {
    /// Package name
    pub package: String,

    /// Registry identity; defaults to the configured default
    pub registry: Option<String>,
}

/// Scratch state for the uninstall steps
pub struct UninstallRuntime {
    pub session: Session,
    pub registry_name: String,
    pub target: Option<InstalledPackage>,
}

/// Final result of one uninstall
#[derive(Debug, Clone, Default)]
pub struct UninstallOutcome {
    pub package: String,
    pub version: Option<Version>,
    pub removed: bool,
}

/// Context threaded through the uninstall steps
pub type UninstallContext = Context<UninstallRequest, UninstallRuntime, UninstallOutcome>;

/// Locate the installed package
struct Init;

impl Step<UninstallContext> for Init {
    fn name(&self) -> &'static str {
        "init"
    }

    fn run(&self, ctx: &mut UninstallContext) -> Result<()> {
        let session = ctx.runtime.session.clone();
        ctx.runtime.registry_name = ctx
            .input
            .registry
            .clone()
            .unwrap_or_else(|| session.registries.default_name().to_string());

        session.load_installed(false)?;
        let target = session
            .installed_snapshot()
            .iter()
            .find(|p| p.name == ctx.input.package && p.registry == ctx.runtime.registry_name)
            .cloned();

        let Some(target) = target else {
            return Err(DepotError::NotInstalled {
                name: ctx.input.package.clone(),
            });
        };
        ctx.runtime.target = Some(target);
        Ok(())
    }
}

/// Refuse while other installed packages still depend on the target
struct DependentsCheck;

impl Step<UninstallContext> for DependentsCheck {
    fn name(&self) -> &'static str {
        "dependents_check"
    }

    fn run(&self, ctx: &mut UninstallContext) -> Result<()> {
        let session = &ctx.runtime.session;
        let name = &ctx.input.package;
        let registry = &ctx.runtime.registry_name;

        let dependents: Vec<String> = session
            .installed_snapshot()
            .iter()
            .filter(|p| !(p.name == *name && p.registry == *registry))
            .filter(|p| {
                p.manifest
                    .dependencies
                    .iter()
                    .any(|d| d.name == *name && d.registry_or(&p.registry) == registry)
            })
            .map(|p| p.name.clone())
            .collect();

        if !dependents.is_empty() {
            return Err(DepotError::DependentsExist {
                name: name.clone(),
                dependents: dependents.join(", "),
            });
        }
        Ok(())
    }
}

/// Confirmation gate before the destructive removal
struct ConfirmGate;

impl Step<UninstallContext> for ConfirmGate {
    fn name(&self) -> &'static str {
        "confirm_gate"
    }

    fn run(&self, ctx: &mut UninstallContext) -> Result<()> {
        let target = ctx.runtime.target.as_ref();
        let version = target
            .map(|t| t.manifest.version.to_string())
            .unwrap_or_default();
        let prompt = format!("Remove '{}' {}?", ctx.input.package, version);
        if !ctx.runtime.session.confirm_install(&prompt)? {
            return Err(DepotError::UserAborted);
        }
        Ok(())
    }
}

/// Remove the package record and its content
struct Remove;

impl Step<UninstallContext> for Remove {
    fn name(&self) -> &'static str {
        "remove"
    }

    fn run(&self, ctx: &mut UninstallContext) -> Result<()> {
        ctx.runtime
            .session
            .system
            .remove_package(&ctx.input.package, &ctx.runtime.registry_name)?;
        info!(package = %ctx.input.package, "package removed");
        Ok(())
    }

    fn revert(&self, ctx: &mut UninstallContext) -> Result<()> {
        warn!(
            package = %ctx.input.package,
            "removed content cannot be restored during rollback"
        );
        Ok(())
    }
}

/// Assemble the final outcome
struct Done;

impl Step<UninstallContext> for Done {
    fn name(&self) -> &'static str {
        "done"
    }

    fn run(&self, ctx: &mut UninstallContext) -> Result<()> {
        ctx.output.package = ctx.input.package.clone();
        ctx.output.version = ctx.runtime.target.as_ref().map(|t| t.manifest.version.clone());
        ctx.output.removed = true;
        Ok(())
    }
}

/// The uninstall workflow
pub fn workflow() -> Workflow<UninstallContext> {
    Workflow::new("uninstall")
        .step(Init)
        .step(DependentsCheck)
        .step(ConfirmGate)
        .step(Remove)
        .step(Done)
}

/// Run the uninstall workflow for one request
pub fn run(session: Session, request: UninstallRequest) -> Result<UninstallOutcome> {
    let ctx = Context {
        input: request,
        runtime: UninstallRuntime {
            session,
            registry_name: String::new(),
            target: None,
        },
        output: UninstallOutcome::default(),
    };
    workflow().execute(ctx).map(|ctx| ctx.output)
}
