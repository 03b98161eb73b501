//! Release resolution and target checks

use tracing::{debug, info};

use crate::error::{DepotError, Result};
use crate::hash;
use crate::install::steps::required;
use crate::install::InstallContext;
use crate::registry::Registry;
use crate::system::System;
use crate::workflow::Step;

/// Fill input defaults, resolve the release and fetch its manifest
pub struct Init;

impl Step<InstallContext> for Init {
    fn name(&self) -> &'static str {
        "init"
    }

    fn run(&self, ctx: &mut InstallContext) -> Result<()> {
        let session = ctx.runtime.session.clone();

        ctx.runtime.registry_name = ctx
            .input
            .registry
            .clone()
            .unwrap_or_else(|| session.registries.default_name().to_string());

        session.load_installed(false)?;
        session.mark_visited(&ctx.input.package, &ctx.runtime.registry_name);

        let registry = session.registries.get(&ctx.runtime.registry_name)?;
        let mut releases = registry.releases(&ctx.input.package, &ctx.input.range)?;
        if releases.is_empty() {
            return Err(DepotError::PackageNotFound {
                name: ctx.input.package.clone(),
                registry: ctx.runtime.registry_name.clone(),
            });
        }
        releases.sort_by(|a, b| b.version.cmp(&a.version));

        let version = releases[0].version.clone();
        let record = registry.package(&ctx.input.package, &version)?;
        debug!(
            package = %ctx.input.package,
            version = %version,
            as_dependency = ctx.input.as_dependency,
            "release resolved"
        );

        ctx.runtime.legacy_detected = session.system.has_legacy_install(&ctx.input.package)?;
        ctx.runtime.version = Some(version);
        ctx.runtime.manifest = Some(record.manifest);
        Ok(())
    }
}

/// Verify the session may deploy to the target system
pub struct AuthCheck;

impl Step<InstallContext> for AuthCheck {
    fn name(&self) -> &'static str {
        "auth_check"
    }

    fn run(&self, ctx: &mut InstallContext) -> Result<()> {
        let system = &ctx.runtime.session.system;
        if !system.authorized()? {
            return Err(DepotError::NotAuthorized {
                system: system.id(),
            });
        }
        Ok(())
    }
}

/// Short-circuit when the exact release is already on the target
///
/// Upgrades and downgrades across versions are permitted and only logged.
pub struct AlreadyInstalledCheck;

impl Step<InstallContext> for AlreadyInstalledCheck {
    fn name(&self) -> &'static str {
        "already_installed_check"
    }

    fn run(&self, ctx: &mut InstallContext) -> Result<()> {
        let session = ctx.runtime.session.clone();
        let name = &ctx.input.package;
        let registry = &ctx.runtime.registry_name;
        let version = required(ctx.runtime.version.as_ref(), "resolved version")?.clone();

        if session.exact_installed(name, &version, registry) {
            let integrity_ok = match &ctx.input.expected_integrity {
                Some(expected) => session
                    .system
                    .package_integrity(name, registry)?
                    .is_some_and(|recorded| hash::verify_hash(expected, &recorded)),
                None => true,
            };

            if integrity_ok && !session.options.force {
                info!(package = %name, version = %version, "already installed, nothing to do");
                ctx.runtime.already_installed = true;
                return Ok(());
            }
        } else if let Some(existing) = session
            .installed_snapshot()
            .iter()
            .find(|p| &p.name == name && &p.registry == registry)
        {
            info!(
                package = %name,
                from = %existing.manifest.version,
                to = %version,
                "changing installed version"
            );
        }

        Ok(())
    }
}

/// Check manifest prerequisites against the target's platform components
pub struct CompatibilityCheck;

impl Step<InstallContext> for CompatibilityCheck {
    fn name(&self) -> &'static str {
        "compatibility_check"
    }

    fn filter(&self, ctx: &InstallContext) -> bool {
        !ctx.runtime.already_installed && !ctx.runtime.session.options.skip_compat
    }

    fn run(&self, ctx: &mut InstallContext) -> Result<()> {
        let manifest = required(ctx.runtime.manifest.as_ref(), "manifest")?;
        let components = ctx.runtime.session.system.components()?;

        for prerequisite in &manifest.prerequisites {
            let Some(component) = components
                .iter()
                .find(|c| c.component == prerequisite.component)
            else {
                return Err(DepotError::UnsupportedContent {
                    message: format!(
                        "target lacks required component '{}'",
                        prerequisite.component
                    ),
                });
            };

            if let Some(min_release) = &prerequisite.min_release {
                if release_below(&component.release, min_release) {
                    return Err(DepotError::UnsupportedContent {
                        message: format!(
                            "component '{}' release {} is below required {}",
                            prerequisite.component, component.release, min_release
                        ),
                    });
                }
            }
        }

        Ok(())
    }
}

/// Numeric comparison when both releases parse, lexicographic otherwise
fn release_below(actual: &str, required_release: &str) -> bool {
    match (actual.parse::<u64>(), required_release.parse::<u64>()) {
        (Ok(a), Ok(r)) => a < r,
        _ => actual < required_release,
    }
}
