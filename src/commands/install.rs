//! Install command implementation
//!
//! Resolves the requested release, then hands off to the install
//! orchestration: target checks, recursive dependency installation,
//! content validation, deployment import and integrity recording.

use std::path::PathBuf;

use console::style;

use crate::cli::InstallArgs;
use crate::commands::helpers::{open_session, parse_package_arg};
use crate::error::Result;
use crate::install::{self, InstallRequest};
use crate::resolver::SessionOptions;

/// Run the install command
pub fn run(home: Option<PathBuf>, args: InstallArgs) -> Result<()> {
    let (package, range) = parse_package_arg(&args.package)?;

    let session = open_session(
        home,
        SessionOptions {
            force: args.force,
            permissive: args.permissive,
            skip_compat: args.skip_compat,
            unattended: args.yes,
        },
    )?;

    let outcome = install::run(
        session,
        InstallRequest {
            package,
            range,
            registry: args.registry,
            expected_integrity: args.integrity,
            redistribute: args.redistribute,
            as_dependency: false,
        },
    )?;

    let version = outcome
        .version
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_default();

    if outcome.already_installed || !outcome.installed {
        println!(
            "{} {} {} is already installed",
            style("✓").green(),
            style(&outcome.package).bold(),
            version
        );
        return Ok(());
    }

    println!(
        "{} Installed {} {} from '{}'",
        style("✓").green(),
        style(&outcome.package).bold(),
        version,
        outcome.registry
    );
    if !outcome.installed_dependencies.is_empty() {
        println!(
            "  with dependencies: {}",
            outcome.installed_dependencies.join(", ")
        );
    }
    if let Some(redistribution) = &outcome.redistribution {
        println!("  redistribution unit: {redistribution}");
    }

    Ok(())
}
