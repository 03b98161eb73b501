//! Dependency report command
//!
//! Classifies a package's declared dependencies against the installed
//! state without installing anything.

use std::path::PathBuf;

use console::style;

use crate::cli::DepsArgs;
use crate::commands::helpers::{open_session, parse_package_arg};
use crate::error::{DepotError, Result};
use crate::registry::Registry;
use crate::resolver::{self, SessionOptions};

/// Run the deps command
pub fn run(home: Option<PathBuf>, args: DepsArgs) -> Result<()> {
    let (package, range) = parse_package_arg(&args.package)?;
    let session = open_session(home, SessionOptions::default())?;

    let registry_name = args
        .registry
        .unwrap_or_else(|| session.registries.default_name().to_string());
    let registry = session.registries.get(&registry_name)?;

    let mut releases = registry.releases(&package, &range)?;
    if releases.is_empty() {
        return Err(DepotError::PackageNotFound {
            name: package,
            registry: registry_name,
        });
    }
    releases.sort_by(|a, b| b.version.cmp(&a.version));
    let record = registry.package(&package, &releases[0].version)?;

    session.load_installed(args.refresh)?;
    let installed = session.installed_snapshot();
    let resolution = resolver::resolve(&record.manifest.dependencies, &installed, &registry_name);

    println!(
        "Dependencies of {} {}:",
        style(&package).bold(),
        record.manifest.version
    );

    if resolution.satisfied.is_empty() && resolution.missing.is_empty() {
        println!("  (none declared)");
        return Ok(());
    }

    for status in &resolution.satisfied {
        let pin_note = match status.integrity_safe {
            Some(true) => " (integrity verified)",
            _ => "",
        };
        println!(
            "  {} {} {}{}",
            style("✓").green(),
            status.dependency.name,
            status.dependency.range,
            pin_note
        );
    }
    for status in &resolution.missing {
        let reason = if !status.matched {
            "no matching install"
        } else {
            "integrity pin mismatch"
        };
        println!(
            "  {} {} {} ({})",
            style("✗").red(),
            status.dependency.name,
            status.dependency.range,
            reason
        );
    }

    println!(
        "\n{} satisfied, {} missing",
        resolution.satisfied.len(),
        resolution.missing.len()
    );
    Ok(())
}
