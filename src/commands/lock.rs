//! Lockfile command implementation

use std::fs;
use std::path::{Path, PathBuf};

use console::style;

use crate::cli::{LockArgs, LockSubcommand};
use crate::commands::helpers::{open_session, parse_package_arg};
use crate::error::{DepotError, Result};
use crate::lockfile::Lockfile;
use crate::resolver::{lock, SessionOptions};

/// Run the lock command
pub fn run(home: Option<PathBuf>, args: LockArgs) -> Result<()> {
    match args.command {
        LockSubcommand::Write {
            package,
            registry,
            output,
        } => write(home, &package, registry.as_deref(), &output),
        LockSubcommand::Verify { path } => verify(home, &path),
    }
}

fn write(
    home: Option<PathBuf>,
    package_arg: &str,
    registry: Option<&str>,
    output: &Path,
) -> Result<()> {
    let (package, range) = parse_package_arg(package_arg)?;
    let session = open_session(home, SessionOptions::default())?;

    let lockfile = lock::build_lockfile(&session.registries, &package, &range, registry)?;
    let json = lockfile.to_json()?;
    fs::write(output, json).map_err(|e| DepotError::FileWriteFailed {
        path: output.display().to_string(),
        reason: e.to_string(),
    })?;

    println!(
        "{} Locked {} entries for {} to {}",
        style("✓").green(),
        lockfile.entries.len(),
        style(&package).bold(),
        output.display()
    );
    Ok(())
}

fn verify(home: Option<PathBuf>, path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(DepotError::LockfileMissing);
    }
    let content = fs::read_to_string(path).map_err(|e| DepotError::FileReadFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let lockfile = Lockfile::from_json(&content)?;

    let session = open_session(home, SessionOptions::default())?;
    lock::verify_lockfile(&session.registries, &lockfile)?;

    println!(
        "{} {} entries verified against the registries",
        style("✓").green(),
        lockfile.entries.len()
    );
    Ok(())
}
