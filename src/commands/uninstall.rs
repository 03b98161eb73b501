//! Uninstall command implementation

use std::path::PathBuf;

use console::style;

use crate::cli::UninstallArgs;
use crate::commands::helpers::open_session;
use crate::error::Result;
use crate::resolver::SessionOptions;
use crate::uninstall::{self, UninstallRequest};

/// Run the uninstall command
pub fn run(home: Option<PathBuf>, args: UninstallArgs) -> Result<()> {
    let session = open_session(
        home,
        SessionOptions {
            unattended: args.yes,
            ..SessionOptions::default()
        },
    )?;

    let outcome = uninstall::run(
        session,
        UninstallRequest {
            package: args.package,
            registry: args.registry,
        },
    )?;

    let version = outcome
        .version
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_default();
    if outcome.removed {
        println!(
            "{} Removed {} {}",
            style("✓").green(),
            style(&outcome.package).bold(),
            version
        );
    }
    Ok(())
}
