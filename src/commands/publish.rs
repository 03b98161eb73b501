//! Publish command implementation

use std::path::PathBuf;

use console::style;

use crate::cli::PublishArgs;
use crate::commands::helpers::open_session;
use crate::error::Result;
use crate::publish::{self, PublishRequest};
use crate::resolver::SessionOptions;

/// Run the publish command
pub fn run(home: Option<PathBuf>, args: PublishArgs) -> Result<()> {
    let session = open_session(
        home,
        SessionOptions {
            unattended: args.yes,
            ..SessionOptions::default()
        },
    )?;

    let outcome = publish::run(
        session,
        PublishRequest {
            source: args.source,
            registry: args.registry,
        },
    )?;

    let version = outcome
        .version
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_default();

    println!(
        "{} Published {} {} to '{}'",
        style("✓").green(),
        style(&outcome.package).bold(),
        version,
        outcome.registry
    );
    if let Some(integrity) = &outcome.integrity {
        println!("  integrity: {integrity}");
    }
    if let Some(unit) = &outcome.unit {
        println!("  deployment unit: {unit}");
    }

    Ok(())
}
