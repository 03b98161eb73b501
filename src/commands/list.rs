//! List command implementation

use std::path::PathBuf;

use console::style;

use crate::cli::ListArgs;
use crate::commands::helpers::open_session;
use crate::error::Result;
use crate::resolver::SessionOptions;
use crate::system::System;

/// Run the list command
pub fn run(home: Option<PathBuf>, args: ListArgs) -> Result<()> {
    let session = open_session(home, SessionOptions::default())?;
    let packages = session
        .system
        .installed_packages(args.integrity, args.refresh)?;

    if packages.is_empty() {
        println!("No packages installed.");
        return Ok(());
    }

    for package in &packages {
        print!(
            "{} {} ({})",
            style(&package.name).bold(),
            package.manifest.version,
            package.registry
        );
        if args.integrity {
            if let Some(integrity) = &package.integrity {
                print!("  {}", style(integrity).dim());
            }
        }
        println!();
    }

    println!("\n{} package(s) installed", packages.len());
    Ok(())
}
