//! Depot - package manager for managed systems
//!
//! Distributes versioned packages onto managed target systems through
//! registries. Multi-phase operations run as step workflows with
//! compensating rollback; transitive dependencies resolve recursively
//! with content-integrity verification.

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod artifact;
mod cli;
mod commands;
mod config;
mod confirm;
mod deploy;
mod error;
mod hash;
mod install;
mod lockfile;
mod manifest;
mod progress;
mod publish;
mod registry;
mod resolver;
mod system;
#[cfg(test)]
mod test_fixtures;
mod uninstall;
mod workflow;

use cli::{Cli, Commands};

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "depot=debug" } else { "depot=warn" };
    let filter = EnvFilter::try_from_env("DEPOT_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Install(args) => commands::install::run(cli.home, args),
        Commands::Publish(args) => commands::publish::run(cli.home, args),
        Commands::Deps(args) => commands::deps::run(cli.home, args),
        Commands::List(args) => commands::list::run(cli.home, args),
        Commands::Uninstall(args) => commands::uninstall::run(cli.home, args),
        Commands::Lock(args) => commands::lock::run(cli.home, args),
        Commands::Version => commands::version::run(),
        Commands::Completions(args) => commands::completions::run(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
