//! CLI definitions using clap derive API
//!
//! This module is organized into submodules for each command's argument types:
//! - install: Install command arguments
//! - publish: Publish command arguments
//! - deps: Dependency report arguments
//! - list: List command arguments
//! - uninstall: Uninstall command arguments
//! - lock: Lockfile command arguments
//! - completions: Completions command arguments

use clap::builder::{styling::AnsiColor, Styles};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod completions;
pub mod deps;
pub mod install;
pub mod list;
pub mod lock;
pub mod publish;
pub mod uninstall;

pub use completions::CompletionsArgs;
pub use deps::DepsArgs;
pub use install::InstallArgs;
pub use list::ListArgs;
pub use lock::{LockArgs, LockSubcommand};
pub use publish::PublishArgs;
pub use uninstall::UninstallArgs;

/// Depot - package manager for managed systems
#[derive(Parser, Debug)]
#[command(
    name = "depot",
    author,
    version,
    color = clap::ColorChoice::Always,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Package manager for deploying versioned packages onto managed systems",
    long_about = "Depot distributes versioned packages onto managed systems through \
                  registries, resolving transitive dependencies recursively and verifying \
                  every artifact against content-integrity hashes.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  depot install base-lib@^1.0.0          \x1b[90m# Install from the default registry\x1b[0m\n   \
                  depot install app --registry internal  \x1b[90m# Install from a named registry\x1b[0m\n   \
                  depot publish ./src-pkg                \x1b[90m# Publish a package from source\x1b[0m\n   \
                  depot deps app                         \x1b[90m# Classify a package's dependencies\x1b[0m\n   \
                  depot lock write app                   \x1b[90m# Snapshot the resolved tree\x1b[0m\n\n\
                  "
)]
pub struct Cli {
    /// Depot home directory (defaults to the platform data directory)
    #[arg(long, global = true, env = "DEPOT_HOME")]
    pub home: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install a package onto the target system
    Install(InstallArgs),

    /// Publish a package from source to a registry
    Publish(PublishArgs),

    /// Classify a package's dependencies against the target
    Deps(DepsArgs),

    /// List installed packages
    List(ListArgs),

    /// Remove an installed package
    Uninstall(UninstallArgs),

    /// Write or verify the lockfile
    Lock(LockArgs),

    /// Show version information
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}
