use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Arguments for the lock command
#[derive(Parser, Debug)]
pub struct LockArgs {
    #[command(subcommand)]
    pub command: LockSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum LockSubcommand {
    /// Resolve a package's dependency tree and write depot.lock
    Write {
        /// Root package, optionally with a range (name or name@range)
        package: String,

        /// Registry to resolve against (defaults to the configured default)
        #[arg(long)]
        registry: Option<String>,

        /// Output path
        #[arg(long, default_value = "depot.lock")]
        output: PathBuf,
    },

    /// Re-fetch every locked artifact and compare digests
    Verify {
        /// Lockfile path
        #[arg(long, default_value = "depot.lock")]
        path: PathBuf,
    },
}
