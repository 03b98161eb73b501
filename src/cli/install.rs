use clap::Parser;

/// Arguments for the install command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                   Install the highest matching release:\n    depot install base-lib@^1.0.0\n\n\
                   Install from a named registry:\n    depot install app --registry internal\n\n\
                   Verify against an expected digest:\n    depot install app --integrity blake3:2f1a...\n\n\
                   Reinstall the same version:\n    depot install app --force")]
pub struct InstallArgs {
    /// Package to install, optionally with a range (name or name@range)
    pub package: String,

    /// Registry to resolve against (defaults to the configured default)
    #[arg(long)]
    pub registry: Option<String>,

    /// Expected artifact digest, verified after download
    #[arg(long, value_name = "HASH")]
    pub integrity: Option<String>,

    /// Reinstall even when the exact version is already installed
    #[arg(long, short = 'f')]
    pub force: bool,

    /// Downgrade install-time integrity mismatches to warnings
    #[arg(long)]
    pub permissive: bool,

    /// Skip the compatibility check against platform components
    #[arg(long = "skip-compat")]
    pub skip_compat: bool,

    /// Generate a redistribution unit after the install
    #[arg(long)]
    pub redistribute: bool,

    /// Skip all confirmation prompts
    #[arg(long, short = 'y')]
    pub yes: bool,
}
