use clap::Parser;

/// Arguments for the uninstall command
#[derive(Parser, Debug)]
pub struct UninstallArgs {
    /// Package to remove
    pub package: String,

    /// Registry identity of the installed package
    #[arg(long)]
    pub registry: Option<String>,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}
