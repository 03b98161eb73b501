use clap::Parser;

/// Arguments for the deps command
#[derive(Parser, Debug)]
pub struct DepsArgs {
    /// Package to classify, optionally with a range (name or name@range)
    pub package: String,

    /// Registry to resolve against (defaults to the configured default)
    #[arg(long)]
    pub registry: Option<String>,

    /// Reload the installed-package listing before classifying
    #[arg(long)]
    pub refresh: bool,
}
