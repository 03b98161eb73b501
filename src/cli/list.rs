use clap::Parser;

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Reload the installed-package listing instead of using the cache
    #[arg(long)]
    pub refresh: bool,

    /// Show recorded content digests
    #[arg(long)]
    pub integrity: bool,
}
