use clap::Parser;
use std::path::PathBuf;

/// Arguments for the publish command
#[derive(Parser, Debug)]
pub struct PublishArgs {
    /// Package source directory containing depot.yaml
    pub source: PathBuf,

    /// Registry to publish to (defaults to the configured default)
    #[arg(long)]
    pub registry: Option<String>,

    /// Skip all confirmation prompts
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[cfg(test)]
mod tests {
    use super::super::{Cli, Commands};
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn test_cli_parsing_publish() {
        let cli = Cli::try_parse_from(["depot", "publish", "./src-pkg"]).unwrap();
        match cli.command {
            Commands::Publish(args) => {
                assert_eq!(args.source, PathBuf::from("./src-pkg"));
                assert!(args.registry.is_none());
            }
            _ => panic!("Expected Publish command"),
        }
    }
}
