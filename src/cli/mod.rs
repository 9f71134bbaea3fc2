pub mod commands;
pub mod config;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use crate::cli::config::RenderBackend;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log debug output from the crawler
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Also write logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl every listing page and write the movie and page tables
    Crawl(CrawlArgs),

    /// Compare two movie tables by title and write the view differences
    Diff {
        /// Earlier movie table (CSV with Title and Views columns)
        file1: PathBuf,

        /// Later movie table
        file2: PathBuf,

        /// Output CSV file
        #[arg(short, long, default_value = "views_diff.csv")]
        output: PathBuf,
    },

    /// Manage configuration profiles
    Config {
        /// Profile name to show, created with defaults if missing
        #[arg(required = false)]
        profile: Option<String>,

        /// List all available profiles
        #[arg(short, long)]
        list: bool,
    },
}

/// Overrides for a crawl run; anything left out comes from the profile
#[derive(Args, Debug, Default, Clone)]
pub struct CrawlArgs {
    /// Site profile to load instead of the default configuration
    #[arg(short, long)]
    pub profile: Option<String>,

    /// Base URL of the listing (page 1)
    #[arg(short, long)]
    pub url: Option<String>,

    /// Crawl exactly this many pages instead of probing the pagination
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub pages: Option<u32>,

    /// Pause after each navigation, in milliseconds
    #[arg(long)]
    pub settle_ms: Option<u64>,

    /// Base name of the output files
    #[arg(long)]
    pub output_prefix: Option<String>,

    /// Directory for the output files
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Rendering backend
    #[arg(long, value_enum)]
    pub backend: Option<RenderBackend>,
}

/// Parse command line arguments
pub fn parse_args() -> Cli {
    Cli::parse()
}

/// Process the command
pub async fn process_command(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Crawl(args) => {
            info!("Starting crawl");
            commands::crawl(args).await
        },
        Commands::Diff { file1, file2, output } => {
            info!("Comparing {} with {}", file1.display(), file2.display());
            commands::diff(&file1, &file2, &output)
        },
        Commands::Config { profile, list } => {
            if list {
                commands::list_profiles()
            } else if let Some(profile_name) = profile {
                commands::manage_profile(&profile_name)
            } else {
                commands::show_config()
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert()
    }

    #[test]
    fn test_crawl_needs_no_arguments() {
        let cli = Cli::try_parse_from(["reelcount", "crawl"]).unwrap();
        assert!(matches!(cli.command, Commands::Crawl(ref args) if args.pages.is_none()));
    }

    #[test]
    fn test_crawl_overrides() {
        let cli = Cli::try_parse_from([
            "reelcount", "-v", "crawl", "--pages", "5", "--settle-ms", "2000", "--backend", "remote",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Commands::Crawl(args) => {
                assert_eq!(args.pages, Some(5));
                assert_eq!(args.settle_ms, Some(2000));
                assert_eq!(args.backend, Some(RenderBackend::Remote));
            }
            _ => panic!("expected crawl"),
        }

        assert!(Cli::try_parse_from(["reelcount", "crawl", "--pages", "0"]).is_err());
    }

    #[test]
    fn test_diff_arguments() {
        let cli = Cli::try_parse_from(["reelcount", "diff", "a.csv", "b.csv"]).unwrap();
        match cli.command {
            Commands::Diff { file1, file2, output } => {
                assert_eq!(file1, PathBuf::from("a.csv"));
                assert_eq!(file2, PathBuf::from("b.csv"));
                assert_eq!(output, PathBuf::from("views_diff.csv"));
            }
            _ => panic!("expected diff"),
        }

        assert!(Cli::try_parse_from(["reelcount", "diff", "a.csv"]).is_err());
    }
}
