// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Commands:
//   keyspy scan                 crawl once, write the report, notify
//   keyspy schedule --every N   crawl every N seconds until Ctrl-C
//
// Both commands read the settings file (--config) and accept the same
// scanner overrides (--url, --keyword, --max-depth, --max-concurrent).
// =============================================================================

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "keyspy",
    version,
    about = "Crawl a website and report the pages that contain your keywords",
    long_about = "keyspy crawls a single website starting from one URL, stays on that host, \
                  and reports every page containing any of the configured keywords. \
                  Reports are written to disk and can be pushed to a chat webhook."
)]
pub struct Cli {
    /// Settings file (YAML). Missing files are fine: defaults and
    /// KEYSPY__* environment variables are used instead.
    #[arg(long, global = true, default_value = "config/keyspy.yaml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl the target site once
    ///
    /// Example: keyspy scan --url https://example.com --keyword rust --keyword tokio
    Scan {
        #[command(flatten)]
        overrides: ScanOverrides,
    },

    /// Crawl the target site repeatedly at a fixed interval
    ///
    /// Example: keyspy schedule --every 3600
    Schedule {
        /// Seconds between two runs (default: schedule.interval_secs)
        #[arg(long)]
        every: Option<u64>,

        #[command(flatten)]
        overrides: ScanOverrides,
    },
}

/// Scanner settings that can be overridden from the command line
#[derive(Args, Debug, Clone, Default)]
pub struct ScanOverrides {
    /// Website to crawl (overrides scanner.target_url)
    #[arg(long)]
    pub url: Option<String>,

    /// Keyword to search for; repeat the flag for several keywords
    /// (replaces scanner.keywords)
    #[arg(long = "keyword", short = 'k')]
    pub keywords: Vec<String>,

    /// Maximum crawl depth; 0 = only the start page
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Maximum number of pages fetched at the same time
    #[arg(long)]
    pub max_concurrent: Option<usize>,
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is #[command(flatten)]?
//    - It inlines the fields of another struct as flags of this command
//    - Both subcommands share ScanOverrides without repeating the fields
//
// 2. Why Option<usize> instead of usize with a default?
//    - None means "the user didn't pass the flag"
//    - Then the value from the settings file is kept
//
// 3. What does global = true do?
//    - --config can be written before or after the subcommand:
//      keyspy --config a.yaml scan   or   keyspy scan --config a.yaml
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scan_with_overrides() {
        let cli = Cli::parse_from([
            "keyspy", "scan", "--url", "https://example.com", "-k", "rust", "--keyword", "tokio",
            "--max-depth", "2",
        ]);
        assert_eq!(cli.config, PathBuf::from("config/keyspy.yaml"));
        match cli.command {
            Commands::Scan { overrides } => {
                assert_eq!(overrides.url.as_deref(), Some("https://example.com"));
                assert_eq!(overrides.keywords, vec!["rust", "tokio"]);
                assert_eq!(overrides.max_depth, Some(2));
                assert_eq!(overrides.max_concurrent, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_schedule() {
        let cli = Cli::parse_from(["keyspy", "schedule", "--every", "60", "--config", "x.yaml"]);
        assert_eq!(cli.config, PathBuf::from("x.yaml"));
        assert!(matches!(cli.command, Commands::Schedule { every: Some(60), .. }));
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
