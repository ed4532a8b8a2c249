// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Load settings (defaults -> file -> environment -> flags)
// 3. Set up logging
// 4. Run one scan, or schedule scans until Ctrl-C
// 5. Exit with proper code (0 = scan finished, 2 = error)
//
// Ctrl-C cancels the crawl in progress: the pages crawled so far still end
// up in the report.
// =============================================================================

mod cli;
mod config;
mod crawl;
mod error;
mod logging;
mod model;
mod notify;
mod report;
mod service;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use cli::{Cli, Commands};
use config::Settings;
use model::CrawlReport;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();

    let overrides = match &cli.command {
        Commands::Scan { overrides } | Commands::Schedule { overrides, .. } => overrides.clone(),
    };
    let settings = Settings::load(&cli.config, &overrides)
        .with_context(|| format!("failed to load settings from {}", cli.config.display()))?;

    logging::init(&settings.log);

    let cancel = CancellationToken::new();
    spawn_ctrl_c_handler(cancel.clone());

    match cli.command {
        Commands::Scan { .. } => {
            let report = service::run_once(&settings, cancel).await?;
            print_summary(&report);
            Ok(0)
        }
        Commands::Schedule { every, overrides } => {
            service::run_scheduled(&cli.config, &overrides, every, cancel).await?;
            Ok(0)
        }
    }
}

// Cancels `cancel` on the first Ctrl-C
fn spawn_ctrl_c_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping crawl");
            cancel.cancel();
        }
    });
}

// Prints the matching pages as a human-readable table on stdout
fn print_summary(report: &CrawlReport) {
    println!();
    println!("{:<60} {:<8} {:<30}", "URL", "HITS", "KEYWORDS");
    println!("{}", "=".repeat(100));

    for result in crate::report::by_total_desc(&report.results) {
        let url_display = if result.url.chars().count() > 57 {
            format!("{}...", result.url.chars().take(57).collect::<String>())
        } else {
            result.url.clone()
        };
        println!(
            "{:<60} {:<8} {:<30}",
            url_display,
            result.total_count,
            result.keywords.join(", ")
        );
    }

    println!();
    println!("📊 Summary:");
    println!("   📄 Pages scanned: {}", report.total_pages);
    println!("   🔍 Pages with keywords: {}", report.match_pages);
    println!("   ⚠️  Errors: {}", report.error_count);
    println!("   ⏱️  Elapsed: {:.2?}", report.elapsed);
    if report.cancelled {
        println!("   ⛔ Cancelled: results are partial");
    }
}
