// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (tracing, to stderr)
// 3. Build a fetcher for the subcommand and run the crawl
// 4. Print the report as a table or JSON
// 5. Exit with proper code (0 = all pages fetched, 1 = some failed, 2 = error)
// =============================================================================

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use link_crawler::crawl::{CrawlRecord, RecordStatus};
use link_crawler::fetch::{CannedFetcher, HttpFetcher, HttpFetcherConfig};
use link_crawler::{CrawlConfig, CrawlReport, Crawler, Fetcher};
use serde::Serialize;
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use url::Url;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// RUST_LOG wins if it is set; otherwise info, or debug for our crate with -v
fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "info,link_crawler=debug"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Site {
            website_url,
            max_depth,
            timeout_secs,
            concurrency,
            any_domain,
            output,
        } => {
            let start = Url::parse(&website_url)
                .with_context(|| format!("Invalid URL '{}'", website_url))?;

            let timeout = Duration::from_secs(timeout_secs);
            let fetcher_config = HttpFetcherConfig {
                timeout,
                same_domain: !any_domain,
                ..Default::default()
            };
            let fetcher = HttpFetcher::new(&start, &fetcher_config)
                .context("Failed to set up the HTTP fetcher")?;

            let config = CrawlConfig::default()
                .with_max_depth(max_depth)
                .with_fetch_timeout(Some(timeout))
                .with_max_concurrency(concurrency);

            if !output.json {
                println!("🔍 Crawling website: {}", start);
                println!("📊 Max crawl depth: {}", max_depth);
            }

            let report = run_crawl(fetcher, start, config).await?;
            print_report(&report, output.json)?;
            Ok(exit_code(&report))
        }
        Commands::Demo { max_depth, output } => {
            let seed = "http://golang.org/".to_string();
            let config = CrawlConfig::default().with_max_depth(max_depth);

            if !output.json {
                println!("🔍 Crawling built-in sample: {}", seed);
                println!("📊 Max crawl depth: {}", max_depth);
            }

            let report = run_crawl(CannedFetcher::golang_tour(), seed, config).await?;
            print_report(&report, output.json)?;
            Ok(exit_code(&report))
        }
    }
}

// Runs one crawl, cancelling it on Ctrl-C
async fn run_crawl<F: Fetcher>(
    fetcher: F,
    seed: F::Id,
    config: CrawlConfig,
) -> Result<CrawlReport<F::Id>> {
    let crawler = Crawler::new(Arc::new(fetcher), config);

    let cancel = crawler.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, waiting for pages already in flight");
            cancel.cancel();
        }
    });

    let report = crawler.crawl(seed).await.context("Crawl aborted")?;
    Ok(report)
}

fn exit_code<Id>(report: &CrawlReport<Id>) -> i32 {
    if report.failed_count() > 0 {
        1
    } else {
        0
    }
}

// JSON shape of a report
#[derive(Debug, Serialize)]
struct ReportView {
    records: Vec<RecordView>,
    fetched: usize,
    failed: usize,
    links_discovered: usize,
    duplicates_skipped: usize,
    cancelled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_ms: Option<u128>,
}

#[derive(Debug, Serialize)]
struct RecordView {
    url: String,
    depth: usize,
    #[serde(flatten)]
    status: StatusView,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum StatusView {
    Fetched { bytes: usize, links: usize },
    Failed { error: String },
}

impl<Id: Display> From<&CrawlRecord<Id>> for RecordView {
    fn from(record: &CrawlRecord<Id>) -> Self {
        let status = match &record.status {
            RecordStatus::Fetched { content, links } => StatusView::Fetched {
                bytes: content.len(),
                links: links.len(),
            },
            RecordStatus::Failed { error } => StatusView::Failed {
                error: error.to_string(),
            },
        };
        Self {
            url: record.id.to_string(),
            depth: record.depth,
            status,
        }
    }
}

impl<Id: Display> From<&CrawlReport<Id>> for ReportView {
    fn from(report: &CrawlReport<Id>) -> Self {
        Self {
            records: report.records.iter().map(RecordView::from).collect(),
            fetched: report.fetched_count(),
            failed: report.failed_count(),
            links_discovered: report.links_discovered,
            duplicates_skipped: report.duplicates_skipped,
            cancelled: report.cancelled,
            duration_ms: report.duration().map(|d| d.as_millis()),
        }
    }
}

// Prints the report either as a table or JSON
fn print_report<Id: Display>(report: &CrawlReport<Id>, json: bool) -> Result<()> {
    if json {
        let json_output = serde_json::to_string_pretty(&ReportView::from(report))?;
        println!("{}", json_output);
    } else {
        print_table(report);
    }
    Ok(())
}

// Prints one line per processed page, in the order pages were processed
fn print_table<Id: Display>(report: &CrawlReport<Id>) {
    println!();
    println!("{:<60} {:<7} {:<12} {:<30}", "URL", "DEPTH", "STATUS", "DETAIL");
    println!("{}", "=".repeat(112));

    for record in &report.records {
        let url = record.id.to_string();
        let url_display = if url.chars().count() > 57 {
            format!("{}...", url.chars().take(57).collect::<String>())
        } else {
            url
        };

        let (status, detail) = match &record.status {
            RecordStatus::Fetched { content, links } => (
                "✅ FETCHED",
                format!("{} bytes, {} links", content.len(), links.len()),
            ),
            RecordStatus::Failed { error } => ("❌ FAILED", error.to_string()),
        };

        println!(
            "{:<60} {:<7} {:<12} {:<30}",
            url_display, record.depth, status, detail
        );
    }

    println!();
    println!("📊 Summary:");
    println!("   ✅ Fetched: {}", report.fetched_count());
    println!("   ❌ Failed: {}", report.failed_count());
    println!("   🔗 Links discovered: {}", report.links_discovered);
    println!("   🔁 Duplicates skipped: {}", report.duplicates_skipped);
    if let Some(duration) = report.duration() {
        println!("   ⏱️  Duration: {:.2}s", duration.as_secs_f64());
    }
    if report.cancelled {
        println!("   ⚠️  Crawl was cancelled before it finished");
    }
}
