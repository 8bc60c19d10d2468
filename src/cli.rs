// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Two subcommands:
// - site: crawl a real website over HTTP
// - demo: crawl a small built-in copy of golang.org, no network needed
// =============================================================================

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "link-crawler",
    version,
    about = "Concurrent, depth-bounded crawler that fetches every page at most once",
    long_about = "link-crawler follows links from a starting page up to a maximum depth, \
                  fetching pages concurrently and never fetching the same page twice. \
                  Press Ctrl-C to stop early; pages already in flight are still reported."
)]
pub struct Cli {
    /// Log more detail (crawl decisions, skipped links) to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl a website
    ///
    /// Example: link-crawler site https://example.com --max-depth 3
    Site {
        /// Website URL to start from (e.g., https://example.com)
        website_url: String,

        /// Maximum crawl depth
        ///
        /// Depth 1 = just the starting page
        /// Depth 2 = starting page + all pages it links to
        /// Depth 0 = fetch nothing
        #[arg(long, default_value_t = 2)]
        max_depth: usize,

        /// Per-page timeout in seconds
        #[arg(long, default_value_t = 10)]
        timeout_secs: u64,

        /// Maximum number of pages fetched at the same time (default: no limit)
        #[arg(long)]
        concurrency: Option<usize>,

        /// Follow links to other hosts too
        #[arg(long)]
        any_domain: bool,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Crawl a built-in sample of golang.org (no network access)
    Demo {
        /// Maximum crawl depth
        #[arg(long, default_value_t = 4)]
        max_depth: usize,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args, Debug)]
pub struct OutputArgs {
    /// Output results in JSON format instead of a table
    #[arg(long)]
    pub json: bool,
}
