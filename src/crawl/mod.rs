// src/crawl/mod.rs
// =============================================================================
// This module is the crawl engine.
//
// Features:
// - Concurrent crawling: one tokio task per dispatched identifier
// - Each identifier is fetched at most once per crawl
// - Configurable depth limit
// - Optional per-fetch timeout, concurrency cap and cancellation
//
// Pieces (leaf to root):
// - fetcher: the Fetcher trait a caller implements
// - visited: the set of identifiers already dispatched
// - task: runs one fetch and reports its Outcome over a channel
// - coordinator: the control loop that ties it all together
// - report: what a finished crawl hands back
//
// Rust concepts:
// - Channels: tasks send results, the coordinator receives them
// - Ownership: only the coordinator owns the mutable crawl state
// =============================================================================

mod coordinator;
mod fetcher;
mod report;
mod task;
mod visited;

pub use coordinator::{crawl, CrawlConfig, Crawler};
pub use fetcher::{Fetcher, Page};
pub use report::{CrawlRecord, CrawlReport, RecordStatus};
pub use task::Outcome;
pub use visited::VisitedSet;
