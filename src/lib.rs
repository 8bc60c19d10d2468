// src/lib.rs
// =============================================================================
// link_crawler: a concurrent, depth-bounded crawler that never fetches the
// same resource twice.
//
// Layout:
// - crawl: the engine (coordinator, task runner, visited set, report)
// - fetch: Fetcher implementations (HTTP and in-memory)
// - error: FetchError for single resources, SetupError for building a
//   fetcher, CrawlError for engine faults
//
// Quick start:
//
//   let fetcher = CannedFetcher::golang_tour();
//   let report = crawl("http://golang.org/".to_string(), 4, fetcher).await?;
//   for (url, body) in report.successes() { ... }
// =============================================================================

pub mod crawl;
pub mod error;
pub mod fetch;

pub use crawl::{crawl, CrawlConfig, CrawlReport, Crawler, Fetcher, Page};
pub use error::{CrawlError, FetchError, SetupError};
