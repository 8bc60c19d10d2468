// src/fetch/mod.rs
// =============================================================================
// Ready-made Fetcher implementations.
//
// Submodules:
// - http: fetches real pages with reqwest and extracts links with scraper
// - canned: serves pages from an in-memory map (demos and tests)
//
// Anything else that implements crawl::Fetcher works with the crawler too.
// =============================================================================

mod canned;
mod http;

pub use canned::CannedFetcher;
pub use http::{HttpFetcher, HttpFetcherConfig};
