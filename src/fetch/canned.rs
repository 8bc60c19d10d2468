// src/fetch/canned.rs
// =============================================================================
// A Fetcher that serves pages from an in-memory map.
//
// Useful for demos and for testing code that sits on top of the crawler
// without touching the network. Unknown identifiers fail with NotFound,
// just like a dead link would.
// =============================================================================

use crate::crawl::{Fetcher, Page};
use crate::error::FetchError;
use async_trait::async_trait;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct CannedFetcher {
    pages: HashMap<String, Page<String>>,
}

impl CannedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    // Adds (or replaces) a page
    pub fn with_page(mut self, id: &str, content: &str, links: &[&str]) -> Self {
        let links = links.iter().map(|link| link.to_string()).collect();
        self.pages.insert(id.to_string(), Page::new(content, links));
        self
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// A small slice of golang.org.
    ///
    /// `http://golang.org/cmd/` is linked but has no page, so a crawl of it
    /// shows both successes and a failure.
    pub fn golang_tour() -> Self {
        Self::new()
            .with_page(
                "http://golang.org/",
                "The Go Programming Language",
                &["http://golang.org/pkg/", "http://golang.org/cmd/"],
            )
            .with_page(
                "http://golang.org/pkg/",
                "Packages",
                &[
                    "http://golang.org/",
                    "http://golang.org/cmd/",
                    "http://golang.org/pkg/fmt/",
                    "http://golang.org/pkg/os/",
                ],
            )
            .with_page(
                "http://golang.org/pkg/fmt/",
                "Package fmt",
                &["http://golang.org/", "http://golang.org/pkg/"],
            )
            .with_page(
                "http://golang.org/pkg/os/",
                "Package os",
                &["http://golang.org/", "http://golang.org/pkg/"],
            )
    }
}

#[async_trait]
impl Fetcher for CannedFetcher {
    type Id = String;

    async fn fetch(&self, id: &String) -> Result<Page<String>, FetchError> {
        self.pages
            .get(id)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(id.clone()))
    }
}
