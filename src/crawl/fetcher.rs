// src/crawl/fetcher.rs
// =============================================================================
// The Fetcher capability: the one thing the crawl engine needs from outside.
//
// Given an identifier, a fetcher returns the resource's content plus the
// identifiers it links to, or a FetchError. The engine never cares how
// that happens (HTTP, a file, a canned map in a test).
//
// Contract:
// - fetch() is called concurrently from many tasks at once, so an
//   implementation must be Send + Sync and safe to share behind an Arc.
// - A failure is final for that identifier; the engine never retries.
// - Links keep page order and may contain duplicates or already-seen
//   identifiers; the coordinator filters them.
// =============================================================================

use crate::error::FetchError;
use async_trait::async_trait;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// What a successful fetch produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<Id> {
    /// The body of the resource
    pub content: String,
    /// Outgoing links, in the order they appear
    pub links: Vec<Id>,
}

impl<Id> Page<Id> {
    pub fn new(content: impl Into<String>, links: Vec<Id>) -> Self {
        Self {
            content: content.into(),
            links,
        }
    }
}

/// A caller-supplied way to retrieve resources.
///
/// Equality of `Id` defines "same resource" for duplicate suppression.
#[async_trait]
pub trait Fetcher: Send + Sync + 'static {
    type Id: Clone + Eq + Hash + Debug + Display + Send + Sync + 'static;

    async fn fetch(&self, id: &Self::Id) -> Result<Page<Self::Id>, FetchError>;
}
