// src/crawl/report.rs
// =============================================================================
// The crawl report: one record per processed outcome, plus statistics.
//
// Records are appended by the coordinator in the order outcomes are taken
// off the result channel, so the report order is exactly the processing
// order. Every processed outcome shows up here once.
// =============================================================================

use crate::error::FetchError;
use std::time::{Duration, Instant};

/// One processed outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlRecord<Id> {
    pub id: Id,
    /// Remaining depth the identifier was dispatched with
    pub depth: usize,
    pub status: RecordStatus<Id>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordStatus<Id> {
    /// The fetch succeeded
    Fetched { content: String, links: Vec<Id> },
    /// The fetch failed; the identifier's links were never explored
    Failed { error: FetchError },
}

impl<Id> CrawlRecord<Id> {
    pub fn is_ok(&self) -> bool {
        matches!(self.status, RecordStatus::Fetched { .. })
    }
}

#[derive(Debug)]
pub struct CrawlReport<Id> {
    pub records: Vec<CrawlRecord<Id>>,
    /// Links seen across all successful outcomes, duplicates included
    pub links_discovered: usize,
    /// Links skipped because their identifier was already dispatched
    pub duplicates_skipped: usize,
    /// Links not followed because the depth bound was reached
    pub depth_exhausted: usize,
    /// Whether the crawl was cancelled before it ran out of work
    pub cancelled: bool,
    pub start_time: Option<Instant>,
    pub end_time: Option<Instant>,
}

impl<Id> Default for CrawlReport<Id> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            links_discovered: 0,
            duplicates_skipped: 0,
            depth_exhausted: 0,
            cancelled: false,
            start_time: None,
            end_time: None,
        }
    }
}

impl<Id> CrawlReport<Id> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    // (identifier, content) for every successful fetch, in processing order
    pub fn successes(&self) -> impl Iterator<Item = (&Id, &str)> {
        self.records.iter().filter_map(|record| match &record.status {
            RecordStatus::Fetched { content, .. } => Some((&record.id, content.as_str())),
            RecordStatus::Failed { .. } => None,
        })
    }

    // (identifier, error) for every failed fetch, in processing order
    pub fn failures(&self) -> impl Iterator<Item = (&Id, &FetchError)> {
        self.records.iter().filter_map(|record| match &record.status {
            RecordStatus::Failed { error } => Some((&record.id, error)),
            RecordStatus::Fetched { .. } => None,
        })
    }

    pub fn fetched_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_ok()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.records.len() - self.fetched_count()
    }

    pub fn duration(&self) -> Option<Duration> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => Some(end.duration_since(start)),
            _ => None,
        }
    }
}
