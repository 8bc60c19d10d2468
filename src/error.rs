// src/error.rs
// =============================================================================
// Error types for the crawl engine.
//
// There are two very different kinds of failure:
// - FetchError: one resource could not be fetched. This is normal, gets
//   recorded in the report, and the crawl keeps going.
// - CrawlError: the coordinator's own bookkeeping broke. This should never
//   happen and is the only error that comes out of crawl() as Err.
//
// Rust concepts:
// - thiserror: derives std::error::Error and Display from attributes
// - Enums with data: each variant carries the details of its failure
// =============================================================================

use std::time::Duration;
use thiserror::Error;

/// Why a single fetch failed.
///
/// Clone so the same error can be logged and stored in the report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The fetcher has no resource with this identifier
    #[error("not found: {0}")]
    NotFound(String),

    /// The server answered, but not with a 2xx status
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    /// The request itself failed (DNS, connection refused, TLS, ...)
    #[error("request failed: {0}")]
    Request(String),

    /// The response arrived but its body could not be used
    #[error("invalid content: {0}")]
    InvalidContent(String),

    /// The fetch took longer than the configured per-fetch timeout
    #[error("fetch timed out after {0:?}")]
    Timeout(Duration),

    /// The crawl was cancelled while this fetch was in flight
    #[error("fetch cancelled")]
    Cancelled,

    /// The fetcher panicked; the panic is contained in the task
    #[error("fetcher panicked: {0}")]
    Panicked(String),
}

// reqwest errors are flattened into strings so FetchError stays Clone
impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            FetchError::Request(format!("request timed out: {}", error))
        } else {
            FetchError::Request(error.to_string())
        }
    }
}

/// Why a fetcher could not be built.
#[derive(Debug, Error)]
pub enum SetupError {
    /// Same-domain crawling needs a host to compare links against
    #[error("URL has no host: {0}")]
    MissingHost(String),

    /// The HTTP client could not be built
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Internal-consistency faults of the coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CrawlError {
    /// An outcome arrived while no task was outstanding
    #[error("outstanding task count went negative")]
    OutstandingUnderflow,

    /// Every sender was dropped while tasks were still outstanding
    #[error("result channel closed with {outstanding} task(s) still outstanding")]
    ChannelClosed { outstanding: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_messages() {
        assert_eq!(
            FetchError::NotFound("http://golang.org/cmd/".to_string()).to_string(),
            "not found: http://golang.org/cmd/"
        );
        assert_eq!(
            FetchError::Status {
                url: "https://example.com/missing".to_string(),
                status: 404,
            }
            .to_string(),
            "HTTP 404 for https://example.com/missing"
        );
        assert_eq!(
            FetchError::Timeout(Duration::from_secs(3)).to_string(),
            "fetch timed out after 3s"
        );
    }

    #[test]
    fn test_setup_error_message() {
        let error = SetupError::MissingHost("data:text/plain,hello".to_string());
        assert_eq!(error.to_string(), "URL has no host: data:text/plain,hello");
    }

    #[test]
    fn test_crawl_error_messages() {
        let error = CrawlError::ChannelClosed { outstanding: 2 };
        assert_eq!(
            error.to_string(),
            "result channel closed with 2 task(s) still outstanding"
        );
    }
}
