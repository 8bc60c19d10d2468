// src/fetch/http.rs
// =============================================================================
// A Fetcher that crawls real websites over HTTP.
//
// For each URL it:
// 1. Sends a GET request
// 2. Treats any non-2xx status as a failed fetch
// 3. Parses HTML responses and collects every <a href> link
// 4. Resolves relative links against the page URL and drops fragments
// 5. Optionally keeps only links on the same host as the starting page
//
// We use:
// - reqwest for HTTP (one Client shared by every task, it pools connections)
// - scraper for HTML parsing and CSS selectors
// - url for resolving and comparing URLs
// =============================================================================

use crate::crawl::{Fetcher, Page};
use crate::error::{FetchError, SetupError};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use url::Url;

/// Settings for the HTTP fetcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpFetcherConfig {
    /// Timeout for a single HTTP request
    pub timeout: Duration,
    /// User-Agent header sent with every request
    pub user_agent: String,
    /// Only follow links on the starting page's host
    pub same_domain: bool,
}

impl Default for HttpFetcherConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agent: format!("link-crawler/{}", env!("CARGO_PKG_VERSION")),
            same_domain: true,
        }
    }
}

pub struct HttpFetcher {
    client: Client,
    // Some(host) when links are restricted to one site
    allowed_host: Option<String>,
}

impl HttpFetcher {
    // Builds a fetcher for a crawl that starts at `start`
    //
    // Fails if the HTTP client can't be built, or if same_domain is set
    // and the start URL has no host to compare against.
    pub fn new(start: &Url, config: &HttpFetcherConfig) -> Result<Self, SetupError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        let allowed_host = if config.same_domain {
            let host = start
                .host_str()
                .ok_or_else(|| SetupError::MissingHost(start.to_string()))?;
            Some(host.to_string())
        } else {
            None
        };

        Ok(Self {
            client,
            allowed_host,
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    type Id = Url;

    async fn fetch(&self, url: &Url) -> Result<Page<Url>, FetchError> {
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        // No content type at all is treated as HTML
        let is_html = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map_or(true, |value| value.contains("html"));

        // Relative links are relative to where we ended up after redirects
        let final_url = response.url().clone();

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::InvalidContent(e.to_string()))?;

        let links = if is_html {
            extract_links(&body, &final_url, self.allowed_host.as_deref())
        } else {
            Vec::new()
        };

        Ok(Page::new(body, links))
    }
}

// Extracts every followable link from an HTML document
//
// Parameters:
//   html: the HTML content to parse
//   page_url: the URL of the page (for resolving relative links)
//   allowed_host: if set, links to other hosts are dropped
//
// Returns: absolute URLs in document order, duplicates kept
fn extract_links(html: &str, page_url: &Url, allowed_host: Option<&str>) -> Vec<Url> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("a[href]").expect("'a[href]' is a valid selector");

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(page_url, href))
        .filter(|link| match allowed_host {
            Some(host) => link.host_str() == Some(host),
            None => true,
        })
        .collect()
}

// Resolves a link (possibly relative) to an absolute http(s) URL
fn resolve_link(base: &Url, href: &str) -> Option<Url> {
    // Skip anchors and special protocols
    if href.starts_with('#')
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("javascript:")
    {
        return None;
    }

    let mut url = base.join(href).ok()?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }

    // page#a and page#b are the same resource
    url.set_fragment(None);
    Some(url)
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why does fetch() take &self?
//    - Many tasks call it at the same time through one Arc<HttpFetcher>
//    - Nothing inside needs to change, so a shared borrow is enough
//    - reqwest::Client is already safe to share between tasks
//
// 2. What is filter_map?
//    - Like map, but the closure returns Option
//    - None values are dropped, Some(x) values are kept as x
//    - Handy for "try to convert, skip what doesn't work"
//
// 3. Why is parsing done outside the async part?
//    - scraper's Html type can't be sent between threads
//    - extract_links is a plain function, so the Html is dropped before
//      fetch() reaches another .await
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::GET, MockServer};
    use rstest::rstest;

    #[test]
    fn test_resolve_absolute_link() {
        let base = Url::parse("https://example.com/page").unwrap();
        let result = resolve_link(&base, "https://other.com");
        assert_eq!(result, Some(Url::parse("https://other.com/").unwrap()));
    }

    #[test]
    fn test_resolve_relative_link() {
        let base = Url::parse("https://example.com/page").unwrap();
        let result = resolve_link(&base, "/docs");
        assert_eq!(result, Some(Url::parse("https://example.com/docs").unwrap()));
    }

    #[rstest]
    #[case("#section")]
    #[case("mailto:test@example.com")]
    #[case("tel:+123456")]
    #[case("javascript:void(0)")]
    #[case("ftp://example.com/file")]
    fn test_skip_unfollowable_links(#[case] href: &str) {
        let base = Url::parse("https://example.com/page").unwrap();
        assert_eq!(resolve_link(&base, href), None);
    }

    #[test]
    fn test_fragment_is_dropped() {
        let base = Url::parse("https://example.com/").unwrap();
        let result = resolve_link(&base, "guide#install");
        assert_eq!(result, Some(Url::parse("https://example.com/guide").unwrap()));
    }

    #[rstest]
    #[case("<html><body><p>No links here.</p></body></html>", None, vec![])]
    #[case(
        r#"<a href="/a">A</a><a href="https://other.com/b">B</a><a href="/a">A again</a>"#,
        None,
        vec!["https://example.com/a", "https://other.com/b", "https://example.com/a"]
    )]
    #[case(
        r#"<a href="/a">A</a><a href="https://other.com/b">B</a>"#,
        Some("example.com"),
        vec!["https://example.com/a"]
    )]
    #[case("", Some("example.com"), vec![])]
    fn test_extract_links(
        #[case] html: &str,
        #[case] allowed_host: Option<&str>,
        #[case] expected: Vec<&str>,
    ) {
        let page = Url::parse("https://example.com/index.html").unwrap();
        let links: Vec<String> = extract_links(html, &page, allowed_host)
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(links, expected);
    }

    #[tokio::test]
    async fn test_fetch_html_page() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/");
                then.status(200)
                    .header("content-type", "text/html; charset=utf-8")
                    .body(r#"<a href="/docs">Docs</a><a href="https://elsewhere.org/">Out</a>"#);
            })
            .await;

        let start = Url::parse(&server.url("/")).unwrap();
        let fetcher = HttpFetcher::new(&start, &HttpFetcherConfig::default()).unwrap();
        let page = fetcher.fetch(&start).await.unwrap();

        assert!(page.content.contains("Docs"));
        assert_eq!(page.links, vec![Url::parse(&server.url("/docs")).unwrap()]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_keeps_offsite_links_when_allowed() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/");
                then.status(200)
                    .header("content-type", "text/html")
                    .body(r#"<a href="https://elsewhere.org/">Out</a>"#);
            })
            .await;

        let start = Url::parse(&server.url("/")).unwrap();
        let config = HttpFetcherConfig {
            same_domain: false,
            ..Default::default()
        };
        let fetcher = HttpFetcher::new(&start, &config).unwrap();
        let page = fetcher.fetch(&start).await.unwrap();

        assert_eq!(page.links, vec![Url::parse("https://elsewhere.org/").unwrap()]);
    }

    #[tokio::test]
    async fn test_fetch_not_found_is_status_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/missing");
                then.status(404);
            })
            .await;

        let start = Url::parse(&server.url("/")).unwrap();
        let missing = Url::parse(&server.url("/missing")).unwrap();
        let fetcher = HttpFetcher::new(&start, &HttpFetcherConfig::default()).unwrap();
        let result = fetcher.fetch(&missing).await;

        assert_eq!(
            result,
            Err(FetchError::Status {
                url: missing.to_string(),
                status: 404,
            })
        );
    }

    #[tokio::test]
    async fn test_fetch_non_html_has_no_links() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/data.json");
                then.status(200)
                    .header("content-type", "application/json")
                    .body(r#"{"href": "<a href='/x'>x</a>"}"#);
            })
            .await;

        let url = Url::parse(&server.url("/data.json")).unwrap();
        let fetcher = HttpFetcher::new(&url, &HttpFetcherConfig::default()).unwrap();
        let page = fetcher.fetch(&url).await.unwrap();

        assert!(page.links.is_empty());
    }

    #[tokio::test]
    async fn test_links_resolve_against_redirect_target() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/docs");
                then.status(301).header("location", "/docs/");
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/docs/");
                then.status(200)
                    .header("content-type", "text/html")
                    .body(r#"<a href="intro">Intro</a>"#);
            })
            .await;

        let docs = Url::parse(&server.url("/docs")).unwrap();
        let fetcher = HttpFetcher::new(&docs, &HttpFetcherConfig::default()).unwrap();
        let page = fetcher.fetch(&docs).await.unwrap();

        assert_eq!(
            page.links,
            vec![Url::parse(&server.url("/docs/intro")).unwrap()]
        );
    }

    #[test]
    fn test_same_domain_needs_a_host() {
        let start = Url::parse("data:text/plain,hello").unwrap();
        let result = HttpFetcher::new(&start, &HttpFetcherConfig::default());
        assert!(matches!(result, Err(SetupError::MissingHost(_))));
    }
}
