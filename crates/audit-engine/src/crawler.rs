use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use audit_detectors::{default_detectors, Issue, IssueDetector, PageContext};
use futures::stream::{self, StreamExt};
use page_parser::{classify_href, page_path, ClassifiedLink, PageDocument};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::CrawlTarget;
use crate::fetcher::{FetchError, FetchedPage, PageFetcher};
use crate::progress::{NullSink, ProgressEvent, ProgressSink};

/// An error-range response smaller than this is treated as a broken link;
/// anything larger is assumed to be a rendered error page worth auditing.
const SUBSTANTIAL_CONTENT_BYTES: usize = 1000;

/// One successfully parsed page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResult {
    pub url: String,
    pub title: String,
    pub status_code: u16,
    pub load_time: f64,
    pub content_size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BrokenLinkStatus {
    Http(u16),
    Failed(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokenLink {
    pub url: String,
    pub status: BrokenLinkStatus,
    pub page: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedirectRecord {
    #[serde(rename = "from")]
    pub original_url: String,
    #[serde(rename = "to")]
    pub final_url: String,
    pub status_codes: Vec<u16>,
}

/// Heuristic load-time proxies for one page. Derived from fetch duration and
/// body size, not measured browser timings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSpeed {
    pub url: String,
    pub page: String,
    #[serde(rename = "loadTime")]
    pub load_time: f64,
    pub fcp: f64,
    pub lcp: f64,
    pub cls: f64,
    pub fid: u32,
    pub content_size: usize,
    pub status_code: u16,
}

impl PageSpeed {
    fn sample(url: &str, page: &str, load_time: f64, content_size: usize, status: u16) -> Self {
        Self {
            url: url.to_string(),
            page: page.to_string(),
            load_time: round2(load_time),
            fcp: round2(load_time * 0.5),
            lcp: round2(load_time * 1.2),
            cls: round3((content_size as f64 / 1_000_000.0 * 0.1).min(0.25)),
            fid: (load_time * 50.0).min(300.0) as u32,
            content_size,
            status_code: status,
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Everything one crawl accumulates. Owned exclusively by the crawl
/// invocation; nothing mutates it afterwards.
#[derive(Debug, Default)]
pub struct CrawlOutcome {
    pub visited: HashSet<String>,
    pub pages: Vec<PageResult>,
    pub issues: Vec<Issue>,
    pub broken_links: Vec<BrokenLink>,
    pub redirects: Vec<RedirectRecord>,
    pub external_links: HashSet<String>,
    pub page_speeds: Vec<PageSpeed>,
}

/// Frontier discipline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlMode {
    /// Reference behavior: one page at a time, a page's links explored before
    /// its siblings. Which pages get sampled under a tight budget follows
    /// link order within each page.
    DepthFirst,
    /// Bounded worker window over a FIFO frontier. Same dedupe, budget and
    /// issue semantics; traversal order favors breadth and completion order
    /// is not deterministic.
    Concurrent { max_in_flight: usize },
}

/// Cooperative cancellation flag shared with a running crawl. Cancelling
/// stops new fetches promptly; an in-flight fetch finishes under the
/// fetcher's own timeout.
#[derive(Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Drives the crawl: owns the frontier and visited set, dispatches fetched
/// pages to the detectors, and recurses into same-site links up to the page
/// budget.
pub struct CrawlEngine {
    target: CrawlTarget,
    fetcher: Arc<dyn PageFetcher>,
    detectors: Vec<Box<dyn IssueDetector>>,
    sink: Arc<dyn ProgressSink>,
    mode: CrawlMode,
    cancel: CancelHandle,
}

impl CrawlEngine {
    pub fn new(target: CrawlTarget, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            target,
            fetcher,
            detectors: default_detectors(),
            sink: Arc::new(NullSink),
            mode: CrawlMode::DepthFirst,
            cancel: CancelHandle::default(),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_mode(mut self, mode: CrawlMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelHandle) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub async fn crawl(&self) -> CrawlOutcome {
        let mut outcome = CrawlOutcome::default();
        let seed = self.target.base_url.to_string();

        match self.mode {
            CrawlMode::DepthFirst => self.crawl_depth_first(seed, &mut outcome).await,
            CrawlMode::Concurrent { max_in_flight } => {
                self.crawl_concurrent(seed, max_in_flight.max(1), &mut outcome)
                    .await
            }
        }

        tracing::info!(
            pages = outcome.visited.len(),
            issues = outcome.issues.len(),
            broken = outcome.broken_links.len(),
            "crawl finished"
        );
        outcome
    }

    async fn crawl_depth_first(&self, seed: String, outcome: &mut CrawlOutcome) {
        let mut stack = vec![seed];

        while let Some(url) = stack.pop() {
            if self.cancel.is_cancelled() {
                tracing::info!("crawl cancelled, draining frontier");
                break;
            }
            if outcome.visited.len() >= self.target.max_pages {
                tracing::debug!(budget = self.target.max_pages, "page budget exhausted");
                break;
            }
            if !outcome.visited.insert(url.clone()) {
                continue;
            }

            let links = self.visit(&url, outcome).await;
            // Reversed so the page's first link is popped first, preserving
            // depth-first document order.
            for link in links.into_iter().rev() {
                if !outcome.visited.contains(&link) {
                    stack.push(link);
                }
            }

            self.report_progress(&url, outcome);
        }
    }

    async fn crawl_concurrent(
        &self,
        seed: String,
        max_in_flight: usize,
        outcome: &mut CrawlOutcome,
    ) {
        let mut frontier = VecDeque::from([seed]);

        while !frontier.is_empty() {
            if self.cancel.is_cancelled() {
                tracing::info!("crawl cancelled, draining frontier");
                break;
            }

            // Claim a batch; marking visited at schedule time is what keeps
            // a URL fetched at most once.
            let mut batch = Vec::new();
            while batch.len() < max_in_flight {
                let Some(url) = frontier.pop_front() else { break };
                if outcome.visited.len() >= self.target.max_pages {
                    frontier.clear();
                    break;
                }
                if outcome.visited.insert(url.clone()) {
                    batch.push(url);
                }
            }
            if batch.is_empty() {
                break;
            }

            let fetches: Vec<(String, f64, Result<FetchedPage, FetchError>)> =
                stream::iter(batch)
                    .map(|url| {
                        let fetcher = Arc::clone(&self.fetcher);
                        async move {
                            let started = Instant::now();
                            let result = fetcher.fetch(&url).await;
                            (url, started.elapsed().as_secs_f64(), result)
                        }
                    })
                    .buffer_unordered(max_in_flight)
                    .collect()
                    .await;

            for (url, load_time, result) in fetches {
                let links = self.ingest(&url, load_time, result, outcome);
                for link in links {
                    if !outcome.visited.contains(&link) {
                        frontier.push_back(link);
                    }
                }
                self.report_progress(&url, outcome);
            }
        }
    }

    async fn visit(&self, url: &str, outcome: &mut CrawlOutcome) -> Vec<String> {
        let started = Instant::now();
        let result = self.fetcher.fetch(url).await;
        let load_time = started.elapsed().as_secs_f64();
        self.ingest(url, load_time, result, outcome)
    }

    /// Folds one fetch result into the crawl state and returns the same-site
    /// links discovered on the page, in document order.
    fn ingest(
        &self,
        url: &str,
        load_time: f64,
        result: Result<FetchedPage, FetchError>,
        outcome: &mut CrawlOutcome,
    ) -> Vec<String> {
        let page = page_path(url, &self.target.base_str);

        let fetched = match result {
            Ok(fetched) => fetched,
            Err(err) => {
                tracing::warn!(url, error = %err, "fetch failed");
                outcome.broken_links.push(BrokenLink {
                    url: url.to_string(),
                    status: BrokenLinkStatus::Failed("Failed to fetch".to_string()),
                    page,
                    error: err.to_string(),
                });
                return Vec::new();
            }
        };

        if !fetched.redirect_chain.is_empty() {
            outcome.redirects.push(RedirectRecord {
                original_url: url.to_string(),
                final_url: fetched.final_url.clone(),
                status_codes: fetched.redirect_chain.clone(),
            });
            // The settled URL is as visited as the requested one; marking it
            // keeps a page reachable both directly and via redirect from
            // being fetched twice.
            if fetched.final_url != url && outcome.visited.len() < self.target.max_pages {
                outcome.visited.insert(fetched.final_url.clone());
            }
        }

        if fetched.status >= 400 && !self.audit_despite_status(&fetched) {
            tracing::debug!(url, status = fetched.status, "broken link");
            outcome.broken_links.push(BrokenLink {
                url: url.to_string(),
                status: BrokenLinkStatus::Http(fetched.status),
                page,
                error: format!("HTTP {} error", fetched.status),
            });
            return Vec::new();
        }

        let body = String::from_utf8_lossy(&fetched.body);
        let doc = PageDocument::parse(&body);
        let ctx = PageContext::new(url, page.clone(), fetched.headers.clone());
        for detector in &self.detectors {
            outcome.issues.extend(detector.check(&doc, &ctx));
        }

        let title = doc
            .title()
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "No title".to_string());
        outcome.pages.push(PageResult {
            url: url.to_string(),
            title,
            status_code: fetched.status,
            load_time: round2(load_time),
            content_size: fetched.body.len(),
        });
        outcome.page_speeds.push(PageSpeed::sample(
            url,
            &page,
            load_time,
            fetched.body.len(),
            fetched.status,
        ));

        let Ok(page_url) = Url::parse(url) else {
            return Vec::new();
        };
        let mut internal = Vec::new();
        for href in doc.anchor_hrefs() {
            match classify_href(&href, &page_url, &self.target.site) {
                ClassifiedLink::Internal(link) => internal.push(link.to_string()),
                ClassifiedLink::External(link) => {
                    outcome.external_links.insert(link.to_string());
                }
                ClassifiedLink::Ignored => {}
            }
        }
        internal
    }

    /// Error-range responses that still carry a real page are audited rather
    /// than discarded: some servers serve rendered content under 4xx/5xx, and
    /// 415 in particular shows up on sites that reject the default Accept
    /// header while still returning HTML.
    fn audit_despite_status(&self, fetched: &FetchedPage) -> bool {
        fetched.body.len() >= SUBSTANTIAL_CONTENT_BYTES
            || (fetched.status == 415 && !fetched.body.is_empty())
    }

    fn report_progress(&self, url: &str, outcome: &CrawlOutcome) {
        let page = page_path(url, &self.target.base_str);
        self.sink.emit(ProgressEvent::progress(
            format!("Crawling: {}", page),
            outcome.visited.len(),
            self.target.max_pages,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuditConfig;
    use crate::progress::{ChannelSink, ProgressKind};
    use async_trait::async_trait;
    use reqwest::header::HeaderMap;
    use std::collections::HashMap;

    /// Canned-response fetcher: URL -> result. Unknown URLs fail like a
    /// connection error.
    struct MockFetcher {
        responses: HashMap<String, FetchedPage>,
        failures: HashSet<String>,
    }

    impl MockFetcher {
        fn new() -> Self {
            Self {
                responses: HashMap::new(),
                failures: HashSet::new(),
            }
        }

        fn page(mut self, url: &str, html: &str) -> Self {
            self.responses.insert(
                url.to_string(),
                FetchedPage {
                    final_url: url.to_string(),
                    status: 200,
                    body: html.as_bytes().to_vec(),
                    headers: HeaderMap::new(),
                    redirect_chain: Vec::new(),
                },
            );
            self
        }

        fn response(mut self, url: &str, fetched: FetchedPage) -> Self {
            self.responses.insert(url.to_string(), fetched);
            self
        }

        fn failing(mut self, url: &str) -> Self {
            self.failures.insert(url.to_string());
            self
        }
    }

    #[async_trait]
    impl PageFetcher for MockFetcher {
        async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
            if self.failures.contains(url) {
                return Err(FetchError::Connect {
                    url: url.to_string(),
                    message: "connection refused".to_string(),
                });
            }
            self.responses
                .get(url)
                .cloned()
                .ok_or_else(|| FetchError::Connect {
                    url: url.to_string(),
                    message: "connection refused".to_string(),
                })
        }
    }

    fn engine(fetcher: MockFetcher, seed: &str, max_pages: usize) -> CrawlEngine {
        let target = AuditConfig::new(seed, max_pages).target().unwrap();
        CrawlEngine::new(target, Arc::new(fetcher))
    }

    fn linked_page(hrefs: &[&str]) -> String {
        let anchors: String = hrefs
            .iter()
            .map(|h| format!("<a href=\"{}\">x</a>", h))
            .collect();
        format!(
            "<html><head><title>T</title></head><body>{}</body></html>",
            anchors
        )
    }

    #[tokio::test]
    async fn test_duplicate_links_are_fetched_once() {
        let fetcher = MockFetcher::new()
            .page(
                "https://example.com/",
                &linked_page(&["/a", "/b", "/a", "/a"]),
            )
            .page("https://example.com/a", &linked_page(&["/", "/b"]))
            .page("https://example.com/b", &linked_page(&["/a"]));

        let outcome = engine(fetcher, "https://example.com", 50).crawl().await;

        assert_eq!(outcome.visited.len(), 3);
        assert_eq!(outcome.pages.len(), 3);
        // Each URL parsed exactly once.
        let urls: Vec<&str> = outcome.pages.iter().map(|p| p.url.as_str()).collect();
        assert_eq!(
            urls.iter().collect::<HashSet<_>>().len(),
            urls.len(),
            "a page was processed twice: {:?}",
            urls
        );
    }

    #[tokio::test]
    async fn test_page_budget_is_respected() {
        let mut fetcher = MockFetcher::new().page(
            "https://example.com/",
            &linked_page(&["/p1", "/p2", "/p3", "/p4", "/p5"]),
        );
        for i in 1..=5 {
            fetcher = fetcher.page(&format!("https://example.com/p{}", i), &linked_page(&[]));
        }

        let outcome = engine(fetcher, "https://example.com", 3).crawl().await;
        assert_eq!(outcome.visited.len(), 3);
    }

    #[tokio::test]
    async fn test_depth_first_order_under_budget() {
        // "/" links to /a then /b; /a links to /a1. Depth-first with budget 3
        // must take /a and /a1, never reaching /b.
        let fetcher = MockFetcher::new()
            .page("https://example.com/", &linked_page(&["/a", "/b"]))
            .page("https://example.com/a", &linked_page(&["/a1"]))
            .page("https://example.com/a1", &linked_page(&[]))
            .page("https://example.com/b", &linked_page(&[]));

        let outcome = engine(fetcher, "https://example.com", 3).crawl().await;

        assert!(outcome.visited.contains("https://example.com/a"));
        assert!(outcome.visited.contains("https://example.com/a1"));
        assert!(!outcome.visited.contains("https://example.com/b"));
    }

    #[tokio::test]
    async fn test_www_variant_links_are_internal() {
        let fetcher = MockFetcher::new()
            .page(
                "https://example.com/",
                &linked_page(&["https://www.example.com/x"]),
            )
            .page("https://www.example.com/x", &linked_page(&[]));

        let outcome = engine(fetcher, "https://example.com", 50).crawl().await;

        assert!(outcome.visited.contains("https://www.example.com/x"));
        assert!(outcome.external_links.is_empty());
    }

    #[tokio::test]
    async fn test_external_links_recorded_not_fetched() {
        let fetcher = MockFetcher::new().page(
            "https://example.com/",
            &linked_page(&["https://other.org/page", "/local"]),
        );
        // /local intentionally missing from the fetcher: it will be a broken
        // link, proving it was attempted, while other.org must not be.
        let outcome = engine(fetcher, "https://example.com", 50).crawl().await;

        assert!(outcome
            .external_links
            .contains("https://other.org/page"));
        assert!(!outcome.visited.contains("https://other.org/page"));
        assert_eq!(outcome.broken_links.len(), 1);
        assert_eq!(outcome.broken_links[0].url, "https://example.com/local");
    }

    #[tokio::test]
    async fn test_fetch_failure_records_broken_link() {
        let fetcher = MockFetcher::new()
            .page("https://example.com/", &linked_page(&["/dead"]))
            .failing("https://example.com/dead");

        let outcome = engine(fetcher, "https://example.com", 50).crawl().await;

        assert_eq!(outcome.broken_links.len(), 1);
        let broken = &outcome.broken_links[0];
        assert_eq!(broken.url, "https://example.com/dead");
        assert_eq!(
            broken.status,
            BrokenLinkStatus::Failed("Failed to fetch".to_string())
        );
        assert_eq!(broken.page, "/dead");
        // Attempted URLs stay visited; they are not page results.
        assert!(outcome.visited.contains("https://example.com/dead"));
        assert!(!outcome.pages.iter().any(|p| p.url.ends_with("/dead")));
    }

    #[tokio::test]
    async fn test_error_status_with_thin_body_is_broken() {
        let fetcher = MockFetcher::new().response(
            "https://example.com/",
            FetchedPage {
                final_url: "https://example.com/".to_string(),
                status: 500,
                body: b"oops".to_vec(),
                headers: HeaderMap::new(),
                redirect_chain: Vec::new(),
            },
        );

        let outcome = engine(fetcher, "https://example.com", 50).crawl().await;

        assert_eq!(outcome.broken_links.len(), 1);
        assert_eq!(outcome.broken_links[0].status, BrokenLinkStatus::Http(500));
        assert_eq!(outcome.broken_links[0].error, "HTTP 500 error");
        assert!(outcome.pages.is_empty());
    }

    #[tokio::test]
    async fn test_error_status_with_substantial_body_is_audited() {
        let filler = "x".repeat(1200);
        let html = format!(
            "<html><head><title>Maintenance</title></head><body>{}</body></html>",
            filler
        );
        let fetcher = MockFetcher::new().response(
            "https://example.com/",
            FetchedPage {
                final_url: "https://example.com/".to_string(),
                status: 503,
                body: html.into_bytes(),
                headers: HeaderMap::new(),
                redirect_chain: Vec::new(),
            },
        );

        let outcome = engine(fetcher, "https://example.com", 50).crawl().await;

        assert!(outcome.broken_links.is_empty());
        assert_eq!(outcome.pages.len(), 1);
        assert_eq!(outcome.pages[0].title, "Maintenance");
        assert_eq!(outcome.pages[0].status_code, 503);
    }

    #[tokio::test]
    async fn test_415_with_content_is_audited() {
        let fetcher = MockFetcher::new().response(
            "https://example.com/",
            FetchedPage {
                final_url: "https://example.com/".to_string(),
                status: 415,
                body: b"<html><head><title>Short</title></head></html>".to_vec(),
                headers: HeaderMap::new(),
                redirect_chain: Vec::new(),
            },
        );

        let outcome = engine(fetcher, "https://example.com", 50).crawl().await;

        assert!(outcome.broken_links.is_empty());
        assert_eq!(outcome.pages.len(), 1);
    }

    #[tokio::test]
    async fn test_redirect_chain_is_recorded() {
        let fetcher = MockFetcher::new().response(
            "https://example.com/",
            FetchedPage {
                final_url: "https://example.com/home".to_string(),
                status: 200,
                body: b"<html><head><title>Home</title></head></html>".to_vec(),
                headers: HeaderMap::new(),
                redirect_chain: vec![301, 302],
            },
        );

        let outcome = engine(fetcher, "https://example.com", 50).crawl().await;

        assert_eq!(outcome.redirects.len(), 1);
        let redirect = &outcome.redirects[0];
        assert_eq!(redirect.original_url, "https://example.com/");
        assert_eq!(redirect.final_url, "https://example.com/home");
        assert_eq!(redirect.status_codes, vec![301, 302]);
        assert!(outcome.visited.contains("https://example.com/"));
        // The settled URL is visited too, so it will not be fetched again if
        // another page links to it directly.
        assert!(outcome.visited.contains("https://example.com/home"));
    }

    #[tokio::test]
    async fn test_untitled_page_gets_fallback_title() {
        let fetcher =
            MockFetcher::new().page("https://example.com/", "<html><body>hi</body></html>");
        let outcome = engine(fetcher, "https://example.com", 50).crawl().await;

        assert_eq!(outcome.pages[0].title, "No title");
    }

    #[tokio::test]
    async fn test_progress_events_carry_running_counts() {
        let fetcher = MockFetcher::new()
            .page("https://example.com/", &linked_page(&["/a"]))
            .page("https://example.com/a", &linked_page(&[]));
        let (sink, mut rx) = ChannelSink::new();

        let outcome = engine(fetcher, "https://example.com", 4)
            .with_sink(Arc::new(sink))
            .crawl()
            .await;
        assert_eq!(outcome.visited.len(), 2);

        let first = rx.recv().await.unwrap();
        assert_eq!(first.kind, ProgressKind::Progress);
        assert_eq!(first.pages_crawled, 1);
        assert_eq!(first.max_pages, 4);
        assert_eq!(first.percentage, 25);
        let second = rx.recv().await.unwrap();
        assert_eq!(second.pages_crawled, 2);
        assert_eq!(second.percentage, 50);
    }

    #[tokio::test]
    async fn test_cancellation_stops_new_fetches() {
        let fetcher = MockFetcher::new()
            .page("https://example.com/", &linked_page(&["/a", "/b"]))
            .page("https://example.com/a", &linked_page(&[]))
            .page("https://example.com/b", &linked_page(&[]));

        let engine = engine(fetcher, "https://example.com", 50);
        engine.cancel_handle().cancel();
        let outcome = engine.crawl().await;

        assert!(outcome.visited.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_mode_preserves_dedupe_and_budget() {
        let mut fetcher = MockFetcher::new().page(
            "https://example.com/",
            &linked_page(&["/p1", "/p2", "/p3", "/p1", "/p2"]),
        );
        for i in 1..=3 {
            fetcher = fetcher.page(
                &format!("https://example.com/p{}", i),
                &linked_page(&["/p1", "/p2", "/p3"]),
            );
        }

        let outcome = engine(fetcher, "https://example.com", 3)
            .with_mode(CrawlMode::Concurrent { max_in_flight: 2 })
            .crawl()
            .await;

        assert_eq!(outcome.visited.len(), 3);
        assert_eq!(outcome.pages.len(), 3);
    }

    #[tokio::test]
    async fn test_issues_are_collected_per_page() {
        // Page with no head elements at all: 4 SEO + 4 security + viewport.
        let fetcher = MockFetcher::new().page("https://example.com/", "<html><body></body></html>");
        let outcome = engine(fetcher, "https://example.com", 50).crawl().await;

        assert_eq!(outcome.issues.len(), 9);
        assert!(outcome
            .issues
            .iter()
            .all(|i| i.url == "https://example.com/" && i.page == "/"));
    }
}
