use std::sync::Arc;

use crate::config::AuditConfig;
use crate::crawler::{CancelHandle, CrawlEngine, CrawlMode};
use crate::fetcher::{HttpFetcher, PageFetcher};
use crate::progress::{NullSink, ProgressEvent, ProgressSink};
use crate::recommend::build_recommendations;
use crate::report::{AuditReport, Statistics};
use crate::scoring::score;
use crate::suggest::{SuggestionProvider, SuggestionRequest};
use crate::Result;

/// Top-level audit orchestration: validate config, crawl, aggregate, score.
///
/// Every collaborator is swappable: the fetcher for a scripted-browser
/// backend, the sink for server push, the provider for tailored remediation
/// prose.
pub struct Auditor {
    config: AuditConfig,
    fetcher: Arc<dyn PageFetcher>,
    sink: Arc<dyn ProgressSink>,
    mode: CrawlMode,
    suggestions: Option<Arc<dyn SuggestionProvider>>,
    cancel: CancelHandle,
}

impl Auditor {
    pub fn new(config: AuditConfig) -> Result<Self> {
        let fetcher = Arc::new(HttpFetcher::new(&config)?);
        Ok(Self {
            config,
            fetcher,
            sink: Arc::new(NullSink),
            mode: CrawlMode::DepthFirst,
            suggestions: None,
            cancel: CancelHandle::default(),
        })
    }

    pub fn with_fetcher(mut self, fetcher: Arc<dyn PageFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_mode(mut self, mode: CrawlMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_suggestion_provider(mut self, provider: Arc<dyn SuggestionProvider>) -> Self {
        self.suggestions = Some(provider);
        self
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub async fn run(&self) -> Result<AuditReport> {
        let target = match self.config.target() {
            Ok(target) => target,
            Err(err) => {
                self.sink.emit(ProgressEvent::error(err.to_string()));
                return Err(err.into());
            }
        };

        self.sink.emit(ProgressEvent::progress(
            format!("Starting audit of {}", self.config.base_url),
            0,
            target.max_pages,
        ));
        tracing::info!(url = %self.config.base_url, max_pages = target.max_pages, "starting audit");

        let max_pages = target.max_pages;
        let outcome = CrawlEngine::new(target, Arc::clone(&self.fetcher))
            .with_sink(Arc::clone(&self.sink))
            .with_mode(self.mode)
            .with_cancel(self.cancel.clone())
            .crawl()
            .await;

        self.sink.emit(ProgressEvent::progress(
            "Generating recommendations...",
            outcome.visited.len(),
            max_pages,
        ));
        let mut recommendations = build_recommendations(&outcome.issues, &outcome.broken_links);
        if let Some(provider) = &self.suggestions {
            for rec in &mut recommendations {
                match provider.suggest(&SuggestionRequest::from(&*rec)).await {
                    Ok(text) => rec.ai_suggestion = Some(text),
                    // Canned text stands in when the provider fails.
                    Err(err) => {
                        tracing::warn!(category = %rec.category, error = %err, "suggestion failed")
                    }
                }
            }
        }

        self.sink.emit(ProgressEvent::progress(
            "Calculating scores...",
            outcome.visited.len(),
            max_pages,
        ));
        let scores = score(&outcome.issues, outcome.broken_links.len());

        self.sink.emit(ProgressEvent::progress(
            "Audit complete! Preparing report...",
            outcome.visited.len(),
            max_pages,
        ));

        let report = AuditReport {
            url: self.config.base_url.clone(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            scores,
            statistics: Statistics {
                total_pages: outcome.visited.len(),
                broken_links: outcome.broken_links.len(),
                redirects: outcome.redirects.len(),
                external_links: outcome.external_links.len(),
            },
            recommendations,
            detailed_issues: outcome.issues,
            broken_links: outcome.broken_links,
            page_speeds: outcome.page_speeds,
            redirects: outcome.redirects,
        };

        self.sink.emit(ProgressEvent::complete(
            serde_json::to_value(&report)?,
            report.statistics.total_pages,
            max_pages,
        ));

        Ok(report)
    }
}
