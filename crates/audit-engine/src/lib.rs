//! Crawl-and-audit engine: walks a site from a seed URL, runs the issue
//! detectors over every reachable page, and folds the findings into weighted
//! health scores and prioritized recommendations.

pub mod auditor;
pub mod config;
pub mod crawler;
pub mod fetcher;
pub mod progress;
pub mod recommend;
pub mod report;
pub mod scoring;
pub mod suggest;

use thiserror::Error;

/// Fatal audit errors. Per-page failures (broken links, error statuses) are
/// recorded in the report instead and never surface here.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Report serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AuditError>;

pub use auditor::Auditor;
pub use config::{AuditConfig, ConfigError, CrawlTarget};
pub use crawler::{
    BrokenLink, BrokenLinkStatus, CancelHandle, CrawlEngine, CrawlMode, CrawlOutcome, PageResult,
    PageSpeed, RedirectRecord,
};
pub use fetcher::{FetchError, FetchedPage, HttpFetcher, PageFetcher};
pub use progress::{ChannelSink, NullSink, ProgressEvent, ProgressKind, ProgressSink};
pub use recommend::{build_recommendations, Recommendation, RecommendationPriority};
pub use report::{AuditReport, Statistics};
pub use scoring::{score, ScoreCard};
pub use suggest::{SuggestionError, SuggestionProvider, SuggestionRequest};
