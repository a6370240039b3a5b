use async_trait::async_trait;
use thiserror::Error;

use crate::recommend::Recommendation;

#[derive(Debug, Error)]
pub enum SuggestionError {
    #[error("Suggestion provider unavailable: {0}")]
    Unavailable(String),

    #[error("Suggestion request failed: {0}")]
    Request(String),
}

/// Everything a provider gets to work with for one recommendation.
#[derive(Debug, Clone)]
pub struct SuggestionRequest {
    pub category: String,
    pub title: String,
    pub description: String,
    pub affected_urls: Vec<String>,
    pub recommendation: String,
}

impl From<&Recommendation> for SuggestionRequest {
    fn from(rec: &Recommendation) -> Self {
        Self {
            category: rec.category.clone(),
            title: rec.title.clone(),
            description: rec.description.clone(),
            affected_urls: rec.affected_urls.clone(),
            recommendation: rec.recommendation.clone(),
        }
    }
}

/// Optional enrichment hook: turns a canned recommendation into prose
/// tailored to the audited site. A failing provider degrades the report to
/// the canned text, never the audit.
#[async_trait]
pub trait SuggestionProvider: Send + Sync {
    async fn suggest(&self, request: &SuggestionRequest) -> Result<String, SuggestionError>;
}
