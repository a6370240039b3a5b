use std::path::Path;

use audit_detectors::Issue;
use serde::{Deserialize, Serialize};

use crate::crawler::{BrokenLink, PageSpeed, RedirectRecord};
use crate::recommend::Recommendation;
use crate::scoring::ScoreCard;

/// Crawl totals. `total_pages` counts every attempted URL, including ones
/// that turned out broken.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Statistics {
    pub total_pages: usize,
    pub broken_links: usize,
    pub redirects: usize,
    pub external_links: usize,
}

/// The complete audit output. Serialized field names and nesting are stable;
/// downstream renderers key on them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditReport {
    pub url: String,
    /// RFC 3339 completion time.
    pub timestamp: String,
    pub scores: ScoreCard,
    pub statistics: Statistics,
    pub recommendations: Vec<Recommendation>,
    pub detailed_issues: Vec<Issue>,
    pub broken_links: Vec<BrokenLink>,
    pub page_speeds: Vec<PageSpeed>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub redirects: Vec<RedirectRecord>,
}

impl AuditReport {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> crate::Result<()> {
        let json = self.to_json()?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
