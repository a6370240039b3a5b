use std::collections::HashSet;

use audit_detectors::{Issue, IssueCategory};
use serde::{Deserialize, Serialize};

/// Category health scores, 0-100. `overall` is the weighted blend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreCard {
    pub overall: u32,
    pub performance: u32,
    pub seo: u32,
    pub accessibility: u32,
    #[serde(rename = "bestPractices")]
    pub best_practices: u32,
}

/// Scores a crawl's findings.
///
/// Each category is penalized per *distinct issue title*, so a sitewide
/// problem repeated on every page costs the same as it would on one page.
/// Broken links only dent best-practices, capped so a link-rotted site
/// cannot zero the category on its own.
pub fn score(issues: &[Issue], broken_link_count: usize) -> ScoreCard {
    let mut seo_titles: HashSet<&str> = HashSet::new();
    let mut performance_titles: HashSet<&str> = HashSet::new();
    let mut accessibility_titles: HashSet<&str> = HashSet::new();
    let mut security_titles: HashSet<&str> = HashSet::new();
    let mut mobile_titles: HashSet<&str> = HashSet::new();

    for issue in issues {
        match issue.category {
            IssueCategory::Seo => seo_titles.insert(issue.title.as_str()),
            IssueCategory::Performance => performance_titles.insert(issue.title.as_str()),
            IssueCategory::Accessibility => accessibility_titles.insert(issue.title.as_str()),
            IssueCategory::Security => security_titles.insert(issue.title.as_str()),
            IssueCategory::Mobile => mobile_titles.insert(issue.title.as_str()),
        };
    }

    let seo = 100_i64 - 20 * seo_titles.len() as i64;
    let performance = 100_i64 - 25 * performance_titles.len() as i64;
    let accessibility = 100_i64 - 20 * accessibility_titles.len() as i64;
    let broken_penalty = (2 * broken_link_count as i64).min(30);
    let best_practices = 100_i64
        - 15 * security_titles.len() as i64
        - 10 * mobile_titles.len() as i64
        - broken_penalty;

    let seo = seo.max(0) as u32;
    let performance = performance.max(0) as u32;
    let accessibility = accessibility.max(0) as u32;
    let best_practices = best_practices.max(0) as u32;

    let overall = (0.30 * performance as f64
        + 0.25 * seo as f64
        + 0.20 * accessibility as f64
        + 0.25 * best_practices as f64)
        .floor() as u32;

    ScoreCard {
        overall,
        performance,
        seo,
        accessibility,
        best_practices,
    }
}
