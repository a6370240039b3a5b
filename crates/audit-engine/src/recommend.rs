use std::collections::HashSet;

use audit_detectors::{Issue, IssueCategory};
use serde::{Deserialize, Serialize};

use crate::crawler::BrokenLink;

const MAX_BROKEN_LINK_URLS: usize = 10;
const MAX_EXAMPLE_URLS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationPriority {
    Critical,
    Warning,
}

/// One sitewide remediation item, aggregated from the per-page findings of a
/// single category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub priority: RecommendationPriority,
    pub category: String,
    pub title: String,
    pub description: String,
    /// Distinct problem count, not total occurrences. For broken links, the
    /// number of broken URLs.
    pub affected_count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub affected_urls: Vec<String>,
    pub recommendation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_suggestion: Option<String>,
}

struct CategoryRollup {
    titles: HashSet<String>,
    example_urls: Vec<String>,
}

impl CategoryRollup {
    fn new() -> Self {
        Self {
            titles: HashSet::new(),
            example_urls: Vec::new(),
        }
    }

    fn record(&mut self, issue: &Issue) {
        self.titles.insert(issue.title.clone());
        if self.example_urls.len() < MAX_EXAMPLE_URLS {
            self.example_urls.push(issue.url.clone());
        }
    }
}

/// Builds the recommendation list in fixed priority order: broken links
/// first, then SEO, performance, security, accessibility. Categories with no
/// findings produce no entry; mobile findings only affect the score.
pub fn build_recommendations(issues: &[Issue], broken_links: &[BrokenLink]) -> Vec<Recommendation> {
    let mut seo = CategoryRollup::new();
    let mut performance = CategoryRollup::new();
    let mut security = CategoryRollup::new();
    let mut accessibility = CategoryRollup::new();

    for issue in issues {
        match issue.category {
            IssueCategory::Seo => seo.record(issue),
            IssueCategory::Performance => performance.record(issue),
            IssueCategory::Security => security.record(issue),
            IssueCategory::Accessibility => accessibility.record(issue),
            IssueCategory::Mobile => {}
        }
    }

    let mut recommendations = Vec::new();

    if !broken_links.is_empty() {
        recommendations.push(Recommendation {
            priority: RecommendationPriority::Critical,
            category: "Broken Links".to_string(),
            title: format!("{} broken links found", broken_links.len()),
            description: "Multiple pages are linking to non-existent resources".to_string(),
            affected_count: broken_links.len(),
            affected_urls: broken_links
                .iter()
                .take(MAX_BROKEN_LINK_URLS)
                .map(|link| link.url.clone())
                .collect(),
            recommendation: "Update or remove broken links. Set up proper 301 redirects for \
                             moved content. Check the broken links list for specific URLs to fix."
                .to_string(),
            ai_suggestion: None,
        });
    }

    if !seo.titles.is_empty() {
        recommendations.push(Recommendation {
            priority: RecommendationPriority::Warning,
            category: "SEO".to_string(),
            title: format!("{} SEO issues found", seo.titles.len()),
            description: "Missing or suboptimal meta tags and heading structure".to_string(),
            affected_count: seo.titles.len(),
            affected_urls: seo.example_urls,
            recommendation: "Add unique meta descriptions to all pages, optimize title tags \
                             (keep under 60 characters), ensure proper heading hierarchy with \
                             single H1 per page"
                .to_string(),
            ai_suggestion: None,
        });
    }

    if !performance.titles.is_empty() {
        recommendations.push(Recommendation {
            priority: RecommendationPriority::Critical,
            category: "Performance".to_string(),
            title: format!("{} performance issues found", performance.titles.len()),
            description: "Render-blocking resources detected that slow down page load".to_string(),
            affected_count: performance.titles.len(),
            affected_urls: performance.example_urls,
            recommendation: "Defer non-critical CSS/JS, add async/defer attributes to scripts, \
                             consider inlining critical CSS, implement lazy loading for images"
                .to_string(),
            ai_suggestion: None,
        });
    }

    if !security.titles.is_empty() {
        recommendations.push(Recommendation {
            priority: RecommendationPriority::Critical,
            category: "Security".to_string(),
            title: format!("{} security issues found", security.titles.len()),
            description: "Missing security headers leave site vulnerable".to_string(),
            affected_count: security.titles.len(),
            // Header problems are sitewide server configuration, so no
            // per-URL examples.
            affected_urls: Vec::new(),
            recommendation: "Configure server to include security headers: \
                             X-Content-Type-Options: nosniff, X-Frame-Options: SAMEORIGIN, \
                             Strict-Transport-Security, Content-Security-Policy"
                .to_string(),
            ai_suggestion: None,
        });
    }

    if !accessibility.titles.is_empty() {
        recommendations.push(Recommendation {
            priority: RecommendationPriority::Warning,
            category: "Accessibility".to_string(),
            title: format!("{} accessibility issues found", accessibility.titles.len()),
            description: "Images missing alt text, affecting screen reader users".to_string(),
            affected_count: accessibility.titles.len(),
            affected_urls: accessibility.example_urls,
            recommendation: "Add descriptive alt text to all images, ensure proper color \
                             contrast, make interactive elements keyboard accessible"
                .to_string(),
            ai_suggestion: None,
        });
    }

    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::BrokenLinkStatus;
    use audit_detectors::Severity;

    fn issue(category: IssueCategory, title: &str, url: &str) -> Issue {
        Issue::new(Severity::Warning, category, title, url, "/")
    }

    fn broken(url: &str) -> BrokenLink {
        BrokenLink {
            url: url.to_string(),
            status: BrokenLinkStatus::Http(404),
            page: "/".to_string(),
            error: "HTTP 404 error".to_string(),
        }
    }

    #[test]
    fn test_clean_site_has_no_recommendations() {
        assert!(build_recommendations(&[], &[]).is_empty());
    }

    #[test]
    fn test_fixed_category_order() {
        let issues = vec![
            issue(IssueCategory::Accessibility, "a", "https://example.com/1"),
            issue(IssueCategory::Security, "s", "https://example.com/1"),
            issue(IssueCategory::Seo, "t", "https://example.com/1"),
            issue(IssueCategory::Performance, "p", "https://example.com/1"),
        ];
        let broken_links = vec![broken("https://example.com/dead")];

        let recs = build_recommendations(&issues, &broken_links);
        let categories: Vec<&str> = recs.iter().map(|r| r.category.as_str()).collect();
        assert_eq!(
            categories,
            vec![
                "Broken Links",
                "SEO",
                "Performance",
                "Security",
                "Accessibility"
            ]
        );
    }

    #[test]
    fn test_counts_are_distinct_titles() {
        let issues = vec![
            issue(IssueCategory::Seo, "Missing page title", "https://a/1"),
            issue(IssueCategory::Seo, "Missing page title", "https://a/2"),
            issue(IssueCategory::Seo, "Missing meta description", "https://a/1"),
        ];

        let recs = build_recommendations(&issues, &[]);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].affected_count, 2);
        assert_eq!(recs[0].title, "2 SEO issues found");
        // Example URLs track occurrences, not distinct titles.
        assert_eq!(recs[0].affected_urls.len(), 3);
    }

    #[test]
    fn test_broken_link_urls_cap_at_ten() {
        let broken_links: Vec<BrokenLink> = (0..25)
            .map(|i| broken(&format!("https://example.com/dead{}", i)))
            .collect();

        let recs = build_recommendations(&[], &broken_links);
        assert_eq!(recs[0].title, "25 broken links found");
        assert_eq!(recs[0].affected_count, 25);
        assert_eq!(recs[0].affected_urls.len(), 10);
    }

    #[test]
    fn test_example_urls_cap_at_five() {
        let issues: Vec<Issue> = (0..8)
            .map(|i| {
                issue(
                    IssueCategory::Accessibility,
                    "Images missing alt attributes",
                    &format!("https://example.com/p{}", i),
                )
            })
            .collect();

        let recs = build_recommendations(&issues, &[]);
        assert_eq!(recs[0].affected_urls.len(), 5);
    }

    #[test]
    fn test_mobile_issues_produce_no_entry() {
        let issues = vec![issue(
            IssueCategory::Mobile,
            "Missing viewport meta tag",
            "https://example.com/",
        )];
        assert!(build_recommendations(&issues, &[]).is_empty());
    }

    #[test]
    fn test_security_entry_has_no_urls() {
        let issues = vec![issue(
            IssueCategory::Security,
            "Missing security header: X-Frame-Options",
            "https://example.com/",
        )];
        let recs = build_recommendations(&issues, &[]);
        assert!(recs[0].affected_urls.is_empty());
        assert_eq!(recs[0].priority, RecommendationPriority::Critical);
    }
}
