use page_parser::PageDocument;

use crate::detector::{IssueDetector, PageContext};
use crate::issue::{Issue, IssueCategory, Severity};

/// Checks for the viewport meta tag, the minimum signal that a page renders
/// at device width on mobile.
pub struct MobileViewportDetector;

impl IssueDetector for MobileViewportDetector {
    fn name(&self) -> &'static str {
        "mobile-viewport"
    }

    fn check(&self, doc: &PageDocument, ctx: &PageContext) -> Vec<Issue> {
        if doc.viewport().is_some() {
            return Vec::new();
        }

        vec![Issue::new(
            Severity::Warning,
            IssueCategory::Mobile,
            "Missing viewport meta tag",
            &ctx.url,
            &ctx.page,
        )
        .with_fix("Add <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">")]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderMap;

    fn ctx() -> PageContext {
        PageContext::new("https://example.com/", "/", HeaderMap::new())
    }

    #[test]
    fn test_viewport_present() {
        let html = r#"<head><meta name="viewport" content="width=device-width"></head>"#;
        assert!(MobileViewportDetector
            .check(&PageDocument::parse(html), &ctx())
            .is_empty());
    }

    #[test]
    fn test_viewport_absent() {
        let issues = MobileViewportDetector.check(&PageDocument::parse("<head></head>"), &ctx());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].title, "Missing viewport meta tag");
        assert_eq!(issues[0].category, IssueCategory::Mobile);
        assert_eq!(issues[0].severity, Severity::Warning);
    }
}
