use page_parser::PageDocument;

use crate::detector::{IssueDetector, PageContext};
use crate::issue::{Issue, IssueCategory, Severity};

const MAX_EXAMPLES: usize = 5;

/// Flags images without usable alt text. An empty `alt=""` is treated the
/// same as a missing attribute: both leave screen readers with nothing.
pub struct ImageAltDetector;

impl IssueDetector for ImageAltDetector {
    fn name(&self) -> &'static str {
        "image-accessibility"
    }

    fn check(&self, doc: &PageDocument, ctx: &PageContext) -> Vec<Issue> {
        let mut missing = 0usize;
        let mut examples = Vec::new();

        for image in doc.images() {
            if image.alt.as_deref().map_or(true, |alt| alt.is_empty()) {
                missing += 1;
                if examples.len() < MAX_EXAMPLES {
                    examples.push(image.src);
                }
            }
        }

        if missing == 0 {
            return Vec::new();
        }

        vec![Issue::new(
            Severity::Warning,
            IssueCategory::Accessibility,
            "Images missing alt attributes",
            &ctx.url,
            &ctx.page,
        )
        .with_details(format!("{} images without alt text", missing))
        .with_examples(examples)]
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
    fn test_all_images_with_alt_pass() {
        let html = r#"<body><img src="/a.png" alt="a"><img src="/b.png" alt="b"></body>"#;
        let issues = ImageAltDetector.check(&PageDocument::parse(html), &ctx());
        assert!(issues.is_empty());
    }

    #[test]
    fn test_missing_and_empty_alt_are_counted() {
        let html = r#"
            <body>
                <img src="/a.png">
                <img src="/b.png" alt="">
                <img src="/c.png" alt="fine">
            </body>
        "#;
        let issues = ImageAltDetector.check(&PageDocument::parse(html), &ctx());

        assert_eq!(issues.len(), 1);
        let issue = &issues[0];
        assert_eq!(issue.category, IssueCategory::Accessibility);
        assert_eq!(issue.details.as_deref(), Some("2 images without alt text"));
        assert_eq!(issue.examples, vec!["/a.png", "/b.png"]);
    }

    #[test]
    fn test_examples_are_capped_at_five() {
        let imgs: String = (0..8).map(|i| format!("<img src=\"/{}.png\">", i)).collect();
        let issues = ImageAltDetector.check(&PageDocument::parse(&imgs), &ctx());

        assert_eq!(issues[0].examples.len(), 5);
        assert_eq!(
            issues[0].details.as_deref(),
            Some("8 images without alt text")
        );
    }
}
