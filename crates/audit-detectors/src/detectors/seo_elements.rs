use page_parser::PageDocument;

use crate::detector::{IssueDetector, PageContext};
use crate::issue::{Issue, IssueCategory, Severity};

const MAX_TITLE_CHARS: usize = 60;

/// Checks the on-page SEO fundamentals: title, meta description, H1
/// structure and canonical link.
pub struct SeoElementsDetector;

impl IssueDetector for SeoElementsDetector {
    fn name(&self) -> &'static str {
        "seo-elements"
    }

    fn check(&self, doc: &PageDocument, ctx: &PageContext) -> Vec<Issue> {
        let mut issues = Vec::new();

        match doc.title().filter(|t| !t.is_empty()) {
            None => issues.push(
                Issue::new(
                    Severity::Warning,
                    IssueCategory::Seo,
                    "Missing page title",
                    &ctx.url,
                    &ctx.page,
                )
                .with_current("None")
                .with_fix("Add a <title> tag with 50-60 characters"),
            ),
            Some(title) => {
                let chars = title.chars().count();
                if chars > MAX_TITLE_CHARS {
                    let head: String = title.chars().take(MAX_TITLE_CHARS).collect();
                    issues.push(
                        Issue::new(
                            Severity::Info,
                            IssueCategory::Seo,
                            "Page title too long",
                            &ctx.url,
                            &ctx.page,
                        )
                        .with_current(format!("\"{}...\" ({} chars)", head, chars))
                        .with_fix("Shorten to under 60 characters"),
                    );
                }
            }
        }

        let description_missing = doc
            .meta_description()
            .map_or(true, |content| content.is_empty());
        if description_missing {
            issues.push(
                Issue::new(
                    Severity::Warning,
                    IssueCategory::Seo,
                    "Missing meta description",
                    &ctx.url,
                    &ctx.page,
                )
                .with_current("None")
                .with_fix("Add <meta name=\"description\" content=\"...\"> with 150-160 characters"),
            );
        }

        match doc.h1_count() {
            0 => issues.push(
                Issue::new(
                    Severity::Warning,
                    IssueCategory::Seo,
                    "No H1 tag found",
                    &ctx.url,
                    &ctx.page,
                )
                .with_current("None")
                .with_fix("Add one <h1> tag that describes the main topic"),
            ),
            1 => {}
            count => issues.push(
                Issue::new(
                    Severity::Info,
                    IssueCategory::Seo,
                    "Multiple H1 tags",
                    &ctx.url,
                    &ctx.page,
                )
                .with_current(format!("{} H1 tags found", count))
                .with_fix("Use only one H1 per page. Change extras to H2 or H3"),
            ),
        }

        if doc.canonical().is_none() {
            issues.push(
                Issue::new(
                    Severity::Info,
                    IssueCategory::Seo,
                    "Missing canonical tag",
                    &ctx.url,
                    &ctx.page,
                )
                .with_current("None")
                .with_fix("Add <link rel=\"canonical\" href=\"...\"> to prevent duplicate content issues"),
            );
        }

        issues
    }
}
