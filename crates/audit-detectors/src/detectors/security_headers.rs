use page_parser::PageDocument;

use crate::detector::{IssueDetector, PageContext};
use crate::issue::{Issue, IssueCategory, Severity};

/// Headers every response is expected to carry. Absence of any one of them
/// is a critical finding.
const REQUIRED_HEADERS: [&str; 4] = [
    "X-Content-Type-Options",
    "X-Frame-Options",
    "X-XSS-Protection",
    "Strict-Transport-Security",
];

/// The only detector driven by response headers rather than markup.
pub struct SecurityHeadersDetector;

impl IssueDetector for SecurityHeadersDetector {
    fn name(&self) -> &'static str {
        "security-headers"
    }

    fn check(&self, _doc: &PageDocument, ctx: &PageContext) -> Vec<Issue> {
        REQUIRED_HEADERS
            .iter()
            .filter(|header| !ctx.headers.contains_key(**header))
            .map(|header| {
                Issue::new(
                    Severity::Critical,
                    IssueCategory::Security,
                    format!("Missing security header: {}", header),
                    &ctx.url,
                    &ctx.page,
                )
                .with_fix(format!("Add {} header to server configuration", header))
            })
            .collect()
    }
}
