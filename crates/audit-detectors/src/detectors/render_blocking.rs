use page_parser::PageDocument;

use crate::detector::{IssueDetector, PageContext};
use crate::issue::{Issue, IssueCategory, Severity};

const MAX_BLOCKING_STYLESHEETS: usize = 2;
const MAX_BLOCKING_SCRIPTS: usize = 1;

/// Counts render-blocking resources: stylesheets without a `media` attribute
/// and external scripts carrying neither `async` nor `defer`.
pub struct RenderBlockingDetector;

impl IssueDetector for RenderBlockingDetector {
    fn name(&self) -> &'static str {
        "render-blocking-resources"
    }

    fn check(&self, doc: &PageDocument, ctx: &PageContext) -> Vec<Issue> {
        let mut issues = Vec::new();

        let blocking_css = doc
            .stylesheets()
            .iter()
            .filter(|sheet| sheet.media.is_none())
            .count();
        if blocking_css > MAX_BLOCKING_STYLESHEETS {
            issues.push(
                Issue::new(
                    Severity::Critical,
                    IssueCategory::Performance,
                    "Multiple render-blocking CSS files",
                    &ctx.url,
                    &ctx.page,
                )
                .with_details(format!("{} CSS files blocking render", blocking_css))
                .with_fix("Consider inlining critical CSS and deferring non-critical styles"),
            );
        }

        let blocking_scripts = doc
            .scripts()
            .iter()
            .filter(|script| !script.is_async && !script.is_deferred)
            .count();
        if blocking_scripts > MAX_BLOCKING_SCRIPTS {
            issues.push(
                Issue::new(
                    Severity::Critical,
                    IssueCategory::Performance,
                    "Render-blocking JavaScript",
                    &ctx.url,
                    &ctx.page,
                )
                .with_details(format!("{} scripts without async/defer", blocking_scripts))
                .with_fix("Add async or defer attributes to script tags"),
            );
        }

        issues
    }
}
