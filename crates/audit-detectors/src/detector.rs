use page_parser::PageDocument;
use reqwest::header::HeaderMap;

use crate::detectors::{
    images::ImageAltDetector, mobile::MobileViewportDetector,
    render_blocking::RenderBlockingDetector, security_headers::SecurityHeadersDetector,
    seo_elements::SeoElementsDetector,
};
use crate::issue::Issue;

/// Per-page inputs shared by every detector: the page's URL, its path
/// relative to the audit base, and the response headers (case-insensitive
/// lookup, consumed by the security-header detector only).
#[derive(Debug, Clone)]
pub struct PageContext {
    pub url: String,
    pub page: String,
    pub headers: HeaderMap,
}

impl PageContext {
    pub fn new(url: impl Into<String>, page: impl Into<String>, headers: HeaderMap) -> Self {
        Self {
            url: url.into(),
            page: page.into(),
            headers,
        }
    }
}

/// A pure analysis pass over one fetched page.
///
/// Detectors must tolerate absent or malformed elements: a page missing every
/// tag of interest yields the documented absence-findings, never a panic.
pub trait IssueDetector: Send + Sync {
    fn name(&self) -> &'static str;
    fn check(&self, doc: &PageDocument, ctx: &PageContext) -> Vec<Issue>;
}

/// The full detector set, in dispatch order. The set is closed; there is no
/// dynamic registration.
pub fn default_detectors() -> Vec<Box<dyn IssueDetector>> {
    vec![
        Box::new(SeoElementsDetector),
        Box::new(ImageAltDetector),
        Box::new(SecurityHeadersDetector),
        Box::new(MobileViewportDetector),
        Box::new(RenderBlockingDetector),
    ]
}
