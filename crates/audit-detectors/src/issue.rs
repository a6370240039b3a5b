use serde::{Deserialize, Serialize};

/// Severity level of an audit finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

/// The closed set of finding categories. Severity and category are
/// independent axes: every Security finding is critical, while SEO findings
/// range from warning to info depending on the rule that fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueCategory {
    #[serde(rename = "SEO")]
    Seo,
    Accessibility,
    Security,
    Performance,
    Mobile,
}

/// One finding on one page. Append-only: detectors produce issues, nothing
/// mutates them afterwards. The serialized field names are part of the stable
/// report shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    #[serde(rename = "type")]
    pub severity: Severity,
    pub category: IssueCategory,
    pub title: String,
    pub url: String,
    pub page: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
    /// Free-text remediation from an attached suggestion provider, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_example: Option<String>,
}

impl Issue {
    pub fn new(
        severity: Severity,
        category: IssueCategory,
        title: impl Into<String>,
        url: impl Into<String>,
        page: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category,
            title: title.into(),
            url: url.into(),
            page: page.into(),
            current: None,
            fix: None,
            details: None,
            examples: Vec::new(),
            ai_example: None,
        }
    }

    pub fn with_current(mut self, current: impl Into<String>) -> Self {
        self.current = Some(current.into());
        self
    }

    pub fn with_fix(mut self, fix: impl Into<String>) -> Self {
        self.fix = Some(fix.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_examples(mut self, examples: Vec<String>) -> Self {
        self.examples = examples;
        self
    }
}
