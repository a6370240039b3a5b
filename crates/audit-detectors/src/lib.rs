pub mod detector;
pub mod detectors;
pub mod issue;

pub use detector::{default_detectors, IssueDetector, PageContext};
pub use issue::{Issue, IssueCategory, Severity};
