pub mod document;
pub mod links;

pub use document::{ImageTag, PageDocument, ScriptTag, StylesheetTag};
pub use links::{classify_href, page_path, ClassifiedLink, LinkError, SiteIdentity};
