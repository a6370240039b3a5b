use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

static TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("title").unwrap());
static META_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("meta").unwrap());
static LINK_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("link").unwrap());
static H1_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").unwrap());
static IMG_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("img").unwrap());
static SCRIPT_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("script[src]").unwrap());
static ANCHOR_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageTag {
    pub src: String,
    pub alt: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StylesheetTag {
    pub href: String,
    pub media: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptTag {
    pub src: String,
    pub is_async: bool,
    pub is_deferred: bool,
}

/// A parsed HTML page.
///
/// Wraps the document tree and exposes the handful of extractions the audit
/// detectors need. Parsing is lenient: malformed markup still yields a tree,
/// and every extractor returns an empty/absent value rather than failing when
/// the element of interest is missing.
pub struct PageDocument {
    document: Html,
}

impl PageDocument {
    pub fn parse(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }

    /// Text content of the first `<title>` element, if any.
    pub fn title(&self) -> Option<String> {
        self.document
            .select(&TITLE_SELECTOR)
            .next()
            .map(|el| el.text().collect::<String>())
    }

    /// `content` attribute of `<meta name="description">`, if present.
    pub fn meta_description(&self) -> Option<String> {
        self.named_meta_content("description")
    }

    /// `content` attribute of `<meta name="viewport">`, if present.
    pub fn viewport(&self) -> Option<String> {
        self.named_meta_content("viewport")
    }

    fn named_meta_content(&self, name: &str) -> Option<String> {
        self.document
            .select(&META_SELECTOR)
            .find(|meta| meta.value().attr("name") == Some(name))
            .and_then(|meta| meta.value().attr("content"))
            .map(|s| s.to_string())
    }

    /// `href` of `<link rel="canonical">`, if present.
    pub fn canonical(&self) -> Option<String> {
        self.document
            .select(&LINK_SELECTOR)
            .find(|link| link.value().attr("rel") == Some("canonical"))
            .map(|link| link.value().attr("href").unwrap_or_default().to_string())
    }

    pub fn h1_count(&self) -> usize {
        self.document.select(&H1_SELECTOR).count()
    }

    pub fn images(&self) -> Vec<ImageTag> {
        self.document
            .select(&IMG_SELECTOR)
            .map(|img| ImageTag {
                src: img.value().attr("src").unwrap_or("unknown").to_string(),
                alt: img.value().attr("alt").map(|s| s.to_string()),
            })
            .collect()
    }

    pub fn stylesheets(&self) -> Vec<StylesheetTag> {
        self.document
            .select(&LINK_SELECTOR)
            .filter(|link| link.value().attr("rel") == Some("stylesheet"))
            .map(|link| StylesheetTag {
                href: link.value().attr("href").unwrap_or_default().to_string(),
                media: link.value().attr("media").map(|s| s.to_string()),
            })
            .collect()
    }

    /// All `<script src=...>` elements. Inline scripts never block on a
    /// network request, so they are not reported here.
    pub fn scripts(&self) -> Vec<ScriptTag> {
        self.document
            .select(&SCRIPT_SELECTOR)
            .map(|script| ScriptTag {
                src: script.value().attr("src").unwrap_or_default().to_string(),
                is_async: script.value().attr("async").is_some(),
                is_deferred: script.value().attr("defer").is_some(),
            })
            .collect()
    }

    /// Raw `href` values of every anchor, in document order.
    pub fn anchor_hrefs(&self) -> Vec<String> {
        self.document
            .select(&ANCHOR_SELECTOR)
            .filter_map(|a| a.value().attr("href"))
            .map(|s| s.to_string())
            .collect()
    }
}
