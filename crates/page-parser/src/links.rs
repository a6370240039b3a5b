use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("URL has no host: {0}")]
    MissingHost(String),
}

/// Host identity of the site being audited.
///
/// Navigation within one logical site routinely crosses the leading-`www`
/// boundary, so both spellings of the seed host are treated as the same site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteIdentity {
    bare_host: String,
    www_host: String,
}

impl SiteIdentity {
    pub fn from_url(url: &Url) -> Result<Self, LinkError> {
        let host = url
            .host_str()
            .ok_or_else(|| LinkError::MissingHost(url.to_string()))?
            .to_ascii_lowercase();
        let bare_host = host.strip_prefix("www.").unwrap_or(&host).to_string();
        let www_host = format!("www.{}", bare_host);
        Ok(Self {
            bare_host,
            www_host,
        })
    }

    pub fn is_same_site(&self, host: &str) -> bool {
        let host = host.to_ascii_lowercase();
        host == self.bare_host || host == self.www_host
    }
}

/// Outcome of resolving one anchor `href` against the page it appeared on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifiedLink {
    /// Same-site link, eligible for further crawling.
    Internal(Url),
    /// Resolvable link pointing off-site. Recorded, never fetched.
    External(Url),
    /// Non-navigational: fragment link, pseudo-scheme, or unresolvable href.
    Ignored,
}

/// Resolves `href` relative to `page_url` and classifies it.
///
/// Mirrors browser navigation rules only as far as the crawl needs them:
/// `javascript:`, `mailto:` and `tel:` hrefs never produce a page, and links
/// carrying a fragment are dropped entirely rather than stripped, since they
/// target a position inside a page the crawl will reach through its plain URL.
pub fn classify_href(href: &str, page_url: &Url, site: &SiteIdentity) -> ClassifiedLink {
    let trimmed = href.trim();
    if trimmed.starts_with("javascript:")
        || trimmed.starts_with("mailto:")
        || trimmed.starts_with("tel:")
    {
        return ClassifiedLink::Ignored;
    }

    let resolved = match page_url.join(trimmed) {
        Ok(url) => url,
        Err(_) => return ClassifiedLink::Ignored,
    };

    if resolved.fragment().map_or(false, |f| !f.is_empty()) {
        return ClassifiedLink::Ignored;
    }
    match resolved.scheme() {
        "http" | "https" => {}
        _ => return ClassifiedLink::Ignored,
    }

    match resolved.host_str() {
        Some(host) if site.is_same_site(host) => ClassifiedLink::Internal(resolved),
        Some(_) => ClassifiedLink::External(resolved),
        None => ClassifiedLink::Ignored,
    }
}

/// Page path relative to the audit base URL, `"/"` for the base itself.
pub fn page_path(url: &str, base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let stripped = url.strip_prefix(base).unwrap_or(url);
    if stripped.is_empty() {
        "/".to_string()
    } else {
        stripped.to_string()
    }
}
