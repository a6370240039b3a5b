use page_parser::SiteIdentity;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

const DEFAULT_MAX_PAGES: usize = 50;
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Website Audit Tool)";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid seed URL: {0}")]
    InvalidSeedUrl(String),

    #[error("Page budget must be greater than zero")]
    ZeroPageBudget,
}

/// Audit parameters. Validated once into a [`CrawlTarget`] before the crawl
/// starts; an invalid seed URL or empty page budget is fatal and the crawl
/// never begins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    pub base_url: String,
    pub max_pages: usize,
    pub fetch_timeout_secs: u64,
    pub user_agent: String,
}

impl AuditConfig {
    pub fn new(base_url: impl Into<String>, max_pages: usize) -> Self {
        Self {
            base_url: base_url.into(),
            max_pages,
            fetch_timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    pub fn target(&self) -> Result<CrawlTarget, ConfigError> {
        if self.max_pages == 0 {
            return Err(ConfigError::ZeroPageBudget);
        }

        let base_url = Url::parse(&self.base_url)
            .map_err(|e| ConfigError::InvalidSeedUrl(format!("{}: {}", self.base_url, e)))?;
        match base_url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(ConfigError::InvalidSeedUrl(format!(
                    "{}: unsupported scheme {}",
                    self.base_url, other
                )))
            }
        }
        let site = SiteIdentity::from_url(&base_url)
            .map_err(|e| ConfigError::InvalidSeedUrl(e.to_string()))?;

        Ok(CrawlTarget {
            base_str: self.base_url.trim_end_matches('/').to_string(),
            base_url,
            site,
            max_pages: self.max_pages,
        })
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self::new("", DEFAULT_MAX_PAGES)
    }
}

/// Immutable identity of one audit run.
#[derive(Debug, Clone)]
pub struct CrawlTarget {
    pub base_url: Url,
    /// Seed URL as given, trailing slash trimmed; page paths are derived by
    /// stripping this prefix.
    pub base_str: String,
    pub site: SiteIdentity,
    pub max_pages: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config_builds_target() {
        let target = AuditConfig::new("https://www.example.com/", 25)
            .target()
            .unwrap();

        assert_eq!(target.base_str, "https://www.example.com");
        assert_eq!(target.max_pages, 25);
        assert!(target.site.is_same_site("example.com"));
        assert!(target.site.is_same_site("www.example.com"));
    }

    #[test]
    fn test_invalid_seed_url_is_fatal() {
        assert!(matches!(
            AuditConfig::new("not a url", 10).target(),
            Err(ConfigError::InvalidSeedUrl(_))
        ));
        assert!(matches!(
            AuditConfig::new("ftp://example.com", 10).target(),
            Err(ConfigError::InvalidSeedUrl(_))
        ));
    }

    #[test]
    fn test_zero_budget_is_fatal() {
        assert!(matches!(
            AuditConfig::new("https://example.com", 0).target(),
            Err(ConfigError::ZeroPageBudget)
        ));
    }
}
