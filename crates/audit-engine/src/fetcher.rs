use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, LOCATION};
use reqwest::{redirect::Policy, Client};
use thiserror::Error;
use url::Url;

use crate::config::AuditConfig;

const MAX_REDIRECT_HOPS: usize = 10;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}: {message}")]
    Connect { url: String, message: String },

    #[error("Too many redirects from {url}")]
    TooManyRedirects { url: String },

    #[error("Redirect loop detected at {url}")]
    RedirectLoop { url: String },

    #[error("Failed to fetch {url}: {message}")]
    Other { url: String, message: String },
}

/// One fully-resolved response, the shape every fetch backend produces.
/// `redirect_chain` holds the status codes of the intermediate hops, in
/// order, and is empty when the URL answered directly.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub final_url: String,
    pub status: u16,
    pub body: Vec<u8>,
    pub headers: HeaderMap,
    pub redirect_chain: Vec<u16>,
}

/// Pluggable page transport. The engine only sees this contract, so a plain
/// HTTP client and a scripted-browser backend are interchangeable.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

/// Plain HTTP fetcher. Redirects are followed manually so the intermediate
/// status-code chain stays observable; reqwest's automatic policy discards
/// the hop statuses.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &AuditConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .redirect(Policy::none())
            .build()?;
        Ok(Self { client })
    }

    fn classify(url: &str, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else if error.is_connect() {
            FetchError::Connect {
                url: url.to_string(),
                message: error.to_string(),
            }
        } else {
            FetchError::Other {
                url: url.to_string(),
                message: error.to_string(),
            }
        }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let mut current = url.to_string();
        let mut chain: Vec<u16> = Vec::new();
        let mut seen: HashSet<String> = HashSet::from([current.clone()]);

        for _ in 0..=MAX_REDIRECT_HOPS {
            let response = self
                .client
                .get(&current)
                .send()
                .await
                .map_err(|e| Self::classify(url, e))?;
            let status = response.status();

            if status.is_redirection() {
                let location = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .map(|s| s.to_string());
                if let Some(location) = location {
                    let next = Url::parse(&current)
                        .and_then(|base| base.join(&location))
                        .map_err(|e| FetchError::Other {
                            url: url.to_string(),
                            message: format!("bad redirect target {}: {}", location, e),
                        })?;
                    chain.push(status.as_u16());
                    let next = next.to_string();
                    if !seen.insert(next.clone()) {
                        return Err(FetchError::RedirectLoop {
                            url: url.to_string(),
                        });
                    }
                    tracing::debug!(from = %current, to = %next, status = status.as_u16(), "following redirect");
                    current = next;
                    continue;
                }
                // Redirect status without a Location header: treat as final.
            }

            let final_url = response.url().to_string();
            let headers = response.headers().clone();
            let body = response
                .bytes()
                .await
                .map_err(|e| Self::classify(url, e))?
                .to_vec();

            return Ok(FetchedPage {
                final_url,
                status: status.as_u16(),
                body,
                headers,
                redirect_chain: chain,
            });
        }

        Err(FetchError::TooManyRedirects {
            url: url.to_string(),
        })
    }
}
