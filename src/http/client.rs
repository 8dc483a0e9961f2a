//! Datadog Logs Search API client
//!
//! Implements `PageSource` on top of `POST /api/v2/logs/events/search`.
//! Requests are never retried: any non-success status or transport
//! failure is returned to the fetch loop as-is.

use crate::error::{Error, Result};
use crate::pagination::PageSource;
use crate::types::{FilterSpec, JsonObject, Page, Record};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default Datadog site
pub const DEFAULT_SITE: &str = "datadoghq.com";

const SEARCH_PATH: &str = "api/v2/logs/events/search";

/// API credentials, passed explicitly to the client
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Datadog site (e.g. `datadoghq.eu`)
    pub site: String,
    /// API key
    pub api_key: String,
    /// Application key
    pub app_key: String,
}

impl Credentials {
    /// Create credentials
    pub fn new(
        site: impl Into<String>,
        api_key: impl Into<String>,
        app_key: impl Into<String>,
    ) -> Self {
        Self {
            site: site.into(),
            api_key: api_key.into(),
            app_key: app_key.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("site", &self.site)
            .field("api_key", &"***")
            .field("app_key", &"***")
            .finish()
    }
}

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct LogsClientConfig {
    /// Override for `https://api.<site>` (tests, proxies)
    pub base_url: Option<String>,
    /// Request timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
}

impl Default for LogsClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(60),
            user_agent: format!("dd-export/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl LogsClientConfig {
    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Client for the Logs Search API
pub struct LogsClient {
    client: Client,
    endpoint: Url,
    credentials: Credentials,
}

impl LogsClient {
    /// Create a client with default configuration
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::with_config(credentials, LogsClientConfig::default())
    }

    /// Create a client with custom configuration
    pub fn with_config(credentials: Credentials, config: LogsClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        let base = match &config.base_url {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => {
                let site = if credentials.site.is_empty() {
                    DEFAULT_SITE
                } else {
                    credentials.site.as_str()
                };
                format!("https://api.{site}")
            }
        };
        let endpoint = Url::parse(&format!("{base}/"))?.join(SEARCH_PATH)?;

        Ok(Self {
            client,
            endpoint,
            credentials,
        })
    }

    /// The search endpoint this client posts to
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl std::fmt::Debug for LogsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogsClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl PageSource for LogsClient {
    async fn fetch(
        &self,
        filter: &FilterSpec,
        cursor: Option<&str>,
        page_size: usize,
    ) -> Result<Page> {
        let body = SearchRequest {
            filter: SearchFilter {
                query: &filter.query,
                from: filter.from.to_string(),
                to: filter.to.to_string(),
            },
            page: SearchPage {
                limit: page_size,
                cursor,
            },
            sort: "timestamp",
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .header("DD-API-KEY", self.credentials.api_key.as_str())
            .header("DD-APPLICATION-KEY", self.credentials.app_key.as_str())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::http_status(status.as_u16(), body));
        }

        let parsed: SearchResponse = response.json().await?;
        debug!(
            "Request succeeded: POST {} ({} events)",
            self.endpoint,
            parsed.data.len()
        );
        Ok(parsed.into_page())
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    filter: SearchFilter<'a>,
    page: SearchPage<'a>,
    sort: &'static str,
}

#[derive(Debug, Serialize)]
struct SearchFilter<'a> {
    query: &'a str,
    from: String,
    to: String,
}

#[derive(Debug, Serialize)]
struct SearchPage<'a> {
    limit: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    cursor: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<LogEvent>,
    #[serde(default)]
    meta: Option<ResponseMeta>,
}

#[derive(Debug, Deserialize)]
struct LogEvent {
    #[serde(default)]
    id: Option<String>,
    attributes: LogAttributes,
}

#[derive(Debug, Deserialize)]
struct LogAttributes {
    timestamp: DateTime<Utc>,
    #[serde(default)]
    service: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    attributes: JsonObject,
}

#[derive(Debug, Deserialize)]
struct ResponseMeta {
    #[serde(default)]
    page: Option<ResponsePage>,
}

#[derive(Debug, Deserialize)]
struct ResponsePage {
    #[serde(default)]
    after: Option<String>,
}

impl SearchResponse {
    fn into_page(self) -> Page {
        let next_cursor = self.meta.and_then(|m| m.page).and_then(|p| p.after);
        let records = self
            .data
            .into_iter()
            .map(|event| Record {
                id: event.id,
                timestamp: event.attributes.timestamp,
                service: event.attributes.service,
                status: event.attributes.status,
                message: event.attributes.message,
                attributes: event.attributes.attributes,
            })
            .collect();

        Page {
            records,
            next_cursor,
        }
    }
}
