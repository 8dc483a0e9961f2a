//! Loader types
//!
//! Declarative export definition types for YAML parsing.

use crate::engine::ExportConfig;
use crate::http::{Credentials, RateLimiterConfig, DEFAULT_SITE};
use crate::mapping::{MappingRule, RecordErrorPolicy};
use crate::pagination::DEFAULT_PAGE_SIZE;
use crate::partition::{PartitionConfig, DEFAULT_MIN_SPAN_MS, DEFAULT_PARTITIONS};
use crate::types::FilterSpec;
use serde::{Deserialize, Serialize};
use std::time::Duration;

// ============================================================================
// Export Definition
// ============================================================================

/// Top-level export definition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ExportDefinition {
    /// Export name, also the default output file stem
    #[serde(default)]
    pub name: Option<String>,
    /// What to export and how
    pub spec: SpecDefinition,
}

/// Body of an export definition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SpecDefinition {
    /// Datadog credentials
    pub auth: AuthDefinition,
    /// Query and time range
    pub filter: FilterSpec,
    /// Output columns after the fixed ones
    #[serde(default)]
    pub mapping: Vec<MappingRule>,
    /// Fetch tuning
    #[serde(default)]
    pub export: ExportSettingsDefinition,
}

impl ExportDefinition {
    /// Default output file name: `<name>.csv`, or `output.csv` when unnamed
    pub fn default_output(&self) -> String {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => format!("{name}.csv"),
            _ => "output.csv".to_string(),
        }
    }

    /// Credentials for the HTTP client
    pub fn credentials(&self) -> Credentials {
        let auth = &self.spec.auth;
        Credentials::new(&auth.site, &auth.api_key, &auth.app_key)
    }

    /// Engine configuration
    pub fn export_config(&self) -> ExportConfig {
        self.spec.export.to_export_config()
    }

    /// Rate limiter configuration, `None` when disabled
    pub fn rate_limit(&self) -> Option<RateLimiterConfig> {
        self.spec.export.rate_limit.map(RateLimitDefinition::to_config)
    }
}

// ============================================================================
// Auth Definition
// ============================================================================

/// Datadog API credentials
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AuthDefinition {
    /// Datadog site
    #[serde(default = "default_site")]
    pub site: String,
    /// API key, may reference `${ENV_VAR}`
    pub api_key: String,
    /// Application key, may reference `${ENV_VAR}`
    pub app_key: String,
}

fn default_site() -> String {
    DEFAULT_SITE.to_string()
}

impl std::fmt::Debug for AuthDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthDefinition")
            .field("site", &self.site)
            .field("api_key", &"***")
            .field("app_key", &"***")
            .finish()
    }
}

// ============================================================================
// Export Settings
// ============================================================================

/// Fetch tuning, every field defaulted
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ExportSettingsDefinition {
    /// Records per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Partitions in parallel mode
    #[serde(default = "default_partitions")]
    pub partitions: usize,
    /// Ranges narrower than this run as a single partition
    #[serde(default = "default_min_span")]
    pub min_partition_span_ms: i64,
    /// Fixed delay before each sequential request
    #[serde(default)]
    pub pacing_delay_ms: u64,
    /// Shared request budget; `null` disables limiting
    #[serde(default = "default_rate_limit")]
    pub rate_limit: Option<RateLimitDefinition>,
    /// Record mapping failure policy
    #[serde(default)]
    pub on_record_error: RecordErrorPolicy,
    /// Concurrently running partitions, defaults to `partitions`
    #[serde(default)]
    pub max_concurrency: Option<usize>,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_partitions() -> usize {
    DEFAULT_PARTITIONS
}

fn default_min_span() -> i64 {
    DEFAULT_MIN_SPAN_MS
}

#[allow(clippy::unnecessary_wraps)]
fn default_rate_limit() -> Option<RateLimitDefinition> {
    Some(RateLimitDefinition::default())
}

impl Default for ExportSettingsDefinition {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            partitions: default_partitions(),
            min_partition_span_ms: default_min_span(),
            pacing_delay_ms: 0,
            rate_limit: default_rate_limit(),
            on_record_error: RecordErrorPolicy::default(),
            max_concurrency: None,
        }
    }
}

impl ExportSettingsDefinition {
    /// Convert to engine configuration
    pub fn to_export_config(&self) -> ExportConfig {
        ExportConfig::new()
            .with_page_size(self.page_size)
            .with_partition(PartitionConfig::new(
                self.partitions,
                self.min_partition_span_ms,
            ))
            .with_pacing_delay(Duration::from_millis(self.pacing_delay_ms))
            .with_max_concurrency(self.max_concurrency.unwrap_or(self.partitions))
            .with_record_error_policy(self.on_record_error)
    }
}

/// `requests` per `period_secs`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitDefinition {
    /// Requests per period
    pub requests: u32,
    /// Period length in seconds
    pub period_secs: u64,
}

impl Default for RateLimitDefinition {
    fn default() -> Self {
        let config = RateLimiterConfig::default();
        Self {
            requests: config.requests,
            period_secs: config.period.as_secs(),
        }
    }
}

impl RateLimitDefinition {
    /// Convert to limiter configuration
    pub fn to_config(self) -> RateLimiterConfig {
        RateLimiterConfig::new(self.requests, Duration::from_secs(self.period_secs))
    }
}
