//! Client configuration
//!
//! Programmatic settings for the API client plus the optional YAML config
//! file the CLI can load. File values act as defaults; command-line flags
//! always win.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::error::{Error, Result, ResultExt};
use crate::types::AccessToken;

/// Default Graph API endpoint
pub const DEFAULT_BASE_URL: &str = "https://graph.facebook.com";

// ============================================================================
// Retry Policy
// ============================================================================

/// Retry behavior for a single logical fetch
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the initial attempt
    pub max_retries: u32,
    /// Fixed delay between attempts
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Total attempts including the initial call
    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }
}

// ============================================================================
// Client Config
// ============================================================================

/// Configuration for the API client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL for all requests
    pub base_url: String,
    /// API version path segment, e.g. "v19.0" (the API picks its default when absent)
    pub api_version: Option<String>,
    /// Request timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
    /// Retry behavior for failed fetches
    pub retry: RetryPolicy,
    /// Courtesy delay between page fetches
    pub page_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: None,
            timeout: Duration::from_secs(30),
            user_agent: format!("pagefeed/{}", env!("CARGO_PKG_VERSION")),
            retry: RetryPolicy::default(),
            page_delay: Duration::from_millis(500),
        }
    }
}

impl ClientConfig {
    /// Create a new config builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.base_url)
            .map_err(|e| Error::invalid_value("base_url", e.to_string()))?;
        Ok(())
    }
}

/// Builder for client config
#[derive(Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the API version segment
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.config.api_version = Some(version.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set max retries after the initial attempt
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.retry.max_retries = retries;
        self
    }

    /// Set the fixed backoff between retry attempts
    pub fn backoff(mut self, backoff: Duration) -> Self {
        self.config.retry.backoff = backoff;
        self
    }

    /// Set the courtesy delay between page fetches
    pub fn page_delay(mut self, delay: Duration) -> Self {
        self.config.page_delay = delay;
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

// ============================================================================
// File Config
// ============================================================================

/// Optional on-disk configuration loaded from YAML
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    /// Access token (a --token flag takes precedence)
    #[serde(default)]
    pub token: Option<AccessToken>,

    /// Base URL override
    #[serde(default)]
    pub base_url: Option<String>,

    /// API version override
    #[serde(default)]
    pub api_version: Option<String>,

    /// Request timeout in seconds
    #[serde(default)]
    pub timeout_seconds: Option<u64>,

    /// Max retries after the initial attempt
    #[serde(default)]
    pub max_retries: Option<u32>,

    /// Fixed backoff between retry attempts, in milliseconds
    #[serde(default)]
    pub backoff_ms: Option<u64>,

    /// Courtesy delay between page fetches, in milliseconds
    #[serde(default)]
    pub page_delay_ms: Option<u64>,
}

impl FileConfig {
    /// Load config from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file {}", path.as_ref().display()))?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Fold file values into a client config
    pub fn apply_to(&self, mut config: ClientConfig) -> ClientConfig {
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(version) = &self.api_version {
            config.api_version = Some(version.clone());
        }
        if let Some(seconds) = self.timeout_seconds {
            config.timeout = Duration::from_secs(seconds);
        }
        if let Some(retries) = self.max_retries {
            config.retry.max_retries = retries;
        }
        if let Some(ms) = self.backoff_ms {
            config.retry.backoff = Duration::from_millis(ms);
        }
        if let Some(ms) = self.page_delay_ms {
            config.page_delay = Duration::from_millis(ms);
        }
        config
    }
}
