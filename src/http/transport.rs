//! Single-request transport
//!
//! Issues exactly one GET per call. No retries live here; the retry wrapper
//! owns that budget. The access token and API version are applied to the URL
//! only when it does not already carry them, so opaque cursor URLs pass
//! through intact.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::config::ClientConfig;
use crate::decode::PagePayload;
use crate::error::{Error, Result};
use crate::types::{AccessToken, JsonValue};

/// Regex for matching an API version path segment: v19.0, v2, ...
static VERSION_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^v\d+(\.\d+)?$").unwrap());

/// HTTP transport bound to one access token
#[derive(Clone)]
pub struct Transport {
    client: Client,
    token: AccessToken,
    api_version: Option<String>,
}

impl Transport {
    /// Create a transport from client settings
    pub fn new(config: &ClientConfig, token: AccessToken) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            token,
            api_version: config.api_version.clone(),
        }
    }

    /// Same transport pinned to a different API version
    #[must_use]
    pub fn with_version(&self, version: impl Into<String>) -> Self {
        let mut transport = self.clone();
        transport.api_version = Some(version.into());
        transport
    }

    /// Issue one GET and parse the body as JSON.
    ///
    /// The API reports its errors as indicator objects in the body, on top
    /// of 4xx/5xx statuses; such bodies are returned for the caller to
    /// interpret. A non-success status without an indicator (a proxy error,
    /// say) surfaces as an HTTP status error instead, never as data.
    pub async fn invoke_value(&self, url: &str) -> Result<JsonValue> {
        let url = self.prepare_url(url)?;
        debug!("GET {}", redacted(&url));

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        let value: JsonValue = match serde_json::from_str(&body) {
            Ok(value) => value,
            Err(e) if status.is_success() => {
                return Err(Error::decode(format!("Failed to parse response JSON: {e}")))
            }
            Err(_) => return Err(Error::http_status(status.as_u16(), body)),
        };

        if !status.is_success() && value.get("error").is_none() {
            return Err(Error::http_status(status.as_u16(), body));
        }

        Ok(value)
    }

    /// Issue one GET and decode the body as a listing page envelope
    pub async fn invoke(&self, url: &str) -> Result<PagePayload> {
        let value = self.invoke_value(url).await?;
        PagePayload::from_value(value)
    }

    /// Parse the URL and fill in the version segment and token
    fn prepare_url(&self, url: &str) -> Result<Url> {
        let mut url = Url::parse(url)?;

        if let Some(version) = &self.api_version {
            apply_version(&mut url, version);
        }

        let has_token = url.query_pairs().any(|(k, _)| k == "access_token");
        if !has_token {
            url.query_pairs_mut()
                .append_pair("access_token", self.token.secret());
        }

        Ok(url)
    }
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport")
            .field("api_version", &self.api_version)
            .finish_non_exhaustive()
    }
}

/// Prepend the version path segment unless the URL already starts with one
fn apply_version(url: &mut Url, version: &str) {
    let already_versioned = url
        .path_segments()
        .and_then(|mut segments| segments.next())
        .is_some_and(|first| VERSION_SEGMENT.is_match(first));
    if already_versioned {
        return;
    }

    let rest = url.path().trim_start_matches('/').to_string();
    if rest.is_empty() {
        url.set_path(&format!("/{version}"));
    } else {
        url.set_path(&format!("/{version}/{rest}"));
    }
}

/// Render a URL for logging with the token masked
pub(crate) fn redacted(url: &Url) -> String {
    if url.query().is_none() {
        return url.to_string();
    }

    let mut clean = url.clone();
    {
        let mut pairs = clean.query_pairs_mut();
        pairs.clear();
        for (key, value) in url.query_pairs() {
            if key == "access_token" {
                pairs.append_pair(&key, "***");
            } else {
                pairs.append_pair(&key, &value);
            }
        }
    }
    clean.to_string()
}
