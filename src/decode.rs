//! Wire-format decoding for API responses
//!
//! A response body is decoded in two steps. The envelope is parsed leniently
//! first (`data` kept as an untyped value), because the error indicator is
//! authoritative: when present, whatever the `data` field holds is discarded
//! rather than interpreted. Only an error-free envelope has its posts
//! deserialized into typed records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

use crate::error::{Error, Result};
use crate::types::{JsonValue, PageCursor};

// ============================================================================
// Envelope
// ============================================================================

/// Remote error indicator carried in a response envelope
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    /// Human-readable error message
    #[serde(default)]
    pub message: String,

    /// Error class, e.g. "OAuthException"
    #[serde(default, rename = "type")]
    pub kind: Option<String>,

    /// Numeric error code
    #[serde(default)]
    pub code: i64,
}

impl ApiErrorBody {
    /// Convert into the crate error type
    pub fn into_error(self) -> Error {
        Error::Api {
            code: self.code,
            message: self.message,
        }
    }
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Option<JsonValue>,
    #[serde(default)]
    paging: Option<Paging>,
    #[serde(default)]
    error: Option<ApiErrorBody>,
}

#[derive(Deserialize)]
struct Paging {
    #[serde(default)]
    next: Option<PageCursor>,
}

/// One page of the posts listing
#[derive(Debug, Clone)]
pub struct PagePayload {
    /// Posts on this page; empty when the envelope carried an error
    pub data: Vec<RawPost>,
    /// Opaque next-page URL, when the API has more to serve
    pub next: Option<PageCursor>,
    /// Remote error indicator
    pub error: Option<ApiErrorBody>,
}

impl PagePayload {
    /// Decode a response body
    pub fn from_body(body: &str) -> Result<Self> {
        let value: JsonValue = serde_json::from_str(body)
            .map_err(|e| Error::decode(format!("Failed to parse response JSON: {e}")))?;
        Self::from_value(value)
    }

    /// Decode an already-parsed response value
    pub fn from_value(value: JsonValue) -> Result<Self> {
        let envelope: Envelope = serde_json::from_value(value)
            .map_err(|e| Error::decode(format!("Malformed response envelope: {e}")))?;

        // An error indicator invalidates the rest of the envelope, including
        // any cursor that came along with it.
        if let Some(error) = envelope.error {
            return Ok(Self {
                data: Vec::new(),
                next: None,
                error: Some(error),
            });
        }

        let data = match envelope.data {
            None | Some(JsonValue::Null) => Vec::new(),
            Some(value @ JsonValue::Array(_)) => serde_json::from_value(value)
                .map_err(|e| Error::decode(format!("Failed to decode posts: {e}")))?,
            Some(other) => {
                return Err(Error::decode(format!(
                    "expected `data` to be an array, got {}",
                    json_type_name(&other)
                )))
            }
        };

        Ok(Self {
            data,
            next: envelope.paging.and_then(|p| p.next),
            error: None,
        })
    }

    /// Whether this page holds no posts
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

/// Extract the error indicator from a raw response value, if present.
///
/// For responses that are not listing envelopes (the batched reactions
/// lookup returns a map keyed by post id) the indicator still arrives under
/// an `error` key and still invalidates everything else.
pub fn error_indicator(value: &JsonValue) -> Option<ApiErrorBody> {
    let error = value.get("error")?;
    match serde_json::from_value(error.clone()) {
        Ok(body) => Some(body),
        Err(_) => Some(ApiErrorBody {
            message: error.to_string(),
            kind: None,
            code: 0,
        }),
    }
}

// ============================================================================
// Posts
// ============================================================================

/// A post as the API returns it
#[derive(Debug, Clone, Deserialize)]
pub struct RawPost {
    pub id: String,

    #[serde(default)]
    pub from: Option<Author>,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub story: Option<String>,

    #[serde(default)]
    pub link: Option<String>,

    /// Post kind, e.g. "status", "link", "photo"; passed through untyped
    /// because the API grows new kinds without notice
    #[serde(default, rename = "type")]
    pub post_type: Option<String>,

    #[serde(deserialize_with = "graph_time")]
    pub created_time: DateTime<Utc>,

    #[serde(default, deserialize_with = "opt_graph_time")]
    pub updated_time: Option<DateTime<Utc>>,

    #[serde(default)]
    pub comments: Option<SummaryContainer>,

    #[serde(default)]
    pub likes: Option<SummaryContainer>,

    #[serde(default)]
    pub shares: Option<ShareCount>,
}

/// Post author reference
#[derive(Debug, Clone, Deserialize)]
pub struct Author {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
}

/// Connection container carrying only a summary total
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummaryContainer {
    #[serde(default)]
    pub summary: Option<Summary>,
}

impl SummaryContainer {
    /// The summary total, when the API included one
    pub fn total(&self) -> Option<u64> {
        self.summary.as_ref().and_then(|s| s.total_count)
    }
}

/// Summary block of a connection
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Summary {
    #[serde(default)]
    pub total_count: Option<u64>,
}

/// Share tally; unlike comments and likes it has no summary wrapper
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShareCount {
    #[serde(default)]
    pub count: Option<u64>,
}

// ============================================================================
// Timestamps
// ============================================================================

/// Parse a timestamp as the API emits it.
///
/// The API uses RFC 3339 with a `+0000`-style offset (no colon); plain
/// RFC 3339 is accepted too.
pub fn parse_graph_time(value: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%z") {
        return Ok(dt.with_timezone(&Utc));
    }
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::InvalidTimestamp {
            value: value.to_string(),
            message: e.to_string(),
        })
}

fn graph_time<'de, D>(deserializer: D) -> std::result::Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    parse_graph_time(&value).map_err(serde::de::Error::custom)
}

fn opt_graph_time<'de, D>(deserializer: D) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    match value {
        Some(s) => parse_graph_time(&s).map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_page() {
        let body = json!({
            "data": [
                {
                    "id": "111_222",
                    "from": {"name": "Acme Corp", "id": "111"},
                    "message": "hello",
                    "type": "status",
                    "created_time": "2024-05-01T12:30:00+0000",
                    "updated_time": "2024-05-02T08:00:00+0000",
                    "comments": {"summary": {"total_count": 12}},
                    "likes": {"summary": {"total_count": 44}},
                    "shares": {"count": 3}
                }
            ],
            "paging": {
                "cursors": {"before": "a", "after": "b"},
                "next": "https://graph.facebook.com/v19.0/111/posts?after=b"
            }
        })
        .to_string();

        let page = PagePayload::from_body(&body).unwrap();
        assert!(page.error.is_none());
        assert_eq!(page.data.len(), 1);
        assert_eq!(
            page.next.as_ref().map(PageCursor::as_url),
            Some("https://graph.facebook.com/v19.0/111/posts?after=b")
        );

        let post = &page.data[0];
        assert_eq!(post.id, "111_222");
        assert_eq!(post.from.as_ref().unwrap().name.as_deref(), Some("Acme Corp"));
        assert_eq!(post.post_type.as_deref(), Some("status"));
        assert_eq!(post.comments.as_ref().unwrap().total(), Some(12));
        assert_eq!(post.likes.as_ref().unwrap().total(), Some(44));
        assert_eq!(post.shares.as_ref().unwrap().count, Some(3));
    }

    #[test]
    fn test_decode_minimal_post() {
        let body = json!({
            "data": [{"id": "1_2", "created_time": "2024-05-01T00:00:00+0000"}]
        })
        .to_string();

        let page = PagePayload::from_body(&body).unwrap();
        let post = &page.data[0];
        assert_eq!(post.message, None);
        assert_eq!(post.updated_time, None);
        assert!(post.comments.is_none());
        assert!(page.next.is_none());
    }

    #[test]
    fn test_error_indicator_wins_over_data() {
        // garbage where posts should be, plus a cursor: the indicator
        // invalidates both
        let body = json!({
            "data": "not actually posts",
            "paging": {"next": "https://example.com/next"},
            "error": {"message": "Invalid OAuth access token.", "type": "OAuthException", "code": 190}
        })
        .to_string();

        let page = PagePayload::from_body(&body).unwrap();
        let error = page.error.unwrap();
        assert_eq!(error.code, 190);
        assert_eq!(error.message, "Invalid OAuth access token.");
        assert!(page.data.is_empty());
        assert!(page.next.is_none());
    }

    #[test]
    fn test_missing_data_without_error_is_empty() {
        let page = PagePayload::from_body("{}").unwrap();
        assert!(page.is_empty());
        assert!(page.error.is_none());
        assert!(page.next.is_none());
    }

    #[test]
    fn test_non_array_data_without_error_fails() {
        let body = json!({"data": {"id": "1"}}).to_string();
        let err = PagePayload::from_body(&body).unwrap_err();
        assert!(err.to_string().contains("expected `data` to be an array"));
    }

    #[test]
    fn test_unparseable_body_fails() {
        assert!(PagePayload::from_body("<html>502</html>").is_err());
    }

    #[test]
    fn test_error_indicator_on_raw_values() {
        let value = json!({
            "error": {"message": "(#4) Application request limit reached", "code": 4}
        });
        let indicator = error_indicator(&value).unwrap();
        assert_eq!(indicator.code, 4);

        // non-object indicators still surface rather than vanish
        let odd = json!({"error": "rate limited"});
        let indicator = error_indicator(&odd).unwrap();
        assert_eq!(indicator.message, "\"rate limited\"");

        assert!(error_indicator(&json!({"data": []})).is_none());
    }

    #[test]
    fn test_parse_graph_time() {
        let offset = parse_graph_time("2024-05-01T12:30:00+0000").unwrap();
        assert_eq!(offset.to_rfc3339(), "2024-05-01T12:30:00+00:00");

        let rfc = parse_graph_time("2024-05-01T12:30:00Z").unwrap();
        assert_eq!(rfc, offset);

        assert!(parse_graph_time("yesterday").is_err());
    }
}
