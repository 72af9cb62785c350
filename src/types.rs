//! Common types used throughout pagefeed
//!
//! This module contains shared type definitions and utility types
//! used across multiple modules.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

// ============================================================================
// Access Token
// ============================================================================

/// An opaque API access token.
///
/// The token is never inspected or decoded, only appended to request URLs.
/// Debug output redacts it so it cannot leak through logs.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token value, for building request URLs
    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

impl From<String> for AccessToken {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl From<&str> for AccessToken {
    fn from(token: &str) -> Self {
        Self(token.to_string())
    }
}

// ============================================================================
// Page Cursor
// ============================================================================

/// An opaque next-page cursor.
///
/// The API supplies this as a complete URL; it is fetched as-is, never parsed
/// or reconstructed. Debug output drops the query string because cursor URLs
/// embed the access token.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct PageCursor(String);

impl PageCursor {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// The full next-page URL
    pub fn as_url(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PageCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.split_once('?') {
            Some((base, _)) => write!(f, "PageCursor({base}?***)"),
            None => write!(f, "PageCursor({})", self.0),
        }
    }
}

// ============================================================================
// Post Source
// ============================================================================

/// Which collection of a page's timeline to list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostSource {
    /// Only posts authored by the page itself
    #[default]
    Posts,
    /// Everything on the page's timeline, including visitor posts
    Feed,
}

impl PostSource {
    /// The API path segment for this collection
    pub fn path_segment(&self) -> &'static str {
        match self {
            PostSource::Posts => "posts",
            PostSource::Feed => "feed",
        }
    }
}

// ============================================================================
// Time Bound
// ============================================================================

/// A caller-supplied time bound on a post's last-updated time.
///
/// The raw string is handed to the API verbatim, never validated or rewritten;
/// the API accepts absolute timestamps as well as relative expressions such as
/// `now` or `-2 weeks`. When the value parses as an absolute date, the date
/// component additionally drives client-side windowing (the pagination stop
/// condition and the final post filter); relative bounds are server-side only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeBound {
    raw: String,
    date: Option<NaiveDate>,
}

impl TimeBound {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let date = parse_bound_date(&raw);
        Self { raw, date }
    }

    /// The exact string appended to the request URL
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The UTC calendar date of an absolute bound, if it parsed as one
    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }
}

impl From<&str> for TimeBound {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for TimeBound {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

/// Extract a calendar date from an absolute time bound.
///
/// Accepts plain dates, RFC 3339 timestamps, the `+0000` offset variant the
/// API itself emits, and unix epoch seconds. Anything else (relative
/// expressions, garbage) yields None and is left for the API to interpret.
fn parse_bound_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    if !raw.is_empty() && raw.chars().all(|c| c.is_ascii_digit()) {
        if let Ok(secs) = raw.parse::<i64>() {
            return DateTime::<Utc>::from_timestamp(secs, 0).map(|dt| dt.date_naive());
        }
    }
    None
}

// ============================================================================
// Utilities
// ============================================================================

/// Extension trait for Option<String> to handle empty strings
pub trait OptionStringExt {
    /// Returns None if the string is empty
    fn none_if_empty(self) -> Option<String>;
}

impl OptionStringExt for Option<String> {
    fn none_if_empty(self) -> Option<String> {
        self.filter(|s| !s.is_empty())
    }
}

impl OptionStringExt for String {
    fn none_if_empty(self) -> Option<String> {
        if self.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_debug_redacted() {
        let token = AccessToken::new("EAABsbCS1234verysecret");
        assert_eq!(format!("{token:?}"), "AccessToken(***)");
    }

    #[test]
    fn test_cursor_debug_drops_query() {
        let cursor = PageCursor::new("https://api.example.com/v19.0/feed?after=abc&access_token=xyz");
        assert_eq!(
            format!("{cursor:?}"),
            "PageCursor(https://api.example.com/v19.0/feed?***)"
        );

        let bare = PageCursor::new("https://api.example.com/next");
        assert_eq!(format!("{bare:?}"), "PageCursor(https://api.example.com/next)");
    }

    #[test]
    fn test_post_source_segments() {
        assert_eq!(PostSource::Posts.path_segment(), "posts");
        assert_eq!(PostSource::Feed.path_segment(), "feed");
        assert_eq!(PostSource::default(), PostSource::Posts);
    }

    #[test]
    fn test_time_bound_plain_date() {
        let bound = TimeBound::new("2024-05-01");
        assert_eq!(bound.raw(), "2024-05-01");
        assert_eq!(bound.date(), NaiveDate::from_ymd_opt(2024, 5, 1));
    }

    #[test]
    fn test_time_bound_timestamps() {
        let rfc = TimeBound::new("2024-05-01T12:30:00Z");
        assert_eq!(rfc.date(), NaiveDate::from_ymd_opt(2024, 5, 1));

        let offset = TimeBound::new("2024-05-01T23:30:00+0000");
        assert_eq!(offset.date(), NaiveDate::from_ymd_opt(2024, 5, 1));

        // 2024-05-01T00:00:00Z
        let unix = TimeBound::new("1714521600");
        assert_eq!(unix.date(), NaiveDate::from_ymd_opt(2024, 5, 1));
    }

    #[test]
    fn test_time_bound_relative_passthrough() {
        let bound = TimeBound::new("-2 weeks");
        assert_eq!(bound.raw(), "-2 weeks");
        assert_eq!(bound.date(), None);

        assert_eq!(TimeBound::new("now").date(), None);
    }

    #[test]
    fn test_option_string_none_if_empty() {
        assert_eq!(
            Some("test".to_string()).none_if_empty(),
            Some("test".to_string())
        );
        assert_eq!(Some("".to_string()).none_if_empty(), None);
        assert_eq!(None::<String>.none_if_empty(), None);
        assert_eq!("test".to_string().none_if_empty(), Some("test".to_string()));
        assert_eq!("".to_string().none_if_empty(), None);
    }
}
