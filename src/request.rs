//! Request construction for the posts listing
//!
//! Builds the initial query URL from the caller's parameters. Time bounds are
//! appended exactly as supplied; the API is the authority on their format.
//! Follow-up page URLs never pass through here, they come back from the API
//! as opaque cursors.

use url::Url;

use crate::error::{Error, Result};
use crate::types::{PostSource, TimeBound};

/// Largest page size the API serves per request
pub const MAX_PAGE_SIZE: usize = 25;

/// Fields requested for every post
pub const POST_FIELDS: &str = "id,from,message,created_time,updated_time,type,link,story,\
                               comments.limit(0).summary(true),likes.limit(0).summary(true),shares";

/// A posts listing request for one page
#[derive(Debug, Clone)]
pub struct PostsRequest {
    page: String,
    source: PostSource,
    count: usize,
    since: Option<TimeBound>,
    until: Option<TimeBound>,
}

impl PostsRequest {
    /// Create a request for a page's own posts with the default count
    pub fn new(page: impl Into<String>) -> Self {
        Self {
            page: page.into(),
            source: PostSource::Posts,
            count: MAX_PAGE_SIZE,
            since: None,
            until: None,
        }
    }

    /// Select which timeline collection to list
    #[must_use]
    pub fn source(mut self, source: PostSource) -> Self {
        self.source = source;
        self
    }

    /// Set the total number of posts to retrieve
    #[must_use]
    pub fn count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    /// Lower time bound on a post's last-updated time, passed to the API raw
    #[must_use]
    pub fn since(mut self, bound: impl Into<TimeBound>) -> Self {
        self.since = Some(bound.into());
        self
    }

    /// Upper time bound on a post's last-updated time, passed to the API raw
    #[must_use]
    pub fn until(mut self, bound: impl Into<TimeBound>) -> Self {
        self.until = Some(bound.into());
        self
    }

    /// Per-request page size: the full count when it fits in one page,
    /// otherwise the page-size cap
    pub fn limit(&self) -> usize {
        self.count.min(MAX_PAGE_SIZE)
    }

    /// Build the initial query URL against a base endpoint
    pub fn build_url(&self, base: &str) -> Result<Url> {
        let mut url = Url::parse(base)?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| Error::invalid_value("base_url", "cannot be a base URL"))?;
            segments.pop_if_empty();
            segments.push(&self.page);
            segments.push(self.source.path_segment());
        }
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("fields", POST_FIELDS);
            pairs.append_pair("limit", &self.limit().to_string());
            if let Some(until) = &self.until {
                pairs.append_pair("until", until.raw());
            }
            if let Some(since) = &self.since {
                pairs.append_pair("since", since.raw());
            }
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use test_case::test_case;

    fn query_map(url: &Url) -> HashMap<String, String> {
        url.query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[test_case(1, 1; "single post")]
    #[test_case(10, 10; "below the cap")]
    #[test_case(25, 25; "exactly the cap")]
    #[test_case(26, 25; "just over the cap")]
    #[test_case(500, 25; "many pages")]
    fn test_limit_policy(count: usize, expected: usize) {
        assert_eq!(PostsRequest::new("acme").count(count).limit(), expected);
    }

    #[test]
    fn test_posts_url() {
        let url = PostsRequest::new("acme")
            .count(10)
            .build_url("https://graph.facebook.com")
            .unwrap();

        assert_eq!(url.path(), "/acme/posts");
        let query = query_map(&url);
        assert_eq!(query["fields"], POST_FIELDS);
        assert_eq!(query["limit"], "10");
        assert!(!query.contains_key("since"));
        assert!(!query.contains_key("until"));
    }

    #[test]
    fn test_feed_url() {
        let url = PostsRequest::new("acme")
            .source(PostSource::Feed)
            .build_url("https://graph.facebook.com")
            .unwrap();

        assert_eq!(url.path(), "/acme/feed");
    }

    #[test]
    fn test_bounds_passed_raw() {
        let url = PostsRequest::new("acme")
            .since("-2 weeks")
            .until("now")
            .build_url("https://graph.facebook.com")
            .unwrap();

        let query = query_map(&url);
        assert_eq!(query["since"], "-2 weeks");
        assert_eq!(query["until"], "now");
    }

    #[test]
    fn test_until_appended_before_since() {
        let url = PostsRequest::new("acme")
            .since("2024-05-01")
            .until("2024-06-01")
            .build_url("https://graph.facebook.com")
            .unwrap();

        let keys: Vec<String> = url.query_pairs().map(|(k, _)| k.into_owned()).collect();
        assert_eq!(keys, vec!["fields", "limit", "until", "since"]);
    }

    #[test]
    fn test_base_url_with_version_and_trailing_slash() {
        let url = PostsRequest::new("acme")
            .build_url("http://localhost:9000/v19.0/")
            .unwrap();

        assert_eq!(url.path(), "/v19.0/acme/posts");
    }
}
