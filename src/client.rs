//! The posts listing client
//!
//! `PageClient::list_posts` drives the whole retrieval: one initial request,
//! then cursor-following fetches while the requested count, the page
//! contents, and the time window all say to continue. Accumulation happens
//! in a single owned table; a fetch that exhausts its retry budget fails the
//! call and discards everything gathered so far.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::info;

use crate::config::ClientConfig;
use crate::error::Result;
use crate::http::{fetch_page, Transport};
use crate::reactions::{GraphReactions, ReactionSource};
use crate::record::{
    extend_from_page, filter_since, join_reactions, min_updated_date, sort_by_created, PostRecord,
};
use crate::request::{PostsRequest, MAX_PAGE_SIZE};
use crate::types::{AccessToken, PostSource, TimeBound};

// ============================================================================
// Options
// ============================================================================

/// Parameters for one listing call
#[derive(Debug, Clone)]
pub struct ListOptions {
    /// Total number of posts to retrieve
    pub count: usize,
    /// Lower bound on a post's last-updated time
    pub since: Option<TimeBound>,
    /// Upper bound on a post's last-updated time
    pub until: Option<TimeBound>,
    /// List the whole timeline, visitor posts included, instead of only the
    /// page's own posts
    pub include_feed: bool,
    /// Fetch reaction tallies and join them onto the finished table
    pub with_reactions: bool,
    /// Emit per-page progress at info level
    pub verbose: bool,
    /// API version override for this call
    pub api_version: Option<String>,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            count: MAX_PAGE_SIZE,
            since: None,
            until: None,
            include_feed: false,
            with_reactions: false,
            verbose: true,
            api_version: None,
        }
    }
}

// ============================================================================
// Check Result
// ============================================================================

/// Result of a connectivity probe
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    /// Whether the probe succeeded
    pub success: bool,

    /// Error message if failed
    pub message: Option<String>,

    /// Creation time of the newest post visible to the token
    pub latest_post: Option<DateTime<Utc>>,
}

impl CheckResult {
    /// Create a successful check result
    pub fn success(latest_post: Option<DateTime<Utc>>) -> Self {
        Self {
            success: true,
            message: None,
            latest_post,
        }
    }

    /// Create a failed check result
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            latest_post: None,
        }
    }
}

// ============================================================================
// Client
// ============================================================================

/// Client for listing a page's posts
pub struct PageClient {
    config: ClientConfig,
    transport: Transport,
    reactions: Option<Box<dyn ReactionSource>>,
}

impl PageClient {
    /// Create a client from settings and an access token
    pub fn new(config: ClientConfig, token: impl Into<AccessToken>) -> Self {
        let transport = Transport::new(&config, token.into());
        Self {
            config,
            transport,
            reactions: None,
        }
    }

    /// Replace the reaction source (the live API is queried otherwise)
    #[must_use]
    pub fn with_reaction_source(mut self, source: Box<dyn ReactionSource>) -> Self {
        self.reactions = Some(source);
        self
    }

    /// Retrieve a page's posts as a flat table.
    ///
    /// Rows come back in API order (newest first) and never exceed
    /// `opts.count`; with reactions requested the table is instead ordered
    /// by creation time ascending. An empty table is a valid outcome. Any
    /// fetch that exhausts its retry budget fails the whole call.
    pub async fn list_posts(&self, page: &str, opts: &ListOptions) -> Result<Vec<PostRecord>> {
        let transport = match &opts.api_version {
            Some(version) => self.transport.with_version(version.clone()),
            None => self.transport.clone(),
        };

        let mut request = PostsRequest::new(page).count(opts.count);
        if opts.include_feed {
            request = request.source(PostSource::Feed);
        }
        if let Some(since) = &opts.since {
            request = request.since(since.clone());
        }
        if let Some(until) = &opts.until {
            request = request.until(until.clone());
        }

        let url = request.build_url(&self.config.base_url)?;
        let first = fetch_page(&transport, url.as_str(), &self.config.retry).await?;

        // A zero-row, indicator-free first page is a valid outcome, not a
        // failure.
        if first.is_empty() {
            info!("No posts available for '{}' in the requested window", page);
            return Ok(Vec::new());
        }

        let since_date = opts.since.as_ref().and_then(TimeBound::date);

        let mut records: Vec<PostRecord> = Vec::new();
        let mut min_updated = min_updated_date(&first.data);
        let mut last_page_len = first.data.len();
        let mut cursor = first.next;
        let mut page_count = 1;
        extend_from_page(&mut records, first.data);

        if opts.verbose {
            info!("Page {}: {} posts so far", page_count, records.len());
        }

        // Follow cursors only for counts above the page-size cap. The window
        // guard reads the date seen on the page before the one about to be
        // fetched, so one page beyond the boundary may come in; the final
        // filter removes what that slack over-collects.
        if opts.count > MAX_PAGE_SIZE {
            loop {
                if records.len() >= opts.count {
                    break;
                }
                if last_page_len == 0 {
                    break;
                }
                let Some(next) = cursor.take() else { break };
                if !window_open(since_date, min_updated) {
                    break;
                }

                tokio::time::sleep(self.config.page_delay).await;
                let payload = fetch_page(&transport, next.as_url(), &self.config.retry).await?;

                // an empty page leaves the guard date untouched
                if let Some(date) = min_updated_date(&payload.data) {
                    min_updated = Some(date);
                }
                last_page_len = payload.data.len();
                cursor = payload.next;
                page_count += 1;
                extend_from_page(&mut records, payload.data);

                if opts.verbose {
                    info!("Page {}: {} posts so far", page_count, records.len());
                }
            }
        }

        // exact-count trim first, then the date filter backstop
        records.truncate(opts.count);
        if let Some(since) = since_date {
            filter_since(&mut records, since);
        }

        if opts.with_reactions {
            let ids: Vec<String> = records.iter().map(|r| r.id.clone()).collect();
            let tallies = match &self.reactions {
                Some(source) => source.tallies_for(&ids).await?,
                None => {
                    let live = GraphReactions::new(
                        transport,
                        self.config.base_url.clone(),
                        self.config.retry.clone(),
                    );
                    live.tallies_for(&ids).await?
                }
            };
            join_reactions(&mut records, tallies);
            sort_by_created(&mut records);
        }

        Ok(records)
    }

    /// Probe a page with a single-post request, verifying the token and the
    /// page's visibility
    pub async fn check(&self, page: &str) -> CheckResult {
        match self.probe(page).await {
            Ok(latest_post) => CheckResult::success(latest_post),
            Err(e) => CheckResult::failure(e.to_string()),
        }
    }

    async fn probe(&self, page: &str) -> Result<Option<DateTime<Utc>>> {
        let url = PostsRequest::new(page)
            .count(1)
            .build_url(&self.config.base_url)?;
        let payload = fetch_page(&self.transport, url.as_str(), &self.config.retry).await?;
        Ok(payload.data.first().map(|p| p.created_time))
    }
}

/// Whether the time window still allows another fetch.
///
/// Open unless both a since date and a guard date exist and the guard has
/// dropped below the bound. Relative bounds never close the window; the API
/// interprets those server-side.
fn window_open(since: Option<NaiveDate>, min_updated: Option<NaiveDate>) -> bool {
    match (since, min_updated) {
        (Some(since), Some(min)) => min >= since,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_list_options_defaults() {
        let opts = ListOptions::default();
        assert_eq!(opts.count, 25);
        assert!(!opts.include_feed);
        assert!(!opts.with_reactions);
        assert!(opts.verbose);
        assert!(opts.since.is_none());
        assert!(opts.api_version.is_none());
    }

    #[test]
    fn test_window_open() {
        // no bound, or no guard date yet: always open
        assert!(window_open(None, Some(date(2024, 5, 1))));
        assert!(window_open(Some(date(2024, 5, 1)), None));
        assert!(window_open(None, None));

        // open on or after the bound, closed strictly below it
        assert!(window_open(Some(date(2024, 5, 1)), Some(date(2024, 5, 1))));
        assert!(window_open(Some(date(2024, 5, 1)), Some(date(2024, 6, 1))));
        assert!(!window_open(Some(date(2024, 5, 1)), Some(date(2024, 4, 30))));
    }

    #[test]
    fn test_check_result_constructors() {
        let ok = CheckResult::success(None);
        assert!(ok.success);
        assert!(ok.message.is_none());

        let failed = CheckResult::failure("Invalid OAuth access token.");
        assert!(!failed.success);
        assert_eq!(
            failed.message.as_deref(),
            Some("Invalid OAuth access token.")
        );
    }
}
