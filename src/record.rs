//! Tabular post records
//!
//! Flattens raw wire posts into the fixed row schema and provides the table
//! passes the listing pipeline applies after accumulation: the since-date
//! filter, the reaction join, and the chronological sort.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::decode::RawPost;
use crate::types::OptionStringExt;

/// One post, flattened
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostRecord {
    pub id: String,
    pub author_name: Option<String>,
    pub author_id: Option<String>,
    pub message: Option<String>,
    pub created_time: DateTime<Utc>,
    /// Last-updated time; posts never edited report their creation time
    pub updated_time: DateTime<Utc>,
    #[serde(rename = "type")]
    pub post_type: Option<String>,
    pub link: Option<String>,
    pub story: Option<String>,
    pub comments_count: Option<u64>,
    pub likes_count: Option<u64>,
    pub shares_count: Option<u64>,
    /// Reaction tallies, present only when enrichment was requested.
    /// `None` flattens to nothing, so plain listings carry no reaction keys.
    #[serde(flatten)]
    pub reactions: Option<ReactionTally>,
}

/// Per-post reaction counts by category
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReactionTally {
    pub love_count: Option<u64>,
    pub haha_count: Option<u64>,
    pub wow_count: Option<u64>,
    pub sad_count: Option<u64>,
    pub angry_count: Option<u64>,
}

impl From<RawPost> for PostRecord {
    fn from(post: RawPost) -> Self {
        let updated_time = post.updated_time.unwrap_or(post.created_time);
        let (author_name, author_id) = match post.from {
            Some(author) => (author.name.none_if_empty(), author.id.none_if_empty()),
            None => (None, None),
        };

        Self {
            id: post.id,
            author_name,
            author_id,
            message: post.message.none_if_empty(),
            created_time: post.created_time,
            updated_time,
            post_type: post.post_type.none_if_empty(),
            link: post.link.none_if_empty(),
            story: post.story.none_if_empty(),
            comments_count: post.comments.as_ref().and_then(|c| c.total()),
            likes_count: post.likes.as_ref().and_then(|l| l.total()),
            shares_count: post.shares.as_ref().and_then(|s| s.count),
            reactions: None,
        }
    }
}

/// Flatten one page of raw posts onto the end of a record table
pub fn extend_from_page(records: &mut Vec<PostRecord>, posts: Vec<RawPost>) {
    records.extend(posts.into_iter().map(PostRecord::from));
}

/// Smallest last-updated date on a page of raw posts; None for an empty page
pub fn min_updated_date(posts: &[RawPost]) -> Option<NaiveDate> {
    posts
        .iter()
        .map(|p| p.updated_time.unwrap_or(p.created_time).date_naive())
        .min()
}

/// Drop rows whose last-updated date is strictly earlier than the bound
pub fn filter_since(records: &mut Vec<PostRecord>, since: NaiveDate) {
    records.retain(|r| r.updated_time.date_naive() >= since);
}

/// Attach reaction tallies by post id.
///
/// Left join: rows the source had no data for keep an empty tally rather
/// than being dropped.
pub fn join_reactions(records: &mut [PostRecord], mut tallies: HashMap<String, ReactionTally>) {
    for record in records.iter_mut() {
        record.reactions = Some(tallies.remove(&record.id).unwrap_or_default());
    }
}

/// Order rows by creation time, oldest first
pub fn sort_by_created(records: &mut [PostRecord]) {
    records.sort_by_key(|r| r.created_time);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawPost {
        serde_json::from_value(value).unwrap()
    }

    fn post(id: &str, created: &str, updated: &str) -> RawPost {
        raw(json!({
            "id": id,
            "created_time": created,
            "updated_time": updated,
        }))
    }

    #[test]
    fn test_flatten_full_post() {
        let record = PostRecord::from(raw(json!({
            "id": "111_222",
            "from": {"name": "Acme Corp", "id": "111"},
            "message": "hello",
            "story": "",
            "link": "https://example.com",
            "type": "link",
            "created_time": "2024-05-01T12:30:00+0000",
            "updated_time": "2024-05-02T08:00:00+0000",
            "comments": {"summary": {"total_count": 12}},
            "likes": {"summary": {"total_count": 44}},
            "shares": {"count": 3}
        })));

        assert_eq!(record.id, "111_222");
        assert_eq!(record.author_name.as_deref(), Some("Acme Corp"));
        assert_eq!(record.author_id.as_deref(), Some("111"));
        assert_eq!(record.message.as_deref(), Some("hello"));
        // empty strings flatten to None
        assert_eq!(record.story, None);
        assert_eq!(record.post_type.as_deref(), Some("link"));
        assert_eq!(record.comments_count, Some(12));
        assert_eq!(record.likes_count, Some(44));
        assert_eq!(record.shares_count, Some(3));
        assert_eq!(record.reactions, None);
    }

    #[test]
    fn test_flatten_minimal_post_falls_back_to_created() {
        let record = PostRecord::from(raw(json!({
            "id": "1_2",
            "created_time": "2024-05-01T00:00:00+0000"
        })));

        assert_eq!(record.updated_time, record.created_time);
        assert_eq!(record.author_name, None);
        assert_eq!(record.comments_count, None);
        assert_eq!(record.shares_count, None);
    }

    #[test]
    fn test_min_updated_date() {
        let posts = vec![
            post("1", "2024-05-03T10:00:00+0000", "2024-05-04T10:00:00+0000"),
            post("2", "2024-05-02T10:00:00+0000", "2024-05-02T23:59:59+0000"),
            raw(json!({"id": "3", "created_time": "2024-05-01T00:00:00+0000"})),
        ];

        assert_eq!(min_updated_date(&posts), NaiveDate::from_ymd_opt(2024, 5, 1));
        assert_eq!(min_updated_date(&[]), None);
    }

    #[test]
    fn test_filter_since_is_date_granular() {
        let mut records: Vec<PostRecord> = vec![
            post("1", "2024-05-01T00:00:00+0000", "2024-05-03T09:00:00+0000"),
            post("2", "2024-05-01T00:00:00+0000", "2024-05-02T00:00:01+0000"),
            post("3", "2024-05-01T00:00:00+0000", "2024-05-01T23:59:59+0000"),
        ]
        .into_iter()
        .map(PostRecord::from)
        .collect();

        // same-date rows survive, strictly earlier dates drop
        filter_since(&mut records, NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());

        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn test_join_reactions_keeps_unmatched_rows() {
        let mut records: Vec<PostRecord> = vec![
            post("1", "2024-05-01T00:00:00+0000", "2024-05-01T00:00:00+0000"),
            post("2", "2024-05-02T00:00:00+0000", "2024-05-02T00:00:00+0000"),
        ]
        .into_iter()
        .map(PostRecord::from)
        .collect();

        let mut tallies = HashMap::new();
        tallies.insert(
            "1".to_string(),
            ReactionTally {
                love_count: Some(7),
                ..ReactionTally::default()
            },
        );

        join_reactions(&mut records, tallies);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].reactions.as_ref().unwrap().love_count, Some(7));
        assert_eq!(records[1].reactions, Some(ReactionTally::default()));
    }

    #[test]
    fn test_sort_by_created_ascending() {
        let mut records: Vec<PostRecord> = vec![
            post("new", "2024-05-03T00:00:00+0000", "2024-05-03T00:00:00+0000"),
            post("old", "2024-05-01T00:00:00+0000", "2024-05-01T00:00:00+0000"),
            post("mid", "2024-05-02T00:00:00+0000", "2024-05-02T00:00:00+0000"),
        ]
        .into_iter()
        .map(PostRecord::from)
        .collect();

        sort_by_created(&mut records);

        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["old", "mid", "new"]);
    }

    #[test]
    fn test_record_serializes_without_reaction_columns() {
        let record = PostRecord::from(post(
            "1_2",
            "2024-05-01T00:00:00+0000",
            "2024-05-01T00:00:00+0000",
        ));
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["id"], "1_2");
        assert_eq!(value["type"], serde_json::Value::Null);
        assert!(value.get("love_count").is_none());

        let mut enriched = record;
        enriched.reactions = Some(ReactionTally::default());
        let value = serde_json::to_value(&enriched).unwrap();
        assert!(value.get("love_count").is_some());
    }
}
