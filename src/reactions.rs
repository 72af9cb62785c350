//! Reaction-count enrichment
//!
//! Optional second pass over the finished table: given the accumulated post
//! ids, fetch per-category reaction tallies and hand them back for the left
//! join. Ids go out in batches through the same retrying transport the
//! listing uses; the response is a map keyed by post id rather than a page
//! envelope.

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use crate::config::RetryPolicy;
use crate::decode::error_indicator;
use crate::error::Result;
use crate::http::{with_retries, Transport};
use crate::record::ReactionTally;
use crate::types::JsonValue;

/// Ids per batched reactions request
pub const REACTION_BATCH_SIZE: usize = 50;

/// Fetched categories, as (field alias, API reaction type) pairs
const CATEGORIES: [(&str, &str); 5] = [
    ("love", "LOVE"),
    ("haha", "HAHA"),
    ("wow", "WOW"),
    ("sad", "SAD"),
    ("angry", "ANGRY"),
];

/// Source of per-post reaction tallies
#[async_trait]
pub trait ReactionSource: Send + Sync {
    /// Fetch tallies for the given post ids.
    ///
    /// Ids the source has no data for are simply absent from the map; the
    /// join keeps their rows either way.
    async fn tallies_for(&self, ids: &[String]) -> Result<HashMap<String, ReactionTally>>;
}

/// Reaction source backed by the live API
pub struct GraphReactions {
    transport: Transport,
    base_url: String,
    retry: RetryPolicy,
}

impl GraphReactions {
    pub fn new(transport: Transport, base_url: impl Into<String>, retry: RetryPolicy) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
            retry,
        }
    }

    /// Build the batched ids lookup URL
    fn batch_url(&self, ids: &[String]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("ids", &ids.join(","));
            pairs.append_pair("fields", &reaction_fields());
        }
        Ok(url)
    }
}

#[async_trait]
impl ReactionSource for GraphReactions {
    async fn tallies_for(&self, ids: &[String]) -> Result<HashMap<String, ReactionTally>> {
        let mut tallies = HashMap::with_capacity(ids.len());
        if ids.is_empty() {
            return Ok(tallies);
        }

        for batch in ids.chunks(REACTION_BATCH_SIZE) {
            let url = self.batch_url(batch)?;
            let value = with_retries(&self.retry, || async {
                let value = self.transport.invoke_value(url.as_str()).await?;
                if let Some(indicator) = error_indicator(&value) {
                    return Err(indicator.into_error());
                }
                Ok(value)
            })
            .await?;

            collect_batch(&value, &mut tallies);
            debug!("Fetched reactions for {} posts", batch.len());
        }

        Ok(tallies)
    }
}

/// Aliased summary fields for every category, e.g.
/// `reactions.type(LOVE).limit(0).summary(total_count).as(love)`
fn reaction_fields() -> String {
    CATEGORIES
        .iter()
        .map(|(alias, kind)| {
            format!("reactions.type({kind}).limit(0).summary(total_count).as({alias})")
        })
        .collect::<Vec<_>>()
        .join(",")
}

fn collect_batch(value: &JsonValue, tallies: &mut HashMap<String, ReactionTally>) {
    let Some(map) = value.as_object() else { return };
    for (id, body) in map {
        tallies.insert(id.clone(), tally_from_value(body));
    }
}

fn tally_from_value(body: &JsonValue) -> ReactionTally {
    fn total(body: &JsonValue, alias: &str) -> Option<u64> {
        body.get(alias)?.get("summary")?.get("total_count")?.as_u64()
    }

    ReactionTally {
        love_count: total(body, "love"),
        haha_count: total(body, "haha"),
        wow_count: total(body, "wow"),
        sad_count: total(body, "sad"),
        angry_count: total(body, "angry"),
    }
}
