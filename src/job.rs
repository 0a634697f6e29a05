//! Workspace run: collect every member not already in the cache.

use opentelemetry::KeyValue;

use crate::cache::{CachedTally, TallyStore, cache_key};
use crate::collect::Collector;
use crate::error::Result;
use crate::model::Member;
use crate::slack::ReactionsApi;
use crate::telemetry::metrics;

/// What a workspace run did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct JobSummary {
    pub collected: usize,
    pub skipped: usize,
}

/// Collect and cache every member, one at a time.
///
/// Members whose key is already stored are skipped. A fatal API error stops
/// the run; members finished before it stay cached for the next attempt.
pub async fn run_workspace<A, S>(
    collector: &Collector<'_, A>,
    store: &mut S,
    members: &[Member],
) -> Result<JobSummary>
where
    A: ReactionsApi + ?Sized,
    S: TallyStore + ?Sized,
{
    let mut summary = JobSummary::default();

    for (n, member) in members.iter().enumerate() {
        let key = cache_key(member);
        if store.contains(&key)? {
            tracing::debug!(user_id = %member.id, key = %key, "already cached, skipping");
            metrics::members_processed().add(1, &[KeyValue::new("result", "cached")]);
            summary.skipped += 1;
            continue;
        }

        tracing::info!(
            user_id = %member.id,
            name = %member.display_name,
            index = n + 1,
            of = members.len(),
            "querying member"
        );
        let tally = collector.collect(&member.id).await?;
        store.store(&key, &CachedTally::new(member, tally))?;
        metrics::members_processed().add(1, &[KeyValue::new("result", "collected")]);
        summary.collected += 1;
    }

    tracing::info!(
        collected = summary.collected,
        skipped = summary.skipped,
        "workspace run complete"
    );
    Ok(summary)
}
