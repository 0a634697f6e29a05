//! Per-user reaction collection.
//!
//! Walks every page of a user's reactions listing, skipping items already
//! seen earlier in the sweep, and folds the user's reactions into a tally.

pub mod retry;

use opentelemetry::KeyValue;
use tracing::Instrument;

use crate::error::Result;
use crate::model::Page;
use crate::slack::ReactionsApi;
use crate::tally::{DedupLedger, ReactionTally};
use crate::telemetry::{collect as spans, metrics};

use self::retry::RetryPolicy;

pub const DEFAULT_PAGE_SIZE: u32 = crate::config::DEFAULT_PAGE_SIZE;

/// Drives `reactions.list` for one user at a time.
pub struct Collector<'a, A: ReactionsApi + ?Sized> {
    api: &'a A,
    policy: RetryPolicy,
    page_size: u32,
}

impl<'a, A: ReactionsApi + ?Sized> Collector<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self {
            api,
            policy: RetryPolicy::default(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Fetch one page, retrying per the policy.
    ///
    /// A page whose transient budget runs out comes back empty with no
    /// cursor, which ends the sweep for this user.
    pub async fn fetch_page(&self, user_id: &str, cursor: Option<&str>) -> Result<Page> {
        let api = self.api;
        let page_size = self.page_size;
        let page = self
            .policy
            .call("reactions.list", move || {
                api.list_reactions(user_id, page_size, cursor)
            })
            .await?;

        Ok(page.unwrap_or_else(|| {
            tracing::warn!(
                user_id,
                "page dropped after retries; results for this user are truncated"
            );
            Page::empty()
        }))
    }

    /// Collect the complete tally for `user_id`.
    pub async fn collect(&self, user_id: &str) -> Result<ReactionTally> {
        let span = spans::start_collect_span(user_id, self.page_size);
        self.sweep(user_id).instrument(span).await
    }

    async fn sweep(&self, user_id: &str) -> Result<ReactionTally> {
        let mut tally = ReactionTally::new();
        let mut ledger = DedupLedger::new();
        let mut cursor: Option<String> = None;
        let mut page_no = 0u32;

        loop {
            page_no += 1;
            let page_span = spans::start_page_span(page_no);
            let page = self
                .fetch_page(user_id, cursor.as_deref())
                .instrument(page_span.clone())
                .await?;

            let mut duplicates = 0usize;
            for item in &page.items {
                let (reactions, identity) = item.classify();
                if ledger.seen(&identity) {
                    duplicates += 1;
                    continue;
                }
                ledger.mark(identity);
                for reaction in reactions {
                    tally.apply(reaction, user_id);
                }
            }

            spans::record_page(&page_span, page.items.len(), duplicates);
            metrics::pages_fetched().add(1, &[]);
            metrics::items_seen().add(
                (page.items.len() - duplicates) as u64,
                &[KeyValue::new("duplicate", false)],
            );
            if duplicates > 0 {
                metrics::items_seen().add(duplicates as u64, &[KeyValue::new("duplicate", true)]);
            }
            tracing::info!(
                page = page_no,
                items = page.items.len(),
                duplicates,
                "fetched reactions page"
            );

            // An empty cursor is as final as a missing one, whoever built the page.
            match page.next_cursor.filter(|c| !c.is_empty()) {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        tracing::info!(
            pages = page_no,
            emoji = tally.len(),
            reactions = tally.reactions_placed(),
            "collected reactions"
        );
        Ok(tally)
    }
}
