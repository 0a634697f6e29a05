//! Metric instrument factories for reactji.
//!
//! Uses the OTel Meter API with the globally-registered `MeterProvider`.
//! All instruments are created lazily from the `"reactji"` meter.

use opentelemetry::metrics::{Counter, Meter};

fn meter() -> Meter {
    opentelemetry::global::meter("reactji")
}

/// Counter: reactions pages fetched (including pages given up on).
pub fn pages_fetched() -> Counter<u64> {
    meter()
        .u64_counter("reactji.pages.fetched")
        .with_description("Number of reactions.list pages fetched")
        .build()
}

/// Counter: listing items processed.
/// Labels: `duplicate` (true | false).
pub fn items_seen() -> Counter<u64> {
    meter()
        .u64_counter("reactji.items.seen")
        .with_description("Number of reacted items processed")
        .build()
}

/// Counter: retries against the Slack API.
/// Labels: `operation`, `kind` ("rate_limited" | "transient" | "exhausted").
pub fn api_retries() -> Counter<u64> {
    meter()
        .u64_counter("reactji.api.retries")
        .with_description("Number of Slack API retries")
        .build()
}

/// Counter: members handled by a workspace run.
/// Labels: `result` ("collected" | "cached").
pub fn members_processed() -> Counter<u64> {
    meter()
        .u64_counter("reactji.members.processed")
        .with_description("Number of members processed")
        .build()
}
