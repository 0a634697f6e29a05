//! Collection span helpers.
//!
//! One span per user sweep, with a child span per reactions page.

use tracing::Span;

/// Start a span for one user's reaction sweep.
pub fn start_collect_span(user_id: &str, page_size: u32) -> Span {
    tracing::info_span!(
        "reactions.collect",
        "slack.user_id" = user_id,
        "reactions.page_size" = page_size,
    )
}

/// Start a span for a single page fetch.
///
/// The item counts are declared empty and filled in by [`record_page`].
pub fn start_page_span(page: u32) -> Span {
    tracing::info_span!(
        "reactions.page",
        "reactions.page" = page,
        "reactions.items" = tracing::field::Empty,
        "reactions.duplicates" = tracing::field::Empty,
    )
}

/// Record how many items a page held and how many were repeats.
pub fn record_page(span: &Span, items: usize, duplicates: usize) {
    span.record("reactions.items", items as u64);
    span.record("reactions.duplicates", duplicates as u64);
}
