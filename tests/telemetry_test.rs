//! Integration tests for telemetry initialization and span helpers.

#[test]
fn telemetry_initializes_without_endpoint() {
    // Note: tracing subscriber can only be set once per process.
    // Using try_init() in the implementation avoids panics if another
    // test already initialized a subscriber.
    let config = reactji::telemetry::TelemetryConfig {
        endpoint: None,
        service_name: "reactji-test".to_string(),
        default_filter: "debug".to_string(),
    };
    // This may return Err if a global subscriber was already set by
    // another test in this process; that is acceptable.
    let _guard = reactji::telemetry::init_telemetry(config);
}

#[test]
fn collect_span_creates_and_records_page() {
    let collect = reactji::telemetry::collect::start_collect_span("U1", 100);
    let _entered = collect.enter();
    let page = reactji::telemetry::collect::start_page_span(1);
    reactji::telemetry::collect::record_page(&page, 100, 3);
}

#[test]
fn metric_instruments_accept_measurements() {
    use opentelemetry::KeyValue;
    use reactji::telemetry::metrics;

    metrics::pages_fetched().add(1, &[]);
    metrics::items_seen().add(5, &[KeyValue::new("duplicate", false)]);
    metrics::api_retries().add(
        1,
        &[
            KeyValue::new("operation", "reactions.list"),
            KeyValue::new("kind", "rate_limited"),
        ],
    );
    metrics::members_processed().add(1, &[KeyValue::new("result", "cached")]);
}
