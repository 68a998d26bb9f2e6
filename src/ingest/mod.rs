// src/ingest/mod.rs
pub mod collectors;
pub mod http;
pub mod normalize;
pub mod providers;
pub mod types;

pub use collectors::{default_collectors, CategoryCollector};
pub use http::HttpFetcher;
pub use normalize::{html_to_text, RawListing, SourceProfile};
pub use types::{Category, CollectOutcome, Collector, SourceProvider};

use metrics::{describe_counter, describe_gauge};
use once_cell::sync::OnceCell;

/// One-time metrics registration so the series carry descriptions.
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "ingest_provider_errors_total",
            "Sub-source fetch/parse errors."
        );
        describe_counter!(
            "ingest_resources_total",
            "Resources produced by collectors, per category."
        );
        describe_counter!(
            "ingest_collector_panics_total",
            "Collectors that panicked; the category counted zero."
        );
        describe_counter!("persist_saved_total", "Resources written to the store.");
        describe_counter!(
            "persist_duplicate_total",
            "Resources skipped because the title already exists."
        );
        describe_counter!(
            "persist_error_total",
            "Resources whose existence check or write failed."
        );
        describe_counter!("notify_failures_total", "Run summary deliveries that failed.");
        describe_gauge!(
            "ingest_pipeline_last_run_ts",
            "Unix ts when the ingest pipeline last finished."
        );
    });
}
