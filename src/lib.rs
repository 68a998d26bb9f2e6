// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod config;
pub mod ingest;
pub mod notify;
pub mod persist;
pub mod pipeline;
pub mod resource;
pub mod store;

// ---- Re-exports for stable public API ----
pub use crate::ingest::{Category, CollectOutcome, Collector};
pub use crate::notify::{Delivery, DiscordNotifier, Notifier, RunSummary};
pub use crate::persist::{PersistOutcome, PersistReport, Persister};
pub use crate::pipeline::{run_daily_scraping, Pipeline, RunOutcome, RunPhase, RunReport};
pub use crate::resource::{LocationType, Resource, ResourceKind, ResourceStatus};
pub use crate::store::{FirestoreStore, MemoryStore, ResourceStore};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber. `RUST_LOG` picks the filter (default `info`),
/// `LOG_FORMAT=json` switches to JSON lines for scheduled runs.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    let res = if json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().compact().with_target(false)).try_init()
    };
    if res.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
