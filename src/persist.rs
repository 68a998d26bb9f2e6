// src/persist.rs
//! Title-deduplicating writer in front of a [`ResourceStore`].

use metrics::counter;
use std::time::Duration;
use tracing::{info, warn};

use crate::ingest::ensure_metrics_described;
use crate::resource::Resource;
use crate::store::{FieldValue, ResourceStore, StoreError, RESOURCES_COLLECTION};

/// What happened to one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    Saved(String),
    Duplicate,
    Error(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistReport {
    pub saved: usize,
    pub duplicate: usize,
    pub error: usize,
    /// One entry per input record, in input order.
    pub outcomes: Vec<PersistOutcome>,
}

impl PersistReport {
    pub fn processed(&self) -> usize {
        self.saved + self.duplicate + self.error
    }

    fn record(&mut self, outcome: PersistOutcome) {
        match &outcome {
            PersistOutcome::Saved(_) => self.saved += 1,
            PersistOutcome::Duplicate => self.duplicate += 1,
            PersistOutcome::Error(_) => self.error += 1,
        }
        self.outcomes.push(outcome);
    }
}

pub struct Persister<S> {
    store: S,
    write_delay: Duration,
}

impl<S: ResourceStore> Persister<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            write_delay: Duration::ZERO,
        }
    }

    /// Pause between records to stay gentle on the store.
    pub fn with_write_delay(mut self, delay: Duration) -> Self {
        self.write_delay = delay;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Check-then-write each record in order. A failure on one record is
    /// counted and never stops the batch; nothing is rolled back.
    pub async fn persist(&self, resources: &[Resource]) -> PersistReport {
        ensure_metrics_described();
        info!(count = resources.len(), collection = RESOURCES_COLLECTION, "saving resources");

        let mut report = PersistReport::default();
        for (i, resource) in resources.iter().enumerate() {
            if i > 0 && !self.write_delay.is_zero() {
                tokio::time::sleep(self.write_delay).await;
            }
            let outcome = self.persist_one(resource).await;
            match &outcome {
                PersistOutcome::Saved(id) => {
                    counter!("persist_saved_total").increment(1);
                    info!(title = resource.title(), id = %id, "saved");
                }
                PersistOutcome::Duplicate => {
                    counter!("persist_duplicate_total").increment(1);
                    info!(title = resource.title(), "skipped duplicate");
                }
                PersistOutcome::Error(reason) => {
                    counter!("persist_error_total").increment(1);
                    warn!(title = resource.title(), error = %reason, "error saving");
                }
            }
            report.record(outcome);
        }

        info!(
            saved = report.saved,
            duplicate = report.duplicate,
            error = report.error,
            "save summary"
        );
        report
    }

    async fn persist_one(&self, resource: &Resource) -> PersistOutcome {
        let title = FieldValue::String(resource.title().to_string());
        match self.store.query_equals(RESOURCES_COLLECTION, "title", &title).await {
            Ok(existing) if !existing.is_empty() => return PersistOutcome::Duplicate,
            Ok(_) => {}
            Err(e) => return PersistOutcome::Error(format!("existence check failed: {e}")),
        }
        match self.store.add(RESOURCES_COLLECTION, &resource.to_record()).await {
            Ok(id) => PersistOutcome::Saved(id),
            // Lost the read-then-write race to another writer.
            Err(StoreError::Conflict(_)) => PersistOutcome::Duplicate,
            Err(e) => PersistOutcome::Error(format!("write failed: {e}")),
        }
    }
}
