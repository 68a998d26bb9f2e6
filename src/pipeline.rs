// src/pipeline.rs
//! One ingest run: collect → persist → notify.

use chrono::Utc;
use futures::FutureExt;
use metrics::{counter, gauge};
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use tracing::{error, info, warn};

use crate::ingest::{ensure_metrics_described, Category, CollectOutcome, Collector};
use crate::notify::{Delivery, Notifier, RunSummary};
use crate::persist::{PersistReport, Persister};
use crate::store::ResourceStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Collecting,
    Persisting,
    Notifying,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Success,
    Failure(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub summary: RunSummary,
    pub persist: PersistReport,
    /// Resources handed to the persister.
    pub processed: usize,
    pub collector_failures: Vec<(Category, String)>,
    /// Set only when the notify phase ran.
    pub notification: Option<Delivery>,
    /// Phases entered, in order.
    pub phases: Vec<RunPhase>,
    pub outcome: RunOutcome,
}

impl RunReport {
    fn new() -> Self {
        Self {
            summary: RunSummary::default(),
            persist: PersistReport::default(),
            processed: 0,
            collector_failures: Vec::new(),
            notification: None,
            phases: vec![RunPhase::Idle],
            outcome: RunOutcome::Success,
        }
    }

    fn aborted(reason: String) -> Self {
        let mut r = Self::new();
        r.phases.push(RunPhase::Done);
        r.outcome = RunOutcome::Failure(reason);
        r
    }

    fn enter(&mut self, phase: RunPhase) {
        info!(?phase, "run phase");
        self.phases.push(phase);
    }

    /// Whether a summary actually reached the notifier's destination.
    pub fn notified(&self) -> bool {
        self.notification == Some(Delivery::Sent)
    }

    pub fn is_success(&self) -> bool {
        self.outcome == RunOutcome::Success
    }

    /// Process exit status for this run.
    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}

pub struct Pipeline<S> {
    collectors: Vec<Box<dyn Collector>>,
    persister: Persister<S>,
    notifier: Box<dyn Notifier>,
}

impl<S: ResourceStore> Pipeline<S> {
    pub fn new(
        collectors: Vec<Box<dyn Collector>>,
        persister: Persister<S>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        Self {
            collectors,
            persister,
            notifier,
        }
    }

    pub fn persister(&self) -> &Persister<S> {
        &self.persister
    }

    /// Run every collector in order, persist the merged batch, notify when
    /// something new was saved. Sub-component failures only shrink counts.
    pub async fn run(&self) -> RunReport {
        ensure_metrics_described();
        let mut report = RunReport::new();

        report.enter(RunPhase::Collecting);
        let mut all = Vec::new();
        for collector in &self.collectors {
            let category = collector.category();
            let outcome = match AssertUnwindSafe(collector.collect()).catch_unwind().await {
                Ok(outcome) => outcome,
                Err(payload) => {
                    counter!("ingest_collector_panics_total").increment(1);
                    let message = panic_message(payload.as_ref());
                    error!(%category, panic = %message, "collector panicked");
                    CollectOutcome::Failed(format!("collector panicked: {message}"))
                }
            };
            let found = match outcome {
                CollectOutcome::Collected(mut v) => {
                    let n = v.len();
                    all.append(&mut v);
                    n
                }
                CollectOutcome::Failed(reason) => {
                    warn!(%category, error = %reason, "collector failed, counting zero");
                    report.collector_failures.push((category, reason));
                    0
                }
            };
            let prev = report.summary.count(category);
            report.summary.set_count(category, prev + found);
            info!(%category, found, "category collected");
        }
        report.processed = all.len();

        report.enter(RunPhase::Persisting);
        report.persist = self.persister.persist(&all).await;
        report.summary.total = report.persist.saved;

        if report.persist.saved > 0 {
            report.enter(RunPhase::Notifying);
            report.notification = Some(self.notifier.notify(&report.summary).await);
        }

        report.enter(RunPhase::Done);
        gauge!("ingest_pipeline_last_run_ts").set(Utc::now().timestamp() as f64);
        info!(
            collected = report.summary.collected(),
            processed = report.processed,
            saved = report.persist.saved,
            duplicate = report.persist.duplicate,
            error = report.persist.error,
            "daily scraping completed"
        );
        report
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Full run including store initialization. If `connect` fails the run ends
/// in `Failure` before any collector is built or invoked.
pub async fn run_daily_scraping<S, F, B>(connect: F, build: B) -> RunReport
where
    S: ResourceStore,
    F: Future<Output = anyhow::Result<S>>,
    B: FnOnce(S) -> Pipeline<S>,
{
    info!(started_at = %Utc::now().format("%Y-%m-%d %H:%M:%S"), "starting daily scraping");
    let store = match connect.await {
        Ok(s) => s,
        Err(e) => {
            error!(error = ?e, "store initialization failed");
            return RunReport::aborted(format!("{e:#}"));
        }
    };
    build(store).run().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use async_trait::async_trait;

    struct Silent;

    #[async_trait]
    impl Notifier for Silent {
        async fn notify(&self, _: &RunSummary) -> Delivery {
            Delivery::Disabled
        }
    }

    #[tokio::test]
    async fn empty_run_skips_notification() {
        let p = Pipeline::new(vec![], Persister::new(MemoryStore::new()), Box::new(Silent));
        let r = p.run().await;
        assert!(r.is_success());
        assert_eq!(r.notification, None);
        assert!(!r.notified());
        assert_eq!(
            r.phases,
            vec![
                RunPhase::Idle,
                RunPhase::Collecting,
                RunPhase::Persisting,
                RunPhase::Done
            ]
        );
    }

    #[test]
    fn panic_payloads_become_messages() {
        assert_eq!(panic_message(&"boom"), "boom");
        assert_eq!(panic_message(&String::from("index out of range")), "index out of range");
        assert_eq!(panic_message(&42_u8), "unknown panic");
    }

    #[tokio::test]
    async fn failed_connect_aborts_before_build() {
        let r = run_daily_scraping(
            async { Err::<MemoryStore, _>(anyhow::anyhow!("no credentials")) },
            |_store| -> Pipeline<MemoryStore> { unreachable!("build must not run") },
        )
        .await;
        assert_eq!(r.exit_code(), 1);
        assert!(matches!(r.outcome, RunOutcome::Failure(ref m) if m.contains("no credentials")));
        assert_eq!(r.phases, vec![RunPhase::Idle, RunPhase::Done]);
    }
}
