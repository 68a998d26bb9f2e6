// src/notify/mod.rs
pub mod discord;

pub use discord::DiscordNotifier;

use serde::Serialize;

use crate::ingest::Category;

/// Per-run aggregate handed to the notifier once, then dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub pakistan_jobs: usize,
    pub worldwide_jobs: usize,
    pub courses: usize,
    pub tools: usize,
    /// Resources actually saved this run.
    pub total: usize,
}

impl RunSummary {
    pub fn count(&self, category: Category) -> usize {
        match category {
            Category::PakistanJobs => self.pakistan_jobs,
            Category::WorldwideJobs => self.worldwide_jobs,
            Category::Courses => self.courses,
            Category::Tools => self.tools,
        }
    }

    pub fn set_count(&mut self, category: Category, n: usize) {
        match category {
            Category::PakistanJobs => self.pakistan_jobs = n,
            Category::WorldwideJobs => self.worldwide_jobs = n,
            Category::Courses => self.courses = n,
            Category::Tools => self.tools = n,
        }
    }

    pub fn collected(&self) -> usize {
        self.pakistan_jobs + self.worldwide_jobs + self.courses + self.tools
    }
}

/// What became of one summary delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    /// No destination configured; nothing was sent.
    Disabled,
    /// The destination refused the message or could not be reached.
    Failed,
}

/// Best-effort delivery of a run summary. Implementations log their own
/// failures and report them as [`Delivery::Failed`], never as an error.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, summary: &RunSummary) -> Delivery;
}
