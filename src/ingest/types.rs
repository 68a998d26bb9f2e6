// src/ingest/types.rs
use anyhow::Result;
use std::fmt;

use crate::resource::Resource;

/// Content categories reported in the run summary, in collection order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    PakistanJobs,
    WorldwideJobs,
    Courses,
    Tools,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::PakistanJobs,
        Category::WorldwideJobs,
        Category::Courses,
        Category::Tools,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Category::PakistanJobs => "pakistan_jobs",
            Category::WorldwideJobs => "worldwide_jobs",
            Category::Courses => "courses",
            Category::Tools => "tools",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::PakistanJobs => "Pakistan Jobs",
            Category::WorldwideJobs => "Worldwide Jobs",
            Category::Courses => "Free Courses",
            Category::Tools => "Free Tools",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One upstream sub-source (a page, a feed window, a curated table).
/// Errors are contained by the owning collector.
#[async_trait::async_trait]
pub trait SourceProvider: Send + Sync {
    async fn fetch_latest(&self) -> Result<Vec<Resource>>;
    fn name(&self) -> &'static str;
}

/// Result of one collector run.
#[derive(Debug, Clone, PartialEq)]
pub enum CollectOutcome {
    Collected(Vec<Resource>),
    Failed(String),
}

impl CollectOutcome {
    pub fn into_resources(self) -> Vec<Resource> {
        match self {
            CollectOutcome::Collected(v) => v,
            CollectOutcome::Failed(_) => Vec::new(),
        }
    }
}

/// Produces the Resources for one category. Never returns an `Err`; a
/// collector that cannot do its job reports `Failed`.
#[async_trait::async_trait]
pub trait Collector: Send + Sync {
    fn category(&self) -> Category;
    async fn collect(&self) -> CollectOutcome;
}
