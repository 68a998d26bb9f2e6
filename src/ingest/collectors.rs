// src/ingest/collectors.rs
use async_trait::async_trait;
use metrics::counter;
use tracing::{info, warn};

use crate::config::IngestSettings;
use crate::ingest::ensure_metrics_described;
use crate::ingest::http::HttpFetcher;
use crate::ingest::providers::{
    curated::CuratedProvider, remoteok::RemoteOkProvider, rozee::RozeeProvider,
};
use crate::ingest::types::{Category, CollectOutcome, Collector, SourceProvider};

/// A category backed by one or more sub-sources, queried in order.
///
/// A failing sub-source contributes zero resources; the rest still run.
pub struct CategoryCollector {
    category: Category,
    providers: Vec<Box<dyn SourceProvider>>,
}

impl CategoryCollector {
    pub fn new(category: Category, providers: Vec<Box<dyn SourceProvider>>) -> Self {
        Self {
            category,
            providers,
        }
    }
}

#[async_trait]
impl Collector for CategoryCollector {
    fn category(&self) -> Category {
        self.category
    }

    async fn collect(&self) -> CollectOutcome {
        ensure_metrics_described();
        let mut out = Vec::new();
        for p in &self.providers {
            match p.fetch_latest().await {
                Ok(mut v) => {
                    info!(category = %self.category, provider = p.name(), found = v.len(), "provider done");
                    out.append(&mut v);
                }
                Err(e) => {
                    warn!(error = ?e, category = %self.category, provider = p.name(), "provider error");
                    counter!("ingest_provider_errors_total", "provider" => p.name()).increment(1);
                }
            }
        }
        counter!("ingest_resources_total", "category" => self.category.key())
            .increment(out.len() as u64);
        info!(category = %self.category, found = out.len(), "collector done");
        CollectOutcome::Collected(out)
    }
}

/// The four production collectors in run order.
pub fn default_collectors(settings: &IngestSettings, fetcher: &HttpFetcher) -> Vec<Box<dyn Collector>> {
    vec![
        Box::new(CategoryCollector::new(
            Category::PakistanJobs,
            vec![
                Box::new(RozeeProvider::new(
                    fetcher.clone(),
                    settings.rozee_url.clone(),
                    settings.rozee_limit,
                )),
                Box::new(RemoteOkProvider::pakistan(
                    fetcher.clone(),
                    settings.remoteok_url.clone(),
                )),
            ],
        )),
        Box::new(CategoryCollector::new(
            Category::WorldwideJobs,
            vec![
                Box::new(RemoteOkProvider::worldwide(
                    fetcher.clone(),
                    settings.remoteok_url.clone(),
                )),
                Box::new(CuratedProvider::wellfound_jobs()),
            ],
        )),
        Box::new(CategoryCollector::new(
            Category::Courses,
            vec![
                Box::new(CuratedProvider::freecodecamp_courses()),
                Box::new(CuratedProvider::coursera_courses()),
            ],
        )),
        Box::new(CategoryCollector::new(
            Category::Tools,
            vec![Box::new(CuratedProvider::free_tools())],
        )),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Result};
    use crate::resource::Resource;

    struct Broken;

    #[async_trait]
    impl SourceProvider for Broken {
        async fn fetch_latest(&self) -> Result<Vec<Resource>> {
            Err(anyhow!("connection reset"))
        }
        fn name(&self) -> &'static str {
            "broken"
        }
    }

    #[tokio::test]
    async fn failing_provider_does_not_hide_the_others() {
        let c = CategoryCollector::new(
            Category::Tools,
            vec![Box::new(Broken), Box::new(CuratedProvider::free_tools())],
        );
        let out = c.collect().await.into_resources();
        assert_eq!(out.len(), 6);
    }

    #[tokio::test]
    async fn all_failing_is_still_collected_empty() {
        let c = CategoryCollector::new(Category::PakistanJobs, vec![Box::new(Broken)]);
        assert_eq!(c.collect().await, CollectOutcome::Collected(vec![]));
    }

    #[test]
    fn default_order_matches_categories() {
        let settings = IngestSettings::default();
        let fetcher = HttpFetcher::from_settings(&settings).unwrap();
        let cats: Vec<Category> = default_collectors(&settings, &fetcher)
            .iter()
            .map(|c| c.category())
            .collect();
        assert_eq!(cats, Category::ALL.to_vec());
    }
}
