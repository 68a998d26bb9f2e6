// src/ingest/providers/rozee.rs
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::ingest::http::HttpFetcher;
use crate::ingest::normalize::{clean_inline, FieldDefaults, RawListing, SourceProfile};
use crate::ingest::types::SourceProvider;
use crate::resource::{LocationType, Resource, ResourceKind};

pub const ROZEE_PROFILE: SourceProfile = SourceProfile::new(
    "auto_scraper_rozee",
    "rozee.pk",
    ResourceKind::Job,
    LocationType::Pakistan,
)
.with_defaults(FieldDefaults {
    description: "Job opportunity in Pakistan. Apply now for this position.",
    location: Some("Pakistan"),
    company: Some("Company in Pakistan"),
    source_url: "https://www.rozee.pk/jobs",
    requirements: "Experience required, Good communication skills, Relevant education",
    benefits: "Competitive salary, Health insurance, Career growth opportunities",
    duration: "Full-time",
});

fn sel(s: &str) -> Selector {
    Selector::parse(s).expect("static selector")
}

static CARD: Lazy<Selector> = Lazy::new(|| sel("div.job-listing"));
static TITLE: Lazy<[Selector; 2]> = Lazy::new(|| [sel("h3"), sel("a.job-title")]);
static COMPANY: Lazy<[Selector; 2]> = Lazy::new(|| [sel(".company-name"), sel("span.company")]);
static LOCATION: Lazy<[Selector; 2]> =
    Lazy::new(|| [sel(".location"), sel("span.job-location")]);

/// First non-empty text among `candidates`, tried in order.
fn first_text(card: &ElementRef<'_>, candidates: &[Selector]) -> Option<String> {
    candidates.iter().find_map(|s| {
        card.select(s)
            .next()
            .map(|el| clean_inline(&el.text().collect::<String>()))
            .filter(|t| !t.is_empty())
    })
}

/// Extract up to `limit` job cards from a Rozee listing page.
/// The selectors track the site's markup loosely; no match yields an empty list.
pub fn parse_listings(html: &str, limit: usize, page_url: &str) -> Vec<RawListing> {
    let doc = Html::parse_document(html);
    doc.select(&CARD)
        .take(limit)
        .filter_map(|card| {
            let title = first_text(&card, &*TITLE)?;
            Some(RawListing {
                title,
                company: first_text(&card, &*COMPANY),
                location: first_text(&card, &*LOCATION),
                source_url: Some(page_url.to_string()),
                ..Default::default()
            })
        })
        .collect()
}

pub struct RozeeProvider {
    fetcher: HttpFetcher,
    url: String,
    limit: usize,
}

impl RozeeProvider {
    pub fn new(fetcher: HttpFetcher, url: impl Into<String>, limit: usize) -> Self {
        Self {
            fetcher,
            url: url.into(),
            limit,
        }
    }
}

#[async_trait]
impl SourceProvider for RozeeProvider {
    async fn fetch_latest(&self) -> Result<Vec<Resource>> {
        let html = self.fetcher.get_text(&self.url).await?;
        let now = Utc::now();
        let out: Vec<Resource> = parse_listings(&html, self.limit, &self.url)
            .into_iter()
            .filter_map(|raw| ROZEE_PROFILE.normalize(raw, now))
            .collect();
        if out.is_empty() {
            tracing::info!(provider = self.name(), url = %self.url, "no job cards matched");
        }
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "rozee"
    }
}
