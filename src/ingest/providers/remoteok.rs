// src/ingest/providers/remoteok.rs
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use std::ops::Range;

use crate::ingest::http::HttpFetcher;
use crate::ingest::normalize::{FieldDefaults, RawListing, SourceProfile};
use crate::ingest::types::SourceProvider;
use crate::resource::{LocationType, Resource, ResourceKind};

/// Feed slice used for Pakistan-friendly jobs. Entry 0 is feed metadata.
pub const PAKISTAN_WINDOW: Range<usize> = 1..11;
/// Disjoint slice of the same feed used for worldwide jobs.
pub const WORLDWIDE_WINDOW: Range<usize> = 11..21;

const DEFAULT_TAGS: &str = "Remote work, English";

pub const REMOTEOK_PAKISTAN_PROFILE: SourceProfile = SourceProfile::new(
    "auto_scraper_remoteok",
    "remoteok.io",
    ResourceKind::Job,
    LocationType::Pakistan,
)
.with_defaults(FieldDefaults {
    description: "Remote job opportunity - work from Pakistan",
    location: Some("Remote (Pakistan Friendly)"),
    company: Some("Remote Company"),
    source_url: "https://remoteok.io",
    requirements: DEFAULT_TAGS,
    benefits: "Remote work, Flexible hours, Global team, USD salary",
    duration: "Full-time",
});

pub const REMOTEOK_WORLDWIDE_PROFILE: SourceProfile = SourceProfile::new(
    "auto_scraper_worldwide",
    "remoteok.io",
    ResourceKind::Job,
    LocationType::Worldwide,
)
.with_defaults(FieldDefaults {
    description: "Remote job opportunity worldwide",
    location: Some("Remote/Worldwide"),
    company: Some("Global Company"),
    source_url: "https://remoteok.io",
    requirements: DEFAULT_TAGS,
    benefits: "Remote work, Global team, Competitive salary, Flexible hours",
    duration: "Full-time",
});

#[derive(Debug, Deserialize)]
struct FeedJob {
    position: Option<String>,
    company: Option<String>,
    description: Option<String>,
    url: Option<String>,
    #[serde(default)]
    tags: Option<Vec<String>>,
}

/// Pick the entries of `feed` inside `window` that look like jobs.
///
/// Entries that are not objects or lack `position` are skipped; a window past
/// the end of the feed is clamped.
pub fn parse_feed(feed: &[Value], window: Range<usize>) -> Vec<RawListing> {
    let end = window.end.min(feed.len());
    let start = window.start.min(end);
    feed[start..end]
        .iter()
        .filter(|v| v.get("position").is_some())
        .filter_map(|v| serde_json::from_value::<FeedJob>(v.clone()).ok())
        .filter_map(|job| {
            let title = job.position?;
            let requirements = job
                .tags
                .filter(|t| !t.is_empty())
                .map(|t| t.join(", "));
            Some(RawListing {
                title,
                description: job.description,
                company: job.company,
                source_url: job.url,
                requirements,
                ..Default::default()
            })
        })
        .collect()
}

/// One window of the RemoteOK JSON feed.
pub struct RemoteOkProvider {
    fetcher: HttpFetcher,
    url: String,
    window: Range<usize>,
    profile: SourceProfile,
    name: &'static str,
}

impl RemoteOkProvider {
    pub fn pakistan(fetcher: HttpFetcher, url: impl Into<String>) -> Self {
        Self {
            fetcher,
            url: url.into(),
            window: PAKISTAN_WINDOW,
            profile: REMOTEOK_PAKISTAN_PROFILE,
            name: "remoteok_pakistan",
        }
    }

    pub fn worldwide(fetcher: HttpFetcher, url: impl Into<String>) -> Self {
        Self {
            fetcher,
            url: url.into(),
            window: WORLDWIDE_WINDOW,
            profile: REMOTEOK_WORLDWIDE_PROFILE,
            name: "remoteok_worldwide",
        }
    }
}

#[async_trait]
impl SourceProvider for RemoteOkProvider {
    async fn fetch_latest(&self) -> Result<Vec<Resource>> {
        let feed: Vec<Value> = self.fetcher.get_json(&self.url).await?;
        let now = Utc::now();
        Ok(parse_feed(&feed, self.window.clone())
            .into_iter()
            .filter_map(|raw| self.profile.normalize(raw, now))
            .collect())
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn feed(n: usize) -> Vec<Value> {
        let mut v = vec![json!({ "legal": "metadata" })];
        for i in 1..=n {
            v.push(json!({
                "position": format!("Job {i}"),
                "company": "Acme",
                "description": "<p>Build <b>things</b></p>",
                "url": format!("https://remoteok.io/l/{i}"),
                "tags": ["rust", "backend"],
            }));
        }
        v
    }

    #[test]
    fn windows_are_disjoint_and_skip_metadata() {
        let f = feed(25);
        let pk = parse_feed(&f, PAKISTAN_WINDOW);
        let ww = parse_feed(&f, WORLDWIDE_WINDOW);
        assert_eq!(pk.len(), 10);
        assert_eq!(ww.len(), 10);
        assert_eq!(pk[0].title, "Job 1");
        assert_eq!(ww[0].title, "Job 11");
        assert!(pk.iter().all(|a| ww.iter().all(|b| a.title != b.title)));
    }

    #[test]
    fn short_feed_is_clamped() {
        let f = feed(4);
        assert_eq!(parse_feed(&f, PAKISTAN_WINDOW).len(), 4);
        assert!(parse_feed(&f, WORLDWIDE_WINDOW).is_empty());
        assert!(parse_feed(&[], PAKISTAN_WINDOW).is_empty());
    }

    #[test]
    fn entries_without_position_are_skipped() {
        let f = vec![
            json!({ "legal": "metadata" }),
            json!({ "company": "NoTitle" }),
            json!("not an object"),
            json!({ "position": "Kept" }),
        ];
        let got = parse_feed(&f, PAKISTAN_WINDOW);
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].title, "Kept");
        assert_eq!(got[0].requirements, None);
    }

    #[test]
    fn normalized_job_uses_tags_and_sanitized_description() {
        let raw = parse_feed(&feed(1), PAKISTAN_WINDOW).remove(0);
        let r = REMOTEOK_PAKISTAN_PROFILE.normalize(raw, Utc::now()).unwrap();
        assert_eq!(r.requirements(), "rust, backend");
        assert_eq!(r.description(), "Build things");
        assert_eq!(r.location(), Some("Remote (Pakistan Friendly)"));
        assert_eq!(r.created_by(), "auto_scraper_remoteok");
    }

    #[test]
    fn missing_tags_fall_back_to_default_requirements() {
        let raw = RawListing::titled("X");
        let r = REMOTEOK_WORLDWIDE_PROFILE.normalize(raw, Utc::now()).unwrap();
        assert_eq!(r.requirements(), DEFAULT_TAGS);
        assert_eq!(r.company(), Some("Global Company"));
        assert_eq!(r.location_type(), LocationType::Worldwide);
    }
}
