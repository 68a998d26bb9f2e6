//! Manual verification harness for the ingest pipeline.
//!
//! No flag runs the basic checks (store connection + scraping).

use anyhow::{bail, Result};
use chrono::Utc;
use clap::{ArgGroup, Parser};
use freezy_ingest::config::{load_settings_default, IngestSettings, StoreCredentials};
use freezy_ingest::ingest::normalize::{FieldDefaults, RawListing, SourceProfile};
use freezy_ingest::ingest::{default_collectors, HttpFetcher};
use freezy_ingest::{
    init_tracing, DiscordNotifier, FirestoreStore, LocationType, MemoryStore, Persister, Resource,
    ResourceKind, RunSummary,
};
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "harness", about = "Exercise the ingest pipeline piece by piece")]
#[command(group(ArgGroup::new("mode").args(["full", "firebase", "scrape", "save"])))]
struct Cli {
    /// Run every check, saving only to an in-memory store.
    #[arg(long)]
    full: bool,
    /// Only check the store connection.
    #[arg(long)]
    firebase: bool,
    /// Only run the collectors.
    #[arg(long)]
    scrape: bool,
    /// Write one test resource to the real store.
    #[arg(long)]
    save: bool,
}

const REQUIRED_FIELDS: [&str; 8] = [
    "title",
    "type",
    "description",
    "location",
    "status",
    "created_at",
    "updated_at",
    "created_by",
];

const TEST_PROFILE: SourceProfile = SourceProfile::new(
    "test_script",
    "test",
    ResourceKind::Job,
    LocationType::Worldwide,
)
.with_defaults(FieldDefaults {
    description: "This is a test resource created by the automation test script",
    location: Some("Test Location"),
    company: Some("Test Company"),
    source_url: "https://test.com",
    requirements: "Test requirements",
    benefits: "Test benefits",
    duration: "Test",
});

fn test_resource() -> Option<Resource> {
    let now = Utc::now();
    let title = format!("Test Resource {}", now.format("%H%M%S"));
    TEST_PROFILE.normalize(RawListing::titled(title), now)
}

async fn check_store(settings: &IngestSettings) -> Result<FirestoreStore> {
    let creds = StoreCredentials::from_env()?;
    FirestoreStore::connect(creds, settings.http_timeout()).await
}

async fn check_scraping(settings: &IngestSettings) -> Result<Vec<Resource>> {
    let fetcher = HttpFetcher::from_settings(settings)?;
    let mut samples = Vec::new();
    for c in default_collectors(settings, &fetcher) {
        let found = c.collect().await.into_resources();
        info!(category = %c.category(), found = found.len(), "collector checked");
        samples.extend(found.into_iter().take(1));
    }
    Ok(samples)
}

fn check_structure(samples: &[Resource]) -> Result<()> {
    for r in samples {
        let rec = r.to_record();
        for field in REQUIRED_FIELDS {
            if !rec.contains_key(field) {
                bail!("missing field '{field}' in {}", r.title());
            }
        }
    }
    info!(checked = samples.len(), "data structure validation passed");
    Ok(())
}

async fn check_save_dry_run() -> Result<()> {
    let persister = Persister::new(MemoryStore::new());
    let resources: Vec<Resource> = test_resource().into_iter().collect();
    let report = persister.persist(&resources).await;
    if report.saved != resources.len() {
        bail!("dry run saved {} of {}", report.saved, resources.len());
    }
    info!(saved = report.saved, "dry run save ok");
    Ok(())
}

async fn check_save(settings: &IngestSettings) -> Result<()> {
    let store = check_store(settings).await?;
    let persister = Persister::new(store);
    let resources: Vec<Resource> = test_resource().into_iter().collect();
    let report = persister.persist(&resources).await;
    if report.error > 0 {
        bail!("{} test resource(s) failed to save", report.error);
    }
    info!(saved = report.saved, "test resource saved to store");
    Ok(())
}

async fn check_notifications(settings: &IngestSettings) -> Result<()> {
    let notifier = DiscordNotifier::from_env(settings.notify.clone());
    if !notifier.is_enabled() {
        warn!("DISCORD_WEBHOOK not set - skipping notification test");
        return Ok(());
    }
    let summary = RunSummary {
        pakistan_jobs: 5,
        worldwide_jobs: 8,
        courses: 3,
        tools: 4,
        total: 20,
    };
    notifier.send(&summary).await?;
    info!("Discord notification test sent");
    Ok(())
}

fn report(name: &str, res: &Result<impl Sized>) -> bool {
    match res {
        Ok(_) => {
            info!(check = name, "PASSED");
            true
        }
        Err(e) => {
            error!(check = name, error = ?e, "FAILED");
            false
        }
    }
}

async fn run_full(settings: &IngestSettings) -> bool {
    let mut passed = 0usize;
    let total = 5usize;

    passed += report("store connection", &check_store(settings).await) as usize;
    let scraped = check_scraping(settings).await;
    passed += report("scraping functions", &scraped) as usize;
    let structure = match &scraped {
        Ok(samples) => check_structure(samples),
        Err(_) => Err(anyhow::anyhow!("no samples: scraping failed")),
    };
    passed += report("data structure", &structure) as usize;
    passed += report("store save (dry run)", &check_save_dry_run().await) as usize;
    passed += report("notifications", &check_notifications(settings).await) as usize;

    info!(passed, total, "test results");
    passed == total
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let _ = dotenvy::dotenv();
    init_tracing();
    let cli = Cli::parse();

    let settings = match load_settings_default() {
        Ok(s) => s,
        Err(e) => {
            error!(error = ?e, "invalid ingest settings");
            std::process::exit(1);
        }
    };

    let ok = if cli.full {
        run_full(&settings).await
    } else if cli.firebase {
        report("store connection", &check_store(&settings).await)
    } else if cli.scrape {
        report("scraping functions", &check_scraping(&settings).await)
    } else if cli.save {
        report("store save", &check_save(&settings).await)
    } else {
        info!("running basic tests (use --full for the complete suite)");
        let store_ok = report("store connection", &check_store(&settings).await);
        let scrape_ok = report("scraping functions", &check_scraping(&settings).await);
        store_ok && scrape_ok
    };

    std::process::exit(if ok { 0 } else { 1 });
}
