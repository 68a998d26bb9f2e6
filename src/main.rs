//! Daily ingest entrypoint: run the pipeline once and exit 0 (success) or 1.
//!
//! Scheduled execution supplies `FIREBASE_SERVICE_ACCOUNT` and `DISCORD_WEBHOOK`;
//! local runs read `scripts/firebase-key.json` and `.env`.

use freezy_ingest::config::{load_settings_default, StoreCredentials};
use freezy_ingest::ingest::{default_collectors, HttpFetcher};
use freezy_ingest::{
    init_tracing, run_daily_scraping, DiscordNotifier, FirestoreStore, Persister, Pipeline,
};
use tracing::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    info!("FREEZY PLATFORM AUTOMATION ENGINE");

    let settings = match load_settings_default() {
        Ok(s) => s,
        Err(e) => {
            error!(error = ?e, "invalid ingest settings");
            std::process::exit(1);
        }
    };
    let fetcher = match HttpFetcher::from_settings(&settings) {
        Ok(f) => f,
        Err(e) => {
            error!(error = ?e, "cannot build HTTP client");
            std::process::exit(1);
        }
    };

    let timeout = settings.http_timeout();
    let connect = async move {
        let creds = StoreCredentials::from_env()?;
        FirestoreStore::connect(creds, timeout).await
    };

    let report = run_daily_scraping(connect, |store| {
        let persister = Persister::new(store).with_write_delay(settings.write_delay());
        let notifier =
            DiscordNotifier::from_env(settings.notify.clone()).with_timeout(settings.http_timeout());
        Pipeline::new(
            default_collectors(&settings, &fetcher),
            persister,
            Box::new(notifier),
        )
    })
    .await;

    if report.is_success() {
        info!(
            pakistan_jobs = report.summary.pakistan_jobs,
            worldwide_jobs = report.summary.worldwide_jobs,
            courses = report.summary.courses,
            tools = report.summary.tools,
            saved = report.summary.total,
            "automation completed successfully"
        );
    } else {
        error!(outcome = ?report.outcome, "automation failed");
    }
    std::process::exit(report.exit_code());
}
