// tests/notify_discord.rs
//
// Webhook delivery against a local axum server standing in for Discord.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use freezy_ingest::config::NotifySettings;
use freezy_ingest::notify::Delivery;
use freezy_ingest::{DiscordNotifier, Notifier, RunSummary};
use serde_json::Value;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
struct Hook {
    status: StatusCode,
    seen: Arc<Mutex<Vec<Value>>>,
}

async fn webhook(State(h): State<Hook>, Json(body): Json<Value>) -> StatusCode {
    h.seen.lock().unwrap().push(body);
    h.status
}

async fn spawn_hook(status: StatusCode) -> (String, Arc<Mutex<Vec<Value>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/hook", post(webhook))
        .with_state(Hook {
            status,
            seen: seen.clone(),
        });
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/hook"), seen)
}

fn summary() -> RunSummary {
    RunSummary {
        pakistan_jobs: 2,
        worldwide_jobs: 3,
        courses: 5,
        tools: 6,
        total: 16,
    }
}

#[tokio::test]
async fn no_webhook_sends_nothing() {
    let n = DiscordNotifier::new(None, NotifySettings::default());
    assert_eq!(n.send(&summary()).await.unwrap(), Delivery::Disabled);
    assert_eq!(n.notify(&summary()).await, Delivery::Disabled);
}

#[tokio::test]
async fn no_content_reply_counts_as_sent() {
    let (url, seen) = spawn_hook(StatusCode::NO_CONTENT).await;
    let n = DiscordNotifier::new(Some(url), NotifySettings::default());

    assert_eq!(n.send(&summary()).await.unwrap(), Delivery::Sent);
    assert_eq!(n.notify(&summary()).await, Delivery::Sent);

    let bodies = seen.lock().unwrap().clone();
    assert_eq!(bodies.len(), 2);
    assert_eq!(bodies[0]["username"], "Freezy Bot");
    let content = bodies[0]["content"].as_str().unwrap();
    assert!(content.contains("Pakistan Jobs: 2"));
    assert!(content.contains("Total New Resources: 16"));
}

#[tokio::test]
async fn other_statuses_are_failures_without_retry() {
    for status in [StatusCode::OK, StatusCode::INTERNAL_SERVER_ERROR] {
        let (url, seen) = spawn_hook(status).await;
        let n = DiscordNotifier::new(Some(url), NotifySettings::default());
        assert!(n.send(&summary()).await.is_err(), "{status} must not count as sent");
        assert_eq!(n.notify(&summary()).await, Delivery::Failed);
        assert_eq!(seen.lock().unwrap().len(), 2);
    }
}

#[tokio::test]
async fn unreachable_webhook_is_an_error_not_a_panic() {
    let n = DiscordNotifier::new(
        Some("http://127.0.0.1:9/hook".into()),
        NotifySettings::default(),
    )
    .with_timeout(std::time::Duration::from_millis(500));
    assert!(n.send(&summary()).await.is_err());
    assert_eq!(n.notify(&summary()).await, Delivery::Failed);
}

#[serial_test::serial]
#[tokio::test]
async fn from_env_reads_discord_webhook() {
    std::env::remove_var("DISCORD_WEBHOOK");
    assert!(!DiscordNotifier::from_env(NotifySettings::default()).is_enabled());

    std::env::set_var("DISCORD_WEBHOOK", "https://discord.test/api/webhooks/1/x");
    assert!(DiscordNotifier::from_env(NotifySettings::default()).is_enabled());
    std::env::remove_var("DISCORD_WEBHOOK");
}
