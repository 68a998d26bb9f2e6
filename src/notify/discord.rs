// src/notify/discord.rs
use anyhow::{anyhow, Context, Result};
use metrics::counter;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;

use super::{Delivery, Notifier, RunSummary};
use crate::config::NotifySettings;
use crate::ingest::Category;

pub const ENV_WEBHOOK: &str = "DISCORD_WEBHOOK";

#[derive(Clone)]
pub struct DiscordNotifier {
    webhook: Option<String>,
    client: Client,
    timeout: Duration,
    settings: NotifySettings,
}

#[derive(Debug, Serialize)]
struct DiscordWebhookPayload<'a> {
    content: String,
    username: &'a str,
    avatar_url: &'a str,
}

fn emoji(category: Category) -> &'static str {
    match category {
        Category::PakistanJobs => "🇵🇰",
        Category::WorldwideJobs => "🌍",
        Category::Courses => "📚",
        Category::Tools => "🛠️",
    }
}

/// Human-readable run report posted to the channel.
pub fn build_message(summary: &RunSummary, settings: &NotifySettings) -> String {
    let mut lines = vec![
        "🤖 **Freezy Platform Auto-Update Complete!**".to_string(),
        String::new(),
        "📊 **Results:**".to_string(),
    ];
    for c in Category::ALL {
        lines.push(format!("• {} {}: {}", emoji(c), c.label(), summary.count(c)));
    }
    lines.push(format!("• **Total New Resources: {}**", summary.total));
    lines.push(String::new());
    lines.push(format!("🔗 **Check them out:** {}", settings.resources_url));
    lines.push(String::new());
    lines.push(format!("⏰ **Next update:** {}", settings.next_update));
    lines.join("\n")
}

impl DiscordNotifier {
    pub fn new(webhook: Option<String>, settings: NotifySettings) -> Self {
        Self {
            webhook: webhook.filter(|w| !w.trim().is_empty()),
            client: Client::new(),
            timeout: Duration::from_secs(10),
            settings,
        }
    }

    /// Webhook from `DISCORD_WEBHOOK`; unset disables delivery.
    pub fn from_env(settings: NotifySettings) -> Self {
        Self::new(std::env::var(ENV_WEBHOOK).ok(), settings)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.webhook.is_some()
    }

    /// Post the summary once. Only `204 No Content` counts as delivered.
    pub async fn send(&self, summary: &RunSummary) -> Result<Delivery> {
        let Some(url) = &self.webhook else {
            return Ok(Delivery::Disabled);
        };
        let payload = DiscordWebhookPayload {
            content: build_message(summary, &self.settings),
            username: &self.settings.username,
            avatar_url: &self.settings.avatar_url,
        };
        let rsp = self
            .client
            .post(url)
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await
            .context("Discord webhook request failed")?;
        if rsp.status() != StatusCode::NO_CONTENT {
            return Err(anyhow!("Discord webhook returned {}", rsp.status()));
        }
        Ok(Delivery::Sent)
    }
}

#[async_trait::async_trait]
impl Notifier for DiscordNotifier {
    async fn notify(&self, summary: &RunSummary) -> Delivery {
        match self.send(summary).await {
            Ok(delivery) => {
                match delivery {
                    Delivery::Sent => tracing::info!("Discord notification sent"),
                    _ => tracing::debug!("Discord disabled (no {ENV_WEBHOOK})"),
                }
                delivery
            }
            Err(e) => {
                counter!("notify_failures_total").increment(1);
                tracing::warn!(error = ?e, "Discord notification failed");
                Delivery::Failed
            }
        }
    }
}
