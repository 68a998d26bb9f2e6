// src/config/settings.rs
use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const ENV_PATH: &str = "INGEST_CONFIG_PATH";
const DEFAULT_PATH: &str = "config/ingest.toml";

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

fn default_http_timeout_secs() -> u64 {
    10
}
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}
fn default_rozee_url() -> String {
    "https://www.rozee.pk/jobs".to_string()
}
fn default_remoteok_url() -> String {
    "https://remoteok.io/api".to_string()
}
fn default_rozee_limit() -> usize {
    10
}
fn default_write_delay_ms() -> u64 {
    100
}

/// Tunables for one ingest run. Every key is optional in the TOML file.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct IngestSettings {
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_rozee_url")]
    pub rozee_url: String,
    #[serde(default = "default_remoteok_url")]
    pub remoteok_url: String,
    #[serde(default = "default_rozee_limit")]
    pub rozee_limit: usize,
    /// Pause between records while persisting.
    #[serde(default = "default_write_delay_ms")]
    pub write_delay_ms: u64,
    #[serde(default)]
    pub notify: NotifySettings,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            http_timeout_secs: default_http_timeout_secs(),
            user_agent: default_user_agent(),
            rozee_url: default_rozee_url(),
            remoteok_url: default_remoteok_url(),
            rozee_limit: default_rozee_limit(),
            write_delay_ms: default_write_delay_ms(),
            notify: NotifySettings::default(),
        }
    }
}

impl IngestSettings {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn write_delay(&self) -> Duration {
        Duration::from_millis(self.write_delay_ms)
    }

    fn validate(self) -> Result<Self> {
        if self.http_timeout_secs == 0 {
            bail!("http_timeout_secs must be > 0");
        }
        Ok(self)
    }
}

fn default_username() -> String {
    "Freezy Bot".to_string()
}
fn default_avatar_url() -> String {
    "https://cdn-icons-png.flaticon.com/512/2942/2942813.png".to_string()
}
fn default_resources_url() -> String {
    "https://your-domain.vercel.app/resources".to_string()
}
fn default_next_update() -> String {
    "Tomorrow at 9 AM UTC".to_string()
}

/// Presentation of the run summary message. The webhook URL itself comes from
/// `DISCORD_WEBHOOK`, never from the file.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct NotifySettings {
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default = "default_avatar_url")]
    pub avatar_url: String,
    #[serde(default = "default_resources_url")]
    pub resources_url: String,
    #[serde(default = "default_next_update")]
    pub next_update: String,
}

impl Default for NotifySettings {
    fn default() -> Self {
        Self {
            username: default_username(),
            avatar_url: default_avatar_url(),
            resources_url: default_resources_url(),
            next_update: default_next_update(),
        }
    }
}

/// Load settings from an explicit TOML file.
pub fn load_settings_from(path: &Path) -> Result<IngestSettings> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading ingest settings from {}", path.display()))?;
    parse_settings(&content).with_context(|| format!("parsing {}", path.display()))
}

/// Load settings using env var + fallbacks:
/// 1) $INGEST_CONFIG_PATH (must exist)
/// 2) config/ingest.toml
/// 3) built-in defaults
pub fn load_settings_default() -> Result<IngestSettings> {
    if let Ok(p) = std::env::var(ENV_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_settings_from(&pb);
        }
        return Err(anyhow!("{ENV_PATH} points to non-existent path"));
    }
    let default_p = PathBuf::from(DEFAULT_PATH);
    if default_p.exists() {
        return load_settings_from(&default_p);
    }
    Ok(IngestSettings::default())
}

fn parse_settings(s: &str) -> Result<IngestSettings> {
    let settings: IngestSettings = toml::from_str(s)?;
    settings.validate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{env, fs};

    #[test]
    fn empty_file_gives_defaults() {
        let s = parse_settings("").unwrap();
        assert_eq!(s, IngestSettings::default());
        assert_eq!(s.http_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn partial_file_overrides_only_given_keys() {
        let s = parse_settings(
            r#"
            http_timeout_secs = 4
            write_delay_ms = 0

            [notify]
            username = "Ingest Bot"
            "#,
        )
        .unwrap();
        assert_eq!(s.http_timeout_secs, 4);
        assert_eq!(s.write_delay(), Duration::ZERO);
        assert_eq!(s.notify.username, "Ingest Bot");
        assert_eq!(s.notify.avatar_url, default_avatar_url());
        assert_eq!(s.rozee_limit, 10);
    }

    #[test]
    fn zero_timeout_is_rejected() {
        assert!(parse_settings("http_timeout_secs = 0").is_err());
    }

    #[serial_test::serial]
    #[test]
    fn default_uses_env_then_fallbacks() {
        let old = env::current_dir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        env::set_current_dir(tmp.path()).unwrap();
        env::remove_var(ENV_PATH);

        let s = load_settings_default().unwrap();
        assert_eq!(s, IngestSettings::default());

        let p = tmp.path().join("custom.toml");
        fs::write(&p, "rozee_limit = 3").unwrap();
        env::set_var(ENV_PATH, p.display().to_string());
        assert_eq!(load_settings_default().unwrap().rozee_limit, 3);

        env::set_var(ENV_PATH, tmp.path().join("missing.toml").display().to_string());
        assert!(load_settings_default().is_err());
        env::remove_var(ENV_PATH);

        env::set_current_dir(&old).unwrap();
    }
}
