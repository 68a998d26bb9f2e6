// src/config/mod.rs
pub mod credentials;
pub mod settings;

pub use credentials::{ServiceAccountKey, StoreCredentials};
pub use settings::{load_settings_default, load_settings_from, IngestSettings, NotifySettings};
