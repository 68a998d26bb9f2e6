// src/store/mod.rs
//! Document-store boundary used by the persister.

pub mod firestore;
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use thiserror::Error;

pub use firestore::FirestoreStore;
pub use memory::MemoryStore;

/// Collection every resource is written to.
pub const RESOURCES_COLLECTION: &str = "resources";

/// Scalar values a stored document field can hold.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Integer(i64),
    String(String),
    Timestamp(DateTime<Utc>),
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

pub type Record = BTreeMap<String, FieldValue>;

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Record,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store transport error: {0}")]
    Transport(String),
    #[error("store returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("could not decode store response: {0}")]
    Decode(String),
    /// The store refused the write because an equal document already exists.
    #[error("conflicting document already exists: {0}")]
    Conflict(String),
    #[error("store authentication failed: {0}")]
    Auth(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            StoreError::Decode(e.to_string())
        } else {
            StoreError::Transport(e.to_string())
        }
    }
}

/// Minimal surface of a document store: equality query and insert with a
/// store-generated id.
///
/// There is no isolation between a `query_equals` and a following `add`; two
/// concurrent writers can both observe "absent" for the same title. Stores that
/// can enforce uniqueness report it as [`StoreError::Conflict`].
#[async_trait]
pub trait ResourceStore: Send + Sync {
    async fn query_equals(
        &self,
        collection: &str,
        field: &str,
        value: &FieldValue,
    ) -> Result<Vec<Document>, StoreError>;

    async fn add(&self, collection: &str, record: &Record) -> Result<String, StoreError>;
}

#[async_trait]
impl<S: ResourceStore + ?Sized> ResourceStore for std::sync::Arc<S> {
    async fn query_equals(
        &self,
        collection: &str,
        field: &str,
        value: &FieldValue,
    ) -> Result<Vec<Document>, StoreError> {
        (**self).query_equals(collection, field, value).await
    }

    async fn add(&self, collection: &str, record: &Record) -> Result<String, StoreError> {
        (**self).add(collection, record).await
    }
}
