// src/store/memory.rs
//! In-process store for tests and the harness dry run.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use super::{Document, FieldValue, Record, ResourceStore, StoreError};

#[derive(Debug, Default)]
struct Inner {
    collections: HashMap<String, Vec<Document>>,
    next_id: u64,
}

/// `Mutex`-guarded map of collection → documents.
///
/// Failure injection (`fail_query_for`, `fail_add_for`) keys on the `title`
/// field so tests can break one record in a batch.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    unique_field: Option<String>,
    fail_query_titles: HashSet<String>,
    fail_add_titles: HashSet<String>,
    fail_all: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject `add` with [`StoreError::Conflict`] when `field` already holds the value.
    pub fn with_unique_field(mut self, field: &str) -> Self {
        self.unique_field = Some(field.to_string());
        self
    }

    pub fn fail_query_for(mut self, title: &str) -> Self {
        self.fail_query_titles.insert(title.to_string());
        self
    }

    pub fn fail_add_for(mut self, title: &str) -> Self {
        self.fail_add_titles.insert(title.to_string());
        self
    }

    /// Every call fails with a transport error.
    pub fn unreachable() -> Self {
        Self {
            fail_all: true,
            ..Self::default()
        }
    }

    /// Seed a document without going through `add`.
    pub fn insert(&self, collection: &str, fields: Record) -> String {
        let mut inner = self.inner.lock().expect("memory store mutex poisoned");
        inner.next_id += 1;
        let id = format!("mem-{}", inner.next_id);
        inner
            .collections
            .entry(collection.to_string())
            .or_default()
            .push(Document {
                id: id.clone(),
                fields,
            });
        id
    }

    pub fn documents(&self, collection: &str) -> Vec<Document> {
        let inner = self.inner.lock().expect("memory store mutex poisoned");
        inner.collections.get(collection).cloned().unwrap_or_default()
    }

    pub fn count_where(&self, collection: &str, field: &str, value: &FieldValue) -> usize {
        self.documents(collection)
            .iter()
            .filter(|d| d.fields.get(field) == Some(value))
            .count()
    }

    fn title_of(record: &Record) -> &str {
        record
            .get("title")
            .and_then(FieldValue::as_str)
            .unwrap_or_default()
    }
}

#[async_trait]
impl ResourceStore for MemoryStore {
    async fn query_equals(
        &self,
        collection: &str,
        field: &str,
        value: &FieldValue,
    ) -> Result<Vec<Document>, StoreError> {
        if self.fail_all {
            return Err(StoreError::Transport("memory store unreachable".into()));
        }
        if field == "title" {
            if let Some(t) = value.as_str() {
                if self.fail_query_titles.contains(t) {
                    return Err(StoreError::Transport(format!("injected query failure for {t}")));
                }
            }
        }
        Ok(self
            .documents(collection)
            .into_iter()
            .filter(|d| d.fields.get(field) == Some(value))
            .collect())
    }

    async fn add(&self, collection: &str, record: &Record) -> Result<String, StoreError> {
        if self.fail_all {
            return Err(StoreError::Transport("memory store unreachable".into()));
        }
        let title = Self::title_of(record);
        if self.fail_add_titles.contains(title) {
            return Err(StoreError::Status {
                status: 503,
                body: format!("injected write failure for {title}"),
            });
        }

        let mut inner = self.inner.lock().expect("memory store mutex poisoned");
        if let Some(field) = &self.unique_field {
            let clash = inner.collections.get(collection).is_some_and(|docs| {
                docs.iter()
                    .any(|d| d.fields.get(field).is_some() && d.fields.get(field) == record.get(field))
            });
            if clash {
                return Err(StoreError::Conflict(format!("{field} already present")));
            }
        }

        inner.next_id += 1;
        let id = format!("mem-{}", inner.next_id);
        inner
            .collections
            .entry(collection.to_string())
            .or_default()
            .push(Document {
                id: id.clone(),
                fields: record.clone(),
            });
        Ok(id)
    }
}
