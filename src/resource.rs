// src/resource.rs
//! The `Resource` record every collector produces and the persister stores.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::store::{FieldValue, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Job,
    Course,
    Tool,
}

impl ResourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Job => "job",
            ResourceKind::Course => "course",
            ResourceKind::Tool => "tool",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResourceStatus {
    #[default]
    Active,
}

impl ResourceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceStatus::Active => "active",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationType {
    Pakistan,
    Worldwide,
}

impl LocationType {
    pub fn as_str(self) -> &'static str {
        match self {
            LocationType::Pakistan => "Pakistan",
            LocationType::Worldwide => "Worldwide",
        }
    }
}

/// A normalized job/course/tool listing.
///
/// Built only by [`crate::ingest::normalize::SourceProfile::normalize`]; fields are
/// read-only afterwards so the persister can only write or skip it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub(crate) title: String,
    #[serde(rename = "type")]
    pub(crate) kind: ResourceKind,
    pub(crate) description: String,
    pub(crate) location: Option<String>,
    pub(crate) company: Option<String>,
    pub(crate) source_url: String,
    pub(crate) requirements: String,
    pub(crate) benefits: String,
    pub(crate) status: ResourceStatus,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
    pub(crate) created_by: String,
    pub(crate) duration: String,
    pub(crate) scraped_from: String,
    pub(crate) location_type: LocationType,
}

impl Resource {
    pub fn title(&self) -> &str {
        &self.title
    }
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }
    pub fn description(&self) -> &str {
        &self.description
    }
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }
    pub fn company(&self) -> Option<&str> {
        self.company.as_deref()
    }
    pub fn source_url(&self) -> &str {
        &self.source_url
    }
    pub fn requirements(&self) -> &str {
        &self.requirements
    }
    pub fn benefits(&self) -> &str {
        &self.benefits
    }
    pub fn status(&self) -> ResourceStatus {
        self.status
    }
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
    pub fn created_by(&self) -> &str {
        &self.created_by
    }
    pub fn duration(&self) -> &str {
        &self.duration
    }
    pub fn scraped_from(&self) -> &str {
        &self.scraped_from
    }
    pub fn location_type(&self) -> LocationType {
        self.location_type
    }

    /// Flatten into the document shape written to the store.
    /// Field names match the existing `resources` collection.
    pub fn to_record(&self) -> Record {
        let mut rec = Record::new();
        let s = |v: &str| FieldValue::String(v.to_string());
        rec.insert("title".into(), s(&self.title));
        rec.insert("type".into(), s(self.kind.as_str()));
        rec.insert("description".into(), s(&self.description));
        if let Some(loc) = &self.location {
            rec.insert("location".into(), s(loc));
        }
        if let Some(company) = &self.company {
            rec.insert("company".into(), s(company));
        }
        rec.insert("source_url".into(), s(&self.source_url));
        rec.insert("requirements".into(), s(&self.requirements));
        rec.insert("benefits".into(), s(&self.benefits));
        rec.insert("status".into(), s(self.status.as_str()));
        rec.insert("created_at".into(), FieldValue::Timestamp(self.created_at));
        rec.insert("updated_at".into(), FieldValue::Timestamp(self.updated_at));
        rec.insert("created_by".into(), s(&self.created_by));
        rec.insert("duration".into(), s(&self.duration));
        rec.insert("scraped_from".into(), s(&self.scraped_from));
        rec.insert("location_type".into(), s(self.location_type.as_str()));
        rec
    }
}
