// src/store/firestore.rs
//! Firestore over its REST API (`runQuery` + `createDocument`).

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, SecondsFormat, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{Document, FieldValue, Record, ResourceStore, StoreError};
use crate::config::{ServiceAccountKey, StoreCredentials};

const FIRESTORE_API_BASE: &str = "https://firestore.googleapis.com/v1/";
const DATASTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
/// Tokens this close to expiry are refreshed before use.
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Debug, Clone)]
struct AccessToken {
    token: String,
    expires_at: DateTime<Utc>,
}

enum Auth {
    /// Emulator accepts any bearer; "owner" bypasses security rules.
    Static(String),
    ServiceAccount {
        key: ServiceAccountKey,
        cached: Mutex<Option<AccessToken>>,
    },
}

pub struct FirestoreStore {
    http: Client,
    base_url: Url,
    project_id: String,
    auth: Auth,
}

impl fmt::Debug for FirestoreStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FirestoreStore")
            .field("base_url", &self.base_url)
            .field("project_id", &self.project_id)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

#[derive(Deserialize)]
struct RunQueryItem {
    #[serde(default)]
    document: Option<FsDocument>,
}

#[derive(Deserialize)]
struct FsDocument {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

impl FirestoreStore {
    /// Build the client and prove the credentials work by obtaining a token.
    /// This is the run's only fatal step.
    pub async fn connect(creds: StoreCredentials, timeout: Duration) -> Result<Self> {
        let store = match creds {
            StoreCredentials::Emulator { host, project_id } => {
                let base_url = Url::parse(&format!("http://{host}/v1/"))
                    .with_context(|| format!("invalid emulator host {host}"))?;
                Self::with_base_url(base_url, project_id, None, timeout)?
            }
            StoreCredentials::ServiceAccount(key) => {
                let base_url = Url::parse(FIRESTORE_API_BASE).context("firestore base url")?;
                let project_id = key.project_id.clone();
                Self::with_base_url(base_url, project_id, Some(key), timeout)?
            }
        };
        store
            .bearer()
            .await
            .context("obtaining Firestore access token")?;
        info!(project = %store.project_id, "Firestore store ready");
        Ok(store)
    }

    /// Point at an arbitrary REST root (emulator, test server). Without a key the
    /// static emulator bearer is used.
    pub fn with_base_url(
        base_url: Url,
        project_id: String,
        key: Option<ServiceAccountKey>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("freezy-ingest/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("building Firestore HTTP client")?;
        let auth = match key {
            Some(key) => Auth::ServiceAccount {
                key,
                cached: Mutex::new(None),
            },
            None => Auth::Static("owner".to_string()),
        };
        Ok(Self {
            http,
            base_url,
            project_id,
            auth,
        })
    }

    fn documents_path(&self) -> String {
        format!("projects/{}/databases/(default)/documents", self.project_id)
    }

    fn endpoint(&self, suffix: &str) -> Result<Url, StoreError> {
        self.base_url
            .join(&format!("{}{}", self.documents_path(), suffix))
            .map_err(|e| StoreError::Transport(format!("invalid Firestore URL: {e}")))
    }

    async fn bearer(&self) -> Result<String, StoreError> {
        match &self.auth {
            Auth::Static(token) => Ok(token.clone()),
            Auth::ServiceAccount { key, cached } => {
                let mut guard = cached.lock().await;
                let now = Utc::now();
                if let Some(tok) = guard.as_ref() {
                    if tok.expires_at - ChronoDuration::seconds(TOKEN_REFRESH_MARGIN_SECS) > now {
                        return Ok(tok.token.clone());
                    }
                }
                let fresh = self.fetch_token(key, now).await?;
                let token = fresh.token.clone();
                *guard = Some(fresh);
                Ok(token)
            }
        }
    }

    async fn fetch_token(
        &self,
        key: &ServiceAccountKey,
        now: DateTime<Utc>,
    ) -> Result<AccessToken, StoreError> {
        let assertion = sign_assertion(key, now)?;
        debug!(token_uri = %key.token_uri, "requesting access token");
        let res = self
            .http
            .post(&key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| StoreError::Auth(format!("token endpoint unreachable: {e}")))?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(StoreError::Auth(format!("token endpoint {status}: {body}")));
        }
        let payload: TokenResponse = res
            .json()
            .await
            .map_err(|e| StoreError::Auth(format!("invalid token response: {e}")))?;
        Ok(AccessToken {
            token: payload.access_token,
            expires_at: now + ChronoDuration::seconds(payload.expires_in),
        })
    }

    async fn post_json(&self, url: Url, body: &Value) -> Result<reqwest::Response, StoreError> {
        let bearer = self.bearer().await?;
        debug!(url = %url, payload = %body, "sending firestore request");
        let res = self
            .http
            .post(url)
            .bearer_auth(bearer)
            .json(body)
            .send()
            .await?;
        Ok(res)
    }
}

fn sign_assertion(key: &ServiceAccountKey, now: DateTime<Utc>) -> Result<String, StoreError> {
    let claims = AssertionClaims {
        iss: &key.client_email,
        scope: DATASTORE_SCOPE,
        aud: &key.token_uri,
        iat: now.timestamp(),
        exp: (now + ChronoDuration::hours(1)).timestamp(),
    };
    let mut header = Header::new(Algorithm::RS256);
    header.kid = key.private_key_id.clone();
    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .map_err(|e| StoreError::Auth(format!("invalid service account private key: {e}")))?;
    jsonwebtoken::encode(&header, &claims, &encoding_key)
        .map_err(|e| StoreError::Auth(format!("signing token assertion: {e}")))
}

pub(crate) fn encode_value(v: &FieldValue) -> Value {
    match v {
        FieldValue::Null => json!({ "nullValue": null }),
        FieldValue::Bool(b) => json!({ "booleanValue": b }),
        // Firestore transports int64 as a decimal string.
        FieldValue::Integer(i) => json!({ "integerValue": i.to_string() }),
        FieldValue::String(s) => json!({ "stringValue": s }),
        FieldValue::Timestamp(ts) => {
            json!({ "timestampValue": ts.to_rfc3339_opts(SecondsFormat::Micros, true) })
        }
    }
}

pub(crate) fn decode_value(v: &Value) -> Option<FieldValue> {
    let obj = v.as_object()?;
    if obj.contains_key("nullValue") {
        return Some(FieldValue::Null);
    }
    if let Some(b) = obj.get("booleanValue").and_then(Value::as_bool) {
        return Some(FieldValue::Bool(b));
    }
    if let Some(i) = obj.get("integerValue") {
        let parsed = match i {
            Value::String(s) => s.parse().ok(),
            other => other.as_i64(),
        };
        return parsed.map(FieldValue::Integer);
    }
    if let Some(s) = obj.get("stringValue").and_then(Value::as_str) {
        return Some(FieldValue::String(s.to_string()));
    }
    if let Some(ts) = obj.get("timestampValue").and_then(Value::as_str) {
        return DateTime::parse_from_rfc3339(ts)
            .ok()
            .map(|dt| FieldValue::Timestamp(dt.with_timezone(&Utc)));
    }
    None
}

fn encode_record(record: &Record) -> Value {
    let fields: Map<String, Value> = record
        .iter()
        .map(|(k, v)| (k.clone(), encode_value(v)))
        .collect();
    json!({ "fields": fields })
}

fn decode_document(doc: FsDocument) -> Document {
    let id = doc.name.rsplit('/').next().unwrap_or_default().to_string();
    let fields = doc
        .fields
        .iter()
        .filter_map(|(k, v)| decode_value(v).map(|fv| (k.clone(), fv)))
        .collect();
    Document { id, fields }
}

pub(crate) fn build_equality_query(collection: &str, field: &str, value: &FieldValue) -> Value {
    json!({
        "structuredQuery": {
            "from": [{ "collectionId": collection }],
            "where": {
                "fieldFilter": {
                    "field": { "fieldPath": field },
                    "op": "EQUAL",
                    "value": encode_value(value)
                }
            },
            "limit": 1
        }
    })
}

async fn error_from(res: reqwest::Response) -> StoreError {
    let status = res.status();
    let body = res.text().await.unwrap_or_default();
    match status {
        StatusCode::CONFLICT => StoreError::Conflict(body),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StoreError::Auth(body),
        s => StoreError::Status {
            status: s.as_u16(),
            body,
        },
    }
}

#[async_trait]
impl ResourceStore for FirestoreStore {
    /// Existence check: at most one matching document is returned.
    async fn query_equals(
        &self,
        collection: &str,
        field: &str,
        value: &FieldValue,
    ) -> Result<Vec<Document>, StoreError> {
        let url = self.endpoint(":runQuery")?;
        let res = self
            .post_json(url, &build_equality_query(collection, field, value))
            .await?;
        if !res.status().is_success() {
            return Err(error_from(res).await);
        }
        let items: Vec<RunQueryItem> = res.json().await?;
        Ok(items
            .into_iter()
            .filter_map(|it| it.document)
            .map(decode_document)
            .collect())
    }

    async fn add(&self, collection: &str, record: &Record) -> Result<String, StoreError> {
        let url = self.endpoint(&format!("/{collection}"))?;
        let res = self.post_json(url, &encode_record(record)).await?;
        if !res.status().is_success() {
            return Err(error_from(res).await);
        }
        let doc: FsDocument = res.json().await?;
        Ok(decode_document(doc).id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn values_survive_encode_decode() {
        let ts = Utc.with_ymd_and_hms(2025, 9, 6, 9, 0, 0).unwrap();
        for v in [
            FieldValue::Null,
            FieldValue::Bool(true),
            FieldValue::Integer(-42),
            FieldValue::String("Figma".into()),
            FieldValue::Timestamp(ts),
        ] {
            assert_eq!(decode_value(&encode_value(&v)), Some(v));
        }
    }

    #[test]
    fn integer_is_sent_as_string() {
        assert_eq!(
            encode_value(&FieldValue::Integer(7)),
            json!({ "integerValue": "7" })
        );
    }

    #[test]
    fn equality_query_shape() {
        let q = build_equality_query("resources", "title", &FieldValue::from("X"));
        let filter = &q["structuredQuery"]["where"]["fieldFilter"];
        assert_eq!(filter["op"], "EQUAL");
        assert_eq!(filter["field"]["fieldPath"], "title");
        assert_eq!(filter["value"]["stringValue"], "X");
        assert_eq!(q["structuredQuery"]["limit"], 1);
        assert_eq!(q["structuredQuery"]["from"][0]["collectionId"], "resources");
    }

    #[test]
    fn document_id_is_last_path_segment() {
        let doc = FsDocument {
            name: "projects/p/databases/(default)/documents/resources/abc123".into(),
            fields: Map::new(),
        };
        assert_eq!(decode_document(doc).id, "abc123");
    }

    #[test]
    fn garbage_private_key_is_an_auth_error() {
        let key = ServiceAccountKey::from_json(
            r#"{"project_id":"p","client_email":"e@p","private_key":"not a pem"}"#,
        )
        .unwrap();
        let err = sign_assertion(&key, Utc::now()).unwrap_err();
        assert!(matches!(err, StoreError::Auth(_)));
    }
}
