// tests/store_firestore.rs
//
// FirestoreStore against a small in-process imitation of the REST API:
// `documents:runQuery` answers title lookups, `documents/{collection}` stores.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use chrono::Utc;
use freezy_ingest::ingest::normalize::{RawListing, SourceProfile};
use freezy_ingest::store::{FieldValue, ResourceStore, StoreError};
use freezy_ingest::{FirestoreStore, LocationType, Persister, ResourceKind};
use reqwest::Url;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone, Default)]
struct Fake {
    docs: Arc<Mutex<Vec<Value>>>,
    reject_writes: bool,
}

fn title_in_query(body: &Value) -> Option<String> {
    body["structuredQuery"]["where"]["fieldFilter"]["value"]["stringValue"]
        .as_str()
        .map(str::to_string)
}

async fn handle(State(fake): State<Fake>, uri: Uri, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some("Bearer owner") {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let path = uri.path().to_string();
    let prefix = "/v1/projects/demo/databases/(default)/documents";

    if path == format!("{prefix}:runQuery") {
        let wanted = title_in_query(&body);
        let docs = fake.docs.lock().unwrap();
        let hit = docs
            .iter()
            .find(|d| d["fields"]["title"]["stringValue"].as_str() == wanted.as_deref());
        let reply = match hit {
            Some(d) => json!([{ "document": d, "readTime": "2025-01-01T00:00:00Z" }]),
            None => json!([{ "readTime": "2025-01-01T00:00:00Z" }]),
        };
        return Json(reply).into_response();
    }

    if let Some(collection) = path.strip_prefix(&format!("{prefix}/")) {
        if fake.reject_writes {
            return (StatusCode::CONFLICT, "ALREADY_EXISTS").into_response();
        }
        let mut docs = fake.docs.lock().unwrap();
        let doc = json!({
            "name": format!("projects/demo/databases/(default)/documents/{collection}/doc{}", docs.len() + 1),
            "fields": body["fields"].clone(),
        });
        docs.push(doc.clone());
        return Json(doc).into_response();
    }

    StatusCode::NOT_FOUND.into_response()
}

async fn spawn(fake: Fake) -> FirestoreStore {
    let app = Router::new().fallback(handle).with_state(fake);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    let base = Url::parse(&format!("http://{addr}/v1/")).unwrap();
    FirestoreStore::with_base_url(base, "demo".into(), None, Duration::from_secs(5)).unwrap()
}

const PROFILE: SourceProfile = SourceProfile::new(
    "test_script",
    "test",
    ResourceKind::Tool,
    LocationType::Worldwide,
);

#[tokio::test]
async fn add_then_query_finds_the_document() {
    let fake = Fake::default();
    let store = spawn(fake.clone()).await;

    let r = PROFILE
        .normalize(RawListing::titled("Figma"), Utc::now())
        .unwrap();
    let id = store.add("resources", &r.to_record()).await.unwrap();
    assert_eq!(id, "doc1");

    let stored = fake.docs.lock().unwrap()[0].clone();
    assert_eq!(stored["fields"]["type"]["stringValue"], "tool");
    assert!(stored["fields"]["created_at"]["timestampValue"].is_string());

    let found = store
        .query_equals("resources", "title", &FieldValue::from("Figma"))
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, "doc1");
    assert_eq!(found[0].fields.get("title"), Some(&FieldValue::from("Figma")));

    let none = store
        .query_equals("resources", "title", &FieldValue::from("Canva"))
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn persister_dedups_through_rest_store() {
    let fake = Fake::default();
    let p = Persister::new(spawn(fake.clone()).await);
    let now = Utc::now();
    let batch: Vec<_> = ["Notion", "Canva", "Notion"]
        .iter()
        .filter_map(|t| PROFILE.normalize(RawListing::titled(*t), now))
        .collect();

    let report = p.persist(&batch).await;

    assert_eq!((report.saved, report.duplicate, report.error), (2, 1, 0));
    assert_eq!(fake.docs.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn conflict_status_maps_to_conflict_error() {
    let store = spawn(Fake {
        reject_writes: true,
        ..Fake::default()
    })
    .await;
    let r = PROFILE
        .normalize(RawListing::titled("Trello"), Utc::now())
        .unwrap();
    let err = store.add("resources", &r.to_record()).await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));
}

#[tokio::test]
async fn unreachable_store_is_a_transport_error() {
    let url = Url::parse("http://127.0.0.1:9/v1/").unwrap();
    let dead =
        FirestoreStore::with_base_url(url, "demo".into(), None, Duration::from_millis(300)).unwrap();
    let err = dead
        .query_equals("resources", "title", &FieldValue::from("x"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Transport(_)));
}
