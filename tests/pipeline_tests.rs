//! Pipeline integration tests
//!
//! Uses `wiremock` to serve listing pages locally, so no real network traffic
//! is made. Records land in a `MemoryStore` or a temporary JSON lines store.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use classified_extract::error::{Error, FetchError};
use classified_extract::extraction::ExtractOptions;
use classified_extract::retriever::{HttpRetriever, RetrieverConfig};
use classified_extract::store::{JsonLinesStore, MemoryStore, RecordStore};
use classified_extract::Pipeline;

const LISTING: &str = include_str!("fixtures/listing.html");

fn retriever() -> HttpRetriever {
    HttpRetriever::new(&RetrieverConfig {
        timeout_ms: 5_000,
        user_agent: "clx-test/0.1".to_string(),
    })
    .expect("failed to build test retriever")
}

async fn serve_listing(server: &MockServer, route: &str, body: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(status).set_body_raw(body.to_string(), "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

// ---------------------------------------------------------------------------
// Happy path
// ---------------------------------------------------------------------------

#[tokio::test]
async fn process_saves_record_and_returns_id() {
    let server = MockServer::start().await;
    serve_listing(&server, "/sby/mcy/6299581569.html", LISTING, 200).await;

    let store = Arc::new(MemoryStore::new());
    let pipeline = Pipeline::new(retriever(), store.clone(), ExtractOptions::default());
    let url = format!("{}/sby/mcy/6299581569.html", server.uri());

    let id = pipeline.process(&url, "motorcycles").await.unwrap();

    assert!(!id.is_empty());
    assert_eq!(store.count("motorcycles").unwrap(), 1);
    assert_eq!(store.count("cars").unwrap(), 0);

    let saved = store.get("motorcycles", &id).expect("record saved under id");
    assert_eq!(saved.url.as_deref(), Some(url.as_str()));
    assert_eq!(saved.price, Some(450.0));
    assert_eq!(saved.thumb_links.len(), 3);
    assert_eq!(saved.raw, LISTING);
}

#[tokio::test]
async fn process_generates_distinct_ids() {
    let server = MockServer::start().await;
    serve_listing(&server, "/listing.html", LISTING, 200).await;

    let store = Arc::new(MemoryStore::new());
    let pipeline = Pipeline::new(retriever(), store.clone(), ExtractOptions::default());
    let url = format!("{}/listing.html", server.uri());

    let first = pipeline.process(&url, "bikes").await.unwrap();
    let second = pipeline.process(&url, "bikes").await.unwrap();

    assert_ne!(first, second);
    assert_eq!(store.count("bikes").unwrap(), 2);
}

#[tokio::test]
async fn retriever_sends_configured_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/listing.html"))
        .and(header("user-agent", "clx-test/0.1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LISTING))
        .expect(1)
        .mount(&server)
        .await;

    let body = retriever()
        .fetch(&format!("{}/listing.html", server.uri()))
        .await
        .unwrap();
    assert_eq!(body, LISTING);
}

#[tokio::test]
async fn preview_does_not_store() {
    let server = MockServer::start().await;
    serve_listing(&server, "/listing.html", LISTING, 200).await;

    let store = Arc::new(MemoryStore::new());
    let pipeline = Pipeline::new(retriever(), store.clone(), ExtractOptions::default());

    let record = pipeline
        .preview(&format!("{}/listing.html", server.uri()))
        .await
        .unwrap();

    assert_eq!(record.titletextonly.as_deref(), Some("2005 Honda CBR600RR"));
    assert_eq!(store.count("listings").unwrap(), 0);
}

#[tokio::test]
async fn process_appends_json_lines() {
    let server = MockServer::start().await;
    serve_listing(&server, "/listing.html", LISTING, 200).await;

    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(JsonLinesStore::open(dir.path()).unwrap());
    let pipeline = Pipeline::new(retriever(), store.clone(), ExtractOptions::default());
    let url = format!("{}/listing.html", server.uri());

    let id = pipeline.process(&url, "motorcycles").await.unwrap();

    let contents = std::fs::read_to_string(store.collection_path("motorcycles")).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 1);

    let saved: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(saved["_id"], serde_json::json!(id));
    assert_eq!(saved["url"], serde_json::json!(url));
    assert_eq!(saved["attributes"]["odometer"], serde_json::json!("21000"));
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn process_returns_fetch_error_on_404() {
    let server = MockServer::start().await;
    serve_listing(&server, "/gone.html", "not found", 404).await;

    let store = Arc::new(MemoryStore::new());
    let pipeline = Pipeline::new(retriever(), store.clone(), ExtractOptions::default());

    let err = pipeline
        .process(&format!("{}/gone.html", server.uri()), "bikes")
        .await
        .unwrap_err();

    assert!(
        matches!(err, Error::Fetch(FetchError::HttpStatus { status: 404, .. })),
        "expected HttpStatus 404, got {err:?}"
    );
    assert_eq!(store.count("bikes").unwrap(), 0);
}

#[tokio::test]
async fn process_rejects_non_listing_page() {
    let server = MockServer::start().await;
    serve_listing(
        &server,
        "/search.html",
        "<html><head><title>search</title></head><body><ul></ul></body></html>",
        200,
    )
    .await;

    let store = Arc::new(MemoryStore::new());
    let pipeline = Pipeline::new(retriever(), store.clone(), ExtractOptions::default());

    let err = pipeline
        .process(&format!("{}/search.html", server.uri()), "bikes")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "structural");
    assert_eq!(store.count("bikes").unwrap(), 0);
}

#[tokio::test]
async fn lenient_pipeline_accepts_listing_without_photos() {
    let start = LISTING.find("<figure").unwrap();
    let end = LISTING.find("</figure>").unwrap() + "</figure>".len();
    let no_photos = format!("{}{}", &LISTING[..start], &LISTING[end..]);

    let server = MockServer::start().await;
    serve_listing(&server, "/listing.html", &no_photos, 200).await;
    let url = format!("{}/listing.html", server.uri());

    let strict = Pipeline::new(retriever(), Arc::new(MemoryStore::new()), ExtractOptions::default());
    assert_eq!(strict.preview(&url).await.unwrap_err().kind(), "structural");

    let lenient = Pipeline::new(retriever(), Arc::new(MemoryStore::new()), ExtractOptions::lenient());
    assert!(lenient.preview(&url).await.unwrap().thumb_links.is_empty());
}
