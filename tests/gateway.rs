// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Gateway auth and routing behavior, exercised with in-process requests.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use kartoitin::ai::RubricClassifier;
use kartoitin::api::auth::mint_key;
use kartoitin::api::{create_router, ApiState};
use kartoitin::crawler::CrawlOrchestrator;
use kartoitin::pipeline::ScanPipeline;
use kartoitin::policy::PolicyGate;
use kartoitin::quota::QuotaEnforcer;
use kartoitin::search::SearchIndexer;
use kartoitin::store::{MemStore, Store};
use kartoitin::types::{BenchmarkEntry, PolicyType, Scan, Scope};

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn build_app(crawl_base: &str, daily_limit: i32) -> (Arc<MemStore>, Router) {
    let store = Arc::new(MemStore::new());
    let policy = Arc::new(PolicyGate::new(store.clone(), Arc::new(RubricClassifier::new())));
    let quota = QuotaEnforcer::new(store.clone(), daily_limit);
    let crawler = CrawlOrchestrator::new(crawl_base, Some("test-key")).unwrap();
    let pipeline = Arc::new(ScanPipeline::new(
        store.clone(),
        policy.clone(),
        quota,
        crawler,
        SearchIndexer::disabled(),
    ));

    let state = Arc::new(ApiState {
        store: store.clone(),
        pipeline,
        policy,
    });
    (store, create_router(state))
}

async fn issue_key(store: &MemStore, scopes: Vec<Scope>) -> String {
    let minted = mint_key("test", scopes, None);
    store.insert_api_key(&minted.record).await.unwrap();
    minted.plaintext
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn missing_key_is_unauthorized() {
    let (_store, app) = build_app("http://127.0.0.1:9", 10).await;

    let response = app
        .oneshot(Request::builder().uri("/scans").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Missing API key");
}

#[tokio::test]
async fn unknown_key_is_unauthorized() {
    let (_store, app) = build_app("http://127.0.0.1:9", 10).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/scans")
                .header("x-api-key", "krt_never_minted")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Invalid API key");
}

#[tokio::test]
async fn expired_key_message_is_exact() {
    let (store, app) = build_app("http://127.0.0.1:9", 10).await;

    let minted = mint_key(
        "old",
        vec![Scope::ScanRead],
        Some(chrono::Utc::now() - chrono::Duration::minutes(1)),
    );
    store.insert_api_key(&minted.record).await.unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/scans")
                .header("x-api-key", minted.plaintext)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "API key has expired");
}

#[tokio::test]
async fn insufficient_scope_is_forbidden() {
    let (store, app) = build_app("http://127.0.0.1:9", 10).await;
    let key = issue_key(&store, vec![Scope::ScanRead]).await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/scan")
                .header("x-api-key", key)
                .header("content-type", "application/json")
                .body(Body::from(r#"{"domain":"example.com"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("scan:create"));
}

#[tokio::test]
async fn unknown_route_returns_endpoint_map() {
    let (_store, app) = build_app("http://127.0.0.1:9", 10).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/nope")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Unknown endpoint");
    assert!(body["endpoints"]["POST /scan"].is_string());
}

#[tokio::test]
async fn list_scans_with_valid_key() {
    let (store, app) = build_app("http://127.0.0.1:9", 10).await;
    let key = issue_key(&store, vec![Scope::ScanRead]).await;

    store.upsert_scan(&Scan::new("example.com")).await.unwrap();
    store.upsert_scan(&Scan::new("example.org")).await.unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/scans?limit=1")
                .header("x-api-key", key)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["scans"].as_array().unwrap().len(), 1);
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn unknown_scan_is_not_found() {
    let (store, app) = build_app("http://127.0.0.1:9", 10).await;
    let key = issue_key(&store, vec![Scope::ScanRead, Scope::FindingsRead]).await;

    let id = uuid::Uuid::new_v4();
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/scan/{}", id))
                .header("x-api-key", key.clone())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Findings of a nonexistent scan are 404, not an empty list
    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/scan/{}/findings", id))
                .header("x-api-key", key)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn blocked_domain_is_forbidden() {
    let (store, app) = build_app("http://127.0.0.1:9", 10).await;
    let key = issue_key(&store, vec![Scope::ScanCreate]).await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/scan")
                .header("x-api-key", key)
                .header("content-type", "application/json")
                .body(Body::from(r#"{"domain":"portal.example.gov"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("not permitted"));
}

#[tokio::test]
async fn quota_exhaustion_is_too_many_requests() {
    // Daily limit of zero: the policy gate passes, quota rejects
    let (store, app) = build_app("http://127.0.0.1:9", 0).await;
    let key = issue_key(&store, vec![Scope::ScanCreate]).await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/scan")
                .header("x-api-key", key)
                .header("content-type", "application/json")
                .body(Body::from(r#"{"domain":"example.com"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("Daily scan limit"));
}

#[tokio::test]
async fn successful_scan_creation_returns_created() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {
                "html": "<html><body>plain</body></html>",
                "metadata": {},
                "links": ["https://example.com/about"],
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/map"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"links": []})))
        .mount(&server)
        .await;

    let (store, app) = build_app(&server.uri(), 10).await;
    let key = issue_key(&store, vec![Scope::ScanCreate]).await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/scan")
                .header("x-api-key", key)
                .header("content-type", "application/json")
                .body(Body::from(r#"{"domain":"example.com"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert!(body["scanId"].is_string());
    assert_eq!(body["urlsFound"], 1);
    assert!(body["riskScore"].is_number());
    assert!(body["findingsCount"].is_number());

    // Submission receipt only, never the crawl payload
    assert!(body.get("rawCrawl").is_none());
    assert!(body.get("domain").is_none());
}

#[tokio::test]
async fn scan_reads_return_summaries_without_crawl_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {
                "html": "<html><body>plain</body></html>",
                "metadata": {},
                "links": ["https://example.com/admin/"],
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/map"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"links": []})))
        .mount(&server)
        .await;

    let (store, app) = build_app(&server.uri(), 10).await;
    let key = issue_key(
        &store,
        vec![Scope::ScanCreate, Scope::ScanRead, Scope::FindingsRead],
    )
    .await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/scan")
                .header("x-api-key", key.clone())
                .header("content-type", "application/json")
                .body(Body::from(r#"{"domain":"example.com"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let scan_id = body_json(response).await["scanId"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/scan/{}", scan_id))
                .header("x-api-key", key.clone())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["domain"], "example.com");
    assert_eq!(body["status"], "completed");
    assert!(body.get("rawCrawl").is_none());
    assert!(body.get("surface").is_none());

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/scan/{}/findings", scan_id))
                .header("x-api-key", key)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["scanId"], scan_id);
    let findings = body["findings"].as_array().unwrap();
    assert!(!findings.is_empty());
    assert_eq!(body["count"], findings.len());
}

#[tokio::test]
async fn benchmark_report_endpoint_serves_rates() {
    let (store, app) = build_app("http://127.0.0.1:9", 10).await;
    let key = issue_key(&store, vec![Scope::ScanRead]).await;

    store
        .insert_benchmark(&BenchmarkEntry {
            domain: "example.com".to_string(),
            ai_policy: PolicyType::Block,
            ground_truth: Some(PolicyType::Block),
            created_at: chrono::Utc::now(),
        })
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/policy/benchmark")
                .header("x-api-key", key)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["labeled"], 1);
    assert_eq!(body["blockPrecision"], 1.0);
    assert_eq!(body["blockRecall"], 1.0);
}

#[tokio::test]
async fn ownership_verification_of_a_bad_name_is_rejected() {
    let (store, app) = build_app("http://127.0.0.1:9", 10).await;
    let key = issue_key(&store, vec![Scope::ScanCreate]).await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/domain/verify")
                .header("x-api-key", key)
                .header("content-type", "application/json")
                .body(Body::from(
                    r#"{"domain":"bad..domain.invalid","token":"tok"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(store.get_policy("bad..domain.invalid").await.unwrap().is_none());
}
