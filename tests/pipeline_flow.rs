// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! End-to-end pipeline runs against a mocked crawl service.

use std::sync::Arc;

use kartoitin::ai::RubricClassifier;
use kartoitin::crawler::CrawlOrchestrator;
use kartoitin::errors::ReconError;
use kartoitin::pipeline::ScanPipeline;
use kartoitin::policy::PolicyGate;
use kartoitin::quota::QuotaEnforcer;
use kartoitin::search::SearchIndexer;
use kartoitin::store::{MemStore, Store};
use kartoitin::types::{ScanStatus, Severity};

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const WP_HTML: &str = r#"<html><head>
<title>Example Blog</title>
<link href="/wp-content/themes/twenty/style.css" rel="stylesheet">
</head><body><p>hello</p></body></html>"#;

fn build_pipeline(crawl_base: &str, store: Arc<MemStore>, daily_limit: i32) -> ScanPipeline {
    let policy = Arc::new(PolicyGate::new(store.clone(), Arc::new(RubricClassifier::new())));
    let quota = QuotaEnforcer::new(store.clone(), daily_limit);
    let crawler = CrawlOrchestrator::new(crawl_base, Some("test-key")).unwrap();
    ScanPipeline::new(store, policy, quota, crawler, SearchIndexer::disabled())
}

async fn mount_scrape(server: &MockServer, html: &str, links: &[&str]) {
    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {
                "html": html,
                "markdown": "# Example",
                "metadata": { "title": "Example Blog" },
                "links": links,
            }
        })))
        .mount(server)
        .await;
}

async fn mount_map(server: &MockServer, links: &[&str]) {
    Mock::given(method("POST"))
        .and(path("/v1/map"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "links": links })),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn happy_path_completes_with_expected_score() {
    let server = MockServer::start().await;
    mount_scrape(&server, WP_HTML, &["https://example.com/a"]).await;
    mount_map(&server, &["https://example.com/a", "https://example.com/b"]).await;

    let store = Arc::new(MemStore::new());
    let pipeline = build_pipeline(&server.uri(), store.clone(), 10);

    let scan = pipeline.run("example.com", "tester").await.unwrap();

    assert_eq!(scan.status, ScanStatus::Completed);
    assert_eq!(scan.domain, "example.com");
    assert_eq!(scan.urls_found, 2);
    assert_eq!(scan.technologies, vec!["WordPress".to_string()]);

    // Missing CSP (15) + HSTS (8) + X-Frame-Options (8) + CMS risk (8)
    assert_eq!(scan.risk_score, 39);
    assert_eq!(scan.vulnerabilities_found, 4);

    let findings = store.findings_for_scan(scan.id).await.unwrap();
    assert_eq!(findings.len(), 4);
    assert_eq!(findings[0].severity, Severity::High);

    let enrichment = scan.enrichment.unwrap();
    assert_eq!(enrichment.page_title.as_deref(), Some("Example Blog"));
    assert_eq!(enrichment.total_links, 2);
}

#[tokio::test]
async fn map_failure_is_tolerated() {
    let server = MockServer::start().await;
    mount_scrape(&server, WP_HTML, &["https://example.com/a"]).await;
    Mock::given(method("POST"))
        .and(path("/v1/map"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let store = Arc::new(MemStore::new());
    let pipeline = build_pipeline(&server.uri(), store, 10);

    let scan = pipeline.run("example.com", "tester").await.unwrap();
    assert_eq!(scan.status, ScanStatus::Completed);
    assert_eq!(scan.urls_found, 1);
}

#[tokio::test]
async fn scrape_failure_marks_scan_failed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;
    mount_map(&server, &[]).await;

    let store = Arc::new(MemStore::new());
    let pipeline = build_pipeline(&server.uri(), store.clone(), 10);

    let err = pipeline.run("example.com", "tester").await.unwrap_err();
    assert!(matches!(err, ReconError::CrawlFailure { .. }));

    let scans = store.list_recent_scans(10).await.unwrap();
    assert_eq!(scans.len(), 1);
    assert_eq!(scans[0].status, ScanStatus::Failed);
    assert!(scans[0].error_message.as_deref().unwrap().contains("500"));
}

#[tokio::test]
async fn upstream_rate_limit_maps_to_typed_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;
    mount_map(&server, &[]).await;

    let store = Arc::new(MemStore::new());
    let pipeline = build_pipeline(&server.uri(), store, 10);

    let err = pipeline.run("example.com", "tester").await.unwrap_err();
    assert!(matches!(err, ReconError::UpstreamRateLimited { .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn rerun_overwrites_instead_of_duplicating() {
    let server = MockServer::start().await;
    mount_scrape(&server, WP_HTML, &["https://example.com/a"]).await;
    mount_map(&server, &["https://example.com/b"]).await;

    let store = Arc::new(MemStore::new());
    let pipeline = build_pipeline(&server.uri(), store.clone(), 10);

    let first = pipeline.run("example.com", "tester").await.unwrap();
    let second = pipeline.rerun(first.id).await.unwrap();

    // Same record, no duplicate scan or findings
    assert_eq!(second.id, first.id);
    assert_eq!(second.created_at, first.created_at);
    assert_eq!(store.list_recent_scans(10).await.unwrap().len(), 1);

    let findings = store.findings_for_scan(first.id).await.unwrap();
    assert_eq!(findings.len(), 4);
    assert_eq!(second.risk_score, 39);
}

#[tokio::test]
async fn rerun_of_unknown_scan_is_not_found() {
    let server = MockServer::start().await;
    let store = Arc::new(MemStore::new());
    let pipeline = build_pipeline(&server.uri(), store, 10);

    let err = pipeline.rerun(uuid::Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, ReconError::NotFound(_)));
}

#[tokio::test]
async fn rerun_does_not_consume_quota() {
    let server = MockServer::start().await;
    mount_scrape(&server, WP_HTML, &["https://example.com/a"]).await;
    mount_map(&server, &[]).await;

    let store = Arc::new(MemStore::new());
    let pipeline = build_pipeline(&server.uri(), store.clone(), 1);

    let scan = pipeline.run("example.com", "tester").await.unwrap();

    // Quota is spent, but re-runs stay available
    assert!(matches!(
        pipeline.run("example.com", "tester").await.unwrap_err(),
        ReconError::QuotaExceeded { .. }
    ));
    assert!(pipeline.rerun(scan.id).await.is_ok());
}

#[tokio::test]
async fn missing_crawl_credential_fails_before_a_scan_exists() {
    let store = Arc::new(MemStore::new());
    let policy = Arc::new(PolicyGate::new(store.clone(), Arc::new(RubricClassifier::new())));
    let quota = QuotaEnforcer::new(store.clone(), 10);
    let crawler = CrawlOrchestrator::new("https://api.firecrawl.dev", None).unwrap();
    let pipeline = ScanPipeline::new(
        store.clone(),
        policy,
        quota,
        crawler,
        SearchIndexer::disabled(),
    );

    let err = pipeline.run("example.com", "tester").await.unwrap_err();
    assert!(matches!(err, ReconError::Configuration(_)));
    assert!(err.to_string().contains("CRAWL_API_KEY"));

    // Surfaced before admission: no scan record, no quota spent
    assert!(store.list_recent_scans(10).await.unwrap().is_empty());
    assert!(pipeline.run("example.com", "tester").await.is_err());
}

#[tokio::test]
async fn blocked_domain_never_reaches_the_crawler() {
    let server = MockServer::start().await;
    // No mocks mounted: any request to the crawl service would 404

    let store = Arc::new(MemStore::new());
    let pipeline = build_pipeline(&server.uri(), store.clone(), 10);

    let err = pipeline.run("intranet.example.gov", "tester").await.unwrap_err();
    assert!(matches!(err, ReconError::PolicyDenied { .. }));

    // No scan record is created for a denied domain
    assert!(store.list_recent_scans(10).await.unwrap().is_empty());
}
