// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Scan Pipeline
 * Drives a scan record through its lifecycle states
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary - Enterprise Edition
 */

use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use crate::crawler::CrawlOrchestrator;
use crate::errors::{ReconError, ReconResult};
use crate::parser::{derive_enrichment, parse_surface};
use crate::policy::{normalize_domain, PolicyGate};
use crate::quota::QuotaEnforcer;
use crate::rules::generate_findings;
use crate::scorer::risk_score;
use crate::search::SearchIndexer;
use crate::store::Store;
use crate::types::{Finding, PolicyType, Scan, ScanStatus};

/// Orchestrates one scan end to end. All collaborators are injected;
/// the pipeline owns only the state machine.
pub struct ScanPipeline {
    store: Arc<dyn Store>,
    policy: Arc<PolicyGate>,
    quota: QuotaEnforcer,
    crawler: CrawlOrchestrator,
    indexer: SearchIndexer,
}

impl ScanPipeline {
    pub fn new(
        store: Arc<dyn Store>,
        policy: Arc<PolicyGate>,
        quota: QuotaEnforcer,
        crawler: CrawlOrchestrator,
        indexer: SearchIndexer,
    ) -> Self {
        Self {
            store,
            policy,
            quota,
            crawler,
            indexer,
        }
    }

    /// Run a fresh scan: policy gate, quota, then the crawl/analyze
    /// state machine. Returns the terminal scan record.
    pub async fn run(&self, raw_domain: &str, requester: &str) -> ReconResult<Scan> {
        let domain = normalize_domain(raw_domain);

        self.policy.require_allowed(&domain).await?;
        self.crawler.require_configured()?;
        self.quota.check_and_increment(requester).await?;

        let mut scan = Scan::new(&domain);
        scan.status = ScanStatus::Crawling;
        self.store.upsert_scan(&scan).await?;

        info!("Scan {} started for {}", scan.id, domain);
        self.execute(scan).await
    }

    /// Idempotent re-run of an existing scan. Re-enters at crawling and
    /// overwrites every derived field; prior findings are deleted, not
    /// duplicated. Reads the cached policy but never re-classifies and
    /// never consumes quota.
    pub async fn rerun(&self, scan_id: Uuid) -> ReconResult<Scan> {
        let mut scan = self
            .store
            .get_scan(scan_id)
            .await?
            .ok_or_else(|| ReconError::NotFound("Scan".to_string()))?;

        if let Some(cached) = self.store.get_policy(&scan.domain).await? {
            if cached.policy_type != PolicyType::Allow {
                return Err(ReconError::PolicyDenied {
                    domain: scan.domain.clone(),
                    policy: cached.policy_type,
                    reason: cached.reason,
                });
            }
        }

        scan.reset_for_rerun();
        self.store.upsert_scan(&scan).await?;
        self.store.delete_findings_for_scan(scan.id).await?;

        info!("Scan {} re-running for {}", scan.id, scan.domain);
        self.execute(scan).await
    }

    /// Crawl and analyze. Any error marks the scan failed with its
    /// message; completed and failed are terminal.
    async fn execute(&self, mut scan: Scan) -> ReconResult<Scan> {
        match self.crawl_and_analyze(&mut scan).await {
            Ok(findings) => {
                self.indexer.sync_scan(&scan, &findings);
                info!(
                    "[SUCCESS] Scan {} completed: risk={} findings={}",
                    scan.id, scan.risk_score, scan.vulnerabilities_found
                );
                Ok(scan)
            }
            Err(e) => {
                error!("Scan {} failed: {}", scan.id, e);
                scan.status = ScanStatus::Failed;
                scan.error_message = Some(e.to_string());
                scan.updated_at = chrono::Utc::now();
                self.store.upsert_scan(&scan).await?;
                Err(e)
            }
        }
    }

    async fn crawl_and_analyze(&self, scan: &mut Scan) -> ReconResult<Vec<Finding>> {
        let target_url = format!("https://{}", scan.domain);
        let raw = self.crawler.crawl(&target_url).await?;

        scan.urls_found = raw.links.len() as u32;
        scan.raw_crawl = Some(raw);
        scan.status = ScanStatus::Analyzing;
        scan.updated_at = chrono::Utc::now();
        self.store.upsert_scan(scan).await?;

        // raw_crawl was just set above
        let raw = scan.raw_crawl.as_ref().ok_or_else(|| {
            ReconError::General("Scan lost its crawl record before analysis".to_string())
        })?;

        let surface = parse_surface(raw);
        let enrichment = derive_enrichment(raw, &surface);
        let new_findings = generate_findings(&surface, &surface.technologies);
        let score = risk_score(&new_findings);

        let findings: Vec<Finding> = new_findings
            .into_iter()
            .map(|f| Finding::from_new(scan.id, f))
            .collect();

        scan.technologies = surface.technologies.clone();
        scan.surface = Some(surface);
        scan.enrichment = Some(enrichment);
        scan.risk_score = score;
        scan.vulnerabilities_found = findings.len() as u32;
        scan.status = ScanStatus::Completed;
        scan.updated_at = chrono::Utc::now();

        self.store.insert_findings(&findings).await?;
        self.store.upsert_scan(scan).await?;

        Ok(findings)
    }
}
