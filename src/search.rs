// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Search Index Sync
 * Best-effort mirroring of scan summaries into the search service
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::types::{Finding, Scan};

/// Fire-and-forget indexer. Index state may lag or miss documents; the
/// scan record in the store is always authoritative.
#[derive(Clone)]
pub struct SearchIndexer {
    inner: Option<Arc<Inner>>,
}

struct Inner {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl SearchIndexer {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self {
            inner: Some(Arc::new(Inner {
                client,
                base_url: base_url.trim_end_matches('/').to_string(),
                api_key: api_key.to_string(),
            })),
        }
    }

    /// No-op indexer for deployments without a search service.
    pub fn disabled() -> Self {
        Self { inner: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    /// Spawn the index push in the background. Called after the scan
    /// record is committed; never blocks or fails the pipeline.
    pub fn sync_scan(&self, scan: &Scan, findings: &[Finding]) {
        let Some(inner) = self.inner.clone() else {
            debug!("Search indexing disabled, skipping sync for {}", scan.id);
            return;
        };

        let document = serde_json::json!([{
            "id": scan.id.to_string(),
            "domain": scan.domain,
            "status": scan.status.as_str(),
            "riskScore": scan.risk_score,
            "technologies": scan.technologies,
            "findingTitles": findings.iter().map(|f| f.title.as_str()).collect::<Vec<_>>(),
            "updatedAt": scan.updated_at.to_rfc3339(),
        }]);
        let scan_id = scan.id;

        tokio::spawn(async move {
            if let Err(e) = push_documents(&inner, &document).await {
                warn!("[WARNING] Search sync failed for scan {}: {}", scan_id, e);
            } else {
                debug!("Search sync complete for scan {}", scan_id);
            }
        });
    }
}

async fn push_documents(inner: &Inner, documents: &serde_json::Value) -> anyhow::Result<()> {
    let response = inner
        .client
        .post(format!("{}/indexes/scans/documents", inner.base_url))
        .bearer_auth(&inner.api_key)
        .json(documents)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        anyhow::bail!("Search service returned {}", status);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_indexer_is_inert() {
        let indexer = SearchIndexer::disabled();
        assert!(!indexer.is_enabled());

        // Must not panic or require a runtime spawn
        let scan = Scan::new("example.com");
        indexer.sync_scan(&scan, &[]);
    }
}
