// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Crawl Orchestrator
 * Delegated crawling via the external crawl service
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary - Enterprise Edition
 */

use anyhow::Context;
use chrono::Utc;
use reqwest::StatusCode;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tracing::{info, warn};

use crate::errors::{ReconError, ReconResult};
use crate::types::RawCrawlRecord;

const CRAWL_SERVICE: &str = "Crawl service";

/// Cap on links taken from the site-map call
const MAP_LINK_LIMIT: usize = 200;

#[derive(Debug, Deserialize)]
struct ScrapeResponse {
    #[serde(default)]
    data: ScrapeData,
}

#[derive(Debug, Default, Deserialize)]
struct ScrapeData {
    #[serde(default)]
    html: String,
    markdown: Option<String>,
    #[serde(default)]
    metadata: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    links: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct MapResponse {
    #[serde(default)]
    links: Vec<String>,
}

/// Thin client over the external crawl service. One scrape call for
/// page content plus one best-effort map call for site-wide links.
pub struct CrawlOrchestrator {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl CrawlOrchestrator {
    pub fn new(base_url: &str, api_key: Option<&str>) -> ReconResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ReconError::General(format!("Failed to create crawl client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.map(|k| k.to_string()),
        })
    }

    /// Credential presence check. Surfaced before a scan record is
    /// created so an unconfigured deployment never starts a scan.
    pub fn require_configured(&self) -> ReconResult<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| ReconError::Configuration("CRAWL_API_KEY is not set".to_string()))
    }

    /// Crawl one target. The scrape call is fatal on failure; the map
    /// call is advisory and its failure is swallowed with a warning.
    pub async fn crawl(&self, target_url: &str) -> ReconResult<RawCrawlRecord> {
        self.require_configured()?;
        let scrape = self.scrape(target_url).await?;

        let map_links = match self.map(target_url).await {
            Ok(links) => links,
            Err(e) => {
                warn!("[WARNING] Site map call failed for {}, proceeding with scrape links: {}", target_url, e);
                Vec::new()
            }
        };

        let links = union_links(scrape.links, map_links);
        let metadata = flatten_metadata(scrape.metadata);

        info!("[SUCCESS] Crawl of {} complete: {} links", target_url, links.len());

        Ok(RawCrawlRecord {
            target_url: target_url.to_string(),
            html: scrape.html,
            markdown: scrape.markdown,
            metadata,
            links,
            fetched_at: Utc::now(),
        })
    }

    async fn scrape(&self, target_url: &str) -> ReconResult<ScrapeData> {
        let key = self.require_configured()?;
        let response = self
            .client
            .post(format!("{}/v1/scrape", self.base_url))
            .bearer_auth(key)
            .json(&serde_json::json!({
                "url": target_url,
                "formats": ["html", "markdown", "links"],
            }))
            .send()
            .await
            .map_err(|e| ReconError::CrawlFailure {
                url: target_url.to_string(),
                reason: e.to_string(),
            })?;

        match response.status() {
            StatusCode::TOO_MANY_REQUESTS => {
                return Err(ReconError::UpstreamRateLimited {
                    service: CRAWL_SERVICE.to_string(),
                })
            }
            StatusCode::PAYMENT_REQUIRED => {
                return Err(ReconError::UpstreamExhausted {
                    service: CRAWL_SERVICE.to_string(),
                })
            }
            status if !status.is_success() => {
                let body = response.text().await.unwrap_or_default();
                return Err(ReconError::CrawlFailure {
                    url: target_url.to_string(),
                    reason: format!("Scrape returned {}: {}", status, body),
                });
            }
            _ => {}
        }

        let parsed: ScrapeResponse =
            response
                .json()
                .await
                .map_err(|e| ReconError::CrawlFailure {
                    url: target_url.to_string(),
                    reason: format!("Unparseable scrape response: {}", e),
                })?;

        Ok(parsed.data)
    }

    async fn map(&self, target_url: &str) -> anyhow::Result<Vec<String>> {
        let key = self.api_key.as_deref().unwrap_or_default();
        let response = self
            .client
            .post(format!("{}/v1/map", self.base_url))
            .bearer_auth(key)
            .json(&serde_json::json!({ "url": target_url }))
            .send()
            .await
            .context("Map request failed")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Map returned {}", status);
        }

        let parsed: MapResponse = response.json().await.context("Unparseable map response")?;
        Ok(parsed.links.into_iter().take(MAP_LINK_LIMIT).collect())
    }
}

/// Scrape links first, then map links, duplicates dropped. Order within
/// each source is preserved.
fn union_links(scrape_links: Vec<String>, map_links: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    scrape_links
        .into_iter()
        .chain(map_links)
        .filter(|link| seen.insert(link.clone()))
        .collect()
}

/// Metadata values arrive as arbitrary JSON; string values pass through
/// verbatim, everything else is serialized. Response headers keep their
/// "header:<name>" tags.
fn flatten_metadata(raw: serde_json::Map<String, serde_json::Value>) -> HashMap<String, String> {
    raw.into_iter()
        .map(|(key, value)| {
            let text = match value {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            (key, text)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_preserves_order_and_dedupes() {
        let scrape = vec![
            "https://a.example/1".to_string(),
            "https://a.example/2".to_string(),
        ];
        let map = vec![
            "https://a.example/2".to_string(),
            "https://a.example/3".to_string(),
        ];

        assert_eq!(
            union_links(scrape, map),
            vec![
                "https://a.example/1".to_string(),
                "https://a.example/2".to_string(),
                "https://a.example/3".to_string(),
            ]
        );
    }

    #[test]
    fn test_metadata_flattening() {
        let mut raw = serde_json::Map::new();
        raw.insert(
            "header:server".to_string(),
            serde_json::Value::String("nginx".to_string()),
        );
        raw.insert("statusCode".to_string(), serde_json::json!(200));

        let flat = flatten_metadata(raw);
        assert_eq!(flat.get("header:server").map(String::as_str), Some("nginx"));
        assert_eq!(flat.get("statusCode").map(String::as_str), Some("200"));
    }
}
