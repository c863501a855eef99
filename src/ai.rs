// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Domain classifier abstraction.
//!
//! Supports:
//! - Claude API (Anthropic) via LlmClassifier
//! - RubricClassifier (deterministic, offline)
//!
//! The policy gate treats classifiers as advisory: any classifier
//! failure degrades the decision to review, never to allow.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::debug;

use crate::types::PolicyType;

/// Classifier verdict for one domain
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub policy: PolicyType,
    pub reason: String,
}

#[async_trait::async_trait]
pub trait DomainClassifier: Send + Sync {
    /// Classify a normalized domain as allow, block, or review.
    async fn classify(&self, domain: &str) -> Result<Classification>;

    /// Classifier name for display
    fn name(&self) -> &str;
}

const CLASSIFY_SYSTEM_PROMPT: &str = "You are a security scanning policy gate. \
Given a domain name, respond with exactly one word on the first line: \
ALLOW for known test or demo targets that are clearly safe to scan, \
BLOCK for military, critical-infrastructure, or core healthcare domains, \
or REVIEW for everything else (ordinary commercial, government, or \
personal domains). On the second line give a one-sentence reason.";

// ---------------------------------------------------------------------------
// Claude API classifier
// ---------------------------------------------------------------------------

pub struct LlmClassifier {
    api_key: String,
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl LlmClassifier {
    pub fn new(api_key: String, base_url: String, model: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client for Claude API")?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            client,
        })
    }
}

#[async_trait::async_trait]
impl DomainClassifier for LlmClassifier {
    async fn classify(&self, domain: &str) -> Result<Classification> {
        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": 256,
            "system": CLASSIFY_SYSTEM_PROMPT,
            "messages": [{
                "role": "user",
                "content": format!("Domain: {}", domain),
            }],
        });

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .context("Failed to send request to Claude API")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!("Claude API error ({}): {}", status, error_body);
        }

        let api_response: serde_json::Value = response
            .json()
            .await
            .context("Failed to parse Claude API response")?;

        let text = api_response["content"][0]["text"]
            .as_str()
            .context("Claude API response missing text content")?;

        parse_verdict(domain, text)
    }

    fn name(&self) -> &str {
        "claude"
    }
}

/// First line carries the verdict token, second line the reason.
/// An unparseable completion is an error, never a silent allow.
fn parse_verdict(domain: &str, text: &str) -> Result<Classification> {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());

    let verdict = lines
        .next()
        .context("Empty classifier completion")?
        .to_lowercase();

    let policy = match verdict.as_str() {
        "allow" => PolicyType::Allow,
        "block" => PolicyType::Block,
        "review" => PolicyType::Review,
        other => anyhow::bail!("Unrecognized classifier verdict '{}'", other),
    };

    let reason = lines
        .next()
        .map(|l| l.to_string())
        .unwrap_or_else(|| format!("Classifier verdict for {}", domain));

    debug!("Classifier verdict for {}: {}", domain, policy);

    Ok(Classification { policy, reason })
}

// ---------------------------------------------------------------------------
// Deterministic rubric classifier (offline fallback)
// ---------------------------------------------------------------------------

/// Keyword rubric over the domain string. Used when no AI credential is
/// configured, and in tests. Same contract as the LLM path: it only
/// advises, the policy gate still persists and audits the decision.
#[derive(Default)]
pub struct RubricClassifier;

impl RubricClassifier {
    pub fn new() -> Self {
        Self
    }
}

const BLOCK_MARKERS: &[&str] = &[
    ".gov", ".mil", "police", "parliament", "hospital", "bank", "pankki",
];

const REVIEW_MARKERS: &[&str] = &[
    ".edu", "school", "clinic", "health", "insurance", "vakuutus",
];

#[async_trait::async_trait]
impl DomainClassifier for RubricClassifier {
    async fn classify(&self, domain: &str) -> Result<Classification> {
        let lowered = domain.to_lowercase();

        if let Some(marker) = BLOCK_MARKERS.iter().find(|m| lowered.contains(*m)) {
            return Ok(Classification {
                policy: PolicyType::Block,
                reason: format!("Domain matches restricted marker '{}'", marker),
            });
        }

        if let Some(marker) = REVIEW_MARKERS.iter().find(|m| lowered.contains(*m)) {
            return Ok(Classification {
                policy: PolicyType::Review,
                reason: format!("Domain matches sensitive marker '{}'", marker),
            });
        }

        Ok(Classification {
            policy: PolicyType::Allow,
            reason: "No restricted or sensitive markers in domain".to_string(),
        })
    }

    fn name(&self) -> &str {
        "rubric"
    }
}
