// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Domain Policy Gate
 * Decides whether a domain may be scanned, with audit and benchmarking
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary - Enterprise Edition
 */

use chrono::Utc;
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::TokioResolver;
use std::sync::Arc;
use tracing::{info, warn};

use crate::ai::DomainClassifier;
use crate::errors::{ReconError, ReconResult};
use crate::store::Store;
use crate::types::{AuditLogEntry, BenchmarkEntry, DomainPolicy, PolicyType};

/// Outcome of a policy evaluation
#[derive(Debug, Clone)]
pub struct PolicyDecision {
    pub allowed: bool,
    pub policy: PolicyType,
    pub reason: String,
}

/// Aggregate quality report over recorded classifier decisions
#[derive(Debug, Clone, Default, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkReport {
    pub total: usize,
    pub labeled: usize,
    pub correct: usize,
    /// Precision of the block class over labeled entries
    pub block_precision: f64,
    /// Recall of the block class over labeled entries
    pub block_recall: f64,
}

/// Gate in front of every scan. Normalizes the target, consults the
/// cached policy table, and falls back to the injected classifier.
/// Every decision, cached or fresh, lands in the audit log.
pub struct PolicyGate {
    store: Arc<dyn Store>,
    classifier: Arc<dyn DomainClassifier>,
}

/// Strip scheme, path, query and port, then lowercase. "www." is kept:
/// www.example.com and example.com get separate policy rows.
pub fn normalize_domain(raw: &str) -> String {
    let without_scheme = raw
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(raw);

    let without_path = without_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or(without_scheme);

    let without_port = without_path
        .rsplit_once(':')
        .filter(|(_, port)| port.chars().all(|c| c.is_ascii_digit()))
        .map(|(host, _)| host)
        .unwrap_or(without_path);

    without_port.trim().to_lowercase()
}

impl PolicyGate {
    pub fn new(store: Arc<dyn Store>, classifier: Arc<dyn DomainClassifier>) -> Self {
        Self { store, classifier }
    }

    /// Evaluate the policy for a raw domain string.
    ///
    /// Blocked and review verdicts return `Ok` with `allowed = false`;
    /// the caller converts to `PolicyDenied` when it needs an error.
    pub async fn evaluate(&self, raw_domain: &str) -> ReconResult<PolicyDecision> {
        let domain = normalize_domain(raw_domain);

        if let Some(cached) = self.store.get_policy(&domain).await? {
            let entry = AuditLogEntry::new(&domain, cached.policy_type.into(), &cached.reason);
            self.store.append_audit(&entry).await?;

            info!("Policy cache hit for {}: {}", domain, cached.policy_type);
            return Ok(PolicyDecision {
                allowed: cached.policy_type == PolicyType::Allow,
                policy: cached.policy_type,
                reason: cached.reason,
            });
        }

        let (policy, reason) = match self.classifier.classify(&domain).await {
            Ok(classification) => {
                let now = Utc::now();
                let record = DomainPolicy {
                    domain: domain.clone(),
                    policy_type: classification.policy,
                    reason: classification.reason.clone(),
                    ai_evaluated: true,
                    created_at: now,
                    updated_at: now,
                };
                self.store.upsert_policy(&record).await?;

                let benchmark = BenchmarkEntry {
                    domain: domain.clone(),
                    ai_policy: classification.policy,
                    ground_truth: None,
                    created_at: now,
                };
                self.store.insert_benchmark(&benchmark).await?;

                (classification.policy, classification.reason)
            }
            Err(e) => {
                // Advisory classifier only: failure degrades to review,
                // never to allow. The degraded verdict is not cached, so
                // the next evaluation retries the classifier.
                warn!("[WARNING] Classifier '{}' failed for {}: {}", self.classifier.name(), domain, e);
                (
                    PolicyType::Review,
                    format!("Classifier unavailable, manual review required: {}", e),
                )
            }
        };

        let entry = AuditLogEntry::new(&domain, policy.into(), &reason);
        self.store.append_audit(&entry).await?;

        info!("Policy decision for {}: {} ({})", domain, policy, reason);

        Ok(PolicyDecision {
            allowed: policy == PolicyType::Allow,
            policy,
            reason,
        })
    }

    /// Evaluate and convert non-allow outcomes into `PolicyDenied`.
    pub async fn require_allowed(&self, raw_domain: &str) -> ReconResult<()> {
        let decision = self.evaluate(raw_domain).await?;
        if decision.allowed {
            Ok(())
        } else {
            Err(ReconError::PolicyDenied {
                domain: normalize_domain(raw_domain),
                policy: decision.policy,
                reason: decision.reason,
            })
        }
    }

    /// DNS TXT ownership proof. A record containing `recon-verify=<token>`
    /// upserts an allow policy without consulting the classifier.
    pub async fn verify_ownership(&self, raw_domain: &str, token: &str) -> ReconResult<()> {
        let domain = normalize_domain(raw_domain);
        let expected = format!("recon-verify={}", token);

        let resolver = TokioResolver::builder(TokioConnectionProvider::default())
            .map_err(|e| ReconError::Dns {
                domain: domain.clone(),
                reason: e.to_string(),
            })?
            .build();

        let txt = resolver
            .txt_lookup(domain.as_str())
            .await
            .map_err(|e| ReconError::Dns {
                domain: domain.clone(),
                reason: e.to_string(),
            })?;

        let verified = txt
            .iter()
            .flat_map(|r| r.iter())
            .any(|data| String::from_utf8_lossy(data).trim() == expected);

        if !verified {
            return Err(ReconError::Dns {
                domain,
                reason: "No matching recon-verify TXT record found".to_string(),
            });
        }

        let now = Utc::now();
        let reason = "Ownership verified via DNS TXT record".to_string();
        let record = DomainPolicy {
            domain: domain.clone(),
            policy_type: PolicyType::Allow,
            reason: reason.clone(),
            ai_evaluated: false,
            created_at: now,
            updated_at: now,
        };
        self.store.upsert_policy(&record).await?;

        let entry = AuditLogEntry::new(&domain, crate::types::AuditAction::Approved, &reason);
        self.store.append_audit(&entry).await?;

        info!("[SUCCESS] DNS ownership verified for {}", domain);
        Ok(())
    }

    /// Precision/recall of the classifier's block class over entries a
    /// human has since labeled.
    pub async fn benchmark_report(&self) -> ReconResult<BenchmarkReport> {
        let entries = self.store.list_benchmarks().await?;

        let mut report = BenchmarkReport {
            total: entries.len(),
            ..Default::default()
        };

        let mut block_predicted = 0usize;
        let mut block_actual = 0usize;
        let mut block_hit = 0usize;

        for entry in &entries {
            let Some(truth) = entry.ground_truth else {
                continue;
            };
            report.labeled += 1;
            if entry.ai_policy == truth {
                report.correct += 1;
            }
            if entry.ai_policy == PolicyType::Block {
                block_predicted += 1;
            }
            if truth == PolicyType::Block {
                block_actual += 1;
                if entry.ai_policy == PolicyType::Block {
                    block_hit += 1;
                }
            }
        }

        report.block_precision = if block_predicted > 0 {
            block_hit as f64 / block_predicted as f64
        } else {
            0.0
        };
        report.block_recall = if block_actual > 0 {
            block_hit as f64 / block_actual as f64
        } else {
            0.0
        };

        Ok(report)
    }
}
