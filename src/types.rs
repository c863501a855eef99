// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Recon Pipeline Core Types
 * Scan records, findings, surface model, policies, schedules, keys
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Lifecycle states of a scan record.
///
/// pending -> crawling -> analyzing -> completed
/// failed is reachable from crawling or analyzing. completed and failed
/// are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    Pending,
    Crawling,
    Analyzing,
    Completed,
    Failed,
}

impl ScanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanStatus::Pending => "pending",
            ScanStatus::Crawling => "crawling",
            ScanStatus::Analyzing => "analyzing",
            ScanStatus::Completed => "completed",
            ScanStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ScanStatus::Pending),
            "crawling" => Some(ScanStatus::Crawling),
            "analyzing" => Some(ScanStatus::Analyzing),
            "completed" => Some(ScanStatus::Completed),
            "failed" => Some(ScanStatus::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ScanStatus::Completed | ScanStatus::Failed)
    }
}

impl std::fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single scan record. Owned exclusively by the scan state machine;
/// every other component reads and writes it through the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scan {
    pub id: Uuid,
    pub domain: String,
    pub status: ScanStatus,
    /// Aggregate risk in [0, 100]. Sums above the cap collapse to 100.
    pub risk_score: u8,
    pub urls_found: u32,
    pub vulnerabilities_found: u32,
    pub technologies: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_crawl: Option<RawCrawlRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surface: Option<SurfaceModel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrichment: Option<EnrichmentRecord>,
    /// Free text produced by an external report collaborator. Never
    /// generated by the pipeline itself.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_report: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Scan {
    /// Fresh scan record in its initial state.
    pub fn new(domain: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            domain: domain.to_string(),
            status: ScanStatus::Pending,
            risk_score: 0,
            urls_found: 0,
            vulnerabilities_found: 0,
            technologies: Vec::new(),
            raw_crawl: None,
            surface: None,
            enrichment: None,
            ai_report: None,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Reset derived fields for an idempotent re-run. The record identity
    /// and created_at are preserved; everything the pipeline derives is
    /// overwritten, not duplicated.
    pub fn reset_for_rerun(&mut self) {
        self.status = ScanStatus::Crawling;
        self.risk_score = 0;
        self.urls_found = 0;
        self.vulnerabilities_found = 0;
        self.technologies.clear();
        self.raw_crawl = None;
        self.surface = None;
        self.enrichment = None;
        self.ai_report = None;
        self.error_message = None;
        self.updated_at = Utc::now();
    }
}

/// Finding severity, ordered from most to least severe
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
            Severity::Info => "info",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "critical" => Some(Severity::Critical),
            "high" => Some(Severity::High),
            "medium" => Some(Severity::Medium),
            "low" => Some(Severity::Low),
            "info" => Some(Severity::Info),
            _ => None,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Structured per-category finding detail. Tagged so the rule-engine
/// boundary is statically checked rather than duck-typed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FindingDetails {
    MissingHeader { header: String },
    SensitivePath { url: String, pattern: String },
    SuspiciousParameter { url: String, parameter: String },
    XssInputPoint { form_action: String, input: String },
    TechnologyRisk { technology: String },
    SupplyChain { count: usize, sample: Vec<String> },
}

impl FindingDetails {
    pub fn category(&self) -> &'static str {
        match self {
            FindingDetails::MissingHeader { .. } => "security_headers",
            FindingDetails::SensitivePath { .. } => "sensitive_path",
            FindingDetails::SuspiciousParameter { .. } => "suspicious_parameter",
            FindingDetails::XssInputPoint { .. } => "xss",
            FindingDetails::TechnologyRisk { .. } => "technology",
            FindingDetails::SupplyChain { .. } => "supply_chain",
        }
    }
}

/// A finding not yet bound to a scan record. Produced by the rule engine.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFinding {
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub details: FindingDetails,
}

/// A persisted security finding. Immutable once created; deleted only
/// as a unit with its owning scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub id: Uuid,
    pub scan_id: Uuid,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub category: String,
    pub details: FindingDetails,
    pub created_at: DateTime<Utc>,
}

impl Finding {
    pub fn from_new(scan_id: Uuid, new: NewFinding) -> Self {
        Self {
            id: Uuid::new_v4(),
            scan_id,
            title: new.title,
            description: new.description,
            severity: new.severity,
            category: new.details.category().to_string(),
            details: new.details,
            created_at: Utc::now(),
        }
    }
}

/// Raw output of one crawl invocation, merged from the scrape and
/// site-map calls. Opaque to everything except the surface parser.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCrawlRecord {
    pub target_url: String,
    pub html: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub markdown: Option<String>,
    /// Scrape metadata; response headers appear as "header:<name>" tags.
    pub metadata: HashMap<String, String>,
    /// Unioned, de-duplicated link set. Source order preserved.
    pub links: Vec<String>,
    pub fetched_at: DateTime<Utc>,
}

/// One form discovered on the scraped page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DetectedForm {
    pub action: String,
    pub method: String,
    pub inputs: Vec<String>,
}

/// Status of one catalogued security header: the literal value, or the
/// "Not Set" sentinel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HeaderStatus {
    pub name: String,
    pub value: String,
}

/// Structured attack-surface model derived from a raw crawl record
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceModel {
    /// All discovered URLs, in source order
    pub links: Vec<String>,
    pub technologies: Vec<String>,
    pub js_files: Vec<String>,
    pub external_dependencies: Vec<String>,
    pub forms: Vec<DetectedForm>,
    pub endpoints: Vec<String>,
    /// Fixed 7-entry catalog, in catalog order.
    pub security_headers: Vec<HeaderStatus>,
}

/// Derived metadata attached to a completed scan
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    pub total_links: u32,
    pub internal_links: u32,
    pub external_links: u32,
    pub form_count: u32,
    pub technology_count: u32,
}

/// Domain policy decision classes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PolicyType {
    Allow,
    Block,
    Review,
}

impl PolicyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyType::Allow => "allow",
            PolicyType::Block => "block",
            PolicyType::Review => "review",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "allow" => Some(PolicyType::Allow),
            "block" => Some(PolicyType::Block),
            "review" => Some(PolicyType::Review),
            _ => None,
        }
    }
}

impl std::fmt::Display for PolicyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Stored policy for one normalized domain. At most one row per domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainPolicy {
    pub domain: String,
    pub policy_type: PolicyType,
    pub reason: String,
    pub ai_evaluated: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Audit log actions
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AuditAction {
    Approved,
    Blocked,
    Flagged,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Approved => "approved",
            AuditAction::Blocked => "blocked",
            AuditAction::Flagged => "flagged",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "approved" => Some(AuditAction::Approved),
            "blocked" => Some(AuditAction::Blocked),
            "flagged" => Some(AuditAction::Flagged),
            _ => None,
        }
    }
}

impl From<PolicyType> for AuditAction {
    fn from(policy: PolicyType) -> Self {
        match policy {
            PolicyType::Allow => AuditAction::Approved,
            PolicyType::Block => AuditAction::Blocked,
            PolicyType::Review => AuditAction::Flagged,
        }
    }
}

/// Append-only audit record. Never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub domain: String,
    pub action: AuditAction,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

impl AuditLogEntry {
    pub fn new(domain: &str, action: AuditAction, reason: &str) -> Self {
        Self {
            domain: domain.to_string(),
            action,
            reason: reason.to_string(),
            created_at: Utc::now(),
        }
    }
}

/// Per-requester daily quota counter
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanQuota {
    pub requester: String,
    pub scans_today: i32,
    pub last_scan_date: NaiveDate,
    pub daily_limit: i32,
}

/// Outcome of an atomic quota admission attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaDecision {
    pub admitted: bool,
    pub scans_today: i32,
    pub daily_limit: i32,
}

/// Recurring scan schedule. Frequency is stored as text; unrecognized
/// values fall back to the weekly offset at sweep time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanSchedule {
    pub id: Uuid,
    pub domain: String,
    pub frequency: String,
    pub enabled: bool,
    pub next_run_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_run_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_scan_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl ScanSchedule {
    pub fn new(domain: &str, frequency: &str, first_run_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            domain: domain.to_string(),
            frequency: frequency.to_string(),
            enabled: true,
            next_run_at: first_run_at,
            last_run_at: None,
            last_scan_id: None,
            created_at: Utc::now(),
        }
    }
}

/// Gateway permission scopes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Scope {
    #[serde(rename = "scan:create")]
    ScanCreate,
    #[serde(rename = "scan:read")]
    ScanRead,
    #[serde(rename = "findings:read")]
    FindingsRead,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::ScanCreate => "scan:create",
            Scope::ScanRead => "scan:read",
            Scope::FindingsRead => "findings:read",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "scan:create" => Some(Scope::ScanCreate),
            "scan:read" => Some(Scope::ScanRead),
            "findings:read" => Some(Scope::FindingsRead),
            _ => None,
        }
    }
}

/// Stored API key. Only the SHA-256 hash of the secret is persisted;
/// the plaintext is shown to the operator exactly once at creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyRecord {
    pub id: Uuid,
    pub name: String,
    pub key_hash: String,
    /// Display-safe fragment of the secret for operator identification
    pub key_prefix: String,
    pub permissions: Vec<Scope>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl ApiKeyRecord {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|exp| exp <= now).unwrap_or(false)
    }

    pub fn has_scope(&self, scope: Scope) -> bool {
        self.permissions.contains(&scope)
    }
}

/// Recorded AI policy decision paired with an optional human-verified
/// ground-truth label. Used to measure the AI path over time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkEntry {
    pub domain: String,
    pub ai_policy: PolicyType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ground_truth: Option<PolicyType>,
    pub created_at: DateTime<Utc>,
}
