// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Persistence Capability
 * Injected store trait backed by PostgreSQL or an in-memory map
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary - Enterprise Edition
 */

pub mod memory;
pub mod postgres;

pub use memory::MemStore;
pub use postgres::{PgStore, PgStoreConfig};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::errors::StoreError;
use crate::types::{
    ApiKeyRecord, AuditLogEntry, BenchmarkEntry, DomainPolicy, Finding, QuotaDecision, Scan,
    ScanSchedule,
};

/// Storage capability injected into every pipeline component. No
/// component reaches for an ambient/global client.
#[async_trait]
pub trait Store: Send + Sync {
    // --- scans (owned by the scan state machine) ---

    /// Insert or fully overwrite a scan record by id.
    async fn upsert_scan(&self, scan: &Scan) -> Result<(), StoreError>;

    async fn get_scan(&self, id: Uuid) -> Result<Option<Scan>, StoreError>;

    /// Most recent scans first.
    async fn list_recent_scans(&self, limit: i64) -> Result<Vec<Scan>, StoreError>;

    // --- findings (immutable; cascade-deleted with their scan) ---

    async fn insert_findings(&self, findings: &[Finding]) -> Result<(), StoreError>;

    async fn findings_for_scan(&self, scan_id: Uuid) -> Result<Vec<Finding>, StoreError>;

    /// Used only by the idempotent re-run path before re-deriving.
    async fn delete_findings_for_scan(&self, scan_id: Uuid) -> Result<u64, StoreError>;

    // --- domain policies (at most one row per normalized domain) ---

    async fn get_policy(&self, domain: &str) -> Result<Option<DomainPolicy>, StoreError>;

    async fn upsert_policy(&self, policy: &DomainPolicy) -> Result<(), StoreError>;

    // --- audit log (append-only) ---

    async fn append_audit(&self, entry: &AuditLogEntry) -> Result<(), StoreError>;

    // --- quota ---

    /// Atomic check-then-increment for one requester. Resets the
    /// counter on the first evaluation of a new UTC date. The
    /// conditional increment must not over-admit under concurrency.
    async fn try_admit_scan(
        &self,
        requester: &str,
        daily_limit: i32,
        today: NaiveDate,
    ) -> Result<QuotaDecision, StoreError>;

    // --- schedules ---

    async fn create_schedule(&self, schedule: &ScanSchedule) -> Result<(), StoreError>;

    async fn list_due_schedules(&self, now: DateTime<Utc>) -> Result<Vec<ScanSchedule>, StoreError>;

    /// Conditional claim: bump next_run_at iff the schedule is still
    /// enabled and due. Returns false when another sweep already
    /// claimed it. This closes the double-dispatch race.
    async fn claim_schedule(
        &self,
        id: Uuid,
        new_next_run_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    async fn record_schedule_run(
        &self,
        id: Uuid,
        last_run_at: DateTime<Utc>,
        last_scan_id: Uuid,
    ) -> Result<(), StoreError>;

    // --- api keys ---

    async fn insert_api_key(&self, key: &ApiKeyRecord) -> Result<(), StoreError>;

    async fn get_api_key_by_hash(&self, key_hash: &str)
        -> Result<Option<ApiKeyRecord>, StoreError>;

    async fn touch_api_key(&self, id: Uuid, when: DateTime<Utc>) -> Result<(), StoreError>;

    // --- policy benchmark ---

    async fn insert_benchmark(&self, entry: &BenchmarkEntry) -> Result<(), StoreError>;

    async fn list_benchmarks(&self) -> Result<Vec<BenchmarkEntry>, StoreError>;
}
