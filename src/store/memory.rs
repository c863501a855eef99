// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - In-Memory Store
 * Map-backed Store implementation for tests and database-less operation
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::Store;
use crate::errors::StoreError;
use crate::types::{
    ApiKeyRecord, AuditLogEntry, BenchmarkEntry, DomainPolicy, Finding, QuotaDecision, Scan,
    ScanQuota, ScanSchedule,
};

#[derive(Default)]
struct Inner {
    scans: HashMap<Uuid, Scan>,
    findings: Vec<Finding>,
    policies: HashMap<String, DomainPolicy>,
    audit_log: Vec<AuditLogEntry>,
    quotas: HashMap<String, ScanQuota>,
    schedules: HashMap<Uuid, ScanSchedule>,
    api_keys: HashMap<Uuid, ApiKeyRecord>,
    benchmarks: Vec<BenchmarkEntry>,
}

/// In-memory store. All mutations run under one mutex guard, which
/// gives the same effectively-atomic admit/claim semantics the
/// PostgreSQL store gets from single conditional UPDATEs.
#[derive(Default)]
pub struct MemStore {
    inner: Mutex<Inner>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of audit entries written so far. Test/introspection helper.
    pub async fn audit_len(&self) -> usize {
        self.inner.lock().await.audit_log.len()
    }

    /// Snapshot of the audit log. Test/introspection helper.
    pub async fn audit_entries(&self) -> Vec<AuditLogEntry> {
        self.inner.lock().await.audit_log.clone()
    }

    pub async fn policy_count(&self) -> usize {
        self.inner.lock().await.policies.len()
    }

    pub async fn get_schedule(&self, id: Uuid) -> Option<ScanSchedule> {
        self.inner.lock().await.schedules.get(&id).cloned()
    }
}

#[async_trait]
impl Store for MemStore {
    async fn upsert_scan(&self, scan: &Scan) -> Result<(), StoreError> {
        self.inner.lock().await.scans.insert(scan.id, scan.clone());
        Ok(())
    }

    async fn get_scan(&self, id: Uuid) -> Result<Option<Scan>, StoreError> {
        Ok(self.inner.lock().await.scans.get(&id).cloned())
    }

    async fn list_recent_scans(&self, limit: i64) -> Result<Vec<Scan>, StoreError> {
        let inner = self.inner.lock().await;
        let mut scans: Vec<Scan> = inner.scans.values().cloned().collect();
        scans.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        scans.truncate(limit.max(0) as usize);
        Ok(scans)
    }

    async fn insert_findings(&self, findings: &[Finding]) -> Result<(), StoreError> {
        self.inner.lock().await.findings.extend_from_slice(findings);
        Ok(())
    }

    async fn findings_for_scan(&self, scan_id: Uuid) -> Result<Vec<Finding>, StoreError> {
        Ok(self
            .inner
            .lock()
            .await
            .findings
            .iter()
            .filter(|f| f.scan_id == scan_id)
            .cloned()
            .collect())
    }

    async fn delete_findings_for_scan(&self, scan_id: Uuid) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().await;
        let before = inner.findings.len();
        inner.findings.retain(|f| f.scan_id != scan_id);
        Ok((before - inner.findings.len()) as u64)
    }

    async fn get_policy(&self, domain: &str) -> Result<Option<DomainPolicy>, StoreError> {
        Ok(self.inner.lock().await.policies.get(domain).cloned())
    }

    async fn upsert_policy(&self, policy: &DomainPolicy) -> Result<(), StoreError> {
        self.inner
            .lock()
            .await
            .policies
            .insert(policy.domain.clone(), policy.clone());
        Ok(())
    }

    async fn append_audit(&self, entry: &AuditLogEntry) -> Result<(), StoreError> {
        self.inner.lock().await.audit_log.push(entry.clone());
        Ok(())
    }

    async fn try_admit_scan(
        &self,
        requester: &str,
        daily_limit: i32,
        today: NaiveDate,
    ) -> Result<QuotaDecision, StoreError> {
        let mut inner = self.inner.lock().await;
        let quota = inner
            .quotas
            .entry(requester.to_string())
            .or_insert_with(|| ScanQuota {
                requester: requester.to_string(),
                scans_today: 0,
                last_scan_date: today,
                daily_limit,
            });

        // First evaluation on a new UTC date resets the counter
        if quota.last_scan_date != today {
            quota.scans_today = 0;
            quota.last_scan_date = today;
        }
        quota.daily_limit = daily_limit;

        if quota.scans_today >= daily_limit {
            return Ok(QuotaDecision {
                admitted: false,
                scans_today: quota.scans_today,
                daily_limit,
            });
        }

        quota.scans_today += 1;
        Ok(QuotaDecision {
            admitted: true,
            scans_today: quota.scans_today,
            daily_limit,
        })
    }

    async fn create_schedule(&self, schedule: &ScanSchedule) -> Result<(), StoreError> {
        self.inner
            .lock()
            .await
            .schedules
            .insert(schedule.id, schedule.clone());
        Ok(())
    }

    async fn list_due_schedules(&self, now: DateTime<Utc>) -> Result<Vec<ScanSchedule>, StoreError> {
        let inner = self.inner.lock().await;
        let mut due: Vec<ScanSchedule> = inner
            .schedules
            .values()
            .filter(|s| s.enabled && s.next_run_at <= now)
            .cloned()
            .collect();
        due.sort_by(|a, b| a.next_run_at.cmp(&b.next_run_at));
        Ok(due)
    }

    async fn claim_schedule(
        &self,
        id: Uuid,
        new_next_run_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().await;
        match inner.schedules.get_mut(&id) {
            Some(schedule) if schedule.enabled && schedule.next_run_at <= now => {
                schedule.next_run_at = new_next_run_at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn record_schedule_run(
        &self,
        id: Uuid,
        last_run_at: DateTime<Utc>,
        last_scan_id: Uuid,
    ) -> Result<(), StoreError> {
        if let Some(schedule) = self.inner.lock().await.schedules.get_mut(&id) {
            schedule.last_run_at = Some(last_run_at);
            schedule.last_scan_id = Some(last_scan_id);
        }
        Ok(())
    }

    async fn insert_api_key(&self, key: &ApiKeyRecord) -> Result<(), StoreError> {
        self.inner.lock().await.api_keys.insert(key.id, key.clone());
        Ok(())
    }

    async fn get_api_key_by_hash(
        &self,
        key_hash: &str,
    ) -> Result<Option<ApiKeyRecord>, StoreError> {
        Ok(self
            .inner
            .lock()
            .await
            .api_keys
            .values()
            .find(|k| k.key_hash == key_hash)
            .cloned())
    }

    async fn touch_api_key(&self, id: Uuid, when: DateTime<Utc>) -> Result<(), StoreError> {
        if let Some(key) = self.inner.lock().await.api_keys.get_mut(&id) {
            key.last_used_at = Some(when);
        }
        Ok(())
    }

    async fn insert_benchmark(&self, entry: &BenchmarkEntry) -> Result<(), StoreError> {
        self.inner.lock().await.benchmarks.push(entry.clone());
        Ok(())
    }

    async fn list_benchmarks(&self) -> Result<Vec<BenchmarkEntry>, StoreError> {
        Ok(self.inner.lock().await.benchmarks.clone())
    }
}
