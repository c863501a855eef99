// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Scan Quota Enforcer
 * Per-requester daily admission control
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use chrono::Utc;
use std::sync::Arc;
use tracing::info;

use crate::errors::{ReconError, ReconResult};
use crate::store::Store;

/// Quota state after a successful admission
#[derive(Debug, Clone, Copy)]
pub struct QuotaStatus {
    pub scans_today: i32,
    pub daily_limit: i32,
}

/// Daily admission control. The check and the increment are one atomic
/// store operation; two concurrent submissions cannot both take the
/// last slot.
pub struct QuotaEnforcer {
    store: Arc<dyn Store>,
    daily_limit: i32,
}

impl QuotaEnforcer {
    pub fn new(store: Arc<dyn Store>, daily_limit: i32) -> Self {
        Self { store, daily_limit }
    }

    /// Admit one scan for the requester or fail with `QuotaExceeded`.
    /// The counter resets on the first admission attempt of a new UTC date.
    pub async fn check_and_increment(&self, requester: &str) -> ReconResult<QuotaStatus> {
        let today = Utc::now().date_naive();
        let decision = self
            .store
            .try_admit_scan(requester, self.daily_limit, today)
            .await?;

        if !decision.admitted {
            return Err(ReconError::QuotaExceeded {
                scans_today: decision.scans_today,
                daily_limit: decision.daily_limit,
            });
        }

        info!(
            "Scan admitted for {}: {}/{} today",
            requester, decision.scans_today, decision.daily_limit
        );

        Ok(QuotaStatus {
            scans_today: decision.scans_today,
            daily_limit: decision.daily_limit,
        })
    }
}
