// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Recurring Scan Scheduler
 * Sweep loop that claims due schedules and dispatches scans
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{info, warn};

use crate::errors::ReconResult;
use crate::pipeline::ScanPipeline;
use crate::store::Store;

/// Requester identity charged for scheduled scans
const SCHEDULER_REQUESTER: &str = "scheduler";

/// Next run time for a frequency. Unrecognized frequencies fall back
/// to the weekly offset.
pub fn next_run(frequency: &str, from: DateTime<Utc>) -> DateTime<Utc> {
    let offset = match frequency {
        "daily" => Duration::days(1),
        "weekly" => Duration::days(7),
        "biweekly" => Duration::days(14),
        "monthly" => Duration::days(30),
        _ => Duration::days(7),
    };
    from + offset
}

/// Periodic dispatcher for recurring scans. Each sweep claims due
/// schedules one at a time; a claim bumps next_run_at before dispatch
/// so overlapping sweeps cannot double-run the same schedule.
pub struct Scheduler {
    store: Arc<dyn Store>,
    pipeline: Arc<ScanPipeline>,
}

impl Scheduler {
    pub fn new(store: Arc<dyn Store>, pipeline: Arc<ScanPipeline>) -> Self {
        Self { store, pipeline }
    }

    /// One sweep over due schedules. Per-entry failures are logged and
    /// never abort the sweep; the claimed next_run_at stays advanced so
    /// a failing target retries on its normal cadence.
    pub async fn sweep(&self) -> ReconResult<usize> {
        let now = Utc::now();
        let due = self.store.list_due_schedules(now).await?;
        let mut dispatched = 0usize;

        for schedule in due {
            let bumped = next_run(&schedule.frequency, now);
            if !self.store.claim_schedule(schedule.id, bumped, now).await? {
                continue;
            }

            info!(
                "Dispatching scheduled scan for {} (next run {})",
                schedule.domain, bumped
            );

            match self.pipeline.run(&schedule.domain, SCHEDULER_REQUESTER).await {
                Ok(scan) => {
                    self.store
                        .record_schedule_run(schedule.id, now, scan.id)
                        .await?;
                    dispatched += 1;
                }
                Err(e) => {
                    warn!(
                        "[WARNING] Scheduled scan for {} failed: {}",
                        schedule.domain, e
                    );
                }
            }
        }

        Ok(dispatched)
    }

    /// Endless sweep loop. Spawned once by the server binary.
    pub async fn run_loop(self: Arc<Self>, interval_secs: u64) {
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(interval_secs));
        loop {
            ticker.tick().await;
            if let Err(e) = self.sweep().await {
                warn!("[WARNING] Scheduler sweep failed: {}", e);
            }
        }
    }
}
