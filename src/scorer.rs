// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Risk Scorer
 * Reduces a finding set to a single bounded aggregate score
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use crate::types::{NewFinding, Severity};

/// Maximum aggregate risk score. Raw sums above this collapse to the
/// cap; callers must treat 100 as "at least 100", not an exact sum.
pub const MAX_RISK_SCORE: u32 = 100;

/// Fixed per-severity point weights
pub fn severity_weight(severity: Severity) -> u32 {
    match severity {
        Severity::Critical => 25,
        Severity::High => 15,
        Severity::Medium => 8,
        Severity::Low => 3,
        Severity::Info => 1,
    }
}

/// Sum of per-finding severity weights, capped at 100.
///
/// Monotonic: adding a finding never decreases the score.
pub fn risk_score(findings: &[NewFinding]) -> u8 {
    findings
        .iter()
        .map(|f| severity_weight(f.severity))
        .sum::<u32>()
        .min(MAX_RISK_SCORE) as u8
}
