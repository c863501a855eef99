// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Recon Pipeline Error Types
 * Production-ready error handling with thiserror
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary - Enterprise Edition
 */

use thiserror::Error;

use crate::types::PolicyType;

/// Main recon pipeline error type
#[derive(Error, Debug)]
pub enum ReconError {
    /// A required collaborator credential or endpoint is missing.
    /// Surfaced immediately; the dependent operation never starts.
    #[error("Not configured: {0}")]
    Configuration(String),

    /// The domain policy gate rejected the target before scanning.
    #[error("Scanning {domain} is not permitted ({policy}): {reason}")]
    PolicyDenied {
        domain: String,
        policy: PolicyType,
        reason: String,
    },

    /// Daily scan quota reached for this requester.
    #[error("Daily scan limit reached ({scans_today}/{daily_limit})")]
    QuotaExceeded {
        scans_today: i32,
        daily_limit: i32,
    },

    /// Primary page scrape failed. Fatal to the scan.
    #[error("Crawl failed for {url}: {reason}")]
    CrawlFailure { url: String, reason: String },

    /// Upstream service returned 429.
    #[error("{service} rate limit exceeded, retry later")]
    UpstreamRateLimited { service: String },

    /// Upstream service returned 402 (credits/plan exhausted).
    #[error("{service} quota or credits exhausted")]
    UpstreamExhausted { service: String },

    /// Gateway authentication/authorization errors
    #[error("{0}")]
    Auth(#[from] AuthError),

    /// Persistence errors
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Search index synchronization failure. Logged, never surfaced to callers.
    #[error("Search sync failed: {0}")]
    Sync(String),

    /// DNS lookup failure during ownership verification
    #[error("DNS verification failed for {domain}: {reason}")]
    Dns { domain: String, reason: String },

    /// Requested record does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// General errors
    #[error("Recon error: {0}")]
    General(String),
}

/// Gateway authentication errors (401/403 surface)
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AuthError {
    #[error("Missing API key")]
    MissingKey,

    #[error("Invalid API key")]
    InvalidKey,

    #[error("API key has expired")]
    ExpiredKey,

    #[error("API key lacks required permission: {scope}")]
    InsufficientScope { scope: String },
}

/// Persistence-layer errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),
}

impl From<tokio_postgres::Error> for StoreError {
    fn from(err: tokio_postgres::Error) -> Self {
        StoreError::Query(err.to_string())
    }
}

impl From<deadpool_postgres::PoolError> for StoreError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        StoreError::Connection(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl ReconError {
    /// True when the operation may succeed on retry without operator action.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ReconError::UpstreamRateLimited { .. }
                | ReconError::Sync(_)
                | ReconError::Store(StoreError::Connection(_))
        )
    }
}

/// Result type for recon pipeline operations
pub type ReconResult<T> = Result<T, ReconError>;
