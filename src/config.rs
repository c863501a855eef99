// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Recon Pipeline Configuration
 * Environment-driven configuration with explicit missing-credential errors
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use crate::errors::{ReconError, ReconResult};

/// Default per-requester daily scan limit when SCAN_DAILY_LIMIT is unset
pub const DEFAULT_DAILY_LIMIT: i32 = 10;

/// Application configuration. All values are sourced from the
/// environment; required collaborator credentials are checked lazily so
/// the dependent operation fails with an explicit "not configured"
/// error instead of a generic fault.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Gateway bind port
    pub port: u16,
    /// Gateway bind host
    pub host: String,
    /// PostgreSQL connection URL. When absent the in-memory store is used.
    pub database_url: Option<String>,
    /// External crawl service
    pub crawl_api_key: Option<String>,
    pub crawl_base_url: String,
    /// AI decision service
    pub ai_api_key: Option<String>,
    pub ai_base_url: String,
    pub ai_model: String,
    /// Secondary search store (optional; indexing is best-effort)
    pub search_url: Option<String>,
    pub search_api_key: Option<String>,
    /// Per-requester scans-per-day limit
    pub daily_scan_limit: i32,
    /// Scheduler sweep interval in seconds
    pub scheduler_interval_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "0.0.0.0".to_string(),
            database_url: None,
            crawl_api_key: None,
            crawl_base_url: "https://api.firecrawl.dev".to_string(),
            ai_api_key: None,
            ai_base_url: "https://api.anthropic.com".to_string(),
            ai_model: "claude-sonnet-4-5-20250929".to_string(),
            search_url: None,
            search_api_key: None,
            daily_scan_limit: DEFAULT_DAILY_LIMIT,
            scheduler_interval_secs: 60,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with sensible defaults
    ///
    /// Supported variables:
    /// - SERVER_PORT / SERVER_HOST
    /// - DATABASE_URL (enables PostgreSQL persistence when set)
    /// - CRAWL_API_KEY / CRAWL_BASE_URL
    /// - AI_API_KEY / AI_BASE_URL / AI_MODEL
    /// - SEARCH_URL / SEARCH_API_KEY
    /// - SCAN_DAILY_LIMIT
    /// - SCHEDULER_INTERVAL_SECS
    pub fn from_env() -> ReconResult<Self> {
        let mut config = Self::default();

        if let Ok(port) = std::env::var("SERVER_PORT") {
            config.port = port
                .parse()
                .map_err(|_| ReconError::Configuration("Invalid SERVER_PORT value".to_string()))?;
        }

        if let Ok(host) = std::env::var("SERVER_HOST") {
            config.host = host;
        }

        config.database_url = std::env::var("DATABASE_URL").ok();
        config.crawl_api_key = std::env::var("CRAWL_API_KEY").ok();

        if let Ok(url) = std::env::var("CRAWL_BASE_URL") {
            config.crawl_base_url = url;
        }

        config.ai_api_key = std::env::var("AI_API_KEY").ok();

        if let Ok(url) = std::env::var("AI_BASE_URL") {
            config.ai_base_url = url;
        }

        if let Ok(model) = std::env::var("AI_MODEL") {
            config.ai_model = model;
        }

        config.search_url = std::env::var("SEARCH_URL").ok();
        config.search_api_key = std::env::var("SEARCH_API_KEY").ok();

        if let Ok(limit) = std::env::var("SCAN_DAILY_LIMIT") {
            config.daily_scan_limit = limit.parse().map_err(|_| {
                ReconError::Configuration("Invalid SCAN_DAILY_LIMIT value".to_string())
            })?;
        }

        if let Ok(interval) = std::env::var("SCHEDULER_INTERVAL_SECS") {
            config.scheduler_interval_secs = interval.parse().map_err(|_| {
                ReconError::Configuration("Invalid SCHEDULER_INTERVAL_SECS value".to_string())
            })?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_hold_without_environment() {
        let config = AppConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.daily_scan_limit, DEFAULT_DAILY_LIMIT);
        assert!(config.crawl_api_key.is_none());
        assert!(config.database_url.is_none());
    }
}
