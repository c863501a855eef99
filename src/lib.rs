// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Recon Pipeline Library
 * Exposes pipeline modules for the server binary and tests
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

pub mod config;
pub mod errors;
pub mod types;

// Static signature and rule tables
pub mod rules;
pub mod scorer;
pub mod signatures;

// Crawl and surface analysis
pub mod crawler;
pub mod parser;

// Admission control
pub mod policy;
pub mod quota;

// AI classifier capability
pub mod ai;

// Persistence
pub mod store;

// Pipeline orchestration and recurring scans
pub mod pipeline;
pub mod scheduler;

// Best-effort search mirroring
pub mod search;

// HTTP gateway
pub mod api;
