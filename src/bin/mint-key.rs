// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * API Key Minting Tool - Standalone Binary
 * Creates a gateway API key and prints the plaintext exactly once
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use anyhow::{bail, Result};
use chrono::{Duration, Utc};
use clap::Parser;

use kartoitin::api::auth::mint_key;
use kartoitin::store::{PgStore, PgStoreConfig, Store};
use kartoitin::types::Scope;

#[derive(Parser, Debug)]
#[command(name = "mint-key")]
#[command(about = "Mint a Kartoitin gateway API key", long_about = None)]
struct Args {
    /// Human-readable key name (e.g. "ci", "ops-dashboard")
    #[arg(long)]
    name: String,

    /// Scopes to grant (comma-separated: scan:create,scan:read,findings:read)
    #[arg(long, default_value = "scan:read,findings:read")]
    scopes: String,

    /// Expiry in days from now (omit for a non-expiring key)
    #[arg(long)]
    expires_days: Option<i64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let mut scopes = Vec::new();
    for raw in args.scopes.split(',') {
        let raw = raw.trim();
        match Scope::parse(raw) {
            Some(scope) => scopes.push(scope),
            None => bail!("Unknown scope '{}'", raw),
        }
    }
    if scopes.is_empty() {
        bail!("At least one scope is required");
    }

    let expires_at = args.expires_days.map(|days| Utc::now() + Duration::days(days));

    let database_url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => bail!("DATABASE_URL must be set to mint a persistent key"),
    };

    let store = PgStore::new(PgStoreConfig {
        database_url,
        ..Default::default()
    })
    .await?;
    store.init_schema().await?;

    let minted = mint_key(&args.name, scopes, expires_at);
    store.insert_api_key(&minted.record).await?;

    println!("Key '{}' created (id {})", minted.record.name, minted.record.id);
    println!("Prefix: {}", minted.record.key_prefix);
    match minted.record.expires_at {
        Some(when) => println!("Expires: {}", when),
        None => println!("Expires: never"),
    }
    println!();
    println!("Plaintext (shown once, store it now):");
    println!("{}", minted.plaintext);

    Ok(())
}
