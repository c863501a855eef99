// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

use kartoitin::ai::{DomainClassifier, LlmClassifier, RubricClassifier};
use kartoitin::api::{create_router, ApiState};
use kartoitin::config::AppConfig;
use kartoitin::crawler::CrawlOrchestrator;
use kartoitin::pipeline::ScanPipeline;
use kartoitin::policy::PolicyGate;
use kartoitin::quota::QuotaEnforcer;
use kartoitin::scheduler::Scheduler;
use kartoitin::search::SearchIndexer;
use kartoitin::store::{MemStore, PgStore, PgStoreConfig, Store};

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    print!("\x1b[92m");
    println!("   __ __           __        _ __  _");
    println!("  / //_/___ ______/ /_____  (_) /_(_)___");
    println!(" / ,< / __ `/ ___/ __/ __ \\/ / __/ / __ \\");
    println!("/ /| / /_/ / /  / /_/ /_/ / / /_/ / / / /");
    println!("/_/ |_\\__,_/_/   \\__/\\____/_/\\__/_/_/ /_/");
    print!("\x1b[0m");
    println!();
    print!("\x1b[1m\x1b[97m");
    println!("      Domain Reconnaissance Pipeline");
    print!("\x1b[0m\x1b[92m");
    println!("        v1.0 - (c) 2026 Bountyy Oy");
    print!("\x1b[0m");
    println!();

    info!("Kartoitin Recon Pipeline v1.0.0 - Starting");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(num_cpus::get())
        .thread_name("kartoitin-worker")
        .enable_all()
        .build()?;

    info!("[SUCCESS] Tokio runtime initialized with {} worker threads", num_cpus::get());

    runtime.block_on(async_main())
}

async fn async_main() -> Result<()> {
    let config = AppConfig::from_env()?;

    let store: Arc<dyn Store> = match &config.database_url {
        Some(url) => {
            let pg = PgStore::new(PgStoreConfig {
                database_url: url.clone(),
                ..Default::default()
            })
            .await?;
            pg.init_schema().await?;
            Arc::new(pg)
        }
        None => {
            warn!("[WARNING] DATABASE_URL not set, using in-memory store (state is not persisted)");
            Arc::new(MemStore::new())
        }
    };

    let classifier: Arc<dyn DomainClassifier> = match &config.ai_api_key {
        Some(key) => Arc::new(LlmClassifier::new(
            key.clone(),
            config.ai_base_url.clone(),
            config.ai_model.clone(),
        )?),
        None => {
            warn!("[WARNING] AI_API_KEY not set, using offline rubric classifier");
            Arc::new(RubricClassifier::new())
        }
    };

    if config.crawl_api_key.is_none() {
        warn!("[WARNING] CRAWL_API_KEY not set, scan submissions will be rejected until configured");
    }
    let crawler = CrawlOrchestrator::new(&config.crawl_base_url, config.crawl_api_key.as_deref())?;

    let indexer = match (&config.search_url, &config.search_api_key) {
        (Some(url), Some(key)) => SearchIndexer::new(url, key),
        _ => {
            info!("Search indexing disabled (SEARCH_URL/SEARCH_API_KEY not set)");
            SearchIndexer::disabled()
        }
    };

    let policy = Arc::new(PolicyGate::new(store.clone(), classifier));
    let quota = QuotaEnforcer::new(store.clone(), config.daily_scan_limit);
    let pipeline = Arc::new(ScanPipeline::new(
        store.clone(),
        policy.clone(),
        quota,
        crawler,
        indexer,
    ));

    let scheduler = Arc::new(Scheduler::new(store.clone(), pipeline.clone()));
    tokio::spawn(scheduler.run_loop(config.scheduler_interval_secs));
    info!("Scheduler sweep loop started (every {}s)", config.scheduler_interval_secs);

    let state = Arc::new(ApiState {
        store,
        pipeline,
        policy,
    });
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("[SUCCESS] Gateway listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
