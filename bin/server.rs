// 🌐 FraudGuard - Web Server
// REST API with Axum plus the background simulation driver

use anyhow::{Context, Result};
use clap::Parser;
use fraudguard::explain::{generator_from_config, TextGenerator};
use fraudguard::server::{create_app, spawn_simulation_driver, AppState};
use fraudguard::{AppConfig, DataStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fraudguard-server")]
#[command(about = "Fraud detection and credit scoring API")]
#[command(version)]
struct Args {
    /// Bind address (overrides FRAUDGUARD_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port (overrides FRAUDGUARD_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// SQLite file for the stored dataset (overrides FRAUDGUARD_DB)
    #[arg(long)]
    db: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fraudguard=info,tower_http=info")),
        )
        .init();

    let args = Args::parse();
    let mut config = AppConfig::from_env();
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(db) = args.db {
        config.db_path = db;
    }

    println!("🌐 FraudGuard - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let store = DataStore::open(&config.db_path)?;
    println!("✓ Database opened: {:?} ({} stored applications)", config.db_path, store.record_count());

    let generator: Arc<dyn TextGenerator> = Arc::from(generator_from_config(&config.llm()));
    let state = AppState::new(store, generator, &config);
    if !state.generator.is_enabled() {
        println!("⚠️  No LLM API key set; generated explanations are unavailable");
    }

    let driver = spawn_simulation_driver(state.clone(), config.sim_interval());
    let app = create_app(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    println!("\n🚀 Server running on http://{}", addr);
    println!("   API: http://{}/api/health", addr);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    driver.abort();
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown requested");
    }
}
