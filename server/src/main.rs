//! licensegate activation server
//!
//! Serves `POST /api/activate`: validates a license key, enforces its device
//! cap, records new machines, and returns the activation token.
//!
//! Usage:
//!   SUPABASE_URL=... SUPABASE_KEY=... licensegate --listen 0.0.0.0:3000
//!   licensegate --store memory --seed-license ABC-123=2
//!
//! The server holds no state of its own; licenses and activations live in the
//! configured store.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use licensegate_activation::Activator;
use licensegate_server::{build_router, config::Args};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    let store = args.open_store().context("failed to open license store")?;
    let tokens = args.token_issuer()?;
    info!(
        store = store.backend_name(),
        token_scheme = tokens.scheme_name(),
        "licensegate starting"
    );
    if !args.seed_licenses.is_empty() {
        info!("Seeded {} license(s)", args.seed_licenses.len());
    }

    let app = build_router(Arc::new(Activator::new(store, tokens)));

    let listener = tokio::net::TcpListener::bind(args.listen)
        .await
        .with_context(|| format!("failed to bind {}", args.listen))?;
    info!("HTTP activation endpoint listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("licensegate stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
