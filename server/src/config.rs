//! Command-line and environment configuration.

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use licensegate_activation::TokenIssuer;
use licensegate_store::{
    ActivationStore, License, MemoryStore, PostgrestConfig, PostgrestStore, SqliteStore,
};

/// Which backend holds the `licenses` and `activations` tables.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreKind {
    /// Supabase REST interface.
    Supabase,
    /// Local SQLite file.
    Sqlite,
    /// Process memory; lost on exit.
    Memory,
}

/// Token digest used by this deployment.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenScheme {
    /// SHA-256 over license key and machine id.
    Sha256,
    /// HMAC-SHA-256 keyed with the license secret.
    HmacSha256,
}

#[derive(Parser, Clone)]
#[command(name = "licensegate")]
#[command(about = "License activation endpoint")]
pub struct Args {
    /// Address to serve HTTP on
    #[arg(long, env = "LICENSEGATE_LISTEN", default_value = "0.0.0.0:3000")]
    pub listen: SocketAddr,

    /// License store backend
    #[arg(long, env = "LICENSEGATE_STORE", value_enum, default_value_t = StoreKind::Supabase)]
    pub store: StoreKind,

    /// Supabase project URL
    #[arg(long, env = "SUPABASE_URL")]
    pub supabase_url: Option<String>,

    /// Supabase access key
    #[arg(long, env = "SUPABASE_KEY", hide_env_values = true)]
    pub supabase_key: Option<String>,

    /// SQLite database file
    #[arg(long, env = "LICENSEGATE_SQLITE_PATH", default_value = "licensegate.db")]
    pub sqlite_path: PathBuf,

    /// Token scheme
    #[arg(long, env = "LICENSEGATE_TOKEN_SCHEME", value_enum, default_value_t = TokenScheme::Sha256)]
    pub token_scheme: TokenScheme,

    /// Secret for hmac-sha256 tokens
    #[arg(long, env = "LICENSE_SECRET", hide_env_values = true)]
    pub license_secret: Option<String>,

    /// Provision a license in a local store, as KEY=MAX_DEVICES (repeatable)
    #[arg(long = "seed-license", value_parser = parse_seed_license)]
    pub seed_licenses: Vec<License>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

fn parse_seed_license(raw: &str) -> Result<License, String> {
    let (key, max) = raw
        .rsplit_once('=')
        .ok_or_else(|| format!("expected KEY=MAX_DEVICES, got {raw:?}"))?;
    if key.is_empty() {
        return Err("license key is empty".to_string());
    }
    let max: u32 = max
        .parse()
        .map_err(|e| format!("invalid device count {max:?}: {e}"))?;
    Ok(License::new(key, max))
}

impl Args {
    /// Builds the token issuer for the configured scheme.
    pub fn token_issuer(&self) -> Result<TokenIssuer> {
        match self.token_scheme {
            TokenScheme::Sha256 => Ok(TokenIssuer::sha256()),
            TokenScheme::HmacSha256 => {
                let secret = self
                    .license_secret
                    .as_deref()
                    .context("LICENSE_SECRET is required for hmac-sha256 tokens")?;
                TokenIssuer::hmac_sha256(secret).context("invalid LICENSE_SECRET")
            }
        }
    }

    /// Opens the configured store, seeding local backends if requested.
    pub fn open_store(&self) -> Result<Arc<dyn ActivationStore>> {
        match self.store {
            StoreKind::Supabase => {
                if !self.seed_licenses.is_empty() {
                    bail!("--seed-license is only supported for sqlite and memory stores");
                }
                let url = self
                    .supabase_url
                    .clone()
                    .context("SUPABASE_URL is required for the supabase store")?;
                let key = self
                    .supabase_key
                    .clone()
                    .context("SUPABASE_KEY is required for the supabase store")?;
                let store = PostgrestStore::new(PostgrestConfig::new(url, key))
                    .context("failed to create Supabase client")?;
                Ok(Arc::new(store))
            }
            StoreKind::Sqlite => {
                let store = SqliteStore::open(&self.sqlite_path).with_context(|| {
                    format!("failed to open {}", self.sqlite_path.display())
                })?;
                for license in &self.seed_licenses {
                    store.upsert_license(license)?;
                }
                Ok(Arc::new(store))
            }
            StoreKind::Memory => Ok(Arc::new(MemoryStore::with_licenses(
                self.seed_licenses.iter().cloned(),
            ))),
        }
    }
}
