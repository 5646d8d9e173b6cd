//! openklant server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), overlays
//! `OPENKLANT_*` environment variables, opens an in-process SQLite store, and
//! serves the Partij API over HTTP.
//!
//! ```toml
//! host       = "127.0.0.1"
//! port       = 8000
//! base_url   = "http://localhost:8000/klantinteracties/api/v1"
//! store_path = "~/.local/share/openklant/openklant.db"
//!
//! # Let records other than a vestigingsnummer carry a subIdentificatorVan.
//! lenient_sub_identificator = false
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Parser;
use openklant_api::{ApiConfig, AppState};
use openklant_core::reconciler::ValidationPolicy;
use openklant_store_sqlite::SqliteStore;
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Path the API is mounted under.
const API_PREFIX: &str = "/klantinteracties/api/v1";

#[derive(Parser)]
#[command(author, version, about = "OpenKlant Partij API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Debug, Deserialize, Clone)]
struct ServerConfig {
  host:                      String,
  port:                      u16,
  base_url:                  String,
  store_path:                PathBuf,
  lenient_sub_identificator: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let server_cfg = load_config(&cli.config)?;

  // Expand `~` in store path.
  let store_path = expand_tilde(&server_cfg.store_path);
  if let Some(parent) = store_path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {parent:?}"))?;
  }

  // Open SQLite store.
  let policy = ValidationPolicy::from_lenient(server_cfg.lenient_sub_identificator);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?
    .with_policy(policy);
  tracing::info!(path = ?store_path, ?policy, "opened store");

  let state = AppState::new(store, ApiConfig {
    base_url: server_cfg.base_url.trim_end_matches('/').to_string(),
  });
  let app = axum::Router::new()
    .nest(API_PREFIX, openklant_api::api_router(state))
    .layer(TraceLayer::new_for_http());

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  tracing::info!("Listening on http://{address}{API_PREFIX}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Layer defaults, the optional config file, and `OPENKLANT_*` variables.
fn load_config(path: &Path) -> anyhow::Result<ServerConfig> {
  let settings = config::Config::builder()
    .set_default("host", "127.0.0.1")?
    .set_default("port", 8000)?
    .set_default("base_url", format!("http://localhost:8000{API_PREFIX}"))?
    .set_default("store_path", "openklant.db")?
    .set_default("lenient_sub_identificator", false)?
    .add_source(config::File::from(path).required(false))
    .add_source(config::Environment::with_prefix("OPENKLANT"))
    .build()
    .context("failed to read config file")?;

  settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
