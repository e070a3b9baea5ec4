//! Server wiring for Dojo: configuration, store opening, and the HTTP app.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use axum::Router;
use config::{Config, ConfigBuilder, Environment, File, builder::DefaultState};
use dojo_core::{pairing::PairingOptions, store::TournamentStore};
use dojo_store_sqlite::SqliteStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

/// Path value that selects an in-memory store.
pub const IN_MEMORY: &str = ":memory:";

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and `DOJO_*`
/// environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
  #[serde(default)]
  pub pairing:    PairingOptions,
}

impl ServerConfig {
  /// Builder pre-loaded with defaults; sources added later take precedence.
  pub fn builder() -> anyhow::Result<ConfigBuilder<DefaultState>> {
    Ok(
      Config::builder()
        .set_default("host", "127.0.0.1")?
        .set_default("port", 5000)?
        .set_default("store_path", "dojo.sqlite3")?,
    )
  }

  /// Read `path` (if it exists), then `DOJO_*` variables, e.g. `DOJO_PORT` or
  /// `DOJO_PAIRING__MAX_ITERATIONS`.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = Self::builder()?
      .add_source(File::from(path).required(false))
      .add_source(
        Environment::with_prefix("DOJO")
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true),
      )
      .build()
      .context("failed to read config file")?;

    settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Store ────────────────────────────────────────────────────────────────────

/// Open the SQLite store named by `path`, expanding a leading `~/`.
pub async fn open_store(path: &Path) -> anyhow::Result<SqliteStore> {
  if path.as_os_str() == IN_MEMORY {
    tracing::warn!("using an in-memory store; data is lost on exit");
    return SqliteStore::open_in_memory()
      .await
      .context("failed to open in-memory store");
  }

  let path = expand_tilde(path);
  SqliteStore::open(&path)
    .await
    .with_context(|| format!("failed to open store at {path:?}"))
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// The full HTTP app: the JSON API under `/api`, with request tracing.
pub fn app<S>(store: Arc<S>, config: &ServerConfig) -> Router
where
  S: TournamentStore + 'static,
{
  Router::new()
    .nest("/api", dojo_api::api_router(store, config.pairing))
    .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use config::FileFormat;
  use tower::ServiceExt as _;

  use super::*;

  fn from_toml(toml: &str) -> ServerConfig {
    ServerConfig::builder()
      .unwrap()
      .add_source(File::from_str(toml, FileFormat::Toml))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap()
  }

  #[test]
  fn defaults_fill_missing_keys() {
    let cfg = from_toml("");
    assert_eq!(cfg.address(), "127.0.0.1:5000");
    assert_eq!(cfg.store_path, PathBuf::from("dojo.sqlite3"));
    assert_eq!(cfg.pairing, PairingOptions::default());
  }

  #[test]
  fn file_overrides_defaults() {
    let cfg = from_toml(
      r#"
        host = "0.0.0.0"
        port = 8080
        store_path = ":memory:"

        [pairing]
        max_iterations = 50
      "#,
    );
    assert_eq!(cfg.address(), "0.0.0.0:8080");
    assert_eq!(cfg.pairing.max_iterations, 50);
  }

  #[test]
  fn missing_config_file_is_not_an_error() {
    let cfg = ServerConfig::load(Path::new("/nonexistent/dojo.toml")).unwrap();
    assert!(cfg.port > 0);
  }

  #[test]
  fn tilde_expands_to_home() {
    let Ok(home) = std::env::var("HOME") else { return };
    assert_eq!(
      expand_tilde(Path::new("~/dojo.sqlite3")),
      PathBuf::from(home).join("dojo.sqlite3")
    );
    assert_eq!(expand_tilde(Path::new("/srv/dojo.sqlite3")), PathBuf::from("/srv/dojo.sqlite3"));
  }

  #[tokio::test]
  async fn api_is_mounted_under_prefix() {
    let cfg = from_toml(r#"store_path = ":memory:""#);
    let store = open_store(&cfg.store_path).await.unwrap();
    let app = app(Arc::new(store), &cfg);

    let resp = app
      .oneshot(Request::builder().uri("/api/matches").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, serde_json::json!([]));
  }
}
