//! HTTP server for NSOS.
//!
//! Wraps the [`nsos_api`] router with session authentication, evidence file
//! serving, request tracing and panic recovery, backed by any
//! [`RecordStore`].

pub mod auth;
pub mod error;
pub mod session;

pub use error::Error;

use std::{
  any::Any,
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use axum::{
  Json, Router,
  extract::DefaultBodyLimit,
  http::{HeaderValue, Method, StatusCode, header},
  middleware,
  response::{IntoResponse, Response},
  routing::{get, post},
};
use nsos_api::{ApiState, UploadDir, error::INTERNAL_MESSAGE};
use nsos_core::{audit::AuditMode, store::RecordStore};
use nsos_store_sqlite::DEFAULT_TIMEOUT;
use serde::Deserialize;
use serde_json::json;
use session::SessionStore;
use tower_http::{
  catch_panic::CatchPanicLayer,
  cors::{AllowOrigin, CorsLayer},
  services::ServeDir,
  trace::TraceLayer,
};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `NSOS_*` environment variables. Every field has a default.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:             String,
  pub port:             u16,
  pub database_path:    PathBuf,
  pub uploads_dir:      PathBuf,
  pub max_upload_bytes: usize,
  pub session_ttl_secs: u64,
  /// Adds `Secure` to the session cookie; enable behind TLS.
  pub cookie_secure:    bool,
  pub store_timeout_ms: u64,
  pub audit_mode:       AuditMode,
  /// Origins allowed to make credentialed cross-origin requests. Empty
  /// means the request's own origin is echoed back.
  pub cors_origins:     Vec<String>,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:             "127.0.0.1".to_owned(),
      port:             5000,
      database_path:    PathBuf::from("nsos.db"),
      uploads_dir:      PathBuf::from("uploads"),
      max_upload_bytes: 16 * 1024 * 1024,
      session_ttl_secs: 24 * 60 * 60,
      cookie_secure:    false,
      store_timeout_ms: u64::try_from(DEFAULT_TIMEOUT.as_millis()).unwrap_or(u64::MAX),
      audit_mode:       AuditMode::Atomic,
      cors_origins:     Vec::new(),
    }
  }
}

impl ServerConfig {
  /// Layer the optional TOML file at `path` under `NSOS_*` environment
  /// variables.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("NSOS")
          .try_parsing(true)
          .list_separator(",")
          .with_list_parse_key("cors_origins"),
      )
      .build()?
      .try_deserialize()
  }
}

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through the session handlers and middleware.
pub struct AppState<S> {
  pub store:    Arc<S>,
  pub sessions: Arc<SessionStore>,
  pub uploads:  Arc<UploadDir>,
  pub config:   Arc<ServerConfig>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      sessions: Arc::clone(&self.sessions),
      uploads:  Arc::clone(&self.uploads),
      config:   Arc::clone(&self.config),
    }
  }
}

impl<S> AppState<S> {
  pub fn new(store: S, config: ServerConfig) -> Self {
    Self {
      store:    Arc::new(store),
      sessions: Arc::new(SessionStore::new(config.session_ttl_secs)),
      uploads:  Arc::new(UploadDir::new(config.uploads_dir.clone())),
      config:   Arc::new(config),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the complete application router.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: RecordStore + 'static,
{
  let api_state = ApiState {
    store:   Arc::clone(&state.store),
    uploads: Arc::clone(&state.uploads),
  };

  let public: Router = Router::new()
    .route("/login", post(auth::login::<S>))
    .route("/check-auth", get(auth::check_auth::<S>))
    .with_state(state.clone());

  let protected: Router = Router::new()
    .route("/logout", post(auth::logout::<S>))
    .with_state(state.clone())
    .merge(nsos_api::api_router(api_state))
    .route_layer(middleware::from_fn_with_state(
      state.clone(),
      auth::require_session::<S>,
    ));

  let files: Router = Router::new()
    .nest_service("/uploads", ServeDir::new(state.uploads.path()))
    .route_layer(middleware::from_fn_with_state(
      state.clone(),
      auth::require_session::<S>,
    ));

  Router::new()
    .nest("/api", public.merge(protected))
    .merge(files)
    .fallback(not_found)
    .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
    .layer(CatchPanicLayer::custom(panic_response))
    .layer(cors_layer(&state.config))
    .layer(TraceLayer::new_for_http())
}

/// Credentialed CORS so a browser front end on another origin can carry the
/// session cookie.
fn cors_layer(config: &ServerConfig) -> CorsLayer {
  let origins = if config.cors_origins.is_empty() {
    AllowOrigin::mirror_request()
  } else {
    AllowOrigin::list(
      config
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok()),
    )
  };

  CorsLayer::new()
    .allow_origin(origins)
    .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
    .allow_headers([header::ACCEPT, header::CONTENT_TYPE])
    .allow_credentials(true)
    .max_age(Duration::from_secs(3600))
}

async fn not_found() -> impl IntoResponse {
  (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" })))
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
  let detail = panic
    .downcast_ref::<String>()
    .map(String::as_str)
    .or_else(|| panic.downcast_ref::<&str>().copied())
    .unwrap_or("unknown panic");
  tracing::error!(panic = detail, "handler panicked");
  (
    StatusCode::INTERNAL_SERVER_ERROR,
    Json(json!({ "error": INTERNAL_MESSAGE })),
  )
    .into_response()
}

#[cfg(test)]
mod tests;
