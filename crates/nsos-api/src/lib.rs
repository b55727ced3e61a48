//! JSON REST API for NSOS.
//!
//! Exposes an axum [`Router`] backed by any [`nsos_core::store::RecordStore`].
//! Sessions, TLS and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", nsos_api::api_router(state))
//! ```

pub mod audit;
pub mod cases;
pub mod criminals;
pub mod duties;
pub mod error;
pub mod evidence;
pub mod extract;
pub mod fields;
pub mod officers;
pub mod search;
pub mod units;
pub mod uploads;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get},
};
use nsos_core::store::RecordStore;

pub use error::ApiError;
pub use uploads::UploadDir;

// ─── State ───────────────────────────────────────────────────────────────────

/// Shared state threaded through every API handler.
pub struct ApiState<S> {
  pub store:   Arc<S>,
  pub uploads: Arc<UploadDir>,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), uploads: Arc::clone(&self.uploads) }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: ApiState<S>) -> Router<()>
where
  S: RecordStore + 'static,
{
  Router::new()
    // Officers
    .route("/officers", get(officers::list::<S>).post(officers::create::<S>))
    .route(
      "/officers/{id}",
      get(officers::get_one::<S>)
        .put(officers::update::<S>)
        .delete(officers::remove::<S>),
    )
    // Criminals
    .route("/criminals", get(criminals::list::<S>).post(criminals::create::<S>))
    .route(
      "/criminals/{id}",
      get(criminals::get_one::<S>)
        .put(criminals::update::<S>)
        .delete(criminals::remove::<S>),
    )
    // Cases
    .route("/cases", get(cases::list::<S>).post(cases::create::<S>))
    .route(
      "/cases/{id}",
      get(cases::get_one::<S>)
        .put(cases::update::<S>)
        .delete(cases::remove::<S>),
    )
    .route(
      "/cases/{id}/updates",
      get(cases::list_updates::<S>).post(cases::add_update::<S>),
    )
    // Evidence
    .route("/evidence", get(evidence::list::<S>).post(evidence::upload::<S>))
    // Duties
    .route("/duties", get(duties::list::<S>).post(duties::create::<S>))
    .route("/duties/{id}", delete(duties::remove::<S>))
    // Units
    .route("/units", get(units::list::<S>).post(units::create::<S>))
    .route("/units/{id}", get(units::get_one::<S>))
    // Search and audit
    .route("/search", get(search::handler::<S>))
    .route("/audit", get(audit::handler::<S>))
    .with_state(state)
}

#[cfg(test)]
mod tests;
