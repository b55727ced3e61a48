//! Login, logout and the session gate in front of the API.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use axum::{
  Json,
  extract::{Request, State, rejection::JsonRejection},
  middleware::Next,
  response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use nsos_core::store::RecordStore;
use rand_core::OsRng;
use serde::Deserialize;
use serde_json::json;

use crate::{AppState, error::Error, session};

// ─── Passwords ───────────────────────────────────────────────────────────────

/// Hash `password` into an argon2 PHC string with a fresh salt.
pub fn hash_password(password: &str) -> Result<String, Error> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| Error::Hash(e.to_string()))
}

/// Check `password` against a stored PHC string. Cost parameters come from
/// the hash itself; an unparsable hash never verifies.
pub fn verify_password(password: &str, phc: &str) -> bool {
  PasswordHash::new(phc)
    .map(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
    .unwrap_or(false)
}

// ─── Handlers ────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct LoginBody {
  pub username: Option<String>,
  pub password: Option<String>,
}

/// `POST /api/login`
pub async fn login<S: RecordStore>(
  State(state): State<AppState<S>>,
  jar: CookieJar,
  body: Result<Json<LoginBody>, JsonRejection>,
) -> Result<impl IntoResponse, Error> {
  let Json(body) = body.map_err(|e| Error::BadRequest(e.body_text()))?;
  let (Some(username), Some(password)) = (
    body.username.filter(|u| !u.is_empty()),
    body.password.filter(|p| !p.is_empty()),
  ) else {
    return Err(Error::BadRequest("Username and password are required".to_owned()));
  };

  let admin = state
    .store
    .get_admin_by_username(&username)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?
    .filter(|admin| verify_password(&password, &admin.password_hash));

  let Some(admin) = admin else {
    tracing::warn!(%username, "login failed");
    return Err(Error::InvalidCredentials);
  };

  let token = state.sessions.create(admin.admin_id, admin.username.clone());
  tracing::info!(username = %admin.username, "login succeeded");

  let cookie = session::session_cookie(
    token,
    state.sessions.ttl_secs(),
    state.config.cookie_secure,
  );
  Ok((
    jar.add(cookie),
    Json(json!({ "message": "Login successful", "username": admin.username })),
  ))
}

/// `POST /api/logout`, behind [`require_session`].
pub async fn logout<S: RecordStore>(
  State(state): State<AppState<S>>,
  jar: CookieJar,
) -> impl IntoResponse {
  if let Some(token) = session::token_from_jar(&jar) {
    state.sessions.remove(token);
  }
  (
    jar.remove(session::removal_cookie(state.config.cookie_secure)),
    Json(json!({ "message": "Logged out successfully" })),
  )
}

/// `GET /api/check-auth`
pub async fn check_auth<S: RecordStore>(
  State(state): State<AppState<S>>,
  jar: CookieJar,
) -> impl IntoResponse {
  let current = session::token_from_jar(&jar).and_then(|t| state.sessions.get(t));
  match current {
    Some(s) => Json(json!({ "authenticated": true, "username": s.username })),
    None => Json(json!({ "authenticated": false })),
  }
}

// ─── Middleware ──────────────────────────────────────────────────────────────

/// Reject requests without a live session; otherwise attach the
/// [`session::Session`] to the request extensions.
pub async fn require_session<S: RecordStore>(
  State(state): State<AppState<S>>,
  jar: CookieJar,
  mut request: Request,
  next: Next,
) -> Response {
  let current = session::token_from_jar(&jar).and_then(|t| state.sessions.get(t));

  match current {
    Some(s) => {
      request.extensions_mut().insert(s);
      next.run(request).await
    }
    None => Error::Unauthorized.into_response(),
  }
}
