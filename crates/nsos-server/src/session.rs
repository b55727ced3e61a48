//! Server-side sessions and the session cookie.
//!
//! The client holds a random 256-bit token. The server keeps only its
//! SHA-256 digest, so a leaked session table cannot be replayed. Sessions
//! expire a fixed time after login; activity does not extend them.

use std::{
  collections::HashMap,
  sync::{PoisonError, RwLock},
};

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, TimeDelta, Utc};
use nsos_core::RecordId;
use rand_core::{OsRng, RngCore};
use sha2::{Digest, Sha256};

pub const SESSION_COOKIE: &str = "nsos_session";

const TOKEN_BYTES: usize = 32;

/// An authenticated operator. Inserted into request extensions by
/// [`crate::auth::require_session`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
  pub admin_id:   RecordId,
  pub username:   String,
  pub expires_at: DateTime<Utc>,
}

pub struct SessionStore {
  ttl_secs: u64,
  ttl:      TimeDelta,
  sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
  pub fn new(ttl_secs: u64) -> Self {
    let ttl = i64::try_from(ttl_secs)
      .ok()
      .and_then(TimeDelta::try_seconds)
      .unwrap_or(TimeDelta::MAX);
    Self { ttl_secs, ttl, sessions: RwLock::default() }
  }

  pub fn ttl_secs(&self) -> u64 { self.ttl_secs }

  /// Start a session and return the token to hand to the client. Expired
  /// sessions are purged on the way.
  pub fn create(&self, admin_id: RecordId, username: String) -> String {
    let mut raw = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut raw);
    let token = URL_SAFE_NO_PAD.encode(raw);

    let now = Utc::now();
    let session = Session {
      admin_id,
      username,
      expires_at: now.checked_add_signed(self.ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
    };

    let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
    sessions.retain(|_, s| s.expires_at > now);
    sessions.insert(digest(&token), session);
    token
  }

  /// The live session for `token`, if any.
  pub fn get(&self, token: &str) -> Option<Session> {
    let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
    sessions
      .get(&digest(token))
      .filter(|s| s.expires_at > Utc::now())
      .cloned()
  }

  pub fn remove(&self, token: &str) {
    self
      .sessions
      .write()
      .unwrap_or_else(PoisonError::into_inner)
      .remove(&digest(token));
  }

  #[cfg(test)]
  fn len(&self) -> usize {
    self.sessions.read().unwrap_or_else(PoisonError::into_inner).len()
  }
}

fn digest(token: &str) -> String { hex::encode(Sha256::digest(token.as_bytes())) }

// ─── Cookie ──────────────────────────────────────────────────────────────────

/// The cookie carrying a fresh session token.
pub fn session_cookie(token: String, max_age_secs: u64, secure: bool) -> Cookie<'static> {
  let max_age = i64::try_from(max_age_secs).unwrap_or(i64::MAX);
  Cookie::build((SESSION_COOKIE, token))
    .http_only(true)
    .same_site(SameSite::Lax)
    .path("/")
    .max_age(time::Duration::seconds(max_age))
    .secure(secure)
    .build()
}

/// The cookie to hand to [`CookieJar::remove`] so the client drops its
/// session. Path and `Secure` must match the original.
pub fn removal_cookie(secure: bool) -> Cookie<'static> {
  Cookie::build(SESSION_COOKIE).path("/").secure(secure).build()
}

/// The session token carried by `jar`, if any.
pub fn token_from_jar(jar: &CookieJar) -> Option<&str> {
  jar.get(SESSION_COOKIE).map(|c| c.value()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
  use axum::{
    http::{HeaderMap, HeaderValue, header},
    response::IntoResponse,
  };

  use super::*;

  #[test]
  fn tokens_are_unique_and_opaque() {
    let store = SessionStore::new(60);
    let a = store.create(1, "admin".into());
    let b = store.create(1, "admin".into());
    assert_ne!(a, b);
    assert_eq!(URL_SAFE_NO_PAD.decode(&a).unwrap().len(), TOKEN_BYTES);
    assert_eq!(store.get(&a).unwrap().username, "admin");
    assert!(store.get("forged").is_none());
  }

  #[test]
  fn expired_sessions_are_rejected_and_purged() {
    let store = SessionStore::new(0);
    let token = store.create(1, "admin".into());
    assert!(store.get(&token).is_none());

    store.create(2, "other".into());
    assert_eq!(store.len(), 1);
  }

  #[test]
  fn remove_ends_session() {
    let store = SessionStore::new(60);
    let token = store.create(1, "admin".into());
    store.remove(&token);
    assert!(store.get(&token).is_none());
  }

  #[test]
  fn session_cookie_attributes_follow_config() {
    let cookie = session_cookie("tok".into(), 86400, false);
    assert_eq!(cookie.name(), SESSION_COOKIE);
    assert_eq!(cookie.value(), "tok");
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.same_site(), Some(SameSite::Lax));
    assert_eq!(cookie.path(), Some("/"));
    assert_eq!(cookie.max_age(), Some(time::Duration::seconds(86400)));
    assert_eq!(cookie.secure(), Some(false));

    assert_eq!(session_cookie("tok".into(), 60, true).secure(), Some(true));
  }

  #[test]
  fn removal_expires_the_cookie() {
    let mut headers = HeaderMap::new();
    headers.insert(header::COOKIE, HeaderValue::from_static("nsos_session=tok"));
    let jar = CookieJar::from_headers(&headers).remove(removal_cookie(false));
    assert!(token_from_jar(&jar).is_none());

    let response = jar.into_response();
    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(set_cookie.starts_with("nsos_session=;"));
    assert!(set_cookie.contains("Max-Age=0"));
  }

  #[test]
  fn token_is_read_from_the_jar() {
    let jar = CookieJar::new()
      .add(Cookie::new("theme", "dark"))
      .add(Cookie::new(SESSION_COOKIE, "abc"));
    assert_eq!(token_from_jar(&jar), Some("abc"));

    let blank = CookieJar::new().add(Cookie::new(SESSION_COOKIE, ""));
    assert_eq!(token_from_jar(&blank), None);
    assert_eq!(token_from_jar(&CookieJar::new()), None);
  }
}
