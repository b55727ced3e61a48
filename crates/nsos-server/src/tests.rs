//! End-to-end tests through the full router: sessions, the API and uploads.

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use nsos_core::store::RecordStore;
use nsos_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt as _;

use crate::{AppState, ServerConfig, auth::hash_password, router};

const BOUNDARY: &str = "nsos-server-boundary";

struct TestServer {
  app:     Router,
  uploads: TempDir,
}

async fn server() -> TestServer {
  let store = SqliteStore::open_in_memory().await.unwrap();
  store
    .create_admin("admin".into(), hash_password("secret").unwrap())
    .await
    .unwrap();

  let uploads = tempfile::tempdir().unwrap();
  let config = ServerConfig {
    uploads_dir: uploads.path().to_path_buf(),
    ..ServerConfig::default()
  };
  TestServer { app: router(AppState::new(store, config)), uploads }
}

struct Reply {
  status: StatusCode,
  cookie: Option<String>,
  body:   Value,
}

impl TestServer {
  async fn send(&self, req: Request<Body>) -> Reply {
    let resp = self.app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let cookie = resp
      .headers()
      .get(header::SET_COOKIE)
      .map(|v| v.to_str().unwrap().to_owned());
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    Reply { status, cookie, body }
  }

  async fn request(
    &self,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
  ) -> Reply {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(c) = cookie {
      builder = builder.header(header::COOKIE, c);
    }
    let req = match body {
      Some(b) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(b.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };
    self.send(req).await
  }

  /// Log in as the seeded admin and return the `Cookie` header value.
  async fn login(&self) -> String {
    let reply = self
      .request(
        "POST",
        "/api/login",
        None,
        Some(json!({ "username": "admin", "password": "secret" })),
      )
      .await;
    assert_eq!(reply.status, StatusCode::OK);
    let set_cookie = reply.cookie.expect("session cookie");
    set_cookie.split(';').next().unwrap().to_owned()
  }

  async fn upload(&self, cookie: &str, file_name: &str, case_id: i64) -> Reply {
    let body = format!(
      "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"case_id\"\r\n\r\n{case_id}\r\n\
       --{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
       Content-Type: application/octet-stream\r\n\r\nevidence-bytes\r\n--{BOUNDARY}--\r\n"
    );
    self
      .send(
        Request::builder()
          .method("POST")
          .uri("/api/evidence")
          .header(header::COOKIE, cookie)
          .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
          )
          .body(Body::from(body))
          .unwrap(),
      )
      .await
  }

  fn stored_files(&self) -> Vec<String> {
    std::fs::read_dir(self.uploads.path())
      .unwrap()
      .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
      .collect()
  }
}

// ─── Authentication ──────────────────────────────────────────────────────────

#[tokio::test]
async fn login_sets_http_only_cookie() {
  let s = server().await;
  let reply = s
    .request(
      "POST",
      "/api/login",
      None,
      Some(json!({ "username": "admin", "password": "secret" })),
    )
    .await;
  assert_eq!(reply.status, StatusCode::OK);
  assert_eq!(reply.body["username"], "admin");

  let cookie = reply.cookie.unwrap();
  assert!(cookie.starts_with("nsos_session="));
  assert!(cookie.contains("HttpOnly"));
  assert!(cookie.contains("SameSite=Lax"));
  assert!(cookie.contains("Path=/"));
  assert!(cookie.contains("Max-Age=86400"));
  assert!(!cookie.contains("Secure"));
}

#[tokio::test]
async fn session_cookie_is_found_among_other_cookies() {
  let s = server().await;
  let session = s.login().await;
  let cookies = format!("theme=dark; {session}; lang=en");
  let me = s.request("GET", "/api/check-auth", Some(&cookies), None).await;
  assert_eq!(me.body, json!({ "authenticated": true, "username": "admin" }));

  let listed = s.request("GET", "/api/officers", Some(&cookies), None).await;
  assert_eq!(listed.status, StatusCode::OK);
}

#[tokio::test]
async fn wrong_password_is_401_without_cookie() {
  let s = server().await;
  let reply = s
    .request(
      "POST",
      "/api/login",
      None,
      Some(json!({ "username": "admin", "password": "guess" })),
    )
    .await;
  assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
  assert_eq!(reply.body, json!({ "error": "Invalid credentials" }));
  assert!(reply.cookie.is_none());

  let unknown = s
    .request(
      "POST",
      "/api/login",
      None,
      Some(json!({ "username": "nobody", "password": "secret" })),
    )
    .await;
  assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_without_fields_is_400() {
  let s = server().await;
  let reply = s
    .request("POST", "/api/login", None, Some(json!({ "username": "admin" })))
    .await;
  assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn protected_routes_need_a_session() {
  let s = server().await;
  for uri in ["/api/officers", "/api/cases", "/api/audit", "/uploads/x.pdf"] {
    let reply = s.request("GET", uri, None, None).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED, "{uri}");
  }

  let forged = s
    .request("GET", "/api/officers", Some("nsos_session=forged"), None)
    .await;
  assert_eq!(forged.status, StatusCode::UNAUTHORIZED);
  assert!(forged.body["error"].is_string());
}

#[tokio::test]
async fn check_auth_and_logout() {
  let s = server().await;

  let anon = s.request("GET", "/api/check-auth", None, None).await;
  assert_eq!(anon.body, json!({ "authenticated": false }));

  let cookie = s.login().await;
  let me = s.request("GET", "/api/check-auth", Some(&cookie), None).await;
  assert_eq!(me.body, json!({ "authenticated": true, "username": "admin" }));

  let out = s.request("POST", "/api/logout", Some(&cookie), None).await;
  assert_eq!(out.status, StatusCode::OK);
  assert!(out.cookie.unwrap().contains("Max-Age=0"));

  let after = s.request("GET", "/api/officers", Some(&cookie), None).await;
  assert_eq!(after.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_requires_a_session() {
  let s = server().await;
  let reply = s.request("POST", "/api/logout", None, None).await;
  assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
}

// ─── Records ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn officer_and_case_scenario() {
  let s = server().await;
  let cookie = s.login().await;
  let c = Some(cookie.as_str());

  let officer = s
    .request(
      "POST",
      "/api/officers",
      c,
      Some(json!({ "name": "A Khan", "badge_no": "B100" })),
    )
    .await;
  assert_eq!(officer.status, StatusCode::CREATED);
  assert_eq!(officer.body["officer_id"], 1);

  let case = s
    .request(
      "POST",
      "/api/cases",
      c,
      Some(json!({
        "case_number": "FIR-1",
        "title": "Theft",
        "filed_date": "2024-01-01",
        "filed_by": 1,
      })),
    )
    .await;
  assert_eq!(case.status, StatusCode::CREATED);
  let case_id = case.body["case_id"].as_i64().unwrap();

  let listed = s.request("GET", "/api/cases", c, None).await;
  assert_eq!(listed.body[0]["officer_name"], "A Khan");
  assert_eq!(listed.body[0]["status"], "Open");

  let deleted = s.request("DELETE", "/api/officers/1", c, None).await;
  assert_eq!(deleted.status, StatusCode::OK);

  let fetched = s
    .request("GET", &format!("/api/cases/{case_id}"), c, None)
    .await;
  assert_eq!(fetched.status, StatusCode::OK);
  assert_eq!(fetched.body["officer_name"], Value::Null);

  let audit = s.request("GET", "/api/audit", c, None).await;
  let actions: Vec<_> = audit
    .body
    .as_array()
    .unwrap()
    .iter()
    .map(|e| (e["action"].as_str().unwrap(), e["table_name"].as_str().unwrap()))
    .collect();
  assert_eq!(
    actions,
    vec![("DELETE", "Officer"), ("INSERT", "Case"), ("INSERT", "Officer"), ("INSERT", "Admin")]
  );
}

#[tokio::test]
async fn missing_records_and_routes_are_404() {
  let s = server().await;
  let cookie = s.login().await;

  let missing = s.request("GET", "/api/officers/42", Some(&cookie), None).await;
  assert_eq!(missing.status, StatusCode::NOT_FOUND);
  assert!(missing.body["error"].is_string());

  let unknown = s.request("GET", "/nowhere", None, None).await;
  assert_eq!(unknown.status, StatusCode::NOT_FOUND);
  assert_eq!(unknown.body, json!({ "error": "Not found" }));

  let unknown_api = s.request("GET", "/api/nowhere", Some(&cookie), None).await;
  assert_eq!(unknown_api.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn empty_search_is_400() {
  let s = server().await;
  let cookie = s.login().await;
  let reply = s.request("GET", "/api/search?q=", Some(&cookie), None).await;
  assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

// ─── Evidence ────────────────────────────────────────────────────────────────

async fn seed_case(s: &TestServer, cookie: &str) -> i64 {
  let c = Some(cookie);
  s.request(
    "POST",
    "/api/officers",
    c,
    Some(json!({ "name": "A Khan", "badge_no": "B100" })),
  )
  .await;
  let case = s
    .request(
      "POST",
      "/api/cases",
      c,
      Some(json!({
        "case_number": "FIR-1",
        "title": "Theft",
        "filed_date": "2024-01-01",
        "filed_by": 1,
      })),
    )
    .await;
  case.body["case_id"].as_i64().unwrap()
}

#[tokio::test]
async fn rejected_upload_leaves_no_trace() {
  let s = server().await;
  let cookie = s.login().await;
  let case_id = seed_case(&s, &cookie).await;

  let reply = s.upload(&cookie, "tool.exe", case_id).await;
  assert_eq!(reply.status, StatusCode::BAD_REQUEST);
  assert!(s.stored_files().is_empty());

  let listed = s.request("GET", "/api/evidence", Some(&cookie), None).await;
  assert_eq!(listed.body, json!([]));
}

#[tokio::test]
async fn accepted_upload_is_served_back() {
  let s = server().await;
  let cookie = s.login().await;
  let case_id = seed_case(&s, &cookie).await;

  let reply = s.upload(&cookie, "statement.pdf", case_id).await;
  assert_eq!(reply.status, StatusCode::CREATED);
  let stored = reply.body["file_name"].as_str().unwrap().to_owned();
  assert_eq!(s.stored_files(), vec![stored.clone()]);

  let resp = s
    .app
    .clone()
    .oneshot(
      Request::builder()
        .uri(format!("/uploads/{stored}"))
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap(),
    )
    .await
    .unwrap();
  assert_eq!(resp.status(), StatusCode::OK);
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  assert_eq!(&bytes[..], b"evidence-bytes");
}

// ─── Cross-origin ────────────────────────────────────────────────────────────

#[tokio::test]
async fn preflight_allows_credentials_for_the_caller_origin() {
  let s = server().await;
  let req = Request::builder()
    .method("OPTIONS")
    .uri("/api/login")
    .header(header::ORIGIN, "http://localhost:3000")
    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
    .body(Body::empty())
    .unwrap();
  let resp = s.app.clone().oneshot(req).await.unwrap();

  assert!(resp.status().is_success());
  let headers = resp.headers();
  assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "http://localhost:3000");
  assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
}

#[test]
fn store_timeout_default_matches_the_store() {
  let config = ServerConfig::default();
  assert_eq!(
    std::time::Duration::from_millis(config.store_timeout_ms),
    nsos_store_sqlite::DEFAULT_TIMEOUT
  );
}
