//! Router-level tests against an in-memory store.

use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use nsos_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt as _;

use crate::{ApiState, UploadDir, api_router};

const BOUNDARY: &str = "nsos-test-boundary";

struct Harness {
  router:  Router,
  uploads: TempDir,
}

async fn harness() -> Harness {
  let store = SqliteStore::open_in_memory().await.unwrap();
  let uploads = tempfile::tempdir().unwrap();
  let state = ApiState {
    store:   Arc::new(store),
    uploads: Arc::new(UploadDir::new(uploads.path())),
  };
  Harness { router: api_router(state), uploads }
}

impl Harness {
  async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
    let resp = self.router.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
  }

  async fn get(&self, uri: &str) -> (StatusCode, Value) {
    self
      .send(Request::builder().uri(uri).body(Body::empty()).unwrap())
      .await
  }

  async fn json(&self, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
    self
      .send(
        Request::builder()
          .method(method)
          .uri(uri)
          .header(header::CONTENT_TYPE, "application/json")
          .body(Body::from(body.to_string()))
          .unwrap(),
      )
      .await
  }

  async fn upload(&self, file_name: &str, case_id: Option<&str>) -> (StatusCode, Value) {
    let mut body = String::new();
    if let Some(id) = case_id {
      body.push_str(&format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"case_id\"\r\n\r\n{id}\r\n"
      ));
    }
    body.push_str(&format!(
      "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"description\"\r\n\r\nscene\r\n"
    ));
    body.push_str(&format!(
      "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
       Content-Type: application/octet-stream\r\n\r\nbytes\r\n--{BOUNDARY}--\r\n"
    ));

    self
      .send(
        Request::builder()
          .method("POST")
          .uri("/evidence")
          .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
          )
          .body(Body::from(body))
          .unwrap(),
      )
      .await
  }

  fn stored_files(&self) -> usize {
    std::fs::read_dir(self.uploads.path()).unwrap().count()
  }

  async fn seed_case(&self) -> i64 {
    self
      .json("POST", "/officers", json!({ "name": "A Khan", "badge_no": "B100" }))
      .await;
    let (_, body) = self
      .json(
        "POST",
        "/cases",
        json!({
          "case_number": "FIR-1",
          "title": "Theft",
          "filed_date": "2024-01-01",
          "filed_by": 1,
        }),
      )
      .await;
    body["case_id"].as_i64().unwrap()
  }
}

// ─── Officers ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_officer_returns_201_and_id() {
  let h = harness().await;
  let (status, body) = h
    .json("POST", "/officers", json!({ "name": "A Khan", "badge_no": "B100" }))
    .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["officer_id"], 1);

  let (status, body) = h.get("/officers/1").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["name"], "A Khan");
  assert_eq!(body["unit_name"], Value::Null);
}

#[tokio::test]
async fn missing_required_field_is_400() {
  let h = harness().await;
  let (status, body) = h.json("POST", "/officers", json!({ "name": "A Khan" })).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("badge_no"));
}

#[tokio::test]
async fn malformed_json_is_400() {
  let h = harness().await;
  let (status, body) = h
    .send(
      Request::builder()
        .method("POST")
        .uri("/officers")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap(),
    )
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].is_string());
}

#[tokio::test]
async fn non_numeric_id_is_400() {
  let h = harness().await;
  let (status, body) = h.get("/officers/abc").await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].is_string());
}

#[tokio::test]
async fn unknown_ids_are_404() {
  let h = harness().await;
  assert_eq!(h.get("/officers/9").await.0, StatusCode::NOT_FOUND);
  assert_eq!(h.get("/cases/9").await.0, StatusCode::NOT_FOUND);
  assert_eq!(
    h.json("PUT", "/criminals/9", json!({ "name": "X", "national_id": "1" })).await.0,
    StatusCode::NOT_FOUND
  );
  assert_eq!(
    h.send(Request::builder().method("DELETE").uri("/duties/9").body(Body::empty()).unwrap())
      .await
      .0,
    StatusCode::NOT_FOUND
  );
}

// ─── Criminals ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn criminal_accepts_cnic_alias() {
  let h = harness().await;
  let (status, body) = h
    .json("POST", "/criminals", json!({ "name": "R Shah", "cnic": "35202-1234567-1" }))
    .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["criminal_id"], 1);

  let (_, body) = h.get("/criminals/1").await;
  assert_eq!(body["national_id"], "35202-1234567-1");
}

#[tokio::test]
async fn deleting_a_criminal_clears_it() {
  let h = harness().await;
  h.json(
    "POST",
    "/criminals",
    json!({ "name": "R Shah", "national_id": "1", "address": "Lahore" }),
  )
  .await;

  let (status, body) = h.send(delete_request("/criminals/1")).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["message"], "Criminal deleted");
  assert_eq!(h.get("/criminals/1").await.0, StatusCode::NOT_FOUND);
  assert_eq!(h.send(delete_request("/criminals/1")).await.0, StatusCode::NOT_FOUND);
}

fn delete_request(uri: &str) -> Request<Body> {
  Request::builder().method("DELETE").uri(uri).body(Body::empty()).unwrap()
}

// ─── Cases ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn case_defaults_to_open_and_shows_officer() {
  let h = harness().await;
  let id = h.seed_case().await;

  let (status, body) = h.get(&format!("/cases/{id}")).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"], "Open");
  assert_eq!(body["filed_date"], "2024-01-01");
  assert_eq!(body["officer_name"], "A Khan");
}

#[tokio::test]
async fn case_with_unknown_officer_is_400() {
  let h = harness().await;
  let (status, _) = h
    .json(
      "POST",
      "/cases",
      json!({
        "case_number": "FIR-1",
        "title": "Theft",
        "filed_date": "2024-01-01",
        "filed_by": 77,
      }),
    )
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn case_updates_round_trip() {
  let h = harness().await;
  let id = h.seed_case().await;

  let (status, body) = h
    .json(
      "POST",
      &format!("/cases/{id}/updates"),
      json!({ "update_text": "Witness interviewed", "updated_by": "1" }),
    )
    .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["update_id"], 1);

  let (_, body) = h.get(&format!("/cases/{id}/updates")).await;
  assert_eq!(body[0]["update_text"], "Witness interviewed");
  assert_eq!(body[0]["officer_name"], "A Khan");

  assert_eq!(h.get("/cases/99/updates").await.0, StatusCode::NOT_FOUND);
}

// ─── Duties ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn duty_accepts_short_time() {
  let h = harness().await;
  h.json("POST", "/officers", json!({ "name": "A Khan", "badge_no": "B100" }))
    .await;

  let (status, _) = h
    .json(
      "POST",
      "/duties",
      json!({
        "officer_id": 1,
        "duty_date": "2024-02-01",
        "duty_time": "08:30",
        "location": "Gate 2",
      }),
    )
    .await;
  assert_eq!(status, StatusCode::CREATED);

  let (_, body) = h.get("/duties").await;
  assert_eq!(body[0]["duty_time"], "08:30:00");
  assert_eq!(body[0]["officer_name"], "A Khan");
}

// ─── Evidence ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn upload_stores_file_and_row() {
  let h = harness().await;
  let case_id = h.seed_case().await;

  let (status, body) = h.upload("scene photo.PNG", Some(&case_id.to_string())).await;
  assert_eq!(status, StatusCode::CREATED);
  let stored = body["file_name"].as_str().unwrap().to_owned();
  assert!(stored.ends_with("_scene_photo.PNG"));
  assert!(h.uploads.path().join(&stored).exists());

  let (_, list) = h.get(&format!("/evidence?case_id={case_id}")).await;
  assert_eq!(list[0]["file_name"], stored.as_str());
  assert_eq!(list[0]["case_number"], "FIR-1");
  assert_eq!(list[0]["description"], "scene");
}

#[tokio::test]
async fn non_ascii_file_name_is_accepted() {
  let h = harness().await;
  let case_id = h.seed_case().await;

  let (status, body) = h.upload("تصویر.jpg", Some(&case_id.to_string())).await;
  assert_eq!(status, StatusCode::CREATED);
  let stored = body["file_name"].as_str().unwrap();
  assert!(stored.ends_with("_file.jpg"));
  assert!(h.uploads.path().join(stored).exists());
}

#[tokio::test]
async fn disallowed_extension_leaves_nothing_behind() {
  let h = harness().await;
  let case_id = h.seed_case().await;

  let (status, _) = h.upload("payload.exe", Some(&case_id.to_string())).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(h.stored_files(), 0);
  assert_eq!(h.get("/evidence").await.1, json!([]));
}

#[tokio::test]
async fn upload_without_case_is_400() {
  let h = harness().await;
  let (status, body) = h.upload("a.pdf", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("case_id"));
  assert_eq!(h.stored_files(), 0);
}

#[tokio::test]
async fn upload_for_unknown_case_removes_file() {
  let h = harness().await;
  let (status, _) = h.upload("a.pdf", Some("42")).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(h.stored_files(), 0);
}

// ─── Search and audit ────────────────────────────────────────────────────────

#[tokio::test]
async fn search_requires_query_and_known_type() {
  let h = harness().await;
  assert_eq!(h.get("/search?q=").await.0, StatusCode::BAD_REQUEST);
  assert_eq!(h.get("/search").await.0, StatusCode::BAD_REQUEST);
  assert_eq!(h.get("/search?q=x&type=officers").await.0, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn search_by_type() {
  let h = harness().await;
  h.seed_case().await;
  h.json("POST", "/criminals", json!({ "name": "R Shah", "national_id": "1" }))
    .await;

  let (status, body) = h.get("/search?q=theft&type=cases").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["cases"].as_array().unwrap().len(), 1);
  assert!(body.get("criminals").is_none());

  let (_, body) = h.get("/search?q=SHAH").await;
  assert_eq!(body["cases"], json!([]));
  assert_eq!(body["criminals"][0]["name"], "R Shah");
}

#[tokio::test]
async fn audit_lists_newest_first() {
  let h = harness().await;
  h.seed_case().await;

  let (status, body) = h.get("/audit?limit=1").await;
  assert_eq!(status, StatusCode::OK);
  let entries = body.as_array().unwrap();
  assert_eq!(entries.len(), 1);
  assert_eq!(entries[0]["action"], "INSERT");
  assert_eq!(entries[0]["table_name"], "Case");

  assert_eq!(h.get("/audit?limit=0").await.0, StatusCode::BAD_REQUEST);

  let (status, body) = h.get("/audit?limit=abc").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn units_create_and_list() {
  let h = harness().await;
  let (status, body) = h.json("POST", "/units", json!({ "unit_name": "Traffic" })).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["unit_id"], 1);

  let (_, body) = h.get("/units").await;
  assert_eq!(body, json!([{ "unit_id": 1, "unit_name": "Traffic" }]));
  assert_eq!(h.get("/units/2").await.0, StatusCode::NOT_FOUND);
}
