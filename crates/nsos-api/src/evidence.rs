//! Handlers for `/evidence` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/evidence[?case_id=N]` | Newest upload first |
//! | `POST` | `/evidence` | Multipart: `file`, `case_id`, `description` |
//!
//! A rejected upload leaves neither a file nor a row behind.

use axum::{
  Json,
  extract::{Multipart, State, multipart::MultipartRejection},
  http::StatusCode,
  response::IntoResponse,
};
use nsos_core::{
  RecordId,
  records::{Evidence, NewEvidence},
  store::RecordStore,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
  ApiState,
  error::ApiError,
  extract::ApiQuery,
  fields::{IdField, optional_text, required_id},
  uploads::{ALLOWED_EXTENSIONS, evidence_file_name},
};

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  pub case_id: Option<RecordId>,
}

/// `GET /evidence[?case_id=N]`
pub async fn list<S: RecordStore>(
  State(state): State<ApiState<S>>,
  ApiQuery(params): ApiQuery<ListParams>,
) -> Result<Json<Vec<Evidence>>, ApiError> {
  let evidence = match params.case_id {
    Some(case_id) => state.store.list_evidence_for_case(case_id).await,
    None => state.store.list_evidence().await,
  }
  .map_err(ApiError::store)?;
  Ok(Json(evidence))
}

// ─── Upload ──────────────────────────────────────────────────────────────────

/// The parts of an upload form we care about.
#[derive(Debug, Default)]
struct UploadForm {
  file:        Option<(String, Vec<u8>)>,
  case_id:     Option<String>,
  description: Option<String>,
}

async fn read_form(mut multipart: Multipart) -> Result<UploadForm, ApiError> {
  let mut form = UploadForm::default();
  while let Some(field) = multipart.next_field().await? {
    let name = field.name().map(str::to_owned);
    match name.as_deref() {
      Some("file") => {
        let file_name = field.file_name().unwrap_or_default().to_owned();
        let bytes = field.bytes().await?;
        form.file = Some((file_name, bytes.to_vec()));
      }
      Some("case_id") => form.case_id = Some(field.text().await?),
      Some("description") => form.description = Some(field.text().await?),
      _ => {}
    }
  }
  Ok(form)
}

/// `POST /evidence`. Multipart form.
pub async fn upload<S: RecordStore>(
  State(state): State<ApiState<S>>,
  multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let form = read_form(multipart?).await?;

  let (original_name, bytes) = form
    .file
    .filter(|(name, _)| !name.is_empty())
    .ok_or_else(|| ApiError::BadRequest("No file provided".to_owned()))?;
  let case_id = required_id(form.case_id.map(IdField::Text), "case_id")?;

  let file_name = evidence_file_name(&original_name).ok_or_else(|| {
    ApiError::BadRequest(format!(
      "Invalid file type; accepted: {}",
      ALLOWED_EXTENSIONS.join(", ")
    ))
  })?;

  let stored = state.uploads.store(&file_name, &bytes).await?;
  let input = NewEvidence {
    case_id,
    file_name: stored.clone(),
    description: optional_text(form.description),
  };

  match state.store.create_evidence(input).await {
    Ok(id) => {
      tracing::info!(evidence_id = id, case_id, file = %stored, "evidence uploaded");
      Ok((
        StatusCode::CREATED,
        Json(json!({
          "message": "Evidence uploaded",
          "evidence_id": id,
          "file_name": stored,
        })),
      ))
    }
    Err(e) => {
      state.uploads.discard(&stored).await;
      Err(ApiError::store(e))
    }
  }
}
