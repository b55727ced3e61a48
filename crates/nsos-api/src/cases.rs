//! Handlers for `/cases` endpoints, including the case-update log.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/cases` | Newest first |
//! | `POST`   | `/cases` | Required: `case_number`, `title`, `filed_date`, `filed_by` |
//! | `GET`    | `/cases/{id}` | 404 if not found |
//! | `PUT`    | `/cases/{id}` | Full replacement |
//! | `DELETE` | `/cases/{id}` | Also removes its updates and evidence rows |
//! | `GET`    | `/cases/{id}/updates` | Newest first |
//! | `POST`   | `/cases/{id}/updates` | Required: `update_text`, `updated_by` |

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use nsos_core::{
  RecordId,
  records::{Case, CaseUpdate, DEFAULT_CASE_STATUS, NewCase, NewCaseUpdate},
  store::RecordStore,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
  ApiState,
  error::ApiError,
  extract::{ApiJson, ApiPath},
  fields::{IdField, optional_id, optional_text, required, required_date, required_id},
};

// ─── Cases ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct CaseBody {
  pub case_number: Option<String>,
  pub title:       Option<String>,
  pub description: Option<String>,
  pub filed_date:  Option<String>,
  pub filed_by:    Option<IdField>,
  pub suspect_id:  Option<IdField>,
  pub status:      Option<String>,
}

impl TryFrom<CaseBody> for NewCase {
  type Error = nsos_core::Error;

  fn try_from(body: CaseBody) -> Result<Self, Self::Error> {
    let status = body
      .status
      .filter(|s| !s.trim().is_empty())
      .unwrap_or_else(|| DEFAULT_CASE_STATUS.to_owned());

    Ok(Self {
      case_number: required(body.case_number, "case_number")?,
      title: required(body.title, "title")?,
      filed_date: required_date(body.filed_date, "filed_date")?,
      filed_by: required_id(body.filed_by, "filed_by")?,
      description: optional_text(body.description),
      suspect_id: optional_id(body.suspect_id, "suspect_id")?,
      status,
    })
  }
}

/// `GET /cases`
pub async fn list<S: RecordStore>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<Case>>, ApiError> {
  let cases = state.store.list_cases().await.map_err(ApiError::store)?;
  Ok(Json(cases))
}

/// `GET /cases/{id}`
pub async fn get_one<S: RecordStore>(
  State(state): State<ApiState<S>>,
  ApiPath(id): ApiPath<RecordId>,
) -> Result<Json<Case>, ApiError> {
  Ok(Json(existing_case(&state, id).await?))
}

/// `POST /cases`
pub async fn create<S: RecordStore>(
  State(state): State<ApiState<S>>,
  ApiJson(body): ApiJson<CaseBody>,
) -> Result<impl IntoResponse, ApiError> {
  let input = NewCase::try_from(body)?;
  let id = state.store.create_case(input).await.map_err(ApiError::store)?;
  Ok((
    StatusCode::CREATED,
    Json(json!({ "message": "Case created", "case_id": id })),
  ))
}

/// `PUT /cases/{id}`
pub async fn update<S: RecordStore>(
  State(state): State<ApiState<S>>,
  ApiPath(id): ApiPath<RecordId>,
  ApiJson(body): ApiJson<CaseBody>,
) -> Result<impl IntoResponse, ApiError> {
  let input = NewCase::try_from(body)?;
  state.store.update_case(id, input).await.map_err(ApiError::store)?;
  Ok(Json(json!({ "message": "Case updated" })))
}

/// `DELETE /cases/{id}`
pub async fn remove<S: RecordStore>(
  State(state): State<ApiState<S>>,
  ApiPath(id): ApiPath<RecordId>,
) -> Result<impl IntoResponse, ApiError> {
  state.store.delete_case(id).await.map_err(ApiError::store)?;
  Ok(Json(json!({ "message": "Case deleted" })))
}

// ─── Updates ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct CaseUpdateBody {
  pub update_text: Option<String>,
  pub updated_by:  Option<IdField>,
}

impl TryFrom<CaseUpdateBody> for NewCaseUpdate {
  type Error = nsos_core::Error;

  fn try_from(body: CaseUpdateBody) -> Result<Self, Self::Error> {
    Ok(Self {
      update_text: required(body.update_text, "update_text")?,
      updated_by:  required_id(body.updated_by, "updated_by")?,
    })
  }
}

/// `GET /cases/{id}/updates`
pub async fn list_updates<S: RecordStore>(
  State(state): State<ApiState<S>>,
  ApiPath(id): ApiPath<RecordId>,
) -> Result<Json<Vec<CaseUpdate>>, ApiError> {
  existing_case(&state, id).await?;
  let updates = state.store.list_case_updates(id).await.map_err(ApiError::store)?;
  Ok(Json(updates))
}

/// `POST /cases/{id}/updates`
pub async fn add_update<S: RecordStore>(
  State(state): State<ApiState<S>>,
  ApiPath(id): ApiPath<RecordId>,
  ApiJson(body): ApiJson<CaseUpdateBody>,
) -> Result<impl IntoResponse, ApiError> {
  let input = NewCaseUpdate::try_from(body)?;
  existing_case(&state, id).await?;
  let update_id = state
    .store
    .add_case_update(id, input)
    .await
    .map_err(ApiError::store)?;
  Ok((
    StatusCode::CREATED,
    Json(json!({ "message": "Update added", "update_id": update_id })),
  ))
}

async fn existing_case<S: RecordStore>(
  state: &ApiState<S>,
  id: RecordId,
) -> Result<Case, ApiError> {
  state
    .store
    .get_case(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("Case not found".to_owned()))
}
