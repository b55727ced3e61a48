//! Handlers for `/officers` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/officers` | Ordered by id |
//! | `POST`   | `/officers` | Required: `name`, `badge_no` |
//! | `GET`    | `/officers/{id}` | 404 if not found |
//! | `PUT`    | `/officers/{id}` | Full replacement; same rules as `POST` |
//! | `DELETE` | `/officers/{id}` | Cases and duties keep a null officer |

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use nsos_core::{
  RecordId,
  describe::{Describable, Person},
  records::{NewOfficer, Officer},
  store::RecordStore,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
  ApiState,
  error::ApiError,
  extract::{ApiJson, ApiPath},
  fields::{IdField, optional_id, optional_text, required},
};

#[derive(Debug, Default, Deserialize)]
pub struct OfficerBody {
  pub name:     Option<String>,
  pub address:  Option<String>,
  pub badge_no: Option<String>,
  pub rank:     Option<String>,
  pub contact:  Option<String>,
  pub unit_id:  Option<IdField>,
}

impl TryFrom<OfficerBody> for NewOfficer {
  type Error = nsos_core::Error;

  fn try_from(body: OfficerBody) -> Result<Self, Self::Error> {
    Ok(Self {
      name:     required(body.name, "name")?,
      badge_no: required(body.badge_no, "badge_no")?,
      address:  optional_text(body.address),
      rank:     optional_text(body.rank),
      contact:  optional_text(body.contact),
      unit_id:  optional_id(body.unit_id, "unit_id")?,
    })
  }
}

/// `GET /officers`
pub async fn list<S: RecordStore>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<Officer>>, ApiError> {
  let officers = state.store.list_officers().await.map_err(ApiError::store)?;
  Ok(Json(officers))
}

/// `GET /officers/{id}`
pub async fn get_one<S: RecordStore>(
  State(state): State<ApiState<S>>,
  ApiPath(id): ApiPath<RecordId>,
) -> Result<Json<Officer>, ApiError> {
  let officer = state
    .store
    .get_officer(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("Officer not found".to_owned()))?;
  Ok(Json(officer))
}

/// `POST /officers`
pub async fn create<S: RecordStore>(
  State(state): State<ApiState<S>>,
  ApiJson(body): ApiJson<OfficerBody>,
) -> Result<impl IntoResponse, ApiError> {
  let input = NewOfficer::try_from(body)?;
  let id = state.store.create_officer(input).await.map_err(ApiError::store)?;
  Ok((
    StatusCode::CREATED,
    Json(json!({ "message": "Officer created", "officer_id": id })),
  ))
}

/// `PUT /officers/{id}`
pub async fn update<S: RecordStore>(
  State(state): State<ApiState<S>>,
  ApiPath(id): ApiPath<RecordId>,
  ApiJson(body): ApiJson<OfficerBody>,
) -> Result<impl IntoResponse, ApiError> {
  let input = NewOfficer::try_from(body)?;
  state.store.update_officer(id, input).await.map_err(ApiError::store)?;
  Ok(Json(json!({ "message": "Officer updated" })))
}

/// `DELETE /officers/{id}`
pub async fn remove<S: RecordStore>(
  State(state): State<ApiState<S>>,
  ApiPath(id): ApiPath<RecordId>,
) -> Result<impl IntoResponse, ApiError> {
  let officer = state
    .store
    .get_officer(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("Officer not found".to_owned()))?;
  state.store.delete_officer(id).await.map_err(ApiError::store)?;
  log_removed(Person::Officer(&officer));
  Ok(Json(json!({ "message": "Officer deleted" })))
}

/// Shared by the officer and criminal delete handlers.
pub(crate) fn log_removed(person: Person<'_>) {
  tracing::info!(
    name = person.name(),
    address = person.address(),
    summary = %person.summary(),
    "person removed"
  );
}
