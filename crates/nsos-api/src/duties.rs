//! Handlers for `/duties` endpoints. Duties are created and deleted, never
//! edited.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use nsos_core::{
  RecordId,
  records::{Duty, NewDuty},
  store::RecordStore,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
  ApiState,
  error::ApiError,
  extract::{ApiJson, ApiPath},
  fields::{IdField, required, required_date, required_id, required_time},
};

#[derive(Debug, Default, Deserialize)]
pub struct DutyBody {
  pub officer_id: Option<IdField>,
  pub duty_date:  Option<String>,
  pub duty_time:  Option<String>,
  pub location:   Option<String>,
}

impl TryFrom<DutyBody> for NewDuty {
  type Error = nsos_core::Error;

  fn try_from(body: DutyBody) -> Result<Self, Self::Error> {
    Ok(Self {
      officer_id: required_id(body.officer_id, "officer_id")?,
      duty_date:  required_date(body.duty_date, "duty_date")?,
      duty_time:  required_time(body.duty_time, "duty_time")?,
      location:   required(body.location, "location")?,
    })
  }
}

/// `GET /duties`. Latest first.
pub async fn list<S: RecordStore>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<Duty>>, ApiError> {
  let duties = state.store.list_duties().await.map_err(ApiError::store)?;
  Ok(Json(duties))
}

/// `POST /duties`
pub async fn create<S: RecordStore>(
  State(state): State<ApiState<S>>,
  ApiJson(body): ApiJson<DutyBody>,
) -> Result<impl IntoResponse, ApiError> {
  let input = NewDuty::try_from(body)?;
  let id = state.store.create_duty(input).await.map_err(ApiError::store)?;
  Ok((
    StatusCode::CREATED,
    Json(json!({ "message": "Duty assigned", "duty_id": id })),
  ))
}

/// `DELETE /duties/{id}`
pub async fn remove<S: RecordStore>(
  State(state): State<ApiState<S>>,
  ApiPath(id): ApiPath<RecordId>,
) -> Result<impl IntoResponse, ApiError> {
  state.store.delete_duty(id).await.map_err(ApiError::store)?;
  Ok(Json(json!({ "message": "Duty deleted" })))
}
