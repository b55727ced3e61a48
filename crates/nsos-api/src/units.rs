//! Handlers for `/units` endpoints.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use nsos_core::{RecordId, records::Unit, store::RecordStore};
use serde::Deserialize;
use serde_json::json;

use crate::{
  ApiState,
  error::ApiError,
  extract::{ApiJson, ApiPath},
  fields::required,
};

#[derive(Debug, Default, Deserialize)]
pub struct UnitBody {
  pub unit_name: Option<String>,
}

/// `GET /units`. Ordered by id.
pub async fn list<S: RecordStore>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<Unit>>, ApiError> {
  let units = state.store.list_units().await.map_err(ApiError::store)?;
  Ok(Json(units))
}

/// `GET /units/{id}`
pub async fn get_one<S: RecordStore>(
  State(state): State<ApiState<S>>,
  ApiPath(id): ApiPath<RecordId>,
) -> Result<Json<Unit>, ApiError> {
  let unit = state
    .store
    .get_unit(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("Unit not found".to_owned()))?;
  Ok(Json(unit))
}

/// `POST /units`
pub async fn create<S: RecordStore>(
  State(state): State<ApiState<S>>,
  ApiJson(body): ApiJson<UnitBody>,
) -> Result<impl IntoResponse, ApiError> {
  let name = required(body.unit_name, "unit_name")?;
  let id = state.store.create_unit(name).await.map_err(ApiError::store)?;
  Ok((
    StatusCode::CREATED,
    Json(json!({ "message": "Unit created", "unit_id": id })),
  ))
}
