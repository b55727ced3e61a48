//! Handlers for `/criminals` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/criminals` | Ordered by id |
//! | `POST`   | `/criminals` | Required: `name`, `national_id` (or `cnic`) |
//! | `GET`    | `/criminals/{id}` | 404 if not found |
//! | `PUT`    | `/criminals/{id}` | Full replacement |
//! | `DELETE` | `/criminals/{id}` | Cases keep a null suspect |

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use nsos_core::{
  RecordId,
  describe::Person,
  records::{Criminal, NewCriminal},
  store::RecordStore,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
  ApiState,
  error::ApiError,
  extract::{ApiJson, ApiPath},
  fields::{optional_text, required},
  officers::log_removed,
};

#[derive(Debug, Default, Deserialize)]
pub struct CriminalBody {
  pub name:        Option<String>,
  pub address:     Option<String>,
  #[serde(alias = "cnic")]
  pub national_id: Option<String>,
  pub notes:       Option<String>,
}

impl TryFrom<CriminalBody> for NewCriminal {
  type Error = nsos_core::Error;

  fn try_from(body: CriminalBody) -> Result<Self, Self::Error> {
    Ok(Self {
      name:        required(body.name, "name")?,
      national_id: required(body.national_id, "national_id")?,
      address:     optional_text(body.address),
      notes:       optional_text(body.notes),
    })
  }
}

/// `GET /criminals`
pub async fn list<S: RecordStore>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<Criminal>>, ApiError> {
  let criminals = state.store.list_criminals().await.map_err(ApiError::store)?;
  Ok(Json(criminals))
}

/// `GET /criminals/{id}`
pub async fn get_one<S: RecordStore>(
  State(state): State<ApiState<S>>,
  ApiPath(id): ApiPath<RecordId>,
) -> Result<Json<Criminal>, ApiError> {
  let criminal = state
    .store
    .get_criminal(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("Criminal not found".to_owned()))?;
  Ok(Json(criminal))
}

/// `POST /criminals`
pub async fn create<S: RecordStore>(
  State(state): State<ApiState<S>>,
  ApiJson(body): ApiJson<CriminalBody>,
) -> Result<impl IntoResponse, ApiError> {
  let input = NewCriminal::try_from(body)?;
  let id = state.store.create_criminal(input).await.map_err(ApiError::store)?;
  Ok((
    StatusCode::CREATED,
    Json(json!({ "message": "Criminal created", "criminal_id": id })),
  ))
}

/// `PUT /criminals/{id}`
pub async fn update<S: RecordStore>(
  State(state): State<ApiState<S>>,
  ApiPath(id): ApiPath<RecordId>,
  ApiJson(body): ApiJson<CriminalBody>,
) -> Result<impl IntoResponse, ApiError> {
  let input = NewCriminal::try_from(body)?;
  state.store.update_criminal(id, input).await.map_err(ApiError::store)?;
  Ok(Json(json!({ "message": "Criminal updated" })))
}

/// `DELETE /criminals/{id}`
pub async fn remove<S: RecordStore>(
  State(state): State<ApiState<S>>,
  ApiPath(id): ApiPath<RecordId>,
) -> Result<impl IntoResponse, ApiError> {
  let criminal = state
    .store
    .get_criminal(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("Criminal not found".to_owned()))?;
  state.store.delete_criminal(id).await.map_err(ApiError::store)?;
  log_removed(Person::Criminal(&criminal));
  Ok(Json(json!({ "message": "Criminal deleted" })))
}
