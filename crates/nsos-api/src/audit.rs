//! Handler for `GET /audit`.

use axum::{Json, extract::State};
use nsos_core::{
  audit::{AuditEntry, DEFAULT_AUDIT_LIMIT, MAX_AUDIT_LIMIT},
  store::RecordStore,
};
use serde::Deserialize;

use crate::{ApiState, error::ApiError, extract::ApiQuery};

#[derive(Debug, Default, Deserialize)]
pub struct AuditParams {
  /// Kept as text: a value that is not an integer falls back to the default.
  pub limit: Option<String>,
}

/// Resolve the requested page size; values above the maximum are clamped.
fn effective_limit(requested: Option<&str>) -> Result<u32, ApiError> {
  match requested.and_then(|raw| raw.trim().parse::<i64>().ok()) {
    None => Ok(DEFAULT_AUDIT_LIMIT),
    Some(n) if n < 1 => Err(ApiError::BadRequest("limit must be at least 1".to_owned())),
    Some(n) => Ok(u32::try_from(n).unwrap_or(MAX_AUDIT_LIMIT).min(MAX_AUDIT_LIMIT)),
  }
}

/// `GET /audit[?limit=N]`. Newest first.
pub async fn handler<S: RecordStore>(
  State(state): State<ApiState<S>>,
  ApiQuery(params): ApiQuery<AuditParams>,
) -> Result<Json<Vec<AuditEntry>>, ApiError> {
  let limit = effective_limit(params.limit.as_deref())?;
  let entries = state.store.list_audit(limit).await.map_err(ApiError::store)?;
  Ok(Json(entries))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn limit_defaults_and_clamps() {
    assert_eq!(effective_limit(None).unwrap(), DEFAULT_AUDIT_LIMIT);
    assert_eq!(effective_limit(Some("5")).unwrap(), 5);
    assert_eq!(effective_limit(Some("5000")).unwrap(), MAX_AUDIT_LIMIT);
    assert_eq!(effective_limit(Some("9223372036854775807")).unwrap(), MAX_AUDIT_LIMIT);
    assert!(effective_limit(Some("0")).is_err());
    assert!(effective_limit(Some("-3")).is_err());
  }

  #[test]
  fn unparsable_limit_falls_back_to_default() {
    assert_eq!(effective_limit(Some("abc")).unwrap(), DEFAULT_AUDIT_LIMIT);
    assert_eq!(effective_limit(Some("")).unwrap(), DEFAULT_AUDIT_LIMIT);
    assert_eq!(effective_limit(Some("2.5")).unwrap(), DEFAULT_AUDIT_LIMIT);
  }
}
