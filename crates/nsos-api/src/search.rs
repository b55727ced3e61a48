//! Handler for `GET /search`.
//!
//! `q` is matched case-insensitively anywhere in the searched fields; `type`
//! selects which record kinds are searched (`all` when absent).

use axum::{Json, extract::State};
use nsos_core::{
  records::{Case, Criminal},
  store::RecordStore,
};
use serde::{Deserialize, Serialize};

use crate::{ApiState, error::ApiError, extract::ApiQuery};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchScope {
  #[default]
  All,
  Cases,
  Criminals,
}

impl SearchScope {
  fn parse(raw: Option<&str>) -> Result<Self, ApiError> {
    match raw.map(str::trim) {
      None | Some("") | Some("all") => Ok(Self::All),
      Some("cases") => Ok(Self::Cases),
      Some("criminals") => Ok(Self::Criminals),
      Some(other) => Err(ApiError::BadRequest(format!(
        "unknown search type {other:?}; expected all, cases or criminals"
      ))),
    }
  }

  fn cases(self) -> bool { matches!(self, Self::All | Self::Cases) }

  fn criminals(self) -> bool { matches!(self, Self::All | Self::Criminals) }
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
  pub q:    Option<String>,
  #[serde(rename = "type")]
  pub kind: Option<String>,
}

/// Only the requested kinds are present.
#[derive(Debug, Default, Serialize)]
pub struct SearchResults {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub cases:     Option<Vec<Case>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub criminals: Option<Vec<Criminal>>,
}

/// `GET /search?q=<text>[&type=all|cases|criminals]`
pub async fn handler<S: RecordStore>(
  State(state): State<ApiState<S>>,
  ApiQuery(params): ApiQuery<SearchParams>,
) -> Result<Json<SearchResults>, ApiError> {
  let needle = params.q.as_deref().map(str::trim).unwrap_or_default();
  if needle.is_empty() {
    return Err(ApiError::BadRequest("Search query required".to_owned()));
  }
  let scope = SearchScope::parse(params.kind.as_deref())?;

  let mut results = SearchResults::default();
  if scope.cases() {
    results.cases = Some(state.store.search_cases(needle).await.map_err(ApiError::store)?);
  }
  if scope.criminals() {
    results.criminals =
      Some(state.store.search_criminals(needle).await.map_err(ApiError::store)?);
  }
  Ok(Json(results))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn scope_defaults_to_all() {
    assert_eq!(SearchScope::parse(None).unwrap(), SearchScope::All);
    assert_eq!(SearchScope::parse(Some("cases")).unwrap(), SearchScope::Cases);
    assert!(SearchScope::parse(Some("officers")).is_err());
  }

  #[test]
  fn absent_kinds_are_omitted() {
    let results = SearchResults { cases: Some(vec![]), criminals: None };
    let json = serde_json::to_value(&results).unwrap();
    assert_eq!(json, serde_json::json!({ "cases": [] }));
  }
}
