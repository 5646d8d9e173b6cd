//! Handlers for `/partijen` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/partijen` | Optional `?soortPartij=&nummer=&indicatieActief=&limit=&offset=` |
//! | `POST`   | `/partijen` | Nested `partijIdentificatoren` are created with it |
//! | `GET`    | `/partijen/{uuid}` | 404 if not found |
//! | `PUT`    | `/partijen/{uuid}` | Full replace; a submitted list replaces the owned identifiers |
//! | `PATCH`  | `/partijen/{uuid}` | Partial update |
//! | `DELETE` | `/partijen/{uuid}` | Cascades to owned identifiers unless one is referenced |

use axum::{
  Json,
  extract::{Path, Query, State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use openklant_core::{
  Error as CoreError,
  partij::SoortPartij,
  store::{PartijQuery, PartijStore},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  AppState,
  dto::{Completeness, PartijBody, PartijResponse},
  error::ApiError,
};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
  pub soort_partij:     Option<SoortPartij>,
  pub nummer:           Option<String>,
  pub indicatie_actief: Option<bool>,
  pub limit:            Option<usize>,
  pub offset:           Option<usize>,
}

/// `GET /partijen`
pub async fn list<S: PartijStore>(
  State(state): State<AppState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<PartijResponse>>, ApiError> {
  let query = PartijQuery {
    soort_partij:     params.soort_partij,
    nummer:           params.nummer,
    indicatie_actief: params.indicatie_actief,
    limit:            params.limit,
    offset:           params.offset,
  };
  let views = state
    .store
    .list_partijen(query)
    .await
    .map_err(ApiError::store)?;

  let base_url = &state.config.base_url;
  let partijen = views
    .into_iter()
    .map(|view| PartijResponse::new(view, base_url))
    .collect::<Result<Vec<_>, _>>()?;
  Ok(Json(partijen))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /partijen`
pub async fn create<S: PartijStore>(
  State(state): State<AppState<S>>,
  body: Result<Json<PartijBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let Json(body) = body?;
  let new = body.into_new_partij()?;
  let view = state
    .store
    .create_partij(new)
    .await
    .map_err(ApiError::store)?;
  let response = PartijResponse::new(view, &state.config.base_url)?;
  Ok((StatusCode::CREATED, Json(response)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /partijen/{uuid}`
pub async fn get_one<S: PartijStore>(
  State(state): State<AppState<S>>,
  Path(uuid): Path<Uuid>,
) -> Result<Json<PartijResponse>, ApiError> {
  let view = state
    .store
    .get_partij(uuid)
    .await
    .map_err(ApiError::store)?
    .ok_or(CoreError::PartijNotFound(uuid))?;
  Ok(Json(PartijResponse::new(view, &state.config.base_url)?))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /partijen/{uuid}`
pub async fn replace<S: PartijStore>(
  State(state): State<AppState<S>>,
  Path(uuid): Path<Uuid>,
  body: Result<Json<PartijBody>, JsonRejection>,
) -> Result<Json<PartijResponse>, ApiError> {
  let Json(body) = body?;
  update(&state, uuid, body, Completeness::Full).await
}

/// `PATCH /partijen/{uuid}`
pub async fn patch<S: PartijStore>(
  State(state): State<AppState<S>>,
  Path(uuid): Path<Uuid>,
  body: Result<Json<PartijBody>, JsonRejection>,
) -> Result<Json<PartijResponse>, ApiError> {
  let Json(body) = body?;
  update(&state, uuid, body, Completeness::Partial).await
}

async fn update<S: PartijStore>(
  state: &AppState<S>,
  uuid: Uuid,
  body: PartijBody,
  completeness: Completeness,
) -> Result<Json<PartijResponse>, ApiError> {
  // The payload shape depends on the soort already stored.
  let current = state
    .store
    .get_partij(uuid)
    .await
    .map_err(ApiError::store)?
    .ok_or(CoreError::PartijNotFound(uuid))?;

  let update = body.into_update(current.partij.soort(), completeness)?;
  let view = state
    .store
    .update_partij(uuid, update)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(PartijResponse::new(view, &state.config.base_url)?))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /partijen/{uuid}`
pub async fn delete_one<S: PartijStore>(
  State(state): State<AppState<S>>,
  Path(uuid): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  state
    .store
    .delete_partij(uuid)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}
