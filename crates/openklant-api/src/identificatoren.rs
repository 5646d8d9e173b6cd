//! Handlers for `/partij-identificatoren` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/partij-identificatoren` | Filters on owner and the identifying quadruple |
//! | `POST`   | `/partij-identificatoren` | `identificeerdePartij` may be `null` |
//! | `GET`    | `/partij-identificatoren/{uuid}` | 404 if not found |
//! | `PUT`    | `/partij-identificatoren/{uuid}` | Full replace |
//! | `PATCH`  | `/partij-identificatoren/{uuid}` | Partial update |
//! | `DELETE` | `/partij-identificatoren/{uuid}` | Refused while another identifier hangs under it |

use axum::{
  Json,
  extract::{Path, Query, State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use openklant_core::{
  Error as CoreError,
  identificator::{CodeObjecttype, CodeRegister, CodeSoortObjectId},
  store::{IdentificatorQuery, PartijStore},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  AppState,
  dto::{Completeness, IdentificatorBody, IdentificatorResponse},
  error::ApiError,
};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
  pub identificeerde_partij_uuid:                Option<Uuid>,
  pub partij_identificator_code_objecttype:      Option<CodeObjecttype>,
  pub partij_identificator_code_soort_object_id: Option<CodeSoortObjectId>,
  pub partij_identificator_object_id:            Option<String>,
  pub partij_identificator_code_register:        Option<CodeRegister>,
  pub limit:                                     Option<usize>,
  pub offset:                                    Option<usize>,
}

/// `GET /partij-identificatoren`
pub async fn list<S: PartijStore>(
  State(state): State<AppState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<IdentificatorResponse>>, ApiError> {
  let query = IdentificatorQuery {
    partij:               params.identificeerde_partij_uuid,
    code_objecttype:      params.partij_identificator_code_objecttype,
    code_soort_object_id: params.partij_identificator_code_soort_object_id,
    object_id:            params.partij_identificator_object_id,
    code_register:        params.partij_identificator_code_register,
    limit:                params.limit,
    offset:               params.offset,
  };
  let records = state
    .store
    .list_identificatoren(query)
    .await
    .map_err(ApiError::store)?;

  let base_url = &state.config.base_url;
  Ok(Json(
    records
      .into_iter()
      .map(|record| IdentificatorResponse::new(record, base_url))
      .collect(),
  ))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /partij-identificatoren`
pub async fn create<S: PartijStore>(
  State(state): State<AppState<S>>,
  body: Result<Json<IdentificatorBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let Json(body) = body?;
  let input = body.into_input(Completeness::Full)?;
  let record = state
    .store
    .create_identificator(input)
    .await
    .map_err(ApiError::store)?;
  Ok((
    StatusCode::CREATED,
    Json(IdentificatorResponse::new(record, &state.config.base_url)),
  ))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /partij-identificatoren/{uuid}`
pub async fn get_one<S: PartijStore>(
  State(state): State<AppState<S>>,
  Path(uuid): Path<Uuid>,
) -> Result<Json<IdentificatorResponse>, ApiError> {
  let record = state
    .store
    .get_identificator(uuid)
    .await
    .map_err(ApiError::store)?
    .ok_or(CoreError::IdentificatorNotFound(uuid))?;
  Ok(Json(IdentificatorResponse::new(record, &state.config.base_url)))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /partij-identificatoren/{uuid}`
pub async fn replace<S: PartijStore>(
  State(state): State<AppState<S>>,
  Path(uuid): Path<Uuid>,
  body: Result<Json<IdentificatorBody>, JsonRejection>,
) -> Result<Json<IdentificatorResponse>, ApiError> {
  let Json(body) = body?;
  update(&state, uuid, body, Completeness::Full).await
}

/// `PATCH /partij-identificatoren/{uuid}`
pub async fn patch<S: PartijStore>(
  State(state): State<AppState<S>>,
  Path(uuid): Path<Uuid>,
  body: Result<Json<IdentificatorBody>, JsonRejection>,
) -> Result<Json<IdentificatorResponse>, ApiError> {
  let Json(body) = body?;
  update(&state, uuid, body, Completeness::Partial).await
}

async fn update<S: PartijStore>(
  state: &AppState<S>,
  uuid: Uuid,
  body: IdentificatorBody,
  completeness: Completeness,
) -> Result<Json<IdentificatorResponse>, ApiError> {
  let mut input = body.into_input(completeness)?;
  // The path names the record.
  input.uuid = None;
  let record = state
    .store
    .update_identificator(uuid, input)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(IdentificatorResponse::new(record, &state.config.base_url)))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /partij-identificatoren/{uuid}`
pub async fn delete_one<S: PartijStore>(
  State(state): State<AppState<S>>,
  Path(uuid): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  state
    .store
    .delete_identificator(uuid)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}
