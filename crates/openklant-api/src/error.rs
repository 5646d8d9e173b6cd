//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every error renders as a problem document:
//!
//! ```json
//! { "type": "...", "code": "invalid", "title": "Invalid input.",
//!   "status": 400, "detail": "", "invalidParams": [{ "name", "code", "reason" }] }
//! ```

use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use openklant_core::{
  Error as CoreError,
  validation::{ErrorCode, FieldError, ValidationErrors, field},
};
use serde::Serialize;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Core(#[from] CoreError),

  #[error("malformed request: {0}")]
  Malformed(String),
}

impl ApiError {
  /// Convert a store failure into an API error.
  pub fn store(e: impl Into<CoreError>) -> Self { Self::Core(e.into()) }
}

impl From<ValidationErrors> for ApiError {
  fn from(errors: ValidationErrors) -> Self {
    Self::Core(CoreError::Validation(errors))
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    Self::Malformed(rejection.body_text())
  }
}

// ─── Problem document ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Problem {
  #[serde(rename = "type")]
  kind:           &'static str,
  code:           &'static str,
  title:          &'static str,
  status:         u16,
  detail:         String,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  invalid_params: Vec<FieldError>,
}

impl Problem {
  fn new(
    status: StatusCode,
    kind: &'static str,
    code: &'static str,
    title: &'static str,
  ) -> Self {
    Self {
      kind,
      code,
      title,
      status: status.as_u16(),
      detail: String::new(),
      invalid_params: Vec::new(),
    }
  }

  fn validation(invalid_params: Vec<FieldError>) -> Self {
    Self {
      invalid_params,
      ..Self::new(
        StatusCode::BAD_REQUEST,
        "/ref/fouten/ValidationError/",
        "invalid",
        "Invalid input.",
      )
    }
  }

  fn detail(mut self, detail: impl Into<String>) -> Self {
    self.detail = detail.into();
    self
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let problem = match self {
      ApiError::Core(CoreError::Validation(errors)) => {
        Problem::validation(errors.into_inner())
      }
      ApiError::Core(CoreError::ProtectedDelete) => {
        Problem::validation(vec![FieldError::new(
          field::NON_FIELD_ERRORS,
          ErrorCode::Invalid,
          openklant_core::error::PROTECTED_DELETE_MESSAGE,
        )])
      }
      ApiError::Core(
        e @ (CoreError::PartijNotFound(_) | CoreError::IdentificatorNotFound(_)),
      ) => Problem::new(
        StatusCode::NOT_FOUND,
        "/ref/fouten/NotFound/",
        "not_found",
        "Niet gevonden.",
      )
      .detail(e.to_string()),
      ApiError::Core(
        e @ (CoreError::NummerExhausted | CoreError::SoortChanged { .. }),
      ) => Problem::new(
        StatusCode::CONFLICT,
        "/ref/fouten/Conflict/",
        "conflict",
        "Conflict.",
      )
      .detail(e.to_string()),
      ApiError::Malformed(detail) => Problem::new(
        StatusCode::BAD_REQUEST,
        "/ref/fouten/ParseError/",
        "parse_error",
        "Malformed request.",
      )
      .detail(detail),
      ApiError::Core(e) => {
        tracing::error!(error = %e, "request failed");
        Problem::new(
          StatusCode::INTERNAL_SERVER_ERROR,
          "/ref/fouten/APIException/",
          "error",
          "A server error occurred.",
        )
      }
    };

    let status = StatusCode::from_u16(problem.status)
      .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(problem)).into_response()
  }
}
