//! Field-level validation errors.
//!
//! Errors are accumulated rather than thrown one at a time so a single
//! response can report every problem with a submitted record. Each error
//! carries the (camelCase) name of the offending field, a machine-readable
//! [`ErrorCode`], and a Dutch human-readable reason.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

// ─── Field names ─────────────────────────────────────────────────────────────

/// Field names used when reporting errors.
pub mod field {
  pub const CODE_OBJECTTYPE: &str = "partijIdentificatorCodeObjecttype";
  pub const CODE_SOORT_OBJECT_ID: &str = "partijIdentificatorCodeSoortObjectId";
  pub const OBJECT_ID: &str = "partijIdentificatorObjectId";
  pub const PARTIJ_IDENTIFICATOR: &str = "partijIdentificator";
  pub const SUB_IDENTIFICATOR_VAN: &str = "subIdentificatorVan";
  pub const IDENTIFICEERDE_PARTIJ: &str = "identificeerdePartij";
  pub const PARTIJ_IDENTIFICATOREN: &str = "partijIdentificatoren";
  pub const UUID: &str = "uuid";
  pub const NUMMER: &str = "nummer";
  pub const INTERNE_NOTITIE: &str = "interneNotitie";
  pub const VOORKEURSTAAL: &str = "voorkeurstaal";
  pub const PARTIJ_IDENTIFICATIE: &str = "partijIdentificatie";
  pub const SOORT_PARTIJ: &str = "soortPartij";
  pub const INDICATIE_ACTIEF: &str = "indicatieActief";
  /// Errors about the record as a whole (uniqueness).
  pub const ALL: &str = "__all__";
  /// Errors raised outside field validation (protected deletes).
  pub const NON_FIELD_ERRORS: &str = "nonFieldErrors";
}

pub const REQUIRED_MESSAGE: &str = "Dit veld is vereist.";
pub const NULL_MESSAGE: &str = "Dit veld mag niet leeg zijn.";

// ─── ErrorCode ───────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorCode {
  Invalid,
  InvalidChoice,
  Required,
  Null,
  MaxLength,
  Unique,
  UniqueTogether,
}

// ─── FieldError ──────────────────────────────────────────────────────────────

/// A single validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
  pub name:   String,
  pub code:   ErrorCode,
  pub reason: String,
}

impl FieldError {
  pub fn new(
    name: impl Into<String>,
    code: ErrorCode,
    reason: impl Into<String>,
  ) -> Self {
    Self { name: name.into(), code, reason: reason.into() }
  }

  pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
    Self::new(name, ErrorCode::Invalid, reason)
  }

  pub fn required(name: impl Into<String>) -> Self {
    Self::new(name, ErrorCode::Required, REQUIRED_MESSAGE)
  }

  pub fn null(name: impl Into<String>) -> Self {
    Self::new(name, ErrorCode::Null, NULL_MESSAGE)
  }

  /// `"<value>" is een ongeldige keuze.`
  pub fn invalid_choice(name: impl Into<String>, value: &str) -> Self {
    Self::new(
      name,
      ErrorCode::InvalidChoice,
      format!("\"{value}\" is een ongeldige keuze."),
    )
  }

  /// Nest this error under `prefix`, e.g. `partijIdentificatoren.0`.
  pub fn prefixed(mut self, prefix: &str) -> Self {
    self.name = format!("{prefix}.{}", self.name);
    self
  }
}

impl fmt::Display for FieldError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} ({}): {}", self.name, self.code, self.reason)
  }
}

// ─── ValidationErrors ────────────────────────────────────────────────────────

/// An ordered collection of [`FieldError`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
  pub fn new() -> Self { Self::default() }

  pub fn push(&mut self, error: FieldError) { self.0.push(error); }

  pub fn extend(&mut self, other: ValidationErrors) { self.0.extend(other.0); }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn iter(&self) -> impl Iterator<Item = &FieldError> { self.0.iter() }

  pub fn into_inner(self) -> Vec<FieldError> { self.0 }

  /// Nest every error under `prefix`.
  pub fn prefixed(self, prefix: &str) -> Self {
    Self(self.0.into_iter().map(|e| e.prefixed(prefix)).collect())
  }

  /// `Ok(value)` when empty, otherwise `Err(self)`.
  pub fn into_result<T>(self, value: T) -> Result<T, Self> {
    if self.is_empty() { Ok(value) } else { Err(self) }
  }
}

impl From<FieldError> for ValidationErrors {
  fn from(error: FieldError) -> Self { Self(vec![error]) }
}

impl FromIterator<FieldError> for ValidationErrors {
  fn from_iter<I: IntoIterator<Item = FieldError>>(iter: I) -> Self {
    Self(iter.into_iter().collect())
  }
}

impl IntoIterator for ValidationErrors {
  type Item = FieldError;
  type IntoIter = std::vec::IntoIter<FieldError>;

  fn into_iter(self) -> Self::IntoIter { self.0.into_iter() }
}

impl fmt::Display for ValidationErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, e) in self.0.iter().enumerate() {
      if i > 0 {
        f.write_str("; ")?;
      }
      write!(f, "{e}")?;
    }
    Ok(())
  }
}
