//! Error types for `openklant-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::{partij::SoortPartij, validation::ValidationErrors};

/// Reported when a delete would orphan a `sub_identificator_van` reference.
pub const PROTECTED_DELETE_MESSAGE: &str = "Cannot delete some instances of \
                                            model 'PartijIdentificator' because \
                                            they are referenced through \
                                            protected foreign keys: \
                                            'PartijIdentificator.\
                                            sub_identificator_van'.";

/// Reported when no further `nummer` fits in ten characters.
pub const NUMMER_EXHAUSTED_MESSAGE: &str = "Er kon niet automatisch een \
                                            opvolgend nummer worden \
                                            gegenereerd. Het maximaal aantal \
                                            tekens is bereikt.";

#[derive(Debug, Error)]
pub enum Error {
  #[error("validation failed: {0}")]
  Validation(ValidationErrors),

  #[error("{}", PROTECTED_DELETE_MESSAGE)]
  ProtectedDelete,

  #[error("partij not found: {0}")]
  PartijNotFound(Uuid),

  #[error("partij identificator not found: {0}")]
  IdentificatorNotFound(Uuid),

  #[error("{}", NUMMER_EXHAUSTED_MESSAGE)]
  NummerExhausted,

  #[error("partij {uuid} is now of soort {actual}, not {expected}")]
  SoortChanged {
    uuid:     Uuid,
    expected: SoortPartij,
    actual:   SoortPartij,
  },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend failure.
  pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }
}

impl From<ValidationErrors> for Error {
  fn from(errors: ValidationErrors) -> Self { Self::Validation(errors) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
