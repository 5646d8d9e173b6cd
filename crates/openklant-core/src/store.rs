//! The `PartijStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g.
//! `openklant-store-sqlite`). The API crate depends on this abstraction, not
//! on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  identificator::{
    CodeObjecttype, CodeRegister, CodeSoortObjectId, IdentificatorInput,
    PartijIdentificator,
  },
  partij::{NewPartij, PartijUpdate, PartijView, SoortPartij},
};

// ─── Query types ─────────────────────────────────────────────────────────────

/// Filters for [`PartijStore::list_partijen`]. Results are in creation order.
#[derive(Debug, Clone, Default)]
pub struct PartijQuery {
  pub soort_partij:     Option<SoortPartij>,
  pub nummer:           Option<String>,
  pub indicatie_actief: Option<bool>,
  pub limit:            Option<usize>,
  pub offset:           Option<usize>,
}

/// Filters for [`PartijStore::list_identificatoren`]. Results are in creation
/// order.
#[derive(Debug, Clone, Default)]
pub struct IdentificatorQuery {
  /// Only identifiers owned by this Partij.
  pub partij:               Option<Uuid>,
  pub code_objecttype:      Option<CodeObjecttype>,
  pub code_soort_object_id: Option<CodeSoortObjectId>,
  pub object_id:            Option<String>,
  pub code_register:        Option<CodeRegister>,
  pub limit:                Option<usize>,
  pub offset:               Option<usize>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over an OpenKlant Partij store backend.
///
/// Every write is atomic: a method that returns `Err` has changed nothing.
/// Backend errors convert into [`crate::Error`] so callers can tell
/// validation failures from infrastructure failures.
pub trait PartijStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static + Into<crate::Error>;

  // ── Partijen ──────────────────────────────────────────────────────────

  /// Create a Partij and the identifiers embedded in it.
  fn create_partij(
    &self,
    new: NewPartij,
  ) -> impl Future<Output = Result<PartijView, Self::Error>> + Send + '_;

  fn get_partij(
    &self,
    uuid: Uuid,
  ) -> impl Future<Output = Result<Option<PartijView>, Self::Error>> + Send + '_;

  fn list_partijen(
    &self,
    query: PartijQuery,
  ) -> impl Future<Output = Result<Vec<PartijView>, Self::Error>> + Send + '_;

  /// Update a Partij. When `update.identificatoren` is `Some`, the owned
  /// identifiers are reconciled against it in the same transaction.
  fn update_partij(
    &self,
    uuid: Uuid,
    update: PartijUpdate,
  ) -> impl Future<Output = Result<PartijView, Self::Error>> + Send + '_;

  /// Delete a Partij and the identifiers it owns.
  fn delete_partij(
    &self,
    uuid: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── PartijIdentificatoren ─────────────────────────────────────────────

  fn create_identificator(
    &self,
    input: IdentificatorInput,
  ) -> impl Future<Output = Result<PartijIdentificator, Self::Error>> + Send + '_;

  fn get_identificator(
    &self,
    uuid: Uuid,
  ) -> impl Future<Output = Result<Option<PartijIdentificator>, Self::Error>>
  + Send
  + '_;

  fn list_identificatoren(
    &self,
    query: IdentificatorQuery,
  ) -> impl Future<Output = Result<Vec<PartijIdentificator>, Self::Error>>
  + Send
  + '_;

  /// Apply `input` to an existing identifier; absent fields are kept.
  fn update_identificator(
    &self,
    uuid: Uuid,
    input: IdentificatorInput,
  ) -> impl Future<Output = Result<PartijIdentificator, Self::Error>> + Send + '_;

  fn delete_identificator(
    &self,
    uuid: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
