//! The synchronous storage seam the [`IdentifierReconciler`] runs against.
//!
//! Implementations are expected to be scoped to a single transaction: the
//! reconciler issues reads and writes in sequence and relies on the caller to
//! commit only when it returns `Ok`.
//!
//! [`IdentifierReconciler`]: crate::reconciler::IdentifierReconciler

use uuid::Uuid;

use crate::identificator::{
  CodeSoortObjectId, IdentificatorGegevens, PartijIdentificator,
};

pub trait IdentificatorRepository {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Reads ─────────────────────────────────────────────────────────────────

  fn find_identificator(
    &self,
    uuid: Uuid,
  ) -> Result<Option<PartijIdentificator>, Self::Error>;

  fn partij_exists(&self, uuid: Uuid) -> Result<bool, Self::Error>;

  /// Identifiers owned by `partij`, in creation order.
  fn owned_by(
    &self,
    partij: Uuid,
  ) -> Result<Vec<PartijIdentificator>, Self::Error>;

  /// Whether another record of `partij` already has `soort`.
  fn soort_taken(
    &self,
    partij: Uuid,
    soort: CodeSoortObjectId,
    excluding: Option<Uuid>,
  ) -> Result<bool, Self::Error>;

  /// Whether another record carries the same quadruple under the same parent.
  fn gegevens_taken(
    &self,
    gegevens: &IdentificatorGegevens,
    sub_identificator_van: Option<Uuid>,
    excluding: Option<Uuid>,
  ) -> Result<bool, Self::Error>;

  /// Whether any record names `uuid` as its `sub_identificator_van`.
  fn has_dependents(&self, uuid: Uuid) -> Result<bool, Self::Error>;

  // ── Writes ────────────────────────────────────────────────────────────────

  fn insert_identificator(
    &mut self,
    record: &PartijIdentificator,
  ) -> Result<(), Self::Error>;

  /// Overwrite the mutable fields of the record with `record.uuid`.
  fn update_identificator(
    &mut self,
    record: &PartijIdentificator,
  ) -> Result<(), Self::Error>;

  fn delete_identificatoren(&mut self, uuids: &[Uuid]) -> Result<(), Self::Error>;
}
