//! PartijIdentificator: an external-registry identifier asserted to identify
//! a Partij.
//!
//! Identifiers form a shallow self-referencing hierarchy: a vestigingsnummer
//! hangs under the kvk_nummer of the organisation it belongs to via
//! `sub_identificator_van`. That link is a weak reference (uuid + lookup), not
//! ownership; the parent may belong to a different Partij.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use strum::{AsRefStr, Display, EnumString, VariantArray};
use uuid::Uuid;

// ─── Codes ───────────────────────────────────────────────────────────────────

/// The kind of object the identifier points at.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
  VariantArray,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CodeObjecttype {
  NatuurlijkPersoon,
  NietNatuurlijkPersoon,
  Vestiging,
  Overig,
}

/// Which property of the object the `object_id` holds.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
  VariantArray,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CodeSoortObjectId {
  Bsn,
  Rsin,
  KvkNummer,
  Vestigingsnummer,
  Overig,
}

/// The register the object is recorded in.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
  VariantArray,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CodeRegister {
  Brp,
  Hr,
  Overig,
}

// ─── Identifying data ────────────────────────────────────────────────────────

/// The identifying quadruple (`partijIdentificator` on the wire).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentificatorGegevens {
  pub code_objecttype:      CodeObjecttype,
  pub code_soort_object_id: CodeSoortObjectId,
  /// Free text; its format depends on `code_soort_object_id`.
  pub object_id:            String,
  pub code_register:        CodeRegister,
}

impl IdentificatorGegevens {
  pub fn new(
    code_objecttype: CodeObjecttype,
    code_soort_object_id: CodeSoortObjectId,
    object_id: impl Into<String>,
    code_register: CodeRegister,
  ) -> Self {
    Self {
      code_objecttype,
      code_soort_object_id,
      object_id: object_id.into(),
      code_register,
    }
  }
}

// ─── PartijIdentificator ─────────────────────────────────────────────────────

/// A persisted identifier record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartijIdentificator {
  /// Public identifier; never changes after creation.
  pub uuid:                        Uuid,
  /// Owning Partij, if attached.
  pub partij:                      Option<Uuid>,
  /// Parent identifier this one is subordinate to.
  pub sub_identificator_van:       Option<Uuid>,
  /// Free-text note, not validated.
  pub andere_partij_identificator: String,
  pub gegevens:                    IdentificatorGegevens,
  /// Server-assigned timestamp; never changes after creation.
  pub created_at:                  DateTime<Utc>,
}

impl PartijIdentificator {
  pub fn soort(&self) -> CodeSoortObjectId { self.gegevens.code_soort_object_id }
}

// ─── Input ───────────────────────────────────────────────────────────────────

/// A submitted identifier, either for the standalone resource or as one entry
/// of a Partij's `partijIdentificatoren` list.
///
/// Tri-state fields use `Option<Option<_>>`: `None` means the key was absent
/// (keep the stored value), `Some(None)` means an explicit `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentificatorInput {
  /// Present when the entry refers to an existing record.
  pub uuid:                        Option<Uuid>,
  pub partij:                      Option<Option<Uuid>>,
  pub andere_partij_identificator: Option<String>,
  pub sub_identificator_van:       Option<Option<Uuid>>,
  pub gegevens:                    Option<IdentificatorGegevens>,
}

impl IdentificatorInput {
  /// Convenience constructor for a new, unattached record.
  pub fn new(gegevens: IdentificatorGegevens) -> Self {
    Self { gegevens: Some(gegevens), ..Self::default() }
  }

  pub fn with_uuid(mut self, uuid: Uuid) -> Self {
    self.uuid = Some(uuid);
    self
  }

  pub fn with_partij(mut self, partij: Option<Uuid>) -> Self {
    self.partij = Some(partij);
    self
  }

  pub fn with_sub_identificator_van(mut self, parent: Option<Uuid>) -> Self {
    self.sub_identificator_van = Some(parent);
    self
  }

  pub fn with_andere_partij_identificator(mut self, text: impl Into<String>) -> Self {
    self.andere_partij_identificator = Some(text.into());
    self
  }
}

/// A `{"uuid": ...}` reference as used for every relation on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UuidRef {
  pub uuid: Uuid,
}

/// Deserialize a field that distinguishes "absent" from "null".
///
/// Use together with `#[serde(default)]`: an absent key keeps the `None`
/// default, while a present key (including `null`) becomes `Some(_)`.
pub fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
  T: Deserialize<'de>,
  D: Deserializer<'de>,
{
  Option::<T>::deserialize(de).map(Some)
}
