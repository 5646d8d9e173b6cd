//! In-memory [`IdentificatorRepository`] for exercising the reconciler
//! without a database.

use std::{collections::HashSet, convert::Infallible};

use chrono::Utc;
use uuid::Uuid;

use crate::{
  Result,
  identificator::{
    CodeObjecttype, CodeRegister, CodeSoortObjectId, IdentificatorGegevens,
    PartijIdentificator,
  },
  repository::IdentificatorRepository,
};

#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
  pub partijen: HashSet<Uuid>,
  /// Creation order.
  pub records:  Vec<PartijIdentificator>,
}

impl MemoryRepository {
  pub fn add_partij(&mut self) -> Uuid {
    let uuid = Uuid::new_v4();
    self.partijen.insert(uuid);
    uuid
  }

  /// Store a record directly, bypassing validation.
  pub fn seed(
    &mut self,
    partij: Option<Uuid>,
    gegevens: IdentificatorGegevens,
    sub_identificator_van: Option<Uuid>,
  ) -> PartijIdentificator {
    let record = PartijIdentificator {
      uuid: Uuid::new_v4(),
      partij,
      sub_identificator_van,
      andere_partij_identificator: String::new(),
      gegevens,
      created_at: Utc::now(),
    };
    self.records.push(record.clone());
    record
  }

  /// Run `f`, restoring the previous state when it fails.
  pub fn transaction<T>(
    &mut self,
    f: impl FnOnce(&mut Self) -> Result<T>,
  ) -> Result<T> {
    let snapshot = self.clone();
    let result = f(self);
    if result.is_err() {
      *self = snapshot;
    }
    result
  }
}

impl IdentificatorRepository for MemoryRepository {
  type Error = Infallible;

  fn find_identificator(
    &self,
    uuid: Uuid,
  ) -> Result<Option<PartijIdentificator>, Infallible> {
    Ok(self.records.iter().find(|r| r.uuid == uuid).cloned())
  }

  fn partij_exists(&self, uuid: Uuid) -> Result<bool, Infallible> {
    Ok(self.partijen.contains(&uuid))
  }

  fn owned_by(&self, partij: Uuid) -> Result<Vec<PartijIdentificator>, Infallible> {
    Ok(
      self
        .records
        .iter()
        .filter(|r| r.partij == Some(partij))
        .cloned()
        .collect(),
    )
  }

  fn soort_taken(
    &self,
    partij: Uuid,
    soort: CodeSoortObjectId,
    excluding: Option<Uuid>,
  ) -> Result<bool, Infallible> {
    Ok(self.records.iter().any(|r| {
      r.partij == Some(partij) && r.soort() == soort && Some(r.uuid) != excluding
    }))
  }

  fn gegevens_taken(
    &self,
    gegevens: &IdentificatorGegevens,
    sub_identificator_van: Option<Uuid>,
    excluding: Option<Uuid>,
  ) -> Result<bool, Infallible> {
    Ok(self.records.iter().any(|r| {
      r.gegevens == *gegevens
        && r.sub_identificator_van == sub_identificator_van
        && Some(r.uuid) != excluding
    }))
  }

  fn has_dependents(&self, uuid: Uuid) -> Result<bool, Infallible> {
    Ok(
      self
        .records
        .iter()
        .any(|r| r.sub_identificator_van == Some(uuid)),
    )
  }

  fn insert_identificator(
    &mut self,
    record: &PartijIdentificator,
  ) -> Result<(), Infallible> {
    self.records.push(record.clone());
    Ok(())
  }

  fn update_identificator(
    &mut self,
    record: &PartijIdentificator,
  ) -> Result<(), Infallible> {
    if let Some(slot) = self.records.iter_mut().find(|r| r.uuid == record.uuid) {
      *slot = record.clone();
    }
    Ok(())
  }

  fn delete_identificatoren(&mut self, uuids: &[Uuid]) -> Result<(), Infallible> {
    self.records.retain(|r| !uuids.contains(&r.uuid));
    Ok(())
  }
}

// ─── Fixtures ────────────────────────────────────────────────────────────────

pub fn bsn(object_id: &str) -> IdentificatorGegevens {
  IdentificatorGegevens::new(
    CodeObjecttype::NatuurlijkPersoon,
    CodeSoortObjectId::Bsn,
    object_id,
    CodeRegister::Brp,
  )
}

pub fn kvk(object_id: &str) -> IdentificatorGegevens {
  IdentificatorGegevens::new(
    CodeObjecttype::NietNatuurlijkPersoon,
    CodeSoortObjectId::KvkNummer,
    object_id,
    CodeRegister::Hr,
  )
}

pub fn vestiging(object_id: &str) -> IdentificatorGegevens {
  IdentificatorGegevens::new(
    CodeObjecttype::Vestiging,
    CodeSoortObjectId::Vestigingsnummer,
    object_id,
    CodeRegister::Hr,
  )
}
