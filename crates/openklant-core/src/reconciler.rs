//! The `IdentifierReconciler`: validation, uniqueness and batch reconciliation
//! of `PartijIdentificator` records.
//!
//! Every operation reads and writes through an [`IdentificatorRepository`]
//! scoped to one transaction. On `Err` nothing the reconciler wrote may be
//! committed; callers roll back.

use std::collections::HashSet;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  diff::{self, ReconcilePlan, entry_prefix},
  identificator::{
    CodeSoortObjectId, IdentificatorGegevens, IdentificatorInput,
    PartijIdentificator,
  },
  repository::IdentificatorRepository,
  rules,
  validation::{ErrorCode, FieldError, ValidationErrors, field},
};

// ─── Messages ────────────────────────────────────────────────────────────────

pub const SUB_REQUIRED_MESSAGE: &str = "Voor een PartijIdentificator met \
                                        codeSoortObjectId = `vestigingsnummer` \
                                        is het verplicht om een \
                                        `sub_identifier_van` met \
                                        codeSoortObjectId = `kvk_nummer` te \
                                        kiezen.";

pub const SUB_MUST_BE_KVK_MESSAGE: &str = "Het is alleen mogelijk om een \
                                           subIdentifierVan te selecteren met \
                                           codeSoortObjectId = `kvk_nummer`.";

pub const SUB_NOT_ALLOWED_MESSAGE: &str = "Alleen een PartijIdentificator met \
                                           codeSoortObjectId = \
                                           `vestigingsnummer` kan een \
                                           `sub_identifier_van` hebben.";

pub const SUB_CYCLE_MESSAGE: &str = "Een PartijIdentificator kan niet onder \
                                     zichzelf of een eigen sub-identificator \
                                     worden gehangen.";

pub const LOCAL_UNIQUE_MESSAGE: &str =
  "Partij identificator met deze Partij en Soort object ID bestaat al.";

pub const GLOBAL_UNIQUE_MESSAGE: &str = "`PartijIdentificator` moet uniek \
                                         zijn, er bestaat er al een met deze \
                                         gegevenscombinatie.";

pub const SOORT_LOCKED_MESSAGE: &str = "Het is niet mogelijk om de \
                                        codeSoortObjectId van deze \
                                        PartijIdentificator te wijzigen, \
                                        omdat er andere PartijIdentificatoren \
                                        aan gekoppeld zijn.";

pub const IDENTIFICATOR_NOT_FOUND_MESSAGE: &str =
  "PartijIdentificator object bestaat niet.";

pub const PARTIJ_NOT_FOUND_MESSAGE: &str = "Partij object bestaat niet.";

pub const PARTIJ_ASSIGNED_MESSAGE: &str = "Het veld `identificeerde_partij` \
                                           wordt automatisch ingesteld en \
                                           dient niet te worden opgegeven.";

// ─── Policy & mode ───────────────────────────────────────────────────────────

/// How strictly `sub_identificator_van` is policed.
///
/// Both policies require a vestigingsnummer to hang under a kvk_nummer.
/// `Strict` rejects a parent on anything but a vestigingsnummer. `Lenient`
/// lets any other record name a parent and has to be asked for.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ValidationPolicy {
  #[default]
  Strict,
  Lenient,
}

impl ValidationPolicy {
  pub fn from_lenient(lenient: bool) -> Self {
    if lenient { Self::Lenient } else { Self::Strict }
  }
}

/// Which Partij write a reconciliation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileMode {
  /// The Partij is being created; entries may not name an owner.
  Create,
  Update,
}

// ─── Candidate & outcome ─────────────────────────────────────────────────────

/// The relations and quadruple a record would have after a write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
  pub partij:                Option<Uuid>,
  pub sub_identificator_van: Option<Uuid>,
  pub gegevens:              IdentificatorGegevens,
}

impl From<&PartijIdentificator> for Candidate {
  fn from(record: &PartijIdentificator) -> Self {
    Self {
      partij:                record.partij,
      sub_identificator_van: record.sub_identificator_van,
      gegevens:              record.gegevens.clone(),
    }
  }
}

/// What a successful reconciliation did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
  /// The identifiers the Partij owns afterwards, in creation order.
  pub identificatoren: Vec<PartijIdentificator>,
  pub created:         Vec<Uuid>,
  pub updated:         Vec<Uuid>,
  pub unchanged:       Vec<Uuid>,
  pub deleted:         Vec<Uuid>,
}

// ─── Reconciler ──────────────────────────────────────────────────────────────

pub struct IdentifierReconciler<'r, R> {
  repo:   &'r mut R,
  policy: ValidationPolicy,
}

impl<'r, R: IdentificatorRepository> IdentifierReconciler<'r, R> {
  pub fn new(repo: &'r mut R) -> Self {
    Self { repo, policy: ValidationPolicy::default() }
  }

  pub fn with_policy(mut self, policy: ValidationPolicy) -> Self {
    self.policy = policy;
    self
  }

  pub fn policy(&self) -> ValidationPolicy { self.policy }

  /// Validate `candidate`, optionally as the new state of `existing`.
  pub fn validate(
    &self,
    candidate: &Candidate,
    existing: Option<&PartijIdentificator>,
  ) -> Result<()> {
    self
      .check(candidate, existing)?
      .into_result(())
      .map_err(Error::Validation)
  }

  /// Collect every validation failure for `candidate`.
  ///
  /// The outer `Result` only fails when the repository does.
  pub fn check(
    &self,
    candidate: &Candidate,
    existing: Option<&PartijIdentificator>,
  ) -> Result<ValidationErrors> {
    let mut errors = rules::check_gegevens(&candidate.gegevens);
    let soort = candidate.gegevens.code_soort_object_id;
    let excluding = existing.map(|record| record.uuid);

    if let Some(partij) = candidate.partij
      && !self.repo.partij_exists(partij).map_err(Error::store)?
    {
      errors.push(FieldError::invalid(
        field::IDENTIFICEERDE_PARTIJ,
        PARTIJ_NOT_FOUND_MESSAGE,
      ));
    }

    // Parent.
    let parent = match candidate.sub_identificator_van {
      Some(uuid) => {
        let found = self.repo.find_identificator(uuid).map_err(Error::store)?;
        if found.is_none() {
          errors.push(FieldError::invalid(
            field::SUB_IDENTIFICATOR_VAN,
            IDENTIFICATOR_NOT_FOUND_MESSAGE,
          ));
        }
        found
      }
      None => None,
    };

    if soort == CodeSoortObjectId::Vestigingsnummer {
      match &parent {
        None if candidate.sub_identificator_van.is_none() => {
          errors.push(FieldError::invalid(
            field::SUB_IDENTIFICATOR_VAN,
            SUB_REQUIRED_MESSAGE,
          ));
        }
        Some(parent) if parent.soort() != CodeSoortObjectId::KvkNummer => {
          errors.push(FieldError::invalid(
            field::SUB_IDENTIFICATOR_VAN,
            SUB_MUST_BE_KVK_MESSAGE,
          ));
        }
        _ => {}
      }
    } else if candidate.sub_identificator_van.is_some()
      && self.policy == ValidationPolicy::Strict
    {
      errors.push(FieldError::invalid(
        field::SUB_IDENTIFICATOR_VAN,
        SUB_NOT_ALLOWED_MESSAGE,
      ));
    }

    if let Some(record) = existing
      && parent.is_some()
      && self.leads_back_to(record.uuid, candidate.sub_identificator_van)?
    {
      errors.push(FieldError::invalid(
        field::SUB_IDENTIFICATOR_VAN,
        SUB_CYCLE_MESSAGE,
      ));
    }

    // Local uniqueness.
    if let Some(partij) = candidate.partij
      && self
        .repo
        .soort_taken(partij, soort, excluding)
        .map_err(Error::store)?
    {
      errors.push(FieldError::new(
        field::ALL,
        ErrorCode::UniqueTogether,
        LOCAL_UNIQUE_MESSAGE,
      ));
    }

    // Global uniqueness.
    if self
      .repo
      .gegevens_taken(
        &candidate.gegevens,
        candidate.sub_identificator_van,
        excluding,
      )
      .map_err(Error::store)?
    {
      errors.push(FieldError::invalid(field::ALL, GLOBAL_UNIQUE_MESSAGE));
    }

    // A referenced record keeps its soort.
    if let Some(record) = existing
      && record.soort() != soort
      && self.repo.has_dependents(record.uuid).map_err(Error::store)?
    {
      errors.push(FieldError::invalid(
        field::CODE_SOORT_OBJECT_ID,
        SOORT_LOCKED_MESSAGE,
      ));
    }

    Ok(errors)
  }

  /// Whether following `sub_identificator_van` from `start` reaches `own`.
  fn leads_back_to(&self, own: Uuid, start: Option<Uuid>) -> Result<bool> {
    let mut visited = HashSet::new();
    let mut next = start;
    while let Some(uuid) = next {
      if uuid == own {
        return Ok(true);
      }
      if !visited.insert(uuid) {
        break;
      }
      next = self
        .repo
        .find_identificator(uuid)
        .map_err(Error::store)?
        .and_then(|record| record.sub_identificator_van);
    }
    Ok(false)
  }

  // ── Single-record operations ──────────────────────────────────────────────

  /// Validate and insert a new record.
  pub fn create(&mut self, input: IdentificatorInput) -> Result<PartijIdentificator> {
    let record = build_new(input)?;
    self.validate(&Candidate::from(&record), None)?;
    self.repo.insert_identificator(&record).map_err(Error::store)?;
    Ok(record)
  }

  /// Apply `input` to the record with `uuid`. Absent fields keep their
  /// stored value.
  pub fn update(
    &mut self,
    uuid: Uuid,
    input: IdentificatorInput,
  ) -> Result<PartijIdentificator> {
    let existing = self
      .repo
      .find_identificator(uuid)
      .map_err(Error::store)?
      .ok_or(Error::IdentificatorNotFound(uuid))?;

    let record = merge(&existing, input);
    if record == existing {
      return Ok(existing);
    }
    self.validate(&Candidate::from(&record), Some(&existing))?;
    self.repo.update_identificator(&record).map_err(Error::store)?;
    Ok(record)
  }

  /// Delete one record, unless another record hangs under it.
  pub fn delete(&mut self, uuid: Uuid) -> Result<()> {
    if self.repo.find_identificator(uuid).map_err(Error::store)?.is_none() {
      return Err(Error::IdentificatorNotFound(uuid));
    }
    if self.repo.has_dependents(uuid).map_err(Error::store)? {
      return Err(Error::ProtectedDelete);
    }
    self.repo.delete_identificatoren(&[uuid]).map_err(Error::store)
  }

  // ── Batch reconciliation ──────────────────────────────────────────────────

  /// Make the identifiers owned by `partij` match `submitted`.
  ///
  /// Omitted records are deleted first; then entries with a uuid are updated
  /// in place (and moved to `partij`), then entries without one are created.
  /// Any failure leaves writes behind that the caller must roll back.
  pub fn reconcile_for_partij(
    &mut self,
    partij: Uuid,
    submitted: Vec<IdentificatorInput>,
    mode: ReconcileMode,
  ) -> Result<ReconcileOutcome> {
    if !self.repo.partij_exists(partij).map_err(Error::store)? {
      return Err(Error::PartijNotFound(partij));
    }

    let current = self.repo.owned_by(partij).map_err(Error::store)?;
    let ReconcilePlan { updates, creates, deletions, mut errors } =
      diff::plan(&current, submitted);

    if mode == ReconcileMode::Create {
      let names_owner = updates
        .iter()
        .map(|(_, _, input)| input)
        .chain(creates.iter().map(|(_, input)| input))
        .any(|input| input.partij.is_some());
      if names_owner {
        errors.push(FieldError::invalid(
          format!(
            "{}.{}",
            field::PARTIJ_IDENTIFICATOREN,
            field::IDENTIFICEERDE_PARTIJ
          ),
          PARTIJ_ASSIGNED_MESSAGE,
        ));
      }
    }
    if !errors.is_empty() {
      return Err(Error::Validation(errors));
    }

    let mut outcome = ReconcileOutcome::default();

    if !deletions.is_empty() {
      for uuid in &deletions {
        if self.repo.has_dependents(*uuid).map_err(Error::store)? {
          return Err(Error::ProtectedDelete);
        }
      }
      self
        .repo
        .delete_identificatoren(&deletions)
        .map_err(Error::store)?;
      outcome.deleted = deletions;
    }

    for (index, uuid, mut input) in updates {
      input.partij = Some(Some(partij));
      let Some(existing) =
        self.repo.find_identificator(uuid).map_err(Error::store)?
      else {
        errors.push(
          FieldError::invalid(field::UUID, IDENTIFICATOR_NOT_FOUND_MESSAGE)
            .prefixed(&entry_prefix(index)),
        );
        continue;
      };

      let record = merge(&existing, input);
      if record == existing {
        outcome.unchanged.push(uuid);
        continue;
      }
      let found = self.check(&Candidate::from(&record), Some(&existing))?;
      if !found.is_empty() {
        errors.extend(found.prefixed(&entry_prefix(index)));
        continue;
      }
      self.repo.update_identificator(&record).map_err(Error::store)?;
      outcome.updated.push(uuid);
    }

    for (index, mut input) in creates {
      input.partij = Some(Some(partij));
      let record = match build_new(input) {
        Ok(record) => record,
        Err(Error::Validation(found)) => {
          errors.extend(found.prefixed(&entry_prefix(index)));
          continue;
        }
        Err(e) => return Err(e),
      };
      let found = self.check(&Candidate::from(&record), None)?;
      if !found.is_empty() {
        errors.extend(found.prefixed(&entry_prefix(index)));
        continue;
      }
      self.repo.insert_identificator(&record).map_err(Error::store)?;
      outcome.created.push(record.uuid);
    }

    if !errors.is_empty() {
      return Err(Error::Validation(errors));
    }

    outcome.identificatoren =
      self.repo.owned_by(partij).map_err(Error::store)?;
    Ok(outcome)
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// A fresh record from `input`; the quadruple is required.
fn build_new(input: IdentificatorInput) -> Result<PartijIdentificator> {
  let Some(gegevens) = input.gegevens else {
    return Err(Error::Validation(
      FieldError::required(field::PARTIJ_IDENTIFICATOR).into(),
    ));
  };
  Ok(PartijIdentificator {
    uuid: Uuid::new_v4(),
    partij: input.partij.flatten(),
    sub_identificator_van: input.sub_identificator_van.flatten(),
    andere_partij_identificator: input
      .andere_partij_identificator
      .unwrap_or_default(),
    gegevens,
    created_at: Utc::now(),
  })
}

/// `existing` with the fields present in `input` applied.
fn merge(
  existing: &PartijIdentificator,
  input: IdentificatorInput,
) -> PartijIdentificator {
  PartijIdentificator {
    uuid: existing.uuid,
    partij: input.partij.unwrap_or(existing.partij),
    sub_identificator_van: input
      .sub_identificator_van
      .unwrap_or(existing.sub_identificator_van),
    andere_partij_identificator: input
      .andere_partij_identificator
      .unwrap_or_else(|| existing.andere_partij_identificator.clone()),
    gegevens: input.gegevens.unwrap_or_else(|| existing.gegevens.clone()),
    created_at: existing.created_at,
  }
}
