//! [`SqliteStore`], the SQLite implementation of [`PartijStore`].

use std::path::Path;

use chrono::Utc;
use uuid::Uuid;

use openklant_core::{
  identificator::{IdentificatorInput, PartijIdentificator},
  partij::{
    NUMMER_TAKEN_MESSAGE, NewPartij, Partij, PartijIdentificatie,
    PartijUpdate, PartijView, SoortPartij, next_nummer,
  },
  reconciler::{
    IdentifierReconciler, PARTIJ_NOT_FOUND_MESSAGE, ReconcileMode,
    ValidationPolicy,
  },
  repository::IdentificatorRepository as _,
  store::{IdentificatorQuery, PartijQuery, PartijStore},
  validation::{ErrorCode, FieldError, ValidationErrors, field},
};

use crate::{Error, Result, repo::TxRepository, schema::SCHEMA};

/// Field name for errors on a contactpersoon's organisation reference.
const WERKTE_VOOR_ORGANISATIE: &str = "partijIdentificatie.werkteVoorOrganisatie";

// ─── Store ───────────────────────────────────────────────────────────────────

/// An OpenKlant Partij store backed by a single SQLite file.
///
/// The inner connection is reference-counted, so clones share it.
#[derive(Clone)]
pub struct SqliteStore {
  conn:   tokio_rusqlite::Connection,
  policy: ValidationPolicy,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn, policy: ValidationPolicy::default() };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn, policy: ValidationPolicy::default() };
    store.init_schema().await?;
    Ok(store)
  }

  /// Use `policy` for every identifier validated by this store.
  pub fn with_policy(mut self, policy: ValidationPolicy) -> Self {
    self.policy = policy;
    self
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `f` against the connection without a transaction.
  async fn read<T, F>(&self, f: F) -> Result<T>
  where
    T: Send + 'static,
    F: FnOnce(&TxRepository<'_>) -> Result<T> + Send + 'static,
  {
    self
      .conn
      .call(move |conn| Ok(f(&TxRepository::new(conn))))
      .await?
  }

  /// Run `f` inside one transaction, committed only when `f` succeeds.
  async fn write<T, F>(&self, f: F) -> Result<T>
  where
    T: Send + 'static,
    F: FnOnce(&mut TxRepository<'_>) -> Result<T> + Send + 'static,
  {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let outcome = f(&mut TxRepository::new(&tx));
        if outcome.is_ok() {
          tx.commit()?;
        }
        // A dropped transaction rolls back.
        Ok(outcome)
      })
      .await?
  }
}

// ─── Partij helpers ──────────────────────────────────────────────────────────

/// A contactpersoon may only point at an existing organisation.
fn check_organisatie(
  repo: &TxRepository<'_>,
  identificatie: &PartijIdentificatie,
  errors: &mut ValidationErrors,
) -> Result<()> {
  let Some(organisatie) = identificatie.werkte_voor_organisatie() else {
    return Ok(());
  };
  let found = repo.find_partij(organisatie)?;
  if !found.is_some_and(|p| p.soort() == SoortPartij::Organisatie) {
    errors.push(FieldError::invalid(
      WERKTE_VOOR_ORGANISATIE,
      PARTIJ_NOT_FOUND_MESSAGE,
    ));
  }
  Ok(())
}

fn load_view(repo: &TxRepository<'_>, partij: Partij) -> Result<PartijView> {
  let identificatoren = repo.owned_by(partij.uuid)?;
  Ok(PartijView { partij, identificatoren })
}

/// Refuse when any identifier owned by `partij` still has a dependent.
fn check_protected(repo: &TxRepository<'_>, partij: Uuid) -> Result<()> {
  for record in repo.owned_by(partij)? {
    if repo.has_dependents(record.uuid)? {
      return Err(openklant_core::Error::ProtectedDelete.into());
    }
  }
  Ok(())
}

// ─── PartijStore impl ────────────────────────────────────────────────────────

impl PartijStore for SqliteStore {
  type Error = Error;

  // ── Partijen ──────────────────────────────────────────────────────────────

  async fn create_partij(&self, new: NewPartij) -> Result<PartijView> {
    let policy = self.policy;

    let view = self
      .write(move |repo| {
        let mut errors = new.check();
        let supplied = new.nummer.clone().filter(|n| !n.is_empty());
        if let Some(nummer) = &supplied
          && errors.is_empty()
          && repo.nummer_taken(nummer, None)?
        {
          errors.push(FieldError::new(
            field::NUMMER,
            ErrorCode::Unique,
            NUMMER_TAKEN_MESSAGE,
          ));
        }
        check_organisatie(repo, &new.identificatie, &mut errors)?;
        if !errors.is_empty() {
          return Err(openklant_core::Error::Validation(errors).into());
        }

        let nummer = match supplied {
          Some(nummer) => nummer,
          None => next_nummer(repo.max_nummer()?)?,
        };
        let partij = Partij {
          uuid: Uuid::new_v4(),
          nummer,
          interne_notitie: new.interne_notitie,
          identificatie: new.identificatie,
          indicatie_geheimhouding: new.indicatie_geheimhouding,
          voorkeurstaal: new.voorkeurstaal,
          indicatie_actief: new.indicatie_actief,
          created_at: Utc::now(),
        };
        repo.insert_partij(&partij)?;

        let outcome = IdentifierReconciler::new(repo)
          .with_policy(policy)
          .reconcile_for_partij(
            partij.uuid,
            new.identificatoren,
            ReconcileMode::Create,
          )?;
        tracing::debug!(
          partij = %partij.uuid,
          nummer = %partij.nummer,
          created = outcome.created.len(),
          "created partij"
        );

        Ok(PartijView { partij, identificatoren: outcome.identificatoren })
      })
      .await;

    if let Err(e) = &view {
      tracing::debug!(error = %e, "partij create rejected");
    }
    view
  }

  async fn get_partij(&self, uuid: Uuid) -> Result<Option<PartijView>> {
    self
      .read(move |repo| {
        repo
          .find_partij(uuid)?
          .map(|partij| load_view(repo, partij))
          .transpose()
      })
      .await
  }

  async fn list_partijen(&self, query: PartijQuery) -> Result<Vec<PartijView>> {
    self
      .read(move |repo| {
        repo
          .list_partijen(&query)?
          .into_iter()
          .map(|partij| load_view(repo, partij))
          .collect()
      })
      .await
  }

  async fn update_partij(
    &self,
    uuid: Uuid,
    update: PartijUpdate,
  ) -> Result<PartijView> {
    let policy = self.policy;

    let view = self
      .write(move |repo| {
        let existing = repo
          .find_partij(uuid)?
          .ok_or(openklant_core::Error::PartijNotFound(uuid))?;
        if let Some(expected) = update.resolved_against
          && expected != existing.soort()
        {
          return Err(
            openklant_core::Error::SoortChanged {
              uuid,
              expected,
              actual: existing.soort(),
            }
            .into(),
          );
        }

        let mut errors = update.check();
        let updated = update.apply_to(&existing);
        if errors.is_empty()
          && updated.nummer != existing.nummer
          && repo.nummer_taken(&updated.nummer, Some(uuid))?
        {
          errors.push(FieldError::new(
            field::NUMMER,
            ErrorCode::Unique,
            NUMMER_TAKEN_MESSAGE,
          ));
        }
        if update.identificatie.is_some() {
          check_organisatie(repo, &updated.identificatie, &mut errors)?;
        }
        if !errors.is_empty() {
          return Err(openklant_core::Error::Validation(errors).into());
        }

        if updated != existing {
          repo.update_partij(&updated)?;
        }

        let identificatoren = match update.identificatoren {
          Some(submitted) => {
            let outcome = IdentifierReconciler::new(repo)
              .with_policy(policy)
              .reconcile_for_partij(uuid, submitted, ReconcileMode::Update)?;
            tracing::debug!(
              partij = %uuid,
              created = outcome.created.len(),
              updated = outcome.updated.len(),
              unchanged = outcome.unchanged.len(),
              deleted = outcome.deleted.len(),
              "reconciled partij identificatoren"
            );
            outcome.identificatoren
          }
          None => repo.owned_by(uuid)?,
        };

        Ok(PartijView { partij: updated, identificatoren })
      })
      .await;

    if let Err(e) = &view {
      tracing::debug!(partij = %uuid, error = %e, "partij update rejected");
    }
    view
  }

  async fn delete_partij(&self, uuid: Uuid) -> Result<()> {
    self
      .write(move |repo| {
        if repo.find_partij(uuid)?.is_none() {
          return Err(openklant_core::Error::PartijNotFound(uuid).into());
        }
        check_protected(repo, uuid)?;
        repo.delete_partij(uuid)?;
        tracing::debug!(partij = %uuid, "deleted partij");
        Ok(())
      })
      .await
  }

  // ── PartijIdentificatoren ─────────────────────────────────────────────────

  async fn create_identificator(
    &self,
    input: IdentificatorInput,
  ) -> Result<PartijIdentificator> {
    let policy = self.policy;
    self
      .write(move |repo| {
        let record = IdentifierReconciler::new(repo)
          .with_policy(policy)
          .create(input)?;
        tracing::debug!(identificator = %record.uuid, "created identificator");
        Ok(record)
      })
      .await
  }

  async fn get_identificator(
    &self,
    uuid: Uuid,
  ) -> Result<Option<PartijIdentificator>> {
    self.read(move |repo| repo.find_identificator(uuid)).await
  }

  async fn list_identificatoren(
    &self,
    query: IdentificatorQuery,
  ) -> Result<Vec<PartijIdentificator>> {
    self.read(move |repo| repo.list_identificatoren(&query)).await
  }

  async fn update_identificator(
    &self,
    uuid: Uuid,
    input: IdentificatorInput,
  ) -> Result<PartijIdentificator> {
    let policy = self.policy;
    self
      .write(move |repo| {
        Ok(
          IdentifierReconciler::new(repo)
            .with_policy(policy)
            .update(uuid, input)?,
        )
      })
      .await
  }

  async fn delete_identificator(&self, uuid: Uuid) -> Result<()> {
    self
      .write(move |repo| {
        IdentifierReconciler::new(repo).delete(uuid)?;
        tracing::debug!(identificator = %uuid, "deleted identificator");
        Ok(())
      })
      .await
  }
}
