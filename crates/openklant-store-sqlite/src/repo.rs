//! [`TxRepository`]: synchronous row access over one open connection or
//! transaction.
//!
//! This is what the core `IdentifierReconciler` runs against. It never
//! commits; [`crate::SqliteStore`] owns the transaction boundary.

use openklant_core::{
  identificator::{CodeSoortObjectId, IdentificatorGegevens, PartijIdentificator},
  partij::Partij,
  repository::IdentificatorRepository,
  store::{IdentificatorQuery, PartijQuery},
};
use rusqlite::{OptionalExtension as _, types::Value};
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{
    IDENTIFICATOR_COLUMNS, PARTIJ_COLUMNS, RawIdentificator, RawPartij,
    encode_dt, encode_uuid,
  },
};

pub struct TxRepository<'c> {
  conn: &'c rusqlite::Connection,
}

/// `LIMIT`/`OFFSET` clause; SQLite needs a `LIMIT` before any `OFFSET`.
fn page(limit: Option<usize>, offset: Option<usize>) -> String {
  match (limit, offset) {
    (None, None) => String::new(),
    (limit, offset) => format!(
      " LIMIT {} OFFSET {}",
      limit.map_or(-1, |l| l as i64),
      offset.unwrap_or(0)
    ),
  }
}

impl<'c> TxRepository<'c> {
  pub fn new(conn: &'c rusqlite::Connection) -> Self { Self { conn } }

  fn exists(&self, sql: &str, params: impl rusqlite::Params) -> Result<bool> {
    Ok(self.conn.query_row(sql, params, |row| row.get(0))?)
  }

  fn query_identificatoren(
    &self,
    sql: &str,
    params: impl rusqlite::Params,
  ) -> Result<Vec<PartijIdentificator>> {
    let mut stmt = self.conn.prepare(sql)?;
    let raws = stmt
      .query_map(params, RawIdentificator::from_row)?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    raws
      .into_iter()
      .map(RawIdentificator::into_identificator)
      .collect()
  }

  // ── Partijen ──────────────────────────────────────────────────────────────

  pub fn find_partij(&self, uuid: Uuid) -> Result<Option<Partij>> {
    let raw = self
      .conn
      .query_row(
        &format!("SELECT {PARTIJ_COLUMNS} FROM partijen WHERE uuid = ?1"),
        rusqlite::params![encode_uuid(uuid)],
        RawPartij::from_row,
      )
      .optional()?;
    raw.map(RawPartij::into_partij).transpose()
  }

  pub fn list_partijen(&self, query: &PartijQuery) -> Result<Vec<Partij>> {
    let mut clauses: Vec<&str> = vec![];
    let mut params: Vec<Value> = vec![];

    if let Some(soort) = query.soort_partij {
      clauses.push("soort_partij = ?");
      params.push(Value::Text(soort.to_string()));
    }
    if let Some(nummer) = &query.nummer {
      clauses.push("nummer = ?");
      params.push(Value::Text(nummer.clone()));
    }
    if let Some(actief) = query.indicatie_actief {
      clauses.push("indicatie_actief = ?");
      params.push(Value::Integer(i64::from(actief)));
    }

    let mut sql = format!("SELECT {PARTIJ_COLUMNS} FROM partijen");
    if !clauses.is_empty() {
      sql.push_str(" WHERE ");
      sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY id");
    sql.push_str(&page(query.limit, query.offset));

    let mut stmt = self.conn.prepare(&sql)?;
    let raws = stmt
      .query_map(rusqlite::params_from_iter(params), RawPartij::from_row)?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    raws.into_iter().map(RawPartij::into_partij).collect()
  }

  /// The highest stored `nummer` read as an integer.
  pub fn max_nummer(&self) -> Result<Option<u64>> {
    let max: Option<i64> = self.conn.query_row(
      "SELECT MAX(CAST(nummer AS INTEGER)) FROM partijen",
      [],
      |row| row.get(0),
    )?;
    Ok(max.map(|n| n.max(0) as u64))
  }

  pub fn nummer_taken(&self, nummer: &str, excluding: Option<Uuid>) -> Result<bool> {
    self.exists(
      "SELECT EXISTS (
         SELECT 1 FROM partijen WHERE nummer = ?1 AND (?2 IS NULL OR uuid != ?2)
       )",
      rusqlite::params![nummer, excluding.map(encode_uuid)],
    )
  }

  pub fn insert_partij(&self, partij: &Partij) -> Result<()> {
    self.conn.execute(
      "INSERT INTO partijen (
         uuid, nummer, interne_notitie, soort_partij, partij_identificatie,
         indicatie_geheimhouding, voorkeurstaal, indicatie_actief, created_at
       ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
      rusqlite::params![
        encode_uuid(partij.uuid),
        partij.nummer,
        partij.interne_notitie,
        partij.identificatie.discriminant(),
        partij.identificatie.to_json()?.to_string(),
        partij.indicatie_geheimhouding,
        partij.voorkeurstaal,
        partij.indicatie_actief,
        encode_dt(partij.created_at),
      ],
    )?;
    Ok(())
  }

  pub fn update_partij(&self, partij: &Partij) -> Result<()> {
    self.conn.execute(
      "UPDATE partijen SET
         nummer = ?2, interne_notitie = ?3, soort_partij = ?4,
         partij_identificatie = ?5, indicatie_geheimhouding = ?6,
         voorkeurstaal = ?7, indicatie_actief = ?8
       WHERE uuid = ?1",
      rusqlite::params![
        encode_uuid(partij.uuid),
        partij.nummer,
        partij.interne_notitie,
        partij.identificatie.discriminant(),
        partij.identificatie.to_json()?.to_string(),
        partij.indicatie_geheimhouding,
        partij.voorkeurstaal,
        partij.indicatie_actief,
      ],
    )?;
    Ok(())
  }

  /// Removes the Partij; owned identifiers go with it via `ON DELETE
  /// CASCADE`.
  pub fn delete_partij(&self, uuid: Uuid) -> Result<()> {
    self.conn.execute(
      "DELETE FROM partijen WHERE uuid = ?1",
      rusqlite::params![encode_uuid(uuid)],
    )?;
    Ok(())
  }

  // ── PartijIdentificatoren ─────────────────────────────────────────────────

  pub fn list_identificatoren(
    &self,
    query: &IdentificatorQuery,
  ) -> Result<Vec<PartijIdentificator>> {
    let mut clauses: Vec<&str> = vec![];
    let mut params: Vec<Value> = vec![];

    if let Some(partij) = query.partij {
      clauses.push("partij_uuid = ?");
      params.push(Value::Text(encode_uuid(partij)));
    }
    if let Some(objecttype) = query.code_objecttype {
      clauses.push("code_objecttype = ?");
      params.push(Value::Text(objecttype.to_string()));
    }
    if let Some(soort) = query.code_soort_object_id {
      clauses.push("code_soort_object_id = ?");
      params.push(Value::Text(soort.to_string()));
    }
    if let Some(object_id) = &query.object_id {
      clauses.push("object_id = ?");
      params.push(Value::Text(object_id.clone()));
    }
    if let Some(register) = query.code_register {
      clauses.push("code_register = ?");
      params.push(Value::Text(register.to_string()));
    }

    let mut sql =
      format!("SELECT {IDENTIFICATOR_COLUMNS} FROM partij_identificatoren");
    if !clauses.is_empty() {
      sql.push_str(" WHERE ");
      sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY id");
    sql.push_str(&page(query.limit, query.offset));

    self.query_identificatoren(&sql, rusqlite::params_from_iter(params))
  }
}

// ─── IdentificatorRepository impl ───────────────────────────────────────────

impl IdentificatorRepository for TxRepository<'_> {
  type Error = Error;

  fn find_identificator(&self, uuid: Uuid) -> Result<Option<PartijIdentificator>> {
    let raw = self
      .conn
      .query_row(
        &format!(
          "SELECT {IDENTIFICATOR_COLUMNS} FROM partij_identificatoren \
           WHERE uuid = ?1"
        ),
        rusqlite::params![encode_uuid(uuid)],
        RawIdentificator::from_row,
      )
      .optional()?;
    raw.map(RawIdentificator::into_identificator).transpose()
  }

  fn partij_exists(&self, uuid: Uuid) -> Result<bool> {
    self.exists(
      "SELECT EXISTS (SELECT 1 FROM partijen WHERE uuid = ?1)",
      rusqlite::params![encode_uuid(uuid)],
    )
  }

  fn owned_by(&self, partij: Uuid) -> Result<Vec<PartijIdentificator>> {
    self.query_identificatoren(
      &format!(
        "SELECT {IDENTIFICATOR_COLUMNS} FROM partij_identificatoren \
         WHERE partij_uuid = ?1 ORDER BY id"
      ),
      rusqlite::params![encode_uuid(partij)],
    )
  }

  fn soort_taken(
    &self,
    partij: Uuid,
    soort: CodeSoortObjectId,
    excluding: Option<Uuid>,
  ) -> Result<bool> {
    self.exists(
      "SELECT EXISTS (
         SELECT 1 FROM partij_identificatoren
         WHERE partij_uuid = ?1 AND code_soort_object_id = ?2
           AND (?3 IS NULL OR uuid != ?3)
       )",
      rusqlite::params![
        encode_uuid(partij),
        soort.as_ref(),
        excluding.map(encode_uuid)
      ],
    )
  }

  fn gegevens_taken(
    &self,
    gegevens: &IdentificatorGegevens,
    sub_identificator_van: Option<Uuid>,
    excluding: Option<Uuid>,
  ) -> Result<bool> {
    self.exists(
      "SELECT EXISTS (
         SELECT 1 FROM partij_identificatoren
         WHERE code_objecttype = ?1 AND code_soort_object_id = ?2
           AND object_id = ?3 AND code_register = ?4
           AND sub_identificator_van IS ?5
           AND (?6 IS NULL OR uuid != ?6)
       )",
      rusqlite::params![
        gegevens.code_objecttype.as_ref(),
        gegevens.code_soort_object_id.as_ref(),
        gegevens.object_id,
        gegevens.code_register.as_ref(),
        sub_identificator_van.map(encode_uuid),
        excluding.map(encode_uuid),
      ],
    )
  }

  fn has_dependents(&self, uuid: Uuid) -> Result<bool> {
    self.exists(
      "SELECT EXISTS (
         SELECT 1 FROM partij_identificatoren WHERE sub_identificator_van = ?1
       )",
      rusqlite::params![encode_uuid(uuid)],
    )
  }

  fn insert_identificator(&mut self, record: &PartijIdentificator) -> Result<()> {
    let g = &record.gegevens;
    self.conn.execute(
      "INSERT INTO partij_identificatoren (
         uuid, partij_uuid, sub_identificator_van, andere_partij_identificator,
         code_objecttype, code_soort_object_id, object_id, code_register,
         created_at
       ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
      rusqlite::params![
        encode_uuid(record.uuid),
        record.partij.map(encode_uuid),
        record.sub_identificator_van.map(encode_uuid),
        record.andere_partij_identificator,
        g.code_objecttype.as_ref(),
        g.code_soort_object_id.as_ref(),
        g.object_id,
        g.code_register.as_ref(),
        encode_dt(record.created_at),
      ],
    )?;
    Ok(())
  }

  fn update_identificator(&mut self, record: &PartijIdentificator) -> Result<()> {
    let g = &record.gegevens;
    self.conn.execute(
      "UPDATE partij_identificatoren SET
         partij_uuid = ?2, sub_identificator_van = ?3,
         andere_partij_identificator = ?4, code_objecttype = ?5,
         code_soort_object_id = ?6, object_id = ?7, code_register = ?8
       WHERE uuid = ?1",
      rusqlite::params![
        encode_uuid(record.uuid),
        record.partij.map(encode_uuid),
        record.sub_identificator_van.map(encode_uuid),
        record.andere_partij_identificator,
        g.code_objecttype.as_ref(),
        g.code_soort_object_id.as_ref(),
        g.object_id,
        g.code_register.as_ref(),
      ],
    )?;
    Ok(())
  }

  fn delete_identificatoren(&mut self, uuids: &[Uuid]) -> Result<()> {
    let mut stmt = self
      .conn
      .prepare("DELETE FROM partij_identificatoren WHERE uuid = ?1")?;
    for uuid in uuids {
      stmt.execute(rusqlite::params![encode_uuid(*uuid)])?;
    }
    Ok(())
  }
}
