//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings, UUIDs hyphenated lowercase strings, code
//! enums their snake_case wire names. The soort-specific Partij payload is
//! compact JSON next to its discriminant.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use openklant_core::{
  identificator::{IdentificatorGegevens, PartijIdentificator},
  partij::{Partij, PartijIdentificatie},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

fn decode_code<T: FromStr>(column: &'static str, value: String) -> Result<T> {
  value
    .parse()
    .map_err(|_| Error::UnknownCode { column, value })
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawIdentificator::from_row`].
pub const IDENTIFICATOR_COLUMNS: &str = "uuid, partij_uuid, \
                                         sub_identificator_van, \
                                         andere_partij_identificator, \
                                         code_objecttype, \
                                         code_soort_object_id, object_id, \
                                         code_register, created_at";

/// Raw strings read directly from a `partij_identificatoren` row.
pub struct RawIdentificator {
  pub uuid:                        String,
  pub partij_uuid:                 Option<String>,
  pub sub_identificator_van:       Option<String>,
  pub andere_partij_identificator: String,
  pub code_objecttype:             String,
  pub code_soort_object_id:        String,
  pub object_id:                   String,
  pub code_register:               String,
  pub created_at:                  String,
}

impl RawIdentificator {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      uuid:                        row.get(0)?,
      partij_uuid:                 row.get(1)?,
      sub_identificator_van:       row.get(2)?,
      andere_partij_identificator: row.get(3)?,
      code_objecttype:             row.get(4)?,
      code_soort_object_id:        row.get(5)?,
      object_id:                   row.get(6)?,
      code_register:               row.get(7)?,
      created_at:                  row.get(8)?,
    })
  }

  pub fn into_identificator(self) -> Result<PartijIdentificator> {
    Ok(PartijIdentificator {
      uuid:                        decode_uuid(&self.uuid)?,
      partij:                      self
        .partij_uuid
        .as_deref()
        .map(decode_uuid)
        .transpose()?,
      sub_identificator_van:       self
        .sub_identificator_van
        .as_deref()
        .map(decode_uuid)
        .transpose()?,
      andere_partij_identificator: self.andere_partij_identificator,
      gegevens:                    IdentificatorGegevens {
        code_objecttype:      decode_code(
          "code_objecttype",
          self.code_objecttype,
        )?,
        code_soort_object_id: decode_code(
          "code_soort_object_id",
          self.code_soort_object_id,
        )?,
        object_id:            self.object_id,
        code_register:        decode_code("code_register", self.code_register)?,
      },
      created_at:                  decode_dt(&self.created_at)?,
    })
  }
}

/// Column list matching [`RawPartij::from_row`].
pub const PARTIJ_COLUMNS: &str = "uuid, nummer, interne_notitie, \
                                  soort_partij, partij_identificatie, \
                                  indicatie_geheimhouding, voorkeurstaal, \
                                  indicatie_actief, created_at";

/// Raw values read directly from a `partijen` row.
pub struct RawPartij {
  pub uuid:                    String,
  pub nummer:                  String,
  pub interne_notitie:         String,
  pub soort_partij:            String,
  pub partij_identificatie:    String,
  pub indicatie_geheimhouding: Option<bool>,
  pub voorkeurstaal:           String,
  pub indicatie_actief:        bool,
  pub created_at:              String,
}

impl RawPartij {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      uuid:                    row.get(0)?,
      nummer:                  row.get(1)?,
      interne_notitie:         row.get(2)?,
      soort_partij:            row.get(3)?,
      partij_identificatie:    row.get(4)?,
      indicatie_geheimhouding: row.get(5)?,
      voorkeurstaal:           row.get(6)?,
      indicatie_actief:        row.get(7)?,
      created_at:              row.get(8)?,
    })
  }

  pub fn into_partij(self) -> Result<Partij> {
    let data: serde_json::Value =
      serde_json::from_str(&self.partij_identificatie)?;
    Ok(Partij {
      uuid:                    decode_uuid(&self.uuid)?,
      nummer:                  self.nummer,
      interne_notitie:         self.interne_notitie,
      identificatie:           PartijIdentificatie::from_parts(
        &self.soort_partij,
        data,
      )?,
      indicatie_geheimhouding: self.indicatie_geheimhouding,
      voorkeurstaal:           self.voorkeurstaal,
      indicatie_actief:        self.indicatie_actief,
      created_at:              decode_dt(&self.created_at)?,
    })
  }
}
