//! Partij: the person, organisation or contact person that identifiers are
//! attached to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, VariantArray};
use uuid::Uuid;

use crate::{
  Error, Result,
  identificator::{IdentificatorInput, PartijIdentificator, UuidRef},
  validation::{ErrorCode, FieldError, ValidationErrors, field},
};

pub const NUMMER_MAX_LENGTH: usize = 10;
pub const INTERNE_NOTITIE_MAX_LENGTH: usize = 1000;
pub const VOORKEURSTAAL_MAX_LENGTH: usize = 3;

pub const NUMMER_NOT_INTEGER_MESSAGE: &str = "Voer een geheel getal in.";
pub const NUMMER_TAKEN_MESSAGE: &str =
  "Er bestaat al een partij met eenzelfde nummer.";

// ─── SoortPartij ─────────────────────────────────────────────────────────────

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
pub enum SoortPartij {
  Persoon,
  Organisatie,
  Contactpersoon,
}

// ─── PartijIdentificatie ─────────────────────────────────────────────────────

/// The name a person wants to be addressed by.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Contactnaam {
  pub voorletters:            String,
  pub voornaam:               String,
  pub voorvoegsel_achternaam: String,
  pub achternaam:             String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct Persoon {
  pub contactnaam: Option<Contactnaam>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct Organisatie {
  pub naam: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct Contactpersoon {
  pub contactnaam:             Option<Contactnaam>,
  /// The organisation Partij this person acted for.
  pub werkte_voor_organisatie: Option<UuidRef>,
}

/// The soort-specific payload of a Partij.
///
/// On the wire this is the `soortPartij` discriminant next to a
/// `partijIdentificatie` object of the matching shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
  tag = "soortPartij",
  content = "partijIdentificatie",
  rename_all = "snake_case"
)]
pub enum PartijIdentificatie {
  Persoon(Persoon),
  Organisatie(Organisatie),
  Contactpersoon(Contactpersoon),
}

impl PartijIdentificatie {
  pub fn soort(&self) -> SoortPartij {
    match self {
      Self::Persoon(_) => SoortPartij::Persoon,
      Self::Organisatie(_) => SoortPartij::Organisatie,
      Self::Contactpersoon(_) => SoortPartij::Contactpersoon,
    }
  }

  /// The discriminant stored in the `soort_partij` column.
  pub fn discriminant(&self) -> &'static str {
    match self {
      Self::Persoon(_) => "persoon",
      Self::Organisatie(_) => "organisatie",
      Self::Contactpersoon(_) => "contactpersoon",
    }
  }

  /// The payload without its discriminant.
  pub fn to_json(&self) -> Result<serde_json::Value> {
    let value = match self {
      Self::Persoon(p) => serde_json::to_value(p)?,
      Self::Organisatie(o) => serde_json::to_value(o)?,
      Self::Contactpersoon(c) => serde_json::to_value(c)?,
    };
    Ok(value)
  }

  /// Rebuild from a discriminant and its payload.
  pub fn from_parts(discriminant: &str, data: serde_json::Value) -> Result<Self> {
    let wrapped = serde_json::json!({
      "soortPartij": discriminant,
      "partijIdentificatie": data,
    });
    Ok(serde_json::from_value(wrapped)?)
  }

  /// An empty payload of the given soort.
  pub fn empty(soort: SoortPartij) -> Self {
    match soort {
      SoortPartij::Persoon => Self::Persoon(Persoon::default()),
      SoortPartij::Organisatie => Self::Organisatie(Organisatie::default()),
      SoortPartij::Contactpersoon => {
        Self::Contactpersoon(Contactpersoon::default())
      }
    }
  }

  /// The organisation this payload refers to, if any.
  pub fn werkte_voor_organisatie(&self) -> Option<Uuid> {
    match self {
      Self::Contactpersoon(c) => c.werkte_voor_organisatie.map(|r| r.uuid),
      _ => None,
    }
  }
}

// ─── Partij ──────────────────────────────────────────────────────────────────

/// A persisted Partij, without its identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partij {
  pub uuid:                    Uuid,
  /// Ten-digit human-facing number, unique across all parties.
  pub nummer:                  String,
  pub interne_notitie:         String,
  pub identificatie:           PartijIdentificatie,
  pub indicatie_geheimhouding: Option<bool>,
  pub voorkeurstaal:           String,
  pub indicatie_actief:        bool,
  pub created_at:              DateTime<Utc>,
}

impl Partij {
  pub fn soort(&self) -> SoortPartij { self.identificatie.soort() }
}

/// A Partij together with the identifiers it owns, in creation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartijView {
  pub partij:          Partij,
  pub identificatoren: Vec<PartijIdentificator>,
}

/// Input to [`crate::store::PartijStore::create_partij`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPartij {
  /// Assigned automatically when `None` or empty.
  pub nummer:                  Option<String>,
  pub interne_notitie:         String,
  pub identificatie:           PartijIdentificatie,
  pub indicatie_geheimhouding: Option<bool>,
  pub voorkeurstaal:           String,
  pub indicatie_actief:        bool,
  pub identificatoren:         Vec<IdentificatorInput>,
}

impl NewPartij {
  pub fn new(identificatie: PartijIdentificatie) -> Self {
    Self {
      nummer: None,
      interne_notitie: String::new(),
      identificatie,
      indicatie_geheimhouding: None,
      voorkeurstaal: String::new(),
      indicatie_actief: true,
      identificatoren: Vec::new(),
    }
  }

  pub fn with_identificatoren(
    mut self,
    identificatoren: Vec<IdentificatorInput>,
  ) -> Self {
    self.identificatoren = identificatoren;
    self
  }

  pub fn check(&self) -> ValidationErrors {
    check_fields(
      self.nummer.as_deref(),
      Some(&self.interne_notitie),
      Some(&self.voorkeurstaal),
    )
  }
}

/// Input to [`crate::store::PartijStore::update_partij`]. `None` fields keep
/// their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartijUpdate {
  pub nummer:                  Option<String>,
  pub interne_notitie:         Option<String>,
  pub identificatie:           Option<PartijIdentificatie>,
  pub indicatie_geheimhouding: Option<Option<bool>>,
  pub voorkeurstaal:           Option<String>,
  pub indicatie_actief:        Option<bool>,
  /// `Some` replaces the owned set, `None` leaves it untouched.
  pub identificatoren:         Option<Vec<IdentificatorInput>>,
  /// Soort the request was interpreted against; the write is refused if the
  /// stored soort no longer matches.
  pub resolved_against:        Option<SoortPartij>,
}

impl PartijUpdate {
  pub fn check(&self) -> ValidationErrors {
    check_fields(
      self.nummer.as_deref(),
      self.interne_notitie.as_deref(),
      self.voorkeurstaal.as_deref(),
    )
  }

  /// `partij` with the present fields applied.
  pub fn apply_to(&self, partij: &Partij) -> Partij {
    Partij {
      uuid:                    partij.uuid,
      nummer:                  self
        .nummer
        .clone()
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| partij.nummer.clone()),
      interne_notitie:         self
        .interne_notitie
        .clone()
        .unwrap_or_else(|| partij.interne_notitie.clone()),
      identificatie:           self
        .identificatie
        .clone()
        .unwrap_or_else(|| partij.identificatie.clone()),
      indicatie_geheimhouding: self
        .indicatie_geheimhouding
        .unwrap_or(partij.indicatie_geheimhouding),
      voorkeurstaal:           self
        .voorkeurstaal
        .clone()
        .unwrap_or_else(|| partij.voorkeurstaal.clone()),
      indicatie_actief:        self
        .indicatie_actief
        .unwrap_or(partij.indicatie_actief),
      created_at:              partij.created_at,
    }
  }
}

// ─── Field checks ────────────────────────────────────────────────────────────

fn max_length_error(name: &str, max: usize) -> FieldError {
  FieldError::new(
    name,
    ErrorCode::MaxLength,
    format!("Zorg ervoor dat dit veld niet meer dan {max} tekens bevat."),
  )
}

/// Length and format checks on the scalar Partij fields. Uniqueness of
/// `nummer` needs storage and is checked there.
pub fn check_fields(
  nummer: Option<&str>,
  interne_notitie: Option<&str>,
  voorkeurstaal: Option<&str>,
) -> ValidationErrors {
  let mut errors = ValidationErrors::new();

  if let Some(nummer) = nummer.filter(|n| !n.is_empty()) {
    if !nummer.bytes().all(|b| b.is_ascii_digit()) {
      errors.push(FieldError::invalid(field::NUMMER, NUMMER_NOT_INTEGER_MESSAGE));
    } else if nummer.len() > NUMMER_MAX_LENGTH {
      errors.push(max_length_error(field::NUMMER, NUMMER_MAX_LENGTH));
    }
  }
  if let Some(notitie) = interne_notitie
    && notitie.chars().count() > INTERNE_NOTITIE_MAX_LENGTH
  {
    errors.push(max_length_error(
      field::INTERNE_NOTITIE,
      INTERNE_NOTITIE_MAX_LENGTH,
    ));
  }
  if let Some(taal) = voorkeurstaal
    && taal.chars().count() > VOORKEURSTAAL_MAX_LENGTH
  {
    errors.push(max_length_error(field::VOORKEURSTAAL, VOORKEURSTAAL_MAX_LENGTH));
  }

  errors
}

/// The number following `max_existing`, zero-padded to ten digits.
pub fn next_nummer(max_existing: Option<u64>) -> Result<String> {
  let next = max_existing
    .unwrap_or(0)
    .checked_add(1)
    .ok_or(Error::NummerExhausted)?;
  let nummer = format!("{next:0>width$}", width = NUMMER_MAX_LENGTH);
  if nummer.len() > NUMMER_MAX_LENGTH {
    return Err(Error::NummerExhausted);
  }
  Ok(nummer)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn nummer_is_zero_padded() {
    assert_eq!(next_nummer(None).unwrap(), "0000000001");
    assert_eq!(next_nummer(Some(1298329193)).unwrap(), "1298329194");
  }

  #[test]
  fn nummer_runs_out_after_ten_digits() {
    assert!(matches!(
      next_nummer(Some(9_999_999_999)),
      Err(Error::NummerExhausted)
    ));
  }

  #[test]
  fn supplied_nummer_must_be_an_integer() {
    let errors = check_fields(Some("12a"), None, None).into_inner();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].name, field::NUMMER);
    assert_eq!(errors[0].reason, NUMMER_NOT_INTEGER_MESSAGE);

    assert!(check_fields(Some(""), None, None).is_empty());
    assert!(check_fields(Some("0000000042"), None, None).is_empty());
    assert_eq!(check_fields(Some("12345678901"), None, None).len(), 1);
  }

  #[test]
  fn long_free_text_is_rejected() {
    let notitie = "x".repeat(INTERNE_NOTITIE_MAX_LENGTH + 1);
    let names: Vec<String> = check_fields(None, Some(&notitie), Some("nlda"))
      .into_iter()
      .map(|e| e.name)
      .collect();
    assert_eq!(names, [field::INTERNE_NOTITIE, field::VOORKEURSTAAL]);
  }

  #[test]
  fn identificatie_round_trips_through_parts() {
    let original = PartijIdentificatie::Contactpersoon(Contactpersoon {
      contactnaam:             Some(Contactnaam {
        voornaam: "Phil".into(),
        achternaam: "Bozeman".into(),
        ..Contactnaam::default()
      }),
      werkte_voor_organisatie: Some(UuidRef { uuid: Uuid::new_v4() }),
    });

    let data = original.to_json().unwrap();
    assert!(data.get("soortPartij").is_none());
    let back =
      PartijIdentificatie::from_parts(original.discriminant(), data).unwrap();
    assert_eq!(back, original);
  }

  #[test]
  fn identificatie_serializes_next_to_its_discriminant() {
    let value = serde_json::to_value(PartijIdentificatie::Organisatie(
      Organisatie { naam: "Gemeente".into() },
    ))
    .unwrap();
    assert_eq!(
      value,
      serde_json::json!({
        "soortPartij": "organisatie",
        "partijIdentificatie": {"naam": "Gemeente"},
      })
    );
  }

  #[test]
  fn unknown_soort_is_rejected() {
    assert!(
      PartijIdentificatie::from_parts("bedrijf", serde_json::json!({})).is_err()
    );
  }

  #[test]
  fn payload_must_match_its_soort() {
    let persoon = serde_json::json!({"contactnaam": {"voornaam": "Phil"}});
    assert!(PartijIdentificatie::from_parts("persoon", persoon.clone()).is_ok());
    assert!(PartijIdentificatie::from_parts("organisatie", persoon).is_err());
  }

  #[test]
  fn update_keeps_absent_fields() {
    let partij = Partij {
      uuid:                    Uuid::new_v4(),
      nummer:                  "0000000001".into(),
      interne_notitie:         "notitie".into(),
      identificatie:           PartijIdentificatie::empty(SoortPartij::Persoon),
      indicatie_geheimhouding: Some(false),
      voorkeurstaal:           "nld".into(),
      indicatie_actief:        true,
      created_at:              Utc::now(),
    };
    let update = PartijUpdate {
      indicatie_actief: Some(false),
      nummer: Some(String::new()),
      ..PartijUpdate::default()
    };
    let applied = update.apply_to(&partij);
    assert!(!applied.indicatie_actief);
    assert_eq!(applied.nummer, partij.nummer);
    assert_eq!(applied.voorkeurstaal, "nld");
  }
}
