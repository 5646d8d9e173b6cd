//! Wire shapes for request and response bodies.
//!
//! Request bodies deserialize leniently (codes as plain strings, presence
//! tracked with [`double_option`]) so that missing fields and unknown code
//! values are reported together as field errors instead of a single parse
//! failure.

use std::str::FromStr;

use openklant_core::{
  Error as CoreError,
  diff::entry_prefix,
  identificator::{
    CodeObjecttype, CodeRegister, CodeSoortObjectId, IdentificatorGegevens,
    IdentificatorInput, PartijIdentificator, UuidRef, double_option,
  },
  partij::{
    NewPartij, Partij, PartijIdentificatie, PartijUpdate, PartijView,
    SoortPartij,
  },
  validation::{FieldError, ValidationErrors, field},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Whether a body replaces a resource (POST, PUT) or patches it (PATCH).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completeness {
  Full,
  Partial,
}

// ─── Identificator requests ──────────────────────────────────────────────────

/// The `partijIdentificator` sub-object of a request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GegevensBody {
  pub code_objecttype:      Option<String>,
  pub code_soort_object_id: Option<String>,
  pub object_id:            Option<String>,
  pub code_register:        Option<String>,
}

impl GegevensBody {
  fn parse(
    &self,
    errors: &mut ValidationErrors,
  ) -> Option<IdentificatorGegevens> {
    let name = |key: &str| format!("{}.{key}", field::PARTIJ_IDENTIFICATOR);

    let code_objecttype = parse_code::<CodeObjecttype>(
      self.code_objecttype.as_deref(),
      &name("codeObjecttype"),
      errors,
    );
    let code_soort_object_id = parse_code::<CodeSoortObjectId>(
      self.code_soort_object_id.as_deref(),
      &name("codeSoortObjectId"),
      errors,
    );
    let code_register = parse_code::<CodeRegister>(
      self.code_register.as_deref(),
      &name("codeRegister"),
      errors,
    );
    let object_id = self.object_id.clone();
    if object_id.is_none() {
      errors.push(FieldError::required(name("objectId")));
    }

    Some(IdentificatorGegevens {
      code_objecttype:      code_objecttype?,
      code_soort_object_id: code_soort_object_id?,
      object_id:            object_id?,
      code_register:        code_register?,
    })
  }
}

fn parse_code<T: FromStr>(
  value: Option<&str>,
  name: &str,
  errors: &mut ValidationErrors,
) -> Option<T> {
  let Some(value) = value else {
    errors.push(FieldError::required(name));
    return None;
  };
  match value.parse() {
    Ok(code) => Some(code),
    Err(_) => {
      errors.push(FieldError::invalid_choice(name, value));
      None
    }
  }
}

/// A `PartijIdentificator` as submitted, standalone or nested in a Partij.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentificatorBody {
  pub uuid:                        Option<Uuid>,
  #[serde(default, deserialize_with = "double_option")]
  pub identificeerde_partij:       Option<Option<UuidRef>>,
  pub andere_partij_identificator: Option<String>,
  #[serde(default, deserialize_with = "double_option")]
  pub sub_identificator_van:       Option<Option<UuidRef>>,
  #[serde(default, deserialize_with = "double_option")]
  pub partij_identificator:        Option<Option<GegevensBody>>,
}

impl IdentificatorBody {
  /// Input for the standalone resource.
  ///
  /// A full body must name `identificeerdePartij` (possibly `null`) and
  /// `partijIdentificator`; optional fields it leaves out are reset.
  pub fn into_input(
    self,
    completeness: Completeness,
  ) -> Result<IdentificatorInput, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if completeness == Completeness::Full {
      if self.identificeerde_partij.is_none() {
        errors.push(FieldError::required(field::IDENTIFICEERDE_PARTIJ));
      }
      if self.partij_identificator.is_none() {
        errors.push(FieldError::required(field::PARTIJ_IDENTIFICATOR));
      }
    }

    let mut input = self.parse(&mut errors);
    if completeness == Completeness::Full {
      reset_omitted(&mut input);
    }
    errors.into_result(input)
  }

  fn parse(self, errors: &mut ValidationErrors) -> IdentificatorInput {
    let gegevens = match &self.partij_identificator {
      None => None,
      Some(None) => {
        errors.push(FieldError::null(field::PARTIJ_IDENTIFICATOR));
        None
      }
      Some(Some(body)) => body.parse(errors),
    };
    IdentificatorInput {
      uuid: self.uuid,
      partij: self.identificeerde_partij.map(|r| r.map(|r| r.uuid)),
      andere_partij_identificator: self.andere_partij_identificator,
      sub_identificator_van: self.sub_identificator_van.map(|r| r.map(|r| r.uuid)),
      gegevens,
    }
  }
}

/// Parse nested entries, prefixing errors with their position.
///
/// A full entry must carry `partijIdentificator` even when it names an
/// existing record by `uuid`. The owner comes from the enclosing Partij.
fn parse_entries(
  entries: Vec<IdentificatorBody>,
  completeness: Completeness,
  errors: &mut ValidationErrors,
) -> Vec<IdentificatorInput> {
  entries
    .into_iter()
    .enumerate()
    .map(|(index, entry)| {
      let mut found = ValidationErrors::new();
      let full = completeness == Completeness::Full;
      if full && entry.partij_identificator.is_none() {
        found.push(FieldError::required(field::PARTIJ_IDENTIFICATOR));
      }
      let mut input = entry.parse(&mut found);
      if full {
        reset_omitted(&mut input);
      }
      errors.extend(found.prefixed(&entry_prefix(index)));
      input
    })
    .collect()
}

/// A full body replaces the optional fields it leaves out.
fn reset_omitted(input: &mut IdentificatorInput) {
  input.andere_partij_identificator.get_or_insert_with(String::new);
  input.sub_identificator_van.get_or_insert(None);
}

// ─── Partij requests ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartijBody {
  pub nummer:                  Option<String>,
  pub interne_notitie:         Option<String>,
  pub soort_partij:            Option<String>,
  #[serde(default, deserialize_with = "double_option")]
  pub partij_identificatie:    Option<Option<serde_json::Value>>,
  #[serde(default, deserialize_with = "double_option")]
  pub indicatie_geheimhouding: Option<Option<bool>>,
  pub voorkeurstaal:           Option<String>,
  pub indicatie_actief:        Option<bool>,
  pub partij_identificatoren:  Option<Vec<IdentificatorBody>>,
}

impl PartijBody {
  pub fn into_new_partij(self) -> Result<NewPartij, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let identificatie =
      self.identificatie(None, Completeness::Full, &mut errors);
    if self.indicatie_actief.is_none() {
      errors.push(FieldError::required(field::INDICATIE_ACTIEF));
    }
    let identificatoren = parse_entries(
      self.partij_identificatoren.unwrap_or_default(),
      Completeness::Full,
      &mut errors,
    );

    match identificatie {
      Some(identificatie) if errors.is_empty() => Ok(NewPartij {
        nummer: self.nummer,
        interne_notitie: self.interne_notitie.unwrap_or_default(),
        identificatie,
        indicatie_geheimhouding: self.indicatie_geheimhouding.flatten(),
        voorkeurstaal: self.voorkeurstaal.unwrap_or_default(),
        indicatie_actief: self.indicatie_actief.unwrap_or(true),
        identificatoren,
      }),
      _ => Err(errors),
    }
  }

  /// An update of a Partij that is currently of soort `current`.
  pub fn into_update(
    self,
    current: SoortPartij,
    completeness: Completeness,
  ) -> Result<PartijUpdate, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let identificatie =
      self.identificatie(Some(current), completeness, &mut errors);
    let full = completeness == Completeness::Full;
    if full && self.indicatie_actief.is_none() {
      errors.push(FieldError::required(field::INDICATIE_ACTIEF));
    }
    let identificatoren = self
      .partij_identificatoren
      .map(|entries| parse_entries(entries, completeness, &mut errors));

    let update = if full {
      PartijUpdate {
        nummer: self.nummer,
        interne_notitie: Some(self.interne_notitie.unwrap_or_default()),
        identificatie,
        indicatie_geheimhouding: Some(self.indicatie_geheimhouding.flatten()),
        voorkeurstaal: Some(self.voorkeurstaal.unwrap_or_default()),
        indicatie_actief: self.indicatie_actief,
        identificatoren,
        resolved_against: Some(current),
      }
    } else {
      PartijUpdate {
        nummer: self.nummer,
        interne_notitie: self.interne_notitie,
        identificatie,
        indicatie_geheimhouding: self.indicatie_geheimhouding,
        voorkeurstaal: self.voorkeurstaal,
        indicatie_actief: self.indicatie_actief,
        identificatoren,
        resolved_against: Some(current),
      }
    };
    errors.into_result(update)
  }

  /// The payload to store, or `None` when it is absent, unchanged, or
  /// invalid (in which case `errors` says why).
  fn identificatie(
    &self,
    current: Option<SoortPartij>,
    completeness: Completeness,
    errors: &mut ValidationErrors,
  ) -> Option<PartijIdentificatie> {
    let full = completeness == Completeness::Full;

    let supplied = match self.soort_partij.as_deref() {
      Some(value) => match value.parse::<SoortPartij>() {
        Ok(soort) => Some(soort),
        Err(_) => {
          errors.push(FieldError::invalid_choice(field::SOORT_PARTIJ, value));
          return None;
        }
      },
      None => {
        if full {
          errors.push(FieldError::required(field::SOORT_PARTIJ));
        }
        None
      }
    };

    match &self.partij_identificatie {
      Some(Some(data)) => {
        let soort = supplied.or(current)?;
        match PartijIdentificatie::from_parts(soort.as_ref(), data.clone()) {
          Ok(identificatie) => Some(identificatie),
          Err(e) => {
            errors.push(FieldError::invalid(
              field::PARTIJ_IDENTIFICATIE,
              e.to_string(),
            ));
            None
          }
        }
      }
      Some(None) => {
        errors.push(FieldError::null(field::PARTIJ_IDENTIFICATIE));
        None
      }
      None if full => {
        errors.push(FieldError::required(field::PARTIJ_IDENTIFICATIE));
        None
      }
      // A new soort without a payload starts out empty.
      None => supplied
        .filter(|soort| Some(*soort) != current)
        .map(PartijIdentificatie::empty),
    }
  }
}

// ─── Responses ───────────────────────────────────────────────────────────────

pub fn partij_url(base_url: &str, uuid: Uuid) -> String {
  format!("{base_url}/partijen/{uuid}")
}

pub fn identificator_url(base_url: &str, uuid: Uuid) -> String {
  format!("{base_url}/partij-identificatoren/{uuid}")
}

/// A related resource: `{"uuid": ..., "url": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reference {
  pub uuid: Uuid,
  pub url:  String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentificatorResponse {
  pub uuid:                        Uuid,
  pub url:                         String,
  pub identificeerde_partij:       Option<Reference>,
  pub andere_partij_identificator: String,
  pub partij_identificator:        IdentificatorGegevens,
  pub sub_identificator_van:       Option<Reference>,
}

impl IdentificatorResponse {
  pub fn new(record: PartijIdentificator, base_url: &str) -> Self {
    Self {
      uuid:                        record.uuid,
      url:                         identificator_url(base_url, record.uuid),
      identificeerde_partij:       record.partij.map(|uuid| Reference {
        uuid,
        url: partij_url(base_url, uuid),
      }),
      andere_partij_identificator: record.andere_partij_identificator,
      partij_identificator:        record.gegevens,
      sub_identificator_van:       record.sub_identificator_van.map(|uuid| {
        Reference { uuid, url: identificator_url(base_url, uuid) }
      }),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartijResponse {
  pub uuid:                    Uuid,
  pub url:                     String,
  pub nummer:                  String,
  pub interne_notitie:         String,
  pub soort_partij:            SoortPartij,
  pub partij_identificatie:    serde_json::Value,
  pub indicatie_geheimhouding: Option<bool>,
  pub voorkeurstaal:           String,
  pub indicatie_actief:        bool,
  pub partij_identificatoren:  Vec<IdentificatorResponse>,
}

impl PartijResponse {
  pub fn new(view: PartijView, base_url: &str) -> Result<Self, CoreError> {
    let PartijView { partij, identificatoren } = view;
    let Partij {
      uuid,
      nummer,
      interne_notitie,
      identificatie,
      indicatie_geheimhouding,
      voorkeurstaal,
      indicatie_actief,
      ..
    } = partij;

    Ok(Self {
      uuid,
      url: partij_url(base_url, uuid),
      nummer,
      interne_notitie,
      soort_partij: identificatie.soort(),
      partij_identificatie: identificatie.to_json()?,
      indicatie_geheimhouding,
      voorkeurstaal,
      indicatie_actief,
      partij_identificatoren: identificatoren
        .into_iter()
        .map(|record| IdentificatorResponse::new(record, base_url))
        .collect(),
    })
  }
}
