//! Which `(codeRegister, codeObjecttype, codeSoortObjectId)` combinations are
//! legal, and the per-record format check.
//!
//! ```text
//! brp  → natuurlijk_persoon      → bsn | overig
//! hr   → niet_natuurlijk_persoon → rsin | kvk_nummer | overig
//!      → vestiging               → vestigingsnummer | overig
//! overig → any objecttype
//! ```

use crate::{
  identificator::{CodeObjecttype, CodeRegister, CodeSoortObjectId, IdentificatorGegevens},
  validation::{FieldError, ValidationErrors, field},
  validators::validate_object_id,
};

/// Objecttypes allowed for `register`; `None` means unrestricted.
pub fn allowed_objecttypes(
  register: CodeRegister,
) -> Option<&'static [CodeObjecttype]> {
  match register {
    CodeRegister::Brp => Some(&[CodeObjecttype::NatuurlijkPersoon]),
    CodeRegister::Hr => Some(&[
      CodeObjecttype::Vestiging,
      CodeObjecttype::NietNatuurlijkPersoon,
    ]),
    CodeRegister::Overig => None,
  }
}

/// Soorten allowed for `objecttype`; `None` means unrestricted.
pub fn allowed_soorten(
  objecttype: CodeObjecttype,
) -> Option<&'static [CodeSoortObjectId]> {
  match objecttype {
    CodeObjecttype::NatuurlijkPersoon => {
      Some(&[CodeSoortObjectId::Bsn, CodeSoortObjectId::Overig])
    }
    CodeObjecttype::NietNatuurlijkPersoon => Some(&[
      CodeSoortObjectId::Rsin,
      CodeSoortObjectId::KvkNummer,
      CodeSoortObjectId::Overig,
    ]),
    CodeObjecttype::Vestiging => Some(&[
      CodeSoortObjectId::Vestigingsnummer,
      CodeSoortObjectId::Overig,
    ]),
    CodeObjecttype::Overig => None,
  }
}

/// Render choices as `['a', 'b']`.
fn format_choices<T: AsRef<str>>(choices: &[T]) -> String {
  let quoted: Vec<String> =
    choices.iter().map(|c| format!("'{}'", c.as_ref())).collect();
  format!("[{}]", quoted.join(", "))
}

/// Run the combination and `object_id` format checks.
///
/// Each check reports on its own field, so all three may fail together.
pub fn check_gegevens(gegevens: &IdentificatorGegevens) -> ValidationErrors {
  let mut errors = ValidationErrors::new();

  if let Some(choices) = allowed_objecttypes(gegevens.code_register)
    && !choices.contains(&gegevens.code_objecttype)
  {
    errors.push(FieldError::invalid(
      field::CODE_OBJECTTYPE,
      format!(
        "voor `codeRegister` {} zijn alleen deze waarden toegestaan: {}",
        gegevens.code_register,
        format_choices(choices)
      ),
    ));
  }

  if let Some(choices) = allowed_soorten(gegevens.code_objecttype)
    && !choices.contains(&gegevens.code_soort_object_id)
  {
    errors.push(FieldError::invalid(
      field::CODE_SOORT_OBJECT_ID,
      format!(
        "voor `codeObjecttype` {} zijn alleen deze waarden toegestaan: {}",
        gegevens.code_objecttype,
        format_choices(choices)
      ),
    ));
  }

  if let Err(reason) =
    validate_object_id(gegevens.code_soort_object_id, &gegevens.object_id)
  {
    errors.push(FieldError::invalid(
      field::OBJECT_ID,
      format!("Deze waarde is ongeldig, reden: {reason}"),
    ));
  }

  errors
}
