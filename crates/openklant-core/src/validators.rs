//! Format checks for `object_id`, dispatched on the `code_soort_object_id`.
//!
//! BSN and RSIN carry an 11-proof checksum; KvK-nummer and vestigingsnummer
//! are fixed-length digit strings.

use thiserror::Error;

use crate::identificator::CodeSoortObjectId;

pub const BSN_LENGTH: usize = 9;
pub const RSIN_LENGTH: usize = 9;
pub const KVK_NUMMER_LENGTH: usize = 8;
pub const VESTIGINGSNUMMER_LENGTH: usize = 12;

/// Why an `object_id` was rejected. The display text is the user-facing
/// reason.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
  #[error("Waarde moet {0} tekens lang zijn")]
  Length(usize),

  #[error("Voer een numerieke waarde in")]
  NotNumeric,

  #[error("Onjuist {0} nummer")]
  ElevenProof(&'static str),
}

pub fn validate_length(value: &str, length: usize) -> Result<(), FormatError> {
  if value.chars().count() != length {
    return Err(FormatError::Length(length));
  }
  Ok(())
}

pub fn validate_numeric(value: &str) -> Result<(), FormatError> {
  if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
    return Err(FormatError::NotNumeric);
  }
  Ok(())
}

/// The Dutch "elfproef" over a 9-digit number: weights 9..2 for the first
/// eight digits, -1 for the last; the weighted sum must be divisible by 11.
///
/// Callers must have checked the value is nine ASCII digits.
pub fn passes_eleven_proof(value: &str) -> bool {
  let digits: Vec<i64> = value.bytes().map(|b| i64::from(b - b'0')).collect();
  let Some((last, rest)) = digits.split_last() else {
    return false;
  };
  let weighted: i64 = rest
    .iter()
    .zip((2..=9).rev())
    .map(|(digit, weight)| digit * weight)
    .sum();
  (weighted - last) % 11 == 0
}

pub fn validate_bsn(value: &str) -> Result<(), FormatError> {
  validate_length(value, BSN_LENGTH)?;
  validate_numeric(value)?;
  if !passes_eleven_proof(value) {
    return Err(FormatError::ElevenProof("BSN"));
  }
  Ok(())
}

pub fn validate_rsin(value: &str) -> Result<(), FormatError> {
  validate_length(value, RSIN_LENGTH)?;
  validate_numeric(value)?;
  if !passes_eleven_proof(value) {
    return Err(FormatError::ElevenProof("RSIN"));
  }
  Ok(())
}

pub fn validate_kvk_nummer(value: &str) -> Result<(), FormatError> {
  validate_length(value, KVK_NUMMER_LENGTH)?;
  validate_numeric(value)
}

pub fn validate_vestigingsnummer(value: &str) -> Result<(), FormatError> {
  validate_length(value, VESTIGINGSNUMMER_LENGTH)?;
  validate_numeric(value)
}

/// Dispatch to the validator for `soort`. `overig` accepts anything.
pub fn validate_object_id(
  soort: CodeSoortObjectId,
  value: &str,
) -> Result<(), FormatError> {
  match soort {
    CodeSoortObjectId::Bsn => validate_bsn(value),
    CodeSoortObjectId::Rsin => validate_rsin(value),
    CodeSoortObjectId::KvkNummer => validate_kvk_nummer(value),
    CodeSoortObjectId::Vestigingsnummer => validate_vestigingsnummer(value),
    CodeSoortObjectId::Overig => Ok(()),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn known_good_bsns_pass() {
    for bsn in ["296648875", "123456782", "111222333", "999990019"] {
      assert_eq!(validate_bsn(bsn), Ok(()), "{bsn}");
    }
  }

  #[test]
  fn single_digit_change_breaks_the_checksum() {
    // Any one-digit change to a valid number shifts the weighted sum by a
    // value that is never a multiple of 11.
    let valid = "296648875";
    for pos in 0..valid.len() {
      let original = valid.as_bytes()[pos];
      for replacement in b'0'..=b'9' {
        if replacement == original {
          continue;
        }
        let mut bytes = valid.as_bytes().to_vec();
        bytes[pos] = replacement;
        let mutated = String::from_utf8(bytes).unwrap();
        assert_eq!(
          validate_bsn(&mutated),
          Err(FormatError::ElevenProof("BSN")),
          "{mutated}"
        );
      }
    }
  }

  #[test]
  fn bsn_length_is_checked_before_digits() {
    assert_eq!(validate_bsn("12"), Err(FormatError::Length(9)));
    assert_eq!(
      validate_bsn("12").unwrap_err().to_string(),
      "Waarde moet 9 tekens lang zijn"
    );
    assert_eq!(validate_bsn("12345678a"), Err(FormatError::NotNumeric));
  }

  #[test]
  fn rsin_uses_the_same_checksum() {
    assert_eq!(validate_rsin("296648875"), Ok(()));
    assert_eq!(
      validate_rsin("296648876").unwrap_err().to_string(),
      "Onjuist RSIN nummer"
    );
  }

  #[test]
  fn kvk_and_vestigingsnummer_are_fixed_length_digits() {
    assert_eq!(validate_kvk_nummer("12345678"), Ok(()));
    assert_eq!(validate_kvk_nummer("1234567"), Err(FormatError::Length(8)));
    assert_eq!(validate_kvk_nummer("1234567x"), Err(FormatError::NotNumeric));

    assert_eq!(validate_vestigingsnummer("296648875154"), Ok(()));
    assert_eq!(
      validate_vestigingsnummer("29664887515"),
      Err(FormatError::Length(12))
    );
  }

  #[test]
  fn overig_skips_validation() {
    assert_eq!(validate_object_id(CodeSoortObjectId::Overig, ""), Ok(()));
    assert_eq!(
      validate_object_id(CodeSoortObjectId::Overig, "anything at all"),
      Ok(())
    );
  }
}
