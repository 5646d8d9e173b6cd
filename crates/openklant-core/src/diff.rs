//! Reconciliation planning: submitted identifier list → update / create /
//! delete sets.
//!
//! Pure; nothing here touches storage. The [`IdentifierReconciler`] validates
//! and applies the plan.
//!
//! [`IdentifierReconciler`]: crate::reconciler::IdentifierReconciler

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::{
  identificator::{IdentificatorInput, PartijIdentificator},
  validation::{FieldError, ValidationErrors, field},
};

pub const DUPLICATE_UUID_MESSAGE: &str =
  "Een PartijIdentificator mag maar één keer in de lijst voorkomen.";

/// The result of planning a submitted list against the currently owned set.
///
/// Every entry keeps the index it had in the submitted list so errors can be
/// reported as `partijIdentificatoren.<i>.<field>`.
#[derive(Debug, Default)]
pub struct ReconcilePlan {
  /// Entries carrying a uuid; applied as in-place updates.
  pub updates:   Vec<(usize, Uuid, IdentificatorInput)>,
  /// Entries without a uuid; created as new records.
  pub creates:   Vec<(usize, IdentificatorInput)>,
  /// Currently owned records the submitted list no longer mentions.
  pub deletions: Vec<Uuid>,
  /// Problems with the list itself (repeated uuids).
  pub errors:    ValidationErrors,
}

/// The error prefix for the entry at `index`.
pub fn entry_prefix(index: usize) -> String {
  format!("{}.{index}", field::PARTIJ_IDENTIFICATOREN)
}

/// Partition `submitted` into updates and creates, and find the owned records
/// to delete.
///
/// A uuid repeated with identical content collapses into its first
/// occurrence; repeated with different content it is an error on the later
/// entry.
pub fn plan(
  current: &[PartijIdentificator],
  submitted: Vec<IdentificatorInput>,
) -> ReconcilePlan {
  let mut plan = ReconcilePlan::default();
  let mut seen: HashMap<Uuid, usize> = HashMap::new();

  for (index, input) in submitted.into_iter().enumerate() {
    let Some(uuid) = input.uuid else {
      plan.creates.push((index, input));
      continue;
    };

    match seen.get(&uuid) {
      Some(&at) => {
        let (_, _, first) = &plan.updates[at];
        if *first != input {
          plan.errors.push(
            FieldError::invalid(field::UUID, DUPLICATE_UUID_MESSAGE)
              .prefixed(&entry_prefix(index)),
          );
        }
      }
      None => {
        seen.insert(uuid, plan.updates.len());
        plan.updates.push((index, uuid, input));
      }
    }
  }

  let kept: HashSet<Uuid> = seen.into_keys().collect();
  plan.deletions = current
    .iter()
    .filter(|record| !kept.contains(&record.uuid))
    .map(|record| record.uuid)
    .collect();

  plan
}
