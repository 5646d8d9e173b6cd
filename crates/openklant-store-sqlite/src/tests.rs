//! Integration tests for `SqliteStore` against an in-memory database.

use openklant_core::{
  Error as CoreError,
  identificator::{
    CodeObjecttype, CodeRegister, CodeSoortObjectId, IdentificatorGegevens,
    IdentificatorInput, UuidRef,
  },
  partij::{
    Contactpersoon, NewPartij, Organisatie, PartijIdentificatie, PartijUpdate,
    PartijView, SoortPartij,
  },
  reconciler::ValidationPolicy,
  store::{IdentificatorQuery, PartijQuery, PartijStore},
  validation::{ErrorCode, field},
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn bsn(object_id: &str) -> IdentificatorGegevens {
  IdentificatorGegevens::new(
    CodeObjecttype::NatuurlijkPersoon,
    CodeSoortObjectId::Bsn,
    object_id,
    CodeRegister::Brp,
  )
}

fn kvk(object_id: &str) -> IdentificatorGegevens {
  IdentificatorGegevens::new(
    CodeObjecttype::NietNatuurlijkPersoon,
    CodeSoortObjectId::KvkNummer,
    object_id,
    CodeRegister::Hr,
  )
}

fn vestiging(object_id: &str) -> IdentificatorGegevens {
  IdentificatorGegevens::new(
    CodeObjecttype::Vestiging,
    CodeSoortObjectId::Vestigingsnummer,
    object_id,
    CodeRegister::Hr,
  )
}

fn persoon() -> NewPartij { NewPartij::new(PartijIdentificatie::empty(SoortPartij::Persoon)) }

fn organisatie(naam: &str) -> NewPartij {
  NewPartij::new(PartijIdentificatie::Organisatie(Organisatie {
    naam: naam.to_string(),
  }))
}

/// The validation failures inside `err` as `(field, code)` pairs.
fn failures(err: Error) -> Vec<(String, ErrorCode)> {
  match err {
    Error::Core(CoreError::Validation(errors)) => {
      errors.into_iter().map(|e| (e.name, e.code)).collect()
    }
    other => panic!("expected validation error, got {other:?}"),
  }
}

/// A Partij owning a KvK-nummer with a vestigingsnummer beneath it.
async fn organisatie_with_vestiging(s: &SqliteStore) -> PartijView {
  let created = s.create_partij(organisatie("Acme")).await.unwrap();
  let kvk_record = s
    .create_identificator(
      IdentificatorInput::new(kvk("12345678")).with_partij(Some(created.partij.uuid)),
    )
    .await
    .unwrap();
  s.create_identificator(
    IdentificatorInput::new(vestiging("123456789012"))
      .with_partij(Some(created.partij.uuid))
      .with_sub_identificator_van(Some(kvk_record.uuid)),
  )
  .await
  .unwrap();
  s.get_partij(created.partij.uuid).await.unwrap().unwrap()
}

// ─── Partijen ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_partij_with_identificator() {
  let s = store().await;
  let new = persoon()
    .with_identificatoren(vec![IdentificatorInput::new(bsn("296648875"))]);

  let view = s.create_partij(new).await.unwrap();
  assert_eq!(view.partij.nummer, "0000000001");
  assert_eq!(view.identificatoren.len(), 1);
  assert_eq!(view.identificatoren[0].partij, Some(view.partij.uuid));

  let fetched = s.get_partij(view.partij.uuid).await.unwrap().unwrap();
  assert_eq!(fetched, view);
}

#[tokio::test]
async fn get_partij_missing_returns_none() {
  let s = store().await;
  assert!(s.get_partij(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn nummer_is_assigned_after_the_highest() {
  let s = store().await;
  let mut explicit = persoon();
  explicit.nummer = Some("0000000041".into());
  s.create_partij(explicit).await.unwrap();

  let next = s.create_partij(persoon()).await.unwrap();
  assert_eq!(next.partij.nummer, "0000000042");
}

#[tokio::test]
async fn duplicate_nummer_is_rejected() {
  let s = store().await;
  let mut first = persoon();
  first.nummer = Some("7".into());
  s.create_partij(first.clone()).await.unwrap();

  let err = s.create_partij(first).await.unwrap_err();
  assert_eq!(failures(err), vec![(field::NUMMER.to_string(), ErrorCode::Unique)]);
}

#[tokio::test]
async fn nummer_exhaustion_is_reported() {
  let s = store().await;
  let mut last = persoon();
  last.nummer = Some("9999999999".into());
  s.create_partij(last).await.unwrap();

  let err = s.create_partij(persoon()).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::NummerExhausted)));
}

#[tokio::test]
async fn failed_create_leaves_no_partij_behind() {
  let s = store().await;
  let new = persoon()
    .with_identificatoren(vec![IdentificatorInput::new(bsn("123456789"))]);

  let err = s.create_partij(new).await.unwrap_err();
  assert_eq!(failures(err), vec![(
    "partijIdentificatoren.0.partijIdentificatorObjectId".to_string(),
    ErrorCode::Invalid,
  )]);
  assert!(s.list_partijen(PartijQuery::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn contactpersoon_must_work_for_an_organisatie() {
  let s = store().await;
  let person = s.create_partij(persoon()).await.unwrap();
  let org = s.create_partij(organisatie("Acme")).await.unwrap();

  let contact = |uuid| {
    NewPartij::new(PartijIdentificatie::Contactpersoon(Contactpersoon {
      contactnaam:             None,
      werkte_voor_organisatie: Some(UuidRef { uuid }),
    }))
  };

  let err = s.create_partij(contact(person.partij.uuid)).await.unwrap_err();
  assert_eq!(failures(err), vec![(
    "partijIdentificatie.werkteVoorOrganisatie".to_string(),
    ErrorCode::Invalid,
  )]);

  let view = s.create_partij(contact(org.partij.uuid)).await.unwrap();
  assert_eq!(
    view.partij.identificatie.werkte_voor_organisatie(),
    Some(org.partij.uuid)
  );
}

#[tokio::test]
async fn list_partijen_filters() {
  let s = store().await;
  s.create_partij(persoon()).await.unwrap();
  s.create_partij(organisatie("Acme")).await.unwrap();
  let mut inactive = persoon();
  inactive.indicatie_actief = false;
  s.create_partij(inactive).await.unwrap();

  let personen = s
    .list_partijen(PartijQuery {
      soort_partij: Some(SoortPartij::Persoon),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(personen.len(), 2);

  let actief = s
    .list_partijen(PartijQuery {
      soort_partij: Some(SoortPartij::Persoon),
      indicatie_actief: Some(true),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(actief.len(), 1);

  let paged = s
    .list_partijen(PartijQuery {
      limit: Some(1),
      offset: Some(1),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(paged.len(), 1);
  assert_eq!(paged[0].partij.nummer, "0000000002");
}

// ─── Partij updates ──────────────────────────────────────────────────────────

#[tokio::test]
async fn update_without_identificatoren_keeps_them() {
  let s = store().await;
  let view = organisatie_with_vestiging(&s).await;

  let updated = s
    .update_partij(view.partij.uuid, PartijUpdate {
      interne_notitie: Some("bijgewerkt".into()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(updated.partij.interne_notitie, "bijgewerkt");
  assert_eq!(updated.identificatoren, view.identificatoren);
}

#[tokio::test]
async fn resubmitting_is_idempotent() {
  let s = store().await;
  let view = organisatie_with_vestiging(&s).await;

  let submitted = view
    .identificatoren
    .iter()
    .map(|record| {
      IdentificatorInput::new(record.gegevens.clone())
        .with_uuid(record.uuid)
        .with_sub_identificator_van(record.sub_identificator_van)
    })
    .collect();
  let updated = s
    .update_partij(view.partij.uuid, PartijUpdate {
      identificatoren: Some(submitted),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(updated.identificatoren, view.identificatoren);
}

#[tokio::test]
async fn empty_list_with_dependent_is_protected() {
  let s = store().await;
  let view = organisatie_with_vestiging(&s).await;

  let err = s
    .update_partij(view.partij.uuid, PartijUpdate {
      identificatoren: Some(Vec::new()),
      ..Default::default()
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::ProtectedDelete)));

  let after = s.get_partij(view.partij.uuid).await.unwrap().unwrap();
  assert_eq!(after.identificatoren, view.identificatoren);
}

#[tokio::test]
async fn empty_list_clears_independent_identificatoren() {
  let s = store().await;
  let view = s
    .create_partij(
      persoon().with_identificatoren(vec![IdentificatorInput::new(bsn("296648875"))]),
    )
    .await
    .unwrap();

  let updated = s
    .update_partij(view.partij.uuid, PartijUpdate {
      identificatoren: Some(Vec::new()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert!(updated.identificatoren.is_empty());
  let all = s
    .list_identificatoren(IdentificatorQuery::default())
    .await
    .unwrap();
  assert!(all.is_empty());
}

#[tokio::test]
async fn omitting_the_parent_rolls_back_the_whole_update() {
  let s = store().await;
  let view = organisatie_with_vestiging(&s).await;
  let kvk_record = view
    .identificatoren
    .iter()
    .find(|r| r.soort() == CodeSoortObjectId::KvkNummer)
    .unwrap();

  // Dropping the KvK-nummer would orphan the vestigingsnummer.
  let vestiging_record = view
    .identificatoren
    .iter()
    .find(|r| r.soort() == CodeSoortObjectId::Vestigingsnummer)
    .unwrap();
  let err = s
    .update_partij(view.partij.uuid, PartijUpdate {
      interne_notitie: Some("gewijzigd".into()),
      identificatoren: Some(vec![
        IdentificatorInput::new(vestiging_record.gegevens.clone())
          .with_uuid(vestiging_record.uuid)
          .with_sub_identificator_van(Some(kvk_record.uuid)),
      ]),
      ..Default::default()
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::ProtectedDelete)));

  let after = s.get_partij(view.partij.uuid).await.unwrap().unwrap();
  assert_eq!(after, view);
}

#[tokio::test]
async fn invalid_entry_rolls_back_partij_fields() {
  let s = store().await;
  let view = s.create_partij(persoon()).await.unwrap();

  let err = s
    .update_partij(view.partij.uuid, PartijUpdate {
      voorkeurstaal: Some("nld".into()),
      identificatoren: Some(vec![IdentificatorInput::new(vestiging(
        "123456789012",
      ))]),
      ..Default::default()
    })
    .await
    .unwrap_err();
  assert_eq!(failures(err), vec![(
    "partijIdentificatoren.0.subIdentificatorVan".to_string(),
    ErrorCode::Invalid,
  )]);

  let after = s.get_partij(view.partij.uuid).await.unwrap().unwrap();
  assert_eq!(after.partij.voorkeurstaal, "");
  assert!(after.identificatoren.is_empty());
}

#[tokio::test]
async fn update_missing_partij_is_not_found() {
  let s = store().await;
  let uuid = Uuid::new_v4();
  let err = s
    .update_partij(uuid, PartijUpdate::default())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::PartijNotFound(u)) if u == uuid));
}

#[tokio::test]
async fn update_against_a_stale_soort_is_refused() {
  let s = store().await;
  let view = s.create_partij(organisatie("Acme")).await.unwrap();

  let err = s
    .update_partij(view.partij.uuid, PartijUpdate {
      identificatie: Some(PartijIdentificatie::empty(SoortPartij::Persoon)),
      resolved_against: Some(SoortPartij::Persoon),
      ..Default::default()
    })
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Core(CoreError::SoortChanged {
      expected: SoortPartij::Persoon,
      actual: SoortPartij::Organisatie,
      ..
    })
  ));
  let after = s.get_partij(view.partij.uuid).await.unwrap().unwrap();
  assert_eq!(after, view);

  let updated = s
    .update_partij(view.partij.uuid, PartijUpdate {
      interne_notitie: Some("bijgewerkt".into()),
      resolved_against: Some(SoortPartij::Organisatie),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(updated.partij.interne_notitie, "bijgewerkt");
}

// ─── Partij deletion ─────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_partij_cascades_to_identificatoren() {
  let s = store().await;
  let view = s
    .create_partij(
      persoon().with_identificatoren(vec![IdentificatorInput::new(bsn("296648875"))]),
    )
    .await
    .unwrap();

  s.delete_partij(view.partij.uuid).await.unwrap();
  assert!(s.get_partij(view.partij.uuid).await.unwrap().is_none());
  let record = s
    .get_identificator(view.identificatoren[0].uuid)
    .await
    .unwrap();
  assert!(record.is_none());
}

#[tokio::test]
async fn delete_partij_with_dependent_is_protected() {
  let s = store().await;
  let view = organisatie_with_vestiging(&s).await;

  let err = s.delete_partij(view.partij.uuid).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::ProtectedDelete)));
  assert!(s.get_partij(view.partij.uuid).await.unwrap().is_some());
}

// ─── PartijIdentificatoren ───────────────────────────────────────────────────

#[tokio::test]
async fn identificator_round_trips() {
  let s = store().await;
  let partij = s.create_partij(persoon()).await.unwrap();

  let created = s
    .create_identificator(
      IdentificatorInput::new(bsn("296648875"))
        .with_partij(Some(partij.partij.uuid))
        .with_andere_partij_identificator("extern-1"),
    )
    .await
    .unwrap();
  let fetched = s.get_identificator(created.uuid).await.unwrap().unwrap();
  assert_eq!(fetched, created);
  assert_eq!(fetched.andere_partij_identificator, "extern-1");
}

#[tokio::test]
async fn detached_identificator_is_allowed() {
  let s = store().await;
  let created = s
    .create_identificator(IdentificatorInput::new(bsn("296648875")))
    .await
    .unwrap();
  assert_eq!(created.partij, None);
}

#[tokio::test]
async fn same_gegevens_under_different_parent_is_allowed() {
  let s = store().await;
  let first = organisatie_with_vestiging(&s).await;
  let second = s.create_partij(organisatie("Beta")).await.unwrap();
  let other_kvk = s
    .create_identificator(
      IdentificatorInput::new(kvk("87654321")).with_partij(Some(second.partij.uuid)),
    )
    .await
    .unwrap();

  // Identical quadruple, different sub_identificator_van.
  s.create_identificator(
    IdentificatorInput::new(vestiging("123456789012"))
      .with_partij(Some(second.partij.uuid))
      .with_sub_identificator_van(Some(other_kvk.uuid)),
  )
  .await
  .unwrap();

  let kvk_uuid = first
    .identificatoren
    .iter()
    .find(|r| r.soort() == CodeSoortObjectId::KvkNummer)
    .unwrap()
    .uuid;
  let err = s
    .create_identificator(
      IdentificatorInput::new(vestiging("123456789012"))
        .with_sub_identificator_van(Some(kvk_uuid)),
    )
    .await
    .unwrap_err();
  assert_eq!(failures(err), vec![(field::ALL.to_string(), ErrorCode::Invalid)]);
}

#[tokio::test]
async fn second_bsn_for_one_partij_is_rejected() {
  let s = store().await;
  let partij = s.create_partij(persoon()).await.unwrap();
  let uuid = partij.partij.uuid;
  s.create_identificator(IdentificatorInput::new(bsn("296648875")).with_partij(Some(uuid)))
    .await
    .unwrap();

  let err = s
    .create_identificator(
      IdentificatorInput::new(bsn("111222333")).with_partij(Some(uuid)),
    )
    .await
    .unwrap_err();
  assert_eq!(failures(err), vec![(
    field::ALL.to_string(),
    ErrorCode::UniqueTogether,
  )]);
}

#[tokio::test]
async fn update_identificator_merges_fields() {
  let s = store().await;
  let created = s
    .create_identificator(IdentificatorInput::new(bsn("296648875")))
    .await
    .unwrap();

  let updated = s
    .update_identificator(created.uuid, IdentificatorInput {
      andere_partij_identificator: Some("nieuw".into()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(updated.gegevens, created.gegevens);
  assert_eq!(updated.andere_partij_identificator, "nieuw");
}

#[tokio::test]
async fn delete_identificator_with_dependent_is_protected() {
  let s = store().await;
  let view = organisatie_with_vestiging(&s).await;
  let kvk_uuid = view
    .identificatoren
    .iter()
    .find(|r| r.soort() == CodeSoortObjectId::KvkNummer)
    .unwrap()
    .uuid;

  let err = s.delete_identificator(kvk_uuid).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::ProtectedDelete)));

  let missing = Uuid::new_v4();
  let err = s.delete_identificator(missing).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(CoreError::IdentificatorNotFound(u)) if u == missing
  ));
}

#[tokio::test]
async fn list_identificatoren_filters() {
  let s = store().await;
  let view = organisatie_with_vestiging(&s).await;
  s.create_identificator(IdentificatorInput::new(bsn("296648875")))
    .await
    .unwrap();

  let owned = s
    .list_identificatoren(IdentificatorQuery {
      partij: Some(view.partij.uuid),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(owned.len(), 2);

  let by_register = s
    .list_identificatoren(IdentificatorQuery {
      code_register: Some(CodeRegister::Brp),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(by_register.len(), 1);
  assert_eq!(by_register[0].gegevens.object_id, "296648875");

  let by_object_id = s
    .list_identificatoren(IdentificatorQuery {
      code_soort_object_id: Some(CodeSoortObjectId::KvkNummer),
      object_id: Some("12345678".into()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(by_object_id.len(), 1);
}

// ─── Policy ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn default_policy_rejects_parent_on_other_soorten() {
  let s = store().await;
  let kvk_record = s
    .create_identificator(IdentificatorInput::new(kvk("12345678")))
    .await
    .unwrap();

  let err = s
    .create_identificator(
      IdentificatorInput::new(bsn("296648875"))
        .with_sub_identificator_van(Some(kvk_record.uuid)),
    )
    .await
    .unwrap_err();
  assert_eq!(failures(err), vec![(
    field::SUB_IDENTIFICATOR_VAN.to_string(),
    ErrorCode::Invalid,
  )]);

  let lenient = store().await.with_policy(ValidationPolicy::Lenient);
  let kvk_record = lenient
    .create_identificator(IdentificatorInput::new(kvk("12345678")))
    .await
    .unwrap();
  lenient
    .create_identificator(
      IdentificatorInput::new(bsn("296648875"))
        .with_sub_identificator_van(Some(kvk_record.uuid)),
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn persists_across_reopen() {
  let dir = std::env::temp_dir().join(format!("openklant-{}", Uuid::new_v4()));
  std::fs::create_dir_all(&dir).unwrap();
  let path = dir.join("openklant.db");

  let uuid = {
    let s = SqliteStore::open(&path).await.unwrap();
    s.create_partij(persoon()).await.unwrap().partij.uuid
  };
  let s = SqliteStore::open(&path).await.unwrap();
  assert!(s.get_partij(uuid).await.unwrap().is_some());

  std::fs::remove_dir_all(&dir).ok();
}
