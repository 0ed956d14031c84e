//! Integration tests for `SqliteStore` against an in-memory database.

use std::sync::Arc;

use carrera_core::{
  participant::{NewParticipant, Sex},
  policy::RegistrationPolicy,
  registration::{Registrar, RegistrationInput},
  store::{ParticipantQuery, ParticipantStore, StoreError},
  RegistrationError,
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn row(id: u32, name: &str, phone: &str) -> NewParticipant {
  NewParticipant::new(id, name, Sex::Female, phone, "Enfermería")
}

fn page(limit: usize, offset: usize) -> ParticipantQuery {
  ParticipantQuery { search: None, limit, offset }
}

// ─── Counting and numbering ──────────────────────────────────────────────────

#[tokio::test]
async fn empty_store_starts_numbering_at_one() {
  let s = store().await;
  assert_eq!(s.count().await.unwrap(), 0);
  assert_eq!(s.next_id().await.unwrap(), 1);
}

#[tokio::test]
async fn next_id_follows_max_id() {
  let s = store().await;
  s.insert(row(1, "Ana", "5500000001")).await.unwrap();
  s.insert(row(2, "Beto", "5500000002")).await.unwrap();

  assert_eq!(s.count().await.unwrap(), 2);
  assert_eq!(s.next_id().await.unwrap(), 3);
}

// ─── Insert ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_and_find_by_assigned_number() {
  let s = store().await;
  let stored = s.insert(row(1, "Ana Gómez", "5512345678")).await.unwrap();
  assert_eq!(stored.assigned_number, "0001");

  let found = s.find_by_assigned_number("0001").await.unwrap().unwrap();
  assert_eq!(found, stored);
  assert_eq!(found.sex, Sex::Female);
  assert_eq!(found.sector, "Enfermería");

  assert!(s.find_by_assigned_number("0002").await.unwrap().is_none());
}

#[tokio::test]
async fn find_by_phone_returns_name() {
  let s = store().await;
  s.insert(row(1, "Ana Gómez", "5512345678")).await.unwrap();

  assert_eq!(
    s.find_by_phone("5512345678").await.unwrap().as_deref(),
    Some("Ana Gómez")
  );
  assert!(s.find_by_phone("5599999999").await.unwrap().is_none());

  let full = s.find_participant_by_phone("5512345678").await.unwrap().unwrap();
  assert_eq!(full.id, 1);
}

#[tokio::test]
async fn duplicate_phone_is_a_constraint_violation() {
  let s = store().await;
  s.insert(row(1, "Ana", "5512345678")).await.unwrap();

  let err = s.insert(row(2, "Beto", "5512345678")).await.unwrap_err();
  assert!(err.is_constraint_violation(), "{err}");
  assert_eq!(s.count().await.unwrap(), 1);
}

#[tokio::test]
async fn duplicate_id_is_a_constraint_violation() {
  let s = store().await;
  s.insert(row(1, "Ana", "5500000001")).await.unwrap();

  let err = s.insert(row(1, "Beto", "5500000002")).await.unwrap_err();
  assert!(err.is_constraint_violation(), "{err}");
  assert!(s.find_by_phone("5500000002").await.unwrap().is_none());
}

// ─── Listing ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_is_newest_first_with_total() {
  let s = store().await;
  for i in 1..=15 {
    s.insert(row(i, &format!("Corredor {i}"), &format!("55{i:08}")))
      .await
      .unwrap();
  }

  let first = s.list(&page(10, 0)).await.unwrap();
  assert_eq!(first.total, 15);
  assert_eq!(first.participants.len(), 10);
  let ids: Vec<u32> = first.participants.iter().map(|p| p.id).collect();
  assert_eq!(ids, (6..=15).rev().collect::<Vec<_>>());

  let rest = s.list(&page(10, 10)).await.unwrap();
  assert_eq!(rest.total, 15);
  let ids: Vec<u32> = rest.participants.iter().map(|p| p.id).collect();
  assert_eq!(ids, vec![5, 4, 3, 2, 1]);
}

#[tokio::test]
async fn list_search_filters_and_counts_matches() {
  let s = store().await;
  s.insert(row(1, "Ana Gómez", "5500000001")).await.unwrap();
  s.insert(row(2, "Beto Ruiz", "5500000002")).await.unwrap();
  s.insert(row(3, "Mariana López", "5500000003")).await.unwrap();

  let query = ParticipantQuery { search: Some("ana".into()), limit: 10, offset: 0 };
  let found = s.list(&query).await.unwrap();
  assert_eq!(found.total, 2);
  let names: Vec<&str> = found.participants.iter().map(|p| p.name.as_str()).collect();
  assert_eq!(names, vec!["Mariana López", "Ana Gómez"]);

  let by_number = ParticipantQuery { search: Some("0002".into()), limit: 10, offset: 0 };
  let found = s.list(&by_number).await.unwrap();
  assert_eq!(found.total, 1);
  assert_eq!(found.participants[0].name, "Beto Ruiz");

  let wildcard = ParticipantQuery { search: Some("%".into()), limit: 10, offset: 0 };
  assert_eq!(s.list(&wildcard).await.unwrap().total, 0);
}

#[tokio::test]
async fn list_search_ignores_case_of_accented_letters() {
  let s = store().await;
  s.insert(row(1, "Óscar Núñez", "5500000001")).await.unwrap();
  s.insert(row(2, "Ángela Ruiz", "5500000002")).await.unwrap();

  for (term, expected) in [
    ("óscar", "Óscar Núñez"),
    ("ÓSCAR", "Óscar Núñez"),
    ("NÚÑEZ", "Óscar Núñez"),
    ("ángela", "Ángela Ruiz"),
  ] {
    let query = ParticipantQuery { search: Some(term.into()), limit: 10, offset: 0 };
    let found = s.list(&query).await.unwrap();
    assert_eq!(found.total, 1, "search {term:?}");
    assert_eq!(found.participants[0].name, expected);
  }
}

#[tokio::test]
async fn list_search_matches_sector() {
  let s = store().await;
  s.insert(row(1, "Ana Gómez", "5500000001")).await.unwrap();
  s.insert(NewParticipant::new(2, "Beto Ruiz", Sex::Male, "5500000002", "Técnico en Salud"))
    .await
    .unwrap();

  let query = ParticipantQuery { search: Some("TÉCNICO".into()), limit: 10, offset: 0 };
  let found = s.list(&query).await.unwrap();
  assert_eq!(found.total, 1);
  assert_eq!(found.participants[0].name, "Beto Ruiz");

  let query = ParticipantQuery { search: Some("enfermería".into()), limit: 10, offset: 0 };
  assert_eq!(s.list(&query).await.unwrap().total, 1);
}

// ─── On-disk store ───────────────────────────────────────────────────────────

#[tokio::test]
async fn open_creates_parent_directory_and_persists() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("data").join("carrera_medico.db");

  {
    let s = SqliteStore::open(&path).await.unwrap();
    s.insert(row(1, "Ana", "5512345678")).await.unwrap();
  }

  assert!(path.exists());
  let reopened = SqliteStore::open(&path).await.unwrap();
  assert_eq!(reopened.count().await.unwrap(), 1);
  assert_eq!(reopened.next_id().await.unwrap(), 2);
  reopened.ping().await.unwrap();
}

// ─── Registration against SQLite ─────────────────────────────────────────────

fn input(name: &str, phone: &str) -> RegistrationInput {
  RegistrationInput {
    name:   name.into(),
    sex:    "Masculino".into(),
    phone:  phone.into(),
    sector: "Medicina General".into(),
  }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_registrations_get_distinct_numbers() {
  let registrar = Arc::new(Registrar::new(
    Arc::new(store().await),
    RegistrationPolicy::default(),
  ));

  let handles: Vec<_> = (1..=30u32)
    .map(|i| {
      let registrar = Arc::clone(&registrar);
      tokio::spawn(async move {
        registrar
          .register(input(&format!("Corredor {i}"), &format!("55{i:08}")))
          .await
          .map(|r| r.participant.assigned_number)
      })
    })
    .collect();

  let mut numbers = Vec::new();
  for h in handles {
    numbers.push(h.await.unwrap().unwrap());
  }
  numbers.sort();
  let expected: Vec<String> = (1..=30).map(|i| format!("{i:04}")).collect();
  assert_eq!(numbers, expected);
}

#[tokio::test]
async fn registrar_rejects_duplicate_phone_in_sqlite() {
  let registrar = Registrar::new(Arc::new(store().await), RegistrationPolicy::default());
  registrar.register(input("Ana", "5512345678")).await.unwrap();

  let err = registrar.register(input("Beto", "5512345678")).await.unwrap_err();
  assert!(matches!(err, RegistrationError::DuplicatePhone { .. }));
  assert_eq!(registrar.store().count().await.unwrap(), 1);
}
