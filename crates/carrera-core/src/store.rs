//! The `ParticipantStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `carrera-store-sqlite`).
//! Higher layers (`carrera-api`, the registration service) depend on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use crate::participant::{NewParticipant, Participant};

// ─── Query types ─────────────────────────────────────────────────────────────

/// Parameters for [`ParticipantStore::list`].
#[derive(Debug, Clone, Default)]
pub struct ParticipantQuery {
  /// Case-insensitive substring matched against name, phone and bib number.
  pub search: Option<String>,
  pub limit:  usize,
  pub offset: usize,
}

/// One page of participants, newest registration first.
#[derive(Debug, Clone)]
pub struct ParticipantPage {
  pub participants: Vec<Participant>,
  /// Number of participants matching the query, ignoring pagination.
  pub total:        u64,
}

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Backend errors must say whether the database rejected a write on a
/// uniqueness or key constraint.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  fn is_constraint_violation(&self) -> bool;
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a participant store backend.
///
/// The store is append-only: there is no update or delete.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait ParticipantStore: Send + Sync {
  type Error: StoreError;

  /// Total number of stored participants.
  fn count(&self) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// One more than the current maximum id, or 1 if the store is empty.
  fn next_id(&self) -> impl Future<Output = Result<u32, Self::Error>> + Send + '_;

  /// Name of the participant registered with `phone`, if any.
  fn find_by_phone<'a>(
    &'a self,
    phone: &'a str,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + 'a;

  /// The full participant registered with `phone`, if any.
  fn find_participant_by_phone<'a>(
    &'a self,
    phone: &'a str,
  ) -> impl Future<Output = Result<Option<Participant>, Self::Error>> + Send + 'a;

  /// Look up a participant by four-digit bib number.
  fn find_by_assigned_number<'a>(
    &'a self,
    number: &'a str,
  ) -> impl Future<Output = Result<Option<Participant>, Self::Error>> + Send + 'a;

  /// Persist a fully-formed participant row. The `registered_at` timestamp is
  /// set by the store.
  ///
  /// Fails with a constraint violation if the id, phone or bib number is
  /// already taken. A failed insert writes nothing.
  fn insert(
    &self,
    participant: NewParticipant,
  ) -> impl Future<Output = Result<Participant, Self::Error>> + Send + '_;

  /// A newest-first page of participants plus the matching total.
  fn list<'a>(
    &'a self,
    query: &'a ParticipantQuery,
  ) -> impl Future<Output = Result<ParticipantPage, Self::Error>> + Send + 'a;

  /// Round-trip the backend; used by health checks.
  fn ping(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
