//! The registration service: validates sign-ups, enforces the ceiling and
//! assigns sequential bib numbers.
//!
//! Everything that reads the current state of the table and then writes to it
//! (count, duplicate check, `max(id) + 1`, insert) runs under a single-writer
//! lock, so two concurrent registrations can never be handed the same number.
//! The store's uniqueness constraints back this up.

use std::{str::FromStr, sync::Arc};

use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::{
  RegistrationError, Result,
  participant::{NewParticipant, Participant, Sex},
  policy::RegistrationPolicy,
  store::{ParticipantStore, StoreError},
};

// ─── Input / output ──────────────────────────────────────────────────────────

/// A sign-up request as submitted; nothing has been trimmed or checked yet.
#[derive(Debug, Clone, Default)]
pub struct RegistrationInput {
  pub name:   String,
  pub sex:    String,
  pub phone:  String,
  pub sector: String,
}

/// A successful registration.
#[derive(Debug, Clone)]
pub struct Registration {
  pub participant: Participant,
  /// Human-readable confirmation naming the bib number.
  pub message:     String,
}

impl Registration {
  /// Identifier the bib image is fetched by.
  pub fn image_ref(&self) -> &str { &self.participant.assigned_number }
}

/// Snapshot of how full the event is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrationStatus {
  pub total:        u64,
  pub max:          u32,
  pub can_register: bool,
}

/// Input that passed every check that does not need the store.
struct ValidRegistration {
  name:   String,
  sex:    Sex,
  phone:  String,
  sector: String,
}

// ─── Registrar ───────────────────────────────────────────────────────────────

pub struct Registrar<S> {
  store:      Arc<S>,
  policy:     RegistrationPolicy,
  write_lock: Mutex<()>,
}

impl<S: ParticipantStore> Registrar<S> {
  pub fn new(store: Arc<S>, policy: RegistrationPolicy) -> Self {
    Self { store, policy, write_lock: Mutex::new(()) }
  }

  pub fn store(&self) -> &Arc<S> { &self.store }

  pub fn policy(&self) -> &RegistrationPolicy { &self.policy }

  /// Current participant count against the ceiling.
  pub async fn status(&self) -> Result<RegistrationStatus> {
    let total = self
      .store
      .count()
      .await
      .map_err(RegistrationError::persistence)?;
    Ok(RegistrationStatus {
      total,
      max: self.policy.capacity,
      can_register: total < u64::from(self.policy.capacity),
    })
  }

  /// The sector values a registration may use; empty when any is accepted.
  pub fn sectors(&self) -> &[String] { self.policy.sectors.values() }

  /// Validate `input` and persist a new participant with the next bib number.
  pub async fn register(&self, input: RegistrationInput) -> Result<Registration> {
    let valid = self.validate(input).inspect_err(|e| {
      warn!(reason = %e, "registration rejected");
    })?;

    let participant = {
      let _guard = self.write_lock.lock().await;
      self.commit(valid).await?
    };

    info!(
      id = participant.id,
      number = %participant.assigned_number,
      "participant registered"
    );

    let message =
      format!("¡Registro exitoso! Tu número es: {}", participant.assigned_number);
    Ok(Registration { participant, message })
  }

  fn validate(&self, input: RegistrationInput) -> Result<ValidRegistration> {
    let name = input.name.trim();
    let sex = input.sex.trim();
    let phone = input.phone.trim();
    let sector = input.sector.trim();

    if name.is_empty() || sex.is_empty() || phone.is_empty() || sector.is_empty() {
      return Err(RegistrationError::Validation(
        "Todos los campos son obligatorios".to_owned(),
      ));
    }

    let sex = Sex::from_str(sex).map_err(|_| {
      RegistrationError::Validation(
        "Sexo debe ser 'Masculino' o 'Femenino'".to_owned(),
      )
    })?;

    if !self.policy.sectors.accepts(sector) {
      return Err(RegistrationError::Validation(format!(
        "Sector profesional no válido: {sector}"
      )));
    }

    let min = self.policy.min_phone_len;
    if phone.chars().count() < min {
      return Err(RegistrationError::Validation(format!(
        "El número de teléfono debe tener al menos {min} dígitos"
      )));
    }

    Ok(ValidRegistration {
      name: name.to_owned(),
      sex,
      phone: phone.to_owned(),
      sector: sector.to_owned(),
    })
  }

  /// The critical section. Callers must hold `write_lock`.
  async fn commit(&self, valid: ValidRegistration) -> Result<Participant> {
    let capacity = self.policy.capacity;

    let total = self
      .store
      .count()
      .await
      .map_err(RegistrationError::persistence)?;
    if total >= u64::from(capacity) {
      return Err(RegistrationError::Capacity { capacity });
    }

    if let Some(existing_name) = self
      .store
      .find_by_phone(&valid.phone)
      .await
      .map_err(RegistrationError::persistence)?
    {
      return Err(RegistrationError::DuplicatePhone { existing_name });
    }

    let next_id = self
      .store
      .next_id()
      .await
      .map_err(RegistrationError::persistence)?;
    if next_id > capacity {
      return Err(RegistrationError::Capacity { capacity });
    }

    let phone = valid.phone.clone();
    let row = NewParticipant::new(
      next_id,
      valid.name,
      valid.sex,
      valid.phone,
      valid.sector,
    );

    match self.store.insert(row).await {
      Ok(participant) => Ok(participant),
      Err(e) if e.is_constraint_violation() => {
        // Another writer got there first; report it as the duplicate it is
        // when the phone is now taken.
        if let Some(existing_name) = self
          .store
          .find_by_phone(&phone)
          .await
          .map_err(RegistrationError::persistence)?
        {
          return Err(RegistrationError::DuplicatePhone { existing_name });
        }
        error!(error = %e, id = next_id, "insert rejected by constraint");
        Err(RegistrationError::persistence(e))
      }
      Err(e) => {
        error!(error = %e, id = next_id, "insert failed");
        Err(RegistrationError::persistence(e))
      }
    }
  }
}
