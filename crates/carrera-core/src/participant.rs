//! Participant types, the single entity of the registration store.
//!
//! A participant is created exactly once by the registration service and is
//! never updated or deleted afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

// ─── Sex ─────────────────────────────────────────────────────────────────────

/// The two values accepted for a participant's sex. The Spanish spelling is
/// the wire and storage form.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  IntoStaticStr,
)]
pub enum Sex {
  #[serde(rename = "Masculino")]
  #[strum(serialize = "Masculino")]
  Male,
  #[serde(rename = "Femenino")]
  #[strum(serialize = "Femenino")]
  Female,
}

impl Sex {
  pub fn as_str(self) -> &'static str { self.into() }
}

// ─── Bib numbers ─────────────────────────────────────────────────────────────

/// Format a participant id as its four-digit bib number (`7` → `"0007"`).
pub fn format_bib_number(id: u32) -> String { format!("{id:04}") }

// ─── Participant ─────────────────────────────────────────────────────────────

/// A registered participant. Once written, no field is ever updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
  pub id:              u32,
  pub name:            String,
  pub sex:             Sex,
  pub phone:           String,
  pub sector:          String,
  /// Store-assigned timestamp; never changes after creation.
  pub registered_at:   DateTime<Utc>,
  /// `id` zero-padded to four digits.
  pub assigned_number: String,
}

/// Input to [`crate::store::ParticipantStore::insert`].
///
/// The id and bib number are computed by the registration service;
/// `registered_at` is always set by the store.
#[derive(Debug, Clone)]
pub struct NewParticipant {
  pub id:              u32,
  pub name:            String,
  pub sex:             Sex,
  pub phone:           String,
  pub sector:          String,
  pub assigned_number: String,
}

impl NewParticipant {
  /// Build a row for `id`, deriving the bib number from it.
  pub fn new(
    id: u32,
    name: impl Into<String>,
    sex: Sex,
    phone: impl Into<String>,
    sector: impl Into<String>,
  ) -> Self {
    Self {
      id,
      name: name.into(),
      sex,
      phone: phone.into(),
      sector: sector.into(),
      assigned_number: format_bib_number(id),
    }
  }
}

#[cfg(test)]
mod tests {
  use std::str::FromStr;

  use super::*;

  #[test]
  fn bib_numbers_are_zero_padded() {
    assert_eq!(format_bib_number(1), "0001");
    assert_eq!(format_bib_number(42), "0042");
    assert_eq!(format_bib_number(2000), "2000");
  }

  #[test]
  fn sex_uses_spanish_spelling() {
    assert_eq!(Sex::from_str("Femenino").unwrap(), Sex::Female);
    assert_eq!(Sex::Male.as_str(), "Masculino");
    assert!(Sex::from_str("femenino").is_err());
    assert_eq!(serde_json::to_string(&Sex::Female).unwrap(), "\"Femenino\"");
  }
}
