//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with a fixed number of fractional
//! digits, so ordering by the column is chronological.

use std::str::FromStr;

use carrera_core::participant::{Participant, Sex};
use chrono::{DateTime, SecondsFormat, Utc};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Sex ─────────────────────────────────────────────────────────────────────

pub fn decode_sex(s: &str) -> Result<Sex> {
  Sex::from_str(s).map_err(|_| Error::UnknownSex(s.to_owned()))
}

// ─── Search ──────────────────────────────────────────────────────────────────

/// Turn free text into a lowercased `LIKE` pattern, escaping the wildcard
/// characters with `\`. Compared against `fold_case(column)`.
pub fn like_pattern(text: &str) -> String {
  let mut out = String::with_capacity(text.len() + 2);
  out.push('%');
  for c in text.to_lowercase().chars() {
    if matches!(c, '%' | '_' | '\\') {
      out.push('\\');
    }
    out.push(c);
  }
  out.push('%');
  out
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawParticipant::from_row`].
pub const PARTICIPANT_COLUMNS: &str =
  "id, name, sex, phone, sector, registered_at, assigned_number";

/// Raw values read directly from a `participants` row.
pub struct RawParticipant {
  pub id:              u32,
  pub name:            String,
  pub sex:             String,
  pub phone:           String,
  pub sector:          String,
  pub registered_at:   String,
  pub assigned_number: String,
}

impl RawParticipant {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:              row.get(0)?,
      name:            row.get(1)?,
      sex:             row.get(2)?,
      phone:           row.get(3)?,
      sector:          row.get(4)?,
      registered_at:   row.get(5)?,
      assigned_number: row.get(6)?,
    })
  }

  pub fn into_participant(self) -> Result<Participant> {
    Ok(Participant {
      id:              self.id,
      name:            self.name,
      sex:             decode_sex(&self.sex)?,
      phone:           self.phone,
      sector:          self.sector,
      registered_at:   decode_dt(&self.registered_at)?,
      assigned_number: self.assigned_number,
    })
  }
}
