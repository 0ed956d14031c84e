//! Registration rules that vary by deployment: the participant ceiling, the
//! minimum phone length and which professional sectors are accepted.

/// The professional sectors offered by the registration form.
pub const DEFAULT_SECTORS: [&str; 12] = [
  "Medicina General",
  "Enfermería",
  "Odontología",
  "Fisioterapia",
  "Psicología",
  "Nutrición",
  "Farmacia",
  "Medicina Especializada",
  "Técnico en Salud",
  "Administración en Salud",
  "Otro sector de salud",
  "Área diferente a la salud",
];

pub const DEFAULT_CAPACITY: u32 = 2000;
pub const DEFAULT_MIN_PHONE_LEN: usize = 10;

/// Which sector values a registration may carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectorPolicy {
  /// Any non-empty value.
  Open,
  /// Exactly one of the listed values.
  OneOf(Vec<String>),
}

impl SectorPolicy {
  /// The enumerated policy over [`DEFAULT_SECTORS`].
  pub fn health_sectors() -> Self {
    Self::OneOf(DEFAULT_SECTORS.iter().map(|s| (*s).to_owned()).collect())
  }

  /// `sector` must already be trimmed.
  pub fn accepts(&self, sector: &str) -> bool {
    match self {
      Self::Open => !sector.is_empty(),
      Self::OneOf(values) => values.iter().any(|v| v == sector),
    }
  }

  /// The enumerated values; empty for [`SectorPolicy::Open`].
  pub fn values(&self) -> &[String] {
    match self {
      Self::Open => &[],
      Self::OneOf(values) => values,
    }
  }
}

impl Default for SectorPolicy {
  fn default() -> Self { Self::health_sectors() }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationPolicy {
  /// Maximum number of participants; ids never exceed it.
  pub capacity:      u32,
  pub min_phone_len: usize,
  pub sectors:       SectorPolicy,
}

impl Default for RegistrationPolicy {
  fn default() -> Self {
    Self {
      capacity:      DEFAULT_CAPACITY,
      min_phone_len: DEFAULT_MIN_PHONE_LEN,
      sectors:       SectorPolicy::default(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn enumerated_policy_rejects_unknown_sector() {
    let policy = SectorPolicy::health_sectors();
    assert_eq!(policy.values().len(), 12);
    assert!(policy.accepts("Enfermería"));
    assert!(!policy.accepts("Ingeniería"));
  }

  #[test]
  fn open_policy_accepts_anything_non_empty() {
    let policy = SectorPolicy::Open;
    assert!(policy.accepts("Ingeniería"));
    assert!(!policy.accepts(""));
    assert!(policy.values().is_empty());
  }
}
