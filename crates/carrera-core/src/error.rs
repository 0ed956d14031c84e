//! Error types for `carrera-core`.
//!
//! The `Display` strings are user-facing; the HTTP layer returns them verbatim.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistrationError {
  /// Malformed, missing or out-of-enum input.
  #[error("{0}")]
  Validation(String),

  /// The registration ceiling has been reached.
  #[error("Se ha alcanzado el límite máximo de {capacity} registros")]
  Capacity { capacity: u32 },

  #[error("Ya existe un registro con este número de teléfono: {existing_name}")]
  DuplicatePhone { existing_name: String },

  /// The store failed underneath us. Nothing was written.
  #[error("Error en el registro: {0}")]
  Persistence(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl RegistrationError {
  pub(crate) fn persistence<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Persistence(Box::new(e))
  }

  /// Whether the caller, rather than the server, is at fault.
  pub fn is_client_error(&self) -> bool {
    !matches!(self, Self::Persistence(_))
  }
}

pub type Result<T, E = RegistrationError> = std::result::Result<T, E>;
