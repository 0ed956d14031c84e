//! JSON REST API for the Carrera del Médico registration backend.
//!
//! Exposes an axum [`Router`] backed by any
//! [`carrera_core::store::ParticipantStore`]. TLS, CORS and static frontend
//! hosting are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", carrera_api::api_router(state))
//! ```

pub mod error;
pub mod etag;
pub mod images;
pub mod participants;
pub mod registration;
pub mod status;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use carrera_bib::BibRenderer;
use carrera_core::{registration::Registrar, store::ParticipantStore};

pub use error::ApiError;

// ─── Options ─────────────────────────────────────────────────────────────────

/// Knobs for the HTTP surface that are not registration rules.
#[derive(Debug, Clone)]
pub struct ApiOptions {
  /// Page size when `/participants` is called without `limit`.
  pub default_page_size: usize,
  /// Upper bound applied to any requested `limit`.
  pub max_page_size:     usize,
  /// Path prefix of the image endpoint as seen by clients, e.g. `/api/image`.
  pub image_base_path:   String,
}

impl Default for ApiOptions {
  fn default() -> Self {
    Self {
      default_page_size: 100,
      max_page_size:     500,
      image_base_path:   "/api/image".to_owned(),
    }
  }
}

// ─── State ───────────────────────────────────────────────────────────────────

/// Shared state threaded through all API handlers.
pub struct ApiState<S> {
  pub registrar: Arc<Registrar<S>>,
  pub renderer:  Arc<BibRenderer>,
  pub options:   Arc<ApiOptions>,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self {
      registrar: Arc::clone(&self.registrar),
      renderer:  Arc::clone(&self.renderer),
      options:   Arc::clone(&self.options),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: ApiState<S>) -> Router<()>
where
  S: ParticipantStore + 'static,
{
  Router::new()
    .route("/health", get(status::health::<S>))
    .route("/status", get(status::status::<S>))
    .route("/sectors", get(status::sectors::<S>))
    .route("/registration", post(registration::register::<S>))
    .route("/image/{number}", get(images::download::<S>))
    .route("/participants", get(participants::list::<S>))
    .route("/participants/lookup", get(participants::lookup::<S>))
    .with_state(state)
}

/// Parse a bib number from a path or query string.
///
/// Accepts one to four ASCII digits with or without leading zeros
/// (`"7"`, `"0007"`), naming a positive id.
pub fn parse_bib_number(raw: &str) -> Result<u32, ApiError> {
  let invalid = || ApiError::BadRequest(format!("Número de participante inválido: {raw}"));

  if raw.is_empty() || raw.len() > 4 || !raw.bytes().all(|b| b.is_ascii_digit()) {
    return Err(invalid());
  }
  match raw.parse::<u32>() {
    Ok(id) if id > 0 => Ok(id),
    _ => Err(invalid()),
  }
}
