//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use carrera_core::RegistrationError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// An error returned by an API handler. The body is always
/// `{"detail": "<message>"}`.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  BadRequest(String),

  #[error(transparent)]
  Registration(#[from] RegistrationError),

  #[error("No se pudo generar la imagen: {0}")]
  Render(String),

  #[error("Error de base de datos: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub(crate) fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }

  fn status(&self) -> StatusCode {
    match self {
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Registration(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
      ApiError::Registration(_) | ApiError::Render(_) | ApiError::Store(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      error!(error = %self, "request failed");
    }
    (status, Json(json!({ "detail": self.to_string() }))).into_response()
  }
}
