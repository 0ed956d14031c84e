//! Handler for `POST /registration`.

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
};
use carrera_core::{registration::RegistrationInput, store::ParticipantStore};
use serde::{Deserialize, Serialize};

use crate::{ApiState, error::ApiError};

/// JSON body accepted by `POST /registration`.
///
/// The Spanish field names used by the original registration form are
/// accepted as aliases. Missing fields deserialize as empty and are reported
/// by validation.
#[derive(Debug, Deserialize)]
pub struct RegistrationBody {
  #[serde(default, alias = "nombre")]
  pub name:   String,
  #[serde(default, alias = "sexo")]
  pub sex:    String,
  #[serde(default, alias = "telefono")]
  pub phone:  String,
  #[serde(default, alias = "sector_profesional")]
  pub sector: String,
}

impl From<RegistrationBody> for RegistrationInput {
  fn from(b: RegistrationBody) -> Self {
    RegistrationInput {
      name:   b.name,
      sex:    b.sex,
      phone:  b.phone,
      sector: b.sector,
    }
  }
}

#[derive(Debug, Serialize)]
pub struct RegistrationResponse {
  pub id:              u32,
  pub assigned_number: String,
  pub message:         String,
  pub image_url:       String,
}

/// `POST /registration`: returns the new participant's id, bib number and
/// where to download the bib image.
pub async fn register<S>(
  State(state): State<ApiState<S>>,
  body: Result<Json<RegistrationBody>, JsonRejection>,
) -> Result<Json<RegistrationResponse>, ApiError>
where
  S: ParticipantStore + 'static,
{
  let Json(body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

  let registration = state.registrar.register(body.into()).await?;
  let image_url = format!(
    "{}/{}",
    state.options.image_base_path.trim_end_matches('/'),
    registration.image_ref()
  );

  Ok(Json(RegistrationResponse {
    id: registration.participant.id,
    assigned_number: registration.participant.assigned_number,
    message: registration.message,
    image_url,
  }))
}
