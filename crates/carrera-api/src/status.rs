//! Handlers for `/health`, `/status` and `/sectors`.

use axum::{Json, extract::State};
use carrera_core::store::ParticipantStore;
use serde::Serialize;
use serde_json::{Value, json};

use crate::{ApiState, error::ApiError};

#[derive(Debug, Serialize)]
pub struct StatusBody {
  pub total:        u64,
  pub max:          u32,
  #[serde(rename = "canRegister")]
  pub can_register: bool,
}

/// `GET /status`: how many have registered and whether there is room left.
pub async fn status<S>(
  State(state): State<ApiState<S>>,
) -> Result<Json<StatusBody>, ApiError>
where
  S: ParticipantStore + 'static,
{
  let status = state.registrar.status().await?;
  Ok(Json(StatusBody {
    total:        status.total,
    max:          status.max,
    can_register: status.can_register,
  }))
}

/// `GET /sectors`: the accepted professional sectors, in form order.
pub async fn sectors<S>(State(state): State<ApiState<S>>) -> Json<Vec<String>>
where
  S: ParticipantStore + 'static,
{
  Json(state.registrar.sectors().to_vec())
}

/// `GET /health`: liveness plus a database round-trip.
pub async fn health<S>(State(state): State<ApiState<S>>) -> Result<Json<Value>, ApiError>
where
  S: ParticipantStore + 'static,
{
  state
    .registrar
    .store()
    .ping()
    .await
    .map_err(ApiError::store)?;
  Ok(Json(json!({ "status": "ok", "database": "ok" })))
}
