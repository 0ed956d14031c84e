//! Handler for `GET /image/{number}`.
//!
//! The name printed on the bib always comes from the stored participant, never
//! from the request.

use std::sync::Arc;

use axum::{
  extract::{Path, State},
  http::{HeaderMap, StatusCode, header},
  response::{IntoResponse, Response},
};
use carrera_bib::download_filename;
use carrera_core::{participant::format_bib_number, store::ParticipantStore};

use crate::{
  ApiState,
  error::ApiError,
  etag::{compute_etag, if_none_match},
  parse_bib_number,
};

/// `GET /image/{number}`: the participant's bib as a PNG attachment.
///
/// 400 for a malformed number, 404 if nobody holds it, 304 when the client's
/// `If-None-Match` already matches.
pub async fn download<S>(
  State(state): State<ApiState<S>>,
  Path(number): Path<String>,
  headers: HeaderMap,
) -> Result<Response, ApiError>
where
  S: ParticipantStore + 'static,
{
  let id = parse_bib_number(&number)?;
  let bib = format_bib_number(id);

  let participant = state
    .registrar
    .store()
    .find_by_assigned_number(&bib)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| {
      ApiError::NotFound(format!("No existe un participante con el número {bib}"))
    })?;

  let renderer = Arc::clone(&state.renderer);
  let name = participant.name.clone();
  let png = tokio::task::spawn_blocking(move || renderer.render(id, &name))
    .await
    .map_err(|e| ApiError::Render(e.to_string()))?
    .map_err(|e| ApiError::Render(e.to_string()))?;

  let etag = compute_etag(&png);
  if if_none_match(&headers, &etag) {
    return Ok((StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response());
  }

  let disposition = format!(
    "attachment; filename=\"{}\"",
    download_filename(&bib, &participant.name)
  );

  Ok(
    (
      StatusCode::OK,
      [
        (header::CONTENT_TYPE, "image/png".to_owned()),
        (header::CONTENT_DISPOSITION, disposition),
        (header::ETAG, etag),
      ],
      png,
    )
      .into_response(),
  )
}
