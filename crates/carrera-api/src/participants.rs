//! Handlers for `/participants` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/participants` | Optional `limit`, `offset`, `search`; newest first |
//! | `GET`  | `/participants/lookup` | `?by=number\|phone&value=...`; 404 if not found |

use axum::{
  Json,
  extract::{Query, State, rejection::QueryRejection},
};
use carrera_core::{
  participant::{Participant, format_bib_number},
  store::{ParticipantQuery, ParticipantStore},
};
use serde::{Deserialize, Serialize};

use crate::{ApiState, error::ApiError, parse_bib_number};

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  pub limit:  Option<usize>,
  pub offset: Option<usize>,
  /// Substring of the name, phone or bib number.
  pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ListBody {
  pub participants: Vec<Participant>,
  pub total:        u64,
  /// The limit actually applied, after clamping.
  pub limit:        usize,
  pub offset:       usize,
}

/// `GET /participants[?limit=...][&offset=...][&search=...]`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<ListBody>, ApiError>
where
  S: ParticipantStore + 'static,
{
  let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;
  let options = &state.options;

  let query = ParticipantQuery {
    search: params.search,
    limit:  params
      .limit
      .unwrap_or(options.default_page_size)
      .min(options.max_page_size),
    offset: params.offset.unwrap_or(0),
  };

  let page = state
    .registrar
    .store()
    .list(&query)
    .await
    .map_err(ApiError::store)?;

  Ok(Json(ListBody {
    participants: page.participants,
    total:        page.total,
    limit:        query.limit,
    offset:       query.offset,
  }))
}

// ─── Lookup ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupBy {
  Number,
  Phone,
}

#[derive(Debug, Deserialize)]
pub struct LookupParams {
  pub by:    LookupBy,
  pub value: String,
}

/// `GET /participants/lookup?by=number|phone&value=...`
pub async fn lookup<S>(
  State(state): State<ApiState<S>>,
  params: Result<Query<LookupParams>, QueryRejection>,
) -> Result<Json<Participant>, ApiError>
where
  S: ParticipantStore + 'static,
{
  let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;
  let value = params.value.trim();
  if value.is_empty() {
    return Err(ApiError::BadRequest(
      "Tipo de búsqueda y valor son requeridos".to_owned(),
    ));
  }

  let store = state.registrar.store();
  let found = match params.by {
    LookupBy::Number => {
      let bib = format_bib_number(parse_bib_number(value)?);
      store.find_by_assigned_number(&bib).await
    }
    LookupBy::Phone => store.find_participant_by_phone(value).await,
  }
  .map_err(ApiError::store)?;

  found
    .map(Json)
    .ok_or_else(|| ApiError::NotFound("Participante no encontrado".to_owned()))
}
