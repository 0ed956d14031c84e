//! Process wiring for the Carrera del Médico registration server: runtime
//! configuration and assembly of the HTTP application.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::{Context as _, bail};
use axum::Router;
use carrera_api::{ApiOptions, ApiState, api_router};
use carrera_bib::{BibRenderer, RendererConfig};
use carrera_core::{
  policy::{DEFAULT_CAPACITY, DEFAULT_MIN_PHONE_LEN, DEFAULT_SECTORS, RegistrationPolicy, SectorPolicy},
  registration::Registrar,
};
use carrera_store_sqlite::SqliteStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

/// Where the API is mounted.
pub const API_PREFIX: &str = "/api";

/// Highest capacity whose bib numbers still fit in four digits.
const MAX_CAPACITY: u32 = 9999;

// ─── Configuration ────────────────────────────────────────────────────────────

/// How the professional sector of a registration is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectorPolicyKind {
  /// Only the values listed in `sectors`.
  #[default]
  Enumerated,
  /// Any non-empty value.
  Open,
}

/// Runtime server configuration, deserialised from `config.toml` and
/// `CARRERA_*` environment variables. Every field has a default.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:              String,
  pub port:              u16,
  pub store_path:        PathBuf,
  pub template_path:     Option<PathBuf>,
  pub font_path:         Option<PathBuf>,
  pub capacity:          u32,
  pub min_phone_len:     usize,
  pub sector_policy:     SectorPolicyKind,
  pub sectors:           Vec<String>,
  pub default_page_size: usize,
  pub max_page_size:     usize,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:              "0.0.0.0".to_owned(),
      port:              8000,
      store_path:        PathBuf::from("data/carrera_medico.db"),
      template_path:     Some(PathBuf::from("app/carrera_medico_template.png")),
      font_path:         None,
      capacity:          DEFAULT_CAPACITY,
      min_phone_len:     DEFAULT_MIN_PHONE_LEN,
      sector_policy:     SectorPolicyKind::default(),
      sectors:           DEFAULT_SECTORS.iter().map(|s| (*s).to_owned()).collect(),
      default_page_size: 100,
      max_page_size:     500,
    }
  }
}

impl ServerConfig {
  /// Read `path` (optional) layered under `CARRERA_*` environment variables.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("CARRERA"))
      .build()
      .context("failed to read config file")?;

    let cfg: ServerConfig = settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")?;
    cfg.validate()?;
    Ok(cfg)
  }

  pub fn validate(&self) -> anyhow::Result<()> {
    if self.capacity == 0 || self.capacity > MAX_CAPACITY {
      bail!("capacity must be between 1 and {MAX_CAPACITY}, got {}", self.capacity);
    }
    if self.sector_policy == SectorPolicyKind::Enumerated
      && self.sectors.iter().all(|s| s.trim().is_empty())
    {
      bail!("sector_policy = \"enumerated\" needs at least one entry in `sectors`");
    }
    if self.max_page_size == 0 {
      bail!("max_page_size must be positive");
    }
    Ok(())
  }

  /// The store path with a leading `~` expanded.
  pub fn resolved_store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }

  pub fn registration_policy(&self) -> RegistrationPolicy {
    let sectors = match self.sector_policy {
      SectorPolicyKind::Open => SectorPolicy::Open,
      SectorPolicyKind::Enumerated => SectorPolicy::OneOf(
        self
          .sectors
          .iter()
          .map(|s| s.trim())
          .filter(|s| !s.is_empty())
          .map(str::to_owned)
          .collect(),
      ),
    };
    RegistrationPolicy {
      capacity: self.capacity,
      min_phone_len: self.min_phone_len,
      sectors,
    }
  }

  pub fn renderer_config(&self) -> RendererConfig {
    RendererConfig {
      template_path: self.template_path.clone(),
      font_path:     self.font_path.clone(),
    }
  }

  pub fn api_options(&self) -> ApiOptions {
    ApiOptions {
      default_page_size: self.default_page_size,
      max_page_size:     self.max_page_size,
      image_base_path:   format!("{API_PREFIX}/image"),
    }
  }
}

// ─── Application ──────────────────────────────────────────────────────────────

/// Build the full application: the API nested under [`API_PREFIX`] with
/// request tracing.
pub fn app(config: &ServerConfig, store: SqliteStore) -> Router {
  let state = ApiState {
    registrar: Arc::new(Registrar::new(Arc::new(store), config.registration_policy())),
    renderer:  Arc::new(BibRenderer::new(&config.renderer_config())),
    options:   Arc::new(config.api_options()),
  };

  Router::new()
    .nest(API_PREFIX, api_router(state))
    .layer(TraceLayer::new_for_http())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
