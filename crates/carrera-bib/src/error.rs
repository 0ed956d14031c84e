//! Error type for `carrera-bib`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("image encoding failed: {0}")]
  Encode(#[from] image::ImageError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
