//! Bib image rendering for registered participants.
//!
//! Rendering is a pure in-memory function of `(id, name)` plus the base image
//! and typeface chosen at startup. Nothing is written to disk.

mod render;
mod text;

pub mod error;

pub use error::{Error, Result};
pub use render::{BibRenderer, RendererConfig, download_filename};
