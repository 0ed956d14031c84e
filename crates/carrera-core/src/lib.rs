//! Core types and trait definitions for the Carrera del Médico registration
//! backend.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! storage backend implements [`store::ParticipantStore`]; the HTTP layer
//! drives [`registration::Registrar`].

pub mod error;
pub mod participant;
pub mod policy;
pub mod registration;
pub mod store;

pub use error::{RegistrationError, Result};
