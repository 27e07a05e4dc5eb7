//! Core types and service wiring for the ecoleta collection point finder.

/// Configuration file model and loading.
pub mod config;
/// Domain models and identifiers shared by all crates.
pub mod model;
/// Traits describing the backend and location interfaces.
pub mod ports;
/// Headless screen controllers and the effects they emit.
pub mod screen;
/// Task-backed execution of screen effects.
pub mod session;
/// High-level service facade used by clients.
pub mod service;

pub use config::*;
pub use model::*;
pub use ports::*;
pub use screen::*;
pub use session::*;
pub use service::*;
