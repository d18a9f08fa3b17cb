//! Persona system: bundled behavioral and styling profiles.
//!
//! Each chat interaction runs under one persona (Zen, Hype, Supportive, or
//! Tactical coach). The persona defines tone rules, vocabulary preferences,
//! the UI theme, and the prompt fragment injected into the downstream
//! language-model call.

pub mod registry;
pub mod types;

pub use registry::PersonaRegistry;
pub use types::{PersonaConfig, PersonaId, UiTheme};
