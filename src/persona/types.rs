//! Core types for the persona system.
//!
//! A persona is a named behavioral and styling profile applied to
//! coach-generated text and to the client UI theme. The set of personas is
//! closed and ships with the binary.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────
// Persona Id
// ─────────────────────────────────────────────────────────────────

/// The four coaching personas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PersonaId {
    /// Zen Coach: measured, mindful, process-oriented.
    Calm,
    /// Hype Coach: energetic, competitive, intensity-driven.
    Motivational,
    /// Supportive Coach: warm, validating, self-compassion focused.
    Gentle,
    /// Tactical Coach: direct, data-focused, minimal words.
    Concise,
}

impl PersonaId {
    /// Slug used on the wire, in config files, and CLI args.
    pub fn slug(&self) -> &'static str {
        match self {
            PersonaId::Calm => "calm",
            PersonaId::Motivational => "motivational",
            PersonaId::Gentle => "gentle",
            PersonaId::Concise => "concise",
        }
    }

    /// All persona ids, in presentation order.
    pub fn all() -> &'static [PersonaId] {
        &[
            PersonaId::Calm,
            PersonaId::Motivational,
            PersonaId::Gentle,
            PersonaId::Concise,
        ]
    }
}

impl fmt::Display for PersonaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slug())
    }
}

impl FromStr for PersonaId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "calm" => Ok(PersonaId::Calm),
            "motivational" => Ok(PersonaId::Motivational),
            "gentle" => Ok(PersonaId::Gentle),
            "concise" => Ok(PersonaId::Concise),
            _ => Err(format!(
                "Unknown persona '{}'. Valid: calm, motivational, gentle, concise",
                s
            )),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Persona Config (loaded from bundled TOML)
// ─────────────────────────────────────────────────────────────────

/// Full persona configuration, deserialized from a bundled TOML asset.
///
/// One instance exists per persona id, built once at startup and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaConfig {
    /// Which persona this config defines.
    pub id: PersonaId,

    /// Human-readable label (e.g. "Zen Coach").
    pub display_name: String,

    /// Free-text tone descriptor, consumed only for prompt composition.
    pub tone: String,

    /// Free-text motivation-style descriptor.
    pub motivation_style: String,

    /// Free-text sentence-structure descriptor.
    pub sentence_structure: String,

    /// Preferred terms, in preference order for prompt rendering.
    pub vocabulary: Vec<String>,

    /// Disallowed terms and phrases, in order.
    pub avoid_phrases: Vec<String>,

    /// Emoji usage policy descriptor.
    pub emoji_usage: String,

    /// Response length policy descriptor.
    pub response_length: String,

    /// UI accent color, a `#RRGGBB` token.
    pub accent_color: String,

    /// Path to the persona's avatar asset. Existence is not checked here.
    pub avatar_url: String,

    /// Multi-line block injected verbatim into the downstream LLM system prompt.
    pub system_prompt_addon: String,
}

impl PersonaConfig {
    /// Validate that every field is populated and the accent color is a
    /// `#RRGGBB` token. Partial configs never reach callers.
    pub fn validate(&self) -> Result<(), String> {
        let text_fields = [
            ("display_name", &self.display_name),
            ("tone", &self.tone),
            ("motivation_style", &self.motivation_style),
            ("sentence_structure", &self.sentence_structure),
            ("emoji_usage", &self.emoji_usage),
            ("response_length", &self.response_length),
            ("avatar_url", &self.avatar_url),
            ("system_prompt_addon", &self.system_prompt_addon),
        ];
        for (name, value) in text_fields {
            if value.trim().is_empty() {
                return Err(format!("persona '{}': field '{}' is empty", self.id, name));
            }
        }
        if self.vocabulary.is_empty() {
            return Err(format!("persona '{}': vocabulary is empty", self.id));
        }
        if self.avoid_phrases.is_empty() {
            return Err(format!("persona '{}': avoid_phrases is empty", self.id));
        }
        if !is_color_token(&self.accent_color) {
            return Err(format!(
                "persona '{}': accent_color '{}' is not a #RRGGBB token",
                self.id, self.accent_color
            ));
        }
        Ok(())
    }

    /// Project the UI-facing subset of this config.
    pub fn ui_theme(&self) -> UiTheme {
        UiTheme {
            accent_color: self.accent_color.clone(),
            avatar_url: self.avatar_url.clone(),
            display_name: self.display_name.clone(),
        }
    }
}

/// Check for a `#RRGGBB` hex color token.
fn is_color_token(s: &str) -> bool {
    let Some(hex) = s.strip_prefix('#') else {
        return false;
    };
    hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit())
}

// ─────────────────────────────────────────────────────────────────
// UI Theme Projection
// ─────────────────────────────────────────────────────────────────

/// The subset of persona fields presentation layers need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiTheme {
    pub accent_color: String,
    pub avatar_url: String,
    pub display_name: String,
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
