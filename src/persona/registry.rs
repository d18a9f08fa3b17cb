//! Bundled persona registry.
//!
//! The registry owns the closed set of persona configurations. Configs ship
//! as TOML assets embedded in the binary, are parsed once at startup, and
//! are read-only afterwards, so the registry is safe to share across request
//! handlers without synchronization.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{Error, Result};

use super::types::{PersonaConfig, PersonaId, UiTheme};

/// Registry of persona configurations with a designated default.
#[derive(Debug, Clone)]
pub struct PersonaRegistry {
    personas: HashMap<PersonaId, PersonaConfig>,
    default_id: PersonaId,
}

impl PersonaRegistry {
    /// Get the bundled TOML asset for a persona.
    fn bundled_asset(id: PersonaId) -> &'static str {
        match id {
            PersonaId::Calm => include_str!("../../config/personas/calm.toml"),
            PersonaId::Motivational => include_str!("../../config/personas/motivational.toml"),
            PersonaId::Gentle => include_str!("../../config/personas/gentle.toml"),
            PersonaId::Concise => include_str!("../../config/personas/concise.toml"),
        }
    }

    /// Build the registry from the bundled assets, with `calm` as default.
    ///
    /// Parsing is deterministic: rebuilding yields identical data, so this
    /// is safe to call more than once per process even though one call at
    /// startup is the normal pattern.
    pub fn bundled() -> Result<Self> {
        Self::bundled_with_default(PersonaId::Calm)
    }

    /// Build the registry from the bundled assets with an explicit default.
    pub fn bundled_with_default(default_id: PersonaId) -> Result<Self> {
        let mut personas = HashMap::new();

        for id in PersonaId::all() {
            let asset = Self::bundled_asset(*id);
            let config: PersonaConfig = toml::from_str(asset).map_err(|e| Error::ConfigParse {
                message: format!("bundled persona '{}' is malformed", id),
                source: Some(e),
            })?;

            if config.id != *id {
                return Err(Error::config_validation(format!(
                    "bundled persona asset for '{}' declares id '{}'",
                    id, config.id
                )));
            }
            config
                .validate()
                .map_err(Error::config_validation)?;

            personas.insert(*id, config);
        }

        Ok(Self {
            personas,
            default_id,
        })
    }

    /// The designated default persona id.
    pub fn default_id(&self) -> PersonaId {
        self.default_id
    }

    /// Get a persona config by id. Every id in the closed set is present.
    pub fn get(&self, id: PersonaId) -> &PersonaConfig {
        self.personas
            .get(&id)
            .expect("registry holds every PersonaId variant")
    }

    /// Resolve a raw persona identifier to a config.
    ///
    /// Fallback policy: an unknown, empty, or malformed identifier resolves
    /// to the default persona instead of failing. A bad persona value must
    /// never abort a user-facing interaction.
    pub fn resolve(&self, persona: &str) -> &PersonaConfig {
        match persona.parse::<PersonaId>() {
            Ok(id) => self.get(id),
            Err(_) => {
                debug!(
                    persona = %persona,
                    fallback = %self.default_id,
                    "Unknown persona, using default"
                );
                self.get(self.default_id)
            }
        }
    }

    /// The system-prompt fragment for a persona (with the same fallback).
    pub fn prompt_fragment(&self, persona: &str) -> &str {
        &self.resolve(persona).system_prompt_addon
    }

    /// The UI theme projection for a persona (with the same fallback).
    pub fn ui_theme(&self, persona: &str) -> UiTheme {
        self.resolve(persona).ui_theme()
    }

    /// All persona configs, in presentation order.
    pub fn all(&self) -> impl Iterator<Item = &PersonaConfig> {
        PersonaId::all().iter().map(|id| self.get(*id))
    }

    /// Number of personas in the closed set.
    pub fn count(&self) -> usize {
        self.personas.len()
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_bundled_registry_loads() {
        let registry = PersonaRegistry::bundled().unwrap();
        assert_eq!(registry.count(), 4);
        assert_eq!(registry.default_id(), PersonaId::Calm);
    }

    #[test]
    fn test_resolve_known_ids_roundtrip() {
        let registry = PersonaRegistry::bundled().unwrap();
        for id in PersonaId::all() {
            let config = registry.resolve(id.slug());
            assert_eq!(config.id, *id);
            // No partial configs: validate() checks every field is populated.
            config.validate().unwrap();
        }
    }

    #[test]
    fn test_resolve_unknown_falls_back_to_default() {
        let registry = PersonaRegistry::bundled().unwrap();
        let default = registry.get(registry.default_id());

        assert_eq!(registry.resolve("unknown_xyz"), default);
        assert_eq!(registry.resolve(""), default);
        assert_eq!(registry.resolve("   "), default);
        assert_eq!(registry.resolve("drill-sergeant"), default);
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        let registry = PersonaRegistry::bundled().unwrap();
        assert_eq!(registry.resolve("Motivational").id, PersonaId::Motivational);
    }

    #[test]
    fn test_accent_colors_distinct() {
        let registry = PersonaRegistry::bundled().unwrap();
        let colors: HashSet<&str> = registry
            .all()
            .map(|config| config.accent_color.as_str())
            .collect();
        assert_eq!(colors.len(), registry.count());
    }

    #[test]
    fn test_display_names_match_product_copy() {
        let registry = PersonaRegistry::bundled().unwrap();
        assert_eq!(registry.get(PersonaId::Calm).display_name, "Zen Coach");
        assert_eq!(
            registry.get(PersonaId::Motivational).display_name,
            "Hype Coach"
        );
        assert_eq!(
            registry.get(PersonaId::Gentle).display_name,
            "Supportive Coach"
        );
        assert_eq!(
            registry.get(PersonaId::Concise).display_name,
            "Tactical Coach"
        );
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let first = PersonaRegistry::bundled().unwrap();
        let second = PersonaRegistry::bundled().unwrap();

        for id in PersonaId::all() {
            let a = serde_json::to_string(first.get(*id)).unwrap();
            let b = serde_json::to_string(second.get(*id)).unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_prompt_fragment() {
        let registry = PersonaRegistry::bundled().unwrap();
        let fragment = registry.prompt_fragment("motivational");
        assert!(fragment.contains("Motivational"));
        assert_eq!(
            fragment,
            registry.get(PersonaId::Motivational).system_prompt_addon
        );

        // Fallback applies here too
        assert_eq!(
            registry.prompt_fragment("nope"),
            registry.get(PersonaId::Calm).system_prompt_addon
        );
    }

    #[test]
    fn test_ui_theme() {
        let registry = PersonaRegistry::bundled().unwrap();
        let theme = registry.ui_theme("gentle");
        assert_eq!(theme.display_name, "Supportive Coach");
        assert_eq!(theme.accent_color, "#FFB6C1");
        assert_eq!(theme.avatar_url, "/avatars/gentle-coach.png");
    }

    #[test]
    fn test_custom_default() {
        let registry = PersonaRegistry::bundled_with_default(PersonaId::Concise).unwrap();
        assert_eq!(registry.resolve("bogus").id, PersonaId::Concise);
    }
}
