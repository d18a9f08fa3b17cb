//! Configuration system for the coach gateway.
//!
//! Supports multiple configuration sources with the following precedence (highest to lowest):
//! 1. Environment variables (COACH_* prefix)
//! 2. Configuration file (TOML)
//! 3. Default values

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::persona::PersonaId;

/// Main gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Service identity and HTTP listener settings
    pub service: ServiceSettings,

    /// Upstream orchestrator connection settings
    pub orchestrator: OrchestratorSettings,

    /// Persona defaults
    pub personas: PersonaSettings,

    /// Logging configuration
    pub logging: LoggingSettings,
}

/// Service identity and listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Display name reported by the health endpoint
    pub name: String,

    /// Interface to bind
    pub host: String,

    /// Port to bind
    pub port: u16,

    /// Allow any origin (the coaching app runs on a separate origin)
    pub permissive_cors: bool,
}

/// Upstream orchestrator settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorSettings {
    /// Delegate to a remote orchestrator; when false the deterministic
    /// mock serves every request
    pub enabled: bool,

    /// Orchestrator base URL
    pub base_url: String,

    /// Bearer token (empty for unauthenticated deployments)
    pub api_key: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Persona settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonaSettings {
    /// Persona used when a request names none or an unknown one
    pub default_persona: String,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level: trace, debug, info, warn, error
    pub level: String,

    /// Log file path (empty = no file logging)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Maximum log file size in MB before rotation
    pub max_file_size_mb: u64,

    /// Number of rotated log files to keep
    pub max_files: u32,

    /// Enable JSON formatted logging
    pub json_format: bool,
}

// Default implementations

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            service: ServiceSettings::default(),
            orchestrator: OrchestratorSettings::default(),
            personas: PersonaSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "AI Fitness Coach Agent".to_string(),
            host: "0.0.0.0".to_string(),
            port: 8000,
            permissive_cors: true,
        }
    }
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "http://localhost:8100".to_string(),
            api_key: String::new(),
            timeout_secs: 120,
        }
    }
}

impl Default for PersonaSettings {
    fn default() -> Self {
        Self {
            default_persona: "calm".to_string(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            max_file_size_mb: 100,
            max_files: 5,
            json_format: false,
        }
    }
}

impl GatewayConfig {
    /// Load configuration from file with environment variable overrides
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut config = Self::default();

        // 1. Load from config file if it exists
        let config_file = Self::find_config_file(config_path)?;
        if let Some(path) = config_file {
            debug!(path = %path.display(), "Loading configuration file");
            let content = fs::read_to_string(&path)
                .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;
            config = toml::from_str(&content)
                .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))?;
            info!(path = %path.display(), "Configuration loaded from file");
        }

        // 2. Apply environment variable overrides
        config.apply_env_overrides();

        // 3. Expand paths
        config.expand_paths();

        // 4. Validate
        config.validate()?;

        Ok(config)
    }

    /// Find the configuration file to use
    fn find_config_file(explicit_path: Option<&str>) -> Result<Option<PathBuf>> {
        // If explicit path provided, use it (error if not found)
        if let Some(path) = explicit_path {
            let expanded = shellexpand::tilde(path);
            let path = PathBuf::from(expanded.as_ref());
            if path.exists() {
                return Ok(Some(path));
            } else {
                return Err(Error::Config(format!(
                    "Configuration file not found: {}",
                    path.display()
                )));
            }
        }

        // Search in standard locations
        let search_paths = [
            // Current directory
            PathBuf::from("coach-gateway.toml"),
            PathBuf::from("config.toml"),
            // User config directory
            dirs::config_dir()
                .map(|p| p.join("coach").join("gateway.toml"))
                .unwrap_or_default(),
            // Home directory
            dirs::home_dir()
                .map(|p| p.join(".coach").join("gateway.toml"))
                .unwrap_or_default(),
            // System config (Linux)
            PathBuf::from("/etc/coach/gateway.toml"),
        ];

        for path in &search_paths {
            if path.exists() {
                debug!(path = %path.display(), "Found configuration file");
                return Ok(Some(path.clone()));
            }
        }

        debug!("No configuration file found, using defaults");
        Ok(None)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // Service settings
        if let Ok(val) = std::env::var("COACH_SERVICE_NAME") {
            self.service.name = val;
        }
        if let Ok(val) = std::env::var("COACH_HOST") {
            self.service.host = val;
        }
        if let Ok(val) = std::env::var("COACH_PORT") {
            if let Ok(n) = val.parse() {
                self.service.port = n;
            }
        }
        if let Ok(val) = std::env::var("COACH_CORS_PERMISSIVE") {
            self.service.permissive_cors = val.to_lowercase() == "true" || val == "1";
        }

        // Orchestrator settings
        if let Ok(val) = std::env::var("COACH_ORCHESTRATOR_ENABLED") {
            self.orchestrator.enabled = val.to_lowercase() == "true" || val == "1";
        }
        if let Ok(val) = std::env::var("COACH_ORCHESTRATOR_URL") {
            self.orchestrator.base_url = val;
        }
        if let Ok(val) = std::env::var("COACH_ORCHESTRATOR_API_KEY") {
            self.orchestrator.api_key = val;
        }
        if let Ok(val) = std::env::var("COACH_ORCHESTRATOR_TIMEOUT_SECS") {
            if let Ok(n) = val.parse() {
                self.orchestrator.timeout_secs = n;
            }
        }

        // Persona settings
        if let Ok(val) = std::env::var("COACH_DEFAULT_PERSONA") {
            self.personas.default_persona = val;
        }

        // Logging settings
        if let Ok(val) = std::env::var("COACH_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = std::env::var("COACH_LOG_FILE") {
            self.logging.file = Some(val);
        }
        if let Ok(val) = std::env::var("COACH_LOG_JSON") {
            self.logging.json_format = val.to_lowercase() == "true" || val == "1";
        }
    }

    /// Expand ~ in configured paths
    fn expand_paths(&mut self) {
        if let Some(ref file) = self.logging.file {
            self.logging.file = Some(shellexpand::tilde(file).to_string());
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.service.name.trim().is_empty() {
            return Err(Error::config_field_invalid(
                "service.name",
                "service.name must not be empty",
            ));
        }
        if self.service.host.trim().is_empty() {
            return Err(Error::config_field_invalid(
                "service.host",
                "service.host must not be empty",
            ));
        }
        if self.service.port == 0 {
            return Err(Error::config_field_invalid(
                "service.port",
                "service.port must be non-zero",
            ));
        }

        if self.orchestrator.enabled {
            if !self.orchestrator.base_url.starts_with("http://")
                && !self.orchestrator.base_url.starts_with("https://")
            {
                return Err(Error::config_field_invalid(
                    "orchestrator.base_url",
                    format!(
                        "orchestrator.base_url must start with http:// or https://, got '{}'",
                        self.orchestrator.base_url
                    ),
                ));
            }
            if self.orchestrator.timeout_secs == 0 {
                return Err(Error::config_field_invalid(
                    "orchestrator.timeout_secs",
                    "orchestrator.timeout_secs must be non-zero",
                ));
            }
        }

        if self
            .personas
            .default_persona
            .parse::<PersonaId>()
            .is_err()
        {
            return Err(Error::config_field_invalid(
                "personas.default_persona",
                format!(
                    "'{}' is not a known persona (calm, motivational, gentle, concise)",
                    self.personas.default_persona
                ),
            ));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "warning", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(Error::config_field_invalid(
                "logging.level",
                format!(
                    "'{}' is not a valid log level (trace, debug, info, warn, error)",
                    self.logging.level
                ),
            ));
        }

        Ok(())
    }

    /// The socket address string to bind the listener to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.service.host, self.service.port)
    }

    /// The default persona id (validated during load)
    pub fn default_persona(&self) -> PersonaId {
        self.personas
            .default_persona
            .parse()
            .unwrap_or(PersonaId::Calm)
    }
}

/// Initialize a new configuration file with defaults
pub fn init_config(path: Option<&str>, force: bool) -> Result<()> {
    let target = match path {
        Some(p) => PathBuf::from(shellexpand::tilde(p).as_ref()),
        None => dirs::config_dir()
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?
            .join("coach")
            .join("gateway.toml"),
    };

    if target.exists() && !force {
        return Err(Error::Config(format!(
            "Configuration file already exists: {} (use --force to overwrite)",
            target.display()
        )));
    }

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::IoWrite {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    fs::write(&target, default_config_template()).map_err(|e| Error::IoWrite {
        path: target.clone(),
        source: e,
    })?;

    println!("Created configuration file: {}", target.display());
    Ok(())
}

/// The commented template written by `config init`
fn default_config_template() -> String {
    r#"# Coach gateway configuration

[service]
# Display name reported by the health endpoint
name = "AI Fitness Coach Agent"
# Interface and port for the HTTP listener
host = "0.0.0.0"
port = 8000
# Allow any origin (the coaching app runs on a separate origin)
permissive_cors = true

[orchestrator]
# Delegate to a remote orchestrator. When false, a deterministic mock
# serves every request (useful for local development).
enabled = true
# Orchestrator base URL
base_url = "http://localhost:8100"
# Bearer token (leave empty for unauthenticated deployments)
api_key = ""
# Request timeout in seconds
timeout_secs = 120

[personas]
# Persona used when a request names none or an unknown one
default_persona = "calm"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"
# Log file path (comment out for console-only logging)
# file = "~/.coach/logs/gateway.log"
# Maximum log file size in MB before rotation
max_file_size_mb = 100
# Number of rotated log files to keep
max_files = 5
# Enable JSON formatted logging
json_format = false
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_default_config() {
        let config = GatewayConfig::default();
        assert_eq!(config.service.port, 8000);
        assert_eq!(config.service.name, "AI Fitness Coach Agent");
        assert_eq!(config.orchestrator.base_url, "http://localhost:8100");
        assert_eq!(config.personas.default_persona, "calm");
        assert_eq!(config.logging.level, "info");
        assert!(config.service.permissive_cors);
    }

    #[test]
    fn test_env_override() {
        env::set_var("COACH_PORT", "9000");
        env::set_var("COACH_ORCHESTRATOR_URL", "https://agents.example.com");
        env::set_var("COACH_DEFAULT_PERSONA", "gentle");

        let mut config = GatewayConfig::default();
        config.apply_env_overrides();

        assert_eq!(config.service.port, 9000);
        assert_eq!(config.orchestrator.base_url, "https://agents.example.com");
        assert_eq!(config.personas.default_persona, "gentle");

        env::remove_var("COACH_PORT");
        env::remove_var("COACH_ORCHESTRATOR_URL");
        env::remove_var("COACH_DEFAULT_PERSONA");
    }

    #[test]
    fn test_validation_invalid_orchestrator_url() {
        let mut config = GatewayConfig::default();
        config.orchestrator.base_url = "agents.example.com".to_string();
        assert!(config.validate().is_err());

        // A bad URL is fine when the upstream is disabled
        config.orchestrator.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_invalid_port() {
        let mut config = GatewayConfig::default();
        config.service.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_invalid_persona() {
        let mut config = GatewayConfig::default();
        config.personas.default_persona = "drill-sergeant".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_invalid_log_level() {
        let mut config = GatewayConfig::default();
        config.logging.level = "invalid".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_valid_config() {
        let config = GatewayConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_path_expansion() {
        let mut config = GatewayConfig::default();
        config.logging.file = Some("~/logs/gateway.log".to_string());
        config.expand_paths();

        assert!(!config.logging.file.unwrap().contains('~'));
    }

    #[test]
    fn test_bind_addr() {
        let mut config = GatewayConfig::default();
        config.service.host = "127.0.0.1".to_string();
        config.service.port = 8080;
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_default_persona_parses() {
        let config = GatewayConfig::default();
        assert_eq!(config.default_persona(), PersonaId::Calm);

        let mut config = GatewayConfig::default();
        config.personas.default_persona = "concise".to_string();
        assert_eq!(config.default_persona(), PersonaId::Concise);
    }

    #[test]
    fn test_serialize_deserialize() {
        let config = GatewayConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: GatewayConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.service.port, parsed.service.port);
        assert_eq!(config.orchestrator.base_url, parsed.orchestrator.base_url);
    }

    #[test]
    fn test_parse_config_file() {
        let config_str = r#"
[service]
name = "Coach Gateway (staging)"
port = 8080

[orchestrator]
base_url = "https://agents.staging.example.com"
api_key = "staging-key"

[personas]
default_persona = "motivational"

[logging]
level = "debug"
"#;

        let config: GatewayConfig = toml::from_str(config_str).unwrap();

        assert_eq!(config.service.name, "Coach Gateway (staging)");
        assert_eq!(config.service.port, 8080);
        // Unspecified fields fall back to defaults
        assert_eq!(config.service.host, "0.0.0.0");
        assert_eq!(config.orchestrator.api_key, "staging-key");
        assert_eq!(config.personas.default_persona, "motivational");
        assert_eq!(config.logging.level, "debug");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_template_parses_and_validates() {
        let config: GatewayConfig = toml::from_str(&default_config_template()).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.service.port, 8000);
    }
}
