//! Remote orchestrator client.
//!
//! Implements `Orchestrator` by forwarding each operation to the upstream
//! agent-orchestrator service over HTTP. The gateway performs no retries and
//! no recovery: any transport, status, or decode failure is terminal for the
//! request that triggered it.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::persona::PersonaConfig;

use super::traits::{ChatOutcome, GeneratedPlan, Orchestrator, ReadinessReport};

// ─────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────

/// Configuration for the remote orchestrator client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteOrchestratorConfig {
    /// Orchestrator base URL (e.g., "http://localhost:8100").
    pub base_url: String,

    /// Bearer token (empty string for unauthenticated deployments).
    pub api_key: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for RemoteOrchestratorConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8100".to_string(),
            api_key: String::new(),
            timeout_secs: 120,
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Wire types (request bodies; responses decode straight into the
// shared result shapes)
// ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ProcessMessageRequest<'a> {
    user_id: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    conversation_id: Option<&'a str>,
    persona_config: &'a PersonaConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<&'a Value>,
}

#[derive(Debug, Serialize)]
struct ReadinessRequest<'a> {
    user_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct TrainingPlanRequest<'a> {
    user_id: &'a str,
    preferences: &'a Value,
    onboarding_data: &'a Value,
}

// ─────────────────────────────────────────────────────────────────
// Remote Orchestrator
// ─────────────────────────────────────────────────────────────────

/// HTTP client for the upstream agent orchestrator.
pub struct RemoteOrchestrator {
    config: RemoteOrchestratorConfig,
    client: Client,
}

impl RemoteOrchestrator {
    /// Create a new remote orchestrator client.
    pub fn new(config: RemoteOrchestratorConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            base_url = %config.base_url,
            timeout_secs = config.timeout_secs,
            "Remote orchestrator client created"
        );

        Ok(Self { config, client })
    }

    /// Build the authorization header value (if API key is set)
    fn auth_header(&self) -> Option<String> {
        if self.config.api_key.is_empty() {
            None
        } else {
            Some(format!("Bearer {}", self.config.api_key))
        }
    }

    /// POST one operation to the upstream and decode its response.
    async fn post<Req, Resp>(&self, operation: &'static str, path: &str, body: &Req) -> Result<Resp>
    where
        Req: Serialize + Sync,
        Resp: for<'de> Deserialize<'de>,
    {
        let url = format!("{}{}", self.config.base_url, path);
        debug!(operation, url = %url, "Delegating to orchestrator");

        let mut req = self.client.post(&url).json(body);
        if let Some(auth) = self.auth_header() {
            req = req.header("Authorization", auth);
        }

        let response = req.send().await.map_err(|e| {
            if e.is_timeout() || e.is_connect() {
                Error::orchestrator_unavailable(&self.config.base_url, e.to_string())
            } else {
                Error::orchestrator_failed(operation, e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::orchestrator_failed(
                operation,
                format!("upstream returned {}: {}", status, body),
            ));
        }

        response.json::<Resp>().await.map_err(|e| Error::OrchestratorMalformed {
            operation,
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl Orchestrator for RemoteOrchestrator {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn process_message(
        &self,
        user_id: &str,
        message: &str,
        conversation_id: Option<&str>,
        persona_config: &PersonaConfig,
        context: Option<&Value>,
    ) -> Result<ChatOutcome> {
        let body = ProcessMessageRequest {
            user_id,
            message,
            conversation_id,
            persona_config,
            context,
        };
        self.post("process_message", "/v1/agent/process-message", &body)
            .await
    }

    async fn calculate_readiness(
        &self,
        user_id: &str,
        date: Option<&str>,
    ) -> Result<ReadinessReport> {
        let body = ReadinessRequest { user_id, date };
        self.post("calculate_readiness", "/v1/agent/readiness", &body)
            .await
    }

    async fn generate_training_plan(
        &self,
        user_id: &str,
        preferences: &Value,
        onboarding_data: &Value,
    ) -> Result<GeneratedPlan> {
        let body = TrainingPlanRequest {
            user_id,
            preferences,
            onboarding_data,
        };
        self.post("generate_training_plan", "/v1/agent/training-plan", &body)
            .await
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona::PersonaRegistry;

    #[test]
    fn test_default_config() {
        let config = RemoteOrchestratorConfig::default();
        assert_eq!(config.base_url, "http://localhost:8100");
        assert!(config.api_key.is_empty());
        assert_eq!(config.timeout_secs, 120);
    }

    #[test]
    fn test_auth_header() {
        let orchestrator = RemoteOrchestrator::new(RemoteOrchestratorConfig::default()).unwrap();
        assert!(orchestrator.auth_header().is_none());

        let orchestrator = RemoteOrchestrator::new(RemoteOrchestratorConfig {
            api_key: "secret".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(orchestrator.auth_header().unwrap(), "Bearer secret");
    }

    #[test]
    fn test_process_message_wire_shape() {
        let registry = PersonaRegistry::bundled().unwrap();
        let persona = registry.resolve("calm");

        let body = ProcessMessageRequest {
            user_id: "u-1",
            message: "How hard should I train today?",
            conversation_id: None,
            persona_config: persona,
            context: None,
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["user_id"], "u-1");
        assert_eq!(json["persona_config"]["id"], "calm");
        // Absent optionals stay off the wire
        assert!(json.get("conversation_id").is_none());
        assert!(json.get("context").is_none());
    }
}
