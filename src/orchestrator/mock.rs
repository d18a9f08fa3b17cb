//! Mock orchestrator.
//!
//! Deterministic `Orchestrator` implementation used by the test suite and as
//! the active orchestrator when the upstream is disabled in configuration,
//! so the gateway stays runnable end-to-end without the real service.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{json, Value};

use crate::error::{Error, Result};
use crate::persona::{PersonaConfig, PersonaId};

use super::traits::{ChatOutcome, GeneratedPlan, Orchestrator, ReadinessReport};

// ─────────────────────────────────────────────────────────────────
// Mock Configuration
// ─────────────────────────────────────────────────────────────────

/// Configuration for mock orchestrator behavior.
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Whether to fail certain operations.
    pub fail_process_message: bool,
    pub fail_calculate_readiness: bool,
    pub fail_generate_training_plan: bool,

    /// Fixed reply text (for deterministic testing).
    pub fixed_response: Option<String>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            fail_process_message: false,
            fail_calculate_readiness: false,
            fail_generate_training_plan: false,
            fixed_response: None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Mock Orchestrator
// ─────────────────────────────────────────────────────────────────

/// Mock implementation of `Orchestrator`.
pub struct MockOrchestrator {
    config: MockConfig,
    call_counts: RwLock<CallCounts>,
    last_persona: RwLock<Option<PersonaId>>,
}

/// Track method call counts for verification.
#[derive(Debug, Default)]
struct CallCounts {
    process_message: u32,
    calculate_readiness: u32,
    generate_training_plan: u32,
}

impl MockOrchestrator {
    /// Create a new mock orchestrator with default configuration.
    pub fn new() -> Self {
        Self::with_config(MockConfig::default())
    }

    /// Create a new mock orchestrator with custom configuration.
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            config,
            call_counts: RwLock::new(CallCounts::default()),
            last_persona: RwLock::new(None),
        }
    }

    /// Get the number of times a method was called.
    pub fn call_count(&self, method: &str) -> u32 {
        let counts = self.call_counts.read();
        match method {
            "process_message" => counts.process_message,
            "calculate_readiness" => counts.calculate_readiness,
            "generate_training_plan" => counts.generate_training_plan,
            _ => 0,
        }
    }

    /// The persona id the last `process_message` call was handed.
    pub fn last_persona(&self) -> Option<PersonaId> {
        *self.last_persona.read()
    }
}

impl Default for MockOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Orchestrator for MockOrchestrator {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn process_message(
        &self,
        user_id: &str,
        message: &str,
        conversation_id: Option<&str>,
        persona_config: &PersonaConfig,
        _context: Option<&Value>,
    ) -> Result<ChatOutcome> {
        self.call_counts.write().process_message += 1;
        *self.last_persona.write() = Some(persona_config.id);

        if self.config.fail_process_message {
            return Err(Error::orchestrator_failed(
                "process_message",
                "mock process_message failure",
            ));
        }

        let response = self.config.fixed_response.clone().unwrap_or_else(|| {
            format!(
                "[{}] Acknowledged {} characters from {}.",
                persona_config.display_name,
                message.len(),
                user_id
            )
        });

        Ok(ChatOutcome {
            response,
            agent_id: "coach-agent-mock".to_string(),
            conversation_id: conversation_id
                .map(str::to_string)
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            intent: "general_chat".to_string(),
            actions: None,
            references: None,
        })
    }

    async fn calculate_readiness(
        &self,
        user_id: &str,
        date: Option<&str>,
    ) -> Result<ReadinessReport> {
        self.call_counts.write().calculate_readiness += 1;

        if self.config.fail_calculate_readiness {
            return Err(Error::orchestrator_failed(
                "calculate_readiness",
                "mock calculate_readiness failure",
            ));
        }

        let day = date
            .map(str::to_string)
            .unwrap_or_else(|| chrono::Local::now().format("%Y-%m-%d").to_string());

        let components = [
            ("sleep".to_string(), 0.8),
            ("hrv".to_string(), 0.65),
            ("fatigue".to_string(), 0.7),
        ]
        .into_iter()
        .collect();

        Ok(ReadinessReport {
            readiness_score: 72.0,
            components,
            recommendations: json!({
                "intensity": "reduce 15%",
                "focus": "technique over load",
            }),
            adjustment: None,
            message: format!("Readiness for {} on {}: 72/100.", user_id, day),
        })
    }

    async fn generate_training_plan(
        &self,
        user_id: &str,
        preferences: &Value,
        _onboarding_data: &Value,
    ) -> Result<GeneratedPlan> {
        self.call_counts.write().generate_training_plan += 1;

        if self.config.fail_generate_training_plan {
            return Err(Error::orchestrator_failed(
                "generate_training_plan",
                "mock generate_training_plan failure",
            ));
        }

        Ok(GeneratedPlan {
            plan_id: format!("plan-{}", user_id),
            plan: json!({
                "weeks": 4,
                "sessions_per_week": preferences
                    .get("sessions_per_week")
                    .cloned()
                    .unwrap_or_else(|| json!(3)),
            }),
            message: "Initial training plan generated.".to_string(),
        })
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona::PersonaRegistry;

    #[tokio::test]
    async fn test_mock_process_message() {
        let registry = PersonaRegistry::bundled().unwrap();
        let orchestrator = MockOrchestrator::new();

        let outcome = orchestrator
            .process_message("u-1", "Hello", Some("c-9"), registry.resolve("gentle"), None)
            .await
            .unwrap();

        assert!(outcome.response.contains("Supportive Coach"));
        assert_eq!(outcome.conversation_id, "c-9");
        assert_eq!(outcome.intent, "general_chat");
        assert_eq!(orchestrator.last_persona(), Some(PersonaId::Gentle));
    }

    #[tokio::test]
    async fn test_mock_allocates_conversation_id() {
        let registry = PersonaRegistry::bundled().unwrap();
        let orchestrator = MockOrchestrator::new();

        let outcome = orchestrator
            .process_message("u-1", "Hello", None, registry.resolve("calm"), None)
            .await
            .unwrap();

        assert!(!outcome.conversation_id.is_empty());
    }

    #[tokio::test]
    async fn test_mock_fixed_response() {
        let registry = PersonaRegistry::bundled().unwrap();
        let orchestrator = MockOrchestrator::with_config(MockConfig {
            fixed_response: Some("Execute. ✓".to_string()),
            ..Default::default()
        });

        let outcome = orchestrator
            .process_message("u-1", "Status?", None, registry.resolve("concise"), None)
            .await
            .unwrap();

        assert_eq!(outcome.response, "Execute. ✓");
    }

    #[tokio::test]
    async fn test_mock_failure() {
        let registry = PersonaRegistry::bundled().unwrap();
        let orchestrator = MockOrchestrator::with_config(MockConfig {
            fail_process_message: true,
            ..Default::default()
        });

        let result = orchestrator
            .process_message("u-1", "Hello", None, registry.resolve("calm"), None)
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_call_counting() {
        let orchestrator = MockOrchestrator::new();

        let _ = orchestrator.calculate_readiness("u-1", None).await;
        let _ = orchestrator.calculate_readiness("u-1", Some("2025-06-01")).await;

        assert_eq!(orchestrator.call_count("calculate_readiness"), 2);
        assert_eq!(orchestrator.call_count("process_message"), 0);
    }

    #[tokio::test]
    async fn test_mock_readiness_shape() {
        let orchestrator = MockOrchestrator::new();
        let report = orchestrator.calculate_readiness("u-1", None).await.unwrap();

        assert!((report.readiness_score - 72.0).abs() < f64::EPSILON);
        assert_eq!(report.components.len(), 3);
        assert!(report.message.contains("u-1"));
    }

    #[tokio::test]
    async fn test_mock_plan_echoes_preferences() {
        let orchestrator = MockOrchestrator::new();
        let plan = orchestrator
            .generate_training_plan("u-7", &json!({"sessions_per_week": 5}), &json!({}))
            .await
            .unwrap();

        assert_eq!(plan.plan_id, "plan-u-7");
        assert_eq!(plan.plan["sessions_per_week"], json!(5));
    }
}
