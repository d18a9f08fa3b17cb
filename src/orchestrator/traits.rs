//! Orchestrator trait definition.
//!
//! Defines the narrow contract the gateway consumes. The orchestrator's
//! internals (intent classification, conversation state, readiness scoring,
//! plan generation) live behind this seam and are not modeled here.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::persona::PersonaConfig;

// ─────────────────────────────────────────────────────────────────
// Result Shapes
// ─────────────────────────────────────────────────────────────────

/// Outcome of a processed chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatOutcome {
    /// The coach's reply text.
    pub response: String,

    /// Identifier of the agent that produced the reply.
    pub agent_id: String,

    /// Conversation this turn belongs to. Always populated; the
    /// orchestrator allocates one when the request carried none.
    pub conversation_id: String,

    /// Classified intent of the user message.
    pub intent: String,

    /// Optional follow-up actions the client should surface.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<Value>>,

    /// Optional references backing the reply (workouts, metrics, sources).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub references: Option<Value>,
}

/// Daily readiness computation result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessReport {
    /// Overall readiness score.
    pub readiness_score: f64,

    /// Per-component scores (sleep, HRV, fatigue, ...).
    pub components: HashMap<String, f64>,

    /// Recommendations derived from the score.
    pub recommendations: Value,

    /// Optional adjustment to today's planned session.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjustment: Option<Value>,

    /// Human-readable briefing message.
    pub message: String,
}

/// Generated training plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedPlan {
    /// Identifier of the stored plan.
    pub plan_id: String,

    /// The plan document itself.
    pub plan: Value,

    /// Human-readable confirmation message.
    pub message: String,
}

// ─────────────────────────────────────────────────────────────────
// Orchestrator Trait
// ─────────────────────────────────────────────────────────────────

/// Contract for the external agent orchestrator.
///
/// The trait is object-safe for dynamic dispatch; the gateway holds a
/// `SharedOrchestrator` and never inspects which implementation is behind it.
/// Implementations own any timeout or retry policy; the gateway performs
/// neither.
#[async_trait]
pub trait Orchestrator: Send + Sync {
    /// Get the implementation name (e.g., "remote", "mock").
    fn name(&self) -> &'static str;

    /// Process one user chat message under the given persona.
    async fn process_message(
        &self,
        user_id: &str,
        message: &str,
        conversation_id: Option<&str>,
        persona_config: &PersonaConfig,
        context: Option<&Value>,
    ) -> Result<ChatOutcome>;

    /// Compute the readiness briefing for a user, optionally for a specific
    /// date (an opaque string owned by the orchestrator's calendar logic).
    async fn calculate_readiness(
        &self,
        user_id: &str,
        date: Option<&str>,
    ) -> Result<ReadinessReport>;

    /// Generate the initial training plan during onboarding.
    async fn generate_training_plan(
        &self,
        user_id: &str,
        preferences: &Value,
        onboarding_data: &Value,
    ) -> Result<GeneratedPlan>;
}

/// Type alias for a shared orchestrator reference.
pub type SharedOrchestrator = Arc<dyn Orchestrator>;

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
