//! API routes for the coach gateway.
//!
//! Handlers validate transport-level requests, resolve the persona, delegate
//! to the orchestrator, and map its results onto the response contract
//! unchanged. No retries, caching, or recovery happens here: an orchestrator
//! failure is logged once and surfaced as a generic server failure.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info};

use crate::orchestrator::{ChatOutcome, GeneratedPlan, ReadinessReport};
use crate::version;

use super::SharedState;

// ─────────────────────────────────────────────────────────────────
// API Error
// ─────────────────────────────────────────────────────────────────

/// JSON error body returned on every failure path.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Error returned by handlers, rendered as `{"error": ...}` JSON.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    /// Client error: a required field was missing or empty.
    fn missing_field(field: &'static str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: format!("Missing required field: {}", field),
        }
    }

    /// Server error: the delegated orchestrator call failed. The underlying
    /// message is carried; nothing is retried or partially recovered.
    fn service_failure(err: crate::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

// ─────────────────────────────────────────────────────────────────
// Request / Response Models
// ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub user_id: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
    /// Empty string resolves to the registry's default persona, so an
    /// absent field and an unknown value follow the same fallback policy.
    #[serde(default)]
    pub persona: String,
    #[serde(default)]
    pub context: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub agent_id: String,
    pub conversation_id: String,
    pub intent: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub references: Option<Value>,
}

impl From<ChatOutcome> for ChatResponse {
    fn from(outcome: ChatOutcome) -> Self {
        Self {
            response: outcome.response,
            agent_id: outcome.agent_id,
            conversation_id: outcome.conversation_id,
            intent: outcome.intent,
            actions: outcome.actions,
            references: outcome.references,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReadinessRequest {
    pub user_id: String,
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub readiness_score: f64,
    pub components: std::collections::HashMap<String, f64>,
    pub recommendations: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjustment: Option<Value>,
    pub message: String,
}

impl From<ReadinessReport> for ReadinessResponse {
    fn from(report: ReadinessReport) -> Self {
        Self {
            readiness_score: report.readiness_score,
            components: report.components,
            recommendations: report.recommendations,
            adjustment: report.adjustment,
            message: report.message,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlanGenerationRequest {
    pub user_id: String,
    pub preferences: Value,
    pub onboarding_data: Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PlanGenerationResponse {
    pub plan_id: String,
    pub plan: Value,
    pub message: String,
}

impl From<GeneratedPlan> for PlanGenerationResponse {
    fn from(plan: GeneratedPlan) -> Self {
        Self {
            plan_id: plan.plan_id,
            plan: plan.plan,
            message: plan.message,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SynthesizeRequest {
    pub text: String,
    #[serde(default)]
    pub persona: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TranscriptionResponse {
    pub transcription: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SynthesizeResponse {
    pub audio_url: String,
}

/// Truncate a message for log output.
fn preview(message: &str) -> String {
    message.chars().take(50).collect()
}

// ─────────────────────────────────────────────────────────────────
// Health
// ─────────────────────────────────────────────────────────────────

/// Static liveness payload with no dependency checks.
pub async fn health_check(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: state.service_name.clone(),
        version: version::build_info().version.to_string(),
    })
}

// ─────────────────────────────────────────────────────────────────
// Chat
// ─────────────────────────────────────────────────────────────────

/// Main conversational endpoint.
pub async fn chat(
    State(state): State<SharedState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if req.user_id.trim().is_empty() {
        return Err(ApiError::missing_field("user_id"));
    }
    if req.message.trim().is_empty() {
        return Err(ApiError::missing_field("message"));
    }

    let persona = state.registry.resolve(&req.persona);
    info!(
        user_id = %req.user_id,
        persona = %persona.id,
        message = %preview(&req.message),
        "Chat request received"
    );

    let outcome = state
        .orchestrator
        .process_message(
            &req.user_id,
            &req.message,
            req.conversation_id.as_deref(),
            persona,
            req.context.as_ref(),
        )
        .await
        .map_err(|e| {
            error!(user_id = %req.user_id, error = %e, "Chat processing failed");
            ApiError::service_failure(e)
        })?;

    info!(
        user_id = %req.user_id,
        conversation_id = %outcome.conversation_id,
        intent = %outcome.intent,
        "Chat processed"
    );

    Ok(Json(outcome.into()))
}

// ─────────────────────────────────────────────────────────────────
// Readiness
// ─────────────────────────────────────────────────────────────────

/// Daily readiness briefing endpoint.
pub async fn calculate_readiness(
    State(state): State<SharedState>,
    Json(req): Json<ReadinessRequest>,
) -> Result<Json<ReadinessResponse>, ApiError> {
    if req.user_id.trim().is_empty() {
        return Err(ApiError::missing_field("user_id"));
    }

    info!(user_id = %req.user_id, date = ?req.date, "Readiness request received");

    let report = state
        .orchestrator
        .calculate_readiness(&req.user_id, req.date.as_deref())
        .await
        .map_err(|e| {
            error!(user_id = %req.user_id, error = %e, "Readiness calculation failed");
            ApiError::service_failure(e)
        })?;

    Ok(Json(report.into()))
}

// ─────────────────────────────────────────────────────────────────
// Plan Generation
// ─────────────────────────────────────────────────────────────────

/// Initial training-plan generation endpoint (onboarding).
pub async fn generate_plan(
    State(state): State<SharedState>,
    Json(req): Json<PlanGenerationRequest>,
) -> Result<Json<PlanGenerationResponse>, ApiError> {
    if req.user_id.trim().is_empty() {
        return Err(ApiError::missing_field("user_id"));
    }

    info!(user_id = %req.user_id, "Plan generation request received");

    let plan = state
        .orchestrator
        .generate_training_plan(&req.user_id, &req.preferences, &req.onboarding_data)
        .await
        .map_err(|e| {
            error!(user_id = %req.user_id, error = %e, "Plan generation failed");
            ApiError::service_failure(e)
        })?;

    Ok(Json(plan.into()))
}

// ─────────────────────────────────────────────────────────────────
// Voice (placeholders)
// ─────────────────────────────────────────────────────────────────

/// Voice transcription placeholder. Accepts any payload and always answers
/// with the fixed not-implemented marker so callers can tell "not built"
/// from "broken".
pub async fn transcribe_voice(_audio_data: Bytes) -> Json<TranscriptionResponse> {
    Json(TranscriptionResponse {
        transcription: "Voice transcription not yet implemented".to_string(),
    })
}

/// Voice synthesis placeholder. Same contract as transcription.
pub async fn synthesize_voice(Json(_req): Json<SynthesizeRequest>) -> Json<SynthesizeResponse> {
    Json(SynthesizeResponse {
        audio_url: "Voice synthesis not yet implemented".to_string(),
    })
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use crate::orchestrator::{MockConfig, MockOrchestrator};
    use crate::persona::{PersonaId, PersonaRegistry};
    use crate::server::AppState;

    use super::*;

    fn state_with(mock: Arc<MockOrchestrator>) -> SharedState {
        Arc::new(AppState::new(
            "AI Fitness Coach Agent",
            PersonaRegistry::bundled().unwrap(),
            mock,
        ))
    }

    fn chat_request(persona: &str) -> ChatRequest {
        ChatRequest {
            message: "How hard should I go today?".to_string(),
            user_id: "u-42".to_string(),
            conversation_id: Some("c-7".to_string()),
            persona: persona.to_string(),
            context: None,
        }
    }

    #[tokio::test]
    async fn test_health_is_static() {
        let state = state_with(Arc::new(MockOrchestrator::new()));
        let Json(body) = health_check(State(state)).await;

        assert_eq!(body.status, "healthy");
        assert_eq!(body.service, "AI Fitness Coach Agent");
        assert_eq!(body.version, env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_chat_forwards_named_persona() {
        let mock = Arc::new(MockOrchestrator::new());
        let state = state_with(mock.clone());

        let Json(body) = chat(State(state), Json(chat_request("motivational")))
            .await
            .unwrap();

        // The Hype Coach config reached the orchestrator
        assert_eq!(mock.last_persona(), Some(PersonaId::Motivational));
        // Orchestrator fields pass through unchanged
        assert_eq!(body.agent_id, "coach-agent-mock");
        assert_eq!(body.conversation_id, "c-7");
        assert_eq!(body.intent, "general_chat");
    }

    #[tokio::test]
    async fn test_chat_unknown_persona_proceeds_with_default() {
        let mock = Arc::new(MockOrchestrator::new());
        let state = state_with(mock.clone());

        let result = chat(State(state), Json(chat_request("unknown_xyz"))).await;

        assert!(result.is_ok());
        assert_eq!(mock.last_persona(), Some(PersonaId::Calm));
    }

    #[tokio::test]
    async fn test_chat_absent_persona_uses_default() {
        let mock = Arc::new(MockOrchestrator::new());
        let state = state_with(mock.clone());

        // serde default: persona is the empty string when the field is absent
        let req: ChatRequest =
            serde_json::from_value(json!({"message": "hi", "user_id": "u-1"})).unwrap();
        assert_eq!(req.persona, "");

        let result = chat(State(state), Json(req)).await;
        assert!(result.is_ok());
        assert_eq!(mock.last_persona(), Some(PersonaId::Calm));
    }

    #[tokio::test]
    async fn test_chat_missing_message_rejected_before_orchestrator() {
        let mock = Arc::new(MockOrchestrator::new());
        let state = state_with(mock.clone());

        let mut req = chat_request("calm");
        req.message = "  ".to_string();

        let err = chat(State(state), Json(req)).await.unwrap_err();

        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.message().contains("message"));
        assert_eq!(mock.call_count("process_message"), 0);
    }

    #[tokio::test]
    async fn test_chat_missing_user_id_rejected() {
        let mock = Arc::new(MockOrchestrator::new());
        let state = state_with(mock.clone());

        let mut req = chat_request("calm");
        req.user_id = String::new();

        let err = chat(State(state), Json(req)).await.unwrap_err();

        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.message().contains("user_id"));
        assert_eq!(mock.call_count("process_message"), 0);
    }

    #[tokio::test]
    async fn test_chat_orchestrator_failure_is_generic_500_no_retry() {
        let mock = Arc::new(MockOrchestrator::with_config(MockConfig {
            fail_process_message: true,
            ..Default::default()
        }));
        let state = state_with(mock.clone());

        let err = chat(State(state), Json(chat_request("calm"))).await.unwrap_err();

        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        // Carries the underlying message
        assert!(err.message().contains("process_message"));
        // Exactly one delegation, no retry
        assert_eq!(mock.call_count("process_message"), 1);
    }

    #[tokio::test]
    async fn test_readiness_passthrough() {
        let mock = Arc::new(MockOrchestrator::new());
        let state = state_with(mock.clone());

        let req = ReadinessRequest {
            user_id: "u-42".to_string(),
            date: Some("2025-06-01".to_string()),
        };

        let Json(body) = calculate_readiness(State(state), Json(req)).await.unwrap();

        assert!((body.readiness_score - 72.0).abs() < f64::EPSILON);
        assert_eq!(body.components.len(), 3);
        assert!(body.adjustment.is_none());
        assert_eq!(mock.call_count("calculate_readiness"), 1);
    }

    #[tokio::test]
    async fn test_readiness_missing_user_id() {
        let mock = Arc::new(MockOrchestrator::new());
        let state = state_with(mock.clone());

        let req = ReadinessRequest {
            user_id: String::new(),
            date: None,
        };

        let err = calculate_readiness(State(state), Json(req)).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(mock.call_count("calculate_readiness"), 0);
    }

    #[tokio::test]
    async fn test_generate_plan_passthrough() {
        let mock = Arc::new(MockOrchestrator::new());
        let state = state_with(mock.clone());

        let req = PlanGenerationRequest {
            user_id: "u-9".to_string(),
            preferences: json!({"sessions_per_week": 4}),
            onboarding_data: json!({"experience": "beginner"}),
        };

        let Json(body) = generate_plan(State(state), Json(req)).await.unwrap();

        assert_eq!(body.plan_id, "plan-u-9");
        assert_eq!(body.plan["sessions_per_week"], json!(4));
        assert_eq!(mock.call_count("generate_training_plan"), 1);
    }

    #[tokio::test]
    async fn test_voice_transcribe_placeholder() {
        let Json(body) = transcribe_voice(Bytes::from_static(b"\x00\x01binary audio")).await;
        assert_eq!(body.transcription, "Voice transcription not yet implemented");
    }

    #[tokio::test]
    async fn test_voice_synthesize_placeholder() {
        let req = SynthesizeRequest {
            text: "Nice work today".to_string(),
            persona: "gentle".to_string(),
        };
        let Json(body) = synthesize_voice(Json(req)).await;
        assert_eq!(body.audio_url, "Voice synthesis not yet implemented");
    }

    #[test]
    fn test_error_body_shape() {
        let err = ApiError::missing_field("message");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "Missing required field: message");
    }
}
