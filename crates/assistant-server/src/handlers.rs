//! HTTP Handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use assistant_core::{IntermediateStep, Message, Session, SessionId, TurnOutcome};
use assistant_tools::Reminder;

use crate::state::AppState;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub provider: String,
    pub provider_connected: bool,
}

#[derive(Serialize)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub message: String,
    pub session_id: SessionId,
    pub outcome: TurnOutcome,
    pub steps: Vec<IntermediateStep>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: SessionId,
    pub title: String,
    pub message_count: usize,
    pub messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl Into<String>, code: &str) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code: code.into(),
        }),
    )
}

fn session_not_found(id: &str) -> ApiError {
    api_error(StatusCode::NOT_FOUND, format!("Session {id} not found"), "SESSION_NOT_FOUND")
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let provider = state.agent.provider();
    let provider_connected = provider.health_check().await.unwrap_or(false);

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        provider: provider.name().to_string(),
        provider_connected,
    })
}

/// Tool catalog, in registration order
pub async fn list_tools(State(state): State<AppState>) -> Json<Vec<ToolInfo>> {
    Json(
        state
            .agent
            .tools()
            .list()
            .into_iter()
            .map(|schema| ToolInfo {
                name: schema.name,
                description: schema.description,
            })
            .collect(),
    )
}

/// Run one turn in a session, creating the session on first use
pub async fn chat_handler(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if payload.message.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Message must not be empty", "EMPTY_MESSAGE"));
    }

    // Held for the whole turn so turns never interleave
    let mut sessions = state.sessions.lock().await;

    let id = payload
        .session_id
        .filter(|id| !id.trim().is_empty())
        .map_or_else(SessionId::new, SessionId::from_string);
    let session = sessions
        .entry(id.clone())
        .or_insert_with(|| Session::with_id(id.clone()));

    let report = session.submit(&state.agent, &payload.message).await.ok_or_else(|| {
        api_error(StatusCode::BAD_REQUEST, "Message must not be empty", "EMPTY_MESSAGE")
    })?;

    tracing::info!(
        session = %id,
        outcome = ?report.outcome,
        steps = report.steps.len(),
        llm_calls = report.llm_calls,
        "Turn complete"
    );

    Ok(Json(ChatResponse {
        message: report.answer,
        session_id: id,
        outcome: report.outcome,
        steps: report.steps,
    }))
}

/// Conversation history of a session
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionResponse>, ApiError> {
    let sessions = state.sessions.lock().await;
    let session = sessions
        .get(&SessionId::from_string(id.as_str()))
        .ok_or_else(|| session_not_found(&id))?;

    Ok(Json(SessionResponse {
        session_id: session.id.clone(),
        title: session.title(),
        message_count: session.message_count(),
        messages: session.conversation.messages().to_vec(),
    }))
}

/// Drop all turns of a session
pub async fn clear_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let mut sessions = state.sessions.lock().await;
    let session = sessions
        .get_mut(&SessionId::from_string(id.as_str()))
        .ok_or_else(|| session_not_found(&id))?;

    session.clear();
    tracing::info!(session = %id, "History cleared");
    Ok(StatusCode::NO_CONTENT)
}

/// Stored reminders
pub async fn list_reminders(State(state): State<AppState>) -> Json<Vec<Reminder>> {
    Json(state.reminders.lock().await.items().to_vec())
}

/// Stored to-do tasks
pub async fn list_todos(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.todos.lock().await.items().to_vec())
}
