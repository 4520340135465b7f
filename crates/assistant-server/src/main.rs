//! Personal Assistant HTTP Server
//!
//! Axum-based server exposing the assistant's chat sessions, tool catalog
//! and the reminder/to-do lists.

mod config;
mod handlers;
mod state;

use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use assistant_core::{AgentBuilder, GenerationOptions, LlmProvider};
use assistant_runtime::{OllamaConfig, OllamaProvider, OpenAiConfig, OpenAiProvider};
use assistant_tools::{
    backend::{HttpRetriever, OpenWeatherClient, SerpApiClient},
    open_stores, ToolBackends, ASSISTANT_PROMPT,
};

use crate::config::{AppConfig, LlmSettings};
use crate::handlers::{
    chat_handler, clear_history, get_session, health_check, list_reminders, list_todos, list_tools,
};
use crate::state::AppState;

/// Build the router over `state`
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health & info
        .route("/health", get(health_check))
        .route("/api/tools", get(list_tools))

        // Chat sessions
        .route("/api/chat", post(chat_handler))
        .route("/api/sessions/{id}", get(get_session))
        .route("/api/sessions/{id}/history", delete(clear_history))

        // Lists behind the Reminder and ToDo tools
        .route("/api/reminders", get(list_reminders))
        .route("/api/todos", get(list_todos))

        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn build_provider(settings: &LlmSettings) -> anyhow::Result<Arc<dyn LlmProvider>> {
    let provider: Arc<dyn LlmProvider> = match settings {
        LlmSettings::OpenAi { api_key, base_url } => Arc::new(OpenAiProvider::from_config(
            OpenAiConfig::new(api_key.clone()).with_base_url(base_url.clone()),
        )?),
        LlmSettings::Ollama { host, port } => Arc::new(OllamaProvider::from_config(OllamaConfig {
            host: host.clone(),
            port: *port,
            ..Default::default()
        })),
    };
    Ok(provider)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    // Refuse to start on missing settings
    let config = AppConfig::from_env()?;

    let provider = build_provider(&config.llm)?;
    match provider.health_check().await {
        Ok(true) => tracing::info!("✓ Connected to {} ({})", provider.name(), config.model),
        Ok(false) | Err(_) => {
            tracing::warn!("⚠ {} not reachable - turns will fail until it is", provider.name());
        }
    }

    // Tool backends
    let (reminders, todos) = open_stores(&config.data_dir)?;
    let retriever = HttpRetriever::new(&config.retrieval_url, config.rag_collection.clone())?;
    if !retriever.is_http() {
        tracing::warn!("⚠ Retrieval backend is not an http(s) URL - set RETRIEVAL_URL; RAGSearch will report failures");
    }

    let generation = GenerationOptions {
        model: config.model.clone(),
        ..Default::default()
    };
    let tools = ToolBackends {
        reminders: reminders.clone(),
        todos: todos.clone(),
        weather: Arc::new(OpenWeatherClient::new(config.openweather_api_key.clone())?),
        search: Arc::new(SerpApiClient::new(config.serpapi_api_key.clone())?),
        retriever: Arc::new(retriever),
    }
    .into_registry(provider.clone(), generation)?;

    tracing::info!("Registered {} tools:", tools.len());
    for name in tools.names() {
        tracing::info!("  • {}", name);
    }

    let agent = AgentBuilder::new()
        .provider(provider)
        .tools(tools)
        .system_prompt(ASSISTANT_PROMPT)
        .model(config.model.clone())
        .max_iterations(config.max_iterations)
        .build()?;

    let state = AppState::new(Arc::new(agent), reminders, todos);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 personal assistant running on http://{}", config.bind_addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("  LLM: {} / {}", config.llm.label(), config.model);
    tracing::info!("  Data: {}", config.data_dir.display());
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET    /health                     - Health check");
    tracing::info!("  GET    /api/tools                  - Tool catalog");
    tracing::info!("  POST   /api/chat                   - Send message");
    tracing::info!("  GET    /api/sessions/{{id}}          - Session history");
    tracing::info!("  DELETE /api/sessions/{{id}}/history  - Clear history");
    tracing::info!("  GET    /api/reminders              - Stored reminders");
    tracing::info!("  GET    /api/todos                  - Stored to-dos");
    tracing::info!("");

    axum::serve(listener, app(state)).await?;

    Ok(())
}
