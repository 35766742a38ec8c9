// crates/api/src/lib.rs

use std::sync::Arc;

use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use talapker_core::{HistoryEntry, TalapkerError, TalapkerResult};
use tower_http::cors::CorsLayer;
use tracing::info;

pub mod handlers;

pub use handlers::ApiHandlers;

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub slug: String,
    pub confidence: f32,
    pub best_phrase: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub history: Option<Vec<HistoryEntry>>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct ChatPlusResponse {
    pub intent_slug: String,
    pub intent_confidence: f32,
    pub mini_answer: Option<String>,
    pub llm_answer: String,
}

/// HTTP front door. A thin transport shim: routing and JSON codecs only,
/// every decision lives in `ApiHandlers`.
pub struct ApiServer {
    host: String,
    port: u16,
    handlers: Arc<ApiHandlers>,
}

impl ApiServer {
    pub fn new(host: &str, port: u16, handlers: Arc<ApiHandlers>) -> Self {
        Self {
            host: host.to_string(),
            port,
            handlers,
        }
    }

    pub async fn serve(self) -> TalapkerResult<()> {
        let addr = format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| TalapkerError::Config(format!("Invalid bind address: {}", e)))?;

        let app = self.create_router();

        info!("API server listening on {}", addr);

        axum::Server::bind(&addr)
            .serve(app.into_make_service())
            .await
            .map_err(|e| TalapkerError::Network(e.to_string()))?;

        Ok(())
    }

    fn create_router(&self) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route("/ask", post(ask_handler))
            .route("/chat", post(chat_handler))
            .route("/chat_plus", post(chat_plus_handler))
            .with_state(self.handlers.clone())
            .layer(CorsLayer::permissive())
    }
}

async fn health_handler(State(handlers): State<Arc<ApiHandlers>>) -> impl IntoResponse {
    Json(handlers.health())
}

async fn ask_handler(
    State(handlers): State<Arc<ApiHandlers>>,
    Json(request): Json<AskRequest>,
) -> Json<AskResponse> {
    Json(handlers.ask(request).await)
}

async fn chat_handler(
    State(handlers): State<Arc<ApiHandlers>>,
    Json(request): Json<ChatRequest>,
) -> Json<ChatResponse> {
    Json(handlers.chat(request).await)
}

async fn chat_plus_handler(
    State(handlers): State<Arc<ApiHandlers>>,
    Json(request): Json<ChatRequest>,
) -> Json<ChatPlusResponse> {
    Json(handlers.chat_plus(request).await)
}
