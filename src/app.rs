// src/app.rs

use std::sync::Arc;

use talapker_api::{ApiHandlers, ApiServer};
use talapker_config::AppConfig;
use talapker_core::{TalapkerError, TalapkerResult};
use talapker_embedding::{Embedder, OllamaEmbedder};
use talapker_llm::{ChatGateway, OllamaChatProvider};
use talapker_nlu::{CannedAnswerTable, IntentMatcher, PhraseBank};
use tokio::signal;
use tracing::{error, info};

/// Wires the static catalogues, the embedding index and the chat gateway
/// together and runs the HTTP server. Any failure here is fatal: the
/// service never starts with a partial index.
pub struct TalapkerApp {
    server: ApiServer,
}

impl TalapkerApp {
    pub async fn new(config: AppConfig) -> TalapkerResult<Self> {
        info!("Initializing Talapker components...");

        let bank = match &config.phrase_bank_path {
            Some(path) => PhraseBank::from_file(path)?,
            None => PhraseBank::builtin(),
        };
        let mini = match &config.mini_answers_path {
            Some(path) => CannedAnswerTable::from_file(path)?,
            None => CannedAnswerTable::builtin(),
        };
        mini.validate_against(&bank)?;

        let embedder: Arc<dyn Embedder> =
            Arc::new(OllamaEmbedder::new(&config.ollama_url, &config.embed_model)?);
        let matcher = IntentMatcher::build(embedder, &bank, config.threshold).await?;

        let provider = OllamaChatProvider::new(
            &config.ollama_url,
            &config.gen_model,
            config.request_timeout_s,
        )?;
        let gateway = ChatGateway::new(Box::new(provider), config.temperature, config.max_tokens);

        let host = config.host.clone();
        let port = config.port;
        let handlers = Arc::new(ApiHandlers::new(
            config,
            Arc::new(matcher),
            Arc::new(mini),
            Arc::new(gateway),
        ));

        let server = ApiServer::new(&host, port, handlers);

        Ok(Self { server })
    }

    pub async fn run(self) -> TalapkerResult<()> {
        let server = self.server;
        tokio::spawn(async move {
            if let Err(e) = server.serve().await {
                error!("API server error: {}", e);
            }
        });

        wait_for_shutdown().await
    }
}

async fn wait_for_shutdown() -> TalapkerResult<()> {
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Received shutdown signal");
            Ok(())
        }
        Err(e) => {
            error!("Failed to listen for shutdown signal: {}", e);
            Err(TalapkerError::Io(e))
        }
    }
}
