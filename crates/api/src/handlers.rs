// crates/api/src/handlers.rs

use std::sync::Arc;

use serde_json::json;
use talapker_config::AppConfig;
use talapker_core::{IntentMatch, UNKNOWN_SLUG};
use talapker_llm::{ChatGateway, PromptBuilder};
use talapker_nlu::{detect_lang, CannedAnswerTable, IntentMatcher, TextNormalizer};
use tracing::warn;

use crate::{AskRequest, AskResponse, ChatPlusResponse, ChatRequest, ChatResponse};

/// Asked when the user submits empty or whitespace-only text.
pub const EMPTY_PROMPT_REPLY: &str = "Сұрағыңыз бос сияқты. Қысқаша жазыңызшы.";

/// Substituted when the upstream chat service fails.
pub const UPSTREAM_APOLOGY: &str = "Қызмет уақытша қолжетімсіз. Кейінірек қайталап көріңіз.";

/// The Response Composer: merges intent matching, canned-answer selection
/// and the generative gateway into the three response shapes the service
/// exposes. Holds only immutable `Arc`-shared state, so handlers run
/// concurrently without locking.
pub struct ApiHandlers {
    config: AppConfig,
    normalizer: TextNormalizer,
    prompts: PromptBuilder,
    matcher: Arc<IntentMatcher>,
    mini: Arc<CannedAnswerTable>,
    gateway: Arc<ChatGateway>,
}

impl ApiHandlers {
    pub fn new(
        config: AppConfig,
        matcher: Arc<IntentMatcher>,
        mini: Arc<CannedAnswerTable>,
        gateway: Arc<ChatGateway>,
    ) -> Self {
        let prompts = PromptBuilder::new(config.history_limit);
        Self {
            config,
            normalizer: TextNormalizer::new(),
            prompts,
            matcher,
            mini,
            gateway,
        }
    }

    pub fn health(&self) -> serde_json::Value {
        json!({
            "status": "ok",
            "embed_model": self.config.embed_model,
            "gen_model": self.config.gen_model,
            "threshold": self.config.threshold,
            "threshold_hard": self.config.threshold_hard,
            "always_chat": self.config.always_chat,
            "use_mini": self.config.use_mini,
            "version": env!("CARGO_PKG_VERSION"),
        })
    }

    /// Classify-only shape. Never touches the generative gateway.
    pub async fn ask(&self, request: AskRequest) -> AskResponse {
        if self.config.always_chat {
            return unknown_ask();
        }

        let text = self.normalizer.normalize(&request.text);
        if text.is_empty() {
            return unknown_ask();
        }

        let result = match self.matcher.classify(&text).await {
            Ok(result) => result,
            Err(e) => {
                warn!("classification degraded to unknown: {}", e);
                IntentMatch::unknown()
            }
        };

        AskResponse {
            slug: result.slug,
            confidence: result.confidence,
            best_phrase: result.matched_phrase,
        }
    }

    /// Pure generative shape. The normalizer is bypassed; raw trimmed text
    /// goes to the model with no intent hint.
    pub async fn chat(&self, request: ChatRequest) -> ChatResponse {
        let prompt = request.text.trim();
        if prompt.is_empty() {
            return ChatResponse {
                answer: EMPTY_PROMPT_REPLY.to_string(),
            };
        }

        let history = request.history.unwrap_or_default();
        let messages = self.prompts.build_messages(&history, prompt, None);

        let answer = match self.gateway.answer(&messages).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!("chat generation failed: {}", e);
                UPSTREAM_APOLOGY.to_string()
            }
        };

        ChatResponse { answer }
    }

    /// Hybrid shape: deterministic intent facets plus the generative answer
    /// in one response. Callers decide how to merge or display them.
    pub async fn chat_plus(&self, request: ChatRequest) -> ChatPlusResponse {
        let prompt = request.text.trim();
        if prompt.is_empty() {
            return ChatPlusResponse {
                intent_slug: UNKNOWN_SLUG.to_string(),
                intent_confidence: 0.0,
                mini_answer: None,
                llm_answer: EMPTY_PROMPT_REPLY.to_string(),
            };
        }

        let lang = detect_lang(prompt);
        let mut intent = IntentMatch::unknown();
        let mut mini_answer = None;

        if self.config.use_mini {
            let normalized = self.normalizer.normalize(prompt);
            if !normalized.is_empty() {
                match self.matcher.match_text(&normalized).await {
                    Ok(result) => {
                        if result.confidence >= self.config.threshold_hard {
                            mini_answer =
                                self.mini.lookup(&result.slug, lang).map(str::to_string);
                        }
                        intent = result;
                    }
                    Err(e) => {
                        warn!("intent matching degraded to unknown: {}", e);
                    }
                }
            }
        }

        let hint = (intent.slug != UNKNOWN_SLUG && intent.confidence >= self.config.threshold)
            .then_some(intent.slug.as_str());

        let history = request.history.unwrap_or_default();
        let messages = self.prompts.build_messages(&history, prompt, hint);

        match self.gateway.answer(&messages).await {
            Ok(llm_answer) => ChatPlusResponse {
                intent_slug: intent.slug,
                intent_confidence: intent.confidence,
                mini_answer,
                llm_answer,
            },
            Err(e) => {
                warn!("hybrid generation failed: {}", e);
                // Intent facets reset on upstream failure; an already
                // computed canned answer survives.
                ChatPlusResponse {
                    intent_slug: UNKNOWN_SLUG.to_string(),
                    intent_confidence: 0.0,
                    mini_answer,
                    llm_answer: UPSTREAM_APOLOGY.to_string(),
                }
            }
        }
    }
}

fn unknown_ask() -> AskResponse {
    AskResponse {
        slug: UNKNOWN_SLUG.to_string(),
        confidence: 0.0,
        best_phrase: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use talapker_core::{ChatMessage, TalapkerError, TalapkerResult};
    use talapker_embedding::{Embedder, HashedEmbedder};
    use talapker_llm::{ChatProvider, STATIC_FALLBACK};
    use talapker_nlu::PhraseBank;

    #[derive(Clone)]
    struct ScriptedProvider {
        script: Arc<Mutex<Vec<TalapkerResult<String>>>>,
        calls: Arc<Mutex<Vec<Vec<ChatMessage>>>>,
    }

    impl ScriptedProvider {
        fn new(mut outcomes: Vec<TalapkerResult<String>>) -> Self {
            outcomes.reverse();
            Self {
                script: Arc::new(Mutex::new(outcomes)),
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn calls(&self) -> Vec<Vec<ChatMessage>> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatProvider for ScriptedProvider {
        async fn complete(
            &self,
            messages: &[ChatMessage],
            _temperature: f32,
            _max_tokens: u32,
        ) -> TalapkerResult<String> {
            self.calls.lock().unwrap().push(messages.to_vec());
            self.script
                .lock()
                .unwrap()
                .pop()
                .expect("provider called more often than scripted")
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    struct CountingEmbedder {
        inner: HashedEmbedder,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Embedder for CountingEmbedder {
        async fn embed_batch(&self, texts: &[String]) -> TalapkerResult<Vec<Vec<f32>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.embed_batch(texts).await
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    async fn handlers_with(
        config: AppConfig,
        outcomes: Vec<TalapkerResult<String>>,
    ) -> (ApiHandlers, ScriptedProvider, Arc<CountingEmbedder>) {
        let embedder = Arc::new(CountingEmbedder {
            inner: HashedEmbedder::default(),
            calls: AtomicUsize::new(0),
        });
        let shared: Arc<dyn Embedder> = embedder.clone();
        let matcher = IntentMatcher::build(shared, &PhraseBank::builtin(), config.threshold)
            .await
            .unwrap();
        embedder.calls.store(0, Ordering::SeqCst);

        let provider = ScriptedProvider::new(outcomes);
        let gateway = ChatGateway::new(
            Box::new(provider.clone()),
            config.temperature,
            config.max_tokens,
        );

        let handlers = ApiHandlers::new(
            config,
            Arc::new(matcher),
            Arc::new(CannedAnswerTable::builtin()),
            Arc::new(gateway),
        );
        (handlers, provider, embedder)
    }

    fn config() -> AppConfig {
        AppConfig {
            always_chat: false,
            ..AppConfig::default()
        }
    }

    fn chat_request(text: &str) -> ChatRequest {
        ChatRequest {
            text: text.to_string(),
            history: None,
        }
    }

    #[tokio::test]
    async fn empty_input_returns_prompt_reply_without_model_calls() {
        let (handlers, provider, embedder) = handlers_with(config(), vec![]).await;

        let ask = handlers
            .ask(AskRequest {
                text: "  ну!! ".to_string(),
            })
            .await;
        assert_eq!(ask.slug, UNKNOWN_SLUG);
        assert_eq!(ask.confidence, 0.0);
        assert_eq!(ask.best_phrase, "");

        let chat = handlers.chat(chat_request("   ")).await;
        assert_eq!(chat.answer, EMPTY_PROMPT_REPLY);

        let plus = handlers.chat_plus(chat_request("")).await;
        assert_eq!(plus.intent_slug, UNKNOWN_SLUG);
        assert_eq!(plus.llm_answer, EMPTY_PROMPT_REPLY);
        assert!(plus.mini_answer.is_none());

        assert!(provider.calls().is_empty());
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn ask_short_circuits_when_always_chat_is_set() {
        let mut cfg = config();
        cfg.always_chat = true;
        let (handlers, _provider, embedder) = handlers_with(cfg, vec![]).await;

        let ask = handlers
            .ask(AskRequest {
                text: "привет".to_string(),
            })
            .await;
        assert_eq!(ask.slug, UNKNOWN_SLUG);
        assert_eq!(ask.confidence, 0.0);
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn ask_classifies_exact_phrase() {
        let (handlers, _provider, _embedder) = handlers_with(config(), vec![]).await;

        let ask = handlers
            .ask(AskRequest {
                text: "Привет!!".to_string(),
            })
            .await;
        assert_eq!(ask.slug, "smalltalk");
        assert_eq!(ask.best_phrase, "привет");
        assert!(ask.confidence > 0.99);
    }

    #[tokio::test]
    async fn chat_contains_upstream_failures() {
        let (handlers, provider, _embedder) = handlers_with(
            config(),
            vec![Err(TalapkerError::Upstream("boom".to_string()))],
        )
        .await;

        let chat = handlers.chat(chat_request("расскажи про гранты")).await;
        assert_eq!(chat.answer, UPSTREAM_APOLOGY);
        assert_eq!(provider.calls().len(), 1);
    }

    #[tokio::test]
    async fn chat_plus_returns_all_three_facets_on_success() {
        // Exact phrase: confidence 1.0 clears the hard threshold.
        let (handlers, provider, _embedder) =
            handlers_with(config(), vec![Ok("Сәлем!".to_string())]).await;

        let plus = handlers.chat_plus(chat_request("привет")).await;
        assert_eq!(plus.intent_slug, "smalltalk");
        assert!(plus.intent_confidence > 0.99);
        assert_eq!(
            plus.mini_answer.as_deref(),
            Some("Привет! Чем помочь по WKATU: поступление, программы, гранты, общага?")
        );
        assert_eq!(plus.llm_answer, "Сәлем!");

        // The hint is appended to the current turn.
        let calls = provider.calls();
        let last_turn = calls[0].last().unwrap();
        assert!(last_turn.content.contains("вопрос про: smalltalk"));
    }

    #[tokio::test]
    async fn chat_plus_picks_kazakh_canned_answer_for_kazakh_query() {
        let mut cfg = config();
        cfg.threshold = 0.3;
        cfg.threshold_hard = 0.5;
        let (handlers, _provider, _embedder) =
            handlers_with(cfg, vec![Ok("Жауап.".to_string())]).await;

        let plus = handlers.chat_plus(chat_request("жатақхана")).await;
        assert_eq!(plus.intent_slug, "dorm");
        assert!(plus.mini_answer.unwrap().starts_with("Жатақхана"));
    }

    #[tokio::test]
    async fn canned_answer_is_never_selected_below_hard_threshold() {
        let mut cfg = config();
        cfg.threshold = 0.3;
        cfg.threshold_hard = 0.999;
        let (handlers, provider, _embedder) =
            handlers_with(cfg, vec![Ok("Ответ.".to_string())]).await;

        // Near but not exact: above soft, below hard.
        let plus = handlers.chat_plus(chat_request("привет дела")).await;
        assert!(plus.mini_answer.is_none());
        assert!(plus.intent_confidence < 0.999);

        // Soft gate still annotates the generative turn.
        if plus.intent_confidence >= 0.3 {
            let calls = provider.calls();
            assert!(calls[0].last().unwrap().content.contains("Похоже, что вопрос про:"));
        }
    }

    #[tokio::test]
    async fn chat_plus_resets_intent_but_keeps_mini_on_upstream_failure() {
        let (handlers, _provider, _embedder) = handlers_with(
            config(),
            vec![Err(TalapkerError::Upstream("down".to_string()))],
        )
        .await;

        let plus = handlers.chat_plus(chat_request("привет")).await;
        assert_eq!(plus.intent_slug, UNKNOWN_SLUG);
        assert_eq!(plus.intent_confidence, 0.0);
        assert!(plus.mini_answer.is_some());
        assert_eq!(plus.llm_answer, UPSTREAM_APOLOGY);
    }

    #[tokio::test]
    async fn chat_plus_skips_matching_when_mini_disabled() {
        let mut cfg = config();
        cfg.use_mini = false;
        let (handlers, _provider, embedder) =
            handlers_with(cfg, vec![Ok("Ответ.".to_string())]).await;

        let plus = handlers.chat_plus(chat_request("привет")).await;
        assert_eq!(plus.intent_slug, UNKNOWN_SLUG);
        assert!(plus.mini_answer.is_none());
        assert_eq!(plus.llm_answer, "Ответ.");
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_generation_falls_back_to_static_text() {
        let (handlers, provider, _embedder) =
            handlers_with(config(), vec![Ok(String::new()), Ok(String::new())]).await;

        let chat = handlers.chat(chat_request("что-нибудь")).await;
        assert_eq!(chat.answer, STATIC_FALLBACK);
        assert_eq!(provider.calls().len(), 2);
    }

    #[tokio::test]
    async fn health_reports_configuration() {
        let (handlers, _provider, _embedder) = handlers_with(config(), vec![]).await;
        let health = handlers.health();
        assert_eq!(health["status"], "ok");
        assert!((health["threshold"].as_f64().unwrap() - 0.84).abs() < 1e-6);
        assert!((health["threshold_hard"].as_f64().unwrap() - 0.88).abs() < 1e-6);
        assert_eq!(health["use_mini"], true);
    }
}
