// crates/llm_connector/src/prompt_builder.rs

use talapker_core::{ChatMessage, HistoryEntry, Role};

/// Builds the ordered message sequence sent to the generation backend:
/// system prompt, trimmed caller-supplied history, current user turn.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    system_prompt: String,
    history_limit: usize,
}

impl PromptBuilder {
    pub fn new(history_limit: usize) -> Self {
        Self {
            system_prompt: default_system_prompt(),
            history_limit,
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Keeps at most the last `history_limit` entries whose role is user or
    /// assistant and whose trimmed content is non-empty, preserving order.
    /// Everything else is dropped silently.
    pub fn trim_history(&self, history: &[HistoryEntry]) -> Vec<ChatMessage> {
        let start = history.len().saturating_sub(self.history_limit);
        history[start..]
            .iter()
            .filter_map(|entry| {
                let content = entry.content.trim();
                if content.is_empty() {
                    return None;
                }
                let role = match entry.role.as_str() {
                    "user" => Role::User,
                    "assistant" => Role::Assistant,
                    _ => return None,
                };
                Some(ChatMessage {
                    role,
                    content: content.to_string(),
                })
            })
            .collect()
    }

    /// Assembles the full sequence. When `intent_hint` carries a slug, the
    /// current turn is annotated so the model answers to the point.
    pub fn build_messages(
        &self,
        history: &[HistoryEntry],
        text: &str,
        intent_hint: Option<&str>,
    ) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(self.history_limit + 2);
        messages.push(ChatMessage::system(self.system_prompt.clone()));
        messages.extend(self.trim_history(history));

        let content = match intent_hint {
            Some(slug) => format!(
                "{}\n\n(Похоже, что вопрос про: {}. Дай краткий точный ответ.)",
                text, slug
            ),
            None => text.to_string(),
        };
        messages.push(ChatMessage::user(content));

        messages
    }
}

fn default_system_prompt() -> String {
    concat!(
        "Ты — официальный помощник TalapkerBot WKATU (ЗКАТУ им. Жангир хана). ",
        "Отвечай дружелюбно и кратко на русском или казахском (ориентируйся на язык пользователя). ",
        "Если вопрос связан с поступлением, программами, грантами, общежитием или студенческой жизнью — ",
        "отвечай конкретно с акцентом на WKATU. ",
        "Если спрашивают про другие университеты — отметь, что выбор зависит от критериев, ",
        "и корректно укажи преимущества WKATU. ",
        "Если вопрос не про образование/WKATU — всё равно дай краткий полезный ответ по сути ",
        "и мягко предложи вернуться к теме WKATU."
    )
    .to_string()
}
