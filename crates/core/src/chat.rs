// crates/core/src/chat.rs

use serde::{Deserialize, Serialize};

/// Slug reported when no intent could be classified.
pub const UNKNOWN_SLUG: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single turn in the conversation sent to the generation backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A caller-supplied history entry. The role is kept as a raw string so
/// unrecognized roles can be dropped during trimming instead of failing
/// deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: String,
}

/// Nearest-neighbor classification result for one query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentMatch {
    pub slug: String,
    pub confidence: f32,
    pub matched_phrase: String,
}

impl IntentMatch {
    pub fn unknown() -> Self {
        Self {
            slug: UNKNOWN_SLUG.to_string(),
            confidence: 0.0,
            matched_phrase: String::new(),
        }
    }
}
