// crates/core/src/lib.rs

pub mod chat;
pub mod result;

pub use chat::{ChatMessage, HistoryEntry, IntentMatch, Role, UNKNOWN_SLUG};
pub use result::{TalapkerError, TalapkerResult};
