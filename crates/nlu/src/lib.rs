// crates/nlu/src/lib.rs

pub mod lang;
pub mod matcher;
pub mod mini;
pub mod normalize;
pub mod phrase_bank;

pub use lang::detect_lang;
pub use matcher::IntentMatcher;
pub use mini::CannedAnswerTable;
pub use normalize::TextNormalizer;
pub use phrase_bank::{PhraseBank, PhraseEntry, PhraseGroup};
