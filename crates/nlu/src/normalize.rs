// crates/nlu/src/normalize.rs

use regex::{Regex, RegexBuilder};

const FILLERS: &[&str] = &[
    "ну", "типа", "короче", "вообще", "вообщем", "смотри", "слушай", "эй", "ей", "чё", "че",
    "ёу", "ээ", "аа",
];

// Applied in declaration order; later entries must not reintroduce earlier
// left-hand sides.
const ALIASES: &[(&str, &str)] = &[
    ("wkau", "wkatu"),
    ("zkatu", "wkatu"),
    ("жангир", "wkatu"),
    ("жангір", "wkatu"),
];

/// Query normalizer applied before phrase-bank matching: case folding,
/// discourse-filler removal, punctuation stripping and canonicalization of
/// known spelling variants of the institution's short name.
pub struct TextNormalizer {
    fillers: Regex,
    non_words: Regex,
    spaces: Regex,
}

impl TextNormalizer {
    pub fn new() -> Self {
        let alternatives = FILLERS
            .iter()
            .map(|f| regex::escape(f))
            .collect::<Vec<_>>()
            .join("|");

        let fillers = RegexBuilder::new(&format!(r"\b(?:{})\b", alternatives))
            .case_insensitive(true)
            .unicode(true)
            .build()
            .expect("filler pattern is static");

        Self {
            fillers,
            non_words: Regex::new(r"[^\w\s]+").expect("static pattern"),
            spaces: Regex::new(r"\s+").expect("static pattern"),
        }
    }

    /// Total on any input; empty input normalizes to the empty string.
    /// Idempotent: normalizing a normalized string is a no-op.
    pub fn normalize(&self, text: &str) -> String {
        let lowered = text.to_lowercase();
        let mut result = self.fillers.replace_all(lowered.trim(), " ").into_owned();
        result = self.non_words.replace_all(&result, " ").into_owned();

        for (variant, canonical) in ALIASES {
            result = result.replace(variant, canonical);
        }

        self.spaces.replace_all(&result, " ").trim().to_string()
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}
