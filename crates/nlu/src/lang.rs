// crates/nlu/src/lang.rs

/// Cyrillic letters used by Kazakh but not Russian.
const KAZAKH_LETTERS: &str = "әғқңөұүіӘҒҚҢӨҰҮІ";

/// Diagnostic Kazakh words for text written without Kazakh-specific letters.
const KAZAKH_MARKERS: &[&str] = &["жатақхана", "гранттар", "құжат", "бағдарлама", "сәлем"];

/// Heuristic Kazakh/Russian classifier. Biased toward `ru` for ambiguous
/// short greetings; not a general language identifier.
pub fn detect_lang(text: &str) -> &'static str {
    if text.chars().any(|c| KAZAKH_LETTERS.contains(c)) {
        return "kz";
    }

    let lowered = text.to_lowercase();
    if KAZAKH_MARKERS.iter().any(|word| lowered.contains(word)) {
        return "kz";
    }

    "ru"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kazakh_specific_letters_win() {
        assert_eq!(detect_lang("жатақхана кезек қанша?"), "kz");
        assert_eq!(detect_lang("Сәлем!"), "kz");
    }

    #[test]
    fn marker_words_detected_case_insensitively() {
        // No Kazakh-specific letters in this spelling, marker word only.
        assert_eq!(detect_lang("ГРАНТТАР туралы"), "kz");
    }

    #[test]
    fn defaults_to_russian() {
        assert_eq!(detect_lang("Привет, как дела?"), "ru");
        assert_eq!(detect_lang("hello"), "ru");
        assert_eq!(detect_lang(""), "ru");
    }
}
