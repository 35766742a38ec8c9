// crates/nlu/src/matcher.rs

use std::sync::Arc;

use talapker_core::{IntentMatch, TalapkerError, TalapkerResult, UNKNOWN_SLUG};
use talapker_embedding::{dot, Embedder};
use tracing::{debug, info};

use crate::phrase_bank::{PhraseBank, PhraseEntry};

/// Nearest-neighbor intent matcher over a pre-embedded phrase bank.
///
/// The index is built once at startup and read-only afterwards, so the
/// matcher is safe to share behind an `Arc` across request handlers.
pub struct IntentMatcher {
    embedder: Arc<dyn Embedder>,
    entries: Vec<PhraseEntry>,
    vectors: Vec<Vec<f32>>,
    /// Soft threshold used only by the `classify` convenience wrapper.
    threshold: f32,
}

impl IntentMatcher {
    /// Embeds the whole catalogue in one batch and freezes the index.
    pub async fn build(
        embedder: Arc<dyn Embedder>,
        bank: &PhraseBank,
        threshold: f32,
    ) -> TalapkerResult<Self> {
        let entries = bank.entries();
        if entries.is_empty() {
            return Err(TalapkerError::Nlu(
                "Cannot build an index from an empty phrase bank".to_string(),
            ));
        }

        let phrases: Vec<String> = entries.iter().map(|e| e.phrase.clone()).collect();
        let vectors = embedder.embed_batch(&phrases).await?;

        if vectors.len() != entries.len() {
            return Err(TalapkerError::Embedding(format!(
                "Phrase bank embedding mismatch: {} phrases, {} vectors",
                entries.len(),
                vectors.len()
            )));
        }

        info!(
            phrases = entries.len(),
            embedder = embedder.name(),
            "phrase bank index built"
        );

        Ok(Self {
            embedder,
            entries,
            vectors,
            threshold,
        })
    }

    /// Raw nearest-neighbor match. Always carries the true score and slug;
    /// thresholds are the caller's business. Empty input returns the unknown
    /// match without touching the embedder.
    pub async fn match_text(&self, normalized_text: &str) -> TalapkerResult<IntentMatch> {
        if normalized_text.is_empty() {
            return Ok(IntentMatch::unknown());
        }

        let query = self.embedder.embed(normalized_text).await?;

        let mut best_idx = 0usize;
        let mut best_score = f32::NEG_INFINITY;
        for (idx, vector) in self.vectors.iter().enumerate() {
            let score = dot(&query, vector);
            // Strict comparison: the first maximum wins on exact ties.
            if score > best_score {
                best_score = score;
                best_idx = idx;
            }
        }

        let entry = &self.entries[best_idx];
        debug!(
            slug = %entry.slug,
            score = best_score,
            phrase = %entry.phrase,
            "nearest phrase"
        );

        Ok(IntentMatch {
            slug: entry.slug.clone(),
            confidence: best_score,
            matched_phrase: entry.phrase.clone(),
        })
    }

    /// Single-result entry point used by `/ask`: below the soft threshold
    /// the slug is masked to `unknown`, but the real score and matched
    /// phrase are still reported.
    pub async fn classify(&self, normalized_text: &str) -> TalapkerResult<IntentMatch> {
        let mut result = self.match_text(normalized_text).await?;
        if result.confidence < self.threshold {
            result.slug = UNKNOWN_SLUG.to_string();
        }
        Ok(result)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::TextNormalizer;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use talapker_embedding::HashedEmbedder;

    /// Wraps the hashed embedder and counts calls, to prove the empty-input
    /// short circuit never reaches the model.
    struct CountingEmbedder {
        inner: HashedEmbedder,
        calls: AtomicUsize,
    }

    impl CountingEmbedder {
        fn new() -> Self {
            Self {
                inner: HashedEmbedder::default(),
                calls: AtomicUsize::new(0),
            }
        }
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

    async fn matcher_with(threshold: f32) -> IntentMatcher {
        IntentMatcher::build(
            Arc::new(HashedEmbedder::default()),
            &PhraseBank::builtin(),
            threshold,
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn exact_phrase_is_a_self_match() {
        let matcher = matcher_with(0.84).await;
        let result = matcher.match_text("привет").await.unwrap();
        assert_eq!(result.slug, "smalltalk");
        assert_eq!(result.matched_phrase, "привет");
        assert!((result.confidence - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn normalized_query_self_match_dominates_other_queries() {
        let normalizer = TextNormalizer::new();
        let matcher = matcher_with(0.84).await;

        let exact = matcher
            .match_text(&normalizer.normalize("Общежитие!"))
            .await
            .unwrap();
        let vague = matcher
            .match_text(&normalizer.normalize("расскажи что-нибудь"))
            .await
            .unwrap();
        assert!(exact.confidence >= vague.confidence);
        assert_eq!(exact.slug, "dorm");
    }

    #[tokio::test]
    async fn empty_input_skips_the_embedder() {
        let embedder = Arc::new(CountingEmbedder::new());
        let matcher = IntentMatcher::build(embedder.clone(), &PhraseBank::builtin(), 0.84)
            .await
            .unwrap();
        let builds = embedder.calls.load(Ordering::SeqCst);

        let result = matcher.match_text("").await.unwrap();
        assert_eq!(result.slug, UNKNOWN_SLUG);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.matched_phrase, "");
        assert_eq!(embedder.calls.load(Ordering::SeqCst), builds);
    }

    #[tokio::test]
    async fn classify_masks_slug_below_soft_threshold() {
        // Threshold above anything a non-exact query can reach.
        let matcher = matcher_with(0.999).await;
        let result = matcher.classify("привет дела").await.unwrap();
        assert_eq!(result.slug, UNKNOWN_SLUG);
        assert!(result.confidence > 0.0);
        assert!(!result.matched_phrase.is_empty());
    }

    #[tokio::test]
    async fn classify_keeps_slug_at_or_above_threshold() {
        let matcher = matcher_with(0.84).await;
        let result = matcher.classify("гранты").await.unwrap();
        assert_eq!(result.slug, "grants");
    }

    #[tokio::test]
    async fn first_occurrence_wins_on_duplicate_phrases() {
        // "жатақхана" appears in both dorm groups; the earlier entry must be
        // the one reported.
        let matcher = matcher_with(0.84).await;
        let result = matcher.match_text("жатақхана").await.unwrap();
        assert_eq!(result.slug, "dorm");
        assert_eq!(result.matched_phrase, "жатақхана");

        let first_index = matcher
            .entries
            .iter()
            .position(|e| e.phrase == "жатақхана")
            .unwrap();
        assert!(first_index < matcher.len() - 13);
    }
}
