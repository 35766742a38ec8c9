// crates/embedding/src/lib.rs

use async_trait::async_trait;
use talapker_core::{TalapkerError, TalapkerResult};

pub mod hashed;
pub mod ollama;

pub use hashed::HashedEmbedder;
pub use ollama::OllamaEmbedder;

/// External capability mapping text to fixed-length unit-normalized vectors.
///
/// Implementations must return one vector per input text, in order, and are
/// expected to normalize their output so cosine similarity reduces to a dot
/// product.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed_batch(&self, texts: &[String]) -> TalapkerResult<Vec<Vec<f32>>>;

    async fn embed(&self, text: &str) -> TalapkerResult<Vec<f32>> {
        let batch = [text.to_string()];
        let mut vectors = self.embed_batch(&batch).await?;
        vectors
            .pop()
            .ok_or_else(|| TalapkerError::Embedding("provider returned an empty batch".to_string()))
    }

    fn name(&self) -> &str;
}

/// Scales a vector to unit length in place. Zero vectors are left untouched.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in vector.iter_mut() {
            *x /= norm;
        }
    }
}

/// Dot product over the common prefix of two vectors. For unit-normalized
/// inputs of equal dimensionality this is the cosine similarity.
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}
