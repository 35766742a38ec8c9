// crates/embedding/src/hashed.rs

use async_trait::async_trait;
use talapker_core::TalapkerResult;

use crate::{l2_normalize, Embedder};

const DEFAULT_DIMENSIONS: usize = 256;

/// Deterministic local embedder hashing word and character-trigram features
/// into a fixed number of buckets. Identical text always maps to an identical
/// unit vector, so an exact phrase-bank hit scores a cosine similarity of 1.
///
/// Not a semantic model. Used by tests and as an offline last resort when no
/// embedding backend is reachable.
pub struct HashedEmbedder {
    dimensions: usize,
}

impl HashedEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];

        for word in text.split_whitespace() {
            vector[bucket(word.as_bytes(), self.dimensions)] += 2.0;

            let chars: Vec<char> = word.chars().collect();
            if chars.len() < 3 {
                continue;
            }
            for window in chars.windows(3) {
                let trigram: String = window.iter().collect();
                vector[bucket(trigram.as_bytes(), self.dimensions)] += 1.0;
            }
        }

        l2_normalize(&mut vector);
        vector
    }
}

impl Default for HashedEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSIONS)
    }
}

// FNV-1a. DefaultHasher is not guaranteed stable across releases; the bank
// and query must hash identically within and across builds.
fn bucket(bytes: &[u8], dimensions: usize) -> usize {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    (hash % dimensions as u64) as usize
}

#[async_trait]
impl Embedder for HashedEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> TalapkerResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }

    fn name(&self) -> &str {
        "hashed"
    }
}
