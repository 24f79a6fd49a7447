//! Text embedder.
//!
//! Converts free-text queries into fixed-length vectors compatible with the
//! similarity index's vector space. Uses trigram and word hashing into a
//! normalized vector: deterministic for identical input, pure, and cheap
//! enough to run inline on the request path. The offline pipeline that
//! builds the index artifact embeds product text with the same function.

use crate::vector::Vector;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone)]
pub struct Embedder {
    dim: usize,
}

impl Embedder {
    #[must_use]
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }

    #[inline]
    #[must_use]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Embed a text into a fixed-length normalized vector.
    #[must_use]
    pub fn embed(&self, text: &str) -> Vector {
        let mut components = vec![0.0f32; self.dim];
        let normalized = text.to_lowercase();

        for trigram in generate_trigrams(&normalized) {
            let mut hasher = DefaultHasher::new();
            trigram.hash(&mut hasher);
            let pos = (hasher.finish() as usize) % self.dim;
            components[pos] += 1.0;
        }

        for word in normalized.split_whitespace() {
            let mut hasher = DefaultHasher::new();
            word.hash(&mut hasher);
            let pos = (hasher.finish() as usize) % self.dim;
            components[pos] += 2.0; // Words contribute more
        }

        let mut vector = Vector::new(components);
        vector.normalize();
        vector
    }

    /// Batch embedding is a convenience over single calls; a batch of size
    /// one behaves identically to `embed`.
    #[must_use]
    pub fn embed_batch<S: AsRef<str>>(&self, texts: &[S]) -> Vec<Vector> {
        texts.iter().map(|t| self.embed(t.as_ref())).collect()
    }
}

/// Generate character trigrams from a string
fn generate_trigrams(s: &str) -> HashSet<String> {
    let padded = format!("  {}  ", s);
    let chars: Vec<char> = padded.chars().collect();

    if chars.len() < 3 {
        return HashSet::new();
    }

    chars
        .windows(3)
        .map(|w| w.iter().collect::<String>())
        .collect()
}
