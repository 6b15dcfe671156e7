//! Embedding and nearest-neighbour lookup over corpus chunks.

mod embedder;
mod index;

pub use embedder::FastEmbedder;
pub use index::{ScoredChunk, SimilarityIndex};

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("embedding model initialization failed: {0}")]
    ModelInit(String),
    #[error("embedding failed: {0}")]
    Embedding(String),
    #[error("embedder returned {got} vectors for {expected} inputs")]
    VectorCount { expected: usize, got: usize },
}

/// Turns text into dense vectors.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, RetrievalError>;
}

/// Cosine similarity; 0.0 for mismatched lengths or zero vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
