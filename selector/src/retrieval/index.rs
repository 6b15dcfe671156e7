use crate::corpus::Chunk;

use super::{cosine_similarity, Embedder, RetrievalError};

#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    /// Cosine similarity to the query in [-1, 1].
    pub score: f32,
}

/// In-memory vector index over one request's chunks.
#[derive(Debug, Default)]
pub struct SimilarityIndex {
    entries: Vec<(Chunk, Vec<f32>)>,
}

impl SimilarityIndex {
    pub async fn build(embedder: &dyn Embedder, chunks: Vec<Chunk>) -> Result<Self, RetrievalError> {
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = embedder.embed(texts).await?;
        if vectors.len() != chunks.len() {
            return Err(RetrievalError::VectorCount {
                expected: chunks.len(),
                got: vectors.len(),
            });
        }

        Ok(Self {
            entries: chunks.into_iter().zip(vectors).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Up to `k` chunks by descending similarity; ties keep corpus order.
    pub async fn search(
        &self,
        embedder: &dyn Embedder,
        query: &str,
        k: usize,
    ) -> Result<Vec<ScoredChunk>, RetrievalError> {
        if self.entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let vectors = embedder.embed(vec![query.to_string()]).await?;
        let [query_vector]: [Vec<f32>; 1] =
            vectors
                .try_into()
                .map_err(|v: Vec<Vec<f32>>| RetrievalError::VectorCount {
                    expected: 1,
                    got: v.len(),
                })?;

        let mut hits: Vec<ScoredChunk> = self
            .entries
            .iter()
            .map(|(chunk, vector)| ScoredChunk {
                chunk: chunk.clone(),
                score: cosine_similarity(&query_vector, vector),
            })
            .collect();
        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(k);
        Ok(hits)
    }
}
