use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

use super::{Embedder, RetrievalError};

/// Local sentence-embedding model (all-MiniLM-L6-v2) backed by fastembed.
///
/// Inference is synchronous, so every call hops onto the blocking pool.
#[derive(Clone)]
pub struct FastEmbedder {
    model: Arc<Mutex<TextEmbedding>>,
}

impl FastEmbedder {
    pub fn new(cache_dir: Option<PathBuf>) -> Result<Self, RetrievalError> {
        let mut options =
            InitOptions::new(EmbeddingModel::AllMiniLML6V2).with_show_download_progress(false);
        if let Some(dir) = cache_dir {
            options = options.with_cache_dir(dir);
        }

        let model =
            TextEmbedding::try_new(options).map_err(|e| RetrievalError::ModelInit(e.to_string()))?;
        tracing::info!("Embedding model ready");
        Ok(Self {
            model: Arc::new(Mutex::new(model)),
        })
    }
}

#[async_trait]
impl Embedder for FastEmbedder {
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, RetrievalError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let model = Arc::clone(&self.model);
        tokio::task::spawn_blocking(move || {
            let mut model = model
                .lock()
                .map_err(|_| RetrievalError::Embedding("embedding model lock poisoned".into()))?;
            model
                .embed(texts, None)
                .map_err(|e| RetrievalError::Embedding(e.to_string()))
        })
        .await
        .map_err(|e| RetrievalError::Embedding(format!("join error: {e}")))?
    }
}
