//! One request, end to end: load → split → embed → search → mask → complete →
//! unmask.
//!
//! Every stage failure is logged with the session id and aborts the request.
//! Nothing is retried, and nothing reaches the completion engine unless masking
//! succeeded.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::Instrument;
use ulid::Ulid;

use crate::completion::{CompletionEngine, CompletionError};
use crate::corpus::{self, CorpusError, RecursiveSplitter};
use crate::masking::{FieldRules, IdentityMapper, MaskingError};
use crate::retrieval::{Embedder, RetrievalError, SimilarityIndex};

const QUERY_SUFFIX: &str = ". Which two agents are the best for this?";

#[derive(Debug, thiserror::Error)]
pub enum SelectorError {
    #[error("task description is empty")]
    EmptyTask,
    #[error(transparent)]
    Corpus(#[from] CorpusError),
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),
    #[error("no agent document matched the task")]
    NoMatchingDocument,
    #[error("masking failed: {0}")]
    Masking(#[from] MaskingError),
    #[error(transparent)]
    Completion(#[from] CompletionError),
}

impl SelectorError {
    /// Short stage label for logs and API errors.
    pub fn stage(&self) -> &'static str {
        match self {
            SelectorError::EmptyTask => "input",
            SelectorError::Corpus(_) => "corpus",
            SelectorError::Retrieval(_) => "retrieval",
            SelectorError::NoMatchingDocument => "retrieval",
            SelectorError::Masking(_) => "masking",
            SelectorError::Completion(_) => "completion",
        }
    }
}

/// Turn the user's task into the question sent to the model.
pub fn compose_query(task: &str) -> String {
    format!("{}{QUERY_SUFFIX}", task.trim())
}

/// Result of one selection request.
#[derive(Debug, Clone)]
pub struct Selection {
    pub session_id: Ulid,
    /// Model answer with tokens restored.
    pub answer: String,
    /// File the top-ranked chunk came from.
    pub source: PathBuf,
    /// Surrogate tokens issued for this request, as (names, phones).
    pub masked_fields: (usize, usize),
}

pub struct AgentSelector {
    corpus_dir: PathBuf,
    splitter: RecursiveSplitter,
    top_k: usize,
    rules: FieldRules,
    embedder: Arc<dyn Embedder>,
    engine: Arc<dyn CompletionEngine>,
}

impl AgentSelector {
    pub fn new(
        corpus_dir: impl Into<PathBuf>,
        splitter: RecursiveSplitter,
        top_k: usize,
        embedder: Arc<dyn Embedder>,
        engine: Arc<dyn CompletionEngine>,
    ) -> Result<Self, SelectorError> {
        Ok(Self {
            corpus_dir: corpus_dir.into(),
            splitter,
            top_k: top_k.max(1),
            rules: FieldRules::standard()?,
            embedder,
            engine,
        })
    }

    /// Replace the standard field rules.
    pub fn with_rules(mut self, rules: FieldRules) -> Self {
        self.rules = rules;
        self
    }

    pub async fn select(&self, task: &str) -> Result<Selection, SelectorError> {
        if task.trim().is_empty() {
            return Err(SelectorError::EmptyTask);
        }

        let session_id = Ulid::new();
        let span = tracing::info_span!("selection", session_id = %session_id);
        self.run(session_id, task)
            .instrument(span)
            .await
            .inspect_err(|e| {
                tracing::error!(
                    session_id = %session_id,
                    stage = e.stage(),
                    error = %e,
                    "Agent selection failed"
                );
            })
    }

    async fn run(&self, session_id: Ulid, task: &str) -> Result<Selection, SelectorError> {
        let query = compose_query(task);

        let documents = corpus::load_documents(&self.corpus_dir)?;
        let chunks = self.splitter.split_documents(&documents);
        let index = SimilarityIndex::build(self.embedder.as_ref(), chunks).await?;
        let hits = index
            .search(self.embedder.as_ref(), &query, self.top_k)
            .await?;
        let top = hits
            .into_iter()
            .next()
            .ok_or(SelectorError::NoMatchingDocument)?;
        tracing::info!(
            source = %top.chunk.source.display(),
            score = top.score,
            indexed_chunks = index.len(),
            "Retrieved top agent document"
        );

        let mut mapper = IdentityMapper::new(self.rules.clone());
        let masked = mapper.mask(&top.chunk.text)?;
        let masked_fields = (mapper.names().len(), mapper.phones().len());
        let reverse = mapper.build_reverse_lists();
        tracing::info!(
            masked_names = masked_fields.0,
            masked_phones = masked_fields.1,
            "Masked document"
        );

        let answer = self.engine.answer(&query, &[masked]).await?;
        let answer = reverse.unmask(&answer)?;

        Ok(Selection {
            session_id,
            answer,
            source: top.chunk.source,
            masked_fields,
        })
    }
}
