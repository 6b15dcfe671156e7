use std::sync::Arc;

use anyhow::Context;
use selector::api;
use selector::completion::OpenAiCompletion;
use selector::config::{self, SelectorConfig};
use selector::corpus::RecursiveSplitter;
use selector::pipeline::AgentSelector;
use selector::retrieval::FastEmbedder;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before reading config so OPENAI_KEY and SELECTOR_* are visible.
    let env_file = config::load_env_file();
    let config = SelectorConfig::from_env()?;
    selector::logging::init(config.log_file.as_deref())?;

    match env_file {
        Ok(Some(path)) => tracing::info!(path = %path.display(), "Loaded environment from .env"),
        Ok(None) => tracing::info!("No .env file found; using process environment only"),
        Err(e) => tracing::warn!(error = %format!("{e:#}"), "Ignoring .env file"),
    }
    tracing::info!(
        corpus_dir = %config.corpus_dir.display(),
        model = %config.model,
        chunk_size = config.chunk_size,
        chunk_overlap = config.chunk_overlap,
        "Starting Agent Selector"
    );

    let splitter = RecursiveSplitter::new(config.chunk_size, config.chunk_overlap)?;
    let cache_dir = config.embedding_cache_dir.clone();
    let embedder = tokio::task::spawn_blocking(move || FastEmbedder::new(cache_dir))
        .await
        .context("embedding model initialization panicked")??;
    let engine = OpenAiCompletion::new(
        config.completion_base_url.clone(),
        config.model.clone(),
        config.temperature,
        config.request_timeout,
    )?;

    let selector = AgentSelector::new(
        config.corpus_dir.clone(),
        splitter,
        config.top_k,
        Arc::new(embedder),
        Arc::new(engine),
    )?;

    let state = api::ApiState {
        selector: Arc::new(selector),
    };
    let app = api::router()
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("Starting HTTP server on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
