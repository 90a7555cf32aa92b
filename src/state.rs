use std::sync::Arc;

use crate::core::config::Settings;
use crate::core::errors::PipelineError;
use crate::pipeline::{PipelineConfig, QueryPipeline};
use crate::providers::{GeminiGenerator, JinaEmbeddings};
use crate::retrieval::{QdrantSearch, VectorSearch};
use crate::session::{RedisListStore, SessionStore};

/// Shared application state handed to every route.
///
/// Every client is constructed here and injected explicitly; nothing in the
/// process reaches for a global instance.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub sessions: SessionStore,
    pub search: Arc<dyn VectorSearch>,
    pub pipeline: Arc<QueryPipeline>,
}

impl AppState {
    pub async fn initialize(settings: Settings) -> Result<Arc<Self>, PipelineError> {
        let http = reqwest::Client::builder()
            .timeout(settings.upstream_timeout)
            .build()
            .map_err(|e| PipelineError::Store(format!("http client init failed: {}", e)))?;

        let backend = Arc::new(RedisListStore::connect(&settings.redis_url).await?);
        let sessions = SessionStore::new(backend, settings.session_ttl, settings.max_turn_bytes);

        let embeddings = Arc::new(JinaEmbeddings::new(
            &settings.jina_api_url,
            &settings.jina_api_key,
            &settings.jina_model,
            http.clone(),
        ));
        let search: Arc<dyn VectorSearch> = Arc::new(QdrantSearch::new(
            &settings.qdrant_url,
            &settings.qdrant_collection,
            http.clone(),
        ));
        let generator = Arc::new(GeminiGenerator::new(
            &settings.gemini_api_url,
            &settings.gemini_api_key,
            http,
        ));

        let pipeline = Arc::new(QueryPipeline::new(
            embeddings,
            search.clone(),
            generator,
            sessions.clone(),
            PipelineConfig {
                top_k: settings.top_k,
                history_window: settings.history_window,
                max_snippet_chars: settings.max_snippet_chars,
                max_query_chars: settings.max_query_chars,
                temperature: settings.temperature,
                max_output_tokens: settings.max_output_tokens,
            },
        ));

        Ok(Arc::new(Self {
            settings: Arc::new(settings),
            sessions,
            search,
            pipeline,
        }))
    }
}
