//! The conversational retrieval-augmented query pipeline.
//!
//! One pass per query: validate, fetch history, persist the user turn, embed,
//! retrieve, assemble a bounded prompt, generate, shape the answer with its
//! source attributions, persist the assistant turn. No internal retries and
//! no persisted state between passes.

mod context;
mod history;
mod prompt;

pub use context::build_context;
pub use history::window_history;
pub use prompt::build_prompt;

use std::sync::Arc;

use serde::Serialize;

use crate::core::errors::PipelineError;
use crate::providers::{EmbeddingProvider, GenerationOptions, GenerationProvider};
use crate::retrieval::{NewsDocument, VectorSearch};
use crate::session::{SessionStore, SourceRef, Turn};

/// Returned without calling the generation provider when retrieval finds
/// nothing relevant.
pub const NO_RESULTS_ANSWER: &str = "Sorry, I could not find relevant articles to answer your \
question. Please try a different query.";

const MISSING_SOURCE_TITLE: &str = "Unknown";
const MISSING_SOURCE_LINK: &str = "#";

#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
    pub answer: String,
    pub sources: Vec<SourceRef>,
}

/// Tunables for a single pipeline instance.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub top_k: usize,
    pub history_window: usize,
    pub max_snippet_chars: usize,
    pub max_query_chars: usize,
    pub temperature: f64,
    pub max_output_tokens: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            history_window: 5,
            max_snippet_chars: 500,
            max_query_chars: 5000,
            temperature: 0.7,
            max_output_tokens: 500,
        }
    }
}

/// Query orchestrator. All collaborators are injected at construction; the
/// pipeline owns no process-wide singletons and no cross-session state.
pub struct QueryPipeline {
    embeddings: Arc<dyn EmbeddingProvider>,
    search: Arc<dyn VectorSearch>,
    generator: Arc<dyn GenerationProvider>,
    sessions: SessionStore,
    config: PipelineConfig,
}

impl QueryPipeline {
    pub fn new(
        embeddings: Arc<dyn EmbeddingProvider>,
        search: Arc<dyn VectorSearch>,
        generator: Arc<dyn GenerationProvider>,
        sessions: SessionStore,
        config: PipelineConfig,
    ) -> Self {
        Self {
            embeddings,
            search,
            generator,
            sessions,
            config,
        }
    }

    /// Answer a query in the context of a session.
    ///
    /// The user turn is persisted before any upstream call, so a failure
    /// mid-generation still leaves the user's message in the log. The
    /// assistant turn is persisted only after shaping succeeds.
    pub async fn answer(
        &self,
        session_id: &str,
        query: &str,
    ) -> Result<QueryResponse, PipelineError> {
        let query = self.validate_query(query)?;

        // Window source: history as it stood before this query.
        let prior_turns = self.sessions.history(session_id).await?;

        self.sessions
            .append(session_id, &Turn::user(query.clone()))
            .await?;

        let embedding = self.embeddings.embed(&query).await?;
        let documents = self.search.search(&embedding, self.config.top_k).await?;

        let response = if documents.is_empty() {
            tracing::info!("no candidates retrieved, skipping generation");
            QueryResponse {
                answer: NO_RESULTS_ANSWER.to_string(),
                sources: Vec::new(),
            }
        } else {
            let context = build_context(&documents, self.config.max_snippet_chars);
            let history_block = window_history(&prior_turns, self.config.history_window);
            let prompt = build_prompt(&context, &history_block, &query);

            let answer = self
                .generator
                .generate(
                    &prompt,
                    GenerationOptions {
                        temperature: self.config.temperature,
                        max_output_tokens: self.config.max_output_tokens,
                    },
                )
                .await?;

            QueryResponse {
                answer,
                sources: shape_sources(&documents),
            }
        };

        self.sessions
            .append(
                session_id,
                &Turn::assistant(response.answer.clone(), response.sources.clone()),
            )
            .await?;

        Ok(response)
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    fn validate_query(&self, raw: &str) -> Result<String, PipelineError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PipelineError::Validation(
                "query must be a non-empty string".to_string(),
            ));
        }
        if trimmed.chars().count() > self.config.max_query_chars {
            return Err(PipelineError::Validation(format!(
                "query exceeds maximum length of {} characters",
                self.config.max_query_chars
            )));
        }
        Ok(trimmed.to_string())
    }
}

/// Project candidates into the sources contract, preserving their order so
/// `sources[i]` matches `[Document i+1]` in the context block.
fn shape_sources(documents: &[NewsDocument]) -> Vec<SourceRef> {
    documents
        .iter()
        .map(|doc| SourceRef {
            title: doc
                .title
                .clone()
                .unwrap_or_else(|| MISSING_SOURCE_TITLE.to_string()),
            link: doc
                .link
                .clone()
                .unwrap_or_else(|| MISSING_SOURCE_LINK.to_string()),
            score: doc.score,
        })
        .collect()
}
