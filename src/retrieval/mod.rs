//! Retrieval: ranked news documents out of a vector index.

mod qdrant;

pub use qdrant::QdrantSearch;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::errors::PipelineError;

/// A retrieval candidate, pre-ranked by the provider.
///
/// Payload fields are optional on purpose: a point with a missing title,
/// content or link is still usable and must not fail the whole search.
/// Downstream rendering substitutes placeholders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsDocument {
    pub id: String,
    pub score: f64,
    pub title: Option<String>,
    pub content: Option<String>,
    pub link: Option<String>,
}

/// Seam over the vector search provider.
///
/// `search` returns at most `top_k` documents in descending score order as
/// delivered by the provider; that order is preserved through context
/// assembly and into the shaped sources list.
#[async_trait]
pub trait VectorSearch: Send + Sync {
    async fn search(
        &self,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<NewsDocument>, PipelineError>;

    /// Total number of indexed points, for the status surface.
    async fn count(&self) -> Result<usize, PipelineError>;
}
