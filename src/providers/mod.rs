//! Upstream model providers: query embedding and answer generation.

mod gemini;
mod jina;

pub use gemini::GeminiGenerator;
pub use jina::JinaEmbeddings;

use async_trait::async_trait;

use crate::core::errors::PipelineError;

#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text into a fixed-dimension vector.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, PipelineError>;
}

#[derive(Debug, Clone, Copy)]
pub struct GenerationOptions {
    pub temperature: f64,
    pub max_output_tokens: u32,
}

#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Generate an answer for the assembled prompt.
    async fn generate(
        &self,
        prompt: &str,
        options: GenerationOptions,
    ) -> Result<String, PipelineError>;
}

/// True when a key is absent or still holds a template placeholder.
pub(crate) fn key_unconfigured(key: &str) -> bool {
    key.trim().is_empty() || key.contains("your_")
}
