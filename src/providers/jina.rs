//! Jina embeddings client.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::{key_unconfigured, EmbeddingProvider};
use crate::core::errors::{FailureCause, PipelineError, Provider};

pub struct JinaEmbeddings {
    api_url: String,
    api_key: String,
    model: String,
    client: Client,
}

impl JinaEmbeddings {
    pub fn new(api_url: &str, api_key: &str, model: &str, client: Client) -> Self {
        Self {
            api_url: api_url.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            client,
        }
    }
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[async_trait]
impl EmbeddingProvider for JinaEmbeddings {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, PipelineError> {
        if key_unconfigured(&self.api_key) {
            return Err(PipelineError::upstream(
                Provider::Embedding,
                FailureCause::Auth,
                "embedding API key is not configured",
            ));
        }

        let body = json!({
            "input": [text],
            "model": self.model,
        });

        let res = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| PipelineError::from_reqwest(Provider::Embedding, e))?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(PipelineError::from_status(Provider::Embedding, status, text));
        }

        let response: EmbeddingResponse = res.json().await.map_err(|e| {
            PipelineError::upstream(Provider::Embedding, FailureCause::Malformed, e.to_string())
        })?;

        response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| {
                PipelineError::upstream(
                    Provider::Embedding,
                    FailureCause::Malformed,
                    "embedding response carried no vectors",
                )
            })
    }
}
