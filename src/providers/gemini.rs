//! Gemini generateContent client.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::{key_unconfigured, GenerationOptions, GenerationProvider};
use crate::core::errors::{FailureCause, PipelineError, Provider};

pub struct GeminiGenerator {
    api_url: String,
    api_key: String,
    client: Client,
}

impl GeminiGenerator {
    pub fn new(api_url: &str, api_key: &str, client: Client) -> Self {
        Self {
            api_url: api_url.to_string(),
            api_key: api_key.to_string(),
            client,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[async_trait]
impl GenerationProvider for GeminiGenerator {
    async fn generate(
        &self,
        prompt: &str,
        options: GenerationOptions,
    ) -> Result<String, PipelineError> {
        if key_unconfigured(&self.api_key) {
            return Err(PipelineError::upstream(
                Provider::Generation,
                FailureCause::Auth,
                "generation API key is not configured",
            ));
        }

        let url = format!("{}?key={}", self.api_url, self.api_key);
        let body = json!({
            "contents": [{
                "parts": [{ "text": prompt }]
            }],
            "generationConfig": {
                "temperature": options.temperature,
                "maxOutputTokens": options.max_output_tokens,
            }
        });

        let res = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| PipelineError::from_reqwest(Provider::Generation, e))?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(PipelineError::from_status(
                Provider::Generation,
                status,
                text,
            ));
        }

        let response: GenerateResponse = res.json().await.map_err(|e| {
            PipelineError::upstream(Provider::Generation, FailureCause::Malformed, e.to_string())
        })?;

        // A 200 with no candidate or no parts is a malformed provider
        // response, distinct from a transport failure.
        extract_answer(response).ok_or_else(|| {
            PipelineError::upstream(
                Provider::Generation,
                FailureCause::Malformed,
                "generation response carried no candidates",
            )
        })
    }
}

fn extract_answer(response: GenerateResponse) -> Option<String> {
    response
        .candidates
        .into_iter()
        .next()?
        .content?
        .parts
        .into_iter()
        .next()?
        .text
}
