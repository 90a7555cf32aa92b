//! Qdrant REST adapter for [`VectorSearch`].

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{NewsDocument, VectorSearch};
use crate::core::errors::PipelineError;

pub struct QdrantSearch {
    base_url: String,
    collection: String,
    client: Client,
}

impl QdrantSearch {
    pub fn new(base_url: &str, collection: &str, client: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            collection: collection.to_string(),
            client,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    result: Vec<ScoredPoint>,
}

#[derive(Debug, Deserialize)]
struct ScoredPoint {
    id: Value,
    #[serde(default)]
    score: f64,
    #[serde(default)]
    payload: Option<PointPayload>,
}

#[derive(Debug, Default, Deserialize)]
struct PointPayload {
    title: Option<String>,
    content: Option<String>,
    link: Option<String>,
}

impl From<ScoredPoint> for NewsDocument {
    fn from(point: ScoredPoint) -> Self {
        // Qdrant ids are numbers or strings depending on how the collection
        // was populated; normalize both to a string.
        let id = match &point.id {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        let payload = point.payload.unwrap_or_default();
        NewsDocument {
            id,
            score: point.score,
            title: payload.title,
            content: payload.content,
            link: payload.link,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CollectionInfoResponse {
    result: CollectionInfo,
}

#[derive(Debug, Deserialize)]
struct CollectionInfo {
    #[serde(default)]
    points_count: usize,
}

#[async_trait]
impl VectorSearch for QdrantSearch {
    async fn search(
        &self,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<NewsDocument>, PipelineError> {
        let url = format!(
            "{}/collections/{}/points/search",
            self.base_url, self.collection
        );
        let body = json!({
            "vector": embedding,
            "limit": top_k.max(1),
            "with_payload": true,
        });

        let res = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| PipelineError::Retrieval(format!("vector store unreachable: {}", e)))?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(PipelineError::Retrieval(format!(
                "search failed with status {}: {}",
                status, text
            )));
        }

        let response: SearchResponse = res
            .json()
            .await
            .map_err(|e| PipelineError::Retrieval(format!("malformed search response: {}", e)))?;

        Ok(response.result.into_iter().map(NewsDocument::from).collect())
    }

    async fn count(&self) -> Result<usize, PipelineError> {
        let url = format!("{}/collections/{}", self.base_url, self.collection);

        let res = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| PipelineError::Retrieval(format!("vector store unreachable: {}", e)))?;

        if !res.status().is_success() {
            return Err(PipelineError::Retrieval(format!(
                "collection info failed with status {}",
                res.status()
            )));
        }

        let response: CollectionInfoResponse = res.json().await.map_err(|e| {
            PipelineError::Retrieval(format!("malformed collection info: {}", e))
        })?;

        Ok(response.result.points_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_response_maps_to_documents_in_order() {
        let raw = json!({
            "result": [
                {"id": 1, "score": 0.93, "payload": {
                    "title": "Rates held", "content": "The bank held rates.",
                    "link": "https://example.com/rates"
                }},
                {"id": "abc", "score": 0.71, "payload": {
                    "title": "Storm warning", "content": "Coastal storm expected.",
                    "link": "https://example.com/storm"
                }}
            ]
        });

        let parsed: SearchResponse = serde_json::from_value(raw).unwrap();
        let docs: Vec<NewsDocument> = parsed.result.into_iter().map(NewsDocument::from).collect();

        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id, "1");
        assert_eq!(docs[0].title.as_deref(), Some("Rates held"));
        assert_eq!(docs[1].id, "abc");
        assert!(docs[0].score > docs[1].score);
    }

    #[test]
    fn missing_payload_fields_do_not_fail_the_point() {
        let raw = json!({
            "result": [
                {"id": 7, "score": 0.4},
                {"id": 8, "score": 0.3, "payload": {"title": "Only a title"}}
            ]
        });

        let parsed: SearchResponse = serde_json::from_value(raw).unwrap();
        let docs: Vec<NewsDocument> = parsed.result.into_iter().map(NewsDocument::from).collect();

        assert_eq!(docs.len(), 2);
        assert!(docs[0].title.is_none());
        assert!(docs[0].content.is_none());
        assert!(docs[0].link.is_none());
        assert_eq!(docs[1].title.as_deref(), Some("Only a title"));
        assert!(docs[1].content.is_none());
    }
}
