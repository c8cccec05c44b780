use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::StatusCode;
use serde_json::{json, Value};

use crate::providers::configs::get_env;

/// Anything that can turn texts into fixed-length vectors.
///
/// Property: all texts embedded by one implementation instance produce
/// vectors of identical length.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts, one vector per input in order
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single query text
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| anyhow!("Embedding response contained no vectors"))
    }
}

#[derive(Debug, Clone)]
pub struct OllamaEmbeddingsConfig {
    pub model: String,
    pub host: String,
}

impl OllamaEmbeddingsConfig {
    /// Both values are required for the retrieval demo
    pub fn from_env() -> Result<Self> {
        let model = get_env("OLLAMA_EMBEDDING_MODEL", true, None)?.unwrap_or_default();
        let host = get_env("OLLAMA_BASE_URL", true, None)?.unwrap_or_default();
        Ok(Self { model, host })
    }
}

/// Embeddings client backed by an Ollama server's embed endpoint
pub struct OllamaEmbeddings {
    client: Client,
    config: OllamaEmbeddingsConfig,
}

impl OllamaEmbeddings {
    pub fn new(config: OllamaEmbeddingsConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    async fn post(&self, payload: Value) -> Result<Value> {
        let url = format!("{}/api/embed", self.config.host.trim_end_matches('/'));

        let response = self.client.post(&url).json(&payload).send().await?;

        match response.status() {
            StatusCode::OK => Ok(response.json().await?),
            status => Err(anyhow!("Embedding request failed: {}", status)),
        }
    }
}

#[async_trait]
impl Embedder for OllamaEmbeddings {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let payload = json!({
            "model": self.config.model,
            "input": texts,
        });

        let response = self.post(payload).await?;

        let embeddings = response
            .get("embeddings")
            .and_then(|v| v.as_array())
            .ok_or_else(|| anyhow!("Embedding response is missing 'embeddings'"))?;

        let mut vectors = Vec::with_capacity(embeddings.len());
        for embedding in embeddings {
            let vector: Vec<f32> = embedding
                .as_array()
                .ok_or_else(|| anyhow!("Embedding entry is not an array"))?
                .iter()
                .map(|v| v.as_f64().unwrap_or_default() as f32)
                .collect();
            vectors.push(vector);
        }

        if vectors.len() != texts.len() {
            return Err(anyhow!(
                "Expected {} embeddings, got {}",
                texts.len(),
                vectors.len()
            ));
        }

        Ok(vectors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn embeddings_for(server: &MockServer) -> OllamaEmbeddings {
        OllamaEmbeddings::new(OllamaEmbeddingsConfig {
            model: "nomic-embed-text".to_string(),
            host: server.uri(),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_embed_batch_preserves_order_and_length() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "nomic-embed-text",
                "embeddings": [[0.1, 0.2, 0.3], [0.4, 0.5, 0.6]]
            })))
            .mount(&server)
            .await;

        let embeddings = embeddings_for(&server).await;
        let vectors = embeddings
            .embed(&["first chunk".to_string(), "second chunk".to_string()])
            .await?;

        assert_eq!(vectors.len(), 2);
        // Same configuration yields vectors of identical length
        assert_eq!(vectors[0].len(), vectors[1].len());
        assert_eq!(vectors[0], vec![0.1, 0.2, 0.3]);
        Ok(())
    }

    #[tokio::test]
    async fn test_embed_count_mismatch_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "embeddings": [[0.1, 0.2]]
            })))
            .mount(&server)
            .await;

        let embeddings = embeddings_for(&server).await;
        let err = embeddings
            .embed(&["a".to_string(), "b".to_string()])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Expected 2 embeddings"));
    }

    #[tokio::test]
    async fn test_embed_empty_input_skips_request() -> Result<()> {
        let server = MockServer::start().await;
        // No mock mounted: a request would 404
        let embeddings = embeddings_for(&server).await;
        assert!(embeddings.embed(&[]).await?.is_empty());
        Ok(())
    }
}
