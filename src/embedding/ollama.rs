//! Ollama-backed embedding gateway.
//!
//! Grounded in `original_source/internal/infrastructure/ollama/{client,embeddings}.go`:
//! one `POST /api/embeddings` request per input, sequentially. The Rust port
//! uses a shared `reqwest::Client` (spec.md §5 "a single HTTP client is
//! shared") instead of one-off `http.Post` calls.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{truncate_chars, EmbeddingGateway};
use crate::error::EmbeddingError;

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f64>,
}

pub struct OllamaGateway {
    client: reqwest::Client,
    base_url: String,
    model: String,
    max_chars: Option<usize>,
}

impl OllamaGateway {
    pub fn new(client: reqwest::Client, base_url: String, model: String, max_chars: Option<usize>) -> Self {
        Self {
            client,
            base_url,
            model,
            max_chars,
        }
    }

    async fn embed_one(&self, text: &str) -> Result<Vec<f64>, EmbeddingError> {
        let truncated = truncate_chars(text, self.max_chars);
        let resp = self
            .client
            .post(format!("{}/api/embeddings", self.base_url))
            .json(&EmbeddingRequest {
                model: &self.model,
                prompt: &truncated,
            })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(EmbeddingError::BadStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: EmbeddingResponse = resp.json().await?;
        Ok(parsed.embedding)
    }
}

#[async_trait]
impl EmbeddingGateway for OllamaGateway {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f64>>, EmbeddingError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed_one(text).await?);
        }
        Ok(vectors)
    }
}
