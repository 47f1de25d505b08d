//! # Embedding Module
//!
//! ## Purpose
//! The dense-embedding collaborator behind the vector index. The core only
//! depends on the [`Embedder`] trait; the concrete provider is wired at
//! startup.
//!
//! Two implementations:
//! - [`HttpEmbedder`]: a remote embedding server (sentence-transformer
//!   hosting) speaking a small JSON contract.
//! - [`HashingEmbedder`]: deterministic bag-of-tokens projection, used when
//!   no endpoint is configured and as a test fixture.

use crate::errors::{Result, SearchError};
use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};

/// Dense-embedding provider contract.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts, one vector per text, in input order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Output dimension of every vector this embedder produces.
    fn dimension(&self) -> usize;
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    texts: &'a [String],
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

/// Client for a remote embedding server.
///
/// Contract: `POST <endpoint>` with `{"texts": [...]}` returns
/// `{"embeddings": [[f32, ...], ...]}` aligned with the request order.
pub struct HttpEmbedder {
    client: reqwest::Client,
    endpoint: String,
    dimension: usize,
    batch_size: usize,
    concurrency: usize,
}

impl HttpEmbedder {
    pub fn new(
        endpoint: impl Into<String>,
        dimension: usize,
        batch_size: usize,
        concurrency: usize,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            dimension,
            batch_size: batch_size.max(1),
            concurrency: concurrency.max(1),
        }
    }

    async fn embed_batch(&self, batch: &[String]) -> Result<Vec<Vec<f32>>> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&EmbedRequest { texts: batch })
            .send()
            .await?
            .error_for_status()?;

        let body: EmbedResponse = response.json().await?;

        if body.embeddings.len() != batch.len() {
            return Err(SearchError::EmbeddingFailed {
                details: format!(
                    "expected {} embeddings, got {}",
                    batch.len(),
                    body.embeddings.len()
                ),
            });
        }
        for embedding in &body.embeddings {
            if embedding.len() != self.dimension {
                return Err(SearchError::DimensionMismatch {
                    expected: self.dimension,
                    actual: embedding.len(),
                });
            }
        }

        Ok(body.embeddings)
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let batches: Vec<&[String]> = texts.chunks(self.batch_size).collect();
        let futures: Vec<_> = batches.iter().map(|batch| self.embed_batch(batch)).collect();
        let results: Vec<Vec<Vec<f32>>> = stream::iter(futures)
            .buffered(self.concurrency)
            .try_collect()
            .await?;

        Ok(results.into_iter().flatten().collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Deterministic offline embedder: lower-cased whitespace tokens hashed into
/// a fixed-dimension bag-of-tokens vector, L2-normalized.
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];
        for token in text.to_lowercase().split_whitespace() {
            let slot = (fnv1a_64(token) % self.dimension as u64) as usize;
            vector[slot] += 1.0;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

fn fnv1a_64(token: &str) -> u64 {
    let mut hash = 0xcbf2_9ce4_8422_2325u64;
    for byte in token.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}
