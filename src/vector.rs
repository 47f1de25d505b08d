//! # Vector Search Module
//!
//! ## Purpose
//! Dense nearest-neighbour search over chunk embeddings, with
//! metadata-filtered exact lookup by law+section for direct section
//! retrieval.
//!
//! ## Input/Output Specification
//! - **Input**: Chunk corpus + an [`Embedder`] at build time; query text at
//!   search time
//! - **Output**: `(corpus_index, cosine similarity)` pairs, best first
//!
//! The index is an exact scorer over the in-memory embedding matrix. The
//! approximate-NN structure of a production engine is out of scope; only the
//! two-operation contract matters to callers.

use crate::embedding::Embedder;
use crate::errors::{Result, SearchError};
use crate::{Chunk, Law};

/// One ranked vector result.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorHit {
    /// Position of the chunk in the loaded corpus
    pub corpus_index: usize,
    /// Cosine similarity against the query embedding
    pub score: f32,
}

/// Embedding index over the chunk corpus, built once and immutable thereafter.
pub struct VectorIndex {
    embeddings: Vec<Vec<f32>>,
    laws: Vec<Law>,
    sections: Vec<Option<String>>,
    dimension: usize,
}

impl VectorIndex {
    /// Embed every chunk and build the index, in corpus order.
    pub async fn build(chunks: &[Chunk], embedder: &dyn Embedder) -> Result<Self> {
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = embedder.embed(&texts).await?;

        if embeddings.len() != chunks.len() {
            return Err(SearchError::IndexBuildFailed {
                reason: format!(
                    "embedder returned {} vectors for {} chunks",
                    embeddings.len(),
                    chunks.len()
                ),
            });
        }

        let dimension = embedder.dimension();
        for embedding in &embeddings {
            if embedding.len() != dimension {
                return Err(SearchError::DimensionMismatch {
                    expected: dimension,
                    actual: embedding.len(),
                });
            }
        }

        tracing::info!(
            "Vector index built: {} vectors, dimension {}",
            embeddings.len(),
            dimension
        );

        Ok(Self {
            embeddings,
            laws: chunks.iter().map(|c| c.law).collect(),
            sections: chunks.iter().map(|c| c.section.clone()).collect(),
            dimension,
        })
    }

    pub fn len(&self) -> usize {
        self.embeddings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.embeddings.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Top-k chunks by embedding similarity over the whole corpus.
    pub async fn similarity_search(
        &self,
        embedder: &dyn Embedder,
        query: &str,
        k: usize,
    ) -> Result<Vec<VectorHit>> {
        let query_vec = self.embed_query(embedder, query).await?;
        Ok(self.rank(&query_vec, 0..self.len(), k))
    }

    /// Top-k chunks restricted to exact law+section metadata match. Returns
    /// an empty list when no chunk matches the filter. A `None` law matches
    /// either statute.
    pub async fn filtered_search(
        &self,
        embedder: &dyn Embedder,
        query: &str,
        k: usize,
        law: Option<Law>,
        section: &str,
    ) -> Result<Vec<VectorHit>> {
        let candidates: Vec<usize> = (0..self.len())
            .filter(|&i| self.sections[i].as_deref() == Some(section))
            .filter(|&i| law.map_or(true, |l| self.laws[i] == l))
            .collect();

        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let query_vec = self.embed_query(embedder, query).await?;
        Ok(self.rank(&query_vec, candidates.into_iter(), k))
    }

    async fn embed_query(&self, embedder: &dyn Embedder, query: &str) -> Result<Vec<f32>> {
        embedder
            .embed(&[query.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| SearchError::EmbeddingFailed {
                details: "embedder returned no vector for query".to_string(),
            })
    }

    fn rank(
        &self,
        query_vec: &[f32],
        candidates: impl Iterator<Item = usize>,
        k: usize,
    ) -> Vec<VectorHit> {
        let mut hits: Vec<VectorHit> = candidates
            .map(|i| VectorHit {
                corpus_index: i,
                score: cosine_similarity(query_vec, &self.embeddings[i]),
            })
            .collect();

        // Stable sort keeps corpus order among equal scores.
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(k);
        hits
    }
}

/// Cosine similarity; zero-magnitude vectors score zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|y| y * y).sum::<f32>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }
    dot / (mag_a * mag_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashingEmbedder;

    fn chunk(law: Law, section: &str, text: &str, id: u64) -> Chunk {
        Chunk {
            law,
            section: Some(section.to_string()),
            section_title: format!("Section {}", section),
            text: text.to_string(),
            source_file: format!("{}_page_001.txt", law.as_str().to_lowercase()),
            chunk_id: id,
        }
    }

    fn corpus() -> Vec<Chunk> {
        vec![
            chunk(Law::Ipc, "302", "IPC Section 302. Punishment for murder.: Whoever commits murder shall be punished with death or imprisonment for life.", 0),
            chunk(Law::Ipc, "420", "IPC Section 420. Cheating.: Whoever cheats and thereby dishonestly induces delivery of property shall be punished.", 1),
            chunk(Law::Crpc, "154", "CRPC Section 154. Information in cognizable cases.: Every information relating to a cognizable offence shall be recorded by the officer in charge.", 2),
        ]
    }

    #[tokio::test]
    async fn similarity_search_ranks_overlapping_text_first() {
        let embedder = HashingEmbedder::new(256);
        let index = VectorIndex::build(&corpus(), &embedder).await.unwrap();

        let hits = index
            .similarity_search(&embedder, "punishment for murder", 3)
            .await
            .unwrap();

        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].corpus_index, 0);
        assert!(hits[0].score > hits[2].score);
    }

    #[tokio::test]
    async fn similarity_search_truncates_to_k() {
        let embedder = HashingEmbedder::new(256);
        let index = VectorIndex::build(&corpus(), &embedder).await.unwrap();

        let hits = index.similarity_search(&embedder, "murder", 2).await.unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn filtered_search_returns_only_exact_matches() {
        let embedder = HashingEmbedder::new(256);
        let index = VectorIndex::build(&corpus(), &embedder).await.unwrap();

        let hits = index
            .filtered_search(&embedder, "IPC Section 302", 2, Some(Law::Ipc), "302")
            .await
            .unwrap();

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].corpus_index, 0);
    }

    #[tokio::test]
    async fn filtered_search_without_law_hint_matches_any_statute() {
        let embedder = HashingEmbedder::new(256);
        let index = VectorIndex::build(&corpus(), &embedder).await.unwrap();

        let hits = index
            .filtered_search(&embedder, "Section 154", 2, None, "154")
            .await
            .unwrap();

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].corpus_index, 2);
    }

    #[tokio::test]
    async fn filtered_search_on_absent_section_is_empty() {
        let embedder = HashingEmbedder::new(256);
        let index = VectorIndex::build(&corpus(), &embedder).await.unwrap();

        let hits = index
            .filtered_search(&embedder, "IPC Section 999", 2, Some(Law::Ipc), "999")
            .await
            .unwrap();

        assert!(hits.is_empty());
    }

    #[test]
    fn cosine_similarity_handles_zero_vectors() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
    }
}
