//! # Hybrid Retrieval Module
//!
//! ## Purpose
//! Top-level retrieval entry point. Parses law/section hints from the query,
//! detects law/section mismatches, performs an exact-section override when a
//! section number is named, and otherwise fuses lexical and vector results
//! into one ranked, deduplicated list.
//!
//! ## Request state machine
//! 1. Parse law + section hints from the query
//! 2. Run the fused query and check whether the named law matches the laws
//!    actually found; a mismatch yields a clarification, never a fabricated
//!    citation
//! 3. With a section hint, run the metadata-filtered lookup; its results
//!    fully replace the fused candidates, and an empty lookup is reported as
//!    "section not found" rather than silently falling back
//! 4. Otherwise return the fused candidates, or "not found" when empty
//!
//! The service owns the chunk corpus and both indices; everything is built
//! once and read-only afterwards, so concurrent queries share it without
//! locking.

use crate::config::{Config, RetrievalConfig};
use crate::embedding::Embedder;
use crate::errors::{Result, SearchError};
use crate::lexical::LexicalIndex;
use crate::store::ChunkStore;
use crate::utils::ValidationUtils;
use crate::vector::VectorIndex;
use crate::{Chunk, Law};
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

/// Result of one retrieval request. Negative cases are explicit values, not
/// errors: the caller must distinguish "no match" from a failed request.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RetrievalOutcome {
    /// Ranked chunks with their metadata and matched text
    Results { chunks: Vec<Chunk> },
    /// Nothing relevant in the corpus
    NotFound,
    /// A section was explicitly requested but is absent from the corpus
    SectionNotFound { section: String },
    /// The query named one law but the matching documents belong to the other
    LawMismatch { requested: Law, found: Law },
}

impl RetrievalOutcome {
    /// Human-readable message for the negative outcomes.
    pub fn message(&self) -> Option<String> {
        match self {
            RetrievalOutcome::Results { .. } => None,
            RetrievalOutcome::NotFound => {
                Some("Answer not found in the provided legal documents.".to_string())
            }
            RetrievalOutcome::SectionNotFound { section } => Some(format!(
                "Section {} is not found in the provided legal documents.",
                section
            )),
            RetrievalOutcome::LawMismatch { found, .. } => Some(format!(
                "The requested section does not exist under the specified law. \
                 However, this section exists under the {}. \
                 Please confirm if you want the explanation under {}.",
                found, found
            )),
        }
    }
}

/// Corpus and index statistics for the stats endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct RetrievalStats {
    pub total_chunks: usize,
    pub ipc_chunks: usize,
    pub crpc_chunks: usize,
    pub vocabulary_size: usize,
    pub embedding_dimension: usize,
}

/// Hybrid retriever over the loaded corpus.
pub struct RetrievalService {
    chunks: Vec<Chunk>,
    lexical: LexicalIndex,
    vector: VectorIndex,
    embedder: Arc<dyn Embedder>,
    config: RetrievalConfig,
    section_pattern: Regex,
}

impl RetrievalService {
    /// Load the corpus and build both indices. Fails fast when the corpus is
    /// missing or empty; the service cannot start without it.
    pub async fn build(
        store: &ChunkStore,
        embedder: Arc<dyn Embedder>,
        config: &Config,
    ) -> Result<Self> {
        let chunks = store.load_all()?;

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let lexical = LexicalIndex::build(&texts, &config.lexical);
        let vector = VectorIndex::build(&chunks, embedder.as_ref()).await?;

        tracing::info!(
            "Retrieval service ready: {} chunks, {} terms, dimension {}",
            chunks.len(),
            lexical.vocabulary_size(),
            vector.dimension()
        );

        Ok(Self {
            chunks,
            lexical,
            vector,
            embedder,
            config: config.retrieval.clone(),
            section_pattern: Regex::new(r"\b(\d+[A-Z]*(?:\(\d+\))?)\b")
                .expect("valid section hint pattern"),
        })
    }

    /// Parse law and section hints from the query. The law comes from
    /// statute-name substrings in the lower-cased query; the section is the
    /// first token shaped like a section number in the raw query.
    pub fn parse_law_and_section(&self, query: &str) -> (Option<Law>, Option<String>) {
        let q = query.to_lowercase();

        let law = if q.contains("ipc") {
            Some(Law::Ipc)
        } else if q.contains("crpc") || q.contains("criminal procedure") {
            Some(Law::Crpc)
        } else {
            None
        };

        let section = self
            .section_pattern
            .captures(query)
            .map(|c| c[1].to_string());

        (law, section)
    }

    /// Serve one retrieval request.
    pub async fn retrieve(&self, query: &str, top_k: usize) -> Result<RetrievalOutcome> {
        if !ValidationUtils::is_valid_search_query(
            query,
            self.config.min_query_length,
            self.config.max_query_length,
        ) {
            return Err(SearchError::InvalidSearchQuery {
                query: query.to_string(),
                reason: format!(
                    "query length must be between {} and {} characters",
                    self.config.min_query_length, self.config.max_query_length
                ),
            });
        }
        if top_k == 0 {
            return Err(SearchError::InvalidSearchQuery {
                query: query.to_string(),
                reason: "top_k must be at least 1".to_string(),
            });
        }

        let (law_hint, section_hint) = self.parse_law_and_section(query);
        tracing::debug!(?law_hint, ?section_hint, "parsed query hints");

        // The fused query runs first so the mismatch check can see which laws
        // the corpus actually answers with.
        let fused = self.fused_query(query, top_k).await?;

        if let Some((requested, found)) = self.detect_law_mismatch(query, &fused) {
            tracing::debug!(%requested, %found, "law/section mismatch");
            return Ok(RetrievalOutcome::LawMismatch { requested, found });
        }

        if let Some(section) = section_hint {
            let lookup_query = match law_hint {
                Some(law) => format!("{} Section {}", law, section),
                None => format!("Section {}", section),
            };
            let hits = self
                .vector
                .filtered_search(
                    self.embedder.as_ref(),
                    &lookup_query,
                    self.config.section_lookup_k,
                    law_hint,
                    &section,
                )
                .await?;

            if hits.is_empty() {
                return Ok(RetrievalOutcome::SectionNotFound { section });
            }
            let chunks = hits
                .iter()
                .map(|h| self.chunks[h.corpus_index].clone())
                .collect();
            return Ok(RetrievalOutcome::Results { chunks });
        }

        if fused.is_empty() {
            return Ok(RetrievalOutcome::NotFound);
        }
        Ok(RetrievalOutcome::Results { chunks: fused })
    }

    /// Fused ranking: lexical and vector top-k unioned, deduplicated by
    /// `(source_file, chunk_id)` keeping the first occurrence, then stably
    /// sorted so section-bearing chunks come first, truncated to `top_k`.
    async fn fused_query(&self, query: &str, top_k: usize) -> Result<Vec<Chunk>> {
        let vector_hits = self
            .vector
            .similarity_search(self.embedder.as_ref(), query, top_k)
            .await?;
        let lexical_hits = self.lexical.query(query, top_k);

        let mut seen: HashSet<(&str, u64)> = HashSet::new();
        let mut merged: Vec<&Chunk> = Vec::new();
        let indices = vector_hits
            .iter()
            .map(|h| h.corpus_index)
            .chain(lexical_hits.iter().map(|h| h.corpus_index));
        for idx in indices {
            let chunk = &self.chunks[idx];
            if seen.insert((chunk.source_file.as_str(), chunk.chunk_id)) {
                merged.push(chunk);
            }
        }

        // Chunks without a section are deprioritized, never dropped.
        let mut merged: Vec<Chunk> = merged.into_iter().cloned().collect();
        merged.sort_by_key(|c| c.section.is_none());
        merged.truncate(top_k);
        Ok(merged)
    }

    /// A mismatch exists when the query names one statute but the fused
    /// results contain only the other.
    fn detect_law_mismatch(&self, query: &str, fused: &[Chunk]) -> Option<(Law, Law)> {
        let q = query.to_lowercase();
        let asked_ipc = q.contains("ipc");
        let asked_crpc = q.contains("crpc") || q.contains("criminal procedure");

        let available: HashSet<Law> = fused.iter().map(|c| c.law).collect();

        if asked_crpc && available.contains(&Law::Ipc) && !available.contains(&Law::Crpc) {
            return Some((Law::Crpc, Law::Ipc));
        }
        if asked_ipc && available.contains(&Law::Crpc) && !available.contains(&Law::Ipc) {
            return Some((Law::Ipc, Law::Crpc));
        }
        None
    }

    /// Corpus and index statistics.
    pub fn stats(&self) -> RetrievalStats {
        RetrievalStats {
            total_chunks: self.chunks.len(),
            ipc_chunks: self.chunks.iter().filter(|c| c.law == Law::Ipc).count(),
            crpc_chunks: self.chunks.iter().filter(|c| c.law == Law::Crpc).count(),
            vocabulary_size: self.lexical.vocabulary_size(),
            embedding_dimension: self.vector.dimension(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashingEmbedder;

    fn chunk(law: Law, section: Option<&str>, text: &str, source: &str, id: u64) -> Chunk {
        Chunk {
            law,
            section: section.map(str::to_string),
            section_title: section.map_or("fragment".to_string(), |s| format!("Section {}", s)),
            text: text.to_string(),
            source_file: source.to_string(),
            chunk_id: id,
        }
    }

    fn full_corpus() -> Vec<Chunk> {
        vec![
            chunk(Law::Ipc, Some("302"), "IPC Section 302. Punishment for murder.: Whoever commits murder shall be punished with death or imprisonment for life and shall also be liable to fine.", "ipc_page_050.txt", 0),
            chunk(Law::Ipc, Some("420"), "IPC Section 420. Cheating and dishonestly inducing delivery of property.: Whoever cheats and thereby dishonestly induces the person deceived to deliver any property shall be punished.", "ipc_page_061.txt", 1),
            chunk(Law::Ipc, Some("124A"), "IPC Section 124A. Sedition.: Whoever by words or signs brings or attempts to bring into hatred or contempt the Government shall be punished.", "ipc_page_022.txt", 2),
            chunk(Law::Crpc, Some("154"), "CRPC Section 154. Information in cognizable cases.: Every information relating to the commission of a cognizable offence shall be recorded by the officer in charge of a police station.", "crpc_page_030.txt", 3),
            chunk(Law::Crpc, Some("438"), "CRPC Section 438. Direction for grant of bail to person apprehending arrest.: Where any person has reason to believe that he may be arrested the High Court may direct anticipatory bail.", "crpc_page_110.txt", 4),
            chunk(Law::Ipc, None, "cheats and dishonestly cheats dishonestly cheats property delivery deceived", "ipc_page_061.txt", 5),
        ]
    }

    async fn service_with(chunks: Vec<Chunk>) -> RetrievalService {
        let dir = tempfile::tempdir().unwrap();
        let store = ChunkStore::new(dir.path());
        let ipc: Vec<Chunk> = chunks.iter().filter(|c| c.law == Law::Ipc).cloned().collect();
        let crpc: Vec<Chunk> = chunks.iter().filter(|c| c.law == Law::Crpc).cloned().collect();
        if !ipc.is_empty() {
            store.persist(Law::Ipc, &ipc).unwrap();
        }
        if !crpc.is_empty() {
            store.persist(Law::Crpc, &crpc).unwrap();
        }

        let config = Config::default();
        let embedder = Arc::new(HashingEmbedder::new(config.vector.dimension));
        RetrievalService::build(&store, embedder, &config).await.unwrap()
    }

    #[tokio::test]
    async fn parses_law_and_section_hints() {
        let service = service_with(full_corpus()).await;

        assert_eq!(
            service.parse_law_and_section("Explain IPC section 499"),
            (Some(Law::Ipc), Some("499".to_string()))
        );
        assert_eq!(
            service.parse_law_and_section("criminal procedure rules on bail"),
            (Some(Law::Crpc), None)
        );
        assert_eq!(
            service.parse_law_and_section("IPC 124A sedition"),
            (Some(Law::Ipc), Some("124A".to_string()))
        );
        assert_eq!(
            service.parse_law_and_section("what is cheating"),
            (None, None)
        );
    }

    #[tokio::test]
    async fn section_override_returns_only_that_section() {
        let service = service_with(full_corpus()).await;

        let outcome = service.retrieve("IPC section 302 punishment", 5).await.unwrap();
        match outcome {
            RetrievalOutcome::Results { chunks } => {
                assert!(!chunks.is_empty());
                assert!(chunks.iter().all(|c| c.section.as_deref() == Some("302")));
                assert!(chunks.iter().all(|c| c.law == Law::Ipc));
            }
            other => panic!("expected results, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn absent_section_is_reported_not_silently_replaced() {
        let service = service_with(full_corpus()).await;

        let outcome = service.retrieve("IPC section 999 punishment", 5).await.unwrap();
        match outcome {
            RetrievalOutcome::SectionNotFound { section } => assert_eq!(section, "999"),
            other => panic!("expected section-not-found, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn law_mismatch_yields_clarification_without_citations() {
        // Corpus holds IPC 302 only; asking for CrPC 302 must name IPC back.
        let ipc_only = vec![chunk(
            Law::Ipc,
            Some("302"),
            "IPC Section 302. Punishment for murder.: Whoever commits murder shall be punished with death or imprisonment for life.",
            "ipc_page_050.txt",
            0,
        )];
        let service = service_with(ipc_only).await;

        let outcome = service.retrieve("CrPC Section 302 punishment", 5).await.unwrap();
        match outcome {
            RetrievalOutcome::LawMismatch { requested, found } => {
                assert_eq!(requested, Law::Crpc);
                assert_eq!(found, Law::Ipc);
            }
            other => panic!("expected law mismatch, got {:?}", other),
        }
        assert!(service
            .retrieve("CrPC Section 302 punishment", 5)
            .await
            .unwrap()
            .message()
            .unwrap()
            .contains("IPC"));
    }

    #[tokio::test]
    async fn fused_results_are_bounded_deduplicated_and_section_first() {
        let service = service_with(full_corpus()).await;

        let outcome = service
            .retrieve("cheats dishonestly property delivery deceived", 4)
            .await
            .unwrap();
        let chunks = match outcome {
            RetrievalOutcome::Results { chunks } => chunks,
            other => panic!("expected results, got {:?}", other),
        };

        assert!(chunks.len() <= 4);

        let mut keys = HashSet::new();
        for c in &chunks {
            assert!(keys.insert((c.source_file.clone(), c.chunk_id)));
        }

        // The sectionless fragment overlaps the query heavily, yet every
        // section-bearing result must precede it.
        let first_none = chunks.iter().position(|c| c.section.is_none());
        if let Some(pos) = first_none {
            assert!(chunks[..pos].iter().all(|c| c.section.is_some()));
            assert!(chunks[pos..].iter().all(|c| c.section.is_none()));
        }
        assert!(chunks.iter().any(|c| c.section.as_deref() == Some("420")));
    }

    #[tokio::test]
    async fn top_k_of_one_returns_single_result() {
        let service = service_with(full_corpus()).await;

        let outcome = service.retrieve("anticipatory bail arrest", 1).await.unwrap();
        match outcome {
            RetrievalOutcome::Results { chunks } => assert_eq!(chunks.len(), 1),
            other => panic!("expected results, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn invalid_queries_are_rejected() {
        let service = service_with(full_corpus()).await;

        assert!(matches!(
            service.retrieve("", 5).await,
            Err(SearchError::InvalidSearchQuery { .. })
        ));
        assert!(matches!(
            service.retrieve("a", 5).await,
            Err(SearchError::InvalidSearchQuery { .. })
        ));
        assert!(matches!(
            service.retrieve("valid query", 0).await,
            Err(SearchError::InvalidSearchQuery { .. })
        ));
    }

    #[tokio::test]
    async fn negative_outcomes_carry_messages() {
        let not_found = RetrievalOutcome::NotFound;
        assert!(not_found.message().unwrap().contains("not found"));

        let section = RetrievalOutcome::SectionNotFound {
            section: "999".to_string(),
        };
        assert!(section.message().unwrap().contains("999"));

        let results = RetrievalOutcome::Results { chunks: Vec::new() };
        assert!(results.message().is_none());
    }

    #[tokio::test]
    async fn stats_reflect_the_corpus() {
        let service = service_with(full_corpus()).await;
        let stats = service.stats();

        assert_eq!(stats.total_chunks, 6);
        assert_eq!(stats.ipc_chunks, 4);
        assert_eq!(stats.crpc_chunks, 2);
        assert!(stats.vocabulary_size > 0);
    }
}
