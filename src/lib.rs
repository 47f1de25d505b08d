//! # Statute Search Engine
//!
//! ## Overview
//! This library implements a retrieval engine for Indian criminal statute law
//! (the Indian Penal Code and the Code of Criminal Procedure) that combines
//! BM25 lexical ranking with semantic vector search.
//!
//! ## Architecture
//! The system is composed of several key modules:
//! - `ingestion`: Offline batch pipeline turning extracted page text into chunks
//! - `text_cleaning`: Ordered cleaning stages for raw statute page text
//! - `extraction`: Section splitting with structural/index page gating
//! - `chunking`: Bounded-size chunk emission with section metadata
//! - `store`: Law-partitioned persisted chunk collections
//! - `lexical`: BM25 token-overlap ranking over the chunk corpus
//! - `vector`: Embedding similarity search with metadata-filtered lookup
//! - `retrieval`: Hybrid retriever with section override and mismatch detection
//! - `api`: REST endpoints serving retrieval results
//! - `config`: Configuration management and settings
//! - `errors`: Centralized error handling and types
//!
//! ## Input/Output Specification
//! - **Input**: Extracted statute page text files, search queries (text)
//! - **Output**: Ranked chunk references with section metadata and matched text
//! - **Performance**: Sub-second query response times, deterministic results
//!
//! ## Usage
//! ```rust,no_run
//! use std::sync::Arc;
//! use statute_search::{Config, RetrievalService};
//! use statute_search::embedding::HashingEmbedder;
//! use statute_search::store::ChunkStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_file("config.toml")?;
//!     let store = ChunkStore::new(&config.storage.chunks_dir);
//!     let embedder = Arc::new(HashingEmbedder::new(config.vector.dimension));
//!     let service = RetrievalService::build(&store, embedder, &config).await?;
//!     let outcome = service.retrieve("Explain IPC section 499", 5).await?;
//!     println!("{:?}", outcome);
//!     Ok(())
//! }
//! ```

// Core modules
pub mod api;
pub mod chunking;
pub mod config;
pub mod embedding;
pub mod errors;
pub mod extraction;
pub mod ingestion;
pub mod lexical;
pub mod retrieval;
pub mod store;
pub mod text_cleaning;
pub mod vector;

// Utilities
pub mod utils;

// Re-exports for convenience
pub use config::Config;
pub use errors::{Result, SearchError};
pub use retrieval::{RetrievalOutcome, RetrievalService};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// The two statutes whose sections form the corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Law {
    /// Indian Penal Code
    #[serde(rename = "IPC")]
    Ipc,
    /// Code of Criminal Procedure
    #[serde(rename = "CRPC")]
    Crpc,
}

impl Law {
    /// Canonical upper-case name used in persisted records and chunk text.
    pub fn as_str(&self) -> &'static str {
        match self {
            Law::Ipc => "IPC",
            Law::Crpc => "CRPC",
        }
    }

    /// Detect the law from an extracted page file name (`ipc_page_003.txt`).
    pub fn from_file_name(name: &str) -> Option<Law> {
        let lower = name.to_lowercase();
        if lower.starts_with("ipc_") {
            Some(Law::Ipc)
        } else if lower.starts_with("crpc_") {
            Some(Law::Crpc)
        } else {
            None
        }
    }

    /// The other statute.
    pub fn counterpart(self) -> Law {
        match self {
            Law::Ipc => Law::Crpc,
            Law::Crpc => Law::Ipc,
        }
    }
}

impl fmt::Display for Law {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bounded-size, section-attributed span of statute text: the unit of
/// retrieval.
///
/// `chunk_id` is assigned sequentially across the whole corpus at emission
/// time and serves as the dedup/identity key downstream. `section` is `None`
/// only for content that could not be attributed to a section; such chunks
/// are filtered before reaching the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Statute this chunk belongs to
    pub law: Law,
    /// Statutory section identifier, e.g. "124A" or "304(1)"
    pub section: Option<String>,
    /// Short title, synthesized as "Section {n}" when the header had none
    pub section_title: String,
    /// Chunk body, bounded by the configured maximum length
    pub text: String,
    /// Provenance identifier (originating page file)
    pub source_file: String,
    /// Corpus-wide sequential identifier
    pub chunk_id: u64,
}

/// Application state shared across API handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::Config>,
    pub retrieval: Arc<retrieval::RetrievalService>,
}
