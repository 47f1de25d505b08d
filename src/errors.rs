//! # Error Handling Module
//!
//! ## Purpose
//! Centralized error handling for the statute search engine, providing
//! structured error types and conversion utilities for all system components.
//!
//! ## Input/Output Specification
//! - **Input**: Error conditions from various system components
//! - **Output**: Structured error types with context and error chains
//! - **Error Categories**: Ingestion, Store, Embedding, Index, Retrieval, Config
//!
//! Negative retrieval results (no match, unknown section, law mismatch) are
//! NOT errors; they are explicit [`crate::retrieval::RetrievalOutcome`]
//! values. Errors here are reserved for corrupted or missing corpus state,
//! collaborator failures, and invalid requests.

use thiserror::Error;

/// Result type used throughout the application
pub type Result<T> = std::result::Result<T, SearchError>;

/// Error types for the statute search engine
#[derive(Debug, Error)]
pub enum SearchError {
    /// Generic I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Validation errors
    #[error("Validation failed for field '{field}': {reason}")]
    ValidationFailed { field: String, reason: String },

    // Ingestion errors
    #[error("Extracted pages directory not found: {dir}")]
    ExtractedPagesMissing { dir: String },

    // Store errors; the corpus is a startup prerequisite
    #[error("No chunks found under {path}; run ingestion first")]
    EmptyCorpus { path: String },

    #[error("Chunk collection {path} failed to load: {details}")]
    CorpusLoad { path: String, details: String },

    // Embedding provider errors
    #[error("Embedding generation failed: {details}")]
    EmbeddingFailed { details: String },

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    // Index errors
    #[error("Index construction failed: {reason}")]
    IndexBuildFailed { reason: String },

    // Retrieval errors
    #[error("Invalid search query: {query} - {reason}")]
    InvalidSearchQuery { query: String, reason: String },

    /// Internal system errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl SearchError {
    /// Get error category for metrics and logging
    pub fn category(&self) -> &'static str {
        match self {
            SearchError::Config { .. } | SearchError::Toml(_) => "configuration",
            SearchError::ExtractedPagesMissing { .. } => "ingestion",
            SearchError::EmptyCorpus { .. } | SearchError::CorpusLoad { .. } => "store",
            SearchError::EmbeddingFailed { .. }
            | SearchError::DimensionMismatch { .. }
            | SearchError::Http(_) => "embedding",
            SearchError::IndexBuildFailed { .. } => "index",
            SearchError::InvalidSearchQuery { .. } => "retrieval",
            SearchError::Io(_) | SearchError::Json(_) => "io",
            SearchError::Internal { .. } | SearchError::ValidationFailed { .. } => "generic",
        }
    }
}
