//! # Configuration Management Module
//!
//! ## Purpose
//! Centralized configuration management for the statute search engine,
//! supporting TOML files and environment variables with validation and
//! type-safe access to all system settings.
//!
//! ## Configuration Sources (in order of precedence)
//! 1. Command line arguments (highest priority)
//! 2. Environment variables (`STATUTE_SEARCH_*`)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! ## Usage
//! ```rust,no_run
//! use statute_search::config::Config;
//!
//! let config = Config::from_file("config.toml").unwrap();
//! println!("Server port: {}", config.server.port);
//! ```

use crate::errors::{Result, SearchError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure containing all system settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server and API configuration
    pub server: ServerConfig,
    /// Ingestion pipeline settings
    pub ingestion: IngestionConfig,
    /// Chunking behavior
    pub chunking: ChunkingConfig,
    /// BM25 lexical ranking parameters
    pub lexical: LexicalConfig,
    /// Vector search and embedding provider
    pub vector: VectorConfig,
    /// Persisted chunk collections
    pub storage: StorageConfig,
    /// Retrieval behavior
    pub retrieval: RetrievalConfig,
    /// Logging and monitoring
    pub logging: LoggingConfig,
    /// Performance tuning
    pub performance: PerformanceConfig,
}

/// Server and API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server bind address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Enable CORS for web frontends
    pub enable_cors: bool,
}

/// Ingestion pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionConfig {
    /// Directory of extracted per-page text files (`ipc_page_NNN.txt`, ...)
    pub extracted_dir: PathBuf,
    /// Minimum section body length; shorter bodies are parsing fragments
    pub min_body_chars: usize,
    /// Bare-header line count at or above which a short page is treated as a
    /// section index page
    pub index_page_min_headers: usize,
    /// Maximum page length for the section-index-page heuristic
    pub index_page_max_chars: usize,
}

/// Chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Maximum chunk length in characters
    pub max_chars: usize,
}

/// BM25 parameters for the lexical index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexicalConfig {
    /// Term-frequency saturation (k1)
    pub k1: f32,
    /// Document-length normalization (b)
    pub b: f32,
}

/// Vector search and embedding provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorConfig {
    /// Embedding server endpoint; when absent the deterministic hashing
    /// embedder is used instead
    pub embedding_endpoint: Option<String>,
    /// Embedding dimension (must match the provider's model output)
    pub dimension: usize,
    /// Texts per embedding request
    pub batch_size: usize,
    /// Concurrent in-flight embedding requests during index build
    pub embed_concurrency: usize,
}

/// Persisted chunk collection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory of the law-partitioned chunk collections
    pub chunks_dir: PathBuf,
}

/// Retrieval behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Results returned when the request does not specify top_k
    pub default_top_k: usize,
    /// Results fetched by the exact-section override lookup
    pub section_lookup_k: usize,
    /// Minimum query length in characters
    pub min_query_length: usize,
    /// Maximum query length in characters
    pub max_query_length: usize,
}

/// Logging and monitoring configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Enable structured JSON logging
    pub json_format: bool,
}

/// Performance tuning configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceConfig {
    /// Number of worker threads for the async runtime
    pub worker_threads: usize,
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::from_file("config.toml")
    }

    /// Load configuration from a specific file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!("Configuration file not found: {:?}, using defaults", path);
            let mut config = Self::default();
            config.apply_env_overrides()?;
            config.validate()?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path).map_err(|e| SearchError::Config {
            message: format!("Failed to read config file {:?}: {}", path, e),
        })?;

        let mut config: Config = toml::from_str(&content).map_err(|e| SearchError::Config {
            message: format!("Failed to parse config file {:?}: {}", path, e),
        })?;

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(host) = std::env::var("STATUTE_SEARCH_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("STATUTE_SEARCH_PORT") {
            self.server.port = port.parse().map_err(|_| SearchError::Config {
                message: "Invalid port number in STATUTE_SEARCH_PORT".to_string(),
            })?;
        }
        if let Ok(dir) = std::env::var("STATUTE_SEARCH_CHUNKS_DIR") {
            self.storage.chunks_dir = PathBuf::from(dir);
        }
        if let Ok(endpoint) = std::env::var("STATUTE_SEARCH_EMBEDDING_ENDPOINT") {
            self.vector.embedding_endpoint = Some(endpoint);
        }

        Ok(())
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(SearchError::ValidationFailed {
                field: "server.port".to_string(),
                reason: "Port cannot be zero".to_string(),
            });
        }

        if self.chunking.max_chars == 0 {
            return Err(SearchError::ValidationFailed {
                field: "chunking.max_chars".to_string(),
                reason: "Chunk size must be greater than zero".to_string(),
            });
        }

        if self.vector.dimension == 0 {
            return Err(SearchError::ValidationFailed {
                field: "vector.dimension".to_string(),
                reason: "Embedding dimension must be greater than zero".to_string(),
            });
        }

        if self.vector.batch_size == 0 || self.vector.embed_concurrency == 0 {
            return Err(SearchError::ValidationFailed {
                field: "vector.batch_size".to_string(),
                reason: "Embedding batch size and concurrency must be greater than zero"
                    .to_string(),
            });
        }

        if !(0.0..=1.0).contains(&self.lexical.b) {
            return Err(SearchError::ValidationFailed {
                field: "lexical.b".to_string(),
                reason: "BM25 b must lie in [0, 1]".to_string(),
            });
        }

        if self.retrieval.min_query_length > self.retrieval.max_query_length {
            return Err(SearchError::ValidationFailed {
                field: "retrieval.min_query_length".to_string(),
                reason: "Minimum query length cannot be greater than maximum".to_string(),
            });
        }

        if self.retrieval.default_top_k == 0 || self.retrieval.section_lookup_k == 0 {
            return Err(SearchError::ValidationFailed {
                field: "retrieval.default_top_k".to_string(),
                reason: "top_k values must be at least 1".to_string(),
            });
        }

        Ok(())
    }

    /// Get configuration as TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| SearchError::Config {
            message: format!("Failed to serialize config to TOML: {}", e),
        })
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = self.to_toml()?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                enable_cors: true,
            },
            ingestion: IngestionConfig {
                extracted_dir: PathBuf::from("./data/extracted"),
                min_body_chars: 40,
                index_page_min_headers: 5,
                index_page_max_chars: 2500,
            },
            chunking: ChunkingConfig { max_chars: 800 },
            lexical: LexicalConfig { k1: 1.5, b: 0.75 },
            vector: VectorConfig {
                embedding_endpoint: None,
                dimension: 384,
                batch_size: 32,
                embed_concurrency: 4,
            },
            storage: StorageConfig {
                chunks_dir: PathBuf::from("./data/chunks"),
            },
            retrieval: RetrievalConfig {
                default_top_k: 5,
                section_lookup_k: 2,
                min_query_length: 2,
                max_query_length: 1000,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                json_format: false,
            },
            performance: PerformanceConfig {
                worker_threads: num_cpus::get(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_zero_chunk_size() {
        let mut config = Config::default();
        config.chunking.max_chars = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_inverted_query_lengths() {
        let mut config = Config::default();
        config.retrieval.min_query_length = 2000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn toml_round_trip() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        let parsed: Config = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.chunking.max_chars, config.chunking.max_chars);
        assert_eq!(parsed.server.port, config.server.port);
    }
}
