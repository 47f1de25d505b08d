//! # Ingestion Pipeline
//!
//! ## Purpose
//! Orchestrates the offline corpus build: walks the extracted-pages
//! directory in sorted order, cleans and gates each page, extracts sections,
//! chunks them with corpus-wide sequential ids, and persists one collection
//! per law.
//!
//! ## Input/Output Specification
//! - **Input**: Directory of per-page text files named `<law>_page_NNN.txt`
//! - **Output**: Law-partitioned chunk collections via [`ChunkStore`], plus
//!   run statistics
//! - **Noise policy**: Blank pages, gated pages, unattributed files, and
//!   fragment sections are skipped silently; only a missing input directory
//!   is an error

use crate::chunking::Chunker;
use crate::config::Config;
use crate::errors::{Result, SearchError};
use crate::extraction::SectionExtractor;
use crate::store::ChunkStore;
use crate::text_cleaning::TextCleaner;
use crate::utils::Timer;
use crate::{Chunk, Law};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

/// Statistics for one ingestion run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestStats {
    /// Text files considered
    pub pages_seen: usize,
    /// Files whose name matched neither law prefix
    pub pages_unattributed: usize,
    /// Pages empty after cleaning
    pub pages_blank: usize,
    /// Pages excluded by the structural/index gates
    pub pages_gated: usize,
    /// Sections that survived extraction
    pub sections_extracted: usize,
    /// Chunks emitted for the IPC collection
    pub ipc_chunks: usize,
    /// Chunks emitted for the CRPC collection
    pub crpc_chunks: usize,
    /// Start of the run
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
    /// End of the run
    pub finished_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Sequential offline corpus builder.
pub struct IngestionPipeline {
    extracted_dir: PathBuf,
    cleaner: TextCleaner,
    extractor: SectionExtractor,
    chunker: Chunker,
    store: ChunkStore,
}

impl IngestionPipeline {
    pub fn new(config: &Config) -> Self {
        Self {
            extracted_dir: config.ingestion.extracted_dir.clone(),
            cleaner: TextCleaner::new(),
            extractor: SectionExtractor::new(&config.ingestion),
            chunker: Chunker::new(&config.chunking),
            store: ChunkStore::new(&config.storage.chunks_dir),
        }
    }

    /// Run the full pipeline over the extracted-pages directory.
    pub fn run(&self) -> Result<IngestStats> {
        if !self.extracted_dir.exists() {
            return Err(SearchError::ExtractedPagesMissing {
                dir: self.extracted_dir.display().to_string(),
            });
        }

        tracing::info!("Starting ingestion from {:?}", self.extracted_dir);
        let timer = Timer::new("ingestion");

        let mut stats = IngestStats {
            started_at: Some(chrono::Utc::now()),
            ..IngestStats::default()
        };

        let mut files: Vec<PathBuf> = fs::read_dir(&self.extracted_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "txt"))
            .collect();
        files.sort();

        let mut ipc_chunks: Vec<Chunk> = Vec::new();
        let mut crpc_chunks: Vec<Chunk> = Vec::new();
        // Chunk ids are sequential over the whole corpus traversal, stable
        // only for a fixed snapshot and file order.
        let mut next_chunk_id: u64 = 0;

        for path in files {
            stats.pages_seen += 1;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();

            let Some(law) = Law::from_file_name(&file_name) else {
                tracing::debug!("Skipping unattributed file {}", file_name);
                stats.pages_unattributed += 1;
                continue;
            };

            let raw = fs::read_to_string(&path)?;
            let cleaned = self.cleaner.clean(&raw);
            if cleaned.is_empty() {
                stats.pages_blank += 1;
                continue;
            }

            if self.extractor.is_structural_page(&cleaned)
                || self.extractor.is_section_index_page(&cleaned)
            {
                tracing::debug!("Gated page {}", file_name);
                stats.pages_gated += 1;
                continue;
            }

            let sections = self.extractor.extract(&cleaned, law);
            stats.sections_extracted += sections.len();

            for section in &sections {
                let mut chunks = self.chunker.chunk(section, law, &file_name);
                for chunk in &mut chunks {
                    chunk.chunk_id = next_chunk_id;
                    next_chunk_id += 1;
                }
                match law {
                    Law::Ipc => ipc_chunks.extend(chunks),
                    Law::Crpc => crpc_chunks.extend(chunks),
                }
            }
        }

        stats.ipc_chunks = ipc_chunks.len();
        stats.crpc_chunks = crpc_chunks.len();

        self.store.persist(Law::Ipc, &ipc_chunks)?;
        self.store.persist(Law::Crpc, &crpc_chunks)?;

        stats.finished_at = Some(chrono::Utc::now());
        let elapsed_ms = timer.stop();
        tracing::info!(
            "Ingestion completed in {}ms: {} pages ({} gated, {} blank), {} sections, {} IPC + {} CRPC chunks",
            elapsed_ms,
            stats.pages_seen,
            stats.pages_gated,
            stats.pages_blank,
            stats.sections_extracted,
            stats.ipc_chunks,
            stats.crpc_chunks
        );

        Ok(stats)
    }
}
