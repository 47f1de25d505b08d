//! # Chunk Store Module
//!
//! ## Purpose
//! Persists and loads the law-partitioned chunk collections produced by
//! ingestion. Each law owns one JSON array
//! (`<chunks_dir>/ipc/ipc_chunks.json`, `<chunks_dir>/crpc/crpc_chunks.json`);
//! serving loads every collection fully into memory, once.
//!
//! ## Error model
//! A missing or empty corpus at load time is fatal; the retrieval indices
//! cannot be built without it. Records are validated on load: empty chunk
//! text or duplicate chunk ids mark a corrupted corpus.

use crate::errors::{Result, SearchError};
use crate::{Chunk, Law};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// The persisted, law-partitioned chunk collection.
pub struct ChunkStore {
    chunks_dir: PathBuf,
}

impl ChunkStore {
    pub fn new<P: AsRef<Path>>(chunks_dir: P) -> Self {
        Self {
            chunks_dir: chunks_dir.as_ref().to_path_buf(),
        }
    }

    /// Path of one law's collection file.
    pub fn collection_path(&self, law: Law) -> PathBuf {
        let name = law.as_str().to_lowercase();
        self.chunks_dir
            .join(&name)
            .join(format!("{}_chunks.json", name))
    }

    /// Write one law's chunk collection, creating directories as needed.
    pub fn persist(&self, law: Law, chunks: &[Chunk]) -> Result<()> {
        let path = self.collection_path(law);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(chunks)?;
        fs::write(&path, json)?;

        tracing::info!("Persisted {} {} chunks to {:?}", chunks.len(), law, path);
        Ok(())
    }

    /// Load every persisted collection into memory. Fails when no chunks
    /// exist at all, or when a collection is corrupted.
    pub fn load_all(&self) -> Result<Vec<Chunk>> {
        let mut all = Vec::new();

        for law in [Law::Ipc, Law::Crpc] {
            let path = self.collection_path(law);
            if !path.exists() {
                continue;
            }

            let content = fs::read_to_string(&path)?;
            let chunks: Vec<Chunk> =
                serde_json::from_str(&content).map_err(|e| SearchError::CorpusLoad {
                    path: path.display().to_string(),
                    details: e.to_string(),
                })?;
            all.extend(chunks);
        }

        if all.is_empty() {
            return Err(SearchError::EmptyCorpus {
                path: self.chunks_dir.display().to_string(),
            });
        }

        Self::validate(&all)?;

        tracing::info!("Loaded {} chunks from {:?}", all.len(), self.chunks_dir);
        Ok(all)
    }

    /// Load-time validation of persisted records.
    fn validate(chunks: &[Chunk]) -> Result<()> {
        let mut seen = HashSet::new();
        for chunk in chunks {
            if chunk.text.trim().is_empty() {
                return Err(SearchError::CorpusLoad {
                    path: chunk.source_file.clone(),
                    details: format!("chunk {} has empty text", chunk.chunk_id),
                });
            }
            if !seen.insert(chunk.chunk_id) {
                return Err(SearchError::CorpusLoad {
                    path: chunk.source_file.clone(),
                    details: format!("duplicate chunk_id {}", chunk.chunk_id),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(law: Law, section: &str, id: u64) -> Chunk {
        Chunk {
            law,
            section: Some(section.to_string()),
            section_title: format!("Section {}", section),
            text: format!("{} Section {}. body text of the section", law, section),
            source_file: format!("{}_page_001.txt", law.as_str().to_lowercase()),
            chunk_id: id,
        }
    }

    #[test]
    fn persist_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ChunkStore::new(dir.path());

        let ipc = vec![chunk(Law::Ipc, "302", 0), chunk(Law::Ipc, "304", 1)];
        let crpc = vec![chunk(Law::Crpc, "154", 2)];
        store.persist(Law::Ipc, &ipc).unwrap();
        store.persist(Law::Crpc, &crpc).unwrap();

        let loaded = store.load_all().unwrap();
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded[0].section.as_deref(), Some("302"));
        assert_eq!(loaded[2].law, Law::Crpc);
    }

    #[test]
    fn missing_corpus_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let store = ChunkStore::new(dir.path().join("nowhere"));

        let err = store.load_all().unwrap_err();
        assert!(matches!(err, SearchError::EmptyCorpus { .. }));
    }

    #[test]
    fn empty_collections_are_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let store = ChunkStore::new(dir.path());
        store.persist(Law::Ipc, &[]).unwrap();

        let err = store.load_all().unwrap_err();
        assert!(matches!(err, SearchError::EmptyCorpus { .. }));
    }

    #[test]
    fn duplicate_chunk_ids_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = ChunkStore::new(dir.path());
        store
            .persist(Law::Ipc, &[chunk(Law::Ipc, "302", 7), chunk(Law::Ipc, "304", 7)])
            .unwrap();

        let err = store.load_all().unwrap_err();
        assert!(matches!(err, SearchError::CorpusLoad { .. }));
    }

    #[test]
    fn one_missing_law_is_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let store = ChunkStore::new(dir.path());
        store.persist(Law::Ipc, &[chunk(Law::Ipc, "420", 0)]).unwrap();

        let loaded = store.load_all().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].law, Law::Ipc);
    }
}
