//! # Ingestion Module
//!
//! ## Purpose
//! Offline batch pipeline turning extracted statute page text into the
//! persisted, law-partitioned chunk corpus that serving loads at startup.
//!
//! ## Workflow
//! Clean → Gate → Extract → Chunk → Assign ids → Persist
//!
//! Ingestion runs fully sequentially and produces immutable corpus artifacts
//! before serving begins; it never runs concurrently with query traffic.

pub mod pipeline;

pub use pipeline::{IngestStats, IngestionPipeline};
