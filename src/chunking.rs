//! # Chunking Module
//!
//! ## Purpose
//! Splits each extracted section's canonical text into bounded-size chunks,
//! preserving section metadata on every chunk. Chunk identifiers are assigned
//! by the caller over the full corpus traversal, not per section.
//!
//! ## Splitting policy
//! A section at or under the size bound becomes a single chunk. Larger
//! sections are split on blank-line paragraph boundaries, greedily
//! accumulating paragraphs; a single paragraph longer than the bound is
//! emitted as one oversized chunk rather than being force-split.

use crate::config::ChunkingConfig;
use crate::extraction::StatuteSection;
use crate::{Chunk, Law};
use regex::Regex;

/// Splits sections into retrieval chunks.
pub struct Chunker {
    max_chars: usize,
    paragraph_split: Regex,
}

impl Chunker {
    pub fn new(config: &ChunkingConfig) -> Self {
        Self {
            max_chars: config.max_chars,
            paragraph_split: Regex::new(r"\n\s*\n").expect("valid paragraph pattern"),
        }
    }

    /// Chunk one section. Every emitted chunk carries the section's metadata;
    /// `chunk_id` is left at zero for the caller to assign.
    pub fn chunk(&self, section: &StatuteSection, law: Law, source_file: &str) -> Vec<Chunk> {
        let text = section.canonical_text(law);

        let make = |body: &str| Chunk {
            law,
            section: Some(section.number.clone()),
            section_title: section.display_title(),
            text: body.to_string(),
            source_file: source_file.to_string(),
            chunk_id: 0,
        };

        if text.chars().count() <= self.max_chars {
            return vec![make(&text)];
        }

        let mut chunks = Vec::new();
        let mut current = String::new();

        for paragraph in self.paragraph_split.split(&text) {
            if current.chars().count() + paragraph.chars().count() > self.max_chars {
                let flushed = current.trim();
                if !flushed.is_empty() {
                    chunks.push(make(flushed));
                }
                current.clear();
            }
            current.push_str(paragraph);
            current.push_str("\n\n");
        }

        let flushed = current.trim();
        if !flushed.is_empty() {
            chunks.push(make(flushed));
        }

        chunks
    }
}
