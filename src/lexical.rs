//! # Lexical Index Module
//!
//! ## Purpose
//! Token-overlap ranking over the full chunk corpus using Okapi BM25:
//! diminishing returns per extra term occurrence, document-length
//! normalization, and corpus-wide inverse document frequency per token.
//!
//! ## Input/Output Specification
//! - **Input**: Chunk texts at build time; query text + k at query time
//! - **Output**: `(corpus_index, score)` pairs, score-descending, ties broken
//!   by original corpus order (stable sort)
//!
//! Tokenization matches the corpus convention downstream consumers expect:
//! lower-cased, whitespace-split, no stemming.

use crate::config::LexicalConfig;
use std::collections::{HashMap, HashSet};

/// One ranked lexical result.
#[derive(Debug, Clone, PartialEq)]
pub struct LexicalHit {
    /// Position of the chunk in the loaded corpus
    pub corpus_index: usize,
    /// BM25 score; zero when no query token occurs in the chunk
    pub score: f32,
}

/// BM25 index over the chunk corpus, built once and immutable thereafter.
pub struct LexicalIndex {
    doc_term_freqs: Vec<HashMap<String, u32>>,
    doc_lens: Vec<usize>,
    doc_freqs: HashMap<String, usize>,
    avg_doc_len: f32,
    k1: f32,
    b: f32,
}

impl LexicalIndex {
    /// Build the index from the corpus texts, in corpus order.
    pub fn build(texts: &[String], config: &LexicalConfig) -> Self {
        let mut doc_term_freqs = Vec::with_capacity(texts.len());
        let mut doc_lens = Vec::with_capacity(texts.len());
        let mut doc_freqs: HashMap<String, usize> = HashMap::new();

        for text in texts {
            let tokens = tokenize(text);
            let mut freqs: HashMap<String, u32> = HashMap::new();
            for token in &tokens {
                *freqs.entry(token.clone()).or_insert(0) += 1;
            }
            for term in freqs.keys() {
                *doc_freqs.entry(term.clone()).or_insert(0) += 1;
            }
            doc_lens.push(tokens.len());
            doc_term_freqs.push(freqs);
        }

        let avg_doc_len = if doc_lens.is_empty() {
            0.0
        } else {
            doc_lens.iter().sum::<usize>() as f32 / doc_lens.len() as f32
        };

        tracing::debug!(
            "Lexical index built: {} documents, {} terms",
            doc_term_freqs.len(),
            doc_freqs.len()
        );

        Self {
            doc_term_freqs,
            doc_lens,
            doc_freqs,
            avg_doc_len,
            k1: config.k1,
            b: config.b,
        }
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.doc_term_freqs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doc_term_freqs.is_empty()
    }

    /// Number of distinct terms across the corpus.
    pub fn vocabulary_size(&self) -> usize {
        self.doc_freqs.len()
    }

    /// Rank the corpus against the query, returning the top `k` documents.
    pub fn query(&self, text: &str, k: usize) -> Vec<LexicalHit> {
        let tokens = tokenize(text);
        let unique: HashSet<&String> = tokens.iter().collect();

        let mut hits: Vec<LexicalHit> = (0..self.len())
            .map(|idx| LexicalHit {
                corpus_index: idx,
                score: self.score_doc(idx, &unique),
            })
            .collect();

        // Stable sort keeps corpus order among equal scores.
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(k);
        hits
    }

    fn score_doc(&self, idx: usize, query_terms: &HashSet<&String>) -> f32 {
        let freqs = &self.doc_term_freqs[idx];
        let doc_len = self.doc_lens[idx];
        let n_docs = self.len() as f32;
        let length_norm = 1.0 - self.b + self.b * doc_len as f32 / self.avg_doc_len.max(1.0);

        let mut score = 0.0;
        for term in query_terms {
            let Some(&tf) = freqs.get(*term) else {
                continue;
            };
            let df = *self.doc_freqs.get(*term).unwrap_or(&0) as f32;
            let idf = ((n_docs - df + 0.5) / (df + 0.5)).ln_1p();
            let tf = tf as f32;
            score += idf * tf * (self.k1 + 1.0) / (tf + self.k1 * length_norm);
        }
        score
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> LexicalConfig {
        LexicalConfig { k1: 1.5, b: 0.75 }
    }

    fn index(texts: &[&str]) -> LexicalIndex {
        let owned: Vec<String> = texts.iter().map(|t| t.to_string()).collect();
        LexicalIndex::build(&owned, &config())
    }

    #[test]
    fn returns_at_most_k_results() {
        let idx = index(&["murder punishment", "theft punishment", "bail procedure"]);
        assert_eq!(idx.query("punishment", 2).len(), 2);
        assert_eq!(idx.query("punishment", 10).len(), 3);
    }

    #[test]
    fn matching_documents_rank_first() {
        let idx = index(&[
            "procedure for arrest without warrant",
            "punishment for murder with death penalty",
            "summons to appear before magistrate",
        ]);
        let hits = idx.query("murder punishment", 3);
        assert_eq!(hits[0].corpus_index, 1);
        assert!(hits[0].score > hits[1].score);
    }

    #[test]
    fn rare_terms_outweigh_common_terms() {
        let idx = index(&[
            "section about punishment generally",
            "section about punishment generally",
            "section about sedition specifically",
            "section about punishment generally",
        ]);
        let hits = idx.query("sedition section", 4);
        assert_eq!(hits[0].corpus_index, 2);
    }

    #[test]
    fn ties_break_by_corpus_order() {
        let idx = index(&["identical text here", "identical text here", "identical text here"]);
        let hits = idx.query("identical", 3);
        let order: Vec<usize> = hits.iter().map(|h| h.corpus_index).collect();
        assert_eq!(order, vec![0, 1, 2]);

        // No token overlap at all: uniform zero scores, corpus order preserved.
        let hits = idx.query("unrelated query terms", 2);
        let order: Vec<usize> = hits.iter().map(|h| h.corpus_index).collect();
        assert_eq!(order, vec![0, 1]);
        assert!(hits.iter().all(|h| h.score == 0.0));
    }

    #[test]
    fn shorter_document_wins_at_equal_term_frequency() {
        let idx = index(&[
            "bail bail application procedure hearing magistrate court adjournment listing",
            "bail bail application",
        ]);
        let hits = idx.query("bail", 2);
        assert_eq!(hits[0].corpus_index, 1);
    }
}
