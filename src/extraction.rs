//! # Section Extraction Module
//!
//! ## Purpose
//! Splits cleaned statute page text into numbered sections (number, title,
//! body), filtering out table-of-contents and section-index pages that carry
//! no section bodies.
//!
//! ## Input/Output Specification
//! - **Input**: Cleaned page text (see [`crate::text_cleaning`]), the law it
//!   belongs to
//! - **Output**: Transient [`StatuteSection`] values, consumed by the chunker
//! - **Gating**: Structural pages and section-index pages yield zero sections
//!
//! A section header is a line starting with `<digits><letters>(<sub>)` followed
//! by a period and a title; the body runs up to the next header line or end of
//! text. Amendment footnotes ("1. Subs. by Act 25 of 2005...") are stripped
//! before matching so footnote numbering cannot open a false section boundary.

use crate::config::IngestionConfig;
use crate::Law;
use regex::Regex;

/// Keywords marking front-matter/structural pages that must not be mined for
/// sections.
pub const STRUCTURAL_KEYWORDS: [&str; 4] = [
    "ARRANGEMENT OF SECTIONS",
    "TABLE OF CONTENTS",
    "CHAPTER",
    "SECTIONS 1.",
];

/// A statutory section in transit between extraction and chunking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatuteSection {
    /// Section identifier, e.g. "124A" or "304(1)"
    pub number: String,
    /// Raw header title; may be empty
    pub title: String,
    /// Section body text
    pub body: String,
}

impl StatuteSection {
    /// Header title, synthesized as `"Section {n}"` when the header had none.
    pub fn display_title(&self) -> String {
        if self.title.is_empty() {
            format!("Section {}", self.number)
        } else {
            self.title.clone()
        }
    }

    /// Canonical retrieval text: `"{law} Section {n}. {title}: {body}"`.
    pub fn canonical_text(&self, law: Law) -> String {
        format!("{} Section {}. {}: {}", law, self.number, self.title, self.body)
            .trim()
            .to_string()
    }
}

/// Extracts statutory sections from cleaned page text.
pub struct SectionExtractor {
    min_body_chars: usize,
    index_page_min_headers: usize,
    index_page_max_chars: usize,
    header: Regex,
    bare_header: Regex,
    footnote: Regex,
    spaces: Regex,
    newlines: Regex,
}

impl SectionExtractor {
    pub fn new(config: &IngestionConfig) -> Self {
        Self {
            min_body_chars: config.min_body_chars,
            index_page_min_headers: config.index_page_min_headers,
            index_page_max_chars: config.index_page_max_chars,
            header: Regex::new(r"(?m)^[ \t]*(\d+[A-Z]*(?:\(\d+\))?)\.[ \t]*(.*)$")
                .expect("valid section header pattern"),
            bare_header: Regex::new(r"^\d+[A-Z]*(?:\(\d+\))?\.\s+[A-Za-z]")
                .expect("valid bare header pattern"),
            footnote: Regex::new(
                r"(?im)^[ \t]*\d+\.[ \t]+(?:Subs\.|Ins\.|Amended|Omitted|Added).*$",
            )
            .expect("valid footnote pattern"),
            spaces: Regex::new(r"[ \t]+").expect("valid spaces pattern"),
            newlines: Regex::new(r"\n{3,}").expect("valid newlines pattern"),
        }
    }

    /// True for front-matter pages carrying any structural keyword.
    pub fn is_structural_page(&self, text: &str) -> bool {
        let upper = text.to_uppercase();
        STRUCTURAL_KEYWORDS.iter().any(|k| upper.contains(k))
    }

    /// True for pages that only list section titles without bodies: at least
    /// `index_page_min_headers` bare header lines on a page shorter than
    /// `index_page_max_chars`.
    pub fn is_section_index_page(&self, text: &str) -> bool {
        let header_lines = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .filter(|l| self.bare_header.is_match(l))
            .count();
        header_lines >= self.index_page_min_headers
            && text.chars().count() < self.index_page_max_chars
    }

    /// Extract sections from a cleaned page. Gated pages and blank pages
    /// yield an empty sequence; sections with bodies shorter than the
    /// minimum are dropped as parsing fragments.
    pub fn extract(&self, text: &str, law: Law) -> Vec<StatuteSection> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        if self.is_structural_page(text) || self.is_section_index_page(text) {
            return Vec::new();
        }

        let text = self.spaces.replace_all(text, " ");
        let text = self.newlines.replace_all(&text, "\n\n");
        let text = self.footnote.replace_all(&text, "");

        // (header line end, number, title) plus the next header's start bounds
        // each body.
        let headers: Vec<(usize, usize, String, String)> = self
            .header
            .captures_iter(&text)
            .map(|c| {
                let whole = c.get(0).expect("whole match");
                let number = c.get(1).expect("section number").as_str().to_string();
                let title = c.get(2).map_or("", |m| m.as_str()).trim().to_string();
                (whole.start(), whole.end(), number, title)
            })
            .collect();

        let mut sections = Vec::new();
        for (i, (_, header_end, number, title)) in headers.iter().enumerate() {
            let body_end = headers
                .get(i + 1)
                .map_or(text.len(), |(next_start, _, _, _)| *next_start);
            let body = text[*header_end..body_end].trim();

            if body.chars().count() < self.min_body_chars {
                continue;
            }

            sections.push(StatuteSection {
                number: number.clone(),
                title: title.clone(),
                body: body.to_string(),
            });
        }

        tracing::debug!("{}: extracted {} sections", law, sections.len());
        sections
    }
}
