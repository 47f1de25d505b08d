//! # Text Cleaning Module
//!
//! ## Purpose
//! Normalizes raw extracted statute page text before section extraction:
//! strips law-title headers/footers and "arrangement of sections" front
//! matter, removes page-number tokens, repairs OCR artifacts that merge page
//! numbers into section numbers, and collapses whitespace.
//!
//! ## Input/Output Specification
//! - **Input**: Raw per-page text as produced by the upstream PDF extraction
//! - **Output**: Cleaned text ready for section extraction
//! - **Property**: Cleaning is idempotent; re-cleaning cleaned text is a no-op
//!
//! The pipeline is an ordered list of named stages, each a pure text→text
//! transformation. Order matters: later stages assume earlier ones ran
//! (boundary repair emits newlines that whitespace normalization then
//! collapses).

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// A single named cleaning stage.
pub struct CleanStage {
    name: &'static str,
    run: Box<dyn Fn(&str) -> String + Send + Sync>,
}

impl CleanStage {
    /// Stage name, for logging and tests.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Apply this stage alone.
    pub fn apply(&self, text: &str) -> String {
        (self.run)(text)
    }
}

/// Ordered cleaning pipeline for statute page text.
pub struct TextCleaner {
    stages: Vec<CleanStage>,
}

impl TextCleaner {
    pub fn new() -> Self {
        let stages = vec![
            stage_unicode_nfc(),
            stage_strip_headers_and_front_matter(),
            stage_strip_page_numbers(),
            stage_repair_section_boundaries(),
            stage_normalize_whitespace(),
        ];
        Self { stages }
    }

    /// Run the full pipeline. Blank input yields an empty string.
    pub fn clean(&self, raw: &str) -> String {
        if raw.trim().is_empty() {
            return String::new();
        }

        let mut text = raw.to_string();
        for stage in &self.stages {
            text = stage.apply(&text);
        }
        text.trim().to_string()
    }

    /// The ordered stages, for targeted testing.
    pub fn stages(&self) -> &[CleanStage] {
        &self.stages
    }
}

impl Default for TextCleaner {
    fn default() -> Self {
        Self::new()
    }
}

fn stage_unicode_nfc() -> CleanStage {
    CleanStage {
        name: "unicode_nfc",
        run: Box::new(|text| text.nfc().collect()),
    }
}

/// Removes law-title header/footer phrases and "ARRANGEMENT OF SECTIONS"
/// front matter. Front-matter removal spans from the keyword up to the first
/// following section-header line; with no such line the block is left alone.
fn stage_strip_headers_and_front_matter() -> CleanStage {
    let header_footer = Regex::new(
        r"(?i)(THE\s+INDIAN\s+PENAL\s+CODE|CODE\s+OF\s+CRIMINAL\s+PROCEDURE.*?1973)",
    )
    .expect("valid header/footer pattern");
    let arrangement =
        Regex::new(r"(?i)ARRANGEMENT\s+OF\s+SECTIONS").expect("valid arrangement pattern");
    let next_header = Regex::new(r"\n\s*\d+\.").expect("valid header-line pattern");

    CleanStage {
        name: "strip_headers_and_front_matter",
        run: Box::new(move |text| {
            let mut text = header_footer.replace_all(text, "").into_owned();

            loop {
                let Some(range) = arrangement.find(&text).and_then(|m| {
                    next_header
                        .find(&text[m.end()..])
                        .map(|h| m.start()..m.end() + h.start())
                }) else {
                    break;
                };
                text.replace_range(range, "");
            }

            text
        }),
    }
}

fn stage_strip_page_numbers() -> CleanStage {
    let page_number = Regex::new(r"(?i)\bPage\s+\d+\b").expect("valid page-number pattern");

    CleanStage {
        name: "strip_page_numbers",
        run: Box::new(move |text| page_number.replace_all(text, "").into_owned()),
    }
}

/// Fixes OCR boundary collisions like `"58 217. Public servant..."` where a
/// page number fused onto a section header, then forces every section-header
/// pattern onto its own line.
fn stage_repair_section_boundaries() -> CleanStage {
    let collision = Regex::new(r"(?:^|\n)\s*\d+\s+(\d+[A-Z]*(?:\(\d+\))?)\.")
        .expect("valid collision pattern");
    let header_break =
        Regex::new(r"\s+(\d+[A-Z]*(?:\(\d+\))?)\.").expect("valid header-break pattern");

    CleanStage {
        name: "repair_section_boundaries",
        run: Box::new(move |text| {
            let text = collision.replace_all(text, "\n$1.").into_owned();
            header_break.replace_all(&text, "\n$1.").into_owned()
        }),
    }
}

fn stage_normalize_whitespace() -> CleanStage {
    let spaces = Regex::new(r"[ \t]{2,}").expect("valid spaces pattern");
    let newlines = Regex::new(r"\n{3,}").expect("valid newlines pattern");

    CleanStage {
        name: "normalize_whitespace",
        run: Box::new(move |text| {
            let text = spaces.replace_all(text, " ").into_owned();
            newlines.replace_all(&text, "\n\n").into_owned()
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cleaner() -> TextCleaner {
        TextCleaner::new()
    }

    #[test]
    fn blank_input_yields_empty() {
        assert_eq!(cleaner().clean(""), "");
        assert_eq!(cleaner().clean("   \n\n  "), "");
    }

    #[test]
    fn strips_law_title_headers() {
        let cleaned = cleaner().clean("THE INDIAN PENAL CODE\n302. Punishment for murder.\nWhoever commits murder shall be punished.");
        assert!(!cleaned.contains("INDIAN PENAL CODE"));
        assert!(cleaned.contains("302. Punishment for murder."));
    }

    #[test]
    fn strips_arrangement_front_matter_up_to_first_header() {
        let raw = "ARRANGEMENT OF SECTIONS\nSection titles listed here\nmore listing\n1. Title and extent.\nThis Act shall be called the Code.";
        let cleaned = cleaner().clean(raw);
        assert!(!cleaned.contains("ARRANGEMENT"));
        assert!(!cleaned.contains("listed here"));
        assert!(cleaned.starts_with("1. Title and extent."));
    }

    #[test]
    fn strips_page_number_tokens() {
        let cleaned = cleaner().clean("Page 12\n302. Punishment for murder.\nWhoever commits murder shall be punished with death.");
        assert!(!cleaned.contains("Page 12"));
    }

    #[test]
    fn repairs_page_section_collision() {
        let cleaned = cleaner().clean("some body text ends here\n58 217. Public servant disobeying direction of law.\nWhoever being a public servant disobeys.");
        assert!(cleaned.contains("\n217. Public servant"));
        assert!(!cleaned.contains("58 217."));
    }

    #[test]
    fn forces_headers_onto_own_line() {
        let cleaned = cleaner().clean("text of the previous section. 124A. Sedition.\nWhoever by words brings hatred.");
        assert!(cleaned.contains("\n124A. Sedition."));
    }

    #[test]
    fn collapses_whitespace_runs() {
        let cleaned = cleaner().clean("first   line  with\t\tgaps\n\n\n\nsecond paragraph");
        assert!(cleaned.contains("first line with gaps"));
        assert!(cleaned.contains("\n\nsecond paragraph"));
        assert!(!cleaned.contains("\n\n\n"));
    }

    #[test]
    fn cleaning_is_idempotent() {
        let samples = [
            "THE INDIAN PENAL CODE\nPage 3\n58 217. Public servant disobeying.\nWhoever being a public servant knowingly disobeys any direction of the law.",
            "ARRANGEMENT OF SECTIONS\nindex listing\n1. Short title.\nExtent of operation   of the Code.\n\n\n\n2. Punishment of offences.",
            "plain text with no artifacts at all",
            "ends mid sentence 420. Cheating.\nWhoever cheats shall be punished.",
        ];
        let c = cleaner();
        for sample in samples {
            let once = c.clean(sample);
            let twice = c.clean(&once);
            assert_eq!(once, twice, "clean not idempotent for {:?}", sample);
        }
    }

    #[test]
    fn stages_are_individually_addressable() {
        let c = cleaner();
        let names: Vec<_> = c.stages().iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            vec![
                "unicode_nfc",
                "strip_headers_and_front_matter",
                "strip_page_numbers",
                "repair_section_boundaries",
                "normalize_whitespace",
            ]
        );

        let page_stage = &c.stages()[2];
        assert_eq!(page_stage.apply("before Page 7 after"), "before  after");
    }
}
