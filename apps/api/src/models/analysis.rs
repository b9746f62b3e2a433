use std::collections::BTreeSet;

use serde::Serialize;

/// Validated outcome of one analysis request.
///
/// Only the result parser constructs these; there are no setters, so a value
/// never changes after it leaves the parser. Keyword sets are ordered, which
/// keeps serialized output deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisResult {
    match_score: u8,
    matched_keywords: BTreeSet<String>,
    missing_keywords: BTreeSet<String>,
    tailored_text: String,
}

impl AnalysisResult {
    /// `match_score` must already be within 0..=100.
    pub(crate) fn new(
        match_score: u8,
        matched_keywords: BTreeSet<String>,
        missing_keywords: BTreeSet<String>,
        tailored_text: String,
    ) -> Self {
        debug_assert!(match_score <= 100);
        Self {
            match_score,
            matched_keywords,
            missing_keywords,
            tailored_text,
        }
    }

    pub fn match_score(&self) -> u8 {
        self.match_score
    }

    pub fn matched_keywords(&self) -> &BTreeSet<String> {
        &self.matched_keywords
    }

    pub fn missing_keywords(&self) -> &BTreeSet<String> {
        &self.missing_keywords
    }

    pub fn tailored_text(&self) -> &str {
        &self.tailored_text
    }
}
