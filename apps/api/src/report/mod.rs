//! Presentation: display metrics for an analysis and downloadable text files.

pub mod download;
pub mod profile;

use std::fmt::Write as _;

use serde::Serialize;

use crate::models::AnalysisResult;
use crate::report::profile::ResumeProfile;

const EXCELLENT_THRESHOLD: u8 = 85;
const GOOD_THRESHOLD: u8 = 70;
const FAIR_THRESHOLD: u8 = 50;
const TOP_MISSING: usize = 5;

/// Qualitative label for a match score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl ScoreBand {
    pub fn from_score(score: u8) -> Self {
        if score >= EXCELLENT_THRESHOLD {
            ScoreBand::Excellent
        } else if score >= GOOD_THRESHOLD {
            ScoreBand::Good
        } else if score >= FAIR_THRESHOLD {
            ScoreBand::Fair
        } else {
            ScoreBand::Poor
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreBand::Excellent => "Excellent match",
            ScoreBand::Good => "Good match",
            ScoreBand::Fair => "Fair match",
            ScoreBand::Poor => "Poor match",
        }
    }
}

/// Everything the browser needs to render an analysis.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisView {
    pub match_score: u8,
    pub band: ScoreBand,
    pub band_label: &'static str,
    pub matched_count: usize,
    pub missing_count: usize,
    /// Share of job keywords the resume covers, 0–100. `None` when the model
    /// listed no keywords at all.
    pub keyword_coverage: Option<u8>,
    pub matched_keywords: Vec<String>,
    pub missing_keywords: Vec<String>,
    pub top_missing_keywords: Vec<String>,
    pub suggestions: Vec<String>,
    pub tailored_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_profile: Option<ResumeProfile>,
}

impl AnalysisView {
    pub fn from_result(result: &AnalysisResult) -> Self {
        let score = result.match_score();
        let band = ScoreBand::from_score(score);
        let matched: Vec<String> = result.matched_keywords().iter().cloned().collect();
        let missing: Vec<String> = result.missing_keywords().iter().cloned().collect();
        let top_missing: Vec<String> = missing.iter().take(TOP_MISSING).cloned().collect();

        let total = matched.len() + missing.len();
        let keyword_coverage =
            (total > 0).then(|| ((matched.len() * 100) as f64 / total as f64).round() as u8);

        Self {
            match_score: score,
            band,
            band_label: band.label(),
            matched_count: matched.len(),
            missing_count: missing.len(),
            keyword_coverage,
            suggestions: local_suggestions(score, &top_missing),
            matched_keywords: matched,
            missing_keywords: missing,
            top_missing_keywords: top_missing,
            tailored_text: result.tailored_text().to_string(),
            resume_profile: None,
        }
    }

    /// Adds section and keyword-frequency insights computed from the resume
    /// the analysis was run on.
    pub fn with_resume(mut self, resume_text: &str) -> Self {
        let keywords = self.matched_keywords.iter().chain(&self.missing_keywords);
        self.resume_profile = Some(ResumeProfile::build(resume_text, keywords));
        self
    }
}

/// Rule-based suggestions that need no model call.
pub fn local_suggestions(score: u8, top_missing: &[String]) -> Vec<String> {
    let mut suggestions = Vec::new();
    if score < FAIR_THRESHOLD {
        suggestions.push(
            "Consider significantly restructuring your resume to better align with the job requirements"
                .to_string(),
        );
    } else if score < GOOD_THRESHOLD {
        suggestions
            .push("Add more relevant keywords and experiences to improve the job match".to_string());
    }
    if !top_missing.is_empty() {
        suggestions.push(format!(
            "Include these important keywords: {}",
            top_missing.join(", ")
        ));
    }
    suggestions
}

/// Plain-text report: metrics, keyword lists, then the tailored resume.
pub fn render_report_text(view: &AnalysisView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "RESUME ANALYSIS REPORT");
    let _ = writeln!(out, "======================");
    let _ = writeln!(
        out,
        "Match score: {}/100 ({})",
        view.match_score, view.band_label
    );
    if let Some(coverage) = view.keyword_coverage {
        let _ = writeln!(out, "Keyword coverage: {coverage}%");
    }
    let _ = writeln!(out);
    write_list(&mut out, "Matched keywords", &view.matched_keywords);
    write_list(&mut out, "Missing keywords", &view.missing_keywords);
    write_list(&mut out, "Suggestions", &view.suggestions);
    if let Some(profile) = &view.resume_profile {
        write_profile(&mut out, profile);
    }
    let _ = writeln!(out, "TAILORED RESUME");
    let _ = writeln!(out, "===============");
    out.push_str(&view.tailored_text);
    out.push('\n');
    out
}

fn write_profile(out: &mut String, profile: &ResumeProfile) {
    let sections: Vec<String> = profile
        .section_names()
        .iter()
        .map(|section| format!("{section:?}").to_lowercase())
        .collect();
    write_list(out, "Resume sections found", &sections);

    let frequency: Vec<String> = profile
        .keyword_frequency
        .iter()
        .map(|(keyword, count)| format!("{keyword}: {count}"))
        .collect();
    write_list(out, "Keyword mentions in resume", &frequency);
}

fn write_list(out: &mut String, title: &str, items: &[String]) {
    let _ = writeln!(out, "{title} ({}):", items.len());
    if items.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for item in items {
        let _ = writeln!(out, "  - {item}");
    }
    let _ = writeln!(out);
}
