//! Improvement suggestions generated by the model from an analysis summary.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::analysis::prompt_builder::build_suggestions_prompt;
use crate::analysis::prompts::SUGGESTIONS_SYSTEM;
use crate::errors::AppError;
use crate::llm_client::TextModel;

const BULLET_MARKERS: &[char] = &['-', '•', '*'];

/// The subset of an analysis the suggestions prompt needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub match_score: u8,
    #[serde(default)]
    pub matched_keywords: BTreeSet<String>,
    #[serde(default)]
    pub missing_keywords: BTreeSet<String>,
}

pub async fn generate_suggestions(
    summary: &AnalysisSummary,
    model: &dyn TextModel,
) -> Result<Vec<String>, AppError> {
    let summary_json = serde_json::to_string_pretty(summary)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("serializing analysis summary: {e}")))?;
    let prompt = build_suggestions_prompt(&summary_json);
    let reply = model.complete(&prompt, SUGGESTIONS_SYSTEM).await?;
    Ok(parse_suggestions(&reply))
}

/// Lines starting with a bullet marker (`-`, `•`, `*`), markers stripped.
pub fn bullet_lines(reply: &str) -> Vec<String> {
    reply
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with(BULLET_MARKERS))
        .map(|line| line.trim_start_matches(BULLET_MARKERS).trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

/// Collects bullet lines. A reply with no bullets is kept whole.
pub fn parse_suggestions(reply: &str) -> Vec<String> {
    let suggestions = bullet_lines(reply);

    if suggestions.is_empty() {
        let whole = reply.trim();
        if whole.is_empty() {
            return vec![];
        }
        return vec![whole.to_string()];
    }
    suggestions
}
