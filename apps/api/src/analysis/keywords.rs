//! Keyword extraction through the model.

use std::collections::HashSet;

use tracing::debug;

use crate::analysis::prompt_builder::build_keyword_prompt;
use crate::analysis::suggestions::bullet_lines;
use crate::errors::AppError;
use crate::llm_client::TextModel;

pub const DEFAULT_CONTEXT: &str = "general";
const KEYWORD_SYSTEM: &str = "You are an expert recruiter. \
    Respond with a plain list, one keyword per line, each line starting with '- '.";

/// Asks the model for the important keywords of `text` in the given context.
/// Keywords keep the model's order; repeats (ignoring case) are dropped.
pub async fn extract_keywords(
    text: &str,
    context: &str,
    model: &dyn TextModel,
    prompt_ceiling: usize,
) -> Result<Vec<String>, AppError> {
    let context = match context.trim() {
        "" => DEFAULT_CONTEXT,
        trimmed => trimmed,
    };
    let prompt = build_keyword_prompt(text, context, prompt_ceiling);
    let reply = model.complete(&prompt, KEYWORD_SYSTEM).await?;
    let keywords = dedup_keywords(bullet_lines(&reply));
    debug!("Extracted {} keywords ({context})", keywords.len());
    Ok(keywords)
}

fn dedup_keywords(keywords: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    keywords
        .into_iter()
        .filter(|kw| seen.insert(kw.to_lowercase()))
        .collect()
}
