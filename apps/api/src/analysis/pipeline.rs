//! Analysis pipeline: one linear pass per request.
//!
//! Flow: validate document pair → build prompt → call model → parse reply.
//! Ingestion happens before this (in the handlers) and presentation after.

use tracing::info;

use crate::analysis::prompt_builder::build_analysis_prompt;
use crate::analysis::prompts::ANALYSIS_SYSTEM;
use crate::analysis::result_parser::parse_analysis_reply;
use crate::errors::AppError;
use crate::llm_client::TextModel;
use crate::models::{AnalysisResult, Document, DocumentKind};

/// Analyzes exactly one resume against exactly one job description.
pub async fn run_analysis(
    resume: &Document,
    job: &Document,
    model: &dyn TextModel,
    prompt_ceiling: usize,
) -> Result<AnalysisResult, AppError> {
    if resume.kind != DocumentKind::Resume {
        return Err(AppError::Validation(format!(
            "expected a resume, got a {}",
            resume.kind
        )));
    }
    if job.kind != DocumentKind::JobDescription {
        return Err(AppError::Validation(format!(
            "expected a job description, got a {}",
            job.kind
        )));
    }

    let prompt = build_analysis_prompt(resume, job, prompt_ceiling);
    info!(
        "Running analysis: resume {} chars ({}), job {} chars ({}), prompt {} chars",
        resume.char_count(),
        resume.source_format.as_str(),
        job.char_count(),
        job.source_format.as_str(),
        prompt.len()
    );

    let reply = model.complete(&prompt, ANALYSIS_SYSTEM).await?;
    let result = parse_analysis_reply(&reply)?;

    info!(
        "Analysis complete: score={}, matched={}, missing={}",
        result.match_score(),
        result.matched_keywords().len(),
        result.missing_keywords().len()
    );
    Ok(result)
}
