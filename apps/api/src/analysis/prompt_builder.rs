//! Prompt builder: fills fixed templates with document text.
//!
//! Substitution is single-pass: text injected into a placeholder is never
//! scanned again, so a resume that happens to contain `{job_text}` stays
//! verbatim. Each injected document is capped at a per-document character
//! ceiling; text at or below the ceiling is always included unchanged.

use tracing::warn;

use crate::analysis::prompts::{
    ANALYSIS_PROMPT_TEMPLATE, JOB_ANALYSIS_PROMPT_TEMPLATE, KEYWORD_EXTRACTION_PROMPT_TEMPLATE,
    SUGGESTIONS_PROMPT_TEMPLATE,
};
use crate::llm_client::prompts::FACTUALITY_INSTRUCTION;
use crate::models::Document;

/// Builds the resume-vs-job analysis prompt.
pub fn build_analysis_prompt(resume: &Document, job: &Document, ceiling: usize) -> String {
    let resume_text = cap_document_text(&resume.raw_text, ceiling, "resume");
    let job_text = cap_document_text(&job.raw_text, ceiling, "job description");

    fill_template(
        ANALYSIS_PROMPT_TEMPLATE,
        &[
            ("factuality_instruction", FACTUALITY_INSTRUCTION),
            ("resume_text", resume_text),
            ("job_text", job_text),
        ],
    )
}

pub fn build_job_analysis_prompt(job_text: &str, ceiling: usize) -> String {
    let job_text = cap_document_text(job_text, ceiling, "job description");
    fill_template(JOB_ANALYSIS_PROMPT_TEMPLATE, &[("job_text", job_text)])
}

pub fn build_keyword_prompt(text: &str, context: &str, ceiling: usize) -> String {
    let text = cap_document_text(text, ceiling, "keyword source");
    fill_template(
        KEYWORD_EXTRACTION_PROMPT_TEMPLATE,
        &[("context", context), ("text", text)],
    )
}

pub fn build_suggestions_prompt(analysis_json: &str) -> String {
    fill_template(
        SUGGESTIONS_PROMPT_TEMPLATE,
        &[("analysis_json", analysis_json)],
    )
}

/// Replaces every `{key}` in `template` with its value in one left-to-right pass.
/// Braces that do not form a known placeholder are copied through untouched.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let capacity = template.len() + values.iter().map(|(_, v)| v.len()).sum::<usize>();
    let mut out = String::with_capacity(capacity);
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let hit = values.iter().find(|(key, _)| {
            after
                .strip_prefix(*key)
                .is_some_and(|tail| tail.starts_with('}'))
        });
        match hit {
            Some((key, value)) => {
                out.push_str(value);
                rest = &after[key.len() + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Cuts `text` to at most `ceiling` chars, on a char boundary.
pub fn truncate_chars(text: &str, ceiling: usize) -> &str {
    match text.char_indices().nth(ceiling) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

fn cap_document_text<'a>(text: &'a str, ceiling: usize, label: &str) -> &'a str {
    let capped = truncate_chars(text, ceiling);
    if capped.len() < text.len() {
        warn!(
            "{label} text exceeds {ceiling} chars ({} chars); truncating for the prompt",
            text.chars().count()
        );
    }
    capped
}
