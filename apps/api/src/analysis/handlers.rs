//! Axum route handlers for the Analysis API.

use axum::{
    extract::{Multipart, State},
    response::Response,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::analysis::job_analysis::{analyze_job, JobAnalysis};
use crate::analysis::keywords::{extract_keywords, DEFAULT_CONTEXT};
use crate::analysis::pipeline::run_analysis;
use crate::analysis::suggestions::{generate_suggestions, AnalysisSummary};
use crate::errors::AppError;
use crate::ingest::upload::{multipart_error, read_file_field, read_text_field, UploadedFile};
use crate::ingest::{ingest_bytes, ingest_pasted_text};
use crate::models::{AnalysisResult, Document, DocumentKind};
use crate::report::download::{
    sanitize_file_name, text_attachment, REPORT_FILE, TAILORED_RESUME_FILE,
};
use crate::report::{render_report_text, AnalysisView};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub analysis_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub result: AnalysisResult,
    pub view: AnalysisView,
}

#[derive(Debug, Deserialize)]
pub struct JobAnalyzeRequest {
    pub job_text: String,
}

#[derive(Debug, Deserialize)]
pub struct KeywordsRequest {
    pub text: String,
    #[serde(default)]
    pub context: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct KeywordsResponse {
    pub context: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    pub suggestions: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct DownloadRequest {
    pub tailored_text: String,
    #[serde(default)]
    pub file_name: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/analyze
///
/// Multipart form: `resume` file plus either a `job_description` file or a
/// pasted `job_text` field.
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let (resume, result) = analyze_form(&state, multipart).await?;
    let view = AnalysisView::from_result(&result).with_resume(&resume.raw_text);

    Ok(Json(AnalyzeResponse {
        analysis_id: Uuid::new_v4(),
        generated_at: Utc::now(),
        result,
        view,
    }))
}

/// POST /api/v1/analysis/report
///
/// Same form as `/api/v1/analyze`; answers with a downloadable text report.
pub async fn handle_report(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let (resume, result) = analyze_form(&state, multipart).await?;
    let view = AnalysisView::from_result(&result).with_resume(&resume.raw_text);
    Ok(text_attachment(REPORT_FILE, render_report_text(&view)))
}

/// POST /api/v1/job/analyze
///
/// Blank `job_text` is rejected by ingestion, the same as a blank pasted field
/// on the analyze form.
pub async fn handle_job_analyze(
    State(state): State<AppState>,
    Json(request): Json<JobAnalyzeRequest>,
) -> Result<Json<JobAnalysis>, AppError> {
    let job = ingest_pasted_text(
        DocumentKind::JobDescription,
        &request.job_text,
        &state.limits,
    )?;
    let analysis = analyze_job(
        &job.raw_text,
        state.model.as_ref(),
        state.config.max_prompt_chars,
    )
    .await?;
    Ok(Json(analysis))
}

/// POST /api/v1/keywords/extract
///
/// `context` narrows what the model looks for (`technical`, `soft skills`);
/// omitted or blank means general keywords.
pub async fn handle_keywords(
    State(state): State<AppState>,
    Json(request): Json<KeywordsRequest>,
) -> Result<Json<KeywordsResponse>, AppError> {
    let document = ingest_pasted_text(DocumentKind::JobDescription, &request.text, &state.limits)?;
    let context = request
        .context
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_CONTEXT)
        .to_string();
    let keywords = extract_keywords(
        &document.raw_text,
        &context,
        state.model.as_ref(),
        state.config.max_prompt_chars,
    )
    .await?;
    Ok(Json(KeywordsResponse { context, keywords }))
}

/// POST /api/v1/analysis/suggestions
pub async fn handle_suggestions(
    State(state): State<AppState>,
    Json(summary): Json<AnalysisSummary>,
) -> Result<Json<SuggestionsResponse>, AppError> {
    if summary.match_score > 100 {
        return Err(AppError::Validation(format!(
            "match_score must be between 0 and 100, got {}",
            summary.match_score
        )));
    }
    let suggestions = generate_suggestions(&summary, state.model.as_ref()).await?;
    Ok(Json(SuggestionsResponse { suggestions }))
}

/// POST /api/v1/tailored/download
pub async fn handle_download(Json(request): Json<DownloadRequest>) -> Result<Response, AppError> {
    if request.tailored_text.trim().is_empty() {
        return Err(AppError::Validation(
            "tailored_text cannot be empty".to_string(),
        ));
    }
    let file_name = sanitize_file_name(request.file_name.as_deref(), TAILORED_RESUME_FILE);
    Ok(text_attachment(&file_name, request.tailored_text))
}

// ────────────────────────────────────────────────────────────────────────────
// Form handling
// ────────────────────────────────────────────────────────────────────────────

enum JobSource {
    File(UploadedFile),
    Text(String),
}

/// Reads the analyze form, ingests both documents and runs the pipeline.
/// Hands back the ingested resume along with the result.
async fn analyze_form(
    state: &AppState,
    mut multipart: Multipart,
) -> Result<(Document, AnalysisResult), AppError> {
    let limits = state.limits;
    let mut resume: Option<UploadedFile> = None;
    let mut job: Option<JobSource> = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, &limits))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "resume" => {
                if resume.is_some() {
                    return Err(AppError::Validation(
                        "exactly one resume may be uploaded".to_string(),
                    ));
                }
                resume = Some(read_file_field(&mut field, &limits).await?);
            }
            "job_description" | "job_text" => {
                if job.is_some() {
                    return Err(AppError::Validation(
                        "send either a job_description file or job_text, not both".to_string(),
                    ));
                }
                job = Some(if name == "job_text" {
                    JobSource::Text(read_text_field(&mut field, &limits, "job_text").await?)
                } else {
                    JobSource::File(read_file_field(&mut field, &limits).await?)
                });
            }
            _ => {}
        }
    }

    let resume =
        resume.ok_or_else(|| AppError::Validation("missing 'resume' file".to_string()))?;
    let job = job.ok_or_else(|| {
        AppError::Validation(
            "missing job description: send 'job_description' or 'job_text'".to_string(),
        )
    })?;

    let resume = ingest_bytes(DocumentKind::Resume, resume.format, resume.bytes, limits).await?;
    let job = match job {
        JobSource::File(upload) => {
            ingest_bytes(
                DocumentKind::JobDescription,
                upload.format,
                upload.bytes,
                limits,
            )
            .await?
        }
        JobSource::Text(text) => {
            ingest_pasted_text(DocumentKind::JobDescription, &text, &limits)?
        }
    };

    info!(
        "Analyze request: resume {} ({} chars), job {} ({} chars)",
        resume.source_format.as_str(),
        resume.char_count(),
        job.source_format.as_str(),
        job.char_count()
    );

    let result = run_analysis(
        &resume,
        &job,
        state.model.as_ref(),
        state.config.max_prompt_chars,
    )
    .await?;
    Ok((resume, result))
}
