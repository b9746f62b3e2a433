use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::ingest::ingest_bytes;
use crate::ingest::upload::{multipart_error, read_file_field, read_text_field, UploadedFile};
use crate::models::{DocumentKind, SourceFormat};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub kind: DocumentKind,
    pub source_format: SourceFormat,
    pub file_name: Option<String>,
    pub char_count: usize,
    pub raw_text: String,
}

/// POST /api/v1/documents/extract
///
/// Multipart form: `file` (required) and `kind` (`resume` or `job_description`,
/// default `resume`). Returns the extracted text so the client can preview it.
pub async fn handle_extract(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ExtractResponse>, AppError> {
    let limits = state.limits;
    let mut upload: Option<UploadedFile> = None;
    let mut kind = DocumentKind::Resume;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, &limits))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                if upload.is_some() {
                    return Err(AppError::Validation(
                        "only one 'file' field may be sent".to_string(),
                    ));
                }
                upload = Some(read_file_field(&mut field, &limits).await?);
            }
            "kind" => {
                let value = read_text_field(&mut field, &limits, "kind").await?;
                kind = DocumentKind::parse(&value).ok_or_else(|| {
                    AppError::Validation(format!("unknown document kind '{}'", value.trim()))
                })?;
            }
            _ => {}
        }
    }

    let upload =
        upload.ok_or_else(|| AppError::Validation("missing 'file' field".to_string()))?;
    let document = ingest_bytes(kind, upload.format, upload.bytes, limits).await?;

    Ok(Json(ExtractResponse {
        kind: document.kind,
        source_format: document.source_format,
        file_name: upload.file_name,
        char_count: document.char_count(),
        raw_text: document.raw_text,
    }))
}
