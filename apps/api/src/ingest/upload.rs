//! Multipart helpers: read upload fields with the size limit enforced while streaming.

use axum::extract::multipart::{Field, MultipartError};
use axum::http::StatusCode;
use bytes::{Bytes, BytesMut};
use tracing::debug;

use super::{resolve_format, IngestError, IngestLimits};
use crate::errors::AppError;
use crate::models::SourceFormat;

/// A file field that passed format and size checks but has not been parsed.
#[derive(Debug)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub format: SourceFormat,
    pub bytes: Bytes,
}

/// Reads a file field. The declared format is resolved before any bytes are
/// read, and reading stops as soon as the format's ceiling is exceeded.
pub async fn read_file_field(
    field: &mut Field<'_>,
    limits: &IngestLimits,
) -> Result<UploadedFile, AppError> {
    let file_name = field.file_name().map(str::to_string);
    let format = resolve_format(file_name.as_deref(), field.content_type())?;
    let limit = limits.max_bytes_for(format);
    let label = file_name.as_deref().unwrap_or("uploaded file").to_string();

    let bytes = read_limited(field, limit, &label, limits).await?;
    debug!("Received {label} ({}, {} bytes)", format.as_str(), bytes.len());

    Ok(UploadedFile {
        file_name,
        format,
        bytes,
    })
}

/// Reads a plain form field as UTF-8 text, capped at the text ceiling.
pub async fn read_text_field(
    field: &mut Field<'_>,
    limits: &IngestLimits,
    name: &str,
) -> Result<String, AppError> {
    let limit = limits.max_bytes_for(SourceFormat::Text);
    let bytes = read_limited(field, limit, name, limits).await?;
    String::from_utf8(bytes.to_vec())
        .map_err(|_| AppError::Validation(format!("field '{name}' is not valid UTF-8")))
}

async fn read_limited(
    field: &mut Field<'_>,
    limit: usize,
    label: &str,
    limits: &IngestLimits,
) -> Result<Bytes, AppError> {
    let mut buf = BytesMut::new();
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| multipart_error(e, limits))?
    {
        if buf.len() + chunk.len() > limit {
            return Err(IngestError::SizeLimitExceeded {
                what: label.to_string(),
                limit,
                unit: "bytes",
            }
            .into());
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(buf.freeze())
}

/// Maps multipart transport errors; an over-limit request body is a size error.
pub fn multipart_error(e: MultipartError, limits: &IngestLimits) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return IngestError::SizeLimitExceeded {
            what: "request body".to_string(),
            limit: limits.max_request_bytes,
            unit: "bytes",
        }
        .into();
    }
    AppError::Validation(format!("malformed multipart request: {}", e.body_text()))
}
