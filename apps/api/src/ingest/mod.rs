//! File ingestion: validates uploads and extracts plain text from PDF, DOCX and text files.
//!
//! Size checks always run before any parser touches the bytes. Extraction of
//! binary formats happens on the blocking pool so a slow or panicking parser
//! never stalls the runtime.

pub mod docx;
pub mod handlers;
pub mod pdf;
pub mod text;
pub mod upload;

use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;
use crate::models::{Document, DocumentKind, SourceFormat};

const MIB: usize = 1024 * 1024;
/// Per-format ceilings; each is further clamped to the global upload limit.
const PDF_MAX_BYTES: usize = 10 * MIB;
const DOCX_MAX_BYTES: usize = 5 * MIB;
const TEXT_MAX_BYTES: usize = MIB;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Unsupported file format: {0}. Please upload PDF, DOCX, or TXT files")]
    UnsupportedFormat(String),

    #[error("{what} exceeds the limit of {limit} {unit}")]
    SizeLimitExceeded {
        what: String,
        limit: usize,
        unit: &'static str,
    },

    #[error("Could not extract text: {0}")]
    ExtractionFailed(String),
}

impl IngestError {
    fn too_many_bytes(what: impl Into<String>, limit: usize) -> Self {
        IngestError::SizeLimitExceeded {
            what: what.into(),
            limit,
            unit: "bytes",
        }
    }
}

/// Upload limits derived from configuration.
#[derive(Debug, Clone, Copy)]
pub struct IngestLimits {
    pub max_upload_bytes: usize,
    pub max_pdf_pages: usize,
    /// Whole multipart body, enforced by the router.
    pub max_request_bytes: usize,
}

impl IngestLimits {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_upload_bytes: config.max_upload_bytes,
            max_pdf_pages: config.max_pdf_pages,
            max_request_bytes: config.request_body_limit(),
        }
    }

    /// Effective byte ceiling for a format.
    pub fn max_bytes_for(&self, format: SourceFormat) -> usize {
        let per_format = match format {
            SourceFormat::Pdf => PDF_MAX_BYTES,
            SourceFormat::Docx => DOCX_MAX_BYTES,
            SourceFormat::Text => TEXT_MAX_BYTES,
        };
        per_format.min(self.max_upload_bytes)
    }
}

/// Resolves the declared format of an upload: extension first, then MIME type.
pub fn resolve_format(
    file_name: Option<&str>,
    content_type: Option<&str>,
) -> Result<SourceFormat, IngestError> {
    if let Some(format) = file_name.and_then(SourceFormat::from_file_name) {
        return Ok(format);
    }
    if let Some(format) = content_type.and_then(SourceFormat::from_mime) {
        return Ok(format);
    }
    let declared = file_name
        .or(content_type)
        .unwrap_or("unknown")
        .to_string();
    Err(IngestError::UnsupportedFormat(declared))
}

/// Rejects a buffer larger than the format's ceiling.
pub fn check_size(
    len: usize,
    format: SourceFormat,
    limits: &IngestLimits,
) -> Result<(), IngestError> {
    let limit = limits.max_bytes_for(format);
    if len > limit {
        return Err(IngestError::too_many_bytes(
            format!("{} file of {len} bytes", format.as_str()),
            limit,
        ));
    }
    Ok(())
}

/// Validates and extracts a document from raw bytes.
pub async fn ingest_bytes(
    kind: DocumentKind,
    format: SourceFormat,
    bytes: Bytes,
    limits: IngestLimits,
) -> Result<Document, IngestError> {
    check_size(bytes.len(), format, &limits)?;

    let raw_text = match format {
        SourceFormat::Text => text::extract(&bytes)?,
        SourceFormat::Pdf | SourceFormat::Docx => {
            extract_on_blocking_pool(format, move || extract_binary(format, &bytes, &limits))
                .await?
        }
    };

    debug!(
        "Ingested {kind} ({}): {} chars",
        format.as_str(),
        raw_text.chars().count()
    );

    Ok(Document::new(kind, format, raw_text))
}

/// Ingests pasted text (job descriptions typed into the form).
pub fn ingest_pasted_text(
    kind: DocumentKind,
    text: &str,
    limits: &IngestLimits,
) -> Result<Document, IngestError> {
    check_size(text.len(), SourceFormat::Text, limits)?;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(IngestError::ExtractionFailed(format!(
            "the pasted {kind} is empty"
        )));
    }
    Ok(Document::new(kind, SourceFormat::Text, trimmed.to_string()))
}

/// Runs a parser on the blocking pool. A panicking parser becomes `ExtractionFailed`.
async fn extract_on_blocking_pool<F>(format: SourceFormat, parse: F) -> Result<String, IngestError>
where
    F: FnOnce() -> Result<String, IngestError> + Send + 'static,
{
    tokio::task::spawn_blocking(parse).await.map_err(|e| {
        warn!("{} extraction task aborted: {e}", format.as_str());
        IngestError::ExtractionFailed(format!(
            "the {} parser failed on this file",
            format.as_str()
        ))
    })?
}

fn extract_binary(
    format: SourceFormat,
    bytes: &[u8],
    limits: &IngestLimits,
) -> Result<String, IngestError> {
    match format {
        SourceFormat::Pdf => pdf::extract(bytes, limits.max_pdf_pages),
        SourceFormat::Docx => docx::extract(bytes),
        SourceFormat::Text => text::extract(bytes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> IngestLimits {
        IngestLimits {
            max_upload_bytes: 10 * MIB,
            max_pdf_pages: 10,
            max_request_bytes: 21 * MIB,
        }
    }

    #[test]
    fn test_resolve_format_prefers_extension_over_mime() {
        let format = resolve_format(Some("resume.docx"), Some("application/pdf")).unwrap();
        assert_eq!(format, SourceFormat::Docx);
    }

    #[test]
    fn test_resolve_format_falls_back_to_mime() {
        let format = resolve_format(Some("resume"), Some("application/pdf")).unwrap();
        assert_eq!(format, SourceFormat::Pdf);
    }

    #[test]
    fn test_resolve_format_unknown_is_unsupported() {
        let err = resolve_format(Some("photo.png"), Some("image/png")).unwrap_err();
        assert!(matches!(err, IngestError::UnsupportedFormat(name) if name == "photo.png"));
    }

    #[test]
    fn test_per_format_limits_are_clamped_to_global_limit() {
        let limits = IngestLimits {
            max_upload_bytes: 2 * MIB,
            max_pdf_pages: 10,
            max_request_bytes: 5 * MIB,
        };
        assert_eq!(limits.max_bytes_for(SourceFormat::Pdf), 2 * MIB);
        assert_eq!(limits.max_bytes_for(SourceFormat::Docx), 2 * MIB);
        assert_eq!(limits.max_bytes_for(SourceFormat::Text), MIB);
    }

    #[test]
    fn test_check_size_allows_exact_limit() {
        assert!(check_size(MIB, SourceFormat::Text, &limits()).is_ok());
        assert!(matches!(
            check_size(MIB + 1, SourceFormat::Text, &limits()),
            Err(IngestError::SizeLimitExceeded { .. })
        ));
    }

    #[tokio::test]
    async fn test_ingest_text_returns_non_empty_text() {
        let doc = ingest_bytes(
            DocumentKind::Resume,
            SourceFormat::Text,
            Bytes::from_static(b"  Jane Doe\nRust engineer  "),
            limits(),
        )
        .await
        .unwrap();
        assert_eq!(doc.raw_text, "Jane Doe\nRust engineer");
        assert_eq!(doc.kind, DocumentKind::Resume);
    }

    #[tokio::test]
    async fn test_oversized_file_fails_before_parsing() {
        // Not a valid PDF: if parsing ran we would see ExtractionFailed instead.
        let bytes = Bytes::from(vec![0u8; 10 * MIB + 1]);
        let err = ingest_bytes(DocumentKind::Resume, SourceFormat::Pdf, bytes, limits())
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::SizeLimitExceeded { .. }));
    }

    #[tokio::test]
    async fn test_oversized_docx_uses_docx_ceiling() {
        let bytes = Bytes::from(vec![0u8; 5 * MIB + 1]);
        let err = ingest_bytes(DocumentKind::Resume, SourceFormat::Docx, bytes, limits())
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::SizeLimitExceeded { .. }));
    }

    #[tokio::test]
    async fn test_garbage_pdf_is_extraction_failure() {
        let err = ingest_bytes(
            DocumentKind::Resume,
            SourceFormat::Pdf,
            Bytes::from_static(b"definitely not a pdf"),
            limits(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, IngestError::ExtractionFailed(_)));
    }

    #[tokio::test]
    async fn test_panicking_parser_is_extraction_failure() {
        let err = extract_on_blocking_pool(SourceFormat::Pdf, || panic!("parser bug"))
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::ExtractionFailed(msg) if msg.contains("pdf parser")));
    }

    #[tokio::test]
    async fn test_parser_errors_pass_through_the_blocking_pool() {
        let err = extract_on_blocking_pool(SourceFormat::Docx, || {
            Err(IngestError::ExtractionFailed("no text found".to_string()))
        })
        .await
        .unwrap_err();
        assert!(matches!(err, IngestError::ExtractionFailed(msg) if msg == "no text found"));
    }

    #[test]
    fn test_pasted_text_is_trimmed_and_tagged_as_text() {
        let doc =
            ingest_pasted_text(DocumentKind::JobDescription, "\n Rust, SQL \n", &limits()).unwrap();
        assert_eq!(doc.source_format, SourceFormat::Text);
        assert_eq!(doc.raw_text, "Rust, SQL");
    }

    #[test]
    fn test_blank_pasted_text_is_extraction_failure() {
        let err = ingest_pasted_text(DocumentKind::JobDescription, "   ", &limits()).unwrap_err();
        assert!(matches!(err, IngestError::ExtractionFailed(_)));
    }
}
