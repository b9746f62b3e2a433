//! PDF text extraction. The page count is checked with lopdf before pdf-extract runs.

use tracing::debug;

use super::IngestError;

pub fn extract(bytes: &[u8], max_pages: usize) -> Result<String, IngestError> {
    let page_count = page_count(bytes)?;
    if page_count > max_pages {
        return Err(IngestError::SizeLimitExceeded {
            what: format!("PDF with {page_count} pages"),
            limit: max_pages,
            unit: "pages",
        });
    }

    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| IngestError::ExtractionFailed(format!("error reading PDF: {e}")))?;

    let text = text.trim();
    if text.is_empty() {
        return Err(IngestError::ExtractionFailed(
            "no text found in PDF; the file might be image-based or scanned".to_string(),
        ));
    }

    debug!("Extracted {} chars from {page_count}-page PDF", text.len());
    Ok(text.to_string())
}

fn page_count(bytes: &[u8]) -> Result<usize, IngestError> {
    let doc = lopdf::Document::load_mem(bytes)
        .map_err(|e| IngestError::ExtractionFailed(format!("error reading PDF: {e}")))?;
    Ok(doc.get_pages().len())
}
