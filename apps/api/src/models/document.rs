use std::fmt;

use serde::{Deserialize, Serialize};

/// Which side of the comparison a document represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Resume,
    JobDescription,
}

impl DocumentKind {
    /// Accepts the wire names plus a couple of common spellings from form fields.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "resume" | "cv" => Some(DocumentKind::Resume),
            "job_description" | "job-description" | "job" | "jd" => {
                Some(DocumentKind::JobDescription)
            }
            _ => None,
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Resume => f.write_str("resume"),
            DocumentKind::JobDescription => f.write_str("job description"),
        }
    }
}

/// Format the raw bytes were declared as when uploaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    Pdf,
    Docx,
    Text,
}

impl SourceFormat {
    /// Resolves the format from a file name extension (case-insensitive).
    pub fn from_file_name(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(SourceFormat::Pdf),
            "docx" => Some(SourceFormat::Docx),
            "txt" | "text" => Some(SourceFormat::Text),
            _ => None,
        }
    }

    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            "application/pdf" => Some(SourceFormat::Pdf),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
                Some(SourceFormat::Docx)
            }
            "text/plain" => Some(SourceFormat::Text),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceFormat::Pdf => "pdf",
            SourceFormat::Docx => "docx",
            SourceFormat::Text => "text",
        }
    }
}

/// An uploaded document after text extraction. Lives for a single request.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pub kind: DocumentKind,
    pub source_format: SourceFormat,
    pub raw_text: String,
}

impl Document {
    pub fn new(kind: DocumentKind, source_format: SourceFormat, raw_text: String) -> Self {
        Self {
            kind,
            source_format,
            raw_text,
        }
    }

    pub fn char_count(&self) -> usize {
        self.raw_text.chars().count()
    }
}
