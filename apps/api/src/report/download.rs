//! Plain-text file downloads.

use axum::{
    http::header,
    response::{IntoResponse, Response},
};

pub const TAILORED_RESUME_FILE: &str = "tailored_resume.txt";
pub const REPORT_FILE: &str = "resume_analysis_report.txt";
const MAX_FILE_STEM_CHARS: usize = 64;

/// Serves `body` as a UTF-8 text attachment.
pub fn text_attachment(file_name: &str, body: String) -> Response {
    let disposition = format!("attachment; filename=\"{file_name}\"");
    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response()
}

/// Keeps ASCII alphanumerics, `-`, `_` and `.`; everything else becomes `_`.
/// The result always ends in `.txt`; an unusable name yields `default`.
pub fn sanitize_file_name(requested: Option<&str>, default: &str) -> String {
    let Some(requested) = requested else {
        return default.to_string();
    };

    let cleaned: String = requested
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let stem = cleaned.strip_suffix(".txt").unwrap_or(&cleaned);
    let stem = stem.trim_matches(|c| c == '.' || c == '_');
    if stem.is_empty() {
        return default.to_string();
    }
    let stem: String = stem.chars().take(MAX_FILE_STEM_CHARS).collect();
    format!("{stem}.txt")
}
