//! Result parser: turns the model's free-text reply into a validated `AnalysisResult`.
//!
//! The model is not contractually bound to return well-formed JSON, so the
//! reply goes through three stages: locate the JSON object, decode it into a
//! plain map, then pick and validate every field before building the immutable
//! result. Decoding through a map lets a reply carry both the short and the
//! long name of a field; the short name wins.

use std::collections::BTreeSet;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::AnalysisResult;

/// Accepted names per field, in priority order: the short names from the
/// analysis prompt first, then the long names older prompts produced.
const SCORE_KEYS: &[&str] = &["score", "match_score"];
const MATCHED_KEYS: &[&str] = &["matched", "matched_keywords"];
const MISSING_KEYS: &[&str] = &["missing", "missing_keywords"];
const TAILORED_KEYS: &[&str] = &["tailored", "tailored_resume", "tailored_text"];

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("model reply does not contain a JSON object")]
    NoJsonObject,

    #[error("model reply is not valid JSON for an analysis: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("model reply is missing required field `{0}`")]
    MissingField(&'static str),

    #[error("model reply has an invalid `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

/// Parses and validates a model reply.
pub fn parse_analysis_reply(raw: &str) -> Result<AnalysisResult, ParseError> {
    let json = locate_json_object(raw)?;
    let reply: Map<String, Value> = serde_json::from_str(json)?;

    let score = validate_score(first_present(&reply, SCORE_KEYS))?;
    let tailored = validate_tailored(first_present(&reply, TAILORED_KEYS))?;

    let matched = normalize_keywords(first_present(&reply, MATCHED_KEYS), "matched")?;
    let mut missing = normalize_keywords(first_present(&reply, MISSING_KEYS), "missing")?;
    // A keyword the resume demonstrates is not a gap.
    missing.retain(|kw| !matched.contains(kw));

    Ok(AnalysisResult::new(score, matched, missing, tailored))
}

/// Finds the JSON object in a reply. Code fences are stripped, then the first
/// complete object is taken; anything after it (prose, stray braces) is ignored.
pub fn locate_json_object(raw: &str) -> Result<&str, ParseError> {
    let text = strip_json_fences(raw);

    let mut from = 0;
    while let Some(offset) = text[from..].find('{') {
        let start = from + offset;
        let mut stream = serde_json::Deserializer::from_str(&text[start..]).into_iter::<Value>();
        if let Some(Ok(Value::Object(_))) = stream.next() {
            return Ok(&text[start..start + stream.byte_offset()]);
        }
        from = start + 1;
    }

    // No complete object: hand the outermost span to the decoder so the
    // caller gets a precise syntax error.
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => Ok(&text[start..=end]),
        _ => Err(ParseError::NoJsonObject),
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

/// First non-null value among `keys`.
fn first_present<'a>(reply: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .find_map(|key| reply.get(*key).filter(|value| !value.is_null()))
}

fn validate_score(value: Option<&Value>) -> Result<u8, ParseError> {
    let value = value.ok_or(ParseError::MissingField("score"))?;

    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| ParseError::InvalidField {
        field: "score",
        reason: format!("expected a number, got {value}"),
    })?;

    if !number.is_finite() || !(0.0..=100.0).contains(&number) {
        return Err(ParseError::InvalidField {
            field: "score",
            reason: format!("{number} is outside 0-100"),
        });
    }
    Ok(number.round() as u8)
}

fn validate_tailored(value: Option<&Value>) -> Result<String, ParseError> {
    match value {
        Some(Value::String(text)) if !text.trim().is_empty() => Ok(text.trim().to_string()),
        None | Some(Value::String(_)) => Err(ParseError::MissingField("tailored")),
        Some(other) => Err(ParseError::InvalidField {
            field: "tailored",
            reason: format!("expected a string, got {other}"),
        }),
    }
}

fn normalize_keywords(
    value: Option<&Value>,
    field: &'static str,
) -> Result<BTreeSet<String>, ParseError> {
    let values = match value {
        None => return Ok(BTreeSet::new()),
        Some(Value::Array(values)) => values,
        Some(other) => {
            return Err(ParseError::InvalidField {
                field,
                reason: format!("expected a list of strings, found {other}"),
            })
        }
    };

    let mut keywords = BTreeSet::new();
    for value in values {
        let Value::String(keyword) = value else {
            return Err(ParseError::InvalidField {
                field,
                reason: format!("expected a list of strings, found {value}"),
            });
        };
        let keyword = keyword.trim().to_lowercase();
        if !keyword.is_empty() {
            keywords.insert(keyword);
        }
    }
    Ok(keywords)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_well_formed_reply() {
        let raw = r#"{"score": 82, "matched": ["python","sql"], "missing": ["aws"], "tailored": "..."}"#;
        let result = parse_analysis_reply(raw).unwrap();
        assert_eq!(result.match_score(), 82);
        assert_eq!(result.matched_keywords(), &set(&["python", "sql"]));
        assert_eq!(result.missing_keywords(), &set(&["aws"]));
        assert_eq!(result.tailored_text(), "...");
    }

    #[test]
    fn test_missing_score_is_parse_error() {
        let raw = r#"{"matched": ["python"], "missing": [], "tailored": "resume"}"#;
        let err = parse_analysis_reply(raw).unwrap_err();
        assert!(matches!(err, ParseError::MissingField("score")));
    }

    #[test]
    fn test_null_score_is_parse_error() {
        let raw = r#"{"score": null, "tailored": "resume"}"#;
        assert!(matches!(
            parse_analysis_reply(raw),
            Err(ParseError::MissingField("score"))
        ));
    }

    #[test]
    fn test_missing_tailored_is_parse_error() {
        let raw = r#"{"score": 50, "matched": [], "missing": []}"#;
        assert!(matches!(
            parse_analysis_reply(raw),
            Err(ParseError::MissingField("tailored"))
        ));
    }

    #[test]
    fn test_long_field_names_are_accepted() {
        let raw = r#"{
            "match_score": 70,
            "matched_keywords": ["Rust"],
            "missing_keywords": ["Go"],
            "tailored_resume": "Jane Doe"
        }"#;
        let result = parse_analysis_reply(raw).unwrap();
        assert_eq!(result.match_score(), 70);
        assert_eq!(result.matched_keywords(), &set(&["rust"]));
        assert_eq!(result.missing_keywords(), &set(&["go"]));
    }

    #[test]
    fn test_fenced_reply_with_prose() {
        let raw = "Here is the analysis:\n```json\n{\"score\": 64, \"tailored\": \"cv\"}\n```";
        let result = parse_analysis_reply(raw).unwrap();
        assert_eq!(result.match_score(), 64);
    }

    #[test]
    fn test_object_surrounded_by_prose() {
        let raw = "Sure! {\"score\": \"91%\", \"tailored\": \"cv\"} Hope this helps.";
        let result = parse_analysis_reply(raw).unwrap();
        assert_eq!(result.match_score(), 91);
    }

    #[test]
    fn test_fractional_score_is_rounded() {
        let raw = r#"{"score": 72.6, "tailored": "cv"}"#;
        assert_eq!(parse_analysis_reply(raw).unwrap().match_score(), 73);
    }

    #[test]
    fn test_out_of_range_score_is_invalid() {
        let raw = r#"{"score": 140, "tailored": "cv"}"#;
        assert!(matches!(
            parse_analysis_reply(raw),
            Err(ParseError::InvalidField { field: "score", .. })
        ));
    }

    #[test]
    fn test_non_numeric_score_is_invalid() {
        let raw = r#"{"score": "high", "tailored": "cv"}"#;
        assert!(matches!(
            parse_analysis_reply(raw),
            Err(ParseError::InvalidField { field: "score", .. })
        ));
    }

    #[test]
    fn test_keywords_are_normalized_and_deduplicated() {
        let raw = r#"{"score": 10, "matched": [" SQL ", "sql", ""], "missing": ["AWS", "Sql"], "tailored": "cv"}"#;
        let result = parse_analysis_reply(raw).unwrap();
        assert_eq!(result.matched_keywords(), &set(&["sql"]));
        assert_eq!(result.missing_keywords(), &set(&["aws"]));
    }

    #[test]
    fn test_non_string_keyword_is_invalid() {
        let raw = r#"{"score": 10, "matched": [1, 2], "tailored": "cv"}"#;
        assert!(matches!(
            parse_analysis_reply(raw),
            Err(ParseError::InvalidField { field: "matched", .. })
        ));
    }

    #[test]
    fn test_plain_text_reply_has_no_json() {
        assert!(matches!(
            parse_analysis_reply("I cannot help with that."),
            Err(ParseError::NoJsonObject)
        ));
    }

    #[test]
    fn test_truncated_json_is_malformed() {
        assert!(matches!(
            parse_analysis_reply(r#"{"score": 82, "tailored": "cv""#),
            Err(ParseError::NoJsonObject) | Err(ParseError::Malformed(_))
        ));
    }

    #[test]
    fn test_prose_with_braces_after_object_is_ignored() {
        let raw = "{\"score\": 82, \"tailored\": \"cv\"}\nNote: replace {name} with yours.";
        let result = parse_analysis_reply(raw).unwrap();
        assert_eq!(result.match_score(), 82);
        assert_eq!(result.tailored_text(), "cv");
    }

    #[test]
    fn test_braces_in_leading_prose_are_skipped() {
        let raw = "Fill in {company} later. {\"score\": 55, \"tailored\": \"cv\"} {done}";
        assert_eq!(parse_analysis_reply(raw).unwrap().match_score(), 55);
    }

    #[test]
    fn test_locate_returns_first_complete_object() {
        let raw = r#"{"a": {"b": 1}} trailing } brace"#;
        assert_eq!(locate_json_object(raw).unwrap(), r#"{"a": {"b": 1}}"#);
    }

    #[test]
    fn test_short_and_long_names_together_prefer_short() {
        let raw = r#"{"score": 80, "match_score": 40, "tailored": "cv", "tailored_resume": "old"}"#;
        let result = parse_analysis_reply(raw).unwrap();
        assert_eq!(result.match_score(), 80);
        assert_eq!(result.tailored_text(), "cv");
    }

    #[test]
    fn test_null_short_name_falls_back_to_long_name() {
        let raw = r#"{"score": null, "match_score": 40, "tailored": "cv"}"#;
        assert_eq!(parse_analysis_reply(raw).unwrap().match_score(), 40);
    }

    #[test]
    fn test_keyword_field_that_is_not_a_list_is_invalid() {
        let raw = r#"{"score": 10, "missing": "aws", "tailored": "cv"}"#;
        assert!(matches!(
            parse_analysis_reply(raw),
            Err(ParseError::InvalidField { field: "missing", .. })
        ));
    }

    #[test]
    fn test_non_string_tailored_is_invalid() {
        let raw = r#"{"score": 10, "tailored": ["cv"]}"#;
        assert!(matches!(
            parse_analysis_reply(raw),
            Err(ParseError::InvalidField { field: "tailored", .. })
        ));
    }

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }
}
