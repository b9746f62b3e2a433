//! Job description analysis: extracts skills, requirements and culture signals from a JD.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::analysis::prompt_builder::build_job_analysis_prompt;
use crate::analysis::result_parser::{locate_json_object, ParseError};
use crate::errors::AppError;
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::TextModel;

const NOT_SPECIFIED: &str = "Not specified";

/// Structured view of a job description. Every field is optional in the
/// model's reply and falls back to an empty or "Not specified" value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobAnalysis {
    pub technical_skills: Vec<String>,
    pub soft_skills: Vec<String>,
    pub experience_level: String,
    pub education: String,
    pub key_responsibilities: Vec<String>,
    pub required_qualifications: Vec<String>,
    pub preferred_qualifications: Vec<String>,
    pub company_culture: String,
    pub key_skills: Vec<String>,
}

impl Default for JobAnalysis {
    fn default() -> Self {
        Self {
            technical_skills: vec![],
            soft_skills: vec![],
            experience_level: NOT_SPECIFIED.to_string(),
            education: NOT_SPECIFIED.to_string(),
            key_responsibilities: vec![],
            required_qualifications: vec![],
            preferred_qualifications: vec![],
            company_culture: String::new(),
            key_skills: vec![],
        }
    }
}

impl JobAnalysis {
    /// Fills `key_skills` from technical + soft skills when the model left it empty.
    fn with_key_skills_fallback(mut self) -> Self {
        if self.key_skills.is_empty() {
            self.key_skills = self
                .technical_skills
                .iter()
                .chain(self.soft_skills.iter())
                .cloned()
                .collect();
        }
        self
    }
}

/// Parses the model's reply. A `null` field is treated the same as a missing one.
pub fn parse_job_analysis_reply(raw: &str) -> Result<JobAnalysis, ParseError> {
    let json = locate_json_object(raw)?;
    let mut reply: Map<String, Value> = serde_json::from_str(json)?;
    reply.retain(|_, value| !value.is_null());
    let analysis: JobAnalysis = serde_json::from_value(Value::Object(reply))?;
    Ok(analysis.with_key_skills_fallback())
}

/// Analyzes a job description with the model.
pub async fn analyze_job(
    job_text: &str,
    model: &dyn TextModel,
    prompt_ceiling: usize,
) -> Result<JobAnalysis, AppError> {
    let prompt = build_job_analysis_prompt(job_text, prompt_ceiling);
    let reply = model.complete(&prompt, JSON_ONLY_SYSTEM).await?;
    let analysis = parse_job_analysis_reply(&reply)?;
    debug!(
        "Job analysis: {} key skills, level '{}'",
        analysis.key_skills.len(),
        analysis.experience_level
    );
    Ok(analysis)
}
