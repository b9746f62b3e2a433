// All LLM prompt constants for the Analysis module.
// Placeholders are `{name}` and are filled by `prompt_builder::fill_template`.

/// System prompt for resume analysis; enforces JSON-only output.
pub const ANALYSIS_SYSTEM: &str = "You are an expert recruiter and resume strategist. \
    You compare a resume against a job description and rewrite the resume for the role. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Resume analysis prompt.
/// Replace: {factuality_instruction}, {resume_text}, {job_text}
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"Analyze the resume below against the job description and produce a tailored version of the resume.

{factuality_instruction}

Return a JSON object with this EXACT schema (no extra fields):
{
  "score": 82,
  "matched": ["python", "sql"],
  "missing": ["aws"],
  "tailored": "The complete tailored resume as plain text"
}

Rules:
- "score" is an integer from 0 to 100 estimating overall fit for the role.
- "matched" lists skills and keywords from the job description that the resume demonstrates. Consider synonyms and related terms.
- "missing" lists important skills and keywords from the job description that the resume does NOT demonstrate.
- "tailored" is the full resume rewritten for this role: reorder sections so the most relevant experience comes first, use the job's terminology where the resume supports it, prefer action verbs and quantified achievements, keep a professional plain-text layout.

RESUME:
{resume_text}

JOB DESCRIPTION:
{job_text}"#;

/// Job description analysis prompt. Replace `{job_text}` before sending.
pub const JOB_ANALYSIS_PROMPT_TEMPLATE: &str = r#"Analyze the following job description and extract key information.

Return a JSON object with this EXACT schema:
{
  "technical_skills": ["list of technical skills required"],
  "soft_skills": ["list of soft skills required"],
  "experience_level": "entry/mid/senior level description",
  "education": "education requirements",
  "key_responsibilities": ["main job responsibilities"],
  "required_qualifications": ["must-have qualifications"],
  "preferred_qualifications": ["nice-to-have qualifications"],
  "company_culture": "description of company culture/values",
  "key_skills": ["combined list of all important keywords and skills"]
}

Focus on specific, actionable keywords that would appear in a resume. Be comprehensive but precise.

JOB DESCRIPTION:
{job_text}"#;

/// System prompt for improvement suggestions. Output is a plain bullet list.
pub const SUGGESTIONS_SYSTEM: &str = "You are an expert career coach. \
    Respond with a plain bullet list, one suggestion per line, each line starting with '- '. \
    Do NOT include headings or closing remarks.";

/// Suggestions prompt. Replace `{analysis_json}` before sending.
pub const SUGGESTIONS_PROMPT_TEMPLATE: &str = r#"Based on the resume analysis results below, give specific, actionable suggestions for improving the resume to better match the job.

Analysis results:
{analysis_json}

Format each suggestion as:
- [High Priority] Specific action to take
- [Medium Priority] Another specific action
- [Low Priority] Additional improvement

Focus on missing keywords to incorporate, skills to emphasize, experience to reframe, and achievements to highlight. Avoid generic advice."#;

/// Keyword extraction prompt. Replace `{context}` and `{text}` before sending.
pub const KEYWORD_EXTRACTION_PROMPT_TEMPLATE: &str = r#"Extract the most important keywords and phrases from the following text in the context of {context}.

Text:
{text}

Extract keywords that would be relevant for:
- Skills and technologies
- Job titles and roles
- Industry terminology
- Qualifications and certifications
- Action verbs and achievements

Return as a simple list, one keyword per line, starting with a dash (-)."#;
