// Shared prompt fragments. Each service that calls the model keeps its own
// templates alongside it; this file holds the cross-cutting pieces.

/// System prompt that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Appended to every prompt that edits a candidate's resume.
pub const FACTUALITY_INSTRUCTION: &str = "\
    CRITICAL: Keep all factual information accurate. Do NOT fabricate employers, \
    titles, dates, degrees, certifications or metrics that are not present in the \
    original resume.";

/// Reachability check sent by `GET /health/model`.
pub const PING_PROMPT: &str = "Say 'API is working' if you can read this.";
pub const PING_REPLY: &str = "API is working";
pub const PING_SYSTEM: &str = "Reply with the requested phrase only.";
