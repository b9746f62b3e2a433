//! Resume vs. job description analysis.

pub mod handlers;
pub mod job_analysis;
pub mod keywords;
pub mod pipeline;
pub mod prompt_builder;
pub mod prompts;
pub mod result_parser;
pub mod suggestions;
