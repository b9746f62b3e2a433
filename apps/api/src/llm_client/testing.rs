//! Test doubles for `TextModel`.

use std::sync::Mutex;

use async_trait::async_trait;

use super::{LlmError, TextModel};

/// Returns a fixed reply (or error factory) and records every prompt it sees.
pub struct StubModel {
    reply: Result<String, fn() -> LlmError>,
    prompts: Mutex<Vec<String>>,
}

impl StubModel {
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: Ok(reply.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: fn() -> LlmError) -> Self {
        Self {
            reply: Err(error),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextModel for StubModel {
    async fn complete(&self, prompt: &str, _system: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(make_error) => Err(make_error()),
        }
    }
}
