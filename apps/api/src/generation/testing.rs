//! In-memory completion client for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm_client::{Completion, CompletionClient, CompletionOptions, LlmError};

/// Replays a fixed script of responses, one per `complete` call, and records
/// every prompt with its temperature.
pub struct ScriptedClient {
    responses: Mutex<VecDeque<Result<Completion, LlmError>>>,
    calls: Mutex<Vec<(String, f32)>>,
    configured: bool,
    connected: bool,
}

impl ScriptedClient {
    pub fn new(responses: Vec<Result<Completion, LlmError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
            configured: true,
            connected: true,
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::new(Vec::new())
        }
    }

    pub fn disconnected() -> Self {
        Self {
            connected: false,
            ..Self::new(Vec::new())
        }
    }

    pub fn ok(text: &str, input_tokens: u32, output_tokens: u32) -> Result<Completion, LlmError> {
        Ok(Completion {
            text: text.to_string(),
            input_tokens,
            output_tokens,
        })
    }

    pub fn calls(&self) -> Vec<(String, f32)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    fn ensure_configured(&self) -> Result<(), LlmError> {
        if self.configured {
            Ok(())
        } else {
            Err(LlmError::MissingApiKey)
        }
    }

    async fn complete(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<Completion, LlmError> {
        self.ensure_configured()?;
        self.calls
            .lock()
            .unwrap()
            .push((prompt.to_string(), options.temperature));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(LlmError::EmptyContent))
    }

    async fn test_connection(&self) -> bool {
        self.configured && self.connected
    }
}
