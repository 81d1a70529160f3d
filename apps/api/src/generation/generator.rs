//! Title Generation — one description in, one priced title out.
//!
//! Flow: build_prompt → CompletionClient::complete → Pricing::estimate_cost.
//! Shared by the single-title endpoint and the batch orchestrator.

use serde::Serialize;
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::generation::cost::Pricing;
use crate::generation::prompts::build_prompt;
use crate::llm_client::{CompletionClient, CompletionOptions, LlmError};
use crate::models::title::{GenerationRequest, GenerationResult};

pub const MIN_TEMPERATURE: f32 = 0.0;
pub const MAX_TEMPERATURE: f32 = 2.0;
pub const DEFAULT_TEMPERATURE: f32 = 1.0;

/// Result of one generation attempt. A failed call never looks like a title.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TitleOutcome {
    Success(GenerationResult),
    Failure { message: String },
}

/// Rejects temperatures outside `[0, 2]` (including NaN).
pub fn validate_temperature(temperature: f32) -> Result<f32, AppError> {
    if (MIN_TEMPERATURE..=MAX_TEMPERATURE).contains(&temperature) {
        Ok(temperature)
    } else {
        Err(AppError::Validation(format!(
            "temperature must be between {MIN_TEMPERATURE} and {MAX_TEMPERATURE}, got {temperature}"
        )))
    }
}

/// Renders the prompt for `request`, calls the completion client once and prices the result.
pub async fn generate_title(
    llm: &dyn CompletionClient,
    pricing: &Pricing,
    request: &GenerationRequest,
) -> TitleOutcome {
    let prompt = build_prompt(
        request.old_title.as_deref(),
        &request.description,
        &request.examples,
    );

    match llm
        .complete(&prompt, &CompletionOptions::with_temperature(request.temperature))
        .await
    {
        Ok(completion) if completion.text.trim().is_empty() => {
            warn!("Title generation returned an empty title");
            TitleOutcome::Failure {
                message: LlmError::EmptyContent.to_string(),
            }
        }
        Ok(completion) => {
            let cost_usd = pricing.estimate_cost(completion.input_tokens, completion.output_tokens);
            debug!(
                "Generated title ({} chars), cost=${:.6}",
                completion.text.chars().count(),
                cost_usd
            );
            TitleOutcome::Success(GenerationResult {
                title: completion.text,
                input_tokens: completion.input_tokens,
                output_tokens: completion.output_tokens,
                cost_usd,
            })
        }
        Err(e) => {
            warn!("Title generation failed: {e}");
            TitleOutcome::Failure {
                message: e.to_string(),
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
