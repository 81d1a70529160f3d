//! Batch Orchestrator — sequential title generation over spreadsheet rows.
//!
//! Flow per row: normalize → build_prompt → complete → estimate_cost.
//! Rows are processed strictly one after another. Skipped and failed rows are
//! recorded with their 1-based row number and never abort the batch.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::generation::cost::Pricing;
use crate::generation::generator::{generate_title, TitleOutcome, DEFAULT_TEMPERATURE};
use crate::generation::normalizer::{normalize, RowOutcome};
use crate::generation::prompts::MAX_CUSTOM_EXAMPLES;
use crate::llm_client::CompletionClient;
use crate::models::title::{BatchRow, Example, GenerationRequest};

/// Fixed pause between remote calls to stay under provider rate limits.
pub const DEFAULT_ROW_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy)]
pub struct BatchOptions {
    pub temperature: f32,
    pub row_delay: Duration,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            row_delay: DEFAULT_ROW_DELAY,
        }
    }
}

/// Observational progress, reported after every row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchProgress {
    pub processed: usize,
    pub total: usize,
}

impl BatchProgress {
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.processed as f64 / self.total as f64
        }
    }
}

/// One successfully generated row, in export column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchResultRow {
    /// 1-based input row number.
    pub row: usize,
    pub old_title: String,
    pub description: String,
    pub generated_title: String,
    pub cost_usd: f64,
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// A skipped or failed row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowIssue {
    pub row: usize,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchSummary {
    pub results: Vec<BatchResultRow>,
    pub warnings: Vec<RowIssue>,
    pub errors: Vec<RowIssue>,
    pub rows_processed: usize,
    pub total_cost_usd: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BatchStats {
    pub total_cost_usd: f64,
    pub success_count: usize,
    pub warning_count: usize,
    pub error_count: usize,
    /// 0.0 when nothing succeeded.
    pub average_cost_usd: f64,
}

impl BatchSummary {
    pub fn stats(&self) -> BatchStats {
        let success_count = self.results.len();
        let average_cost_usd = if success_count == 0 {
            0.0
        } else {
            self.total_cost_usd / success_count as f64
        };
        BatchStats {
            total_cost_usd: self.total_cost_usd,
            success_count,
            warning_count: self.warnings.len(),
            error_count: self.errors.len(),
            average_cost_usd,
        }
    }
}

/// Runs title generation over `rows` in order.
///
/// `examples` are fixed for the whole batch. Fails only when the completion
/// client has no credential, before any remote call is made.
pub async fn run_batch<F>(
    llm: &dyn CompletionClient,
    pricing: &Pricing,
    rows: &[BatchRow],
    examples: &[Example],
    options: &BatchOptions,
    mut on_progress: F,
) -> Result<BatchSummary, AppError>
where
    F: FnMut(BatchProgress) + Send,
{
    llm.ensure_configured()?;

    let total = rows.len();
    let examples: Vec<Example> = examples.iter().take(MAX_CUSTOM_EXAMPLES).cloned().collect();
    let mut summary = BatchSummary::default();

    info!(
        "Starting batch: {} rows, {} custom examples, temperature={}",
        total,
        examples.len(),
        options.temperature
    );

    for (index, raw) in rows.iter().enumerate() {
        let row = index + 1;

        match normalize(raw) {
            RowOutcome::Skip => {
                warn!("Row {row}: No description found");
                summary.warnings.push(RowIssue {
                    row,
                    message: format!("Row {row}: No description found"),
                });
            }
            RowOutcome::Fields {
                old_title,
                description,
            } => {
                let request = GenerationRequest {
                    old_title: Some(old_title),
                    description,
                    examples: examples.clone(),
                    temperature: options.temperature,
                };

                match generate_title(llm, pricing, &request).await {
                    TitleOutcome::Success(result) => {
                        summary.total_cost_usd += result.cost_usd;
                        summary.results.push(BatchResultRow {
                            row,
                            old_title: request.old_title.unwrap_or_default(),
                            description: request.description,
                            generated_title: result.title,
                            cost_usd: result.cost_usd,
                            input_tokens: result.input_tokens,
                            output_tokens: result.output_tokens,
                        });
                    }
                    TitleOutcome::Failure { message } => {
                        warn!("Row {row}: Failed to generate title: {message}");
                        summary.errors.push(RowIssue {
                            row,
                            message: format!("Row {row}: Failed to generate title: {message}"),
                        });
                    }
                }

                if row < total && !options.row_delay.is_zero() {
                    tokio::time::sleep(options.row_delay).await;
                }
            }
        }

        summary.rows_processed = row;
        let progress = BatchProgress {
            processed: row,
            total,
        };
        debug!("Batch progress: {}/{}", progress.processed, progress.total);
        on_progress(progress);
    }

    let stats = summary.stats();
    info!(
        "Batch complete: {} succeeded, {} skipped, {} failed, total cost ${:.6}",
        stats.success_count, stats.warning_count, stats.error_count, stats.total_cost_usd
    );

    Ok(summary)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::testing::ScriptedClient;
    use crate::llm_client::LlmError;

    fn row(title: &str, bullets: &str) -> BatchRow {
        [("Title ", title), ("Bullet Points", bullets)].into_iter().collect()
    }

    fn no_delay() -> BatchOptions {
        BatchOptions {
            row_delay: Duration::ZERO,
            ..BatchOptions::default()
        }
    }

    #[tokio::test]
    async fn test_blank_row_is_skipped_and_not_billed() {
        let client = ScriptedClient::new(vec![
            ScriptedClient::ok("Title One", 50, 20),
            ScriptedClient::ok("Title Three", 60, 25),
        ]);
        let rows = vec![row("a", "first"), row("b", "   "), row("c", "third")];

        let summary = run_batch(&client, &Pricing::GPT_4O_MINI, &rows, &[], &no_delay(), |_| {})
            .await
            .unwrap();

        assert_eq!(summary.results.len(), 2);
        assert_eq!(summary.results[0].row, 1);
        assert_eq!(summary.results[1].row, 3);
        assert_eq!(summary.results[1].generated_title, "Title Three");
        assert_eq!(
            summary.warnings,
            vec![RowIssue {
                row: 2,
                message: "Row 2: No description found".to_string()
            }]
        );
        assert!(summary.errors.is_empty());

        let expected = Pricing::GPT_4O_MINI.estimate_cost(50, 20)
            + Pricing::GPT_4O_MINI.estimate_cost(60, 25);
        assert!((summary.total_cost_usd - expected).abs() < 1e-15);
        let formula = (50.0 + 60.0) / 1e6 * 0.06 + (20.0 + 25.0) / 1e6 * 2.40;
        assert!((summary.total_cost_usd - formula).abs() < 1e-15);
        assert_eq!(client.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_remote_failure_does_not_abort_batch() {
        let client = ScriptedClient::new(vec![
            ScriptedClient::ok("Title One", 50, 20),
            Err(LlmError::Api {
                status: 429,
                message: "quota exceeded".to_string(),
            }),
            ScriptedClient::ok("Title Three", 60, 25),
        ]);
        let rows = vec![row("a", "first"), row("b", "second"), row("c", "third")];

        let summary = run_batch(&client, &Pricing::GPT_4O_MINI, &rows, &[], &no_delay(), |_| {})
            .await
            .unwrap();

        assert_eq!(summary.results.len(), 2);
        assert_eq!(summary.errors.len(), 1);
        assert_eq!(summary.errors[0].row, 2);
        assert!(summary.errors[0].message.starts_with("Row 2: Failed to generate title:"));
        assert!(summary.errors[0].message.contains("quota exceeded"));
        assert_eq!(summary.rows_processed, 3);
        assert_eq!(summary.stats().success_count, 2);
    }

    #[tokio::test]
    async fn test_empty_title_is_recorded_as_error_and_not_billed() {
        let client = ScriptedClient::new(vec![ScriptedClient::ok("", 50, 0)]);
        let rows = vec![row("a", "first")];

        let summary = run_batch(&client, &Pricing::GPT_4O_MINI, &rows, &[], &no_delay(), |_| {})
            .await
            .unwrap();

        assert!(summary.results.is_empty());
        assert_eq!(summary.errors.len(), 1);
        assert_eq!(summary.errors[0].row, 1);
        assert!(summary.errors[0].message.contains("empty content"));
        assert_eq!(summary.total_cost_usd, 0.0);
    }

    #[tokio::test]
    async fn test_missing_credential_fails_before_any_call() {
        let client = ScriptedClient::unconfigured();
        let rows = vec![row("a", "first")];

        let result =
            run_batch(&client, &Pricing::GPT_4O_MINI, &rows, &[], &no_delay(), |_| {}).await;

        assert!(matches!(result, Err(AppError::Configuration(_))));
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_progress_reported_for_every_row() {
        let client = ScriptedClient::new(vec![ScriptedClient::ok("T", 1, 1)]);
        let rows = vec![row("a", ""), row("b", "second")];
        let mut seen = Vec::new();

        run_batch(&client, &Pricing::GPT_4O_MINI, &rows, &[], &no_delay(), |p| {
            seen.push(p.fraction())
        })
        .await
        .unwrap();

        assert_eq!(seen, vec![0.5, 1.0]);
    }

    #[tokio::test]
    async fn test_examples_fixed_and_truncated_for_whole_batch() {
        let client = ScriptedClient::new(vec![
            ScriptedClient::ok("T1", 1, 1),
            ScriptedClient::ok("T2", 1, 1),
        ]);
        let examples: Vec<Example> = (1..=7)
            .map(|i| Example::new(format!("example desc {i}"), format!("Example Title {i}")))
            .collect();
        let rows = vec![row("a", "first"), row("b", "second")];

        run_batch(&client, &Pricing::GPT_4O_MINI, &rows, &examples, &no_delay(), |_| {})
            .await
            .unwrap();

        for (prompt, _) in client.calls() {
            assert!(prompt.contains("Example 10:\nDescription: example desc 5"));
            assert!(!prompt.contains("example desc 6"));
        }
    }

    #[tokio::test]
    async fn test_temperature_passed_through() {
        let client = ScriptedClient::new(vec![ScriptedClient::ok("T", 1, 1)]);
        let options = BatchOptions {
            temperature: 0.2,
            row_delay: Duration::ZERO,
        };

        run_batch(&client, &Pricing::GPT_4O_MINI, &[row("a", "x")], &[], &options, |_| {})
            .await
            .unwrap();

        assert_eq!(client.calls()[0].1, 0.2);
    }

    #[tokio::test]
    async fn test_empty_batch_has_zero_average() {
        let client = ScriptedClient::new(vec![]);
        let summary = run_batch(&client, &Pricing::GPT_4O_MINI, &[], &[], &no_delay(), |_| {})
            .await
            .unwrap();

        let stats = summary.stats();
        assert_eq!(stats.success_count, 0);
        assert_eq!(stats.average_cost_usd, 0.0);
        assert_eq!(stats.total_cost_usd, 0.0);
    }

    #[tokio::test]
    async fn test_average_cost_per_success() {
        let client = ScriptedClient::new(vec![
            ScriptedClient::ok("T1", 1_000_000, 0),
            ScriptedClient::ok("T2", 3_000_000, 0),
        ]);
        let rows = vec![row("a", "first"), row("b", "second")];

        let summary = run_batch(&client, &Pricing::GPT_4O_MINI, &rows, &[], &no_delay(), |_| {})
            .await
            .unwrap();

        assert!((summary.stats().average_cost_usd - 0.12).abs() < 1e-12);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fixed_delay_between_remote_calls() {
        let client = ScriptedClient::new(vec![
            ScriptedClient::ok("T1", 1, 1),
            ScriptedClient::ok("T2", 1, 1),
            ScriptedClient::ok("T3", 1, 1),
        ]);
        let rows = vec![row("a", "1"), row("b", "2"), row("c", "3")];
        let started = tokio::time::Instant::now();

        run_batch(
            &client,
            &Pricing::GPT_4O_MINI,
            &rows,
            &[],
            &BatchOptions::default(),
            |_| {},
        )
        .await
        .unwrap();

        let elapsed = started.elapsed();
        assert!(elapsed >= DEFAULT_ROW_DELAY * 2);
        assert!(elapsed < DEFAULT_ROW_DELAY * 3);
    }
}
