//! Axum route handlers for the Title Generation API.

use axum::{
    extract::{multipart::MultipartError, Multipart, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::batch::{run_batch, BatchOptions, BatchStats, BatchSummary};
use crate::generation::generator::{
    generate_title, validate_temperature, TitleOutcome, DEFAULT_TEMPERATURE,
};
use crate::models::title::{BatchRow, Example, GenerationRequest, GenerationResult};
use crate::state::AppState;
use crate::workbook::{
    read_examples, read_rows, write_results, RESULTS_FILE_NAME, XLSX_CONTENT_TYPE,
};

/// Marketplace hard limit on title length, in characters.
const TITLE_CHAR_LIMIT: usize = 200;
/// Leading characters shown in search results; critical keywords belong here.
const KEYWORD_WINDOW_CHARS: usize = 80;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GenerateTitleRequest {
    #[serde(default)]
    pub old_title: Option<String>,
    pub description: String,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub examples: Vec<Example>,
}

#[derive(Debug, Serialize)]
pub struct GenerateTitleResponse {
    #[serde(flatten)]
    pub result: GenerationResult,
    pub title_length: usize,
    pub within_length_limit: bool,
    /// The first 80 characters of the title.
    pub keyword_window: String,
    pub keyword_window_length: usize,
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub rows: Vec<Map<String, Value>>,
    #[serde(default)]
    pub examples: Vec<Example>,
    #[serde(default)]
    pub temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub batch_id: Uuid,
    pub completed_at: DateTime<Utc>,
    pub stats: BatchStats,
    pub summary: BatchSummary,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Xlsx,
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    #[serde(default)]
    pub format: ExportFormat,
}

#[derive(Debug, Serialize)]
pub struct ConnectionResponse {
    pub connected: bool,
    pub model: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/titles
pub async fn handle_generate_title(
    State(state): State<AppState>,
    Json(req): Json<GenerateTitleRequest>,
) -> Result<Json<GenerateTitleResponse>, AppError> {
    if req.description.trim().is_empty() {
        return Err(AppError::Validation(
            "Please enter a product description".to_string(),
        ));
    }
    let temperature = validate_temperature(req.temperature.unwrap_or(DEFAULT_TEMPERATURE))?;
    state.llm.ensure_configured()?;

    let request = GenerationRequest {
        old_title: req.old_title,
        description: req.description,
        examples: req.examples,
        temperature,
    };

    match generate_title(state.llm.as_ref(), &state.pricing, &request).await {
        TitleOutcome::Success(result) => {
            let title_length = result.title.chars().count();
            let keyword_window: String = result.title.chars().take(KEYWORD_WINDOW_CHARS).collect();
            let keyword_window_length = keyword_window.chars().count();
            Ok(Json(GenerateTitleResponse {
                result,
                title_length,
                within_length_limit: title_length <= TITLE_CHAR_LIMIT,
                keyword_window,
                keyword_window_length,
            }))
        }
        TitleOutcome::Failure { message } => Err(AppError::Llm(message)),
    }
}

/// POST /api/v1/titles/batch
pub async fn handle_batch(
    State(state): State<AppState>,
    Json(req): Json<BatchRequest>,
) -> Result<Json<BatchResponse>, AppError> {
    let temperature = validate_temperature(req.temperature.unwrap_or(DEFAULT_TEMPERATURE))?;
    let rows: Vec<BatchRow> = req.rows.iter().map(BatchRow::from_json).collect();
    let response = process_batch(&state, &rows, &req.examples, temperature).await?;
    Ok(Json(response))
}

/// POST /api/v1/titles/batch/upload?format=json|xlsx
///
/// Multipart fields: `file` (rows workbook, required), `examples` (workbook,
/// optional), `temperature` (optional).
pub async fn handle_batch_upload(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let mut rows_file: Option<Bytes> = None;
    let mut examples_file: Option<Bytes> = None;
    let mut temperature = DEFAULT_TEMPERATURE;
    let upload_limit = state.config.max_upload_bytes;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Failed to parse multipart data", e, upload_limit))?
    {
        let field_name = field.name().unwrap_or("").to_string();
        match field_name.as_str() {
            "file" => rows_file = Some(read_field(field, upload_limit).await?),
            "examples" => examples_file = Some(read_field(field, upload_limit).await?),
            "temperature" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| multipart_error("Failed to read temperature", e, upload_limit))?;
                temperature = text.trim().parse::<f32>().map_err(|_| {
                    AppError::Validation(format!("temperature must be a number, got '{text}'"))
                })?;
            }
            other => debug!("Ignoring unknown multipart field '{other}'"),
        }
    }

    let temperature = validate_temperature(temperature)?;
    let rows_file = rows_file
        .ok_or_else(|| AppError::Validation("Missing multipart field 'file'".to_string()))?;

    let rows = read_rows(&rows_file)?;
    info!("Rows workbook parsed: {} rows", rows.len());
    let examples = match examples_file {
        Some(bytes) => {
            let examples = read_examples(&bytes)?;
            info!("Examples workbook parsed: {} examples", examples.len());
            examples
        }
        None => Vec::new(),
    };

    let response = process_batch(&state, &rows, &examples, temperature).await?;

    match query.format {
        ExportFormat::Json => Ok(Json(response).into_response()),
        ExportFormat::Xlsx => {
            let workbook = write_results(&response.summary)?;
            Ok((
                [
                    (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{RESULTS_FILE_NAME}\""),
                    ),
                ],
                workbook,
            )
                .into_response())
        }
    }
}

/// GET /api/v1/connection
pub async fn handle_connection_check(
    State(state): State<AppState>,
) -> Result<Json<ConnectionResponse>, AppError> {
    state.llm.ensure_configured()?;
    let connected = state.llm.test_connection().await;
    Ok(Json(ConnectionResponse {
        connected,
        model: state.config.openai_model.clone(),
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

async fn read_field(
    field: axum::extract::multipart::Field<'_>,
    upload_limit: usize,
) -> Result<Bytes, AppError> {
    let name = field.name().unwrap_or("").to_string();
    field
        .bytes()
        .await
        .map_err(|e| multipart_error(&format!("Failed to read field '{name}'"), e, upload_limit))
}

/// Body-limit overruns surface as 413 with the configured cap; anything else
/// is a malformed request.
fn multipart_error(context: &str, error: MultipartError, upload_limit: usize) -> AppError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!(
            "Upload exceeds the maximum size of {upload_limit} bytes"
        ))
    } else {
        AppError::Validation(format!("{context}: {error}"))
    }
}

async fn process_batch(
    state: &AppState,
    rows: &[BatchRow],
    examples: &[Example],
    temperature: f32,
) -> Result<BatchResponse, AppError> {
    let batch_id = Uuid::new_v4();
    let options = BatchOptions {
        temperature,
        row_delay: state.config.batch_row_delay,
    };

    info!(%batch_id, rows = rows.len(), "Batch accepted");
    let summary = run_batch(
        state.llm.as_ref(),
        &state.pricing,
        rows,
        examples,
        &options,
        move |progress| {
            debug!(
                %batch_id,
                processed = progress.processed,
                total = progress.total,
                "Batch progress {:.0}%",
                progress.fraction() * 100.0
            );
        },
    )
    .await?;

    Ok(BatchResponse {
        batch_id,
        completed_at: Utc::now(),
        stats: summary.stats(),
        summary,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
