//! Workbook I/O — reads uploaded `.xlsx`/`.xls` sheets into generic rows and
//! writes the generated-titles workbook.
//!
//! Only the first sheet of an upload is read. Its first row is the header;
//! every later row becomes a `BatchRow` keyed by header text, with empty cells
//! stored as empty strings.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use thiserror::Error;

use crate::generation::batch::BatchSummary;
use crate::generation::normalizer::{normalize, RowOutcome};
use crate::generation::prompts::MAX_CUSTOM_EXAMPLES;
use crate::models::title::{BatchRow, Example};

pub const RESULTS_SHEET: &str = "Generated Titles";
pub const RESULTS_FILE_NAME: &str = "results.xlsx";
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Export header, in column order.
pub const RESULT_COLUMNS: [&str; 6] = [
    "Original Title",
    "Description",
    "Generated Title",
    "Cost (USD)",
    "Input Tokens",
    "Output Tokens",
];

#[derive(Debug, Error)]
pub enum WorkbookError {
    #[error("Unreadable workbook: {0}")]
    Read(#[from] calamine::Error),

    #[error("Workbook contains no sheets")]
    NoSheets,

    #[error("Failed to write workbook: {0}")]
    Write(#[from] XlsxError),
}

/// Reads the first sheet of `bytes` into rows.
pub fn read_rows(bytes: &[u8]) -> Result<Vec<BatchRow>, WorkbookError> {
    let range = first_sheet(bytes)?;
    Ok(rows_from_range(&range))
}

/// Reads few-shot examples from the first sheet, using the same column
/// fallbacks as batch rows. Rows without a description are ignored and at
/// most `MAX_CUSTOM_EXAMPLES` are kept, in sheet order.
pub fn read_examples(bytes: &[u8]) -> Result<Vec<Example>, WorkbookError> {
    let examples = read_rows(bytes)?
        .iter()
        .filter_map(|row| match normalize(row) {
            RowOutcome::Fields {
                old_title,
                description,
            } => Some(Example::new(description, old_title)),
            RowOutcome::Skip => None,
        })
        .take(MAX_CUSTOM_EXAMPLES)
        .collect();
    Ok(examples)
}

/// Serializes batch results into a single-sheet `.xlsx` workbook.
pub fn write_results(summary: &BatchSummary) -> Result<Vec<u8>, WorkbookError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(RESULTS_SHEET)?;

    for (col, name) in RESULT_COLUMNS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *name, &header_format)?;
    }

    for (index, result) in summary.results.iter().enumerate() {
        let row = index as u32 + 1;
        worksheet.write_string(row, 0, &result.old_title)?;
        worksheet.write_string(row, 1, &result.description)?;
        worksheet.write_string(row, 2, &result.generated_title)?;
        worksheet.write_number(row, 3, result.cost_usd)?;
        worksheet.write_number(row, 4, result.input_tokens)?;
        worksheet.write_number(row, 5, result.output_tokens)?;
    }

    Ok(workbook.save_to_buffer()?)
}

fn first_sheet(bytes: &[u8]) -> Result<Range<Data>, WorkbookError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(WorkbookError::NoSheets)??;
    Ok(range)
}

fn rows_from_range(range: &Range<Data>) -> Vec<BatchRow> {
    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Vec::new();
    };
    let header: Vec<String> = header.iter().map(cell_to_text).collect();

    rows.map(|cells| {
        let mut row = BatchRow::new();
        for (name, cell) in header.iter().zip(cells) {
            // Unnamed columns are dropped; duplicate names keep the leftmost.
            if name.is_empty() || row.get(name).is_some() {
                continue;
            }
            row.insert(name.clone(), cell_to_text(cell));
        }
        row
    })
    .collect()
}

fn cell_to_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => format_float(*f),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => format_float(dt.as_f64()),
    }
}

/// Whole numbers render without a trailing `.0` (spreadsheet apps store all
/// numbers as floats).
fn format_float(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
