//! Row Normalizer — resolves heterogeneous spreadsheet columns onto
//! `(old_title, description)`.
//!
//! Each logical field has an ordered list of candidate column names. The first
//! candidate present in the row wins, even when its cell is empty.

use crate::models::title::BatchRow;

/// Title columns in priority order. `"Title "` (trailing space) appears in
/// exported marketplace sheets.
pub const TITLE_COLUMNS: [&str; 3] = ["Title ", "Title", "title"];

/// Description columns in priority order.
pub const DESCRIPTION_COLUMNS: [&str; 3] = ["Bullet Points", "bullet_points", "Description"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Fields {
        old_title: String,
        description: String,
    },
    /// No usable description; the row is excluded.
    Skip,
}

/// Maps a raw row onto its canonical fields.
pub fn normalize(row: &BatchRow) -> RowOutcome {
    let old_title = first_present(row, &TITLE_COLUMNS).unwrap_or_default();

    match first_present(row, &DESCRIPTION_COLUMNS) {
        Some(description) if !description.trim().is_empty() => RowOutcome::Fields {
            old_title: old_title.to_string(),
            description: description.to_string(),
        },
        _ => RowOutcome::Skip,
    }
}

fn first_present<'a>(row: &'a BatchRow, candidates: &[&str]) -> Option<&'a str> {
    candidates.iter().find_map(|column| row.get(column))
}
