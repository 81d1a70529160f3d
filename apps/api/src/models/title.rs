use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A worked description → title pair used as a few-shot example.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    pub description: String,
    pub title: String,
}

impl Example {
    pub fn new(description: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            title: title.into(),
        }
    }
}

/// One title generation, built per single-item call or per batch row.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub old_title: Option<String>,
    pub description: String,
    pub examples: Vec<Example>,
    /// 0.0 – 2.0
    pub temperature: f32,
}

/// A generated title with its token accounting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub title: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub cost_usd: f64,
}

/// Raw spreadsheet / JSON row: column name → cell text.
/// Null or empty cells are stored as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchRow {
    cells: HashMap<String, String>,
}

impl BatchRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.cells.insert(column.into(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells.get(column).map(String::as_str)
    }

    /// Builds a row from a JSON object, coercing every value to text.
    pub fn from_json(object: &serde_json::Map<String, serde_json::Value>) -> Self {
        let cells = object
            .iter()
            .map(|(key, value)| (key.clone(), json_cell_to_text(value)))
            .collect();
        Self { cells }
    }
}

impl<K, V> FromIterator<(K, V)> for BatchRow
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            cells: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

fn json_cell_to_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
