// 📂 CSV Import - Uploaded files -> loose records
// Numeric cells become JSON numbers so scoring can read them directly

use crate::records::Record;
use anyhow::{Context, Result};
use csv::{ReaderBuilder, Trim};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::fs;
use std::path::Path;
use tracing::warn;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedCsv {
    pub headers: Vec<String>,
    pub rows: Vec<Record>,
    pub errors: Vec<String>,
}

/// Typed cell value: finite numbers become JSON numbers, everything else stays text
fn cell_value(raw: &str) -> Value {
    if raw.is_empty() {
        return Value::String(String::new());
    }

    let lowered = raw.to_ascii_lowercase();
    if lowered.contains("inf") || lowered.contains("nan") {
        return Value::String(raw.to_string());
    }

    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => {
            if v.fract() == 0.0 && v.abs() < 9.0e15 {
                Value::Number(Number::from(v as i64))
            } else {
                Number::from_f64(v)
                    .map(Value::Number)
                    .unwrap_or_else(|| Value::String(raw.to_string()))
            }
        }
        _ => Value::String(raw.to_string()),
    }
}

/// Parse CSV text with a header row.
/// Rows without an `id` column value get `row-{n}`, n being the data line index.
pub fn parse_csv(content: &str) -> ParsedCsv {
    let content = content.trim();
    if content.is_empty() {
        return ParsedCsv {
            errors: vec!["Empty file".to_string()],
            ..ParsedCsv::default()
        };
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = match reader.headers() {
        Ok(h) => h.iter().map(|s| s.to_string()).collect(),
        Err(e) => {
            return ParsedCsv {
                errors: vec![format!("Error parsing header: {}", e)],
                ..ParsedCsv::default()
            }
        }
    };

    let mut rows = Vec::new();
    let mut errors = Vec::new();

    for (index, result) in reader.records().enumerate() {
        match result {
            Ok(record) => {
                let line = record
                    .position()
                    .map(|p| p.line() as usize)
                    .unwrap_or(index + 2);

                let mut row = Record::new();
                for (i, header) in headers.iter().enumerate() {
                    row.insert(header, cell_value(record.get(i).unwrap_or("")));
                }
                if row.id().is_none() {
                    row.insert("id", format!("row-{}", line - 1));
                }
                rows.push(row);
            }
            Err(e) => {
                let line = e
                    .position()
                    .map(|p| p.line() as usize)
                    .unwrap_or(index + 2);
                warn!(line, error = %e, "skipping malformed CSV line");
                errors.push(format!("Error parsing line {}", line));
            }
        }
    }

    ParsedCsv { headers, rows, errors }
}

pub fn load_csv(path: &Path) -> Result<ParsedCsv> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read CSV file: {:?}", path))?;
    Ok(parse_csv(&content))
}
