use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info, warn};

use super::error::{RecordError, RecordResult};
use super::types::CandidateRecord;
use crate::export::csv::parse_rows;

/// Loads candidate records from `.csv`, `.json` (array) or `.jsonl`.
pub fn load_candidates(path: &Path) -> RecordResult<Vec<CandidateRecord>> {
    let text = std::fs::read_to_string(path).map_err(|source| RecordError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let records = match extension.as_deref() {
        Some("csv") => parse_candidates_csv(path, &text)?,
        Some("json") => serde_json::from_str(&text).map_err(|source| RecordError::Json {
            path: path.to_path_buf(),
            source,
        })?,
        Some("jsonl") | Some("ndjson") => parse_candidates_jsonl(path, &text)?,
        _ => {
            return Err(RecordError::UnsupportedFormat {
                path: path.to_path_buf(),
            });
        }
    };

    info!(path = %path.display(), count = records.len(), "Loaded candidate records");
    Ok(records)
}

fn parse_candidates_jsonl(path: &Path, text: &str) -> RecordResult<Vec<CandidateRecord>> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            serde_json::from_str(line).map_err(|source| RecordError::Json {
                path: path.to_path_buf(),
                source,
            })
        })
        .collect()
}

/// Parses a header-led CSV. Unknown columns are ignored, missing optional
/// columns become `None`, and blank cells are treated as missing.
pub fn parse_candidates_csv(path: &Path, text: &str) -> RecordResult<Vec<CandidateRecord>> {
    let rows = parse_rows(text).map_err(|e| RecordError::Csv {
        path: path.to_path_buf(),
        line: e.line,
        reason: e.reason,
    })?;

    let mut rows = rows.into_iter();
    let Some(header) = rows.next() else {
        return Ok(Vec::new());
    };

    let columns: HashMap<String, usize> = header
        .iter()
        .enumerate()
        .map(|(i, name)| (name.trim().trim_start_matches('\u{feff}').to_lowercase(), i))
        .collect();

    let Some(&title_idx) = columns.get("title") else {
        return Err(RecordError::MissingTitleColumn {
            path: path.to_path_buf(),
        });
    };

    let cell = |row: &[String], name: &str| -> Option<String> {
        columns
            .get(name)
            .and_then(|&i| row.get(i))
            .map(|v| v.trim())
            .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("nan"))
            .map(str::to_string)
    };

    let mut records = Vec::new();
    for (offset, row) in rows.enumerate() {
        if row.len() != header.len() {
            debug!(
                row = offset + 2,
                expected = header.len(),
                actual = row.len(),
                "CSV row width differs from header"
            );
        }

        let title = row.get(title_idx).map(|t| t.trim().to_string()).unwrap_or_default();
        let year = cell(&row, "year").and_then(|raw| parse_year(&raw));

        records.push(CandidateRecord {
            title,
            abstract_text: cell(&row, "abstract"),
            authors: cell(&row, "authors"),
            year,
            doi: cell(&row, "doi"),
            arxiv_id: cell(&row, "arxiv_id"),
            source: cell(&row, "source"),
        });
    }

    Ok(records)
}

/// Accepts `2021` as well as spreadsheet-style `2021.0`.
fn parse_year(raw: &str) -> Option<i32> {
    raw.parse::<i32>().ok().or_else(|| {
        let parsed = raw.parse::<f64>().ok().filter(|v| v.is_finite()).map(|v| v as i32);
        if parsed.is_none() {
            warn!(value = raw, "Ignoring unparseable year");
        }
        parsed
    })
}
