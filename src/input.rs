//! Loading raw records from scraper output files.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::listing::{RawRecord, RawValue};

/// Supported input formats, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Json,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("csv") => Ok(InputFormat::Csv),
            Some("json") => Ok(InputFormat::Json),
            _ => anyhow::bail!(
                "Unsupported input file {} (expected .csv or .json)",
                path.display()
            ),
        }
    }
}

/// Parse CSV text. The header row names the fields; every cell is text.
pub fn parse_csv(content: &str) -> Result<Vec<RawRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(content.as_bytes());
    let headers = reader
        .headers()
        .context("Failed to read CSV header row")?
        .clone();

    let mut records = Vec::new();
    for (line, result) in reader.records().enumerate() {
        let row = result.with_context(|| format!("Malformed CSV row {}", line + 2))?;
        let record = headers
            .iter()
            .zip(row.iter())
            .map(|(key, cell)| (key.to_string(), RawValue::Text(cell.to_string())))
            .collect();
        records.push(record);
    }
    Ok(records)
}

/// Parse a JSON array of objects.
///
/// Only the top-level shape can fail the file. An element that is not an
/// object becomes an empty record, which the normalizer rejects on its own.
pub fn parse_json(content: &str) -> Result<Vec<RawRecord>> {
    let values: Vec<serde_json::Value> =
        serde_json::from_str(content).context("Expected a JSON array of objects")?;

    let records = values
        .into_iter()
        .enumerate()
        .map(|(index, value)| match value {
            serde_json::Value::Object(fields) => fields
                .into_iter()
                .map(|(key, value)| (key, RawValue::from(value)))
                .collect(),
            _ => {
                tracing::warn!(index, "JSON element is not an object");
                RawRecord::new()
            }
        })
        .collect();
    Ok(records)
}

/// Load every record from one file.
pub fn load_file(path: &Path) -> Result<Vec<RawRecord>> {
    let format = InputFormat::from_path(path)?;
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file {}", path.display()))?;

    let records = match format {
        InputFormat::Csv => parse_csv(&content),
        InputFormat::Json => parse_json(&content),
    }
    .with_context(|| format!("Failed to parse {}", path.display()))?;

    tracing::debug!(path = %path.display(), records = records.len(), "loaded input file");
    Ok(records)
}

/// Expand glob patterns into a sorted, de-duplicated list of files.
///
/// A pattern that is a plain path is kept as-is so a missing file surfaces as
/// a read error rather than silently matching nothing.
pub fn expand_inputs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for pattern in patterns {
        let is_glob = pattern.contains(&['*', '?', '['][..]);
        if !is_glob {
            paths.push(PathBuf::from(pattern));
            continue;
        }

        let matches = glob::glob(pattern)
            .with_context(|| format!("Invalid glob pattern '{}'", pattern))?;
        let before = paths.len();
        for entry in matches {
            paths.push(entry.with_context(|| format!("Failed to read match for '{}'", pattern))?);
        }
        if paths.len() == before {
            anyhow::bail!("No input files match '{}'", pattern);
        }
    }
    paths.sort();
    paths.dedup();
    Ok(paths)
}

/// Expand `patterns` and concatenate the records of every file in path order.
pub fn load_inputs(patterns: &[String]) -> Result<Vec<RawRecord>> {
    let mut records = Vec::new();
    for path in expand_inputs(patterns)? {
        records.extend(load_file(&path)?);
    }
    Ok(records)
}
