//! Workbook loader for Tabstore
//!
//! Turns a file on disk into the `(name, headers, rows)` entries consumed
//! by [`Store::load`](crate::storage::Store::load). Two formats are read:
//! - JSON workbooks holding any number of sheets
//! - tab-separated sheets, one table per file, named by the file stem

use std::path::Path;

use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::error::{Error, Result};
use crate::storage::TableSource;

/// Serializable proxy for a workbook file
#[derive(Deserialize)]
struct WorkbookData {
    tables: Vec<SheetData>,
}

#[derive(Deserialize)]
struct SheetData {
    name: String,
    headers: Vec<JsonValue>,
    #[serde(default)]
    rows: Vec<Vec<JsonValue>>,
}

/// Render a spreadsheet cell as text; empty cells become ""
fn cell_text(cell: JsonValue) -> String {
    match cell {
        JsonValue::Null => String::new(),
        JsonValue::String(s) => s,
        other => other.to_string(),
    }
}

/// Load every table found at `path`
pub fn load_path(path: impl AsRef<Path>) -> Result<Vec<TableSource>> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("json") => {
            let json = std::fs::read_to_string(path)?;
            parse_workbook(&json)
        }
        Some("tsv") | Some("txt") => {
            let name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .ok_or_else(|| {
                    Error::LoadError(format!("invalid file name '{}'", path.display()))
                })?;
            let text = std::fs::read_to_string(path)?;
            Ok(vec![parse_delimited(name, &text, '\t')?])
        }
        _ => Err(Error::LoadError(format!(
            "unsupported file type '{}'",
            path.display()
        ))),
    }
}

/// Parse a JSON workbook: `{"tables": [{"name", "headers", "rows"}]}`
pub fn parse_workbook(json: &str) -> Result<Vec<TableSource>> {
    let data: WorkbookData =
        serde_json::from_str(json).map_err(|e| Error::LoadError(e.to_string()))?;

    Ok(data
        .tables
        .into_iter()
        .map(|sheet| {
            TableSource::new(
                sheet.name,
                sheet.headers.into_iter().map(cell_text).collect(),
                sheet
                    .rows
                    .into_iter()
                    .map(|row| row.into_iter().map(cell_text).collect())
                    .collect(),
            )
        })
        .collect())
}

/// Parse one delimited sheet. The first line holds the field names and
/// blank lines are skipped.
pub fn parse_delimited(name: &str, text: &str, delimiter: char) -> Result<TableSource> {
    let mut lines = text.lines();
    let headers: Vec<String> = lines
        .next()
        .filter(|line| !line.is_empty())
        .ok_or_else(|| Error::LoadError(format!("sheet '{}' has no header row", name)))?
        .split(delimiter)
        .map(|s| s.trim().to_string())
        .collect();

    let rows = lines
        .filter(|line| !line.is_empty())
        .map(|line| line.split(delimiter).map(str::to_string).collect())
        .collect();

    Ok(TableSource::new(name, headers, rows))
}
