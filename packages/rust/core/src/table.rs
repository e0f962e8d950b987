//! Minimal string-typed CSV tables and atomic file output.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::debug;

use labelprep_shared::{LabelPrepError, Result};

/// Cell tokens read as a missing value, matching common dataframe readers.
pub const MISSING_SENTINELS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// True when `cell` denotes a missing value.
pub fn is_missing(cell: &str) -> bool {
    MISSING_SENTINELS.contains(&cell)
}

/// A CSV file loaded as header names plus rows of cell text.
///
/// Every row has exactly `headers.len()` cells; short rows are padded with `""`.
/// Repeated header names are made unique as `name.1`, `name.2`, ...
#[derive(Debug, Clone)]
pub struct Table {
    path: PathBuf,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Read a CSV file with a header row.
    pub fn read(path: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(|e| LabelPrepError::csv(path, e))?;

        let raw: Vec<String> = reader
            .headers()
            .map_err(|e| LabelPrepError::csv(path, e))?
            .iter()
            .enumerate()
            .map(|(i, h)| {
                if i == 0 {
                    h.trim_start_matches('\u{feff}').to_string()
                } else {
                    h.to_string()
                }
            })
            .collect();

        if raw.is_empty() || raw.iter().all(String::is_empty) {
            return Err(LabelPrepError::validation(format!(
                "{} has no header row",
                path.display()
            )));
        }

        let headers = dedupe_headers(raw);
        let width = headers.len();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| LabelPrepError::csv(path, e))?;
            if record.len() > width {
                let line = record.position().map_or(0, |p| p.line());
                return Err(LabelPrepError::validation(format!(
                    "{} line {line}: expected {width} fields, saw {}",
                    path.display(),
                    record.len()
                )));
            }
            let mut row: Vec<String> = record.iter().map(String::from).collect();
            row.resize(width, String::new());
            rows.push(row);
        }

        debug!(path = %path.display(), columns = width, rows = rows.len(), "read table");

        Ok(Self {
            path: path.to_path_buf(),
            headers,
            rows,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Position of the first column named `name`.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| LabelPrepError::missing_column(&self.path, name))
    }

    /// Resolve several columns at once; fails on the first one absent.
    pub fn column_indices(&self, names: &[&str]) -> Result<Vec<usize>> {
        names.iter().map(|name| self.column_index(name)).collect()
    }
}

/// Suffix repeated names with `.N`, skipping any name already taken.
fn dedupe_headers(raw: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(raw.len());
    let mut headers = Vec::with_capacity(raw.len());
    for name in raw {
        let mut unique = name.clone();
        let mut n = 0;
        while seen.contains(&unique) {
            n += 1;
            unique = format!("{name}.{n}");
        }
        seen.insert(unique.clone());
        headers.push(unique);
    }
    headers
}

/// Write `contents` to `path` through a dot-prefixed temp file and a rename,
/// so readers never observe a partially written file.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| LabelPrepError::validation(format!("not a file path: {}", path.display())))?;
    let temp = parent.join(format!(".{file_name}.tmp"));

    std::fs::write(&temp, contents).map_err(|e| LabelPrepError::io(&temp, e))?;
    std::fs::rename(&temp, path).map_err(|e| {
        let _ = std::fs::remove_file(&temp);
        LabelPrepError::io(path, e)
    })?;

    debug!(path = %path.display(), bytes = contents.len(), "wrote file");
    Ok(())
}
