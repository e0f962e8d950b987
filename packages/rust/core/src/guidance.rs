//! Guidance normalization: give each category's ontology table a
//! category-qualified name, then convert it to a JSON record list.
//!
//! Both stages are safe to re-run. Renaming skips categories that are already
//! normalized; conversion overwrites the previous JSON.

use std::path::{Path, PathBuf};

use tracing::{info, instrument, warn};

use labelprep_shared::{GuidanceRecord, LabelPrepError, LayoutConfig, Result};

use crate::pipeline::{ProgressReporter, run_batch};
use crate::report::{BatchReport, Outcome, Status};
use crate::table::{self, Table};

// ---------------------------------------------------------------------------
// Rename stage
// ---------------------------------------------------------------------------

/// What the rename stage did for one category.
#[derive(Debug)]
pub enum RenameOutcome {
    /// `<category>_guidance.csv` was already present; nothing changed.
    AlreadyNormalized { path: PathBuf },
    Renamed { path: PathBuf },
    /// Neither guidance file exists.
    NoGuidance { expected: String },
    Failed(LabelPrepError),
}

impl Outcome for RenameOutcome {
    fn status(&self) -> Status {
        match self {
            Self::AlreadyNormalized { .. } => Status::Skipped,
            Self::Renamed { .. } => Status::Renamed,
            Self::NoGuidance { .. } => Status::Empty,
            Self::Failed(_) => Status::Failed,
        }
    }

    fn detail(&self) -> String {
        match self {
            Self::AlreadyNormalized { path } | Self::Renamed { path } => {
                path.display().to_string()
            }
            Self::NoGuidance { expected } => format!("{expected} does not exist"),
            Self::Failed(e) => e.to_string(),
        }
    }
}

/// Rename the generic guidance file in `category_dir` to its category-qualified name.
#[instrument(skip_all, fields(category = %category))]
pub fn rename_guidance(category_dir: &Path, category: &str, layout: &LayoutConfig) -> RenameOutcome {
    let generic = category_dir.join(&layout.generic_guidance);
    let qualified = category_dir.join(layout.guidance_csv_name(category));

    if qualified.exists() {
        return RenameOutcome::AlreadyNormalized { path: qualified };
    }

    if !generic.exists() {
        return RenameOutcome::NoGuidance {
            expected: layout.generic_guidance.clone(),
        };
    }

    if let Err(e) = std::fs::rename(&generic, &qualified) {
        warn!(from = %generic.display(), error = %e, "guidance rename failed");
        return RenameOutcome::Failed(LabelPrepError::io(&generic, e));
    }

    info!(path = %qualified.display(), "guidance renamed");
    RenameOutcome::Renamed { path: qualified }
}

/// Run the rename stage over every category under `base_dir`.
pub fn rename_all(
    base_dir: &Path,
    layout: &LayoutConfig,
    progress: &dyn ProgressReporter,
) -> BatchReport<RenameOutcome> {
    let title = format!(
        "Renaming {} files in: \"{}\"",
        layout.generic_guidance,
        base_dir.display()
    );
    run_batch(base_dir, title, progress, |category, dir| {
        rename_guidance(dir, category, layout)
    })
}

// ---------------------------------------------------------------------------
// Convert stage
// ---------------------------------------------------------------------------

/// What the convert stage did for one category.
#[derive(Debug)]
pub enum ConvertOutcome {
    Saved { path: PathBuf, records: usize },
    /// No usable guidance table; the category is skipped.
    Empty { source: String, error: LabelPrepError },
}

impl Outcome for ConvertOutcome {
    fn status(&self) -> Status {
        match self {
            Self::Saved { .. } => Status::Saved,
            Self::Empty { .. } => Status::Empty,
        }
    }

    fn detail(&self) -> String {
        match self {
            Self::Saved { path, .. } => path.display().to_string(),
            Self::Empty { source, error } if is_not_found(error) => {
                format!("{source} does not exist")
            }
            Self::Empty { source, error } => format!("{source} unusable: {error}"),
        }
    }
}

fn is_not_found(error: &LabelPrepError) -> bool {
    match error {
        LabelPrepError::Csv { source, .. } => matches!(
            source.kind(),
            csv::ErrorKind::Io(io) if io.kind() == std::io::ErrorKind::NotFound
        ),
        LabelPrepError::Io { source, .. } => source.kind() == std::io::ErrorKind::NotFound,
        _ => false,
    }
}

/// Read a guidance table as records, replacing every missing cell with `""`.
pub fn read_guidance_records(path: &Path) -> Result<Vec<GuidanceRecord>> {
    let table = Table::read(path)?;

    Ok(table
        .rows()
        .iter()
        .map(|row| {
            let mut record = GuidanceRecord::new();
            for (header, cell) in table.headers().iter().zip(row) {
                let value = if table::is_missing(cell) { "" } else { cell.as_str() };
                record.insert(header.as_str(), value);
            }
            record
        })
        .collect())
}

/// Serialize guidance records as human-readable JSON, non-ASCII kept literal.
pub fn guidance_to_json(records: &[GuidanceRecord]) -> Result<String> {
    serde_json::to_string_pretty(records).map_err(|e| {
        LabelPrepError::malformed_guidance(format!("JSON serialization failed: {e}"))
    })
}

/// Convert `<category>_guidance.csv` into `<category>_guidance.json`.
#[instrument(skip_all, fields(category = %category))]
pub fn convert_guidance(
    category_dir: &Path,
    category: &str,
    layout: &LayoutConfig,
) -> ConvertOutcome {
    let source = layout.guidance_csv_name(category);
    let csv_path = category_dir.join(&source);
    let json_path = category_dir.join(layout.guidance_json_name(category));

    let converted = read_guidance_records(&csv_path).and_then(|records| {
        let json = guidance_to_json(&records)?;
        table::write_atomic(&json_path, json.as_bytes())?;
        Ok(records.len())
    });

    match converted {
        Ok(records) => {
            info!(path = %json_path.display(), records, "guidance converted");
            ConvertOutcome::Saved {
                path: json_path,
                records,
            }
        }
        Err(error) => {
            warn!(path = %csv_path.display(), %error, "guidance conversion failed");
            ConvertOutcome::Empty { source, error }
        }
    }
}

/// Run the convert stage over every category under `base_dir`.
pub fn convert_all(
    base_dir: &Path,
    layout: &LayoutConfig,
    progress: &dyn ProgressReporter,
) -> BatchReport<ConvertOutcome> {
    let title = format!("Converting guidance CSV into JSON: \"{}\"", base_dir.display());
    run_batch(base_dir, title, progress, |category, dir| {
        convert_guidance(dir, category, layout)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::SilentProgress;
    use crate::test_support::{category, temp_dir};
    use serde_json::{Map, Value};

    const GUIDANCE: &str = "code,desc,example\nA,Alert,\nB,Bremse,NaN\nC,Café crème,\"x, y\"\n";

    #[test]
    fn rename_moves_generic_file() {
        let tmp = temp_dir();
        let dir = category(&tmp, "Safety", &[("guidance.csv", GUIDANCE)]);

        let outcome = rename_guidance(&dir, "Safety", &LayoutConfig::default());
        assert!(matches!(outcome, RenameOutcome::Renamed { .. }));
        assert!(dir.join("Safety_guidance.csv").exists());
        assert!(!dir.join("guidance.csv").exists());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rename_is_idempotent() {
        let tmp = temp_dir();
        let dir = category(&tmp, "Safety", &[("guidance.csv", GUIDANCE)]);
        let layout = LayoutConfig::default();

        let first = rename_guidance(&dir, "Safety", &layout);
        let second = rename_guidance(&dir, "Safety", &layout);

        assert_eq!(first.status(), Status::Renamed);
        assert!(matches!(second, RenameOutcome::AlreadyNormalized { .. }));
        assert_eq!(first.detail(), second.detail());
        assert_eq!(
            std::fs::read_to_string(dir.join("Safety_guidance.csv")).unwrap(),
            GUIDANCE
        );

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn qualified_file_wins_over_generic() {
        let tmp = temp_dir();
        let dir = category(
            &tmp,
            "Ops",
            &[("guidance.csv", "new\n"), ("Ops_guidance.csv", "old\n")],
        );

        let outcome = rename_guidance(&dir, "Ops", &LayoutConfig::default());
        assert_eq!(outcome.status(), Status::Skipped);
        assert_eq!(
            std::fs::read_to_string(dir.join("Ops_guidance.csv")).unwrap(),
            "old\n"
        );
        assert!(dir.join("guidance.csv").exists());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rename_without_guidance_is_empty() {
        let tmp = temp_dir();
        let dir = category(&tmp, "Bare", &[]);

        let outcome = rename_guidance(&dir, "Bare", &LayoutConfig::default());
        assert_eq!(outcome.status(), Status::Empty);
        assert_eq!(outcome.detail(), "guidance.csv does not exist");

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn conversion_is_total() {
        let tmp = temp_dir();
        let dir = category(&tmp, "Safety", &[("Safety_guidance.csv", GUIDANCE)]);

        let outcome = convert_guidance(&dir, "Safety", &LayoutConfig::default());
        assert!(matches!(outcome, ConvertOutcome::Saved { records: 3, .. }));

        let json = std::fs::read_to_string(dir.join("Safety_guidance.json")).unwrap();
        assert!(!json.contains("null"));
        assert!(json.contains("Café crème"), "non-ASCII escaped: {json}");

        let parsed: Vec<Map<String, Value>> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), 3);
        assert!(parsed.iter().flat_map(Map::values).all(Value::is_string));
        assert_eq!(parsed[0]["example"], "");
        assert_eq!(parsed[1]["example"], "");
        assert_eq!(parsed[2]["example"], "x, y");
        assert_eq!(
            parsed[0].keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["code", "desc", "example"]
        );

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn conversion_overwrites_previous_json() {
        let tmp = temp_dir();
        let dir = category(
            &tmp,
            "Ops",
            &[("Ops_guidance.csv", "code\nZ\n"), ("Ops_guidance.json", "stale")],
        );

        convert_guidance(&dir, "Ops", &LayoutConfig::default());
        let json = std::fs::read_to_string(dir.join("Ops_guidance.json")).unwrap();
        assert!(json.contains("\"code\": \"Z\""));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_guidance_converts_to_empty() {
        let tmp = temp_dir();
        let dir = category(&tmp, "Bare", &[]);

        let outcome = convert_guidance(&dir, "Bare", &LayoutConfig::default());
        assert_eq!(outcome.status(), Status::Empty);
        assert_eq!(outcome.detail(), "Bare_guidance.csv does not exist");
        assert!(!dir.join("Bare_guidance.json").exists());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn duplicate_columns_are_all_kept() {
        let tmp = temp_dir();
        let dir = category(&tmp, "P", &[("P_guidance.csv", "code,note,note\nA,first,second\n")]);

        let outcome = convert_guidance(&dir, "P", &LayoutConfig::default());
        assert!(matches!(outcome, ConvertOutcome::Saved { records: 1, .. }));

        let json = std::fs::read_to_string(dir.join("P_guidance.json")).unwrap();
        let parsed: Vec<Map<String, Value>> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["note"], "first");
        assert_eq!(parsed[0]["note.1"], "second");

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn overlong_row_leaves_guidance_empty() {
        let tmp = temp_dir();
        let dir = category(&tmp, "Q", &[("Q_guidance.csv", "code,desc\nA,Alert,extra\n")]);

        let outcome = convert_guidance(&dir, "Q", &LayoutConfig::default());
        assert_eq!(outcome.status(), Status::Empty);
        assert!(outcome.detail().starts_with("Q_guidance.csv unusable"), "{}", outcome.detail());
        assert!(!dir.join("Q_guidance.json").exists());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn one_bad_category_does_not_block_others() {
        let tmp = temp_dir();
        category(&tmp, "Bad", &[("Bad_guidance.csv", "")]);
        category(&tmp, "Good", &[("Good_guidance.csv", "code,desc\nA,Alert\n")]);

        let report = convert_all(&tmp, &LayoutConfig::default(), &SilentProgress);
        assert_eq!(report.outcome("Bad").map(Outcome::status), Some(Status::Empty));
        assert_eq!(report.outcome("Good").map(Outcome::status), Some(Status::Saved));
        assert!(tmp.join("Good/Good_guidance.json").exists());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rename_all_twice_is_stable() {
        let tmp = temp_dir();
        category(&tmp, "A", &[("guidance.csv", GUIDANCE)]);
        category(&tmp, "B", &[]);
        let layout = LayoutConfig::default();

        let first = rename_all(&tmp, &layout, &SilentProgress);
        let second = rename_all(&tmp, &layout, &SilentProgress);

        assert_eq!(first.count(Status::Renamed), 1);
        assert_eq!(second.count(Status::Renamed), 0);
        assert_eq!(second.count(Status::Skipped), 1);
        assert_eq!(second.count(Status::Empty), 1);
        assert_eq!(second.count(Status::Failed), 0);

        let _ = std::fs::remove_dir_all(&tmp);
    }
}
