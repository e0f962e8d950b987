//! Segment merger: one unified `<category>.csv` from a category's classified
//! and unclassified tables.
//!
//! Output is written only when both sources yield at least one row. All
//! classified rows come first, then all unclassified rows, with no
//! deduplication.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use labelprep_shared::{
    AmbiguityPolicy, ColumnConfig, EMPTY_LABELS, LabelPrepError, LayoutConfig, Result,
    SegmentRecord,
};

use crate::pipeline::{ProgressReporter, run_batch};
use crate::report::{BatchReport, Outcome, Status};
use crate::table::{self, Table};

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// What happened to one category during a merge.
#[derive(Debug)]
pub enum MergeOutcome {
    Saved {
        path: PathBuf,
        classified_rows: usize,
        unclassified_rows: usize,
    },
    Skipped(SkipReason),
    /// Both sources loaded but the output could not be written.
    Failed(LabelPrepError),
}

/// Why a category produced no merged output.
#[derive(Debug)]
pub enum SkipReason {
    /// At least one side had no usable rows.
    Incomplete {
        classified: SourceState,
        unclassified: SourceState,
    },
    /// Several files matched one suffix and the policy forbids guessing.
    Ambiguous { suffix: String, candidates: Vec<String> },
    /// The category folder could not be listed.
    Unreadable(String),
}

/// How one side of the merge turned out.
#[derive(Debug)]
pub enum SourceState {
    /// No file with the expected suffix.
    Absent,
    /// The file exists but could not be used (unreadable or column missing).
    Unusable(LabelPrepError),
    /// Loaded; may hold zero rows.
    Rows(usize),
}

impl SourceState {
    fn has_rows(&self) -> bool {
        matches!(self, Self::Rows(n) if *n > 0)
    }
}

impl std::fmt::Display for SourceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Absent => f.write_str("no file"),
            Self::Unusable(e) => write!(f, "unusable ({e})"),
            Self::Rows(n) => write!(f, "{n} rows"),
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Incomplete {
                classified,
                unclassified,
            } => write!(
                f,
                "one or both sources are empty (classified: {classified}, unclassified: {unclassified})"
            ),
            Self::Ambiguous { suffix, candidates } => write!(
                f,
                "several files end with '{suffix}': {}",
                candidates.join(", ")
            ),
            Self::Unreadable(message) => write!(f, "cannot list folder: {message}"),
        }
    }
}

impl Outcome for MergeOutcome {
    fn status(&self) -> Status {
        match self {
            Self::Saved { .. } => Status::Saved,
            Self::Skipped(_) => Status::Skipped,
            Self::Failed(_) => Status::Failed,
        }
    }

    fn detail(&self) -> String {
        match self {
            Self::Saved { path, .. } => path.display().to_string(),
            Self::Skipped(reason) => reason.to_string(),
            Self::Failed(e) => e.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Source discovery
// ---------------------------------------------------------------------------

/// The source files chosen for one category.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SourceFiles {
    pub classified: Option<PathBuf>,
    pub unclassified: Option<PathBuf>,
}

/// Find the classified and unclassified tables in `category_dir`.
///
/// File names are examined in sorted order. Hidden files and the category's
/// own merged output are never candidates. A name matching both suffixes belongs to the longer one.
pub fn find_sources(
    category_dir: &Path,
    category: &str,
    layout: &LayoutConfig,
) -> std::result::Result<SourceFiles, SkipReason> {
    let entries =
        std::fs::read_dir(category_dir).map_err(|e| SkipReason::Unreadable(e.to_string()))?;

    let merged_name = layout.merged_file_name(category);
    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| !name.starts_with('.') && *name != merged_name)
        .collect();
    names.sort();

    let classified_suffix = layout.classified_suffix.as_str();
    let unclassified_suffix = layout.unclassified_suffix.as_str();
    let (longer, shorter) = if unclassified_suffix.len() >= classified_suffix.len() {
        (unclassified_suffix, classified_suffix)
    } else {
        (classified_suffix, unclassified_suffix)
    };

    let mut classified = Vec::new();
    let mut unclassified = Vec::new();
    for name in names {
        let suffix = if name.ends_with(longer) {
            longer
        } else if name.ends_with(shorter) {
            shorter
        } else {
            continue;
        };
        if suffix == classified_suffix {
            classified.push(name);
        } else {
            unclassified.push(name);
        }
    }

    Ok(SourceFiles {
        classified: pick(category_dir, classified_suffix, classified, layout)?,
        unclassified: pick(category_dir, unclassified_suffix, unclassified, layout)?,
    })
}

fn pick(
    category_dir: &Path,
    suffix: &str,
    candidates: Vec<String>,
    layout: &LayoutConfig,
) -> std::result::Result<Option<PathBuf>, SkipReason> {
    if candidates.len() > 1 {
        match layout.on_ambiguous_source {
            AmbiguityPolicy::Error => {
                return Err(SkipReason::Ambiguous {
                    suffix: suffix.to_string(),
                    candidates,
                });
            }
            AmbiguityPolicy::First => {
                warn!(
                    suffix,
                    chosen = %candidates[0],
                    ignored = ?&candidates[1..],
                    "several source files match, using the first"
                );
            }
        }
    }
    Ok(candidates.into_iter().next().map(|name| category_dir.join(name)))
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

/// Normalize a classified labels cell to JSON array text.
///
/// Missing cells become `[]`. Text that already parses as a JSON array is kept
/// as written. Anything else is a single label.
pub fn normalize_labels(cell: &str) -> String {
    let trimmed = cell.trim();
    if table::is_missing(trimmed) {
        return EMPTY_LABELS.to_string();
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Array(_)) => trimmed.to_string(),
        _ => Value::Array(vec![Value::String(trimmed.to_string())]).to_string(),
    }
}

/// Project a classified table onto `segment_id`, labels, `segment_text`.
pub fn load_classified(path: &Path, columns: &ColumnConfig) -> Result<Vec<SegmentRecord>> {
    let table = Table::read(path)?;
    let idx = table.column_indices(&[
        columns.segment_id.as_str(),
        columns.classified_labels.as_str(),
        columns.segment_text.as_str(),
    ])?;

    Ok(table
        .rows()
        .iter()
        .map(|row| {
            SegmentRecord::classified(
                row[idx[0]].as_str(),
                normalize_labels(&row[idx[1]]),
                row[idx[2]].as_str(),
            )
        })
        .collect())
}

/// Project an unclassified table onto `segment_id`, `segment_text`.
pub fn load_unclassified(path: &Path, columns: &ColumnConfig) -> Result<Vec<SegmentRecord>> {
    let table = Table::read(path)?;
    let idx = table.column_indices(&[columns.segment_id.as_str(), columns.segment_text.as_str()])?;

    Ok(table
        .rows()
        .iter()
        .map(|row| SegmentRecord::unclassified(row[idx[0]].as_str(), row[idx[1]].as_str()))
        .collect())
}

/// Load one side, turning every failure into a [`SourceState`].
fn load_side(
    path: Option<&Path>,
    load: impl FnOnce(&Path) -> Result<Vec<SegmentRecord>>,
) -> (SourceState, Vec<SegmentRecord>) {
    let Some(path) = path else {
        return (SourceState::Absent, Vec::new());
    };
    match load(path) {
        Ok(records) => (SourceState::Rows(records.len()), records),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "source table unusable");
            (SourceState::Unusable(e), Vec::new())
        }
    }
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

/// Serialize merged records as CSV with the unified header.
pub fn to_csv(records: &[SegmentRecord], path: &Path) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer
            .serialize(record)
            .map_err(|e| LabelPrepError::csv(path, e))?;
    }
    writer
        .into_inner()
        .map_err(|e| LabelPrepError::io(path, e.into_error()))
}

/// Merge one category folder into `<category>.csv`.
#[instrument(skip_all, fields(category = %category))]
pub fn merge_category(
    category_dir: &Path,
    category: &str,
    layout: &LayoutConfig,
    columns: &ColumnConfig,
) -> MergeOutcome {
    let sources = match find_sources(category_dir, category, layout) {
        Ok(sources) => sources,
        Err(reason) => return MergeOutcome::Skipped(reason),
    };
    debug!(?sources, "resolved source files");

    let (classified_state, classified) =
        load_side(sources.classified.as_deref(), |p| load_classified(p, columns));
    let (unclassified_state, unclassified) =
        load_side(sources.unclassified.as_deref(), |p| load_unclassified(p, columns));

    if !classified_state.has_rows() || !unclassified_state.has_rows() {
        return MergeOutcome::Skipped(SkipReason::Incomplete {
            classified: classified_state,
            unclassified: unclassified_state,
        });
    }

    let classified_rows = classified.len();
    let unclassified_rows = unclassified.len();
    let mut merged = classified;
    merged.extend(unclassified);

    let path = category_dir.join(layout.merged_file_name(category));
    let written = to_csv(&merged, &path).and_then(|bytes| table::write_atomic(&path, &bytes));
    if let Err(e) = written {
        warn!(path = %path.display(), error = %e, "failed to write merged table");
        return MergeOutcome::Failed(e);
    }

    info!(
        path = %path.display(),
        classified_rows,
        unclassified_rows,
        "merged table saved"
    );

    MergeOutcome::Saved {
        path,
        classified_rows,
        unclassified_rows,
    }
}

/// Merge every category under `base_dir`.
pub fn merge_all(
    base_dir: &Path,
    layout: &LayoutConfig,
    columns: &ColumnConfig,
    progress: &dyn ProgressReporter,
) -> BatchReport<MergeOutcome> {
    let title = format!(
        "Merging classified and unclassified segments in: \"{}\"",
        base_dir.display()
    );
    run_batch(base_dir, title, progress, |category, dir| {
        merge_category(dir, category, layout, columns)
    })
}
