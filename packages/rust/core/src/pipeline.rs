//! Batch driver shared by the per-category pipelines, plus the end-to-end
//! `prepare` run: merge → guidance rename → guidance convert.

use std::path::Path;

use tracing::{info, info_span};

use labelprep_shared::{ColumnConfig, LayoutConfig};

use crate::categories::{CategoryListing, list_categories};
use crate::guidance::{self, ConvertOutcome, RenameOutcome};
use crate::merge::{self, MergeOutcome};
use crate::report::{BatchReport, CategoryOutcome, Outcome, Status};

/// Progress callback for reporting batch status.
pub trait ProgressReporter {
    /// Called when a batch starts, with the number of categories it will visit.
    fn phase(&self, name: &str, total: usize);
    /// Called before a category is processed.
    fn category_started(&self, category: &str, current: usize, total: usize);
    /// Called when the batch has visited every category.
    fn done(&self);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str, _total: usize) {}
    fn category_started(&self, _category: &str, _current: usize, _total: usize) {}
    fn done(&self) {}
}

/// Enumerate categories under `base_dir` and apply `per_category` to each.
///
/// The closure receives the category name and its folder. It returns a value,
/// not a `Result`: failures are part of the outcome, so one category can never
/// stop the others.
pub(crate) fn run_batch<O, F>(
    base_dir: &Path,
    title: String,
    progress: &dyn ProgressReporter,
    mut per_category: F,
) -> BatchReport<O>
where
    O: Outcome,
    F: FnMut(&str, &Path) -> O,
{
    let (categories, max_len, empty) = match list_categories(base_dir) {
        CategoryListing::Found {
            categories,
            max_len,
        } => (categories, max_len, None),
        CategoryListing::Empty(reason) => (Vec::new(), 0, Some(reason)),
    };

    let total = categories.len();
    progress.phase(&title, total);

    let mut entries = Vec::with_capacity(total);
    for (i, category) in categories.into_iter().enumerate() {
        progress.category_started(&category, i + 1, total);
        let _span = info_span!("category", %category).entered();

        let outcome = per_category(&category, &base_dir.join(&category));
        entries.push(CategoryOutcome { category, outcome });
    }

    progress.done();

    BatchReport {
        title,
        base_dir: base_dir.to_path_buf(),
        empty,
        max_len,
        entries,
    }
}

/// Reports from one `prepare` run.
#[derive(Debug)]
pub struct PrepareReport {
    pub merge: BatchReport<MergeOutcome>,
    pub rename: BatchReport<RenameOutcome>,
    pub convert: BatchReport<ConvertOutcome>,
}

impl PrepareReport {
    /// Console lines for all three stages, in run order.
    pub fn render(&self) -> Vec<String> {
        let mut lines = self.merge.render();
        lines.extend(self.rename.render());
        lines.extend(self.convert.render());
        lines
    }
}

/// Run every preprocessing stage over `base_dir`.
pub fn prepare(
    base_dir: &Path,
    layout: &LayoutConfig,
    columns: &ColumnConfig,
    progress: &dyn ProgressReporter,
) -> PrepareReport {
    let merge = merge::merge_all(base_dir, layout, columns, progress);
    let rename = guidance::rename_all(base_dir, layout, progress);
    let convert = guidance::convert_all(base_dir, layout, progress);

    info!(
        merged = merge.count(Status::Saved),
        renamed = rename.count(Status::Renamed),
        converted = convert.count(Status::Saved),
        "prepare complete"
    );

    PrepareReport {
        merge,
        rename,
        convert,
    }
}
