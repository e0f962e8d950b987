//! Per-category batch reports and their aligned console rendering.

use std::path::PathBuf;

use crate::categories::EmptyReason;

/// Status word shown at the start of a console line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Saved,
    Skipped,
    Renamed,
    Empty,
    Failed,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Saved => "Saved",
            Self::Skipped => "Skipped",
            Self::Renamed => "Renamed",
            Self::Empty => "Empty",
            Self::Failed => "Failed",
        }
    }
}

/// Anything a batch pipeline records for one category.
pub trait Outcome {
    fn status(&self) -> Status;
    /// Text after the ` - ` separator: an output path or a reason.
    fn detail(&self) -> String;
}

/// One category's outcome within a batch.
#[derive(Debug)]
pub struct CategoryOutcome<O> {
    pub category: String,
    pub outcome: O,
}

/// Everything a batch pipeline did over one base directory.
#[derive(Debug)]
pub struct BatchReport<O> {
    /// Header line, e.g. `Merging classified and unclassified segments in: "categories"`.
    pub title: String,
    pub base_dir: PathBuf,
    /// Set when enumeration found nothing to process.
    pub empty: Option<EmptyReason>,
    /// Width used to align category names.
    pub max_len: usize,
    pub entries: Vec<CategoryOutcome<O>>,
}

impl<O: Outcome> BatchReport<O> {
    /// Number of categories that ended with `status`.
    pub fn count(&self, status: Status) -> usize {
        self.entries
            .iter()
            .filter(|e| e.outcome.status() == status)
            .count()
    }

    /// Outcome for a single category, if it was processed.
    pub fn outcome(&self, category: &str) -> Option<&O> {
        self.entries
            .iter()
            .find(|e| e.category == category)
            .map(|e| &e.outcome)
    }

    /// Console lines for this batch, ending with a blank separator line.
    pub fn render(&self) -> Vec<String> {
        let mut lines = Vec::new();

        if let Some(reason @ EmptyReason::MissingBaseDir(_)) = &self.empty {
            lines.push(reason.to_string());
            return lines;
        }

        lines.push(self.title.clone());
        lines.push(underline(&self.title));

        if let Some(reason) = &self.empty {
            lines.push(reason.to_string());
        }

        for entry in &self.entries {
            lines.push(status_line(
                entry.outcome.status(),
                &entry.category,
                self.max_len,
                &entry.outcome.detail(),
            ));
        }

        lines.push(String::new());
        lines
    }
}

/// `=` repeated to the character length of `title`.
pub fn underline(title: &str) -> String {
    "=".repeat(title.chars().count())
}

/// `Saved:   Safety  - categories/Safety/Safety.csv`
///
/// The status word plus colon is padded to nine columns and the category to `width`.
pub fn status_line(status: Status, category: &str, width: usize, detail: &str) -> String {
    let label = format!("{}:", status.as_str());
    format!("{label:<9}{category:<width$} - {detail}")
}
