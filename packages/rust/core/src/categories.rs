//! Category discovery: the immediate subdirectories of a base directory.

use std::path::{Path, PathBuf};

use tracing::{debug, instrument, warn};

/// Result of listing a base directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryListing {
    /// At least one category folder exists.
    Found {
        /// Category names, sorted.
        categories: Vec<String>,
        /// Longest name in characters, for aligned console output.
        max_len: usize,
    },
    /// Nothing to do; callers short-circuit.
    Empty(EmptyReason),
}

/// Why a listing came back empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmptyReason {
    MissingBaseDir(PathBuf),
    NoCategories(PathBuf),
    Unreadable { path: PathBuf, message: String },
}

impl std::fmt::Display for EmptyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingBaseDir(path) => {
                write!(f, "Base directory does not exist: \"{}\"", path.display())
            }
            Self::NoCategories(_) => f.write_str("No category folders found."),
            Self::Unreadable { path, message } => {
                write!(f, "Cannot read base directory \"{}\": {message}", path.display())
            }
        }
    }
}

/// List the category folders directly under `base_dir`.
///
/// A missing or unreadable base directory and a directory without
/// subdirectories are reported as [`CategoryListing::Empty`], never as errors.
#[instrument(skip_all, fields(base_dir = %base_dir.display()))]
pub fn list_categories(base_dir: &Path) -> CategoryListing {
    if !base_dir.is_dir() {
        debug!("base directory does not exist");
        return CategoryListing::Empty(EmptyReason::MissingBaseDir(base_dir.to_path_buf()));
    }

    let entries = match std::fs::read_dir(base_dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(error = %e, "cannot read base directory");
            return CategoryListing::Empty(EmptyReason::Unreadable {
                path: base_dir.to_path_buf(),
                message: e.to_string(),
            });
        }
    };

    let mut categories = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "skipping unreadable directory entry");
                continue;
            }
        };

        // Follows symlinks, so a linked category folder still counts.
        if !entry.path().is_dir() {
            continue;
        }

        match entry.file_name().into_string() {
            Ok(name) => categories.push(name),
            Err(raw) => warn!(name = ?raw, "skipping category with non-UTF-8 name"),
        }
    }

    if categories.is_empty() {
        return CategoryListing::Empty(EmptyReason::NoCategories(base_dir.to_path_buf()));
    }

    categories.sort();
    let max_len = categories
        .iter()
        .map(|c| c.chars().count())
        .max()
        .unwrap_or(0);

    debug!(count = categories.len(), max_len, "categories found");
    CategoryListing::Found {
        categories,
        max_len,
    }
}
