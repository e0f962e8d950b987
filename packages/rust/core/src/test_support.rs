//! Fixture helpers shared by the unit tests in this crate.

use std::path::{Path, PathBuf};

/// A fresh, uniquely named directory under the system temp dir.
pub(crate) fn temp_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("labelprep-core-test-{}", uuid::Uuid::now_v7()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Create `base/<category>/` and write each `(file_name, contents)` into it.
pub(crate) fn category(base: &Path, category: &str, files: &[(&str, &str)]) -> PathBuf {
    let dir = base.join(category);
    std::fs::create_dir_all(&dir).unwrap();
    for (name, contents) in files {
        std::fs::write(dir.join(name), contents).unwrap();
    }
    dir
}
