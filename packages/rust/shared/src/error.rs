//! Error types for labelprep.
//!
//! Library crates use [`LabelPrepError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all labelprep operations.
#[derive(Debug, thiserror::Error)]
pub enum LabelPrepError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// CSV reading or writing error.
    #[error("CSV error in {path:?}: {source}")]
    Csv { path: PathBuf, source: csv::Error },

    /// A required column is absent from a source table.
    #[error("column missing in {path:?}: '{column}'")]
    MissingColumn { path: PathBuf, column: String },

    /// An instruction or guidance file needed for a prompt could not be read.
    #[error("missing resource {path:?}: {source}")]
    MissingResource {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Guidance could not be parsed or serialized for a prompt.
    #[error("malformed guidance: {message}")]
    MalformedGuidance { message: String },

    /// Prompt template parsing or rendering error.
    #[error("template error: {message}")]
    Template { message: String },

    /// Data validation error.
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, LabelPrepError>;

impl LabelPrepError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Create a template error from any displayable message.
    pub fn template(msg: impl Into<String>) -> Self {
        Self::Template {
            message: msg.into(),
        }
    }

    /// Create a malformed-guidance error from any displayable message.
    pub fn malformed_guidance(msg: impl Into<String>) -> Self {
        Self::MalformedGuidance {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Wrap a `csv::Error` with a path for context.
    pub fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }

    /// A required column was not found in the table at `path`.
    pub fn missing_column(path: impl Into<PathBuf>, column: impl Into<String>) -> Self {
        Self::MissingColumn {
            path: path.into(),
            column: column.into(),
        }
    }

    /// A prompt resource at `path` could not be read.
    pub fn missing_resource(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::MissingResource {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = LabelPrepError::config("bad suffix");
        assert_eq!(err.to_string(), "config error: bad suffix");

        let err = LabelPrepError::missing_column("a/b_classified.csv", "auto_issues");
        assert!(err.to_string().contains("'auto_issues'"));
        assert!(err.to_string().contains("b_classified.csv"));
    }

    #[test]
    fn missing_resource_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = LabelPrepError::missing_resource("prompt.txt", io);
        assert!(matches!(err, LabelPrepError::MissingResource { .. }));
        assert!(err.to_string().contains("gone"));
    }
}
