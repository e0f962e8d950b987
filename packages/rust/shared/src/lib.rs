//! Shared types, error model, and configuration for labelprep.
//!
//! This crate is the foundation depended on by all other labelprep crates.
//! It provides:
//! - [`LabelPrepError`]: the unified error type
//! - Domain types ([`SegmentRecord`], [`SegmentType`], [`GuidanceRecord`])
//! - Configuration ([`AppConfig`], [`LayoutConfig`], [`ColumnConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AmbiguityPolicy, AppConfig, ColumnConfig, ColumnsFileConfig, LayoutConfig, LayoutFileConfig,
    PathsConfig, config_dir, config_file_path, init_config, load_config, load_config_from,
    validate_config,
};
pub use error::{LabelPrepError, Result};
pub use types::{EMPTY_LABELS, GuidanceRecord, MERGED_COLUMNS, SegmentRecord, SegmentType};
