//! Application configuration for labelprep.
//!
//! User config lives at `~/.labelprep/labelprep.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LabelPrepError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "labelprep.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".labelprep";

// ---------------------------------------------------------------------------
// Config structs (matching labelprep.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Default input locations.
    #[serde(default)]
    pub paths: PathsConfig,

    /// File naming conventions inside each category folder.
    #[serde(default)]
    pub layout: LayoutFileConfig,

    /// Source column names.
    #[serde(default)]
    pub columns: ColumnsFileConfig,
}

/// `[paths]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory whose immediate subdirectories are categories.
    #[serde(default = "default_base_dir")]
    pub base_dir: String,

    /// Static instruction text used as the first prompt section.
    #[serde(default = "default_instruction_path")]
    pub instruction_path: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            instruction_path: default_instruction_path(),
        }
    }
}

fn default_base_dir() -> String {
    "categories".into()
}
fn default_instruction_path() -> String {
    "prompt.txt".into()
}

/// What to do when a category folder holds several files with the same source suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmbiguityPolicy {
    /// Use the first candidate in file-name order.
    #[default]
    First,
    /// Skip the category and report the ambiguity.
    Error,
}

/// `[layout]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutFileConfig {
    #[serde(default = "default_classified_suffix")]
    pub classified_suffix: String,

    #[serde(default = "default_unclassified_suffix")]
    pub unclassified_suffix: String,

    /// Generic guidance file name, before it is renamed per category.
    #[serde(default = "default_generic_guidance")]
    pub generic_guidance: String,

    /// Appended to the category name to form `<category>_guidance.csv`.
    #[serde(default = "default_guidance_suffix")]
    pub guidance_suffix: String,

    #[serde(default)]
    pub on_ambiguous_source: AmbiguityPolicy,
}

impl Default for LayoutFileConfig {
    fn default() -> Self {
        Self {
            classified_suffix: default_classified_suffix(),
            unclassified_suffix: default_unclassified_suffix(),
            generic_guidance: default_generic_guidance(),
            guidance_suffix: default_guidance_suffix(),
            on_ambiguous_source: AmbiguityPolicy::default(),
        }
    }
}

fn default_classified_suffix() -> String {
    "_classified.csv".into()
}
fn default_unclassified_suffix() -> String {
    "_unclassified.csv".into()
}
fn default_generic_guidance() -> String {
    "guidance.csv".into()
}
fn default_guidance_suffix() -> String {
    "_guidance".into()
}

/// `[columns]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnsFileConfig {
    #[serde(default = "default_segment_id")]
    pub segment_id: String,

    #[serde(default = "default_segment_text")]
    pub segment_text: String,

    /// Column of the classified table holding the assigned labels.
    #[serde(default = "default_classified_labels")]
    pub classified_labels: String,
}

impl Default for ColumnsFileConfig {
    fn default() -> Self {
        Self {
            segment_id: default_segment_id(),
            segment_text: default_segment_text(),
            classified_labels: default_classified_labels(),
        }
    }
}

fn default_segment_id() -> String {
    "segment_id".into()
}
fn default_segment_text() -> String {
    "segment_text".into()
}
fn default_classified_labels() -> String {
    "auto_issues".into()
}

// ---------------------------------------------------------------------------
// Runtime config (merged from config file + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime file-layout configuration for a category folder.
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    pub classified_suffix: String,
    pub unclassified_suffix: String,
    pub generic_guidance: String,
    pub guidance_suffix: String,
    pub on_ambiguous_source: AmbiguityPolicy,
}

impl LayoutConfig {
    /// `<category>.csv`, the merged output file name.
    pub fn merged_file_name(&self, category: &str) -> String {
        format!("{category}.csv")
    }

    /// `<category>_guidance.csv`, the category-qualified guidance table.
    pub fn guidance_csv_name(&self, category: &str) -> String {
        format!("{category}{}.csv", self.guidance_suffix)
    }

    /// `<category>_guidance.json`, the converted guidance records.
    pub fn guidance_json_name(&self, category: &str) -> String {
        format!("{category}{}.json", self.guidance_suffix)
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for LayoutConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            classified_suffix: config.layout.classified_suffix.clone(),
            unclassified_suffix: config.layout.unclassified_suffix.clone(),
            generic_guidance: config.layout.generic_guidance.clone(),
            guidance_suffix: config.layout.guidance_suffix.clone(),
            on_ambiguous_source: config.layout.on_ambiguous_source,
        }
    }
}

/// Runtime source column names.
#[derive(Debug, Clone)]
pub struct ColumnConfig {
    pub segment_id: String,
    pub segment_text: String,
    pub classified_labels: String,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for ColumnConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            segment_id: config.columns.segment_id.clone(),
            segment_text: config.columns.segment_text.clone(),
            classified_labels: config.columns.classified_labels.clone(),
        }
    }
}

/// Check values that would make file matching meaningless.
pub fn validate_config(config: &AppConfig) -> Result<()> {
    let layout = &config.layout;
    if layout.classified_suffix.is_empty() || layout.unclassified_suffix.is_empty() {
        return Err(LabelPrepError::config("source suffixes must not be empty"));
    }
    if layout.classified_suffix == layout.unclassified_suffix {
        return Err(LabelPrepError::config(format!(
            "classified and unclassified suffixes are identical: '{}'",
            layout.classified_suffix
        )));
    }
    if layout.generic_guidance.is_empty() {
        return Err(LabelPrepError::config("generic_guidance must not be empty"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.labelprep/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| LabelPrepError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.labelprep/labelprep.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| LabelPrepError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        LabelPrepError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    validate_config(&config)?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| LabelPrepError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| LabelPrepError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| LabelPrepError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
