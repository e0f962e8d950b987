//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use labelprep_core::{CategoryListing, ProgressReporter, guidance, list_categories, merge};
use labelprep_prompt::PromptAssembler;
use labelprep_shared::{
    AppConfig, ColumnConfig, LayoutConfig, init_config, load_config, load_config_from,
};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// labelprep: prepare text segments for LLM classification.
#[derive(Parser)]
#[command(
    name = "labelprep",
    version,
    about = "Merge category segment tables, normalize guidance, and assemble classification prompts.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.labelprep/labelprep.toml.
    #[arg(long, global = true, env = "LABELPREP_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Base directory override shared by the batch commands.
#[derive(Args, Debug, Clone)]
pub(crate) struct BaseDirArg {
    /// Directory whose subdirectories are categories (defaults to config `paths.base_dir`).
    #[arg(short, long, env = "LABELPREP_BASE_DIR")]
    pub base_dir: Option<PathBuf>,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// List category folders.
    Categories {
        #[command(flatten)]
        dir: BaseDirArg,
    },

    /// Merge classified and unclassified segments into <category>.csv.
    Merge {
        #[command(flatten)]
        dir: BaseDirArg,
    },

    /// Guidance file normalization.
    Guidance {
        #[command(subcommand)]
        action: GuidanceAction,
    },

    /// Run merge, guidance rename and guidance convert in order.
    Prepare {
        #[command(flatten)]
        dir: BaseDirArg,
    },

    /// Assemble a classification prompt for one segment and print it.
    Prompt {
        /// Segment text to classify.
        segment: String,

        /// Category whose converted guidance to use.
        #[arg(long, required_unless_present = "guidance", conflicts_with = "guidance")]
        category: Option<String>,

        /// Guidance JSON file to use directly.
        #[arg(long)]
        guidance: Option<PathBuf>,

        /// Instruction text file (defaults to config `paths.instruction_path`).
        #[arg(long)]
        instruction: Option<PathBuf>,

        /// Print the chat message as JSON instead of plain text.
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        dir: BaseDirArg,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Guidance subcommands.
#[derive(Subcommand)]
pub(crate) enum GuidanceAction {
    /// Rename guidance.csv to <category>_guidance.csv.
    Rename {
        #[command(flatten)]
        dir: BaseDirArg,
    },
    /// Convert <category>_guidance.csv to <category>_guidance.json.
    Convert {
        #[command(flatten)]
        dir: BaseDirArg,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Log directive used when `RUST_LOG` is unset.
fn default_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "labelprep=info",
        1 => "labelprep=debug",
        _ => "labelprep=trace",
    }
}

/// Initialize tracing based on CLI flags. Logs go to stderr; stdout carries
/// status lines and prompts.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(cli.verbose)));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    let config = resolve_config(cli.config.as_deref())?;

    match cli.command {
        Command::Categories { dir } => cmd_categories(&base_dir(&dir, &config)),
        Command::Merge { dir } => cmd_merge(&base_dir(&dir, &config), &config),
        Command::Guidance { action } => match action {
            GuidanceAction::Rename { dir } => cmd_guidance_rename(&base_dir(&dir, &config), &config),
            GuidanceAction::Convert { dir } => {
                cmd_guidance_convert(&base_dir(&dir, &config), &config)
            }
        },
        Command::Prepare { dir } => cmd_prepare(&base_dir(&dir, &config), &config),
        Command::Prompt {
            segment,
            category,
            guidance,
            instruction,
            json,
            dir,
        } => {
            let guidance_path =
                guidance_path(guidance, category.as_deref(), &base_dir(&dir, &config), &config)?;
            let instruction_path =
                instruction.unwrap_or_else(|| PathBuf::from(&config.paths.instruction_path));
            cmd_prompt(&segment, &guidance_path, &instruction_path, json)
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(&config),
        },
    }
}

/// Load the config from `--config` if given, else from the default location.
fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    Ok(config)
}

fn base_dir(arg: &BaseDirArg, config: &AppConfig) -> PathBuf {
    arg.base_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.paths.base_dir))
}

/// `--guidance` wins; otherwise `<base_dir>/<category>/<category>_guidance.json`.
fn guidance_path(
    explicit: Option<PathBuf>,
    category: Option<&str>,
    base_dir: &Path,
    config: &AppConfig,
) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    let category = category.ok_or_else(|| eyre!("either --category or --guidance is required"))?;
    let layout = LayoutConfig::from(config);
    Ok(base_dir
        .join(category)
        .join(layout.guidance_json_name(category)))
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_categories(base_dir: &Path) -> Result<()> {
    info!(base_dir = %base_dir.display(), "listing categories");

    match list_categories(base_dir) {
        CategoryListing::Found { categories, .. } => {
            for category in categories {
                println!("{category}");
            }
        }
        CategoryListing::Empty(reason) => println!("{reason}"),
    }
    Ok(())
}

fn cmd_merge(base_dir: &Path, config: &AppConfig) -> Result<()> {
    let reporter = CliProgress::new();
    let report = merge::merge_all(
        base_dir,
        &LayoutConfig::from(config),
        &ColumnConfig::from(config),
        &reporter,
    );
    print_lines(&report.render());
    Ok(())
}

fn cmd_guidance_rename(base_dir: &Path, config: &AppConfig) -> Result<()> {
    let reporter = CliProgress::new();
    let report = guidance::rename_all(base_dir, &LayoutConfig::from(config), &reporter);
    print_lines(&report.render());
    Ok(())
}

fn cmd_guidance_convert(base_dir: &Path, config: &AppConfig) -> Result<()> {
    let reporter = CliProgress::new();
    let report = guidance::convert_all(base_dir, &LayoutConfig::from(config), &reporter);
    print_lines(&report.render());
    Ok(())
}

fn cmd_prepare(base_dir: &Path, config: &AppConfig) -> Result<()> {
    let reporter = CliProgress::new();
    let report = labelprep_core::prepare(
        base_dir,
        &LayoutConfig::from(config),
        &ColumnConfig::from(config),
        &reporter,
    );
    print_lines(&report.render());
    Ok(())
}

fn cmd_prompt(segment: &str, guidance: &Path, instruction: &Path, json: bool) -> Result<()> {
    info!(
        guidance = %guidance.display(),
        instruction = %instruction.display(),
        "assembling prompt"
    );

    let message = PromptAssembler::default().assemble(segment, guidance, instruction)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&message)?);
    } else {
        print!("{}", message.content);
    }
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif bar on stderr.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{bar:30.cyan/blue} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Self { bar }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str, total: usize) {
        self.bar.reset();
        self.bar.set_length(total as u64);
        self.bar.set_message(name.to_string());
    }

    fn category_started(&self, category: &str, current: usize, _total: usize) {
        self.bar.set_position(current.saturating_sub(1) as u64);
        self.bar.set_message(category.to_string());
    }

    fn done(&self) {
        self.bar.finish_and_clear();
    }
}
