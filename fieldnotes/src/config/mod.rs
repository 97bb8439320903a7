//! Configuration for the `fieldnotes` workspace.
//!
//! Supports layered configuration with the following priority (highest first):
//! 1. CLI arguments
//! 2. Environment variables (via clap `env` attribute)
//! 3. TOML config file (`~/.config/fieldnotes/config.toml`)
//! 4. Compiled defaults
//!
//! Missing config file is not an error (defaults are used). An explicit
//! `--config` path that doesn't exist is an error.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::{PROJECT_LATENCY, TASK_LATENCY};
use crate::notify::DEFAULT_TOAST_DURATION;

/// Default number of records per listing page.
pub const DEFAULT_PAGE_SIZE: usize = 6;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),
}

// ---------------------------------------------------------------------------
// TOML file structs (all fields Option for partial overrides)
// ---------------------------------------------------------------------------

/// Top-level TOML config file structure.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ConfigFile {
    storage: StorageFileConfig,
    api: ApiFileConfig,
    ui: UiFileConfig,
}

/// `[storage]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct StorageFileConfig {
    path: Option<PathBuf>,
    in_memory: Option<bool>,
}

/// `[api]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ApiFileConfig {
    project_latency_ms: Option<u64>,
    task_latency_ms: Option<u64>,
}

/// `[ui]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct UiFileConfig {
    page_size: Option<usize>,
    toast_duration_ms: Option<u64>,
}

// ---------------------------------------------------------------------------
// Resolved configuration
// ---------------------------------------------------------------------------

/// Where record collections are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageTarget {
    /// Process memory; nothing survives exit.
    InMemory,
    /// A JSON document on disk.
    File(PathBuf),
}

/// Fully resolved workspace configuration.
#[derive(Debug, Clone)]
pub struct WorkspaceConfig {
    /// Storage backend.
    pub storage: StorageTarget,
    /// Simulated latency of project calls.
    pub project_latency: Duration,
    /// Simulated latency of task calls.
    pub task_latency: Duration,
    /// Records per listing page.
    pub page_size: usize,
    /// Display time of toasts; zero keeps them until dismissed.
    pub toast_duration: Duration,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            storage: StorageTarget::File(default_data_file()),
            project_latency: PROJECT_LATENCY,
            task_latency: TASK_LATENCY,
            page_size: DEFAULT_PAGE_SIZE,
            toast_duration: DEFAULT_TOAST_DURATION,
        }
    }
}

impl WorkspaceConfig {
    /// Load configuration by merging CLI args, env vars, and a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the explicit config file cannot be read,
    /// or if any config file found cannot be parsed.
    pub fn load(cli: &CliArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;
        Ok(Self::resolve(cli, &file))
    }

    /// Resolve a `WorkspaceConfig` from CLI args and a parsed config file.
    ///
    /// Priority: CLI > file > default.
    #[must_use]
    fn resolve(cli: &CliArgs, file: &ConfigFile) -> Self {
        let defaults = Self::default();

        let in_memory = cli.in_memory || file.storage.in_memory.unwrap_or(false);
        let storage = if in_memory {
            StorageTarget::InMemory
        } else {
            cli.data_file
                .clone()
                .or_else(|| file.storage.path.clone())
                .map_or(defaults.storage, StorageTarget::File)
        };

        Self {
            storage,
            project_latency: file
                .api
                .project_latency_ms
                .map_or(defaults.project_latency, Duration::from_millis),
            task_latency: file
                .api
                .task_latency_ms
                .map_or(defaults.task_latency, Duration::from_millis),
            page_size: cli
                .page_size
                .or(file.ui.page_size)
                .unwrap_or(defaults.page_size)
                .max(1),
            toast_duration: file
                .ui
                .toast_duration_ms
                .map_or(defaults.toast_duration, Duration::from_millis),
        }
    }
}

/// Global CLI arguments parsed by clap.
#[derive(clap::Args, Debug, Default)]
pub struct CliArgs {
    /// Path to config file (default: `~/.config/fieldnotes/config.toml`).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Storage document (default: `~/.local/share/fieldnotes/storage.json`).
    #[arg(long, env = "FIELDNOTES_DATA_FILE", global = true)]
    pub data_file: Option<PathBuf>,

    /// Keep records in memory only.
    #[arg(long, global = true)]
    pub in_memory: bool,

    /// Records per listing page.
    #[arg(long, global = true)]
    pub page_size: Option<usize>,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, default_value = "warn", env = "FIELDNOTES_LOG", global = true)]
    pub log_level: String,

    /// Write logs to this file instead of stderr.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn default_data_file() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("fieldnotes")
        .join("storage.json")
}

/// Load and parse a TOML config file.
///
/// If `explicit_path` is `Some`, the file must exist (error if not).
/// If `explicit_path` is `None`, the default path is tried and missing file
/// is treated as empty config.
fn load_config_file(explicit_path: Option<&Path>) -> Result<ConfigFile, ConfigError> {
    let path = if let Some(p) = explicit_path {
        let contents = std::fs::read_to_string(p).map_err(|e| ConfigError::ReadFile {
            path: p.to_path_buf(),
            source: e,
        })?;
        return Ok(toml::from_str(&contents)?);
    } else {
        let Some(config_dir) = dirs::config_dir() else {
            return Ok(ConfigFile::default());
        };
        config_dir.join("fieldnotes").join("config.toml")
    };

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}
