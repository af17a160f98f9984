//! Configuration loading and root folder resolution
//!
//! Root folder priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable `SONGSMITH_ROOT_FOLDER`
//! 3. TOML config file (`root_folder` key)
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing or broken TOML file never stops startup: a warning is logged and
//! compiled defaults apply.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "SONGSMITH_ROOT_FOLDER";

/// Database file name inside the root folder
pub const DATABASE_FILE_NAME: &str = "songsmith.db";

/// Default HTTP port of the studio service
pub const DEFAULT_PORT: u16 = 5740;

/// Compiled fallback values used when nothing else is configured
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub log_level: String,
    pub bind_address: String,
    pub port: u16,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        Self {
            root_folder: default_root_folder(),
            log_level: "info".to_string(),
            bind_address: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// `[logging]` table of the TOML file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Contents of `songsmith.toml`
///
/// Every field is optional so that partial files stay valid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub root_folder: Option<PathBuf>,
    #[serde(default)]
    pub logging: LoggingConfig,
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub generation_api_key: Option<String>,
    pub generation_model: Option<String>,
    pub generation_endpoint: Option<String>,
    pub thesaurus_endpoint: Option<String>,
}

impl TomlConfig {
    /// Parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read TOML failed ({}): {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))
    }

    /// Load the config file if present, falling back to defaults
    ///
    /// Never fails. The returned [`ConfigOrigin`] tells the caller what
    /// happened so it can be logged once tracing is up (the log level itself
    /// comes from this file).
    pub fn load_or_default(path: Option<&Path>) -> (Self, ConfigOrigin) {
        let Some(path) = path else {
            return (Self::default(), ConfigOrigin::Defaults);
        };

        if !path.exists() {
            return (Self::default(), ConfigOrigin::Missing(path.to_path_buf()));
        }

        match Self::load(path) {
            Ok(config) => (config, ConfigOrigin::File(path.to_path_buf())),
            Err(e) => (Self::default(), ConfigOrigin::Invalid(e.to_string())),
        }
    }
}

/// Outcome of [`TomlConfig::load_or_default`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    /// Parsed from this file
    File(PathBuf),
    /// No file at this path
    Missing(PathBuf),
    /// File exists but could not be read or parsed
    Invalid(String),
    /// No config directory on this platform
    Defaults,
}

impl ConfigOrigin {
    /// Log the outcome; a broken file is a warning, never fatal
    pub fn log(&self) {
        match self {
            ConfigOrigin::File(path) => info!("Loaded config file: {}", path.display()),
            ConfigOrigin::Missing(path) => {
                info!("Config file not found at {}, using compiled defaults", path.display())
            }
            ConfigOrigin::Invalid(reason) => {
                warn!("{} - continuing with compiled defaults", reason)
            }
            ConfigOrigin::Defaults => info!("No config directory available, using compiled defaults"),
        }
    }
}

/// Default location of the TOML config file (`~/.config/songsmith/songsmith.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("songsmith").join("songsmith.toml"))
}

/// Resolves the root folder from CLI, environment, TOML and defaults
#[derive(Debug, Clone)]
pub struct RootFolderResolver {
    cli_arg: Option<PathBuf>,
    toml_root: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new(cli_arg: Option<PathBuf>, toml_config: &TomlConfig) -> Self {
        Self {
            cli_arg,
            toml_root: toml_config.root_folder.clone(),
        }
    }

    /// Resolve the root folder following the priority order
    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            info!("Root folder from command line: {}", path.display());
            return path.clone();
        }

        if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
            if !path.trim().is_empty() {
                info!("Root folder from {}: {}", ROOT_FOLDER_ENV, path);
                return PathBuf::from(path);
            }
        }

        if let Some(path) = &self.toml_root {
            info!("Root folder from TOML config: {}", path.display());
            return path.clone();
        }

        let path = CompiledDefaults::for_current_platform().root_folder;
        info!("Root folder from compiled default: {}", path.display());
        path
    }
}

/// Creates the root folder and derives paths inside it
#[derive(Debug, Clone)]
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }

    /// Create the root folder (and parents) if missing
    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root_folder.exists() {
            std::fs::create_dir_all(&self.root_folder)?;
            info!("Created root folder: {}", self.root_folder.display());
        }
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE_NAME)
    }
}

/// OS-dependent default root folder
fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("songsmith"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\songsmith"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("songsmith"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/songsmith"))
    } else {
        dirs::data_local_dir()
            .map(|d| d.join("songsmith"))
            .unwrap_or_else(|| PathBuf::from("./songsmith_data"))
    }
}
