//! Configuration loading and root folder resolution
//!
//! Two tiers:
//! 1. **TOML bootstrap**: root folder, bind address, port, lyrics API, logging
//! 2. **Compiled defaults**: used for anything the TOML file leaves out
//!
//! Root folder priority order:
//! 1. Command-line argument (highest priority)
//! 2. `LYRICNOTE_ROOT_FOLDER` environment variable
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing or unreadable config file never terminates startup; it is logged
//! and the defaults are used.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "LYRICNOTE_ROOT_FOLDER";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "lyricnote.db";

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 5780;

/// Default lyrics API base URL
pub const DEFAULT_LYRICS_API_BASE: &str = "https://lrclib.net/api";

/// Default minimum interval between lyrics API requests
pub const DEFAULT_LYRICS_RATE_LIMIT_MS: u64 = 200;

/// Bootstrap configuration loaded from TOML file
///
/// Cannot change while running; restart to pick up edits.
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    /// Root folder holding the database
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// Address to bind the HTTP server to
    #[serde(default = "default_bind")]
    pub bind: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Base URL of the lrclib-compatible lyrics API
    #[serde(default = "default_lyrics_api_base")]
    pub lyrics_api_base: String,

    /// Minimum milliseconds between lyrics API requests
    #[serde(default = "default_lyrics_rate_limit_ms")]
    pub lyrics_rate_limit_ms: u64,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            root_folder: None,
            bind: default_bind(),
            port: default_port(),
            lyrics_api_base: default_lyrics_api_base(),
            lyrics_rate_limit_ms: default_lyrics_rate_limit_ms(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
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

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_lyrics_api_base() -> String {
    DEFAULT_LYRICS_API_BASE.to_string()
}

fn default_lyrics_rate_limit_ms() -> u64 {
    DEFAULT_LYRICS_RATE_LIMIT_MS
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))
    }

    /// Load the platform config file, or defaults if there is none
    pub fn load() -> Result<Self> {
        Self::load_from(config_file_path().as_deref())
    }

    /// Load `path` if given, otherwise defaults
    ///
    /// A file that cannot be read or parsed is an error naming the path, so
    /// the caller can log it once tracing is installed.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            debug!("No config file found, using defaults");
            return Ok(Self::default());
        };

        let config = Self::from_file(path).map_err(|e| match e {
            Error::Config(msg) => Error::Config(format!("{}: {}", path.display(), msg)),
            other => Error::Config(format!("{}: {}", path.display(), other)),
        })?;
        debug!("Loaded config file: {}", path.display());
        Ok(config)
    }
}

/// Locate the config file for the platform, if one exists
///
/// Linux checks `~/.config/lyricnote/config.toml`, then
/// `/etc/lyricnote/config.toml`. Other platforms use the user config dir only.
pub fn config_file_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("lyricnote").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/lyricnote/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Built-in defaults for the current platform
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub log_level: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        Self {
            root_folder: default_root_folder(),
            log_level: default_log_level(),
        }
    }
}

/// Get OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/lyricnote
        dirs::data_local_dir()
            .map(|d| d.join("lyricnote"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/lyricnote"))
    } else if cfg!(target_os = "macos") {
        // ~/Library/Application Support/lyricnote
        dirs::data_dir()
            .map(|d| d.join("lyricnote"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/lyricnote"))
    } else if cfg!(target_os = "windows") {
        // %LOCALAPPDATA%\lyricnote
        dirs::data_local_dir()
            .map(|d| d.join("lyricnote"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\lyricnote"))
    } else {
        PathBuf::from("./lyricnote_data")
    }
}

/// Resolves the root folder from CLI, environment, TOML, then defaults
#[derive(Debug, Clone, Default)]
pub struct RootFolderResolver {
    cli_arg: Option<PathBuf>,
    toml_root: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Highest priority override from the command line
    pub fn with_cli_arg(mut self, path: Option<PathBuf>) -> Self {
        self.cli_arg = path;
        self
    }

    /// Value read from the TOML config file
    pub fn with_toml_root(mut self, path: Option<PathBuf>) -> Self {
        self.toml_root = path;
        self
    }

    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            return path.clone();
        }

        if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
            if !path.trim().is_empty() {
                return PathBuf::from(path);
            }
        }

        if let Some(path) = &self.toml_root {
            return path.clone();
        }

        CompiledDefaults::for_current_platform().root_folder
    }
}

/// Creates the root folder and locates files inside it
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

    /// Create the root folder if missing (idempotent)
    pub fn ensure_directory_exists(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root_folder)?;
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE)
    }

    pub fn database_exists(&self) -> bool {
        self.database_path().exists()
    }
}
