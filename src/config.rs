//! Configuration file handling for card-scanner.
//!
//! Loads configuration from `<config dir>/card-scanner/config.toml` or a custom path.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::camera::{Facing, DEFAULT_JPEG_QUALITY};
use crate::compare::{HashType, DEFAULT_HASH_SIZE, DEFAULT_SERVER_URL};

/// Configuration file structure for card-scanner.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub hash: HashConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_server_url")]
    pub url: String,
    /// Whole-request timeout; none by default
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: default_server_url(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct HashConfig {
    #[serde(default)]
    pub hash_type: HashType,
    #[serde(default = "default_hash_size")]
    pub hash_size: u32,
    #[serde(default)]
    pub max_distance: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            hash_type: HashType::default(),
            hash_size: default_hash_size(),
            max_distance: None,
            limit: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CameraConfig {
    #[serde(default)]
    pub facing: Facing,
    #[serde(default)]
    pub mirror: bool,
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    /// How long to wait for the first frame before a capture gives up
    #[serde(default = "default_warmup_ms")]
    pub warmup_ms: u64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            facing: Facing::default(),
            mirror: false,
            jpeg_quality: default_jpeg_quality(),
            width: default_width(),
            height: default_height(),
            warmup_ms: default_warmup_ms(),
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct DisplayConfig {
    #[serde(default)]
    pub localized_names: bool,
}

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

fn default_hash_size() -> u32 {
    DEFAULT_HASH_SIZE
}

fn default_jpeg_quality() -> u8 {
    DEFAULT_JPEG_QUALITY
}

fn default_width() -> u32 {
    640
}

fn default_height() -> u32 {
    480
}

fn default_warmup_ms() -> u64 {
    3000
}

/// Commented default configuration written by `config init`.
pub const DEFAULT_CONFIG_TOML: &str = r#"# card-scanner configuration

[server]
# Base URL of the comparison server (POST <url>/compare)
url = "http://127.0.0.1:5000"
# Give up on a request after this many seconds (no limit when unset)
# timeout_secs = 30

[hash]
# Algorithm: phash, dhash, ahash, whash
hash_type = "phash"
hash_size = 16
# Only report matches within this distance
# max_distance = 10
# Maximum number of matches to return
# limit = 5

[camera]
# Preferred camera: user (front) or environment (rear)
facing = "environment"
# Mirror horizontally (selfie mode)
mirror = false
# JPEG quality of captured frames (1-100)
jpeg_quality = 90
width = 640
height = 480
# Milliseconds to wait for the first frame
warmup_ms = 3000

[display]
# Prefer French card names when available
localized_names = false
"#;

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if path.exists() {
            Self::load_from_explicit(&path)
        } else {
            Ok(Config::default())
        }
    }

    /// Load configuration from a path that must exist.
    pub fn load_from_explicit(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Apply `--server` and `CARD_SCANNER_SERVER` on top of the loaded file.
    pub fn apply_overrides(&mut self, cli_server: Option<&str>) {
        let env = std::env::var(crate::compare::SERVER_URL_ENV).ok();
        self.override_server(cli_server, env.as_deref());
    }

    /// Pick the server URL: CLI, then environment, then the current value.
    /// Blank overrides are ignored.
    pub fn override_server(&mut self, cli: Option<&str>, env: Option<&str>) {
        let chosen = [cli, env]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|url| !url.is_empty());
        if let Some(url) = chosen {
            self.server.url = url.to_string();
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError { path, source } => {
                write!(
                    f,
                    "Failed to read config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::ParseError { path, source } => {
                write!(
                    f,
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    source
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::IoError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
        }
    }
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("card-scanner").join("config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/card-scanner/config.toml")
        })
}
