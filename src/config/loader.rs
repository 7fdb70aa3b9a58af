//! Configuration loader with file resolution and environment override support.

use super::error::{ConfigError, ConfigResult};
use super::schema::Config;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Environment variable prefix for overrides
const ENV_PREFIX: &str = "SERIAL_MONITOR";

/// Config file name inside the platform config directory
const CONFIG_FILE_NAME: &str = "config.toml";

/// Config file name looked up in the current directory
const LOCAL_CONFIG_FILE_NAME: &str = "serial-monitor.toml";

/// Environment variable for explicit config path
const CONFIG_PATH_ENV: &str = "SERIAL_MONITOR_CONFIG";

/// Configuration loader with resolution and override logic.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Resolved config file path (if any)
    pub config_path: Option<PathBuf>,
    /// The loaded configuration
    pub config: Config,
}

impl ConfigLoader {
    /// Load configuration using standard resolution order.
    ///
    /// Resolution priority (highest to lowest):
    /// 1. `SERIAL_MONITOR_CONFIG` environment variable (explicit path)
    /// 2. `./serial-monitor.toml` (current directory)
    /// 3. `<platform config dir>/serial-monitor/config.toml`
    /// 4. Built-in defaults (no file required)
    ///
    /// Environment variables override file values. A `SERIAL_MONITOR_CONFIG`
    /// that names a missing file is an error, not a silent fallback.
    pub fn load() -> ConfigResult<Self> {
        let config_path = resolve_config_path()?;

        let mut config = match config_path {
            Some(ref path) => load_from_file(path)?,
            None => Config::default(),
        };

        apply_env_overrides(&mut config)?;
        config.validate()?;

        Ok(Self {
            config_path,
            config,
        })
    }

    /// Load configuration from a specific file path.
    ///
    /// Unlike [`ConfigLoader::load`], a missing file is an error here.
    pub fn load_from(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(ConfigError::NotFound(path));
        }

        let mut config = load_from_file(&path)?;
        apply_env_overrides(&mut config)?;
        config.validate()?;

        Ok(Self {
            config_path: Some(path),
            config,
        })
    }

    /// Create a loader with default configuration (no file).
    pub fn with_defaults() -> Self {
        let mut config = Config::default();
        // Still apply env overrides even with defaults
        if let Err(e) = apply_env_overrides(&mut config) {
            tracing::warn!(error = %e, "ignoring environment overrides");
            config = Config::default();
        }

        Self {
            config_path: None,
            config,
        }
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Consume the loader and return the configuration.
    pub fn into_config(self) -> Config {
        self.config
    }
}

/// Resolve the configuration file path using standard locations.
///
/// Returns `Ok(None)` when no file exists and defaults apply.
pub fn resolve_config_path() -> ConfigResult<Option<PathBuf>> {
    // 1. Explicit environment variable
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(path);
        if !path.exists() {
            return Err(ConfigError::NotFound(path));
        }
        return Ok(Some(path));
    }

    // 2. Current directory
    let cwd_config = PathBuf::from(LOCAL_CONFIG_FILE_NAME);
    if cwd_config.exists() {
        return Ok(Some(cwd_config));
    }

    // 3. Platform config directory
    if let Some(app_config) = get_default_config_path() {
        if app_config.exists() {
            return Ok(Some(app_config));
        }
    }

    // 4. No config file found - will use defaults
    Ok(None)
}

/// Get the default config directory (`~/.config/serial-monitor` on Linux).
pub fn get_default_config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "serial-monitor")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the default config file path.
pub fn get_default_config_path() -> Option<PathBuf> {
    get_default_config_dir().map(|d| d.join(CONFIG_FILE_NAME))
}

/// Load configuration from a file.
fn load_from_file(path: &Path) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    tracing::debug!(path = %path.display(), "loaded configuration file");
    toml::from_str(&content).map_err(ConfigError::ParseError)
}

fn env_key(key: &str) -> String {
    format!("{}_{}", ENV_PREFIX, key)
}

fn parse_env<T: FromStr>(key: &str, value: &str, what: &str) -> ConfigResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::env_parse(env_key(key), format!("Invalid {what}: '{value}'")))
}

/// Apply environment variable overrides to the configuration.
///
/// Environment variables follow the pattern: `SERIAL_MONITOR_<SECTION>_<KEY>`
/// For example:
/// - `SERIAL_MONITOR_SERIAL_PORT=/dev/ttyUSB0`
/// - `SERIAL_MONITOR_SERIAL_BAUD=9600`
/// - `SERIAL_MONITOR_LOGGING_LEVEL=debug`
fn apply_env_overrides(config: &mut Config) -> ConfigResult<()> {
    // Serial overrides
    if let Ok(val) = std::env::var(env_key("SERIAL_PORT")) {
        config.serial.port = val;
    }
    if let Ok(val) = std::env::var(env_key("SERIAL_BAUD")) {
        config.serial.baud = parse_env("SERIAL_BAUD", &val, "baud rate")?;
    }
    if let Ok(val) = std::env::var(env_key("SERIAL_TIMEOUT_MS")) {
        config.serial.timeout_ms = parse_env("SERIAL_TIMEOUT_MS", &val, "timeout")?;
    }
    if let Ok(val) = std::env::var(env_key("SERIAL_SETTLE_DELAY_MS")) {
        config.serial.settle_delay_ms = parse_env("SERIAL_SETTLE_DELAY_MS", &val, "delay")?;
    }

    // Logging overrides
    if let Ok(val) = std::env::var(env_key("LOGGING_LEVEL")) {
        config.logging.level = val;
    }

    Ok(())
}
