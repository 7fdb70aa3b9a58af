//! Configuration module for the serial monitor.
//!
//! This module provides TOML-based configuration with environment variable
//! overrides. With no file and no variables the compiled-in defaults apply.
//!
//! # Configuration Resolution
//!
//! 1. `--config <path>` on the command line
//! 2. `SERIAL_MONITOR_CONFIG` environment variable (explicit path, must exist)
//! 3. `./serial-monitor.toml` (current directory)
//! 4. `<platform config dir>/serial-monitor/config.toml`
//! 5. Built-in defaults (no file required)
//!
//! # Environment Overrides
//!
//! The pattern is: `SERIAL_MONITOR_<SECTION>_<KEY>`
//!
//! - `SERIAL_MONITOR_SERIAL_PORT=/dev/ttyUSB0`
//! - `SERIAL_MONITOR_SERIAL_BAUD=9600`
//! - `SERIAL_MONITOR_SERIAL_TIMEOUT_MS=1000`
//! - `SERIAL_MONITOR_SERIAL_SETTLE_DELAY_MS=500`
//! - `SERIAL_MONITOR_LOGGING_LEVEL=debug`
//!
//! # Example
//!
//! ```rust,ignore
//! use serial_line_monitor::config::ConfigLoader;
//!
//! let loader = ConfigLoader::load()?;
//! let monitor_config = loader.config().monitor_config();
//! println!("Port: {}", monitor_config.port);
//! ```

mod error;
mod loader;
mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{
    get_default_config_dir, get_default_config_path, resolve_config_path, ConfigLoader,
};
pub use schema::{Config, LogFormat, LoggingConfig, SerialConfig};
