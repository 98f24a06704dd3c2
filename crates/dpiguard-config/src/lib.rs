//! dpiguard configuration
//!
//! Settings are loaded from `dpiguard.toml` in the working directory, then
//! overridden by `DPIGUARD_*` environment variables.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name.
pub const CONFIG_FILE: &str = "dpiguard.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct DpiGuardConfig {
    /// Scale application settings
    pub scale: ScaleConfig,
    /// Debounced render settings
    pub render: RenderConfig,
    /// Demo window settings
    pub window: WindowConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

/// Scale application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScaleConfig {
    /// Base size in pixels at scale 1.0
    pub base_unit_px: f64,
    /// DPI corresponding to scale 1.0, used to key resolution observers
    pub dpi_per_scale: f64,
}

/// Render coordination configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Quiet period before a burst of triggers renders, in milliseconds
    pub debounce_ms: u64,
    /// Also re-render on the host's own resize topic (generic viewport
    /// resizes always re-render)
    pub rerender_on_host_resize: bool,
}

/// Demo window configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log at debug level unless RUST_LOG says otherwise
    pub debug: bool,
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            base_unit_px: 16.0,
            dpi_per_scale: 96.0,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 200,
            rerender_on_host_resize: false,
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "dpiguard".to_string(),
        }
    }
}

fn parse_flag(val: &str) -> bool {
    val == "1" || val.eq_ignore_ascii_case("true")
}

impl DpiGuardConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration from `dpiguard.toml` in the current directory,
    /// or return the defaults if it is missing or broken
    pub fn load_or_default() -> Self {
        Self::load_from_file(CONFIG_FILE).unwrap_or_default()
    }

    /// Merge configuration with environment variables
    ///
    /// Environment variables take precedence over configuration file values.
    pub fn merge_with_env(&mut self) {
        self.merge_with(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup. Unparsable values are
    /// ignored.
    pub fn merge_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // Scale settings
        if let Some(px) = lookup("DPIGUARD_BASE_PX").and_then(|v| v.parse::<f64>().ok()) {
            self.scale.base_unit_px = px;
        }
        if let Some(dpi) = lookup("DPIGUARD_DPI_PER_SCALE").and_then(|v| v.parse::<f64>().ok()) {
            self.scale.dpi_per_scale = dpi;
        }

        // Render settings
        if let Some(ms) = lookup("DPIGUARD_DEBOUNCE_MS").and_then(|v| v.parse::<u64>().ok()) {
            self.render.debounce_ms = ms;
        }
        if let Some(val) = lookup("DPIGUARD_RERENDER_ON_RESIZE") {
            self.render.rerender_on_host_resize = parse_flag(&val);
        }

        if let Some(title) = lookup("DPIGUARD_TITLE") {
            self.window.title = title;
        }
        if let Some(val) = lookup("DPIGUARD_DEBUG") {
            self.logging.debug = parse_flag(&val);
        }
    }

    /// Load configuration with environment variable overrides
    ///
    /// 1. Load from dpiguard.toml (or use defaults if not found)
    /// 2. Override with environment variables if present
    pub fn load() -> Self {
        let mut config = Self::load_or_default();
        config.merge_with_env();
        config
    }
}
