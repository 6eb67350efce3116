//! triviaqr runtime configuration handling

use crate::error::{Error, Result};
use crate::generator::GeneratorConfig;
use crate::qr::{EcLevel, EncodeOptions, RgbColor};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level configuration structure persisted to disk or environment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Range, naming and failure policy
    pub batch: BatchOptions,
    /// Symbol rendering
    pub render: RenderOptions,
    /// Logging configuration
    pub logging: LoggingOptions,
}

impl AppConfig {
    /// Load configuration from an explicit path or fall back to discovered defaults.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = if let Some(path) = explicit_path {
            Self::from_file(path)?
        } else if let Some(path) = Self::discover_file()? {
            tracing::info!("Using configuration file: {}", path.display());
            Self::from_file(&path)?
        } else {
            tracing::debug!("No triviaqr.toml / triviaqr.yaml found, using defaults");
            Self::default()
        };

        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Attempt to locate a configuration file in common locations.
    fn discover_file() -> Result<Option<PathBuf>> {
        let cwd =
            env::current_dir().map_err(|e| Error::Config(format!("Failed to read cwd: {e}")))?;
        for candidate in ["triviaqr.toml", "triviaqr.yaml", "triviaqr.yml"] {
            let path = cwd.join(candidate);
            if path.exists() {
                return Ok(Some(path));
            }
        }

        if let Some(xdg_config) = env::var_os("XDG_CONFIG_HOME") {
            let base = PathBuf::from(xdg_config).join("triviaqr");
            for candidate in ["config.toml", "config.yaml"] {
                let path = base.join(candidate);
                if path.exists() {
                    return Ok(Some(path));
                }
            }
        }

        Ok(None)
    }

    /// Read configuration from a concrete file path.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {e}", path.display())))?;

        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_ascii_lowercase()
            .as_str()
        {
            "toml" => toml::from_str(&contents).map_err(|e| {
                Error::Config(format!("Failed to parse TOML {}: {e}", path.display()))
            }),
            "yaml" | "yml" => serde_yaml::from_str(&contents).map_err(|e| {
                Error::Config(format!("Failed to parse YAML {}: {e}", path.display()))
            }),
            other => Err(Error::Config(format!(
                "Unsupported config format '{}', expected toml/yaml",
                other
            ))),
        }
    }

    /// Apply environment variable overrides after file/default loading.
    fn apply_env_overrides(&mut self) -> Result<()> {
        self.batch.apply_env_overrides();
        self.render.apply_env_overrides()?;
        self.logging.apply_env_overrides();
        Ok(())
    }

    /// Produce a validated generator configuration.
    pub fn generator_config(&self) -> Result<GeneratorConfig> {
        let base_url = self.batch.base_url.clone().ok_or_else(|| {
            Error::Config(
                "base_url is not set; pass --base-url, set TRIVIAQR_BASE_URL or add it to triviaqr.toml"
                    .to_string(),
            )
        })?;

        let config = GeneratorConfig {
            base_url,
            output_dir: self.batch.output_dir.clone(),
            range_start: self.batch.range_start,
            range_end: self.batch.range_end,
            pad_width: self.batch.pad_width,
            keep_going: self.batch.keep_going,
            jobs: self.batch.jobs,
            encode: self.render.to_encode_options(),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Which items to generate and where
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchOptions {
    /// Base URL of the trivia pages; required
    pub base_url: Option<String>,
    /// Output directory for PNG files
    pub output_dir: PathBuf,
    /// First index, inclusive
    pub range_start: u32,
    /// Last index, inclusive
    pub range_end: u32,
    /// Zero-pad width of identifiers
    pub pad_width: usize,
    /// Continue past failed items and report them at the end
    pub keep_going: bool,
    /// Number of items encoded concurrently
    pub jobs: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            base_url: None,
            output_dir: PathBuf::from("qrcodes"),
            range_start: 1,
            range_end: 50,
            pad_width: 3,
            keep_going: false,
            jobs: 1,
        }
    }
}

impl BatchOptions {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(url) = env::var("TRIVIAQR_BASE_URL") {
            self.base_url = Some(url);
        }
        if let Ok(dir) = env::var("TRIVIAQR_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }
        if let Ok(start) = env::var("TRIVIAQR_RANGE_START") {
            if let Ok(parsed) = start.parse::<u32>() {
                self.range_start = parsed;
            }
        }
        if let Ok(end) = env::var("TRIVIAQR_RANGE_END") {
            if let Ok(parsed) = end.parse::<u32>() {
                self.range_end = parsed;
            }
        }
        if let Ok(width) = env::var("TRIVIAQR_PAD_WIDTH") {
            if let Ok(parsed) = width.parse::<usize>() {
                self.pad_width = parsed;
            }
        }
        if let Ok(jobs) = env::var("TRIVIAQR_JOBS") {
            if let Ok(parsed) = jobs.parse::<usize>() {
                self.jobs = parsed.max(1);
            }
        }
        if let Ok(keep_going) = env::var("TRIVIAQR_KEEP_GOING") {
            if let Some(flag) = parse_flag(&keep_going) {
                self.keep_going = flag;
            }
        }
    }
}

/// Symbol rendering parameters as written in the config file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Error correction level
    pub ec_level: EcLevel,
    /// Pixels per module
    pub module_size: u32,
    /// Border width in modules
    pub border: u32,
    /// Dark module color
    pub fill: RgbColor,
    /// Background color
    pub background: RgbColor,
}

impl Default for RenderOptions {
    fn default() -> Self {
        let defaults = EncodeOptions::default();
        Self {
            ec_level: defaults.ec_level,
            module_size: defaults.module_size,
            border: defaults.border,
            fill: defaults.fill,
            background: defaults.background,
        }
    }
}

impl RenderOptions {
    pub(crate) fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(level) = env::var("TRIVIAQR_EC_LEVEL") {
            self.ec_level = level.parse::<EcLevel>().map_err(Error::Config)?;
        }
        if let Ok(size) = env::var("TRIVIAQR_MODULE_SIZE") {
            if let Ok(parsed) = size.parse::<u32>() {
                self.module_size = parsed.max(1);
            }
        }
        if let Ok(border) = env::var("TRIVIAQR_BORDER") {
            if let Ok(parsed) = border.parse::<u32>() {
                self.border = parsed;
            }
        }
        if let Ok(fill) = env::var("TRIVIAQR_FILL") {
            self.fill = RgbColor::parse(&fill)?;
        }
        if let Ok(background) = env::var("TRIVIAQR_BACKGROUND") {
            self.background = RgbColor::parse(&background)?;
        }
        Ok(())
    }

    /// Options handed to the encoder
    pub fn to_encode_options(&self) -> EncodeOptions {
        EncodeOptions {
            ec_level: self.ec_level,
            module_size: self.module_size,
            border: self.border,
            fill: self.fill,
            background: self.background,
        }
    }
}

/// Structured logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingOptions {
    /// Default log level (overridable via `TRIVIAQR_LOG_LEVEL`)
    pub level: String,
    /// Optional log file path for teeing structured logs
    pub file: Option<PathBuf>,
    /// Force ANSI colors in console logging
    pub color: bool,
    /// Optional log rotation strategy applied to `file`
    pub rotation: Option<LogRotation>,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            color: true,
            rotation: None,
        }
    }
}

impl LoggingOptions {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(level) = env::var("TRIVIAQR_LOG_LEVEL") {
            self.level = level;
        }
        if let Ok(file) = env::var("TRIVIAQR_LOG_FILE") {
            self.file = Some(PathBuf::from(file));
        }
        if let Ok(color) = env::var("TRIVIAQR_LOG_COLOR") {
            if let Some(flag) = parse_flag(&color) {
                self.color = flag;
            }
        }
        if let Ok(rotation) = env::var("TRIVIAQR_LOG_ROTATION") {
            if let Some(parsed) = LogRotation::from_str(&rotation) {
                self.rotation = Some(parsed);
            }
        }
    }
}

/// Supported log rotation policies for file sinks
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    /// Rotate log files once per hour
    Hourly,
    /// Rotate log files once per day
    Daily,
}

impl LogRotation {
    fn from_str(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "hourly" => Some(Self::Hourly),
            "daily" => Some(Self::Daily),
            _ => None,
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}
