use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::redact::{RedactOptions, RedactionPolicy};

/// Top-level configuration for the exif-redact tool.
///
/// Controls which metadata categories are removed, redaction options, and
/// output behavior (dry run, backups, output directory).
///
/// # Loading
///
/// ```rust,no_run
/// use exif_redact::config::Config;
///
/// // From a JSON file
/// let config = Config::load(Some("config.json".as_ref())).unwrap();
///
/// // Or use defaults and customize
/// let mut config = Config::default();
/// config.policy.remove_camera_info = false;
/// config.options.recompute_png_crc = true;
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Which metadata categories to remove.
    pub policy: RedactionPolicy,
    /// PNG checksum, out-of-line scrubbing and bare-TIFF chunk handling.
    pub options: RedactOptions,
    /// Output behavior (dry run, backups, output directory).
    pub output: OutputConfig,
}

/// Output and behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// If `true`, report what would be redacted without modifying any files.
    pub dry_run: bool,
    /// If `true`, create a `.bak` backup before overwriting an image in place.
    pub backup_originals: bool,
    /// Write redacted copies into this directory instead of overwriting.
    pub output_dir: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            backup_originals: true,
            output_dir: None,
        }
    }
}

impl Config {
    /// A fresh config as written by `--init`: every category enabled.
    pub fn initial() -> Self {
        Self {
            policy: RedactionPolicy::all(),
            ..Self::default()
        }
    }

    /// Resolve the config file path — same directory as the executable.
    pub fn config_path() -> Result<PathBuf> {
        let exe_path = std::env::current_exe().context("Failed to get executable path")?;
        let exe_dir = exe_path
            .parent()
            .context("Failed to get executable directory")?;
        Ok(exe_dir.join("config.json"))
    }

    /// Load config from the given path, or from the default location.
    ///
    /// A missing file yields [`Config::initial`].
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        if !config_path.exists() {
            log::warn!(
                "Config file not found at {}. Using defaults.",
                config_path.display()
            );
            return Ok(Self::initial());
        }

        let contents =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;
        let config: Config =
            serde_json::from_str(&contents).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Save config to the given path, or to the default location.
    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&config_path, contents).context("Failed to write config file")?;
        log::info!("Config saved to {}", config_path.display());
        Ok(())
    }
}
