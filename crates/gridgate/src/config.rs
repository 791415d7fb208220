//! Harness configuration
//!
//! Stored as TOML. Every field has a default, so a partial file (or no file
//! at all) is a valid configuration:
//!
//! ```toml
//! data_file = "data/TestData.xlsx"
//! report_dir = "reports"
//! log_level = "info"
//!
//! [control]
//! sheet = "TestSuite"
//! tcid_column = "TCID"
//! runmode_column = "Runmode"
//! ```
//!
//! Relative paths are resolved against the directory holding the config
//! file, not the process working directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::gate::ControlSheet;

/// Default config file name looked up by the CLI
pub const DEFAULT_CONFIG_FILE: &str = "gridgate.toml";

/// Harness configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Workbook holding test data and the control sheet
    pub data_file: PathBuf,

    /// Directory receiving JSON run reports
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_dir: Option<PathBuf>,

    /// Default log filter when `RUST_LOG` is unset
    pub log_level: String,

    /// Control sheet layout
    pub control: ControlSheet,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("data/TestData.xlsx"),
            report_dir: None,
            log_level: "info".to_string(),
            control: ControlSheet::default(),
        }
    }
}

impl HarnessConfig {
    /// Load configuration from file
    ///
    /// A missing file gives the defaults, resolved against the directory the
    /// file would have been in.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            toml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?
        } else {
            log::debug!("{} not found, using default configuration", path.display());
            Self::default()
        };

        config.validate()?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(config.resolved_against(base))
    }

    /// Parse configuration from a TOML string, leaving paths as written
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        let io_err = |source: std::io::Error| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        std::fs::write(path, content).map_err(io_err)?;
        Ok(())
    }

    /// Make relative paths relative to `base`
    pub fn resolved_against(mut self, base: &Path) -> Self {
        if self.data_file.is_relative() {
            self.data_file = base.join(&self.data_file);
        }
        if let Some(dir) = self.report_dir.take() {
            self.report_dir = Some(if dir.is_relative() {
                base.join(dir)
            } else {
                dir
            });
        }
        self
    }

    /// Check that required values are present
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_file.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("data_file must not be empty".into()));
        }
        let control = &self.control;
        for (field, value) in [
            ("control.sheet", &control.sheet),
            ("control.tcid_column", &control.tcid_column),
            ("control.runmode_column", &control.runmode_column),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{} must not be empty", field)));
            }
        }
        Ok(())
    }
}
