//! Calculator configuration.
//!
//! All tunables live in one [`CalcConfig`] that can be loaded from TOML at
//! startup. Every field has a default, so `CalcConfig::default()` runs the
//! calculator out of the box. Validation is eager: the CLI calls
//! [`CalcConfig::validate`] before constructing the engine and aborts on
//! failure, so no operation can run under an invalid configuration.
//!
//! ```toml
//! # tally.toml
//! base_dir = "/home/me/.tally"
//! max_history_size = 500
//! autosave = true
//!
//! [input]
//! max_magnitude = "1000000000000"
//! precision = 10
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tally_core::value::InputPolicy;
use tally_core::{CalcError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalcConfig {
    /// Directory under which history and log files live by default.
    pub base_dir: PathBuf,
    /// History file location; defaults to `<base_dir>/history/history.jsonl`.
    pub history_file: Option<PathBuf>,
    /// Log file location; defaults to `<base_dir>/logs/tally.log`.
    pub log_file: Option<PathBuf>,
    /// Maximum number of history records kept. Must be >= 1.
    pub max_history_size: usize,
    /// Save history automatically after every successful operation.
    pub autosave: bool,
    /// Operand bounds and precision.
    pub input: InputPolicy,
}

impl Default for CalcConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from(".tally"),
            history_file: None,
            log_file: None,
            max_history_size: 1000,
            autosave: false,
            input: InputPolicy::default(),
        }
    }
}

impl CalcConfig {
    /// Load from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| CalcError::config(format!("bad TOML config: {e}")))
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| CalcError::config(format!("cannot read {}: {e}", path.as_ref().display())))?;
        Self::from_toml_str(&content)
    }

    /// Effective history file path.
    #[must_use]
    pub fn history_file(&self) -> PathBuf {
        self.history_file
            .clone()
            .unwrap_or_else(|| self.base_dir.join("history").join("history.jsonl"))
    }

    /// Effective log file path.
    #[must_use]
    pub fn log_file(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.base_dir.join("logs").join("tally.log"))
    }

    /// Fail fast on invalid settings. Called once at startup, before any
    /// operation is reachable.
    pub fn validate(&self) -> Result<()> {
        if self.base_dir.as_os_str().is_empty() {
            return Err(CalcError::config("base_dir must not be empty"));
        }
        if self.max_history_size < 1 {
            return Err(CalcError::config("max_history_size must be >= 1"));
        }
        if self.input.max_magnitude <= rust_decimal::Decimal::ZERO {
            return Err(CalcError::config("input.max_magnitude must be positive"));
        }
        // rust_decimal cannot carry more than 28 fractional digits.
        if self.input.precision > 28 {
            return Err(CalcError::config("input.precision must be <= 28"));
        }
        Ok(())
    }

    /// Create the history and log parent directories.
    pub fn ensure_directories(&self) -> Result<()> {
        for file in [self.history_file(), self.log_file()] {
            if let Some(parent) = file.parent() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}
