use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use stepwise_util::errors::{StepwiseError, StepwiseResult};

/// Global user configuration loaded from `~/.stepwise/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub plan: PlanConfig,
}

/// How command results are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Output settings from `[output]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

/// Plan settings from `[plan]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanConfig {
    /// Treat unsatisfied requirements as a failed command.
    #[serde(default = "default_fail_on_unsatisfied", rename = "fail-on-unsatisfied")]
    pub fail_on_unsatisfied: bool,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            fail_on_unsatisfied: default_fail_on_unsatisfied(),
        }
    }
}

fn default_fail_on_unsatisfied() -> bool {
    true
}

impl GlobalConfig {
    /// Load the global configuration from the default path, or return defaults if the file doesn't exist.
    pub fn load() -> StepwiseResult<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load the configuration at `path`, or return defaults if the file doesn't exist.
    pub fn load_from(path: &Path) -> StepwiseResult<Self> {
        if !path.is_file() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| StepwiseError::Config {
            message: format!("Failed to read global config: {e}"),
        })?;
        toml::from_str(&content).map_err(|e| StepwiseError::Config {
            message: format!("Failed to parse global config: {e}"),
        })
    }

    /// Returns the default path to the global config file.
    pub fn default_path() -> PathBuf {
        dirs_path().join("config.toml")
    }
}

/// Returns the stepwise data directory: `$STEPWISE_HOME`, else `~/.stepwise/`.
pub fn dirs_path() -> PathBuf {
    if let Ok(dir) = std::env::var("STEPWISE_HOME") {
        return PathBuf::from(dir);
    }
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    Path::new(&home).join(".stepwise")
}
