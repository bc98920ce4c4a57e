use serde::Deserialize;
use std::path::Path;

use crate::error::DevtoolsError;

#[derive(Debug, Default, Deserialize)]
pub struct DevtoolsConfig {
    #[serde(default)]
    pub paths: PathsSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Deserialize)]
pub struct PathsSection {
    /// Directory holding world configuration JSON files.
    #[serde(default = "default_configs_directory")]
    pub configs: String,
    /// Where generated worlds are written when `--out` is relative.
    #[serde(default = "default_output_directory")]
    pub output: String,
}

fn default_configs_directory() -> String {
    "configs".into()
}

fn default_output_directory() -> String {
    "output".into()
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            configs: default_configs_directory(),
            output: default_output_directory(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoggingSection {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl DevtoolsConfig {
    /// Load settings from `path`. A missing file yields the defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DevtoolsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }
}
