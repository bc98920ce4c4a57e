use std::path::PathBuf;

use roid_world::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DevtoolsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid devtools.toml: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid world configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("no world configuration named `{id}` in {}", dir.display())]
    ConfigNotFound { id: String, dir: PathBuf },
}
