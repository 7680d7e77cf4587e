use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::stepper::PACING_DELAY;

/// How the board reaches the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transport {
    /// In-process calls on an owned engine.
    Direct,
    /// Named JSON commands to an engine host worker.
    #[default]
    Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub transport: Transport,
    /// Loaded after the engine starts; the standard start position otherwise.
    pub start_fen: Option<String>,
    pub search_depth: u8,
    pub pacing_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            transport: Transport::default(),
            start_fen: None,
            search_depth: 3,
            pacing_ms: PACING_DELAY.as_millis() as u64,
        }
    }
}

impl AppConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }
}
