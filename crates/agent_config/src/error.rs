use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error while {operation} at {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse JSON at {path}: {source}")]
    JsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("configuration file not found: {path}")]
    MissingConfigFile { path: PathBuf },

    #[error("no platform configuration directory is available; pass --config-dir")]
    NoConfigDir,

    #[error("agent '{name}' not found (expected {path})")]
    UnknownAgent { name: String, path: PathBuf },

    #[error("invalid agent name '{name}'")]
    InvalidAgentName { name: String },

    #[error("{path} defines no connections")]
    NoConnections { path: PathBuf },

    #[error("agent '{agent}' references unknown connection '{connection}'")]
    UnknownConnection { agent: String, connection: String },

    #[error("no agent selected: set default_agent in {path}, AISH_AGENT, or pass --agent")]
    NoAgent { path: PathBuf },
}

impl ConfigError {
    #[must_use]
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    #[must_use]
    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::JsonParse {
            path: path.into(),
            source,
        }
    }
}
