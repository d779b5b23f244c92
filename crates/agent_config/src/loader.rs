use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::debug;

use crate::error::ConfigError;
use crate::paths::{agent_path, CONFIG_FILE_NAME, SYSTEM_OVERVIEW_FILE};
use crate::persona::{parse_persona, AgentPersona};
use crate::schema::AppConfig;

/// Overview used when the config dir has no `system_overview.md`.
pub const DEFAULT_SYSTEM_OVERVIEW: &str = "\
You are aish, a terminal assistant that helps with shell tasks.

Keep answers short and concise.

To run a shell command, wrap it in execute tags: <execute>ls -la</execute>.
Each command is shown to the user, who must approve it before it runs.
Command output is sent back to you as a system message.
Use <think>...</think> for private reasoning; it is never shown.
End your message with <user> when you need input from the user.
End your message with <end> when the task is complete.";

pub fn load_app_config(config_dir: &Path) -> Result<AppConfig, ConfigError> {
    let path = config_dir.join(CONFIG_FILE_NAME);
    let raw = fs::read_to_string(&path).map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            ConfigError::MissingConfigFile { path: path.clone() }
        } else {
            ConfigError::io("reading config file", &path, source)
        }
    })?;

    let config: AppConfig =
        serde_json::from_str(&raw).map_err(|source| ConfigError::json(&path, source))?;
    if config.connections.is_empty() {
        return Err(ConfigError::NoConnections { path });
    }

    debug!(
        path = %path.display(),
        connections = config.connections.len(),
        "loaded config"
    );
    Ok(config)
}

pub fn load_persona(config_dir: &Path, agent: &str) -> Result<AgentPersona, ConfigError> {
    if agent.is_empty() || agent.contains(['/', '\\']) || agent.starts_with('.') {
        return Err(ConfigError::InvalidAgentName {
            name: agent.to_string(),
        });
    }

    let path = agent_path(config_dir, agent);
    let raw = fs::read_to_string(&path).map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            ConfigError::UnknownAgent {
                name: agent.to_string(),
                path: path.clone(),
            }
        } else {
            ConfigError::io("reading agent file", &path, source)
        }
    })?;

    Ok(parse_persona(agent, &raw))
}

/// Reads `system_overview.md`, falling back to [`DEFAULT_SYSTEM_OVERVIEW`].
pub fn load_system_overview(config_dir: &Path) -> Result<String, ConfigError> {
    let path = config_dir.join(SYSTEM_OVERVIEW_FILE);
    match fs::read_to_string(&path) {
        Ok(text) => Ok(text),
        Err(source) if source.kind() == ErrorKind::NotFound => {
            Ok(DEFAULT_SYSTEM_OVERVIEW.to_string())
        }
        Err(source) => Err(ConfigError::io("reading system overview", &path, source)),
    }
}
