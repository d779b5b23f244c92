use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::ConfigError;
use crate::loader::{load_app_config, load_persona, load_system_overview};
use crate::persona::AgentPersona;
use crate::paths::CONFIG_FILE_NAME;
use crate::schema::{AppConfig, Connection};

/// Explicit command-line selections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub agent: Option<String>,
    pub model: Option<String>,
    pub provider: Option<String>,
}

/// Selections read from the process environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    pub agent: Option<String>,
    pub model: Option<String>,
    pub provider: Option<String>,
}

impl EnvOverrides {
    pub const AGENT_VAR: &'static str = "AISH_AGENT";
    pub const MODEL_VAR: &'static str = "AISH_MODEL";
    pub const PROVIDER_VAR: &'static str = "AISH_PROVIDER";

    #[must_use]
    pub fn from_env() -> Self {
        Self {
            agent: env_string_opt(Self::AGENT_VAR),
            model: env_string_opt(Self::MODEL_VAR),
            provider: env_string_opt(Self::PROVIDER_VAR),
        }
    }
}

/// Everything a session needs from configuration, fully resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSettings {
    pub config_dir: PathBuf,
    pub persona: AgentPersona,
    pub system_overview: String,
    pub connection_name: String,
    pub connection: Connection,
    pub model: String,
    pub provider: String,
}

impl ResolvedSettings {
    #[must_use]
    pub fn agent_name(&self) -> &str {
        &self.persona.name
    }
}

/// Loads config and persona and applies selection precedence.
///
/// Agent: CLI, then env, then `default_agent`. Connection: the persona's
/// `connection`, else the first configured one. Model and provider: CLI,
/// then persona, then env, then connection.
pub fn resolve_settings(
    config_dir: &Path,
    overrides: &Overrides,
    env: &EnvOverrides,
) -> Result<ResolvedSettings, ConfigError> {
    let config = load_app_config(config_dir)?;

    let agent = first_non_empty([
        overrides.agent.as_deref(),
        env.agent.as_deref(),
        config.default_agent.as_deref(),
    ])
    .ok_or_else(|| ConfigError::NoAgent {
        path: config_dir.join(CONFIG_FILE_NAME),
    })?;

    let persona = load_persona(config_dir, &agent)?;
    let (connection_name, connection) = select_connection(&config, &persona)?;

    let model = first_non_empty([
        overrides.model.as_deref(),
        persona.metadata.model.as_deref(),
        env.model.as_deref(),
        Some(connection.model.as_str()),
    ])
    .unwrap_or_default();
    let provider = first_non_empty([
        overrides.provider.as_deref(),
        persona.metadata.provider.as_deref(),
        env.provider.as_deref(),
        Some(connection.provider.as_str()),
    ])
    .unwrap_or_default();

    info!(agent = %agent, connection = %connection_name, %model, %provider, "resolved settings");

    Ok(ResolvedSettings {
        config_dir: config_dir.to_path_buf(),
        system_overview: load_system_overview(config_dir)?,
        persona,
        connection_name,
        connection,
        model,
        provider,
    })
}

fn select_connection(
    config: &AppConfig,
    persona: &AgentPersona,
) -> Result<(String, Connection), ConfigError> {
    let named = match persona.metadata.connection.as_deref() {
        Some(name) => config
            .connection(name)
            .ok_or_else(|| ConfigError::UnknownConnection {
                agent: persona.name.clone(),
                connection: name.to_string(),
            })?,
        None => config
            .first_connection()
            .ok_or_else(|| ConfigError::NoConnections {
                path: PathBuf::from(CONFIG_FILE_NAME),
            })?,
    };

    Ok((named.name.clone(), named.connection.clone()))
}

fn first_non_empty<'a>(candidates: impl IntoIterator<Item = Option<&'a str>>) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

fn env_string_opt(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
