//! Configuration loading for the `aish` session engine.
//!
//! Resolves the configuration directory, reads `aish.json`, parses agent
//! persona files, and applies the model/provider precedence rules.

mod error;
mod loader;
mod paths;
mod persona;
mod resolve;
mod schema;

pub use error::ConfigError;
pub use loader::{load_app_config, load_persona, load_system_overview, DEFAULT_SYSTEM_OVERVIEW};
pub use paths::{
    agent_path, context_module_path, resolve_config_dir, AGENTS_DIR, CONFIG_DIR_NAME,
    CONFIG_FILE_NAME, CONTEXT_MODULES_DIR, LOCAL_CONFIG_DIR, SYSTEM_OVERVIEW_FILE,
};
pub use persona::{parse_persona, AgentPersona, PersonaMetadata};
pub use resolve::{resolve_settings, EnvOverrides, Overrides, ResolvedSettings};
pub use schema::{AppConfig, Connection, NamedConnection};
