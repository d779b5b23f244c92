use std::path::{Path, PathBuf};

use crate::error::ConfigError;

pub const CONFIG_FILE_NAME: &str = "aish.json";
pub const CONFIG_DIR_NAME: &str = "aish";
pub const LOCAL_CONFIG_DIR: &str = "config";
pub const AGENTS_DIR: &str = "agents";
pub const CONTEXT_MODULES_DIR: &str = "context_modules";
pub const SYSTEM_OVERVIEW_FILE: &str = "system_overview.md";

/// Picks the configuration directory.
///
/// Order: `explicit`, then `env_dir`, then `<cwd>/config` when it holds
/// `aish.json`, then `<platform config dir>/aish`.
pub fn resolve_config_dir(
    explicit: Option<&Path>,
    env_dir: Option<&Path>,
    cwd: &Path,
) -> Result<PathBuf, ConfigError> {
    if let Some(dir) = explicit.or(env_dir) {
        return Ok(dir.to_path_buf());
    }

    let local = cwd.join(LOCAL_CONFIG_DIR);
    if local.join(CONFIG_FILE_NAME).is_file() {
        return Ok(local);
    }

    dirs::config_dir()
        .map(|base| base.join(CONFIG_DIR_NAME))
        .ok_or(ConfigError::NoConfigDir)
}

#[must_use]
pub fn agent_path(config_dir: &Path, agent: &str) -> PathBuf {
    config_dir.join(AGENTS_DIR).join(format!("{agent}.md"))
}

#[must_use]
pub fn context_module_path(config_dir: &Path, module: &str) -> PathBuf {
    config_dir.join(CONTEXT_MODULES_DIR).join(module)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn explicit_dir_wins_over_everything() {
        let cwd = tempfile::tempdir().expect("tempdir");
        let resolved = resolve_config_dir(
            Some(Path::new("/opt/aish")),
            Some(Path::new("/env/aish")),
            cwd.path(),
        )
        .expect("explicit dir");
        assert_eq!(resolved, PathBuf::from("/opt/aish"));
    }

    #[test]
    fn env_dir_wins_over_local_config() {
        let cwd = tempfile::tempdir().expect("tempdir");
        fs::create_dir(cwd.path().join(LOCAL_CONFIG_DIR)).expect("local dir");
        fs::write(cwd.path().join("config").join(CONFIG_FILE_NAME), "{}").expect("config");

        let resolved =
            resolve_config_dir(None, Some(Path::new("/env/aish")), cwd.path()).expect("env dir");
        assert_eq!(resolved, PathBuf::from("/env/aish"));
    }

    #[test]
    fn local_config_dir_requires_config_file() {
        let cwd = tempfile::tempdir().expect("tempdir");
        let local = cwd.path().join(LOCAL_CONFIG_DIR);
        fs::create_dir(&local).expect("local dir");

        let without_file = resolve_config_dir(None, None, cwd.path());
        if let Ok(dir) = &without_file {
            assert_ne!(dir, &local);
        }

        fs::write(local.join(CONFIG_FILE_NAME), "{}").expect("config");
        let with_file = resolve_config_dir(None, None, cwd.path()).expect("local dir");
        assert_eq!(with_file, local);
    }

    #[test]
    fn module_and_agent_paths_live_under_config_dir() {
        let dir = Path::new("/cfg");
        assert_eq!(agent_path(dir, "coder"), PathBuf::from("/cfg/agents/coder.md"));
        assert_eq!(
            context_module_path(dir, "system_info.py"),
            PathBuf::from("/cfg/context_modules/system_info.py")
        );
    }
}
