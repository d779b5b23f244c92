//! Environment configuration for the line editor.

use std::env;

pub const TOGGLE_KEY_VAR: &str = "AISH_TOGGLE_KEY";
pub const NO_COLOR_VARS: [&str; 2] = ["AISH_NO_COLOR", "NO_COLOR"];
pub const DEFAULT_TOGGLE_KEY: &str = "ctrl+space";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvConfig {
    /// Key id that flips between terminal and assistant mode.
    pub toggle_key: String,
    pub no_color: bool,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self {
            toggle_key: env_string_opt(TOGGLE_KEY_VAR)
                .map(|value| value.trim().to_ascii_lowercase())
                .unwrap_or_else(|| DEFAULT_TOGGLE_KEY.to_string()),
            no_color: NO_COLOR_VARS.iter().any(|key| env_flag(key)),
        }
    }
}

// NO_COLOR convention: any non-empty value disables color.
fn env_flag(key: &str) -> bool {
    env::var(key).map(|value| !value.is_empty()).unwrap_or(false)
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::EnvConfig;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    struct EnvGuard {
        key: &'static str,
        previous: Option<String>,
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            if let Some(value) = &self.previous {
                env::set_var(self.key, value);
            } else {
                env::remove_var(self.key);
            }
        }
    }

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
            .lock()
            .expect("env lock poisoned")
    }

    fn set_env_guard(key: &'static str, value: Option<&str>) -> EnvGuard {
        let previous = env::var(key).ok();
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
        EnvGuard { key, previous }
    }

    #[test]
    fn env_defaults() {
        let _lock = env_lock();
        let _g1 = set_env_guard("AISH_TOGGLE_KEY", None);
        let _g2 = set_env_guard("AISH_NO_COLOR", None);
        let _g3 = set_env_guard("NO_COLOR", None);

        let config = EnvConfig::from_env();
        assert_eq!(config.toggle_key, "ctrl+space");
        assert!(!config.no_color);
    }

    #[test]
    fn toggle_key_and_no_color_are_read() {
        let _lock = env_lock();
        let _g1 = set_env_guard("AISH_TOGGLE_KEY", Some(" Ctrl+T "));
        let _g2 = set_env_guard("AISH_NO_COLOR", None);
        let _g3 = set_env_guard("NO_COLOR", Some("1"));

        let config = EnvConfig::from_env();
        assert_eq!(config.toggle_key, "ctrl+t");
        assert!(config.no_color);
    }

    #[test]
    fn blank_values_are_ignored() {
        let _lock = env_lock();
        let _g1 = set_env_guard("AISH_TOGGLE_KEY", Some("  "));
        let _g2 = set_env_guard("AISH_NO_COLOR", Some(""));
        let _g3 = set_env_guard("NO_COLOR", None);

        let config = EnvConfig::from_env();
        assert_eq!(config.toggle_key, "ctrl+space");
        assert!(!config.no_color);
    }
}
