use std::path::PathBuf;

use agent_config::Overrides;
use clap::Parser;

/// Terminal shell with an LLM agent one keystroke away.
#[derive(Debug, Parser)]
#[command(name = "aish", version, about, long_about = None)]
pub struct Args {
    /// Send one message to the agent and exit.
    pub message: Option<String>,

    /// Model id, overriding persona and connection.
    #[arg(short, long)]
    pub model: Option<String>,

    /// Provider id (openrouter, openai, mock).
    #[arg(short, long)]
    pub provider: Option<String>,

    /// Agent persona name under `agents/`.
    #[arg(short, long)]
    pub agent: Option<String>,

    /// Print the aggregated context-module output and exit.
    #[arg(long)]
    pub print_context: bool,

    /// Print every system message sent to the model and exit.
    #[arg(long)]
    pub print_full_context: bool,

    /// Configuration directory (default: $AISH_CONFIG_DIR, ./config, or the platform config dir).
    #[arg(long, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,
}

impl Args {
    #[must_use]
    pub fn overrides(&self) -> Overrides {
        Overrides {
            agent: self.agent.clone(),
            model: self.model.clone(),
            provider: self.provider.clone(),
        }
    }

    /// One-shot message, ignoring a blank argument.
    #[must_use]
    pub fn one_shot_message(&self) -> Option<&str> {
        self.message
            .as_deref()
            .map(str::trim)
            .filter(|message| !message.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::Parser;
    use pretty_assertions::assert_eq;

    use super::Args;

    #[test]
    fn flags_map_to_overrides() {
        let args = Args::parse_from([
            "aish", "-m", "gpt-4o", "-p", "openai", "-a", "coder", "--config-dir", "/etc/aish",
            "list files",
        ]);

        let overrides = args.overrides();
        assert_eq!(overrides.model.as_deref(), Some("gpt-4o"));
        assert_eq!(overrides.provider.as_deref(), Some("openai"));
        assert_eq!(overrides.agent.as_deref(), Some("coder"));
        assert_eq!(args.config_dir, Some(PathBuf::from("/etc/aish")));
        assert_eq!(args.one_shot_message(), Some("list files"));
    }

    #[test]
    fn blank_message_is_interactive() {
        let args = Args::parse_from(["aish", "  "]);
        assert_eq!(args.one_shot_message(), None);
        assert!(!args.print_context);
    }
}
