use std::io;
use std::path::PathBuf;

use agent_config::{resolve_config_dir, resolve_settings, EnvOverrides};
use aish::cli::Args;
use aish::process::InterruptShield;
use aish::providers::provider_for_settings;
use aish::session::max_turns_from_env;
use aish::{Console, Controller, Conversation, LineConsent, SessionContext, SessionIo, SystemShell};
use aish_term::{
    stdio_is_tty, BufferedLineInput, EnvConfig, LineEditor, LineInput, LineKeybindingsManager,
    Palette, ProcessTerminal, TerminalLineInput,
};
use anyhow::Context;
use clap::Parser;

const CONFIG_DIR_VAR: &str = "AISH_CONFIG_DIR";

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    aish::logging::init().context("failed to open log file")?;
    let args = Args::parse();

    let cwd = std::env::current_dir().context("failed to read the working directory")?;
    let env_dir = std::env::var_os(CONFIG_DIR_VAR).map(PathBuf::from);
    let config_dir = resolve_config_dir(args.config_dir.as_deref(), env_dir.as_deref(), &cwd)?;
    let settings = resolve_settings(&config_dir, &args.overrides(), &EnvOverrides::from_env())
        .with_context(|| format!("failed to load configuration from {}", config_dir.display()))?;

    let provider = provider_for_settings(&settings).context("failed to set up the model provider")?;
    let session =
        SessionContext::from_settings(&settings, provider).with_max_turns(max_turns_from_env());

    if args.print_context {
        println!("{}", session.aggregator().aggregate());
        return Ok(());
    }
    if args.print_full_context {
        for message in session.build_messages(&Conversation::new()) {
            println!("[{}]\n{}\n", message.role, message.content);
        }
        return Ok(());
    }

    let env_config = EnvConfig::from_env();
    let interactive = stdio_is_tty();
    let palette = Palette::new(interactive && !env_config.no_color);

    let mut input: Box<dyn LineInput> = if interactive {
        let keybindings = LineKeybindingsManager::with_toggle_key(&env_config.toggle_key);
        Box::new(TerminalLineInput::new(
            ProcessTerminal::new(),
            LineEditor::new(keybindings),
        ))
    } else {
        Box::new(BufferedLineInput::new(io::stdin().lock(), io::stdout()))
    };
    let shield = InterruptShield::try_install();
    let mut shell = SystemShell::new().with_interrupt_shield(shield.clone());
    let mut consent = LineConsent;
    let mut console = Console::stdio(palette);
    let mut io = SessionIo {
        input: input.as_mut(),
        consent: &mut consent,
        shell: &mut shell,
        console: &mut console,
    };

    let mut controller =
        Controller::new(&session, &env_config.toggle_key).with_interrupt_shield(shield);
    match args.one_shot_message() {
        Some(message) => {
            controller.run_once(message, &mut io)?;
        }
        None => controller.run(&mut io)?,
    }
    Ok(())
}
