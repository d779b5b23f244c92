//! Session engine for the `aish` terminal assistant.
//!
//! A [`controller::Controller`] reads lines and routes them either to the
//! shell (terminal mode) or to the agent (prompt mode). Agent requests run
//! through [`session::SessionContext::run`], which assembles the system
//! block, calls the model, shows the sanitized reply and executes any
//! `<execute>` directives the user consents to.

pub mod cli;
pub mod context;
pub mod controller;
pub mod conversation;
pub mod directives;
pub mod executor;
pub mod logging;
pub mod process;
pub mod providers;
pub mod render;
pub mod session;

pub use controller::{Controller, ControllerError, Mode};
pub use conversation::Conversation;
pub use executor::{
    CommandRecord, Consent, ConsentPrompt, ExecError, LineConsent, ShellRunner, SystemShell,
};
pub use render::Console;
pub use session::{RunSummary, SessionContext, SessionError, SessionIo, StopReason};
