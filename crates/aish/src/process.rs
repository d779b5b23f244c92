//! Child process capture shared by shell commands and context modules.

use std::io::{self, Read};
use std::process::{Child, ExitStatus};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use signal_hook::consts::SIGINT;
use tracing::{debug, warn};
use wait_timeout::ChildExt;

/// How a captured child finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitState {
    Exited(Option<i32>),
    TimedOut(Duration),
    WaitFailed(String),
}

impl ExitState {
    fn from_status(status: ExitStatus) -> Self {
        Self::Exited(status.code())
    }

    #[must_use]
    pub fn success(&self) -> bool {
        matches!(self, Self::Exited(Some(0)))
    }

    /// Short label for transcripts: `exit_code=N`, `timeout after Ns`, ...
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Exited(Some(code)) => format!("exit_code={code}"),
            Self::Exited(None) => "exit_code=terminated_by_signal".to_string(),
            Self::TimedOut(timeout) => format!("timeout after {}s", timeout.as_secs()),
            Self::WaitFailed(error) => format!("wait failed: {error}"),
        }
    }
}

/// Output of a finished child. Streams are decoded lossily.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captured {
    pub stdout: String,
    pub stderr: String,
    pub exit: ExitState,
}

fn spawn_reader(pipe: Option<impl Read + Send + 'static>) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut bytes = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut bytes);
        }
        bytes
    })
}

fn join_reader(handle: JoinHandle<Vec<u8>>) -> String {
    let bytes = handle.join().unwrap_or_default();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Waits up to `timeout` for `child`, draining stdout and stderr on reader
/// threads so a chatty child cannot fill a pipe and stall. A child that runs
/// past the timeout is killed.
pub fn capture(mut child: Child, timeout: Duration) -> Captured {
    let stdout = spawn_reader(child.stdout.take());
    let stderr = spawn_reader(child.stderr.take());

    let exit = match child.wait_timeout(timeout) {
        Ok(Some(status)) => ExitState::from_status(status),
        Ok(None) => {
            debug!(pid = child.id(), ?timeout, "killing child after timeout");
            let _ = child.kill();
            let _ = child.wait();
            ExitState::TimedOut(timeout)
        }
        Err(error) => {
            let _ = child.kill();
            let _ = child.wait();
            ExitState::WaitFailed(error.to_string())
        }
    };

    Captured {
        stdout: join_reader(stdout),
        stderr: join_reader(stderr),
        exit,
    }
}

/// Cuts `content` to at most `max_bytes` on a char boundary, marking the cut.
#[must_use]
pub fn truncate_to_byte_limit(content: String, max_bytes: usize) -> String {
    if content.len() <= max_bytes {
        return content;
    }

    let mut cutoff = max_bytes;
    while cutoff > 0 && !content.is_char_boundary(cutoff) {
        cutoff -= 1;
    }

    let mut truncated = content[..cutoff].to_string();
    truncated.push_str("\n[truncated]");
    truncated
}

/// Keeps Ctrl-C from terminating the session while a line is handled.
///
/// Installed once at startup. Outside [`InterruptShield::hold`] SIGINT keeps
/// its default action; inside it the signal still reaches a foreground child
/// but the parent survives. Holds nest: the default action comes back when
/// the last guard drops.
#[derive(Debug, Clone)]
pub struct InterruptShield {
    allow_default: Arc<AtomicBool>,
    holds: Arc<AtomicUsize>,
}

impl InterruptShield {
    pub fn install() -> io::Result<Self> {
        let allow_default = Arc::new(AtomicBool::new(true));
        signal_hook::flag::register_conditional_default(SIGINT, Arc::clone(&allow_default))?;
        Ok(Self {
            allow_default,
            holds: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Best-effort install; logs and returns `None` when registration fails.
    #[must_use]
    pub fn try_install() -> Option<Self> {
        Self::install()
            .map_err(|error| warn!(%error, "could not register SIGINT handler"))
            .ok()
    }

    #[must_use]
    pub fn hold(&self) -> ShieldGuard<'_> {
        self.holds.fetch_add(1, Ordering::SeqCst);
        self.allow_default.store(false, Ordering::SeqCst);
        ShieldGuard { shield: self }
    }

    #[must_use]
    pub fn is_held(&self) -> bool {
        !self.allow_default.load(Ordering::SeqCst)
    }
}

pub struct ShieldGuard<'a> {
    shield: &'a InterruptShield,
}

impl Drop for ShieldGuard<'_> {
    fn drop(&mut self) {
        if self.shield.holds.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.shield.allow_default.store(true, Ordering::SeqCst);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::process::{Command, Stdio};
    use std::time::Duration;

    use std::sync::atomic::{AtomicBool, AtomicUsize};
    use std::sync::Arc;

    use super::{capture, truncate_to_byte_limit, ExitState, InterruptShield};

    fn sh(script: &str) -> std::process::Child {
        Command::new("sh")
            .arg("-c")
            .arg(script)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("sh should spawn")
    }

    #[test]
    fn capture_separates_streams_and_exit_code() {
        let captured = capture(sh("echo out; echo err >&2; exit 3"), Duration::from_secs(10));
        assert_eq!(captured.stdout, "out\n");
        assert_eq!(captured.stderr, "err\n");
        assert_eq!(captured.exit, ExitState::Exited(Some(3)));
        assert_eq!(captured.exit.label(), "exit_code=3");
    }

    #[test]
    fn capture_kills_child_after_timeout() {
        let captured = capture(sh("exec sleep 5"), Duration::from_millis(100));
        assert_eq!(captured.exit, ExitState::TimedOut(Duration::from_millis(100)));
        assert!(!captured.exit.success());
    }

    #[test]
    fn large_output_does_not_stall() {
        let captured = capture(
            sh("i=0; while [ $i -lt 20000 ]; do echo 0123456789; i=$((i+1)); done"),
            Duration::from_secs(30),
        );
        assert!(captured.exit.success());
        assert_eq!(captured.stdout.len(), 20000 * 11);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let text = "ééé".to_string();
        assert_eq!(truncate_to_byte_limit(text.clone(), 6), text);
        assert_eq!(truncate_to_byte_limit(text, 3), "é\n[truncated]");
    }

    #[test]
    fn nested_holds_release_with_the_outermost_guard() {
        let shield = InterruptShield {
            allow_default: Arc::new(AtomicBool::new(true)),
            holds: Arc::new(AtomicUsize::new(0)),
        };

        let outer = shield.hold();
        {
            let _inner = shield.hold();
            assert!(shield.is_held());
        }
        assert!(shield.is_held());
        drop(outer);
        assert!(!shield.is_held());
    }
}
