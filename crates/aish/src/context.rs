//! Runs context modules and frames their output for the system prompt.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use agent_config::context_module_path;
use thiserror::Error;
use tracing::{debug, warn};

use crate::process::{capture, truncate_to_byte_limit};

pub const DEFAULT_MODULE_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_MODULE_OUTPUT_BYTES: usize = 100 * 1024;
const BLOCK_FOOTER: &str = "-----------------------------------------";

#[derive(Debug, Error)]
pub enum ContextModuleError {
    #[error("module not found at {path}")]
    NotFound { path: PathBuf },
    #[error("failed to run {path}: {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{path} finished with {status}: {stderr}")]
    Failed {
        path: PathBuf,
        status: String,
        stderr: String,
    },
}

/// Ordered context modules resolved under `<config_dir>/context_modules`.
#[derive(Debug, Clone)]
pub struct ContextAggregator {
    config_dir: PathBuf,
    modules: Vec<String>,
    timeout: Duration,
}

impl ContextAggregator {
    /// Blank identifiers are dropped; the rest keep their order.
    pub fn new<I, S>(config_dir: impl Into<PathBuf>, modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let modules = modules
            .into_iter()
            .map(|module| module.as_ref().trim().to_string())
            .filter(|module| !module.is_empty())
            .collect();
        Self {
            config_dir: config_dir.into(),
            modules,
            timeout: DEFAULT_MODULE_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn modules(&self) -> &[String] {
        &self.modules
    }

    /// Runs every module in order and concatenates the framed outputs.
    /// A failing module leaves an inline error marker in its block.
    #[must_use]
    pub fn aggregate(&self) -> String {
        self.modules
            .iter()
            .map(|module| {
                let body = match self.run_module(module) {
                    Ok(stdout) => stdout,
                    Err(error) => {
                        warn!(%module, %error, "context module failed");
                        format!("[context module error] {error}")
                    }
                };
                frame(module, &body)
            })
            .collect()
    }

    fn run_module(&self, module: &str) -> Result<String, ContextModuleError> {
        let path = context_module_path(&self.config_dir, module);
        if !path.is_file() {
            return Err(ContextModuleError::NotFound { path });
        }

        debug!(%module, path = %path.display(), "running context module");
        let child = Command::new(&path)
            .current_dir(working_dir(&self.config_dir))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ContextModuleError::Spawn {
                path: path.clone(),
                source,
            })?;

        let captured = capture(child, self.timeout);
        if !captured.exit.success() {
            return Err(ContextModuleError::Failed {
                path,
                status: captured.exit.label(),
                stderr: captured.stderr.trim().to_string(),
            });
        }
        Ok(truncate_to_byte_limit(captured.stdout, MAX_MODULE_OUTPUT_BYTES))
    }
}

fn working_dir(config_dir: &Path) -> PathBuf {
    if config_dir.is_dir() {
        config_dir.to_path_buf()
    } else {
        PathBuf::from(".")
    }
}

fn frame(module: &str, body: &str) -> String {
    format!("\n\n------- Context Module: {module} -------\n{body}\n\n{BLOCK_FOOTER}\n")
}
