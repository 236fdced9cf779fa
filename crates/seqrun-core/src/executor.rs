//! Subprocess execution of a single script.
//!
//! [`ScriptExecutor`] is the seam between the [`Runner`](crate::Runner) and
//! the operating system. [`ProcessExecutor`] is the real implementation;
//! tests swap in a recording one.

use crate::error::{Result, RunError};
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};

/// Outcome of invoking one script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionResult {
    Success,
    Failure(i32),
}

impl ExecutionResult {
    pub fn from_status(status: ExitStatus) -> Self {
        if status.success() {
            return Self::Success;
        }
        match status.code() {
            Some(code) => Self::Failure(code),
            None => Self::Failure(signal_code(status)),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

#[cfg(unix)]
fn signal_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status.signal().map(|sig| 128 + sig).unwrap_or(-1)
}

#[cfg(not(unix))]
fn signal_code(_status: ExitStatus) -> i32 {
    -1
}

/// Everything needed to start one script.
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    pub interpreter: &'a Path,
    pub script: &'a str,
    pub script_path: &'a Path,
    pub working_dir: &'a Path,
    pub env: &'a [(String, String)],
}

pub trait ScriptExecutor {
    /// Runs the script to completion and reports its exit status.
    fn execute(&mut self, invocation: &Invocation<'_>) -> Result<ExecutionResult>;
}

impl<E: ScriptExecutor + ?Sized> ScriptExecutor for &mut E {
    fn execute(&mut self, invocation: &Invocation<'_>) -> Result<ExecutionResult> {
        (**self).execute(invocation)
    }
}

/// Spawns `<interpreter> <script_path>` with inherited stdio and waits.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessExecutor;

impl ProcessExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl ScriptExecutor for ProcessExecutor {
    fn execute(&mut self, invocation: &Invocation<'_>) -> Result<ExecutionResult> {
        tracing::debug!(
            interpreter = %invocation.interpreter.display(),
            script = %invocation.script_path.display(),
            "spawning script"
        );

        let status = Command::new(invocation.interpreter)
            .arg(invocation.script_path)
            .current_dir(invocation.working_dir)
            .envs(invocation.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|source| RunError::Spawn {
                script: invocation.script.to_string(),
                interpreter: invocation.interpreter.to_path_buf(),
                source,
            })?;

        let result = ExecutionResult::from_status(status);
        tracing::debug!(script = invocation.script, ?result, "script exited");
        Ok(result)
    }
}
