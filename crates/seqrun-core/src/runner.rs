//! Fail-fast sequential runner.
//!
//! [`Runner::run`] resolves the working directory, lists it, then verifies
//! and executes each script in order. Script `i + 1` never starts unless
//! script `i` succeeded. Progress goes to a [`Reporter`]; the outcome comes
//! back as a [`RunReport`].

use crate::config::Configuration;
use crate::error::{Result, RunError};
use crate::executor::{ExecutionResult, Invocation, ScriptExecutor};
use crate::listing::{self, DirEntryInfo};
use crate::plan::ScriptList;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    NotStarted,
    Running(usize),
    Succeeded,
    /// `index` is the script that failed, or the one that would have run
    /// next when the failure came before it. `code` is set only when a
    /// script actually exited.
    Failed { index: usize, code: Option<i32> },
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed { .. })
    }

    /// State after script `index` of `len` finished with `result`.
    fn after(index: usize, len: usize, result: ExecutionResult) -> Self {
        match result {
            ExecutionResult::Success if index + 1 < len => Self::Running(index + 1),
            ExecutionResult::Success => Self::Succeeded,
            ExecutionResult::Failure(code) => Self::Failed {
                index,
                code: Some(code),
            },
        }
    }
}

/// Receives progress events from a run. All methods default to doing nothing.
pub trait Reporter {
    fn working_directory(&mut self, _dir: &Path) {}
    fn listing(&mut self, _entries: &[DirEntryInfo]) {}
    fn script_started(&mut self, _index: usize, _script: &str) {}
    fn script_succeeded(&mut self, _index: usize, _script: &str) {}
    fn script_failed(&mut self, _index: usize, _script: &str, _error: &RunError) {}
    fn all_succeeded(&mut self, _count: usize) {}
}

impl<R: Reporter + ?Sized> Reporter for &mut R {
    fn working_directory(&mut self, dir: &Path) {
        (**self).working_directory(dir)
    }
    fn listing(&mut self, entries: &[DirEntryInfo]) {
        (**self).listing(entries)
    }
    fn script_started(&mut self, index: usize, script: &str) {
        (**self).script_started(index, script)
    }
    fn script_succeeded(&mut self, index: usize, script: &str) {
        (**self).script_succeeded(index, script)
    }
    fn script_failed(&mut self, index: usize, script: &str, error: &RunError) {
        (**self).script_failed(index, script, error)
    }
    fn all_succeeded(&mut self, count: usize) {
        (**self).all_succeeded(count)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptOutcome {
    pub script: String,
    pub result: ExecutionResult,
}

#[derive(Debug)]
pub struct RunReport {
    pub state: RunState,
    pub working_dir: Option<PathBuf>,
    /// Scripts that actually ran, in order.
    pub outcomes: Vec<ScriptOutcome>,
    pub error: Option<RunError>,
}

impl RunReport {
    fn failed(
        state: RunState,
        working_dir: Option<PathBuf>,
        outcomes: Vec<ScriptOutcome>,
        error: RunError,
    ) -> Self {
        Self {
            state,
            working_dir,
            outcomes,
            error: Some(error),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.state == RunState::Succeeded
    }

    /// `0` on full success, `1` otherwise.
    pub fn exit_code(&self) -> i32 {
        match &self.error {
            None if self.succeeded() => 0,
            Some(err) => err.exit_code(),
            None => 1,
        }
    }

    pub fn into_result(self) -> Result<()> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Canonicalizes `dir` and checks that it is a directory.
pub fn resolve(dir: &Path) -> Result<PathBuf> {
    let resolved = dir
        .canonicalize()
        .map_err(|e| RunError::directory(dir, e.to_string()))?;
    if !resolved.is_dir() {
        return Err(RunError::directory(dir, "not a directory"));
    }
    Ok(resolved)
}

/// Fails with `NotFound` unless `path` is an existing regular file.
pub fn verify(script: &str, path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(RunError::NotFound {
            script: script.to_string(),
            path: path.to_path_buf(),
        })
    }
}

pub struct Runner<E, R = NullReporter> {
    executor: E,
    reporter: R,
}

impl<E: ScriptExecutor> Runner<E, NullReporter> {
    pub fn new(executor: E) -> Self {
        Self {
            executor,
            reporter: NullReporter,
        }
    }
}

impl<E: ScriptExecutor, R: Reporter> Runner<E, R> {
    pub fn with_reporter<R2: Reporter>(self, reporter: R2) -> Runner<E, R2> {
        Runner {
            executor: self.executor,
            reporter,
        }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    /// Runs `scripts` in order and stops at the first failure.
    pub fn run(&mut self, config: &Configuration, scripts: &ScriptList) -> RunReport {
        let mut state = RunState::NotStarted;

        let working_dir = match resolve(&config.working_dir) {
            Ok(dir) => dir,
            Err(err) => return self.abort(0, None, Vec::new(), err),
        };
        self.reporter.working_directory(&working_dir);

        match listing::list_directory(&working_dir) {
            Ok(entries) => self.reporter.listing(&entries),
            Err(err) => return self.abort(0, Some(working_dir), Vec::new(), err),
        }

        if scripts.is_empty() {
            tracing::info!("no scripts to run");
            self.reporter.all_succeeded(0);
            return RunReport {
                state: RunState::Succeeded,
                working_dir: Some(working_dir),
                outcomes: Vec::new(),
                error: None,
            };
        }

        let mut outcomes = Vec::with_capacity(scripts.len());
        state = transition(state, RunState::Running(0));

        while let RunState::Running(index) = state {
            let script = scripts.as_slice()[index].as_str();
            let script_path = working_dir.join(script);

            if let Err(err) = verify(script, &script_path) {
                return self.abort(index, Some(working_dir), outcomes, err);
            }

            self.reporter.script_started(index, script);
            let invocation = Invocation {
                interpreter: &config.interpreter,
                script,
                script_path: &script_path,
                working_dir: &working_dir,
                env: config.env(),
            };
            let result = match self.executor.execute(&invocation) {
                Ok(result) => result,
                Err(err) => return self.abort(index, Some(working_dir), outcomes, err),
            };

            outcomes.push(ScriptOutcome {
                script: script.to_string(),
                result,
            });

            match RunState::after(index, scripts.len(), result) {
                RunState::Failed { code: Some(code), .. } => {
                    let err = RunError::Subprocess {
                        script: script.to_string(),
                        code,
                    };
                    return self.abort_with_code(index, code, Some(working_dir), outcomes, err);
                }
                next => {
                    self.reporter.script_succeeded(index, script);
                    state = transition(state, next);
                }
            }
        }

        tracing::info!(count = scripts.len(), "all scripts succeeded");
        self.reporter.all_succeeded(scripts.len());
        RunReport {
            state,
            working_dir: Some(working_dir),
            outcomes,
            error: None,
        }
    }

    fn abort(
        &mut self,
        index: usize,
        working_dir: Option<PathBuf>,
        outcomes: Vec<ScriptOutcome>,
        err: RunError,
    ) -> RunReport {
        self.finish_failed(RunState::Failed { index, code: None }, working_dir, outcomes, err)
    }

    fn abort_with_code(
        &mut self,
        index: usize,
        code: i32,
        working_dir: Option<PathBuf>,
        outcomes: Vec<ScriptOutcome>,
        err: RunError,
    ) -> RunReport {
        self.finish_failed(
            RunState::Failed {
                index,
                code: Some(code),
            },
            working_dir,
            outcomes,
            err,
        )
    }

    fn finish_failed(
        &mut self,
        state: RunState,
        working_dir: Option<PathBuf>,
        outcomes: Vec<ScriptOutcome>,
        err: RunError,
    ) -> RunReport {
        tracing::debug!(kind = err.kind(), ?state, "run aborted: {}", err);
        if let (Some(script), RunState::Failed { index, .. }) = (err.script(), state) {
            self.reporter.script_failed(index, script, &err);
        }
        RunReport::failed(state, working_dir, outcomes, err)
    }
}

fn transition(from: RunState, to: RunState) -> RunState {
    debug_assert!(!from.is_terminal(), "transition out of terminal state {:?}", from);
    tracing::debug!(?from, ?to, "run state");
    to
}
