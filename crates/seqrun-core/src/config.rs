//! Immutable run configuration loaded from an env file.
//!
//! # Keys
//!
//! | Key | Required | Default |
//! |-----|----------|---------|
//! | `SEQRUN_WORKING_DIR` (or `WORKING_DIR`) | yes | none |
//! | `SEQRUN_INTERPRETER` (or `PYTHON_INTERPRETER`) | no | `python3` |
//!
//! Every pair in the file, known key or not, is handed to each child
//! process. The runner's own environment is left untouched.

use crate::envfile;
use crate::error::{Result, RunError};
use std::path::{Path, PathBuf};

pub const WORKING_DIR_KEYS: [&str; 2] = ["SEQRUN_WORKING_DIR", "WORKING_DIR"];
pub const INTERPRETER_KEYS: [&str; 2] = ["SEQRUN_INTERPRETER", "PYTHON_INTERPRETER"];
pub const DEFAULT_INTERPRETER: &str = "python3";

#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    /// Directory the scripts live in and run from.
    pub working_dir: PathBuf,
    /// Program each script is passed to.
    pub interpreter: PathBuf,
    interpreter_from_file: bool,
    env: Vec<(String, String)>,
}

impl Configuration {
    /// Loads the env file at `env_file`.
    pub fn load(env_file: impl AsRef<Path>) -> Result<Self> {
        let path = env_file.as_ref();
        let pairs = envfile::parse_env_file(path)?;
        Self::from_pairs(pairs, path)
    }

    /// Builds a configuration from already parsed pairs. `origin` names the
    /// source in error messages.
    pub fn from_pairs(pairs: Vec<(String, String)>, origin: &Path) -> Result<Self> {
        let working_dir = first_non_empty(&pairs, &WORKING_DIR_KEYS).ok_or_else(|| {
            RunError::config(
                origin,
                format!("missing {} (working directory)", WORKING_DIR_KEYS[0]),
            )
        })?;
        let interpreter = first_non_empty(&pairs, &INTERPRETER_KEYS);

        Ok(Self {
            working_dir: expand_home(working_dir),
            interpreter_from_file: interpreter.is_some(),
            interpreter: PathBuf::from(interpreter.unwrap_or(DEFAULT_INTERPRETER)),
            env: pairs,
        })
    }

    /// Uses `interpreter` unless the env file named one explicitly.
    pub fn with_interpreter(mut self, interpreter: impl Into<PathBuf>) -> Self {
        if !self.interpreter_from_file {
            self.interpreter = interpreter.into();
        }
        self
    }

    /// Pairs forwarded to every child, in file order.
    pub fn env(&self) -> &[(String, String)] {
        &self.env
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        envfile::lookup(&self.env, key)
    }
}

fn first_non_empty<'a>(pairs: &'a [(String, String)], keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|key| envfile::lookup(pairs, key))
        .map(str::trim)
        .find(|value| !value.is_empty())
}

fn expand_home(raw: &str) -> PathBuf {
    if let Some(rest) = raw.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(raw)
}
