//! The ordered list of scripts to run.
//!
//! # Plan file: `.seqrunrc`
//!
//! TOML, looked up the same way as a `.gitconfig`:
//!
//! - **Global**: `~/.seqrunrc`
//! - **Local**: the first `.seqrunrc` found walking up from the start directory
//!
//! ```toml
//! scripts = ["trading_pipeline_mini.py", "trading_removal.py", "trading_analysis.py"]
//! interpreter = "python3"
//! env_file = ".env"
//! ```
//!
//! All fields are optional. Local values override global values.

use crate::error::{Result, RunError};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const PLAN_FILE_NAME: &str = ".seqrunrc";

const DEFAULT_SCRIPTS: [&str; 3] = [
    "trading_pipeline_mini.py",
    "trading_removal.py",
    "trading_analysis.py",
];

/// TOML-friendly intermediate representation (all fields optional).
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct PlanFile {
    scripts: Option<Vec<String>>,
    interpreter: Option<String>,
    env_file: Option<String>,
}

/// Ordered script file names. Position is execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptList(Vec<String>);

impl ScriptList {
    pub fn new<I, S>(scripts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(scripts.into_iter().map(Into::into).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a ScriptList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// What to run, and where its configuration comes from.
///
/// # Defaults
///
/// | Setting | Default |
/// |---------|---------|
/// | `scripts` | the three trading scripts |
/// | `interpreter` | `None` (the env file or `python3` decides) |
/// | `env_file` | `.env` |
#[derive(Debug, Clone, PartialEq)]
pub struct RunPlan {
    pub scripts: ScriptList,
    pub interpreter: Option<PathBuf>,
    pub env_file: PathBuf,
}

impl Default for RunPlan {
    fn default() -> Self {
        Self {
            scripts: ScriptList::new(DEFAULT_SCRIPTS),
            interpreter: None,
            env_file: PathBuf::from(".env"),
        }
    }
}

impl RunPlan {
    /// Loads the global plan, then the nearest local one on top of it.
    ///
    /// Returns `RunPlan::default()` if neither exists. A global file that
    /// fails to parse is skipped with a warning; a broken local file is an
    /// error. When the walk-up reaches `~/.seqrunrc` itself, it only counts
    /// as the global plan.
    pub fn load(start_dir: impl AsRef<Path>) -> Result<Self> {
        Self::load_layered(Self::find_global_plan(), start_dir)
    }

    fn load_layered(global_path: Option<PathBuf>, start_dir: impl AsRef<Path>) -> Result<Self> {
        let mut plan = Self::default();

        if let Some(global_path) = &global_path {
            match Self::read_plan_file(global_path) {
                Ok(global) => plan.merge(global, global_path)?,
                Err(e) => {
                    tracing::warn!(
                        path = %global_path.display(),
                        error = %e,
                        "ignoring global plan"
                    )
                }
            }
        }

        if let Some(local_path) = Self::find_local_plan(start_dir)
            && !is_same_file(&local_path, global_path.as_deref())
        {
            let local = Self::read_plan_file(&local_path)?;
            plan.merge(local, &local_path)?;
        }

        Ok(plan)
    }

    /// Loads a plan from one specific file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = Self::read_plan_file(path)?;
        let mut plan = Self::default();
        plan.merge(file, path)?;
        Ok(plan)
    }

    /// Parses a plan from a TOML string.
    pub fn from_str(toml_str: &str) -> Result<Self> {
        let origin = Path::new(PLAN_FILE_NAME);
        let file: PlanFile =
            toml::from_str(toml_str).map_err(|e| RunError::config(origin, e.to_string()))?;
        let mut plan = Self::default();
        plan.merge(file, origin)?;
        Ok(plan)
    }

    /// Commented template written by `seqrun init`.
    pub fn default_file_contents() -> String {
        let scripts = DEFAULT_SCRIPTS
            .iter()
            .map(|s| format!("    \"{}\",", s))
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            r#"# seqrun plan
# Scripts run in this order. The first failure stops the run.
scripts = [
{scripts}
]

# Interpreter each script is passed to. SEQRUN_INTERPRETER in the env file wins.
# interpreter = "python3"

# KEY=VALUE file providing SEQRUN_WORKING_DIR and any variables the scripts need.
env_file = ".env"
"#
        )
    }

    /// Builder: set the env file path.
    pub fn with_env_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.env_file = path.into();
        self
    }

    fn merge(&mut self, file: PlanFile, origin: &Path) -> Result<()> {
        if let Some(scripts) = file.scripts {
            if scripts.is_empty() {
                return Err(RunError::config(origin, "`scripts` must not be empty"));
            }
            if let Some(blank) = scripts.iter().position(|s| s.trim().is_empty()) {
                return Err(RunError::config(
                    origin,
                    format!("`scripts` entry {} is blank", blank),
                ));
            }
            self.scripts = ScriptList::new(scripts);
        }
        if let Some(interpreter) = file.interpreter {
            self.interpreter = Some(PathBuf::from(interpreter));
        }
        if let Some(env_file) = file.env_file {
            self.env_file = relative_to(origin, &env_file);
        }
        Ok(())
    }

    fn read_plan_file(path: &Path) -> Result<PlanFile> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| RunError::config(path, format!("failed to read: {}", e)))?;
        toml::from_str(&content).map_err(|e| RunError::config(path, e.to_string()))
    }

    fn find_global_plan() -> Option<PathBuf> {
        dirs::home_dir()
            .map(|home| home.join(PLAN_FILE_NAME))
            .filter(|p| p.is_file())
    }

    /// Walks up from `start_dir` looking for `.seqrunrc`.
    fn find_local_plan(start_dir: impl AsRef<Path>) -> Option<PathBuf> {
        let mut dir = start_dir.as_ref().to_path_buf();

        if let Ok(abs) = dir.canonicalize() {
            dir = abs;
        }

        loop {
            let rc_file = dir.join(PLAN_FILE_NAME);
            if rc_file.is_file() {
                return Some(rc_file);
            }
            if !dir.pop() {
                return None;
            }
        }
    }
}

fn is_same_file(path: &Path, other: Option<&Path>) -> bool {
    let Some(other) = other else {
        return false;
    };
    match (path.canonicalize(), other.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => path == other,
    }
}

/// Relative `env_file` entries are resolved against the plan file's directory.
fn relative_to(origin: &Path, raw: &str) -> PathBuf {
    let path = PathBuf::from(raw);
    if path.is_absolute() {
        return path;
    }
    match origin.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(path),
        _ => path,
    }
}
