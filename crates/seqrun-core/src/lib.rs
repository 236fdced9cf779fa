//! # seqrun-core
//!
//! Loads a flat env file into an immutable [`Configuration`], then runs an
//! ordered [`ScriptList`] through an interpreter, one script at a time,
//! stopping at the first failure.
//!
//! ```rust,no_run
//! use seqrun_core::{Configuration, ProcessExecutor, RunPlan, Runner};
//!
//! let plan = RunPlan::load(".").unwrap();
//! let config = Configuration::load(&plan.env_file).unwrap();
//! let report = Runner::new(ProcessExecutor::new()).run(&config, &plan.scripts);
//! std::process::exit(report.exit_code());
//! ```

pub mod config;
pub mod envfile;
pub mod error;
pub mod executor;
pub mod listing;
pub mod plan;
pub mod runner;

pub use config::Configuration;
pub use error::RunError;
pub use executor::{ExecutionResult, Invocation, ProcessExecutor, ScriptExecutor};
pub use listing::{DirEntryInfo, EntryKind, list_directory};
pub use plan::{PLAN_FILE_NAME, RunPlan, ScriptList};
pub use runner::{
    NullReporter, Reporter, RunReport, RunState, Runner, ScriptOutcome, resolve, verify,
};
