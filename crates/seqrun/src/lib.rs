pub use seqrun_core::{
    Configuration, DirEntryInfo, EntryKind, ExecutionResult, Invocation, NullReporter,
    PLAN_FILE_NAME, ProcessExecutor, Reporter, RunError, RunPlan, RunReport, RunState, Runner,
    ScriptExecutor, ScriptList, ScriptOutcome, list_directory, resolve, verify,
};
pub use seqrun_core::{config, envfile, error, executor, listing, plan, runner};

pub mod prelude {
    pub use crate::{Configuration, ProcessExecutor, Reporter, RunPlan, Runner, ScriptList};
    pub use crate::{ExecutionResult, RunError, RunReport, RunState};
}
