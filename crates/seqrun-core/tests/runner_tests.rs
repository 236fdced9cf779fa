use anyhow::Result;
use seqrun_core::{
    Configuration, DirEntryInfo, ExecutionResult, Invocation, ProcessExecutor, Reporter,
    RunError, RunState, Runner, ScriptExecutor, ScriptList,
};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Records every invocation and answers with a scripted exit code.
#[derive(Default)]
struct SpyExecutor {
    calls: Vec<String>,
    exit_codes: HashMap<String, i32>,
}

impl SpyExecutor {
    fn failing(script: &str, code: i32) -> Self {
        let mut spy = Self::default();
        spy.exit_codes.insert(script.to_string(), code);
        spy
    }
}

impl ScriptExecutor for SpyExecutor {
    fn execute(
        &mut self,
        invocation: &Invocation<'_>,
    ) -> seqrun_core::error::Result<ExecutionResult> {
        self.calls.push(invocation.script.to_string());
        Ok(match self.exit_codes.get(invocation.script) {
            Some(&code) if code != 0 => ExecutionResult::Failure(code),
            _ => ExecutionResult::Success,
        })
    }
}

/// Fails to start one script, as if its interpreter were missing.
#[derive(Default)]
struct UnstartableExecutor {
    calls: Vec<String>,
    unstartable: String,
}

impl ScriptExecutor for UnstartableExecutor {
    fn execute(
        &mut self,
        invocation: &Invocation<'_>,
    ) -> seqrun_core::error::Result<ExecutionResult> {
        self.calls.push(invocation.script.to_string());
        if invocation.script == self.unstartable {
            return Err(RunError::Spawn {
                script: invocation.script.to_string(),
                interpreter: invocation.interpreter.to_path_buf(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            });
        }
        Ok(ExecutionResult::Success)
    }
}

#[derive(Default)]
struct RecordingReporter {
    lines: Vec<String>,
}

impl Reporter for RecordingReporter {
    fn working_directory(&mut self, _dir: &Path) {
        self.lines.push("dir".to_string());
    }

    fn listing(&mut self, entries: &[DirEntryInfo]) {
        self.lines.push(format!("listing {}", entries.len()));
    }

    fn script_succeeded(&mut self, _index: usize, script: &str) {
        self.lines.push(format!("ok {script}"));
    }

    fn script_failed(&mut self, _index: usize, script: &str, _error: &RunError) {
        self.lines.push(format!("failed {script}"));
    }

    fn all_succeeded(&mut self, count: usize) {
        self.lines.push(format!("all {count}"));
    }
}

fn workspace(scripts: &[&str]) -> Result<tempfile::TempDir> {
    let dir = tempfile::tempdir()?;
    for script in scripts {
        fs::write(dir.path().join(script), "")?;
    }
    Ok(dir)
}

fn config_for(dir: &Path) -> Configuration {
    Configuration::from_pairs(
        vec![("SEQRUN_WORKING_DIR".to_string(), dir.display().to_string())],
        Path::new(".env"),
    )
    .expect("working dir key is present")
}

fn abc() -> ScriptList {
    ScriptList::new(["a.py", "b.py", "c.py"])
}

#[test]
fn test_all_succeed_in_order() -> Result<()> {
    let dir = workspace(&["a.py", "b.py", "c.py"])?;
    let mut spy = SpyExecutor::default();
    let mut reporter = RecordingReporter::default();

    let report = Runner::new(&mut spy)
        .with_reporter(&mut reporter)
        .run(&config_for(dir.path()), &abc());

    assert_eq!(report.exit_code(), 0);
    assert_eq!(report.state, RunState::Succeeded);
    assert_eq!(spy.calls, vec!["a.py", "b.py", "c.py"]);
    assert_eq!(
        reporter.lines,
        vec!["dir", "listing 3", "ok a.py", "ok b.py", "ok c.py", "all 3"]
    );
    Ok(())
}

#[test]
fn test_middle_failure_stops_run() -> Result<()> {
    let dir = workspace(&["a.py", "b.py", "c.py"])?;
    let mut spy = SpyExecutor::failing("b.py", 1);
    let mut reporter = RecordingReporter::default();

    let report = Runner::new(&mut spy)
        .with_reporter(&mut reporter)
        .run(&config_for(dir.path()), &abc());

    assert_eq!(report.exit_code(), 1);
    assert_eq!(
        report.state,
        RunState::Failed {
            index: 1,
            code: Some(1)
        }
    );
    assert_eq!(spy.calls, vec!["a.py", "b.py"]);
    assert_eq!(reporter.lines, vec!["dir", "listing 3", "ok a.py", "failed b.py"]);
    assert!(matches!(
        report.error,
        Some(RunError::Subprocess { ref script, code: 1 }) if script == "b.py"
    ));
    Ok(())
}

#[test]
fn test_missing_script_stops_before_later_scripts() -> Result<()> {
    let dir = workspace(&["a.py", "c.py"])?;
    let mut spy = SpyExecutor::default();

    let report = Runner::new(&mut spy).run(&config_for(dir.path()), &abc());

    assert_eq!(report.exit_code(), 1);
    assert_eq!(spy.calls, vec!["a.py"]);
    assert_eq!(report.state, RunState::Failed { index: 1, code: None });
    assert!(matches!(report.error, Some(RunError::NotFound { .. })));
    Ok(())
}

#[test]
fn test_first_script_missing_runs_nothing() -> Result<()> {
    let dir = workspace(&["b.py", "c.py"])?;
    let mut spy = SpyExecutor::default();

    let report = Runner::new(&mut spy).run(&config_for(dir.path()), &abc());

    assert_eq!(report.exit_code(), 1);
    assert!(spy.calls.is_empty());
    Ok(())
}

#[test]
fn test_spawn_error_stops_run() -> Result<()> {
    let dir = workspace(&["a.py", "b.py", "c.py"])?;
    let executor = UnstartableExecutor {
        unstartable: "b.py".to_string(),
        ..Default::default()
    };
    let mut runner = Runner::new(executor).with_reporter(RecordingReporter::default());

    let report = runner.run(&config_for(dir.path()), &abc());

    assert_eq!(report.exit_code(), 1);
    assert_eq!(report.state, RunState::Failed { index: 1, code: None });
    assert!(matches!(
        report.error,
        Some(RunError::Spawn { ref script, .. }) if script == "b.py"
    ));
    assert_eq!(runner.executor().calls, vec!["a.py", "b.py"]);
    assert_eq!(
        runner.reporter().lines,
        vec!["dir", "listing 3", "ok a.py", "failed b.py"]
    );
    assert_eq!(report.outcomes.len(), 1);
    Ok(())
}

#[test]
fn test_missing_working_dir_runs_nothing() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let gone: PathBuf = dir.path().join("does-not-exist");
    let mut spy = SpyExecutor::default();
    let mut reporter = RecordingReporter::default();

    let report = Runner::new(&mut spy)
        .with_reporter(&mut reporter)
        .run(&config_for(&gone), &abc());

    assert_eq!(report.exit_code(), 1);
    assert!(spy.calls.is_empty());
    assert!(reporter.lines.is_empty());
    assert!(report.working_dir.is_none());
    assert!(matches!(report.error, Some(RunError::Directory { .. })));
    Ok(())
}

#[test]
fn test_empty_script_list_succeeds() -> Result<()> {
    let dir = workspace(&[])?;
    let mut spy = SpyExecutor::default();

    let report = Runner::new(&mut spy).run(
        &config_for(dir.path()),
        &ScriptList::new(Vec::<String>::new()),
    );

    assert_eq!(report.exit_code(), 0);
    assert!(spy.calls.is_empty());
    Ok(())
}

#[test]
fn test_repeated_runs_are_independent() -> Result<()> {
    let dir = workspace(&["a.py", "b.py", "c.py"])?;
    let config = config_for(dir.path());
    let mut runner = Runner::new(SpyExecutor::default());

    let first = runner.run(&config, &abc());
    let second = runner.run(&config, &abc());

    assert_eq!(first.exit_code(), 0);
    assert_eq!(second.exit_code(), 0);
    assert_eq!(first.outcomes, second.outcomes);
    assert_eq!(runner.executor().calls.len(), 6);
    Ok(())
}

#[test]
fn test_duplicate_entries_run_twice() -> Result<()> {
    let dir = workspace(&["a.py"])?;
    let mut spy = SpyExecutor::default();

    let report = Runner::new(&mut spy).run(
        &config_for(dir.path()),
        &ScriptList::new(["a.py", "a.py"]),
    );

    assert_eq!(report.exit_code(), 0);
    assert_eq!(spy.calls, vec!["a.py", "a.py"]);
    Ok(())
}

#[cfg(unix)]
mod process {
    use super::*;

    fn sh_config(dir: &Path, extra: &[(&str, &str)]) -> Configuration {
        let mut pairs = vec![
            ("SEQRUN_WORKING_DIR".to_string(), dir.display().to_string()),
            ("SEQRUN_INTERPRETER".to_string(), "sh".to_string()),
        ];
        pairs.extend(extra.iter().map(|(k, v)| (k.to_string(), v.to_string())));
        Configuration::from_pairs(pairs, Path::new(".env")).expect("valid pairs")
    }

    #[test]
    fn test_real_scripts_run_in_order() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("a.py"), "echo a >> trace.log\n")?;
        fs::write(dir.path().join("b.py"), "echo b >> trace.log\n")?;
        fs::write(dir.path().join("c.py"), "echo c >> trace.log\n")?;

        let report =
            Runner::new(ProcessExecutor::new()).run(&sh_config(dir.path(), &[]), &abc());

        assert_eq!(report.exit_code(), 0);
        assert_eq!(
            fs::read_to_string(dir.path().join("trace.log"))?,
            "a\nb\nc\n"
        );
        Ok(())
    }

    #[test]
    fn test_real_failure_skips_rest() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("a.py"), "echo a >> trace.log\n")?;
        fs::write(dir.path().join("b.py"), "echo b >> trace.log\nexit 1\n")?;
        fs::write(dir.path().join("c.py"), "echo c >> trace.log\n")?;

        let report =
            Runner::new(ProcessExecutor::new()).run(&sh_config(dir.path(), &[]), &abc());

        assert_eq!(report.exit_code(), 1);
        assert_eq!(
            report.state,
            RunState::Failed {
                index: 1,
                code: Some(1)
            }
        );
        assert_eq!(fs::read_to_string(dir.path().join("trace.log"))?, "a\nb\n");
        Ok(())
    }

    #[test]
    fn test_env_file_values_reach_scripts() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(
            dir.path().join("check.py"),
            "test \"$POSTGRES_PASSWORD\" = \"hunter2\"\n",
        )?;

        let config = sh_config(dir.path(), &[("POSTGRES_PASSWORD", "hunter2")]);
        let report =
            Runner::new(ProcessExecutor::new()).run(&config, &ScriptList::new(["check.py"]));

        assert_eq!(report.exit_code(), 0);
        assert!(std::env::var("POSTGRES_PASSWORD").is_err());
        Ok(())
    }

    #[test]
    fn test_load_from_env_file_and_run() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let jobs = dir.path().join("jobs");
        fs::create_dir(&jobs)?;
        fs::write(jobs.join("only.py"), "exit 0\n")?;
        let env_path = dir.path().join(".env");
        fs::write(
            &env_path,
            format!(
                "SEQRUN_WORKING_DIR={}\nSEQRUN_INTERPRETER=sh\n",
                jobs.display()
            ),
        )?;

        let config = Configuration::load(&env_path)?;
        let report =
            Runner::new(ProcessExecutor::new()).run(&config, &ScriptList::new(["only.py"]));

        assert!(report.succeeded());
        assert_eq!(report.outcomes.len(), 1);
        Ok(())
    }
}
