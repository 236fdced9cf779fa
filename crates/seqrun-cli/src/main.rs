//! # seqrun-cli
//!
//! Command-line interface for seqrun.
//!
//! Loads the run plan and env file, prints the working directory and its
//! contents, then runs each script in order and stops at the first failure.

mod errors;
mod report;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use seqrun::{Configuration, PLAN_FILE_NAME, ProcessExecutor, RunPlan, Runner};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use errors::enhance_error;
use report::ConsoleReporter;

#[derive(Parser)]
#[command(name = "seqrun")]
#[command(about = "Run scripts in order, stopping at the first failure", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Env file with SEQRUN_WORKING_DIR and variables for the scripts
    #[arg(long, value_name = "PATH", global = true)]
    env_file: Option<PathBuf>,

    /// Plan file to use instead of searching for .seqrunrc
    #[arg(long, value_name = "PATH", global = true)]
    plan: Option<PathBuf>,

    /// Show debug logs on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Show the plan and check that every script exists")]
    List,
    #[command(about = "Write a default .seqrunrc in the current directory")]
    Init,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let outcome = match cli.command {
        Some(Commands::List) => list_plan(&cli),
        Some(Commands::Init) => init_plan().map(|()| 0),
        None => run_plan(&cli),
    };

    let code = match outcome {
        Ok(code) => code,
        Err(e) => {
            enhance_error(&e).display();
            1
        }
    };
    std::process::exit(code);
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env("SEQRUN_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_plan(cli: &Cli) -> Result<RunPlan> {
    let mut plan = match &cli.plan {
        Some(path) => RunPlan::from_file(path)?,
        None => RunPlan::load(".")?,
    };
    if let Some(env_file) = &cli.env_file {
        plan = plan.with_env_file(env_file);
    }
    Ok(plan)
}

fn load_config(plan: &RunPlan) -> Result<Configuration> {
    let config = Configuration::load(&plan.env_file)?;
    Ok(match &plan.interpreter {
        Some(interpreter) => config.with_interpreter(interpreter),
        None => config,
    })
}

fn run_plan(cli: &Cli) -> Result<i32> {
    let plan = load_plan(cli)?;
    let config = load_config(&plan)?;
    tracing::debug!(
        env_file = %plan.env_file.display(),
        interpreter = %config.interpreter.display(),
        scripts = plan.scripts.len(),
        "starting run"
    );

    let mut runner = Runner::new(ProcessExecutor::new())
        .with_reporter(ConsoleReporter::new(plan.scripts.len()));
    let report = runner.run(&config, &plan.scripts);
    let code = report.exit_code();

    report.into_result()?;
    Ok(code)
}

fn list_plan(cli: &Cli) -> Result<i32> {
    let plan = load_plan(cli)?;
    let config = load_config(&plan)?;
    let working_dir = seqrun::resolve(&config.working_dir)?;

    println!("{}", "Plan:".cyan().bold());
    println!("  {} {}", "env file:".dimmed(), plan.env_file.display());
    println!(
        "  {} {}",
        "interpreter:".dimmed(),
        config.interpreter.display()
    );
    println!("  {} {}", "working dir:".dimmed(), working_dir.display());
    println!();

    let mut missing = 0;
    for (index, script) in plan.scripts.iter().enumerate() {
        let present = seqrun::verify(script, &working_dir.join(script)).is_ok();
        let marker = if present {
            "o".green()
        } else {
            missing += 1;
            "x".red()
        };
        println!("  {} {}. {}", marker, index + 1, script);
    }

    println!();
    if missing == 0 {
        println!("{} {}", "o".green().bold(), "All scripts present".green());
        Ok(0)
    } else {
        println!(
            "{} {}",
            "x".red().bold(),
            format!("{} of {} scripts missing", missing, plan.scripts.len()).red()
        );
        Ok(1)
    }
}

fn init_plan() -> Result<()> {
    let plan_path = Path::new(PLAN_FILE_NAME);

    if plan_path.exists() {
        println!(
            "{} {} already exists, leaving it unchanged",
            "ℹ".cyan(),
            plan_path.display()
        );
        return Ok(());
    }

    fs::write(plan_path, RunPlan::default_file_contents())
        .with_context(|| format!("Failed to write {}", plan_path.display()))?;
    println!("{} Created plan: {}", "o".green().bold(), plan_path.display());
    println!(
        "  Add {} to your env file, then run {}",
        "SEQRUN_WORKING_DIR=/path/to/scripts".cyan(),
        "seqrun".cyan()
    );

    Ok(())
}
