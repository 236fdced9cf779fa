use colored::*;
use seqrun::{DirEntryInfo, EntryKind, Reporter, RunError};
use std::path::Path;

const LINE_WIDTH: usize = 60;

/// Prints run progress to stdout.
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    pub total: usize,
}

impl ConsoleReporter {
    pub fn new(total: usize) -> Self {
        Self { total }
    }

    fn status_line(&self, index: usize, script: &str, status: ColoredString) {
        let prefix = format!("[{}/{}]", index + 1, self.total);
        println!(
            "{} {}{}",
            prefix.dimmed(),
            script,
            dotted(&prefix, script, &status)
        );
    }
}

/// Dots padding `script` so statuses line up, followed by the status.
fn dotted(prefix: &str, script: &str, status: &ColoredString) -> String {
    let base_len = prefix.len() + 1 + script.len();
    let dots_count = if base_len < LINE_WIDTH {
        LINE_WIDTH - base_len
    } else {
        1
    };
    format!("{}{}", ".".repeat(dots_count), status)
}

pub fn entry_line(entry: &DirEntryInfo) -> ColoredString {
    let name = entry.display_name();
    match entry.kind {
        EntryKind::Directory => name.blue().bold(),
        EntryKind::Symlink => name.cyan(),
        EntryKind::File | EntryKind::Other => name.normal(),
    }
}

impl Reporter for ConsoleReporter {
    fn working_directory(&mut self, dir: &Path) {
        println!(
            "{} {}",
            "Working directory:".cyan().bold(),
            dir.display().to_string().bold()
        );
    }

    fn listing(&mut self, entries: &[DirEntryInfo]) {
        if entries.is_empty() {
            println!("  {}", "(empty)".dimmed());
        }
        for entry in entries {
            println!("  {}", entry_line(entry));
        }
        println!();
    }

    fn script_started(&mut self, index: usize, script: &str) {
        tracing::debug!(index, script, "starting script");
    }

    fn script_succeeded(&mut self, index: usize, script: &str) {
        self.status_line(index, script, "Succeeded".green());
    }

    fn script_failed(&mut self, index: usize, script: &str, error: &RunError) {
        let status = match error {
            RunError::Subprocess { code, .. } => format!("Failed (exit {})", code).red(),
            RunError::NotFound { .. } => "Missing".red(),
            _ => "Failed".red(),
        };
        self.status_line(index, script, status);
    }

    fn all_succeeded(&mut self, count: usize) {
        println!();
        println!(
            "{} {}",
            "All scripts completed successfully".green().bold(),
            format!("({} run)", count).dimmed()
        );
    }
}
