use colored::*;
use seqrun::RunError;

/// Error with optional location, suggestion and help lines.
pub struct EnhancedError {
    pub message: String,
    pub file: Option<String>,
    pub suggestion: Option<String>,
    pub help: Option<String>,
}

impl EnhancedError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            file: None,
            suggestion: None,
            help: None,
        }
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Print to stderr with colored labels.
    pub fn display(&self) {
        eprintln!("{} {}", "error:".red().bold(), self.message.bold());

        if let Some(file) = &self.file {
            eprintln!("  {} {}", "-->".blue().bold(), file);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!();
            eprintln!("{} {}", "suggestion:".green().bold(), suggestion);
        }

        if let Some(help) = &self.help {
            eprintln!();
            eprintln!("{} {}", "help:".cyan().bold(), help);
        }
    }
}

/// Attach suggestions based on which kind of failure this is.
pub fn enhance_error(err: &anyhow::Error) -> EnhancedError {
    let message = format!("{:#}", err);

    let Some(run_err) = err.downcast_ref::<RunError>() else {
        return EnhancedError::new(message);
    };

    let enhanced = EnhancedError::new(message);
    match run_err {
        RunError::Config { path, .. } => enhanced
            .with_file(path.display().to_string())
            .with_suggestion("Create the env file with SEQRUN_WORKING_DIR=/path/to/scripts")
            .with_help("Use --env-file <PATH> or set env_file in .seqrunrc to point elsewhere"),
        RunError::Directory { path, .. } => enhanced
            .with_file(path.display().to_string())
            .with_suggestion("Check SEQRUN_WORKING_DIR in your env file")
            .with_help("The directory must exist and be readable"),
        RunError::NotFound { path, .. } => enhanced
            .with_file(path.display().to_string())
            .with_suggestion(
                "Check the script name in .seqrunrc or copy the script into the working directory",
            )
            .with_help("Run 'seqrun list' to see which scripts are present"),
        RunError::Subprocess { .. } => {
            enhanced.with_help("Later scripts were not run. Fix the failing script and run again")
        }
        RunError::Spawn { interpreter, .. } => enhanced
            .with_suggestion(format!(
                "Verify '{}' is installed and in your PATH",
                interpreter.display()
            ))
            .with_help("Set SEQRUN_INTERPRETER in the env file or interpreter in .seqrunrc"),
    }
}
