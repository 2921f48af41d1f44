//! External programs launched by plugin actions.

use std::path::Path;
use std::process::{Command, Stdio};

use imagerename_core::error::{AppError, ErrorKind};
use imagerename_core::AppResult;
use tracing::info;

use super::app::App;

/// Placeholder replaced by the current subject path in command arguments.
pub const SUBJECT_PLACEHOLDER: &str = "{subject}";

/// A program invocation with `{subject}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
    argv: Vec<String>,
    wait: bool,
}

impl ExternalCommand {
    /// Creates a command. `wait` blocks the host loop until the program exits.
    pub fn new(argv: Vec<String>, wait: bool) -> AppResult<Self> {
        match argv.first() {
            Some(program) if !program.trim().is_empty() => Ok(Self { argv, wait }),
            _ => Err(AppError::validation("External command needs a program")),
        }
    }

    /// Whether the host loop waits for the program to exit.
    pub fn waits(&self) -> bool {
        self.wait
    }

    /// The argument vector with placeholders filled in.
    pub fn argv_for(&self, subject: Option<&Path>) -> Vec<String> {
        let subject = subject
            .map(|path| path.display().to_string())
            .unwrap_or_default();
        self.argv
            .iter()
            .map(|arg| arg.replace(SUBJECT_PLACEHOLDER, &subject))
            .collect()
    }

    /// Launches the program for the application's current subject.
    ///
    /// A program that is not waited for is handed to the application, which
    /// reaps it once it exits.
    pub fn run(&self, app: &mut App) -> AppResult<()> {
        let argv = self.argv_for(app.subject().current());
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| AppError::validation("External command needs a program"))?;

        let mut command = Command::new(program);
        command.args(args).stdin(Stdio::null());

        info!(program = %program, wait = self.wait, "Launching external program");

        if self.wait {
            let status = command.status()?;
            if !status.success() {
                return Err(AppError::new(
                    ErrorKind::Io,
                    format!("'{program}' exited with {status}"),
                ));
            }
        } else {
            let child = command.spawn()?;
            app.track_child(child);
        }
        Ok(())
    }
}
