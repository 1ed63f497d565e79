//! Typed failures of the setup and build procedures.
//!
//! The procedures only ever return these values; turning them into console
//! text and a process exit code is left to the caller.

use std::path::PathBuf;

use thiserror::Error;

use crate::runtime::ToolStatus;

/// Kind of input file a procedure requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Manifest,
    EntryScript,
    Icon,
}

impl std::fmt::Display for InputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            InputKind::Manifest => "dependency manifest",
            InputKind::EntryScript => "entry script",
            InputKind::Icon => "icon resource",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum PyshipError {
    #[error("Python runtime `{}` is not available ({status})", .interpreter.display())]
    MissingRuntime {
        interpreter: PathBuf,
        status: ToolStatus,
    },

    #[error("failed to create isolated environment at {} ({status})", .env_dir.display())]
    EnvironmentCreationFailed { env_dir: PathBuf, status: ToolStatus },

    #[error("failed to install {what} ({status})")]
    DependencyInstallFailed { what: String, status: ToolStatus },

    #[error("isolated environment not found at {}", .env_dir.display())]
    EnvironmentMissing { env_dir: PathBuf },

    #[error("build failed: {reason}")]
    BuildFailed { reason: String },

    #[error("{kind} not found: {}", .path.display())]
    MissingInput { kind: InputKind, path: PathBuf },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl PyshipError {
    /// Process exit code reported for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            PyshipError::Config(_) => 2,
            PyshipError::MissingRuntime { .. } => 10,
            PyshipError::EnvironmentCreationFailed { .. } => 11,
            PyshipError::DependencyInstallFailed { .. } => 12,
            PyshipError::EnvironmentMissing { .. } => 13,
            PyshipError::BuildFailed { .. } => 14,
            PyshipError::MissingInput { .. } => 15,
        }
    }

    /// What the user should do before running the procedure again.
    pub fn remediation(&self) -> &'static str {
        match self {
            PyshipError::MissingRuntime { .. } => {
                "Install Python 3 and make sure it is on PATH, or point --python at an interpreter."
            }
            PyshipError::EnvironmentCreationFailed { .. } => {
                "Check that the Python installation includes the venv module and that the project directory is writable."
            }
            PyshipError::DependencyInstallFailed { .. } => {
                "Check your network connection and the package index URL (--index-url), then run the command again."
            }
            PyshipError::EnvironmentMissing { .. } => {
                "Run `pyship setup` first to create the environment."
            }
            PyshipError::BuildFailed { .. } => {
                "Read the bundler output above, fix the reported problem, and run `pyship build` again."
            }
            PyshipError::MissingInput { .. } => {
                "Run pyship from the project directory or pass --project-dir."
            }
            PyshipError::Config(_) => "Fix the command line options or pyship.json.",
        }
    }
}

pub type Result<T, E = PyshipError> = std::result::Result<T, E>;
