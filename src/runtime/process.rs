//! Subprocess execution.

use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};

use log::debug;
use tokio::process::Command;

use super::RealRuntime;

/// A single external tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    /// Working directory of the child process
    pub cwd: PathBuf,
    /// Discard the child's stdout and stderr
    pub quiet: bool,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
            quiet: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    /// Whether `needle` appears as a contiguous run in the argument list.
    #[cfg(test)]
    pub(crate) fn has_args(&self, needle: &[&str]) -> bool {
        if needle.is_empty() {
            return true;
        }
        self.args
            .windows(needle.len())
            .any(|window| window.iter().zip(needle).all(|(a, b)| a == b))
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", quote(&self.program.to_string_lossy()))?;
        for arg in &self.args {
            write!(f, " {}", quote(&arg.to_string_lossy()))?;
        }
        Ok(())
    }
}

fn quote(s: &str) -> String {
    if s.is_empty() || s.contains(char::is_whitespace) {
        format!("\"{}\"", s)
    } else {
        s.to_string()
    }
}

/// How an external tool ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolStatus {
    /// Exited normally with the given code
    Exited(i32),
    /// Killed by a signal before producing an exit code
    Terminated,
    /// The tool could not be started at all
    SpawnFailed(String),
}

impl ToolStatus {
    pub fn success(&self) -> bool {
        matches!(self, ToolStatus::Exited(0))
    }
}

impl From<ExitStatus> for ToolStatus {
    fn from(status: ExitStatus) -> Self {
        status.code().map_or(ToolStatus::Terminated, ToolStatus::Exited)
    }
}

impl fmt::Display for ToolStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolStatus::Exited(code) => write!(f, "exit code {}", code),
            ToolStatus::Terminated => write!(f, "terminated by signal"),
            ToolStatus::SpawnFailed(reason) => write!(f, "could not be started: {}", reason),
        }
    }
}

impl RealRuntime {
    #[tracing::instrument(skip(self, invocation), fields(command = %invocation))]
    pub(crate) async fn run_impl(&self, invocation: &Invocation) -> ToolStatus {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args).current_dir(&invocation.cwd);
        if invocation.quiet {
            cmd.stdout(Stdio::null()).stderr(Stdio::null());
        }

        debug!("Running {} in {:?}", invocation, invocation.cwd);
        let status = match cmd.status().await {
            Ok(status) => ToolStatus::from(status),
            Err(e) => ToolStatus::SpawnFailed(e.to_string()),
        };
        debug!("{} finished: {}", invocation, status);
        status
    }
}
