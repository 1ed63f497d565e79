//! Runtime abstraction for system operations.
//!
//! Every side effect the procedures perform goes through the [`Runtime`]
//! trait, so the setup and build flows can be driven by a mock in tests.
//!
//! # Structure
//!
//! - `fs` - File system operations (read, remove, existence checks)
//! - `path` - Lexical path normalization and containment
//! - `process` - Subprocess execution ([`Invocation`], [`ToolStatus`])
//! - `user` - User interaction (pause before exit)

mod fs;
pub mod path;
mod process;
mod user;

use anyhow::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub use path::{is_path_under, normalize_path};
pub use process::{Invocation, ToolStatus};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Runtime: Send + Sync {
    // File System
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn remove_file(&self, path: &Path) -> Result<()>;
    fn remove_dir_all(&self, path: &Path) -> Result<()>;
    fn exists(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
    fn current_dir(&self) -> Result<PathBuf>;

    // Processes
    /// Run an external tool to completion and report how it ended.
    /// Failing to start the tool is reported as [`ToolStatus::SpawnFailed`].
    async fn run(&self, invocation: &Invocation) -> ToolStatus;

    // User interaction
    /// Whether stdin is attached to a terminal.
    fn is_interactive(&self) -> bool;

    /// Print `prompt` and wait for the user to press Enter.
    fn pause(&self, prompt: &str) -> Result<()>;
}

pub struct RealRuntime;

#[async_trait]
impl Runtime for RealRuntime {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.read_to_string_impl(path)
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        self.remove_file_impl(path)
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        self.remove_dir_all_impl(path)
    }

    fn exists(&self, path: &Path) -> bool {
        self.exists_impl(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.is_dir_impl(path)
    }

    fn current_dir(&self) -> Result<PathBuf> {
        self.current_dir_impl()
    }

    async fn run(&self, invocation: &Invocation) -> ToolStatus {
        self.run_impl(invocation).await
    }

    fn is_interactive(&self) -> bool {
        self.is_interactive_impl()
    }

    fn pause(&self, prompt: &str) -> Result<()> {
        self.pause_impl(prompt)
    }
}
