//! Platform-specific locations inside the isolated environment and the
//! bundler's output directory.

use std::path::{Path, PathBuf};

use crate::runtime::Runtime;

/// Separator between source and destination in the bundler's `--add-data`.
#[cfg(windows)]
pub const DATA_SEPARATOR: &str = ";";
#[cfg(not(windows))]
pub const DATA_SEPARATOR: &str = ":";

/// Layout of an isolated environment created by `python -m venv`.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvLayout {
    root: PathBuf,
}

impl EnvLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The environment's own interpreter; running tools through it is
    /// equivalent to activating the environment first.
    pub fn interpreter(&self) -> PathBuf {
        #[cfg(windows)]
        {
            self.root.join("Scripts").join("python.exe")
        }
        #[cfg(not(windows))]
        {
            self.root.join("bin").join("python")
        }
    }

    /// An environment exists only once its interpreter is in place; a bare
    /// directory left behind by an interrupted creation does not count.
    pub fn exists<R: Runtime>(&self, runtime: &R) -> bool {
        runtime.is_dir(&self.root) && runtime.exists(&self.interpreter())
    }
}

/// File name of the bundled executable for the current platform.
pub fn artifact_file_name(name: &str) -> String {
    if cfg!(windows) {
        format!("{}.exe", name)
    } else {
        name.to_string()
    }
}
