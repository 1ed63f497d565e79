//! Application layer - the two procedures as use cases.
//!
//! Each use case is a linear pipeline: precondition checks, setup, execute.
//! The first failing step ends the procedure with a typed [`PyshipError`];
//! nothing is retried.
//!
//! [`PyshipError`]: crate::error::PyshipError

mod build;
mod setup;

pub use build::{BuildReport, BuildUseCase};
pub use setup::{SetupReport, SetupUseCase};

use std::ffi::OsString;
use std::path::Path;

use crate::commands::config::Config;
use crate::error::{InputKind, PyshipError, Result};
use crate::layout::EnvLayout;
use crate::runtime::{Invocation, Runtime};

/// `<env python> -m pip install <packages...> -i <index>`, run from the project directory.
fn pip_install<I, S>(env: &EnvLayout, config: &Config, packages: I) -> Invocation
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    Invocation::new(env.interpreter(), &config.project_dir)
        .args(["-m", "pip", "install"])
        .args(packages)
        .arg("-i")
        .arg(&config.index_url)
}

fn require_input<R: Runtime>(runtime: &R, kind: InputKind, path: &Path) -> Result<()> {
    if runtime.exists(path) {
        Ok(())
    } else {
        Err(PyshipError::MissingInput {
            kind,
            path: path.to_path_buf(),
        })
    }
}
