//! Setup use case - prepares the isolated environment.
//!
//! Steps:
//! - Check that the Python runtime can be invoked
//! - Create the environment unless it already exists
//! - Install the dependency manifest from the configured index

use std::ffi::OsString;
use std::path::PathBuf;

use log::info;

use super::{pip_install, require_input};
use crate::commands::config::Config;
use crate::error::{InputKind, PyshipError, Result};
use crate::layout::EnvLayout;
use crate::runtime::{Invocation, Runtime};

/// Outcome of a successful setup
#[derive(Debug, Clone, PartialEq)]
pub struct SetupReport {
    pub env_dir: PathBuf,
    /// False when an existing environment was reused
    pub created: bool,
}

pub struct SetupUseCase<'a, R: Runtime> {
    runtime: &'a R,
    config: &'a Config,
    env: EnvLayout,
}

impl<'a, R: Runtime> SetupUseCase<'a, R> {
    pub fn new(runtime: &'a R, config: &'a Config) -> Self {
        Self {
            runtime,
            config,
            env: EnvLayout::new(&config.env_dir),
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn execute(&self) -> Result<SetupReport> {
        self.check_runtime().await?;
        require_input(self.runtime, InputKind::Manifest, &self.config.manifest)?;

        let created = self.ensure_environment().await?;
        self.install_dependencies().await?;

        Ok(SetupReport {
            env_dir: self.env.root().to_path_buf(),
            created,
        })
    }

    async fn check_runtime(&self) -> Result<()> {
        let inv = Invocation::new(&self.config.python, &self.config.project_dir)
            .arg("--version")
            .quiet();

        let status = self.runtime.run(&inv).await;
        if !status.success() {
            return Err(PyshipError::MissingRuntime {
                interpreter: self.config.python.clone(),
                status,
            });
        }
        Ok(())
    }

    /// Returns whether a new environment was created.
    async fn ensure_environment(&self) -> Result<bool> {
        if self.env.exists(self.runtime) {
            info!(
                "Environment {:?} already exists, skipping creation",
                self.env.root()
            );
            return Ok(false);
        }

        info!("Creating environment at {:?}", self.env.root());
        let inv = Invocation::new(&self.config.python, &self.config.project_dir)
            .args(["-m", "venv"])
            .arg(self.env.root());

        let status = self.runtime.run(&inv).await;
        if !status.success() {
            return Err(PyshipError::EnvironmentCreationFailed {
                env_dir: self.env.root().to_path_buf(),
                status,
            });
        }
        Ok(true)
    }

    async fn install_dependencies(&self) -> Result<()> {
        info!(
            "Installing dependencies from {:?} via {}",
            self.config.manifest, self.config.index_url
        );
        let inv = pip_install(
            &self.env,
            self.config,
            [OsString::from("-r"), self.config.manifest.clone().into_os_string()],
        );

        let status = self.runtime.run(&inv).await;
        if !status.success() {
            return Err(PyshipError::DependencyInstallFailed {
                what: self.config.manifest.display().to_string(),
                status,
            });
        }
        Ok(())
    }
}
