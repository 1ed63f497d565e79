//! Build use case - bundles the entry script into a single executable.
//!
//! Steps:
//! - Require an existing environment and the entry script and icon
//! - Install the bundler into the environment
//! - Remove the previous staging directory, output directory and spec file
//! - Run the bundler with a clean build and verify the artifact

use std::path::{Path, PathBuf};

use log::{debug, info};

use super::{pip_install, require_input};
use crate::commands::config::Config;
use crate::error::{InputKind, PyshipError, Result};
use crate::layout::{DATA_SEPARATOR, EnvLayout, artifact_file_name};
use crate::runtime::{Invocation, Runtime};

/// Outcome of a successful build
#[derive(Debug, Clone, PartialEq)]
pub struct BuildReport {
    pub artifact: PathBuf,
}

pub struct BuildUseCase<'a, R: Runtime> {
    runtime: &'a R,
    config: &'a Config,
    env: EnvLayout,
}

impl<'a, R: Runtime> BuildUseCase<'a, R> {
    pub fn new(runtime: &'a R, config: &'a Config) -> Self {
        Self {
            runtime,
            config,
            env: EnvLayout::new(&config.env_dir),
        }
    }

    /// Where the bundler writes the executable.
    pub fn artifact_path(&self) -> PathBuf {
        self.config.dist_dir.join(artifact_file_name(&self.config.name))
    }

    #[tracing::instrument(skip(self))]
    pub async fn execute(&self) -> Result<BuildReport> {
        if !self.env.exists(self.runtime) {
            return Err(PyshipError::EnvironmentMissing {
                env_dir: self.env.root().to_path_buf(),
            });
        }
        require_input(self.runtime, InputKind::EntryScript, &self.config.entry)?;
        require_input(self.runtime, InputKind::Icon, &self.config.icon)?;

        self.install_bundler().await?;
        self.clean()?;
        self.bundle().await?;

        let artifact = self.artifact_path();
        if !self.runtime.exists(&artifact) {
            return Err(PyshipError::BuildFailed {
                reason: format!(
                    "bundler reported success but {} was not produced",
                    artifact.display()
                ),
            });
        }
        Ok(BuildReport { artifact })
    }

    async fn install_bundler(&self) -> Result<()> {
        info!(
            "Installing {} via {}",
            self.config.bundler_package, self.config.index_url
        );
        let inv = pip_install(&self.env, self.config, [&self.config.bundler_package]);

        let status = self.runtime.run(&inv).await;
        if !status.success() {
            return Err(PyshipError::DependencyInstallFailed {
                what: self.config.bundler_package.clone(),
                status,
            });
        }
        Ok(())
    }

    /// Remove every artifact of a previous build. Runs unconditionally.
    fn clean(&self) -> Result<()> {
        for dir in [&self.config.build_dir, &self.config.dist_dir] {
            self.remove(dir)?;
        }
        self.remove(&self.config.spec_file())
    }

    fn remove(&self, path: &Path) -> Result<()> {
        if !self.runtime.exists(path) {
            debug!("Nothing to clean at {:?}", path);
            return Ok(());
        }

        info!("Removing {:?}", path);
        let removed = if self.runtime.is_dir(path) {
            self.runtime.remove_dir_all(path)
        } else {
            self.runtime.remove_file(path)
        };
        removed.map_err(|e| PyshipError::BuildFailed {
            reason: format!("could not clean previous build output: {:#}", e),
        })
    }

    fn bundler_invocation(&self) -> Invocation {
        let config = self.config;

        let mut data = config.icon.clone().into_os_string();
        data.push(DATA_SEPARATOR);
        data.push(".");

        Invocation::new(self.env.interpreter(), &config.project_dir)
            .args(["-m", "PyInstaller", "--noconfirm", "--onefile", "--windowed"])
            .arg("--name")
            .arg(&config.name)
            .arg("--icon")
            .arg(&config.icon)
            .arg("--add-data")
            .arg(data)
            .arg("--distpath")
            .arg(&config.dist_dir)
            .arg("--workpath")
            .arg(&config.build_dir)
            .arg("--specpath")
            .arg(&config.project_dir)
            .arg("--clean")
            .arg(&config.entry)
    }

    async fn bundle(&self) -> Result<()> {
        let inv = self.bundler_invocation();
        info!("Bundling {:?} as {}", self.config.entry, self.config.name);

        let status = self.runtime.run(&inv).await;
        if !status.success() {
            return Err(PyshipError::BuildFailed {
                reason: format!("bundler failed ({})", status),
            });
        }
        Ok(())
    }
}
