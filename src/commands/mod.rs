//! Console layer: runs a procedure and turns its outcome into text, a pause
//! and a process exit code.

use log::{debug, warn};
use std::io::{self, Write};
use std::path::PathBuf;

use crate::application::{BuildReport, BuildUseCase, SetupReport, SetupUseCase};
use crate::error::PyshipError;
use crate::runtime::Runtime;

pub mod config;

use config::{Config, Settings};

pub const PAUSE_PROMPT: &str = "Press Enter to exit...";

const BANNER: &str = "========================================";

/// The two procedures the tool offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Procedure {
    Setup,
    Build,
}

/// Create the isolated environment and install the dependency manifest.
#[tracing::instrument(skip(runtime, config))]
pub async fn setup<R: Runtime>(runtime: &R, config: &Config) -> Result<SetupReport, PyshipError> {
    SetupUseCase::new(runtime, config).execute().await
}

/// Bundle the entry script into a single windowed executable.
#[tracing::instrument(skip(runtime, config))]
pub async fn build<R: Runtime>(runtime: &R, config: &Config) -> Result<BuildReport, PyshipError> {
    BuildUseCase::new(runtime, config).execute().await
}

/// Run `procedure` end to end and return the process exit code.
pub async fn run<R: Runtime>(
    runtime: &R,
    procedure: Procedure,
    project_dir: Option<PathBuf>,
    cli: Settings,
) -> i32 {
    let mut stdout = io::stdout();
    let mut stderr = io::stderr();
    let pause_requested = cli.pause.unwrap_or(true);

    let (code, pause) = match Config::load(runtime, project_dir, cli) {
        Ok(config) => {
            let code = match execute(runtime, procedure, &config, &mut stdout).await {
                Ok(()) => 0,
                Err(e) => {
                    report_failure(&mut stderr, &e);
                    e.exit_code()
                }
            };
            (code, config.pause)
        }
        Err(e) => {
            report_failure(&mut stderr, &e);
            (e.exit_code(), pause_requested)
        }
    };

    pause_before_exit(runtime, pause);
    code
}

/// Wait for Enter when `requested` and a user is at the terminal.
pub fn pause_before_exit<R: Runtime>(runtime: &R, requested: bool) {
    if requested && runtime.is_interactive() {
        if let Err(e) = runtime.pause(PAUSE_PROMPT) {
            debug!("Pause interrupted: {:#}", e);
        }
    }
}

async fn execute<R: Runtime, W: Write>(
    runtime: &R,
    procedure: Procedure,
    config: &Config,
    out: &mut W,
) -> Result<(), PyshipError> {
    let written = match procedure {
        Procedure::Setup => write_setup_success(out, &setup(runtime, config).await?, config),
        Procedure::Build => write_build_success(out, &build(runtime, config).await?),
    };
    if let Err(e) = written {
        warn!("Failed to write report: {}", e);
    }
    Ok(())
}

pub(crate) fn write_setup_success<W: Write>(
    out: &mut W,
    report: &SetupReport,
    config: &Config,
) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", BANNER)?;
    writeln!(out, "  Environment setup complete")?;
    writeln!(out, "{}", BANNER)?;
    if report.created {
        writeln!(out, "Created environment: {}", report.env_dir.display())?;
    } else {
        writeln!(out, "Reused environment: {}", report.env_dir.display())?;
    }
    writeln!(out)?;
    writeln!(out, "Next step: run `pyship build` to package {}.", config.name)?;
    Ok(())
}

pub(crate) fn write_build_success<W: Write>(out: &mut W, report: &BuildReport) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", BANNER)?;
    writeln!(out, "  Build complete")?;
    writeln!(out, "{}", BANNER)?;
    writeln!(out, "Executable: {}", report.artifact.display())?;
    Ok(())
}

pub(crate) fn report_failure<W: Write>(err: &mut W, e: &PyshipError) {
    let _ = writeln!(err);
    let _ = writeln!(err, "ERROR: {}", e);
    let _ = writeln!(err, "{}", e.remediation());
}
