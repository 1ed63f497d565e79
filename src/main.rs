use clap::Parser;
use pyship::commands::{self, Procedure, config::Settings};
use std::ffi::OsString;
use std::path::PathBuf;

/// pyship - set up a Python project's environment and bundle it
///
/// `setup` creates an isolated environment and installs requirements.txt from
/// a package index mirror. `build` bundles the entry script into a single-file
/// windowed executable with an embedded icon.
///
/// Options may also be given in a pyship.json file in the project directory.
///
/// Examples:
///   pyship setup                                       # Prepare the environment
///   pyship build                                       # Produce dist/ColorFinder
///   pyship --index-url https://pypi.org/simple setup   # Use the default index
#[derive(Parser, Debug)]
#[command(author, version = env!("PYSHIP_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Project directory (defaults to the current directory)
    #[arg(
        long = "project-dir",
        short = 'C',
        env = "PYSHIP_PROJECT_DIR",
        value_name = "PATH",
        global = true
    )]
    project_dir: Option<PathBuf>,

    /// Python interpreter used to create the environment
    #[arg(long, env = "PYSHIP_PYTHON", value_name = "PATH", global = true)]
    python: Option<PathBuf>,

    /// Isolated environment directory (default: venv)
    #[arg(long = "env-dir", env = "PYSHIP_ENV_DIR", value_name = "PATH", global = true)]
    env_dir: Option<PathBuf>,

    /// Dependency manifest (default: requirements.txt)
    #[arg(long, env = "PYSHIP_MANIFEST", value_name = "PATH", global = true)]
    manifest: Option<PathBuf>,

    /// Package index mirror (default: https://pypi.tuna.tsinghua.edu.cn/simple)
    #[arg(long = "index-url", env = "PYSHIP_INDEX_URL", value_name = "URL", global = true)]
    index_url: Option<String>,

    /// Entry script to bundle (default: app.py)
    #[arg(long, env = "PYSHIP_ENTRY", value_name = "PATH", global = true)]
    entry: Option<PathBuf>,

    /// Icon embedded in the executable (default: icon.ico)
    #[arg(long, env = "PYSHIP_ICON", value_name = "PATH", global = true)]
    icon: Option<PathBuf>,

    /// Name of the executable (default: ColorFinder)
    #[arg(long, env = "PYSHIP_NAME", value_name = "NAME", global = true)]
    name: Option<String>,

    /// Package that provides the bundler (default: pyinstaller)
    #[arg(
        long = "bundler-package",
        env = "PYSHIP_BUNDLER_PACKAGE",
        value_name = "SPEC",
        global = true
    )]
    bundler_package: Option<String>,

    /// Bundler staging directory (default: build)
    #[arg(long = "build-dir", env = "PYSHIP_BUILD_DIR", value_name = "PATH", global = true)]
    build_dir: Option<PathBuf>,

    /// Output directory (default: dist)
    #[arg(long = "dist-dir", env = "PYSHIP_DIST_DIR", value_name = "PATH", global = true)]
    dist_dir: Option<PathBuf>,

    /// Exit without waiting for Enter
    #[arg(long = "no-pause", env = "PYSHIP_NO_PAUSE", global = true)]
    no_pause: bool,
}

#[derive(clap::Subcommand, Debug, Clone, Copy, PartialEq)]
enum Commands {
    /// Create the isolated environment and install dependencies
    Setup,

    /// Bundle the entry script into a single-file executable
    Build,
}

impl Cli {
    fn settings(&self) -> Settings {
        Settings {
            python: self.python.clone(),
            env_dir: self.env_dir.clone(),
            manifest: self.manifest.clone(),
            index_url: self.index_url.clone(),
            entry: self.entry.clone(),
            icon: self.icon.clone(),
            name: self.name.clone(),
            bundler_package: self.bundler_package.clone(),
            build_dir: self.build_dir.clone(),
            dist_dir: self.dist_dir.clone(),
            pause: self.no_pause.then_some(false),
        }
    }

    fn procedure(&self) -> Procedure {
        match self.command {
            Commands::Setup => Procedure::Setup,
            Commands::Build => Procedure::Build,
        }
    }
}

/// Whether the user opted out of the pause when the command line itself
/// could not be parsed. `env` is read the way clap reads a flag's env value.
fn no_pause_requested<I>(args: I, env: Option<OsString>) -> bool
where
    I: IntoIterator<Item = OsString>,
{
    let flag = args.into_iter().any(|arg| arg == "--no-pause");
    let from_env = env.is_some_and(|value| {
        let value = value.to_string_lossy().to_ascii_lowercase();
        !matches!(value.as_str(), "" | "n" | "no" | "f" | "false" | "off" | "0")
    });
    flag || from_env
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let runtime = pyship::runtime::RealRuntime;
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            // --help and --version also arrive here and go to stdout
            if e.use_stderr() {
                let pause = !no_pause_requested(
                    std::env::args_os(),
                    std::env::var_os("PYSHIP_NO_PAUSE"),
                );
                commands::pause_before_exit(&runtime, pause);
            }
            std::process::exit(e.exit_code());
        }
    };

    let code = commands::run(&runtime, cli.procedure(), cli.project_dir.clone(), cli.settings()).await;
    std::process::exit(code);
}
