use log::debug;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{PyshipError, Result};
use crate::runtime::{Runtime, is_path_under, normalize_path};

/// Name of the optional per-project settings file.
pub const PROJECT_FILE: &str = "pyship.json";

pub const DEFAULT_INDEX_URL: &str = "https://pypi.tuna.tsinghua.edu.cn/simple";
pub const DEFAULT_ENV_DIR: &str = "venv";
pub const DEFAULT_MANIFEST: &str = "requirements.txt";
pub const DEFAULT_ENTRY: &str = "app.py";
pub const DEFAULT_ICON: &str = "icon.ico";
pub const DEFAULT_NAME: &str = "ColorFinder";
pub const DEFAULT_BUNDLER_PACKAGE: &str = "pyinstaller";
pub const DEFAULT_BUILD_DIR: &str = "build";
pub const DEFAULT_DIST_DIR: &str = "dist";

#[cfg(windows)]
pub const DEFAULT_PYTHON: &str = "python";
#[cfg(not(windows))]
pub const DEFAULT_PYTHON: &str = "python3";

/// One layer of user-provided settings. Unset fields fall through to the
/// layer below (command line > `pyship.json` > built-in defaults).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub python: Option<PathBuf>,
    pub env_dir: Option<PathBuf>,
    pub manifest: Option<PathBuf>,
    pub index_url: Option<String>,
    pub entry: Option<PathBuf>,
    pub icon: Option<PathBuf>,
    pub name: Option<String>,
    pub bundler_package: Option<String>,
    pub build_dir: Option<PathBuf>,
    pub dist_dir: Option<PathBuf>,
    pub pause: Option<bool>,
}

impl Settings {
    /// Fill every unset field of `self` from `lower`.
    pub fn or(self, lower: Settings) -> Settings {
        Settings {
            python: self.python.or(lower.python),
            env_dir: self.env_dir.or(lower.env_dir),
            manifest: self.manifest.or(lower.manifest),
            index_url: self.index_url.or(lower.index_url),
            entry: self.entry.or(lower.entry),
            icon: self.icon.or(lower.icon),
            name: self.name.or(lower.name),
            bundler_package: self.bundler_package.or(lower.bundler_package),
            build_dir: self.build_dir.or(lower.build_dir),
            dist_dir: self.dist_dir.or(lower.dist_dir),
            pause: self.pause.or(lower.pause),
        }
    }
}

/// Fully resolved configuration for the setup and build procedures.
/// Every path except a bare interpreter name is absolute.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub project_dir: PathBuf,
    pub python: PathBuf,
    pub env_dir: PathBuf,
    pub manifest: PathBuf,
    pub index_url: String,
    pub entry: PathBuf,
    pub icon: PathBuf,
    pub name: String,
    pub bundler_package: String,
    pub build_dir: PathBuf,
    pub dist_dir: PathBuf,
    pub pause: bool,
}

impl Config {
    /// Resolve the configuration for `project_dir` (current directory when `None`),
    /// layering `cli` over the project file over the defaults.
    #[tracing::instrument(skip(runtime, cli))]
    pub fn load<R: Runtime>(
        runtime: &R,
        project_dir: Option<PathBuf>,
        cli: Settings,
    ) -> Result<Self> {
        let cwd = runtime
            .current_dir()
            .map_err(|e| PyshipError::Config(format!("{:#}", e)))?;
        let project_dir = match project_dir {
            Some(dir) => normalize_path(&cwd.join(dir)),
            None => cwd,
        };

        let file = load_project_file(runtime, &project_dir)?;
        Self::resolve(project_dir, cli.or(file))
    }

    fn resolve(project_dir: PathBuf, settings: Settings) -> Result<Self> {
        let at = |value: Option<PathBuf>, default: &str| {
            let path = value.unwrap_or_else(|| PathBuf::from(default));
            normalize_path(&project_dir.join(path))
        };

        let python = match settings.python {
            Some(p) if is_bare_command(&p) => p,
            Some(p) => project_dir.join(p),
            None => PathBuf::from(DEFAULT_PYTHON),
        };

        let index_url = settings
            .index_url
            .unwrap_or_else(|| DEFAULT_INDEX_URL.to_string());
        if !(index_url.starts_with("https://") || index_url.starts_with("http://")) {
            return Err(PyshipError::Config(format!(
                "index URL must start with http:// or https://, got `{}`",
                index_url
            )));
        }

        let name = settings.name.unwrap_or_else(|| DEFAULT_NAME.to_string());
        if name.trim().is_empty()
            || name == "."
            || name == ".."
            || name.contains(['/', '\\'])
        {
            return Err(PyshipError::Config(format!(
                "output name must be a plain file name, got `{}`",
                name
            )));
        }

        let bundler_package = settings
            .bundler_package
            .unwrap_or_else(|| DEFAULT_BUNDLER_PACKAGE.to_string());

        let config = Config {
            python,
            env_dir: at(settings.env_dir, DEFAULT_ENV_DIR),
            manifest: at(settings.manifest, DEFAULT_MANIFEST),
            index_url,
            entry: at(settings.entry, DEFAULT_ENTRY),
            icon: at(settings.icon, DEFAULT_ICON),
            name,
            bundler_package,
            build_dir: at(settings.build_dir, DEFAULT_BUILD_DIR),
            dist_dir: at(settings.dist_dir, DEFAULT_DIST_DIR),
            pause: settings.pause.unwrap_or(true),
            project_dir,
        };
        config.check_output_dirs()?;
        debug!("Resolved configuration: {:?}", config);
        Ok(config)
    }

    /// The build step deletes the work and output directories recursively,
    /// so neither may cover the project, its inputs, or the environment.
    fn check_output_dirs(&self) -> Result<()> {
        let protected = [
            &self.project_dir,
            &self.env_dir,
            &self.manifest,
            &self.entry,
            &self.icon,
        ];
        for (label, dir) in [("build", &self.build_dir), ("dist", &self.dist_dir)] {
            if let Some(path) = protected.iter().find(|p| is_path_under(p, dir)) {
                return Err(PyshipError::Config(format!(
                    "{} directory {} would remove {} when cleaned",
                    label,
                    dir.display(),
                    path.display()
                )));
            }
            if is_path_under(dir, &self.env_dir) {
                return Err(PyshipError::Config(format!(
                    "{} directory {} is inside the environment {}",
                    label,
                    dir.display(),
                    self.env_dir.display()
                )));
            }
        }
        Ok(())
    }

    /// The spec file the bundler generates next to the entry script.
    pub fn spec_file(&self) -> PathBuf {
        self.project_dir.join(format!("{}.spec", self.name))
    }
}

/// A single-component path such as `python3` is looked up on PATH rather
/// than resolved against the project directory.
fn is_bare_command(path: &Path) -> bool {
    !path.is_absolute() && path.components().count() == 1
}

fn load_project_file<R: Runtime>(runtime: &R, project_dir: &Path) -> Result<Settings> {
    let path = project_dir.join(PROJECT_FILE);
    if !runtime.exists(&path) {
        return Ok(Settings::default());
    }

    debug!("Loading project settings from {:?}", path);
    let content = runtime
        .read_to_string(&path)
        .map_err(|e| PyshipError::Config(format!("{:#}", e)))?;
    serde_json::from_str(&content)
        .map_err(|e| PyshipError::Config(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use crate::test_utils::test_project;
    use mockall::predicate::eq;

    fn runtime_without_project_file() -> MockRuntime {
        let mut runtime = MockRuntime::new();
        runtime.expect_current_dir().returning(|| Ok(test_project()));
        runtime
            .expect_exists()
            .with(eq(test_project().join(PROJECT_FILE)))
            .returning(|_| false);
        runtime
    }

    #[test]
    fn test_defaults() {
        let runtime = runtime_without_project_file();

        let config = Config::load(&runtime, None, Settings::default()).unwrap();

        let root = test_project();
        assert_eq!(config.project_dir, root);
        assert_eq!(config.python, PathBuf::from(DEFAULT_PYTHON));
        assert_eq!(config.env_dir, root.join("venv"));
        assert_eq!(config.manifest, root.join("requirements.txt"));
        assert_eq!(config.index_url, DEFAULT_INDEX_URL);
        assert_eq!(config.entry, root.join("app.py"));
        assert_eq!(config.icon, root.join("icon.ico"));
        assert_eq!(config.name, "ColorFinder");
        assert_eq!(config.bundler_package, "pyinstaller");
        assert_eq!(config.build_dir, root.join("build"));
        assert_eq!(config.dist_dir, root.join("dist"));
        assert!(config.pause);
        assert_eq!(config.spec_file(), root.join("ColorFinder.spec"));
    }

    #[test]
    fn test_relative_project_dir_resolves_against_cwd() {
        let mut runtime = MockRuntime::new();
        runtime.expect_current_dir().returning(|| Ok(test_project()));
        runtime.expect_exists().returning(|_| false);

        let config = Config::load(&runtime, Some(PathBuf::from("sub")), Settings::default()).unwrap();

        assert_eq!(config.project_dir, test_project().join("sub"));
        assert_eq!(config.env_dir, test_project().join("sub").join("venv"));
    }

    #[test]
    fn test_cli_overrides_project_file() {
        let mut runtime = MockRuntime::new();
        runtime.expect_current_dir().returning(|| Ok(test_project()));
        runtime
            .expect_exists()
            .with(eq(test_project().join(PROJECT_FILE)))
            .returning(|_| true);
        runtime
            .expect_read_to_string()
            .with(eq(test_project().join(PROJECT_FILE)))
            .returning(|_| {
                Ok(r#"{
                    "name": "FromFile",
                    "index_url": "https://pypi.org/simple",
                    "env_dir": ".venv",
                    "pause": false
                }"#
                .to_string())
            });

        let cli = Settings {
            name: Some("FromCli".into()),
            ..Default::default()
        };
        let config = Config::load(&runtime, None, cli).unwrap();

        assert_eq!(config.name, "FromCli");
        assert_eq!(config.index_url, "https://pypi.org/simple");
        assert_eq!(config.env_dir, test_project().join(".venv"));
        assert!(!config.pause);
    }

    #[test]
    fn test_malformed_project_file_is_config_error() {
        let mut runtime = MockRuntime::new();
        runtime.expect_current_dir().returning(|| Ok(test_project()));
        runtime.expect_exists().returning(|_| true);
        runtime
            .expect_read_to_string()
            .returning(|_| Ok(r#"{ "unknown_key": 1 }"#.to_string()));

        let err = Config::load(&runtime, None, Settings::default()).unwrap_err();

        assert!(matches!(err, PyshipError::Config(_)));
        assert!(err.to_string().contains(PROJECT_FILE));
    }

    #[test]
    fn test_python_path_resolution() {
        let runtime = runtime_without_project_file();
        let cli = Settings {
            python: Some(PathBuf::from("python3.12")),
            ..Default::default()
        };
        let config = Config::load(&runtime, None, cli).unwrap();
        assert_eq!(config.python, PathBuf::from("python3.12"));

        let runtime = runtime_without_project_file();
        let cli = Settings {
            python: Some(PathBuf::from("tools").join("python")),
            ..Default::default()
        };
        let config = Config::load(&runtime, None, cli).unwrap();
        assert_eq!(config.python, test_project().join("tools").join("python"));
    }

    #[test]
    fn test_rejects_non_http_index_url() {
        let runtime = runtime_without_project_file();
        let cli = Settings {
            index_url: Some("ftp://mirror.example.com/simple".into()),
            ..Default::default()
        };

        let err = Config::load(&runtime, None, cli).unwrap_err();
        assert!(matches!(err, PyshipError::Config(_)));
        assert!(err.to_string().contains("ftp://mirror.example.com/simple"));
    }

    #[test]
    fn test_rejects_name_with_separator() {
        for bad in ["", "  ", ".", "..", "dist/App", "dist\\App"] {
            let runtime = runtime_without_project_file();
            let cli = Settings {
                name: Some(bad.into()),
                ..Default::default()
            };
            let err = Config::load(&runtime, None, cli).unwrap_err();
            assert!(matches!(err, PyshipError::Config(_)), "accepted {:?}", bad);
        }
    }

    fn load_with_dirs(build_dir: Option<PathBuf>, dist_dir: Option<PathBuf>) -> Result<Config> {
        let runtime = runtime_without_project_file();
        let cli = Settings {
            build_dir,
            dist_dir,
            ..Default::default()
        };
        Config::load(&runtime, None, cli)
    }

    #[test]
    fn test_rejects_output_dir_equal_to_project() {
        let err = load_with_dirs(None, Some(PathBuf::from("."))).unwrap_err();
        assert!(matches!(err, PyshipError::Config(_)));
        assert!(err.to_string().contains("dist directory"));

        let err = load_with_dirs(Some(test_project()), None).unwrap_err();
        assert!(matches!(err, PyshipError::Config(_)));
        assert!(err.to_string().contains("build directory"));
    }

    #[test]
    fn test_rejects_output_dir_above_project() {
        for dir in [PathBuf::from(".."), PathBuf::from("dist").join("..").join("..")] {
            let err = load_with_dirs(None, Some(dir.clone())).unwrap_err();
            assert!(matches!(err, PyshipError::Config(_)), "accepted {:?}", dir);
        }
    }

    #[test]
    fn test_rejects_output_dir_equal_to_environment() {
        let err = load_with_dirs(Some(PathBuf::from("venv")), None).unwrap_err();
        assert!(matches!(err, PyshipError::Config(_)));
        assert!(err.to_string().contains(&test_project().join("venv").display().to_string()));
    }

    #[test]
    fn test_rejects_output_dir_inside_environment() {
        let err = load_with_dirs(Some(PathBuf::from("venv").join("build")), None).unwrap_err();
        assert!(matches!(err, PyshipError::Config(_)));
        assert!(err.to_string().contains("inside the environment"));
    }

    #[test]
    fn test_rejects_output_dir_covering_inputs() {
        for file in ["app.py", "icon.ico", "requirements.txt"] {
            let err = load_with_dirs(None, Some(PathBuf::from(file))).unwrap_err();
            assert!(matches!(err, PyshipError::Config(_)), "accepted {}", file);
        }

        let runtime = runtime_without_project_file();
        let cli = Settings {
            entry: Some(PathBuf::from("src").join("app.py")),
            build_dir: Some(PathBuf::from("src")),
            ..Default::default()
        };
        let err = Config::load(&runtime, None, cli).unwrap_err();
        assert!(matches!(err, PyshipError::Config(_)));
        assert!(err.to_string().contains("app.py"));
    }

    #[test]
    fn test_accepts_separate_output_dirs() {
        let config = load_with_dirs(
            Some(PathBuf::from("out").join("work")),
            Some(PathBuf::from("out").join(".").join("release")),
        )
        .unwrap();
        assert_eq!(config.build_dir, test_project().join("out").join("work"));
        assert_eq!(config.dist_dir, test_project().join("out").join("release"));
    }

    #[test]
    fn test_settings_or_prefers_upper_layer() {
        let upper = Settings {
            entry: Some("main.py".into()),
            ..Default::default()
        };
        let lower = Settings {
            entry: Some("app.py".into()),
            icon: Some("app.ico".into()),
            ..Default::default()
        };

        let merged = upper.or(lower);
        assert_eq!(merged.entry, Some(PathBuf::from("main.py")));
        assert_eq!(merged.icon, Some(PathBuf::from("app.ico")));
        assert_eq!(merged.name, None);
    }
}
