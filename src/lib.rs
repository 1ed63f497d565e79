pub mod application;
pub mod commands;
pub mod error;
pub mod layout;
pub mod runtime;

/// Test utilities for cross-platform path handling.
#[cfg(test)]
pub mod test_utils {
    use crate::commands::config::{
        Config, DEFAULT_BUNDLER_PACKAGE, DEFAULT_INDEX_URL, DEFAULT_NAME, DEFAULT_PYTHON,
    };
    use std::path::PathBuf;

    /// Returns the test project directory based on the platform.
    /// - Unix: `/home/user/colorfinder`
    /// - Windows: `C:\Users\user\colorfinder`
    pub fn test_project() -> PathBuf {
        #[cfg(not(windows))]
        {
            PathBuf::from("/home/user/colorfinder")
        }
        #[cfg(windows)]
        {
            PathBuf::from(r"C:\Users\user\colorfinder")
        }
    }

    /// A configuration with every default resolved under [`test_project`].
    pub fn test_config() -> Config {
        let root = test_project();
        Config {
            python: PathBuf::from(DEFAULT_PYTHON),
            env_dir: root.join("venv"),
            manifest: root.join("requirements.txt"),
            index_url: DEFAULT_INDEX_URL.to_string(),
            entry: root.join("app.py"),
            icon: root.join("icon.ico"),
            name: DEFAULT_NAME.to_string(),
            bundler_package: DEFAULT_BUNDLER_PACKAGE.to_string(),
            build_dir: root.join("build"),
            dist_dir: root.join("dist"),
            pause: false,
            project_dir: root,
        }
    }
}
