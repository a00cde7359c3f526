use std::fs;

use camino::Utf8Path;
use camino::Utf8PathBuf;
use config::Config;
use config::ConfigError as ExternalConfigError;
use config::File;
use config::FileFormat;
use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration build/deserialize error")]
    Config(#[from] ExternalConfigError),
    #[error("Failed to read project configuration file")]
    Io(#[from] std::io::Error),
}

/// Platform directories for fsls (config, cache, data).
#[must_use]
pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com.github", "fsls", "fsls")
}

/// External command that evaluates a project file into sources and references.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct CrackerSettings {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
}

/// Options for the initial workspace directory scan.
#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ScanSettings {
    /// Include hidden files and directories.
    pub hidden: bool,
    /// Disable `.gitignore`/`.ignore` handling.
    pub no_ignore: bool,
    pub follow_links: bool,
    pub max_depth: Option<usize>,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    debug: bool,
    log_dir: Option<Utf8PathBuf>,
    cracker: Option<CrackerSettings>,
    scan: ScanSettings,
}

impl Settings {
    pub fn new(project_root: &Utf8Path) -> Result<Self, ConfigError> {
        let user_config_file =
            project_dirs().map(|proj_dirs| proj_dirs.config_dir().join("fsls.toml"));

        Self::load_from_paths(project_root, user_config_file.as_deref())
    }

    fn load_from_paths(
        project_root: &Utf8Path,
        user_config_path: Option<&std::path::Path>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        if let Some(path) = user_config_path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(false));
        }

        for name in [".fsls.toml", "fsls.toml"] {
            let path = project_root.join(name);
            if path.exists() {
                let content = fs::read_to_string(&path)?;
                builder = builder.add_source(File::from_str(&content, FileFormat::Toml));
            }
        }

        let config = builder.build()?;
        let settings: Settings = config.try_deserialize()?;
        tracing::debug!(
            "Loaded settings for {}: cracker configured = {}",
            project_root,
            settings.cracker.is_some()
        );
        Ok(settings)
    }

    #[must_use]
    pub fn debug(&self) -> bool {
        self.debug
    }

    #[must_use]
    pub fn log_dir(&self) -> Option<&Utf8Path> {
        self.log_dir.as_deref()
    }

    #[must_use]
    pub fn cracker(&self) -> Option<&CrackerSettings> {
        self.cracker.as_ref()
    }

    #[must_use]
    pub fn scan(&self) -> &ScanSettings {
        &self.scan
    }
}
