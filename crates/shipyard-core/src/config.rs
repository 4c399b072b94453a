//! Configuration loading and discovery.
//!
//! A configuration file describes the release [`Model`] at its top level and
//! carries tool settings in a `[settings]` table:
//!
//! ```toml
//! [settings]
//! log_level = "debug"
//!
//! [project]
//! name = "app"
//! version = "1.0.0"
//! ```
//!
//! # Supported formats
//!
//! - TOML (`.toml`)
//! - YAML (`.yaml`, `.yml`)
//! - JSON (`.json`)
//!
//! # Config file locations (in order of precedence, highest first):
//! - explicit files, last added first
//! - `.shipyard.<ext>` or `shipyard.<ext>` in the search root or any parent
//! - `~/.config/shipyard/config.<ext>` (user config)
//!
//! Every file is parsed on its own and the results are folded with
//! [`Merge`], so a value set in a higher-precedence file is never replaced
//! and unset values fall through to the next file. Environment variables
//! are not merged here: the property resolver consults them lazily.
//!
//! # Example
//! ```no_run
//! use camino::Utf8PathBuf;
//! use shipyard_core::config::ConfigLoader;
//!
//! let cwd = std::env::current_dir().unwrap();
//! let cwd = Utf8PathBuf::try_from(cwd).expect("current directory is not valid UTF-8");
//! let loaded = ConfigLoader::new()
//!     .with_project_search(&cwd)
//!     .load()
//!     .unwrap();
//! println!("{:?}", loaded.model.project.name);
//! ```

use camino::{Utf8Path, Utf8PathBuf};
use figment::Figment;
use figment::providers::{Format, Json, Toml, Yaml};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::merge::Merge;
use crate::merge_fields;
use crate::model::Model;

/// Tool settings from the `[settings]` table.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Log level (e.g., "debug", "info", "warn", "error").
    pub log_level: Option<LogLevel>,
    /// Directory for JSONL log files (falls back to platform defaults if unset).
    pub log_dir: Option<Utf8PathBuf>,
}

impl Merge for Config {
    fn merge(&mut self, other: Self) {
        merge_fields!(self, other, [log_level]);
        if self.log_dir.is_none() {
            self.log_dir = other.log_dir;
        }
    }
}

impl Config {
    /// Configured log level, or [`LogLevel::Info`].
    pub fn log_level(&self) -> LogLevel {
        self.log_level.unwrap_or_default()
    }
}

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Verbose output for debugging and development.
    Debug,
    /// Standard operational information (default).
    #[default]
    Info,
    /// Warnings about potential issues.
    Warn,
    /// Errors that indicate failures.
    Error,
}

impl LogLevel {
    /// Returns the log level as a lowercase string slice.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl Merge for LogLevel {
    fn merge(&mut self, _other: Self) {}
}

/// One configuration file as written.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Document {
    settings: Config,
    #[serde(flatten)]
    model: Model,
}

/// Everything read from the configuration sources.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedConfig {
    /// Tool settings.
    pub config: Config,
    /// Release model, before validation.
    pub model: Model,
    /// Files read, highest precedence first.
    pub sources: Vec<Utf8PathBuf>,
}

/// Supported configuration file extensions (in order of preference).
const CONFIG_EXTENSIONS: &[&str] = &["toml", "yaml", "yml", "json"];

/// Application name for XDG directory lookup and config file names.
const APP_NAME: &str = "shipyard";

/// Builder for loading configuration from multiple sources.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    /// Starting directory for project config search.
    project_search_root: Option<Utf8PathBuf>,
    /// Whether to include user config from XDG directory.
    include_user_config: bool,
    /// Stop searching when we hit a directory containing this file/dir.
    boundary_marker: Option<String>,
    /// Explicit config files to load.
    explicit_files: Vec<Utf8PathBuf>,
}

impl ConfigLoader {
    /// Create a new config loader with default settings.
    pub fn new() -> Self {
        Self {
            project_search_root: None,
            include_user_config: true,
            boundary_marker: Some(".git".to_string()),
            explicit_files: Vec::new(),
        }
    }

    /// Set the starting directory for project config search.
    ///
    /// The loader will walk up from this directory looking for config files.
    pub fn with_project_search<P: AsRef<Utf8Path>>(mut self, path: P) -> Self {
        self.project_search_root = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set whether to include user config from `~/.config/shipyard/`.
    pub const fn with_user_config(mut self, include: bool) -> Self {
        self.include_user_config = include;
        self
    }

    /// Set a boundary marker to stop directory traversal.
    ///
    /// When walking up directories, stop if we find a directory containing
    /// this file or directory name. Default is `.git`.
    pub fn with_boundary_marker<S: Into<String>>(mut self, marker: S) -> Self {
        self.boundary_marker = Some(marker.into());
        self
    }

    /// Disable boundary marker (search all the way to filesystem root).
    pub fn without_boundary_marker(mut self) -> Self {
        self.boundary_marker = None;
        self
    }

    /// Add an explicit config file to load.
    ///
    /// Later files take precedence over earlier ones, and every explicit
    /// file takes precedence over discovered files.
    pub fn with_file<P: AsRef<Utf8Path>>(mut self, path: P) -> Self {
        self.explicit_files.push(path.as_ref().to_path_buf());
        self
    }

    /// Files that would be read, highest precedence first.
    pub fn sources(&self) -> Vec<Utf8PathBuf> {
        let mut sources: Vec<Utf8PathBuf> = self.explicit_files.iter().rev().cloned().collect();
        if let Some(ref root) = self.project_search_root
            && let Some(project_config) = self.find_project_config(root)
        {
            sources.push(project_config);
        }
        if self.include_user_config
            && let Some(user_config) = self.find_user_config()
        {
            sources.push(user_config);
        }
        sources
    }

    /// Load configuration, folding all discovered sources.
    ///
    /// Precedence (highest to lowest):
    /// 1. Explicit files (last added first)
    /// 2. Project config (closest to search root)
    /// 3. User config (`~/.config/shipyard/config.<ext>`)
    #[tracing::instrument(skip(self), fields(search_root = ?self.project_search_root))]
    pub fn load(self) -> ConfigResult<LoadedConfig> {
        tracing::debug!("loading configuration");
        let sources = self.sources();
        let mut loaded = LoadedConfig::default();
        for source in &sources {
            let document = Self::read(source)?;
            loaded.config.merge(document.settings);
            loaded.model.merge(document.model);
            tracing::debug!(path = %source, "configuration source merged");
        }
        loaded.sources = sources;
        tracing::info!(
            log_level = loaded.config.log_level().as_str(),
            sources = loaded.sources.len(),
            "configuration loaded"
        );
        Ok(loaded)
    }

    /// Load configuration, returning an error if no config file is found.
    pub fn load_or_error(self) -> ConfigResult<LoadedConfig> {
        if self.sources().is_empty() {
            return Err(ConfigError::NotFound);
        }
        self.load()
    }

    /// Find project config by walking up from the given directory.
    fn find_project_config(&self, start: &Utf8Path) -> Option<Utf8PathBuf> {
        let mut current = Some(start.to_path_buf());

        while let Some(dir) = current {
            if let Some(ref marker) = self.boundary_marker {
                let marker_path = dir.join(marker);
                if marker_path.exists() && dir != start {
                    break;
                }
            }

            for ext in CONFIG_EXTENSIONS {
                let dotfile = dir.join(format!(".{APP_NAME}.{ext}"));
                if dotfile.is_file() {
                    return Some(dotfile);
                }

                let regular = dir.join(format!("{APP_NAME}.{ext}"));
                if regular.is_file() {
                    return Some(regular);
                }
            }

            current = dir.parent().map(Utf8Path::to_path_buf);
        }

        None
    }

    /// Find user config in XDG config directory.
    fn find_user_config(&self) -> Option<Utf8PathBuf> {
        let config_dir = user_config_dir()?;
        CONFIG_EXTENSIONS
            .iter()
            .map(|ext| config_dir.join(format!("config.{ext}")))
            .find(|path| path.is_file())
    }

    /// Parse one file, detecting format from extension.
    fn read(path: &Utf8Path) -> ConfigResult<Document> {
        let figment = match path.extension() {
            Some("yaml" | "yml") => Figment::from(Yaml::file_exact(path.as_str())),
            Some("json") => Figment::from(Json::file_exact(path.as_str())),
            _ => Figment::from(Toml::file_exact(path.as_str())),
        };
        figment
            .extract()
            .map_err(|e| ConfigError::Deserialize(Box::new(e)))
    }
}

/// Find the project config file path without loading it.
///
/// Useful for commands that need to know where config is located.
pub fn find_project_config<P: AsRef<Utf8Path>>(start: P) -> Option<Utf8PathBuf> {
    ConfigLoader::new()
        .without_boundary_marker()
        .find_project_config(start.as_ref())
}

/// Get the project directories for XDG-compliant path resolution.
///
/// Returns `None` if the home directory cannot be determined.
fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "", APP_NAME)
}

/// Get the user config directory path.
///
/// Returns `~/.config/shipyard/` on Linux, `~/Library/Application Support/shipyard/`
/// on macOS, and equivalent on other platforms.
pub fn user_config_dir() -> Option<Utf8PathBuf> {
    let proj_dirs = project_dirs()?;
    Utf8PathBuf::from_path_buf(proj_dirs.config_dir().to_path_buf()).ok()
}

/// Get the local data directory path (machine-specific, not synced).
///
/// Returns `~/.local/share/shipyard/` on Linux and the platform equivalent
/// elsewhere. Log files default to a `logs` directory under it.
pub fn user_data_local_dir() -> Option<Utf8PathBuf> {
    let proj_dirs = project_dirs()?;
    Utf8PathBuf::from_path_buf(proj_dirs.data_local_dir().to_path_buf()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::Active;
    use std::fs;
    use tempfile::TempDir;

    fn utf8(tmp: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap()
    }

    #[test]
    fn test_loader_builds_with_defaults() {
        let loaded = ConfigLoader::new()
            .with_user_config(false)
            .without_boundary_marker()
            .load()
            .unwrap();
        assert_eq!(loaded.config.log_level(), LogLevel::Info);
        assert!(loaded.sources.is_empty());
        assert_eq!(loaded.model, Model::default());
    }

    #[test]
    fn test_settings_and_model_share_a_file() {
        let tmp = TempDir::new().unwrap();
        let path = utf8(&tmp).join("config.toml");
        fs::write(
            &path,
            r##"
[settings]
log_level = "debug"
log_dir = "/tmp/shipyard"

[project]
name = "app"
version = "1.0.0"

[announce.slack]
active = "ALWAYS"
channel = "#releases"
"##,
        )
        .unwrap();

        let loaded = ConfigLoader::new()
            .with_user_config(false)
            .with_file(&path)
            .load()
            .unwrap();

        assert_eq!(loaded.config.log_level(), LogLevel::Debug);
        assert_eq!(loaded.config.log_dir.as_deref().map(Utf8Path::as_str), Some("/tmp/shipyard"));
        assert_eq!(loaded.model.project.name.as_deref(), Some("app"));
        assert_eq!(loaded.model.announce.slack.base.active, Some(Active::Always));
        assert_eq!(loaded.model.announce.slack.channel.as_deref(), Some("#releases"));
    }

    #[test]
    fn test_later_file_fills_only_gaps() {
        let tmp = TempDir::new().unwrap();
        let dir = utf8(&tmp);
        let base = dir.join("base.toml");
        fs::write(
            &base,
            "[settings]\nlog_level = \"warn\"\n\n[project]\nname = \"base\"\ndescription = \"from base\"\n",
        )
        .unwrap();
        let local = dir.join("local.yaml");
        fs::write(&local, "settings:\n  log_level: error\nproject:\n  name: local\n").unwrap();

        let loaded = ConfigLoader::new()
            .with_user_config(false)
            .with_file(&base)
            .with_file(&local)
            .load()
            .unwrap();

        assert_eq!(loaded.config.log_level(), LogLevel::Error);
        assert_eq!(loaded.model.project.name.as_deref(), Some("local"));
        assert_eq!(loaded.model.project.description.as_deref(), Some("from base"));
        assert_eq!(loaded.sources, [local, base]);
    }

    #[test]
    fn test_project_config_discovery() {
        let tmp = TempDir::new().unwrap();
        let project_dir = utf8(&tmp).join("project");
        let sub_dir = project_dir.join("src").join("deep");
        fs::create_dir_all(&sub_dir).unwrap();
        fs::write(project_dir.join(".shipyard.json"), r#"{"settings": {"log_level": "debug"}}"#).unwrap();

        let loaded = ConfigLoader::new()
            .with_user_config(false)
            .without_boundary_marker()
            .with_project_search(&sub_dir)
            .load()
            .unwrap();

        assert_eq!(loaded.config.log_level(), LogLevel::Debug);
        assert_eq!(find_project_config(&sub_dir), Some(project_dir.join(".shipyard.json")));
    }

    #[test]
    fn test_boundary_marker_stops_search() {
        let tmp = TempDir::new().unwrap();
        let parent = utf8(&tmp).join("parent");
        let child = parent.join("child");
        let work = child.join("work");
        fs::create_dir_all(&work).unwrap();
        fs::write(parent.join("shipyard.toml"), "[settings]\nlog_level = \"warn\"\n").unwrap();
        fs::create_dir(child.join(".git")).unwrap();

        let loaded = ConfigLoader::new()
            .with_user_config(false)
            .with_boundary_marker(".git")
            .with_project_search(&work)
            .load()
            .unwrap();

        assert_eq!(loaded.config.log_level(), LogLevel::Info);
        assert!(loaded.sources.is_empty());
    }

    #[test]
    fn test_explicit_file_overrides_project_config() {
        let tmp = TempDir::new().unwrap();
        let dir = utf8(&tmp);
        fs::write(dir.join("shipyard.toml"), "[project]\nname = \"project\"\nversion = \"1.0.0\"\n").unwrap();
        let explicit = dir.join("override.toml");
        fs::write(&explicit, "[project]\nname = \"override\"\n").unwrap();

        let loaded = ConfigLoader::new()
            .with_user_config(false)
            .without_boundary_marker()
            .with_project_search(&dir)
            .with_file(&explicit)
            .load()
            .unwrap();

        assert_eq!(loaded.model.project.name.as_deref(), Some("override"));
        assert_eq!(loaded.model.project.version.as_deref(), Some("1.0.0"));
    }

    #[test]
    fn test_invalid_file_is_reported() {
        let tmp = TempDir::new().unwrap();
        let path = utf8(&tmp).join("shipyard.toml");
        fs::write(&path, "[project\nname = ").unwrap();

        let result = ConfigLoader::new().with_user_config(false).with_file(&path).load();
        assert!(matches!(result, Err(ConfigError::Deserialize(_))));
    }

    #[test]
    fn test_load_or_error_fails_when_no_config() {
        let result = ConfigLoader::new()
            .with_user_config(false)
            .without_boundary_marker()
            .load_or_error();

        assert!(matches!(result, Err(ConfigError::NotFound)));
    }

    #[test]
    fn test_user_config_dir() {
        if let Some(path) = user_config_dir() {
            assert!(path.as_str().contains("shipyard"));
        }
    }
}
