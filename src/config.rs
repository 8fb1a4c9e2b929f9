//! Configuration file handling for budget.
//!
//! The configuration file is stored at `$BUDGET_HOME/config.json` and contains settings for where
//! uploaded statements are kept, which files may be uploaded and how many report snapshots to keep.

use crate::reports::Reports;
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "budget";
const CONFIG_VERSION: u8 = 1;
const REPORT_COPIES: u32 = 5;
const UPLOADS: &str = "uploads";
const REPORTS: &str = ".reports";
const CONFIG_JSON: &str = "config.json";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$BUDGET_HOME` and from there it loads `$BUDGET_HOME/config.json`. It provides
/// paths to other items that are either configurable or are expected in a certain location within
/// the budget home directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    uploads: PathBuf,
    reports: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the data directory, its subdirectories and an initial `config.json` with default
    /// settings.
    ///
    /// # Errors
    /// - Returns an error if `config.json` already exists, or if any file operations fail.
    pub async fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the budget home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.exists() {
            bail!(
                "The config file already exists at '{}'",
                config_path.display()
            )
        }

        let config_file = ConfigFile::default();
        config_file.save(&config_path).await?;

        let config = Self {
            uploads: config_file.uploads_path(&root),
            reports: root.join(REPORTS),
            root,
            config_path,
            config_file,
        };
        utils::make_dir(&config.uploads).await?;
        utils::make_dir(&config.reports).await?;
        Ok(config)
    }

    /// This will
    /// - validate that the `budget_home` exists and that the config file exists
    /// - load the config file
    /// - validate that the uploads and reports directories exist
    /// - return the loaded configuration object
    pub async fn load(budget_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = budget_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("Budget home is missing, run 'budget init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!(
                "The config file is missing '{}', run 'budget init' first",
                config_path.display()
            )
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let config = Self {
            uploads: config_file.uploads_path(&root),
            reports: root.join(REPORTS),
            root,
            config_path,
            config_file,
        };
        if !config.uploads.is_dir() {
            bail!(
                "The uploads directory is missing '{}'",
                config.uploads.display()
            )
        }
        if !config.reports.is_dir() {
            bail!(
                "The reports directory is missing '{}'",
                config.reports.display()
            )
        }
        Ok(config)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// The directory where uploaded statements are stored.
    pub fn uploads(&self) -> &Path {
        &self.uploads
    }

    /// The directory where report snapshots are stored.
    pub fn reports_dir(&self) -> &Path {
        &self.reports
    }

    pub fn report_copies(&self) -> u32 {
        self.config_file.report_copies
    }

    pub fn allowed_extensions(&self) -> &[String] {
        &self.config_file.allowed_extensions
    }

    /// True if `path` has one of the allowed extensions, compared case-insensitively.
    pub fn is_allowed(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .is_some_and(|ext| {
                self.allowed_extensions()
                    .iter()
                    .any(|allowed| allowed.to_lowercase() == ext)
            })
    }

    /// Creates a new `Reports` instance for managing report snapshots.
    pub fn reports(&self) -> Reports {
        Reports::new(self)
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "budget",
///   "config_version": 1,
///   "report_copies": 5,
///   "allowed_extensions": ["csv"],
///   "uploads_path": "uploads"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "budget"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Number of report snapshots to keep
    report_copies: u32,

    /// File extensions that `budget upload` accepts
    #[serde(default = "default_extensions")]
    allowed_extensions: Vec<String>,

    /// Where uploaded statements are stored (optional, relative to config.json or absolute)
    /// Defaults to $BUDGET_HOME/uploads if not specified
    #[serde(skip_serializing_if = "Option::is_none")]
    uploads_path: Option<PathBuf>,
}

fn default_extensions() -> Vec<String> {
    vec![String::from("csv")]
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            report_copies: REPORT_COPIES,
            allowed_extensions: default_extensions(),
            uploads_path: None,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = utils::read(path).await?;

        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }

    /// Returns the stored `uploads_path` if it is absolute, otherwise resolves it against `root`.
    fn uploads_path(&self, root: &Path) -> PathBuf {
        match &self.uploads_path {
            Some(p) if p.is_absolute() => p.clone(),
            Some(p) => root.join(p),
            None => root.join(UPLOADS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_config_create() {
        let dir = TempDir::new().unwrap();
        let home_dir = dir.path().join("budget_home");

        let config = Config::create(&home_dir).await.unwrap();

        assert!(config.config_path().is_file());
        assert!(config.uploads().is_dir());
        assert!(config.reports_dir().is_dir());
        assert_eq!(config.report_copies(), REPORT_COPIES);
        assert_eq!(config.allowed_extensions(), ["csv"]);
    }

    #[tokio::test]
    async fn test_config_create_twice_fails() {
        let dir = TempDir::new().unwrap();
        Config::create(dir.path()).await.unwrap();
        let err = Config::create(dir.path()).await.unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[tokio::test]
    async fn test_config_load() {
        let dir = TempDir::new().unwrap();
        let created = Config::create(dir.path()).await.unwrap();
        let loaded = Config::load(dir.path()).await.unwrap();
        assert_eq!(created.root(), loaded.root());
        assert_eq!(created.uploads(), loaded.uploads());
        assert_eq!(created.config_file, loaded.config_file);
    }

    #[tokio::test]
    async fn test_config_load_missing_home() {
        let dir = TempDir::new().unwrap();
        let result = Config::load(dir.path().join("nope")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_config_load_missing_uploads() {
        let dir = TempDir::new().unwrap();
        let config = Config::create(dir.path()).await.unwrap();
        tokio::fs::remove_dir(config.uploads()).await.unwrap();
        let err = Config::load(dir.path()).await.unwrap_err();
        assert!(err.to_string().contains("uploads directory is missing"));
    }

    #[test]
    fn test_is_allowed() {
        let config = Config {
            root: PathBuf::from("/b"),
            uploads: PathBuf::from("/b/uploads"),
            reports: PathBuf::from("/b/.reports"),
            config_path: PathBuf::from("/b/config.json"),
            config_file: ConfigFile::default(),
        };
        assert!(config.is_allowed(Path::new("Chase1234_Activity_20240131.CSV")));
        assert!(config.is_allowed(Path::new("/tmp/statement.csv")));
        assert!(!config.is_allowed(Path::new("statement.xlsx")));
        assert!(!config.is_allowed(Path::new("csv")));
    }

    #[tokio::test]
    async fn test_config_file_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");

        let original = ConfigFile {
            report_copies: 9,
            allowed_extensions: vec![String::from("csv"), String::from("txt")],
            uploads_path: Some(PathBuf::from("/data/statements")),
            ..ConfigFile::default()
        };
        original.save(&config_path).await.unwrap();
        let loaded = ConfigFile::load(&config_path).await.unwrap();
        assert_eq!(original, loaded);
        assert_eq!(
            loaded.uploads_path(Path::new("/b")),
            PathBuf::from("/data/statements")
        );
    }

    #[tokio::test]
    async fn test_config_file_load_with_minimal_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");

        let json = r#"{
            "app_name": "budget",
            "config_version": 1,
            "report_copies": 3
        }"#;
        utils::write(&config_path, json).await.unwrap();

        let config = ConfigFile::load(&config_path).await.unwrap();
        assert_eq!(config.report_copies, 3);
        assert_eq!(config.allowed_extensions, default_extensions());
        assert_eq!(
            config.uploads_path(Path::new("/b")),
            PathBuf::from("/b/uploads")
        );
    }

    #[tokio::test]
    async fn test_config_file_load_invalid_app_name() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");

        let json = r#"{
            "app_name": "ledger",
            "config_version": 1,
            "report_copies": 5
        }"#;
        utils::write(&config_path, json).await.unwrap();

        let result = ConfigFile::load(&config_path).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid app_name"));
    }

    #[test]
    fn test_config_file_serialization_omits_none_fields() {
        let json = serde_json::to_string(&ConfigFile::default()).unwrap();
        assert!(!json.contains("uploads_path"));
        assert!(json.contains("allowed_extensions"));
    }
}
