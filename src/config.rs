use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use rectdb_db::{EditStrategy, rectangle};
use serde::{Deserialize, Serialize};

use crate::errors::Result;

pub const CONNECTION_NAME: &str = "rectangles_conn";
pub const DATABASE_FILE: &str = "rectangle_data.sqlite";
const CONFIG_FILE: &str = "config.json";
const LOG_FILE: &str = "rectdb.log";

/// User settings read from `config.json`; absent keys take defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub connection_name: String,
    /// Relative paths resolve against the working directory.
    pub database_file: PathBuf,
    pub table: String,
    pub edit_strategy: EditStrategy,
    pub hide_id_column: bool,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            connection_name: CONNECTION_NAME.to_string(),
            database_file: PathBuf::from(DATABASE_FILE),
            table: rectangle::TABLE.to_string(),
            edit_strategy: EditStrategy::default(),
            hide_id_column: true,
            log_file: None,
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "rectdb")
}

impl Config {
    /// `<config dir>/config.json`, when the platform has a config dir.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// Load from the default location. A missing file yields defaults.
    ///
    /// # Errors
    ///
    /// Fails when the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// # Errors
    ///
    /// Fails when the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Configured log file, else `rectdb.log` in the data dir.
    #[must_use]
    pub fn log_path(&self) -> Option<PathBuf> {
        self.log_file
            .clone()
            .or_else(|| project_dirs().map(|dirs| dirs.data_dir().join(LOG_FILE)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.connection_name, "rectangles_conn");
        assert_eq!(config.database_file, PathBuf::from("rectangle_data.sqlite"));
        assert_eq!(config.table, "rectangle");
        assert_eq!(config.edit_strategy, EditStrategy::OnRowChange);
        assert!(config.hide_id_column);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{ "database_file": "/tmp/other.sqlite", "edit_strategy": "on_manual_submit" }"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.database_file, PathBuf::from("/tmp/other.sqlite"));
        assert_eq!(config.edit_strategy, EditStrategy::OnManualSubmit);
        assert_eq!(config.connection_name, CONNECTION_NAME);
    }

    #[test]
    fn test_full_file_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = Config {
            hide_id_column: false,
            log_file: Some(dir.path().join("x.log")),
            ..Config::default()
        };
        fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
        assert_eq!(config.log_path(), Some(dir.path().join("x.log")));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
