//! Optional TOML configuration, overridden by command-line flags

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::schema::DEFAULT_TABLE_PREFIX;
use crate::{Error, Result};

pub const DEFAULT_EXTENSION: &str = "13jt";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ImportConfig {
    /// Database URL or SQLite path
    pub database: Option<String>,
    /// Prefix of the tables that mirror XML tags
    pub table_prefix: Option<String>,
    /// Source file extension, matched case-insensitively
    pub extension: Option<String>,
}

/// Effective settings after merging flags, config file and defaults
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub database: String,
    pub table_prefix: String,
    pub extension: String,
}

impl ImportConfig {
    /// Flags win over file values; file values win over defaults
    pub fn resolve(self, overrides: ImportConfig) -> Result<Settings> {
        let database = match overrides.database.or(self.database) {
            Some(url) => url,
            None => default_database_path()?.display().to_string(),
        };

        Ok(Settings {
            database,
            table_prefix: overrides
                .table_prefix
                .or(self.table_prefix)
                .unwrap_or_else(|| DEFAULT_TABLE_PREFIX.to_string()),
            extension: overrides
                .extension
                .or(self.extension)
                .unwrap_or_else(|| DEFAULT_EXTENSION.to_string()),
        })
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("jt13-import.toml")
}

/// `jt13.db` in the platform data directory
pub fn default_database_path() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "jt13-import")
        .ok_or_else(|| Error::Config("could not determine data directory".into()))?;
    Ok(dirs.data_dir().join("jt13.db"))
}

pub fn load_config(path: Option<&Path>) -> Result<Option<ImportConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: ImportConfig = toml::from_str(&contents)
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
    Ok(Some(config))
}

/// Create the parent directory of a SQLite database file
pub fn ensure_db_dir(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_file() {
        let file = ImportConfig {
            database: Some("file.db".into()),
            table_prefix: Some("src_".into()),
            extension: None,
        };
        let flags = ImportConfig {
            database: Some("flag.db".into()),
            ..Default::default()
        };

        let settings = file.resolve(flags).unwrap();
        assert_eq!(settings.database, "flag.db");
        assert_eq!(settings.table_prefix, "src_");
        assert_eq!(settings.extension, "13jt");
    }

    #[test]
    fn test_load_config_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jt13-import.toml");
        std::fs::write(&path, "database = \"sqlite://bids.db\"\nextension = \"XML\"\n").unwrap();

        let config = load_config(Some(&path)).unwrap().unwrap();
        assert_eq!(config.database.as_deref(), Some("sqlite://bids.db"));
        assert_eq!(config.extension.as_deref(), Some("XML"));
        assert_eq!(config.table_prefix, None);
    }

    #[test]
    fn test_missing_config_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(Some(&dir.path().join("absent.toml"))).unwrap().is_none());
    }

    #[test]
    fn test_invalid_config_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "database = [").unwrap();
        assert!(matches!(load_config(Some(&path)), Err(Error::Config(_))));
    }
}
