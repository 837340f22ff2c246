//! Configuration loading and data folder resolution

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// TOML configuration file contents (`fidorev/config.toml` in the OS
/// config directory).
///
/// All fields are optional: the file itself is optional and every value
/// has an environment or compiled fallback.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Data folder holding the portal database
    pub data_folder: Option<PathBuf>,
    /// API key for the suggestion endpoint
    pub suggest_api_key: Option<String>,
    /// Base URL of the OpenAI-compatible completion endpoint
    pub suggest_base_url: Option<String>,
    /// Model name passed to the completion endpoint
    pub suggest_model: Option<String>,
}

/// Load the TOML config file if one exists.
///
/// A missing file is not an error; a present-but-unreadable or
/// unparseable file is.
pub fn load_toml_config() -> Result<TomlConfig> {
    let path = match config_file_path() {
        Some(p) if p.exists() => p,
        _ => return Ok(TomlConfig::default()),
    };
    read_toml_config(&path)
}

/// Read and parse a TOML config file at an explicit path.
pub fn read_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Write a TOML config file, creating parent directories as needed.
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Data folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_data_folder(cli_arg: Option<&str>, env_var_name: &str) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Ok(config) = load_toml_config() {
        if let Some(folder) = config.data_folder {
            return folder;
        }
    }

    // Priority 4: OS-dependent compiled default
    default_data_folder()
}

/// Ensure the data folder exists and return the database path inside it.
pub fn ensure_data_folder(folder: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(folder)?;
    Ok(folder.join("fidorev.db"))
}

/// Default configuration file path for the platform
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("fidorev").join("config.toml"))
}

/// OS-dependent default data folder path
fn default_data_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("fidorev"))
        .unwrap_or_else(|| PathBuf::from("./fidorev_data"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn toml_config_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("fidorev").join("config.toml");

        let config = TomlConfig {
            data_folder: Some(PathBuf::from("/srv/fidorev")),
            suggest_api_key: Some("test-key".to_string()),
            suggest_base_url: None,
            suggest_model: Some("gpt-4".to_string()),
        };
        write_toml_config(&config, &path).unwrap();

        let parsed = read_toml_config(&path).unwrap();
        assert_eq!(parsed.data_folder, Some(PathBuf::from("/srv/fidorev")));
        assert_eq!(parsed.suggest_api_key, Some("test-key".to_string()));
        assert_eq!(parsed.suggest_base_url, None);
        assert_eq!(parsed.suggest_model, Some("gpt-4".to_string()));
    }

    #[test]
    fn cli_argument_wins_over_environment() {
        std::env::set_var("FIDOREV_DATA_TEST_A", "/from/env");
        let folder = resolve_data_folder(Some("/from/cli"), "FIDOREV_DATA_TEST_A");
        assert_eq!(folder, PathBuf::from("/from/cli"));
        std::env::remove_var("FIDOREV_DATA_TEST_A");
    }

    #[test]
    fn environment_used_when_no_cli_argument() {
        std::env::set_var("FIDOREV_DATA_TEST_B", "/from/env");
        let folder = resolve_data_folder(None, "FIDOREV_DATA_TEST_B");
        assert_eq!(folder, PathBuf::from("/from/env"));
        std::env::remove_var("FIDOREV_DATA_TEST_B");
    }

    #[test]
    fn ensure_data_folder_creates_directory() {
        let temp = TempDir::new().unwrap();
        let folder = temp.path().join("nested").join("data");
        let db_path = ensure_data_folder(&folder).unwrap();
        assert!(folder.is_dir());
        assert_eq!(db_path, folder.join("fidorev.db"));
    }
}
