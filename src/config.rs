//! Configuration management
//!
//! Manages tool configuration: the team roster, storage backend selection,
//! coach model settings, and the web server address.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Selectable team member names (fixed roster, never derived from the store)
    #[serde(default = "default_roster")]
    pub roster: Vec<String>,
    /// Storage backend settings
    #[serde(default)]
    pub storage: StorageConfig,
    /// Coach (language model) settings
    #[serde(default)]
    pub coach: CoachConfig,
    /// Web server settings
    #[serde(default)]
    pub server: ServerConfig,
}

fn default_roster() -> Vec<String> {
    vec![
        "Kyle".to_string(),
        "Sarah".to_string(),
        "Mike".to_string(),
        "Admin".to_string(),
    ]
}

/// Which backend persists entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Local SQLite database file
    Sqlite,
    /// Remote Google Sheet over the v4 values API
    Sheets,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackend::Sqlite => write!(f, "sqlite"),
            StorageBackend::Sheets => write!(f, "sheets"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Active backend
    #[serde(default = "default_backend")]
    pub backend: StorageBackend,
    /// SQLite database path (defaults to the data dir)
    #[serde(default)]
    pub database_path: Option<PathBuf>,
    /// Spreadsheet document id (sheets backend)
    #[serde(default)]
    pub spreadsheet_id: Option<String>,
    /// Tab name inside the spreadsheet
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,
    /// Sheets API base URL
    #[serde(default = "default_sheets_base_url")]
    pub api_base_url: String,
    /// Bound on every storage round trip, in seconds
    #[serde(default = "default_storage_timeout")]
    pub request_timeout_secs: u64,
}

fn default_backend() -> StorageBackend {
    StorageBackend::Sqlite
}

fn default_sheet_name() -> String {
    "Daily_AAR_DB".to_string()
}

fn default_sheets_base_url() -> String {
    "https://sheets.googleapis.com".to_string()
}

fn default_storage_timeout() -> u64 {
    15
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            database_path: None,
            spreadsheet_id: None,
            sheet_name: default_sheet_name(),
            api_base_url: default_sheets_base_url(),
            request_timeout_secs: default_storage_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoachConfig {
    /// Model id sent to the endpoint
    #[serde(default = "default_coach_model")]
    pub model: String,
    /// OpenAI-compatible endpoint base URL
    #[serde(default = "default_coach_base_url")]
    pub base_url: String,
    /// Completion token cap
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Bound on the model round trip, in seconds
    #[serde(default = "default_coach_timeout")]
    pub request_timeout_secs: u64,
}

fn default_coach_model() -> String {
    "google/gemini-flash-1.5".to_string()
}

fn default_coach_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_max_tokens() -> u32 {
    256
}

fn default_coach_timeout() -> u64 {
    30
}

impl Default for CoachConfig {
    fn default() -> Self {
        Self {
            model: default_coach_model(),
            base_url: default_coach_base_url(),
            max_tokens: default_max_tokens(),
            request_timeout_secs: default_coach_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            roster: default_roster(),
            storage: StorageConfig::default(),
            coach: CoachConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        let config_path = config_path()?;

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)
                .context("Failed to read config file")?;
            let config: Config = toml::from_str(&contents)
                .context("Failed to parse config file")?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = config_path()?;
        let parent = config_path.parent()
            .context("Config path has no parent")?;

        std::fs::create_dir_all(parent)
            .context("Failed to create config directory")?;

        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        std::fs::write(&config_path, contents)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Resolve the SQLite database path, falling back to the data dir.
    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.storage.database_path {
            Some(path) => Ok(path.clone()),
            None => Ok(data_dir()?.join("aar.db")),
        }
    }

    /// True when `user` is one of the configured roster names.
    pub fn is_roster_member(&self, user: &str) -> bool {
        self.roster.iter().any(|name| name == user)
    }
}

/// Get the configuration file path
pub fn config_path() -> Result<PathBuf> {
    let base = directories::ProjectDirs::from("com", "team-aar", "team-aar")
        .context("Failed to get project directories")?;
    Ok(base.config_dir().join("config.toml"))
}

/// Get the data directory path
pub fn data_dir() -> Result<PathBuf> {
    let base = directories::ProjectDirs::from("com", "team-aar", "team-aar")
        .context("Failed to get project directories")?;
    Ok(base.data_dir().to_path_buf())
}

/// Show current configuration
pub fn show_config() -> Result<()> {
    let config = Config::load()?;

    println!("Storage:");
    println!("  backend:        {}", config.storage.backend);
    println!(
        "  database_path:  {}",
        config
            .database_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| "<unresolved>".to_string())
    );
    println!(
        "  spreadsheet_id: {}",
        config.storage.spreadsheet_id.as_deref().unwrap_or("<not set>")
    );
    println!("  sheet_name:     {}", config.storage.sheet_name);
    println!("  timeout:        {}s", config.storage.request_timeout_secs);

    println!("Coach:");
    println!("  model:          {}", config.coach.model);
    println!("  base_url:       {}", config.coach.base_url);
    println!("  timeout:        {}s", config.coach.request_timeout_secs);
    println!(
        "  api key:        {}",
        if crate::secrets::has_api_key() { "configured" } else { "not set" }
    );

    println!("Server:");
    println!("  listen:         {}:{}", config.server.host, config.server.port);

    println!("Roster: {}", config.roster.join(", "));

    Ok(())
}

/// Set the active storage backend
pub fn set_backend(backend: StorageBackend) -> Result<()> {
    let mut config = Config::load()?;
    config.storage.backend = backend;
    config.save()?;
    println!("Storage backend set to: {}", backend);
    Ok(())
}

/// Set the spreadsheet id for the sheets backend
pub fn set_spreadsheet_id(id: &str) -> Result<()> {
    let mut config = Config::load()?;
    config.storage.spreadsheet_id = Some(id.to_string());
    config.save()?;
    println!("Spreadsheet id set.");
    Ok(())
}

/// Set the coach model id
pub fn set_model(model: &str) -> Result<()> {
    let mut config = Config::load()?;
    config.coach.model = model.to_string();
    config.save()?;
    println!("Coach model set to: {}", model);
    Ok(())
}

/// Replace the roster with a comma-separated list of names
pub fn set_roster(names: &str) -> Result<()> {
    let roster: Vec<String> = names
        .split(',')
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .collect();
    if roster.is_empty() {
        anyhow::bail!("Roster must contain at least one name");
    }

    let mut config = Config::load()?;
    config.roster = roster;
    config.save()?;
    println!("Roster updated: {}", config.roster.join(", "));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.storage.backend, StorageBackend::Sqlite);
        assert_eq!(config.storage.sheet_name, "Daily_AAR_DB");
        assert_eq!(config.coach.model, "google/gemini-flash-1.5");
        assert!(config.is_roster_member("Kyle"));
        assert!(!config.is_roster_member("Nobody"));
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.roster, config.roster);
        assert_eq!(parsed.storage.backend, config.storage.backend);
        assert_eq!(parsed.coach.base_url, config.coach.base_url);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let parsed: Config = toml::from_str(
            r#"
            [storage]
            backend = "sheets"
            spreadsheet_id = "abc123"
            "#,
        )
        .unwrap();
        assert_eq!(parsed.storage.backend, StorageBackend::Sheets);
        assert_eq!(parsed.storage.spreadsheet_id.as_deref(), Some("abc123"));
        assert_eq!(parsed.storage.sheet_name, "Daily_AAR_DB");
        assert_eq!(parsed.server.port, 8080);
    }
}
