//! Keyring integration for secure credential storage
//! Falls back to file storage if keyring is unavailable

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

const SERVICE_NAME: &str = "team-aar";
const API_KEY_USERNAME: &str = "llm-api-key";
const SHEETS_TOKEN_USERNAME: &str = "sheets-token";
const API_KEY_FILE: &str = "api_key.txt";
const SHEETS_TOKEN_FILE: &str = "sheets_token.txt";

/// Get the path for a fallback secret file
fn secret_file_path(file: &str) -> Result<PathBuf> {
    let base = directories::ProjectDirs::from("com", "team-aar", "team-aar")
        .context("Failed to get project directories")?;
    let dir = base.config_dir();
    fs::create_dir_all(dir).context("Failed to create config directory")?;
    Ok(dir.join(file))
}

fn save_to_file(file: &str, value: &str) -> Result<()> {
    let path = secret_file_path(file)?;
    fs::write(&path, value).context("Failed to write secret file")?;

    // Set restrictive permissions on Unix
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o600))
            .context("Failed to set file permissions")?;
    }

    Ok(())
}

fn set_secret(username: &str, file: &str, value: &str) -> Result<()> {
    // Try keyring first
    if let Ok(entry) = keyring::Entry::new(SERVICE_NAME, username) {
        if entry.set_password(value).is_ok() {
            return Ok(());
        }
    }

    // Fallback to file storage
    save_to_file(file, value)?;
    println!("Note: Using file-based storage (keyring unavailable)");
    Ok(())
}

fn get_secret(username: &str, file: &str, hint: &str) -> Result<String> {
    // Try keyring first
    if let Ok(entry) = keyring::Entry::new(SERVICE_NAME, username) {
        if let Ok(value) = entry.get_password() {
            return Ok(value);
        }
    }

    // Fallback to file
    let path = secret_file_path(file)?;
    let value = fs::read_to_string(&path).with_context(|| hint.to_string())?;
    Ok(value.trim().to_string())
}

fn delete_secret(username: &str, file: &str) -> Result<()> {
    if let Ok(entry) = keyring::Entry::new(SERVICE_NAME, username) {
        let _ = entry.delete_credential();
    }

    let path = secret_file_path(file)?;
    if path.exists() {
        fs::remove_file(&path).context("Failed to delete secret file")?;
    }

    Ok(())
}

fn has_secret(username: &str, file: &str) -> bool {
    if let Ok(entry) = keyring::Entry::new(SERVICE_NAME, username) {
        if entry.get_password().is_ok() {
            return true;
        }
    }

    secret_file_path(file).map(|p| p.exists()).unwrap_or(false)
}

/// Set the LLM API key
pub fn set_api_key(key: &str) -> Result<()> {
    set_secret(API_KEY_USERNAME, API_KEY_FILE, key)
}

/// Get the LLM API key
pub fn get_api_key() -> Result<String> {
    get_secret(
        API_KEY_USERNAME,
        API_KEY_FILE,
        "Failed to read LLM API key. Run 'team-aar config --set-api-key YOUR_KEY' first.",
    )
}

/// Delete the LLM API key
pub fn delete_api_key() -> Result<()> {
    delete_secret(API_KEY_USERNAME, API_KEY_FILE)
}

/// Check if the LLM API key is set
pub fn has_api_key() -> bool {
    has_secret(API_KEY_USERNAME, API_KEY_FILE)
}

/// Set the Sheets bearer token
pub fn set_sheets_token(token: &str) -> Result<()> {
    set_secret(SHEETS_TOKEN_USERNAME, SHEETS_TOKEN_FILE, token)
}

/// Get the Sheets bearer token
pub fn get_sheets_token() -> Result<String> {
    get_secret(
        SHEETS_TOKEN_USERNAME,
        SHEETS_TOKEN_FILE,
        "Failed to read Sheets token. Run 'team-aar config --set-sheets-token YOUR_TOKEN' first.",
    )
}

/// Delete the Sheets bearer token
pub fn delete_sheets_token() -> Result<()> {
    delete_secret(SHEETS_TOKEN_USERNAME, SHEETS_TOKEN_FILE)
}

/// Check if a Sheets token is set
pub fn has_sheets_token() -> bool {
    has_secret(SHEETS_TOKEN_USERNAME, SHEETS_TOKEN_FILE)
}
