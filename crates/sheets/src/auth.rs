//! Token storage for the sheets adapter.
//!
//! Reads/writes ~/.config/linkgrid/auth.json (0600 on Unix). OAuth token
//! exchange happens outside this tool; the adapter consumes a stored
//! bearer token.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE: &str = "https://sheets.googleapis.com";

/// Credentials stored locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    /// Bearer token for the spreadsheet API.
    pub access_token: String,
    /// API base URL.
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

impl Credentials {
    pub fn new(access_token: String, api_base: Option<String>) -> Self {
        Self {
            access_token,
            api_base: api_base.unwrap_or_else(default_api_base),
        }
    }
}

/// Path to the credentials file, if a config directory exists.
pub fn credentials_path() -> Option<PathBuf> {
    dirs::config_dir().map(|c| c.join("linkgrid/auth.json"))
}

/// Load saved credentials. None if missing or unreadable.
pub fn load_credentials() -> Option<Credentials> {
    let path = credentials_path()?;
    let contents = std::fs::read_to_string(&path).ok()?;
    serde_json::from_str(&contents).ok()
}

/// Save credentials, creating the parent directory if needed.
/// Sets 0600 permissions on Unix.
pub fn save_credentials(creds: &Credentials) -> Result<(), String> {
    let path = credentials_path().ok_or("could not determine config directory")?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("failed to create config directory: {}", e))?;
    }

    let contents = serde_json::to_string_pretty(creds)
        .map_err(|e| format!("failed to serialize credentials: {}", e))?;

    std::fs::write(&path, &contents).map_err(|e| format!("failed to write auth file: {}", e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, permissions)
            .map_err(|e| format!("failed to set file permissions: {}", e))?;
    }

    Ok(())
}

/// Delete saved credentials.
pub fn clear_credentials() -> Result<(), String> {
    let Some(path) = credentials_path() else {
        return Ok(());
    };
    if path.exists() {
        std::fs::remove_file(&path).map_err(|e| format!("failed to delete auth file: {}", e))?;
    }
    Ok(())
}
