use anyhow::{Context, Result};
use directories::ProjectDirs;
use keyring::Entry;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

const KEYRING_TARGET: &str = "skycast-weather";

/// Stored credentials. The config file on disk holds the account email and
/// API URL; the session token itself lives in the OS keyring, never on disk.
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct AuthConfig {
    #[serde(skip)]
    pub token: Option<String>,
    pub email: Option<String>,
    pub api_url: Option<String>,
}

impl AuthConfig {
    pub fn get_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "skycast", "skycast")
            .context("Could not determine config directory")?;
        let config_dir = proj_dirs.config_dir();
        fs::create_dir_all(config_dir)?;
        Ok(config_dir.join("auth.toml"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::get_path()?;
        let mut config: AuthConfig = if path.exists() {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        } else {
            Self::default()
        };

        // Pull the token from the keyring once we know which account this is.
        if let Some(raw_email) = &config.email {
            let email = raw_email.trim();
            if let Ok(entry) = Entry::new_with_target(KEYRING_TARGET, KEYRING_TARGET, email) {
                if let Ok(token) = entry.get_password() {
                    config.token = Some(token);
                }
            }
        }

        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::get_path()?;
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;

        if let Some(raw_email) = &self.email {
            let email = raw_email.trim();
            if let Ok(entry) = Entry::new_with_target(KEYRING_TARGET, KEYRING_TARGET, email) {
                if let Some(token) = &self.token {
                    let _ = entry.set_password(token);
                } else {
                    let _ = entry.delete_credential();
                }
            }
        }

        Ok(())
    }

    pub fn logout() -> Result<()> {
        let path = Self::get_path()?;

        if path.exists() {
            // Clear the keyring entry first, while we still know the email.
            let content = fs::read_to_string(&path)?;
            if let Ok(config) = toml::from_str::<AuthConfig>(&content) {
                if let Some(raw_email) = config.email {
                    let email = raw_email.trim();
                    if let Ok(entry) = Entry::new_with_target(KEYRING_TARGET, KEYRING_TARGET, email)
                    {
                        let _ = entry.delete_credential();
                    }
                }
            }
            fs::remove_file(path)?;
        }

        Ok(())
    }
}
