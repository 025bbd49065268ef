//! Run configuration
//!
//! A TOML document holding API addresses, credentials, the network drive
//! path, the event authorizer, and notification settings. Credentials can be
//! overridden from the environment (including a `.env` file) and are prompted
//! for when still missing on an interactive terminal.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use is_terminal::IsTerminal;
use serde::Deserialize;

use crate::api::Credentials;
use crate::services::NotificationSettings;

pub const CONFIG_FILE_NAME: &str = "config.toml";
const APP_DIR: &str = "accessioner";

/// Which ArchivesSpace instance a run targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Environment {
    Prod,
    Test,
}

impl Environment {
    /// Test when the drive path mentions `test`, production otherwise
    pub fn infer(drive_path: &Path) -> Self {
        if drive_path.to_string_lossy().to_lowercase().contains("test") {
            Environment::Test
        } else {
            Environment::Prod
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    pub api_url: Option<String>,
    pub test_api_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub network_drive_path: Option<PathBuf>,
    pub test_drive_path: Option<PathBuf>,
    pub prod_drive_path: Option<PathBuf>,
    pub event_authorizer: Option<String>,
    pub status_email_address: Option<String>,
    pub status_email_password: Option<String>,
    /// Shell command that receives each status message on stdin
    pub notification_command: Option<String>,
    /// Everything else, including the `*recipient*` keys
    #[serde(flatten)]
    pub extra: BTreeMap<String, toml::Value>,
}

/// Candidate config locations, in lookup order
pub fn config_candidates(explicit: Option<&Path>) -> Vec<PathBuf> {
    if let Some(path) = explicit {
        return vec![path.to_path_buf()];
    }
    let mut candidates = vec![PathBuf::from(CONFIG_FILE_NAME)];
    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join(APP_DIR).join(CONFIG_FILE_NAME));
    }
    candidates
}

impl Config {
    /// Load from `explicit`, or the first existing default location
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let candidates = config_candidates(explicit);
        let path = candidates
            .iter()
            .find(|p| p.exists())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "No configuration file found. Looked in: {}",
                    candidates
                        .iter()
                        .map(|p| p.display().to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            })?;

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Values of every key containing `recipient`; arrays contribute each entry
    pub fn recipients(&self) -> Vec<String> {
        let mut recipients = Vec::new();
        for (key, value) in &self.extra {
            if !key.contains("recipient") {
                continue;
            }
            match value {
                toml::Value::String(address) => recipients.push(address.clone()),
                toml::Value::Array(items) => recipients.extend(
                    items
                        .iter()
                        .filter_map(|item| item.as_str().map(str::to_string)),
                ),
                other => log::warn!("Ignoring non-string recipient {} = {}", key, other),
            }
        }
        recipients
    }

    /// Drive path for `env`: explicit override, env-specific path, then `network_drive_path`
    pub fn drive_path(&self, env: Option<Environment>, explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            return Ok(path.to_path_buf());
        }
        let env_specific = match env {
            Some(Environment::Test) => self.test_drive_path.as_ref(),
            Some(Environment::Prod) => self.prod_drive_path.as_ref(),
            None => None,
        };
        env_specific
            .or(self.network_drive_path.as_ref())
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("network_drive_path is not configured"))
    }

    pub fn api_url(&self, env: Environment) -> Option<&str> {
        match env {
            Environment::Prod => self.api_url.as_deref(),
            Environment::Test => self.test_api_url.as_deref(),
        }
    }

    /// API address and credentials, filling gaps from the environment and then a prompt
    pub fn resolve_credentials(&self, env: Environment) -> Result<(String, Credentials)> {
        let url = non_empty(std::env::var("ASPACE_API_URL").ok())
            .or_else(|| non_empty(self.api_url(env).map(str::to_string)));
        let username = non_empty(std::env::var("ASPACE_USERNAME").ok())
            .or_else(|| non_empty(self.username.clone()));
        let password = non_empty(std::env::var("ASPACE_PASSWORD").ok())
            .or_else(|| non_empty(self.password.clone()));

        if let (Some(url), Some(username), Some(password)) = (&url, &username, &password) {
            return Ok((
                url.clone(),
                Credentials {
                    username: username.clone(),
                    password: password.clone(),
                },
            ));
        }

        require_terminal(&std::io::stdin())?;

        let url = match url {
            Some(url) => url,
            None => dialoguer::Input::<String>::new()
                .with_prompt("Please enter the ArchivesSpace API URL")
                .interact_text()?,
        };
        let username = match username {
            Some(username) => username,
            None => dialoguer::Input::<String>::new()
                .with_prompt("Please enter your username")
                .interact_text()?,
        };
        let password = match password {
            Some(password) => password,
            None => rpassword::prompt_password("Please enter your password: ")?,
        };

        Ok((url, Credentials { username, password }))
    }

    pub fn notification_settings(&self, error_log: Option<PathBuf>) -> NotificationSettings {
        NotificationSettings {
            sender: self.status_email_address.clone(),
            sender_password: self.status_email_password.clone(),
            recipients: self.recipients(),
            command: self.notification_command.clone(),
            error_log,
        }
    }
}

/// Prompting needs a terminal on `input`; scheduled runs must configure everything
fn require_terminal(input: &impl IsTerminal) -> Result<()> {
    if !input.is_terminal() {
        anyhow::bail!(
            "ArchivesSpace URL, username, and password must be configured when not running interactively"
        );
    }
    Ok(())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
