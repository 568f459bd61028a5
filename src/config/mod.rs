use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dotenvy::dotenv;
use serde::Deserialize;
use tracing::warn;

use crate::models::CompanyProfile;

/// SMTP relay configuration from environment variables.
#[derive(Debug, Deserialize)]
pub struct SmtpConfig {
    /// Hostname of the SMTPS relay (implicit TLS, port 465).
    #[serde(default = "default_smtp_relay")]
    pub smtp_relay: String,
}

fn default_smtp_relay() -> String {
    "smtp.gmail.com".to_string()
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            smtp_relay: default_smtp_relay(),
        }
    }
}

impl SmtpConfig {
    /// Load configuration from environment variables
    ///
    /// This function will:
    /// 1. Load variables from .env file if it exists
    /// 2. Deserialize environment variables into SmtpConfig struct
    pub fn load() -> Result<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let config = envy::from_env::<SmtpConfig>()?;

        Ok(config)
    }
}

/// The settings store: one JSON record of company keys read once at startup
/// and written back whenever the user saves the settings form.
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored profile. A missing file is normal on first run; an
    /// unreadable or malformed one is logged and replaced by defaults
    /// rather than aborting startup.
    pub fn load(&self) -> CompanyProfile {
        if !self.path.exists() {
            return CompanyProfile::default();
        }
        match fs::read_to_string(&self.path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(profile) => profile,
                Err(err) => {
                    warn!(path = %self.path.display(), %err, "malformed settings file, using defaults");
                    CompanyProfile::default()
                }
            },
            Err(err) => {
                warn!(path = %self.path.display(), %err, "unreadable settings file, using defaults");
                CompanyProfile::default()
            }
        }
    }

    pub fn save(&self, profile: &CompanyProfile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }
        let contents = serde_json::to_string_pretty(profile).context("serializing settings")?;
        fs::write(&self.path, contents)
            .with_context(|| format!("writing {}", self.path.display()))?;
        Ok(())
    }
}
