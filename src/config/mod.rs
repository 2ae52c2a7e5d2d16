use serde::{Deserialize, Serialize};
use std::{
    env,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    str::FromStr,
};

use crate::domain::Role;
use crate::errors::{EventDeskError, Result};
use crate::utils::paths::{app_data_dir, config_file_in, ensure_dir};

const TMP_SUFFIX: &str = "tmp";
const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const API_URL_ENV: &str = "EVENTDESK_API_URL";
pub const API_TOKEN_ENV: &str = "EVENTDESK_API_TOKEN";

/// User-configurable client settings persisted as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub api_base_url: String,
    #[serde(default = "Config::default_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
    #[serde(default = "Config::default_ui_color_enabled")]
    pub ui_color_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            api_token: None,
            role: Role::default(),
            organization_id: None,
            ui_color_enabled: true,
        }
    }
}

impl Config {
    fn default_timeout() -> u64 {
        DEFAULT_TIMEOUT_SECS
    }

    fn default_ui_color_enabled() -> bool {
        true
    }

    /// Applies `EVENTDESK_API_URL` / `EVENTDESK_API_TOKEN` on top of the stored values.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(url) = env::var(API_URL_ENV).ok().filter(|v| !v.trim().is_empty()) {
            self.api_base_url = url.trim().to_string();
        }
        if let Some(token) = env::var(API_TOKEN_ENV).ok().filter(|v| !v.trim().is_empty()) {
            self.api_token = Some(token.trim().to_string());
        }
        self
    }

    /// Keys accepted by [`Config::set`].
    pub fn keys() -> &'static [&'static str] {
        &[
            "api_base_url",
            "request_timeout_secs",
            "api_token",
            "role",
            "organization_id",
            "ui_color_enabled",
        ]
    }

    /// Updates a single setting from its textual representation.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let trimmed = value.trim();
        match key {
            "api_base_url" => {
                if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
                    return Err(EventDeskError::Config(format!(
                        "api_base_url must start with http:// or https:// (got `{}`)",
                        trimmed
                    )));
                }
                self.api_base_url = trimmed.trim_end_matches('/').to_string();
            }
            "request_timeout_secs" => {
                let secs = trimmed.parse::<u64>().map_err(|_| {
                    EventDeskError::Config("request_timeout_secs must be a whole number".into())
                })?;
                if secs == 0 {
                    return Err(EventDeskError::Config(
                        "request_timeout_secs must be at least 1".into(),
                    ));
                }
                self.request_timeout_secs = secs;
            }
            "api_token" => self.api_token = optional(trimmed),
            "role" => {
                self.role = Role::from_str(trimmed).map_err(EventDeskError::Config)?;
            }
            "organization_id" => self.organization_id = optional(trimmed),
            "ui_color_enabled" => {
                self.ui_color_enabled = match trimmed.to_ascii_lowercase().as_str() {
                    "true" | "yes" | "on" | "1" => true,
                    "false" | "no" | "off" | "0" => false,
                    _ => {
                        return Err(EventDeskError::Config(
                            "ui_color_enabled must be true or false".into(),
                        ))
                    }
                };
            }
            other => {
                return Err(EventDeskError::Config(format!(
                    "unknown setting `{}` (expected one of: {})",
                    other,
                    Self::keys().join(", ")
                )))
            }
        }
        Ok(())
    }

    /// Key/value pairs for display; the token is masked.
    pub fn display_entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("api_base_url", self.api_base_url.clone()),
            ("request_timeout_secs", self.request_timeout_secs.to_string()),
            (
                "api_token",
                self.api_token
                    .as_ref()
                    .map(|_| "********".to_string())
                    .unwrap_or_else(|| "(none)".into()),
            ),
            ("role", self.role.to_string()),
            (
                "organization_id",
                self.organization_id.clone().unwrap_or_else(|| "(none)".into()),
            ),
            ("ui_color_enabled", self.ui_color_enabled.to_string()),
        ]
    }
}

fn optional(value: &str) -> Option<String> {
    if value.is_empty() || value.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(value.to_string())
    }
}

/// Loads and saves [`Config`] under the application data directory.
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        Self::with_base_dir(app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self> {
        ensure_dir(&base)?;
        Ok(Self {
            path: config_file_in(&base),
        })
    }

    /// Reads the stored config, falling back to defaults when none exists yet.
    pub fn load(&self) -> Result<Config> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            let config: Config = serde_json::from_str(&data)
                .map_err(|err| EventDeskError::Config(format!("{}: {}", self.path.display(), err)))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            ensure_dir(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        tracing::debug!(path = %self.path.display(), "configuration saved");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
