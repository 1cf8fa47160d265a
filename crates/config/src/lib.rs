use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use core_types::UiLanguage;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

pub const CURRENT_SCHEMA_VERSION: u32 = 2;

const DEFAULT_UPLOAD_URL: &str = "http://localhost:8000/upload_pdf/";
const DEFAULT_QUERY_URL: &str = "http://localhost:8000/ask/";
const DEFAULT_STATUS_CLEAR_MS: u64 = 2_000;
const DEFAULT_SPLASH_MS: u64 = 5_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} is not configured")]
    Missing { field: &'static str },
    #[error("{field} must be an http(s) url, got `{value}`")]
    InvalidUrl { field: &'static str, value: String },
}

/// Credentials and endpoints of the categorization service.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_token: String,
    #[serde(default)]
    pub upload_url: String,
    #[serde(default)]
    pub query_url: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api_key: option_env!("SPENDWISE_API_KEY").unwrap_or_default().to_string(),
            api_token: option_env!("SPENDWISE_API_TOKEN")
                .unwrap_or_default()
                .to_string(),
            upload_url: option_env!("SPENDWISE_UPLOAD_URL")
                .unwrap_or(DEFAULT_UPLOAD_URL)
                .to_string(),
            query_url: option_env!("SPENDWISE_QUERY_URL")
                .unwrap_or(DEFAULT_QUERY_URL)
                .to_string(),
        }
    }
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_token", &redact(&self.api_token))
            .field("upload_url", &self.upload_url)
            .field("query_url", &self.query_url)
            .finish()
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() { "<unset>" } else { "<redacted>" }
}

impl ServiceConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_url("upload_url", &self.upload_url)?;
        check_url("query_url", &self.query_url)?;
        Ok(())
    }

    pub fn has_credentials(&self) -> bool {
        !self.api_key.trim().is_empty() && !self.api_token.trim().is_empty()
    }
}

fn check_url(field: &'static str, value: &str) -> Result<(), ConfigError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ConfigError::Missing { field });
    }
    if !(value.starts_with("http://") || value.starts_with("https://")) {
        return Err(ConfigError::InvalidUrl {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatConfig {
    #[serde(default = "default_status_clear_ms")]
    pub status_clear_ms: u64,
    #[serde(default = "default_splash_ms")]
    pub splash_ms: u64,
}

const fn default_status_clear_ms() -> u64 {
    DEFAULT_STATUS_CLEAR_MS
}

const fn default_splash_ms() -> u64 {
    DEFAULT_SPLASH_MS
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            status_clear_ms: DEFAULT_STATUS_CLEAR_MS,
            splash_ms: DEFAULT_SPLASH_MS,
        }
    }
}

impl ChatConfig {
    pub fn status_clear_delay(&self) -> Duration {
        Duration::from_millis(self.status_clear_ms)
    }

    pub fn splash_duration(&self) -> Duration {
        Duration::from_millis(self.splash_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub schema_version: u32,
    #[serde(default)]
    pub language: UiLanguage,
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            language: UiLanguage::EnUs,
            service: ServiceConfig::default(),
            chat: ChatConfig::default(),
        }
    }
}

pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            path: dir.into().join("config.json"),
        }
    }

    pub fn from_default_location() -> Result<Self> {
        let mut dir = dirs::config_dir().context("failed to resolve config_dir")?;
        dir.push("spendwise");
        Ok(Self::from_dir(dir))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load_or_init(&self) -> Result<AppConfig> {
        if !self.path.exists() {
            let config = AppConfig::default();
            self.save(&config)?;
            info!(path = %self.path.display(), "wrote default app config");
            return Ok(config);
        }

        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let mut config: AppConfig =
            serde_json::from_str(&raw).context("failed to parse app config json")?;
        if self.migrate(&mut config) {
            self.save(&config)?;
        }
        Ok(config)
    }

    pub fn save(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let text = serde_json::to_string_pretty(config).context("failed to serialize config")?;
        fs::write(&self.path, text)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        Ok(())
    }

    fn migrate(&self, config: &mut AppConfig) -> bool {
        if config.schema_version >= CURRENT_SCHEMA_VERSION {
            return false;
        }

        warn!(
            from = config.schema_version,
            to = CURRENT_SCHEMA_VERSION,
            "migrating app config schema"
        );

        // blank endpoints fall back to the build-time defaults
        let defaults = ServiceConfig::default();
        if config.service.upload_url.trim().is_empty() {
            config.service.upload_url = defaults.upload_url;
        }
        if config.service.query_url.trim().is_empty() {
            config.service.query_url = defaults.query_url;
        }
        config.schema_version = CURRENT_SCHEMA_VERSION;
        true
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn creates_default_config_when_missing() {
        let dir = tempdir().expect("tempdir");
        let store = ConfigStore::from_dir(dir.path());
        let config = store.load_or_init().expect("load default");
        assert_eq!(config.schema_version, CURRENT_SCHEMA_VERSION);
        assert_eq!(config.chat.status_clear_delay(), Duration::from_secs(2));
        assert_eq!(config.chat.splash_duration(), Duration::from_secs(5));
        assert!(store.path().exists());
    }

    #[test]
    fn reloads_saved_service_settings() {
        let dir = tempdir().expect("tempdir");
        let store = ConfigStore::from_dir(dir.path());
        let mut config = AppConfig::default();
        config.service.api_key = "key-1".to_string();
        config.service.query_url = "https://spendwise.example/ask/".to_string();
        config.language = UiLanguage::ZhCn;
        store.save(&config).expect("save");

        let loaded = store.load_or_init().expect("load");
        assert_eq!(loaded.service, config.service);
        assert_eq!(loaded.language, UiLanguage::ZhCn);
    }

    #[test]
    fn migrates_v1_config_with_blank_endpoints() {
        let dir = tempdir().expect("tempdir");
        let store = ConfigStore::from_dir(dir.path());
        fs::write(
            store.path(),
            r#"{"schema_version":1,"service":{"api_key":"k","api_token":"t","upload_url":"","query_url":""}}"#,
        )
        .expect("write v1");

        let config = store.load_or_init().expect("load");
        assert_eq!(config.schema_version, CURRENT_SCHEMA_VERSION);
        assert!(!config.service.upload_url.is_empty());
        assert!(!config.service.query_url.is_empty());
        assert_eq!(config.service.api_key, "k");
        assert_eq!(config.chat, ChatConfig::default());

        let raw = fs::read_to_string(store.path()).expect("read back");
        assert!(raw.contains(&format!("\"schema_version\": {CURRENT_SCHEMA_VERSION}")));
    }

    #[test]
    fn validate_rejects_missing_and_non_http_urls() {
        let mut service = ServiceConfig {
            api_key: "k".to_string(),
            api_token: "t".to_string(),
            upload_url: String::new(),
            query_url: "http://localhost:8000/ask/".to_string(),
        };
        assert_eq!(
            service.validate(),
            Err(ConfigError::Missing {
                field: "upload_url"
            })
        );

        service.upload_url = "ftp://localhost/upload".to_string();
        assert!(matches!(
            service.validate(),
            Err(ConfigError::InvalidUrl {
                field: "upload_url",
                ..
            })
        ));

        service.upload_url = "https://spendwise.example/upload_pdf/".to_string();
        assert_eq!(service.validate(), Ok(()));
    }

    #[test]
    fn debug_output_redacts_credentials() {
        let service = ServiceConfig {
            api_key: "super-secret-key".to_string(),
            api_token: String::new(),
            upload_url: DEFAULT_UPLOAD_URL.to_string(),
            query_url: DEFAULT_QUERY_URL.to_string(),
        };
        let rendered = format!("{service:?}");
        assert!(!rendered.contains("super-secret-key"));
        assert!(rendered.contains("<redacted>"));
        assert!(rendered.contains("<unset>"));
        assert!(!service.has_credentials());
    }
}
