use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use anyhow::{anyhow, Context};
use serde::Serialize;
use tracing::{debug, info};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";

/// Which provider implementation backs extraction and translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceMode {
    Live,
    Mock,
}

impl ServiceMode {
    /// Without a credential the mode is always `Mock`, whatever `force_mock` says.
    pub fn resolve(api_key: Option<&str>, force_mock: bool) -> Self {
        match api_key {
            Some(key) if !key.trim().is_empty() && !force_mock => ServiceMode::Live,
            _ => ServiceMode::Mock,
        }
    }

    pub fn is_mock(self) -> bool {
        self == ServiceMode::Mock
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format `{other}`")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub force_mock: bool,
    pub frontend_url: String,
    pub upload_dir: PathBuf,
    pub strict_validation: bool,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 5000,
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            force_mock: false,
            frontend_url: "http://localhost:3000".to_string(),
            upload_dir: PathBuf::from("uploads"),
            strict_validation: true,
            log_format: LogFormat::Pretty,
        }
    }
}

impl Config {
    /// Reads the process environment. `.env` should already be loaded.
    pub fn load() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Ok(Self {
            port: try_load(&lookup, "PORT", defaults.port)?,
            api_key: lookup("OPENAI_API_KEY").filter(|key| !key.trim().is_empty()),
            base_url: lookup("OPENAI_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            model: lookup("OPENAI_MODEL").unwrap_or(defaults.model),
            force_mock: try_load(&lookup, "USE_MOCK_OPENAI", defaults.force_mock)?,
            frontend_url: lookup("FRONTEND_URL").unwrap_or(defaults.frontend_url),
            upload_dir: lookup("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            strict_validation: try_load(
                &lookup,
                "STRICT_UPLOAD_VALIDATION",
                defaults.strict_validation,
            )?,
            log_format: try_load(&lookup, "LOG_FORMAT", defaults.log_format)?,
        })
    }

    pub fn service_mode(&self) -> ServiceMode {
        ServiceMode::resolve(self.api_key.as_deref(), self.force_mock)
    }

    pub fn api_key_present(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn log_summary(&self) {
        info!(
            port = self.port,
            mode = ?self.service_mode(),
            api_key_present = self.api_key_present(),
            upload_dir = %self.upload_dir.display(),
            strict_validation = self.strict_validation,
            "Configuration loaded"
        );
        if !self.service_mode().is_mock() {
            info!(base_url = %self.base_url, model = %self.model, "Using live completion provider");
        }
    }
}

fn try_load<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + std::fmt::Debug,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("{e}"))
            .with_context(|| format!("Invalid {key} value `{raw}`")),
        None => {
            debug!("{key} not set, using default: {default:?}");
            Ok(default)
        }
    }
}
