use std::{env, io};

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{AppError, AppResult};

const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:5000";
const DEFAULT_TELEMETRY_BUFFER_MAX_BYTES: u64 = 1024 * 1024;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_base_url: String,
    pub telemetry_enabled_by_default: bool,
    pub telemetry_batch_size: usize,
    pub telemetry_buffer_max_bytes: u64,
}

#[derive(Clone, Debug, Serialize)]
pub struct PublicAppConfig {
    pub api_base_url: String,
    pub telemetry_enabled_by_default: bool,
    pub telemetry_batch_size: usize,
    pub telemetry_buffer_max_bytes: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        load_dotenv_if_applicable();
        Self {
            api_base_url: env::var("API_BASE_URL")
                .ok()
                .map(|v| v.trim_end_matches('/').to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            telemetry_enabled_by_default: parse_bool("TELEMETRY_ENABLED", true),
            telemetry_batch_size: parse_usize("TELEMETRY_BATCH_SIZE", 10).max(1),
            telemetry_buffer_max_bytes: parse_u64(
                "TELEMETRY_BUFFER_MAX_BYTES",
                DEFAULT_TELEMETRY_BUFFER_MAX_BYTES,
            ),
        }
    }

    pub fn config_endpoint(&self) -> String {
        format!("{}/config", self.api_base_url)
    }

    pub fn analyze_endpoint(&self) -> String {
        format!("{}/analyze", self.api_base_url)
    }

    pub fn public_profile(&self) -> PublicAppConfig {
        PublicAppConfig {
            api_base_url: self.api_base_url.clone(),
            telemetry_enabled_by_default: self.telemetry_enabled_by_default,
            telemetry_batch_size: self.telemetry_batch_size,
            telemetry_buffer_max_bytes: self.telemetry_buffer_max_bytes,
        }
    }
}

/// Settings served by the backend `/config` endpoint, fetched once at
/// startup before any core logic runs.
#[derive(Clone, Debug, Deserialize)]
pub struct RemoteConfig {
    pub supabase_url: String,
    pub supabase_key: SecretString,
}

impl RemoteConfig {
    pub async fn fetch(http: &reqwest::Client, endpoint: &str) -> AppResult<Self> {
        let response = http.get(endpoint).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Config(format!(
                "config endpoint answered {status}"
            )));
        }
        let mut config: Self = response.json().await?;
        config.supabase_url = config.supabase_url.trim_end_matches('/').to_string();
        if config.supabase_url.is_empty() {
            return Err(AppError::Config("config endpoint returned an empty supabase_url".into()));
        }
        Ok(config)
    }
}

fn load_dotenv_if_applicable() {
    if !should_load_dotenv() {
        debug!("skipping .env load outside dev mode");
        return;
    }

    if let Err(err) = dotenvy::dotenv() {
        match &err {
            dotenvy::Error::Io(io_err) if io_err.kind() == io::ErrorKind::NotFound => {}
            _ => debug!(?err, "unable to load .env file"),
        }
    }
}

fn should_load_dotenv() -> bool {
    cfg!(debug_assertions) || parse_bool("ALLOW_DOTENV", false)
}

fn parse_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .map(|v| matches!(v.trim(), "1" | "true" | "TRUE" | "True"))
        .unwrap_or(default)
}

fn parse_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

fn parse_usize(key: &str, default: usize) -> usize {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(default)
}
