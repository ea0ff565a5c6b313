use anyhow::{Result, anyhow};
use config::{Config, File};
use serde::Deserialize;
use std::time::Duration;

use crate::application_impl::ExpiryConfig;
use crate::application_port::RetryOptions;
use crate::domain_model::TileSpec;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub backend: Backend,
    pub expiry: Expiry,
    pub log: Log,
    pub retry: Retry,
    #[serde(default)]
    pub tiles: Vec<TileSpec>,
}

#[derive(Debug, Deserialize)]
pub struct Backend {
    pub backend: String, // "memory"
    pub access_ttl_secs: u64,
    pub seed_path: Option<String>,
    pub demo_user: String,
}

#[derive(Debug, Deserialize)]
pub struct Expiry {
    pub login_route: String,
    pub redirect_delay_ms: u64,
    pub auth_key_prefixes: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct Log {
    pub filter: String,
}

#[derive(Debug, Deserialize)]
pub struct Retry {
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

impl From<&Retry> for RetryOptions {
    fn from(retry: &Retry) -> Self {
        RetryOptions::new(retry.max_retries, Duration::from_millis(retry.retry_delay_ms))
    }
}

impl From<&Expiry> for ExpiryConfig {
    fn from(expiry: &Expiry) -> Self {
        ExpiryConfig {
            login_route: expiry.login_route.clone(),
            redirect_delay: Duration::from_millis(expiry.redirect_delay_ms),
            auth_key_prefixes: expiry.auth_key_prefixes.clone(),
        }
    }
}

#[cfg(debug_assertions)]
const SETTINGS_PATH: &str = "settings/dev.toml";
#[cfg(not(debug_assertions))]
const SETTINGS_PATH: &str = "settings/release.toml";

pub fn parse_settings(path: Option<&str>) -> Result<Settings> {
    let path = path.unwrap_or(SETTINGS_PATH);

    let settings: Settings = Config::builder()
        .add_source(File::with_name(path))
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;

    Ok(settings)
}
