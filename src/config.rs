use crate::model::{ConfigError, PriceFilter};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const ENV_CLIENT_ID: &str = "NAVER_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "NAVER_CLIENT_SECRET";
pub const ENV_ACCESS_CODE: &str = "PRICE_SNIPER_ACCESS_CODE";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NaverConfig {
    pub client_id: String,
    pub client_secret: String,
    pub base_url: String,
    /// Offers requested per query (the API caps this at 100).
    pub display: u32,
}

impl Default for NaverConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            base_url: "https://openapi.naver.com".to_string(),
            display: 20,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub naver: NaverConfig,
    pub price_filter: PriceFilter,
    pub request_timeout_seconds: u64,
    pub row_delay_millis: u64,
    pub concurrency: usize,
    pub access_code: Option<String>,
    pub checkpoint_db: Option<String>,
    /// Checkpointed rows older than this many hours are looked up again.
    pub checkpoint_max_age_hours: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            naver: NaverConfig::default(),
            price_filter: PriceFilter::default(),
            request_timeout_seconds: 5,
            row_delay_millis: 300,
            concurrency: 1,
            access_code: None,
            checkpoint_db: None,
            checkpoint_max_age_hours: None,
        }
    }
}

impl AppConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn row_delay(&self) -> Duration {
        Duration::from_millis(self.row_delay_millis)
    }

    pub fn checkpoint_max_age(&self) -> Option<Duration> {
        self.checkpoint_max_age_hours.map(|h| Duration::from_secs(h * 3600))
    }

    /// Environment values win over the file for credentials and the access code.
    pub fn apply_env<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(id) = var(ENV_CLIENT_ID) {
            self.naver.client_id = id;
        }
        if let Some(secret) = var(ENV_CLIENT_SECRET) {
            self.naver.client_secret = secret;
        }
        if let Some(code) = var(ENV_ACCESS_CODE) {
            self.access_code = Some(code);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        PriceFilter::new(self.price_filter.min_price, self.price_filter.max_price)?;
        if !(1..=100).contains(&self.naver.display) {
            return Err(ConfigError::Invalid(format!(
                "naver.display must be within 1..=100, got {}",
                self.naver.display
            )));
        }
        if self.concurrency == 0 {
            return Err(ConfigError::Invalid("concurrency must be at least 1".into()));
        }
        if self.request_timeout_seconds == 0 {
            return Err(ConfigError::Invalid("request_timeout_seconds must be positive".into()));
        }
        Ok(())
    }
}

/// Loads the JSON config at `path`; a missing file yields the defaults.
pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    if !Path::new(path).exists() {
        return Ok(AppConfig::default());
    }
    let content = fs::read_to_string(path)?;
    let config: AppConfig = serde_json::from_str(&content)?;
    Ok(config)
}
