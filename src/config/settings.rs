use crate::core::client::DEFAULT_BASE_URL;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_range, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 2;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 500;
pub const DEFAULT_MAX_PAGES: u64 = 1000;

/// 解析完成後的客戶端設定（預設值 ← TOML ← 命令列）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSettings {
    pub base_url: String,
    pub app_id: Option<String>,
    pub timeout_seconds: u64,
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
    pub max_pages: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            app_id: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

/// Partial settings as they appear in a `[client]` table or on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientOverrides {
    pub base_url: Option<String>,
    pub app_id: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub retry_attempts: Option<u32>,
    pub retry_delay_ms: Option<u64>,
    pub max_pages: Option<u64>,
}

impl ClientSettings {
    pub fn apply(&mut self, overrides: &ClientOverrides) {
        if let Some(base_url) = &overrides.base_url {
            self.base_url = base_url.clone();
        }
        if let Some(app_id) = &overrides.app_id {
            self.app_id = Some(app_id.clone());
        }
        if let Some(timeout) = overrides.timeout_seconds {
            self.timeout_seconds = timeout;
        }
        if let Some(attempts) = overrides.retry_attempts {
            self.retry_attempts = attempts;
        }
        if let Some(delay) = overrides.retry_delay_ms {
            self.retry_delay_ms = delay;
        }
        if let Some(max_pages) = overrides.max_pages {
            self.max_pages = max_pages;
        }
    }
}

impl ConfigProvider for ClientSettings {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn app_id(&self) -> Option<&str> {
        self.app_id.as_deref()
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    fn retry_attempts(&self) -> u32 {
        self.retry_attempts
    }

    fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    fn max_pages(&self) -> u64 {
        self.max_pages
    }
}

impl Validate for ClientSettings {
    fn validate(&self) -> Result<()> {
        validate_url("base_url", &self.base_url)?;
        validate_range("timeout_seconds", self.timeout_seconds, 1, 300)?;
        validate_range("retry_attempts", self.retry_attempts, 0, 10)?;
        validate_range("retry_delay_ms", self.retry_delay_ms, 0, 60_000)?;
        validate_positive_number("max_pages", self.max_pages, 1)?;
        if let Some(app_id) = &self.app_id {
            validate_non_empty_string("app_id", app_id)?;
        }
        Ok(())
    }
}
