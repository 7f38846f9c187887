use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait ConfigProvider: Send + Sync {
    fn base_url(&self) -> &str;
    fn app_id(&self) -> Option<&str>;
    fn timeout(&self) -> Duration;
    fn retry_attempts(&self) -> u32;
    fn retry_delay(&self) -> Duration;
    fn max_pages(&self) -> u64;
}

/// Where decoded bodies go once a step marks them for printing.
#[async_trait]
pub trait OutputSink: Send + Sync {
    async fn emit(&self, label: &str, body: &serde_json::Value) -> Result<()>;
}
