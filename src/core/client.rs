use crate::domain::model::RequestDescriptor;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{ProbeError, Result};
use reqwest::Client;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://api.kivaws.org";

/// Thin wrapper over one reusable reqwest client for the JSON API.
pub struct ApiClient {
    client: Client,
    base_url: Url,
    app_id: Option<String>,
    retry_attempts: u32,
    retry_delay: Duration,
}

impl ApiClient {
    pub fn new<C: ConfigProvider>(config: &C) -> Result<Self> {
        let base_url = Url::parse(config.base_url()).map_err(|e| {
            ProbeError::InvalidConfigValueError {
                field: "base_url".to_string(),
                value: config.base_url().to_string(),
                reason: format!("Invalid URL format: {}", e),
            }
        })?;

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ProbeError::ConfigError {
                message: format!("cannot build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url,
            app_id: config.app_id().map(str::to_string),
            retry_attempts: config.retry_attempts(),
            retry_delay: config.retry_delay(),
        })
    }

    /// 組出完整 URL：base 路徑 + API 路徑 + `.json`，再附上查詢參數與 app_id
    pub fn build_url(&self, req: &RequestDescriptor) -> Url {
        let mut url = self.base_url.clone();
        let path = format!(
            "{}/{}.json",
            self.base_url.path().trim_end_matches('/'),
            req.path.trim_start_matches('/')
        );
        url.set_path(&path);

        let has_query = !req.query.is_empty() || self.app_id.is_some();
        if has_query {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &req.query {
                pairs.append_pair(key, &value.to_string());
            }
            if let Some(app_id) = &self.app_id {
                if req.param("app_id").is_none() {
                    pairs.append_pair("app_id", app_id);
                }
            }
        }

        url
    }

    /// GET, check the status, then decode the body as JSON.
    pub async fn get_json(&self, req: &RequestDescriptor) -> Result<serde_json::Value> {
        let url = self.build_url(req);
        let mut attempt = 0;

        loop {
            match self.try_get_json(&url).await {
                Err(e) if e.is_retryable() && attempt < self.retry_attempts => {
                    attempt += 1;
                    tracing::warn!(
                        "🔁 {} (retry {}/{} in {:?})",
                        e,
                        attempt,
                        self.retry_attempts,
                        self.retry_delay
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                other => return other,
            }
        }
    }

    async fn try_get_json(&self, url: &Url) -> Result<serde_json::Value> {
        tracing::debug!("📡 GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| ProbeError::NetworkError {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        tracing::debug!("API response status: {}", status);

        // 狀態碼檢查必須在解碼之前
        if !status.is_success() {
            return Err(ProbeError::HttpStatusError {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| ProbeError::NetworkError {
                url: url.to_string(),
                source,
            })?;

        serde_json::from_slice(&body).map_err(|source| ProbeError::DecodeError {
            url: url.to_string(),
            source,
        })
    }
}
