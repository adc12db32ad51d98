use crate::config::Config;
use crate::core::{AuditError, AuditResult};
use crate::http::{build_client, send_with_retry};
use async_trait::async_trait;
use reqwest::Client;
use std::path::PathBuf;

/// Where the raw advisory text comes from. Fetched once per run.
#[async_trait]
pub trait AdvisorySource: Send + Sync {
    async fn fetch_feed(&self) -> AuditResult<String>;

    /// Human-readable origin, for logs
    fn describe(&self) -> String;
}

/// Advisory feed served over HTTP(S)
pub struct HttpFeed {
    client: Client,
    url: String,
    max_retries: u32,
}

impl HttpFeed {
    pub fn new(config: &Config) -> AuditResult<Self> {
        Ok(Self {
            client: build_client(config)?,
            url: config.advisory_feed_url.clone(),
            max_retries: config.max_retries,
        })
    }
}

#[async_trait]
impl AdvisorySource for HttpFeed {
    async fn fetch_feed(&self) -> AuditResult<String> {
        let response = send_with_retry(self.client.get(&self.url), self.max_retries).await?;

        if !response.status().is_success() {
            return Err(AuditError::Advisory(format!(
                "Failed to fetch {}: HTTP {}",
                self.url,
                response.status()
            )));
        }

        response.text().await.map_err(AuditError::Http)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Advisory feed previously saved to disk
pub struct FileFeed {
    path: PathBuf,
}

impl FileFeed {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl AdvisorySource for FileFeed {
    async fn fetch_feed(&self) -> AuditResult<String> {
        tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            AuditError::Advisory(format!("Failed to read {}: {}", self.path.display(), e))
        })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
