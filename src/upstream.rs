use std::{sync::Arc, time::Duration};

use anyhow::Context;
use async_trait::async_trait;
use tokio::sync::Semaphore;
use tracing::debug;

pub type QueryParams = Vec<(&'static str, String)>;

/// Status and raw body of an upstream GET.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: String,
}

impl UpstreamResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait UpstreamClient: Send + Sync {
    async fn get(&self, url: &str, query: &QueryParams) -> anyhow::Result<UpstreamResponse>;
}

/// reqwest-backed client shared by the weather and sun-times proxies.
#[derive(Clone)]
pub struct HttpUpstream {
    client: reqwest::Client,
    permits: Arc<Semaphore>,
}

impl HttpUpstream {
    pub fn new(timeout: Duration, max_in_flight: usize) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("build http client")?;
        Ok(Self {
            client,
            permits: Arc::new(Semaphore::new(max_in_flight.max(1))),
        })
    }
}

#[async_trait]
impl UpstreamClient for HttpUpstream {
    async fn get(&self, url: &str, query: &QueryParams) -> anyhow::Result<UpstreamResponse> {
        let _permit = self
            .permits
            .acquire()
            .await
            .context("upstream permits closed")?;
        let resp = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .with_context(|| format!("GET {}", url))?;
        let status = resp.status().as_u16();
        let body = resp.text().await.context("read upstream body")?;
        debug!(%url, status, bytes = body.len(), "upstream response");
        Ok(UpstreamResponse { status, body })
    }
}
