//! HTTP client for the job board backend.
//!
//! One [`ApiClient`] serves every endpoint. The two discovery calls are also exposed through
//! the [`CompanyDiscoverer`] and [`JobDiscoverer`] traits so the discovery controller can run
//! against fakes in tests.

mod board;
mod discovery;
mod saved;

#[cfg(test)]
pub(crate) mod test_server;

pub(crate) use board::JobQuery;

use crate::model::{CompanyDiscoveryOutcome, DiscoveryConfig, JobDiscoveryOutcome};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Remote company discovery: find companies, optionally narrowed by a free-text query.
#[async_trait]
pub trait CompanyDiscoverer: Send + Sync {
    async fn discover_companies(
        &self,
        query: Option<&str>,
        count: u32,
    ) -> Result<CompanyDiscoveryOutcome>;
}

/// Remote job discovery: scan companies until `target_successful` of them have jobs.
#[async_trait]
pub trait JobDiscoverer: Send + Sync {
    async fn run_job_discovery(&self, target_successful: u32) -> Result<JobDiscoveryOutcome>;
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(cfg: &DiscoveryConfig) -> Result<Self> {
        Self::with_options(&cfg.base_url, cfg.request_timeout, &cfg.user_agent)
    }

    pub fn with_options(base_url: &str, timeout: Duration, user_agent: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .context("build HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Build `path` followed by percent-encoded segments (ids, company names).
    fn url_with_segments(&self, path: &str, segments: &[&str]) -> Result<reqwest::Url> {
        let mut url = reqwest::Url::parse(&self.url(path))
            .with_context(|| format!("invalid base URL: {}", self.base_url))?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("base URL cannot have a path: {}", self.base_url))?
            .extend(segments);
        Ok(url)
    }

    /// Send a request and decode a JSON body, treating any non-2xx status as an error.
    async fn send_json<R>(&self, req: RequestBuilder, what: &str) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let response = self.send(req, what).await?;
        response
            .json::<R>()
            .await
            .with_context(|| format!("failed to decode {what} response"))
    }

    async fn send(&self, req: RequestBuilder, what: &str) -> Result<Response> {
        let response = req
            .send()
            .await
            .with_context(|| format!("failed to {what}"))?;

        let status = response.status();
        tracing::debug!(%status, url = %response.url(), "{what}");
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(http_error(what, status, &body))
    }
}

fn http_error(what: &str, status: reqwest::StatusCode, body: &str) -> anyhow::Error {
    let body = body.trim();
    if body.is_empty() {
        anyhow::anyhow!("failed to {what}: HTTP {status}")
    } else {
        anyhow::anyhow!("failed to {what}: HTTP {status}: {body}")
    }
}
