use super::{ApiClient, CompanyDiscoverer, JobDiscoverer};
use crate::model::{
    CleanupResult, CompanyDiscoveryOutcome, DiscoveryStatus, JobDiscoveryOutcome, SeedResult,
};
use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

const DISCOVER_COMPANIES_ENDPOINT: &str = "/discovery/discover-companies";
const RUN_ENDPOINT: &str = "/discovery/run";
const STATUS_ENDPOINT: &str = "/discovery/status";
const SEED_ENDPOINT: &str = "/discovery/seed";
const CLEANUP_ENDPOINT: &str = "/discovery/cleanup";

#[derive(Debug, Serialize)]
struct DiscoverCompaniesRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    query: Option<&'a str>,
    count: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RunDiscoveryRequest {
    target_successful: u32,
}

#[async_trait]
impl CompanyDiscoverer for ApiClient {
    async fn discover_companies(
        &self,
        query: Option<&str>,
        count: u32,
    ) -> Result<CompanyDiscoveryOutcome> {
        tracing::info!(?query, count, "requesting company discovery");
        let req = self
            .http
            .post(self.url(DISCOVER_COMPANIES_ENDPOINT))
            .json(&DiscoverCompaniesRequest { query, count });
        self.send_json(req, "discover companies").await
    }
}

#[async_trait]
impl JobDiscoverer for ApiClient {
    async fn run_job_discovery(&self, target_successful: u32) -> Result<JobDiscoveryOutcome> {
        tracing::info!(target_successful, "requesting job discovery run");
        let req = self
            .http
            .post(self.url(RUN_ENDPOINT))
            .json(&RunDiscoveryRequest { target_successful });
        self.send_json(req, "run discovery").await
    }
}

impl ApiClient {
    pub async fn discovery_status(&self) -> Result<DiscoveryStatus> {
        let req = self.http.get(self.url(STATUS_ENDPOINT));
        self.send_json(req, "get discovery status").await
    }

    pub async fn seed_companies(&self) -> Result<SeedResult> {
        let req = self.http.post(self.url(SEED_ENDPOINT));
        self.send_json(req, "seed companies").await
    }

    /// Remove companies that have no jobs, along with their orphaned postings.
    pub async fn cleanup_empty_companies(&self) -> Result<CleanupResult> {
        let req = self.http.post(self.url(CLEANUP_ENDPOINT));
        self.send_json(req, "cleanup").await
    }
}
