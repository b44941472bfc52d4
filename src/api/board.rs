use super::ApiClient;
use crate::model::{CompanyFromApi, JobDetailFromApi, JobFromApi, JobSource};
use anyhow::Result;

/// Server-side filters for the job listing.
#[derive(Debug, Clone, Default)]
pub(crate) struct JobQuery {
    pub role: Option<String>,
    pub location: Option<String>,
    pub source: Option<JobSource>,
}

impl JobQuery {
    fn params(&self) -> Vec<(&'static str, &str)> {
        let mut params = Vec::new();
        if let Some(role) = self.role.as_deref().filter(|s| !s.is_empty()) {
            params.push(("role", role));
        }
        if let Some(location) = self.location.as_deref().filter(|s| !s.is_empty()) {
            params.push(("location", location));
        }
        if let Some(source) = self.source {
            params.push(("source", source.as_query_str()));
        }
        params
    }
}

impl ApiClient {
    pub(crate) async fn jobs(&self, query: &JobQuery) -> Result<Vec<JobFromApi>> {
        let req = self.http.get(self.url("/jobs")).query(&query.params());
        self.send_json(req, "fetch jobs").await
    }

    pub async fn job(&self, id: &str) -> Result<JobDetailFromApi> {
        let url = self.url_with_segments("/jobs", &[id])?;
        self.send_json(self.http.get(url), "fetch job").await
    }

    pub async fn companies(&self) -> Result<Vec<CompanyFromApi>> {
        let req = self.http.get(self.url("/companies"));
        self.send_json(req, "fetch companies").await
    }

    pub async fn company_jobs(&self, company_name: &str) -> Result<Vec<JobFromApi>> {
        let url = self.url_with_segments("/companies", &[company_name, "jobs"])?;
        self.send_json(self.http.get(url), "fetch company jobs").await
    }
}
