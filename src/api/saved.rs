use super::ApiClient;
use crate::model::{SaveJobResult, SavedJobsPage};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const SAVED_JOBS_ENDPOINT: &str = "/saved-jobs";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SaveJobRequest<'a> {
    user_id: &'a str,
    job_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SavedCheck {
    is_saved: bool,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl ApiClient {
    pub async fn save_job(
        &self,
        user_id: &str,
        job_id: &str,
        notes: Option<&str>,
    ) -> Result<SaveJobResult> {
        let response = self
            .http
            .post(self.url(SAVED_JOBS_ENDPOINT))
            .json(&SaveJobRequest {
                user_id,
                job_id,
                notes,
            })
            .send()
            .await
            .context("failed to save job")?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<SaveJobResult>()
                .await
                .context("failed to decode save job response");
        }

        // The backend explains conflicts (already saved, unknown job) in a `message` field.
        let text = response.text().await.unwrap_or_default();
        match serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|b| b.message)
        {
            Some(message) => anyhow::bail!("{message}"),
            None => Err(super::http_error("save job", status, &text)),
        }
    }

    pub async fn unsave_job(&self, user_id: &str, job_id: &str) -> Result<()> {
        let url = self.url_with_segments(SAVED_JOBS_ENDPOINT, &[job_id])?;
        let req = self.http.delete(url).query(&[("userId", user_id)]);
        self.send(req, "unsave job").await?;
        Ok(())
    }

    pub async fn saved_jobs(&self, user_id: &str) -> Result<SavedJobsPage> {
        let req = self
            .http
            .get(self.url(SAVED_JOBS_ENDPOINT))
            .query(&[("userId", user_id)]);
        self.send_json(req, "get saved jobs").await
    }

    /// Whether the job is bookmarked. Any failure reads as "not saved".
    pub async fn is_job_saved(&self, user_id: &str, job_id: &str) -> bool {
        let url = match self.url_with_segments(SAVED_JOBS_ENDPOINT, &["check", job_id]) {
            Ok(url) => url,
            Err(_) => return false,
        };
        let req = self.http.get(url).query(&[("userId", user_id)]);
        match self.send_json::<SavedCheck>(req, "check saved job").await {
            Ok(check) => check.is_saved,
            Err(e) => {
                tracing::debug!("saved check failed: {e:#}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_server::serve_once;
    use std::time::Duration;

    fn client(base: &str) -> ApiClient {
        ApiClient::with_options(base, Duration::from_secs(5), "jobscout-test").unwrap()
    }

    #[tokio::test]
    async fn save_job_posts_user_and_job() {
        let (base, captured) = serve_once(
            "201 Created",
            r#"{"message":"Job saved","savedJobId":"s1"}"#,
        )
        .await;

        let res = client(&base)
            .save_job("demo-user", "j1", Some("apply monday"))
            .await
            .unwrap();

        assert_eq!(res.saved_job_id, "s1");
        let req = captured.await.unwrap();
        assert_eq!(req.request_line(), "POST /saved-jobs HTTP/1.1");
        let body: serde_json::Value = serde_json::from_str(&req.body).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"userId": "demo-user", "jobId": "j1", "notes": "apply monday"})
        );
    }

    #[tokio::test]
    async fn save_job_surfaces_server_message() {
        let (base, _captured) =
            serve_once("409 Conflict", r#"{"message":"Job already saved"}"#).await;

        let err = client(&base)
            .save_job("demo-user", "j1", None)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Job already saved");
    }

    #[tokio::test]
    async fn unsave_job_sends_delete_with_user() {
        let (base, captured) = serve_once("200 OK", "").await;

        client(&base).unsave_job("demo user", "j1").await.unwrap();

        assert_eq!(
            captured.await.unwrap().request_line(),
            "DELETE /saved-jobs/j1?userId=demo+user HTTP/1.1"
        );
    }

    #[tokio::test]
    async fn check_reads_failures_as_not_saved() {
        let (base, _captured) = serve_once("500 Internal Server Error", "oops").await;
        assert!(!client(&base).is_job_saved("demo-user", "j1").await);

        let (base, captured) = serve_once("200 OK", r#"{"isSaved":true}"#).await;
        assert!(client(&base).is_job_saved("demo-user", "j1").await);
        assert_eq!(
            captured.await.unwrap().request_line(),
            "GET /saved-jobs/check/j1?userId=demo-user HTTP/1.1"
        );
    }
}
