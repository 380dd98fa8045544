//! Project update (SCM sync) job endpoints and the wait used to fence
//! operations on a project that is mid-sync.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;
use tokio::time::Instant;

use super::client::Client;
use super::common::AwxApiResource;
use super::error::ApiError;

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectUpdate {
    pub id: i64,
    #[serde(default)]
    pub status: Option<String>,
    /// Unset while the job is still running.
    #[serde(default)]
    pub finished: Option<DateTime<Utc>>,
}

impl AwxApiResource for ProjectUpdate {
    fn collection_path() -> &'static str {
        "/api/v2/project_updates/"
    }
}

/// Bounds for [`Client::wait_for_project_update`].
#[derive(Debug, Clone)]
pub struct WaitConfig {
    pub timeout: Duration,
    pub initial_interval: Duration,
    pub max_interval: Duration,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(300),
            initial_interval: Duration::from_secs(1),
            max_interval: Duration::from_secs(30),
        }
    }
}

impl Client {
    pub async fn get_project_update(&self, id: i64) -> Result<ProjectUpdate, ApiError> {
        self.get(&ProjectUpdate::object_path(id)).await
    }

    pub async fn cancel_project_update(&self, id: i64) -> Result<(), ApiError> {
        let path = format!("{}cancel/", ProjectUpdate::object_path(id));
        self.post(&path, &()).await
    }

    /// Polls the update job until its completion timestamp is set, sleeping
    /// with exponential backoff between polls. Fails with
    /// [`ApiError::Timeout`] instead of waiting past the configured bound.
    pub async fn wait_for_project_update(
        &self,
        id: i64,
        config: &WaitConfig,
    ) -> Result<ProjectUpdate, ApiError> {
        let deadline = Instant::now() + config.timeout;
        let mut interval = config.initial_interval;

        loop {
            let update = self.get_project_update(id).await?;
            if update.finished.is_some() {
                return Ok(update);
            }

            if Instant::now() + interval > deadline {
                return Err(ApiError::Timeout(config.timeout.as_secs(), id));
            }

            tracing::debug!(
                "project update {} still {:?}, polling again in {:?}",
                id,
                update.status,
                interval
            );
            tokio::time::sleep(interval).await;
            interval = std::cmp::min(interval * 2, config.max_interval);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    fn test_client(server_url: &str) -> Client {
        Client::new(server_url, "admin", "password", true).unwrap()
    }

    fn quick_wait() -> WaitConfig {
        WaitConfig {
            timeout: Duration::from_millis(50),
            initial_interval: Duration::from_millis(10),
            max_interval: Duration::from_millis(20),
        }
    }

    #[tokio::test]
    async fn wait_returns_once_job_reports_finished() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v2/project_updates/7/")
            .with_body(
                r#"{"id":7,"status":"successful","finished":"2020-03-10T09:30:00.000000Z"}"#,
            )
            .create_async()
            .await;

        let client = test_client(&server.url());
        let update = client.wait_for_project_update(7, &quick_wait()).await.unwrap();

        assert!(update.finished.is_some());
        assert_eq!(update.status.as_deref(), Some("successful"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn wait_times_out_on_a_stuck_job() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v2/project_updates/7/")
            .with_body(r#"{"id":7,"status":"running","finished":null}"#)
            .expect_at_least(1)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let result = client.wait_for_project_update(7, &quick_wait()).await;

        assert!(matches!(result, Err(ApiError::Timeout(_, 7))));
    }

    #[tokio::test]
    async fn cancel_posts_to_the_cancel_action() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v2/project_updates/7/cancel/")
            .with_status(202)
            .create_async()
            .await;

        let client = test_client(&server.url());
        client.cancel_project_update(7).await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn wait_propagates_lookup_errors() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v2/project_updates/7/")
            .with_status(404)
            .with_body(r#"{"detail":"Not found."}"#)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let result = client.wait_for_project_update(7, &quick_wait()).await;

        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }
}
