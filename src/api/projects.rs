//! Project endpoints

use serde::{Deserialize, Serialize};

use super::client::Client;
use super::common::{AwxApiResource, ListResponse, QueryParams};
use super::error::ApiError;

/// Summary entry for a project's current or last update job.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateJobSummary {
    pub id: i64,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectSummaryFields {
    #[serde(default)]
    pub current_job: Option<UpdateJobSummary>,
    #[serde(default)]
    pub last_job: Option<UpdateJobSummary>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub local_path: String,
    #[serde(default)]
    pub scm_type: String,
    #[serde(default)]
    pub scm_url: String,
    #[serde(default)]
    pub scm_branch: String,
    #[serde(default)]
    pub scm_refspec: String,
    #[serde(default)]
    pub scm_clean: bool,
    #[serde(default)]
    pub scm_delete_on_update: bool,
    #[serde(default)]
    pub credential: Option<i64>,
    #[serde(default)]
    pub timeout: i64,
    pub organization: i64,
    #[serde(default)]
    pub scm_update_on_launch: bool,
    #[serde(default)]
    pub scm_update_cache_timeout: i64,
    #[serde(default)]
    pub allow_override: bool,
    #[serde(default)]
    pub custom_virtualenv: Option<String>,
    #[serde(default)]
    pub summary_fields: ProjectSummaryFields,
}

impl Project {
    /// Id of the update job to synchronize on: the running job when there
    /// is one, otherwise the most recent one.
    pub fn update_job_id(&self) -> Option<i64> {
        self.summary_fields
            .current_job
            .as_ref()
            .or(self.summary_fields.last_job.as_ref())
            .map(|job| job.id)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectRequest {
    pub name: String,
    pub description: String,
    pub local_path: String,
    pub scm_type: String,
    pub scm_url: String,
    pub scm_branch: String,
    pub scm_refspec: String,
    pub scm_clean: bool,
    pub scm_delete_on_update: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential: Option<i64>,
    pub timeout: i64,
    pub organization: i64,
    pub scm_update_on_launch: bool,
    pub scm_update_cache_timeout: i64,
    pub allow_override: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_virtualenv: Option<String>,
}

impl AwxApiResource for Project {
    fn collection_path() -> &'static str {
        "/api/v2/projects/"
    }
}

impl Client {
    pub async fn list_projects(
        &self,
        params: &QueryParams,
    ) -> Result<ListResponse<Project>, ApiError> {
        self.get_with_params(Project::collection_path(), params).await
    }

    pub async fn get_project(&self, id: i64) -> Result<Project, ApiError> {
        self.get(&Project::object_path(id)).await
    }

    pub async fn create_project(&self, request: &ProjectRequest) -> Result<Project, ApiError> {
        self.post(Project::collection_path(), request).await
    }

    pub async fn update_project(
        &self,
        id: i64,
        request: &ProjectRequest,
    ) -> Result<Project, ApiError> {
        self.put(&Project::object_path(id), request).await
    }

    pub async fn delete_project(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&Project::object_path(id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    fn test_client(server_url: &str) -> Client {
        Client::new(server_url, "admin", "password", true).unwrap()
    }

    const PROJECT_BODY: &str = r#"{
        "id": 4,
        "name": "infra",
        "description": "",
        "local_path": "_4__infra",
        "scm_type": "git",
        "scm_url": "https://example.com/infra.git",
        "scm_branch": "",
        "scm_refspec": "",
        "scm_clean": false,
        "scm_delete_on_update": false,
        "credential": null,
        "timeout": 0,
        "organization": 4,
        "scm_update_on_launch": false,
        "scm_update_cache_timeout": 0,
        "allow_override": false,
        "custom_virtualenv": null,
        "summary_fields": {}
    }"#;

    #[tokio::test]
    async fn list_projects_passes_filters() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v2/projects/?name=infra&organization=4")
            .with_body(format!(
                r#"{{"count":1,"next":null,"previous":null,"results":[{}]}}"#,
                PROJECT_BODY
            ))
            .create_async()
            .await;

        let client = test_client(&server.url());
        let params = QueryParams::new().add("name", "infra").add("organization", 4);
        let list = client.list_projects(&params).await.unwrap();

        assert_eq!(list.count, 1);
        assert_eq!(list.results[0].id, 4);
        assert_eq!(list.results[0].scm_type, "git");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn create_project_returns_remote_object() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/v2/projects/")
            .with_status(201)
            .with_body(PROJECT_BODY)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let request = ProjectRequest {
            name: "infra".to_string(),
            description: String::new(),
            local_path: String::new(),
            scm_type: "git".to_string(),
            scm_url: "https://example.com/infra.git".to_string(),
            scm_branch: String::new(),
            scm_refspec: String::new(),
            scm_clean: false,
            scm_delete_on_update: false,
            credential: None,
            timeout: 0,
            organization: 4,
            scm_update_on_launch: false,
            scm_update_cache_timeout: 0,
            allow_override: false,
            custom_virtualenv: None,
        };

        let created = client.create_project(&request).await.unwrap();
        assert_eq!(created.id, 4);
        assert_eq!(created.organization, 4);
    }

    #[test]
    fn update_job_prefers_current_over_last() {
        let mut project: Project = serde_json::from_str(PROJECT_BODY).unwrap();
        assert_eq!(project.update_job_id(), None);

        project.summary_fields.last_job = Some(UpdateJobSummary {
            id: 7,
            status: Some("successful".to_string()),
        });
        assert_eq!(project.update_job_id(), Some(7));

        project.summary_fields.current_job = Some(UpdateJobSummary {
            id: 9,
            status: Some("running".to_string()),
        });
        assert_eq!(project.update_job_id(), Some(9));
    }
}
