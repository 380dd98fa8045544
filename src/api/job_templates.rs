//! Job template endpoints

use serde::{Deserialize, Serialize};

use super::client::Client;
use super::common::{AwxApiResource, ListResponse, QueryParams};
use super::error::ApiError;

/// A concrete credential record as it appears in association summaries.
#[derive(Debug, Clone, Deserialize)]
pub struct Credential {
    pub id: i64,
    pub name: String,
    pub credential_type: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobTemplateSummaryFields {
    /// Heterogeneous: the API mixes credential records with other
    /// associated objects here.
    #[serde(default)]
    pub extra_credentials: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobTemplate {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub job_type: String,
    #[serde(default)]
    pub inventory: Option<i64>,
    #[serde(default)]
    pub project: Option<i64>,
    #[serde(default)]
    pub playbook: String,
    #[serde(default)]
    pub credential: Option<i64>,
    #[serde(default)]
    pub scm_branch: String,
    #[serde(default)]
    pub forks: i64,
    #[serde(default)]
    pub limit: String,
    #[serde(default)]
    pub verbosity: i64,
    #[serde(default)]
    pub extra_vars: String,
    #[serde(default)]
    pub job_tags: String,
    #[serde(default)]
    pub force_handlers: bool,
    #[serde(default)]
    pub skip_tags: String,
    #[serde(default)]
    pub start_at_task: String,
    #[serde(default)]
    pub timeout: i64,
    #[serde(default)]
    pub use_fact_cache: bool,
    #[serde(default)]
    pub host_config_key: String,
    #[serde(default)]
    pub ask_scm_branch_on_launch: bool,
    #[serde(default)]
    pub ask_diff_mode_on_launch: bool,
    #[serde(default)]
    pub ask_variables_on_launch: bool,
    #[serde(default)]
    pub ask_limit_on_launch: bool,
    #[serde(default)]
    pub ask_tags_on_launch: bool,
    #[serde(default)]
    pub ask_skip_tags_on_launch: bool,
    #[serde(default)]
    pub ask_job_type_on_launch: bool,
    #[serde(default)]
    pub ask_verbosity_on_launch: bool,
    #[serde(default)]
    pub ask_inventory_on_launch: bool,
    #[serde(default)]
    pub ask_credential_on_launch: bool,
    #[serde(default)]
    pub survey_enabled: bool,
    #[serde(default)]
    pub become_enabled: bool,
    #[serde(default)]
    pub diff_mode: bool,
    #[serde(default)]
    pub allow_simultaneous: bool,
    #[serde(default)]
    pub custom_virtualenv: Option<String>,
    #[serde(default)]
    pub job_slice_count: i64,
    #[serde(default)]
    pub webhook_service: String,
    #[serde(default)]
    pub webhook_credential: Option<i64>,
    #[serde(default)]
    pub vault_credential: Option<i64>,
    #[serde(default)]
    pub summary_fields: JobTemplateSummaryFields,
}

impl JobTemplate {
    /// Extra credential ids, filtered down from the heterogeneous
    /// association summary to entries that are concrete credential records.
    pub fn extra_credential_ids(&self) -> Vec<i64> {
        self.summary_fields
            .extra_credentials
            .iter()
            .filter_map(|value| serde_json::from_value::<Credential>(value.clone()).ok())
            .map(|credential| credential.id)
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JobTemplateRequest {
    pub name: String,
    pub description: String,
    pub job_type: String,
    pub inventory: Option<i64>,
    pub project: Option<i64>,
    pub playbook: String,
    pub credential: Option<i64>,
    pub scm_branch: String,
    pub forks: i64,
    pub limit: String,
    pub verbosity: i64,
    pub extra_vars: String,
    pub job_tags: String,
    pub force_handlers: bool,
    pub skip_tags: String,
    pub start_at_task: String,
    pub timeout: i64,
    pub use_fact_cache: bool,
    pub host_config_key: String,
    pub ask_scm_branch_on_launch: bool,
    pub ask_diff_mode_on_launch: bool,
    pub ask_variables_on_launch: bool,
    pub ask_limit_on_launch: bool,
    pub ask_tags_on_launch: bool,
    pub ask_skip_tags_on_launch: bool,
    pub ask_job_type_on_launch: bool,
    pub ask_verbosity_on_launch: bool,
    pub ask_inventory_on_launch: bool,
    pub ask_credential_on_launch: bool,
    pub survey_enabled: bool,
    pub become_enabled: bool,
    pub diff_mode: bool,
    pub allow_simultaneous: bool,
    pub custom_virtualenv: Option<String>,
    pub job_slice_count: i64,
    pub webhook_service: String,
    pub webhook_credential: Option<i64>,
    pub vault_credential: Option<i64>,
}

#[derive(Debug, Serialize)]
struct AssociateCredential {
    id: i64,
    associate: bool,
}

impl AwxApiResource for JobTemplate {
    fn collection_path() -> &'static str {
        "/api/v2/job_templates/"
    }
}

impl Client {
    pub async fn list_job_templates(
        &self,
        params: &QueryParams,
    ) -> Result<ListResponse<JobTemplate>, ApiError> {
        self.get_with_params(JobTemplate::collection_path(), params)
            .await
    }

    pub async fn get_job_template(&self, id: i64) -> Result<JobTemplate, ApiError> {
        self.get(&JobTemplate::object_path(id)).await
    }

    pub async fn create_job_template(
        &self,
        request: &JobTemplateRequest,
    ) -> Result<JobTemplate, ApiError> {
        self.post(JobTemplate::collection_path(), request).await
    }

    pub async fn update_job_template(
        &self,
        id: i64,
        request: &JobTemplateRequest,
    ) -> Result<JobTemplate, ApiError> {
        self.put(&JobTemplate::object_path(id), request).await
    }

    pub async fn delete_job_template(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&JobTemplate::object_path(id)).await
    }

    /// Attaches one extra credential to a template. Association is one call
    /// per credential on this API.
    pub async fn associate_credential(
        &self,
        template_id: i64,
        credential_id: i64,
    ) -> Result<(), ApiError> {
        let path = format!("{}extra_credentials/", JobTemplate::object_path(template_id));
        self.post(
            &path,
            &AssociateCredential {
                id: credential_id,
                associate: true,
            },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    fn test_client(server_url: &str) -> Client {
        Client::new(server_url, "admin", "password", true).unwrap()
    }

    #[test]
    fn extra_credential_ids_filter_out_non_credentials() {
        let body = r#"{
            "id": 5,
            "name": "alpha",
            "job_type": "run",
            "summary_fields": {
                "extra_credentials": [
                    {"id": 11, "name": "vault", "credential_type": 3},
                    {"id": 12, "name": "not-a-credential"},
                    "unexpected"
                ]
            }
        }"#;

        let template: JobTemplate = serde_json::from_str(body).unwrap();
        assert_eq!(template.extra_credential_ids(), vec![11]);
    }

    #[tokio::test]
    async fn associate_credential_posts_association_payload() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v2/job_templates/5/extra_credentials/")
            .match_body(mockito::Matcher::Json(
                serde_json::json!({"id": 11, "associate": true}),
            ))
            .with_status(204)
            .create_async()
            .await;

        let client = test_client(&server.url());
        client.associate_credential(5, 11).await.unwrap();

        mock.assert_async().await;
    }

    #[test]
    fn unset_references_serialize_as_null() {
        let request = JobTemplateRequest {
            name: "alpha".to_string(),
            description: String::new(),
            job_type: "run".to_string(),
            inventory: None,
            project: Some(4),
            playbook: "hello_world.yml".to_string(),
            credential: None,
            scm_branch: String::new(),
            forks: 0,
            limit: String::new(),
            verbosity: 0,
            extra_vars: String::new(),
            job_tags: String::new(),
            force_handlers: false,
            skip_tags: String::new(),
            start_at_task: String::new(),
            timeout: 0,
            use_fact_cache: false,
            host_config_key: String::new(),
            ask_scm_branch_on_launch: false,
            ask_diff_mode_on_launch: false,
            ask_variables_on_launch: false,
            ask_limit_on_launch: false,
            ask_tags_on_launch: false,
            ask_skip_tags_on_launch: false,
            ask_job_type_on_launch: false,
            ask_verbosity_on_launch: false,
            ask_inventory_on_launch: false,
            ask_credential_on_launch: false,
            survey_enabled: false,
            become_enabled: false,
            diff_mode: false,
            allow_simultaneous: false,
            custom_virtualenv: None,
            job_slice_count: 1,
            webhook_service: String::new(),
            webhook_credential: None,
            vault_credential: None,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert!(value["inventory"].is_null());
        assert_eq!(value["project"], 4);
        assert_eq!(value["job_slice_count"], 1);
    }
}
