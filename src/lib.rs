//! Terraform provider for Ansible Tower/AWX
//!
//! Maps declarative resource blocks onto CRUD calls against the Tower/AWX
//! REST API. The hosting plugin framework drives the [`plugin::Provider`]
//! implementation exposed here.

pub mod api;
pub mod data_sources;
pub mod plugin;
pub mod resources;

use async_trait::async_trait;
use std::collections::HashMap;

use plugin::{
    Config, DataSource, DataSourceSchema, Diagnostics, Error, Provider, Resource, ResourceSchema,
};

pub struct AwxProvider {
    client: Option<api::Client>,
}

impl Default for AwxProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl AwxProvider {
    pub fn new() -> Self {
        Self { client: None }
    }

    fn configured_client(&self) -> plugin::Result<api::Client> {
        self.client
            .as_ref()
            .cloned()
            .ok_or(Error::ProviderNotConfigured)
    }
}

/// First set variable from `keys`, otherwise the documented default.
fn env_fallback(keys: &[&str], default: &str) -> String {
    keys.iter()
        .find_map(|key| std::env::var(key).ok())
        .unwrap_or_else(|| default.to_string())
}

#[async_trait]
impl Provider for AwxProvider {
    async fn configure(&mut self, config: Config) -> Diagnostics {
        let endpoint = config
            .string("endpoint")
            .map(str::to_string)
            .unwrap_or_else(|| env_fallback(&["TOWER_ENDPOINT", "AWX_ENDPOINT"], "http://localhost"));

        let username = config
            .string("username")
            .map(str::to_string)
            .unwrap_or_else(|| env_fallback(&["TOWER_USERNAME", "AWX_USERNAME"], "admin"));

        let password = config
            .string("password")
            .map(str::to_string)
            .unwrap_or_else(|| env_fallback(&["TOWER_PASSWORD", "AWX_PASSWORD"], "password"));

        let insecure = config.bool("ssl_skip_verify").unwrap_or_else(|| {
            env_fallback(&["TOWER_SSLSKIPVERIFY", "AWX_SSLSKIPVERIFY"], "false")
                .parse()
                .unwrap_or(false)
        });

        let mut diags = Diagnostics::new();

        tracing::info!("initializing Tower/AWX client for {}", endpoint);
        match api::Client::new(&endpoint, &username, &password, insecure) {
            Ok(client) => self.client = Some(client),
            Err(e) => diags.add_error(format!("failed to create API client: {}", e), None::<String>),
        }

        diags
    }

    fn create_resource(&self, name: &str) -> plugin::Result<Box<dyn Resource>> {
        let client = self.configured_client()?;

        match name {
            "awx_project" => Ok(Box::new(resources::ProjectResource::new(client))),
            "awx_job_template" => Ok(Box::new(resources::JobTemplateResource::new(client))),
            "awx_inventory" => Ok(Box::new(resources::InventoryResource::new(client))),
            _ => Err(Error::ResourceNotFound(name.to_string())),
        }
    }

    fn create_data_source(&self, name: &str) -> plugin::Result<Box<dyn DataSource>> {
        let client = self.configured_client()?;

        match name {
            "awx_project" => Ok(Box::new(data_sources::ProjectDataSource::new(client))),
            "awx_inventory" => Ok(Box::new(data_sources::InventoryDataSource::new(client))),
            "awx_inventory_group" => Ok(Box::new(data_sources::InventoryGroupDataSource::new(
                client,
            ))),
            _ => Err(Error::DataSourceNotFound(name.to_string())),
        }
    }

    fn resource_schemas(&self) -> HashMap<String, ResourceSchema> {
        static SCHEMAS: std::sync::OnceLock<HashMap<String, ResourceSchema>> =
            std::sync::OnceLock::new();

        SCHEMAS
            .get_or_init(|| {
                let mut schemas = HashMap::new();
                schemas.insert(
                    "awx_project".to_string(),
                    resources::ProjectResource::schema_static(),
                );
                schemas.insert(
                    "awx_job_template".to_string(),
                    resources::JobTemplateResource::schema_static(),
                );
                schemas.insert(
                    "awx_inventory".to_string(),
                    resources::InventoryResource::schema_static(),
                );
                schemas
            })
            .clone()
    }

    fn data_source_schemas(&self) -> HashMap<String, DataSourceSchema> {
        static SCHEMAS: std::sync::OnceLock<HashMap<String, DataSourceSchema>> =
            std::sync::OnceLock::new();

        SCHEMAS
            .get_or_init(|| {
                let mut schemas = HashMap::new();
                schemas.insert(
                    "awx_project".to_string(),
                    data_sources::ProjectDataSource::schema_static(),
                );
                schemas.insert(
                    "awx_inventory".to_string(),
                    data_sources::InventoryDataSource::schema_static(),
                );
                schemas.insert(
                    "awx_inventory_group".to_string(),
                    data_sources::InventoryGroupDataSource::schema_static(),
                );
                schemas
            })
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::Dynamic;
    use serial_test::serial;

    const ENV_KEYS: [&str; 8] = [
        "TOWER_ENDPOINT",
        "AWX_ENDPOINT",
        "TOWER_USERNAME",
        "AWX_USERNAME",
        "TOWER_PASSWORD",
        "AWX_PASSWORD",
        "TOWER_SSLSKIPVERIFY",
        "AWX_SSLSKIPVERIFY",
    ];

    fn clear_env() {
        for key in ENV_KEYS {
            std::env::remove_var(key);
        }
    }

    #[tokio::test]
    #[serial]
    async fn provider_configures_from_env_vars() {
        clear_env();
        std::env::set_var("TOWER_ENDPOINT", "https://tower.example.com");
        std::env::set_var("TOWER_USERNAME", "operator");
        std::env::set_var("TOWER_PASSWORD", "secret");
        std::env::set_var("TOWER_SSLSKIPVERIFY", "true");

        let mut provider = AwxProvider::new();
        let diags = provider.configure(Config::new()).await;

        assert!(diags.errors.is_empty());
        assert!(provider.client.is_some());

        clear_env();
    }

    #[tokio::test]
    #[serial]
    async fn provider_falls_back_to_documented_defaults() {
        clear_env();

        let mut provider = AwxProvider::new();
        let diags = provider.configure(Config::new()).await;

        // endpoint defaults to http://localhost, credentials to admin/password
        assert!(diags.errors.is_empty());
        assert!(provider.client.is_some());
    }

    #[tokio::test]
    #[serial]
    async fn provider_prefers_explicit_config_over_env() {
        clear_env();
        std::env::set_var("TOWER_ENDPOINT", "not a url");

        let mut config = Config::new();
        config.values.insert(
            "endpoint".to_string(),
            Dynamic::String("https://tower.example.com".to_string()),
        );

        let mut provider = AwxProvider::new();
        let diags = provider.configure(config).await;

        assert!(diags.errors.is_empty());

        clear_env();
    }

    #[tokio::test]
    #[serial]
    async fn provider_reports_invalid_endpoint() {
        clear_env();
        std::env::set_var("AWX_ENDPOINT", "not a url");

        let mut provider = AwxProvider::new();
        let diags = provider.configure(Config::new()).await;

        assert_eq!(diags.errors.len(), 1);
        assert!(diags.errors[0].summary.contains("failed to create API client"));
        assert!(provider.client.is_none());

        clear_env();
    }

    #[tokio::test]
    #[serial]
    async fn provider_creates_known_resources_and_data_sources() {
        clear_env();

        let mut provider = AwxProvider::new();
        provider.configure(Config::new()).await;

        assert!(provider.create_resource("awx_project").is_ok());
        assert!(provider.create_resource("awx_job_template").is_ok());
        assert!(provider.create_resource("awx_inventory").is_ok());
        assert!(provider.create_data_source("awx_project").is_ok());
        assert!(provider.create_data_source("awx_inventory").is_ok());
        assert!(provider.create_data_source("awx_inventory_group").is_ok());

        assert!(matches!(
            provider.create_resource("unknown_resource"),
            Err(Error::ResourceNotFound(_))
        ));
        assert!(matches!(
            provider.create_data_source("unknown_data_source"),
            Err(Error::DataSourceNotFound(_))
        ));
    }

    #[tokio::test]
    async fn provider_rejects_dispatch_before_configuration() {
        let provider = AwxProvider::new();

        assert!(matches!(
            provider.create_resource("awx_project"),
            Err(Error::ProviderNotConfigured)
        ));
        assert!(matches!(
            provider.create_data_source("awx_project"),
            Err(Error::ProviderNotConfigured)
        ));
    }

    #[test]
    fn provider_schemas_contain_expected_types() {
        let provider = AwxProvider::new();

        let resource_schemas = provider.resource_schemas();
        assert!(resource_schemas.contains_key("awx_project"));
        assert!(resource_schemas.contains_key("awx_job_template"));
        assert!(resource_schemas.contains_key("awx_inventory"));

        let data_source_schemas = provider.data_source_schemas();
        assert!(data_source_schemas.contains_key("awx_project"));
        assert!(data_source_schemas.contains_key("awx_inventory"));
        assert!(data_source_schemas.contains_key("awx_inventory_group"));
    }
}
