//! Inventory group endpoints

use serde::Deserialize;

use super::client::Client;
use super::common::{AwxApiResource, ListResponse, QueryParams};
use super::error::ApiError;

#[derive(Debug, Clone, Deserialize)]
pub struct Group {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub inventory: i64,
    #[serde(default)]
    pub variables: String,
}

impl AwxApiResource for Group {
    fn collection_path() -> &'static str {
        "/api/v2/groups/"
    }
}

impl Client {
    pub async fn list_groups(&self, params: &QueryParams) -> Result<ListResponse<Group>, ApiError> {
        self.get_with_params(Group::collection_path(), params).await
    }
}
