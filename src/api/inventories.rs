//! Inventory endpoints

use serde::{Deserialize, Serialize};

use super::client::Client;
use super::common::{AwxApiResource, ListResponse, QueryParams};
use super::error::ApiError;

#[derive(Debug, Clone, Deserialize)]
pub struct Inventory {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub organization: i64,
    /// Empty for a regular inventory, "smart" for a smart inventory.
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub host_filter: Option<String>,
    #[serde(default)]
    pub variables: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InventoryRequest {
    pub name: String,
    pub description: String,
    pub organization: i64,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_filter: Option<String>,
    pub variables: String,
}

impl AwxApiResource for Inventory {
    fn collection_path() -> &'static str {
        "/api/v2/inventories/"
    }
}

impl Client {
    pub async fn list_inventories(
        &self,
        params: &QueryParams,
    ) -> Result<ListResponse<Inventory>, ApiError> {
        self.get_with_params(Inventory::collection_path(), params)
            .await
    }

    pub async fn get_inventory(&self, id: i64) -> Result<Inventory, ApiError> {
        self.get(&Inventory::object_path(id)).await
    }

    pub async fn create_inventory(&self, request: &InventoryRequest) -> Result<Inventory, ApiError> {
        self.post(Inventory::collection_path(), request).await
    }

    pub async fn update_inventory(
        &self,
        id: i64,
        request: &InventoryRequest,
    ) -> Result<Inventory, ApiError> {
        self.put(&Inventory::object_path(id), request).await
    }

    pub async fn delete_inventory(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&Inventory::object_path(id)).await
    }
}
