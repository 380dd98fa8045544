use crate::api::{Client, QueryParams};
use crate::plugin::{
    AttributeBuilder, Config, DataSource, DataSourceSchema, Diagnostics, Dynamic, Error,
    SchemaBuilder, State,
};
use async_trait::async_trait;

pub struct InventoryGroupDataSource {
    client: Client,
}

impl InventoryGroupDataSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn schema_static() -> DataSourceSchema {
        SchemaBuilder::new()
            .attribute(
                "name",
                AttributeBuilder::string("name")
                    .required()
                    .description("Name of this group"),
            )
            .attribute(
                "id",
                AttributeBuilder::number("id")
                    .computed()
                    .description("Id of the ansible inventory group"),
            )
            .attribute(
                "inventory_id",
                AttributeBuilder::number("inventory_id")
                    .computed()
                    .description("Id of the ansible inventory this group belongs to"),
            )
            .build_data_source(0)
    }
}

#[async_trait]
impl DataSource for InventoryGroupDataSource {
    fn schema(&self) -> DataSourceSchema {
        Self::schema_static()
    }

    async fn read(&self, config: Config) -> Result<(State, Diagnostics), Error> {
        let diags = Diagnostics::new();
        let name = config
            .string("name")
            .ok_or_else(|| Error::InvalidConfiguration("name is required".to_string()))?;

        let list = self
            .client
            .list_groups(&QueryParams::new().add("name", name))
            .await?;

        let mut state = State::new();
        state.set("name", Dynamic::String(name.to_string()));

        if let Some(group) = list.results.first() {
            state.set("id", Dynamic::Number(group.id as f64));
            state.set("name", Dynamic::String(group.name.clone()));
            state.set("inventory_id", Dynamic::Number(group.inventory as f64));
        }

        Ok((state, diags))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use std::collections::HashMap;

    #[tokio::test]
    async fn read_maps_group_and_parent_inventory() {
        let mut server = Server::new_async().await;
        let _list = server
            .mock("GET", "/api/v2/groups/?name=web")
            .with_body(
                r#"{"count":1,"next":null,"previous":null,"results":[
                    {"id":3,"name":"web","inventory":1,"variables":""}
                ]}"#,
            )
            .create_async()
            .await;

        let client = Client::new(&server.url(), "admin", "password", true).unwrap();
        let source = InventoryGroupDataSource::new(client);

        let mut values = HashMap::new();
        values.insert("name".to_string(), Dynamic::String("web".to_string()));
        let (state, diags) = source.read(Config { values }).await.unwrap();

        assert!(diags.errors.is_empty());
        assert_eq!(state.i64("id"), Some(3));
        assert_eq!(state.i64("inventory_id"), Some(1));
    }

    #[tokio::test]
    async fn read_with_no_match_returns_no_id_and_no_error() {
        let mut server = Server::new_async().await;
        let _list = server
            .mock("GET", "/api/v2/groups/?name=ghost")
            .with_body(r#"{"count":0,"next":null,"previous":null,"results":[]}"#)
            .create_async()
            .await;

        let client = Client::new(&server.url(), "admin", "password", true).unwrap();
        let source = InventoryGroupDataSource::new(client);

        let mut values = HashMap::new();
        values.insert("name".to_string(), Dynamic::String("ghost".to_string()));
        let (state, diags) = source.read(Config { values }).await.unwrap();

        assert!(diags.errors.is_empty());
        assert!(state.i64("id").is_none());
        assert!(state.i64("inventory_id").is_none());
    }
}
