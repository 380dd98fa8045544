use crate::api::{Client, QueryParams};
use crate::plugin::{
    AttributeBuilder, Config, DataSource, DataSourceSchema, Diagnostics, Dynamic, Error,
    SchemaBuilder, State,
};
use async_trait::async_trait;

pub struct InventoryDataSource {
    client: Client,
}

impl InventoryDataSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn schema_static() -> DataSourceSchema {
        SchemaBuilder::new()
            .attribute(
                "name",
                AttributeBuilder::string("name")
                    .required()
                    .description("Name of this inventory"),
            )
            .attribute(
                "id",
                AttributeBuilder::number("id")
                    .computed()
                    .description("Id of the ansible inventory"),
            )
            .build_data_source(0)
    }
}

#[async_trait]
impl DataSource for InventoryDataSource {
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
            .list_inventories(&QueryParams::new().add("name", name))
            .await?;

        let mut state = State::new();
        state.set("name", Dynamic::String(name.to_string()));

        if let Some(inventory) = list.results.first() {
            state.set("id", Dynamic::Number(inventory.id as f64));
            state.set("name", Dynamic::String(inventory.name.clone()));
        }

        Ok((state, diags))
    }
}
