use crate::api::{Client, QueryParams};
use crate::plugin::{
    AttributeBuilder, Config, DataSource, DataSourceSchema, Diagnostics, Dynamic, Error,
    SchemaBuilder, State,
};
use async_trait::async_trait;

pub struct ProjectDataSource {
    client: Client,
}

impl ProjectDataSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn schema_static() -> DataSourceSchema {
        SchemaBuilder::new()
            .attribute(
                "name",
                AttributeBuilder::string("name")
                    .required()
                    .description("Name of this project"),
            )
            .attribute(
                "id",
                AttributeBuilder::number("id")
                    .computed()
                    .description("Id of the ansible project"),
            )
            .build_data_source(0)
    }
}

#[async_trait]
impl DataSource for ProjectDataSource {
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
            .list_projects(&QueryParams::new().add("name", name))
            .await?;

        let mut state = State::new();
        state.set("name", Dynamic::String(name.to_string()));

        // No match leaves the id unset; the first match wins otherwise.
        if let Some(project) = list.results.first() {
            state.set("id", Dynamic::Number(project.id as f64));
            state.set("name", Dynamic::String(project.name.clone()));
        }

        Ok((state, diags))
    }
}
