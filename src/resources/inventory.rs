use crate::api::{Client, Inventory, InventoryRequest, QueryParams};
use crate::plugin::{
    AttributeBuilder, Config, Diagnostics, Dynamic, Error, Resource, ResourceSchema,
    ResourceWithImport, SchemaBuilder, State,
};
use async_trait::async_trait;

pub struct InventoryResource {
    client: Client,
}

impl InventoryResource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn schema_static() -> ResourceSchema {
        SchemaBuilder::new()
            .attribute("id", AttributeBuilder::string("id").computed())
            .attribute(
                "name",
                AttributeBuilder::string("name")
                    .required()
                    .description("Name of this inventory"),
            )
            .attribute(
                "description",
                AttributeBuilder::string("description")
                    .optional()
                    .default_value(Dynamic::String(String::new()))
                    .description("Optional description of this inventory."),
            )
            .attribute(
                "organization_id",
                AttributeBuilder::number("organization_id")
                    .required()
                    .description("Numeric ID of the inventory organization"),
            )
            .attribute(
                "kind",
                AttributeBuilder::string("kind")
                    .optional()
                    .default_value(Dynamic::String(String::new()))
                    .description("Kind of inventory being represented (blank or 'smart')."),
            )
            .attribute(
                "host_filter",
                AttributeBuilder::string("host_filter")
                    .optional()
                    .description("Filter that will be applied to the hosts of a smart inventory."),
            )
            .attribute(
                "variables",
                AttributeBuilder::string("variables")
                    .optional()
                    .default_value(Dynamic::String(String::new()))
                    .description("Inventory variables in JSON or YAML format."),
            )
            .build_resource(0)
    }
}

/// Declarative configuration to remote payload.
fn inventory_request(config: &Config) -> Result<InventoryRequest, Error> {
    let name = config
        .string("name")
        .ok_or_else(|| Error::InvalidConfiguration("name is required".to_string()))?;
    let organization = config
        .i64("organization_id")
        .ok_or_else(|| Error::InvalidConfiguration("organization_id is required".to_string()))?;

    Ok(InventoryRequest {
        name: name.to_string(),
        description: config.string_or("description", ""),
        organization,
        kind: config.string_or("kind", ""),
        host_filter: config.string("host_filter").map(str::to_string),
        variables: config.string_or("variables", ""),
    })
}

/// Remote object to declarative state.
fn inventory_state(inventory: &Inventory) -> State {
    let mut state = State::new();
    state.set("id", Dynamic::String(inventory.id.to_string()));
    state.set("name", Dynamic::String(inventory.name.clone()));
    state.set(
        "description",
        Dynamic::String(inventory.description.clone()),
    );
    state.set(
        "organization_id",
        Dynamic::Number(inventory.organization as f64),
    );
    state.set("kind", Dynamic::String(inventory.kind.clone()));
    if let Some(filter) = &inventory.host_filter {
        state.set("host_filter", Dynamic::String(filter.clone()));
    }
    state.set("variables", Dynamic::String(inventory.variables.clone()));
    state
}

fn state_id(state: &State) -> Result<i64, Error> {
    state
        .string("id")
        .ok_or_else(|| Error::InvalidState("id missing from state".to_string()))?
        .parse()
        .map_err(|_| Error::InvalidState("id is not a numeric identifier".to_string()))
}

#[async_trait]
impl Resource for InventoryResource {
    fn schema(&self) -> ResourceSchema {
        Self::schema_static()
    }

    async fn create(&self, config: Config) -> Result<(State, Diagnostics), Error> {
        let diags = Diagnostics::new();
        let request = inventory_request(&config)?;

        let params = QueryParams::new()
            .add("name", &request.name)
            .add("organization", request.organization);
        let existing = self.client.list_inventories(&params).await?;
        if !existing.results.is_empty() {
            return Err(Error::AlreadyExists(format!(
                "inventory with name {} already exists in organization {}",
                request.name, request.organization
            )));
        }

        let created = self.client.create_inventory(&request).await?;
        Ok((inventory_state(&created), diags))
    }

    async fn read(&self, state: State) -> Result<(Option<State>, Diagnostics), Error> {
        let diags = Diagnostics::new();
        let name = state
            .string("name")
            .ok_or_else(|| Error::InvalidState("name missing from state".to_string()))?
            .to_string();

        let list = self
            .client
            .list_inventories(&QueryParams::new().add("name", &name))
            .await?;

        match list.results.first() {
            Some(inventory) => Ok((Some(inventory_state(inventory)), diags)),
            None => Ok((Some(state), diags)),
        }
    }

    async fn update(&self, state: State, config: Config) -> Result<(State, Diagnostics), Error> {
        let diags = Diagnostics::new();
        let id = state_id(&state)?;
        let request = inventory_request(&config)?;

        let params = QueryParams::new()
            .add("id", id)
            .add("organization", request.organization);
        let existing = self.client.list_inventories(&params).await?;
        if existing.results.is_empty() {
            return Err(Error::NotFound(format!(
                "inventory with name {} does not exist in organization {}",
                request.name, request.organization
            )));
        }

        let updated = self.client.update_inventory(id, &request).await?;
        Ok((inventory_state(&updated), diags))
    }

    async fn delete(&self, state: State) -> Result<Diagnostics, Error> {
        let diags = Diagnostics::new();
        let id = state_id(&state)?;
        let name = state
            .string("name")
            .ok_or_else(|| Error::InvalidState("name missing from state".to_string()))?;

        let params = QueryParams::new().add("name", name).add("id", id);
        let list = self.client.list_inventories(&params).await?;
        if list.results.is_empty() {
            return Ok(diags);
        }

        self.client.delete_inventory(id).await?;
        Ok(diags)
    }
}

#[async_trait]
impl ResourceWithImport for InventoryResource {
    async fn import(&self, id: &str) -> Result<(State, Diagnostics), Error> {
        let diags = Diagnostics::new();
        let id: i64 = id
            .parse()
            .map_err(|_| Error::InvalidState(format!("{} is not a numeric identifier", id)))?;

        let inventory = self.client.get_inventory(id).await?;
        Ok((inventory_state(&inventory), diags))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Server, ServerGuard};
    use std::collections::HashMap;

    const INVENTORY_BODY: &str = r#"{
        "id": 1,
        "name": "lab",
        "description": "",
        "organization": 4,
        "kind": "",
        "host_filter": null,
        "variables": "---"
    }"#;

    fn test_resource(server: &ServerGuard) -> InventoryResource {
        let client = Client::new(&server.url(), "admin", "password", true).unwrap();
        InventoryResource::new(client)
    }

    fn test_config() -> Config {
        let mut values = HashMap::new();
        values.insert("name".to_string(), Dynamic::String("lab".to_string()));
        values.insert("organization_id".to_string(), Dynamic::Number(4.0));
        values.insert("variables".to_string(), Dynamic::String("---".to_string()));
        Config { values }
    }

    fn empty_list() -> &'static str {
        r#"{"count":0,"next":null,"previous":null,"results":[]}"#
    }

    fn single_list(body: &str) -> String {
        format!(r#"{{"count":1,"next":null,"previous":null,"results":[{}]}}"#, body)
    }

    #[test]
    fn resource_has_correct_schema() {
        let schema = InventoryResource::schema_static();

        assert!(schema.attributes["name"].required);
        assert!(schema.attributes["organization_id"].required);
        assert!(schema.attributes["id"].computed);
        assert!(schema.attributes["kind"].optional);
    }

    #[tokio::test]
    async fn create_populates_state_from_remote_object() {
        let mut server = Server::new_async().await;
        let _list = server
            .mock("GET", "/api/v2/inventories/?name=lab&organization=4")
            .with_body(empty_list())
            .create_async()
            .await;
        let _create = server
            .mock("POST", "/api/v2/inventories/")
            .with_status(201)
            .with_body(INVENTORY_BODY)
            .create_async()
            .await;

        let resource = test_resource(&server);
        let (state, diags) = resource.create(test_config()).await.unwrap();

        assert!(diags.errors.is_empty());
        assert_eq!(state.string("id"), Some("1"));
        assert_eq!(state.i64("organization_id"), Some(4));
        assert_eq!(state.string("variables"), Some("---"));
    }

    #[tokio::test]
    async fn create_fails_when_name_exists_in_organization() {
        let mut server = Server::new_async().await;
        let _list = server
            .mock("GET", "/api/v2/inventories/?name=lab&organization=4")
            .with_body(single_list(INVENTORY_BODY))
            .create_async()
            .await;
        let create = server
            .mock("POST", "/api/v2/inventories/")
            .expect(0)
            .create_async()
            .await;

        let resource = test_resource(&server);
        let result = resource.create(test_config()).await;

        assert!(matches!(result, Err(Error::AlreadyExists(_))));
        create.assert_async().await;
    }

    #[tokio::test]
    async fn delete_succeeds_without_remote_call_when_already_gone() {
        let mut server = Server::new_async().await;
        let _list = server
            .mock("GET", "/api/v2/inventories/?name=lab&id=1")
            .with_body(empty_list())
            .create_async()
            .await;
        let delete = server
            .mock("DELETE", "/api/v2/inventories/1/")
            .expect(0)
            .create_async()
            .await;

        let mut state = State::new();
        state.set("id", Dynamic::String("1".to_string()));
        state.set("name", Dynamic::String("lab".to_string()));

        let resource = test_resource(&server);
        let diags = resource.delete(state).await.unwrap();

        assert!(diags.errors.is_empty());
        delete.assert_async().await;
    }

    #[tokio::test]
    async fn update_fails_when_inventory_is_gone() {
        let mut server = Server::new_async().await;
        let _list = server
            .mock("GET", "/api/v2/inventories/?id=1&organization=4")
            .with_body(empty_list())
            .create_async()
            .await;

        let mut state = State::new();
        state.set("id", Dynamic::String("1".to_string()));

        let resource = test_resource(&server);
        let result = resource.update(state, test_config()).await;

        assert!(matches!(result, Err(Error::NotFound(_))));
    }
}
