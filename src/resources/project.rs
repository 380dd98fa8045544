use crate::api::{Client, Project, ProjectRequest, QueryParams, WaitConfig};
use crate::plugin::{
    AttributeBuilder, Config, Diagnostics, Dynamic, Error, Resource, ResourceSchema,
    ResourceWithImport, SchemaBuilder, State,
};
use async_trait::async_trait;

pub struct ProjectResource {
    client: Client,
    wait: WaitConfig,
}

impl ProjectResource {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            wait: WaitConfig::default(),
        }
    }

    pub fn with_wait(client: Client, wait: WaitConfig) -> Self {
        Self { client, wait }
    }

    pub fn schema_static() -> ResourceSchema {
        SchemaBuilder::new()
            .attribute("id", AttributeBuilder::string("id").computed())
            .attribute(
                "name",
                AttributeBuilder::string("name")
                    .required()
                    .description("Name of this project"),
            )
            .attribute(
                "description",
                AttributeBuilder::string("description")
                    .optional()
                    .default_value(Dynamic::String(String::new()))
                    .description("Optional description of this project."),
            )
            .attribute(
                "local_path",
                AttributeBuilder::string("local_path")
                    .optional()
                    .default_value(Dynamic::String(String::new()))
                    .description(
                        "Local path (relative to PROJECTS_ROOT) containing playbooks and related files for this project.",
                    ),
            )
            .attribute(
                "scm_type",
                AttributeBuilder::string("scm_type")
                    .required()
                    .description(
                        "Specifies the source control system used to store the project (one of '', git, hg, svn, insights).",
                    ),
            )
            .attribute(
                "scm_url",
                AttributeBuilder::string("scm_url")
                    .optional()
                    .default_value(Dynamic::String(String::new()))
                    .description("The location where the project is stored."),
            )
            .attribute(
                "scm_branch",
                AttributeBuilder::string("scm_branch")
                    .optional()
                    .default_value(Dynamic::String(String::new()))
                    .description("Specific branch, tag or commit to checkout."),
            )
            .attribute(
                "scm_refspec",
                AttributeBuilder::string("scm_refspec")
                    .optional()
                    .default_value(Dynamic::String(String::new()))
                    .description("For git projects, an additional refspec to fetch."),
            )
            .attribute(
                "scm_clean",
                AttributeBuilder::bool("scm_clean")
                    .optional()
                    .default_value(Dynamic::Bool(false))
                    .description("Discard any local changes before syncing the project."),
            )
            .attribute(
                "scm_delete_on_update",
                AttributeBuilder::bool("scm_delete_on_update")
                    .optional()
                    .default_value(Dynamic::Bool(false))
                    .description("Delete the project before syncing."),
            )
            .attribute(
                "credential_id",
                AttributeBuilder::number("credential_id")
                    .optional()
                    .description("Numeric ID of the project credential"),
            )
            .attribute(
                "timeout",
                AttributeBuilder::number("timeout")
                    .optional()
                    .default_value(Dynamic::Number(0.0))
                    .description(
                        "The amount of time (in seconds) to run before the task is canceled.",
                    ),
            )
            .attribute(
                "organization_id",
                AttributeBuilder::number("organization_id")
                    .required()
                    .description("Numeric ID of the project organization"),
            )
            .attribute(
                "scm_update_on_launch",
                AttributeBuilder::bool("scm_update_on_launch")
                    .optional()
                    .default_value(Dynamic::Bool(false))
                    .description(
                        "Update the project when a job is launched that uses the project.",
                    ),
            )
            .attribute(
                "scm_update_cache_timeout",
                AttributeBuilder::number("scm_update_cache_timeout")
                    .optional()
                    .default_value(Dynamic::Number(0.0))
                    .description(
                        "The number of seconds after the last project update ran that a new project update will be launched as a job dependency.",
                    ),
            )
            .attribute(
                "allow_override",
                AttributeBuilder::bool("allow_override")
                    .optional()
                    .default_value(Dynamic::Bool(false))
                    .description(
                        "Allow changing the SCM branch or revision in a job template that uses this project.",
                    ),
            )
            .attribute(
                "custom_virtualenv",
                AttributeBuilder::string("custom_virtualenv")
                    .optional()
                    .description(
                        "Local absolute file path containing a custom Python virtualenv to use",
                    ),
            )
            .build_resource(0)
    }
}

/// Declarative configuration to remote payload.
fn project_request(config: &Config) -> Result<ProjectRequest, Error> {
    let name = config
        .string("name")
        .ok_or_else(|| Error::InvalidConfiguration("name is required".to_string()))?;
    let scm_type = config
        .string("scm_type")
        .ok_or_else(|| Error::InvalidConfiguration("scm_type is required".to_string()))?;
    let organization = config
        .i64("organization_id")
        .ok_or_else(|| Error::InvalidConfiguration("organization_id is required".to_string()))?;

    Ok(ProjectRequest {
        name: name.to_string(),
        description: config.string_or("description", ""),
        local_path: config.string_or("local_path", ""),
        scm_type: scm_type.to_string(),
        scm_url: config.string_or("scm_url", ""),
        scm_branch: config.string_or("scm_branch", ""),
        scm_refspec: config.string_or("scm_refspec", ""),
        scm_clean: config.bool_or("scm_clean", false),
        scm_delete_on_update: config.bool_or("scm_delete_on_update", false),
        credential: config.i64("credential_id"),
        timeout: config.i64_or("timeout", 0),
        organization,
        scm_update_on_launch: config.bool_or("scm_update_on_launch", false),
        scm_update_cache_timeout: config.i64_or("scm_update_cache_timeout", 0),
        allow_override: config.bool_or("allow_override", false),
        custom_virtualenv: config.string("custom_virtualenv").map(str::to_string),
    })
}

/// Remote object to declarative state.
fn project_state(project: &Project) -> State {
    let mut state = State::new();
    state.set("id", Dynamic::String(project.id.to_string()));
    state.set("name", Dynamic::String(project.name.clone()));
    state.set("description", Dynamic::String(project.description.clone()));
    state.set("local_path", Dynamic::String(project.local_path.clone()));
    state.set("scm_type", Dynamic::String(project.scm_type.clone()));
    state.set("scm_url", Dynamic::String(project.scm_url.clone()));
    state.set("scm_branch", Dynamic::String(project.scm_branch.clone()));
    state.set("scm_refspec", Dynamic::String(project.scm_refspec.clone()));
    state.set("scm_clean", Dynamic::Bool(project.scm_clean));
    state.set(
        "scm_delete_on_update",
        Dynamic::Bool(project.scm_delete_on_update),
    );
    if let Some(credential) = project.credential {
        state.set("credential_id", Dynamic::Number(credential as f64));
    }
    state.set("timeout", Dynamic::Number(project.timeout as f64));
    state.set(
        "organization_id",
        Dynamic::Number(project.organization as f64),
    );
    state.set(
        "scm_update_on_launch",
        Dynamic::Bool(project.scm_update_on_launch),
    );
    state.set(
        "scm_update_cache_timeout",
        Dynamic::Number(project.scm_update_cache_timeout as f64),
    );
    state.set("allow_override", Dynamic::Bool(project.allow_override));
    if let Some(virtualenv) = &project.custom_virtualenv {
        state.set("custom_virtualenv", Dynamic::String(virtualenv.clone()));
    }
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
impl Resource for ProjectResource {
    fn schema(&self) -> ResourceSchema {
        Self::schema_static()
    }

    async fn create(&self, config: Config) -> Result<(State, Diagnostics), Error> {
        let diags = Diagnostics::new();
        let request = project_request(&config)?;

        let params = QueryParams::new()
            .add("name", &request.name)
            .add("organization", request.organization);
        let existing = self.client.list_projects(&params).await?;
        if !existing.results.is_empty() {
            return Err(Error::AlreadyExists(format!(
                "project with name {} already exists in organization {}",
                request.name, request.organization
            )));
        }

        let created = self.client.create_project(&request).await?;
        tracing::debug!("created project {} ({})", created.name, created.id);

        Ok((project_state(&created), diags))
    }

    async fn read(&self, state: State) -> Result<(Option<State>, Diagnostics), Error> {
        let diags = Diagnostics::new();
        let name = state
            .string("name")
            .ok_or_else(|| Error::InvalidState("name missing from state".to_string()))?
            .to_string();

        let list = self
            .client
            .list_projects(&QueryParams::new().add("name", &name))
            .await?;

        match list.results.first() {
            Some(project) => Ok((Some(project_state(project)), diags)),
            // A vanished project deliberately leaves the prior state alone;
            // only delete clears the identifier.
            None => Ok((Some(state), diags)),
        }
    }

    async fn update(&self, state: State, config: Config) -> Result<(State, Diagnostics), Error> {
        let diags = Diagnostics::new();
        let id = state_id(&state)?;
        let request = project_request(&config)?;

        let params = QueryParams::new()
            .add("id", id)
            .add("organization", request.organization);
        let existing = self.client.list_projects(&params).await?;
        if existing.results.is_empty() {
            return Err(Error::NotFound(format!(
                "project with name {} does not exist in organization {}",
                request.name, request.organization
            )));
        }

        let updated = self.client.update_project(id, &request).await?;
        Ok((project_state(&updated), diags))
    }

    async fn delete(&self, state: State) -> Result<Diagnostics, Error> {
        let diags = Diagnostics::new();
        let id = state_id(&state)?;
        let name = state
            .string("name")
            .ok_or_else(|| Error::InvalidState("name missing from state".to_string()))?;

        let params = QueryParams::new().add("name", name).add("id", id);
        let list = self.client.list_projects(&params).await?;
        let project = match list.results.first() {
            Some(project) => project,
            // Already gone remotely; report success so the host clears state.
            None => return Ok(diags),
        };

        if let Some(job_id) = project.update_job_id() {
            tracing::debug!("cancelling project update {} before delete", job_id);
            self.client.cancel_project_update(job_id).await?;
            self.client.wait_for_project_update(job_id, &self.wait).await?;
        }

        self.client.delete_project(id).await?;
        Ok(diags)
    }
}

#[async_trait]
impl ResourceWithImport for ProjectResource {
    async fn import(&self, id: &str) -> Result<(State, Diagnostics), Error> {
        let diags = Diagnostics::new();
        let id: i64 = id
            .parse()
            .map_err(|_| Error::InvalidState(format!("{} is not a numeric identifier", id)))?;

        let project = self.client.get_project(id).await?;
        Ok((project_state(&project), diags))
    }
}
