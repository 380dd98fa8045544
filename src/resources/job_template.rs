use crate::api::{Client, JobTemplate, JobTemplateRequest, QueryParams, WaitConfig};
use crate::plugin::{
    AttributeBuilder, AttributeType, Config, Diagnostics, Dynamic, Error, Resource,
    ResourceSchema, ResourceWithImport, SchemaBuilder, State,
};
use async_trait::async_trait;

pub struct JobTemplateResource {
    client: Client,
    wait: WaitConfig,
}

impl JobTemplateResource {
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
                    .description("Name of this job template."),
            )
            .attribute(
                "description",
                AttributeBuilder::string("description")
                    .optional()
                    .default_value(Dynamic::String(String::new()))
                    .description("Optional description of this job template."),
            )
            .attribute(
                "job_type",
                AttributeBuilder::string("job_type")
                    .required()
                    .description("One of: run, check, scan"),
            )
            .attribute(
                "inventory_id",
                AttributeBuilder::string("inventory_id")
                    .optional()
                    .conflicts_with("ask_inventory_on_launch"),
            )
            .attribute("project_id", AttributeBuilder::string("project_id").required())
            .attribute(
                "playbook",
                AttributeBuilder::string("playbook")
                    .optional()
                    .default_value(Dynamic::String(String::new())),
            )
            .attribute(
                "credential_id",
                AttributeBuilder::string("credential_id").optional(),
            )
            .attribute(
                "scm_branch",
                AttributeBuilder::string("scm_branch")
                    .optional()
                    .default_value(Dynamic::String(String::new()))
                    .description(
                        "Branch to use in job run. Project default used if blank. Only allowed if project allow_override field is set to true.",
                    ),
            )
            .attribute(
                "forks",
                AttributeBuilder::number("forks")
                    .optional()
                    .default_value(Dynamic::Number(0.0)),
            )
            .attribute(
                "limit",
                AttributeBuilder::string("limit")
                    .optional()
                    .default_value(Dynamic::String(String::new())),
            )
            .attribute(
                "verbosity",
                AttributeBuilder::number("verbosity")
                    .optional()
                    .default_value(Dynamic::Number(0.0))
                    .description(
                        "In range 0-5 (Normal, Verbose, More Verbose, Debug, Connection Debug, WinRM Debug)",
                    ),
            )
            .attribute(
                "extra_vars",
                AttributeBuilder::string("extra_vars")
                    .optional()
                    .default_value(Dynamic::String(String::new())),
            )
            .attribute(
                "job_tags",
                AttributeBuilder::string("job_tags")
                    .optional()
                    .default_value(Dynamic::String(String::new())),
            )
            .attribute(
                "force_handlers",
                AttributeBuilder::bool("force_handlers")
                    .optional()
                    .default_value(Dynamic::Bool(false)),
            )
            .attribute(
                "skip_tags",
                AttributeBuilder::string("skip_tags")
                    .optional()
                    .default_value(Dynamic::String(String::new())),
            )
            .attribute(
                "start_at_task",
                AttributeBuilder::string("start_at_task")
                    .optional()
                    .default_value(Dynamic::String(String::new())),
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
                "use_fact_cache",
                AttributeBuilder::bool("use_fact_cache")
                    .optional()
                    .default_value(Dynamic::Bool(false))
                    .description(
                        "If enabled, Tower will act as an Ansible Fact Cache Plugin; persisting facts at the end of a playbook run to the database and caching facts for use by Ansible.",
                    ),
            )
            .attribute(
                "host_config_key",
                AttributeBuilder::string("host_config_key")
                    .optional()
                    .default_value(Dynamic::String(String::new())),
            )
            .attribute(
                "ask_scm_branch_on_launch",
                AttributeBuilder::bool("ask_scm_branch_on_launch")
                    .optional()
                    .default_value(Dynamic::Bool(false)),
            )
            .attribute(
                "ask_diff_mode_on_launch",
                AttributeBuilder::bool("ask_diff_mode_on_launch")
                    .optional()
                    .default_value(Dynamic::Bool(false)),
            )
            .attribute(
                "ask_variables_on_launch",
                AttributeBuilder::bool("ask_variables_on_launch")
                    .optional()
                    .default_value(Dynamic::Bool(false)),
            )
            .attribute(
                "ask_limit_on_launch",
                AttributeBuilder::bool("ask_limit_on_launch")
                    .optional()
                    .default_value(Dynamic::Bool(false)),
            )
            .attribute(
                "ask_tags_on_launch",
                AttributeBuilder::bool("ask_tags_on_launch")
                    .optional()
                    .default_value(Dynamic::Bool(false)),
            )
            .attribute(
                "ask_skip_tags_on_launch",
                AttributeBuilder::bool("ask_skip_tags_on_launch")
                    .optional()
                    .default_value(Dynamic::Bool(false)),
            )
            .attribute(
                "ask_job_type_on_launch",
                AttributeBuilder::bool("ask_job_type_on_launch")
                    .optional()
                    .default_value(Dynamic::Bool(false)),
            )
            .attribute(
                "ask_verbosity_on_launch",
                AttributeBuilder::bool("ask_verbosity_on_launch")
                    .optional()
                    .default_value(Dynamic::Bool(false)),
            )
            .attribute(
                "ask_inventory_on_launch",
                AttributeBuilder::bool("ask_inventory_on_launch")
                    .optional()
                    .default_value(Dynamic::Bool(false))
                    .conflicts_with("inventory_id"),
            )
            .attribute(
                "ask_credential_on_launch",
                AttributeBuilder::bool("ask_credential_on_launch")
                    .optional()
                    .default_value(Dynamic::Bool(false)),
            )
            .attribute(
                "survey_enabled",
                AttributeBuilder::bool("survey_enabled")
                    .optional()
                    .default_value(Dynamic::Bool(false)),
            )
            .attribute(
                "become_enabled",
                AttributeBuilder::bool("become_enabled")
                    .optional()
                    .default_value(Dynamic::Bool(false)),
            )
            .attribute(
                "diff_mode",
                AttributeBuilder::bool("diff_mode")
                    .optional()
                    .default_value(Dynamic::Bool(false))
                    .description(
                        "If enabled, textual changes made to any templated files on the host are shown in the standard output.",
                    ),
            )
            .attribute(
                "allow_simultaneous",
                AttributeBuilder::bool("allow_simultaneous")
                    .optional()
                    .default_value(Dynamic::Bool(false)),
            )
            .attribute(
                "custom_virtualenv",
                AttributeBuilder::string("custom_virtualenv")
                    .optional()
                    .description(
                        "Local absolute file path containing a custom Python virtualenv to use.",
                    ),
            )
            .attribute(
                "job_slice_count",
                AttributeBuilder::number("job_slice_count")
                    .optional()
                    .default_value(Dynamic::Number(1.0))
                    .description(
                        "The number of jobs to slice into at runtime. Will cause the Job Template to launch a workflow if value is greater than 1.",
                    ),
            )
            .attribute(
                "webhook_service",
                AttributeBuilder::string("webhook_service")
                    .optional()
                    .default_value(Dynamic::String(String::new()))
                    .description("Service that webhook requests will be accepted from (github or gitlab)"),
            )
            .attribute(
                "webhook_credential_id",
                AttributeBuilder::string("webhook_credential_id")
                    .optional()
                    .sensitive()
                    .description(
                        "Personal Access Token for posting back the status to the service API.",
                    ),
            )
            .attribute(
                "job_id",
                AttributeBuilder::number("job_id")
                    .optional()
                    .computed()
                    .default_value(Dynamic::Number(0.0)),
            )
            .attribute(
                "extra_credential_ids",
                AttributeBuilder::list("extra_credential_ids", AttributeType::Number).optional(),
            )
            .attribute(
                "vault_credential_id",
                AttributeBuilder::string("vault_credential_id").optional(),
            )
            .build_resource(0)
    }

    async fn wait_for_parent_project(&self, project_id: i64) -> Result<(), Error> {
        let params = QueryParams::new().add("id", project_id);
        let projects = self.client.list_projects(&params).await?;
        let project = match projects.results.first() {
            Some(project) => project,
            None => return Ok(()),
        };

        if let Some(job_id) = project.update_job_id() {
            tracing::debug!(
                "waiting for update job {} of project {} before touching templates",
                job_id,
                project_id
            );
            self.client.wait_for_project_update(job_id, &self.wait).await?;
        }
        Ok(())
    }

    async fn associate_extra_credentials(
        &self,
        template_id: i64,
        credential_ids: &[i64],
    ) -> Result<(), Error> {
        // One call per credential; a failure aborts the loop and earlier
        // associations stay in place.
        for credential_id in credential_ids {
            self.client
                .associate_credential(template_id, *credential_id)
                .await?;
        }
        Ok(())
    }
}

/// Optional numeric reference held as a string attribute; unparseable input
/// maps to an unset reference.
fn id_ref(config: &Config, key: &str) -> Option<i64> {
    config.string(key).and_then(|s| s.parse().ok())
}

fn extra_credential_ids(config: &Config) -> Vec<i64> {
    config
        .list("extra_credential_ids")
        .map(|values| values.iter().filter_map(Dynamic::as_i64).collect())
        .unwrap_or_default()
}

/// Declarative configuration to remote payload.
fn job_template_request(config: &Config) -> Result<JobTemplateRequest, Error> {
    let name = config
        .string("name")
        .ok_or_else(|| Error::InvalidConfiguration("name is required".to_string()))?;
    let job_type = config
        .string("job_type")
        .ok_or_else(|| Error::InvalidConfiguration("job_type is required".to_string()))?;

    let inventory = id_ref(config, "inventory_id");
    let ask_inventory_on_launch = config.bool_or("ask_inventory_on_launch", false);
    if inventory.is_some() && ask_inventory_on_launch {
        return Err(Error::InvalidConfiguration(
            "inventory_id conflicts with ask_inventory_on_launch".to_string(),
        ));
    }

    Ok(JobTemplateRequest {
        name: name.to_string(),
        description: config.string_or("description", ""),
        job_type: job_type.to_string(),
        inventory,
        project: id_ref(config, "project_id"),
        playbook: config.string_or("playbook", ""),
        credential: id_ref(config, "credential_id"),
        scm_branch: config.string_or("scm_branch", ""),
        forks: config.i64_or("forks", 0),
        limit: config.string_or("limit", ""),
        verbosity: config.i64_or("verbosity", 0),
        extra_vars: config.string_or("extra_vars", ""),
        job_tags: config.string_or("job_tags", ""),
        force_handlers: config.bool_or("force_handlers", false),
        skip_tags: config.string_or("skip_tags", ""),
        start_at_task: config.string_or("start_at_task", ""),
        timeout: config.i64_or("timeout", 0),
        use_fact_cache: config.bool_or("use_fact_cache", false),
        host_config_key: config.string_or("host_config_key", ""),
        ask_scm_branch_on_launch: config.bool_or("ask_scm_branch_on_launch", false),
        ask_diff_mode_on_launch: config.bool_or("ask_diff_mode_on_launch", false),
        ask_variables_on_launch: config.bool_or("ask_variables_on_launch", false),
        ask_limit_on_launch: config.bool_or("ask_limit_on_launch", false),
        ask_tags_on_launch: config.bool_or("ask_tags_on_launch", false),
        ask_skip_tags_on_launch: config.bool_or("ask_skip_tags_on_launch", false),
        ask_job_type_on_launch: config.bool_or("ask_job_type_on_launch", false),
        ask_verbosity_on_launch: config.bool_or("ask_verbosity_on_launch", false),
        ask_inventory_on_launch,
        ask_credential_on_launch: config.bool_or("ask_credential_on_launch", false),
        survey_enabled: config.bool_or("survey_enabled", false),
        become_enabled: config.bool_or("become_enabled", false),
        diff_mode: config.bool_or("diff_mode", false),
        allow_simultaneous: config.bool_or("allow_simultaneous", false),
        custom_virtualenv: config.string("custom_virtualenv").map(str::to_string),
        job_slice_count: config.i64_or("job_slice_count", 1),
        webhook_service: config.string_or("webhook_service", ""),
        webhook_credential: id_ref(config, "webhook_credential_id"),
        vault_credential: id_ref(config, "vault_credential_id"),
    })
}

fn project_id(config: &Config) -> Result<i64, Error> {
    id_ref(config, "project_id")
        .ok_or_else(|| Error::InvalidConfiguration("project_id is required".to_string()))
}

/// Remote object to declarative state.
fn job_template_state(template: &JobTemplate) -> State {
    let mut state = State::new();
    state.set("id", Dynamic::String(template.id.to_string()));
    state.set("job_id", Dynamic::Number(template.id as f64));
    state.set("name", Dynamic::String(template.name.clone()));
    state.set("description", Dynamic::String(template.description.clone()));
    state.set("job_type", Dynamic::String(template.job_type.clone()));
    if let Some(inventory) = template.inventory {
        state.set("inventory_id", Dynamic::String(inventory.to_string()));
    }
    if let Some(project) = template.project {
        state.set("project_id", Dynamic::String(project.to_string()));
    }
    state.set("playbook", Dynamic::String(template.playbook.clone()));
    if let Some(credential) = template.credential {
        state.set("credential_id", Dynamic::String(credential.to_string()));
    }
    state.set("scm_branch", Dynamic::String(template.scm_branch.clone()));
    state.set("forks", Dynamic::Number(template.forks as f64));
    state.set("limit", Dynamic::String(template.limit.clone()));
    state.set("verbosity", Dynamic::Number(template.verbosity as f64));
    state.set("extra_vars", Dynamic::String(template.extra_vars.clone()));
    state.set("job_tags", Dynamic::String(template.job_tags.clone()));
    state.set("force_handlers", Dynamic::Bool(template.force_handlers));
    state.set("skip_tags", Dynamic::String(template.skip_tags.clone()));
    state.set(
        "start_at_task",
        Dynamic::String(template.start_at_task.clone()),
    );
    state.set("timeout", Dynamic::Number(template.timeout as f64));
    state.set("use_fact_cache", Dynamic::Bool(template.use_fact_cache));
    state.set(
        "host_config_key",
        Dynamic::String(template.host_config_key.clone()),
    );
    state.set(
        "ask_scm_branch_on_launch",
        Dynamic::Bool(template.ask_scm_branch_on_launch),
    );
    state.set(
        "ask_diff_mode_on_launch",
        Dynamic::Bool(template.ask_diff_mode_on_launch),
    );
    state.set(
        "ask_variables_on_launch",
        Dynamic::Bool(template.ask_variables_on_launch),
    );
    state.set(
        "ask_limit_on_launch",
        Dynamic::Bool(template.ask_limit_on_launch),
    );
    state.set(
        "ask_tags_on_launch",
        Dynamic::Bool(template.ask_tags_on_launch),
    );
    state.set(
        "ask_skip_tags_on_launch",
        Dynamic::Bool(template.ask_skip_tags_on_launch),
    );
    state.set(
        "ask_job_type_on_launch",
        Dynamic::Bool(template.ask_job_type_on_launch),
    );
    state.set(
        "ask_verbosity_on_launch",
        Dynamic::Bool(template.ask_verbosity_on_launch),
    );
    state.set(
        "ask_inventory_on_launch",
        Dynamic::Bool(template.ask_inventory_on_launch),
    );
    state.set(
        "ask_credential_on_launch",
        Dynamic::Bool(template.ask_credential_on_launch),
    );
    state.set("survey_enabled", Dynamic::Bool(template.survey_enabled));
    state.set("become_enabled", Dynamic::Bool(template.become_enabled));
    state.set("diff_mode", Dynamic::Bool(template.diff_mode));
    state.set(
        "allow_simultaneous",
        Dynamic::Bool(template.allow_simultaneous),
    );
    if let Some(virtualenv) = &template.custom_virtualenv {
        state.set("custom_virtualenv", Dynamic::String(virtualenv.clone()));
    }
    state.set(
        "job_slice_count",
        Dynamic::Number(template.job_slice_count as f64),
    );
    state.set(
        "webhook_service",
        Dynamic::String(template.webhook_service.clone()),
    );
    if let Some(credential) = template.webhook_credential {
        state.set(
            "webhook_credential_id",
            Dynamic::String(credential.to_string()),
        );
    }
    if let Some(credential) = template.vault_credential {
        state.set(
            "vault_credential_id",
            Dynamic::String(credential.to_string()),
        );
    }
    state.set(
        "extra_credential_ids",
        Dynamic::List(
            template
                .extra_credential_ids()
                .into_iter()
                .map(|id| Dynamic::Number(id as f64))
                .collect(),
        ),
    );
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
impl Resource for JobTemplateResource {
    fn schema(&self) -> ResourceSchema {
        Self::schema_static()
    }

    async fn create(&self, config: Config) -> Result<(State, Diagnostics), Error> {
        let diags = Diagnostics::new();
        let request = job_template_request(&config)?;
        let project = project_id(&config)?;

        let params = QueryParams::new()
            .add("name", &request.name)
            .add("project", project);
        let existing = self.client.list_job_templates(&params).await?;
        if !existing.results.is_empty() {
            return Err(Error::AlreadyExists(format!(
                "job template with name {} already exists",
                request.name
            )));
        }

        // Never create a template against a project that is mid-sync.
        self.wait_for_parent_project(project).await?;

        let created = self.client.create_job_template(&request).await?;
        tracing::debug!("created job template {} ({})", created.name, created.id);

        let credentials = extra_credential_ids(&config);
        self.associate_extra_credentials(created.id, &credentials)
            .await?;

        let mut state = job_template_state(&created);
        // The creation response cannot know about associations made after
        // it; the configured list is authoritative here.
        state.set(
            "extra_credential_ids",
            Dynamic::List(
                credentials
                    .into_iter()
                    .map(|id| Dynamic::Number(id as f64))
                    .collect(),
            ),
        );

        Ok((state, diags))
    }

    async fn read(&self, state: State) -> Result<(Option<State>, Diagnostics), Error> {
        let diags = Diagnostics::new();
        let job_id = state.i64_or("job_id", 0);

        let list = self
            .client
            .list_job_templates(&QueryParams::new().add("id", job_id))
            .await?;

        match list.results.first() {
            Some(template) => Ok((Some(job_template_state(template)), diags)),
            // A vanished template deliberately leaves the prior state alone;
            // only delete clears the identifier.
            None => Ok((Some(state), diags)),
        }
    }

    async fn update(&self, state: State, config: Config) -> Result<(State, Diagnostics), Error> {
        let diags = Diagnostics::new();
        let id = state_id(&state)?;
        let request = job_template_request(&config)?;
        let project = project_id(&config)?;

        let params = QueryParams::new().add("id", id).add("project", project);
        let existing = self.client.list_job_templates(&params).await?;
        if existing.results.is_empty() {
            return Err(Error::NotFound(format!(
                "job template with name {} does not exist",
                request.name
            )));
        }

        let updated = self.client.update_job_template(id, &request).await?;

        let credentials = extra_credential_ids(&config);
        self.associate_extra_credentials(updated.id, &credentials)
            .await?;

        let mut state = job_template_state(&updated);
        state.set(
            "extra_credential_ids",
            Dynamic::List(
                credentials
                    .into_iter()
                    .map(|id| Dynamic::Number(id as f64))
                    .collect(),
            ),
        );

        Ok((state, diags))
    }

    async fn delete(&self, state: State) -> Result<Diagnostics, Error> {
        let diags = Diagnostics::new();
        let id = state_id(&state)?;

        let mut params = QueryParams::new().add("id", id);
        if let Some(project) = state.string("project_id") {
            params = params.add("project", project);
        }
        let list = self.client.list_job_templates(&params).await?;
        if list.results.is_empty() {
            // Already gone remotely; report success so the host clears state.
            return Ok(diags);
        }

        self.client.delete_job_template(id).await?;
        Ok(diags)
    }
}

#[async_trait]
impl ResourceWithImport for JobTemplateResource {
    async fn import(&self, id: &str) -> Result<(State, Diagnostics), Error> {
        let diags = Diagnostics::new();
        let id: i64 = id
            .parse()
            .map_err(|_| Error::InvalidState(format!("{} is not a numeric identifier", id)))?;

        let template = self.client.get_job_template(id).await?;
        Ok((job_template_state(&template), diags))
    }
}
