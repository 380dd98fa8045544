//! HTTP client for the Tower/AWX REST API (v2)

pub mod client;
pub mod common;
pub mod error;
pub mod groups;
pub mod inventories;
pub mod job_templates;
pub mod project_updates;
pub mod projects;

pub use client::Client;
pub use common::{AwxApiResource, ListResponse, QueryParams};
pub use error::ApiError;
pub use groups::Group;
pub use inventories::{Inventory, InventoryRequest};
pub use job_templates::{Credential, JobTemplate, JobTemplateRequest};
pub use project_updates::{ProjectUpdate, WaitConfig};
pub use projects::{Project, ProjectRequest};
