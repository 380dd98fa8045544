//! Provider seam driven by the hosting plugin framework
//!
//! The wire protocol (RPC transport, state encoding, plan logic) lives in
//! the host; this module defines the traits the host dispatches into and
//! the error taxonomy it receives back.

pub mod schema;
pub mod types;

use async_trait::async_trait;
use std::collections::HashMap;

use crate::api::ApiError;
pub use schema::{
    Attribute, AttributeBuilder, AttributeType, DataSourceSchema, ResourceSchema, SchemaBuilder,
};
pub use types::{Config, Diagnostic, Diagnostics, Dynamic, State};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("resource type not found: {0}")]
    ResourceNotFound(String),

    #[error("data source type not found: {0}")]
    DataSourceNotFound(String),

    #[error("provider not configured")]
    ProviderNotConfigured,

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Create was called against a name that already has a remote match in
    /// the same scope.
    #[error("{0}")]
    AlreadyExists(String),

    /// Update was called against an identifier with no remote match.
    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("{0}")]
    Custom(String),
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Custom(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Custom(s.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// A managed resource type: translates declarative configuration into
/// remote CRUD calls and reflects remote state back.
#[async_trait]
pub trait Resource: Send + Sync {
    fn schema(&self) -> ResourceSchema;

    /// MUST populate every schema attribute in the returned state,
    /// including the stringified remote identifier under "id".
    async fn create(&self, config: Config) -> Result<(State, Diagnostics)>;

    /// Returns None when the resource should be removed from state.
    async fn read(&self, state: State) -> Result<(Option<State>, Diagnostics)>;

    async fn update(&self, state: State, config: Config) -> Result<(State, Diagnostics)>;

    /// Success with a vanished remote counterpart clears local state.
    async fn delete(&self, state: State) -> Result<Diagnostics>;
}

/// Optional import support, driven by `terraform import`.
#[async_trait]
pub trait ResourceWithImport: Resource {
    async fn import(&self, id: &str) -> Result<(State, Diagnostics)>;
}

/// A read-only lookup against the remote service.
#[async_trait]
pub trait DataSource: Send + Sync {
    fn schema(&self) -> DataSourceSchema;

    async fn read(&self, config: Config) -> Result<(State, Diagnostics)>;
}

/// The registry the host drives: configuration plus dispatch from resource
/// type name to implementation.
#[async_trait]
pub trait Provider: Send + Sync {
    async fn configure(&mut self, config: Config) -> Diagnostics;

    fn create_resource(&self, name: &str) -> Result<Box<dyn Resource>>;

    fn create_data_source(&self, name: &str) -> Result<Box<dyn DataSource>>;

    fn resource_schemas(&self) -> HashMap<String, ResourceSchema>;

    fn data_source_schemas(&self) -> HashMap<String, DataSourceSchema>;
}
