//! Resource implementations

pub mod inventory;
pub mod job_template;
pub mod project;

pub use inventory::InventoryResource;
pub use job_template::JobTemplateResource;
pub use project::ProjectResource;
