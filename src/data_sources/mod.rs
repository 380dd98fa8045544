//! Data source implementations

pub mod inventory;
pub mod inventory_group;
pub mod project;

pub use inventory::InventoryDataSource;
pub use inventory_group::InventoryGroupDataSource;
pub use project::ProjectDataSource;
