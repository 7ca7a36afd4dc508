// Application layer - Migration driver and its collaborators
pub mod error;
pub mod migrator;
pub mod providers;
pub mod schema_registry;
