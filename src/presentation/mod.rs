// Presentation layer - HTTP surface over the migration engine
pub mod app_state;
pub mod handlers;
