// Domain layer - Dashboard normalization rules
pub mod dashboard;
pub mod frontend_defaults;
pub mod panel;
pub mod save_model;
pub mod variable;
