// Application state for HTTP handlers
use crate::application::migrator::MigratorHandle;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub migrator: Arc<MigratorHandle>,
    /// Target used when a migrate request does not name one
    pub default_target_version: i64,
}
