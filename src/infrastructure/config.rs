use serde::Deserialize;

use crate::application::providers::{DataSourceInfo, PanelPluginInfo};
use crate::application::schema_registry::{LATEST_VERSION, MIN_VERSION};

#[derive(Debug, Deserialize, Clone)]
pub struct MigratorConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub migration: MigrationSettings,
    #[serde(default)]
    pub datasources: Vec<DataSourceInfo>,
    #[serde(default)]
    pub panel_plugins: Vec<PanelPluginInfo>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct MigrationSettings {
    /// Version used when a migrate request names no target
    #[serde(default = "default_target_version")]
    pub target_version: i64,
    #[serde(default = "default_min_version")]
    pub min_version: i64,
}

impl Default for MigrationSettings {
    fn default() -> Self {
        Self {
            target_version: default_target_version(),
            min_version: default_min_version(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_target_version() -> i64 {
    LATEST_VERSION
}

fn default_min_version() -> i64 {
    MIN_VERSION
}

/// Loads `config/migrator.*` (optional) overlaid with `MIGRATOR__*` environment
/// variables, e.g. `MIGRATOR__SERVER__BIND=127.0.0.1:9000`.
pub fn load_migrator_config() -> anyhow::Result<MigratorConfig> {
    load_from("config/migrator")
}

pub fn load_from(path: &str) -> anyhow::Result<MigratorConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(path).required(false))
        .add_source(
            config::Environment::with_prefix("MIGRATOR")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
