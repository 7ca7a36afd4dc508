// Registry of per-version schema migrations
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::providers::{DataSourceInfoProvider, PanelPluginInfoProvider};

/// Oldest schema version the migrator accepts.
pub const MIN_VERSION: i64 = 13;
/// Newest schema version known to the registry.
pub const LATEST_VERSION: i64 = 42;

/// Transform that moves a dashboard from `v - 1` to `v`, keyed by `v`.
pub type SchemaMigration = Arc<dyn Fn(&mut Map<String, Value>) -> anyhow::Result<()> + Send + Sync>;

/// Source of the version-keyed migration table.
pub trait SchemaVersionRegistry: Send + Sync {
    fn min_version(&self) -> i64 {
        MIN_VERSION
    }

    fn latest_version(&self) -> i64 {
        LATEST_VERSION
    }

    /// Builds the migration table. Called once per migrator.
    fn migrations(
        &self,
        datasources: Arc<dyn DataSourceInfoProvider>,
        panels: Arc<dyn PanelPluginInfoProvider>,
    ) -> BTreeMap<i64, SchemaMigration>;
}

type MigrationFactory =
    Box<dyn Fn(Arc<dyn DataSourceInfoProvider>, Arc<dyn PanelPluginInfoProvider>) -> SchemaMigration + Send + Sync>;

/// In-process registry assembled from explicit registrations.
pub struct StaticRegistry {
    min_version: i64,
    latest_version: i64,
    factories: BTreeMap<i64, MigrationFactory>,
}

impl StaticRegistry {
    pub fn new(min_version: i64, latest_version: i64) -> Self {
        Self {
            min_version,
            latest_version,
            factories: BTreeMap::new(),
        }
    }

    /// Registers a transform that needs no provider access.
    pub fn with_migration<F>(self, version: i64, migration: F) -> Self
    where
        F: Fn(&mut Map<String, Value>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let migration: SchemaMigration = Arc::new(migration);
        self.with_factory(version, move |_, _| migration.clone())
    }

    /// Registers a transform built from the providers at initialization time.
    pub fn with_factory<F>(mut self, version: i64, factory: F) -> Self
    where
        F: Fn(Arc<dyn DataSourceInfoProvider>, Arc<dyn PanelPluginInfoProvider>) -> SchemaMigration
            + Send
            + Sync
            + 'static,
    {
        self.factories.insert(version, Box::new(factory));
        self
    }
}

impl Default for StaticRegistry {
    fn default() -> Self {
        Self::new(MIN_VERSION, LATEST_VERSION)
    }
}

impl SchemaVersionRegistry for StaticRegistry {
    fn min_version(&self) -> i64 {
        self.min_version
    }

    fn latest_version(&self) -> i64 {
        self.latest_version
    }

    fn migrations(
        &self,
        datasources: Arc<dyn DataSourceInfoProvider>,
        panels: Arc<dyn PanelPluginInfoProvider>,
    ) -> BTreeMap<i64, SchemaMigration> {
        self.factories
            .iter()
            .map(|(version, factory)| (*version, factory(datasources.clone(), panels.clone())))
            .collect()
    }
}
