// Migrator - walks a dashboard through the registered schema versions
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{watch, OnceCell};

use crate::application::error::{MigrationError, MinimumVersionError};
use crate::application::providers::{DataSourceInfoProvider, PanelPluginInfoProvider};
use crate::application::schema_registry::{SchemaMigration, SchemaVersionRegistry};
use crate::domain::dashboard::{schema_version, set_schema_version};

/// Immutable version-to-transform table built from a registry.
pub struct Migrator {
    min_version: i64,
    latest_version: i64,
    migrations: BTreeMap<i64, SchemaMigration>,
}

impl Migrator {
    pub fn new(
        registry: &dyn SchemaVersionRegistry,
        datasources: Arc<dyn DataSourceInfoProvider>,
        panels: Arc<dyn PanelPluginInfoProvider>,
    ) -> Self {
        let migrations = registry.migrations(datasources, panels);
        tracing::info!(
            min_version = registry.min_version(),
            latest_version = registry.latest_version(),
            registered = migrations.len(),
            "schema migrations initialized"
        );
        Self {
            min_version: registry.min_version(),
            latest_version: registry.latest_version(),
            migrations,
        }
    }

    /// Migrates `dashboard` in place up to `target_version`.
    ///
    /// A failing step leaves the document as that step left it; callers that
    /// need atomicity should migrate a copy.
    pub fn migrate(&self, dashboard: &mut Value, target_version: i64) -> Result<(), MigrationError> {
        let source_version = dashboard.as_object().map(schema_version);
        let result = self.run(dashboard, target_version);
        record_outcome(source_version, target_version, &result);
        result
    }

    fn run(&self, dashboard: &mut Value, target_version: i64) -> Result<(), MigrationError> {
        let Some(dashboard) = dashboard.as_object_mut() else {
            return Err(MigrationError::Input);
        };

        let input_version = schema_version(dashboard);
        set_schema_version(dashboard, input_version);

        if input_version < self.min_version {
            return Err(MinimumVersionError {
                input_version,
                min_version: self.min_version,
            }
            .into());
        }

        if target_version > self.latest_version {
            return Err(MigrationError::TargetVersion {
                target: target_version,
                latest: self.latest_version,
            });
        }

        // a saturated input version has no later step to take
        if let Some(first_step) = input_version.checked_add(1) {
            for version in first_step..=target_version {
                if let Some(migration) = self.migrations.get(&version) {
                    tracing::debug!(from = version - 1, to = version, "applying schema migration");
                    migration(&mut *dashboard).map_err(|source| MigrationError::Step {
                        from_version: input_version,
                        to_version: version,
                        step: format!("V{version}"),
                        source,
                    })?;
                }
                set_schema_version(dashboard, version);
            }
        }

        let actual = schema_version(dashboard);
        if actual != target_version {
            return Err(MigrationError::Postcondition {
                from_version: input_version,
                target: target_version,
                actual,
            });
        }

        Ok(())
    }
}

fn record_outcome(source_version: Option<i64>, target_version: i64, result: &Result<(), MigrationError>) {
    let source = source_version.map(|v| v.to_string()).unwrap_or_else(|| "none".to_string());
    let outcome = match result {
        Ok(()) => "success",
        Err(err) => {
            tracing::warn!(
                source_version = %source,
                target_version,
                permanent = err.is_permanent(),
                error = %err,
                "dashboard migration failed"
            );
            err.kind()
        }
    };
    metrics::counter!(
        "dashboard_migrations_total",
        "source_schema_version" => source,
        "target_schema_version" => target_version.to_string(),
        "result" => outcome
    )
    .increment(1);
}

/// Shared migrator with a one-time initialization barrier.
///
/// The first `initialize` call builds the table; later calls are no-ops and
/// concurrent callers wait for the first. `migrate` waits until the table is
/// ready before running.
pub struct MigratorHandle {
    registry: Arc<dyn SchemaVersionRegistry>,
    cell: OnceCell<Arc<Migrator>>,
    ready: watch::Sender<Option<Arc<Migrator>>>,
}

impl MigratorHandle {
    pub fn new(registry: Arc<dyn SchemaVersionRegistry>) -> Self {
        let (ready, _) = watch::channel(None);
        Self {
            registry,
            cell: OnceCell::new(),
            ready,
        }
    }

    pub async fn initialize(
        &self,
        datasources: Arc<dyn DataSourceInfoProvider>,
        panels: Arc<dyn PanelPluginInfoProvider>,
    ) -> Arc<Migrator> {
        self.cell
            .get_or_init(move || async move {
                let migrator = Arc::new(Migrator::new(self.registry.as_ref(), datasources, panels));
                self.ready.send_replace(Some(migrator.clone()));
                migrator
            })
            .await
            .clone()
    }

    pub fn is_ready(&self) -> bool {
        self.cell.initialized()
    }

    /// Resolves once `initialize` has completed.
    pub async fn ready(&self) -> Result<Arc<Migrator>, MigrationError> {
        let mut rx = self.ready.subscribe();
        let migrator = rx
            .wait_for(Option::is_some)
            .await
            .map_err(|_| MigrationError::NotReady)?;
        migrator.clone().ok_or(MigrationError::NotReady)
    }

    pub async fn migrate(&self, dashboard: &mut Value, target_version: i64) -> Result<(), MigrationError> {
        let migrator = self.ready().await?;
        migrator.migrate(dashboard, target_version)
    }
}
