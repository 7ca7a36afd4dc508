//! Error types for dashboard schema migration
//!
//! Every failure is returned to the caller and none are retried: migrations are
//! deterministic, so the same input fails the same way again.

/// Input schema predates the oldest supported version.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("dashboard schema version {input_version} is below the minimum supported version {min_version}")]
pub struct MinimumVersionError {
    pub input_version: i64,
    pub min_version: i64,
}

/// Main migration error type
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// Dashboard was null or not a JSON object
    #[error("invalid input: dashboard must be a JSON object")]
    Input,

    /// Schema too old to migrate
    #[error(transparent)]
    MinimumVersion(#[from] MinimumVersionError),

    /// A single version transform failed
    #[error("migration from schema version {from_version} to {to_version} failed at step {step}: {source}")]
    Step {
        from_version: i64,
        to_version: i64,
        step: String,
        #[source]
        source: anyhow::Error,
    },

    /// Registry did not advance the document to the requested version
    #[error("migration from schema version {from_version} ended at {actual}, expected {target}")]
    Postcondition {
        from_version: i64,
        target: i64,
        actual: i64,
    },

    /// Requested version is newer than the registry knows about
    #[error("target schema version {target} is above the latest supported version {latest}")]
    TargetVersion { target: i64, latest: i64 },

    /// Migrator readiness can no longer be signalled
    #[error("migrator is not initialized")]
    NotReady,
}

impl MigrationError {
    /// Permanent errors stem from the document itself and will never succeed
    /// on the same input.
    #[inline]
    #[must_use]
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            Self::Input | Self::MinimumVersion(_) | Self::Step { .. } | Self::TargetVersion { .. }
        )
    }

    /// Short label used for metrics and HTTP error bodies.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Input => "input_error",
            Self::MinimumVersion(_) => "minimum_version",
            Self::Step { .. } => "step_error",
            Self::Postcondition { .. } => "postcondition",
            Self::TargetVersion { .. } => "target_version",
            Self::NotReady => "not_ready",
        }
    }
}
