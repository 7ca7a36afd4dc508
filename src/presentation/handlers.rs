// HTTP request handlers
use crate::application::error::MigrationError;
use crate::domain::frontend_defaults::apply_frontend_defaults;
use crate::domain::save_model::cleanup_dashboard_for_save;
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;

#[derive(Deserialize)]
pub struct MigrateQuery {
    pub target: Option<i64>,
}

/// Health check endpoint, unavailable until the migrator is initialized
pub async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, &'static str) {
    if state.migrator.is_ready() {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "initializing")
    }
}

fn error_status(err: &MigrationError) -> StatusCode {
    match err {
        MigrationError::Input
        | MigrationError::MinimumVersion(_)
        | MigrationError::TargetVersion { .. } => StatusCode::BAD_REQUEST,
        MigrationError::Step { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        MigrationError::Postcondition { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        MigrationError::NotReady => StatusCode::SERVICE_UNAVAILABLE,
    }
}

async fn respond(status: StatusCode, body: &Value, compress: bool) -> Response {
    match json_response(status, body, compress).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

async fn not_an_object(compress: bool) -> Response {
    let body = json!({"error": MigrationError::Input.to_string(), "kind": MigrationError::Input.kind()});
    respond(StatusCode::BAD_REQUEST, &body, compress).await
}

/// Migrate a dashboard to `?target=` (or the configured default version)
pub async fn migrate_dashboard(
    Query(query): Query<MigrateQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(mut dashboard): Json<Value>,
) -> Response {
    let compress = accepts_brotli(&headers);
    let target = query.target.unwrap_or(state.default_target_version);

    match state.migrator.migrate(&mut dashboard, target).await {
        Ok(()) => respond(StatusCode::OK, &dashboard, compress).await,
        Err(err) => {
            let body = json!({"error": err.to_string(), "kind": err.kind()});
            respond(error_status(&err), &body, compress).await
        }
    }
}

async fn transform(
    headers: &HeaderMap,
    dashboard: Value,
    apply: fn(&mut Map<String, Value>),
) -> Response {
    let compress = accepts_brotli(headers);
    let Value::Object(mut dashboard) = dashboard else {
        return not_an_object(compress).await;
    };
    apply(&mut dashboard);
    respond(StatusCode::OK, &Value::Object(dashboard), compress).await
}

/// Apply load-time frontend defaults
pub async fn normalize_dashboard(headers: HeaderMap, Json(dashboard): Json<Value>) -> Response {
    transform(&headers, dashboard, apply_frontend_defaults).await
}

/// Strip runtime and default-valued fields for persistence
pub async fn save_model(headers: HeaderMap, Json(dashboard): Json<Value>) -> Response {
    transform(&headers, dashboard, cleanup_dashboard_for_save).await
}
