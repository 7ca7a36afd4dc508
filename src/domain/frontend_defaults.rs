// Dashboard-level load defaults matching the legacy dashboard model
use serde_json::{json, Map, Value};

use super::dashboard::{default_if_absent, ensure_list_holder, list_mut, object_entry};
use super::panel::{apply_defaults_to_all_panels, ensure_unique_panel_ids, sort_panels_by_grid_pos};
use super::variable::{clean_variable, strip_null_current_value};

const META_PERMISSIONS: [&str; 5] = ["canShare", "canSave", "canStar", "canEdit", "canDelete"];

/// Dashboard fields defaulted when absent or null.
///
/// `liveNow`, `refresh`, `snapshot` and `scopeMeta` are deliberately missing:
/// they pass through untouched.
pub fn dashboard_defaults() -> [(&'static str, Value); 13] {
    [
        ("title", json!("No Title")),
        ("tags", json!([])),
        ("timezone", json!("")),
        ("weekStart", json!("")),
        ("editable", json!(true)),
        ("graphTooltip", json!(0)),
        ("time", json!({"from": "now-6h", "to": "now"})),
        ("timepicker", json!({})),
        ("schemaVersion", json!(0)),
        ("fiscalYearStartMonth", json!(0)),
        ("version", json!(0)),
        ("links", json!([])),
        ("gnetId", Value::Null),
    ]
}

/// The annotation every dashboard carries for native annotations and alerts.
pub fn built_in_annotation() -> Value {
    json!({
        "datasource": {"uid": "-- Grafana --", "type": "grafana"},
        "name": "Annotations & Alerts",
        "type": "dashboard",
        "iconColor": "rgba(0, 211, 255, 1)",
        "enable": true,
        "hide": true,
        "builtIn": 1
    })
}

/// Brings a stored dashboard into the shape the legacy dashboard model held
/// after loading it.
pub fn apply_frontend_defaults(dashboard: &mut Map<String, Value>) {
    for (key, default) in dashboard_defaults() {
        default_if_absent(dashboard, key, || default);
    }

    ensure_list_holder(dashboard, "templating");
    ensure_list_holder(dashboard, "annotations");

    sort_panels_by_grid_pos(dashboard);
    apply_defaults_to_all_panels(dashboard);
    // after defaulting, so originally valid ids are kept wherever possible
    ensure_unique_panel_ids(dashboard);

    add_built_in_annotation(dashboard);
    init_meta(dashboard);
    clean_variables(dashboard);
}

/// Prepends the built-in annotation unless an entry with `builtIn == 1` exists.
pub fn add_built_in_annotation(dashboard: &mut Map<String, Value>) {
    ensure_list_holder(dashboard, "annotations");
    let Some(annotations) = list_mut(dashboard, "annotations") else {
        return;
    };
    let has_built_in = annotations
        .iter()
        .any(|a| a.get("builtIn").and_then(Value::as_f64) == Some(1.0));
    if !has_built_in {
        annotations.insert(0, built_in_annotation());
    }
}

fn is_true(obj: &Map<String, Value>, key: &str) -> bool {
    obj.get(key).and_then(Value::as_bool) == Some(true)
}

/// Derives the `meta` permission block.
///
/// `showSettings` copies `canEdit` before a non-editable dashboard clears the
/// edit permissions, so it stays `true` on read-only dashboards.
pub fn init_meta(dashboard: &mut Map<String, Value>) {
    let not_editable = dashboard.get("editable").and_then(Value::as_bool) == Some(false);
    let Some(meta) = object_entry(dashboard, "meta") else {
        return;
    };

    for key in META_PERMISSIONS {
        default_if_absent(meta, key, || Value::Bool(true));
    }

    let can_edit = meta.get("canEdit").cloned().unwrap_or(Value::Bool(true));
    meta.insert("showSettings".to_string(), can_edit);
    let can_make_editable = is_true(meta, "canSave") && not_editable;
    meta.insert("canMakeEditable".to_string(), Value::Bool(can_make_editable));
    meta.insert("hasUnsavedFolderChange".to_string(), Value::Bool(false));

    if not_editable {
        for key in ["canEdit", "canSave", "canDelete"] {
            meta.insert(key.to_string(), Value::Bool(false));
        }
    }
}

/// Drops null current values, then applies the per-type variable rules.
pub fn clean_variables(dashboard: &mut Map<String, Value>) {
    let Some(variables) = list_mut(dashboard, "templating") else {
        return;
    };
    for variable in variables.iter_mut().filter_map(Value::as_object_mut) {
        strip_null_current_value(variable);
        clean_variable(variable);
    }
}
