// Save-model cleanup - strips runtime and default-valued fields before persisting
use serde_json::{Map, Value};

use super::dashboard::{for_each_panel_mut, list_mut};
use super::panel::panel_defaults;
use super::variable::clean_variable;

/// Dashboard keys that only exist on the in-memory model.
pub const TRANSIENT_DASHBOARD_KEYS: &[&str] = &[
    "events",
    "meta",
    "originalTime",
    "originalTemplating",
    "originalLibraryPanels",
    "panelInEdit",
    "panelInView",
    "getVariablesFromState",
    "formatDate",
    "appEventsSubscription",
    "panelsAffectedByVariableChange",
    "lastRefresh",
    "timeRangeUpdatedDuringEditOrView",
    "originalDashboard",
];

/// Panel keys that only exist on the in-memory panel model.
pub const TRANSIENT_PANEL_KEYS: &[&str] = &[
    "events",
    "isViewing",
    "isEditing",
    "isInView",
    "hasRefreshed",
    "cachedPluginOptions",
    "plugin",
    "queryRunner",
    "replaceVariables",
    "configRev",
    "hasSavedPanelEditChange",
    "getDisplayTitle",
    "dataSupport",
    "key",
    "isNew",
    "refreshWhenInView",
];

/// Produces the persisted form of a dashboard in place.
///
/// `panels` and `templating` are cleaned structurally rather than dropped:
/// every panel (top-level and nested) goes through [`cleanup_panel_for_save`]
/// and every template variable through [`clean_variable`].
pub fn cleanup_dashboard_for_save(dashboard: &mut Map<String, Value>) {
    for key in TRANSIENT_DASHBOARD_KEYS {
        dashboard.remove(*key);
    }

    for_each_panel_mut(dashboard, cleanup_panel_for_save);

    if let Some(variables) = list_mut(dashboard, "templating") {
        for variable in variables.iter_mut().filter_map(Value::as_object_mut) {
            clean_variable(variable);
        }
    }
}

/// Removes runtime keys, then every field still equal to its load-time default.
///
/// Equality is structural: arrays compare element-wise in order, objects by
/// key set and values.
pub fn cleanup_panel_for_save(panel: &mut Map<String, Value>) {
    for key in TRANSIENT_PANEL_KEYS {
        panel.remove(*key);
    }

    for (key, default) in panel_defaults() {
        if panel.get(key) == Some(&default) {
            panel.remove(key);
        }
    }
}
