// Dashboard document model - accessors over the loosely-typed JSON tree
use serde_json::{Map, Value};

/// Holds top-level panels on a dashboard and child panels on a row.
pub const PANELS_KEY: &str = "panels";
pub const SCHEMA_VERSION_KEY: &str = "schemaVersion";

/// Reads the schema version of a dashboard.
///
/// Integers are taken as-is, floats are truncated and numeric strings are
/// parsed. A missing or malformed field reads as `0`.
pub fn schema_version(dashboard: &Map<String, Value>) -> i64 {
    match dashboard.get(SCHEMA_VERSION_KEY) {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f.trunc() as i64))
                .unwrap_or(0)
        }
        _ => 0,
    }
}

pub fn set_schema_version(dashboard: &mut Map<String, Value>, version: i64) {
    dashboard.insert(SCHEMA_VERSION_KEY.to_string(), Value::from(version));
}

/// True when the key is missing or explicitly `null`.
pub fn is_absent(obj: &Map<String, Value>, key: &str) -> bool {
    matches!(obj.get(key), None | Some(Value::Null))
}

/// Sets `key` to the value produced by `default` only when it is absent or null.
/// Present-but-falsy values (`false`, `0`, `""`) are left alone.
pub fn default_if_absent(obj: &mut Map<String, Value>, key: &str, default: impl FnOnce() -> Value) {
    if is_absent(obj, key) {
        obj.insert(key.to_string(), default());
    }
}

/// Numeric field as `f64`, or `None` when missing or not a number.
pub fn number_field(obj: &Map<String, Value>, key: &str) -> Option<f64> {
    obj.get(key).and_then(Value::as_f64)
}

pub fn str_field<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    obj.get(key).and_then(Value::as_str)
}

/// Mutable access to an object-valued field, replacing a missing or wrong-typed
/// value with an empty object first.
pub fn object_entry<'a>(obj: &'a mut Map<String, Value>, key: &str) -> Option<&'a mut Map<String, Value>> {
    let slot = obj.entry(key.to_string()).or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    slot.as_object_mut()
}

/// Ensures `obj[key]` is an object carrying a `list` array.
///
/// A missing or wrong-typed parent becomes `{ "list": [] }`; an existing object
/// only gains `list: []` when `list` is missing, keeping its sibling keys.
pub fn ensure_list_holder(obj: &mut Map<String, Value>, key: &str) {
    match obj.get_mut(key) {
        Some(Value::Object(holder)) => {
            if !holder.contains_key("list") {
                holder.insert("list".to_string(), Value::Array(Vec::new()));
            }
        }
        _ => {
            let mut holder = Map::new();
            holder.insert("list".to_string(), Value::Array(Vec::new()));
            obj.insert(key.to_string(), Value::Object(holder));
        }
    }
}

/// The `list` array below `obj[key]`, when both levels have the right shape.
pub fn list_mut<'a>(obj: &'a mut Map<String, Value>, key: &str) -> Option<&'a mut Vec<Value>> {
    obj.get_mut(key)
        .and_then(Value::as_object_mut)
        .and_then(|holder| holder.get_mut("list"))
        .and_then(Value::as_array_mut)
}

/// Visits every panel object in display order: each top-level panel, then
/// immediately its nested row children (one level deep).
pub fn for_each_panel_mut(dashboard: &mut Map<String, Value>, mut visit: impl FnMut(&mut Map<String, Value>)) {
    let Some(panels) = dashboard.get_mut(PANELS_KEY).and_then(Value::as_array_mut) else {
        return;
    };
    for panel in panels.iter_mut().filter_map(Value::as_object_mut) {
        visit(panel);
        if let Some(children) = panel.get_mut(PANELS_KEY).and_then(Value::as_array_mut) {
            for child in children.iter_mut().filter_map(Value::as_object_mut) {
                visit(child);
            }
        }
    }
}
