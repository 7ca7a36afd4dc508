// Template variable save-model rules
use serde_json::{Map, Value};

/// Variable kinds with type-specific cleanup rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    Query,
    Datasource,
    Constant,
    Custom,
    Textbox,
    Adhoc,
    Other,
}

impl VariableKind {
    pub fn of(variable: &Map<String, Value>) -> Self {
        match variable.get("type").and_then(Value::as_str) {
            Some("query") => Self::Query,
            Some("datasource") => Self::Datasource,
            Some("constant") => Self::Constant,
            Some("custom") => Self::Custom,
            Some("textbox") => Self::Textbox,
            Some("adhoc") => Self::Adhoc,
            _ => Self::Other,
        }
    }
}

/// Strips transient and type-defaulted fields from a single variable.
pub fn clean_variable(variable: &mut Map<String, Value>) {
    // -1 marks a variable that was never placed in the variable list
    if variable.get("index").and_then(Value::as_f64) == Some(-1.0) {
        variable.remove("index");
    }

    match VariableKind::of(variable) {
        VariableKind::Query | VariableKind::Datasource => {
            variable.insert("options".to_string(), Value::Array(Vec::new()));
            if matches!(variable.get("datasource"), Some(Value::Null)) {
                variable.remove("datasource");
            }
        }
        VariableKind::Constant => {
            variable.remove("options");
        }
        VariableKind::Custom | VariableKind::Textbox | VariableKind::Adhoc | VariableKind::Other => {}
    }
}

/// Removes `current.value` when it is null or an array holding a null.
pub fn strip_null_current_value(variable: &mut Map<String, Value>) {
    let Some(current) = variable.get_mut("current").and_then(Value::as_object_mut) else {
        return;
    };
    let has_null = match current.get("value") {
        Some(Value::Null) => true,
        Some(Value::Array(items)) => items.iter().any(Value::is_null),
        _ => false,
    };
    if has_null {
        current.remove("value");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn clean(value: Value) -> Value {
        let Value::Object(mut map) = value else {
            panic!("variable fixture must be an object");
        };
        clean_variable(&mut map);
        Value::Object(map)
    }

    #[test]
    fn test_query_variable_drops_options_and_null_datasource() {
        let cleaned = clean(json!({
            "type": "query",
            "name": "host",
            "index": -1,
            "datasource": null,
            "options": [{"text": "a", "value": "a"}]
        }));

        assert_eq!(cleaned, json!({"type": "query", "name": "host", "options": []}));
    }

    #[test]
    fn test_datasource_variable_keeps_non_null_datasource() {
        let cleaned = clean(json!({
            "type": "datasource",
            "name": "ds",
            "datasource": {"uid": "prom"},
            "options": [{"text": "x"}]
        }));

        assert_eq!(
            cleaned,
            json!({"type": "datasource", "name": "ds", "datasource": {"uid": "prom"}, "options": []})
        );
    }

    #[test]
    fn test_constant_variable_drops_options() {
        let cleaned = clean(json!({"type": "constant", "name": "c", "query": "1", "options": []}));
        assert_eq!(cleaned, json!({"type": "constant", "name": "c", "query": "1"}));
    }

    #[test]
    fn test_custom_and_adhoc_payload_untouched() {
        let custom = json!({"type": "custom", "name": "c", "options": [{"text": "1"}], "index": 3});
        assert_eq!(clean(custom.clone()), custom);

        let adhoc = clean(json!({"type": "adhoc", "name": "f", "filters": [{"key": "job"}], "index": -1}));
        assert_eq!(adhoc, json!({"type": "adhoc", "name": "f", "filters": [{"key": "job"}]}));
    }

    #[test]
    fn test_strip_null_current_value() {
        let mut scalar = json!({"current": {"text": "x", "value": null}});
        let mut array = json!({"current": {"text": "x", "value": ["a", null]}});
        let mut valid = json!({"current": {"text": "x", "value": ["a", "b"]}});

        for v in [&mut scalar, &mut array, &mut valid] {
            if let Some(map) = v.as_object_mut() {
                strip_null_current_value(map);
            }
        }

        assert_eq!(scalar, json!({"current": {"text": "x"}}));
        assert_eq!(array, json!({"current": {"text": "x"}}));
        assert_eq!(valid, json!({"current": {"text": "x", "value": ["a", "b"]}}));
    }
}
