// Panel defaults, query refIds, legacy panel types and panel ids
use serde_json::{json, Map, Value};
use std::collections::HashSet;

use super::dashboard::{default_if_absent, for_each_panel_mut, number_field, str_field, PANELS_KEY};

const REF_ID_LETTERS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Default value for each panel field the legacy panel model fills in on load.
/// The save-model cleaner strips fields that still deep-equal these.
pub fn panel_defaults() -> [(&'static str, Value); 9] {
    [
        ("gridPos", json!({"x": 0, "y": 0, "h": 3, "w": 6})),
        ("targets", json!([{"refId": "A"}])),
        ("cachedPluginOptions", json!({})),
        ("transparent", json!(false)),
        ("options", json!({})),
        ("links", json!([])),
        ("transformations", json!([])),
        ("fieldConfig", json!({"defaults": {}, "overrides": []})),
        ("title", json!("")),
    ]
}

/// Applies load-time defaults to a single panel: missing fields, query refIds
/// and legacy type migration.
pub fn apply_panel_defaults(panel: &mut Map<String, Value>) {
    for (key, default) in panel_defaults() {
        default_if_absent(panel, key, || default);
    }
    assign_missing_ref_ids(panel);
    auto_migrate_legacy_type(panel);
}

/// Letter sequence used for query refIds: A..Z, AA, AB, ...
pub fn ref_id_for_index(index: usize) -> String {
    let letters = REF_ID_LETTERS.len();
    if index < letters {
        return char::from(REF_ID_LETTERS[index]).to_string();
    }
    let mut id = ref_id_for_index(index / letters - 1);
    id.push(char::from(REF_ID_LETTERS[index % letters]));
    id
}

/// Gives every target without a non-empty `refId` the next letter in sequence.
///
/// Existing refIds are never consulted, so an out-of-sequence refId can end up
/// duplicated by an assigned one.
pub fn assign_missing_ref_ids(panel: &mut Map<String, Value>) {
    let Some(targets) = panel.get_mut("targets").and_then(Value::as_array_mut) else {
        return;
    };
    let mut next = 0;
    for target in targets.iter_mut().filter_map(Value::as_object_mut) {
        let has_ref_id = matches!(target.get("refId"), Some(Value::String(s)) if !s.is_empty());
        if !has_ref_id {
            target.insert("refId".to_string(), Value::String(ref_id_for_index(next)));
            next += 1;
        }
    }
}

/// Modern panel type for a legacy one, if the panel needs migrating.
pub fn legacy_panel_replacement(panel: &Map<String, Value>) -> Option<&'static str> {
    match str_field(panel, "type")? {
        "graph" => {
            let series_mode = panel
                .get("xaxis")
                .and_then(Value::as_object)
                .and_then(|xaxis| str_field(xaxis, "mode"))
                == Some("series");
            let legend_values = panel
                .get("legend")
                .and_then(Value::as_object)
                .and_then(|legend| legend.get("values"))
                .and_then(Value::as_bool)
                == Some(true);

            Some(match (series_mode, legend_values) {
                (true, true) => "bargauge",
                (true, false) => "barchart",
                _ => "timeseries",
            })
        }
        "singlestat" => Some("stat"),
        "table-old" => Some("table"),
        _ => None,
    }
}

/// Rewrites a legacy panel type and records the original in `autoMigrateFrom`.
pub fn auto_migrate_legacy_type(panel: &mut Map<String, Value>) {
    let Some(new_type) = legacy_panel_replacement(panel) else {
        return;
    };
    if let Some(original) = panel.insert("type".to_string(), Value::from(new_type)) {
        panel.insert("autoMigrateFrom".to_string(), original);
    }
}

// 2^63: numeric ids at or above this do not fit an i64
const ID_UPPER_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// Positive numeric id as `(floor, is_integer)`. Ids too large for an i64 are
/// treated like missing ones.
fn numeric_id(panel: &Map<String, Value>) -> Option<(i64, bool)> {
    let Some(Value::Number(n)) = panel.get("id") else {
        return None;
    };
    if let Some(id) = n.as_i64() {
        return (id > 0).then_some((id, true));
    }
    let id = n.as_f64()?;
    (id > 0.0 && id < ID_UPPER_BOUND).then(|| (id.floor() as i64, id.fract() == 0.0))
}

/// First id at or after `from` (or 1 once the i64 range is exhausted) that is
/// not taken.
fn next_free_id(seen: &HashSet<i64>, from: Option<i64>) -> i64 {
    let mut candidate = from.unwrap_or(1);
    while seen.contains(&candidate) {
        candidate = candidate.checked_add(1).unwrap_or(1);
    }
    candidate
}

/// Makes every panel id a unique positive integer.
///
/// Ids are checked in display order (a panel, then its row children). The first
/// panel to hold a valid integer id keeps it; later duplicates and missing or
/// invalid ids take fresh ids counting up from the largest original id.
pub fn ensure_unique_panel_ids(dashboard: &mut Map<String, Value>) {
    let mut max_id: i64 = 0;
    for_each_panel_mut(dashboard, |panel| {
        if let Some((id, _)) = numeric_id(panel) {
            max_id = max_id.max(id);
        }
    });

    let mut next_id = max_id.checked_add(1);
    let mut seen = HashSet::new();
    for_each_panel_mut(dashboard, |panel| {
        // fractional ids are replaced so every id ends up a positive integer
        let kept = numeric_id(panel)
            .filter(|(_, is_integer)| *is_integer)
            .map(|(id, _)| id)
            .filter(|id| seen.insert(*id));
        if kept.is_none() {
            let assigned = next_free_id(&seen, next_id);
            tracing::debug!(assigned, previous = ?panel.get("id"), "reassigning panel id");
            panel.insert("id".to_string(), Value::from(assigned));
            seen.insert(assigned);
            next_id = assigned.checked_add(1);
        }
    });
}

/// Applies panel defaults to every top-level panel and each row's children.
pub fn apply_defaults_to_all_panels(dashboard: &mut Map<String, Value>) {
    for_each_panel_mut(dashboard, apply_panel_defaults);
}

/// Stable ordering by `gridPos.y` then `gridPos.x`, for the top-level panels
/// and each row's nested panels.
pub fn sort_panels_by_grid_pos(dashboard: &mut Map<String, Value>) {
    let Some(panels) = dashboard.get_mut(PANELS_KEY).and_then(Value::as_array_mut) else {
        return;
    };
    stable_sort_by_grid_pos(panels);
    for panel in panels.iter_mut().filter_map(Value::as_object_mut) {
        if let Some(children) = panel.get_mut(PANELS_KEY).and_then(Value::as_array_mut) {
            stable_sort_by_grid_pos(children);
        }
    }
}

fn grid_coords(panel: &Value) -> Option<(f64, f64)> {
    let grid_pos = panel.get("gridPos")?.as_object()?;
    Some((number_field(grid_pos, "y")?, number_field(grid_pos, "x")?))
}

/// Panels without numeric coordinates never compare as less than anything.
fn grid_pos_less(a: &Value, b: &Value) -> bool {
    match (grid_coords(a), grid_coords(b)) {
        (Some((ay, ax)), Some((by, bx))) => ay < by || (ay == by && ax < bx),
        _ => false,
    }
}

// Insertion sort: the predicate is not a total order, which `sort_by` rejects.
fn stable_sort_by_grid_pos(panels: &mut [Value]) {
    for i in 1..panels.len() {
        let mut j = i;
        while j > 0 && grid_pos_less(&panels[j], &panels[j - 1]) {
            panels.swap(j, j - 1);
            j -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obj(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn ids(dashboard: &Map<String, Value>) -> Vec<Value> {
        dashboard["panels"]
            .as_array()
            .map(|panels| panels.iter().map(|p| p["id"].clone()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_apply_panel_defaults_fills_missing_fields() {
        let mut panel = obj(json!({"id": 4, "type": "timeseries", "title": "CPU"}));
        apply_panel_defaults(&mut panel);

        assert_eq!(
            Value::Object(panel),
            json!({
                "id": 4,
                "type": "timeseries",
                "title": "CPU",
                "gridPos": {"x": 0, "y": 0, "h": 3, "w": 6},
                "targets": [{"refId": "A"}],
                "cachedPluginOptions": {},
                "transparent": false,
                "options": {},
                "links": [],
                "transformations": [],
                "fieldConfig": {"defaults": {}, "overrides": []}
            })
        );
    }

    #[test]
    fn test_apply_panel_defaults_keeps_falsy_values() {
        let mut panel = obj(json!({"type": "stat", "transparent": true, "title": "", "targets": []}));
        apply_panel_defaults(&mut panel);

        assert_eq!(panel["transparent"], json!(true));
        assert_eq!(panel["targets"], json!([]));
        assert_eq!(panel["title"], json!(""));
    }

    #[test]
    fn test_ref_id_assignment_skips_existing() {
        let mut panel = obj(json!({
            "targets": [{"expr": "up"}, {"expr": "rate(x[5m])"}, {"expr": "x", "refId": "C"}]
        }));
        assign_missing_ref_ids(&mut panel);

        let ref_ids: Vec<&str> = panel["targets"]
            .as_array()
            .map(|t| t.iter().filter_map(|t| t["refId"].as_str()).collect())
            .unwrap_or_default();
        assert_eq!(ref_ids, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_ref_id_assignment_does_not_deduplicate() {
        let mut panel = obj(json!({"targets": [{"refId": "A"}, {"refId": ""}, {}]}));
        assign_missing_ref_ids(&mut panel);

        assert_eq!(panel["targets"], json!([{"refId": "A"}, {"refId": "A"}, {"refId": "B"}]));
    }

    #[test]
    fn test_ref_id_sequence_wraps_past_z() {
        assert_eq!(ref_id_for_index(0), "A");
        assert_eq!(ref_id_for_index(25), "Z");
        assert_eq!(ref_id_for_index(26), "AA");
        assert_eq!(ref_id_for_index(27), "AB");
        assert_eq!(ref_id_for_index(52), "BA");
    }

    #[test]
    fn test_legacy_graph_migrations() {
        let cases = [
            (json!({"type": "graph", "xaxis": {"mode": "series"}, "legend": {"values": true}}), "bargauge"),
            (json!({"type": "graph", "xaxis": {"mode": "series"}, "legend": {"values": false}}), "barchart"),
            (json!({"type": "graph", "xaxis": {"mode": "time"}, "legend": {"values": true}}), "timeseries"),
            (json!({"type": "graph"}), "timeseries"),
            (json!({"type": "singlestat"}), "stat"),
            (json!({"type": "table-old"}), "table"),
        ];

        for (fixture, expected) in cases {
            let original = fixture["type"].clone();
            let mut panel = obj(fixture);
            auto_migrate_legacy_type(&mut panel);
            assert_eq!(panel["type"], json!(expected));
            assert_eq!(panel["autoMigrateFrom"], original);
        }
    }

    #[test]
    fn test_modern_panel_not_migrated() {
        let mut panel = obj(json!({"type": "timeseries"}));
        auto_migrate_legacy_type(&mut panel);
        assert_eq!(Value::Object(panel), json!({"type": "timeseries"}));
    }

    #[test]
    fn test_unique_ids_duplicate_takes_next_after_max() {
        let mut dashboard = obj(json!({"panels": [{"id": 1}, {"id": 1}, {"id": 2}]}));
        ensure_unique_panel_ids(&mut dashboard);
        assert_eq!(ids(&dashboard), vec![json!(1), json!(3), json!(2)]);
    }

    #[test]
    fn test_unique_ids_cover_nested_and_invalid() {
        let mut dashboard = obj(json!({
            "panels": [
                {"id": 5, "type": "row", "panels": [{"id": 5}, {"id": -2}]},
                {"type": "text"},
                {"id": "7"}
            ]
        }));
        ensure_unique_panel_ids(&mut dashboard);

        assert_eq!(ids(&dashboard), vec![json!(5), json!(8), json!(9)]);
        assert_eq!(dashboard["panels"][0]["panels"], json!([{"id": 6}, {"id": 7}]));
    }

    #[test]
    fn test_unique_ids_out_of_range_ids_are_replaced() {
        let mut dashboard = obj(json!({"panels": [{"id": 1e300}, {}, {"id": 4}]}));
        ensure_unique_panel_ids(&mut dashboard);
        assert_eq!(ids(&dashboard), vec![json!(5), json!(6), json!(4)]);
    }

    #[test]
    fn test_unique_ids_at_i64_max_fall_back_to_smallest_free() {
        let mut dashboard = obj(json!({"panels": [{"id": i64::MAX}, {"id": 1}, {}, {"id": i64::MAX}]}));
        ensure_unique_panel_ids(&mut dashboard);
        assert_eq!(ids(&dashboard), vec![json!(i64::MAX), json!(1), json!(2), json!(3)]);
    }

    #[test]
    fn test_unique_ids_fractional_counts_toward_max() {
        let mut dashboard = obj(json!({"panels": [{"id": 2.5}, {"id": 1}]}));
        ensure_unique_panel_ids(&mut dashboard);
        assert_eq!(ids(&dashboard), vec![json!(3), json!(1)]);
    }

    #[test]
    fn test_unique_ids_empty_dashboard_starts_at_one() {
        let mut dashboard = obj(json!({"panels": [{}, {}]}));
        ensure_unique_panel_ids(&mut dashboard);
        assert_eq!(ids(&dashboard), vec![json!(1), json!(2)]);
    }

    #[test]
    fn test_sort_panels_by_grid_pos() {
        let mut dashboard = obj(json!({
            "panels": [
                {"id": 1, "gridPos": {"x": 12, "y": 8}},
                {"id": 2, "gridPos": {"x": 0, "y": 8}},
                {"id": 3, "gridPos": {"x": 0, "y": 0}},
                {"id": 4, "type": "row", "gridPos": {"x": 0, "y": 16}, "panels": [
                    {"id": 5, "gridPos": {"x": 6, "y": 17}},
                    {"id": 6, "gridPos": {"x": 0, "y": 17}}
                ]}
            ]
        }));
        sort_panels_by_grid_pos(&mut dashboard);

        assert_eq!(ids(&dashboard), vec![json!(3), json!(2), json!(1), json!(4)]);
        assert_eq!(dashboard["panels"][3]["panels"][0]["id"], json!(6));
    }

    #[test]
    fn test_sort_is_stable_for_ties() {
        let mut dashboard = obj(json!({
            "panels": [
                {"id": 1, "gridPos": {"x": 0, "y": 0}},
                {"id": 2, "gridPos": {"x": 0, "y": 0}},
                {"id": 3}
            ]
        }));
        sort_panels_by_grid_pos(&mut dashboard);
        assert_eq!(ids(&dashboard), vec![json!(1), json!(2), json!(3)]);
    }
}
