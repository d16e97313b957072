use node_red_flow::validate::{ValidationStats, validate};
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn well_formed_unit_is_valid_with_stats() {
    let unit = json!([
        {"id": "t1", "type": "tab", "label": "Main"},
        {"id": "a", "type": "inject", "x": 100, "y": 100, "z": "t1", "wires": [["b"]]},
        {"id": "b", "type": "function", "x": 300, "y": 100, "z": "t1", "wires": [["c"], ["c"]]},
        {"id": "c", "type": "debug", "x": 500, "y": 100, "z": "t1", "wires": []}
    ]);
    let report = validate(&unit);
    assert!(report.valid);
    assert!(report.errors.is_empty());
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    assert_eq!(
        report.stats,
        ValidationStats {
            tab_count: 1,
            node_count: 3,
            wire_count: 3,
        }
    );
}

#[test]
fn missing_id_is_an_error_and_item_is_skipped() {
    let unit = json!([
        {"type": "inject", "x": 1, "y": 1, "z": "t1"},
        {"id": "", "type": "debug"},
    ]);
    let report = validate(&unit);
    assert!(!report.valid);
    assert_eq!(
        report.errors,
        vec![
            "Node missing required 'id' field".to_string(),
            "Node missing required 'id' field".to_string()
        ]
    );
    assert_eq!(report.stats.node_count, 0);
}

#[test]
fn missing_type_is_an_error() {
    let report = validate(&json!([{"id": "n1"}]));
    assert!(!report.valid);
    assert_eq!(report.errors, vec!["Node n1 missing required 'type' field".to_string()]);
}

#[test]
fn non_object_items_are_errors() {
    let report = validate(&json!([42, "x", null]));
    assert_eq!(report.errors.len(), 3);
    assert!(report.errors.iter().all(|e| e == "Invalid flow item: not an object"));
}

#[test]
fn tab_without_label_only_warns() {
    let report = validate(&json!([{"id": "t1", "type": "tab"}]));
    assert!(report.valid);
    assert_eq!(report.warnings, vec!["Tab t1 missing 'label' field".to_string()]);
    assert_eq!(report.stats.tab_count, 1);
}

#[test]
fn duplicate_ids_are_errors() {
    let unit = json!([
        {"id": "t1", "type": "tab", "label": "Main"},
        {"id": "n1", "type": "inject", "x": 0, "y": 0, "z": "t1"},
        {"id": "n1", "type": "debug", "x": 0, "y": 0, "z": "t1"}
    ]);
    let report = validate(&unit);
    assert!(!report.valid);
    assert_eq!(report.errors, vec!["Duplicate node ID: n1".to_string()]);
    assert_eq!(report.stats.node_count, 2);
}

#[test]
fn missing_position_and_parent_warn() {
    let report = validate(&json!([{"id": "n1", "type": "debug"}]));
    assert!(report.valid);
    assert_eq!(
        report.warnings,
        vec![
            "Node n1 (debug) missing position (x, y)".to_string(),
            "Node n1 (debug) missing flow reference (z)".to_string()
        ]
    );
}

#[test]
fn dangling_parent_warns_but_subflow_reference_does_not() {
    let unit = json!([
        {"id": "s1", "type": "subflow", "name": "Helper"},
        {"id": "a", "type": "debug", "x": 0, "y": 0, "z": "nowhere"},
        {"id": "b", "type": "debug", "x": 0, "y": 0, "z": "subflow:s1"},
        {"id": "c", "type": "debug", "x": 0, "y": 0, "z": "s1"}
    ]);
    let report = validate(&unit);
    assert!(report.valid);
    assert_eq!(
        report.warnings,
        vec!["Node a references non-existent flow: nowhere".to_string()]
    );
    assert_eq!(report.stats.tab_count, 0);
    assert_eq!(report.stats.node_count, 3);
}

#[test]
fn wires_to_unknown_targets_warn() {
    let unit = json!([
        {"id": "t1", "type": "tab", "label": "Main"},
        {"id": "a", "type": "inject", "x": 0, "y": 0, "z": "t1", "wires": [["ghost"]]}
    ]);
    let report = validate(&unit);
    assert!(report.valid);
    assert_eq!(
        report.warnings,
        vec!["Node a wired to non-existent node: ghost".to_string()]
    );
    assert_eq!(report.stats.wire_count, 1);
}

#[test]
fn malformed_wires_are_ignored_in_counts() {
    let unit = json!([
        {"id": "t1", "type": "tab", "label": "Main"},
        {"id": "a", "type": "inject", "x": 0, "y": 0, "z": "t1", "wires": "b"},
        {"id": "b", "type": "inject", "x": 0, "y": 0, "z": "t1", "wires": [["a"], "junk"]}
    ]);
    let report = validate(&unit);
    assert_eq!(report.stats.wire_count, 1);
}

#[test]
fn report_serializes_for_callers() {
    let report = validate(&json!([]));
    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(
        value,
        json!({
            "valid": true,
            "errors": [],
            "warnings": [],
            "stats": {"tabCount": 0, "nodeCount": 0, "wireCount": 0}
        })
    );
}
