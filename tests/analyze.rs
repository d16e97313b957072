use node_red_flow::analyze::analyze;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

fn sample_unit() -> Vec<Value> {
    json!([
        {"id": "t1", "type": "tab", "label": "API"},
        {"id": "t2", "type": "tab", "label": ""},
        {"id": "h1", "type": "http in", "name": "GET /items", "z": "t1"},
        {"id": "f1", "type": "function", "z": "t1"},
        {"id": "f2", "type": "function", "z": "t1"},
        {"id": "r1", "type": "http response", "z": "t1"},
        {"id": "m1", "type": "mqtt in", "name": "sensors", "z": "t2"},
        {"id": "d1", "type": "debug", "z": "t2"},
        {"id": "s1", "type": "subflow", "name": "Helper"},
        {"id": "x1", "type": "function", "z": "missing"}
    ])
    .as_array()
    .cloned()
    .unwrap()
}

#[test]
fn http_endpoints_are_detected() {
    let report = analyze(&sample_unit());
    assert!(report.has_http_endpoints);
    assert!(report.has_mqtt);
    assert!(!report.has_database);
}

#[test]
fn tabs_count_their_own_nodes() {
    let report = analyze(&sample_unit());
    assert_eq!(report.tabs.len(), 2);
    assert_eq!(report.tabs[0].label, "API");
    assert_eq!(report.tabs[0].node_count, 4);
    assert_eq!(report.tabs[0].node_types.get("function"), Some(&2));
    assert_eq!(report.tabs[1].label, "Unnamed");
    assert_eq!(report.tabs[1].node_count, 2);
    assert_eq!(report.total_nodes, 7);
}

#[test]
fn tabs_sharing_an_id_are_reported_separately() {
    let items = json!([
        {"id": "t1", "type": "tab", "label": "First"},
        {"id": "t1", "type": "tab", "label": "Second"},
        {"id": "n1", "type": "inject", "z": "t1"}
    ]);
    let report = analyze(items.as_array().unwrap());
    assert_eq!(report.tabs.len(), 2);
    assert_eq!(report.tabs[0].label, "First");
    assert_eq!(report.tabs[1].label, "Second");
    assert!(report.tabs.iter().all(|tab| tab.node_count == 1));
    assert!(report.summary.contains("2 tab(s)"));
}

#[test]
fn input_and_output_descriptors_use_name_or_id() {
    let report = analyze(&sample_unit());
    assert_eq!(
        report.input_nodes,
        vec!["http in: GET /items".to_string(), "mqtt in: sensors".to_string()]
    );
    assert_eq!(
        report.output_nodes,
        vec!["http response: r1".to_string(), "debug: d1".to_string()]
    );
}

#[test]
fn summary_lists_features_and_top_types() {
    let report = analyze(&sample_unit());
    assert_eq!(
        report.summary,
        "2 tab(s), 7 node(s). Includes HTTP endpoints. Includes MQTT messaging. \
         Top node types: function(3), http in(1), http response(1), mqtt in(1), debug(1)"
    );
    assert_eq!(
        report.unique_node_types,
        vec!["debug", "function", "http in", "http response", "mqtt in"]
    );
}

#[test]
fn database_nodes_are_detected_by_name() {
    let items = vec![json!({"id": "p", "type": "postgresql", "z": "t"})];
    let report = analyze(&items);
    assert!(report.has_database);
    assert!(report.summary.contains("Includes database access"));
}

#[test]
fn report_serializes_in_camel_case() {
    let value = serde_json::to_value(analyze(&sample_unit())).unwrap();
    assert_eq!(value["hasHttpEndpoints"], json!(true));
    assert_eq!(value["tabs"][0]["nodeTypes"]["function"], json!(2));
    assert_eq!(value["totalNodes"], json!(7));
}
