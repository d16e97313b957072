use node_red_flow::{
    catalog::{BuiltinCatalog, NodeCatalog},
    factory::builtin_types,
};
use pretty_assertions::assert_eq;

#[test]
fn every_builtin_type_has_an_entry() {
    let catalog = BuiltinCatalog;
    assert_eq!(catalog.len(), builtin_types().len() + 1);
    for node_type in builtin_types() {
        assert!(catalog.get(node_type).is_some(), "no entry for {node_type}");
    }
    assert!(catalog.get("unknown").is_some());
}

#[test]
fn categories_are_sorted_and_unique() {
    assert_eq!(
        BuiltinCatalog.categories(),
        vec!["common", "function", "network", "parser", "sequence", "storage"]
    );
}

#[test]
fn by_category_filters_entries() {
    let parsers: Vec<String> = BuiltinCatalog
        .by_category("parser")
        .into_iter()
        .map(|info| info.node_type)
        .collect();
    assert_eq!(parsers, vec!["csv", "html", "json", "xml", "yaml"]);
    assert!(BuiltinCatalog.by_category("dashboard").is_empty());
}

#[test]
fn resolve_accepts_aliases() {
    let info = BuiltinCatalog.resolve("httpIn").expect("alias resolves");
    assert_eq!(info.node_type, "http in");
    assert_eq!(info.inputs, 0);
    assert_eq!(info.outputs, 1);
    assert!(BuiltinCatalog.resolve("ui_button").is_none());
}

#[test]
fn search_is_case_insensitive() {
    let hits: Vec<String> = BuiltinCatalog
        .search("MQTT")
        .into_iter()
        .map(|info| info.node_type)
        .collect();
    assert_eq!(hits, vec!["mqtt in", "mqtt out"]);
    assert!(BuiltinCatalog.search("zzz-no-match").is_empty());
}

#[test]
fn quick_ref_lists_core_fields() {
    let text = BuiltinCatalog.quick_ref("debug").unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "[debug] Shows messages in the debug sidebar");
    assert_eq!(lines[1], "Category: common");
    assert_eq!(lines[2], "Inputs: 1, Outputs: 0");
    assert!(lines[3].starts_with("Key properties: active, tosidebar"));
    assert!(lines[4].starts_with("Usage: "));
    assert!(BuiltinCatalog.quick_ref("nope").is_none());
}

#[test]
fn info_serializes_type_key() {
    let value = serde_json::to_value(BuiltinCatalog.resolve("inject").unwrap()).unwrap();
    assert_eq!(value["type"], "inject");
    assert_eq!(value["category"], "common");
}
