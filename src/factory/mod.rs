//! Node construction with per-type defaults.
//!
//! Every built-in type registers a constructor that fills a [`NodeSpec`] with the full
//! default property set the runtime expects. Caller options always win over defaults and
//! options no constructor consumes are carried onto the node untouched, so a node built
//! from a sparse option bag is still deployable and nothing the caller said is lost.

mod common;
mod function;
mod network;
mod parser;
mod sequence;
mod storage;

use indexmap::IndexMap;
use lazy_static::lazy_static;
use serde_json::{Map, Value};

use crate::id::generate_node_id;
use crate::model::{Node, Position};

/// Keys that map onto fixed [`Node`] fields and must never land in the property bag.
const CORE_KEYS: [&str; 7] = ["id", "type", "name", "x", "y", "z", "wires"];

pub type Constructor = fn(&mut NodeSpec);
type Registry = IndexMap<&'static str, Constructor>;

lazy_static! {
    static ref REGISTRY: Registry = {
        let mut registry = Registry::new();
        common::register(&mut registry);
        function::register(&mut registry);
        network::register(&mut registry);
        sequence::register(&mut registry);
        parser::register(&mut registry);
        storage::register(&mut registry);
        registry
    };
    static ref ALIASES: IndexMap<&'static str, &'static str> = IndexMap::from([
        ("link_in", "link in"),
        ("link_out", "link out"),
        ("link_call", "link call"),
        ("httpIn", "http in"),
        ("httpResponse", "http response"),
        ("httpRequest", "http request"),
        ("websocketIn", "websocket in"),
        ("websocketOut", "websocket out"),
        ("tcpIn", "tcp in"),
        ("tcpOut", "tcp out"),
        ("tcpRequest", "tcp request"),
        ("udpIn", "udp in"),
        ("udpOut", "udp out"),
        ("mqttIn", "mqtt in"),
        ("mqttOut", "mqtt out"),
        ("fileIn", "file in"),
    ]);
}

/// Working state for one node while its constructor runs.
#[derive(Debug, Default)]
pub struct NodeSpec {
    options: Map<String, Value>,
    props: IndexMap<String, Value>,
    wires: Vec<Vec<String>>,
    default_name: Option<String>,
}

impl NodeSpec {
    fn new(options: Map<String, Value>) -> Self {
        NodeSpec {
            options,
            props: IndexMap::new(),
            wires: vec![Vec::new()],
            default_name: None,
        }
    }

    /// Remove a caller option so the constructor can transform it.
    pub fn take(&mut self, key: &str) -> Option<Value> {
        self.options.remove(key)
    }

    /// Store `key`, preferring the caller's value over `default`.
    pub fn prop(&mut self, key: &str, default: impl Into<Value>) -> &mut Self {
        let value = self.options.remove(key).unwrap_or_else(|| default.into());
        self.props.insert(key.to_string(), value);
        self
    }

    /// Store a computed value, bypassing caller options.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        self.props.insert(key.to_string(), value.into());
        self
    }

    pub fn ports(&mut self, count: usize) -> &mut Self {
        self.wires = vec![Vec::new(); count];
        self
    }

    pub fn default_name(&mut self, name: &str) -> &mut Self {
        self.default_name = Some(name.to_string());
        self
    }
}

/// Resolve factory-style aliases (`httpIn`, `link_out`) to runtime type names.
pub fn canonical_type(node_type: &str) -> &str {
    ALIASES.get(node_type).copied().unwrap_or(node_type)
}

pub fn is_builtin(node_type: &str) -> bool {
    REGISTRY.contains_key(canonical_type(node_type))
}

/// Runtime type names the factory has defaults for, in registration order.
pub fn builtin_types() -> Vec<&'static str> {
    REGISTRY.keys().copied().collect()
}

/// Build a node of `node_type` on `parent_id`.
///
/// Unknown types fall back to a generic record with one empty port and the caller's
/// options copied verbatim.
pub fn create_node(
    node_type: &str,
    parent_id: &str,
    position: Option<Position>,
    options: Map<String, Value>,
) -> Node {
    let node_type = canonical_type(node_type);
    let mut spec = NodeSpec::new(options);
    let name = spec.take("name");
    let wires = spec.take("wires").and_then(parse_wires);

    if let Some(constructor) = REGISTRY.get(node_type) {
        constructor(&mut spec);
    }

    let NodeSpec {
        options,
        mut props,
        wires: default_wires,
        default_name,
    } = spec;
    for (key, value) in options {
        if !CORE_KEYS.contains(&key.as_str()) {
            props.insert(key, value);
        }
    }

    let name = match name {
        Some(Value::String(name)) => name,
        None | Some(Value::Null) => default_name.unwrap_or_default(),
        Some(other) => other.to_string(),
    };
    let position = position.unwrap_or_default();

    Node {
        id: generate_node_id(),
        node_type: node_type.to_string(),
        name,
        x: position.x,
        y: position.y,
        z: parent_id.to_string(),
        wires: wires.unwrap_or(default_wires),
        props,
    }
}

/// Convenience for building option bags from `json!` literals.
pub fn options(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn parse_wires(value: Value) -> Option<Vec<Vec<String>>> {
    serde_json::from_value(value).ok()
}

/// Normalize a `"all"`-or-list scope option; the runtime spells "all" as `null`.
fn scope_value(value: Option<Value>) -> Value {
    match value {
        Some(Value::String(s)) if s == "all" => Value::Null,
        Some(other) => other,
        None => Value::Null,
    }
}

/// Flags the runtime stores as strings; booleans are converted, strings pass through.
fn flag_string(value: Option<Value>, on: &str, off: &str) -> Value {
    match value {
        Some(Value::Bool(true)) => Value::String(on.to_string()),
        Some(Value::String(s)) => Value::String(s),
        _ => Value::String(off.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn registry_covers_all_builtin_types() {
        assert_eq!(builtin_types().len(), 43);
        assert!(is_builtin("http in"));
        assert!(is_builtin("httpIn"));
        assert!(!is_builtin("ui_button"));
    }

    #[test]
    fn core_keys_never_leak_into_props() {
        let node = create_node(
            "custom",
            "t1",
            None,
            options(json!({"id": "forced", "z": "other", "x": 5, "color": "red"})),
        );
        assert_ne!(node.id, "forced");
        assert_eq!(node.z, "t1");
        assert!(!node.props.contains_key("id"));
        assert_eq!(node.prop("color"), Some(&json!("red")));
    }

    #[test]
    fn non_string_name_is_kept_as_text() {
        let node = create_node("debug", "t1", None, options(json!({"name": 42})));
        assert_eq!(node.name, "42");
        let node = create_node("comment", "t1", None, options(json!({"name": null})));
        assert_eq!(node.name, "Comment");
    }

    #[test]
    fn scope_all_becomes_null() {
        assert_eq!(scope_value(Some(json!("all"))), Value::Null);
        assert_eq!(scope_value(Some(json!(["a"]))), json!(["a"]));
    }
}
