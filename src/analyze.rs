//! Descriptive statistics over a deploy unit, usually one retrieved from the runtime.

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::model::{SUBFLOW_TYPE, TAB_TYPE};

const INPUT_TYPES: [&str; 9] = [
    "inject",
    "http in",
    "mqtt in",
    "websocket in",
    "tcp in",
    "udp in",
    "link in",
    "file in",
    "watch",
];
const OUTPUT_TYPES: [&str; 8] = [
    "debug",
    "http response",
    "mqtt out",
    "websocket out",
    "tcp out",
    "udp out",
    "link out",
    "file",
];
const TOP_TYPE_LIMIT: usize = 5;

lazy_static! {
    static ref DATABASE_TYPE_RE: Regex =
        Regex::new(r"mysql|postgresql|mongodb|redis|sqlite").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TabSummary {
    pub id: String,
    pub label: String,
    pub node_count: usize,
    pub node_types: IndexMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub summary: String,
    pub tabs: Vec<TabSummary>,
    pub total_nodes: usize,
    pub unique_node_types: Vec<String>,
    pub has_http_endpoints: bool,
    pub has_mqtt: bool,
    pub has_database: bool,
    pub input_nodes: Vec<String>,
    pub output_nodes: Vec<String>,
}

fn str_field<'a>(item: &'a Value, key: &str) -> &'a str {
    item.get(key).and_then(Value::as_str).unwrap_or_default()
}

fn describe(item: &Value, node_type: &str) -> String {
    let name = str_field(item, "name");
    let label = if name.is_empty() {
        str_field(item, "id")
    } else {
        name
    };
    format!("{node_type}: {label}")
}

pub fn analyze(items: &[Value]) -> AnalysisReport {
    // One summary per tab record; records sharing an id each count the same nodes.
    let mut tabs: Vec<TabSummary> = items
        .iter()
        .filter(|item| str_field(item, "type") == TAB_TYPE)
        .map(|item| {
            let label = match str_field(item, "label") {
                "" => "Unnamed",
                label => label,
            };
            TabSummary {
                id: str_field(item, "id").to_string(),
                label: label.to_string(),
                node_count: 0,
                node_types: IndexMap::new(),
            }
        })
        .collect();

    let mut type_counts: IndexMap<String, usize> = IndexMap::new();
    let mut input_nodes = Vec::new();
    let mut output_nodes = Vec::new();
    let mut has_http_endpoints = false;
    let mut has_mqtt = false;
    let mut has_database = false;

    for item in items {
        let node_type = str_field(item, "type");
        if node_type == TAB_TYPE || node_type == SUBFLOW_TYPE {
            continue;
        }
        let z = str_field(item, "z");
        for tab in tabs.iter_mut().filter(|tab| tab.id == z) {
            tab.node_count += 1;
            *tab.node_types.entry(node_type.to_string()).or_default() += 1;
        }
        *type_counts.entry(node_type.to_string()).or_default() += 1;

        if INPUT_TYPES.contains(&node_type) {
            input_nodes.push(describe(item, node_type));
        }
        if OUTPUT_TYPES.contains(&node_type) {
            output_nodes.push(describe(item, node_type));
        }
        has_http_endpoints |= node_type.starts_with("http");
        has_mqtt |= node_type.starts_with("mqtt");
        has_database |= DATABASE_TYPE_RE.is_match(node_type);
    }

    let total_nodes: usize = type_counts.values().sum();
    let mut unique_node_types: Vec<String> = type_counts.keys().cloned().collect();
    unique_node_types.sort();

    let mut parts = vec![format!("{} tab(s), {} node(s)", tabs.len(), total_nodes)];
    if has_http_endpoints {
        parts.push("Includes HTTP endpoints".to_string());
    }
    if has_mqtt {
        parts.push("Includes MQTT messaging".to_string());
    }
    if has_database {
        parts.push("Includes database access".to_string());
    }
    let mut ranked: Vec<(&String, &usize)> = type_counts.iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(a.1));
    if !ranked.is_empty() {
        let top = ranked
            .iter()
            .take(TOP_TYPE_LIMIT)
            .map(|(node_type, count)| format!("{node_type}({count})"))
            .collect::<Vec<_>>()
            .join(", ");
        parts.push(format!("Top node types: {top}"));
    }

    AnalysisReport {
        summary: parts.join(". "),
        tabs,
        total_nodes,
        unique_node_types,
        has_http_endpoints,
        has_mqtt,
        has_database,
        input_nodes,
        output_nodes,
    }
}
