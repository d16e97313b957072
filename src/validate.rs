//! Structural checks over a deploy unit before it is sent to the runtime.
//!
//! Problems that would make the runtime reject the unit are errors; everything else is a
//! warning. Validation failures are reported as data, never as [`crate::error::FlowError`].

use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::model::{SUBFLOW_REF_PREFIX, SUBFLOW_TYPE, TAB_TYPE};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationStats {
    pub tab_count: usize,
    pub node_count: usize,
    pub wire_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub stats: ValidationStats,
}

impl ValidationReport {
    fn finish(mut self) -> Self {
        self.valid = self.errors.is_empty();
        self
    }
}

fn is_container(node_type: &str) -> bool {
    node_type == TAB_TYPE || node_type == SUBFLOW_TYPE
}

fn non_empty_str<'a>(item: &'a Value, key: &str) -> Option<&'a str> {
    item.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

pub fn validate(unit: &Value) -> ValidationReport {
    let Some(items) = unit.as_array() else {
        return ValidationReport {
            errors: vec!["Flow must be an array".to_string()],
            ..ValidationReport::default()
        }
        .finish();
    };
    validate_items(items)
}

pub fn validate_items(items: &[Value]) -> ValidationReport {
    let mut report = ValidationReport::default();
    let mut item_ids: HashSet<&str> = HashSet::new();
    let mut flow_ids: HashSet<&str> = HashSet::new();

    for item in items {
        if !item.is_object() {
            report
                .errors
                .push("Invalid flow item: not an object".to_string());
            continue;
        }
        let Some(id) = non_empty_str(item, "id") else {
            report
                .errors
                .push("Node missing required 'id' field".to_string());
            continue;
        };
        if !item_ids.insert(id) {
            report.errors.push(format!("Duplicate node ID: {id}"));
        }
        let Some(node_type) = non_empty_str(item, "type") else {
            report
                .errors
                .push(format!("Node {id} missing required 'type' field"));
            continue;
        };

        match node_type {
            TAB_TYPE => {
                report.stats.tab_count += 1;
                flow_ids.insert(id);
                if !item.get("label").is_some_and(Value::is_string) {
                    report
                        .warnings
                        .push(format!("Tab {id} missing 'label' field"));
                }
            }
            SUBFLOW_TYPE => {
                flow_ids.insert(id);
            }
            _ => {
                report.stats.node_count += 1;
                let positioned = item.get("x").is_some_and(Value::is_number)
                    && item.get("y").is_some_and(Value::is_number);
                if !positioned {
                    report
                        .warnings
                        .push(format!("Node {id} ({node_type}) missing position (x, y)"));
                }
                if !item.get("z").is_some_and(Value::is_string) {
                    report
                        .warnings
                        .push(format!("Node {id} ({node_type}) missing flow reference (z)"));
                }
                if let Some(ports) = item.get("wires").and_then(Value::as_array) {
                    report.stats.wire_count += ports
                        .iter()
                        .filter_map(Value::as_array)
                        .map(Vec::len)
                        .sum::<usize>();
                }
            }
        }
    }

    for item in items {
        let node_type = item.get("type").and_then(Value::as_str).unwrap_or_default();
        if is_container(node_type) {
            continue;
        }
        if let Some(z) = item.get("z").and_then(Value::as_str)
            && !flow_ids.contains(z)
            && !z.starts_with(SUBFLOW_REF_PREFIX)
        {
            let id = item.get("id").and_then(Value::as_str).unwrap_or_default();
            report
                .warnings
                .push(format!("Node {id} references non-existent flow: {z}"));
        }
    }

    for item in items {
        let Some(ports) = item.get("wires").and_then(Value::as_array) else {
            continue;
        };
        let id = item.get("id").and_then(Value::as_str).unwrap_or_default();
        for target in ports
            .iter()
            .filter_map(Value::as_array)
            .flatten()
            .filter_map(Value::as_str)
        {
            if !item_ids.contains(target) {
                report
                    .warnings
                    .push(format!("Node {id} wired to non-existent node: {target}"));
            }
        }
    }

    let report = report.finish();
    debug!(
        valid = report.valid,
        errors = report.errors.len(),
        warnings = report.warnings.len(),
        "validated flow unit"
    );
    report
}
